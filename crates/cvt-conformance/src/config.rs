use std::fmt;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use cvt_codec::{Codec, Cp1258, EncodingCodec, TableCodec, WideChar, WideWidth};
use cvt_tables::{CodePageId, MappingTable, ReferenceTable, MAX_CODE_POINT};
use serde::{Deserialize, Serialize};

use crate::{run_conversion_suite, HarnessError, TestVerdict};

/// Every single-byte value.
pub const DEFAULT_CHARSET_SIZE: usize = 0x100;
/// Largest 16-bit `wchar_t`.
pub const DEFAULT_MAX_WIDE: u32 = 0xFFFF;

/// Parameters of one harness run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteConfig {
    pub code_page: CodePageId,
    /// Byte values `[0, charset_size)` are enumerated.
    pub charset_size: usize,
    /// Code points `[0, max_wide]` are enumerated.
    pub max_wide: u32,
}

impl SuiteConfig {
    pub fn new(code_page: CodePageId, charset_size: usize, max_wide: u32) -> Self {
        Self {
            code_page,
            charset_size,
            max_wide,
        }
    }

    pub fn cp1258() -> Self {
        Self::new(
            CodePageId::from_number(1258),
            DEFAULT_CHARSET_SIZE,
            DEFAULT_MAX_WIDE,
        )
    }

    pub fn validate(
        &self,
        codec: &dyn Codec,
        reference: &dyn ReferenceTable,
    ) -> Result<(), HarnessError> {
        if self.charset_size == 0 || self.charset_size > DEFAULT_CHARSET_SIZE {
            return Err(HarnessError::InvalidCharsetSize(self.charset_size));
        }
        if self.max_wide > MAX_CODE_POINT {
            return Err(HarnessError::InvalidMaxWide {
                max_wide: self.max_wide,
                limit: MAX_CODE_POINT,
                limit_name: "the Unicode range",
            });
        }
        if self.max_wide > codec.max_wide() {
            return Err(HarnessError::InvalidMaxWide {
                max_wide: self.max_wide,
                limit: codec.max_wide(),
                limit_name: "the codec's wide character maximum",
            });
        }
        if codec.code_page() != &self.code_page {
            return Err(HarnessError::CodePageMismatch {
                component: "codec",
                expected: self.code_page.clone(),
                actual: codec.code_page().clone(),
            });
        }
        if reference.code_page() != &self.code_page {
            return Err(HarnessError::CodePageMismatch {
                component: "reference table",
                expected: self.code_page.clone(),
                actual: reference.code_page().clone(),
            });
        }
        Ok(())
    }
}

/// Which facet implementation a suite exercises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum CodecKind {
    /// The dedicated code page 1258 facet.
    #[default]
    Cp1258,
    /// A facet driven by the reference mapping table itself.
    Table,
    /// The `encoding_rs` implementation of the code page.
    Encoding,
}

impl CodecKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CodecKind::Cp1258 => "cp1258",
            CodecKind::Table => "table",
            CodecKind::Encoding => "encoding",
        }
    }
}

impl fmt::Display for CodecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_charset_size() -> usize {
    DEFAULT_CHARSET_SIZE
}

fn default_max_wide() -> u32 {
    DEFAULT_MAX_WIDE
}

/// A suite as written in a manifest: configuration plus how to build the codec
/// and where the reference table comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SuiteSpec {
    pub code_page: CodePageId,
    #[serde(default = "default_charset_size")]
    pub charset_size: usize,
    #[serde(default = "default_max_wide")]
    pub max_wide: u32,
    #[serde(default)]
    pub codec: CodecKind,
    #[serde(default)]
    pub wide: WideWidth,
    /// Mapping file in the unicode.org format. Without one, the bundled table (or a
    /// table derived from `encoding_rs`) is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<PathBuf>,
}

impl SuiteSpec {
    /// The 1258 facet over a 16-bit `wchar_t`, checked over all 256 bytes and the full
    /// 16-bit range.
    pub fn cp1258() -> Self {
        Self {
            code_page: CodePageId::from_number(1258),
            charset_size: DEFAULT_CHARSET_SIZE,
            max_wide: DEFAULT_MAX_WIDE,
            codec: CodecKind::Cp1258,
            wide: WideWidth::U16,
            table: None,
        }
    }

    pub fn config(&self) -> SuiteConfig {
        SuiteConfig::new(self.code_page.clone(), self.charset_size, self.max_wide)
    }

    pub fn load_reference(&self) -> Result<MappingTable, HarnessError> {
        let loaded = match &self.table {
            Some(path) => MappingTable::load(self.code_page.clone(), path),
            None => MappingTable::for_code_page(&self.code_page),
        };
        loaded.map_err(|source| HarnessError::Table {
            code_page: self.code_page.clone(),
            source,
        })
    }

    /// Instantiate the codec under test.
    pub fn build_codec(&self, reference: &MappingTable) -> Result<Box<dyn Codec>, HarnessError> {
        match self.wide {
            WideWidth::U16 => self.build_codec_for::<u16>(reference),
            WideWidth::U32 => self.build_codec_for::<u32>(reference),
        }
    }

    fn build_codec_for<W: WideChar>(
        &self,
        reference: &MappingTable,
    ) -> Result<Box<dyn Codec>, HarnessError> {
        let unsupported = || HarnessError::UnsupportedCodec {
            codec: self.codec,
            code_page: self.code_page.clone(),
        };

        let codec: Box<dyn Codec> = match self.codec {
            CodecKind::Cp1258 => {
                if self.code_page.number() != Some(1258) {
                    return Err(unsupported());
                }
                Box::new(Cp1258::<W>::new())
            }
            CodecKind::Table => Box::new(TableCodec::<W>::new(reference.clone())),
            CodecKind::Encoding => Box::new(
                EncodingCodec::<W>::for_code_page(self.code_page.clone()).ok_or_else(unsupported)?,
            ),
        };
        Ok(codec)
    }

    /// Load the reference, build the codec, and run the suite.
    pub fn run(&self) -> Result<TestVerdict, HarnessError> {
        let reference = self.load_reference()?;
        let codec = self.build_codec(&reference)?;
        log::info!(
            "running {} suite: codec={} wide={} charset_size={} max_wide=0x{:X}",
            self.code_page,
            self.codec,
            self.wide,
            self.charset_size,
            self.max_wide
        );
        run_conversion_suite(codec.as_ref(), &reference, &self.config())
    }
}

/// JSON list of suites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    pub suites: Vec<SuiteSpec>,
}

impl Manifest {
    /// Read a manifest. Relative `table` paths are resolved against the manifest's directory.
    pub fn load(path: &Path) -> Result<Self, HarnessError> {
        let text = std::fs::read_to_string(path).map_err(|source| HarnessError::ManifestIo {
            path: path.to_path_buf(),
            source,
        })?;
        let mut manifest: Manifest =
            serde_json::from_str(&text).map_err(|source| HarnessError::ManifestParse {
                path: path.to_path_buf(),
                source,
            })?;
        if manifest.suites.is_empty() {
            return Err(HarnessError::EmptyManifest {
                path: path.to_path_buf(),
            });
        }

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        for suite in &mut manifest.suites {
            if let Some(table) = &suite.table {
                if table.is_relative() {
                    suite.table = Some(base.join(table));
                }
            }
        }
        Ok(manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_fields_default_to_the_cp1258_constants() {
        let spec: SuiteSpec = serde_json::from_str(r#"{"code_page": "1258"}"#).unwrap();
        assert_eq!(spec, SuiteSpec::cp1258());
    }

    #[test]
    fn unknown_manifest_fields_are_rejected() {
        let err = serde_json::from_str::<SuiteSpec>(r#"{"code_page": "1258", "nchars": 256}"#)
            .unwrap_err();
        assert!(err.to_string().contains("nchars"), "{err}");
    }

    #[test]
    fn cp1258_codec_is_only_available_for_cp1258() {
        let spec = SuiteSpec {
            code_page: CodePageId::from_number(1252),
            ..SuiteSpec::cp1258()
        };
        let reference = spec.load_reference().unwrap();
        let err = spec.build_codec(&reference).err().expect("unsupported codec");
        assert!(matches!(
            err,
            HarnessError::UnsupportedCodec {
                codec: CodecKind::Cp1258,
                ..
            }
        ));
    }

    #[test]
    fn wide_width_selects_codec_maximum() {
        let reference = SuiteSpec::cp1258().load_reference().unwrap();
        let narrow = SuiteSpec::cp1258().build_codec(&reference).unwrap();
        let wide = SuiteSpec {
            wide: WideWidth::U32,
            ..SuiteSpec::cp1258()
        }
        .build_codec(&reference)
        .unwrap();
        assert_eq!(narrow.max_wide(), 0xFFFF);
        assert_eq!(wide.max_wide(), u32::MAX);
    }
}
