use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use cvt_codec::WideWidth;
use cvt_tables::{ByteClass, CodePageId};
use serde::Serialize;

use crate::{CodecKind, Failure, Manifest, SuiteSpec, TestVerdict, DEFAULT_CHARSET_SIZE};

#[derive(Clone, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum WideArg {
    U16,
    U32,
}

impl From<WideArg> for WideWidth {
    fn from(value: WideArg) -> Self {
        match value {
            WideArg::U16 => WideWidth::U16,
            WideArg::U32 => WideWidth::U32,
        }
    }
}

/// Command-line arguments for `cvt_conform`.
///
/// Without `--manifest`, a single suite is built from the remaining flags; their
/// defaults reproduce the code page 1258 suite.
#[derive(Parser)]
#[command(about = "Check code page conversion facets against their reference tables.")]
pub struct Args {
    /// JSON manifest listing suites to run (overrides the single-suite flags).
    #[arg(long, value_name = "PATH")]
    manifest: Option<PathBuf>,

    /// Code page under test (e.g. `cp1258`, `1252`, `windows-1251`).
    #[arg(long, default_value = "cp1258")]
    code_page: CodePageId,

    /// Number of single-byte values to enumerate.
    #[arg(long, default_value_t = DEFAULT_CHARSET_SIZE)]
    charset_size: usize,

    /// Largest wide value to enumerate (decimal or 0x-prefixed hex).
    #[arg(long, default_value = "0xFFFF", value_parser = parse_wide_value)]
    max_wide: u32,

    /// Facet implementation to check.
    #[arg(long, value_enum, default_value_t = CodecKind::Cp1258)]
    codec: CodecKind,

    /// Wide character width of the facet.
    #[arg(long, value_enum, default_value_t = WideArg::U16)]
    wide: WideArg,

    /// Reference mapping file (unicode.org format) instead of the bundled table.
    #[arg(long, value_name = "PATH")]
    table: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Maximum number of failures to print per suite (default: unlimited).
    #[arg(long)]
    max_failures: Option<usize>,

    /// Log filter (e.g. `warn`, `info`, `cvt_conformance=debug`).
    #[arg(long, default_value = "warn")]
    log_level: String,
}

impl Args {
    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    fn suites(&self) -> Result<Vec<SuiteSpec>> {
        if let Some(path) = &self.manifest {
            let manifest = Manifest::load(path)?;
            return Ok(manifest.suites);
        }
        Ok(vec![SuiteSpec {
            code_page: self.code_page.clone(),
            charset_size: self.charset_size,
            max_wide: self.max_wide,
            codec: self.codec,
            wide: self.wide.into(),
            table: self.table.clone(),
        }])
    }
}

#[derive(Debug, Serialize)]
struct JsonCounts {
    passed: usize,
    failed: usize,
    skipped: usize,
}

#[derive(Debug, Serialize)]
struct JsonClasses {
    single_byte: usize,
    lead_byte: usize,
    invalid: usize,
}

#[derive(Debug, Serialize)]
struct JsonSuite<'a> {
    code_page: &'a str,
    codec: &'static str,
    wide: &'static str,
    charset_size: usize,
    max_wide: u32,
    table: Option<String>,
    passed: bool,
    counts: JsonCounts,
    classes: JsonClasses,
    failures: Vec<&'a Failure>,
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    passed: bool,
    suites: Vec<JsonSuite<'a>>,
}

pub fn parse_args() -> Args {
    Args::parse()
}

/// Run every requested suite and print the report.
///
/// Returns whether all suites passed. Configuration problems are errors.
pub fn run_with_args(args: Args) -> Result<bool> {
    let specs = args.suites()?;

    let mut runs = Vec::with_capacity(specs.len());
    for spec in specs {
        let verdict = spec
            .run()
            .with_context(|| format!("set up {} suite (codec {})", spec.code_page, spec.codec))?;
        runs.push((spec, verdict));
    }
    let all_passed = runs.iter().all(|(_, verdict)| verdict.all_passed());

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let written = match args.format {
        OutputFormat::Text => write_text(&mut handle, &runs, args.max_failures),
        OutputFormat::Json => write_json(&mut handle, &runs, args.max_failures, all_passed),
    };
    match written {
        // A consumer closing the pipe early (e.g. `| head`) is not a failure.
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => {}
        other => other.context("write report")?,
    }

    Ok(all_passed)
}

fn write_text(
    out: &mut impl Write,
    runs: &[(SuiteSpec, TestVerdict)],
    max_failures: Option<usize>,
) -> io::Result<()> {
    writeln!(out, "Conversion conformance report")?;
    for (spec, verdict) in runs {
        writeln!(out)?;
        writeln!(
            out,
            "  suite: {} (codec={}, wide={}, charset_size={}, max_wide=0x{:X})",
            spec.code_page, spec.codec, spec.wide, spec.charset_size, spec.max_wide
        )?;
        writeln!(
            out,
            "  table: {}",
            spec.table
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(bundled)".to_string())
        )?;
        write!(out, "  {verdict}")?;

        if verdict.failures.is_empty() {
            continue;
        }
        writeln!(out)?;
        let limit = max_failures.unwrap_or(verdict.failures.len());
        for failure in verdict.failures.iter().take(limit) {
            write!(out, "{failure}")?;
        }
        if verdict.failures.len() > limit {
            writeln!(
                out,
                "  ... {} more failure(s) not shown",
                verdict.failures.len() - limit
            )?;
        }
    }
    Ok(())
}

fn write_json(
    out: &mut impl Write,
    runs: &[(SuiteSpec, TestVerdict)],
    max_failures: Option<usize>,
    all_passed: bool,
) -> io::Result<()> {
    let suites = runs
        .iter()
        .map(|(spec, verdict)| {
            let limit = max_failures.unwrap_or(verdict.failures.len());
            JsonSuite {
                code_page: verdict.code_page.as_str(),
                codec: spec.codec.as_str(),
                wide: spec.wide.as_str(),
                charset_size: verdict.charset_size,
                max_wide: verdict.max_wide,
                table: spec.table.as_ref().map(|p| p.display().to_string()),
                passed: verdict.all_passed(),
                counts: JsonCounts {
                    passed: verdict.passed,
                    failed: verdict.failed,
                    skipped: verdict.skipped,
                },
                classes: JsonClasses {
                    single_byte: verdict.class_count(ByteClass::SingleByte),
                    lead_byte: verdict.class_count(ByteClass::LeadByte),
                    invalid: verdict.class_count(ByteClass::Invalid),
                },
                failures: verdict.failures.iter().take(limit).collect(),
            }
        })
        .collect();

    let report = JsonReport {
        passed: all_passed,
        suites,
    };
    serde_json::to_writer(&mut *out, &report).map_err(io::Error::from)?;
    out.write_all(b"\n")
}

fn parse_wide_value(input: &str) -> Result<u32, String> {
    let trimmed = input.trim();
    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => trimmed.parse(),
    };
    parsed.map_err(|err| format!("invalid wide value '{input}': {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_and_decimal_wide_values() {
        assert_eq!(parse_wide_value("0xffff"), Ok(0xFFFF));
        assert_eq!(parse_wide_value("0X10FFFF"), Ok(0x10FFFF));
        assert_eq!(parse_wide_value("255"), Ok(255));
        assert!(parse_wide_value("0xZZ").is_err());
        assert!(parse_wide_value("-1").is_err());
    }

    #[test]
    fn defaults_describe_the_cp1258_suite() {
        let args = Args::try_parse_from(["cvt_conform"]).unwrap();
        assert_eq!(args.suites().unwrap(), vec![SuiteSpec::cp1258()]);
        assert_eq!(args.log_level(), "warn");
    }

    #[test]
    fn flags_override_the_single_suite() {
        let args = Args::try_parse_from([
            "cvt_conform",
            "--code-page",
            "windows-1252",
            "--codec",
            "encoding",
            "--wide",
            "u32",
            "--max-wide",
            "0x10ffff",
        ])
        .unwrap();
        let suites = args.suites().unwrap();
        assert_eq!(suites.len(), 1);
        assert_eq!(suites[0].code_page.as_str(), "cp1252");
        assert_eq!(suites[0].codec, CodecKind::Encoding);
        assert_eq!(suites[0].wide, WideWidth::U32);
        assert_eq!(suites[0].max_wide, 0x10FFFF);
    }

    #[test]
    fn text_report_truncates_failures() {
        let spec = SuiteSpec {
            codec: CodecKind::Encoding,
            ..SuiteSpec::cp1258()
        };
        let verdict = spec.run().unwrap();
        assert!(!verdict.all_passed());

        let mut out = Vec::new();
        write_text(&mut out, &[(spec, verdict)], Some(1)).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("[FAIL]"), "{text}");
        assert!(text.contains("more failure(s) not shown"), "{text}");
    }
}
