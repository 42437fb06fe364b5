use std::marker::PhantomData;

use cvt_tables::CodePageId;
use encoding_rs::{
    DecoderResult, EncoderResult, Encoding, EUC_JP, GB18030, ISO_2022_JP, UTF_16BE, UTF_16LE,
    UTF_8,
};

use crate::wide::fits;
use crate::{Codec, ConversionError, ConversionResult, WideChar};

/// Facet backed by an `encoding_rs` encoding (WHATWG Encoding Standard mappings).
///
/// Conversions never substitute replacement characters: malformed or unmappable input
/// is reported as an error.
#[derive(Debug, Clone)]
pub struct EncodingCodec<W: WideChar> {
    code_page: CodePageId,
    encoding: &'static Encoding,
    _wide: PhantomData<W>,
}

impl<W: WideChar> EncodingCodec<W> {
    pub fn new(code_page: CodePageId, encoding: &'static Encoding) -> Self {
        Self {
            code_page,
            encoding,
            _wide: PhantomData,
        }
    }

    /// Facet for a code page `encoding_rs` knows, if any.
    pub fn for_code_page(code_page: CodePageId) -> Option<Self> {
        let encoding = code_page.encoding()?;
        Some(Self::new(code_page, encoding))
    }
}

impl<W: WideChar> Codec for EncodingCodec<W> {
    fn code_page(&self) -> &CodePageId {
        &self.code_page
    }

    /// For ISO-2022-JP this counts the escape into JIS X 0208 and the escape back
    /// to ASCII around one two-byte character.
    fn max_length(&self) -> usize {
        if self.encoding.is_single_byte() {
            1
        } else if self.encoding == ISO_2022_JP {
            8
        } else if self.encoding == GB18030
            || self.encoding == UTF_8
            || self.encoding == UTF_16LE
            || self.encoding == UTF_16BE
        {
            4
        } else if self.encoding == EUC_JP {
            3
        } else {
            2
        }
    }

    fn max_wide(&self) -> u32 {
        W::MAX
    }

    fn decode(&self, input: &[u8]) -> ConversionResult<u32> {
        let Some(&lead) = input.first() else {
            return ConversionResult::error(ConversionError::EmptyInput);
        };

        let mut decoder = self.encoding.new_decoder_without_bom_handling();
        let mut out = String::with_capacity(16);
        // Feed one byte at a time so only the first character is decoded.
        for (idx, byte) in input.iter().enumerate() {
            let (result, _) = decoder.decode_to_string_without_replacement(
                std::slice::from_ref(byte),
                &mut out,
                false,
            );
            match result {
                DecoderResult::InputEmpty => {}
                DecoderResult::OutputFull => {
                    return ConversionResult::error(ConversionError::InvalidSequence)
                }
                DecoderResult::Malformed(_, _) if idx == 0 => {
                    return ConversionResult::error(ConversionError::Unmappable)
                }
                DecoderResult::Malformed(_, _) => {
                    return ConversionResult::error(ConversionError::InvalidSequence)
                }
            }

            let mut chars = out.chars();
            if let Some(c) = chars.next() {
                if chars.next().is_some() {
                    // One sequence expanding to several scalars cannot be one wide character.
                    return ConversionResult::error(ConversionError::InvalidSequence);
                }
                let wide = c as u32;
                if !fits::<W>(wide) {
                    return ConversionResult::error(ConversionError::WideOutOfRange);
                }
                return ConversionResult::success(wide, idx + 1);
            }
        }

        let needed = self.max_length().saturating_sub(input.len()).max(1);
        ConversionResult::truncated(lead, needed)
    }

    fn encode(&self, wide: u32) -> ConversionResult<Vec<u8>> {
        if !fits::<W>(wide) {
            return ConversionResult::error(ConversionError::WideOutOfRange);
        }
        let Some(c) = char::from_u32(wide) else {
            // Lone surrogates have no encoded form.
            return ConversionResult::error(ConversionError::Unmappable);
        };

        let mut buf = [0u8; 4];
        let text = c.encode_utf8(&mut buf);
        let mut encoder = self.encoding.new_encoder();
        let capacity = encoder
            .max_buffer_length_from_utf8_without_replacement(text.len())
            .unwrap_or(16);
        let mut out = Vec::with_capacity(capacity);
        let (result, _) = encoder.encode_from_utf8_to_vec_without_replacement(text, &mut out, true);
        match result {
            EncoderResult::InputEmpty => ConversionResult::success(out, 1),
            EncoderResult::Unmappable(_) => ConversionResult::error(ConversionError::Unmappable),
            EncoderResult::OutputFull => ConversionResult::error(ConversionError::InvalidSequence),
        }
    }
}
