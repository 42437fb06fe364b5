use cvt_tables::CodePageId;

use crate::{ConversionError, ConversionResult};

/// A bidirectional narrow <-> wide conversion facet.
///
/// Wide values are passed as `u32` so the trait stays object-safe; each facet rejects
/// values that do not fit its own character width with
/// [`ConversionError::WideOutOfRange`].
pub trait Codec {
    fn code_page(&self) -> &CodePageId;

    /// Longest byte sequence one wide character encodes to.
    fn max_length(&self) -> usize;

    /// Largest wide value the facet's character type can hold.
    fn max_wide(&self) -> u32;

    /// Decode the first character of `input`.
    ///
    /// A valid prefix cut off by the end of `input` is reported as
    /// [`ConversionResult::Partial`], never as an error.
    fn decode(&self, input: &[u8]) -> ConversionResult<u32>;

    fn encode(&self, wide: u32) -> ConversionResult<Vec<u8>>;

    /// Decode a whole buffer. `consumed` is the byte count of the complete characters.
    fn decode_all(&self, input: &[u8]) -> ConversionResult<Vec<u32>> {
        let mut out = Vec::with_capacity(input.len());
        let mut pos = 0;
        while pos < input.len() {
            match self.decode(&input[pos..]) {
                ConversionResult::Success { output, consumed } => {
                    if consumed == 0 {
                        return ConversionResult::error(ConversionError::InvalidSequence);
                    }
                    out.push(output);
                    pos += consumed;
                }
                ConversionResult::Partial { reason } => {
                    return ConversionResult::Partial { reason };
                }
                ConversionResult::Error { error } => return ConversionResult::error(error),
            }
        }
        ConversionResult::success(out, pos)
    }

    /// Encode a whole buffer. `consumed` counts wide characters.
    fn encode_all(&self, input: &[u32]) -> ConversionResult<Vec<u8>> {
        let mut out = Vec::with_capacity(input.len() * self.max_length());
        for &wide in input {
            match self.encode(wide) {
                ConversionResult::Success { output, .. } => out.extend_from_slice(&output),
                ConversionResult::Partial { reason } => {
                    return ConversionResult::Partial { reason };
                }
                ConversionResult::Error { error } => return ConversionResult::error(error),
            }
        }
        ConversionResult::success(out, input.len())
    }
}

impl<C: Codec + ?Sized> Codec for Box<C> {
    fn code_page(&self) -> &CodePageId {
        (**self).code_page()
    }

    fn max_length(&self) -> usize {
        (**self).max_length()
    }

    fn max_wide(&self) -> u32 {
        (**self).max_wide()
    }

    fn decode(&self, input: &[u8]) -> ConversionResult<u32> {
        (**self).decode(input)
    }

    fn encode(&self, wide: u32) -> ConversionResult<Vec<u8>> {
        (**self).encode(wide)
    }
}
