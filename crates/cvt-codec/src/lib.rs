//! Narrow <-> wide character conversion facets.
//!
//! Every facet implements the object-safe [`Codec`] trait: decode the first character of
//! a byte buffer, or encode one wide character. Facets are generic over the wide
//! character width ([`WideChar`]) the way `codecvt<wchar_t, char, mbstate_t>` facets are,
//! so `Cp1258<u16>` models a 16-bit `wchar_t` and `Cp1258<u32>` a 32-bit one.

mod codec;
mod cp1258;
mod encoding;
mod result;
mod table;
mod wide;

pub use codec::Codec;
pub use cp1258::Cp1258;
pub use encoding::EncodingCodec;
pub use result::{ConversionError, ConversionResult, PartialReason};
pub use table::TableCodec;
pub use wide::{WideChar, WideWidth};
