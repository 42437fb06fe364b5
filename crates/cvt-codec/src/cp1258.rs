use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::OnceLock;

use cvt_tables::CodePageId;

use crate::wide::fits;
use crate::{Codec, ConversionError, ConversionResult, WideChar};

const UNMAPPED: u16 = 0xFFFF;

/// Upper half of Windows code page 1258 (Vietnamese). 0x00-0x7F is ASCII.
#[rustfmt::skip]
static UPPER_HALF: [u16; 128] = [
    0x20AC, UNMAPPED, 0x201A, 0x0192, 0x201E, 0x2026, 0x2020, 0x2021, // 0x80
    0x02C6, 0x2030, UNMAPPED, 0x2039, 0x0152, UNMAPPED, UNMAPPED, UNMAPPED, // 0x88
    UNMAPPED, 0x2018, 0x2019, 0x201C, 0x201D, 0x2022, 0x2013, 0x2014, // 0x90
    0x02DC, 0x2122, UNMAPPED, 0x203A, 0x0153, UNMAPPED, UNMAPPED, 0x0178, // 0x98
    0x00A0, 0x00A1, 0x00A2, 0x00A3, 0x00A4, 0x00A5, 0x00A6, 0x00A7, // 0xA0
    0x00A8, 0x00A9, 0x00AA, 0x00AB, 0x00AC, 0x00AD, 0x00AE, 0x00AF, // 0xA8
    0x00B0, 0x00B1, 0x00B2, 0x00B3, 0x00B4, 0x00B5, 0x00B6, 0x00B7, // 0xB0
    0x00B8, 0x00B9, 0x00BA, 0x00BB, 0x00BC, 0x00BD, 0x00BE, 0x00BF, // 0xB8
    0x00C0, 0x00C1, 0x00C2, 0x0102, 0x00C4, 0x00C5, 0x00C6, 0x00C7, // 0xC0
    0x00C8, 0x00C9, 0x00CA, 0x00CB, 0x0300, 0x00CD, 0x00CE, 0x00CF, // 0xC8
    0x0110, 0x00D1, 0x0309, 0x00D3, 0x00D4, 0x01A0, 0x00D6, 0x00D7, // 0xD0
    0x00D8, 0x00D9, 0x00DA, 0x00DB, 0x00DC, 0x01AF, 0x0303, 0x00DF, // 0xD8
    0x00E0, 0x00E1, 0x00E2, 0x0103, 0x00E4, 0x00E5, 0x00E6, 0x00E7, // 0xE0
    0x00E8, 0x00E9, 0x00EA, 0x00EB, 0x0301, 0x00ED, 0x00EE, 0x00EF, // 0xE8
    0x0111, 0x00F1, 0x0323, 0x00F3, 0x00F4, 0x01A1, 0x00F6, 0x00F7, // 0xF0
    0x00F8, 0x00F9, 0x00FA, 0x00FB, 0x00FC, 0x01B0, 0x20AB, 0x00FF, // 0xF8
];

fn reverse_table() -> &'static HashMap<u32, u8> {
    static REVERSE: OnceLock<HashMap<u32, u8>> = OnceLock::new();
    REVERSE.get_or_init(|| {
        UPPER_HALF
            .iter()
            .zip(0x80u8..=0xFF)
            .filter(|&(&wide, _)| wide != UNMAPPED)
            .map(|(&wide, byte)| (u32::from(wide), byte))
            .collect()
    })
}

/// Code page 1258 facet for wide character type `W`.
///
/// Single-byte only. Vietnamese tone marks are encoded as separate combining
/// characters (U+0300, U+0301, U+0303, U+0309, U+0323), so precomposed letters such as
/// U+1EA0 have no mapping.
#[derive(Debug, Clone)]
pub struct Cp1258<W: WideChar> {
    code_page: CodePageId,
    _wide: PhantomData<W>,
}

impl<W: WideChar> Cp1258<W> {
    pub fn new() -> Self {
        Self {
            code_page: CodePageId::from_number(1258),
            _wide: PhantomData,
        }
    }
}

impl<W: WideChar> Default for Cp1258<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: WideChar> Codec for Cp1258<W> {
    fn code_page(&self) -> &CodePageId {
        &self.code_page
    }

    fn max_length(&self) -> usize {
        1
    }

    fn max_wide(&self) -> u32 {
        W::MAX
    }

    fn decode(&self, input: &[u8]) -> ConversionResult<u32> {
        let Some(&byte) = input.first() else {
            return ConversionResult::error(ConversionError::EmptyInput);
        };
        if byte < 0x80 {
            return ConversionResult::success(u32::from(byte), 1);
        }
        match UPPER_HALF[usize::from(byte - 0x80)] {
            UNMAPPED => ConversionResult::error(ConversionError::Unmappable),
            wide => ConversionResult::success(u32::from(wide), 1),
        }
    }

    fn encode(&self, wide: u32) -> ConversionResult<Vec<u8>> {
        if !fits::<W>(wide) {
            return ConversionResult::error(ConversionError::WideOutOfRange);
        }
        if wide < 0x80 {
            return ConversionResult::success(vec![wide as u8], 1);
        }
        match reverse_table().get(&wide) {
            Some(&byte) => ConversionResult::success(vec![byte], 1),
            None => ConversionResult::error(ConversionError::Unmappable),
        }
    }
}
