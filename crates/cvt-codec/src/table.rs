use std::marker::PhantomData;

use cvt_tables::{ByteClass, CodePageId, MappingTable, ReferenceTable};

use crate::wide::fits;
use crate::{Codec, ConversionError, ConversionResult, WideChar};

/// Facet driven by a [`MappingTable`]; handles SBCS and DBCS code pages.
#[derive(Debug, Clone)]
pub struct TableCodec<W: WideChar> {
    table: MappingTable,
    _wide: PhantomData<W>,
}

impl<W: WideChar> TableCodec<W> {
    pub fn new(table: MappingTable) -> Self {
        Self {
            table,
            _wide: PhantomData,
        }
    }
}

impl<W: WideChar> Codec for TableCodec<W> {
    fn code_page(&self) -> &CodePageId {
        self.table.code_page()
    }

    fn max_length(&self) -> usize {
        self.table.max_sequence_len()
    }

    fn max_wide(&self) -> u32 {
        W::MAX
    }

    fn decode(&self, input: &[u8]) -> ConversionResult<u32> {
        let Some(&first) = input.first() else {
            return ConversionResult::error(ConversionError::EmptyInput);
        };

        let len = match self.table.classify_byte(first) {
            ByteClass::SingleByte => 1,
            ByteClass::LeadByte => 2,
            ByteClass::Invalid => return ConversionResult::error(ConversionError::Unmappable),
        };
        if input.len() < len {
            return ConversionResult::truncated(first, len - input.len());
        }

        match self.table.decode(&input[..len]) {
            Some(wide) if fits::<W>(wide) => ConversionResult::success(wide, len),
            Some(_) => ConversionResult::error(ConversionError::WideOutOfRange),
            None => ConversionResult::error(ConversionError::Unmappable),
        }
    }

    fn encode(&self, wide: u32) -> ConversionResult<Vec<u8>> {
        if !fits::<W>(wide) {
            return ConversionResult::error(ConversionError::WideOutOfRange);
        }
        match self.table.encode(wide) {
            Some(bytes) => ConversionResult::success(bytes.to_vec(), 1),
            None => ConversionResult::error(ConversionError::Unmappable),
        }
    }
}
