use std::fmt;

use serde::{Deserialize, Serialize};

/// Storage type for a wide character.
pub trait WideChar: Copy + Eq + fmt::Debug + Into<u32> + TryFrom<u32> + 'static {
    /// Largest value the type can hold.
    const MAX: u32;
}

impl WideChar for u16 {
    const MAX: u32 = u16::MAX as u32;
}

impl WideChar for u32 {
    const MAX: u32 = u32::MAX;
}

/// Runtime name for a [`WideChar`] type, used by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WideWidth {
    /// 16-bit `wchar_t`.
    #[default]
    U16,
    U32,
}

impl WideWidth {
    pub fn as_str(self) -> &'static str {
        match self {
            WideWidth::U16 => "u16",
            WideWidth::U32 => "u32",
        }
    }
}

impl fmt::Display for WideWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check that `wide` fits `W`.
pub(crate) fn fits<W: WideChar>(wide: u32) -> bool {
    W::try_from(wide).is_ok()
}
