use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum::Display;

/// Operand addressing mode, as stored in the 2-bit mode fields of the first word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive, Display)]
#[repr(u8)]
pub enum Mode {
    Immediate = 0b00,
    Direct = 0b01,
    Index = 0b10,
    Register = 0b11,
}

impl Mode {
    /// Extra words this operand adds after the first word.
    pub fn cost(self) -> u16 {
        match self {
            Mode::Index => 2,
            _ => 1,
        }
    }
}

/// Absolute / Relocatable / External tag in the low two bits of every word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive, Display)]
#[repr(u8)]
pub enum Are {
    Absolute = 0b00,
    External = 0b01,
    Relocatable = 0b10,
}
