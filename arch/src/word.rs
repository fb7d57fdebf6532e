use std::fmt;

use bimap::BiMap;
use color_print::cformat;
use once_cell::sync::Lazy;

use crate::{
    mode::{Are, Mode},
    op::OpKind,
    reg::Reg,
};

/// Width of a machine word.
pub const WORD_BITS: u32 = 14;
/// Width of the value field of an operand word.
pub const VALUE_BITS: u32 = 12;
/// Load address of the first instruction word.
pub const BASE_ADDRESS: u16 = 100;

/// Two bits per output symbol.
static ALPHABET: Lazy<BiMap<u8, char>> = Lazy::new(|| {
    [(0b00, '*'), (0b01, '#'), (0b10, '%'), (0b11, '!')]
        .into_iter()
        .collect()
});

fn mask(bits: u32) -> u32 {
    (1 << bits) - 1
}

/// Two's complement of `value` truncated to `bits`.
pub fn to_twos(value: i32, bits: u32) -> u16 {
    (value as u32 & mask(bits)) as u16
}

/// Sign-extends the low `bits` of `raw`.
pub fn from_twos(raw: u16, bits: u32) -> i32 {
    let raw = raw as i32 & mask(bits) as i32;
    if raw & (1 << (bits - 1)) != 0 {
        raw - (1 << bits)
    } else {
        raw
    }
}

/// Whether `value` is representable as a signed `bits`-wide integer.
pub fn fits(value: i32, bits: u32) -> bool {
    let half = 1i32 << (bits - 1);
    (-half..half).contains(&value)
}

// ----------------------------------------------------------------------------
// Word

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Word(u16);

impl Word {
    pub const ZERO: Word = Word(0);

    pub fn new(raw: u16) -> Self {
        Word(raw & mask(WORD_BITS) as u16)
    }

    pub fn bits(self) -> u16 {
        self.0
    }

    /// `0000 | opcode | src mode | dst mode | ARE`.
    /// A single operand goes in the destination field.
    pub fn first(op: OpKind, src: Option<Mode>, dst: Option<Mode>) -> Self {
        let mode = |m: Option<Mode>| m.map(u8::from).unwrap_or(0) as u16;
        Word::new(
            (op.opcode() as u16) << 6
                | mode(src) << 4
                | mode(dst) << 2
                | u8::from(Are::Absolute) as u16,
        )
    }

    /// 12-bit value field followed by the ARE tag.
    pub fn operand(value: i32, are: Are) -> Self {
        Word::new(to_twos(value, VALUE_BITS) << 2 | u8::from(are) as u16)
    }

    /// Placeholder emitted for every reference to an external symbol.
    pub fn external() -> Self {
        Word::operand(0, Are::External)
    }

    /// Source register at bits 5..8, destination register at bits 2..5.
    pub fn registers(src: Option<Reg>, dst: Option<Reg>) -> Self {
        let src = src.map(|r| r.code() << 5).unwrap_or(0);
        let dst = dst.map(|r| r.code() << 2).unwrap_or(0);
        Word::new(src | dst)
    }

    pub fn data(value: i32) -> Self {
        Word::new(to_twos(value, WORD_BITS))
    }

    pub fn are(self) -> Option<Are> {
        Are::try_from((self.0 & 0b11) as u8).ok()
    }

    /// The 12-bit value field read back as a signed integer.
    pub fn value(self) -> i32 {
        from_twos(self.0 >> 2, VALUE_BITS)
    }

    pub fn to_base4(self) -> String {
        (0..WORD_BITS / 2)
            .rev()
            .map(|i| {
                let pair = ((self.0 >> (i * 2)) & 0b11) as u8;
                *ALPHABET.get_by_left(&pair).unwrap_or(&'?')
            })
            .collect()
    }

    pub fn from_base4(s: &str) -> Option<Self> {
        if s.chars().count() != (WORD_BITS / 2) as usize {
            return None;
        }
        s.chars().try_fold(Word::ZERO, |acc, c| {
            let pair = *ALPHABET.get_by_right(&c)?;
            Some(Word::new(acc.0 << 2 | pair as u16))
        })
    }

    pub fn cformat(self) -> String {
        let b = format!("{:014b}", self.0);
        cformat!(
            "<dim>{}</><r>{}</><b>{}</><y>{}</>",
            &b[0..4],
            &b[4..8],
            &b[8..12],
            &b[12..14]
        )
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base4())
    }
}

impl fmt::Binary for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Binary::fmt(&self.0, f)
    }
}
