use std::iter;

use arch::{Are, Mode, OpKind, Reg, Word};

/// What a direct or indexed operand refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Extern(String),
    /// Relocated label address.
    Label(u16),
}

impl Target {
    fn word(&self) -> Word {
        match self {
            Target::Extern(_) => Word::external(),
            Target::Label(addr) => Word::operand(*addr as i32, Are::Relocatable),
        }
    }
}

/// A fully resolved instruction operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Immediate(i32),
    Direct(Target),
    Index(Target, i32),
    Register(Reg),
}

impl Operand {
    pub fn mode(&self) -> Mode {
        match self {
            Operand::Immediate(_) => Mode::Immediate,
            Operand::Direct(_) => Mode::Direct,
            Operand::Index(..) => Mode::Index,
            Operand::Register(_) => Mode::Register,
        }
    }

    /// Extra words this operand takes when it does not share a register word.
    pub fn words(&self) -> u16 {
        self.mode().cost()
    }

    /// Name of the external symbol referenced by this operand.
    pub fn external(&self) -> Option<&str> {
        match self {
            Operand::Direct(Target::Extern(name)) | Operand::Index(Target::Extern(name), _) => {
                Some(name)
            }
            _ => None,
        }
    }

    fn encode(&self, source: bool, out: &mut Vec<Word>) {
        match self {
            Operand::Immediate(value) => out.push(Word::operand(*value, Are::Absolute)),
            Operand::Direct(target) => out.push(target.word()),
            Operand::Index(target, index) => {
                out.push(target.word());
                out.push(Word::operand(*index, Are::Absolute));
            }
            Operand::Register(reg) if source => out.push(Word::registers(Some(*reg), None)),
            Operand::Register(reg) => out.push(Word::registers(None, Some(*reg))),
        }
    }
}

/// First word followed by operand words. Two register operands share one word.
pub fn instruction(op: OpKind, operands: &[Operand]) -> Vec<Word> {
    let (src, dst) = match operands {
        [] => (None, None),
        [dst] => (None, Some(dst)),
        [src, dst, ..] => (Some(src), Some(dst)),
    };
    let mut words = vec![Word::first(op, src.map(Operand::mode), dst.map(Operand::mode))];
    match (src, dst) {
        (Some(Operand::Register(s)), Some(Operand::Register(d))) => {
            words.push(Word::registers(Some(*s), Some(*d)));
        }
        _ => {
            if let Some(src) = src {
                src.encode(true, &mut words);
            }
            if let Some(dst) = dst {
                dst.encode(false, &mut words);
            }
        }
    }
    words
}

pub fn data(values: &[i32]) -> Vec<Word> {
    values.iter().map(|&v| Word::data(v)).collect()
}

/// One word per character, then a terminating zero word.
pub fn string(body: &str) -> Vec<Word> {
    body.chars()
        .map(|c| Word::data(c as i32))
        .chain(iter::once(Word::ZERO))
        .collect()
}
