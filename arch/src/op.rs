use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::mode::Mode;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    IntoPrimitive,
    TryFromPrimitive,
    EnumString,
    EnumIter,
    IntoStaticStr,
    Display,
)]
#[strum(serialize_all = "lowercase")]
#[repr(u8)]
pub enum OpKind {
    MOV,
    CMP,
    ADD,
    SUB,
    NOT,
    CLR,
    LEA,
    INC,
    DEC,
    JMP,
    BNE,
    RED,
    PRN,
    JSR,
    RTS,
    HLT,
}

const ANY: &[Mode] = &[Mode::Immediate, Mode::Direct, Mode::Index, Mode::Register];
const WRITABLE: &[Mode] = &[Mode::Direct, Mode::Index, Mode::Register];
const ADDRESS: &[Mode] = &[Mode::Direct, Mode::Index];
const JUMP: &[Mode] = &[Mode::Direct, Mode::Register];

impl OpKind {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.parse::<Self>() {
            Ok(op) => Ok(op),
            Err(_) => Err(format!("Undefined Op: {s}")),
        }
    }

    pub fn opcode(self) -> u8 {
        self.into()
    }

    /// Legal addressing modes for each operand, in source order.
    /// A single-operand instruction only has a destination.
    pub fn operands(&self) -> &'static [&'static [Mode]] {
        use OpKind::*;
        match self {
            MOV | ADD | SUB => &[ANY, WRITABLE],
            CMP => &[ANY, ANY],
            LEA => &[ADDRESS, WRITABLE],
            NOT | CLR | INC | DEC | RED => &[WRITABLE],
            JMP | BNE | JSR => &[JUMP],
            PRN => &[ANY],
            RTS | HLT => &[],
        }
    }

    pub fn arity(&self) -> usize {
        self.operands().len()
    }

    pub fn accepts(&self, modes: &[Mode]) -> bool {
        let legal = self.operands();
        legal.len() == modes.len() && legal.iter().zip(modes).all(|(set, m)| set.contains(m))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn parse_mnemonics() {
        assert_eq!(OpKind::parse("mov"), Ok(OpKind::MOV));
        assert_eq!(OpKind::parse("jsr"), Ok(OpKind::JSR));
        assert_eq!(OpKind::parse("hlt"), Ok(OpKind::HLT));
        assert!(OpKind::parse("MOV").is_err());
        assert!(OpKind::parse("jst").is_err());
    }

    #[test]
    fn opcodes_follow_declaration_order() {
        for (code, op) in OpKind::iter().enumerate() {
            assert_eq!(op.opcode() as usize, code);
            assert_eq!(OpKind::try_from(code as u8).ok(), Some(op));
        }
        assert_eq!(OpKind::HLT.opcode(), 0b1111);
    }

    #[test]
    fn display_is_mnemonic() {
        assert_eq!(OpKind::LEA.to_string(), "lea");
    }

    #[test]
    fn operand_matrix() {
        use Mode::*;
        assert!(OpKind::MOV.accepts(&[Immediate, Register]));
        assert!(!OpKind::MOV.accepts(&[Register, Immediate]));
        assert!(OpKind::CMP.accepts(&[Immediate, Immediate]));
        assert!(OpKind::LEA.accepts(&[Index, Register]));
        assert!(!OpKind::LEA.accepts(&[Register, Register]));
        assert!(!OpKind::LEA.accepts(&[Immediate, Direct]));
        assert!(OpKind::JMP.accepts(&[Register]));
        assert!(!OpKind::JMP.accepts(&[Index]));
        assert!(OpKind::PRN.accepts(&[Immediate]));
        assert!(!OpKind::INC.accepts(&[Immediate]));
        assert!(OpKind::RTS.accepts(&[]));
        assert!(!OpKind::HLT.accepts(&[Register]));
    }

    #[test]
    fn arity() {
        assert_eq!(OpKind::MOV.arity(), 2);
        assert_eq!(OpKind::RED.arity(), 1);
        assert_eq!(OpKind::RTS.arity(), 0);
    }
}
