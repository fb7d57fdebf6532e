use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

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
pub enum Reg {
    R0,
    R1,
    R2,
    R3,
    R4,
    R5,
    R6,
    R7,
}

impl Reg {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.parse::<Self>() {
            Ok(a) => Ok(a),
            Err(_) => Err(format!("Unknown reg name: {s}")),
        }
    }

    pub fn code(self) -> u16 {
        u8::from(self) as u16
    }
}
