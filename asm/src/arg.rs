use arch::{Mode, Reg};

/// Syntactic class of an argument token. Independent of the symbol tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    /// `#5`, `#sz`
    Immediate,
    /// `r0` .. `r7`
    Register,
    /// `list[2]`, `list[sz]`
    Index,
    /// `-12`, `+3`
    Integer,
    /// `"text"`
    Str,
    /// any other bare word
    Variable,
}

impl ArgKind {
    pub fn of(arg: &str) -> ArgKind {
        if arg.starts_with('#') {
            ArgKind::Immediate
        } else if Reg::parse(arg).is_ok() {
            ArgKind::Register
        } else if arg.contains('[') {
            ArgKind::Index
        } else if is_integer(arg) {
            ArgKind::Integer
        } else if arg.starts_with('"') {
            ArgKind::Str
        } else {
            ArgKind::Variable
        }
    }

    /// Addressing mode when used as an instruction operand.
    pub fn mode(self) -> Option<Mode> {
        match self {
            ArgKind::Immediate => Some(Mode::Immediate),
            ArgKind::Variable => Some(Mode::Direct),
            ArgKind::Index => Some(Mode::Index),
            ArgKind::Register => Some(Mode::Register),
            ArgKind::Integer | ArgKind::Str => None,
        }
    }
}

/// Optional sign followed by decimal digits.
pub fn is_integer(s: &str) -> bool {
    let digits = s.strip_prefix(&['+', '-'][..]).unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

pub fn parse_integer(s: &str) -> Option<i32> {
    if is_integer(s) {
        s.parse().ok()
    } else {
        None
    }
}

/// `name[index]` -> (`name`, `index`), index trimmed.
pub fn split_index(arg: &str) -> Option<(&str, &str)> {
    let (name, rest) = arg.split_once('[')?;
    let index = rest.strip_suffix(']')?;
    Some((name, index.trim()))
}

/// Contents of a `"..."` token.
pub fn string_body(arg: &str) -> Option<&str> {
    arg.strip_prefix('"')?.strip_suffix('"')
}
