use std::collections::HashSet;

use arch::{Mode, OpKind, Reg};
use once_cell::sync::Lazy;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::{
    arg::{self, ArgKind},
    error::SemanticError,
    macros::{MACRO_END, MACRO_START},
    sentence::Sentence,
};

pub const MAX_NAME_LENGTH: usize = 31;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter, IntoStaticStr, Display)]
pub enum Directive {
    #[strum(serialize = ".data")]
    Data,
    #[strum(serialize = ".string")]
    Str,
    #[strum(serialize = ".define")]
    Define,
    #[strum(serialize = ".extern")]
    Extern,
    #[strum(serialize = ".entry")]
    Entry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Inst(OpKind),
    Directive(Directive),
}

impl Operation {
    pub fn parse(s: &str) -> Option<Self> {
        if let Ok(op) = OpKind::parse(s) {
            Some(Operation::Inst(op))
        } else {
            s.parse().ok().map(Operation::Directive)
        }
    }
}

static RESERVED: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    let mut words = HashSet::new();
    words.extend(OpKind::iter().map(<&'static str>::from));
    words.extend(Directive::iter().map(<&'static str>::from));
    words.extend(Reg::iter().map(<&'static str>::from));
    words.insert(MACRO_START);
    words.insert(MACRO_END);
    words
});

pub fn is_reserved(name: &str) -> bool {
    RESERVED.contains(name)
}

/// Latin letter, then latin letters or digits.
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    name.len() <= MAX_NAME_LENGTH && chars.all(|c| c.is_ascii_alphanumeric())
}

/// Label, extern and entry names.
pub fn check_name(name: &str) -> Result<(), SemanticError> {
    if is_reserved(name) {
        Err(SemanticError::ReservedLabel(name.to_string()))
    } else if !is_valid_name(name) {
        Err(SemanticError::InvalidName(name.to_string()))
    } else {
        Ok(())
    }
}

fn check_arg_count(op: Operation, args: &[String]) -> bool {
    match op {
        Operation::Inst(op) => args.len() == op.arity(),
        Operation::Directive(Directive::Data) => !args.is_empty(),
        Operation::Directive(Directive::Define) => args.len() == 2,
        Operation::Directive(_) => args.len() == 1,
    }
}

fn check_operand_types(op: Operation, args: &[String]) -> Result<(), SemanticError> {
    let invalid = |op: Operation| match op {
        Operation::Inst(op) => SemanticError::OperandTypes(op.to_string()),
        Operation::Directive(d) => SemanticError::OperandTypes(d.to_string()),
    };
    match op {
        Operation::Inst(inst) => {
            let modes: Option<Vec<Mode>> = args.iter().map(|a| ArgKind::of(a).mode()).collect();
            match modes {
                Some(modes) if inst.accepts(&modes) => Ok(()),
                _ => Err(invalid(op)),
            }
        }
        Operation::Directive(Directive::Data) => {
            let ok = args
                .iter()
                .all(|a| matches!(ArgKind::of(a), ArgKind::Integer | ArgKind::Variable));
            if ok {
                Ok(())
            } else {
                Err(invalid(op))
            }
        }
        Operation::Directive(Directive::Str) => {
            let arg = &args[0];
            if ArgKind::of(arg) == ArgKind::Str && arg::string_body(arg).is_some() {
                Ok(())
            } else {
                Err(invalid(op))
            }
        }
        Operation::Directive(Directive::Extern | Directive::Entry) => check_name(&args[0]),
        // `.define` operands are resolved by the second pass.
        Operation::Directive(Directive::Define) => Ok(()),
    }
}

/// Checks a lexically valid sentence and resolves its operation.
pub fn check(sentence: &Sentence) -> Result<Operation, SemanticError> {
    if let Some(label) = &sentence.label {
        check_name(label)?;
    }
    if sentence.op.is_empty() {
        return Err(SemanticError::MissingOperation);
    }
    let op = Operation::parse(&sentence.op)
        .ok_or_else(|| SemanticError::UnknownOperation(sentence.op.clone()))?;
    if !check_arg_count(op, &sentence.args) {
        return Err(SemanticError::ArgumentCount(sentence.op.clone()));
    }
    check_operand_types(op, &sentence.args)?;
    Ok(op)
}
