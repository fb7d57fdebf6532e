use arch::{
    word::{fits, BASE_ADDRESS, VALUE_BITS, WORD_BITS},
    OpKind, Reg, Word,
};

use crate::{
    arg::{self, ArgKind},
    encode::{self, Operand, Target},
    error::{Report, SemanticError, Warning},
    macros::Expanded,
    output::{Object, Output, Record},
    sentence::{Sentence, DEFINE},
    symbols::{Defines, Symbols},
    validate::{self, Directive, Operation},
};

fn ranged(value: i32, bits: u32) -> Result<i32, SemanticError> {
    if fits(value, bits) {
        Ok(value)
    } else {
        Err(SemanticError::OutOfRange(value, bits))
    }
}

/// State of one second pass over the expanded source.
struct Pass<'a> {
    symbols: &'a Symbols,
    defines: Defines,
    code: Vec<Word>,
    data: Vec<Word>,
    entries: Vec<Record>,
    externs: Vec<Record>,
}

impl<'a> Pass<'a> {
    fn new(symbols: &'a Symbols) -> Self {
        Pass {
            symbols,
            defines: Defines::new(),
            code: vec![],
            data: vec![],
            entries: vec![],
            externs: vec![],
        }
    }

    /// `.define <name> = <value>`
    fn define(&mut self, sentence: &Sentence, line: usize, report: &mut Report) {
        if let Some(err) = &sentence.err {
            report.error(line, err.clone());
            return;
        }
        if sentence.label.is_some() {
            report.warn(line, Warning::LabelIgnored(DEFINE.to_string()));
            report.error(line, SemanticError::LabelOnDefine);
        }
        let [name, value] = sentence.args.as_slice() else {
            report.error(line, SemanticError::ArgumentCount(DEFINE.to_string()));
            return;
        };
        if let Err(err) = self.check_define(name, value) {
            report.error(line, err);
        }
    }

    fn check_define(&mut self, name: &str, value: &str) -> Result<(), SemanticError> {
        if validate::is_reserved(name) {
            return Err(SemanticError::ReservedDefine(name.to_string()));
        }
        if !validate::is_valid_name(name) {
            return Err(SemanticError::InvalidName(name.to_string()));
        }
        if self.symbols.label(name).is_some() || self.symbols.is_extern(name) {
            return Err(SemanticError::DefineConflict(name.to_string()));
        }
        let value = arg::parse_integer(value)
            .ok_or_else(|| SemanticError::DefineValue(value.to_string()))?;
        self.defines.insert(name, value)
    }

    /// An integer literal or a defined constant.
    fn constant(&self, token: &str) -> Option<i32> {
        arg::parse_integer(token).or_else(|| self.defines.get(token))
    }

    fn target(&self, name: &str) -> Result<Target, SemanticError> {
        if self.symbols.is_extern(name) {
            Ok(Target::Extern(name.to_string()))
        } else if let Some(addr) = self.symbols.addr(name) {
            if u32::from(addr) >> VALUE_BITS != 0 {
                return Err(SemanticError::OutOfRange(i32::from(addr), VALUE_BITS));
            }
            Ok(Target::Label(addr))
        } else {
            Err(SemanticError::UnknownVariable(name.to_string()))
        }
    }

    fn operand(&self, arg: &str) -> Result<Operand, SemanticError> {
        match ArgKind::of(arg) {
            ArgKind::Immediate => {
                let token = &arg[1..];
                let value = self
                    .constant(token)
                    .ok_or_else(|| SemanticError::InvalidInteger(token.to_string()))?;
                Ok(Operand::Immediate(ranged(value, VALUE_BITS)?))
            }
            ArgKind::Register => Reg::parse(arg)
                .map(Operand::Register)
                .map_err(|_| SemanticError::UnknownVariable(arg.to_string())),
            ArgKind::Index => {
                let (name, index) = arg::split_index(arg)
                    .ok_or_else(|| SemanticError::InvalidIndex(arg.to_string()))?;
                let target = self.target(name)?;
                let index = self
                    .constant(index)
                    .ok_or_else(|| SemanticError::InvalidIndex(index.to_string()))?;
                Ok(Operand::Index(target, ranged(index, VALUE_BITS)?))
            }
            ArgKind::Variable => Ok(Operand::Direct(self.target(arg)?)),
            ArgKind::Integer | ArgKind::Str => Err(SemanticError::OperandTypes(arg.to_string())),
        }
    }

    fn instruction(&mut self, op: OpKind, args: &[String]) -> Result<(), SemanticError> {
        let operands = args
            .iter()
            .map(|a| self.operand(a))
            .collect::<Result<Vec<_>, _>>()?;

        // Operand words start right after the first word. Addresses past the
        // 16-bit space only follow an image the first pass already rejected.
        let mut addr = usize::from(BASE_ADDRESS) + self.code.len() + 1;
        for operand in &operands {
            if let (Some(name), Ok(addr)) = (operand.external(), u16::try_from(addr)) {
                self.externs.push(Record {
                    name: name.to_string(),
                    addr,
                });
            }
            addr += usize::from(operand.words());
        }
        self.code.extend(encode::instruction(op, &operands));
        Ok(())
    }

    fn data(&mut self, args: &[String]) -> Result<(), SemanticError> {
        let values = args
            .iter()
            .map(|a| {
                let value = self
                    .constant(a)
                    .ok_or_else(|| SemanticError::InvalidInteger(a.to_string()))?;
                ranged(value, WORD_BITS)
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.data.extend(encode::data(&values));
        Ok(())
    }

    fn string(&mut self, arg: &str) -> Result<(), SemanticError> {
        let body = arg::string_body(arg)
            .ok_or_else(|| SemanticError::OperandTypes(Directive::Str.to_string()))?;
        for c in body.chars() {
            ranged(c as i32, WORD_BITS)?;
        }
        self.data.extend(encode::string(body));
        Ok(())
    }

    fn entry(&mut self, name: &str) -> Result<(), SemanticError> {
        let addr = self
            .symbols
            .addr(name)
            .ok_or_else(|| SemanticError::UndefinedEntry(name.to_string()))?;
        if !self.entries.iter().any(|r| r.name == name) {
            self.entries.push(Record {
                name: name.to_string(),
                addr,
            });
        }
        Ok(())
    }
}

/// Resolves symbols and encodes the object image.
/// Lines rejected by the first pass are skipped without a second report.
/// Returns `None` if the report holds any error.
pub fn second_pass(src: &Expanded, symbols: &Symbols, report: &mut Report) -> Option<Output> {
    let mut pass = Pass::new(symbols);

    for source in src.lines() {
        let line = source.line;
        let Some(sentence) = Sentence::parse(&source.text) else {
            continue;
        };
        if sentence.op == DEFINE {
            pass.define(&sentence, line, report);
            continue;
        }
        if sentence.err.is_some() {
            continue;
        }
        let Ok(op) = validate::check(&sentence) else {
            continue;
        };

        // Rejected label definitions take no space in the first pass.
        if let Some(name) = &sentence.label {
            let labeled = matches!(
                op,
                Operation::Inst(_) | Operation::Directive(Directive::Data | Directive::Str)
            );
            if labeled && symbols.label(name).map(|l| l.line) != Some(line) {
                continue;
            }
        }

        let args = &sentence.args;
        let result = match op {
            Operation::Inst(op) => pass.instruction(op, args),
            Operation::Directive(Directive::Data) => pass.data(args),
            Operation::Directive(Directive::Str) => pass.string(&args[0]),
            // Already reported as an extern in the first pass.
            Operation::Directive(Directive::Entry) if symbols.is_extern(&args[0]) => Ok(()),
            Operation::Directive(Directive::Entry) => pass.entry(&args[0]),
            Operation::Directive(Directive::Extern | Directive::Define) => Ok(()),
        };
        if let Err(err) = result {
            report.error(line, err);
        }
    }

    tracing::debug!(
        code = pass.code.len(),
        data = pass.data.len(),
        defines = pass.defines.iter().count(),
        entries = pass.entries.len(),
        externs = pass.externs.len(),
        "second pass"
    );
    if report.has_error() {
        return None;
    }
    Some(Output {
        object: Object {
            code: pass.code,
            data: pass.data,
        },
        entries: pass.entries,
        externs: pass.externs,
    })
}
