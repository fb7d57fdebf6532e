use arch::{word::BASE_ADDRESS, Mode};

use crate::{
    arg::{self, ArgKind},
    error::{Report, SemanticError, Warning},
    macros::Expanded,
    sentence::{Sentence, DEFINE},
    symbols::{Label, LabelKind, Symbols},
    validate::{self, Directive, Operation},
};

/// Code and data words that fit between the base address and the end of the
/// 16-bit address space.
pub const MAX_IMAGE_WORDS: usize = u16::MAX as usize + 1 - BASE_ADDRESS as usize;

/// Instruction and data counters. Their final values form the object header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Counters {
    pub ic: u16,
    pub dc: u16,
}

/// Addressing modes of validated instruction operands.
pub fn operand_modes(args: &[String]) -> Vec<Mode> {
    args.iter().filter_map(|a| ArgKind::of(a).mode()).collect()
}

/// Words taken by an instruction, first word included.
pub fn instruction_words(modes: &[Mode]) -> u16 {
    match modes {
        [Mode::Register, Mode::Register] => 2,
        _ => 1 + modes.iter().map(|m| m.cost()).sum::<u16>(),
    }
}

/// Words taken by a `.data` or `.string` directive.
pub fn data_words(directive: Directive, args: &[String]) -> u16 {
    match directive {
        Directive::Str => args
            .first()
            .and_then(|a| arg::string_body(a))
            .map_or(0, |body| body.chars().count() as u16 + 1),
        _ => args.len() as u16,
    }
}

/// Collects labels, externs and entries, and sizes the code and data images.
/// Labels are relocated before returning: data after code, base address 100.
pub fn first_pass(src: &Expanded, report: &mut Report) -> (Counters, Symbols) {
    let mut counters = Counters::default();
    let mut symbols = Symbols::new();
    let mut oversize = false;

    for source in src.lines() {
        let line = source.line;
        let Some(sentence) = Sentence::parse(&source.text) else {
            continue;
        };
        if sentence.op == DEFINE {
            continue;
        }
        if let Some(err) = sentence.err.clone() {
            report.error(line, err);
            continue;
        }
        let op = match validate::check(&sentence) {
            Ok(op) => op,
            Err(err) => {
                report.error(line, err);
                continue;
            }
        };

        let Sentence { label, args, .. } = sentence;
        let (kind, words) = match op {
            Operation::Directive(d @ (Directive::Entry | Directive::Extern)) => {
                if label.is_some() {
                    report.warn(line, Warning::LabelIgnored(d.to_string()));
                }
                let declared = match d {
                    Directive::Entry => symbols.declare_entry(&args[0]),
                    _ => symbols.declare_extern(&args[0]),
                };
                if let Err(err) = declared {
                    report.error(line, err);
                }
                continue;
            }
            Operation::Directive(Directive::Define) => continue,
            Operation::Directive(Directive::Data) => {
                (LabelKind::Data, data_words(Directive::Data, &args))
            }
            Operation::Directive(d) => (LabelKind::Str, data_words(d, &args)),
            Operation::Inst(_) => {
                (LabelKind::Inst, instruction_words(&operand_modes(&args)))
            }
        };

        if counters.ic as usize + counters.dc as usize + words as usize > MAX_IMAGE_WORDS {
            if !oversize {
                report.error(line, SemanticError::ImageTooLarge);
                oversize = true;
            }
            continue;
        }
        let counter = match kind {
            LabelKind::Inst => &mut counters.ic,
            LabelKind::Data | LabelKind::Str => &mut counters.dc,
        };
        let addr = *counter;
        tracing::trace!(line, ?kind, addr, words, "sized");

        if let Some(name) = label {
            if let Err(err) = symbols.define_label(&name, Label { addr, kind, line }) {
                report.error(line, err);
                continue;
            }
        }
        *counter += words;
    }

    symbols.relocate(counters.ic);
    tracing::debug!(
        ic = counters.ic,
        dc = counters.dc,
        labels = symbols.labels().count(),
        externs = symbols.externs().count(),
        entries = symbols.entries().count(),
        "first pass"
    );
    (counters, symbols)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::macros::preprocess;

    fn run(src: &str) -> (Counters, Symbols, Report) {
        let mut report = Report::new();
        let expanded = preprocess(src, &mut report).expect("preprocess");
        let (counters, symbols) = first_pass(&expanded, &mut report);
        (counters, symbols, report)
    }

    fn args(line: &str) -> Vec<String> {
        Sentence::parse(line).expect("not blank").args
    }

    macro_rules! test_words {
        ($($name:ident: $line:expr => $words:expr,)*) => {
            $(
                #[test]
                fn $name() {
                    assert_eq!(instruction_words(&operand_modes(&args($line))), $words);
                }
            )*
        }
    }

    test_words! {
        words_none: "hlt" => 1,
        words_register: "inc r1" => 2,
        words_direct: "inc X" => 2,
        words_index: "inc X[1]" => 3,
        words_two_registers: "mov r1, r2" => 2,
        words_imm_register: "mov #1, r2" => 3,
        words_index_index: "cmp X[1], Y[2]" => 5,
        words_index_register: "mov X[sz], r2" => 4,
    }

    #[test]
    fn data_footprint() {
        assert_eq!(data_words(Directive::Data, &args(".data 1, 2, 3")), 3);
        assert_eq!(data_words(Directive::Str, &args(".string \"abcd\"")), 5);
        assert_eq!(data_words(Directive::Str, &args(".string \"\"")), 1);
    }

    #[test]
    fn label_addresses() {
        let (counters, symbols, report) = run("\
MAIN: mov r1, r2
LOOP: inc LIST[1]
LIST: .data 5, 6
STR:  .string \"ab\"
      hlt
");
        assert!(!report.has_error());
        assert_eq!(counters, Counters { ic: 6, dc: 5 });
        assert_eq!(symbols.addr("MAIN"), Some(100));
        assert_eq!(symbols.addr("LOOP"), Some(102));
        assert_eq!(symbols.addr("LIST"), Some(106));
        assert_eq!(symbols.addr("STR"), Some(108));
        assert_eq!(symbols.label("STR").map(|l| l.line), Some(4));
    }

    #[test]
    fn linkage_declarations() {
        let (counters, symbols, report) = run("\
L: .extern X
.entry MAIN
.entry MAIN
MAIN: jmp X
");
        assert!(!report.has_error());
        assert_eq!(report.warnings().count(), 1);
        assert_eq!(counters.ic, 2);
        assert!(symbols.is_extern("X"));
        assert_eq!(symbols.addr("L"), None);
        assert_eq!(symbols.entries().collect::<Vec<_>>(), ["MAIN"]);
    }

    #[test]
    fn errors_are_fail_soft() {
        let (counters, symbols, report) = run("\
mov #5
A: hlt
A: hlt
.extern A
B: rts
");
        let errors: Vec<String> = report.errors().map(|e| e.to_string()).collect();
        assert_eq!(
            errors,
            [
                SemanticError::ArgumentCount("mov".into()).to_string(),
                SemanticError::DuplicateLabel("A".into()).to_string(),
                SemanticError::ExternAndLabel("A".into()).to_string(),
            ]
        );
        assert_eq!(report.diags()[1].line, 3);
        assert_eq!(counters.ic, 2);
        assert_eq!(symbols.addr("B"), Some(101));
    }

    #[test]
    fn rejected_label_takes_no_space() {
        let (counters, symbols, report) = run("A: hlt\nA: mov #1, r2\nB: hlt\n");
        assert_eq!(report.errors().count(), 1);
        assert_eq!(counters.ic, 2);
        assert_eq!(symbols.addr("A"), Some(100));
        assert_eq!(symbols.addr("B"), Some(101));
    }

    #[test]
    fn oversize_image_is_reported_once() {
        let line = format!(".string \"{}\"\n", "a".repeat(60));
        let (counters, _, report) = run(&line.repeat(1200));
        let errors: Vec<String> = report.errors().map(|e| e.to_string()).collect();
        assert_eq!(errors, [SemanticError::ImageTooLarge.to_string()]);
        assert_eq!(report.diags()[0].line, 1073);
        assert!(counters.dc as usize <= MAX_IMAGE_WORDS);
    }

    #[test]
    fn defines_are_skipped() {
        let (counters, symbols, report) = run(".define sz = 2\nhlt\n");
        assert!(!report.has_error());
        assert_eq!(counters.ic, 1);
        assert_eq!(symbols.labels().count(), 0);
    }
}
