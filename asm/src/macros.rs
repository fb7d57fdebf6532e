use std::fmt;

use indexmap::IndexMap;

use crate::{
    error::{MacroError, Report, Warning},
    sentence::Sentence,
    validate,
};

pub const MAX_LINE_LENGTH: usize = 80;
pub const MACRO_START: &str = "mcr";
pub const MACRO_END: &str = "endmcr";

/// A line of expanded source, tagged with the line of the `.as` file it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    pub line: usize,
    pub text: String,
}

/// Preprocessor output: macros expanded, blank and comment lines dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expanded {
    lines: Vec<SourceLine>,
}

impl Expanded {
    pub fn lines(&self) -> &[SourceLine] {
        &self.lines
    }

    /// Contents of the `.am` file.
    pub fn text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Expanded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{}", line.text)?;
        }
        Ok(())
    }
}

enum State {
    Normal,
    /// `name` is `None` when the `mcr` line was rejected; the body is then
    /// consumed and discarded.
    InMacro {
        name: Option<String>,
        line: usize,
        body: Vec<SourceLine>,
    },
}

/// `mcr` line: returns the macro name if it can be registered.
fn open_macro(
    sentence: &Sentence,
    line: usize,
    macros: &IndexMap<String, Vec<SourceLine>>,
    report: &mut Report,
) -> Option<String> {
    if sentence.label.is_some() {
        report.warn(line, Warning::LabelIgnored(MACRO_START.to_string()));
    }
    if let Some(err) = &sentence.err {
        report.error(line, err.clone());
        return None;
    }
    let name = match sentence.args.as_slice() {
        [] => Err(MacroError::MissingName),
        [name] if validate::is_reserved(name) => Err(MacroError::ReservedName(name.clone())),
        [name] if !validate::is_valid_name(name) => Err(MacroError::InvalidName(name.clone())),
        [name] if macros.contains_key(name) => Err(MacroError::Redefined(name.clone())),
        [name] => Ok(name.clone()),
        _ => Err(MacroError::TooManyNames),
    };
    name.map_err(|err| report.error(line, err)).ok()
}

/// `endmcr` line: whether it closes the macro cleanly.
fn close_macro(sentence: &Sentence, line: usize, report: &mut Report) -> bool {
    if sentence.label.is_some() {
        report.warn(line, Warning::LabelIgnored(MACRO_END.to_string()));
    }
    if let Some(err) = &sentence.err {
        report.error(line, err.clone());
        false
    } else if !sentence.args.is_empty() {
        report.error(line, MacroError::EndArguments);
        false
    } else {
        true
    }
}

/// Expands macros. Returns `None` if any error was reported.
pub fn preprocess(src: &str, report: &mut Report) -> Option<Expanded> {
    let mut failed = false;
    let mut macros: IndexMap<String, Vec<SourceLine>> = IndexMap::new();
    let mut lines = vec![];
    let mut state = State::Normal;

    for (idx, raw) in src.lines().enumerate() {
        let line = idx + 1;
        let Some(sentence) = Sentence::parse(raw) else {
            continue;
        };
        let len = raw.chars().count();
        if len > MAX_LINE_LENGTH {
            report.error(line, MacroError::LineTooLong(len));
            failed = true;
            continue;
        }

        state = match state {
            State::Normal if sentence.op == MACRO_START => {
                let name = open_macro(&sentence, line, &macros, report);
                failed |= name.is_none();
                State::InMacro {
                    name,
                    line,
                    body: vec![],
                }
            }
            State::Normal => {
                match macros.get(&sentence.op) {
                    Some(body) => {
                        if sentence.label.is_some() {
                            report.warn(line, Warning::LabelIgnored(sentence.op.clone()));
                        }
                        lines.extend(body.iter().cloned());
                    }
                    None => lines.push(SourceLine {
                        line,
                        text: raw.to_string(),
                    }),
                }
                State::Normal
            }
            State::InMacro { name, body, .. } if sentence.op == MACRO_END => {
                failed |= !close_macro(&sentence, line, report);
                if let Some(name) = name {
                    macros.insert(name, body);
                }
                State::Normal
            }
            State::InMacro {
                name,
                line: start,
                mut body,
            } => {
                body.push(SourceLine {
                    line,
                    text: raw.to_string(),
                });
                State::InMacro {
                    name,
                    line: start,
                    body,
                }
            }
        };
    }

    if let State::InMacro { name, line, .. } = state {
        failed = true;
        if let Some(name) = name {
            report.error(line, MacroError::Unclosed(name));
        }
    }

    tracing::debug!(macros = macros.len(), lines = lines.len(), failed, "preprocess");
    if failed {
        None
    } else {
        Some(Expanded { lines })
    }
}
