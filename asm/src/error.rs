use color_print::cprintln;
use thiserror::Error;

// ----------------------------------------------------------------------------
// Error taxonomy

/// Malformed token structure on a single line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("`:` must be attached to the end of the label")]
    DetachedColon,

    #[error("Unclosed square brackets")]
    UnclosedBracket,

    #[error("Unclosed quotes")]
    UnclosedQuote,

    #[error("Missing comma between arguments")]
    MissingComma,

    #[error("Empty argument")]
    EmptyArgument,

    #[error("Invalid .define statement, expected `.define <name> = <value>`")]
    MalformedDefine,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MacroError {
    #[error("Missing macro name")]
    MissingName,

    #[error("Too many arguments (1 argument expected)")]
    TooManyNames,

    #[error("Too many arguments (0 arguments expected)")]
    EndArguments,

    #[error("Line length {0} exceeds {max} chars", max = crate::macros::MAX_LINE_LENGTH)]
    LineTooLong(usize),

    #[error("Invalid macro name: `{0}`")]
    InvalidName(String),

    #[error("Macro name is a reserved word: `{0}`")]
    ReservedName(String),

    #[error("Re-defined macro: `{0}`")]
    Redefined(String),

    #[error("Macro `{0}` is never closed with `endmcr`")]
    Unclosed(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SemanticError {
    #[error("Label is a reserved word: `{0}`")]
    ReservedLabel(String),

    #[error("Invalid name `{0}`: must start with a latin letter and consist of latin letters or digits (max {max} chars)", max = crate::validate::MAX_NAME_LENGTH)]
    InvalidName(String),

    #[error("Missing operation after label")]
    MissingOperation,

    #[error("Unknown operation: `{0}`")]
    UnknownOperation(String),

    #[error("Incorrect amount of arguments for `{0}`")]
    ArgumentCount(String),

    #[error("Invalid argument types for `{0}`")]
    OperandTypes(String),

    #[error("Re-defined label: `{0}`")]
    DuplicateLabel(String),

    #[error("`{0}` can't be both extern and label")]
    ExternAndLabel(String),

    #[error("`{0}` can't be both extern and entry")]
    ExternAndEntry(String),

    #[error("Cannot use .entry on an undefined label: `{0}`")]
    UndefinedEntry(String),

    #[error("Unknown variable: `{0}`")]
    UnknownVariable(String),

    #[error("Invalid integer: `{0}`")]
    InvalidInteger(String),

    #[error("Invalid index: `{0}`")]
    InvalidIndex(String),

    #[error("Value {0} does not fit in {1} bits")]
    OutOfRange(i32, u32),

    #[error("Reserved words can't be defined: `{0}`")]
    ReservedDefine(String),

    #[error("The defined value must be an integer: `{0}`")]
    DefineValue(String),

    #[error("Re-defined constant: `{0}`")]
    DuplicateDefine(String),

    #[error("`{0}` is already a label or extern and can't be defined")]
    DefineConflict(String),

    #[error("Labels are not allowed on .define statements")]
    LabelOnDefine,

    #[error("Program image exceeds {max} words", max = crate::first_pass::MAX_IMAGE_WORDS)]
    ImageTooLarge,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    #[error("Label ignored when put on `{0}` lines")]
    LabelIgnored(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Macro(#[from] MacroError),

    #[error(transparent)]
    Semantic(#[from] SemanticError),

    #[error("Failed to open file: {0}")]
    FileOpen(String, #[source] std::io::Error),

    #[error("Failed to create file: {0}")]
    FileCreate(String, #[source] std::io::Error),
}

// ----------------------------------------------------------------------------
// Diagnostics

#[derive(Debug)]
pub enum Msg {
    Error(Error),
    Warn(Warning),
}

/// A message attached to a line of the `.as` file (1-based).
#[derive(Debug)]
pub struct Diag {
    pub line: usize,
    pub msg: Msg,
}

impl Diag {
    /// Print with the offending source line, rustc style.
    pub fn print(&self, file: &str, src: &str) {
        match &self.msg {
            Msg::Error(err) => cprintln!("<red,bold>error</>: {}", err),
            Msg::Warn(warn) => cprintln!("<yellow,bold>warn</>: {}", warn),
        }
        let raw = src
            .lines()
            .nth(self.line.saturating_sub(1))
            .unwrap_or("");
        cprintln!("     <blue>--></> <underline>{}:{}</>", file, self.line);
        cprintln!("      <blue>|</>");
        cprintln!(" <blue>{:>4} |</> {}", self.line, raw);
        cprintln!("      <blue>|</>");
    }
}

/// Everything one compilation has to say, in the order it was found.
#[derive(Debug, Default)]
pub struct Report {
    diags: Vec<Diag>,
}

impl Report {
    pub fn new() -> Self {
        Report { diags: vec![] }
    }

    pub fn error(&mut self, line: usize, err: impl Into<Error>) {
        let err = err.into();
        tracing::debug!(line, %err, "error");
        self.diags.push(Diag {
            line,
            msg: Msg::Error(err),
        });
    }

    pub fn warn(&mut self, line: usize, warn: Warning) {
        tracing::debug!(line, %warn, "warning");
        self.diags.push(Diag {
            line,
            msg: Msg::Warn(warn),
        });
    }

    pub fn has_error(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Error> {
        self.diags.iter().filter_map(|d| match &d.msg {
            Msg::Error(err) => Some(err),
            _ => None,
        })
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Warning> {
        self.diags.iter().filter_map(|d| match &d.msg {
            Msg::Warn(warn) => Some(warn),
            _ => None,
        })
    }

    pub fn diags(&self) -> &[Diag] {
        &self.diags
    }

    pub fn print(&self, file: &str, src: &str) {
        for diag in &self.diags {
            diag.print(file, src);
        }
    }
}
