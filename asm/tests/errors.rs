use asm14::{
    compile,
    error::{Diag, LexError, MacroError, Msg, SemanticError, Warning},
};

fn show(diag: &Diag) -> (usize, String) {
    let msg = match &diag.msg {
        Msg::Error(err) => format!("error: {err}"),
        Msg::Warn(warn) => format!("warn: {warn}"),
    };
    (diag.line, msg)
}

fn error(line: usize, err: impl ToString) -> (usize, String) {
    (line, format!("error: {}", err.to_string()))
}

fn warn(line: usize, warn: Warning) -> (usize, String) {
    (line, format!("warn: {warn}"))
}

macro_rules! case {
    ($($name:ident: $src:expr => [$($diag:expr),* $(,)?],)*) => {
        $(
            #[test]
            fn $name() {
                let compilation = compile($src);
                let diags: Vec<_> = compilation.report.diags().iter().map(show).collect();
                assert_eq!(diags, vec![$($diag),*]);
                assert!(compilation.output.is_none());
            }
        )*
    }
}

case! {
    missing_operand: "mov #5\n" => [
        error(1, SemanticError::ArgumentCount("mov".into())),
    ],
    detached_colon: "hlt\nMAIN : hlt\n" => [
        error(2, LexError::DetachedColon),
    ],
    unclosed_bracket: "inc A[1\n" => [
        error(1, LexError::UnclosedBracket),
    ],
    line_too_long: &format!("hlt\n\nprn #{}\n", "9".repeat(80)) => [
        error(3, MacroError::LineTooLong(85)),
    ],
    error_in_macro_body: "mcr BAD\nmov #1\nendmcr\nhlt\nBAD\n" => [
        error(2, SemanticError::ArgumentCount("mov".into())),
    ],
    unclosed_macro: "hlt\nmcr M\nhlt\n" => [
        error(2, MacroError::Unclosed("M".into())),
    ],
    extern_and_entry: ".extern X\n.entry X\n" => [
        error(2, SemanticError::ExternAndEntry("X".into())),
    ],
    label_on_extern_and_error: "L: .extern X\nX: hlt\n" => [
        warn(1, Warning::LabelIgnored(".extern".into())),
        error(2, SemanticError::ExternAndLabel("X".into())),
    ],
    errors_in_both_passes: "mov r1 r2\nA: hlt\nA: hlt\njmp B\n.data 99999\n" => [
        error(1, LexError::MissingComma),
        error(3, SemanticError::DuplicateLabel("A".into())),
        error(4, SemanticError::UnknownVariable("B".into())),
        error(5, SemanticError::OutOfRange(99999, 14)),
    ],
    label_on_define: "sz: .define sz = 1\n" => [
        warn(1, Warning::LabelIgnored(".define".into())),
        error(1, SemanticError::LabelOnDefine),
    ],
    unknown_operation: "jst LOOP\n" => [
        error(1, SemanticError::UnknownOperation("jst".into())),
    ],
}

#[test]
fn warnings_do_not_block_output() {
    let compilation = compile("X: .entry MAIN\nMAIN: hlt\n");
    assert_eq!(compilation.report.warnings().count(), 1);
    assert!(!compilation.report.has_error());
    let output = compilation.output.expect("output");
    assert_eq!(output.entries_text().as_deref(), Some("MAIN      0100\n"));
}

#[test]
fn failed_preprocessing_stops_the_pipeline() {
    let compilation = compile("mcr mov\nhlt\nendmcr\njmp NOWHERE\n");
    assert!(compilation.expanded.is_none());
    assert!(compilation.output.is_none());
    assert_eq!(compilation.report.errors().count(), 1);
    assert_eq!(compilation.symbols.labels().count(), 0);
}
