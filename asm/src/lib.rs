pub mod arg;
pub mod encode;
pub mod error;
pub mod first_pass;
pub mod macros;
pub mod output;
pub mod second_pass;
pub mod sentence;
pub mod symbols;
pub mod validate;

pub use error::{Error, Report};
pub use first_pass::Counters;
pub use macros::Expanded;
pub use output::Output;
pub use symbols::Symbols;

/// Result of assembling one source file. Stages never share state across files.
#[derive(Debug)]
pub struct Compilation {
    /// `None` if preprocessing failed.
    pub expanded: Option<Expanded>,
    pub counters: Counters,
    pub symbols: Symbols,
    /// `None` if any stage reported an error.
    pub output: Option<Output>,
    pub report: Report,
}

pub fn compile(src: &str) -> Compilation {
    let mut report = Report::new();
    let Some(expanded) = macros::preprocess(src, &mut report) else {
        return Compilation {
            expanded: None,
            counters: Counters::default(),
            symbols: Symbols::new(),
            output: None,
            report,
        };
    };
    let (counters, symbols) = first_pass::first_pass(&expanded, &mut report);
    let output = second_pass::second_pass(&expanded, &symbols, &mut report);
    Compilation {
        expanded: Some(expanded),
        counters,
        symbols,
        output,
        report,
    }
}
