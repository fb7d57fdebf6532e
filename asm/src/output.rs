use std::fmt::{self, Write};

use arch::{word::BASE_ADDRESS, Are, Word};
use color_print::cformat;

use crate::symbols::Symbols;

/// Width of the name column in `.ent` and `.ext` files.
const NAME_COLUMN: usize = 10;

/// A line of the entries or externs file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub name: String,
    pub addr: u16,
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.len() < NAME_COLUMN {
            write!(f, "{:<width$}{:04}", self.name, self.addr, width = NAME_COLUMN)
        } else {
            write!(f, "{} {:04}", self.name, self.addr)
        }
    }
}

/// Code image followed by data image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Object {
    pub code: Vec<Word>,
    pub data: Vec<Word>,
}

impl Object {
    pub fn ic(&self) -> usize {
        self.code.len()
    }

    pub fn dc(&self) -> usize {
        self.data.len()
    }

    /// Every word with its load address.
    pub fn words(&self) -> impl Iterator<Item = (u16, Word)> + '_ {
        self.code
            .iter()
            .chain(&self.data)
            .enumerate()
            .map(|(i, word)| (BASE_ADDRESS + i as u16, *word))
    }

    /// Contents of the `.ob` file.
    pub fn to_text(&self) -> String {
        let mut text = format!("  {} {}\n", self.ic(), self.dc());
        for (addr, word) in self.words() {
            let _ = writeln!(text, "{:04} {}", addr, word);
        }
        text
    }
}

/// Everything written for a successful compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    pub object: Object,
    pub entries: Vec<Record>,
    pub externs: Vec<Record>,
}

fn records_text(records: &[Record]) -> Option<String> {
    if records.is_empty() {
        return None;
    }
    Some(records.iter().map(|r| format!("{r}\n")).collect())
}

impl Output {
    pub fn object_text(&self) -> String {
        self.object.to_text()
    }

    /// `None` when there is nothing to write.
    pub fn entries_text(&self) -> Option<String> {
        records_text(&self.entries)
    }

    /// `None` when there is nothing to write.
    pub fn externs_text(&self) -> Option<String> {
        records_text(&self.externs)
    }
}

/// Width of the dump frame right of the address column.
const FRAME_WIDTH: usize = 46;

/// Frame line of the dump, with an optional section title.
fn frame(title: &str) -> String {
    let lead = if title.is_empty() { "" } else { "------" };
    let fill = FRAME_WIDTH.saturating_sub(lead.len() + title.len());
    format!("{}+{}{}{}", "-".repeat(7), lead, title, "-".repeat(fill))
}

/// Colored listing of the object image, with the labels defined at each address.
pub fn print_dump(path: &str, output: &Output, symbols: &Symbols) {
    let section = |name: &str| println!("{}", frame(&format!("[{}:{}]", path, name)));

    let code_end = BASE_ADDRESS as usize + output.object.ic();
    for (addr, word) in output.object.words() {
        if addr == BASE_ADDRESS {
            section("code");
        }
        if addr as usize == code_end {
            section("data");
        }
        let labels: Vec<&str> = symbols
            .labels()
            .filter(|(_, label)| label.addr == addr)
            .map(|(name, _)| name)
            .collect();
        let labels = if labels.is_empty() {
            String::new()
        } else {
            cformat!("<g>{}:</>", labels.join(", "))
        };
        let external = match word.are() {
            Some(Are::External) => cformat!(" <m>extern</>"),
            _ => String::new(),
        };
        println!(
            "[{:04}] | {} {}{} {}",
            addr,
            word.cformat(),
            word,
            external,
            labels
        );
    }
    println!("{}", frame(""));
    for record in &output.entries {
        println!("{}", cformat!("<c>.entry</>  {}", record));
    }
    for record in &output.externs {
        println!("{}", cformat!("<y>.extern</> {}", record));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::expect;

    #[test]
    fn record_padding() {
        let record = |name: &str| Record {
            name: name.to_string(),
            addr: 101,
        };
        assert_eq!(record("X").to_string(), "X         0101");
        assert_eq!(record("LENGTH123").to_string(), "LENGTH123 0101");
        assert_eq!(record("LENGTH1234").to_string(), "LENGTH1234 0101");
        assert_eq!(record("AVERYLONGNAME").to_string(), "AVERYLONGNAME 0101");
    }

    #[test]
    fn object_text() {
        let object = Object {
            code: vec![Word::new(0b1111_00_00_00)],
            data: vec![Word::data(5), Word::data(-1)],
        };
        expect![[r#"
              1 2
            0100 **!!***
            0101 *****##
            0102 !!!!!!!
        "#]]
        .assert_eq(&object.to_text());
    }

    #[test]
    fn dump_frame() {
        assert_eq!(frame(""), format!("-------+{}", "-".repeat(46)));
        assert_eq!(frame("[a:code]").len(), frame("").len());
        assert_eq!(frame(&format!("[{}:code]", "x".repeat(50))).len(), 8 + 6 + 58);
    }

    #[test]
    fn empty_records_are_not_written() {
        let output = Output {
            object: Object {
                code: vec![],
                data: vec![],
            },
            entries: vec![],
            externs: vec![Record {
                name: "W".into(),
                addr: 105,
            }],
        };
        assert_eq!(output.object_text(), "  0 0\n");
        assert_eq!(output.entries_text(), None);
        assert_eq!(output.externs_text().as_deref(), Some("W         0105\n"));
    }
}
