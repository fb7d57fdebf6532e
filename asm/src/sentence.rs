use crate::error::LexError;

pub const DEFINE: &str = ".define";

// ----------------------------------------------------------------------------
// Sentence

/// One source line split into label, operation and raw argument tokens.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sentence {
    pub label: Option<String>,
    pub op: String,
    pub args: Vec<String>,
    pub err: Option<LexError>,
}

fn is_ws(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

fn skip_ws(s: &str) -> &str {
    s.trim_start_matches(is_ws)
}

pub fn is_blank(line: &str) -> bool {
    let line = skip_ws(line);
    line.is_empty() || line.starts_with(';')
}

/// Position of the first `:` outside a quoted string.
fn label_colon(line: &str) -> Option<usize> {
    let mut quoted = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => quoted = !quoted,
            ':' if !quoted => return Some(i),
            _ => {}
        }
    }
    None
}

impl Sentence {
    /// Returns `None` for blank and comment lines.
    pub fn parse(line: &str) -> Option<Sentence> {
        if is_blank(line) {
            return None;
        }
        if label_colon(line).is_none() {
            return Some(Self::parse_body(line));
        }

        let rest = skip_ws(line);
        let end = rest.find(|c: char| is_ws(c) || c == ':').unwrap_or(rest.len());
        let (label, after) = rest.split_at(end);
        let detached = !after.starts_with(':');
        let body = match after.find(':') {
            Some(colon) => &after[colon + 1..],
            None => "",
        };

        let mut sentence = Self::parse_body(body);
        sentence.label = Some(label.to_string());
        if detached {
            sentence.err = Some(LexError::DetachedColon);
        }
        Some(sentence)
    }

    fn parse_body(line: &str) -> Sentence {
        let line = skip_ws(line);
        let end = line.find(is_ws).unwrap_or(line.len());
        let (op, rest) = line.split_at(end);

        let mut sentence = Sentence {
            op: op.to_string(),
            ..Default::default()
        };
        let parsed = if op == DEFINE {
            parse_define(rest).map(|(name, value)| vec![name, value])
        } else {
            parse_args(rest)
        };
        match parsed {
            Ok(args) => sentence.args = args,
            Err(err) => sentence.err = Some(err),
        }
        sentence
    }
}

// ----------------------------------------------------------------------------
// Arguments

fn parse_args(rest: &str) -> Result<Vec<String>, LexError> {
    let mut args = vec![];
    let mut rest = skip_ws(rest);
    if rest.is_empty() {
        return Ok(args);
    }
    loop {
        let (arg, tail) = take_arg(skip_ws(rest))?;
        if arg.is_empty() {
            return Err(LexError::EmptyArgument);
        }
        args.push(arg.to_string());
        rest = skip_ws(tail);
        if rest.is_empty() {
            return Ok(args);
        }
        rest = rest.strip_prefix(',').ok_or(LexError::MissingComma)?;
    }
}

/// Splits off one argument token. Whitespace and commas inside `[...]` or
/// `"..."` belong to the token.
fn take_arg(s: &str) -> Result<(&str, &str), LexError> {
    let mut chars = s.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            ',' => return Ok(s.split_at(i)),
            c if is_ws(c) => return Ok(s.split_at(i)),
            '[' => loop {
                match chars.next() {
                    Some((_, ']')) => break,
                    Some(_) => {}
                    None => return Err(LexError::UnclosedBracket),
                }
            },
            '"' => loop {
                match chars.next() {
                    Some((_, '"')) => break,
                    Some(_) => {}
                    None => return Err(LexError::UnclosedQuote),
                }
            },
            _ => {}
        }
    }
    Ok((s, ""))
}

/// `<name> = <value>`
fn parse_define(rest: &str) -> Result<(String, String), LexError> {
    let word_end = |s: &str| s.find(|c: char| c == '=' || is_ws(c)).unwrap_or(s.len());

    let rest = skip_ws(rest);
    let (name, tail) = rest.split_at(word_end(rest));
    let tail = skip_ws(tail)
        .strip_prefix('=')
        .ok_or(LexError::MalformedDefine)?;
    let tail = skip_ws(tail);
    let (value, tail) = tail.split_at(word_end(tail));

    if name.is_empty() || value.is_empty() || !skip_ws(tail).is_empty() {
        return Err(LexError::MalformedDefine);
    }
    Ok((name.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Sentence {
        Sentence::parse(line).expect("not blank")
    }

    fn args(s: &Sentence) -> Vec<&str> {
        s.args.iter().map(String::as_str).collect()
    }

    #[test]
    fn blank_lines() {
        assert_eq!(Sentence::parse(""), None);
        assert_eq!(Sentence::parse("   \t "), None);
        assert_eq!(Sentence::parse("; comment"), None);
        assert_eq!(Sentence::parse("   ;mov r1, r2"), None);
        assert_eq!(Sentence::parse("\r"), None);
    }

    #[test]
    fn instruction() {
        let s = parse("  mov  #-5 , r2");
        assert_eq!(s.label, None);
        assert_eq!(s.op, "mov");
        assert_eq!(args(&s), ["#-5", "r2"]);
        assert_eq!(s.err, None);
    }

    #[test]
    fn no_arguments() {
        let s = parse("hlt");
        assert_eq!(s.op, "hlt");
        assert!(s.args.is_empty());
        assert_eq!(s.err, None);
    }

    #[test]
    fn label() {
        let s = parse("MAIN: add r1,LIST[2]");
        assert_eq!(s.label.as_deref(), Some("MAIN"));
        assert_eq!(s.op, "add");
        assert_eq!(args(&s), ["r1", "LIST[2]"]);
        assert_eq!(s.err, None);
    }

    #[test]
    fn detached_colon() {
        let s = parse("MAIN : hlt");
        assert_eq!(s.label.as_deref(), Some("MAIN"));
        assert_eq!(s.op, "hlt");
        assert_eq!(s.err, Some(LexError::DetachedColon));
    }

    #[test]
    fn colon_inside_string_is_not_a_label() {
        let s = parse(".string \"a:b\"");
        assert_eq!(s.label, None);
        assert_eq!(args(&s), ["\"a:b\""]);
    }

    #[test]
    fn brackets_and_quotes_keep_whitespace() {
        let s = parse("STR: .string \"hello, world\"");
        assert_eq!(args(&s), ["\"hello, world\""]);
        let s = parse("inc x[ 1 ]");
        assert_eq!(args(&s), ["x[ 1 ]"]);
    }

    #[test]
    fn unclosed() {
        assert_eq!(parse("inc x[1").err, Some(LexError::UnclosedBracket));
        assert_eq!(
            parse(".string \"abc").err,
            Some(LexError::UnclosedQuote)
        );
    }

    #[test]
    fn missing_comma() {
        let s = parse("mov r1 r2");
        assert_eq!(s.err, Some(LexError::MissingComma));
    }

    #[test]
    fn empty_argument() {
        assert_eq!(parse("mov r1,").err, Some(LexError::EmptyArgument));
        assert_eq!(parse("mov ,r1").err, Some(LexError::EmptyArgument));
    }

    #[test]
    fn data_list() {
        let s = parse("LIST: .data 6, -9,+15 ,len");
        assert_eq!(s.op, ".data");
        assert_eq!(args(&s), ["6", "-9", "+15", "len"]);
    }

    #[test]
    fn define() {
        let s = parse(".define sz = 2");
        assert_eq!(s.op, ".define");
        assert_eq!(args(&s), ["sz", "2"]);
        let s = parse(".define len=-4");
        assert_eq!(args(&s), ["len", "-4"]);
    }

    #[test]
    fn malformed_define() {
        for line in [
            ".define sz 2",
            ".define sz = 2 3",
            ".define = 2",
            ".define sz =",
            ".define sz = 2 = 3",
        ] {
            assert_eq!(parse(line).err, Some(LexError::MalformedDefine), "{line}");
        }
    }
}
