//! Prose helpers for generated reports.

use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;

const WRAP_COLUMN: usize = 78;

lazy_static! {
    static ref SENTENCE_BREAK_RE: Regex = Regex::new(r"\.\s*\n\s*").unwrap();
    static ref LINE_BREAK_RE: Regex = Regex::new(r"\s*\n\s*").unwrap();
}

/// A rudimentary word wrapper. Text written to it is re-flowed at 78
/// columns. A line that starts with a space is emitted untouched, as is a
/// blank line. A paragraph ends at a blank line or at the start of an
/// indented line; single newlines inside a paragraph are joined.
#[derive(Debug, Default)]
pub struct Wrapper {
    out: String,
    held: String,
}

impl Wrapper {
    pub fn new() -> Self {
        Self::default()
    }

    fn flush_ready(&mut self) {
        while !self.held.is_empty() {
            if self.held.starts_with(['\n', ' ']) {
                let Some(idx) = self.held.find('\n') else {
                    break;
                };
                let line: String = self.held.drain(..=idx).collect();
                self.out.push_str(&line);
                continue;
            }
            let stop = match (self.held.find("\n\n"), self.held.find("\n ")) {
                (Some(a), Some(b)) => a.min(b),
                (Some(a), None) | (None, Some(a)) => a,
                (None, None) => break,
            };
            let paragraph: String = self.held.drain(..=stop).collect();
            self.wrap(&paragraph[..stop]);
        }
    }

    fn wrap(&mut self, text: &str) {
        let text = SENTENCE_BREAK_RE.replace_all(text, ".  ");
        let text = LINE_BREAK_RE.replace_all(&text, " ");
        let mut rest = text.trim();
        while rest.len() > WRAP_COLUMN {
            let idx = rest.as_bytes()[..WRAP_COLUMN]
                .iter()
                .rposition(|&c| c == b' ')
                .or_else(|| rest.find(' '))
                .unwrap_or(rest.len());
            self.out.push_str(rest[..idx].trim());
            self.out.push('\n');
            rest = rest[idx..].trim();
        }
        if !rest.is_empty() {
            self.out.push_str(rest);
            self.out.push('\n');
        }
    }

    /// Flush any partial paragraph and return the wrapped text.
    pub fn finish(mut self) -> String {
        if !self.held.is_empty() {
            let held = std::mem::take(&mut self.held);
            self.wrap(&held);
        }
        self.out
    }
}

impl fmt::Write for Wrapper {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.held.push_str(s);
        self.flush_ready();
        Ok(())
    }
}

/// Join items into an English list: "a", "a or b", "a, b, or c".
pub fn conjoin<S: AsRef<str>>(items: &[S], conjunction: &str) -> String {
    match items {
        [] => String::new(),
        [one] => one.as_ref().to_string(),
        [first, second] => format!("{} {conjunction} {}", first.as_ref(), second.as_ref()),
        [init @ .., last] => {
            let init: Vec<&str> = init.iter().map(AsRef::as_ref).collect();
            format!("{}, {conjunction} {}", init.join(", "), last.as_ref())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt::Write;

    fn wrapped(text: &str) -> String {
        let mut w = Wrapper::new();
        w.write_str(text).unwrap();
        w.finish()
    }

    #[test]
    fn test_short_paragraph_unchanged() {
        assert_eq!(wrapped("Hello there.\n"), "Hello there.\n");
    }

    #[test]
    fn test_long_paragraph_wraps_at_column() {
        let text = "word ".repeat(40);
        let out = wrapped(&text);
        assert!(out.lines().all(|l| l.len() <= 78));
        assert_eq!(out.split_whitespace().count(), 40);
    }

    #[test]
    fn test_joined_lines_and_sentence_spacing() {
        assert_eq!(wrapped("One.\nTwo\nthree.\n\n"), "One.  Two three.\n\n");
    }

    #[test]
    fn test_indented_lines_pass_through() {
        let text = "This message has\n    Subject: X\nbut should have\n    Subject: Y\nSee above.\n";
        assert_eq!(wrapped(text), text);
    }

    #[test]
    fn test_long_indented_line_not_wrapped() {
        let line = format!("    {}\n", "x".repeat(100));
        assert_eq!(wrapped(&format!("Intro\n{line}")), format!("Intro\n{line}"));
    }

    #[test]
    fn test_unbreakable_word() {
        let long = "y".repeat(90);
        assert_eq!(wrapped(&format!("{long} end")), format!("{long}\nend\n"));
    }

    #[test]
    fn test_paragraphs_across_writes() {
        let mut w = Wrapper::new();
        w.write_str("\nFirst paragraph\ncontinues.\n").unwrap();
        w.write_str("\nSecond.\n").unwrap();
        assert_eq!(w.finish(), "\nFirst paragraph continues.\n\nSecond.\n");
    }

    #[test]
    fn test_conjoin() {
        assert_eq!(conjoin::<&str>(&[], "or"), "");
        assert_eq!(conjoin(&["W4XSC"], "or"), "W4XSC");
        assert_eq!(conjoin(&["W4XSC", "W5XSC"], "or"), "W4XSC or W5XSC");
        assert_eq!(conjoin(&["a", "b", "c"], "and"), "a, b, and c");
    }
}
