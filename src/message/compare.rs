//! Field-by-field comparison of a received message against an expected one.
//!
//! Each comparison yields a `CompareField` whose score lies in
//! `0..=out_of`. A perfect match scores `out_of`.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref DATE_RE: Regex = Regex::new(r"^(\d?\d)([-/.])(\d?\d)([-/.])(20)?(\d\d)$").unwrap();
    static ref TIME_RE: Regex = Regex::new(r"^(\d?\d)(:?)(\d\d)$").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareField {
    pub label: String,
    pub expected: String,
    pub actual: String,
    pub score: u32,
    pub out_of: u32,
}

impl CompareField {
    fn new(label: &str, expected: &str, actual: &str, score: u32, out_of: u32) -> Self {
        Self {
            label: label.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
            score,
            out_of,
        }
    }

    pub fn is_match(&self) -> bool {
        self.score == self.out_of
    }
}

pub fn compare_exact(label: &str, expected: &str, actual: &str) -> CompareField {
    let score = if expected == actual { 2 } else { 0 };
    CompareField::new(label, expected, actual, score, 2)
}

pub fn compare_checkbox(label: &str, expected: &str, actual: &str) -> CompareField {
    let checked = |v: &str| !v.is_empty() && v != "false";
    let score = if checked(expected) == checked(actual) { 2 } else { 0 };
    CompareField::new(label, expected, actual, score, 2)
}

/// Dates match fully when identical, partially when they differ only in
/// zero padding, separators, or a two-digit year.
pub fn compare_date(label: &str, expected: &str, actual: &str) -> CompareField {
    if expected == actual {
        return CompareField::new(label, expected, actual, 2, 2);
    }
    let score = match (DATE_RE.captures(expected), DATE_RE.captures(actual)) {
        (Some(e), Some(a)) => {
            let same_number = |i: usize| e[i].parse::<u32>().ok() == a[i].parse::<u32>().ok();
            if same_number(1) && same_number(3) && e[6] == a[6] {
                1
            } else {
                0
            }
        }
        _ => 0,
    };
    CompareField::new(label, expected, actual, score, 2)
}

/// Times match fully when identical, partially when they differ only in
/// zero padding or the colon.
pub fn compare_time(label: &str, expected: &str, actual: &str) -> CompareField {
    if expected == actual {
        return CompareField::new(label, expected, actual, 2, 2);
    }
    let score = match (TIME_RE.captures(expected), TIME_RE.captures(actual)) {
        (Some(e), Some(a)) if e[1].parse::<u32>().ok() == a[1].parse::<u32>().ok() && e[3] == a[3] => 1,
        _ => 0,
    };
    CompareField::new(label, expected, actual, score, 2)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Token<'a> {
    text: &'a str,
    /// Whitespace after the token: "", " ", "\n", or "\n\n".
    sep: &'static str,
}

fn split_tokens(s: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut rest = s.trim();
    while !rest.is_empty() {
        let end = rest.find([' ', '\n']).unwrap_or(rest.len());
        let (mut word, after) = rest.split_at(end);
        if word.len() > 1 && word.ends_with([',', ':', ';', '?', '!']) {
            let (head, punct) = word.split_at(word.len() - 1);
            tokens.push(Token { text: head, sep: "" });
            word = punct;
        }
        let next = after.find(|c| c != ' ' && c != '\n').unwrap_or(after.len());
        let gap = &after[..next];
        let sep = match gap.matches('\n').count() {
            _ if next == after.len() => "",
            0 => " ",
            1 => "\n",
            _ => "\n\n",
        };
        tokens.push(Token { text: word, sep });
        rest = &after[next..];
    }
    tokens
}

fn same_word(e: &str, a: &str) -> bool {
    e.eq_ignore_ascii_case(a)
}

/// Penalty for a pair of aligned tokens: 0 for a match, 1 for a spacing or
/// capitalization difference, 2 for a different word.
fn penalty(e: &Token<'_>, a: &Token<'_>) -> u32 {
    if !same_word(e.text, a.text) {
        2
    } else if e.sep != a.sep && !(e.sep == " " && a.sep == "\n") {
        1
    } else if e.text != a.text
        && e.text.to_lowercase() != a.text
        && e.text.to_uppercase() != a.text
    {
        1
    } else {
        0
    }
}

/// Loose comparison of free text. Each expected word is worth two points.
/// Words are aligned by a case-insensitive longest common subsequence, and
/// the score is reduced for changed words plus the larger of the added or
/// removed words.
pub fn compare_text(label: &str, expected: &str, actual: &str) -> CompareField {
    let et = split_tokens(expected);
    let at = split_tokens(actual);
    if et.is_empty() && at.is_empty() {
        return CompareField::new(label, expected, actual, 1, 1);
    }
    if et.is_empty() {
        return CompareField::new(label, expected, actual, 0, 1);
    }
    let out_of = 2 * et.len() as u32;
    if at.is_empty() {
        return CompareField::new(label, expected, actual, 0, out_of);
    }

    let mut lcs = vec![vec![0usize; at.len() + 1]; et.len() + 1];
    for i in 1..=et.len() {
        for j in 1..=at.len() {
            lcs[i][j] = if same_word(et[i - 1].text, at[j - 1].text) {
                lcs[i - 1][j - 1] + 1
            } else {
                lcs[i - 1][j].max(lcs[i][j - 1])
            };
        }
    }

    let (mut changed, mut removed, mut added) = (0u32, 0u32, 0u32);
    let (mut i, mut j) = (et.len(), at.len());
    while i > 0 || j > 0 {
        if i > 0 && j > 0 && same_word(et[i - 1].text, at[j - 1].text) {
            changed += penalty(&et[i - 1], &at[j - 1]);
            i -= 1;
            j -= 1;
        } else if j > 0 && (i == 0 || lcs[i][j - 1] > lcs[i - 1][j]) {
            added += 2;
            j -= 1;
        } else {
            removed += 2;
            i -= 1;
        }
    }
    let score = out_of.saturating_sub(changed + removed.max(added));
    CompareField::new(label, expected, actual, score, out_of)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_and_checkbox() {
        assert_eq!(compare_exact("Handling", "ROUTINE", "ROUTINE").score, 2);
        assert_eq!(compare_exact("Handling", "ROUTINE", "PRIORITY").score, 0);
        assert_eq!(compare_checkbox("FYI", "", "false").score, 2);
        assert_eq!(compare_checkbox("FYI", "checked", "").score, 0);
    }

    #[test]
    fn test_date_and_time() {
        assert_eq!(compare_date("Date", "01/11/2022", "01/11/2022").score, 2);
        assert_eq!(compare_date("Date", "01/11/2022", "1/11/22").score, 1);
        assert_eq!(compare_date("Date", "01/11/2022", "01/12/2022").score, 0);
        assert_eq!(compare_time("Time", "0930", "09:30").score, 1);
        assert_eq!(compare_time("Time", "0930", "0931").score, 0);
        assert_eq!(compare_time("Time", "", "0930").score, 0);
    }

    #[test]
    fn test_text_exact_match() {
        let c = compare_text("Message", "Send two pallets of water.", "Send two pallets of water.");
        assert_eq!(c.out_of, 10);
        assert!(c.is_match());
    }

    #[test]
    fn test_text_case_and_spacing() {
        // All upper case is an acceptable rendering.
        assert!(compare_text("Subject", "Water request", "WATER REQUEST").is_match());
        // Mixed case is a minor difference.
        assert_eq!(compare_text("Subject", "Water request", "WaTer request").score, 3);
        // A soft line break in place of a space is fine.
        assert!(compare_text("Message", "one two", "one\ntwo").is_match());
        // Extra spaces are collapsed.
        assert!(compare_text("Message", "one two", "one    two").is_match());
    }

    #[test]
    fn test_text_word_differences() {
        let c = compare_text("Message", "one two three", "one four three");
        assert_eq!((c.score, c.out_of), (4, 6));
        let c = compare_text("Message", "one two three", "one three");
        assert_eq!((c.score, c.out_of), (4, 6));
        let c = compare_text("Message", "one two", "");
        assert_eq!((c.score, c.out_of), (0, 4));
    }

    #[test]
    fn test_text_empties() {
        let c = compare_text("Reply By", "", "");
        assert_eq!((c.score, c.out_of), (1, 1));
        let c = compare_text("Reply By", "", "1700");
        assert_eq!((c.score, c.out_of), (0, 1));
    }

    #[test]
    fn test_split_tokens() {
        let tokens = split_tokens("Hello, world\n\nbye");
        let texts: Vec<&str> = tokens.iter().map(|t| t.text).collect();
        assert_eq!(texts, vec!["Hello", ",", "world", "bye"]);
        assert_eq!(tokens[2].sep, "\n\n");
        assert_eq!(tokens[3].sep, "");
    }
}
