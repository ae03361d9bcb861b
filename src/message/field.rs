//! Composable validation for form fields.
//!
//! A `Field` holds a label, a value, and an ordered list of checks. The
//! first failing check supplies the problem message:
//!
//! ```
//! use packet_practice::message::field::Field;
//!
//! let problem = Field::new("Date", "13/01/2022").required().date().problem();
//! assert_eq!(
//!     problem.as_deref(),
//!     Some(r#"The "Date" field does not contain a valid date."#)
//! );
//! ```

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    pub static ref PIFO_DATE_RE: Regex =
        Regex::new(r"^(?:0[1-9]|1[012])/(?:0[1-9]|1[0-9]|2[0-9]|3[01])/[1-2][0-9][0-9][0-9]$")
            .unwrap();
    pub static ref PIFO_TIME_RE: Regex =
        Regex::new(r"^(?:([01][0-9]|2[0-3]):?[0-5][0-9]|2400|24:00)$").unwrap();
    static ref CALL_SIGN_RE: Regex = Regex::new(
        r"(?i)^(?:A[A-L][0-9][A-Z]{1,3}|[KNW][A-Z][0-9][A-Z]{1,3}|[KNW][0-9][A-Z]{2,3}|[A-Z][A-Z0-9]{5})$"
    )
    .unwrap();
}

type Check = Box<dyn Fn(&str, &str) -> Option<String> + Send + Sync>;

pub struct Field {
    label: String,
    value: String,
    checks: Vec<Check>,
}

impl Field {
    pub fn new(label: &str, value: &str) -> Self {
        Self {
            label: label.to_string(),
            value: value.to_string(),
            checks: Vec::new(),
        }
    }

    fn check(mut self, check: impl Fn(&str, &str) -> Option<String> + Send + Sync + 'static) -> Self {
        self.checks.push(Box::new(check));
        self
    }

    pub fn required(self) -> Self {
        self.check(|label, value| {
            value
                .is_empty()
                .then(|| format!(r#"The "{label}" field is required."#))
        })
    }

    /// The value, if present, must be one of `allowed`.
    pub fn one_of(self, allowed: &'static [&'static str]) -> Self {
        self.check(move |label, value| {
            (!value.is_empty() && !allowed.contains(&value))
                .then(|| format!(r#"The "{label}" field does not have a valid value."#))
        })
    }

    pub fn date(self) -> Self {
        self.check(|label, value| {
            (!value.is_empty() && !PIFO_DATE_RE.is_match(value))
                .then(|| format!(r#"The "{label}" field does not contain a valid date."#))
        })
    }

    pub fn time(self) -> Self {
        self.check(|label, value| {
            (!value.is_empty() && !PIFO_TIME_RE.is_match(value))
                .then(|| format!(r#"The "{label}" field does not contain a valid time."#))
        })
    }

    pub fn call_sign(self) -> Self {
        self.check(|label, value| {
            (!value.is_empty() && !CALL_SIGN_RE.is_match(value))
                .then(|| format!(r#"The "{label}" field does not contain a valid call sign."#))
        })
    }

    /// The value, if present, is only allowed when `allowed` holds.
    pub fn only_if(self, allowed: bool, message: &'static str) -> Self {
        self.check(move |_, value| (!value.is_empty() && !allowed).then(|| message.to_string()))
    }

    pub fn problem(&self) -> Option<String> {
        self.checks
            .iter()
            .find_map(|check| check(&self.label, &self.value))
    }
}

/// Collect the first problem of each field, in field order.
pub fn problems(fields: Vec<Field>) -> Vec<String> {
    fields.iter().filter_map(Field::problem).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required() {
        assert_eq!(
            Field::new("Subject", "").required().problem().unwrap(),
            r#"The "Subject" field is required."#
        );
        assert!(Field::new("Subject", "x").required().problem().is_none());
    }

    #[test]
    fn test_first_failure_wins() {
        let field = Field::new("Time", "").required().time();
        assert_eq!(field.problem().unwrap(), r#"The "Time" field is required."#);
        let field = Field::new("Time", "25:00").required().time();
        assert_eq!(
            field.problem().unwrap(),
            r#"The "Time" field does not contain a valid time."#
        );
    }

    #[test]
    fn test_empty_passes_format_checks() {
        assert!(Field::new("Date", "").date().time().call_sign().problem().is_none());
        assert!(Field::new("Reply", "").one_of(&["Yes", "No"]).problem().is_none());
    }

    #[test]
    fn test_formats() {
        assert!(Field::new("Date", "01/11/2022").date().problem().is_none());
        assert!(Field::new("Date", "1/11/2022").date().problem().is_some());
        assert!(Field::new("Time", "1930").time().problem().is_none());
        assert!(Field::new("Time", "24:00").time().problem().is_none());
        assert!(Field::new("Call", "k6abc").call_sign().problem().is_none());
        assert!(Field::new("Call", "K6").call_sign().problem().is_some());
        assert!(Field::new("Reply", "Maybe").one_of(&["Yes", "No"]).problem().is_some());
    }

    #[test]
    fn test_only_if() {
        let msg = r#"The "Reply By" field is not allowed unless "Reply" is "Yes"."#;
        assert_eq!(
            Field::new("Reply By", "1700").only_if(false, msg).problem().unwrap(),
            msg
        );
        assert!(Field::new("Reply By", "1700").only_if(true, msg).problem().is_none());
    }

    #[test]
    fn test_collect_problems() {
        let found = problems(vec![
            Field::new("A", "").required(),
            Field::new("B", "ok").required(),
            Field::new("C", "x").date(),
        ]);
        assert_eq!(found.len(), 2);
    }
}
