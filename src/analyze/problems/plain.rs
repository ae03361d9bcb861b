//! Subject line checks for messages that are not recognized forms.

use crate::analyze::problem::{Detection, Problem};
use crate::analyze::reference::Reference;
use crate::analyze::Analysis;

const HANDLING_ORDERS: [&str; 3] = ["ROUTINE", "PRIORITY", "IMMEDIATE"];

fn first_letter(s: &str) -> String {
    s.chars().take(1).collect()
}

pub(super) fn subject_format() -> Problem {
    Problem::human("SubjectFormat", "incorrect subject line format", |a: &Analysis| {
        if a.is_form() {
            Detection::NotApplicable
        } else if a.key.origin_msg_id.is_empty() {
            Detection::Fired("")
        } else {
            Detection::Clear
        }
    })
    .references(Reference::SUBJECT_LINE | Reference::WEEKLY_PRACTICE)
    .template(
        "The Subject line of this message does not have the correct format.  It \
         should have a message number, an underline, a handling order code, \
         another underline, and the subject text, like this:\n    \
         AAA-111P_R_Practice CallSign, FirstName, Jurisdiction, NetDate\n\
         Outpost generates the message number and handling order code when it \
         is configured correctly.",
    )
}

pub(super) fn handling_order_code() -> Problem {
    Problem::human("HandlingOrderCode", "unknown handling order code", |a: &Analysis| {
        if a.is_form() {
            Detection::NotApplicable
        } else if HANDLING_ORDERS.contains(&a.key.handling.as_str()) {
            Detection::Clear
        } else {
            Detection::Fired("")
        }
    })
    .ifnot(&["SubjectFormat"])
    .references(Reference::SUBJECT_LINE)
    .template(
        "This message has an unknown handling order code \"{HANDLING}\" on its \
         Subject line.  The handling order code should be \"R\" (routine), \"P\" \
         (priority), or \"I\" (immediate).",
    )
    .variable("HANDLING", |a: &Analysis| a.key.handling.clone())
}

pub(super) fn subject_has_severity() -> Problem {
    Problem::human("SubjectHasSeverity", "severity on subject line", |a: &Analysis| {
        if a.is_form() {
            Detection::NotApplicable
        } else if a.key.severity.is_empty() {
            Detection::Clear
        } else {
            Detection::Fired("")
        }
    })
    .ifnot(&["SubjectFormat"])
    .references(Reference::SUBJECT_LINE)
    .template(
        "This message has a severity code on its Subject line (\"_{SEVERITY}/{HANDLING}_\").  \
         Current standards call for only a handling order code there (\"_{HANDLING}_\").",
    )
    .variable("SEVERITY", |a: &Analysis| first_letter(&a.key.severity))
    .variable("HANDLING", |a: &Analysis| first_letter(&a.key.handling))
}

pub(super) fn practice_as_form_name() -> Problem {
    Problem::human("PracticeAsFormName", "incorrect subject line format", |a: &Analysis| {
        if a.is_form() {
            Detection::NotApplicable
        } else if a.key.form_tag.eq_ignore_ascii_case("Practice") {
            Detection::Fired("")
        } else {
            Detection::Clear
        }
    })
    .ifnot(&["SubjectFormat"])
    .references(Reference::SUBJECT_LINE | Reference::WEEKLY_PRACTICE)
    .template(
        "This message has an underline after the word \"Practice\" on its \
         Subject line.  The word \"Practice\" should be followed by a space, \
         not an underline.",
    )
}

pub(super) fn form_corrupt() -> Problem {
    Problem::human("FormCorrupt", "incorrectly encoded form", |a: &Analysis| {
        if !a.is_plain_text() {
            Detection::NotApplicable
        } else if a.corrupt_form {
            Detection::Fired("")
        } else {
            Detection::Clear
        }
    })
    .template(
        "This message appears to contain an encoded form, but the encoding is \
         incorrect.  It appears to have been created or modified by software \
         other than PackItForms.  Please use PackItForms to encode messages \
         containing forms.",
    )
}

pub(super) fn subject_plain_form() -> Problem {
    Problem::human("SubjectPlainForm", "form name in subject of plain text message", |a: &Analysis| {
        if !a.is_plain_text() {
            Detection::NotApplicable
        } else if !a.key.form_tag.is_empty() && !a.key.form_tag.eq_ignore_ascii_case("Practice") {
            Detection::Fired("")
        } else {
            Detection::Clear
        }
    })
    .ifnot(&["FormCorrupt"])
    .references(Reference::SUBJECT_LINE)
    .template(
        "This message has the form name \"{FORM}\" on its Subject line, but it \
         does not contain a form.  Plain text messages should not have a form \
         name on the Subject line.",
    )
    .variable("FORM", |a: &Analysis| a.key.form_tag.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::problems::tests::{analyze_plain, detect};

    #[tokio::test]
    async fn test_missing_message_number() {
        let a = analyze_plain("Practice K6ABC, Alice, San Jose, 01/11/2022", "Hi\n").await;
        assert_eq!(a.problem_codes(), vec!["SubjectFormat"]);
        assert_eq!(detect(&a, "HandlingOrderCode"), Detection::Fired(""));
        assert!(!a.has_fired("HandlingOrderCode"));
    }

    #[tokio::test]
    async fn test_unknown_handling_order() {
        let a = analyze_plain("ABC-101P_Q_Practice K6ABC, Alice, San Jose, 01/11/2022", "Hi\n").await;
        assert_eq!(a.problem_codes(), vec!["HandlingOrderCode"]);
        assert!(a.fired[0].paragraph.contains("\"Q\""));
    }

    #[tokio::test]
    async fn test_severity_on_subject() {
        let a = analyze_plain("ABC-101P_O/R_Practice K6ABC, Alice, San Jose, 01/11/2022", "Hi\n").await;
        assert_eq!(a.problem_codes(), vec!["SubjectHasSeverity"]);
        assert!(a.fired[0].paragraph.contains("(\"_O/R_\")"));
    }

    #[tokio::test]
    async fn test_practice_with_underline() {
        let a = analyze_plain("ABC-101P_R_Practice_K6ABC, Alice, San Jose, 01/11/2022", "Hi\n").await;
        assert!(a.has_fired("PracticeAsFormName"));
        assert!(!a.has_fired("SubjectPlainForm"));
        assert_eq!(a.from_call_sign, "K6ABC");
    }

    #[tokio::test]
    async fn test_form_name_on_plain_text() {
        let a = analyze_plain("ABC-101P_R_EOC213RR_Practice K6ABC, Alice, San Jose, 01/11/2022", "Hi\n").await;
        assert_eq!(a.problem_codes(), vec!["SubjectPlainForm"]);
        assert!(a.fired[0].paragraph.contains("\"EOC213RR\""));
    }

    #[tokio::test]
    async fn test_damaged_form() {
        let a = analyze_plain(
            "ABC-101P_R_ICS213_Practice K6ABC, Alice, San Jose, 01/11/2022",
            "!SCCoPIFO!\n#T: form-ics213.html\nbroken\n",
        )
        .await;
        assert!(a.corrupt_form);
        assert!(a.has_fired("FormCorrupt"));
        assert!(!a.has_fired("SubjectPlainForm"));
    }
}
