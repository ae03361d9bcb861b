//! Checks on the "Practice ..." subject that identifies a check-in.

use crate::analyze::callsign::parse_practice;
use crate::analyze::problem::{Detection, Problem};
use crate::analyze::reference::Reference;
use crate::analyze::Analysis;

fn derive_practice(a: &mut Analysis) {
    if let Some((jurisdiction, date)) = parse_practice(&a.key.subject) {
        a.subject_jurisdiction = a
            .config
            .jurisdiction_code(&jurisdiction)
            .map(str::to_string)
            .unwrap_or(jurisdiction);
        a.net_date = Some(date);
    }
}

/// Whether the message type expects practice details in its subject.
fn expects_practice_info(a: &Analysis) -> bool {
    a.type_config().is_some_and(|t| !t.no_practice_info)
}

pub(super) fn practice_subject_format() -> Problem {
    Problem::human("PracticeSubjectFormat", "incorrect practice message details", |a: &Analysis| {
        if !expects_practice_info(a) || a.is_form() {
            Detection::NotApplicable
        } else if a.net_date.is_none() {
            Detection::Fired("")
        } else {
            Detection::Clear
        }
    })
    .derive(derive_practice)
    .references(Reference::WEEKLY_PRACTICE)
    .template(
        "The Subject of this message does not have the correct format.  After \
         the message number and handling order, it should have the word \
         \"Practice\" followed by four comma-separated fields:\n    \
         Practice CallSign, FirstName, Jurisdiction, NetDate\n\
         The NetDate must be in MM/DD/YYYY format.",
    )
}

pub(super) fn form_practice_subject() -> Problem {
    Problem::human("FormPracticeSubject", "incorrect practice message details", |a: &Analysis| {
        if !expects_practice_info(a) || !a.is_form() {
            Detection::NotApplicable
        } else if a.net_date.is_none() {
            Detection::Fired("")
        } else {
            Detection::Clear
        }
    })
    .after(&["PracticeSubjectFormat"])
    .references(Reference::WEEKLY_PRACTICE)
    .template(
        "The {LABEL} field of this form does not have the correct format.  It \
         should have the word \"Practice\" followed by four comma-separated \
         fields:\n    \
         Practice CallSign, FirstName, Jurisdiction, NetDate\n\
         The NetDate must be in MM/DD/YYYY format.",
    )
    .variable("LABEL", |a: &Analysis| {
        if a.key.subject_label.is_empty() {
            "Subject".to_string()
        } else {
            a.key.subject_label.clone()
        }
    })
}

pub(super) fn unknown_jurisdiction() -> Problem {
    Problem::human("UnknownJurisdiction", "unknown jurisdiction", |a: &Analysis| {
        if a.net_date.is_none() {
            Detection::NotApplicable
        } else if a.config.jurisdiction_code(&a.subject_jurisdiction).is_some() {
            Detection::Clear
        } else {
            Detection::Fired("")
        }
    })
    .ifnot(&["PracticeSubjectFormat", "FormPracticeSubject"])
    .references(Reference::WEEKLY_PRACTICE)
    .template(
        "This message is from an unknown jurisdiction \"{JURISDICTION}\".  The \
         jurisdiction on the Subject line should be one of the recognized city \
         or agency names, or its three-letter abbreviation.",
    )
    .variable("JURISDICTION", |a: &Analysis| a.subject_jurisdiction.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::problems::tests::{analyze_plain, detect};
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_practice_details() {
        let a = analyze_plain("ABC-101P_R_Practice K6ABC, Alice, sunnyvale, 1/11/2022", "Hi\n").await;
        assert_eq!(a.subject_jurisdiction, "SNY");
        assert_eq!(a.net_date, NaiveDate::from_ymd_opt(2022, 1, 11));
        assert_eq!(detect(&a, "PracticeSubjectFormat"), Detection::Clear);
        assert_eq!(detect(&a, "UnknownJurisdiction"), Detection::Clear);
    }

    #[tokio::test]
    async fn test_abbreviated_jurisdiction() {
        let a = analyze_plain("ABC-101P_R_Practice K6ABC, Alice, MTV, 01/11/2022", "Hi\n").await;
        assert_eq!(a.subject_jurisdiction, "MTV");
        assert!(!a.has_fired("UnknownJurisdiction"));
    }

    #[tokio::test]
    async fn test_unknown_jurisdiction() {
        let a = analyze_plain("ABC-101P_R_Practice K6ABC, Alice, Atlantis, 01/11/2022", "Hi\n").await;
        assert_eq!(a.problem_codes(), vec!["UnknownJurisdiction"]);
        assert!(a.fired[0].paragraph.contains("\"Atlantis\""));
    }

    #[tokio::test]
    async fn test_missing_practice_details() {
        let a = analyze_plain("ABC-101P_R_Practice K6ABC", "Hi\n").await;
        assert!(a.has_fired("PracticeSubjectFormat"));
        assert!(!a.has_fired("UnknownJurisdiction"));
        assert!(a.fired[0].paragraph.contains("\n    Practice CallSign, FirstName, Jurisdiction, NetDate\n"));
    }
}
