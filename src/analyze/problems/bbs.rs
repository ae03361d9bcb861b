//! Checks on the BBSes the message passed through.

use super::{accepted_bbses, net_day, session_call_sign, session_name, to_bbs as to_bbs_var};
use crate::analyze::callsign::address_bbs;
use crate::analyze::problem::{Detection, Problem};
use crate::analyze::reference::Reference;
use crate::analyze::Analysis;

pub(super) fn from_bbs_down() -> Problem {
    Problem::human("FromBBSDown", "message from incorrect BBS (simulated outage)", |a: &Analysis| {
        if a.session.is_down(&a.from_bbs) {
            Detection::Fired("")
        } else {
            Detection::Clear
        }
    })
    .derive(|a: &mut Analysis| {
        a.from_bbs = address_bbs(&a.envelope.return_addr).unwrap_or_default();
    })
    .references(Reference::WEEKLY_PRACTICE)
    .template(
        "This message was sent from {FROM_BBS}, which has a simulated outage for \
         the {SESSION} on {DATE}.  Practice messages should not be sent from BBSes \
         that have a simulated outage.",
    )
    .variable("FROM_BBS", |a: &Analysis| a.from_bbs.clone())
    .variable("SESSION", session_name)
    .variable("DATE", net_day)
}

pub(super) fn to_bbs_down() -> Problem {
    Problem::human("ToBBSDown", "message to incorrect BBS (simulated outage)", |a: &Analysis| {
        if a.session.is_down(&a.to_bbs) {
            Detection::Fired("")
        } else {
            Detection::Clear
        }
    })
    .dont_count()
    .references(Reference::WEEKLY_PRACTICE)
    .template(
        "This message was sent to {CALL} at {BBS}, but {BBS} has a simulated \
         outage for the {SESSION} on {DATE}.  Practice messages for this session \
         must be sent to {CALL} at {TO_BBSES}.",
    )
    .variable("CALL", session_call_sign)
    .variable("BBS", to_bbs_var)
    .variable("SESSION", session_name)
    .variable("DATE", net_day)
    .variable("TO_BBSES", accepted_bbses)
}

pub(super) fn to_bbs() -> Problem {
    Problem::human("ToBBS", "message to incorrect BBS", |a: &Analysis| {
        if a.session.accepts_to_bbs(&a.to_bbs) {
            Detection::Clear
        } else {
            Detection::Fired("")
        }
    })
    .ifnot(&["ToBBSDown"])
    .dont_count()
    .references(Reference::WEEKLY_PRACTICE)
    .template(
        "This message was sent to {CALL} at {BBS}.  Practice messages for the \
         {SESSION} on {DATE} must be sent to {CALL} at {TO_BBSES}.",
    )
    .variable("CALL", session_call_sign)
    .variable("BBS", to_bbs_var)
    .variable("SESSION", session_name)
    .variable("DATE", net_day)
    .variable("TO_BBSES", accepted_bbses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::problems::tests::{analyze_for, detect};
    use crate::session::tests::tuesday_net;

    const SUBJECT: &str = "ABC-101P_R_Practice K6ABC, Alice, San Jose, 01/11/2022";

    #[tokio::test]
    async fn test_sent_from_down_bbs() {
        let a = analyze_for(&tuesday_net(), "k6abc@w2xsc.ampr.org", SUBJECT, "Checking in.\n").await;
        assert_eq!(a.from_bbs, "W2XSC");
        assert_eq!(a.problem_codes(), vec!["FromBBSDown"]);
        assert!(a.fired[0].paragraph.starts_with("This message was sent from W2XSC"));
        assert!(a.counted());
    }

    #[tokio::test]
    async fn test_internet_sender_has_no_bbs() {
        let a = analyze_for(&tuesday_net(), "alice@example.com", SUBJECT, "Checking in.\n").await;
        assert_eq!(a.from_bbs, "");
        assert_eq!(detect(&a, "FromBBSDown"), Detection::Clear);
        assert_eq!(detect(&a, "ToBBS"), Detection::Clear);
    }

    #[tokio::test]
    async fn test_wrong_bbs_lists_accepted_ones() {
        let mut session = tuesday_net();
        session.to_bbses = vec!["W1XSC".to_string(), "W3XSC".to_string()];
        let a = analyze_for(&session, "k6abc@w4xsc.ampr.org", SUBJECT, "Checking in.\n").await;
        let fired = a.fired.iter().find(|f| f.code == "ToBBS").unwrap();
        assert!(fired.paragraph.ends_with("must be sent to PKTTUE at W1XSC or W3XSC."));
        assert!(!a.counted());
    }
}
