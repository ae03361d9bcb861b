//! Checks that the message belongs to the session's time window.

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};

use super::{net_day, session_name, to_bbs};
use crate::analyze::problem::{Detection, Problem};
use crate::analyze::Analysis;

/// Midnight at the start of `date`, in the same offset as `reference`.
fn midnight(date: NaiveDate, reference: &DateTime<FixedOffset>) -> Option<DateTime<FixedOffset>> {
    reference
        .offset()
        .from_local_datetime(&date.and_hms_opt(0, 0, 0)?)
        .single()
}

fn arrived(a: &Analysis) -> String {
    a.arrival()
        .map(|t| t.format("%Y-%m-%d at %H:%M").to_string())
        .unwrap_or_default()
}

pub(super) fn message_too_late() -> Problem {
    Problem::human("MessageTooLate", "message too late", |a: &Analysis| {
        let Some(arrival) = a.arrival() else {
            return Detection::NotApplicable;
        };
        let start = a.session.start;
        let for_earlier_net = a
            .net_date
            .and_then(|d| midnight(d, &start))
            .is_some_and(|m| m < start);
        if arrival < start && for_earlier_net {
            Detection::Fired("")
        } else {
            Detection::Clear
        }
    })
    .after(&["PracticeSubjectFormat"])
    .dont_count()
    .template(
        "This message arrived at {BBS} on {ARRIVED}.  That was too late to be \
         counted for the net on {NET_DATE}; the next practice session is the \
         {SESSION} on {DATE}.",
    )
    .variable("BBS", to_bbs)
    .variable("ARRIVED", arrived)
    .variable("NET_DATE", |a: &Analysis| {
        a.net_date.map(|d| d.format("%B %-d").to_string()).unwrap_or_default()
    })
    .variable("SESSION", session_name)
    .variable("DATE", net_day)
}

pub(super) fn message_too_early() -> Problem {
    Problem::human("MessageTooEarly", "message too early", |a: &Analysis| match a.arrival() {
        None => Detection::NotApplicable,
        Some(arrival) if arrival < a.session.start => Detection::Fired(""),
        Some(_) => Detection::Clear,
    })
    .ifnot(&["MessageTooLate"])
    .dont_count()
    .template(
        "This message arrived at {BBS} on {ARRIVED}.  Practice messages for the \
         {SESSION} on {DATE} are accepted starting at {START}.",
    )
    .variable("BBS", to_bbs)
    .variable("ARRIVED", arrived)
    .variable("SESSION", session_name)
    .variable("DATE", net_day)
    .variable("START", |a: &Analysis| {
        a.session.start.format("%A, %B %-d, at %H:%M").to_string()
    })
}

pub(super) fn session_date() -> Problem {
    Problem::human("SessionDate", "incorrect net date in subject", |a: &Analysis| match a.net_date {
        None => Detection::NotApplicable,
        Some(date) if date != a.session.end.date_naive() => Detection::Fired(""),
        Some(_) => Detection::Clear,
    })
    .after(&["PracticeSubjectFormat"])
    .ifnot(&["MessageTooLate", "MessageTooEarly"])
    .informational()
    .template(
        "The net date on the Subject line of this message is {NET_DATE}, but \
         the message was received for the {SESSION} on {DATE}.  The net date \
         should be the date of the net for which the message is a check-in.",
    )
    .variable("NET_DATE", |a: &Analysis| {
        a.net_date.map(|d| d.format("%m/%d/%Y").to_string()).unwrap_or_default()
    })
    .variable("SESSION", session_name)
    .variable("DATE", net_day)
}
