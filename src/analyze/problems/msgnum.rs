//! Checks on the origin message number.

use lazy_static::lazy_static;
use regex::Regex;

use crate::analyze::callsign::is_fcc_call_sign;
use crate::analyze::problem::{Detection, Problem};
use crate::analyze::reference::Reference;
use crate::analyze::Analysis;

lazy_static! {
    static ref MSGNUM_RE: Regex =
        Regex::new(r"^(?:[A-Z][A-Z][A-Z]|[A-Z][0-9][A-Z0-9]|[0-9][A-Z][A-Z])-\d\d\d+[PMR]$").unwrap();
}

/// Message number prefix expected from a call sign: its last three
/// characters.
fn expected_prefix(call_sign: &str) -> &str {
    call_sign.get(call_sign.len().saturating_sub(3)..).unwrap_or("")
}

pub(super) fn msg_num_format() -> Problem {
    Problem::human("MsgNumFormat", "incorrect message number format", |a: &Analysis| {
        if a.key.origin_msg_id.is_empty() {
            Detection::NotApplicable
        } else if MSGNUM_RE.is_match(&a.key.origin_msg_id) {
            Detection::Clear
        } else {
            Detection::Fired("")
        }
    })
    .references(Reference::OUTPOST_CONFIG | Reference::SUBJECT_LINE)
    .template(
        "The message number of this message, \"{MSGID}\", does not have the \
         correct format.  It should have\n  \
         - a three-character prefix, usually the last three characters of the \
         sender's call sign,\n  \
         - a dash,\n  \
         - a number with at least three digits, and\n  \
         - a \"P\", \"M\", or \"R\" suffix.\n\
         The prefix should be set in Outpost under Tools > Message Settings.",
    )
    .variable("MSGID", |a: &Analysis| a.key.origin_msg_id.clone())
}

pub(super) fn msg_num_prefix() -> Problem {
    Problem::human("MsgNumPrefix", "incorrect message number prefix", |a: &Analysis| {
        let Some(prefix) = a.key.origin_msg_id.get(..3) else {
            return Detection::NotApplicable;
        };
        if !is_fcc_call_sign(&a.from_call_sign) {
            Detection::NotApplicable
        } else if prefix == expected_prefix(&a.from_call_sign) {
            Detection::Clear
        } else {
            Detection::Fired("")
        }
    })
    .after(&["NoCallSign"])
    .ifnot(&["MsgNumFormat"])
    .references(Reference::SUBJECT_LINE)
    .template(
        "The message number of this message has the prefix \"{ACTUAL}\".  The \
         prefix should be the last three characters of the sender's call sign, \
         \"{EXPECTED}\".",
    )
    .variable("ACTUAL", |a: &Analysis| a.key.origin_msg_id.get(..3).unwrap_or("").to_string())
    .variable("EXPECTED", |a: &Analysis| expected_prefix(&a.from_call_sign).to_string())
}
