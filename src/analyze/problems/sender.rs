//! Identification of the sender's call sign.

use crate::analyze::callsign::{address_call_sign, is_fcc_call_sign, practice_call_sign};
use crate::analyze::problem::{Detection, Problem};
use crate::analyze::Analysis;

/// The sender's call sign: the one after "Practice" on the subject line,
/// else the return address mailbox when it is a real call sign or came
/// through a BBS, else the operator call sign of a form.
fn derive_from_call_sign(a: &mut Analysis) {
    let from_address = address_call_sign(&a.envelope.return_addr)
        .filter(|call| is_fcc_call_sign(call) || !a.from_bbs.is_empty());
    a.from_call_sign = practice_call_sign(&a.subject)
        .or_else(|| practice_call_sign(&a.key.subject))
        .or(from_address)
        .unwrap_or_else(|| a.key.op_call.to_uppercase());
}

pub(super) fn no_call_sign() -> Problem {
    Problem::human("NoCallSign", "no call sign in message", |a: &Analysis| {
        if a.is_form() {
            Detection::NotApplicable
        } else if a.from_call_sign.is_empty() {
            Detection::Fired("")
        } else {
            Detection::Clear
        }
    })
    .after(&["FromBBSDown"])
    .derive(derive_from_call_sign)
    .dont_count()
    .template(
        "This message does not contain the sender's call sign.  Practice \
         messages must include the sender's call sign after the word \"Practice\" \
         on the Subject line, so that the check-in can be credited.",
    )
}

pub(super) fn form_no_call_sign() -> Problem {
    Problem::human("FormNoCallSign", "no call sign in form", |a: &Analysis| {
        if !a.is_form() {
            Detection::NotApplicable
        } else if a.from_call_sign.is_empty() {
            Detection::Fired("")
        } else {
            Detection::Clear
        }
    })
    .after(&["NoCallSign"])
    .dont_count()
    .template(
        "This message does not contain the sender's call sign.  The operator \
         call sign field of the form should be filled in, and the Subject should \
         include the call sign after the word \"Practice\".",
    )
}

pub(super) fn call_sign_conflict() -> Problem {
    Problem::human("CallSignConflict", "call sign conflict", |a: &Analysis| {
        if !a.is_form() || !is_fcc_call_sign(&a.from_call_sign) || a.key.op_call.is_empty() {
            Detection::NotApplicable
        } else if a.key.op_call.eq_ignore_ascii_case(&a.from_call_sign) {
            Detection::Clear
        } else {
            Detection::Fired("")
        }
    })
    .after(&["NoCallSign"])
    .ifnot(&["FormNoCallSign"])
    .template(
        "This message has a call sign conflict.  The Subject line says the \
         message is from {CALL}, but the operator call sign field of the form \
         says {OPCALL}.  These should agree.",
    )
    .variable("CALL", |a: &Analysis| a.from_call_sign.clone())
    .variable("OPCALL", |a: &Analysis| a.key.op_call.to_uppercase())
}
