//! Check that the message is of a type the session asks for.

use super::{net_day, session_name, type_article, type_name};
use crate::analyze::english::conjoin;
use crate::analyze::problem::{Detection, Problem};
use crate::analyze::Analysis;
use crate::message::message_type;

pub const MESSAGE_TYPE_WRONG: &str = "MessageTypeWrong";

fn detect(a: &Analysis) -> Detection {
    let Some(actual) = a.message_type() else {
        return Detection::NotApplicable;
    };
    if let Some(model) = &a.model {
        return if model.message_type().tag == actual.tag {
            Detection::Clear
        } else {
            Detection::Fired("model")
        };
    }
    // Plain text from outside the county, or a damaged form, may not be
    // what the sender meant to send.
    if a.is_plain_text() && (!a.config.is_county_bbs(&a.from_bbs) || a.corrupt_form) {
        return Detection::NotApplicable;
    }
    if a.session.message_types.is_empty() || a.session.message_types.iter().any(|t| t == actual.tag) {
        Detection::Clear
    } else {
        Detection::Fired("")
    }
}

/// The expected types, e.g. "a plain text message or an ICS-213 message form".
fn expected(a: &Analysis) -> String {
    let names: Vec<String> = a
        .session
        .message_types
        .iter()
        .map(|tag| match message_type(tag) {
            Some(t) => format!("{} {}", t.article, t.name),
            None => tag.clone(),
        })
        .collect();
    conjoin(&names, "or")
}

pub(super) fn message_type_wrong() -> Problem {
    Problem::human(MESSAGE_TYPE_WRONG, "incorrect message type", detect)
        .after(&["FromBBSDown"])
        .template(
            "This message is {ARTICLE} {TYPE}.  For the {SESSION} on {DATE}, \
             operators are expected to send {EXPECTED}.",
        )
        .variant(
            "model",
            "This message is {ARTICLE} {TYPE}.  For the {SESSION} on {DATE}, \
             operators are expected to send a copy of the provided {MODEL_TYPE}.",
        )
        .variable("ARTICLE", type_article)
        .variable("TYPE", type_name)
        .variable("SESSION", session_name)
        .variable("DATE", net_day)
        .variable("EXPECTED", expected)
        .variable("MODEL_TYPE", |a: &Analysis| {
            a.model
                .as_ref()
                .map(|m| m.message_type().name)
                .unwrap_or_default()
                .to_string()
        })
}
