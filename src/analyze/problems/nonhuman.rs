//! Terminal classifications: messages that were not written by a person.

use crate::analyze::problem::{Detection, Problem};
use crate::analyze::reference::Reference;
use crate::analyze::Analysis;
use crate::message::TypedMessage;

fn fired_if(condition: bool) -> Detection {
    if condition {
        Detection::Fired("")
    } else {
        Detection::Clear
    }
}

pub(super) fn message_corrupt() -> Problem {
    Problem::terminal("MessageCorrupt", "message could not be parsed", |a: &Analysis| {
        fired_if(a.decode_error.is_some())
    })
    .template("This message could not be parsed, so it could not be analyzed.")
}

pub(super) fn bounce_message() -> Problem {
    Problem::terminal("BounceMessage", "message has no return address (probably auto-response)", |a: &Analysis| {
        fired_if(a.envelope.autoresponse)
    })
    .template("This message has no return address.  It is probably an automatic response.")
}

pub(super) fn delivery_receipt() -> Problem {
    Problem::terminal("DeliveryReceipt", "DELIVERED receipt message", |a: &Analysis| {
        fired_if(matches!(a.message, Some(TypedMessage::DeliveryReceipt(_))))
    })
    .template("This message is a delivery receipt.")
}

pub(super) fn read_receipt() -> Problem {
    Problem::terminal("ReadReceipt", "unexpected READ receipt message", |a: &Analysis| {
        fired_if(matches!(a.message, Some(TypedMessage::ReadReceipt(_))))
    })
    .respond()
    .references(Reference::OUTPOST_CONFIG)
    .template(
        "This message is a \"read receipt\" message, which was sent because the \
         operator requested one.  Operators should not request read receipts for \
         practice messages; please turn off the \"Auto-Read Receipt\" setting \
         in Outpost (Tools > Send/Receive Settings > Receiving).",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::problems::tests::analyze_plain;

    #[tokio::test]
    async fn test_human_message_is_not_terminal() {
        let a = analyze_plain("ABC-101P_R_Practice K6ABC, Alice, San Jose, 01/11/2022", "Checking in.\n").await;
        for problem in [message_corrupt(), bounce_message(), delivery_receipt(), read_receipt()] {
            assert_eq!(problem.detect(&a), Detection::Clear, "{}", problem.code);
        }
    }

    #[test]
    fn test_read_receipt_responds_by_default() {
        let p = read_receipt();
        assert!(p.terminal);
        assert!(p.default_actions.contains(&crate::config::ProblemAction::Respond));
        assert!(!message_corrupt()
            .default_actions
            .contains(&crate::config::ProblemAction::Respond));
    }
}
