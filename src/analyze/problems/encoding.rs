//! Checks on how the message body was encoded.

use crate::analyze::problem::{Detection, Problem};
use crate::analyze::Analysis;

pub(super) fn message_from_winlink() -> Problem {
    Problem::human("MessageFromWinlink", "message sent from Winlink", |a: &Analysis| {
        if a.envelope.not_plain_text && a.envelope.return_addr.to_lowercase().contains("winlink.org") {
            Detection::Fired("")
        } else {
            Detection::Clear
        }
    })
    .template(
        "This message was sent from Winlink.  Winlink messages cannot be handled \
         by the packet practice automation.  Please send your practice messages \
         with Outpost or another packet client.",
    )
}

pub(super) fn message_not_plain_text() -> Problem {
    Problem::human("MessageNotPlainText", "not a plain text message", |a: &Analysis| {
        if a.envelope.not_plain_text {
            Detection::Fired("")
        } else {
            Detection::Clear
        }
    })
    .ifnot(&["MessageFromWinlink"])
    .template(
        "This message is not a plain text message.  All SCCo packet messages \
         should be plain text only.  (Packet messages may include PackItForms \
         encoding, which is itself plain text.)",
    )
}

pub(super) fn message_not_ascii() -> Problem {
    Problem::human("MessageNotASCII", "message has non-ASCII characters", |a: &Analysis| {
        let bad = a
            .body
            .chars()
            .any(|c| c > '~' || (c < ' ' && c != '\t' && c != '\n'));
        if bad {
            Detection::Fired("")
        } else {
            Detection::Clear
        }
    })
    .template(
        "This message contains characters that are not in the ASCII character \
         set (such as \"smart quotes\" or accented letters).  Not all packet \
         software can display such characters correctly.  It is best to avoid \
         them in packet messages.",
    )
}
