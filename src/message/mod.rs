//! Typed decoding of packet message bodies.
//!
//! `decode` classifies a subject and body as a delivery receipt, read
//! receipt, known form, unknown form, or plain text, in that order of
//! preference. Plain text always succeeds.

pub mod compare;
pub mod field;
pub mod ics213;
pub mod pifo;
pub mod receipt;
pub mod subject;

use std::any::Any;
use std::fmt::Debug;

use compare::{compare_text, CompareField};
use pifo::PifoForm;
use receipt::{DeliveryReceipt, ReadReceipt};
use subject::decode_subject;

/// Identity of a message type as shown to operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageType {
    pub tag: &'static str,
    pub name: &'static str,
    /// "a" or "an", for use before `name`.
    pub article: &'static str,
}

pub const PLAIN_TEXT: MessageType = MessageType {
    tag: "plain",
    name: "plain text message",
    article: "a",
};

pub const UNKNOWN_FORM: MessageType = MessageType {
    tag: "UNKNOWN",
    name: "unrecognized form message",
    article: "an",
};

pub const READ_RECEIPT: MessageType = MessageType {
    tag: "READ",
    name: "read receipt",
    article: "a",
};

pub const DELIVERY_RECEIPT: MessageType = MessageType {
    tag: "DELIVERED",
    name: "delivery receipt",
    article: "a",
};

const REGISTERED_TYPES: [&MessageType; 5] = [
    &PLAIN_TEXT,
    &ics213::ICS213_TYPE,
    &UNKNOWN_FORM,
    &READ_RECEIPT,
    &DELIVERY_RECEIPT,
];

/// Look up a registered message type by tag.
pub fn message_type(tag: &str) -> Option<&'static MessageType> {
    REGISTERED_TYPES.iter().copied().find(|t| t.tag == tag)
}

/// Values of a message needed for analysis regardless of its type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyFields {
    pub origin_msg_id: String,
    pub handling: String,
    /// Old-style severity from the subject line. Only set for non-forms.
    pub severity: String,
    /// Form tag from the subject line. Only set for non-forms.
    pub form_tag: String,
    /// The subject text, or for forms the value of the form's subject field.
    pub subject: String,
    /// Label of the form field holding the subject. Empty for non-forms.
    pub subject_label: String,
    pub to_ics_position: String,
    pub to_location: String,
    pub op_call: String,
    pub pifo_version: String,
    pub form_version: String,
}

/// Behavior shared by all recognized form types.
pub trait FormMessage: Send + Sync + Debug {
    fn message_type(&self) -> &'static MessageType;
    fn key_fields(&self) -> KeyFields;
    /// Problems that standard packet software would flag in the form.
    fn validate(&self) -> Vec<String>;
    /// The subject line standard software would generate for the form.
    fn encode_subject(&self) -> String;
    /// Compare `actual` against this form as the expected one.
    fn compare(&self, actual: &dyn FormMessage) -> Vec<CompareField>;
    fn as_any(&self) -> &dyn Any;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlainText {
    pub subject: String,
    pub body: String,
}

#[derive(Debug)]
pub enum TypedMessage {
    PlainText(PlainText),
    DeliveryReceipt(DeliveryReceipt),
    ReadReceipt(ReadReceipt),
    Form(Box<dyn FormMessage>),
    UnknownForm(PifoForm),
}

pub fn decode(subject: &str, body: &str) -> TypedMessage {
    if let Some(dr) = DeliveryReceipt::decode(subject, body) {
        return TypedMessage::DeliveryReceipt(dr);
    }
    if let Some(rr) = ReadReceipt::decode(subject, body) {
        return TypedMessage::ReadReceipt(rr);
    }
    if let Some(form) = pifo::decode(body) {
        return match ics213::Ics213::from_pifo(&form) {
            Some(f) => TypedMessage::Form(Box::new(f)),
            None => TypedMessage::UnknownForm(form),
        };
    }
    TypedMessage::PlainText(PlainText {
        subject: subject.to_string(),
        body: body.to_string(),
    })
}

impl TypedMessage {
    pub fn message_type(&self) -> &'static MessageType {
        match self {
            TypedMessage::PlainText(_) => &PLAIN_TEXT,
            TypedMessage::DeliveryReceipt(_) => &DELIVERY_RECEIPT,
            TypedMessage::ReadReceipt(_) => &READ_RECEIPT,
            TypedMessage::Form(f) => f.message_type(),
            TypedMessage::UnknownForm(_) => &UNKNOWN_FORM,
        }
    }

    pub fn form(&self) -> Option<&dyn FormMessage> {
        match self {
            TypedMessage::Form(f) => Some(f.as_ref()),
            _ => None,
        }
    }

    pub fn is_plain_text(&self) -> bool {
        matches!(self, TypedMessage::PlainText(_))
    }

    /// Key fields of the message. Known forms supply their own; everything
    /// else decodes them from the subject line.
    pub fn key_fields(&self, subject_line: &str) -> KeyFields {
        if let Some(form) = self.form() {
            return form.key_fields();
        }
        let parts = decode_subject(subject_line);
        let mut subject = parts.subject;
        if parts.formtag.eq_ignore_ascii_case("Practice") {
            subject = format!("Practice {subject}");
        }
        KeyFields {
            origin_msg_id: parts.msgid,
            handling: parts.handling,
            severity: parts.severity,
            form_tag: parts.formtag,
            subject,
            ..KeyFields::default()
        }
    }

    /// Compare `actual` against this message as the expected one. Messages
    /// of different types yield a single failing "Message Type" field.
    pub fn compare(&self, actual: &TypedMessage) -> Vec<CompareField> {
        match (self, actual) {
            (TypedMessage::PlainText(exp), TypedMessage::PlainText(act)) => {
                let exp_subject = decode_subject(&exp.subject).subject;
                let act_subject = decode_subject(&act.subject).subject;
                vec![
                    compare_text("Subject", &exp_subject, &act_subject),
                    compare_text("Message", &exp.body, &act.body),
                ]
            }
            (TypedMessage::Form(exp), TypedMessage::Form(act)) => exp.compare(act.as_ref()),
            _ => vec![CompareField {
                label: "Message Type".to_string(),
                expected: self.message_type().name.to_string(),
                actual: actual.message_type().name.to_string(),
                score: 0,
                out_of: 1,
            }],
        }
    }
}

/// Whether version `have` is older than `min`. Versions are dot-separated
/// parts compared numerically where possible. A part starting with a digit
/// is newer than one that does not, so an empty or unknown version is older
/// than any real one. An empty `min` is never newer than anything.
pub fn older_version(have: &str, min: &str) -> bool {
    if min.is_empty() {
        return false;
    }
    let starts_with_digit = |s: &str| s.starts_with(|c: char| c.is_ascii_digit());
    let mut have_parts = have.split('.');
    let mut min_parts = min.split('.');
    loop {
        match (have_parts.next(), min_parts.next()) {
            (Some(a), Some(b)) => {
                let ordering = match (a.parse::<u64>(), b.parse::<u64>()) {
                    (Ok(a), Ok(b)) => a.cmp(&b),
                    _ => match (starts_with_digit(a), starts_with_digit(b)) {
                        (true, false) => return false,
                        (false, true) => return true,
                        _ => a.cmp(b),
                    },
                };
                match ordering {
                    std::cmp::Ordering::Less => return true,
                    std::cmp::Ordering::Greater => return false,
                    std::cmp::Ordering::Equal => {}
                }
            }
            (_, remaining) => return remaining.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_older_version() {
        assert!(older_version("3.2", "3.9"));
        assert!(!older_version("3.10", "3.9"));
        assert!(!older_version("3.9", "3.9"));
        assert!(older_version("2", "2.2"));
        assert!(!older_version("2.2.1", "2.2"));
        assert!(older_version("", "2.2"));
        assert!(older_version("undefined", "2.2"));
        assert!(!older_version("2.0", ""));
    }

    #[test]
    fn test_decode_plain_text() {
        let msg = decode("ABC-101P_R_Practice K6ABC", "Hello\n");
        assert_eq!(msg.message_type().tag, "plain");
        assert!(msg.is_plain_text());
        assert!(msg.form().is_none());
    }

    #[test]
    fn test_decode_unknown_form() {
        let body = "!SCCoPIFO!\n#T: form-oa-muni-status.html\n#V: 3.9-2.2\nA: [b]\n!/ADDON!\n";
        let msg = decode("ABC-101P_R_MuniStat_x", body);
        assert_eq!(msg.message_type(), &UNKNOWN_FORM);
    }

    #[test]
    fn test_decode_receipts() {
        let body = "!RR!01/11/2022 19:31:00\nYour Message\n\nTo: pkttue@w4xsc.ampr.org\n";
        assert_eq!(decode("READ: s", body).message_type().tag, "READ");
        // Without the subject prefix it is just text.
        assert_eq!(decode("s", body).message_type().tag, "plain");
    }

    #[test]
    fn test_key_fields_from_subject() {
        let msg = decode("ABC-101P_O/R_Practice_K6ABC, Alice, San Jose, 01/11/2022", "x");
        let key = msg.key_fields("ABC-101P_O/R_Practice_K6ABC, Alice, San Jose, 01/11/2022");
        assert_eq!(key.origin_msg_id, "ABC-101P");
        assert_eq!(key.severity, "OTHER");
        assert_eq!(key.handling, "ROUTINE");
        assert_eq!(key.form_tag, "Practice");
        assert_eq!(key.subject, "Practice K6ABC, Alice, San Jose, 01/11/2022");
        assert_eq!(key.subject_label, "");
    }

    #[test]
    fn test_message_type_lookup() {
        assert_eq!(message_type("ICS213").unwrap().article, "an");
        assert_eq!(message_type("plain").unwrap().name, "plain text message");
        assert!(message_type("bogus").is_none());
    }

    #[test]
    fn test_compare_plain_text() {
        let exp = decode("XXX-000P_R_Practice model", "Send two pallets of water.");
        let act = decode("ABC-101P_R_Practice model", "Send two pallets of water.");
        assert!(exp.compare(&act).iter().all(CompareField::is_match));
        let act = decode("ABC-101P_R_Practice model", "Send three pallets of water.");
        let fields = exp.compare(&act);
        assert!(!fields[1].is_match());
    }

    #[test]
    fn test_compare_type_mismatch() {
        let exp = decode("s", "body");
        let act = decode("READ: s", "!RR!t\nYour Message\n\nTo: a@b\n");
        let fields = exp.compare(&act);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].label, "Message Type");
        assert_eq!(fields[0].score, 0);
    }
}
