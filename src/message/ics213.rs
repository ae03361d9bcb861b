//! The ICS-213 general message form, versions 2.0 through 2.2.

use std::any::Any;

use super::compare::{compare_checkbox, compare_date, compare_exact, compare_text, compare_time, CompareField};
use super::field::{problems, Field};
use super::pifo::{self, PifoForm};
use super::subject::encode_subject;
use super::{older_version, FormMessage, KeyFields, MessageType};

pub const ICS213_TYPE: MessageType = MessageType {
    tag: "ICS213",
    name: "ICS-213 general message form",
    article: "an",
};

const HTML: &str = "form-ics213.html";
const VERSIONS: [&str; 3] = ["2.0", "2.1", "2.2"];

const HANDLING_ORDERS: &[&str] = &["ROUTINE", "PRIORITY", "IMMEDIATE"];
const SEVERITIES: &[&str] = &["EMERGENCY", "URGENT", "OTHER"];
const YES_NO: &[&str] = &["Yes", "No"];
const CHECKBOX: &[&str] = &["checked"];
const RECEIVED_SENT: &[&str] = &["receiver", "sender"];
const METHODS: &[&str] = &[
    "Telephone",
    "Dispatch Center",
    "EOC Radio",
    "FAX",
    "Courier",
    "Amateur Radio",
    "Other",
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ics213 {
    pub pifo_version: String,
    pub form_version: String,
    pub origin_msg_id: String,
    pub destination_msg_id: String,
    pub date: String,
    pub time: String,
    pub severity: String,
    pub handling: String,
    pub take_action: String,
    pub reply: String,
    pub reply_by: String,
    pub fyi: String,
    pub to_ics_position: String,
    pub to_location: String,
    pub to_name: String,
    pub to_telephone: String,
    pub from_ics_position: String,
    pub from_location: String,
    pub from_name: String,
    pub from_telephone: String,
    pub subject: String,
    pub reference: String,
    pub message: String,
    pub op_relay_rcvd: String,
    pub op_relay_sent: String,
    pub received_sent: String,
    pub op_call: String,
    pub op_name: String,
    pub tx_method: String,
    pub other_method: String,
    pub op_date: String,
    pub op_time: String,
}

impl Ics213 {
    /// Build the form from a decoded PackItForms body, if it is a supported
    /// version of the ICS-213.
    pub fn from_pifo(form: &PifoForm) -> Option<Self> {
        if form.html != HTML || !VERSIONS.contains(&form.form_version.as_str()) {
            return None;
        }
        let current = !older_version(&form.form_version, "2.2");
        let mut f = Self {
            pifo_version: form.pifo_version.clone(),
            form_version: form.form_version.clone(),
            date: form.get("1a."),
            time: form.get("1b."),
            handling: form.get("5."),
            take_action: form.get("6a."),
            reply: form.get("6b."),
            reply_by: form.get("6d."),
            to_ics_position: form.get("7."),
            to_location: form.get("9a."),
            to_name: form.get("ToName"),
            to_telephone: form.get("ToTel"),
            from_ics_position: form.get("8."),
            from_location: form.get("9b."),
            from_name: form.get("FmName"),
            from_telephone: form.get("FmTel"),
            subject: form.get("10."),
            reference: form.get("11."),
            message: form.get("12."),
            op_relay_rcvd: form.get("OpRelayRcvd"),
            op_relay_sent: form.get("OpRelaySent"),
            received_sent: form.get("Rec-Sent"),
            op_call: form.get("OpCall"),
            op_name: form.get("OpName"),
            tx_method: form.get("Method"),
            other_method: form.get("Other"),
            op_date: form.get("OpDate"),
            op_time: form.get("OpTime"),
            ..Self::default()
        };
        if !current {
            f.severity = form.get("4.");
            f.fyi = form.get("6c.");
        }
        if current {
            f.origin_msg_id = form.get("MsgNo");
            f.destination_msg_id = form.get("3.");
        } else {
            let old_origin = form.get("2.");
            if !old_origin.is_empty() || f.received_sent == "receiver" {
                f.origin_msg_id = old_origin;
                f.destination_msg_id = form.get("MsgNo");
            } else {
                f.origin_msg_id = form.get("MsgNo");
                f.destination_msg_id = form.get("3.");
            }
        }
        Some(f)
    }

    fn is_current(&self) -> bool {
        !older_version(&self.form_version, "2.2")
    }

    /// Encode the form as a PackItForms body.
    pub fn encode_body(&self, pifo_version: &str) -> String {
        let version = if self.form_version.is_empty() {
            "2.2"
        } else {
            self.form_version.as_str()
        };
        let current = !older_version(version, "2.2");
        let mut fields: Vec<(&str, &str)> = Vec::new();
        if !current && self.received_sent == "receiver" {
            fields.push(("2.", &self.origin_msg_id));
            fields.push(("MsgNo", &self.destination_msg_id));
        } else {
            fields.push(("MsgNo", &self.origin_msg_id));
            fields.push(("3.", &self.destination_msg_id));
        }
        fields.push(("1a.", &self.date));
        fields.push(("1b.", &self.time));
        if !current {
            fields.push(("4.", &self.severity));
        }
        fields.push(("5.", &self.handling));
        fields.push(("6a.", &self.take_action));
        fields.push(("6b.", &self.reply));
        if !current {
            fields.push(("6c.", &self.fyi));
        }
        fields.extend([
            ("6d.", self.reply_by.as_str()),
            ("7.", self.to_ics_position.as_str()),
            ("8.", self.from_ics_position.as_str()),
            ("9a.", self.to_location.as_str()),
            ("9b.", self.from_location.as_str()),
            ("ToName", self.to_name.as_str()),
            ("FmName", self.from_name.as_str()),
            ("ToTel", self.to_telephone.as_str()),
            ("FmTel", self.from_telephone.as_str()),
            ("10.", self.subject.as_str()),
            ("11.", self.reference.as_str()),
            ("12.", self.message.as_str()),
            ("OpRelayRcvd", self.op_relay_rcvd.as_str()),
            ("OpRelaySent", self.op_relay_sent.as_str()),
            ("Rec-Sent", self.received_sent.as_str()),
            ("OpCall", self.op_call.as_str()),
            ("OpName", self.op_name.as_str()),
            ("Method", self.tx_method.as_str()),
            ("Other", self.other_method.as_str()),
            ("OpDate", self.op_date.as_str()),
            ("OpTime", self.op_time.as_str()),
        ]);
        pifo::encode(HTML, pifo_version, version, &fields)
    }
}

impl FormMessage for Ics213 {
    fn message_type(&self) -> &'static MessageType {
        &ICS213_TYPE
    }

    fn key_fields(&self) -> KeyFields {
        KeyFields {
            origin_msg_id: self.origin_msg_id.clone(),
            handling: self.handling.clone(),
            form_tag: ICS213_TYPE.tag.to_string(),
            subject: self.subject.clone(),
            subject_label: "Subject".to_string(),
            to_ics_position: self.to_ics_position.clone(),
            to_location: self.to_location.clone(),
            op_call: self.op_call.clone(),
            pifo_version: self.pifo_version.clone(),
            form_version: self.form_version.clone(),
            ..KeyFields::default()
        }
    }

    fn validate(&self) -> Vec<String> {
        let current = self.is_current();
        let mut fields = Vec::new();
        if current {
            fields.push(Field::new("Origin Message #", &self.origin_msg_id).required());
        } else {
            fields.push(Field::new("My Msg #", &self.origin_msg_id).required());
        }
        fields.push(Field::new("Date", &self.date).required().date());
        fields.push(Field::new("Time", &self.time).required().time());
        if current {
            fields.push(Field::new("Handling", &self.handling).required().one_of(HANDLING_ORDERS));
        } else {
            fields.push(Field::new("Situation Severity", &self.severity).required().one_of(SEVERITIES));
            fields.push(
                Field::new("Message Handling Order", &self.handling)
                    .required()
                    .one_of(HANDLING_ORDERS),
            );
        }
        fields.extend([
            Field::new("Take Action", &self.take_action).one_of(YES_NO),
            Field::new("Reply", &self.reply).one_of(YES_NO),
            Field::new("Reply By", &self.reply_by).only_if(
                self.reply == "Yes",
                r#"The "Reply By" field is not allowed unless "Reply" is "Yes"."#,
            ),
            Field::new("For your info", &self.fyi).one_of(CHECKBOX),
            Field::new("To ICS Position", &self.to_ics_position).required(),
            Field::new("From ICS Position", &self.from_ics_position).required(),
            Field::new("To Location", &self.to_location).required(),
            Field::new("From Location", &self.from_location).required(),
            Field::new("Subject", &self.subject).required(),
            Field::new("Message", &self.message).required(),
            Field::new("Received or Sent", &self.received_sent).one_of(RECEIVED_SENT),
            Field::new("Operator Use Only: Call Sign", &self.op_call).required().call_sign(),
            Field::new("Operator Use Only: Name", &self.op_name).required(),
            Field::new("How Received or Sent", &self.tx_method).required().one_of(METHODS),
            Field::new("Operator Use Only: Date", &self.op_date).required().date(),
            Field::new("Operator Use Only: Time", &self.op_time).required().time(),
        ]);
        problems(fields)
    }

    fn encode_subject(&self) -> String {
        encode_subject(&self.origin_msg_id, &self.handling, ICS213_TYPE.tag, &self.subject)
    }

    fn compare(&self, actual: &dyn FormMessage) -> Vec<CompareField> {
        let Some(act) = actual.as_any().downcast_ref::<Ics213>() else {
            return vec![CompareField {
                label: "Message Type".to_string(),
                expected: ICS213_TYPE.name.to_string(),
                actual: actual.message_type().name.to_string(),
                score: 0,
                out_of: 1,
            }];
        };
        vec![
            compare_date("Date", &self.date, &act.date),
            compare_time("Time", &self.time, &act.time),
            compare_exact("Situation Severity", &self.severity, &act.severity),
            compare_exact("Handling", &self.handling, &act.handling),
            compare_exact("Take Action", &self.take_action, &act.take_action),
            compare_exact("Reply", &self.reply, &act.reply),
            compare_text("Reply By", &self.reply_by, &act.reply_by),
            compare_checkbox("For Your Information", &self.fyi, &act.fyi),
            compare_text("To ICS Position", &self.to_ics_position, &act.to_ics_position),
            compare_text("To Location", &self.to_location, &act.to_location),
            compare_text("To Name", &self.to_name, &act.to_name),
            compare_text("To Telephone", &self.to_telephone, &act.to_telephone),
            compare_text("From ICS Position", &self.from_ics_position, &act.from_ics_position),
            compare_text("From Location", &self.from_location, &act.from_location),
            compare_text("From Name", &self.from_name, &act.from_name),
            compare_text("From Telephone", &self.from_telephone, &act.from_telephone),
            compare_text("Subject", &self.subject, &act.subject),
            compare_exact("Reference", &self.reference, &act.reference),
            compare_text("Message", &self.message, &act.message),
        ]
        .into_iter()
        .filter(|c| !(c.expected.is_empty() && c.actual.is_empty()))
        .collect()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::message::{decode, TypedMessage};

    /// A complete, valid practice ICS-213 from K6ABC.
    pub(crate) fn sample_form() -> Ics213 {
        Ics213 {
            pifo_version: "3.9".to_string(),
            form_version: "2.2".to_string(),
            origin_msg_id: "ABC-101P".to_string(),
            date: "01/11/2022".to_string(),
            time: "1930".to_string(),
            handling: "ROUTINE".to_string(),
            to_ics_position: "Planning".to_string(),
            to_location: "County EOC".to_string(),
            from_ics_position: "Radio".to_string(),
            from_location: "Home".to_string(),
            subject: "Practice K6ABC, Alice, San Jose, 01/11/2022".to_string(),
            message: "Checking in.".to_string(),
            received_sent: "sender".to_string(),
            op_call: "K6ABC".to_string(),
            op_name: "Alice".to_string(),
            tx_method: "Other".to_string(),
            other_method: "Packet".to_string(),
            op_date: "01/11/2022".to_string(),
            op_time: "1930".to_string(),
            ..Ics213::default()
        }
    }

    #[test]
    fn test_decode_encoded_form() {
        let form = sample_form();
        let msg = decode(&form.encode_subject(), &form.encode_body("3.9"));
        let TypedMessage::Form(decoded) = msg else {
            panic!("expected a form");
        };
        let decoded = decoded.as_any().downcast_ref::<Ics213>().unwrap();
        assert_eq!(decoded, &form);
    }

    #[test]
    fn test_encode_subject() {
        assert_eq!(
            sample_form().encode_subject(),
            "ABC-101P_R_ICS213_Practice K6ABC, Alice, San Jose, 01/11/2022"
        );
    }

    #[test]
    fn test_key_fields() {
        let key = sample_form().key_fields();
        assert_eq!(key.op_call, "K6ABC");
        assert_eq!(key.subject_label, "Subject");
        assert_eq!(key.form_tag, "ICS213");
        assert_eq!(key.pifo_version, "3.9");
        assert_eq!(key.to_location, "County EOC");
    }

    #[test]
    fn test_valid_form() {
        assert!(sample_form().validate().is_empty());
    }

    #[test]
    fn test_validation_problems() {
        let mut form = sample_form();
        form.time = "2500".to_string();
        form.reply_by = "1700".to_string();
        form.message = String::new();
        assert_eq!(
            form.validate(),
            vec![
                r#"The "Time" field does not contain a valid time."#,
                r#"The "Reply By" field is not allowed unless "Reply" is "Yes"."#,
                r#"The "Message" field is required."#,
            ]
        );
    }

    #[test]
    fn test_old_version_fields() {
        let body = pifo::encode(
            HTML,
            "3.2",
            "2.1",
            &[("2.", "ABC-101P"), ("MsgNo", "XSC-999P"), ("4.", "OTHER"), ("6c.", "checked")],
        );
        let form = Ics213::from_pifo(&pifo::decode(&body).unwrap()).unwrap();
        assert_eq!(form.origin_msg_id, "ABC-101P");
        assert_eq!(form.destination_msg_id, "XSC-999P");
        assert_eq!(form.severity, "OTHER");
        assert_eq!(form.fyi, "checked");
        assert!(form
            .validate()
            .contains(&r#"The "Message Handling Order" field is required."#.to_string()));
    }

    #[test]
    fn test_unsupported_version() {
        let body = pifo::encode(HTML, "3.9", "1.9", &[("MsgNo", "ABC-101P")]);
        assert!(Ics213::from_pifo(&pifo::decode(&body).unwrap()).is_none());
    }

    #[test]
    fn test_compare() {
        let expected = sample_form();
        assert!(expected.compare(&expected.clone()).iter().all(CompareField::is_match));

        let mut actual = sample_form();
        actual.message = "Checking out.".to_string();
        let mismatches: Vec<String> = expected
            .compare(&actual)
            .into_iter()
            .filter(|c| !c.is_match())
            .map(|c| c.label)
            .collect();
        assert_eq!(mismatches, vec!["Message"]);
    }
}
