//! Outpost delivery and read receipts.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref DELIVERY_RECEIPT_RE: Regex = Regex::new(
        r"^!LMI!([^!]+)!DR!(.+)\n.*\nTo: (.+)\nSubject:.*\nwas delivered on.*\nRecipient's Local.*\n"
    )
    .unwrap();
    static ref READ_RECEIPT_RE: Regex = Regex::new(r"^!RR!(.+)\n.*\n\nTo: (.+)").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub message_subject: String,
    pub message_to: String,
    pub local_message_id: String,
    pub delivered_time: String,
    pub extra_text: String,
}

impl DeliveryReceipt {
    pub fn decode(subject: &str, body: &str) -> Option<Self> {
        let message_subject = subject.strip_prefix("DELIVERED: ")?;
        let caps = DELIVERY_RECEIPT_RE.captures(body)?;
        Some(Self {
            message_subject: message_subject.to_string(),
            message_to: caps[3].to_string(),
            local_message_id: caps[1].to_string(),
            delivered_time: caps[2].to_string(),
            extra_text: body[caps[0].len()..].trim().to_string(),
        })
    }

    pub fn encode_subject(&self) -> String {
        format!("DELIVERED: {}", self.message_subject)
    }

    pub fn encode_body(&self) -> String {
        format!(
            "!LMI!{id}!DR!{time}\nYour Message\nTo: {to}\nSubject: {subject}\nwas delivered on {time}\nRecipient's Local Message ID: {id}\n",
            id = self.local_message_id,
            time = self.delivered_time,
            to = self.message_to,
            subject = self.message_subject,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadReceipt {
    pub message_subject: String,
    pub message_to: String,
    pub read_time: String,
    pub extra_text: String,
}

impl ReadReceipt {
    pub fn decode(subject: &str, body: &str) -> Option<Self> {
        let message_subject = subject.strip_prefix("READ: ")?;
        let caps = READ_RECEIPT_RE.captures(body)?;
        Some(Self {
            message_subject: message_subject.to_string(),
            message_to: caps[2].to_string(),
            read_time: caps[1].to_string(),
            extra_text: body[caps[0].len()..].trim().to_string(),
        })
    }
}
