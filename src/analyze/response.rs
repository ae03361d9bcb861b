//! Composition of the messages sent back to the sender.

use chrono::{DateTime, FixedOffset};
use std::fmt::Write as _;

use super::english::Wrapper;
use super::problem::capitalize;
use super::reference::Reference;
use super::Analysis;
use crate::message::receipt::DeliveryReceipt;

const MULTIPLE_ISSUES_SUBJECT: &str = "Issues with packet practice message";

/// A problem report, before it is given a message number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Subject text, without the message number and handling order.
    pub subject: String,
    pub body: String,
}

/// Delivery receipt for a human message. Receipts, bounces and unparseable
/// messages get none.
pub fn delivery_receipt(analysis: &Analysis, now: DateTime<FixedOffset>) -> Option<DeliveryReceipt> {
    if analysis.is_terminal() || analysis.message.is_none() {
        return None;
    }
    Some(DeliveryReceipt {
        message_subject: analysis.subject.clone(),
        message_to: format!(
            "{}@{}.ampr.org",
            analysis.session.call_sign.to_lowercase(),
            analysis.to_bbs.to_lowercase()
        ),
        local_message_id: analysis.local_id.clone(),
        delivered_time: now.format("%m/%d/%Y %H:%M:%S").to_string(),
        extra_text: String::new(),
    })
}

/// Consolidated report of every fired problem that is configured to be
/// reported, or `None` when there is nothing to report.
pub fn problem_report(analysis: &Analysis) -> Option<Report> {
    let reported: Vec<_> = analysis.fired.iter().filter(|f| f.responds()).collect();
    let subject = match reported.as_slice() {
        [] => return None,
        [only] => capitalize(only.label),
        _ => MULTIPLE_ISSUES_SUBJECT.to_string(),
    };
    let plural = if reported.len() > 1 { "s" } else { "" };
    let not_counted = if analysis.counted() {
        ""
    } else {
        "  The message will not be counted."
    };

    let mut references = Reference::PACKET_GROUP;
    let mut wrapper = Wrapper::new();
    // Writes to a Wrapper cannot fail.
    let _ = write!(
        wrapper,
        "The packet practice message\n    From: {}\n    To: {}@{}\n    Subject: {}\n    Date: {}\nhas the following issue{plural}.{not_counted}\n",
        analysis.envelope.return_addr,
        analysis.session.call_sign.to_lowercase(),
        analysis.to_bbs.to_lowercase(),
        analysis.subject,
        analysis.envelope.date_header,
    );
    for fired in &reported {
        references |= fired.references;
        let _ = write!(wrapper, "\n{}\n", fired.paragraph);
    }
    let _ = wrapper.write_str("\nFor more information:");
    for text in references.texts() {
        let _ = wrapper.write_str(text);
    }
    Some(Report {
        subject,
        body: wrapper.finish(),
    })
}
