//! The standard catalogue of problems a practice message can have.
//!
//! Problems are registered here in their natural reading order; the
//! registry reorders them only as far as their dependencies require.

mod bbs;
mod encoding;
mod form;
mod msgnum;
mod msgtype;
mod nonhuman;
mod plain;
mod practice;
mod sender;
mod window;

use super::english::conjoin;
use super::registry::{ProblemRegistry, RegistryBuilder};
use super::Analysis;
use crate::error::RegistryError;

pub use msgtype::MESSAGE_TYPE_WRONG;

pub fn standard_registry() -> Result<ProblemRegistry, RegistryError> {
    let mut builder = RegistryBuilder::new();
    builder
        .register(nonhuman::message_corrupt())
        .register(nonhuman::bounce_message())
        .register(nonhuman::delivery_receipt())
        .register(nonhuman::read_receipt())
        .register(encoding::message_from_winlink())
        .register(encoding::message_not_plain_text())
        .register(encoding::message_not_ascii())
        .register(bbs::from_bbs_down())
        .register(bbs::to_bbs_down())
        .register(bbs::to_bbs())
        .register(sender::no_call_sign())
        .register(practice::practice_subject_format())
        .register(practice::form_practice_subject())
        .register(practice::unknown_jurisdiction())
        .register(msgnum::msg_num_format())
        .register(msgnum::msg_num_prefix())
        .register(window::message_too_late())
        .register(window::message_too_early())
        .register(window::session_date())
        .register(msgtype::message_type_wrong())
        .register(sender::form_no_call_sign())
        .register(sender::call_sign_conflict())
        .register(form::form_subject())
        .register(form::form_invalid())
        .register(form::pifo_version())
        .register(form::form_version())
        .register(form::form_destination())
        .register(form::form_to_ics_position())
        .register(form::form_to_location())
        .register(form::form_handling_order())
        .register(plain::subject_format())
        .register(plain::handling_order_code())
        .register(plain::subject_has_severity())
        .register(plain::practice_as_form_name())
        .register(plain::form_corrupt())
        .register(plain::subject_plain_form());
    builder.freeze()
}

// Template variables shared by several problems.

fn session_name(a: &Analysis) -> String {
    a.session.name.clone()
}

fn net_day(a: &Analysis) -> String {
    a.session.net_day()
}

fn session_call_sign(a: &Analysis) -> String {
    a.session.call_sign.clone()
}

fn to_bbs(a: &Analysis) -> String {
    a.to_bbs.clone()
}

fn accepted_bbses(a: &Analysis) -> String {
    conjoin(&a.session.to_bbses, "or")
}

fn type_name(a: &Analysis) -> String {
    a.message_type().map(|t| t.name).unwrap_or_default().to_string()
}

fn type_article(a: &Analysis) -> String {
    a.message_type().map(|t| t.article).unwrap_or_default().to_string()
}
