//! Checks on the contents and routing of a recognized form.

use super::type_name;
use crate::analyze::english::conjoin;
use crate::analyze::problem::{Detection, Problem};
use crate::analyze::reference::Reference;
use crate::analyze::Analysis;
use crate::config::MessageTypeConfig;
use crate::message::{older_version, FormMessage, TypedMessage};

fn form(a: &Analysis) -> Option<&dyn FormMessage> {
    a.message.as_ref().and_then(TypedMessage::form)
}

/// Routing recommendations apply to forms only when there is no model
/// message to copy.
fn routing(a: &Analysis) -> Option<&MessageTypeConfig> {
    if a.model.is_some() || !a.is_form() {
        return None;
    }
    a.type_config()
}

fn bad_position(a: &Analysis, config: &MessageTypeConfig) -> bool {
    !config.to_ics_position.is_empty() && !config.to_ics_position.contains(&a.key.to_ics_position)
}

fn bad_location(a: &Analysis, config: &MessageTypeConfig) -> bool {
    !config.to_location.is_empty() && !config.to_location.contains(&a.key.to_location)
}

fn expected_positions(a: &Analysis) -> String {
    routing(a).map(|c| conjoin(&c.to_ics_position, "or")).unwrap_or_default()
}

fn expected_locations(a: &Analysis) -> String {
    routing(a).map(|c| conjoin(&c.to_location, "or")).unwrap_or_default()
}

pub(super) fn form_subject() -> Problem {
    Problem::human("FormSubject", "message subject doesn't agree with form contents", |a: &Analysis| {
        match form(a) {
            None => Detection::NotApplicable,
            Some(f) if f.encode_subject() == a.subject => Detection::Clear,
            Some(_) => Detection::Fired(""),
        }
    })
    .template(
        "This message has\n    \
         Subject: {ACTUAL}\n\
         but, based on the contents of the form, it should have\n    \
         Subject: {EXPECTED}\n\
         PackItForms automatically generates the Subject line from the form \
         contents; it should not be overridden manually.",
    )
    .variable("ACTUAL", |a: &Analysis| a.subject.clone())
    .variable("EXPECTED", |a: &Analysis| form(a).map(|f| f.encode_subject()).unwrap_or_default())
}

pub(super) fn form_invalid() -> Problem {
    Problem::human("FormInvalid", "invalid form contents", |a: &Analysis| match form(a) {
        None => Detection::NotApplicable,
        Some(f) if f.validate().is_empty() => Detection::Clear,
        Some(_) => Detection::Fired(""),
    })
    .template(
        "This message contains a form with invalid contents:\n    \
         {PROBLEMS}\n\
         Please verify the correctness of the form before sending.",
    )
    .variable("PROBLEMS", |a: &Analysis| {
        form(a).map(|f| f.validate().join("\n    ")).unwrap_or_default()
    })
}

pub(super) fn pifo_version() -> Problem {
    Problem::human("PIFOVersion", "PackItForms version out of date", |a: &Analysis| {
        if !a.is_form() {
            Detection::NotApplicable
        } else if older_version(&a.key.pifo_version, &a.config.min_pifo_version) {
            Detection::Fired("")
        } else {
            Detection::Clear
        }
    })
    .template(
        "This message was generated by PackItForms version {HAVE}.  That version \
         is no longer supported.  Please upgrade to PackItForms version {MIN} \
         or later.",
    )
    .variable("HAVE", |a: &Analysis| a.key.pifo_version.clone())
    .variable("MIN", |a: &Analysis| a.config.min_pifo_version.clone())
}

fn minimum_form_version(a: &Analysis) -> String {
    a.type_config().map(|c| c.minimum_version.clone()).unwrap_or_default()
}

pub(super) fn form_version() -> Problem {
    Problem::human("FormVersion", "form version out of date", |a: &Analysis| {
        if !a.is_form() {
            Detection::NotApplicable
        } else if older_version(&a.key.form_version, &minimum_form_version(a)) {
            Detection::Fired("")
        } else {
            Detection::Clear
        }
    })
    .template(
        "This message contains version {HAVE} of the {TYPE}.  That version is \
         no longer supported.  Please use version {MIN} or later of the form.",
    )
    .variable("HAVE", |a: &Analysis| a.key.form_version.clone())
    .variable("TYPE", type_name)
    .variable("MIN", minimum_form_version)
}

pub(super) fn form_destination() -> Problem {
    Problem::human("FormDestination", "incorrect destination for form", |a: &Analysis| {
        let Some(config) = routing(a) else {
            return Detection::NotApplicable;
        };
        if config.to_ics_position.is_empty() || config.to_location.is_empty() {
            return Detection::NotApplicable;
        }
        if bad_position(a, config) && bad_location(a, config) {
            Detection::Fired("")
        } else {
            Detection::Clear
        }
    })
    .references(Reference::FORM_ROUTING)
    .template(
        "This {TYPE} is addressed to ICS position \"{POSITION}\" at location \
         \"{LOCATION}\".  {TYPE_PLURAL} should be addressed to {EXPECTED_POSITION} \
         at {EXPECTED_LOCATION}.",
    )
    .variable("TYPE", type_name)
    .variable("TYPE_PLURAL", |a: &Analysis| {
        crate::analyze::problem::capitalize(&format!("{}s", type_name(a)))
    })
    .variable("POSITION", |a: &Analysis| a.key.to_ics_position.clone())
    .variable("LOCATION", |a: &Analysis| a.key.to_location.clone())
    .variable("EXPECTED_POSITION", expected_positions)
    .variable("EXPECTED_LOCATION", expected_locations)
}

pub(super) fn form_to_ics_position() -> Problem {
    Problem::human("FormToICSPosition", "incorrect \"To ICS Position\" for form", |a: &Analysis| {
        match routing(a) {
            Some(config) if !config.to_ics_position.is_empty() => {
                if bad_position(a, config) {
                    Detection::Fired("")
                } else {
                    Detection::Clear
                }
            }
            _ => Detection::NotApplicable,
        }
    })
    .ifnot(&["FormDestination"])
    .references(Reference::FORM_ROUTING)
    .template(
        "This {TYPE} is addressed to ICS position \"{POSITION}\".  It should be \
         addressed to {EXPECTED}.",
    )
    .variable("TYPE", type_name)
    .variable("POSITION", |a: &Analysis| a.key.to_ics_position.clone())
    .variable("EXPECTED", expected_positions)
}

pub(super) fn form_to_location() -> Problem {
    Problem::human("FormToLocation", "incorrect \"To Location\" for form", |a: &Analysis| {
        match routing(a) {
            Some(config) if !config.to_location.is_empty() => {
                if bad_location(a, config) {
                    Detection::Fired("")
                } else {
                    Detection::Clear
                }
            }
            _ => Detection::NotApplicable,
        }
    })
    .ifnot(&["FormDestination"])
    .references(Reference::FORM_ROUTING)
    .template(
        "This {TYPE} is addressed to location \"{LOCATION}\".  It should be \
         addressed to {EXPECTED}.",
    )
    .variable("TYPE", type_name)
    .variable("LOCATION", |a: &Analysis| a.key.to_location.clone())
    .variable("EXPECTED", expected_locations)
}

pub(super) fn form_handling_order() -> Problem {
    Problem::human("FormHandlingOrder", "incorrect handling order for form", |a: &Analysis| {
        match routing(a) {
            Some(config) if !config.handling_order.is_empty() => {
                if config.handling_order == a.key.handling {
                    Detection::Clear
                } else {
                    Detection::Fired("")
                }
            }
            _ => Detection::NotApplicable,
        }
    })
    .references(Reference::FORM_ROUTING)
    .template(
        "This {TYPE} has handling order {HAVE}.  This type of form should have \
         handling order {WANT}.",
    )
    .variable("TYPE", type_name)
    .variable("HAVE", |a: &Analysis| a.key.handling.clone())
    .variable("WANT", |a: &Analysis| {
        a.type_config().map(|c| c.handling_order.clone()).unwrap_or_default()
    })
}
