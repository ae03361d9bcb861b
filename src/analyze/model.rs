//! Comparison of received messages against a session's model message.

use super::english::conjoin;
use super::reference::Reference;
use crate::config::Config;
use crate::message::compare::CompareField;
use crate::message::TypedMessage;

/// Points for a routing field scored against the recommended values.
const RECOMMENDED_FIELD_POINTS: u32 = 2;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Comparison {
    pub fields: Vec<CompareField>,
    pub score: u32,
    pub out_of: u32,
    /// Labels of fields the model left blank that the sender did not fill
    /// in with a recommended value.
    pub noted: Vec<&'static str>,
}

/// Compare `actual` field by field against the model. Fields the model
/// leaves blank for the sender to look up are scored against the
/// recommended routing for the form type instead.
pub fn compare(model: &TypedMessage, actual: &TypedMessage, config: &Config) -> Comparison {
    let mut comparison = Comparison {
        fields: model.compare(actual),
        ..Comparison::default()
    };
    if let (Some(expected), Some(received)) = (model.form(), actual.form()) {
        let expected_key = expected.key_fields();
        let received_key = received.key_fields();
        let recommended = config.message_types.get(expected.message_type().tag);
        let handling: Vec<String> = recommended
            .map(|r| r.handling_order.clone())
            .filter(|h| !h.is_empty())
            .into_iter()
            .collect();
        let checks: [(&'static str, &str, &str, &[String]); 3] = [
            (
                "To ICS Position",
                &expected_key.to_ics_position,
                &received_key.to_ics_position,
                recommended.map(|r| r.to_ics_position.as_slice()).unwrap_or(&[]),
            ),
            (
                "To Location",
                &expected_key.to_location,
                &received_key.to_location,
                recommended.map(|r| r.to_location.as_slice()).unwrap_or(&[]),
            ),
            (
                "Handling",
                &expected_key.handling,
                &received_key.handling,
                &handling,
            ),
        ];
        for (label, expected, received, values) in checks {
            if expected.is_empty() {
                comparison.score_recommended(label, received, values);
            }
        }
    }
    comparison.score = comparison.fields.iter().map(|f| f.score).sum();
    comparison.out_of = comparison.fields.iter().map(|f| f.out_of).sum();
    comparison
}

impl Comparison {
    fn score_recommended(&mut self, label: &'static str, received: &str, recommended: &[String]) {
        let position = self.fields.iter().position(|f| f.label == label);
        if recommended.is_empty() {
            if let Some(i) = position {
                self.fields.remove(i);
            }
            return;
        }
        let ok = recommended.iter().any(|r| r == received);
        if !ok {
            self.noted.push(label);
        }
        let field = CompareField {
            label: if ok {
                label.to_string()
            } else {
                format!("{label} [See NOTE]")
            },
            expected: conjoin(recommended, "or"),
            actual: received.to_string(),
            score: if ok { RECOMMENDED_FIELD_POINTS } else { 0 },
            out_of: RECOMMENDED_FIELD_POINTS,
        };
        match position {
            Some(i) => self.fields[i] = field,
            None => self.fields.push(field),
        }
    }

    /// Report paragraph listing the fields that differ.
    pub fn paragraph(&self) -> String {
        let mut text = String::from(
            "This message has differences from the model message provided for this practice session:\n",
        );
        for field in self.fields.iter().filter(|f| !f.is_match()) {
            text.push_str(&format!(
                "    {}: \"{}\" should be \"{}\"\n",
                field.label,
                one_line(&field.actual),
                one_line(&field.expected)
            ));
        }
        if !self.noted.is_empty() {
            let quoted: Vec<String> = self.noted.iter().map(|l| format!("\"{l}\"")).collect();
            let verb = if self.noted.len() == 1 { " was" } else { "s were" };
            text.push_str(&format!(
                "\nNOTE: The {} field{verb} not provided in the model message.  \
                 Recommended values for key fields should be filled in based on the \
                 \"SCCo ARES/RACES Recommended Form Routing\" document when the message \
                 author does not provide them.\n",
                conjoin(&quoted, "and")
            ));
        }
        text.trim_end().to_string()
    }

    pub fn references(&self) -> Reference {
        if self.noted.is_empty() {
            Reference::NONE
        } else {
            Reference::FORM_ROUTING
        }
    }
}

fn one_line(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}
