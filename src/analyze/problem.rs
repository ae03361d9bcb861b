//! Definition of a single problem rule.

use lazy_static::lazy_static;
use regex::Regex;

use super::reference::Reference;
use super::Analysis;
use crate::config::ProblemAction;

lazy_static! {
    pub(crate) static ref PLACEHOLDER_RE: Regex = Regex::new(r"\{([A-Z][A-Z_]*)\}").unwrap();
}

/// Result of evaluating a problem against a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detection {
    /// The check does not apply to this message and earns no points.
    NotApplicable,
    /// The check applies and passed.
    Clear,
    /// The problem is present. The variant selects the report template;
    /// the empty variant is the default.
    Fired(&'static str),
}

pub type Detector = fn(&Analysis) -> Detection;
pub type Deriver = fn(&mut Analysis);
pub type Variable = fn(&Analysis) -> String;

/// The codes of the terminal classifications, in precedence order.
pub const TERMINALS: [&str; 4] = ["MessageCorrupt", "BounceMessage", "DeliveryReceipt", "ReadReceipt"];

pub struct Problem {
    pub code: &'static str,
    /// Short description, used in summaries and report subjects.
    pub label: &'static str,
    /// Problems that must run first because this one reads what they derive.
    pub after: Vec<&'static str>,
    /// Problems whose firing suppresses this one.
    pub ifnot: Vec<&'static str>,
    pub references: Reference,
    /// Informational problems are reported but cost no points.
    pub informational: bool,
    /// Terminal problems classify the whole message and carry no points.
    pub terminal: bool,
    pub default_actions: Vec<ProblemAction>,
    derive: Option<Deriver>,
    detect: Detector,
    templates: Vec<(&'static str, &'static str)>,
    variables: Vec<(&'static str, Variable)>,
}

impl std::fmt::Debug for Problem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Problem")
            .field("code", &self.code)
            .field("after", &self.after)
            .field("ifnot", &self.ifnot)
            .finish_non_exhaustive()
    }
}

impl Problem {
    /// A problem that is reported to the sender by default.
    pub fn new(code: &'static str, label: &'static str, detect: Detector) -> Self {
        Self {
            code,
            label,
            after: Vec::new(),
            ifnot: Vec::new(),
            references: Reference::NONE,
            informational: false,
            terminal: false,
            default_actions: vec![ProblemAction::Respond],
            derive: None,
            detect,
            templates: Vec::new(),
            variables: Vec::new(),
        }
    }

    /// A terminal classification. Terminal problems are mutually exclusive,
    /// silent, and never counted, unless configured otherwise.
    pub fn terminal(code: &'static str, label: &'static str, detect: Detector) -> Self {
        let earlier: Vec<&'static str> = TERMINALS.iter().copied().take_while(|t| *t != code).collect();
        Self {
            terminal: true,
            default_actions: vec![ProblemAction::DontCount],
            ..Self::new(code, label, detect)
        }
        .ifnot(&earlier)
    }

    /// A check on a human-written message: suppressed by every terminal
    /// classification.
    pub fn human(code: &'static str, label: &'static str, detect: Detector) -> Self {
        Self::new(code, label, detect).ifnot(&TERMINALS)
    }

    pub fn after(mut self, codes: &[&'static str]) -> Self {
        self.after.extend_from_slice(codes);
        self
    }

    pub fn ifnot(mut self, codes: &[&'static str]) -> Self {
        self.ifnot.extend_from_slice(codes);
        self
    }

    pub fn references(mut self, references: Reference) -> Self {
        self.references = references;
        self
    }

    pub fn informational(mut self) -> Self {
        self.informational = true;
        self
    }

    /// Messages with this problem are not counted as check-ins.
    pub fn dont_count(mut self) -> Self {
        if !self.default_actions.contains(&ProblemAction::DontCount) {
            self.default_actions.push(ProblemAction::DontCount);
        }
        self
    }

    /// Do not report this problem to the sender.
    pub fn silent(mut self) -> Self {
        self.default_actions.retain(|a| *a != ProblemAction::Respond);
        self
    }

    pub fn respond(mut self) -> Self {
        if !self.default_actions.contains(&ProblemAction::Respond) {
            self.default_actions.insert(0, ProblemAction::Respond);
        }
        self
    }

    /// Compute shared facts for later problems. Runs before `detect` when
    /// the problem is not suppressed.
    pub fn derive(mut self, derive: Deriver) -> Self {
        self.derive = Some(derive);
        self
    }

    pub fn template(mut self, text: &'static str) -> Self {
        self.templates.push(("", text));
        self
    }

    pub fn variant(mut self, variant: &'static str, text: &'static str) -> Self {
        self.templates.push((variant, text));
        self
    }

    pub fn variable(mut self, name: &'static str, value: Variable) -> Self {
        self.variables.push((name, value));
        self
    }

    pub(crate) fn run_derive(&self, analysis: &mut Analysis) {
        if let Some(derive) = self.derive {
            derive(analysis);
        }
    }

    pub(crate) fn detect(&self, analysis: &Analysis) -> Detection {
        (self.detect)(analysis)
    }

    pub(crate) fn templates(&self) -> &[(&'static str, &'static str)] {
        &self.templates
    }

    pub(crate) fn has_variable(&self, name: &str) -> bool {
        self.variables.iter().any(|(n, _)| *n == name)
    }

    /// Render the report paragraph for a fired variant. Unknown variants
    /// fall back to the default template, and then to the label.
    pub fn render(&self, variant: &str, analysis: &Analysis) -> String {
        let template = self
            .templates
            .iter()
            .find(|(v, _)| *v == variant)
            .or_else(|| self.templates.iter().find(|(v, _)| v.is_empty()))
            .map(|(_, t)| *t);
        let Some(template) = template else {
            log::error!("{} has no template for variant {variant:?}", self.code);
            return capitalize(self.label);
        };
        PLACEHOLDER_RE
            .replace_all(template, |caps: &regex::Captures| {
                let name = &caps[1];
                match self.variables.iter().find(|(n, _)| *n == name) {
                    Some((_, value)) => value(analysis),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}

pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
