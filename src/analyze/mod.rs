//! Analysis of received practice messages.
//!
//! `Analyzer::analyze` decodes one retrieved message, runs every registered
//! problem in dependency order, scores the result, and returns an
//! `Analysis` from which the caller commits a record and composes the
//! responses to send.

pub mod callsign;
pub mod english;
pub mod jurisdiction;
pub mod model;
pub mod problem;
pub mod problems;
pub mod reference;
pub mod registry;
pub mod response;

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, NaiveDate};
use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::config::{Config, MessageTypeConfig, ProblemAction};
use crate::envelope::{parse_retrieved, Envelope, Retrieved};
use crate::error::DecodeError;
use crate::message::{self, KeyFields, MessageType, TypedMessage};
use crate::session::Session;
use crate::store::{MessageRecord, Response, Store};
use jurisdiction::JurisdictionLookup;
use problem::{Detection, Problem};
use reference::Reference;
use registry::ProblemRegistry;

/// Code of the finding recorded when a message differs from the session's
/// model message. It is not a registered problem but is configured and
/// reported like one.
pub const MODEL_MISMATCH: &str = "ModelMismatch";

const MODEL_MISMATCH_LABEL: &str = "message not transcribed correctly";

/// A problem found in a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fired {
    pub code: &'static str,
    pub label: &'static str,
    pub variant: &'static str,
    /// Report paragraph, with variables substituted.
    pub paragraph: String,
    pub references: Reference,
    pub informational: bool,
    pub terminal: bool,
    pub actions: Vec<ProblemAction>,
}

impl Fired {
    pub fn responds(&self) -> bool {
        self.actions.contains(&ProblemAction::Respond)
    }

    pub fn dont_count(&self) -> bool {
        self.actions.contains(&ProblemAction::DontCount)
    }
}

/// The working record for one received message.
#[derive(Debug)]
pub struct Analysis {
    pub raw: String,
    pub hash: String,
    pub local_id: String,
    pub session: Session,
    pub config: Arc<Config>,
    /// BBS the message was retrieved from.
    pub to_bbs: String,
    pub envelope: Envelope,
    pub subject: String,
    pub body: String,
    pub decode_error: Option<DecodeError>,
    /// Decoded message. Absent for unparseable messages and bounces.
    pub message: Option<TypedMessage>,
    pub key: KeyFields,
    /// Plain text body that looks like a damaged form encoding.
    pub corrupt_form: bool,
    /// Decoded model message of the session, if it has one.
    pub model: Option<TypedMessage>,

    // Facts derived while the problems run.
    pub from_bbs: String,
    pub from_call_sign: String,
    /// Jurisdiction named on the practice subject line, canonicalized when
    /// it is a known one.
    pub subject_jurisdiction: String,
    pub net_date: Option<NaiveDate>,

    /// Jurisdiction of the sender, from the county database.
    pub jurisdiction: String,
    pub fired: Vec<Fired>,
    pub score: u32,
    pub out_of: u32,
    pub summary: String,
}

impl Analysis {
    fn new(
        raw: &str,
        retrieved: Retrieved,
        hash: String,
        local_id: String,
        session: &Session,
        config: Arc<Config>,
        bbs: &str,
    ) -> Self {
        let envelope = retrieved.envelope;
        let decoded = (retrieved.error.is_none() && !envelope.autoresponse)
            .then(|| message::decode(&envelope.subject, &retrieved.body));
        let key = decoded
            .as_ref()
            .map(|m| m.key_fields(&envelope.subject))
            .unwrap_or_default();
        let corrupt_form = matches!(decoded, Some(TypedMessage::PlainText(_)))
            && message::pifo::FORM_MARKERS
                .iter()
                .any(|marker| retrieved.body.contains(marker));
        let model = session
            .model
            .as_ref()
            .map(|m| message::decode(&m.subject, &m.body));
        Self {
            raw: raw.to_string(),
            hash,
            local_id,
            session: session.clone(),
            config,
            to_bbs: bbs.to_string(),
            subject: envelope.subject.clone(),
            envelope,
            body: retrieved.body,
            decode_error: retrieved.error,
            message: decoded,
            key,
            corrupt_form,
            model,
            from_bbs: String::new(),
            from_call_sign: String::new(),
            subject_jurisdiction: String::new(),
            net_date: None,
            jurisdiction: String::new(),
            fired: Vec::new(),
            score: 0,
            out_of: 0,
            summary: String::new(),
        }
    }

    pub fn message_type(&self) -> Option<&'static MessageType> {
        self.message.as_ref().map(TypedMessage::message_type)
    }

    /// Whether the message is a recognized form.
    pub fn is_form(&self) -> bool {
        self.message.as_ref().and_then(TypedMessage::form).is_some()
    }

    pub fn is_plain_text(&self) -> bool {
        self.message.as_ref().is_some_and(TypedMessage::is_plain_text)
    }

    /// Configuration for the message's type, if it has any.
    pub fn type_config(&self) -> Option<&MessageTypeConfig> {
        self.message_type()
            .and_then(|t| self.config.message_types.get(t.tag))
    }

    pub fn has_fired(&self, code: &str) -> bool {
        self.fired.iter().any(|f| f.code == code)
    }

    /// Whether the message got a terminal classification.
    pub fn is_terminal(&self) -> bool {
        self.fired.iter().any(|f| f.terminal)
    }

    /// When the message reached the BBS.
    pub fn arrival(&self) -> Option<DateTime<FixedOffset>> {
        self.envelope.arrival()
    }

    /// Fired problem codes, sorted.
    pub fn problem_codes(&self) -> Vec<String> {
        let mut codes: Vec<String> = self.fired.iter().map(|f| f.code.to_string()).collect();
        codes.sort();
        codes
    }

    /// Whether the message counts as a check-in.
    pub fn counted(&self) -> bool {
        !self.fired.iter().any(Fired::dont_count)
    }

    pub fn record(&self) -> MessageRecord {
        MessageRecord {
            local_id: self.local_id.clone(),
            hash: self.hash.clone(),
            delivery_time: self.envelope.date,
            message: self.raw.clone(),
            session: self.session.id,
            from_address: self.envelope.return_addr.clone(),
            from_call_sign: self.from_call_sign.clone(),
            from_bbs: self.from_bbs.clone(),
            to_bbs: self.to_bbs.clone(),
            jurisdiction: self.jurisdiction.clone(),
            message_type: self
                .message_type()
                .map(|t| t.tag.to_string())
                .unwrap_or_default(),
            subject: self.subject.clone(),
            problems: self.problem_codes(),
            score: self.score,
            out_of: self.out_of,
            summary: self.summary.clone(),
            counted: self.counted(),
        }
    }

    /// Save the analysis to the store.
    pub fn commit(&self, store: &dyn Store) -> Result<()> {
        let record = self.record();
        store
            .save_message(&record)
            .with_context(|| format!("saving message {}", self.local_id))?;
        let tag = self.message_type().map(|t| t.tag).unwrap_or("-");
        log::info!(
            "=> {} {tag} {}",
            record.local_id,
            record.problems.join(",")
        );
        Ok(())
    }

    fn actions(&self, code: &str, defaults: &[ProblemAction]) -> Vec<ProblemAction> {
        match self.config.problems.get(code) {
            Some(actions) if actions.is_empty() => {
                log::error!("Configuration gives no action for {code}; ignoring it");
                Vec::new()
            }
            Some(actions) => actions.clone(),
            None => defaults.to_vec(),
        }
    }

    fn run(&mut self, problem: &Problem) {
        if problem.ifnot.iter().any(|code| self.has_fired(code)) {
            return;
        }
        problem.run_derive(self);
        let weight = if problem.terminal {
            0
        } else {
            self.config.weight(problem.code).max(1)
        };
        match problem.detect(self) {
            Detection::NotApplicable => {}
            Detection::Clear => {
                self.out_of += weight;
                self.score += weight;
            }
            Detection::Fired(variant) => {
                self.out_of += weight;
                if problem.informational {
                    self.score += weight;
                }
                let fired = Fired {
                    code: problem.code,
                    label: problem.label,
                    variant,
                    paragraph: problem.render(variant, self),
                    references: problem.references,
                    informational: problem.informational,
                    terminal: problem.terminal,
                    actions: self.actions(problem.code, &problem.default_actions),
                };
                log::debug!("{} fired {}{}", self.local_id, problem.code, variant_suffix(variant));
                self.fired.push(fired);
            }
        }
    }

    /// Compare against the session's model message, when there is one and
    /// the message is of the model's type.
    fn compare_to_model(&mut self) {
        if self.is_terminal() {
            return;
        }
        let (Some(model), Some(actual)) = (&self.model, &self.message) else {
            return;
        };
        if self
            .fired
            .iter()
            .any(|f| f.code == problems::MESSAGE_TYPE_WRONG && f.variant == "model")
        {
            // Half credit at best for the wrong type.
            self.out_of *= 2;
            return;
        }
        let comparison = model::compare(model, actual, &self.config);
        self.score += comparison.score;
        self.out_of += comparison.out_of;
        if comparison.score < comparison.out_of {
            self.fired.push(Fired {
                code: MODEL_MISMATCH,
                label: MODEL_MISMATCH_LABEL,
                variant: "",
                paragraph: comparison.paragraph(),
                references: comparison.references(),
                informational: false,
                terminal: false,
                actions: self.actions(MODEL_MISMATCH, &[ProblemAction::Respond]),
            });
        }
    }

    fn finish_scoring(&mut self) {
        if self.is_terminal() {
            self.score = 0;
            self.out_of = 1;
        } else if self.out_of == 0 {
            self.score = 1;
            self.out_of = 1;
        }
        let mut serious = self.fired.iter().filter(|f| !f.informational);
        self.summary = match (serious.next(), serious.next()) {
            (Some(_), Some(_)) => "multiple issues".to_string(),
            (Some(first), None) => first.label.to_string(),
            (None, _) => self
                .fired
                .first()
                .map(|f| f.label.to_string())
                .unwrap_or_else(|| "OK".to_string()),
        };
    }

    /// Outgoing messages in reply to this one: a delivery receipt for human
    /// messages, then a problem report if any reported problem fired.
    pub fn responses(&self, store: &dyn Store, now: DateTime<FixedOffset>) -> Result<Vec<Response>> {
        if self.session.dont_send_responses {
            return Ok(Vec::new());
        }
        let mut list = Vec::new();
        if let Some(receipt) = response::delivery_receipt(self, now) {
            let local_id = store.next_message_id(&self.session.prefix)?;
            list.push(self.response(local_id, receipt.encode_subject(), receipt.encode_body()));
        }
        if let Some(report) = response::problem_report(self) {
            let local_id = store.next_message_id(&self.session.prefix)?;
            let subject = message::subject::encode_subject(&local_id, "ROUTINE", "", &report.subject);
            list.push(self.response(local_id, subject, report.body));
        }
        Ok(list)
    }

    fn response(&self, local_id: String, subject: String, body: String) -> Response {
        Response {
            local_id,
            response_to: self.local_id.clone(),
            to: self.envelope.return_addr.clone(),
            subject,
            body,
            send_time: None,
            sender_call: self.session.call_sign.clone(),
            sender_bbs: self.to_bbs.clone(),
        }
    }
}

fn variant_suffix(variant: &str) -> String {
    if variant.is_empty() {
        String::new()
    } else {
        format!(" ({variant})")
    }
}

/// Result of `Analyzer::analyze`.
#[derive(Debug)]
pub enum Outcome {
    /// The same message was analyzed before.
    AlreadyHandled { local_id: String },
    Analyzed(Box<Analysis>),
}

impl Outcome {
    pub fn analysis(&self) -> Option<&Analysis> {
        match self {
            Outcome::Analyzed(analysis) => Some(analysis),
            Outcome::AlreadyHandled { .. } => None,
        }
    }

    pub fn commit(&self, store: &dyn Store) -> Result<()> {
        match self {
            Outcome::Analyzed(analysis) => analysis.commit(store),
            Outcome::AlreadyHandled { .. } => Ok(()),
        }
    }

    pub fn responses(&self, store: &dyn Store, now: DateTime<FixedOffset>) -> Result<Vec<Response>> {
        match self {
            Outcome::Analyzed(analysis) => analysis.responses(store, now),
            Outcome::AlreadyHandled { .. } => Ok(Vec::new()),
        }
    }
}

/// Runs the problem registry over received messages. One analyzer is shared
/// by all concurrent analyses.
#[derive(Debug, Clone)]
pub struct Analyzer {
    registry: Arc<ProblemRegistry>,
    config: Arc<Config>,
    jurisdictions: JurisdictionLookup,
}

impl Analyzer {
    /// Build an analyzer with the standard problem registry. A broken
    /// registry is a fatal error.
    pub fn new(config: Config) -> Result<Self> {
        let registry = problems::standard_registry().context("building problem registry")?;
        Self::with_registry(config, registry)
    }

    pub fn with_registry(config: Config, registry: ProblemRegistry) -> Result<Self> {
        let jurisdictions = JurisdictionLookup::new(&config.jurisdiction_lookup)
            .context("creating jurisdiction lookup client")?;
        Ok(Self {
            registry: Arc::new(registry),
            config: Arc::new(config),
            jurisdictions,
        })
    }

    pub fn registry(&self) -> &ProblemRegistry {
        &self.registry
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Analyze one message retrieved from `bbs` for `session`.
    pub async fn analyze(&self, store: &dyn Store, session: &Session, bbs: &str, raw: &str) -> Result<Outcome> {
        let hash = format!("{:x}", Sha256::digest(raw.as_bytes()));
        let retrieved = parse_retrieved(raw, bbs, "");
        if retrieved.error.is_some() && retrieved.envelope.return_addr.is_empty() {
            log::info!("Received at {}@{bbs}: [UNPARSEABLE with hash {hash}]", session.call_sign);
        } else {
            log::info!(
                "Received at {}@{bbs}: from {:?} subject {:?}",
                session.call_sign,
                retrieved.envelope.return_addr,
                retrieved.envelope.subject
            );
        }

        if let Some(local_id) = store.has_message_hash(&hash)? {
            log::info!("=> already handled as {local_id}");
            return Ok(Outcome::AlreadyHandled { local_id });
        }
        let local_id = store.next_message_id(&session.prefix)?;

        let mut analysis = Analysis::new(raw, retrieved, hash, local_id, session, self.config.clone(), bbs);
        for problem in self.registry.ordered() {
            analysis.run(problem);
        }
        analysis.compare_to_model();
        if !analysis.is_terminal() {
            analysis.jurisdiction = self
                .jurisdictions
                .lookup(&analysis.from_call_sign)
                .await
                .unwrap_or_default();
        }
        analysis.finish_scoring();
        Ok(Outcome::Analyzed(Box::new(analysis)))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::session::tests::tuesday_net;
    use crate::session::ModelMessage;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Records saved messages and allocates sequential IDs. Hashes in
    /// `seen` are reported as already handled.
    #[derive(Default)]
    pub(crate) struct ScriptedStore {
        pub seen: Mutex<HashSet<String>>,
        pub saved: Mutex<Vec<MessageRecord>>,
        next_id: Mutex<u32>,
    }

    impl Store for ScriptedStore {
        fn has_message_hash(&self, hash: &str) -> Result<Option<String>> {
            if self.seen.lock().unwrap().contains(hash) {
                return Ok(Some("TUE-001P".to_string()));
            }
            Ok(self
                .saved
                .lock()
                .unwrap()
                .iter()
                .find(|m| m.hash == hash)
                .map(|m| m.local_id.clone()))
        }

        fn next_message_id(&self, prefix: &str) -> Result<String> {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            Ok(format!("{prefix}-{:03}P", 100 + *next))
        }

        fn save_message(&self, record: &MessageRecord) -> Result<()> {
            self.saved.lock().unwrap().push(record.clone());
            Ok(())
        }
    }

    pub(crate) fn test_config() -> Config {
        let mut config = Config::default();
        config.jurisdiction_lookup.force = Some("SJC".to_string());
        config
    }

    pub(crate) fn analyzer() -> Analyzer {
        Analyzer::new(test_config()).unwrap()
    }

    /// A raw message as retrieved from W4XSC.
    pub(crate) fn raw_message(from: &str, subject: &str, date: &str, body: &str) -> String {
        format!(
            "From {from} Tue Jan 11 19:30:00 2022\nReceived: from w4xsc.ampr.org; {date}\nFrom: {from}\nTo: pkttue@w4xsc.ampr.org\nSubject: {subject}\nDate: {date}\n\n{body}"
        )
    }

    pub(crate) fn checkin() -> String {
        raw_message(
            "k6abc@w4xsc.ampr.org",
            "ABC-101P_R_Practice K6ABC, Alice, San Jose, 01/11/2022",
            "Tue, 11 Jan 2022 19:30:00 -0800",
            "Checking in.\n",
        )
    }

    fn now() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2022-01-11T20:05:00-08:00").unwrap()
    }

    async fn analyze(raw: &str, session: &Session, bbs: &str) -> Analysis {
        let store = ScriptedStore::default();
        match analyzer().analyze(&store, session, bbs, raw).await.unwrap() {
            Outcome::Analyzed(analysis) => *analysis,
            other => panic!("unexpected {other:?}"),
        }
    }

    fn assert_bounded(a: &Analysis) {
        assert!(a.score <= a.out_of, "{} > {}", a.score, a.out_of);
        let serious = a.fired.iter().any(|f| !f.informational);
        assert_eq!(a.score == a.out_of, !serious, "fired: {:?}", a.problem_codes());
    }

    #[tokio::test]
    async fn test_unparseable_message() {
        let a = analyze("garbage with no headers at all", &tuesday_net(), "W4XSC").await;
        assert_eq!(a.problem_codes(), vec!["MessageCorrupt"]);
        assert_eq!((a.score, a.out_of), (0, 1));
        assert_eq!(a.summary, "message could not be parsed");
        let store = ScriptedStore::default();
        assert!(a.responses(&store, now()).unwrap().is_empty());
        assert_bounded(&a);
    }

    #[tokio::test]
    async fn test_good_checkin() {
        let a = analyze(&checkin(), &tuesday_net(), "W4XSC").await;
        assert!(a.fired.is_empty(), "fired: {:?}", a.problem_codes());
        assert_eq!(a.score, a.out_of);
        assert!(a.out_of > 1);
        assert_eq!(a.summary, "OK");
        assert!(a.counted());
        assert_eq!(a.from_call_sign, "K6ABC");
        assert_eq!(a.from_bbs, "W4XSC");
        assert_eq!(a.jurisdiction, "SJC");
        assert_eq!(a.subject_jurisdiction, "SJC");

        let store = ScriptedStore::default();
        let responses = a.responses(&store, now()).unwrap();
        assert_eq!(responses.len(), 1);
        let receipt = &responses[0];
        assert_eq!(
            receipt.subject,
            "DELIVERED: ABC-101P_R_Practice K6ABC, Alice, San Jose, 01/11/2022"
        );
        assert!(receipt.body.starts_with(&format!("!LMI!{}!DR!01/11/2022 20:05:00\n", a.local_id)));
        assert!(receipt.body.contains("To: pkttue@w4xsc.ampr.org\n"));
        assert_eq!(receipt.to, "k6abc@w4xsc.ampr.org");
        assert_eq!(receipt.response_to, a.local_id);
        assert_eq!(receipt.sender_call, "PKTTUE");
        assert_eq!(receipt.sender_bbs, "W4XSC");
    }

    #[tokio::test]
    async fn test_sent_to_down_bbs() {
        let a = analyze(&checkin(), &tuesday_net(), "W2XSC").await;
        assert_eq!(a.problem_codes(), vec!["ToBBSDown"]);
        assert!(a.score < a.out_of);
        assert!(!a.counted());
        assert_bounded(&a);

        let store = ScriptedStore::default();
        let responses = a.responses(&store, now()).unwrap();
        assert_eq!(responses.len(), 2);
        let report = &responses[1];
        assert!(report.subject.ends_with("_R_Message to incorrect BBS (simulated outage)"));
        assert!(report.body.contains("The message will not be counted."));
        assert!(report.body.contains("Weekly SPECS/SVECS Packet Practice"));
        assert!(report.body.contains("packet discussion group"));
        assert!(!report.body.contains("Standard Outpost Configuration"));
    }

    #[tokio::test]
    async fn test_call_sign_conflict_in_form() {
        let mut form = crate::message::ics213::tests::sample_form();
        form.op_call = "W6XYZ".to_string();
        let subject = crate::message::FormMessage::encode_subject(&form);
        let raw = raw_message(
            "k6abc@w4xsc.ampr.org",
            &subject,
            "Tue, 11 Jan 2022 19:30:00 -0800",
            &form.encode_body("3.9"),
        );
        let mut session = tuesday_net();
        session.message_types = vec!["ICS213".to_string()];
        let a = analyze(&raw, &session, "W4XSC").await;
        assert_eq!(a.problem_codes(), vec!["CallSignConflict"]);
        assert_eq!(a.from_call_sign, "K6ABC");
        let conflict = &a.fired[0];
        assert!(conflict.paragraph.contains("K6ABC"));
        assert!(conflict.paragraph.contains("W6XYZ"));

        let store = ScriptedStore::default();
        let responses = a.responses(&store, now()).unwrap();
        assert_eq!(responses.len(), 2);
        assert!(responses[1].body.contains("K6ABC"));
        assert!(responses[1].body.contains("W6XYZ"));
        assert_bounded(&a);
    }

    #[tokio::test]
    async fn test_resubmission_is_already_handled() {
        let store = ScriptedStore::default();
        let analyzer = analyzer();
        let session = tuesday_net();
        let first = analyzer.analyze(&store, &session, "W4XSC", &checkin()).await.unwrap();
        first.commit(&store).unwrap();
        let local_id = first.analysis().unwrap().local_id.clone();

        let second = analyzer.analyze(&store, &session, "W4XSC", &checkin()).await.unwrap();
        match &second {
            Outcome::AlreadyHandled { local_id: seen } => assert_eq!(seen, &local_id),
            other => panic!("expected already handled, got {other:?}"),
        }
        second.commit(&store).unwrap();
        assert!(second.responses(&store, now()).unwrap().is_empty());
        assert_eq!(store.saved.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_seen_hash_has_no_side_effects() {
        let store = ScriptedStore::default();
        let hash = format!("{:x}", Sha256::digest(checkin().as_bytes()));
        store.seen.lock().unwrap().insert(hash);
        let outcome = analyzer()
            .analyze(&store, &tuesday_net(), "W4XSC", &checkin())
            .await
            .unwrap();
        assert!(matches!(outcome, Outcome::AlreadyHandled { .. }));
        assert_eq!(*store.next_id.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_read_receipt() {
        let raw = raw_message(
            "k6abc@w4xsc.ampr.org",
            "READ: ABC-101P_R_Practice K6ABC, Alice, San Jose, 01/11/2022",
            "Tue, 11 Jan 2022 19:31:00 -0800",
            "!RR!01/11/2022 19:31:00\nYour Message\n\nTo: pkttue@w4xsc.ampr.org\n",
        );
        let a = analyze(&raw, &tuesday_net(), "W2XSC").await;
        assert_eq!(a.problem_codes(), vec!["ReadReceipt"]);
        assert!(!a.counted());
        assert_eq!((a.score, a.out_of), (0, 1));

        let store = ScriptedStore::default();
        let responses = a.responses(&store, now()).unwrap();
        assert_eq!(responses.len(), 1);
        assert!(responses[0].subject.ends_with("_R_Unexpected READ receipt message"));
        assert!(responses[0].body.contains("Auto-Read Receipt"));
        assert!(responses[0].body.contains("Standard Outpost Configuration"));
    }

    #[tokio::test]
    async fn test_terminal_classifications_are_exclusive() {
        let delivered = raw_message(
            "k6abc@w2xsc.ampr.org",
            "DELIVERED: XYZ-001P_R_Hello",
            "Tue, 11 Jan 2022 19:31:00 -0800",
            "!LMI!ABC-101P!DR!01/11/2022 19:31:00\nYour Message\nTo: x@w2xsc.ampr.org\nSubject: XYZ-001P_R_Hello\nwas delivered on 01/11/2022 19:31:00\nRecipient's Local Message ID: ABC-101P\n",
        );
        let bounce = format!(
            "From  Tue Jan 11 19:30:00 2022\nFrom: MAILER-DAEMON\nSubject: Undeliverable\nDate: Tue, 11 Jan 2022 19:30:00 -0800\n\n\u{00e9}rror\n"
        );
        for (raw, code) in [(delivered, "DeliveryReceipt"), (bounce, "BounceMessage")] {
            // Sent to a down BBS, so routing problems would fire otherwise.
            let a = analyze(&raw, &tuesday_net(), "W2XSC").await;
            assert_eq!(a.problem_codes(), vec![code]);
            assert!(a.fired[0].terminal);
            assert!(!a.counted());
            assert_bounded(&a);
            let store = ScriptedStore::default();
            assert!(a.responses(&store, now()).unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_score_bounds_across_messages() {
        let session = tuesday_net();
        let messages = [
            checkin(),
            raw_message("k6abc@w4xsc.ampr.org", "Hello there", "Tue, 11 Jan 2022 19:30:00 -0800", "Hi\n"),
            raw_message(
                "k6abc@w4xsc.ampr.org",
                "abc-1_Q_ICS213_Practice K6ABC, Alice, Nowhere, 01/04/2022",
                "Mon, 3 Jan 2022 19:30:00 -0800",
                "!SCCoPIFO!\nbroken\n",
            ),
            raw_message(
                "someone@example.com",
                "ABC-101P_R_Practice K6ABC, Alice, San Jose, 01/10/2022",
                "Tue, 11 Jan 2022 19:30:00 -0800",
                "Smart \u{201c}quotes\u{201d}\n",
            ),
        ];
        for raw in &messages {
            for bbs in ["W4XSC", "W2XSC", "W5XSC"] {
                let a = analyze(raw, &session, bbs).await;
                assert_bounded(&a);
            }
        }
    }

    #[tokio::test]
    async fn test_informational_only_keeps_full_score() {
        let raw = raw_message(
            "k6abc@w4xsc.ampr.org",
            "ABC-101P_R_Practice K6ABC, Alice, San Jose, 01/10/2022",
            "Tue, 11 Jan 2022 19:30:00 -0800",
            "Checking in.\n",
        );
        let a = analyze(&raw, &tuesday_net(), "W4XSC").await;
        assert_eq!(a.problem_codes(), vec!["SessionDate"]);
        assert_eq!(a.score, a.out_of);
        assert_eq!(a.summary, "incorrect net date in subject");
        assert!(a.counted());
    }

    #[tokio::test]
    async fn test_multiple_issues_summary() {
        let raw = raw_message(
            "k6abc@w4xsc.ampr.org",
            "Practice K6ABC, Alice, San Jose, 01/11/2022",
            "Tue, 11 Jan 2022 19:30:00 -0800",
            "Checking in.\n",
        );
        let a = analyze(&raw, &tuesday_net(), "W5XSC").await;
        assert!(a.has_fired("ToBBS"));
        assert!(a.has_fired("SubjectFormat"));
        assert_eq!(a.summary, "multiple issues");
        let store = ScriptedStore::default();
        let responses = a.responses(&store, now()).unwrap();
        assert!(responses[1].subject.ends_with("_R_Issues with packet practice message"));
        assert!(responses[1].body.contains("has the following issues."));
    }

    #[tokio::test]
    async fn test_report_is_deterministic() {
        let a = analyze(&checkin(), &tuesday_net(), "W2XSC").await;
        let b = analyze(&checkin(), &tuesday_net(), "W2XSC").await;
        let first = response::problem_report(&a).unwrap();
        assert_eq!(first, response::problem_report(&a).unwrap());
        assert_eq!(first, response::problem_report(&b).unwrap());
    }

    #[tokio::test]
    async fn test_dont_send_responses() {
        let mut session = tuesday_net();
        session.dont_send_responses = true;
        let a = analyze(&checkin(), &session, "W2XSC").await;
        let store = ScriptedStore::default();
        assert!(a.responses(&store, now()).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_configured_actions_override_defaults() {
        let mut config = test_config();
        config
            .problems
            .insert("ToBBSDown".to_string(), vec![ProblemAction::Respond]);
        let analyzer = Analyzer::new(config).unwrap();
        let store = ScriptedStore::default();
        let outcome = analyzer
            .analyze(&store, &tuesday_net(), "W2XSC", &checkin())
            .await
            .unwrap();
        let a = outcome.analysis().unwrap();
        assert!(a.has_fired("ToBBSDown"));
        assert!(a.counted());
    }

    #[tokio::test]
    async fn test_commit_record() {
        let store = ScriptedStore::default();
        let outcome = analyzer()
            .analyze(&store, &tuesday_net(), "W2XSC", &checkin())
            .await
            .unwrap();
        outcome.commit(&store).unwrap();
        let saved = store.saved.lock().unwrap();
        let record = &saved[0];
        assert_eq!(record.problems, vec!["ToBBSDown"]);
        assert_eq!(record.message_type, "plain");
        assert_eq!(record.from_call_sign, "K6ABC");
        assert_eq!(record.to_bbs, "W2XSC");
        assert_eq!(record.session, 42);
        assert!(!record.counted);
        assert_eq!(record.hash.len(), 64);
    }

    #[tokio::test]
    async fn test_model_message_mismatch() {
        let mut session = tuesday_net();
        session.model = Some(ModelMessage {
            subject: "XXX-000P_R_Practice model".to_string(),
            body: "Send two pallets of water to the shelter.\n".to_string(),
        });
        let raw = raw_message(
            "k6abc@w4xsc.ampr.org",
            "ABC-101P_R_Practice K6ABC, Alice, San Jose, 01/11/2022",
            "Tue, 11 Jan 2022 19:30:00 -0800",
            "Send three pallets of water to the shelter.\n",
        );
        let a = analyze(&raw, &session, "W4XSC").await;
        assert!(a.has_fired(MODEL_MISMATCH));
        assert!(a.score < a.out_of);
        assert_bounded(&a);
        let mismatch = a.fired.iter().find(|f| f.code == MODEL_MISMATCH).unwrap();
        assert!(mismatch.paragraph.contains("    Message:"));
    }

    #[tokio::test]
    async fn test_model_type_mismatch_halves_score() {
        let mut session = tuesday_net();
        session.message_types = vec!["ICS213".to_string()];
        let form = crate::message::ics213::tests::sample_form();
        session.model = Some(ModelMessage {
            subject: crate::message::FormMessage::encode_subject(&form),
            body: form.encode_body("3.9"),
        });
        let a = analyze(&checkin(), &session, "W4XSC").await;
        assert_eq!(a.problem_codes(), vec!["MessageTypeWrong"]);
        assert_eq!(a.fired[0].variant, "model");
        assert!(a.fired[0].paragraph.contains("a copy of the provided"));
        assert!(a.score * 2 <= a.out_of);
        assert!(!a.has_fired(MODEL_MISMATCH));
    }
}
