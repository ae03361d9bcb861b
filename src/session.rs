use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// A model message operators are asked to reproduce exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelMessage {
    pub subject: String,
    pub body: String,
}

/// A scheduled practice session and its acceptance criteria.
///
/// Sessions are read-only for the duration of an analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: i64,
    /// Mailbox that receives check-ins, e.g. "PKTTUE".
    pub call_sign: String,
    pub name: String,
    /// Prefix for locally assigned message IDs, e.g. "TUE".
    pub prefix: String,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    #[serde(default)]
    pub to_bbses: Vec<String>,
    #[serde(default)]
    pub down_bbses: Vec<String>,
    #[serde(default)]
    pub message_types: Vec<String>,
    #[serde(default)]
    pub model: Option<ModelMessage>,
    #[serde(default)]
    pub dont_send_responses: bool,
}

impl Session {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let session: Session = serde_yaml::from_str(&content)?;
        Ok(session)
    }

    /// Date of the net this session collects check-ins for, as "January 2".
    pub fn net_day(&self) -> String {
        self.end.format("%B %-d").to_string()
    }

    pub fn accepts_to_bbs(&self, bbs: &str) -> bool {
        self.to_bbses.iter().any(|b| b.eq_ignore_ascii_case(bbs))
    }

    pub fn is_down(&self, bbs: &str) -> bool {
        !bbs.is_empty() && self.down_bbses.iter().any(|b| b.eq_ignore_ascii_case(bbs))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;

    /// The Tuesday evening net used throughout the analyzer tests.
    pub(crate) fn tuesday_net() -> Session {
        let pacific = FixedOffset::west_opt(8 * 3600).unwrap();
        Session {
            id: 42,
            call_sign: "PKTTUE".to_string(),
            name: "SVECS Net".to_string(),
            prefix: "TUE".to_string(),
            start: pacific.with_ymd_and_hms(2022, 1, 5, 0, 0, 0).unwrap(),
            end: pacific.with_ymd_and_hms(2022, 1, 11, 20, 0, 0).unwrap(),
            to_bbses: vec!["W4XSC".to_string()],
            down_bbses: vec!["W2XSC".to_string()],
            message_types: vec!["plain".to_string()],
            model: None,
            dont_send_responses: false,
        }
    }

    #[test]
    fn test_net_day() {
        assert_eq!(tuesday_net().net_day(), "January 11");
    }

    #[test]
    fn test_bbs_membership() {
        let session = tuesday_net();
        assert!(session.accepts_to_bbs("w4xsc"));
        assert!(!session.accepts_to_bbs("W2XSC"));
        assert!(session.is_down("W2XSC"));
        assert!(!session.is_down(""));
    }

    #[test]
    fn test_from_yaml() {
        let yaml = r#"
id: 7
call_sign: PKTTUE
name: SVECS Net
prefix: TUE
start: 2022-01-05T00:00:00-08:00
end: 2022-01-11T20:00:00-08:00
to_bbses: [W4XSC]
message_types: [plain, ICS213]
"#;
        let session: Session = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(session.id, 7);
        assert!(session.down_bbses.is_empty());
        assert!(session.model.is_none());
        assert_eq!(session.message_types, vec!["plain", "ICS213"]);
    }
}
