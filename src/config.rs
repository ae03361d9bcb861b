use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::analyze::registry::ProblemRegistry;
use crate::analyze::MODEL_MISMATCH;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Oldest PackItForms version accepted without complaint.
    #[serde(default = "default_min_pifo_version")]
    pub min_pifo_version: String,
    /// Per message type settings, keyed by type tag.
    #[serde(default = "default_message_types")]
    pub message_types: BTreeMap<String, MessageTypeConfig>,
    /// Jurisdiction names and abbreviations, mapped to canonical codes.
    #[serde(default = "default_jurisdictions")]
    pub jurisdictions: BTreeMap<String, String>,
    /// BBSes of the county network.
    #[serde(default = "default_county_bbses")]
    pub county_bbses: Vec<String>,
    /// Overrides for the actions taken when a problem fires.
    #[serde(default)]
    pub problems: BTreeMap<String, Vec<ProblemAction>>,
    /// Point weights of individual checks. Unlisted checks weigh 1.
    #[serde(default)]
    pub weights: BTreeMap<String, u32>,
    #[serde(default)]
    pub jurisdiction_lookup: JurisdictionLookupConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageTypeConfig {
    /// The type has no place for "Practice ..." details.
    #[serde(default)]
    pub no_practice_info: bool,
    #[serde(default)]
    pub minimum_version: String,
    /// Recommended handling order, if any.
    #[serde(default)]
    pub handling_order: String,
    #[serde(default)]
    pub to_ics_position: Vec<String>,
    #[serde(default)]
    pub to_location: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemAction {
    /// Describe the problem in a report sent to the sender.
    Respond,
    /// Do not count the message as a check-in.
    DontCount,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JurisdictionLookupConfig {
    #[serde(default = "default_lookup_url")]
    pub url: String,
    #[serde(default = "default_lookup_timeout")]
    pub timeout_seconds: u64,
    /// Fixed jurisdiction to use instead of querying the database.
    #[serde(default)]
    pub force: Option<String>,
}

impl Default for JurisdictionLookupConfig {
    fn default() -> Self {
        Self {
            url: default_lookup_url(),
            timeout_seconds: default_lookup_timeout(),
            force: None,
        }
    }
}

fn default_min_pifo_version() -> String {
    "3.9".to_string()
}

fn default_message_types() -> BTreeMap<String, MessageTypeConfig> {
    let mut types = BTreeMap::new();
    types.insert("plain".to_string(), MessageTypeConfig::default());
    types.insert(
        "ICS213".to_string(),
        MessageTypeConfig {
            minimum_version: "2.2".to_string(),
            ..MessageTypeConfig::default()
        },
    );
    types
}

fn default_jurisdictions() -> BTreeMap<String, String> {
    [
        ("Campbell", "CBL"),
        ("Cupertino", "CUP"),
        ("Gilroy", "GIL"),
        ("Loma Prieta", "LMP"),
        ("Los Altos", "LOS"),
        ("Los Altos Hills", "LAH"),
        ("Los Gatos", "LGT"),
        ("Milpitas", "MLP"),
        ("Monte Sereno", "MSO"),
        ("Morgan Hill", "MRG"),
        ("Mountain View", "MTV"),
        ("NASA Ames", "NAM"),
        ("Palo Alto", "PAF"),
        ("San Jose", "SJC"),
        ("Santa Clara", "SNC"),
        ("Santa Clara County", "XSC"),
        ("Saratoga", "SAR"),
        ("Stanford", "STU"),
        ("Sunnyvale", "SNY"),
        ("Unincorporated", "XSC"),
    ]
    .into_iter()
    .map(|(name, code)| (name.to_string(), code.to_string()))
    .collect()
}

fn default_county_bbses() -> Vec<String> {
    (1..=6).map(|n| format!("W{n}XSC")).collect()
}

fn default_lookup_url() -> String {
    "https://www.scc-ares-races.org/activities/getHamInfo.php".to_string()
}

fn default_lookup_timeout() -> u64 {
    5
}

impl Default for Config {
    fn default() -> Self {
        Config {
            min_pifo_version: default_min_pifo_version(),
            message_types: default_message_types(),
            jurisdictions: default_jurisdictions(),
            county_bbses: default_county_bbses(),
            problems: BTreeMap::new(),
            weights: BTreeMap::new(),
            jurisdiction_lookup: JurisdictionLookupConfig::default(),
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    pub fn to_file(&self, path: &str) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Canonical code for a jurisdiction name, abbreviation, or code.
    /// Matching ignores case.
    pub fn jurisdiction_code(&self, name: &str) -> Option<&str> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        self.jurisdictions.iter().find_map(|(key, code)| {
            (key.eq_ignore_ascii_case(name) || code.eq_ignore_ascii_case(name)).then_some(code.as_str())
        })
    }

    pub fn is_county_bbs(&self, bbs: &str) -> bool {
        !bbs.is_empty() && self.county_bbses.iter().any(|b| b.eq_ignore_ascii_case(bbs))
    }

    pub fn weight(&self, code: &str) -> u32 {
        self.weights.get(code).copied().unwrap_or(1)
    }

    /// Check that every problem code named in the configuration is known,
    /// and that no weight would let a problem fire without costing points.
    pub fn validate(&self, registry: &ProblemRegistry) -> anyhow::Result<()> {
        let known = |code: &str| code == MODEL_MISMATCH || registry.get(code).is_some();
        let mut errors = Vec::new();
        for code in self.problems.keys().filter(|c| !known(c)) {
            errors.push(format!("problems: unknown problem code {code}"));
        }
        for (code, weight) in &self.weights {
            if !known(code) {
                errors.push(format!("weights: unknown problem code {code}"));
            } else if *weight == 0 {
                errors.push(format!("weights: {code} must weigh at least 1"));
            }
        }
        for tag in self
            .message_types
            .keys()
            .filter(|tag| crate::message::message_type(tag).is_none())
        {
            errors.push(format!("message_types: unknown message type {tag}"));
        }
        if errors.is_empty() {
            return Ok(());
        }
        for error in &errors {
            log::error!("Invalid configuration: {error}");
        }
        anyhow::bail!("invalid configuration: {}", errors.join("; "))
    }
}
