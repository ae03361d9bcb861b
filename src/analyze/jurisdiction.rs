use anyhow::{anyhow, bail, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use super::callsign::is_fcc_call_sign;
use crate::config::JurisdictionLookupConfig;

/// Agency names used by the county ham database, and their codes.
const AGENCY_CODES: [(&str, &str); 34] = [
    ("Alameda County", "XAL"),
    ("American Red Cross", "ARC"),
    ("CalFIRE Santa Clara Unit", "SCU"),
    ("CalOES Coastal Region", "COS"),
    ("Campbell", "CBL"),
    ("Contra Costa County", "XCC"),
    ("Cupertino", "CUP"),
    ("Gilroy", "GIL"),
    ("Hospitals", "HOS"),
    ("Loma Prieta", "LMP"),
    ("Los Altos", "LOS"),
    ("Los Altos Hills", "LAH"),
    ("Los Gatos", "LGT"),
    ("Marin County", "XMR"),
    ("Milpitas", "MLP"),
    ("Monte Sereno", "MSO"),
    ("Monterey County", "XMY"),
    ("Morgan Hill", "MRG"),
    ("Mountain View", "MTV"),
    ("NASA/AMES", "NAM"),
    ("Palo Alto", "PAF"),
    ("San Benito County", "XBE"),
    ("San Francisco County", "XSF"),
    ("San Jose", "SJC"),
    ("San Jose Water Co", "SJW"),
    ("San Mateo County", "XSM"),
    ("Santa Clara", "SNC"),
    ("Santa Clara County", "XSC"),
    ("Santa Clara Valley Water District", "VWD"),
    ("Santa Cruz County", "XCZ"),
    ("Saratoga", "SAR"),
    ("Stanford University", "STU"),
    ("Sunnyvale", "SNY"),
    ("Unincorporated", "XSC"),
];

fn agency_code(agency: &str) -> &'static str {
    AGENCY_CODES
        .iter()
        .find(|(name, _)| *name == agency)
        .map(|(_, code)| *code)
        .unwrap_or("")
}

/// Codes too broad to identify a jurisdiction on their own.
fn is_specific(code: &str) -> bool {
    !matches!(code, "" | "XSC" | "HOS")
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct HamInfo {
    #[serde(default)]
    home_agency: String,
    #[serde(default)]
    other_agencies: Vec<String>,
}

impl HamInfo {
    fn jurisdiction(&self) -> String {
        let home = agency_code(&self.home_agency);
        if is_specific(home) {
            return home.to_string();
        }
        self.other_agencies
            .iter()
            .map(|a| agency_code(a))
            .find(|code| is_specific(code))
            .unwrap_or(home)
            .to_string()
    }
}

/// Looks up the home jurisdiction of a call sign in the county ham database.
#[derive(Debug, Clone)]
pub struct JurisdictionLookup {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
    force: Option<String>,
    cache: Arc<RwLock<HashMap<String, String>>>,
}

impl JurisdictionLookup {
    pub fn new(config: &JurisdictionLookupConfig) -> Result<Self, reqwest::Error> {
        let timeout = Duration::from_secs(config.timeout_seconds);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("packet-practice/0.1")
            .build()?;
        Ok(Self {
            client,
            url: config.url.clone(),
            timeout,
            force: config.force.clone(),
            cache: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    /// Jurisdiction code for the call sign, if it can be determined. Lookup
    /// failures are logged and yield `None`.
    pub async fn lookup(&self, call_sign: &str) -> Option<String> {
        if call_sign.is_empty() {
            return None;
        }
        if !is_fcc_call_sign(call_sign) {
            // Tactical call signs start with the agency code.
            return Some(call_sign.chars().take(3).collect::<String>().to_uppercase());
        }
        if let Some(force) = &self.force {
            return Some(force.clone());
        }

        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.get(call_sign) {
                log::debug!("Using cached jurisdiction for {call_sign}");
                return Some(cached.clone());
            }
        }

        match tokio::time::timeout(self.timeout, self.fetch(call_sign)).await {
            Ok(Ok(jurisdiction)) => {
                let mut cache = self.cache.write().await;
                cache.insert(call_sign.to_string(), jurisdiction.clone());
                Some(jurisdiction)
            }
            Ok(Err(e)) => {
                log::warn!("Unable to fetch county database info for {call_sign}: {e}");
                None
            }
            Err(_) => {
                log::warn!(
                    "Unable to fetch county database info for {call_sign}: timed out after {:?}",
                    self.timeout
                );
                None
            }
        }
    }

    async fn fetch(&self, call_sign: &str) -> Result<String> {
        let url = url::Url::parse_with_params(&self.url, &[("id", call_sign)])?;
        log::debug!("Fetching county database info: {url}");
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            bail!("status code {}", response.status().as_u16());
        }
        let records: Vec<HamInfo> = response
            .json()
            .await
            .map_err(|e| anyhow!("malformed response: {e}"))?;
        match records.as_slice() {
            [record] => Ok(record.jurisdiction()),
            _ => bail!("{} responses", records.len()),
        }
    }
}
