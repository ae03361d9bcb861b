//! Call sign and BBS extraction from addresses and subject lines.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// A call sign (FCC or tactical) in the word after "Practice".
    static ref PRACTICE_CALL_SIGN_RE: Regex = Regex::new(
        r"(?i)(?:\b|_)Practice[\W_]+(A[A-L][0-9][A-Z]{1,3}|[KNW][A-Z][0-9][A-Z]{1,3}|[KNW][0-9][A-Z]{2,3}|[A-Z][A-Z0-9]{5})\b"
    )
    .unwrap();
    /// A call sign at the start of a return address.
    static ref FROM_CALL_SIGN_RE: Regex = Regex::new(
        r"(?i)^(A[A-L][0-9][A-Z]{1,3}|[KNW][A-Z][0-9][A-Z]{1,3}|[KNW][0-9][A-Z]{2,3}|[A-Z][A-Z0-9]{5})(?:@|%|$)"
    )
    .unwrap();
    static ref FCC_CALL_SIGN_RE: Regex =
        Regex::new(r"(?i)^(?:A[A-L][0-9][A-Z]{1,3}|[KNW][A-Z][0-9][A-Z]{1,3}|[KNW][0-9][A-Z]{2,3})$")
            .unwrap();
    /// A return address from a packet BBS; captures the BBS name.
    static ref FROM_BBS_RE: Regex = Regex::new(
        r"(?i)^[^%@]+[%@](A[A-L][0-9][A-Z]{1,3}|[KNW][A-Z][0-9][A-Z]{1,3}|[KNW][0-9][A-Z]{2,3})(?:\.ampr\.org(?:@.*)?|\.#.*)?$"
    )
    .unwrap();
    /// "Practice CallSign, Name, Jurisdiction, MM/DD/YYYY". A comma after
    /// "Practice" is tolerated. Captures the jurisdiction and the date.
    static ref PRACTICE_RE: Regex = Regex::new(
        r"(?i)^Practice[,\s]+(?:A[A-L][0-9][A-Z]{1,3}|[KNW][A-Z][0-9][A-Z]{1,3}|[KNW][0-9][A-Z]{2,3}|[A-Z][A-Z0-9]{5})\s*,[^,]+,([^,]+),\s*((?:0?[1-9]|1[0-2])/(?:0?[1-9]|[12]\d|3[01])/20\d\d)\s*$"
    )
    .unwrap();
}

pub fn is_fcc_call_sign(call: &str) -> bool {
    FCC_CALL_SIGN_RE.is_match(call)
}

/// Upper-cased call sign following "Practice" in `text`.
pub fn practice_call_sign(text: &str) -> Option<String> {
    PRACTICE_CALL_SIGN_RE
        .captures(text)
        .map(|caps| caps[1].to_uppercase())
}

/// Upper-cased call sign forming the mailbox part of a return address.
pub fn address_call_sign(address: &str) -> Option<String> {
    FROM_CALL_SIGN_RE
        .captures(address)
        .map(|caps| caps[1].to_uppercase())
}

/// Upper-cased name of the BBS a return address came from.
pub fn address_bbs(address: &str) -> Option<String> {
    FROM_BBS_RE
        .captures(address)
        .map(|caps| caps[1].to_uppercase())
}

/// Jurisdiction text and net date of a practice subject.
pub fn parse_practice(subject: &str) -> Option<(String, chrono::NaiveDate)> {
    let caps = PRACTICE_RE.captures(subject)?;
    let date = chrono::NaiveDate::parse_from_str(&caps[2], "%m/%d/%Y").ok()?;
    Some((caps[1].trim().to_string(), date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_practice_call_sign() {
        assert_eq!(
            practice_call_sign("ABC-101P_R_Practice k6abc, Alice, San Jose, 01/11/2022"),
            Some("K6ABC".to_string())
        );
        assert_eq!(
            practice_call_sign("ABC-101P_R_Practice_K6ABC, Alice"),
            Some("K6ABC".to_string())
        );
        assert_eq!(practice_call_sign("Practice message"), None);
        assert_eq!(practice_call_sign("Hello K6ABC"), None);
    }

    #[test]
    fn test_address_call_sign() {
        assert_eq!(address_call_sign("k6abc@w4xsc.ampr.org"), Some("K6ABC".to_string()));
        assert_eq!(address_call_sign("k6abc"), Some("K6ABC".to_string()));
        assert_eq!(address_call_sign("cupeoc%w1xsc"), Some("CUPEOC".to_string()));
        assert_eq!(address_call_sign("alice@example.com"), None);
    }

    #[test]
    fn test_address_bbs() {
        assert_eq!(address_bbs("k6abc@w4xsc.ampr.org"), Some("W4XSC".to_string()));
        assert_eq!(address_bbs("k6abc%W2XSC"), Some("W2XSC".to_string()));
        assert_eq!(address_bbs("k6abc@w3xsc.#nca.ca.usa.noam"), Some("W3XSC".to_string()));
        assert_eq!(address_bbs("k6abc@winlink.org"), None);
    }

    #[test]
    fn test_fcc_call_sign() {
        assert!(is_fcc_call_sign("K6ABC"));
        assert!(is_fcc_call_sign("ae6xy"));
        assert!(!is_fcc_call_sign("CUPEOC"));
        assert!(!is_fcc_call_sign(""));
    }

    #[test]
    fn test_parse_practice() {
        let (juris, date) = parse_practice("Practice K6ABC, Alice, San Jose , 1/11/2022").unwrap();
        assert_eq!(juris, "San Jose");
        assert_eq!(date, NaiveDate::from_ymd_opt(2022, 1, 11).unwrap());
        assert!(parse_practice("Practice, K6ABC, Alice, SJC, 01/11/2022").is_some());
        assert!(parse_practice("Practice K6ABC Alice SJC 01/11/2022").is_none());
        assert!(parse_practice("Practice K6ABC, Alice, SJC, 13/11/2022").is_none());
    }
}
