//! Standard packet subject lines: `MSGID_H_[FORMTAG_]Subject`.

/// Components of a standard subject line. A subject that does not follow the
/// standard decodes to empty codes with the whole line as `subject`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectParts {
    pub msgid: String,
    /// Spelled out, e.g. "URGENT", when the subject carries an old-style
    /// severity code.
    pub severity: String,
    /// Spelled out, e.g. "ROUTINE", when the code is recognized.
    pub handling: String,
    pub formtag: String,
    pub subject: String,
}

pub fn decode_subject(line: &str) -> SubjectParts {
    let (codes, mut subject) = match line.split_once(' ') {
        Some((codes, rest)) => (codes, format!(" {rest}")),
        None => (line, String::new()),
    };
    let parts: Vec<&str> = codes.splitn(4, '_').collect();
    let mut decoded = SubjectParts::default();
    match parts.len() {
        3 => subject = format!("{}{subject}", parts[2]),
        4 => {
            decoded.formtag = parts[2].to_string();
            subject = format!("{}{subject}", parts[3]);
        }
        _ => {
            decoded.subject = line.to_string();
            return decoded;
        }
    }
    decoded.msgid = parts[0].to_string();
    let (severity, handling) = parts[1].split_once('/').unwrap_or(("", parts[1]));
    decoded.severity = decode_severity(severity).unwrap_or(severity).to_string();
    decoded.handling = decode_handling(handling).unwrap_or(handling).to_string();
    decoded.subject = subject;
    decoded
}

pub fn encode_subject(msgid: &str, handling: &str, formtag: &str, subject: &str) -> String {
    let handling = handling.get(..1).unwrap_or("");
    if formtag.is_empty() {
        format!("{msgid}_{handling}_{subject}")
    } else {
        format!("{msgid}_{handling}_{formtag}_{subject}")
    }
}

pub fn decode_handling(code: &str) -> Option<&'static str> {
    match code {
        "I" => Some("IMMEDIATE"),
        "P" => Some("PRIORITY"),
        "R" => Some("ROUTINE"),
        _ => None,
    }
}

fn decode_severity(code: &str) -> Option<&'static str> {
    match code {
        "E" => Some("EMERGENCY"),
        "U" => Some("URGENT"),
        "O" => Some("OTHER"),
        _ => None,
    }
}
