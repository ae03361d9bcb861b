//! PackItForms encoding of form messages.
//!
//! ```text
//! !SCCoPIFO!
//! #T: form-ics213.html
//! #V: 3.9-2.2
//! MsgNo: [XND-042P]
//! 12.: [multi\nline]
//! !/ADDON!
//! ```

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

lazy_static! {
    static ref HEADER_RE: Regex =
        Regex::new(r"^#T: ([a-z][-a-z0-9]+\.html)\n#V: (\d+(?:\.\d+)*)-(\d+(?:\.\d+)*)\n")
            .unwrap();
    static ref FIELD_LINE_RE: Regex = Regex::new(r"(?i)^([A-Z0-9][-A-Z0-9.]*): \[").unwrap();
}

/// Markers that show a body was meant to carry an encoded form.
pub const FORM_MARKERS: [&str; 3] = ["!SCCoPIFO!", "!PACF!", "!/ADDON!"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PifoForm {
    pub text_before: String,
    pub html: String,
    pub pifo_version: String,
    pub form_version: String,
    pub values: HashMap<String, String>,
    pub text_after: String,
}

impl PifoForm {
    pub fn get(&self, tag: &str) -> String {
        self.values.get(tag).cloned().unwrap_or_default()
    }
}

/// Decode a PackItForms body. Returns `None` if the body does not hold a
/// well-formed encoded form.
pub fn decode(body: &str) -> Option<PifoForm> {
    let mut form = PifoForm::default();
    let mut rest = if let Some(rest) = body.strip_prefix("!SCCoPIFO!\n") {
        rest
    } else if let Some(idx) = body.find("\n!SCCOPIFO!\n") {
        form.text_before = body[..idx + 1].to_string();
        &body[idx + 12..]
    } else {
        return None;
    };

    let caps = HEADER_RE.captures(rest)?;
    form.html = caps[1].to_string();
    form.pifo_version = caps[2].to_string();
    form.form_version = caps[3].to_string();
    rest = &rest[caps[0].len()..];

    while let Some(caps) = FIELD_LINE_RE.captures(rest) {
        let tag = caps[1].to_string();
        rest = &rest[caps[0].len()..];
        if form.values.contains_key(&tag) {
            return None;
        }
        let (value, remaining) = parse_bracketed_value(rest)?;
        form.values.insert(tag, value);
        rest = remaining;
    }

    form.text_after = rest.strip_prefix("!/ADDON!\n")?.to_string();
    Some(form)
}

/// Parse a bracketed field value. Inside the brackets `\n` is a newline,
/// `\\` a backslash, literal newlines are ignored, `` `] `` is a close
/// bracket, and `` `]]] `` is a backtick that ends the value. The closing
/// bracket must be followed by a newline.
fn parse_bracketed_value(body: &str) -> Option<(String, &str)> {
    let mut value = String::new();
    let mut rest = body;
    loop {
        if let Some(after) = rest.strip_prefix(']') {
            rest = after;
            break;
        } else if let Some(after) = rest.strip_prefix('\n') {
            rest = after;
        } else if let Some(after) = rest.strip_prefix("\\\\") {
            value.push('\\');
            rest = after;
        } else if let Some(after) = rest.strip_prefix("\\n") {
            value.push('\n');
            rest = after;
        } else if let Some(after) = rest.strip_prefix("`]]]") {
            value.push('`');
            rest = after;
            break;
        } else if let Some(after) = rest.strip_prefix("`]") {
            value.push(']');
            rest = after;
        } else {
            let c = rest.chars().next()?;
            value.push(c);
            rest = &rest[c.len_utf8()..];
        }
    }
    rest.strip_prefix('\n').map(|after| (value, after))
}

/// Encode a form in PackItForms format. Empty values are omitted.
pub fn encode(html: &str, pifo_version: &str, form_version: &str, fields: &[(&str, &str)]) -> String {
    let mut out = format!("!SCCoPIFO!\n#T: {html}\n#V: {pifo_version}-{form_version}\n");
    for (tag, value) in fields.iter().filter(|(_, v)| !v.is_empty()) {
        let mut quoted = value
            .replace('\\', "\\\\")
            .replace('\n', "\\n")
            .replace(']', "`]");
        if quoted.ends_with('`') {
            quoted.push_str("]]");
        } else {
            quoted.push(']');
        }
        out.push_str(&format!("{tag}: [{quoted}\n"));
    }
    out.push_str("!/ADDON!\n");
    out
}
