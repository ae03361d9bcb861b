//! Envelope parsing for messages retrieved from a JNOS-style BBS.
//!
//! A retrieved message may start with an RFC 4155 "From " line, followed by
//! RFC 5322 headers and a body that may be MIME encoded. Only the plain text
//! part of the body is kept; anything else marks the message as not plain
//! text.

use crate::error::DecodeError;
use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, TimeZone};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Envelope {
    /// BBS the message was retrieved from.
    pub received_bbs: String,
    /// Bulletin area, for bulletins only.
    pub received_area: String,
    pub return_addr: String,
    /// Set when the envelope "From " line has an empty return address.
    pub autoresponse: bool,
    pub bbs_received_date: Option<DateTime<FixedOffset>>,
    pub from: String,
    pub to: Vec<String>,
    pub date: Option<DateTime<FixedOffset>>,
    /// Raw Date header, kept for display in reports.
    pub date_header: String,
    pub subject: String,
    pub not_plain_text: bool,
    pub outpost_urgent: bool,
    pub request_delivery_receipt: bool,
    pub request_read_receipt: bool,
}

impl Envelope {
    /// The time the message reached the BBS, falling back to its Date header.
    pub fn arrival(&self) -> Option<DateTime<FixedOffset>> {
        self.bbs_received_date.or(self.date)
    }
}

/// Result of parsing a retrieved message. The envelope is populated as far as
/// parsing got, even when `error` is set.
#[derive(Debug, Clone)]
pub struct Retrieved {
    pub envelope: Envelope,
    pub body: String,
    pub error: Option<DecodeError>,
}

#[derive(Debug, Clone, Default)]
struct Headers(Vec<(String, String)>);

impl Headers {
    fn get(&self, name: &str) -> &str {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .unwrap_or("")
    }

    fn all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

pub fn parse_retrieved(raw: &str, bbs: &str, area: &str) -> Retrieved {
    let mut env = Envelope {
        received_bbs: bbs.to_string(),
        received_area: area.to_string(),
        ..Default::default()
    };
    let text = raw.replace("\r\n", "\n");
    let mut rest = text.as_str();

    let mut efrom = None;
    if rest.starts_with("From ") {
        if let Some(idx) = rest.find('\n') {
            efrom = Some(&rest[5..idx]);
            rest = &rest[idx + 1..];
        }
    }

    let (headers, raw_body) = match split_headers(rest) {
        Ok(parts) => parts,
        Err(e) => {
            if let Some(line) = efrom {
                apply_envelope_line(&mut env, line);
            }
            return Retrieved {
                envelope: env,
                body: String::new(),
                error: Some(e),
            };
        }
    };

    let mut error = None;
    let body = match extract_plain_text(&headers, raw_body) {
        Ok((plain, not_plain)) => {
            env.not_plain_text = not_plain;
            let plain = plain.unwrap_or_default();
            if not_plain && plain.is_empty() {
                error = Some(DecodeError::NoPlainTextBody);
            }
            plain
        }
        Err(e) => {
            env.not_plain_text = true;
            error = Some(e);
            String::new()
        }
    };

    parse_common_headers(&mut env, &headers);
    match efrom {
        Some(line) => apply_envelope_line(&mut env, line),
        None => {
            let line = ["Return-Path", "Reply-To", "Sender", "From"]
                .iter()
                .map(|h| headers.get(h))
                .find(|v| !v.is_empty())
                .unwrap_or("");
            env.return_addr = first_address(line);
        }
    }
    if env.bbs_received_date.is_none() {
        if let Some((_, date)) = headers.get("Received").split_once(';') {
            env.bbs_received_date = DateTime::parse_from_rfc2822(date.trim()).ok();
        }
    }

    let body = match parse_outpost(&mut env, &body) {
        Ok(body) => body,
        Err(e) => {
            error.get_or_insert(e);
            String::new()
        }
    };
    Retrieved {
        envelope: env,
        body,
        error,
    }
}

/// Split header lines from the body. Continuation lines are unfolded.
fn split_headers(text: &str) -> Result<(Headers, &str), DecodeError> {
    let (head, body) = match text.find("\n\n") {
        Some(idx) => (&text[..idx], &text[idx + 2..]),
        None => (text.trim_end_matches('\n'), ""),
    };
    if head.trim().is_empty() {
        return Err(DecodeError::NoHeaders);
    }
    let headers = parse_header_lines(head).ok_or(DecodeError::NoHeaders)?;
    Ok((headers, body))
}

fn parse_header_lines(head: &str) -> Option<Headers> {
    let mut headers: Vec<(String, String)> = Vec::new();
    for line in head.lines() {
        if line.starts_with(' ') || line.starts_with('\t') {
            let (_, value) = headers.last_mut()?;
            if !value.is_empty() {
                value.push(' ');
            }
            value.push_str(line.trim());
            continue;
        }
        let (name, value) = line.split_once(':')?;
        if name.is_empty() || name.contains(char::is_whitespace) {
            return None;
        }
        headers.push((name.to_string(), value.trim().to_string()));
    }
    Some(Headers(headers))
}

fn parse_common_headers(env: &mut Envelope, headers: &Headers) {
    env.from = headers.get("From").to_string();
    for name in ["To", "Cc", "Bcc"] {
        for list in headers.all(name) {
            env.to.extend(
                list.split(',')
                    .map(str::trim)
                    .filter(|a| !a.is_empty())
                    .map(str::to_string),
            );
        }
    }
    env.date_header = headers.get("Date").to_string();
    env.date = DateTime::parse_from_rfc2822(&env.date_header).ok();
    env.subject = headers.get("Subject").to_string();
}

/// Handle the text after "From " on an envelope line: a return address and
/// an optional ctime timestamp in the BBS's local time.
fn apply_envelope_line(env: &mut Envelope, line: &str) {
    let (addr, stamp) = line.split_once(' ').unwrap_or((line, ""));
    env.return_addr = addr.to_string();
    env.autoresponse = addr.is_empty();
    let stamp = stamp.trim();
    if stamp.is_empty() {
        return;
    }
    match NaiveDateTime::parse_from_str(stamp, "%a %b %e %H:%M:%S %Y") {
        Ok(naive) => {
            env.bbs_received_date = Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|t| t.fixed_offset());
        }
        Err(e) => log::debug!("Ignoring envelope timestamp {stamp:?}: {e}"),
    }
}

/// First address of an address list, without any display name.
pub fn first_address(list: &str) -> String {
    let list = list.trim();
    if let Some(start) = list.find('<') {
        if let Some(len) = list[start + 1..].find('>') {
            return list[start + 1..start + 1 + len].trim().to_string();
        }
    }
    let first = list.split(',').next().unwrap_or("").trim();
    // Strip a trailing "(comment)".
    first
        .split_once(' ')
        .map(|(addr, _)| addr)
        .unwrap_or(first)
        .to_string()
}

/// Returns the plain text body, if any, and whether the body was anything
/// other than unencoded plain text.
fn extract_plain_text(
    headers: &Headers,
    body: &str,
) -> Result<(Option<String>, bool), DecodeError> {
    let mut not_plain = false;
    let decoded = match headers
        .get("Content-Transfer-Encoding")
        .to_ascii_lowercase()
        .as_str()
    {
        "" | "7bit" | "8bit" | "binary" => body.to_string(),
        "quoted-printable" => {
            not_plain = true;
            let bytes =
                quoted_printable::decode(body.as_bytes(), quoted_printable::ParseMode::Robust)
                    .map_err(|e| DecodeError::BadEncoding(format!("quoted-printable: {e}")))?;
            String::from_utf8_lossy(&bytes).to_string()
        }
        "base64" => {
            not_plain = true;
            let compact: String = body.chars().filter(|c| !c.is_whitespace()).collect();
            let bytes = general_purpose::STANDARD
                .decode(compact)
                .map_err(|e| DecodeError::BadEncoding(format!("base64: {e}")))?;
            String::from_utf8_lossy(&bytes).to_string()
        }
        other => {
            log::debug!("Unsupported Content-Transfer-Encoding {other:?}");
            return Ok((None, true));
        }
    };

    let content_type = headers.get("Content-Type");
    let (media_type, boundary) = if content_type.is_empty() {
        ("text/plain".to_string(), None)
    } else {
        parse_content_type(content_type)?
    };

    if media_type.starts_with("multipart/") {
        let boundary = boundary
            .ok_or_else(|| DecodeError::BadMultipart("no boundary parameter".to_string()))?;
        let mut found = None;
        for part in split_multipart(&decoded, &boundary)? {
            let (part_headers, part_body) = match part.strip_prefix('\n') {
                Some(part_body) => (Headers::default(), part_body),
                None => {
                    let (head, part_body) = part.split_once("\n\n").unwrap_or((part, ""));
                    let headers = parse_header_lines(head).ok_or_else(|| {
                        DecodeError::BadMultipart("malformed part headers".to_string())
                    })?;
                    (headers, part_body)
                }
            };
            if let (Some(plain), _) = extract_plain_text(&part_headers, part_body)? {
                found = Some(plain);
            }
        }
        return Ok((found, true));
    }
    if media_type != "text/plain" {
        return Ok((None, true));
    }
    Ok((Some(decoded), not_plain))
}

fn parse_content_type(value: &str) -> Result<(String, Option<String>), DecodeError> {
    let mut params = value.split(';');
    let media_type = params.next().unwrap_or("").trim().to_ascii_lowercase();
    if !media_type.contains('/') {
        return Err(DecodeError::BadContentType(value.to_string()));
    }
    let boundary = params.find_map(|p| {
        let (key, val) = p.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("boundary")
            .then(|| val.trim().trim_matches('"').to_string())
    });
    Ok((media_type, boundary))
}

fn split_multipart<'a>(body: &'a str, boundary: &str) -> Result<Vec<&'a str>, DecodeError> {
    let delimiter = format!("--{boundary}");
    let mut parts = Vec::new();
    let mut current: Option<usize> = None;
    let mut offset: usize = 0;
    for line in body.split_inclusive('\n') {
        let trimmed = line.trim_end();
        if trimmed == delimiter || trimmed == format!("{delimiter}--") {
            if let Some(start) = current {
                // The newline before the delimiter belongs to the delimiter.
                let end = offset.saturating_sub(1).max(start);
                parts.push(&body[start..end]);
            }
            if trimmed.ends_with("--") && trimmed != delimiter {
                return Ok(parts);
            }
            current = Some(offset + line.len());
        }
        offset += line.len();
    }
    Err(DecodeError::BadMultipart(format!(
        "missing closing boundary {delimiter}--"
    )))
}

/// Strip Outpost flag codes from the start of the body.
fn parse_outpost(env: &mut Envelope, original: &str) -> Result<String, DecodeError> {
    let mut body = original.to_string();
    let mut found = false;
    loop {
        if let Some(rest) = body.strip_prefix('\n') {
            body = rest.to_string();
        } else if let Some(rest) = body.strip_prefix("!B64!") {
            let compact: String = rest.chars().filter(|c| !c.is_whitespace()).collect();
            let bytes = general_purpose::STANDARD
                .decode(compact)
                .map_err(|e| DecodeError::BadEncoding(format!("Outpost base64: {e}")))?;
            body = String::from_utf8_lossy(&bytes).to_string();
            found = true;
        } else if let Some(rest) = body.strip_prefix("!RRR!") {
            env.request_read_receipt = true;
            found = true;
            body = rest.to_string();
        } else if let Some(rest) = body.strip_prefix("!RDR!") {
            env.request_delivery_receipt = true;
            found = true;
            body = rest.to_string();
        } else if let Some(rest) = body.strip_prefix("!URG!") {
            env.outpost_urgent = true;
            found = true;
            body = rest.to_string();
        } else {
            return Ok(if found { body } else { original.to_string() });
        }
    }
}
