//! Small helpers shared across the workspace: id generation, query-string
//! conversion, and display formatting.

use rand::distr::Alphanumeric;
use rand::Rng;

use crate::models::KeyValue;

/// Length of generated entity identifiers.
const ID_LEN: usize = 9;

/// Generate an opaque unique identifier for a new entity.
pub fn generate_id() -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(ID_LEN)
        .map(char::from)
        .collect::<String>()
        .to_ascii_lowercase()
}

/// Serde shim storing binary file payloads as base64 strings inside the
/// persisted JSON document.
pub mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(de)?;
        STANDARD.decode(s).map_err(serde::de::Error::custom)
    }
}

/// Decode %XX escapes. Bytes that are not valid escapes pass through.
/// Works on raw bytes; captured URLs are not guaranteed to be ASCII.
fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hi = (bytes[i + 1] as char).to_digit(16);
            let lo = (bytes[i + 2] as char).to_digit(16);
            if let (Some(hi), Some(lo)) = (hi, lo) {
                out.push((hi * 16 + lo) as u8);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Percent-encode a string for use in a query or urlencoded form pair.
pub fn percent_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}

/// The raw query portion of a URL (everything after the first `?`).
pub fn query_of(url: &str) -> &str {
    url.split('?').nth(1).unwrap_or("")
}

/// Convert a raw query string into an ordered sequence of enabled entries.
pub fn query_string_to_params(query: &str) -> Vec<KeyValue> {
    if query.is_empty() {
        return Vec::new();
    }
    query
        .split('&')
        .map(|pair| {
            let mut it = pair.splitn(2, '=');
            let key = percent_decode(it.next().unwrap_or(""));
            let value = percent_decode(it.next().unwrap_or(""));
            KeyValue::new(key, value)
        })
        .collect()
}

/// Render enabled entries as an application/x-www-form-urlencoded string.
pub fn params_to_query_string(params: &[KeyValue]) -> String {
    params
        .iter()
        .filter(|p| p.enabled && !p.key.is_empty())
        .map(|p| format!("{}={}", percent_encode(&p.key), percent_encode(&p.value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Display name for an imported URL: the path component, falling back to
/// the origin when the path is root, and to the raw string when the URL
/// does not parse.
pub fn display_name_for_url(url: &str) -> String {
    let Some(scheme_end) = url.find("://") else {
        return url.to_string();
    };
    let rest = &url[scheme_end + 3..];
    let host_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    if rest[..host_end].is_empty() {
        return url.to_string();
    }
    let origin = &url[..scheme_end + 3 + host_end];
    let after = &rest[host_end..];
    let path = match after.find(['?', '#']) {
        Some(i) => &after[..i],
        None => after,
    };
    if path.is_empty() || path == "/" {
        origin.to_string()
    } else {
        path.to_string()
    }
}

/// Human-readable byte count, e.g. `1.5 KB`.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return String::from("0 Bytes");
    }
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    let i = (((bytes as f64).ln() / 1024f64.ln()).floor() as usize).min(UNITS.len() - 1);
    let value = bytes as f64 / 1024f64.powi(i as i32);
    let formatted = format!("{:.2}", value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[i])
}

/// Wall-clock time of a millisecond timestamp as HH:MM:SS.
pub fn format_time(timestamp_ms: i64) -> String {
    if timestamp_ms == 0 {
        return String::new();
    }
    chrono::DateTime::from_timestamp_millis(timestamp_ms)
        .map(|d| d.format("%H:%M:%S").to_string())
        .unwrap_or_default()
}
