use anyhow::{anyhow, Result};

use crate::constants::CURL_IMPORT_NAME;
use crate::models::{BodyType, HttpMethod, KeyValue, LoggedRequest, Request};

/// Parse a cURL command into a draft request.
///
/// Fails only when the input does not start with the `curl` invocation
/// token; malformed headers inside an otherwise valid command are skipped.
pub fn parse_curl(input: &str) -> Result<Request> {
    let invocation = input.split_whitespace().next().unwrap_or("");
    if !invocation.eq_ignore_ascii_case("curl") {
        return Err(anyhow!("not a curl command"));
    }

    // Remove line continuations and normalize
    let normalized = input.replace("\\\r\n", " ").replace("\\\n", " ");

    let mut tokens = tokenize(&normalized);
    if tokens.first().map(|s| s.eq_ignore_ascii_case("curl")) == Some(true) {
        tokens.remove(0);
    }

    let mut request = Request::draft();
    request.name = String::from(CURL_IMPORT_NAME);
    let mut explicit_method = false;

    let mut i = 0;
    while i < tokens.len() {
        match tokens[i].as_str() {
            "-X" | "--request" => {
                if i + 1 < tokens.len() {
                    request.method = HttpMethod::parse(&tokens[i + 1]);
                    explicit_method = true;
                    i += 1;
                }
            }
            "-H" | "--header" => {
                if i + 1 < tokens.len() {
                    if let Some((key, value)) = split_header(&tokens[i + 1]) {
                        request.headers.push(KeyValue::new(key, value));
                    }
                    i += 1;
                }
            }
            "-d" | "--data" | "--data-raw" | "--data-binary" => {
                if i + 1 < tokens.len() {
                    request.body_raw = tokens[i + 1].clone();
                    request.body_type = BodyType::Raw;
                    // Infer POST when no explicit method was given
                    if !explicit_method {
                        request.method = HttpMethod::POST;
                    }
                    i += 1;
                }
            }
            "--compressed" | "-k" | "--insecure" | "-L" | "--location" | "-s" | "--silent"
            | "-v" | "--verbose" => {
                // Ignored flags
            }
            token => {
                // First bare non-flag token is the URL
                if !token.starts_with('-') && request.url.is_empty() {
                    request.url = token.to_string();
                }
            }
        }
        i += 1;
    }

    Ok(request)
}

fn split_header(s: &str) -> Option<(String, String)> {
    let idx = s.find(':')?;
    if idx == 0 {
        return None;
    }
    Some((s[..idx].trim().to_string(), s[idx + 1..].trim().to_string()))
}

/// Tokenize a curl command, respecting quotes
fn tokenize(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_single_quote = false;
    let mut in_double_quote = false;
    let mut escape_next = false;

    for c in input.chars() {
        if escape_next {
            current.push(c);
            escape_next = false;
            continue;
        }

        match c {
            '\\' if !in_single_quote => {
                escape_next = true;
            }
            '\'' if !in_double_quote => {
                in_single_quote = !in_single_quote;
            }
            '"' if !in_single_quote => {
                in_double_quote = !in_double_quote;
            }
            ' ' | '\t' | '\n' | '\r' if !in_single_quote && !in_double_quote => {
                if !current.is_empty() {
                    tokens.push(current.clone());
                    current.clear();
                }
            }
            _ => {
                current.push(c);
            }
        }
    }

    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}

/// Render a captured log entry as a cURL command.
pub fn generate_curl(log: &LoggedRequest) -> String {
    let mut curl = format!("curl -X {} '{}'", log.method, log.url);

    if let Some(headers) = &log.request_headers {
        for (key, value) in headers {
            curl.push_str(&format!(" \\\n  -H '{}: {}'", key, value));
        }
    }

    if let Some(body) = &log.request_body {
        let text = match body {
            serde_json::Value::String(s) => s.clone(),
            other => serde_json::to_string(other).unwrap_or_default(),
        };
        if !text.is_empty() {
            // Escape single quotes for bash compatibility
            let escaped = text.replace('\'', "'\\''");
            curl.push_str(&format!(" \\\n  --data-raw '{}'", escaped));
        }
    }

    curl
}
