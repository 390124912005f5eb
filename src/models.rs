use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::constants::{NEW_REQUEST_NAME, WELCOME_TAB_ID, WELCOME_TAB_TITLE};
use crate::util;

/// HTTP Method enum
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum HttpMethod {
    #[default]
    GET,
    POST,
    PUT,
    DELETE,
    PATCH,
    HEAD,
    OPTIONS,
}

impl HttpMethod {
    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::DELETE => "DELETE",
            HttpMethod::PATCH => "PATCH",
            HttpMethod::HEAD => "HEAD",
            HttpMethod::OPTIONS => "OPTIONS",
        }
    }

    /// Parse a method string, defaulting to GET for unknown input.
    pub fn parse(s: &str) -> HttpMethod {
        match s.to_uppercase().as_str() {
            "POST" => HttpMethod::POST,
            "PUT" => HttpMethod::PUT,
            "DELETE" => HttpMethod::DELETE,
            "PATCH" => HttpMethod::PATCH,
            "HEAD" => HttpMethod::HEAD,
            "OPTIONS" => HttpMethod::OPTIONS,
            _ => HttpMethod::GET,
        }
    }

    /// GET and HEAD requests never carry a body.
    pub fn has_body(&self) -> bool {
        !matches!(self, HttpMethod::GET | HttpMethod::HEAD)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Variant tag of a KeyValue entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum KeyValueKind {
    #[default]
    Text,
    File,
}

/// File payload owned by a file-typed KeyValue entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilePayload {
    pub name: String,
    #[serde(with = "crate::util::base64_bytes")]
    pub content: Vec<u8>,
}

/// A single header/param/form entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyValue {
    pub id: String,
    pub key: String,
    pub value: String,
    pub enabled: bool,
    #[serde(default, rename = "type")]
    pub kind: KeyValueKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<FilePayload>,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        KeyValue {
            id: util::generate_id(),
            key: key.into(),
            value: value.into(),
            enabled: true,
            kind: KeyValueKind::Text,
            file: None,
        }
    }

    pub fn file(key: impl Into<String>, payload: FilePayload) -> Self {
        KeyValue {
            id: util::generate_id(),
            key: key.into(),
            value: String::new(),
            enabled: true,
            kind: KeyValueKind::File,
            file: Some(payload),
        }
    }
}

/// How the request body is interpreted. Only the field matching the
/// selected type is read by execution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BodyType {
    #[default]
    #[serde(rename = "none")]
    None,
    #[serde(rename = "raw")]
    Raw,
    #[serde(rename = "form-data")]
    FormData,
    #[serde(rename = "x-www-form-urlencoded")]
    UrlEncoded,
}

/// Display hint for raw bodies. Never read by execution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RawBodyHint {
    Json,
    Text,
    Html,
    Xml,
}

/// An editable HTTP request. A request without a collection id is a draft.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<String>,
    pub name: String,
    pub url: String,
    pub method: HttpMethod,
    pub headers: Vec<KeyValue>,
    pub params: Vec<KeyValue>,
    pub body_type: BodyType,
    pub body_raw: String,
    pub body_form: Vec<KeyValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_raw_type: Option<RawBodyHint>,
}

impl Request {
    /// Create an empty draft request.
    pub fn draft() -> Self {
        Request {
            id: util::generate_id(),
            collection_id: None,
            name: String::from(NEW_REQUEST_NAME),
            url: String::new(),
            method: HttpMethod::GET,
            headers: Vec::new(),
            params: Vec::new(),
            body_type: BodyType::None,
            body_raw: String::new(),
            body_form: Vec::new(),
            body_raw_type: None,
        }
    }
}

/// Outcome of a single request execution. Replaced wholesale by the next
/// execution, never merged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub status: u16,
    pub status_text: String,
    /// Header pairs in the order received, names stored as received.
    pub headers: Vec<(String, String)>,
    pub body: String,
    pub time_ms: u64,
    pub size: u64,
}

impl Response {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A named, ordered folder of persisted requests.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub collapsed: bool,
    pub requests: Vec<Request>,
}

impl Collection {
    pub fn new(name: impl Into<String>) -> Self {
        Collection {
            id: util::generate_id(),
            name: name.into(),
            collapsed: false,
            requests: Vec::new(),
        }
    }
}

/// A network event captured by the background recording process. Read-only
/// input to the workspace; imported into an editable request on demand.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggedRequest {
    pub id: String,
    pub url: String,
    pub method: String,
    pub status: u16,
    pub timestamp: i64,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_headers: Option<BTreeMap<String, String>>,
    /// Captured body: a raw string, or a parsed form object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_headers: Option<BTreeMap<String, String>>,
}

impl LoggedRequest {
    /// Deterministic mapping from a captured log entry to an editable
    /// request. Reuses the log id so repeated imports of the same entry
    /// converge on the same tab.
    pub fn to_request(&self) -> Request {
        let headers = self
            .request_headers
            .iter()
            .flat_map(|map| map.iter())
            .map(|(k, v)| KeyValue::new(k.clone(), v.clone()))
            .collect();

        let mut body_type = BodyType::None;
        let mut body_raw = String::new();
        let mut body_form = Vec::new();
        match &self.request_body {
            Some(serde_json::Value::String(s)) if !s.is_empty() => {
                body_type = BodyType::Raw;
                body_raw = s.clone();
            }
            Some(serde_json::Value::Object(map)) => {
                body_type = BodyType::FormData;
                for (k, v) in map {
                    // Multi-valued keys contribute their first element.
                    let first = match v {
                        serde_json::Value::Array(items) => {
                            items.first().cloned().unwrap_or(serde_json::Value::Null)
                        }
                        other => other.clone(),
                    };
                    let text = match first {
                        serde_json::Value::String(s) => s,
                        serde_json::Value::Null => String::new(),
                        other => other.to_string(),
                    };
                    body_form.push(KeyValue::new(k.clone(), text));
                }
            }
            _ => {}
        }

        Request {
            id: self.id.clone(),
            collection_id: None,
            name: util::display_name_for_url(&self.url),
            url: self.url.clone(),
            method: HttpMethod::parse(&self.method),
            headers,
            params: util::query_string_to_params(util::query_of(&self.url)),
            body_type,
            body_raw,
            body_form,
            body_raw_type: None,
        }
    }
}

/// Kind of workspace tab.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TabKind {
    Welcome,
    Request,
}

/// An open workspace view: the welcome screen or a live request editor
/// with its latest execution outcome.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    /// The owning request's id, or the welcome sentinel.
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TabKind,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<HttpMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Request>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Response>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub is_loading: bool,
}

impl Tab {
    /// The synthetic welcome tab shown when nothing else is open.
    pub fn welcome() -> Self {
        Tab {
            id: String::from(WELCOME_TAB_ID),
            kind: TabKind::Welcome,
            title: String::from(WELCOME_TAB_TITLE),
            method: None,
            data: None,
            response: None,
            error: None,
            is_loading: false,
        }
    }

    pub fn for_request(request: Request) -> Self {
        Tab {
            id: request.id.clone(),
            kind: TabKind::Request,
            title: request.name.clone(),
            method: Some(request.method),
            data: Some(request),
            response: None,
            error: None,
            is_loading: false,
        }
    }

    pub fn is_welcome(&self) -> bool {
        self.kind == TabKind::Welcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_log() -> LoggedRequest {
        let mut headers = BTreeMap::new();
        headers.insert("Authorization".to_string(), "Bearer t".to_string());
        LoggedRequest {
            id: "L1".to_string(),
            url: "https://api.x.com/v1/users?active=true".to_string(),
            method: "GET".to_string(),
            status: 200,
            timestamp: 1690000000000,
            kind: "xhr".to_string(),
            request_headers: Some(headers),
            request_body: None,
            response_headers: None,
        }
    }

    #[test]
    fn test_log_import_maps_name_headers_and_params() {
        let req = sample_log().to_request();
        assert_eq!(req.id, "L1");
        assert_eq!(req.name, "/v1/users");
        assert_eq!(req.method, HttpMethod::GET);
        assert_eq!(req.headers.len(), 1);
        assert_eq!(req.headers[0].key, "Authorization");
        assert_eq!(req.headers[0].value, "Bearer t");
        assert!(req.headers[0].enabled);
        assert_eq!(req.params.len(), 1);
        assert_eq!(req.params[0].key, "active");
        assert_eq!(req.params[0].value, "true");
        assert_eq!(req.body_type, BodyType::None);
    }

    #[test]
    fn test_log_import_string_body_becomes_raw() {
        let mut log = sample_log();
        log.request_body = Some(serde_json::Value::String("{\"a\":1}".into()));
        let req = log.to_request();
        assert_eq!(req.body_type, BodyType::Raw);
        assert_eq!(req.body_raw, "{\"a\":1}");
        assert!(req.body_form.is_empty());
    }

    #[test]
    fn test_log_import_object_body_becomes_form_data() {
        let mut log = sample_log();
        log.request_body = Some(serde_json::json!({
            "name": "ada",
            "tags": ["x", "y"],
        }));
        let req = log.to_request();
        assert_eq!(req.body_type, BodyType::FormData);
        assert_eq!(req.body_form.len(), 2);
        let tags = req.body_form.iter().find(|f| f.key == "tags").unwrap();
        // first element of a multi-valued key
        assert_eq!(tags.value, "x");
    }

    #[test]
    fn test_log_import_empty_string_body_stays_none() {
        let mut log = sample_log();
        log.request_body = Some(serde_json::Value::String(String::new()));
        assert_eq!(log.to_request().body_type, BodyType::None);
    }

    #[test]
    fn test_method_parse_defaults_to_get() {
        assert_eq!(HttpMethod::parse("BREW"), HttpMethod::GET);
        assert_eq!(HttpMethod::parse("options"), HttpMethod::OPTIONS);
    }

    #[test]
    fn test_response_header_lookup_is_case_insensitive() {
        let resp = Response {
            status: 200,
            status_text: "OK".into(),
            headers: vec![("Content-Type".into(), "text/plain".into())],
            body: String::new(),
            time_ms: 0,
            size: 0,
        };
        assert_eq!(resp.header("content-type"), Some("text/plain"));
        assert_eq!(resp.header("x-missing"), None);
    }

    #[test]
    fn test_welcome_tab_shape() {
        let tab = Tab::welcome();
        assert!(tab.is_welcome());
        assert_eq!(tab.id, "welcome");
        assert!(tab.data.is_none());
    }
}
