//! Request execution flow - validation, header classification, and body
//! planning for the active tab's request

use crate::messages::dispatch::{
    BodyPlan, DispatchCommand, DispatchPlan, HeaderRule, MultipartField,
};
use crate::models::{BodyType, KeyValueKind, Request};

use super::state::WorkspaceState;

/// Headers the dispatch environment silently drops or mangles when set
/// directly. They route through the override-rule facility instead.
const RESTRICTED_HEADERS: [&str; 9] = [
    "origin",
    "referer",
    "user-agent",
    "cookie",
    "host",
    "date",
    "via",
    "connection",
    "upgrade",
];

fn is_restricted(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    RESTRICTED_HEADERS.contains(&lower.as_str())
        || lower.starts_with("sec-")
        || lower.starts_with("proxy-")
}

impl WorkspaceState {
    /// Start executing the active tab's request. Returns the command to
    /// hand to the dispatch gateway, or None when there is nothing to send
    /// or validation failed locally (the error is already on the tab and
    /// nothing reaches the gateway).
    pub fn begin_send(&mut self) -> Option<DispatchCommand> {
        let (tab_id, request) = {
            let tab = self.active_tab()?;
            (tab.id.clone(), tab.data.clone()?)
        };

        {
            let tab = self.tab_mut(&tab_id)?;
            tab.is_loading = true;
            tab.response = None;
            tab.error = None;
        }

        if !request.url.starts_with("http://") && !request.url.starts_with("https://") {
            let tab = self.tab_mut(&tab_id)?;
            tab.is_loading = false;
            tab.error = Some(String::from("URL must start with http:// or https://"));
            return None;
        }

        Some(DispatchCommand::Execute {
            tab_id,
            plan: build_plan(&request),
        })
    }
}

/// Classify headers into the direct and override buckets and assemble the
/// body according to the selected body type.
pub fn build_plan(request: &Request) -> DispatchPlan {
    let mut headers = Vec::new();
    let mut overrides = Vec::new();

    for entry in request.headers.iter().filter(|h| h.enabled) {
        let key = entry.key.trim();
        // pseudo-headers never leave the editor
        if key.is_empty() || key.starts_with(':') {
            continue;
        }
        // The gateway computes the multipart boundary itself; a manual
        // Content-Type would lose it.
        if request.body_type == BodyType::FormData && key.eq_ignore_ascii_case("content-type") {
            continue;
        }
        if is_restricted(key) {
            overrides.push(HeaderRule {
                name: key.to_string(),
                value: entry.value.clone(),
            });
        } else {
            headers.push((key.to_string(), entry.value.clone()));
        }
    }

    let body = if request.method.has_body() {
        match request.body_type {
            BodyType::None => BodyPlan::Empty,
            BodyType::Raw => BodyPlan::Raw(request.body_raw.clone()),
            BodyType::UrlEncoded => BodyPlan::UrlEncoded(
                request
                    .body_form
                    .iter()
                    .filter(|f| f.enabled)
                    .map(|f| (f.key.clone(), f.value.clone()))
                    .collect(),
            ),
            BodyType::FormData => BodyPlan::Multipart(
                request
                    .body_form
                    .iter()
                    .filter(|f| f.enabled)
                    .map(|f| match (&f.kind, &f.file) {
                        (KeyValueKind::File, Some(payload)) => MultipartField::File {
                            name: f.key.clone(),
                            file_name: payload.name.clone(),
                            content: payload.content.clone(),
                        },
                        _ => MultipartField::Text {
                            name: f.key.clone(),
                            value: f.value.clone(),
                        },
                    })
                    .collect(),
            ),
        }
    } else {
        BodyPlan::Empty
    };

    DispatchPlan {
        method: request.method,
        url: request.url.clone(),
        headers,
        overrides,
        body,
    }
}
