//! Dispatch messages - communication between the workspace and network layers

use crate::models::{HttpMethod, Response};

/// A header the environment refuses to set directly; registered with the
/// dispatch gateway's rewrite facility instead of the direct header map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderRule {
    pub name: String,
    pub value: String,
}

/// One entry of a multipart payload.
#[derive(Debug, Clone)]
pub enum MultipartField {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        content: Vec<u8>,
    },
}

/// The body handed to the dispatch gateway. For urlencoded and multipart
/// payloads the gateway computes the Content-Type itself.
#[derive(Debug, Clone)]
pub enum BodyPlan {
    Empty,
    Raw(String),
    UrlEncoded(Vec<(String, String)>),
    Multipart(Vec<MultipartField>),
}

/// A fully classified request, ready for dispatch.
#[derive(Debug, Clone)]
pub struct DispatchPlan {
    pub method: HttpMethod,
    pub url: String,
    /// Direct header bucket, passed straight through.
    pub headers: Vec<(String, String)>,
    /// Override-rule bucket, registered before the request is issued.
    pub overrides: Vec<HeaderRule>,
    pub body: BodyPlan,
}

/// Commands sent from the workspace layer to the network layer
#[derive(Debug, Clone)]
pub enum DispatchCommand {
    Execute { tab_id: String, plan: DispatchPlan },
    Shutdown,
}

/// Exactly one of these is produced per execution.
#[derive(Debug, Clone)]
pub enum DispatchOutcome {
    Completed(Response),
    Failed(String),
}

/// Responses sent from the network layer back to the workspace layer
#[derive(Debug, Clone)]
pub struct DispatchEvent {
    /// Tab the outcome belongs to. May no longer exist; the write is then
    /// dropped.
    pub tab_id: String,
    pub outcome: DispatchOutcome,
}
