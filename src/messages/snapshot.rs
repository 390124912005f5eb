//! Workspace snapshot - state emitted to the front end after every event

use crate::models::{Collection, HttpMethod, LoggedRequest, Tab};

/// Which sidebar listing the front end shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SidebarPane {
    Collections,
    #[default]
    History,
}

/// One entry of the tab strip.
#[derive(Debug, Clone)]
pub struct TabSummary {
    pub id: String,
    pub title: String,
    pub method: Option<HttpMethod>,
    pub is_loading: bool,
    pub is_active: bool,
}

/// Complete state needed by the front end after an event.
#[derive(Debug, Clone, Default)]
pub struct WorkspaceSnapshot {
    pub tabs: Vec<TabSummary>,
    pub active_tab_id: String,
    /// Full clone of the active tab, response and error included.
    pub active: Option<Tab>,
    pub collections: Vec<Collection>,
    pub logs: Vec<LoggedRequest>,
    pub is_recording: bool,
    pub sidebar: SidebarPane,
    /// One-shot user-facing notice, e.g. a curl parse failure.
    pub notice: Option<String>,
}
