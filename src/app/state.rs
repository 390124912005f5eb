//! Workspace state - pure data structure with no I/O logic

use crate::constants::WELCOME_TAB_ID;
use crate::messages::snapshot::{SidebarPane, TabSummary, WorkspaceSnapshot};
use crate::messages::StorageEvent;
use crate::models::{Collection, LoggedRequest, Tab};
use crate::storage::StoreData;

/// Authoritative in-memory workspace state: the open-tab sequence, the
/// active tab, the collection tree, the capture log, and the recording
/// flag. Every mutation goes through the command methods in
/// `app::commands` and `app::exec`.
pub struct WorkspaceState {
    pub tabs: Vec<Tab>,
    pub active_tab_id: String,
    pub collections: Vec<Collection>,
    /// Read-mostly mirror of the capture process's log slot.
    pub logs: Vec<LoggedRequest>,
    pub is_recording: bool,
    pub sidebar: SidebarPane,
    /// One-shot user-facing notice, drained into the next snapshot.
    pub notice: Option<String>,

    pub(crate) collections_dirty: bool,
    pub(crate) logs_dirty: bool,
    pub(crate) recording_dirty: bool,
}

impl Default for WorkspaceState {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkspaceState {
    pub fn new() -> Self {
        WorkspaceState {
            tabs: vec![Tab::welcome()],
            active_tab_id: String::from(WELCOME_TAB_ID),
            collections: Vec::new(),
            logs: Vec::new(),
            is_recording: false,
            sidebar: SidebarPane::default(),
            notice: None,
            collections_dirty: false,
            logs_dirty: false,
            recording_dirty: false,
        }
    }

    /// Apply the persisted snapshot read at startup. Restoration is a
    /// default; a launch-parameter import may still override it.
    pub fn restore(&mut self, data: StoreData) {
        self.collections = data.collections;
        self.logs = data.logs;
        self.is_recording = data.is_recording;
        if !data.saved_tabs.is_empty() {
            self.tabs = data.saved_tabs;
        }
        if let Some(active) = data.saved_active_tab_id {
            self.active_tab_id = active;
        }
    }

    pub fn active_tab(&self) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.id == self.active_tab_id)
    }

    pub fn tab_mut(&mut self, id: &str) -> Option<&mut Tab> {
        self.tabs.iter_mut().find(|t| t.id == id)
    }

    /// Change notifications from the persistence gateway replace the
    /// corresponding field in full. Last applied wins.
    pub fn apply_storage_event(&mut self, event: StorageEvent) {
        match event {
            StorageEvent::CollectionsChanged { new, .. } => self.collections = new,
            StorageEvent::LogsChanged { new, .. } => self.logs = new,
            StorageEvent::RecordingChanged { new, .. } => self.is_recording = new,
        }
    }

    pub(crate) fn take_collections_dirty(&mut self) -> bool {
        std::mem::take(&mut self.collections_dirty)
    }

    pub(crate) fn take_logs_dirty(&mut self) -> bool {
        std::mem::take(&mut self.logs_dirty)
    }

    pub(crate) fn take_recording_dirty(&mut self) -> bool {
        std::mem::take(&mut self.recording_dirty)
    }

    /// Convert state to a snapshot for the front end.
    pub fn snapshot(&mut self) -> WorkspaceSnapshot {
        WorkspaceSnapshot {
            tabs: self
                .tabs
                .iter()
                .map(|t| TabSummary {
                    id: t.id.clone(),
                    title: t.title.clone(),
                    method: t.method,
                    is_loading: t.is_loading,
                    is_active: t.id == self.active_tab_id,
                })
                .collect(),
            active_tab_id: self.active_tab_id.clone(),
            active: self.active_tab().cloned(),
            collections: self.collections.clone(),
            logs: self.logs.clone(),
            is_recording: self.is_recording,
            sidebar: self.sidebar,
            notice: self.notice.take(),
        }
    }
}
