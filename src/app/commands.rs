//! Workspace command methods - tab, collection, and capture-log mutations
//!
//! Each method is a complete transition: it leaves the state satisfying the
//! workspace invariants (at least one tab open, active id always valid, the
//! welcome tab present exactly when no request tab is).

use crate::constants::{NEW_COLLECTION_NAME, WELCOME_TAB_ID};
use crate::curl;
use crate::messages::dispatch::DispatchOutcome;
use crate::messages::snapshot::SidebarPane;
use crate::messages::workspace::BulkCloseAction;
use crate::models::{Collection, Request, Tab};
use crate::util;

use super::state::WorkspaceState;

// ==================== Tabs ====================

impl WorkspaceState {
    /// Open a request in a tab. An already-open request is activated
    /// instead of duplicated; a lone welcome tab is replaced.
    pub fn open_request(&mut self, request: Request) {
        if self.tabs.iter().any(|t| t.id == request.id) {
            self.active_tab_id = request.id;
            return;
        }
        let tab = Tab::for_request(request);
        let id = tab.id.clone();
        if self.tabs.len() == 1 && self.tabs[0].is_welcome() {
            self.tabs = vec![tab];
        } else {
            self.tabs.push(tab);
        }
        self.active_tab_id = id;
    }

    /// Activating an unknown tab id is a no-op.
    pub fn activate_tab(&mut self, id: &str) {
        if self.tabs.iter().any(|t| t.id == id) {
            self.active_tab_id = id.to_string();
        }
    }

    pub fn close_tab(&mut self, id: &str) {
        self.tabs.retain(|t| t.id != id);
        if self.tabs.is_empty() {
            self.reset_to_welcome();
        } else if self.active_tab_id == id {
            self.activate_last();
        }
    }

    /// Move the tab at `from` to position `to` (clamped).
    pub fn reorder_tab(&mut self, from: usize, to: usize) {
        if from >= self.tabs.len() {
            return;
        }
        let tab = self.tabs.remove(from);
        let to = to.min(self.tabs.len());
        self.tabs.insert(to, tab);
    }

    /// Rename a tab. For a saved request the collection entry is the
    /// canonical name, so the rename routes through it; a draft renames
    /// in place.
    pub fn rename_tab(&mut self, id: &str, name: &str) {
        let saved = self
            .tabs
            .iter()
            .find(|t| t.id == id)
            .and_then(|t| t.data.as_ref())
            .map(|d| (d.id.clone(), d.collection_id.is_some()));
        match saved {
            Some((request_id, true)) => self.rename_request(&request_id, name),
            _ => {
                if let Some(tab) = self.tab_mut(id) {
                    tab.title = name.to_string();
                    if let Some(data) = &mut tab.data {
                        data.name = name.to_string();
                    }
                }
            }
        }
    }

    /// Close a contiguous run of tabs relative to `target_id`.
    pub fn bulk_close(&mut self, action: BulkCloseAction, target_id: &str) {
        let Some(target_index) = self.tabs.iter().position(|t| t.id == target_id) else {
            return;
        };
        let tabs = std::mem::take(&mut self.tabs);
        self.tabs = tabs
            .into_iter()
            .enumerate()
            .filter(|(i, t)| match action {
                BulkCloseAction::Others => t.id == target_id,
                BulkCloseAction::ToTheRight => *i <= target_index,
                BulkCloseAction::ToTheLeft => *i >= target_index,
                BulkCloseAction::All => false,
            })
            .map(|(_, t)| t)
            .collect();
        if self.tabs.is_empty() {
            self.reset_to_welcome();
        } else if self.active_tab().is_none() {
            self.activate_last();
        }
    }

    fn reset_to_welcome(&mut self) {
        self.tabs = vec![Tab::welcome()];
        self.active_tab_id = String::from(WELCOME_TAB_ID);
    }

    fn activate_last(&mut self) {
        if let Some(last) = self.tabs.last() {
            self.active_tab_id = last.id.clone();
        }
    }
}

// ==================== Requests ====================

impl WorkspaceState {
    pub fn new_request(&mut self) {
        self.open_request(Request::draft());
    }

    /// Push an edited request into its tab and, when the request is saved,
    /// into its collection in the same transition.
    pub fn edit_request(&mut self, request: Request) {
        if let Some(tab) = self.tab_mut(&request.id) {
            tab.title = request.name.clone();
            tab.method = Some(request.method);
            tab.data = Some(request.clone());
        }
        if let Some(collection_id) = request.collection_id.clone() {
            for collection in &mut self.collections {
                if collection.id == collection_id {
                    for slot in &mut collection.requests {
                        if slot.id == request.id {
                            *slot = request.clone();
                        }
                    }
                }
            }
            self.collections_dirty = true;
        }
    }

    /// Parse a curl command line and open the result as a draft. A parse
    /// failure surfaces as a notice, not an error state.
    pub fn import_curl(&mut self, input: &str) {
        match curl::parse_curl(input) {
            Ok(request) => self.open_request(request),
            Err(_) => self.notice = Some(String::from("Could not parse cURL command.")),
        }
    }

    /// Write a dispatch outcome into its tab. The tab may have been closed
    /// while the request was in flight; the write is then dropped.
    pub fn record_outcome(&mut self, tab_id: &str, outcome: DispatchOutcome) {
        let Some(tab) = self.tab_mut(tab_id) else {
            return;
        };
        tab.is_loading = false;
        match outcome {
            DispatchOutcome::Completed(response) => {
                tab.response = Some(response);
                tab.error = None;
            }
            DispatchOutcome::Failed(message) => {
                tab.response = None;
                tab.error = Some(message);
            }
        }
    }
}

// ==================== Collections ====================

impl WorkspaceState {
    pub fn create_collection(&mut self) {
        self.collections.push(Collection::new(NEW_COLLECTION_NAME));
        self.collections_dirty = true;
        self.sidebar = SidebarPane::Collections;
    }

    pub fn rename_collection(&mut self, id: &str, name: &str) {
        if let Some(collection) = self.collections.iter_mut().find(|c| c.id == id) {
            collection.name = name.to_string();
            self.collections_dirty = true;
        }
    }

    /// Delete a collection and close every tab showing one of its
    /// requests. When tabs remain, the first one becomes active.
    pub fn delete_collection(&mut self, id: &str) {
        let Some(index) = self.collections.iter().position(|c| c.id == id) else {
            return;
        };
        let removed = self.collections.remove(index);
        self.collections_dirty = true;

        let request_ids: Vec<&str> = removed.requests.iter().map(|r| r.id.as_str()).collect();
        self.tabs.retain(|t| !request_ids.contains(&t.id.as_str()));
        if self.tabs.is_empty() {
            self.reset_to_welcome();
        } else {
            self.active_tab_id = self.tabs[0].id.clone();
        }
    }

    /// Rename a saved request everywhere it appears: collection entry, tab
    /// title, and open editor.
    pub fn rename_request(&mut self, request_id: &str, name: &str) {
        for collection in &mut self.collections {
            for request in &mut collection.requests {
                if request.id == request_id {
                    request.name = name.to_string();
                }
            }
        }
        self.collections_dirty = true;
        if let Some(tab) = self.tab_mut(request_id) {
            tab.title = name.to_string();
            if let Some(data) = &mut tab.data {
                data.name = name.to_string();
            }
        }
    }

    /// Delete a saved request from its collection and close its tab if
    /// open. When it was active, the first remaining tab takes over.
    pub fn delete_request(&mut self, request_id: &str) {
        for collection in &mut self.collections {
            collection.requests.retain(|r| r.id != request_id);
        }
        self.collections_dirty = true;

        let was_active = self.active_tab_id == request_id;
        self.tabs.retain(|t| t.id != request_id);
        if self.tabs.is_empty() {
            self.reset_to_welcome();
        } else if was_active {
            self.active_tab_id = self.tabs[0].id.clone();
        }
    }

    /// Copy a saved request within its collection under a fresh id.
    pub fn duplicate_request(&mut self, request_id: &str) {
        let found = self.collections.iter().find_map(|c| {
            c.requests
                .iter()
                .find(|r| r.id == request_id)
                .map(|r| (c.id.clone(), r.clone()))
        });
        let Some((collection_id, source)) = found else {
            return;
        };
        let mut copy = source;
        copy.id = util::generate_id();
        copy.name = format!("{} Copy", copy.name);
        if let Some(collection) = self.collections.iter_mut().find(|c| c.id == collection_id) {
            collection.requests.push(copy);
        }
        self.collections_dirty = true;
    }

    pub fn toggle_collapse(&mut self, collection_id: &str) {
        if let Some(collection) = self.collections.iter_mut().find(|c| c.id == collection_id) {
            collection.collapsed = !collection.collapsed;
            self.collections_dirty = true;
        }
    }

    /// Move a saved request to another collection, keeping any open editor
    /// for it consistent.
    pub fn move_request(&mut self, request_id: &str, target_collection_id: &str) {
        let found = self.collections.iter().find_map(|c| {
            c.requests
                .iter()
                .find(|r| r.id == request_id)
                .map(|r| (c.id.clone(), r.clone()))
        });
        let Some((source_id, request)) = found else {
            return;
        };
        if source_id == target_collection_id
            || !self
                .collections
                .iter()
                .any(|c| c.id == target_collection_id)
        {
            return;
        }

        for collection in &mut self.collections {
            if collection.id == source_id {
                collection.requests.retain(|r| r.id != request_id);
            }
        }
        let mut moved = request;
        moved.collection_id = Some(target_collection_id.to_string());
        if let Some(target) = self
            .collections
            .iter_mut()
            .find(|c| c.id == target_collection_id)
        {
            target.requests.push(moved.clone());
        }
        self.collections_dirty = true;
        self.edit_request(moved);
    }

    /// Save a draft tab's request into a collection. The tab survives with
    /// the now-saved request, and the sidebar flips to the collection pane.
    pub fn save_to_collection(&mut self, request_id: &str, collection_id: &str) {
        let Some(data) = self
            .tabs
            .iter()
            .find(|t| t.id == request_id)
            .and_then(|t| t.data.clone())
        else {
            return;
        };
        if !self.collections.iter().any(|c| c.id == collection_id) {
            return;
        }

        let mut saved = data;
        saved.collection_id = Some(collection_id.to_string());
        if let Some(collection) = self.collections.iter_mut().find(|c| c.id == collection_id) {
            collection.requests.push(saved.clone());
        }
        self.collections_dirty = true;
        self.sidebar = SidebarPane::Collections;
        self.edit_request(saved);
    }
}

// ==================== Capture log ====================

impl WorkspaceState {
    /// Open a captured log entry as an editable request. The derived
    /// request reuses the log id, so re-importing activates the existing
    /// tab instead of opening a second one.
    pub fn import_log(&mut self, log_id: &str) {
        if let Some(log) = self.logs.iter().find(|l| l.id == log_id).cloned() {
            self.open_request(log.to_request());
        }
    }

    /// Remove a log entry. A tab imported from it earlier stays open.
    pub fn delete_log(&mut self, log_id: &str) {
        self.logs.retain(|l| l.id != log_id);
        self.logs_dirty = true;
    }

    pub fn clear_logs(&mut self) {
        self.logs.clear();
        self.logs_dirty = true;
    }

    pub fn toggle_recording(&mut self) {
        self.is_recording = !self.is_recording;
        self.recording_dirty = true;
    }
}
