//! Workspace commands - messages from the front end to the workspace actor

use crate::models::Request;

/// Which neighbors of a target tab a bulk close removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkCloseAction {
    Others,
    ToTheRight,
    ToTheLeft,
    All,
}

/// Every mutation of the workspace goes through one of these.
#[derive(Debug, Clone)]
pub enum WorkspaceCommand {
    // Tabs
    OpenRequest(Request),
    ActivateTab(String),
    CloseTab(String),
    ReorderTab { from: usize, to: usize },
    RenameTab { id: String, name: String },
    BulkClose { action: BulkCloseAction, target_id: String },

    // Requests
    NewRequest,
    EditRequest(Request),
    SendActive,
    ImportCurl(String),

    // Collections
    CreateCollection,
    RenameCollection { id: String, name: String },
    DeleteCollection(String),
    RenameRequest { id: String, name: String },
    DeleteRequest(String),
    DuplicateRequest(String),
    ToggleCollapse(String),
    MoveRequest { request_id: String, target_collection_id: String },
    SaveToCollection { request_id: String, collection_id: String },

    // Capture log
    ImportLog(String),
    DeleteLog(String),
    ClearLogs,
    ToggleRecording,

    // System
    Refresh,
    Shutdown,
}
