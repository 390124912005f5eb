//! # httpdeck
//!
//! A tabbed HTTP request workbench: compose and send requests, organize
//! them into collections, and import entries captured by a background
//! recording process into editable tabs.
//!
//! ## Features
//! - HTTP methods: GET, POST, PUT, DELETE, PATCH, HEAD, OPTIONS
//! - Tabbed workspace restored across restarts
//! - Collections of saved, named requests
//! - Capture-log browsing and one-shot import
//! - cURL command import and export
//! - Override-rule registration for environment-restricted headers
//!
//! ## Architecture
//! Actor-based with channels between layers:
//! - Front end (line-oriented command loop)
//! - Workspace layer (state machine, one event at a time)
//! - Storage layer (JSON slot store shared with the capture process)
//! - Network layer (Tokio + reqwest dispatch)

pub mod app;
pub mod constants;
pub mod curl;
pub mod messages;
pub mod models;
pub mod network;
pub mod storage;
pub mod util;

pub use app::{WorkspaceActor, WorkspaceState};
pub use curl::{generate_curl, parse_curl};
pub use messages::{
    DispatchCommand, DispatchEvent, StorageCommand, StorageEvent, WorkspaceCommand,
    WorkspaceSnapshot,
};
pub use models::{BodyType, Collection, HttpMethod, KeyValue, LoggedRequest, Request, Response, Tab};
pub use network::DispatchActor;
pub use storage::{default_store_path, StorageActor, StoreData};
