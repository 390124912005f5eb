//! Storage messages - slot store commands and its change feed

use tokio::sync::oneshot;

use crate::models::{Collection, LoggedRequest, Tab};
use crate::storage::StoreData;

/// Commands sent to the storage actor.
#[derive(Debug)]
pub enum StorageCommand {
    /// Batched fetch of all slots.
    Load(oneshot::Sender<StoreData>),
    SetCollections(Vec<Collection>),
    SetTabs {
        tabs: Vec<Tab>,
        active_tab_id: String,
    },
    SetLogs(Vec<LoggedRequest>),
    SetRecording(bool),
    /// Re-read the store from disk and emit change events for slots
    /// written by the external capture process.
    Reload,
    Shutdown,
}

/// Field-level change notification carrying old and new values. The
/// workspace applies new values verbatim, last-writer-wins.
#[derive(Debug, Clone)]
pub enum StorageEvent {
    CollectionsChanged {
        old: Vec<Collection>,
        new: Vec<Collection>,
    },
    LogsChanged {
        old: Vec<LoggedRequest>,
        new: Vec<LoggedRequest>,
    },
    RecordingChanged {
        old: bool,
        new: bool,
    },
}
