//! Persistence gateway - the JSON slot store shared with the capture process
//!
//! Five named slots mirror what the background recorder reads and writes:
//! `collections`, `logs`, `savedTabs`, `savedActiveTabId`, `isRecording`.
//! Every write rewrites the whole document; `Reload` picks up external
//! writes and feeds them into the change feed as field-level events.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::constants::{CONFIG_DIR, STORE_FILE};
use crate::messages::{StorageCommand, StorageEvent};
use crate::models::{Collection, LoggedRequest, Tab};

/// The full slot document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreData {
    pub collections: Vec<Collection>,
    pub logs: Vec<LoggedRequest>,
    pub saved_tabs: Vec<Tab>,
    pub saved_active_tab_id: Option<String>,
    pub is_recording: bool,
}

/// Default location of the slot store.
pub fn default_store_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR)
        .join(STORE_FILE)
}

fn read_store(path: &Path) -> Result<StoreData> {
    if !path.exists() {
        return Ok(StoreData::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading store at {}", path.display()))?;
    let data = serde_json::from_str(&content)
        .with_context(|| format!("parsing store at {}", path.display()))?;
    Ok(data)
}

/// Actor owning the slot store file.
pub struct StorageActor {
    path: PathBuf,
    data: StoreData,
    event_tx: mpsc::UnboundedSender<StorageEvent>,
}

impl StorageActor {
    /// Open the store at `path`, starting from an empty document when the
    /// file is missing or unreadable.
    pub fn new(path: PathBuf, event_tx: mpsc::UnboundedSender<StorageEvent>) -> Self {
        let data = match read_store(&path) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(error = %e, "store unreadable, starting empty");
                StoreData::default()
            }
        };
        StorageActor {
            path,
            data,
            event_tx,
        }
    }

    /// Run the storage actor message loop.
    pub async fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<StorageCommand>) {
        while let Some(cmd) = cmd_rx.recv().await {
            match cmd {
                StorageCommand::Load(reply) => {
                    let _ = reply.send(self.data.clone());
                }
                StorageCommand::SetCollections(collections) => {
                    self.data.collections = collections;
                    self.persist();
                }
                StorageCommand::SetTabs {
                    tabs,
                    active_tab_id,
                } => {
                    self.data.saved_tabs = tabs;
                    self.data.saved_active_tab_id = Some(active_tab_id);
                    self.persist();
                }
                StorageCommand::SetLogs(logs) => {
                    self.data.logs = logs;
                    self.persist();
                }
                StorageCommand::SetRecording(value) => {
                    self.data.is_recording = value;
                    self.persist();
                }
                StorageCommand::Reload => self.reload(),
                StorageCommand::Shutdown => break,
            }
        }
    }

    /// Writes are fire-and-forget from the workspace's perspective; a
    /// failed write is logged, not surfaced.
    fn persist(&self) {
        if let Err(e) = self.try_persist() {
            tracing::warn!(error = %e, path = %self.path.display(), "failed to persist store");
        }
    }

    fn try_persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.data)?;
        fs::write(&self.path, content)?;
        Ok(())
    }

    /// Pick up external writes: one change event per slot that differs.
    /// Only collections, logs, and the recording flag are on the feed;
    /// saved tabs are ours alone.
    fn reload(&mut self) {
        let fresh = match read_store(&self.path) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(error = %e, "reload failed, keeping current store");
                return;
            }
        };
        if fresh.collections != self.data.collections {
            let _ = self.event_tx.send(StorageEvent::CollectionsChanged {
                old: self.data.collections.clone(),
                new: fresh.collections.clone(),
            });
        }
        if fresh.logs != self.data.logs {
            let _ = self.event_tx.send(StorageEvent::LogsChanged {
                old: self.data.logs.clone(),
                new: fresh.logs.clone(),
            });
        }
        if fresh.is_recording != self.data.is_recording {
            let _ = self.event_tx.send(StorageEvent::RecordingChanged {
                old: self.data.is_recording,
                new: fresh.is_recording,
            });
        }
        self.data = fresh;
    }
}
