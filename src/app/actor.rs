//! Workspace actor - the single logical thread owning workspace state
//!
//! Processes front-end commands, dispatch outcomes, and the storage change
//! feed one at a time, persisting and emitting a fresh snapshot after each.

use anyhow::{anyhow, Result};
use tokio::sync::{mpsc, oneshot};
use tracing::info;

use crate::messages::{
    DispatchCommand, DispatchEvent, StorageCommand, StorageEvent, WorkspaceCommand,
    WorkspaceSnapshot,
};

use super::state::WorkspaceState;

pub struct WorkspaceActor {
    state: WorkspaceState,
    storage_tx: mpsc::UnboundedSender<StorageCommand>,
    dispatch_tx: mpsc::UnboundedSender<DispatchCommand>,
    snapshot_tx: mpsc::UnboundedSender<WorkspaceSnapshot>,
}

impl WorkspaceActor {
    pub fn new(
        storage_tx: mpsc::UnboundedSender<StorageCommand>,
        dispatch_tx: mpsc::UnboundedSender<DispatchCommand>,
        snapshot_tx: mpsc::UnboundedSender<WorkspaceSnapshot>,
    ) -> Self {
        WorkspaceActor {
            state: WorkspaceState::new(),
            storage_tx,
            dispatch_tx,
            snapshot_tx,
        }
    }

    /// Initialization protocol: one batched slot fetch, tab restoration,
    /// then an optional launch-parameter log import that takes priority
    /// over whatever was restored.
    pub async fn init(&mut self, launch_log_id: Option<String>) -> Result<()> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.storage_tx
            .send(StorageCommand::Load(reply_tx))
            .map_err(|_| anyhow!("storage actor unavailable"))?;
        let data = reply_rx
            .await
            .map_err(|_| anyhow!("storage actor dropped the load reply"))?;

        self.state.restore(data);
        if let Some(log_id) = launch_log_id {
            self.state.import_log(&log_id);
        }
        self.sync_persistence();
        let _ = self.snapshot_tx.send(self.state.snapshot());
        Ok(())
    }

    /// Run the workspace actor message loop.
    pub async fn run(
        mut self,
        mut cmd_rx: mpsc::UnboundedReceiver<WorkspaceCommand>,
        mut dispatch_ev_rx: mpsc::UnboundedReceiver<DispatchEvent>,
        mut storage_ev_rx: mpsc::UnboundedReceiver<StorageEvent>,
    ) {
        loop {
            tokio::select! {
                Some(cmd) = cmd_rx.recv() => {
                    if self.handle_command(cmd) {
                        let _ = self.dispatch_tx.send(DispatchCommand::Shutdown);
                        let _ = self.storage_tx.send(StorageCommand::Shutdown);
                        break;
                    }
                    self.sync_persistence();
                    let _ = self.snapshot_tx.send(self.state.snapshot());
                }
                Some(event) = dispatch_ev_rx.recv() => {
                    self.state.record_outcome(&event.tab_id, event.outcome);
                    self.sync_persistence();
                    let _ = self.snapshot_tx.send(self.state.snapshot());
                }
                Some(event) = storage_ev_rx.recv() => {
                    // external write, applied verbatim and not re-persisted
                    self.state.apply_storage_event(event);
                    let _ = self.snapshot_tx.send(self.state.snapshot());
                }
                else => break,
            }
        }
    }

    /// Handle a front-end command, returns true if shutdown was requested
    fn handle_command(&mut self, cmd: WorkspaceCommand) -> bool {
        match cmd {
            WorkspaceCommand::OpenRequest(request) => self.state.open_request(request),
            WorkspaceCommand::ActivateTab(id) => self.state.activate_tab(&id),
            WorkspaceCommand::CloseTab(id) => self.state.close_tab(&id),
            WorkspaceCommand::ReorderTab { from, to } => self.state.reorder_tab(from, to),
            WorkspaceCommand::RenameTab { id, name } => self.state.rename_tab(&id, &name),
            WorkspaceCommand::BulkClose { action, target_id } => {
                self.state.bulk_close(action, &target_id)
            }
            WorkspaceCommand::NewRequest => self.state.new_request(),
            WorkspaceCommand::EditRequest(request) => self.state.edit_request(request),
            WorkspaceCommand::SendActive => {
                if let Some(cmd) = self.state.begin_send() {
                    if let DispatchCommand::Execute { tab_id, .. } = &cmd {
                        info!(tab = %tab_id, "sending active request");
                    }
                    let _ = self.dispatch_tx.send(cmd);
                }
            }
            WorkspaceCommand::ImportCurl(input) => self.state.import_curl(&input),
            WorkspaceCommand::CreateCollection => self.state.create_collection(),
            WorkspaceCommand::RenameCollection { id, name } => {
                self.state.rename_collection(&id, &name)
            }
            WorkspaceCommand::DeleteCollection(id) => self.state.delete_collection(&id),
            WorkspaceCommand::RenameRequest { id, name } => self.state.rename_request(&id, &name),
            WorkspaceCommand::DeleteRequest(id) => self.state.delete_request(&id),
            WorkspaceCommand::DuplicateRequest(id) => self.state.duplicate_request(&id),
            WorkspaceCommand::ToggleCollapse(id) => self.state.toggle_collapse(&id),
            WorkspaceCommand::MoveRequest {
                request_id,
                target_collection_id,
            } => self.state.move_request(&request_id, &target_collection_id),
            WorkspaceCommand::SaveToCollection {
                request_id,
                collection_id,
            } => self.state.save_to_collection(&request_id, &collection_id),
            WorkspaceCommand::ImportLog(id) => self.state.import_log(&id),
            WorkspaceCommand::DeleteLog(id) => self.state.delete_log(&id),
            WorkspaceCommand::ClearLogs => self.state.clear_logs(),
            WorkspaceCommand::ToggleRecording => self.state.toggle_recording(),
            WorkspaceCommand::Refresh => {
                // re-read the store so capture-process writes to logs and
                // the recording flag come back through the change feed
                let _ = self.storage_tx.send(StorageCommand::Reload);
            }
            WorkspaceCommand::Shutdown => return true,
        }
        false
    }

    /// Tab state persists on every pass; the collection, log, and
    /// recording slots only when a mutation touched them.
    fn sync_persistence(&mut self) {
        let _ = self.storage_tx.send(StorageCommand::SetTabs {
            tabs: self.state.tabs.clone(),
            active_tab_id: self.state.active_tab_id.clone(),
        });
        if self.state.take_collections_dirty() {
            let _ = self
                .storage_tx
                .send(StorageCommand::SetCollections(self.state.collections.clone()));
        }
        if self.state.take_logs_dirty() {
            let _ = self
                .storage_tx
                .send(StorageCommand::SetLogs(self.state.logs.clone()));
        }
        if self.state.take_recording_dirty() {
            let _ = self
                .storage_tx
                .send(StorageCommand::SetRecording(self.state.is_recording));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LoggedRequest, Request};
    use crate::storage::{StorageActor, StoreData};

    fn wired_actor() -> (
        WorkspaceActor,
        mpsc::UnboundedReceiver<StorageCommand>,
        mpsc::UnboundedReceiver<DispatchCommand>,
        mpsc::UnboundedReceiver<WorkspaceSnapshot>,
    ) {
        let (storage_tx, storage_rx) = mpsc::unbounded_channel();
        let (dispatch_tx, dispatch_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = mpsc::unbounded_channel();
        (
            WorkspaceActor::new(storage_tx, dispatch_tx, snapshot_tx),
            storage_rx,
            dispatch_rx,
            snapshot_rx,
        )
    }

    fn draft(id: &str) -> Request {
        let mut request = Request::draft();
        request.id = id.to_string();
        request.url = "https://x.com/api".to_string();
        request
    }

    #[tokio::test]
    async fn test_every_command_persists_tabs() {
        let (mut actor, mut storage_rx, _dispatch_rx, _snapshot_rx) = wired_actor();
        actor.handle_command(WorkspaceCommand::OpenRequest(draft("a")));
        actor.sync_persistence();

        match storage_rx.recv().await.unwrap() {
            StorageCommand::SetTabs {
                tabs,
                active_tab_id,
            } => {
                assert_eq!(tabs.len(), 1);
                assert_eq!(active_tab_id, "a");
            }
            other => panic!("unexpected command: {:?}", other),
        }
        // no collection mutation, so nothing else was written
        assert!(storage_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_collection_mutation_persists_collections_once() {
        let (mut actor, mut storage_rx, _dispatch_rx, _snapshot_rx) = wired_actor();
        actor.handle_command(WorkspaceCommand::CreateCollection);
        actor.sync_persistence();

        let mut saw_collections = 0;
        while let Ok(cmd) = storage_rx.try_recv() {
            if let StorageCommand::SetCollections(collections) = cmd {
                assert_eq!(collections.len(), 1);
                saw_collections += 1;
            }
        }
        assert_eq!(saw_collections, 1);

        // the next pass has nothing dirty
        actor.handle_command(WorkspaceCommand::ActivateTab("missing".into()));
        actor.sync_persistence();
        while let Ok(cmd) = storage_rx.try_recv() {
            assert!(matches!(cmd, StorageCommand::SetTabs { .. }));
        }
    }

    #[tokio::test]
    async fn test_refresh_requests_store_reload() {
        let (mut actor, mut storage_rx, _dispatch_rx, _snapshot_rx) = wired_actor();
        actor.handle_command(WorkspaceCommand::Refresh);
        assert!(matches!(
            storage_rx.recv().await.unwrap(),
            StorageCommand::Reload
        ));
    }

    #[tokio::test]
    async fn test_refresh_picks_up_external_capture_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let (storage_tx, storage_rx) = mpsc::unbounded_channel();
        let (storage_ev_tx, storage_ev_rx) = mpsc::unbounded_channel();
        let (dispatch_tx, _dispatch_rx) = mpsc::unbounded_channel();
        let (_dispatch_ev_tx, dispatch_ev_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, mut snapshot_rx) = mpsc::unbounded_channel();
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();

        tokio::spawn(StorageActor::new(path.clone(), storage_ev_tx).run(storage_rx));
        let mut actor = WorkspaceActor::new(storage_tx.clone(), dispatch_tx, snapshot_tx);
        actor.init(None).await.unwrap();
        tokio::spawn(actor.run(cmd_rx, dispatch_ev_rx, storage_ev_rx));

        // a Load round trip guarantees the startup tab write hit the disk
        let (reply_tx, reply_rx) = oneshot::channel();
        storage_tx.send(StorageCommand::Load(reply_tx)).unwrap();
        reply_rx.await.unwrap();

        // the capture process appends a log and flips the recording flag
        // behind the panel's back
        let external = StoreData {
            logs: vec![LoggedRequest {
                id: "ext1".into(),
                url: "https://x.com/captured".into(),
                method: "GET".into(),
                status: 200,
                timestamp: 1,
                kind: "xhr".into(),
                request_headers: None,
                request_body: None,
                response_headers: None,
            }],
            is_recording: true,
            ..Default::default()
        };
        std::fs::write(&path, serde_json::to_string(&external).unwrap()).unwrap();

        cmd_tx.send(WorkspaceCommand::Refresh).unwrap();

        let snapshot = tokio::time::timeout(std::time::Duration::from_secs(5), async {
            while let Some(snapshot) = snapshot_rx.recv().await {
                if !snapshot.logs.is_empty() {
                    return snapshot;
                }
            }
            panic!("snapshot channel closed");
        })
        .await
        .unwrap();
        assert_eq!(snapshot.logs[0].id, "ext1");
        assert!(snapshot.is_recording);
    }

    #[tokio::test]
    async fn test_send_active_forwards_to_dispatch() {
        let (mut actor, _storage_rx, mut dispatch_rx, _snapshot_rx) = wired_actor();
        actor.handle_command(WorkspaceCommand::OpenRequest(draft("a")));
        actor.handle_command(WorkspaceCommand::SendActive);

        match dispatch_rx.recv().await.unwrap() {
            DispatchCommand::Execute { tab_id, plan } => {
                assert_eq!(tab_id, "a");
                assert_eq!(plan.url, "https://x.com/api");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_url_never_reaches_dispatch() {
        let (mut actor, _storage_rx, mut dispatch_rx, _snapshot_rx) = wired_actor();
        let mut request = draft("a");
        request.url = "not-a-url".into();
        actor.handle_command(WorkspaceCommand::OpenRequest(request));
        actor.handle_command(WorkspaceCommand::SendActive);
        assert!(dispatch_rx.try_recv().is_err());
        assert!(actor.state.tabs[0].error.is_some());
    }

    #[tokio::test]
    async fn test_shutdown_propagates_to_both_gateways() {
        let (actor, mut storage_rx, mut dispatch_rx, _snapshot_rx) = wired_actor();
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (_dispatch_ev_tx, dispatch_ev_rx) = mpsc::unbounded_channel();
        let (_storage_ev_tx, storage_ev_rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(actor.run(cmd_rx, dispatch_ev_rx, storage_ev_rx));

        cmd_tx.send(WorkspaceCommand::Shutdown).unwrap();
        handle.await.unwrap();

        assert!(matches!(
            dispatch_rx.recv().await,
            Some(DispatchCommand::Shutdown)
        ));
        let mut saw_shutdown = false;
        while let Some(cmd) = storage_rx.recv().await {
            if matches!(cmd, StorageCommand::Shutdown) {
                saw_shutdown = true;
                break;
            }
        }
        assert!(saw_shutdown);
    }
}
