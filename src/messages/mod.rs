//! Message types for inter-layer communication in the actor-based architecture.
//!
//! This module defines all messages that flow between the front end, the
//! workspace actor, the storage actor, and the dispatch actor.

pub mod dispatch;
pub mod snapshot;
pub mod storage;
pub mod workspace;

pub use dispatch::{DispatchCommand, DispatchEvent, DispatchOutcome, DispatchPlan};
pub use snapshot::WorkspaceSnapshot;
pub use storage::{StorageCommand, StorageEvent};
pub use workspace::WorkspaceCommand;
