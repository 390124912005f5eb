//! App layer - central state management and command processing
//!
//! The workspace actor receives front-end commands, dispatch outcomes, and
//! storage change events, updates state, and emits snapshots.

pub mod actor;
pub mod commands;
pub mod exec;
pub mod state;

pub use actor::WorkspaceActor;
pub use state::WorkspaceState;
