//! Network layer - HTTP dispatch and header-override registration

pub mod actor;
pub mod client;

pub use actor::DispatchActor;
