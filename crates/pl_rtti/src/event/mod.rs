//! Signals and their receivers.

// -----------------------------------------------------------------------------
// Modules

mod event;
mod handler;

// -----------------------------------------------------------------------------
// Exports

pub use event::{ConnectionId, Event};
pub use handler::DynEventHandler;
