#![doc = include_str!("../README.md")]

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod element;
mod error;
mod handler;
mod manager;
mod resource;

// -----------------------------------------------------------------------------
// Exports

pub use element::{ElementId, ElementRef};
pub use error::ElementError;
pub use handler::{AttachStatus, ElementHandler, HandlerId};
pub use manager::ElementManager;
pub use resource::{ResourceHandler, ResourceManager, ResourceRef};
