//! The class registry.
//!
//! ## Menu
//!
//! - [`ClassManager`]: classes by name and module metadata.
//! - [`ClassManagerArc`]: a manager shared between threads.
//! - [`ModuleId`], [`ModuleInfo`]: the modules classes belong to.
//! - [`RegistryEvent`]: changes reported to subscribers.
//! - [`ClassRegistration`]: static registration, see [`ClassManager::auto_register`].
//!
//! ## auto_register
//!
//! Static registration uses the [`inventory`] crate behind the
//! `auto_register` feature. Registrations are only applied when
//! [`ClassManager::auto_register`] is called.

// -----------------------------------------------------------------------------
// Modules

mod auto_register;
mod class_manager;
mod module;

// -----------------------------------------------------------------------------
// Exports

pub use auto_register::ClassRegistration;
pub use class_manager::{ClassManager, ClassManagerArc};
pub use class_manager::{IncludeAbstract, IncludeBase, Recursion, Registered};
pub use class_manager::{RegistryEvent, SubscriptionId};
pub use module::{ModuleId, ModuleInfo};

pub(crate) use auto_register::apply_registrations;
