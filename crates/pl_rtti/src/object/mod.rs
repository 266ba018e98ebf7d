//! Reflected objects.
//!
//! ## Menu
//!
//! - [`Object`]: implemented by every reflected type.
//! - [`ObjectRef`] / [`WeakObjectRef`]: shared, type-erased handles.
//! - [`DynObject`]: an object paired with its class, with helpers to read
//!   and write attributes, call methods and connect signals by name.

// -----------------------------------------------------------------------------
// Modules

mod dyn_object;
mod object_ref;

// -----------------------------------------------------------------------------
// Exports

pub use dyn_object::{DefaultValue, DynObject};
pub use object_ref::{Object, ObjectRef, WeakObjectRef};

pub(crate) use object_ref::{view, view_mut};
