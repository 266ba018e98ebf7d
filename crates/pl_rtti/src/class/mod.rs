//! Class descriptions.
//!
//! ## Menu
//!
//! - [`ClassBuilder`]: declares a class and its members.
//! - [`Class`]: the stored description.
//! - [`ClassRef`]: a registered class, with lookups through base classes.
//! - [`Dummy`]: marker for placeholder classes.

// -----------------------------------------------------------------------------
// Modules

mod class;
mod class_ref;

// -----------------------------------------------------------------------------
// Exports

pub use class::{Class, ClassBuilder, Dummy};
pub use class_ref::ClassRef;
