//! Member descriptors of reflected classes.
//!
//! ## Menu
//!
//! - [`MemberInfo`], [`MemberKind`], [`MemberDesc`]: data shared by all members.
//! - [`VarDesc`] / [`DynVar`]: attributes and attributes bound to an object.
//! - [`FuncDesc`]: methods, bound as [`BoundMethod`](crate::func::BoundMethod).
//! - [`EventDesc`] / [`EventHandlerDesc`]: signals and slots.
//! - [`ConstructorDesc`]: object factories.
//!
//! Descriptors are unbound templates shared through `Arc`. Binding produces a
//! proxy holding the object weakly.

// -----------------------------------------------------------------------------
// Modules

mod constructor_desc;
mod event_desc;
mod func_desc;
mod info;
mod var_desc;

// -----------------------------------------------------------------------------
// Exports

pub use constructor_desc::ConstructorDesc;
pub use event_desc::{EventDesc, EventHandlerDesc};
pub use func_desc::FuncDesc;
pub use info::{MemberDesc, MemberInfo, MemberKind};
pub use var_desc::{AccessMode, DynVar, VarDesc};

pub use crate::event::DynEventHandler;
