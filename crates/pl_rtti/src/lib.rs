#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

pub mod class;
pub mod error;
pub mod event;
pub mod func;
pub mod member;
pub mod object;
pub mod registry;
pub mod types;

// -----------------------------------------------------------------------------
// Top-Level exports

#[doc(hidden)]
pub mod __macro_exports;

pub use class::{ClassBuilder, ClassRef};
pub use object::{DynObject, Object, ObjectRef};
pub use registry::{ClassManager, ClassManagerArc};
