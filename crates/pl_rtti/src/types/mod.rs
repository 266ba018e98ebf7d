//! Runtime type descriptions and boxed values.
//!
//! ## Menu
//!
//! - [`TypeKind`]: the storage category of a value.
//! - [`DynValue`]: a boxed, type-tagged value.
//! - [`DynTypeInfo`]: a kind plus optional enum metadata, converts values
//!   to and from strings and documents.
//! - [`EnumInfo`]: named values of an enumeration or flag set.
//! - [`Typed`]: Rust types that map onto a [`DynTypeInfo`].

// -----------------------------------------------------------------------------
// Modules

mod enum_info;
mod type_info;
mod type_kind;
mod typed;
mod value;

// -----------------------------------------------------------------------------
// Exports

pub use enum_info::{EnumInfo, EnumValue};
pub use type_info::DynTypeInfo;
pub use type_kind::TypeKind;
pub use typed::Typed;
pub use value::DynValue;
