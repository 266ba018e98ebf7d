//! Dynamic function calls.
//!
//! ## Menu
//!
//! - [`Signature`]: return and parameter types, `ret(p0,p1,...)`.
//! - [`DynParams`]: typed argument list with string and document marshalling.
//! - [`DynFunc`]: the type-erased callable contract.
//! - [`Functor`]: a closure as a [`DynFunc`].
//! - [`BoundMethod`]: a method bound weakly to an object.
//! - [`ParamsParser`]: tokenizer for `Name="Value"` strings.

// -----------------------------------------------------------------------------
// Modules

mod dyn_func;
mod functor;
mod method;
mod params;
mod params_parser;
mod signature;

// -----------------------------------------------------------------------------
// Exports

pub use dyn_func::DynFunc;
pub use functor::{Functor, FunctorFn};
pub use method::{BoundMethod, MethodFn};
pub use params::DynParams;
pub use params_parser::{ParamToken, ParamsParser};
pub use signature::{Signature, TypedArgs};

pub(crate) use dyn_func::check_params;
pub(crate) use method::ErasedMethod;
pub(crate) use params_parser::write_pair;
