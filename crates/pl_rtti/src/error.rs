use thiserror::Error;

use crate::registry::ModuleId;
use crate::types::TypeKind;

// -----------------------------------------------------------------------------
// ConvertError

/// Failure converting between a [`DynValue`](crate::types::DynValue),
/// its string form and a Rust value.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ConvertError {
    #[error("can not parse {input:?} as `{expected}`")]
    Parse { expected: String, input: String },

    #[error("value {value} is out of range for `{expected}`")]
    OutOfRange { expected: TypeKind, value: String },

    #[error("type mismatch: expected `{expected}`, found `{found}`")]
    TypeMismatch { expected: TypeKind, found: TypeKind },

    #[error("`{0}` values have no textual representation")]
    Unsupported(TypeKind),
}

// -----------------------------------------------------------------------------
// ParamsError

/// Failure filling a [`DynParams`](crate::func::DynParams) from a string or document.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ParamsError {
    #[error("malformed parameter string at byte {position}: {reason}")]
    Syntax { position: usize, reason: &'static str },

    #[error("parameter document must be an object or an array")]
    Document,

    #[error("parameter document lacks `{0}`")]
    MissingParam(String),

    #[error("expected {expected} parameters, found {found}")]
    Arity { expected: usize, found: usize },

    #[error("parameter {index}: {source}")]
    Slot {
        index: usize,
        #[source]
        source: ConvertError,
    },
}

// -----------------------------------------------------------------------------
// CallError

/// Failure of a dynamic invocation.
///
/// The callee is never invoked when any of these is returned,
/// except for [`CallError::Return`] which reports a bad return value.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum CallError {
    #[error("expected {expected} arguments, found {found}")]
    Arity { expected: usize, found: usize },

    #[error("signature mismatch: expected `{expected}`, found `{found}`")]
    Signature { expected: String, found: String },

    #[error(transparent)]
    Params(#[from] ParamsError),

    #[error("argument {index}: {source}")]
    Argument {
        index: usize,
        #[source]
        source: ConvertError,
    },

    #[error("return value: {0}")]
    Return(ConvertError),

    #[error("the bound object no longer exists")]
    Expired,

    #[error("the descriptor `{0}` is not bound to an implementation")]
    Unbound(String),

    #[error("the object is not an instance of `{0}`")]
    Target(String),

    #[error("`{0}` was called while its object is running a call on this thread")]
    Busy(String),
}

// -----------------------------------------------------------------------------
// VarError

/// Failure reading or writing a [`DynVar`](crate::member::DynVar).
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum VarError {
    #[error("attribute `{0}` is read-only")]
    ReadOnly(String),

    #[error("the bound object no longer exists")]
    Expired,

    #[error("attribute `{0}` is not bound to an implementation")]
    Unbound(String),

    #[error("the object is not an instance of `{0}`")]
    Target(String),

    #[error("attribute `{0}` was accessed while its object is running a call on this thread")]
    Busy(String),

    #[error(transparent)]
    Convert(#[from] ConvertError),
}

// -----------------------------------------------------------------------------
// ConnectError

/// Failure wiring a signal to a slot.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ConnectError {
    #[error("signature mismatch: signal `{signal}`, slot `{slot}`")]
    Signature { signal: String, slot: String },

    #[error("unknown signal `{0}`")]
    UnknownSignal(String),

    #[error("unknown slot `{0}`")]
    UnknownSlot(String),
}

// -----------------------------------------------------------------------------
// RegisterError

/// Rejected class registration. The registry is left unchanged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RegisterError {
    #[error("class `{class}` is already registered by module {module}")]
    Duplicate { class: String, module: ModuleId },

    #[error("class `{class}` of module {module} conflicts with the class registered by module {existing}")]
    NameConflict {
        class: String,
        module: ModuleId,
        existing: ModuleId,
    },

    #[error("cyclic base class: `{class}` derives from itself through `{base}`")]
    CyclicBase { class: String, base: String },
}
