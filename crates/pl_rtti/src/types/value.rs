use core::fmt;

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::object::ObjectRef;
use crate::types::TypeKind;

// -----------------------------------------------------------------------------
// DynValue

/// A boxed, type-tagged value passed through the dynamic layer.
///
/// Integers are stored in their widest representation, the exact width is
/// carried by the [`DynTypeInfo`](crate::types::DynTypeInfo) of the slot the
/// value lives in.
#[derive(Debug, Clone, Default)]
pub enum DynValue {
    #[default]
    Void,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f32),
    Double(f64),
    String(String),
    Object(Option<ObjectRef>),
}

impl DynValue {
    /// The widest [`TypeKind`] able to hold this value.
    pub const fn kind(&self) -> TypeKind {
        match self {
            Self::Void => TypeKind::Void,
            Self::Bool(_) => TypeKind::Bool,
            Self::Int(_) => TypeKind::Int64,
            Self::UInt(_) => TypeKind::UInt64,
            Self::Float(_) => TypeKind::Float,
            Self::Double(_) => TypeKind::Double,
            Self::String(_) => TypeKind::String,
            Self::Object(_) => TypeKind::Object,
        }
    }

    #[inline]
    pub const fn is_void(&self) -> bool {
        matches!(self, Self::Void)
    }

    #[inline]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as `i64` if it is an integer that fits.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::UInt(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Returns the value as `u64` if it is an integer that fits.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Int(v) => u64::try_from(*v).ok(),
            Self::UInt(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as `f64` for both floating point kinds.
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v as f64),
            Self::Double(v) => Some(*v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Self::Object(v) => v.as_ref(),
            _ => None,
        }
    }

    /// Converts the value into a document node.
    ///
    /// Objects and non-finite floats become `null`.
    pub fn to_document(&self) -> Value {
        match self {
            Self::Void | Self::Object(_) => Value::Null,
            Self::Bool(v) => Value::Bool(*v),
            Self::Int(v) => Value::from(*v),
            Self::UInt(v) => Value::from(*v),
            Self::Float(v) => Value::from(*v as f64),
            Self::Double(v) => Value::from(*v),
            Self::String(v) => Value::String(v.clone()),
        }
    }
}

impl PartialEq for DynValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Void, Self::Void) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::UInt(a), Self::UInt(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Double(a), Self::Double(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => match (a, b) {
                (Some(a), Some(b)) => a.ptr_eq(b),
                (None, None) => true,
                _ => false,
            },
            _ => false,
        }
    }
}

impl fmt::Display for DynValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Void => Ok(()),
            Self::Bool(v) => fmt::Display::fmt(v, f),
            Self::Int(v) => fmt::Display::fmt(v, f),
            Self::UInt(v) => fmt::Display::fmt(v, f),
            Self::Float(v) => fmt::Display::fmt(v, f),
            Self::Double(v) => fmt::Display::fmt(v, f),
            Self::String(v) => f.pad(v),
            Self::Object(Some(v)) => write!(f, "<{}>", v.class_name()),
            Self::Object(None) => f.pad("null"),
        }
    }
}

impl Serialize for DynValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Void => serializer.serialize_unit(),
            Self::Bool(v) => serializer.serialize_bool(*v),
            Self::Int(v) => serializer.serialize_i64(*v),
            Self::UInt(v) => serializer.serialize_u64(*v),
            Self::Float(v) => serializer.serialize_f32(*v),
            Self::Double(v) => serializer.serialize_f64(*v),
            Self::String(v) => serializer.serialize_str(v),
            Self::Object(_) => serializer.serialize_none(),
        }
    }
}

macro_rules! impl_from_primitive {
    ($($ty:ty => $variant:ident as $cast:ty),* $(,)?) => {
        $(
            impl From<$ty> for DynValue {
                #[inline]
                fn from(value: $ty) -> Self {
                    Self::$variant(value as $cast)
                }
            }
        )*
    };
}

impl_from_primitive! {
    i8 => Int as i64,
    i16 => Int as i64,
    i32 => Int as i64,
    i64 => Int as i64,
    u8 => UInt as u64,
    u16 => UInt as u64,
    u32 => UInt as u64,
    u64 => UInt as u64,
    f32 => Float as f32,
    f64 => Double as f64,
}

impl From<bool> for DynValue {
    #[inline]
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<String> for DynValue {
    #[inline]
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for DynValue {
    #[inline]
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<ObjectRef> for DynValue {
    #[inline]
    fn from(value: ObjectRef) -> Self {
        Self::Object(Some(value))
    }
}

// -----------------------------------------------------------------------------
// Tests
