use crate::error::ConvertError;
use crate::object::ObjectRef;
use crate::types::{DynTypeInfo, DynValue, TypeKind};

// -----------------------------------------------------------------------------
// Typed

/// A Rust type that can travel through the dynamic layer.
///
/// Implemented for the primitive types, [`String`], `()` and object
/// references. Fieldless enums get an implementation through
/// [`impl_typed_enum!`](crate::impl_typed_enum).
pub trait Typed: Sized + 'static {
    /// Runtime description of `Self`.
    fn type_info() -> DynTypeInfo;

    /// Boxes `self`.
    fn into_value(self) -> DynValue;

    /// Unboxes a value, checking kind and range.
    fn from_value(value: DynValue) -> Result<Self, ConvertError>;
}

macro_rules! impl_typed_integer {
    ($($ty:ty => $kind:ident, $variant:ident);* $(;)?) => {
        $(
            impl Typed for $ty {
                #[inline]
                fn type_info() -> DynTypeInfo {
                    DynTypeInfo::new(TypeKind::$kind)
                }

                #[inline]
                fn into_value(self) -> DynValue {
                    DynValue::from(self)
                }

                fn from_value(value: DynValue) -> Result<Self, ConvertError> {
                    match DynTypeInfo::new(TypeKind::$kind).coerce(value)? {
                        DynValue::$variant(v) => <$ty>::try_from(v).map_err(|_| {
                            ConvertError::OutOfRange {
                                expected: TypeKind::$kind,
                                value: v.to_string(),
                            }
                        }),
                        other => Err(ConvertError::TypeMismatch {
                            expected: TypeKind::$kind,
                            found: other.kind(),
                        }),
                    }
                }
            }
        )*
    };
}

impl_typed_integer! {
    i8 => Int8, Int;
    i16 => Int16, Int;
    i32 => Int32, Int;
    i64 => Int64, Int;
    u8 => UInt8, UInt;
    u16 => UInt16, UInt;
    u32 => UInt32, UInt;
    u64 => UInt64, UInt;
}

impl Typed for f32 {
    #[inline]
    fn type_info() -> DynTypeInfo {
        DynTypeInfo::new(TypeKind::Float)
    }

    #[inline]
    fn into_value(self) -> DynValue {
        DynValue::Float(self)
    }

    fn from_value(value: DynValue) -> Result<Self, ConvertError> {
        match value {
            DynValue::Float(v) => Ok(v),
            DynValue::Double(v) => Ok(v as f32),
            other => Err(ConvertError::TypeMismatch {
                expected: TypeKind::Float,
                found: other.kind(),
            }),
        }
    }
}

impl Typed for f64 {
    #[inline]
    fn type_info() -> DynTypeInfo {
        DynTypeInfo::new(TypeKind::Double)
    }

    #[inline]
    fn into_value(self) -> DynValue {
        DynValue::Double(self)
    }

    fn from_value(value: DynValue) -> Result<Self, ConvertError> {
        value.as_f64().ok_or(ConvertError::TypeMismatch {
            expected: TypeKind::Double,
            found: value.kind(),
        })
    }
}

impl Typed for bool {
    #[inline]
    fn type_info() -> DynTypeInfo {
        DynTypeInfo::new(TypeKind::Bool)
    }

    #[inline]
    fn into_value(self) -> DynValue {
        DynValue::Bool(self)
    }

    fn from_value(value: DynValue) -> Result<Self, ConvertError> {
        value.as_bool().ok_or(ConvertError::TypeMismatch {
            expected: TypeKind::Bool,
            found: value.kind(),
        })
    }
}

impl Typed for String {
    #[inline]
    fn type_info() -> DynTypeInfo {
        DynTypeInfo::new(TypeKind::String)
    }

    #[inline]
    fn into_value(self) -> DynValue {
        DynValue::String(self)
    }

    fn from_value(value: DynValue) -> Result<Self, ConvertError> {
        match value {
            DynValue::String(v) => Ok(v),
            other => Err(ConvertError::TypeMismatch {
                expected: TypeKind::String,
                found: other.kind(),
            }),
        }
    }
}

impl Typed for () {
    #[inline]
    fn type_info() -> DynTypeInfo {
        DynTypeInfo::new(TypeKind::Void)
    }

    #[inline]
    fn into_value(self) -> DynValue {
        DynValue::Void
    }

    #[inline]
    fn from_value(_: DynValue) -> Result<Self, ConvertError> {
        Ok(())
    }
}

impl Typed for Option<ObjectRef> {
    #[inline]
    fn type_info() -> DynTypeInfo {
        DynTypeInfo::new(TypeKind::Object)
    }

    #[inline]
    fn into_value(self) -> DynValue {
        DynValue::Object(self)
    }

    fn from_value(value: DynValue) -> Result<Self, ConvertError> {
        match value {
            DynValue::Object(v) => Ok(v),
            other => Err(ConvertError::TypeMismatch {
                expected: TypeKind::Object,
                found: other.kind(),
            }),
        }
    }
}

impl Typed for ObjectRef {
    #[inline]
    fn type_info() -> DynTypeInfo {
        DynTypeInfo::new(TypeKind::Object)
    }

    #[inline]
    fn into_value(self) -> DynValue {
        DynValue::Object(Some(self))
    }

    /// A null object is reported as a type mismatch against `Void`.
    fn from_value(value: DynValue) -> Result<Self, ConvertError> {
        match <Option<ObjectRef>>::from_value(value)? {
            Some(object) => Ok(object),
            None => Err(ConvertError::TypeMismatch {
                expected: TypeKind::Object,
                found: TypeKind::Void,
            }),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::Typed;
    use crate::error::ConvertError;
    use crate::object::ObjectRef;
    use crate::types::{DynValue, TypeKind};

    #[test]
    fn integers_check_their_width() {
        assert_eq!(i8::from_value(DynValue::Int(-128)), Ok(-128));
        assert!(matches!(
            i8::from_value(DynValue::Int(128)),
            Err(ConvertError::OutOfRange { .. })
        ));
        assert_eq!(u32::from_value(DynValue::Int(5)), Ok(5));
        assert_eq!(i32::type_info().name(), "int");
        assert_eq!(u16::type_info().kind(), TypeKind::UInt16);
    }

    #[test]
    fn primitives() {
        assert_eq!(f32::from_value(DynValue::Double(0.5)), Ok(0.5));
        assert_eq!(f64::from_value(DynValue::Float(0.5)), Ok(0.5));
        assert_eq!(bool::from_value(true.into_value()), Ok(true));
        assert_eq!(String::from_value("x".to_owned().into_value()).as_deref(), Ok("x"));
        assert!(String::from_value(DynValue::Int(1)).is_err());
        assert_eq!(<()>::from_value(DynValue::Int(1)), Ok(()));
    }

    #[test]
    fn null_object() {
        let none = <Option<ObjectRef>>::from_value(DynValue::Object(None));
        assert_eq!(none.map(|o| o.is_none()), Ok(true));
        assert!(ObjectRef::from_value(DynValue::Object(None)).is_err());
    }
}
