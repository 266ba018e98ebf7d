use alloc::borrow::Cow;
use alloc::sync::Arc;
use core::fmt;

use serde_json::Value;

use crate::error::ConvertError;
use crate::types::{DynValue, EnumInfo, TypeKind, Typed};

// -----------------------------------------------------------------------------
// DynTypeInfo

/// Runtime description of a value type.
///
/// A type info is what a slot of a [`Signature`](crate::func::Signature) or an
/// attribute is declared with. It knows how to check a [`DynValue`] against the
/// slot and how to convert the value to and from its string form.
///
/// # Example
///
/// ```
/// use pl_rtti::types::{DynTypeInfo, DynValue};
///
/// let info = DynTypeInfo::of::<u8>();
/// assert_eq!(info.name(), "uint8");
/// assert_eq!(info.parse("200"), Ok(DynValue::UInt(200)));
/// assert!(info.parse("300").is_err());
/// assert_eq!(info.format(&DynValue::UInt(7)).as_deref(), Ok("7"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynTypeInfo {
    kind: TypeKind,
    name: Cow<'static, str>,
    enumeration: Option<Arc<EnumInfo>>,
}

impl DynTypeInfo {
    /// Type info of a plain kind, named after the kind.
    pub const fn new(kind: TypeKind) -> Self {
        Self {
            kind,
            name: Cow::Borrowed(kind.name()),
            enumeration: None,
        }
    }

    /// Type info of a [`Typed`] Rust type.
    #[inline]
    pub fn of<T: Typed>() -> Self {
        T::type_info()
    }

    /// Type info of an enumeration or flag set, named after the enum.
    pub fn enumeration(info: EnumInfo) -> Self {
        Self {
            kind: info.kind(),
            name: info.shared_name(),
            enumeration: Some(Arc::new(info)),
        }
    }

    #[inline]
    pub const fn kind(&self) -> TypeKind {
        self.kind
    }

    /// The name used in signature strings.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub const fn is_enum(&self) -> bool {
        self.enumeration.is_some()
    }

    pub fn is_flags(&self) -> bool {
        self.enumeration.as_ref().is_some_and(|e| e.is_flags())
    }

    #[inline]
    pub fn enum_info(&self) -> Option<&EnumInfo> {
        self.enumeration.as_deref()
    }

    /// The zero value of this type.
    pub fn default_value(&self) -> DynValue {
        match self.kind {
            TypeKind::Void => DynValue::Void,
            TypeKind::Bool => DynValue::Bool(false),
            TypeKind::Float => DynValue::Float(0.0),
            TypeKind::Double => DynValue::Double(0.0),
            TypeKind::String => DynValue::String(String::new()),
            TypeKind::Object => DynValue::Object(None),
            kind if kind.is_signed_integer() => DynValue::Int(0),
            _ => DynValue::UInt(0),
        }
    }

    /// Checks whether `value` can be stored in a slot of this type.
    pub fn check(&self, value: &DynValue) -> Result<(), ConvertError> {
        self.coerce(value.clone()).map(drop)
    }

    /// Converts `value` into the representation of this type.
    ///
    /// Integers are accepted from both signed and unsigned values as long as
    /// they are in range, floats are accepted from both float widths. A void
    /// slot swallows any value.
    pub fn coerce(&self, value: DynValue) -> Result<DynValue, ConvertError> {
        let kind = self.kind;
        match (kind, value) {
            (TypeKind::Void, _) => Ok(DynValue::Void),
            (TypeKind::Bool, value @ DynValue::Bool(_)) => Ok(value),
            (TypeKind::Float, DynValue::Float(v)) => Ok(DynValue::Float(v)),
            (TypeKind::Float, DynValue::Double(v)) => Ok(DynValue::Float(v as f32)),
            (TypeKind::Double, DynValue::Float(v)) => Ok(DynValue::Double(v as f64)),
            (TypeKind::Double, DynValue::Double(v)) => Ok(DynValue::Double(v)),
            (TypeKind::String, value @ DynValue::String(_)) => Ok(value),
            (TypeKind::Object, value @ DynValue::Object(_)) => Ok(value),
            (_, DynValue::Int(v)) if kind.is_integer() => self.fit_integer(v as i128),
            (_, DynValue::UInt(v)) if kind.is_integer() => self.fit_integer(v as i128),
            (_, value) => Err(ConvertError::TypeMismatch {
                expected: kind,
                found: value.kind(),
            }),
        }
    }

    fn fit_integer(&self, raw: i128) -> Result<DynValue, ConvertError> {
        if self.kind.is_signed_integer() {
            let (min, max) = self.kind.signed_range();
            if (min as i128..=max as i128).contains(&raw) {
                return Ok(DynValue::Int(raw as i64));
            }
        } else if (0..=self.kind.unsigned_max() as i128).contains(&raw) {
            return Ok(DynValue::UInt(raw as u64));
        }
        Err(ConvertError::OutOfRange {
            expected: self.kind,
            value: raw.to_string(),
        })
    }

    fn parse_error(&self, input: &str) -> ConvertError {
        ConvertError::Parse {
            expected: self.name.to_string(),
            input: input.to_owned(),
        }
    }

    /// Parses the string form of a value of this type.
    ///
    /// Enum types accept value names (`"A|B"` for flags) as well as numbers.
    /// Strings are taken verbatim, everything else is trimmed first.
    pub fn parse(&self, input: &str) -> Result<DynValue, ConvertError> {
        let text = input.trim();
        match self.kind {
            TypeKind::Void => Ok(DynValue::Void),
            TypeKind::Bool => {
                if text.eq_ignore_ascii_case("true") || text == "1" {
                    Ok(DynValue::Bool(true))
                } else if text.eq_ignore_ascii_case("false") || text == "0" {
                    Ok(DynValue::Bool(false))
                } else {
                    Err(self.parse_error(input))
                }
            }
            TypeKind::Float => text
                .parse::<f32>()
                .map(DynValue::Float)
                .map_err(|_| self.parse_error(input)),
            TypeKind::Double => text
                .parse::<f64>()
                .map(DynValue::Double)
                .map_err(|_| self.parse_error(input)),
            TypeKind::String => Ok(DynValue::String(input.to_owned())),
            TypeKind::Object => Err(ConvertError::Unsupported(TypeKind::Object)),
            _ => {
                if let Some(info) = &self.enumeration {
                    let raw = info.parse(text).ok_or_else(|| self.parse_error(input))?;
                    return self.fit_integer(raw as i128);
                }
                let raw = text
                    .parse::<i128>()
                    .map_err(|_| self.parse_error(input))?;
                self.fit_integer(raw)
            }
        }
    }

    /// Formats `value` as the string form of this type.
    ///
    /// Enum values that have a name are written by name.
    pub fn format(&self, value: &DynValue) -> Result<String, ConvertError> {
        match self.coerce(value.clone())? {
            DynValue::Void => Ok(String::new()),
            DynValue::Bool(v) => Ok(v.to_string()),
            DynValue::Float(v) => Ok(v.to_string()),
            DynValue::Double(v) => Ok(v.to_string()),
            DynValue::String(v) => Ok(v),
            DynValue::Object(_) => Err(ConvertError::Unsupported(TypeKind::Object)),
            DynValue::Int(v) => Ok(self.format_enum(v).unwrap_or_else(|| v.to_string())),
            DynValue::UInt(v) => Ok(i64::try_from(v)
                .ok()
                .and_then(|raw| self.format_enum(raw))
                .unwrap_or_else(|| v.to_string())),
        }
    }

    fn format_enum(&self, raw: i64) -> Option<String> {
        self.enumeration.as_ref().and_then(|info| info.format(raw))
    }

    /// Reads a value of this type from a document node.
    ///
    /// String nodes go through [`parse`](Self::parse), so enum names and
    /// numbers written as strings are accepted.
    pub fn from_document(&self, node: &Value) -> Result<DynValue, ConvertError> {
        let value = match node {
            Value::String(text) => return self.parse(text),
            Value::Bool(v) => DynValue::Bool(*v),
            Value::Number(n) if matches!(self.kind, TypeKind::Float | TypeKind::Double) => n
                .as_f64()
                .map(DynValue::Double)
                .ok_or_else(|| self.parse_error(&n.to_string()))?,
            Value::Number(n) => {
                if let Some(v) = n.as_i64() {
                    DynValue::Int(v)
                } else if let Some(v) = n.as_u64() {
                    DynValue::UInt(v)
                } else {
                    return Err(self.parse_error(&n.to_string()));
                }
            }
            Value::Null if matches!(self.kind, TypeKind::Void | TypeKind::Object) => {
                return Ok(self.default_value());
            }
            other => return Err(self.parse_error(&other.to_string())),
        };
        self.coerce(value)
    }
}

impl From<TypeKind> for DynTypeInfo {
    #[inline]
    fn from(kind: TypeKind) -> Self {
        Self::new(kind)
    }
}

impl fmt::Display for DynTypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.name)
    }
}

// -----------------------------------------------------------------------------
// Tests
