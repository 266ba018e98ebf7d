use alloc::borrow::Cow;

use crate::types::TypeKind;

// -----------------------------------------------------------------------------
// EnumValue

/// A single named value of an [`EnumInfo`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    name: Cow<'static, str>,
    value: i64,
    description: Cow<'static, str>,
}

impl EnumValue {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub const fn value(&self) -> i64 {
        self.value
    }

    #[inline]
    pub fn description(&self) -> &str {
        &self.description
    }
}

// -----------------------------------------------------------------------------
// EnumInfo

/// Metadata of an enumeration or flag type.
///
/// An enum type is an integer type whose values have names. String conversion
/// accepts names as well as plain numbers. Flag types combine names with `|`.
///
/// # Example
///
/// ```
/// use pl_rtti::types::EnumInfo;
///
/// let info = EnumInfo::flags("Access")
///     .value("Read", 1, "Can read")
///     .value("Write", 2, "Can write");
///
/// assert_eq!(info.parse("Read|Write"), Some(3));
/// assert_eq!(info.format(3).as_deref(), Some("Read|Write"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumInfo {
    name: Cow<'static, str>,
    kind: TypeKind,
    flags: bool,
    values: Vec<EnumValue>,
}

impl EnumInfo {
    /// Creates an empty enumeration stored as `int`.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Int32,
            flags: false,
            values: Vec::new(),
        }
    }

    /// Creates an empty flag set stored as `uint32`.
    pub fn flags(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::UInt32,
            flags: true,
            values: Vec::new(),
        }
    }

    /// Changes the integer storage kind.
    ///
    /// Non-integer kinds are ignored.
    pub fn with_kind(mut self, kind: TypeKind) -> Self {
        if kind.is_integer() {
            self.kind = kind;
        }
        self
    }

    /// Adds a named value.
    pub fn value(
        mut self,
        name: impl Into<Cow<'static, str>>,
        value: i64,
        description: impl Into<Cow<'static, str>>,
    ) -> Self {
        self.values.push(EnumValue {
            name: name.into(),
            value,
            description: description.into(),
        });
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub(crate) fn shared_name(&self) -> Cow<'static, str> {
        self.name.clone()
    }

    /// The integer kind values are stored as.
    #[inline]
    pub const fn kind(&self) -> TypeKind {
        self.kind
    }

    #[inline]
    pub const fn is_flags(&self) -> bool {
        self.flags
    }

    #[inline]
    pub fn values(&self) -> &[EnumValue] {
        &self.values
    }

    /// Returns the value with the given name.
    pub fn value_of(&self, name: &str) -> Option<i64> {
        self.values
            .iter()
            .find(|item| item.name == name)
            .map(|item| item.value)
    }

    /// Returns the first name registered for `value`.
    pub fn name_of(&self, value: i64) -> Option<&str> {
        self.values
            .iter()
            .find(|item| item.value == value)
            .map(EnumValue::name)
    }

    /// Returns the description of the named value.
    pub fn description_of(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|item| item.name == name)
            .map(EnumValue::description)
    }

    /// Parses names (or `|` separated names for flags) into a raw value.
    ///
    /// Returns `None` if any token is neither a known name nor a number.
    pub fn parse(&self, input: &str) -> Option<i64> {
        let input = input.trim();
        if !self.flags {
            return self.value_of(input).or_else(|| input.parse().ok());
        }
        let mut raw = 0_i64;
        for token in input.split('|').map(str::trim) {
            let bits = self.value_of(token).or_else(|| token.parse().ok())?;
            raw |= bits;
        }
        Some(raw)
    }

    /// Formats a raw value by name.
    ///
    /// Returns `None` if the value can not be expressed by names only.
    pub fn format(&self, raw: i64) -> Option<String> {
        if let Some(name) = self.name_of(raw) {
            return Some(name.to_owned());
        }
        if !self.flags || raw == 0 {
            return None;
        }
        let mut rest = raw;
        let mut names: Vec<&str> = Vec::new();
        for item in &self.values {
            if item.value != 0 && rest & item.value == item.value {
                rest &= !item.value;
                names.push(&item.name);
            }
        }
        (rest == 0).then(|| names.join("|"))
    }
}

// -----------------------------------------------------------------------------
// impl_typed_enum

/// Implements [`Typed`](crate::types::Typed) for a fieldless Rust enum.
///
/// # Example
///
/// ```
/// use pl_rtti::impl_typed_enum;
/// use pl_rtti::types::{DynTypeInfo, Typed};
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// enum Filter {
///     Nearest = 0,
///     Linear = 1,
/// }
///
/// impl_typed_enum!(Filter: "Filter" {
///     Nearest = "Nearest": "Point sampling",
///     Linear = "Linear",
/// });
///
/// let info = DynTypeInfo::of::<Filter>();
/// assert_eq!(info.name(), "Filter");
/// assert_eq!(Filter::from_value(info.parse("Linear").unwrap()), Ok(Filter::Linear));
/// ```
#[macro_export]
macro_rules! impl_typed_enum {
    ($ty:ident : $name:literal { $($variant:ident = $text:literal $(: $desc:literal)?),* $(,)? }) => {
        impl $crate::types::Typed for $ty {
            fn type_info() -> $crate::types::DynTypeInfo {
                $crate::types::DynTypeInfo::enumeration(
                    $crate::types::EnumInfo::new($name)
                        $(.value($text, $ty::$variant as i64, concat!("" $(, $desc)?)))*
                )
            }

            fn into_value(self) -> $crate::types::DynValue {
                $crate::types::DynValue::Int(self as i64)
            }

            fn from_value(
                value: $crate::types::DynValue,
            ) -> ::core::result::Result<Self, $crate::error::ConvertError> {
                let raw = match value.as_i64() {
                    Some(raw) => raw,
                    None => {
                        return Err($crate::error::ConvertError::TypeMismatch {
                            expected: $crate::types::TypeKind::Int32,
                            found: value.kind(),
                        });
                    }
                };
                $(
                    if raw == $ty::$variant as i64 {
                        return Ok($ty::$variant);
                    }
                )*
                Err($crate::error::ConvertError::OutOfRange {
                    expected: $crate::types::TypeKind::Int32,
                    value: raw.to_string(),
                })
            }
        }
    };
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::EnumInfo;

    fn blend() -> EnumInfo {
        EnumInfo::new("BlendFunc")
            .value("Zero", 0, "")
            .value("One", 1, "")
            .value("SrcColor", 2, "Source color")
    }

    #[test]
    fn lookup_by_name_and_value() {
        let info = blend();
        assert_eq!(info.value_of("One"), Some(1));
        assert_eq!(info.name_of(2), Some("SrcColor"));
        assert_eq!(info.description_of("SrcColor"), Some("Source color"));
        assert_eq!(info.value_of("Missing"), None);
    }

    #[test]
    fn plain_enum_parse_falls_back_to_numbers() {
        let info = blend();
        assert_eq!(info.parse(" SrcColor "), Some(2));
        assert_eq!(info.parse("17"), Some(17));
        assert_eq!(info.parse("Zero|One"), None);
        assert_eq!(info.format(17), None);
    }

    #[test]
    fn flags_combine() {
        let info = EnumInfo::flags("Flags")
            .value("None", 0, "")
            .value("A", 1, "")
            .value("B", 2, "")
            .value("C", 4, "");
        assert_eq!(info.parse("A|C"), Some(5));
        assert_eq!(info.parse("A|8"), Some(9));
        assert_eq!(info.format(0).as_deref(), Some("None"));
        assert_eq!(info.format(6).as_deref(), Some("B|C"));
        assert_eq!(info.format(9), None);
    }
}
