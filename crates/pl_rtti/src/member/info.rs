use alloc::borrow::Cow;
use core::fmt;

use crate::func::ParamsParser;

// -----------------------------------------------------------------------------
// MemberKind

/// The category a member belongs to.
///
/// Member names are unique per category and class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Attribute,
    Method,
    Signal,
    Slot,
    Constructor,
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Attribute => "attribute",
            Self::Method => "method",
            Self::Signal => "signal",
            Self::Slot => "slot",
            Self::Constructor => "constructor",
        })
    }
}

// -----------------------------------------------------------------------------
// MemberInfo

/// Name, description and annotation shared by every member descriptor.
///
/// The annotation holds `Key="Value"` constraints such as `Min="0" Max="10"`.
///
/// # Example
///
/// ```
/// use pl_rtti::member::MemberInfo;
///
/// let info = MemberInfo::new("Radius")
///     .with_description("Circle radius")
///     .with_annotation(r#"Min="0""#);
/// assert_eq!(info.annotation_value("Min").as_deref(), Some("0"));
/// assert_eq!(info.annotation_value("Max"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInfo {
    name: Cow<'static, str>,
    description: Cow<'static, str>,
    annotation: Cow<'static, str>,
}

impl MemberInfo {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            description: Cow::Borrowed(""),
            annotation: Cow::Borrowed(""),
        }
    }

    pub fn with_description(mut self, description: impl Into<Cow<'static, str>>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_annotation(mut self, annotation: impl Into<Cow<'static, str>>) -> Self {
        self.annotation = annotation.into();
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[inline]
    pub fn annotation(&self) -> &str {
        &self.annotation
    }

    /// Looks up a named value in the annotation.
    ///
    /// Returns `None` if the key is missing or the annotation is malformed.
    pub fn annotation_value(&self, key: &str) -> Option<String> {
        ParamsParser::new(&self.annotation)
            .map_while(Result::ok)
            .find(|token| token.name.as_deref() == Some(key))
            .map(|token| token.value)
    }
}

impl From<&'static str> for MemberInfo {
    #[inline]
    fn from(name: &'static str) -> Self {
        Self::new(name)
    }
}

impl From<String> for MemberInfo {
    #[inline]
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

// -----------------------------------------------------------------------------
// MemberDesc

/// Behaviour shared by the member descriptors.
///
/// A descriptor is an unbound template; binding it to an object produces a
/// proxy such as a [`DynVar`](crate::member::DynVar) or a
/// [`BoundMethod`](crate::func::BoundMethod). Descriptors without an
/// implementation bind to nothing.
pub trait MemberDesc: Send + Sync {
    fn info(&self) -> &MemberInfo;

    fn kind(&self) -> MemberKind;

    /// Class that declared the member.
    fn owner(&self) -> &str;

    /// Returns `false` for descriptors without an implementation.
    fn is_bound(&self) -> bool;

    #[inline]
    fn name(&self) -> &str {
        self.info().name()
    }

    #[inline]
    fn description(&self) -> &str {
        self.info().description()
    }

    #[inline]
    fn annotation(&self) -> &str {
        self.info().annotation()
    }
}
