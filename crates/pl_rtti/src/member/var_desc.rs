use alloc::borrow::Cow;
use alloc::sync::Arc;
use core::fmt;

use crate::error::{ConvertError, VarError};
use crate::member::{MemberDesc, MemberInfo, MemberKind};
use crate::object::{Object, ObjectRef, WeakObjectRef, view, view_mut};
use crate::types::{DynTypeInfo, DynValue, Typed};

// -----------------------------------------------------------------------------
// AccessMode

/// How an attribute reaches its storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    /// A field of the object.
    Direct,
    /// A getter and an optional setter.
    Accessor,
}

// -----------------------------------------------------------------------------
// VarDesc

type Getter = dyn Fn(&dyn Object) -> Option<DynValue> + Send + Sync;
type Setter = dyn Fn(&mut dyn Object, DynValue) -> Option<Result<(), ConvertError>> + Send + Sync;

struct VarAccess {
    get: Box<Getter>,
    set: Option<Box<Setter>>,
}

/// Descriptor of an attribute.
///
/// Carries the attribute type, its default value in string form and the
/// erased access functions. Binding it to an object gives a [`DynVar`].
pub struct VarDesc {
    info: MemberInfo,
    owner: Cow<'static, str>,
    type_info: DynTypeInfo,
    default: Cow<'static, str>,
    access_mode: AccessMode,
    access: Option<VarAccess>,
}

impl VarDesc {
    /// An attribute without storage, for introspection only.
    pub fn placeholder(
        info: impl Into<MemberInfo>,
        owner: impl Into<Cow<'static, str>>,
        type_info: DynTypeInfo,
        default: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            info: info.into(),
            owner: owner.into(),
            type_info,
            default: default.into(),
            access_mode: AccessMode::Direct,
            access: None,
        }
    }

    /// An attribute stored in a field of `T`.
    pub(crate) fn direct<T, V, G, M>(
        info: MemberInfo,
        owner: Cow<'static, str>,
        default: Cow<'static, str>,
        get: G,
        get_mut: M,
    ) -> Self
    where
        T: Object,
        V: Typed + Clone,
        G: Fn(&T) -> &V + Send + Sync + 'static,
        M: Fn(&mut T) -> &mut V + Send + Sync + 'static,
    {
        let (read_class, write_class) = (owner.clone(), owner.clone());
        Self {
            info,
            owner,
            type_info: V::type_info(),
            default,
            access_mode: AccessMode::Direct,
            access: Some(VarAccess {
                get: Box::new(move |object: &dyn Object| {
                    view::<T>(object, &read_class).map(|target| get(target).clone().into_value())
                }),
                set: Some(Box::new(move |object: &mut dyn Object, value: DynValue| {
                    let target = view_mut::<T>(object, &write_class)?;
                    Some(V::from_value(value).map(|value| *get_mut(target) = value))
                })),
            }),
        }
    }

    /// An attribute computed by a getter, writable when `set` is given.
    pub(crate) fn accessor<T, V, G, S>(
        info: MemberInfo,
        owner: Cow<'static, str>,
        default: Cow<'static, str>,
        get: G,
        set: Option<S>,
    ) -> Self
    where
        T: Object,
        V: Typed,
        G: Fn(&T) -> V + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        let (read_class, write_class) = (owner.clone(), owner.clone());
        Self {
            info,
            owner,
            type_info: V::type_info(),
            default,
            access_mode: AccessMode::Accessor,
            access: Some(VarAccess {
                get: Box::new(move |object: &dyn Object| {
                    view::<T>(object, &read_class).map(|target| get(target).into_value())
                }),
                set: set.map(|set| -> Box<Setter> {
                    Box::new(move |object: &mut dyn Object, value: DynValue| {
                        let target = view_mut::<T>(object, &write_class)?;
                        Some(V::from_value(value).map(|value| set(target, value)))
                    })
                }),
            }),
        }
    }

    #[inline]
    pub fn type_info(&self) -> &DynTypeInfo {
        &self.type_info
    }

    /// The default value in string form.
    #[inline]
    pub fn default_value(&self) -> &str {
        &self.default
    }

    #[inline]
    pub fn access_mode(&self) -> AccessMode {
        self.access_mode
    }

    /// Returns `true` for attributes without a setter.
    pub fn is_read_only(&self) -> bool {
        self.access.as_ref().is_none_or(|access| access.set.is_none())
    }

    /// Binds the attribute to `object`.
    ///
    /// Returns `None` for placeholders, for objects of unrelated classes and
    /// while the current thread is inside a call on `object`.
    pub fn bind(self: &Arc<Self>, object: &ObjectRef) -> Option<DynVar> {
        let access = self.access.as_ref()?;
        if object.is_busy() {
            return None;
        }
        (access.get)(&*object.read())?;
        Some(DynVar {
            desc: self.clone(),
            object: object.downgrade(),
        })
    }
}

impl MemberDesc for VarDesc {
    #[inline]
    fn info(&self) -> &MemberInfo {
        &self.info
    }

    #[inline]
    fn kind(&self) -> MemberKind {
        MemberKind::Attribute
    }

    #[inline]
    fn owner(&self) -> &str {
        &self.owner
    }

    #[inline]
    fn is_bound(&self) -> bool {
        self.access.is_some()
    }
}

impl fmt::Debug for VarDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VarDesc")
            .field("name", &self.info.name())
            .field("owner", &self.owner)
            .field("type", &self.type_info.name())
            .field("default", &self.default)
            .field("access_mode", &self.access_mode)
            .field("read_only", &self.is_read_only())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// DynVar

/// An attribute bound to an object.
///
/// Holds the object weakly; every access fails with [`VarError::Expired`]
/// once it is gone.
#[derive(Clone)]
pub struct DynVar {
    desc: Arc<VarDesc>,
    object: WeakObjectRef,
}

impl DynVar {
    #[inline]
    pub fn name(&self) -> &str {
        self.desc.info.name()
    }

    #[inline]
    pub fn descriptor(&self) -> &Arc<VarDesc> {
        &self.desc
    }

    #[inline]
    pub fn type_info(&self) -> &DynTypeInfo {
        &self.desc.type_info
    }

    fn access(&self) -> Result<(&VarAccess, ObjectRef), VarError> {
        let access = self
            .desc
            .access
            .as_ref()
            .ok_or_else(|| VarError::Unbound(self.name().to_owned()))?;
        let object = self.object.upgrade().ok_or(VarError::Expired)?;
        if object.is_busy() {
            return Err(VarError::Busy(self.name().to_owned()));
        }
        Ok((access, object))
    }

    /// Reads the current value.
    pub fn get(&self) -> Result<DynValue, VarError> {
        let (access, object) = self.access()?;
        let value = (access.get)(&*object.read());
        value.ok_or_else(|| VarError::Target(self.desc.owner.to_string()))
    }

    /// Writes a value, converting it to the attribute type first.
    pub fn set_value(&self, value: impl Into<DynValue>) -> Result<(), VarError> {
        let (access, object) = self.access()?;
        let Some(set) = &access.set else {
            return Err(VarError::ReadOnly(self.name().to_owned()));
        };
        let value = self.desc.type_info.coerce(value.into())?;
        let result = set(&mut *object.write(), value);
        match result {
            Some(result) => result.map_err(VarError::from),
            None => Err(VarError::Target(self.desc.owner.to_string())),
        }
    }

    /// Reads the current value in string form.
    pub fn get_string(&self) -> Result<String, VarError> {
        let value = self.get()?;
        Ok(self.desc.type_info.format(&value)?)
    }

    /// Parses and writes a value given in string form.
    pub fn set_string(&self, input: &str) -> Result<(), VarError> {
        if self.desc.is_read_only() {
            return Err(VarError::ReadOnly(self.name().to_owned()));
        }
        let value = self.desc.type_info.parse(input)?;
        self.set_value(value)
    }

    /// Resets the attribute to its default value.
    pub fn set_default(&self) -> Result<(), VarError> {
        self.set_string(&self.desc.default)
    }

    /// Returns `true` if the current value equals the default value.
    ///
    /// Unreadable attributes and unparsable defaults count as not default.
    pub fn is_default(&self) -> bool {
        match (self.get(), self.desc.type_info.parse(&self.desc.default)) {
            (Ok(current), Ok(default)) => current == default,
            _ => false,
        }
    }
}

impl fmt::Debug for DynVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynVar")
            .field("name", &self.name())
            .field("object", &self.object)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests
