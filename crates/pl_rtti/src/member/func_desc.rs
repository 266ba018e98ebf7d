use alloc::borrow::Cow;
use core::fmt;

use crate::func::{BoundMethod, ErasedMethod, Signature};
use crate::member::{MemberDesc, MemberInfo, MemberKind};
use crate::object::ObjectRef;

// -----------------------------------------------------------------------------
// FuncDesc

/// Descriptor of a method.
pub struct FuncDesc {
    info: MemberInfo,
    owner: Cow<'static, str>,
    signature: Signature,
    method: Option<ErasedMethod>,
}

impl FuncDesc {
    /// A method without implementation, for introspection only.
    pub fn placeholder(
        info: impl Into<MemberInfo>,
        owner: impl Into<Cow<'static, str>>,
        signature: Signature,
    ) -> Self {
        Self {
            info: info.into(),
            owner: owner.into(),
            signature,
            method: None,
        }
    }

    pub(crate) fn new(info: MemberInfo, method: ErasedMethod) -> Self {
        Self {
            info,
            owner: Cow::Owned(method.owner().to_owned()),
            signature: method.signature().clone(),
            method: Some(method),
        }
    }

    #[inline]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Binds the method to `object`.
    ///
    /// Returns `None` for placeholders.
    pub fn get_method(&self, object: &ObjectRef) -> Option<BoundMethod> {
        let method = self.method.as_ref()?;
        Some(method.bind(self.info.name(), object.downgrade()))
    }
}

impl MemberDesc for FuncDesc {
    #[inline]
    fn info(&self) -> &MemberInfo {
        &self.info
    }

    #[inline]
    fn kind(&self) -> MemberKind {
        MemberKind::Method
    }

    #[inline]
    fn owner(&self) -> &str {
        &self.owner
    }

    #[inline]
    fn is_bound(&self) -> bool {
        self.method.is_some()
    }
}

impl fmt::Debug for FuncDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FuncDesc")
            .field("name", &self.info.name())
            .field("owner", &self.owner)
            .field("signature", &self.signature.to_string())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests
