use alloc::borrow::Cow;
use core::fmt;

use serde_json::Value;

use crate::error::{CallError, ConvertError};
use crate::func::{DynFunc, DynParams, Functor, FunctorFn, Signature, TypedArgs};
use crate::member::{MemberDesc, MemberInfo, MemberKind};
use crate::object::{Object, ObjectRef};
use crate::types::{DynTypeInfo, DynValue, TypeKind};

// -----------------------------------------------------------------------------
// ConstructorDesc

/// Descriptor of a constructor.
///
/// The return type of the signature is always `Object*`. Constructors belong
/// to exactly one class and are not inherited.
pub struct ConstructorDesc {
    info: MemberInfo,
    owner: Cow<'static, str>,
    func: Functor,
}

impl ConstructorDesc {
    pub(crate) fn new<T, Args, F>(info: MemberInfo, owner: Cow<'static, str>, func: F) -> Self
    where
        T: Object,
        Args: TypedArgs,
        F: FunctorFn<Args, T>,
    {
        let signature = Signature::new(DynTypeInfo::new(TypeKind::Object), Args::type_infos());
        Self {
            info,
            owner,
            func: Functor::from_dyn(signature, move |values: &[DynValue]| {
                let args = Args::from_values(values.to_vec())?;
                Ok(DynValue::Object(Some(ObjectRef::new(func.call_typed(args)))))
            }),
        }
    }

    #[inline]
    pub fn signature(&self) -> &Signature {
        self.func.signature()
    }

    /// Returns `true` for a constructor without parameters.
    #[inline]
    pub fn is_default_constructor(&self) -> bool {
        self.signature().arity() == 0
    }

    /// Creates an object from typed parameters.
    ///
    /// `params` must have the constructor signature.
    pub fn create(&self, params: &mut DynParams) -> Result<ObjectRef, CallError> {
        self.func.call(params)?;
        take_object(params.return_value())
    }

    /// Creates an object from a parameter string.
    pub fn create_from_str(&self, input: &str) -> Result<ObjectRef, CallError> {
        take_object(&self.func.call_str(input)?)
    }

    /// Creates an object from a parameter document.
    pub fn create_from_document(&self, document: &Value) -> Result<ObjectRef, CallError> {
        take_object(&self.func.call_document(document)?)
    }
}

fn take_object(value: &DynValue) -> Result<ObjectRef, CallError> {
    value
        .as_object()
        .cloned()
        .ok_or(CallError::Return(ConvertError::TypeMismatch {
            expected: TypeKind::Object,
            found: value.kind(),
        }))
}

impl MemberDesc for ConstructorDesc {
    #[inline]
    fn info(&self) -> &MemberInfo {
        &self.info
    }

    #[inline]
    fn kind(&self) -> MemberKind {
        MemberKind::Constructor
    }

    #[inline]
    fn owner(&self) -> &str {
        &self.owner
    }

    #[inline]
    fn is_bound(&self) -> bool {
        true
    }
}

impl fmt::Debug for ConstructorDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorDesc")
            .field("name", &self.info.name())
            .field("owner", &self.owner)
            .field("signature", &self.signature().to_string())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests
