use alloc::borrow::Cow;
use alloc::sync::Arc;
use core::fmt;

use crate::error::CallError;
use crate::func::{DynFunc, DynParams, Signature, TypedArgs};
use crate::object::{Object, WeakObjectRef, view_mut};
use crate::types::{TypeKind, Typed};

// -----------------------------------------------------------------------------
// MethodFn

/// A Rust function usable as a method of `T`.
///
/// Implemented for `Fn(&mut T, A0, ..., An) -> R` with up to six [`Typed`]
/// arguments.
pub trait MethodFn<T, Args, R>: Send + Sync + 'static {
    fn call_method(&self, target: &mut T, args: Args) -> R;
}

macro_rules! impl_method_fn {
    ($($ty:ident $var:ident),*) => {
        impl<T, F, R, $($ty),*> MethodFn<T, ($($ty,)*), R> for F
        where
            F: Fn(&mut T, $($ty),*) -> R + Send + Sync + 'static,
        {
            #[inline]
            fn call_method(&self, target: &mut T, ($($var,)*): ($($ty,)*)) -> R {
                self(target, $($var),*)
            }
        }
    };
}

impl_method_fn!();
impl_method_fn!(A0 a0);
impl_method_fn!(A0 a0, A1 a1);
impl_method_fn!(A0 a0, A1 a1, A2 a2);
impl_method_fn!(A0 a0, A1 a1, A2 a2, A3 a3);
impl_method_fn!(A0 a0, A1 a1, A2 a2, A3 a3, A4 a4);
impl_method_fn!(A0 a0, A1 a1, A2 a2, A3 a3, A4 a4, A5 a5);

// -----------------------------------------------------------------------------
// ErasedMethod

type ErasedFn = dyn Fn(&mut dyn Object, &mut DynParams) -> Result<(), CallError> + Send + Sync;

/// A method of some class with the receiver type erased.
///
/// `owner` is the class that declared the method, used to find the matching
/// part of objects of derived classes.
#[derive(Clone)]
pub(crate) struct ErasedMethod {
    signature: Signature,
    owner: Cow<'static, str>,
    func: Arc<ErasedFn>,
}

impl ErasedMethod {
    pub(crate) fn new<T, Args, R, F>(owner: Cow<'static, str>, func: F) -> Self
    where
        T: Object,
        Args: TypedArgs,
        R: Typed,
        F: MethodFn<T, Args, R>,
    {
        let class = owner.clone();
        Self {
            signature: Signature::of::<R, Args>(),
            owner,
            func: Arc::new(
                move |object: &mut dyn Object, params: &mut DynParams| -> Result<(), CallError> {
                    let args = Args::from_values(params.values().to_vec())?;
                    let target = view_mut::<T>(object, &class)
                        .ok_or_else(|| CallError::Target(class.to_string()))?;
                    let ret = func.call_method(target, args);
                    params.set_return(ret.into_value()).map_err(CallError::Return)
                },
            ),
        }
    }

    #[inline]
    pub(crate) fn signature(&self) -> &Signature {
        &self.signature
    }

    #[inline]
    pub(crate) fn owner(&self) -> &str {
        &self.owner
    }

    /// Binds the method to `object`.
    pub(crate) fn bind(&self, name: &str, object: WeakObjectRef) -> BoundMethod {
        BoundMethod {
            name: Arc::from(name),
            method: self.clone(),
            object,
        }
    }
}

// -----------------------------------------------------------------------------
// BoundMethod

/// A method bound to an object through a weak reference.
///
/// Calls fail with [`CallError::Expired`] once the object is gone.
#[derive(Clone)]
pub struct BoundMethod {
    name: Arc<str>,
    method: ErasedMethod,
    object: WeakObjectRef,
}

impl BoundMethod {
    /// Name of the method.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Class that declared the method.
    #[inline]
    pub fn owner(&self) -> &str {
        self.method.owner()
    }

    #[inline]
    pub fn object(&self) -> &WeakObjectRef {
        &self.object
    }

    #[inline]
    pub fn is_expired(&self) -> bool {
        self.object.is_expired()
    }
}

impl DynFunc for BoundMethod {
    #[inline]
    fn signature(&self) -> &Signature {
        self.method.signature()
    }

    /// Runs the method with the object locked.
    ///
    /// A call reaching the object from inside a call on it, on the same
    /// thread, is deferred until the outer call returns if it returns
    /// nothing, and fails with [`CallError::Busy`] otherwise.
    fn invoke(&self, params: &mut DynParams) -> Result<(), CallError> {
        let object = self.object.upgrade().ok_or(CallError::Expired)?;
        if let Some(result) = object.enter(|target| (self.method.func)(target, params)) {
            return result;
        }
        if self.signature().return_type().kind() != TypeKind::Void {
            return Err(CallError::Busy(self.name.to_string()));
        }
        let method = self.clone();
        let mut params = params.clone();
        object.defer(Box::new(move || {
            if let Err(err) = method.invoke(&mut params) {
                log::warn!("deferred call of `{}` failed: {err}", method.name);
            }
        }));
        Ok(())
    }

    fn clone_func(&self) -> Option<Box<dyn DynFunc>> {
        Some(Box::new(self.clone()))
    }
}

impl fmt::Debug for BoundMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundMethod")
            .field("name", &self.name)
            .field("owner", &self.owner())
            .field("signature", &self.signature().to_string())
            .field("object", &self.object)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::borrow::Cow;

    use super::ErasedMethod;
    use crate::error::CallError;
    use crate::func::DynFunc;
    use crate::object::{Object, ObjectRef};
    use crate::types::DynValue;

    struct Counter {
        count: i32,
    }

    impl Object for Counter {
        fn class_name(&self) -> &str {
            "Counter"
        }
    }

    struct Other;

    impl Object for Other {
        fn class_name(&self) -> &str {
            "Other"
        }
    }

    fn add() -> ErasedMethod {
        ErasedMethod::new(Cow::Borrowed("Counter"), |c: &mut Counter, by: i32| {
            c.count += by;
            c.count
        })
    }

    #[test]
    fn bound_call() {
        let object = ObjectRef::new(Counter { count: 1 });
        let method = add().bind("Add", object.downgrade());
        assert_eq!(method.name(), "Add");
        assert_eq!(method.signature().to_string(), "int(int)");
        assert_eq!(method.call_str("4"), Ok(DynValue::Int(5)));
        assert_eq!(object.with(|c: &Counter| c.count), Some(5));
    }

    #[test]
    fn arity_mismatch_never_invokes() {
        let object = ObjectRef::new(Counter { count: 0 });
        let method = add().bind("Add", object.downgrade());
        assert!(method.call_str("").is_err());
        assert!(method.call_str("1 2").is_err());
        assert_eq!(object.with(|c: &Counter| c.count), Some(0));
    }

    #[test]
    fn expired_and_foreign_targets() {
        let object = ObjectRef::new(Counter { count: 0 });
        let method = add().bind("Add", object.downgrade());
        let copy = method.clone_func().unwrap();
        drop(object);
        assert!(method.is_expired());
        assert_eq!(method.call_str("1"), Err(CallError::Expired));
        assert_eq!(copy.call_str("1"), Err(CallError::Expired));

        let other = ObjectRef::new(Other);
        let method = add().bind("Add", other.downgrade());
        assert_eq!(
            method.call_str("1"),
            Err(CallError::Target("Counter".to_owned()))
        );
    }
}
