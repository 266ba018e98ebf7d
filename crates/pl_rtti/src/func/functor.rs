use alloc::sync::Arc;
use core::fmt;

use crate::error::CallError;
use crate::func::{DynFunc, DynParams, Signature, TypedArgs};
use crate::types::{DynValue, Typed};

// -----------------------------------------------------------------------------
// FunctorFn

/// A plain Rust function usable as a [`Functor`].
///
/// Implemented for `Fn(A0, ..., An) -> R` with up to six [`Typed`] arguments.
pub trait FunctorFn<Args, R>: Send + Sync + 'static {
    fn call_typed(&self, args: Args) -> R;
}

macro_rules! impl_functor_fn {
    ($($ty:ident $var:ident),*) => {
        impl<F, R, $($ty),*> FunctorFn<($($ty,)*), R> for F
        where
            F: Fn($($ty),*) -> R + Send + Sync + 'static,
        {
            #[inline]
            fn call_typed(&self, ($($var,)*): ($($ty,)*)) -> R {
                self($($var),*)
            }
        }
    };
}

impl_functor_fn!();
impl_functor_fn!(A0 a0);
impl_functor_fn!(A0 a0, A1 a1);
impl_functor_fn!(A0 a0, A1 a1, A2 a2);
impl_functor_fn!(A0 a0, A1 a1, A2 a2, A3 a3);
impl_functor_fn!(A0 a0, A1 a1, A2 a2, A3 a3, A4 a4);
impl_functor_fn!(A0 a0, A1 a1, A2 a2, A3 a3, A4 a4, A5 a5);

// -----------------------------------------------------------------------------
// Functor

type ErasedFn = dyn Fn(&[DynValue]) -> Result<DynValue, CallError> + Send + Sync;

/// A closure exposed as a [`DynFunc`].
///
/// Cloning is cheap and shares the closure.
///
/// # Example
///
/// ```
/// use pl_rtti::func::{DynFunc, Functor};
/// use pl_rtti::types::DynValue;
///
/// let twice = Functor::new(|x: i32| x * 2);
/// assert_eq!(twice.signature().to_string(), "int(int)");
/// assert_eq!(twice.call_str("21"), Ok(DynValue::Int(42)));
/// ```
#[derive(Clone)]
pub struct Functor {
    signature: Signature,
    func: Arc<ErasedFn>,
}

impl Functor {
    /// Wraps a typed function.
    pub fn new<Args, R, F>(func: F) -> Self
    where
        Args: TypedArgs,
        R: Typed,
        F: FunctorFn<Args, R>,
    {
        Self {
            signature: Signature::of::<R, Args>(),
            func: Arc::new(move |values: &[DynValue]| -> Result<DynValue, CallError> {
                let args = Args::from_values(values.to_vec())?;
                Ok(func.call_typed(args).into_value())
            }),
        }
    }

    /// Wraps a function working on boxed values directly.
    ///
    /// The closure receives values already checked against `signature`; its
    /// result is converted to the return type.
    pub fn from_dyn<F>(signature: Signature, func: F) -> Self
    where
        F: Fn(&[DynValue]) -> Result<DynValue, CallError> + Send + Sync + 'static,
    {
        Self {
            signature,
            func: Arc::new(func),
        }
    }
}

impl DynFunc for Functor {
    #[inline]
    fn signature(&self) -> &Signature {
        &self.signature
    }

    fn invoke(&self, params: &mut DynParams) -> Result<(), CallError> {
        let ret = (self.func)(params.values())?;
        params.set_return(ret).map_err(CallError::Return)
    }

    fn clone_func(&self) -> Option<Box<dyn DynFunc>> {
        Some(Box::new(self.clone()))
    }
}

impl fmt::Debug for Functor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Functor")
            .field("signature", &self.signature.to_string())
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;
    use core::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

    use super::Functor;
    use crate::error::CallError;
    use crate::func::{DynFunc, DynParams, Signature};
    use crate::types::{DynValue, TypeKind};

    #[test]
    fn typed_closures() {
        let zero = Functor::new(|| 7_u8);
        assert_eq!(zero.signature().to_string(), "uint8()");
        assert_eq!(zero.call_str(""), Ok(DynValue::UInt(7)));

        let concat = Functor::new(|a: String, b: String| a + &b);
        assert_eq!(concat.call_str("'ab' cd"), Ok(DynValue::from("abcd")));
    }

    #[test]
    fn side_effects_and_void() {
        let total = Arc::new(AtomicI64::new(0));
        let sink = total.clone();
        let add = Functor::new(move |v: i64| {
            sink.fetch_add(v, Ordering::Relaxed);
        });
        assert_eq!(add.signature().to_string(), "void(int64)");

        let mut params = DynParams::of::<(), _>((5_i64,));
        add.call(&mut params).unwrap();
        add.call_str("Param0=\"2\"").unwrap();
        assert!(add.call_str("1 2").is_err());
        assert_eq!(total.load(Ordering::Relaxed), 7);
    }

    #[test]
    fn clones_share_the_closure() {
        let f = Functor::new(|x: f64| x / 2.0);
        let copy = f.clone_func().unwrap();
        assert_eq!(copy.signature(), f.signature());
        assert_eq!(copy.call_str("3"), Ok(DynValue::Double(1.5)));
    }

    #[test]
    fn dynamic_closure() {
        let sig = Signature::new(TypeKind::Int32.into(), [TypeKind::Int32.into()]);
        let neg = Functor::from_dyn(sig, |values| match values[0].as_i64() {
            Some(v) => Ok(DynValue::Int(-v)),
            None => Err(CallError::Unbound("neg".to_owned())),
        });
        assert_eq!(neg.call_str("4"), Ok(DynValue::Int(-4)));

        let bad = Functor::from_dyn(Signature::of::<i8, ()>(), |_| Ok(DynValue::Int(1000)));
        assert!(matches!(bad.call_str(""), Err(CallError::Return(_))));
    }

    #[test]
    fn closure_untouched_on_bad_arity() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let add = Functor::new(move |a: i32, b: i32| {
            counter.fetch_add(1, Ordering::Relaxed);
            a + b
        });

        assert!(matches!(add.call_str("1"), Err(CallError::Params(_))));
        assert!(matches!(add.call_str("1 2 3"), Err(CallError::Params(_))));
        let mut short = DynParams::of::<i32, (i32,)>((1,));
        assert!(matches!(add.call(&mut short), Err(CallError::Arity { .. })));
        let mut long = DynParams::of::<i32, (i32, i32, i32)>((1, 2, 3));
        assert!(matches!(add.call(&mut long), Err(CallError::Arity { .. })));
        assert_eq!(calls.load(Ordering::Relaxed), 0);

        assert_eq!(add.call_str("1 2").unwrap(), DynValue::Int(3));
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }
}
