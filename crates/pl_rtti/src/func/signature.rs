use core::fmt;

use crate::error::CallError;
use crate::types::{DynTypeInfo, DynValue, Typed};

// -----------------------------------------------------------------------------
// Signature

/// Return type and parameter types of a dynamic function.
///
/// The canonical string form is `ret(p0,p1,...)`, for example `void(int,float)`.
///
/// # Example
///
/// ```
/// use pl_rtti::func::Signature;
///
/// let sig = Signature::of::<f32, (i32, String)>();
/// assert_eq!(sig.to_string(), "float(int,String)");
/// assert_eq!(sig.arity(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    ret: DynTypeInfo,
    params: Vec<DynTypeInfo>,
}

impl Signature {
    pub fn new(ret: DynTypeInfo, params: impl IntoIterator<Item = DynTypeInfo>) -> Self {
        Self {
            ret,
            params: params.into_iter().collect(),
        }
    }

    /// Signature of a function taking the tuple `Args` and returning `R`.
    pub fn of<R: Typed, Args: TypedArgs>() -> Self {
        Self {
            ret: R::type_info(),
            params: Args::type_infos(),
        }
    }

    #[inline]
    pub fn return_type(&self) -> &DynTypeInfo {
        &self.ret
    }

    #[inline]
    pub fn params(&self) -> &[DynTypeInfo] {
        &self.params
    }

    #[inline]
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Returns `true` if both signatures take the same parameter types,
    /// ignoring the return type.
    pub fn same_params(&self, other: &Signature) -> bool {
        self.params == other.params
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.ret.name())?;
        for (index, param) in self.params.iter().enumerate() {
            if index > 0 {
                f.write_str(",")?;
            }
            f.write_str(param.name())?;
        }
        f.write_str(")")
    }
}

// -----------------------------------------------------------------------------
// TypedArgs

/// A tuple of [`Typed`] values used as the parameter list of a typed function.
///
/// Implemented for tuples of up to six elements.
pub trait TypedArgs: Sized + 'static {
    const ARITY: usize;

    fn type_infos() -> Vec<DynTypeInfo>;

    fn into_values(self) -> Vec<DynValue>;

    /// Unboxes the arguments. The length must equal [`Self::ARITY`].
    fn from_values(values: Vec<DynValue>) -> Result<Self, CallError>;
}

macro_rules! impl_typed_args {
    ($n:literal $(, $ty:ident $var:ident)*) => {
        impl<$($ty: Typed),*> TypedArgs for ($($ty,)*) {
            const ARITY: usize = $n;

            fn type_infos() -> Vec<DynTypeInfo> {
                vec![$($ty::type_info()),*]
            }

            fn into_values(self) -> Vec<DynValue> {
                let ($($var,)*) = self;
                vec![$($var.into_value()),*]
            }

            #[allow(unused_mut, unused_variables, unused_assignments)]
            fn from_values(values: Vec<DynValue>) -> Result<Self, CallError> {
                if values.len() != $n {
                    return Err(CallError::Arity {
                        expected: $n,
                        found: values.len(),
                    });
                }
                let mut iter = values.into_iter();
                let mut index = 0_usize;
                Ok(($({
                    let $var = $ty::from_value(iter.next().unwrap_or_default())
                        .map_err(|source| CallError::Argument { index, source })?;
                    index += 1;
                    $var
                },)*))
            }
        }
    };
}

impl_typed_args!(0);
impl_typed_args!(1, A0 a0);
impl_typed_args!(2, A0 a0, A1 a1);
impl_typed_args!(3, A0 a0, A1 a1, A2 a2);
impl_typed_args!(4, A0 a0, A1 a1, A2 a2, A3 a3);
impl_typed_args!(5, A0 a0, A1 a1, A2 a2, A3 a3, A4 a4);
impl_typed_args!(6, A0 a0, A1 a1, A2 a2, A3 a3, A4 a4, A5 a5);

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{Signature, TypedArgs};
    use crate::error::CallError;
    use crate::types::{DynTypeInfo, DynValue, TypeKind};

    #[test]
    fn canonical_string() {
        assert_eq!(Signature::of::<(), ()>().to_string(), "void()");
        assert_eq!(
            Signature::of::<bool, (u8, f64, String)>().to_string(),
            "bool(uint8,double,String)"
        );
        let sig = Signature::new(
            DynTypeInfo::new(TypeKind::Object),
            [DynTypeInfo::new(TypeKind::Int32)],
        );
        assert_eq!(sig.to_string(), "Object*(int)");
    }

    #[test]
    fn same_params_ignores_return() {
        let a = Signature::of::<(), (i32,)>();
        let b = Signature::of::<f32, (i32,)>();
        assert!(a.same_params(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn unbox_arguments() {
        let args = <(i32, String)>::from_values(vec![DynValue::Int(4), DynValue::from("x")]);
        assert_eq!(args, Ok((4, "x".to_owned())));

        let wrong = <(i32, String)>::from_values(vec![DynValue::Int(4), DynValue::Int(5)]);
        assert!(matches!(wrong, Err(CallError::Argument { index: 1, .. })));

        let short = <(i32, String)>::from_values(vec![DynValue::Int(4)]);
        assert_eq!(
            short,
            Err(CallError::Arity {
                expected: 2,
                found: 1
            })
        );
        assert_eq!(<(i8, i8, i8)>::ARITY, 3);
    }
}
