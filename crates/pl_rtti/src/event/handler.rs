use alloc::sync::Arc;
use core::fmt;

use crate::error::CallError;
use crate::func::{DynFunc, DynParams, Functor, FunctorFn, Signature, TypedArgs};

// -----------------------------------------------------------------------------
// DynEventHandler

/// A receiver that can be connected to an [`Event`](crate::event::Event).
///
/// Slots of reflected objects produce handlers bound to their object, any
/// closure can be turned into one with [`from_fn`](DynEventHandler::from_fn).
#[derive(Clone)]
pub struct DynEventHandler {
    func: Arc<dyn DynFunc>,
}

impl DynEventHandler {
    pub fn new(func: impl DynFunc + 'static) -> Self {
        Self {
            func: Arc::new(func),
        }
    }

    /// Handler calling a plain closure.
    pub fn from_fn<Args, F>(func: F) -> Self
    where
        Args: TypedArgs,
        F: FunctorFn<Args, ()>,
    {
        Self::new(Functor::new::<Args, (), F>(func))
    }

    #[inline]
    pub fn signature(&self) -> &Signature {
        self.func.signature()
    }

    /// Invokes the handler, see [`DynFunc::call`].
    #[inline]
    pub fn call(&self, params: &mut DynParams) -> Result<(), CallError> {
        self.func.call(params)
    }

    /// Returns `true` if both handles share the same receiver.
    #[inline]
    pub fn ptr_eq(&self, other: &DynEventHandler) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for DynEventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DynEventHandler")
            .field(&self.signature().to_string())
            .finish()
    }
}
