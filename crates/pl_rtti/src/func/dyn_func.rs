use serde_json::Value;

use crate::error::CallError;
use crate::func::{DynParams, Signature};
use crate::types::DynValue;

// -----------------------------------------------------------------------------
// DynFunc

/// A type-erased callable.
///
/// Implementors provide [`signature`](DynFunc::signature) and
/// [`invoke`](DynFunc::invoke). Callers go through [`call`](DynFunc::call) or
/// one of the marshalling variants, which validate the arguments first; the
/// implementation is never reached with a wrong arity or signature.
pub trait DynFunc: Send + Sync {
    /// The signature every call is checked against.
    fn signature(&self) -> &Signature;

    /// Runs the function on already validated parameters.
    ///
    /// Not meant to be called directly, see [`call`](DynFunc::call).
    fn invoke(&self, params: &mut DynParams) -> Result<(), CallError>;

    /// Calls the function, storing the result in the return slot of `params`.
    fn call(&self, params: &mut DynParams) -> Result<(), CallError> {
        check_params(self.signature(), params)?;
        self.invoke(params)
    }

    /// Calls the function with positional values.
    fn call_values(&self, args: Vec<DynValue>) -> Result<DynValue, CallError> {
        let signature = self.signature();
        if args.len() != signature.arity() {
            return Err(CallError::Arity {
                expected: signature.arity(),
                found: args.len(),
            });
        }
        let mut params = DynParams::new(signature.clone());
        for (index, value) in args.into_iter().enumerate() {
            params.set(index, value)?;
        }
        self.invoke(&mut params)?;
        Ok(params.into_return())
    }

    /// Calls the function with a parameter string like `Param0="1" Param1="2"`.
    fn call_str(&self, input: &str) -> Result<DynValue, CallError> {
        let mut params = DynParams::new(self.signature().clone());
        if let Err(err) = params.parse_into(input) {
            log::trace!("call `{}` with {input:?} failed: {err}", self.signature());
            return Err(err.into());
        }
        self.invoke(&mut params)?;
        Ok(params.into_return())
    }

    /// Calls the function with a parameter document, see
    /// [`DynParams::fill_from_document`].
    fn call_document(&self, document: &Value) -> Result<DynValue, CallError> {
        let mut params = DynParams::new(self.signature().clone());
        if let Err(err) = params.fill_from_document(document) {
            log::trace!("call `{}` with {document} failed: {err}", self.signature());
            return Err(err.into());
        }
        self.invoke(&mut params)?;
        Ok(params.into_return())
    }

    /// Returns an independent copy of this function, if it supports cloning.
    fn clone_func(&self) -> Option<Box<dyn DynFunc>> {
        None
    }
}

/// Checks arity first, then the full signature.
pub(crate) fn check_params(signature: &Signature, params: &DynParams) -> Result<(), CallError> {
    if params.len() != signature.arity() {
        return Err(CallError::Arity {
            expected: signature.arity(),
            found: params.len(),
        });
    }
    if params.signature() != signature {
        return Err(CallError::Signature {
            expected: signature.to_string(),
            found: params.signature().to_string(),
        });
    }
    Ok(())
}

// -----------------------------------------------------------------------------
// Tests
