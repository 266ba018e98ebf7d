use core::fmt;

use serde_json::{Map, Value};

use crate::class::ClassRef;
use crate::error::{CallError, ConnectError, ParamsError, VarError};
use crate::event::{ConnectionId, DynEventHandler, Event};
use crate::func::{BoundMethod, DynFunc, DynParams, ParamsParser, write_pair};
use crate::member::{DynVar, MemberDesc};
use crate::object::ObjectRef;
use crate::types::DynValue;

// -----------------------------------------------------------------------------
// DefaultValue

/// Whether attributes holding their default value are written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultValue {
    WithDefault,
    NoDefault,
}

// -----------------------------------------------------------------------------
// DynObject

/// An object seen through its class.
///
/// Obtained from [`ClassManager::reflect`](crate::registry::ClassManager::reflect).
/// Every helper binds the members it needs on the fly; the returned proxies
/// hold the object weakly.
#[derive(Clone, Copy)]
pub struct DynObject<'a> {
    object: &'a ObjectRef,
    class: ClassRef<'a>,
}

impl<'a> DynObject<'a> {
    #[inline]
    pub fn new(object: &'a ObjectRef, class: ClassRef<'a>) -> Self {
        Self { object, class }
    }

    #[inline]
    pub fn object(&self) -> &'a ObjectRef {
        self.object
    }

    #[inline]
    pub fn class(&self) -> ClassRef<'a> {
        self.class
    }

    /// Returns `true` if the class is `name` or derives from it.
    pub fn is_instance_of(&self, name: &str) -> bool {
        self.class.full_name() == name || self.class.is_derived_from(name)
    }

    // -------------------------------------------------------------------------
    // Attributes

    pub fn attribute(&self, name: &str) -> Option<DynVar> {
        self.class.attribute(name)?.bind(self.object)
    }

    /// All attributes, base class attributes first.
    pub fn attributes(&self) -> Vec<DynVar> {
        self.class
            .attributes()
            .into_iter()
            .filter_map(|desc| desc.bind(self.object))
            .collect()
    }

    /// Sets an attribute from its string form.
    pub fn set_attribute(&self, name: &str, value: &str) -> Result<(), VarError> {
        self.attribute(name)
            .ok_or_else(|| VarError::Unbound(name.to_owned()))?
            .set_string(value)
    }

    pub fn set_attribute_default(&self, name: &str) -> Result<(), VarError> {
        self.attribute(name)
            .ok_or_else(|| VarError::Unbound(name.to_owned()))?
            .set_default()
    }

    /// Writes all attributes as `Name="Value"` pairs.
    ///
    /// With [`DefaultValue::NoDefault`] attributes holding their default
    /// value are left out. Unreadable attributes are always left out.
    pub fn values(&self, default: DefaultValue) -> String {
        let mut out = String::new();
        for var in self.attributes() {
            if default == DefaultValue::NoDefault && var.is_default() {
                continue;
            }
            match var.get_string() {
                Ok(value) => write_pair(&mut out, var.name(), &value),
                Err(err) => log::trace!("attribute `{}` skipped: {err}", var.name()),
            }
        }
        out
    }

    /// Applies `Name="Value"` pairs and returns how many attributes were set.
    ///
    /// Unknown names and values that do not convert are skipped.
    pub fn set_values(&self, input: &str) -> Result<usize, ParamsError> {
        let mut count = 0;
        for token in ParamsParser::new(input) {
            let token = token?;
            let Some(name) = &token.name else {
                log::debug!("value {:?} without attribute name skipped", token.value);
                continue;
            };
            if self.apply(name, |var| var.set_string(&token.value)) {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Resets every writable attribute and returns how many were reset.
    pub fn set_default_values(&self) -> usize {
        self.attributes()
            .iter()
            .filter(|var| !var.descriptor().is_read_only())
            .filter(|var| var.set_default().is_ok())
            .count()
    }

    /// Like [`values`](Self::values), as a document `{"Name": "Value"}`.
    pub fn values_document(&self, default: DefaultValue) -> Value {
        let mut map = Map::new();
        for var in self.attributes() {
            if default == DefaultValue::NoDefault && var.is_default() {
                continue;
            }
            if let Ok(value) = var.get_string() {
                map.insert(var.name().to_owned(), Value::String(value));
            }
        }
        Value::Object(map)
    }

    /// Applies a document `{"Name": value}` and returns how many attributes
    /// were set.
    ///
    /// Strings are parsed like [`set_values`](Self::set_values); other
    /// values are converted to the attribute type.
    pub fn set_values_document(&self, document: &Value) -> usize {
        let Some(map) = document.as_object() else {
            log::debug!("attribute document is not an object: {document}");
            return 0;
        };
        map.iter()
            .filter(|(name, value)| {
                self.apply(name, |var| match value {
                    Value::String(text) => var.set_string(text),
                    other => {
                        let value = var.type_info().from_document(other)?;
                        var.set_value(value)
                    }
                })
            })
            .count()
    }

    fn apply(&self, name: &str, set: impl FnOnce(&DynVar) -> Result<(), VarError>) -> bool {
        let Some(var) = self.attribute(name) else {
            log::debug!("`{}` has no attribute `{name}`", self.class.full_name());
            return false;
        };
        match set(&var) {
            Ok(()) => true,
            Err(err) => {
                log::debug!("attribute `{name}` of `{}` not set: {err}", self.class.full_name());
                false
            }
        }
    }

    /// The object as `{"ClassName": {"Name": "Value"}}`.
    pub fn to_document(&self, default: DefaultValue) -> Value {
        let mut map = Map::new();
        map.insert(self.class.full_name().to_owned(), self.values_document(default));
        Value::Object(map)
    }

    /// Applies a document written by [`to_document`](Self::to_document).
    ///
    /// Returns `None` if the document does not describe an object of this
    /// class.
    pub fn from_document(&self, document: &Value) -> Option<usize> {
        let values = document.as_object()?.get(self.class.full_name())?;
        Some(self.set_values_document(values))
    }

    // -------------------------------------------------------------------------
    // Methods

    pub fn method(&self, name: &str) -> Option<BoundMethod> {
        self.class.method(name)?.get_method(self.object)
    }

    /// All methods, base class methods first.
    pub fn methods(&self) -> Vec<BoundMethod> {
        self.class
            .methods()
            .into_iter()
            .filter_map(|desc| desc.get_method(self.object))
            .collect()
    }

    fn bound_method(&self, name: &str) -> Result<BoundMethod, CallError> {
        self.method(name)
            .ok_or_else(|| CallError::Unbound(name.to_owned()))
    }

    /// Calls a method, leaving the result in the return slot of `params`.
    pub fn call_method(&self, name: &str, params: &mut DynParams) -> Result<(), CallError> {
        self.bound_method(name)?.call(params)
    }

    /// Calls a method with a parameter string.
    pub fn call_method_str(&self, name: &str, input: &str) -> Result<DynValue, CallError> {
        self.bound_method(name)?.call_str(input)
    }

    /// Calls a method with a parameter document.
    pub fn call_method_document(&self, name: &str, document: &Value) -> Result<DynValue, CallError> {
        self.bound_method(name)?.call_document(document)
    }

    // -------------------------------------------------------------------------
    // Signals and slots

    pub fn signal(&self, name: &str) -> Option<Event> {
        self.class.signal(name)?.get_signal(self.object)
    }

    pub fn signals(&self) -> Vec<(&'a str, Event)> {
        self.class
            .signals()
            .into_iter()
            .filter_map(|desc| Some((desc.name(), desc.get_signal(self.object)?)))
            .collect()
    }

    pub fn slot(&self, name: &str) -> Option<DynEventHandler> {
        self.class.slot(name)?.get_slot(self.object)
    }

    pub fn slots(&self) -> Vec<(&'a str, DynEventHandler)> {
        self.class
            .slots()
            .into_iter()
            .filter_map(|desc| Some((desc.name(), desc.get_slot(self.object)?)))
            .collect()
    }

    /// Connects signal `signal` of this object to slot `slot` of `target`.
    pub fn connect(
        &self,
        signal: &str,
        target: &DynObject<'_>,
        slot: &str,
    ) -> Result<ConnectionId, ConnectError> {
        let event = self
            .signal(signal)
            .ok_or_else(|| ConnectError::UnknownSignal(signal.to_owned()))?;
        let handler = target
            .slot(slot)
            .ok_or_else(|| ConnectError::UnknownSlot(slot.to_owned()))?;
        event.connect(handler)
    }
}

impl fmt::Debug for DynObject<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynObject")
            .field("class", &self.class.full_name())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests
