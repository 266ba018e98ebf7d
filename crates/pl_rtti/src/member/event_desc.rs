use alloc::borrow::Cow;
use core::fmt;

use crate::event::{DynEventHandler, Event};
use crate::func::{ErasedMethod, Signature};
use crate::member::{MemberDesc, MemberInfo, MemberKind};
use crate::object::{Object, ObjectRef, view};

// -----------------------------------------------------------------------------
// EventDesc

type SignalAccess = dyn Fn(&dyn Object) -> Option<Event> + Send + Sync;

/// Descriptor of a signal.
///
/// The [`Event`] itself is a field of the object; binding hands out a handle
/// sharing its connections.
pub struct EventDesc {
    info: MemberInfo,
    owner: Cow<'static, str>,
    signature: Signature,
    access: Option<Box<SignalAccess>>,
}

impl EventDesc {
    /// A signal without storage, for introspection only.
    pub fn placeholder(
        info: impl Into<MemberInfo>,
        owner: impl Into<Cow<'static, str>>,
        signature: Signature,
    ) -> Self {
        Self {
            info: info.into(),
            owner: owner.into(),
            signature,
            access: None,
        }
    }

    pub(crate) fn new<T, F>(
        info: MemberInfo,
        owner: Cow<'static, str>,
        signature: Signature,
        event: F,
    ) -> Self
    where
        T: Object,
        F: Fn(&T) -> &Event + Send + Sync + 'static,
    {
        let class = owner.clone();
        Self {
            info,
            owner,
            signature,
            access: Some(Box::new(move |object: &dyn Object| {
                view::<T>(object, &class).map(|target| event(target).clone())
            })),
        }
    }

    #[inline]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Returns the event of `object`.
    ///
    /// Returns `None` for placeholders, for objects of unrelated classes, for
    /// events whose signature differs from the descriptor and while the
    /// current thread is inside a call on `object`.
    pub fn get_signal(&self, object: &ObjectRef) -> Option<Event> {
        let access = self.access.as_ref()?;
        if object.is_busy() {
            return None;
        }
        let event = access(&*object.read())?;
        if event.signature() != &self.signature {
            log::warn!(
                "signal `{}` of `{}` is declared as `{}` but the event is `{}`",
                self.info.name(),
                self.owner,
                self.signature,
                event.signature(),
            );
            return None;
        }
        Some(event)
    }
}

impl MemberDesc for EventDesc {
    #[inline]
    fn info(&self) -> &MemberInfo {
        &self.info
    }

    #[inline]
    fn kind(&self) -> MemberKind {
        MemberKind::Signal
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

impl fmt::Debug for EventDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDesc")
            .field("name", &self.info.name())
            .field("owner", &self.owner)
            .field("signature", &self.signature.to_string())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// EventHandlerDesc

/// Descriptor of a slot, a method that can be connected to signals.
pub struct EventHandlerDesc {
    info: MemberInfo,
    owner: Cow<'static, str>,
    signature: Signature,
    method: Option<ErasedMethod>,
}

impl EventHandlerDesc {
    /// A slot without implementation, for introspection only.
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

    /// Returns a handler calling this slot on `object`.
    ///
    /// The handler holds the object weakly and is dropped from signals once
    /// the object is gone.
    pub fn get_slot(&self, object: &ObjectRef) -> Option<DynEventHandler> {
        let method = self.method.as_ref()?;
        Some(DynEventHandler::new(
            method.bind(self.info.name(), object.downgrade()),
        ))
    }
}

impl MemberDesc for EventHandlerDesc {
    #[inline]
    fn info(&self) -> &MemberInfo {
        &self.info
    }

    #[inline]
    fn kind(&self) -> MemberKind {
        MemberKind::Slot
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

impl fmt::Debug for EventHandlerDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHandlerDesc")
            .field("name", &self.info.name())
            .field("owner", &self.owner)
            .field("signature", &self.signature.to_string())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::borrow::Cow;

    use super::{EventDesc, EventHandlerDesc};
    use crate::event::Event;
    use crate::func::{ErasedMethod, Signature};
    use crate::member::MemberInfo;
    use crate::object::{Object, ObjectRef};

    struct Button {
        clicked: Event,
    }

    impl Object for Button {
        fn class_name(&self) -> &str {
            "Button"
        }
    }

    struct Counter {
        clicks: i32,
    }

    impl Object for Counter {
        fn class_name(&self) -> &str {
            "Counter"
        }
    }

    #[test]
    fn signal_to_slot() {
        let signal = EventDesc::new(
            MemberInfo::new("Clicked"),
            Cow::Borrowed("Button"),
            Signature::of::<(), (i32,)>(),
            |b: &Button| &b.clicked,
        );
        let slot = EventHandlerDesc::new(
            MemberInfo::new("OnClick"),
            ErasedMethod::new(Cow::Borrowed("Counter"), |c: &mut Counter, n: i32| {
                c.clicks += n;
            }),
        );

        let button = ObjectRef::new(Button {
            clicked: Event::of::<(i32,)>(),
        });
        let counter = ObjectRef::new(Counter { clicks: 0 });

        let event = signal.get_signal(&button).unwrap();
        event.connect(slot.get_slot(&counter).unwrap()).unwrap();
        event.emit_args((2,)).unwrap();
        assert_eq!(counter.with(|c: &Counter| c.clicks), Some(2));

        drop(counter);
        let again = signal.get_signal(&button).unwrap();
        assert_eq!(again.num_connections(), 1);
        again.emit_args((1,)).unwrap();
        assert_eq!(again.num_connections(), 0);
    }

    #[test]
    fn declared_signature_must_match() {
        let signal = EventDesc::new(
            MemberInfo::new("Clicked"),
            Cow::Borrowed("Button"),
            Signature::of::<(), ()>(),
            |b: &Button| &b.clicked,
        );
        let button = ObjectRef::new(Button {
            clicked: Event::of::<(i32,)>(),
        });
        assert!(signal.get_signal(&button).is_none());
        assert!(EventHandlerDesc::placeholder("OnClick", "Counter", Signature::of::<(), ()>())
            .get_slot(&button)
            .is_none());
    }
}
