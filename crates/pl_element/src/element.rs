use alloc::sync::{Arc, Weak};
use core::fmt;
use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock};

use pl_utils::hash::HashSet;
use slotmap::new_key_type;

use crate::handler::HandlerId;
use crate::manager::Shared;

new_key_type! {
    /// Identifies an element within its manager.
    ///
    /// Ids carry a generation, so the id of a destroyed element never
    /// resolves to an element created later in the same slot.
    pub struct ElementId;
}

// -----------------------------------------------------------------------------
// Entry

/// Mutable bookkeeping of an element, guarded by the element lock.
pub(crate) struct EntryState {
    pub(crate) handlers: HashSet<HandlerId>,
    pub(crate) protected: bool,
    pub(crate) name: String,
}

pub(crate) struct Entry<T> {
    id: ElementId,
    value: RwLock<Option<T>>,
    state: Mutex<EntryState>,
    destroyed: AtomicBool,
}

impl<T> Entry<T> {
    pub(crate) fn new(id: ElementId, name: String, value: T) -> Self {
        Self {
            id,
            value: RwLock::new(Some(value)),
            state: Mutex::new(EntryState {
                handlers: HashSet::default(),
                protected: false,
                name,
            }),
            destroyed: AtomicBool::new(false),
        }
    }

    #[inline]
    pub(crate) fn id(&self) -> ElementId {
        self.id
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, EntryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[inline]
    pub(crate) fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::Acquire)
    }

    /// Flags the entry as destroyed. `state` must be this entry's guard.
    ///
    /// Returns the element name if this call made the transition.
    pub(crate) fn mark_destroyed(&self, state: &mut EntryState) -> Option<String> {
        self.destroyed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        Some(state.name.clone())
    }

    /// Removes a marked entry from its manager and drops the value.
    pub(crate) fn finish_destroy(&self, shared: Option<&Shared<T>>, name: &str) {
        if let Some(shared) = shared {
            shared.remove(self.id, name);
        }
        let value = self
            .value
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        drop(value);
    }

    /// Marks and removes the entry. Returns `false` if it was already destroyed.
    pub(crate) fn destroy(&self, shared: Option<&Shared<T>>) -> bool {
        let name = {
            let mut state = self.lock();
            match self.mark_destroyed(&mut state) {
                Some(name) => name,
                None => return false,
            }
        };
        self.finish_destroy(shared, &name);
        log::debug!("element `{name}` destroyed");
        true
    }
}

// -----------------------------------------------------------------------------
// ElementRef

/// A reference to an element of an [`ElementManager`](crate::ElementManager).
///
/// Keeps the bookkeeping alive but not the element: once the element is
/// destroyed, value access returns `None`. Use an
/// [`ElementHandler`](crate::ElementHandler) to keep an element in use.
pub struct ElementRef<T> {
    pub(crate) entry: Arc<Entry<T>>,
    pub(crate) shared: Weak<Shared<T>>,
}

impl<T> Clone for ElementRef<T> {
    fn clone(&self) -> Self {
        Self {
            entry: self.entry.clone(),
            shared: self.shared.clone(),
        }
    }
}

impl<T> ElementRef<T> {
    #[inline]
    pub fn id(&self) -> ElementId {
        self.entry.id()
    }

    /// The current name. Destroyed elements keep their last name.
    pub fn name(&self) -> String {
        self.entry.lock().name.clone()
    }

    /// Runs `f` on the value unless the element is destroyed.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let value = self.entry.value.read().unwrap_or_else(PoisonError::into_inner);
        value.as_ref().map(f)
    }

    /// Runs `f` on the value mutably unless the element is destroyed.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut value = self
            .entry
            .value
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        value.as_mut().map(f)
    }

    #[inline]
    pub fn is_destroyed(&self) -> bool {
        self.entry.is_destroyed()
    }

    /// Number of handlers attached to the element.
    pub fn handler_count(&self) -> usize {
        self.entry.lock().handlers.len()
    }

    pub fn is_protected(&self) -> bool {
        self.entry.lock().protected
    }

    /// Protected elements survive losing their last handler.
    ///
    /// Clearing the flag does not unload the element right away; the next
    /// detach or [`unload_unused`](crate::ElementManager::unload_unused) does.
    pub fn set_protected(&self, protected: bool) {
        self.entry.lock().protected = protected;
    }

    /// Returns `true` if both refer to the same element.
    #[inline]
    pub fn ptr_eq(&self, other: &ElementRef<T>) -> bool {
        Arc::ptr_eq(&self.entry, &other.entry)
    }

    /// Registers `handler`. Fails on destroyed elements.
    pub(crate) fn attach(&self, handler: HandlerId) -> bool {
        let mut state = self.entry.lock();
        if self.entry.is_destroyed() {
            return false;
        }
        state.handlers.insert(handler);
        true
    }

    /// Unregisters `handler` and unloads the element if it became unused.
    pub(crate) fn detach(&self, handler: HandlerId) {
        let shared = self.shared.upgrade();
        let unloaded = {
            let mut state = self.entry.lock();
            let removed = state.handlers.remove(&handler);
            let unload = removed
                && state.handlers.is_empty()
                && !state.protected
                && shared.as_ref().is_some_and(|s| s.unload_unused_enabled());
            if unload {
                self.entry.mark_destroyed(&mut state)
            } else {
                None
            }
        };
        if let Some(name) = unloaded {
            self.entry.finish_destroy(shared.as_deref(), &name);
            log::debug!("element `{name}` unloaded, its last handler detached");
        }
    }
}

impl<T> fmt::Debug for ElementRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementRef")
            .field("id", &self.id())
            .field("name", &self.name())
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}
