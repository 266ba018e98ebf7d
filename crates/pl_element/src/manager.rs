use alloc::sync::Arc;
use core::fmt;
use core::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use pl_utils::hash::HashMap;
use slotmap::SlotMap;

use crate::element::{ElementId, ElementRef, Entry};
use crate::error::ElementError;

// -----------------------------------------------------------------------------
// Shared

pub(crate) struct State<T> {
    elements: SlotMap<ElementId, Arc<Entry<T>>>,
    names: HashMap<String, ElementId>,
    standard: Option<ElementId>,
}

/// Manager data reachable from element references.
pub(crate) struct Shared<T> {
    state: RwLock<State<T>>,
    unload_unused: AtomicBool,
    next_name: AtomicU64,
}

impl<T> Shared<T> {
    fn read(&self) -> RwLockReadGuard<'_, State<T>> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, State<T>> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    #[inline]
    pub(crate) fn unload_unused_enabled(&self) -> bool {
        self.unload_unused.load(Ordering::Acquire)
    }

    /// Forgets a destroyed element.
    pub(crate) fn remove(&self, id: ElementId, name: &str) {
        let mut state = self.write();
        state.elements.remove(id);
        if state.names.get(name) == Some(&id) {
            state.names.remove(name);
        }
        if state.standard == Some(id) {
            state.standard = None;
        }
    }
}

// -----------------------------------------------------------------------------
// ElementManager

/// Owns named elements of type `T`.
///
/// Elements are created and destroyed through the manager and looked up by
/// id or by name. [`ElementHandler`](crate::ElementHandler)s keep elements in
/// use; with unload-unused enabled an unprotected element is destroyed when
/// its last handler detaches.
///
/// The manager is not `Clone`. Dropping it destroys all elements.
///
/// # Example
///
/// ```
/// use pl_element::ElementManager;
///
/// let scenes = ElementManager::new();
/// let main = scenes.create("Main", 1).unwrap();
/// let other = scenes.create("", 2).unwrap();
///
/// assert_eq!(other.name(), "Element0");
/// assert_eq!(scenes.get_by_name("Main").unwrap().id(), main.id());
/// assert!(scenes.create("Main", 3).is_err());
///
/// scenes.set_standard(Some(main.id())).unwrap();
/// assert!(scenes.destroy(main.id()));
/// assert!(scenes.standard().is_none());
/// ```
pub struct ElementManager<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Default for ElementManager<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ElementManager<T> {
    /// Creates a manager with unload-unused disabled.
    #[inline]
    pub fn new() -> Self {
        Self::with_unload_unused(false)
    }

    pub fn with_unload_unused(unload_unused: bool) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: RwLock::new(State {
                    elements: SlotMap::with_key(),
                    names: HashMap::default(),
                    standard: None,
                }),
                unload_unused: AtomicBool::new(unload_unused),
                next_name: AtomicU64::new(0),
            }),
        }
    }

    fn to_ref(&self, entry: &Arc<Entry<T>>) -> ElementRef<T> {
        ElementRef {
            entry: entry.clone(),
            shared: Arc::downgrade(&self.shared),
        }
    }

    /// Returns `true` if `element` belongs to this manager.
    #[inline]
    pub fn owns(&self, element: &ElementRef<T>) -> bool {
        core::ptr::eq(element.shared.as_ptr(), Arc::as_ptr(&self.shared))
    }

    // -------------------------------------------------------------------------
    // Elements

    /// Adds an element.
    ///
    /// An empty name is replaced by a generated unique one.
    pub fn create(&self, name: &str, value: T) -> Result<ElementRef<T>, ElementError> {
        let mut state = self.shared.write();
        let name = if name.is_empty() {
            loop {
                let n = self.shared.next_name.fetch_add(1, Ordering::Relaxed);
                let candidate = format!("Element{n}");
                if !state.names.contains_key(&candidate) {
                    break candidate;
                }
            }
        } else if state.names.contains_key(name) {
            return Err(ElementError::NameTaken(name.to_owned()));
        } else {
            name.to_owned()
        };

        let id = state
            .elements
            .insert_with_key(|id| Arc::new(Entry::new(id, name.clone(), value)));
        state.names.insert(name, id);
        let entry = state.elements[id].clone();
        drop(state);
        Ok(self.to_ref(&entry))
    }

    pub fn get(&self, id: ElementId) -> Option<ElementRef<T>> {
        let entry = self.shared.read().elements.get(id)?.clone();
        Some(self.to_ref(&entry))
    }

    pub fn get_by_name(&self, name: &str) -> Option<ElementRef<T>> {
        let state = self.shared.read();
        let id = *state.names.get(name)?;
        let entry = state.elements.get(id)?.clone();
        drop(state);
        Some(self.to_ref(&entry))
    }

    #[inline]
    pub fn contains(&self, id: ElementId) -> bool {
        self.shared.read().elements.contains_key(id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.shared.read().elements.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A snapshot of the current elements.
    pub fn iter(&self) -> impl Iterator<Item = ElementRef<T>> + use<T> {
        let entries: Vec<_> = self.shared.read().elements.values().cloned().collect();
        let shared = Arc::downgrade(&self.shared);
        entries.into_iter().map(move |entry| ElementRef {
            entry,
            shared: shared.clone(),
        })
    }

    /// Gives an element a new, unused, non-empty name.
    pub fn rename(&self, id: ElementId, name: &str) -> Result<(), ElementError> {
        if name.is_empty() {
            return Err(ElementError::EmptyName);
        }
        let mut state = self.shared.write();
        let entry = state.elements.get(id).ok_or(ElementError::Unknown(id))?.clone();
        let mut entry_state = entry.lock();
        if entry.is_destroyed() {
            return Err(ElementError::Unknown(id));
        }
        if entry_state.name == name {
            return Ok(());
        }
        if state.names.contains_key(name) {
            return Err(ElementError::NameTaken(name.to_owned()));
        }
        let old = core::mem::replace(&mut entry_state.name, name.to_owned());
        state.names.remove(&old);
        state.names.insert(name.to_owned(), id);
        Ok(())
    }

    /// Destroys an element regardless of its handlers.
    ///
    /// Returns `false` for unknown or already destroyed elements.
    pub fn destroy(&self, id: ElementId) -> bool {
        let Some(entry) = self.shared.read().elements.get(id).cloned() else {
            return false;
        };
        entry.destroy(Some(&*self.shared))
    }

    /// Destroys all elements and returns how many.
    pub fn clear(&self) -> usize {
        self.iter()
            .filter(|element| element.entry.destroy(Some(&*self.shared)))
            .count()
    }

    // -------------------------------------------------------------------------
    // Standard element

    /// The element used when none is asked for explicitly.
    pub fn standard(&self) -> Option<ElementRef<T>> {
        let state = self.shared.read();
        let entry = state.elements.get(state.standard?)?.clone();
        drop(state);
        Some(self.to_ref(&entry))
    }

    /// Sets or clears the standard element.
    pub fn set_standard(&self, id: Option<ElementId>) -> Result<(), ElementError> {
        let mut state = self.shared.write();
        if let Some(id) = id
            && !state.elements.contains_key(id)
        {
            return Err(ElementError::Unknown(id));
        }
        state.standard = id;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Unload policy

    #[inline]
    pub fn unload_unused_enabled(&self) -> bool {
        self.shared.unload_unused_enabled()
    }

    /// Enables or disables unloading elements whose last handler detaches.
    ///
    /// Enabling does not touch elements that are already unused, see
    /// [`unload_unused`](Self::unload_unused).
    pub fn set_unload_unused(&self, enabled: bool) {
        self.shared.unload_unused.store(enabled, Ordering::Release);
    }

    /// Destroys every unprotected element without handlers and returns how
    /// many.
    pub fn unload_unused(&self) -> usize {
        let mut count = 0;
        for element in self.iter() {
            let name = {
                let mut state = element.entry.lock();
                if !state.handlers.is_empty() || state.protected {
                    continue;
                }
                element.entry.mark_destroyed(&mut state)
            };
            if let Some(name) = name {
                element.entry.finish_destroy(Some(&*self.shared), &name);
                log::debug!("unused element `{name}` unloaded");
                count += 1;
            }
        }
        count
    }
}

impl<T> Drop for ElementManager<T> {
    fn drop(&mut self) {
        let in_use = self
            .iter()
            .filter(|element| element.handler_count() > 0)
            .count();
        if in_use > 0 {
            log::warn!("element manager dropped while {in_use} elements still have handlers");
        }
        self.clear();
    }
}

impl<T> fmt::Debug for ElementManager<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.read();
        let mut names: Vec<&str> = state.names.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("ElementManager")
            .field("elements", &names)
            .field("unload_unused", &self.unload_unused_enabled())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::ElementManager;
    use crate::{ElementError, ElementHandler};

    #[test]
    fn names() {
        let manager = ElementManager::new();
        let a = manager.create("A", 1).unwrap();
        let b = manager.create("", 2).unwrap();
        assert_eq!(manager.create("A", 3).unwrap_err(), ElementError::NameTaken("A".into()));
        assert_eq!(manager.len(), 2);

        assert_eq!(manager.rename(a.id(), ""), Err(ElementError::EmptyName));
        assert_eq!(
            manager.rename(a.id(), &b.name()),
            Err(ElementError::NameTaken(b.name()))
        );
        manager.rename(a.id(), "First").unwrap();
        assert!(manager.get_by_name("A").is_none());
        assert_eq!(manager.get_by_name("First").unwrap().with(|v| *v), Some(1));

        let created = manager.create("A", 4).unwrap();
        assert_eq!(created.name(), "A");
    }

    #[test]
    fn destroy_is_final() {
        let manager = ElementManager::new();
        let a = manager.create("A", String::from("a")).unwrap();
        let id = a.id();
        manager.set_standard(Some(id)).unwrap();

        assert!(manager.destroy(id));
        assert!(!manager.destroy(id));
        assert!(a.is_destroyed());
        assert_eq!(a.with(|v| v.clone()), None);
        assert!(manager.standard().is_none());
        assert!(!manager.contains(id));
        assert_eq!(manager.rename(id, "B"), Err(ElementError::Unknown(id)));
        assert_eq!(manager.set_standard(Some(id)), Err(ElementError::Unknown(id)));

        let reused = manager.create("A", String::from("b")).unwrap();
        assert_ne!(reused.id(), id);
        assert!(manager.get(id).is_none());
    }

    #[test]
    fn unload_unused_policy() {
        let manager = ElementManager::new();
        let kept = manager.create("Kept", 0).unwrap();
        let mut handler = ElementHandler::new();
        handler.set_element(Some(&kept));
        handler.detach();
        assert!(!kept.is_destroyed());

        manager.set_unload_unused(true);
        let guarded = manager.create("Guarded", 1).unwrap();
        guarded.set_protected(true);
        handler.set_element(Some(&guarded));
        handler.detach();
        assert!(!guarded.is_destroyed());

        assert_eq!(manager.unload_unused(), 1);
        assert!(kept.is_destroyed());
        assert_eq!(manager.len(), 1);

        guarded.set_protected(false);
        assert_eq!(manager.unload_unused(), 1);
        assert!(manager.is_empty());
    }

    #[test]
    fn clear_and_iter() {
        let manager = ElementManager::new();
        for n in 0..5 {
            manager.create("", n).unwrap();
        }
        let mut values: Vec<i32> = manager.iter().filter_map(|e| e.with(|v| *v)).collect();
        values.sort_unstable();
        assert_eq!(values, [0, 1, 2, 3, 4]);

        let snapshot: Vec<_> = manager.iter().collect();
        assert_eq!(manager.clear(), 5);
        assert!(manager.is_empty());
        assert!(snapshot.iter().all(|e| e.is_destroyed()));
    }

    #[test]
    fn drop_destroys_elements() {
        let manager = ElementManager::new();
        let element = manager.create("A", vec![1, 2, 3]).unwrap();
        let mut handler = ElementHandler::new();
        handler.set_element(Some(&element));
        drop(manager);
        assert!(element.is_destroyed());
        assert!(!handler.is_attached());
        assert!(handler.detach());
    }
}
