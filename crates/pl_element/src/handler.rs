use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};

use crate::element::ElementRef;
use crate::manager::ElementManager;

static NEXT_HANDLER: AtomicU64 = AtomicU64::new(0);

// -----------------------------------------------------------------------------
// AttachStatus

/// Result of pointing a handler at an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachStatus {
    /// The handler now points at the element.
    Attached,
    /// The handler already pointed at the element.
    AlreadyAttached,
    /// The handler points at nothing.
    Detached,
    /// The element is destroyed. The handler is unchanged.
    TargetInvalid,
    /// The element belongs to another manager. The handler is unchanged.
    WrongManager,
}

// -----------------------------------------------------------------------------
// ElementHandler

/// Identifies a handler in the handler set of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

/// A non-owning reference to an element that keeps it in use.
///
/// Cloning attaches the clone to the same element. Dropping detaches, which
/// may unload the element, see [`ElementManager`].
pub struct ElementHandler<T> {
    id: HandlerId,
    target: Option<ElementRef<T>>,
}

impl<T> Default for ElementHandler<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ElementHandler<T> {
    /// Creates a handler pointing at nothing.
    pub fn new() -> Self {
        Self {
            id: HandlerId(NEXT_HANDLER.fetch_add(1, Ordering::Relaxed)),
            target: None,
        }
    }

    #[inline]
    pub fn id(&self) -> HandlerId {
        self.id
    }

    /// Points the handler at `element`, or at nothing for `None`.
    ///
    /// The previous element is released only once the new one accepted the
    /// handler.
    pub fn set_element(&mut self, element: Option<&ElementRef<T>>) -> AttachStatus {
        let Some(element) = element else {
            self.detach();
            return AttachStatus::Detached;
        };
        if let Some(current) = &self.target
            && current.ptr_eq(element)
        {
            return if current.is_destroyed() {
                AttachStatus::TargetInvalid
            } else {
                AttachStatus::AlreadyAttached
            };
        }
        if !element.attach(self.id) {
            return AttachStatus::TargetInvalid;
        }
        self.detach();
        self.target = Some(element.clone());
        AttachStatus::Attached
    }

    /// Like [`set_element`](Self::set_element), rejecting elements of other
    /// managers.
    pub fn set_element_checked(
        &mut self,
        manager: &ElementManager<T>,
        element: Option<&ElementRef<T>>,
    ) -> AttachStatus {
        if let Some(element) = element
            && !manager.owns(element)
        {
            return AttachStatus::WrongManager;
        }
        self.set_element(element)
    }

    /// Releases the element. Returns `false` if the handler pointed at nothing.
    pub fn detach(&mut self) -> bool {
        match self.target.take() {
            Some(target) => {
                target.detach(self.id);
                true
            }
            None => false,
        }
    }

    /// The element, unless it was destroyed.
    pub fn element(&self) -> Option<ElementRef<T>> {
        self.target
            .as_ref()
            .filter(|target| !target.is_destroyed())
            .cloned()
    }

    #[inline]
    pub fn is_attached(&self) -> bool {
        self.target.as_ref().is_some_and(|target| !target.is_destroyed())
    }
}

impl<T> Clone for ElementHandler<T> {
    fn clone(&self) -> Self {
        let mut handler = Self::new();
        if let Some(target) = &self.target {
            handler.set_element(Some(target));
        }
        handler
    }
}

impl<T> Drop for ElementHandler<T> {
    fn drop(&mut self) {
        self.detach();
    }
}

impl<T> fmt::Debug for ElementHandler<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementHandler")
            .field("id", &self.id)
            .field("element", &self.element().map(|e| e.id()))
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;
    use core::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;

    use super::{AttachStatus, ElementHandler};
    use crate::{ElementManager, ResourceManager};

    struct Tracked(Arc<AtomicUsize>);

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn attach_and_detach() {
        let manager = ElementManager::new();
        let a = manager.create("A", 'a').unwrap();
        let b = manager.create("B", 'b').unwrap();

        let mut handler = ElementHandler::new();
        assert!(!handler.detach());
        assert_eq!(handler.set_element(Some(&a)), AttachStatus::Attached);
        assert_eq!(handler.set_element(Some(&a)), AttachStatus::AlreadyAttached);
        assert_eq!(a.handler_count(), 1);

        assert_eq!(handler.set_element(Some(&b)), AttachStatus::Attached);
        assert_eq!(a.handler_count(), 0);
        assert_eq!(b.handler_count(), 1);
        assert_eq!(handler.element().unwrap().with(|c| *c), Some('b'));

        assert_eq!(handler.set_element(None), AttachStatus::Detached);
        assert_eq!(b.handler_count(), 0);
        assert!(!handler.detach());
        assert_eq!(b.handler_count(), 0);
    }

    #[test]
    fn destroyed_targets() {
        let manager = ElementManager::new();
        let a = manager.create("A", 1u8).unwrap();
        let b = manager.create("B", 2u8).unwrap();
        let mut handler = ElementHandler::new();
        handler.set_element(Some(&a));

        manager.destroy(b.id());
        assert_eq!(handler.set_element(Some(&b)), AttachStatus::TargetInvalid);
        assert!(handler.element().unwrap().ptr_eq(&a));

        manager.destroy(a.id());
        assert_eq!(handler.set_element(Some(&a)), AttachStatus::TargetInvalid);
        assert!(handler.element().is_none());
    }

    #[test]
    fn wrong_manager() {
        let first = ElementManager::new();
        let second = ElementManager::new();
        let foreign = second.create("A", 0).unwrap();
        let mut handler = ElementHandler::new();
        assert_eq!(
            handler.set_element_checked(&first, Some(&foreign)),
            AttachStatus::WrongManager
        );
        assert_eq!(
            handler.set_element_checked(&second, Some(&foreign)),
            AttachStatus::Attached
        );
    }

    #[test]
    fn clones_and_drops() {
        let resources = ResourceManager::new();
        let texture = resources.create("Brick", [0u8; 4]).unwrap();

        let mut handler = ElementHandler::new();
        handler.set_element(Some(&texture));
        let copy = handler.clone();
        assert_eq!(texture.handler_count(), 2);
        assert_ne!(copy.id(), handler.id());

        drop(handler);
        assert!(!texture.is_destroyed());
        drop(copy);
        assert!(texture.is_destroyed());
        assert!(resources.get_by_name("Brick").is_none());
    }

    #[test]
    fn concurrent_handlers() {
        let resources = ResourceManager::new();
        let mesh = resources.create("Mesh", String::from("cube")).unwrap();
        mesh.set_protected(true);

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..100 {
                        let mut handler = ElementHandler::new();
                        assert_eq!(handler.set_element(Some(&mesh)), AttachStatus::Attached);
                        assert!(handler.detach());
                    }
                });
            }
        });
        assert_eq!(mesh.handler_count(), 0);
        assert!(!mesh.is_destroyed());

        mesh.set_protected(false);
        let mut last = ElementHandler::new();
        last.set_element(Some(&mesh));
        drop(last);
        assert!(mesh.is_destroyed());
    }

    #[test]
    fn racing_last_detach_destroys_once() {
        const THREADS: usize = 8;

        for round in 0..50 {
            let drops = Arc::new(AtomicUsize::new(0));
            let resources = ResourceManager::new();
            let _other = resources.create("Other", Tracked(Arc::new(AtomicUsize::new(0)))).unwrap();
            let shared = resources.create("Shared", Tracked(drops.clone())).unwrap();
            assert_eq!(resources.len(), 2);

            let handlers: Vec<_> = (0..THREADS)
                .map(|_| {
                    let mut handler = ElementHandler::new();
                    assert_eq!(handler.set_element(Some(&shared)), AttachStatus::Attached);
                    handler
                })
                .collect();
            assert_eq!(shared.handler_count(), THREADS);

            let barrier = Barrier::new(THREADS);
            std::thread::scope(|scope| {
                for mut handler in handlers {
                    let barrier = &barrier;
                    scope.spawn(move || {
                        barrier.wait();
                        assert!(handler.detach());
                    });
                }
            });

            assert!(shared.is_destroyed(), "round {round}");
            assert_eq!(drops.load(Ordering::SeqCst), 1, "round {round}");
            assert_eq!(resources.len(), 1);
            assert!(resources.get_by_name("Shared").is_none());
            assert!(resources.get_by_name("Other").is_some());
        }
    }
}
