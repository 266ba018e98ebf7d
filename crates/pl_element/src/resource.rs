use core::fmt;
use core::ops::Deref;

use crate::{ElementHandler, ElementManager, ElementRef};

/// A handler to a resource.
pub type ResourceHandler<T> = ElementHandler<T>;

/// A reference to a resource.
pub type ResourceRef<T> = ElementRef<T>;

// -----------------------------------------------------------------------------
// ResourceManager

/// An [`ElementManager`] that unloads unused resources by default.
pub struct ResourceManager<T> {
    manager: ElementManager<T>,
}

impl<T> Default for ResourceManager<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ResourceManager<T> {
    #[inline]
    pub fn new() -> Self {
        Self {
            manager: ElementManager::with_unload_unused(true),
        }
    }
}

impl<T> Deref for ResourceManager<T> {
    type Target = ElementManager<T>;

    #[inline]
    fn deref(&self) -> &ElementManager<T> {
        &self.manager
    }
}

impl<T> fmt::Debug for ResourceManager<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.manager, f)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{ResourceHandler, ResourceManager};
    use crate::AttachStatus;

    #[test]
    fn handler_counts_are_restored() {
        let resources = ResourceManager::new();
        let scene = resources.create("Scene", 0u32).unwrap();
        scene.set_protected(true);
        let mut first = ResourceHandler::new();
        let mut second = ResourceHandler::new();

        assert_eq!(first.set_element(Some(&scene)), AttachStatus::Attached);
        assert_eq!(second.set_element(Some(&scene)), AttachStatus::Attached);
        assert_eq!(scene.handler_count(), 2);
        second.detach();
        second.detach();
        assert_eq!(scene.handler_count(), 1);
        first.detach();
        assert_eq!(scene.handler_count(), 0);
        assert!(!scene.is_destroyed());
    }

    #[test]
    fn auto_unload_spares_protected() {
        let resources = ResourceManager::new();
        let plain = resources.create("Plain", "a").unwrap();
        let protected = resources.create("Protected", "b").unwrap();
        protected.set_protected(true);

        for element in [&plain, &protected] {
            let mut handler = ResourceHandler::new();
            handler.set_element(Some(element));
        }

        assert!(plain.is_destroyed());
        assert!(!protected.is_destroyed());
        assert_eq!(resources.len(), 1);
        assert!(resources.get_by_name("Protected").is_some());
    }
}
