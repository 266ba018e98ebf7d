use alloc::sync::{Arc, Weak};
use core::any::Any;
use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

// -----------------------------------------------------------------------------
// Object

/// A reflected object.
///
/// The reflection layer knows an object by its class name. Members declared on
/// a base class are applied to the part of the object that implements that
/// base, which [`base`](Object::base) and [`base_mut`](Object::base_mut)
/// expose. A type without base classes keeps the default implementations.
///
/// # Example
///
/// ```
/// use core::any::Any;
/// use pl_rtti::object::Object;
///
/// #[derive(Default)]
/// struct Shape {
///     radius: f32,
/// }
///
/// impl Object for Shape {
///     fn class_name(&self) -> &str {
///         "Shape"
///     }
/// }
///
/// #[derive(Default)]
/// struct Circle {
///     shape: Shape,
/// }
///
/// impl Object for Circle {
///     fn class_name(&self) -> &str {
///         "Circle"
///     }
///
///     fn base(&self, class: &str) -> Option<&dyn Any> {
///         (class == "Shape").then_some(&self.shape as &dyn Any)
///     }
///
///     fn base_mut(&mut self, class: &str) -> Option<&mut dyn Any> {
///         (class == "Shape").then_some(&mut self.shape as &mut dyn Any)
///     }
/// }
/// ```
pub trait Object: Any + Send + Sync {
    /// Name of the class this object is an instance of.
    fn class_name(&self) -> &str;

    /// Returns the part of `self` implementing the base class `class`.
    fn base(&self, class: &str) -> Option<&dyn Any> {
        let _ = class;
        None
    }

    /// Mutable counterpart of [`base`](Object::base).
    fn base_mut(&mut self, class: &str) -> Option<&mut dyn Any> {
        let _ = class;
        None
    }
}

/// Resolves the `T` part of `object`, declared by class `owner`.
pub(crate) fn view<'a, T: 'static>(object: &'a dyn Object, owner: &str) -> Option<&'a T> {
    let any: &dyn Any = object;
    match any.downcast_ref::<T>() {
        Some(value) => Some(value),
        None => object.base(owner)?.downcast_ref::<T>(),
    }
}

/// Mutable counterpart of [`view`].
pub(crate) fn view_mut<'a, T: 'static>(
    object: &'a mut dyn Object,
    owner: &str,
) -> Option<&'a mut T> {
    let probe: &dyn Any = &*object;
    if probe.is::<T>() {
        let any: &mut dyn Any = object;
        return any.downcast_mut::<T>();
    }
    object.base_mut(owner)?.downcast_mut::<T>()
}

// -----------------------------------------------------------------------------
// Caller tags

static NEXT_TAG: AtomicU64 = AtomicU64::new(1);

std::thread_local! {
    static THREAD_TAG: u64 = NEXT_TAG.fetch_add(1, Ordering::Relaxed);
}

/// Non-zero tag of the current thread.
fn thread_tag() -> u64 {
    THREAD_TAG.with(|tag| *tag)
}

/// Records the current thread as caller until dropped.
struct CallerMark<'a>(&'a AtomicU64);

impl<'a> CallerMark<'a> {
    fn new(caller: &'a AtomicU64) -> Self {
        caller.store(thread_tag(), Ordering::Release);
        Self(caller)
    }
}

impl Drop for CallerMark<'_> {
    fn drop(&mut self) {
        self.0.store(0, Ordering::Release);
    }
}

// -----------------------------------------------------------------------------
// ObjectRef

type Deferred = Box<dyn FnOnce() + Send>;

struct ObjectCell<T: ?Sized> {
    class_name: Box<str>,
    /// Tag of the thread running a call on the object, `0` when idle.
    caller: AtomicU64,
    deferred: Mutex<Vec<Deferred>>,
    value: RwLock<T>,
}

/// A shared, type-erased handle to a reflected object.
///
/// Cloning shares the object. The object is guarded by a reader-writer lock;
/// reflective reads take the read side and method calls the write side.
///
/// While a method runs, the calling thread is recorded as the object's
/// caller. Slots of the same object reached from that thread, typically
/// through a signal the method emits, are queued and run once the method
/// returns. Other reflective access from that thread fails with a busy error.
/// [`read`](ObjectRef::read) and [`write`](ObjectRef::write) bypass the
/// check and block.
#[derive(Clone)]
pub struct ObjectRef {
    cell: Arc<ObjectCell<dyn Object>>,
}

impl ObjectRef {
    /// Moves `value` into a new shared object.
    pub fn new<T: Object>(value: T) -> Self {
        let class_name = Box::from(value.class_name());
        let cell: Arc<ObjectCell<dyn Object>> = Arc::new(ObjectCell {
            class_name,
            caller: AtomicU64::new(0),
            deferred: Mutex::new(Vec::new()),
            value: RwLock::new(value),
        });
        Self { cell }
    }

    /// Class name the object was created with.
    #[inline]
    pub fn class_name(&self) -> &str {
        &self.cell.class_name
    }

    /// Locks the object for reading.
    pub fn read(&self) -> RwLockReadGuard<'_, dyn Object> {
        self.cell
            .value
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Locks the object for writing.
    pub fn write(&self) -> RwLockWriteGuard<'_, dyn Object> {
        self.cell
            .value
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns `true` while the current thread runs a call on the object.
    #[inline]
    pub fn is_busy(&self) -> bool {
        self.cell.caller.load(Ordering::Acquire) == thread_tag()
    }

    /// Runs `f` with the object locked for writing and the current thread
    /// recorded as its caller, then runs the calls deferred meanwhile.
    ///
    /// Returns `None` without running `f` if the current thread is already
    /// inside a call on the object.
    pub(crate) fn enter<R>(&self, f: impl FnOnce(&mut dyn Object) -> R) -> Option<R> {
        if self.is_busy() {
            return None;
        }
        let result = {
            let mut guard = self.write();
            let _mark = CallerMark::new(&self.cell.caller);
            f(&mut *guard)
        };
        self.run_deferred();
        Some(result)
    }

    /// Queues `call` until the running call on the object returns.
    pub(crate) fn defer(&self, call: Deferred) {
        self.cell
            .deferred
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }

    fn run_deferred(&self) {
        loop {
            let batch = core::mem::take(
                &mut *self
                    .cell
                    .deferred
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner),
            );
            if batch.is_empty() {
                return;
            }
            for call in batch {
                call();
            }
        }
    }

    /// Returns `true` if the object is a `T`.
    pub fn is<T: Object>(&self) -> bool {
        let guard = self.read();
        let any: &dyn Any = &*guard;
        any.is::<T>()
    }

    /// Runs `f` on the object if it is a `T`.
    ///
    /// Returns `None` if the current thread is inside a call on the object.
    pub fn with<T: Object, R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        if self.is_busy() {
            return None;
        }
        let guard = self.read();
        let any: &dyn Any = &*guard;
        any.downcast_ref::<T>().map(f)
    }

    /// Runs `f` on the object mutably if it is a `T`.
    ///
    /// Slots of this object called from `f` run after it returns. Returns
    /// `None` if the current thread is already inside a call on the object.
    pub fn with_mut<T: Object, R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.enter(|object| {
            let any: &mut dyn Any = object;
            any.downcast_mut::<T>().map(f)
        })
        .flatten()
    }

    #[inline]
    pub fn downgrade(&self) -> WeakObjectRef {
        WeakObjectRef {
            cell: Arc::downgrade(&self.cell),
        }
    }

    /// Returns `true` if both handles point to the same object.
    #[inline]
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell)
    }

    /// Number of strong handles.
    #[inline]
    pub fn strong_count(&self) -> usize {
        Arc::strong_count(&self.cell)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ObjectRef").field(&self.class_name()).finish()
    }
}

// -----------------------------------------------------------------------------
// WeakObjectRef

/// A non-owning [`ObjectRef`].
#[derive(Clone)]
pub struct WeakObjectRef {
    cell: Weak<ObjectCell<dyn Object>>,
}

impl WeakObjectRef {
    /// Returns the object if it is still alive.
    #[inline]
    pub fn upgrade(&self) -> Option<ObjectRef> {
        self.cell.upgrade().map(|cell| ObjectRef { cell })
    }

    #[inline]
    pub fn is_expired(&self) -> bool {
        self.cell.strong_count() == 0
    }

    /// Returns `true` if `self` refers to `object`.
    #[inline]
    pub fn points_to(&self, object: &ObjectRef) -> bool {
        Weak::ptr_eq(&self.cell, &Arc::downgrade(&object.cell))
    }
}

impl fmt::Debug for WeakObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(object) => f.debug_tuple("WeakObjectRef").field(&object.class_name()).finish(),
            None => f.write_str("WeakObjectRef(<expired>)"),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
