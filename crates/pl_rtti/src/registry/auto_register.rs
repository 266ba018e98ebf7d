use crate::registry::ClassManager;

// -----------------------------------------------------------------------------
// ClassRegistration

/// A function registering classes, collected statically.
///
/// Submitted with [`register_class!`](crate::register_class) and applied by
/// [`ClassManager::auto_register`].
#[derive(Clone, Copy)]
pub struct ClassRegistration {
    register: fn(&mut ClassManager),
}

impl ClassRegistration {
    #[inline]
    pub const fn new(register: fn(&mut ClassManager)) -> Self {
        Self { register }
    }

    #[inline]
    pub fn apply(&self, manager: &mut ClassManager) {
        (self.register)(manager);
    }
}

impl core::fmt::Debug for ClassRegistration {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("ClassRegistration")
    }
}

#[cfg(feature = "auto_register")]
inventory::collect!(ClassRegistration);

#[cfg(feature = "auto_register")]
pub(crate) fn apply_registrations(manager: &mut ClassManager) -> usize {
    let mut count = 0;
    for registration in inventory::iter::<ClassRegistration> {
        registration.apply(manager);
        count += 1;
    }
    count
}

#[cfg(not(feature = "auto_register"))]
#[inline(always)]
pub(crate) fn apply_registrations(_manager: &mut ClassManager) -> usize {
    0
}

/// Submits a function registering classes for
/// [`ClassManager::auto_register`](crate::registry::ClassManager::auto_register).
///
/// # Example
///
/// ```
/// use pl_rtti::class::ClassBuilder;
/// use pl_rtti::object::Object;
/// use pl_rtti::registry::ClassManager;
///
/// #[derive(Default)]
/// struct Label;
///
/// impl Object for Label {
///     fn class_name(&self) -> &str {
///         "Label"
///     }
/// }
///
/// fn register_label(manager: &mut ClassManager) {
///     let class = ClassBuilder::<Label>::new("Label")
///         .constructor("Default", Label::default)
///         .build();
///     let _ = manager.register(class);
/// }
///
/// pl_rtti::register_class!(register_label);
/// ```
#[cfg(feature = "auto_register")]
#[macro_export]
macro_rules! register_class {
    ($register:path) => {
        $crate::__macro_exports::inventory::submit! {
            $crate::registry::ClassRegistration::new($register)
        }
    };
}

/// Submits a function registering classes. Without the `auto_register`
/// feature the function is never called.
#[cfg(not(feature = "auto_register"))]
#[macro_export]
macro_rules! register_class {
    ($register:path) => {
        const _: fn(&mut $crate::registry::ClassManager) = $register;
    };
}

// -----------------------------------------------------------------------------
// Tests
