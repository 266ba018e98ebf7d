use alloc::sync::Arc;
use core::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use pl_utils::hash::HashMap;
use serde_json::Value;

use crate::class::{Class, ClassRef};
use crate::error::RegisterError;
use crate::object::{DynObject, ObjectRef};
use crate::registry::{ModuleId, ModuleInfo};

// -----------------------------------------------------------------------------
// Options

/// Outcome of a successful [`ClassManager::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registered {
    /// The class was not known before.
    New,
    /// The class replaced a dummy of the same name.
    Upgraded,
    /// The class is a dummy and a class of that name already exists.
    Ignored,
}

/// Whether [`ClassManager::derived_classes`] follows indirect derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recursion {
    Recursive,
    NonRecursive,
}

/// Whether [`ClassManager::derived_classes`] lists the base class itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncludeBase {
    Include,
    Exclude,
}

/// Whether [`ClassManager::derived_classes`] lists classes without constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncludeAbstract {
    Include,
    Exclude,
}

// -----------------------------------------------------------------------------
// Events

/// A change of the registry reported to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryEvent<'a> {
    /// A class was registered or a dummy was upgraded.
    ClassLoaded(&'a str),
    ClassUnloaded(&'a str),
    ModuleLoaded(ModuleId),
    ModuleUnloaded(ModuleId),
}

/// Handle returned by [`ClassManager::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = dyn Fn(&RegistryEvent<'_>) + Send + Sync;

// -----------------------------------------------------------------------------
// ClassManager

/// The registry of reflected classes.
///
/// Classes are keyed by full name. Each class belongs to the module that
/// registered it and is dropped with [`unregister`](Self::unregister).
/// Base classes are looked up by name when needed, so registration order
/// does not matter.
///
/// The manager is a plain value. Share it between threads with a
/// [`ClassManagerArc`].
///
/// # Example
///
/// ```
/// use pl_rtti::class::ClassBuilder;
/// use pl_rtti::object::Object;
/// use pl_rtti::registry::ClassManager;
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
/// let mut manager = ClassManager::new();
/// manager
///     .register(
///         ClassBuilder::<Shape>::new("Shape")
///             .attribute("Radius", "1.0", |s: &Shape| &s.radius, |s: &mut Shape| &mut s.radius)
///             .constructor("Default", Shape::default)
///             .build(),
///     )
///     .unwrap();
///
/// let shape = manager.create_object("Shape").unwrap();
/// let object = manager.reflect(&shape).unwrap();
/// object.set_attribute("Radius", "2.5").unwrap();
/// assert_eq!(object.values(pl_rtti::object::DefaultValue::WithDefault), r#"Radius="2.5""#);
/// ```
pub struct ClassManager {
    classes: HashMap<String, Class>,
    modules: HashMap<ModuleId, ModuleInfo>,
    next_module: u64,
    listeners: Vec<(SubscriptionId, Box<Listener>)>,
    next_listener: u64,
    auto_registered: bool,
}

impl Default for ClassManager {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl ClassManager {
    /// Creates an empty manager.
    pub fn new() -> Self {
        Self {
            classes: HashMap::default(),
            modules: HashMap::default(),
            next_module: 1,
            listeners: Vec::new(),
            next_listener: 0,
            auto_registered: false,
        }
    }

    // -------------------------------------------------------------------------
    // Classes

    /// Adds a class.
    ///
    /// - A real class replaces a dummy of the same name.
    /// - A class whose name is taken by the same module is a duplicate.
    /// - A dummy whose name is taken by another module is ignored.
    /// - A real class whose name is taken by a real class of another module
    ///   is a name conflict.
    /// - A class that would become its own base is rejected.
    ///
    /// Rejections leave the manager unchanged.
    pub fn register(&mut self, class: Class) -> Result<Registered, RegisterError> {
        let outcome = match self.classes.get(class.full_name()) {
            Some(existing) if existing.is_dummy() && !class.is_dummy() => Registered::Upgraded,
            Some(existing) if existing.module() == class.module() => {
                let err = RegisterError::Duplicate {
                    class: class.full_name().to_owned(),
                    module: class.module(),
                };
                log::warn!("{err}");
                return Err(err);
            }
            Some(_) if class.is_dummy() => {
                log::debug!("dummy class `{}` ignored, the class is loaded", class.full_name());
                return Ok(Registered::Ignored);
            }
            Some(existing) => {
                let err = RegisterError::NameConflict {
                    class: class.full_name().to_owned(),
                    module: class.module(),
                    existing: existing.module(),
                };
                log::warn!("{err}");
                return Err(err);
            }
            None => Registered::New,
        };

        self.check_cycle(&class)?;

        if outcome == Registered::Upgraded {
            log::debug!("dummy class `{}` upgraded", class.full_name());
        }
        let name = class.full_name().to_owned();
        self.classes.insert(name.clone(), class);
        self.notify(RegistryEvent::ClassLoaded(&name));
        Ok(outcome)
    }

    fn check_cycle(&self, class: &Class) -> Result<(), RegisterError> {
        let mut base = class.base_name();
        let mut steps = 0;
        while let Some(name) = base {
            if name == class.full_name() {
                let err = RegisterError::CyclicBase {
                    class: class.full_name().to_owned(),
                    base: class.base_name().unwrap_or_default().to_owned(),
                };
                log::warn!("{err}");
                return Err(err);
            }
            steps += 1;
            if steps > self.classes.len() {
                break;
            }
            base = self.classes.get(name).and_then(Class::base_name);
        }
        Ok(())
    }

    /// Looks up a class by full name.
    #[inline]
    pub fn get_class(&self, name: &str) -> Option<ClassRef<'_>> {
        self.classes.get(name).map(|class| ClassRef::new(class, self))
    }

    #[inline]
    pub(crate) fn class(&self, name: &str) -> Option<&Class> {
        self.classes.get(name)
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Number of registered classes, dummies included.
    #[inline]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Removes all classes registered by `module` and returns how many.
    ///
    /// Classes of other modules naming a removed class as base keep the
    /// name; the base is unresolved until a class of that name registers.
    pub fn unregister(&mut self, module: ModuleId) -> usize {
        let mut removed: Vec<String> = self
            .classes
            .values()
            .filter(|class| class.module() == module)
            .map(|class| class.full_name().to_owned())
            .collect();
        removed.sort_unstable();
        for name in &removed {
            self.classes.remove(name);
            self.notify(RegistryEvent::ClassUnloaded(name));
        }
        removed.len()
    }

    /// All classes, sorted by full name.
    pub fn classes(&self) -> Vec<ClassRef<'_>> {
        let mut classes: Vec<_> = self
            .classes
            .values()
            .map(|class| ClassRef::new(class, self))
            .collect();
        classes.sort_unstable_by(|a, b| a.full_name().cmp(b.full_name()));
        classes
    }

    /// Classes derived from `base`, sorted by full name.
    ///
    /// Abstract classes are those without constructor.
    pub fn derived_classes(
        &self,
        base: &str,
        recursion: Recursion,
        include_base: IncludeBase,
        include_abstract: IncludeAbstract,
    ) -> Vec<ClassRef<'_>> {
        self.classes()
            .into_iter()
            .filter(|class| {
                let related = if class.full_name() == base {
                    include_base == IncludeBase::Include
                } else {
                    match recursion {
                        Recursion::Recursive => class.is_derived_from(base),
                        Recursion::NonRecursive => class.base_name() == Some(base),
                    }
                };
                related
                    && (include_abstract == IncludeAbstract::Include || class.has_constructor())
            })
            .collect()
    }

    // -------------------------------------------------------------------------
    // Modules

    /// Returns a module id that was not handed out before.
    pub fn unique_module_id(&mut self) -> ModuleId {
        let id = ModuleId::from_raw(self.next_module);
        self.next_module += 1;
        id
    }

    /// Records the metadata of a module, replacing earlier metadata.
    pub fn register_module(&mut self, id: ModuleId, info: ModuleInfo) {
        log::info!("module {id} `{}` registered", info.name);
        self.next_module = self.next_module.max(id.to_raw() + 1);
        self.modules.insert(id, info);
        self.notify(RegistryEvent::ModuleLoaded(id));
    }

    /// Removes a module together with all its classes.
    pub fn unregister_module(&mut self, id: ModuleId) -> Option<ModuleInfo> {
        let classes = self.unregister(id);
        let info = self.modules.remove(&id);
        if let Some(info) = &info {
            log::info!("module {id} `{}` unregistered with {classes} classes", info.name);
            self.notify(RegistryEvent::ModuleUnloaded(id));
        }
        info
    }

    #[inline]
    pub fn module(&self, id: ModuleId) -> Option<&ModuleInfo> {
        self.modules.get(&id)
    }

    /// Finds a module by name. With several matches the lowest id wins.
    pub fn module_by_name(&self, name: &str) -> Option<ModuleId> {
        self.modules
            .iter()
            .filter(|(_, info)| info.name == name)
            .map(|(id, _)| *id)
            .min()
    }

    /// All registered modules, sorted by id.
    pub fn modules(&self) -> Vec<(ModuleId, &ModuleInfo)> {
        let mut modules: Vec<_> = self.modules.iter().map(|(id, info)| (*id, info)).collect();
        modules.sort_unstable_by_key(|(id, _)| *id);
        modules
    }

    /// Classes registered by `module`, sorted by full name.
    pub fn module_classes(&self, module: ModuleId) -> Vec<ClassRef<'_>> {
        self.classes()
            .into_iter()
            .filter(|class| class.module() == module)
            .collect()
    }

    // -------------------------------------------------------------------------
    // Events

    /// Calls `listener` on every later change of the registry.
    pub fn subscribe(
        &mut self,
        listener: impl Fn(&RegistryEvent<'_>) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(other, _)| *other != id);
        self.listeners.len() != before
    }

    fn notify(&self, event: RegistryEvent<'_>) {
        for (_, listener) in &self.listeners {
            listener(&event);
        }
    }

    // -------------------------------------------------------------------------
    // Objects

    /// Pairs `object` with the class it names.
    pub fn reflect<'a>(&'a self, object: &'a ObjectRef) -> Option<DynObject<'a>> {
        let class = self.get_class(object.class_name())?;
        Some(DynObject::new(object, class))
    }

    /// Creates an object of class `name` with its default constructor.
    pub fn create_object(&self, name: &str) -> Option<ObjectRef> {
        self.get_class(name)?.create()
    }

    /// Creates an object from a document like `{"Circle": {"Radius": "2"}}`.
    ///
    /// The object is built with the default constructor, then the attributes
    /// in the document are applied.
    pub fn create_from_document(&self, document: &Value) -> Option<ObjectRef> {
        let (name, values) = document.as_object()?.iter().next()?;
        let object = self.create_object(name)?;
        self.reflect(&object)?.set_values_document(values);
        Some(object)
    }

    // -------------------------------------------------------------------------
    // Static registration

    /// Applies every [`ClassRegistration`](crate::registry::ClassRegistration)
    /// submitted with [`register_class!`](crate::register_class).
    ///
    /// Returns the number of registrations applied. Later calls apply nothing
    /// and return `0`. Without the `auto_register` feature nothing is
    /// collected and the result is always `0`.
    pub fn auto_register(&mut self) -> usize {
        if self.auto_registered {
            return 0;
        }
        self.auto_registered = true;
        crate::registry::apply_registrations(self)
    }
}

impl fmt::Debug for ClassManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self
            .classes()
            .iter()
            .map(|class| class.class().full_name())
            .collect();
        f.debug_struct("ClassManager")
            .field("classes", &names)
            .field("modules", &self.modules.len())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// ClassManagerArc

/// A [`ClassManager`] shared between threads.
#[derive(Clone, Default)]
pub struct ClassManagerArc {
    /// The wrapped [`ClassManager`].
    pub internal: Arc<RwLock<ClassManager>>,
}

impl ClassManagerArc {
    pub fn new(manager: ClassManager) -> Self {
        Self {
            internal: Arc::new(RwLock::new(manager)),
        }
    }

    /// Takes a read lock on the underlying [`ClassManager`].
    pub fn read(&self) -> RwLockReadGuard<'_, ClassManager> {
        self.internal.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Takes a write lock on the underlying [`ClassManager`].
    pub fn write(&self) -> RwLockWriteGuard<'_, ClassManager> {
        self.internal
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for ClassManagerArc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.read(), f)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;
    use core::any::Any;
    use core::f32::consts::PI;
    use std::sync::Mutex;

    use serde_json::json;

    use super::{
        ClassManager, ClassManagerArc, IncludeAbstract, IncludeBase, Recursion, Registered,
        RegistryEvent,
    };
    use crate::class::{ClassBuilder, Dummy};
    use crate::error::{CallError, RegisterError};
    use crate::func::DynFunc;
    use crate::member::MemberDesc;
    use crate::object::{DefaultValue, Object, ObjectRef};
    use crate::registry::{ModuleId, ModuleInfo};
    use crate::types::DynValue;

    #[derive(Default)]
    struct Widget {
        width: i32,
    }

    impl Object for Widget {
        fn class_name(&self) -> &str {
            "Widget"
        }
    }

    fn widget(module: ModuleId) -> crate::class::Class {
        ClassBuilder::<Widget>::new("Widget")
            .module(module)
            .attribute("Width", "10", |w: &Widget| &w.width, |w: &mut Widget| &mut w.width)
            .constructor("Default", Widget::default)
            .build()
    }

    #[test]
    fn duplicates_and_conflicts() {
        let mut manager = ClassManager::new();
        let plugin = manager.unique_module_id();
        assert_eq!(manager.register(widget(ModuleId::MAIN)), Ok(Registered::New));
        assert!(matches!(
            manager.register(widget(ModuleId::MAIN)),
            Err(RegisterError::Duplicate { .. })
        ));
        assert!(matches!(
            manager.register(widget(plugin)),
            Err(RegisterError::NameConflict { .. })
        ));
        assert_eq!(manager.len(), 1);
        assert_eq!(manager.get_class("Widget").unwrap().module(), ModuleId::MAIN);
    }

    #[test]
    fn dummy_upgrade() {
        let mut manager = ClassManager::new();
        let plugin = manager.unique_module_id();
        let dummy = ClassBuilder::<Dummy>::dummy("Widget")
            .module(plugin)
            .has_default_constructor(true)
            .build();
        assert_eq!(manager.register(dummy), Ok(Registered::New));
        assert!(manager.get_class("Widget").unwrap().is_dummy());
        assert!(manager.create_object("Widget").is_none());

        assert_eq!(manager.register(widget(ModuleId::MAIN)), Ok(Registered::Upgraded));
        let class = manager.get_class("Widget").unwrap();
        assert!(!class.is_dummy());
        assert!(class.attribute("Width").is_some());

        let late = ClassBuilder::<Dummy>::dummy("Widget").module(plugin).build();
        assert_eq!(manager.register(late), Ok(Registered::Ignored));
        assert!(!manager.get_class("Widget").unwrap().is_dummy());
    }

    #[test]
    fn cyclic_bases() {
        let mut manager = ClassManager::new();
        let own = ClassBuilder::<Widget>::new("A").base("A").build();
        assert!(matches!(manager.register(own), Err(RegisterError::CyclicBase { .. })));
        assert!(manager.get_class("A").is_none());

        manager.register(ClassBuilder::<Widget>::new("B").base("C").build()).unwrap();
        let closing = ClassBuilder::<Widget>::new("C").base("B").build();
        assert!(matches!(manager.register(closing), Err(RegisterError::CyclicBase { .. })));
        assert!(manager.contains("B"));
        assert!(!manager.contains("C"));
        assert_eq!(manager.register(widget(ModuleId::MAIN)), Ok(Registered::New));
    }

    #[test]
    fn unregister_keeps_base_names() {
        let mut manager = ClassManager::new();
        let plugin = manager.unique_module_id();
        manager.register(widget(plugin)).unwrap();
        manager
            .register(ClassBuilder::<Widget>::new("Button").base("Widget").build())
            .unwrap();

        assert_eq!(manager.unregister(plugin), 1);
        let button = manager.get_class("Button").unwrap();
        assert_eq!(button.base_name(), Some("Widget"));
        assert!(button.base_class().is_none());
        assert!(button.attribute("Width").is_none());

        manager.register(widget(plugin)).unwrap();
        let button = manager.get_class("Button").unwrap();
        assert!(button.attribute("Width").is_some());
    }

    #[test]
    fn derived_listing() {
        let mut manager = ClassManager::new();
        manager.register(widget(ModuleId::MAIN)).unwrap();
        manager
            .register(
                ClassBuilder::<Widget>::new("Button")
                    .base("Widget")
                    .constructor("Default", Widget::default)
                    .build(),
            )
            .unwrap();
        manager
            .register(ClassBuilder::<Widget>::new("ToggleButton").base("Button").build())
            .unwrap();

        let names = |list: Vec<crate::class::ClassRef<'_>>| {
            list.iter().map(|c| c.full_name().to_owned()).collect::<Vec<_>>()
        };
        assert_eq!(
            names(manager.derived_classes(
                "Widget",
                Recursion::Recursive,
                IncludeBase::Exclude,
                IncludeAbstract::Include,
            )),
            ["Button", "ToggleButton"]
        );
        assert_eq!(
            names(manager.derived_classes(
                "Widget",
                Recursion::NonRecursive,
                IncludeBase::Include,
                IncludeAbstract::Include,
            )),
            ["Button", "Widget"]
        );
        assert_eq!(
            names(manager.derived_classes(
                "Widget",
                Recursion::Recursive,
                IncludeBase::Include,
                IncludeAbstract::Exclude,
            )),
            ["Button", "Widget"]
        );
    }

    #[test]
    fn modules_and_events() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let mut manager = ClassManager::new();
        let sink = events.clone();
        let subscription = manager.subscribe(move |event| {
            let line = match event {
                RegistryEvent::ClassLoaded(name) => format!("+{name}"),
                RegistryEvent::ClassUnloaded(name) => format!("-{name}"),
                RegistryEvent::ModuleLoaded(id) => format!("+module {id}"),
                RegistryEvent::ModuleUnloaded(id) => format!("-module {id}"),
            };
            sink.lock().unwrap().push(line);
        });

        let gui = manager.unique_module_id();
        manager.register_module(gui, ModuleInfo::new("Gui").plugin("libGui.so"));
        manager.register(widget(gui)).unwrap();
        assert_eq!(manager.module_by_name("Gui"), Some(gui));
        assert_eq!(manager.module(gui).unwrap().filename, "libGui.so");
        assert_eq!(manager.modules().len(), 1);
        assert_eq!(manager.module_classes(gui).len(), 1);

        assert!(manager.unregister_module(gui).is_some());
        assert!(manager.is_empty());
        assert!(manager.unsubscribe(subscription));
        assert!(!manager.unsubscribe(subscription));
        manager.register(widget(ModuleId::MAIN)).unwrap();

        assert_eq!(
            *events.lock().unwrap(),
            ["+module 1", "+Widget", "-Widget", "-module 1"]
        );
        assert_ne!(manager.unique_module_id(), gui);
    }

    #[test]
    fn objects_from_documents() {
        let mut manager = ClassManager::new();
        manager.register(widget(ModuleId::MAIN)).unwrap();

        let object = manager
            .create_from_document(&json!({"Widget": {"Width": "42"}}))
            .unwrap();
        assert_eq!(object.with(|w: &Widget| w.width), Some(42));
        assert!(manager.create_from_document(&json!({"Missing": {}})).is_none());
        assert!(manager.create_from_document(&json!("Widget")).is_none());
    }

    #[test]
    fn shared_manager() {
        let shared = ClassManagerArc::default();
        std::thread::scope(|scope| {
            scope.spawn(|| shared.write().register(widget(ModuleId::MAIN)));
        });
        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    let manager = shared.read();
                    assert!(manager.create_object("Widget").is_some());
                });
            }
        });
        assert_eq!(shared.read().len(), 1);
    }

    #[derive(Default)]
    struct Shape {
        radius: f32,
    }

    impl Object for Shape {
        fn class_name(&self) -> &str {
            "Shape"
        }
    }

    #[derive(Default)]
    struct Circle {
        shape: Shape,
    }

    impl Object for Circle {
        fn class_name(&self) -> &str {
            "Circle"
        }

        fn base(&self, class: &str) -> Option<&dyn Any> {
            (class == "Shape").then_some(&self.shape as &dyn Any)
        }

        fn base_mut(&mut self, class: &str) -> Option<&mut dyn Any> {
            (class == "Shape").then_some(&mut self.shape as &mut dyn Any)
        }
    }

    fn shapes() -> ClassManager {
        let mut manager = ClassManager::new();
        manager
            .register(
                ClassBuilder::<Circle>::new("Circle")
                    .base("Shape")
                    .method("Area", |c: &mut Circle| PI * c.shape.radius * c.shape.radius)
                    .constructor("Default", Circle::default)
                    .build(),
            )
            .unwrap();
        manager
            .register(
                ClassBuilder::<Shape>::new("Shape")
                    .attribute("Radius", "1.0", |s: &Shape| &s.radius, |s: &mut Shape| {
                        &mut s.radius
                    })
                    .build(),
            )
            .unwrap();
        manager
    }

    #[test]
    fn inherited_attribute_and_own_method() {
        let manager = shapes();
        let circle = manager.get_class("Circle").unwrap();
        let shape = manager.get_class("Shape").unwrap();

        let radius = circle.attribute("Radius").unwrap();
        assert!(Arc::ptr_eq(radius, shape.attribute("Radius").unwrap()));
        assert_eq!(radius.owner(), "Shape");
        assert_eq!(radius.default_value(), "1.0");
        assert_eq!(circle.method("Area").unwrap().owner(), "Circle");
        assert!(shape.method("Area").is_none());
    }

    #[test]
    fn reflective_round_trip() {
        let manager = shapes();
        let object = manager.create_object("Circle").unwrap();
        let circle = manager.reflect(&object).unwrap();

        circle.set_default_values();
        assert_eq!(circle.attribute("Radius").unwrap().get_string().unwrap(), "1");
        circle.set_attribute("Radius", "2").unwrap();
        let area = circle.call_method_str("Area", "").unwrap();
        assert_eq!(area, DynValue::Float(PI * 4.0));

        let document = circle.to_document(DefaultValue::NoDefault);
        assert_eq!(document, json!({"Circle": {"Radius": "2"}}));
        let copy = manager.create_from_document(&document).unwrap();
        assert_eq!(copy.with(|c: &Circle| c.shape.radius), Some(2.0));
    }

    #[test]
    fn expired_method_target() {
        let manager = shapes();
        let object = ObjectRef::new(Circle::default());
        let area = manager
            .get_class("Circle")
            .unwrap()
            .method("Area")
            .unwrap()
            .get_method(&object)
            .unwrap();
        drop(object);
        assert!(matches!(area.call_str(""), Err(CallError::Expired)));
    }

    #[test]
    fn debug_lists_classes() {
        let text = format!("{:?}", shapes());
        assert!(text.starts_with("ClassManager"));
        assert!(text.contains(r#"classes: ["Circle", "Shape"]"#));
    }
}
