use alloc::borrow::Cow;
use alloc::sync::Arc;
use core::fmt;
use core::marker::PhantomData;

use crate::event::Event;
use crate::func::{ErasedMethod, FunctorFn, MethodFn, Signature, TypedArgs};
use crate::member::{
    ConstructorDesc, EventDesc, EventHandlerDesc, FuncDesc, MemberDesc, MemberInfo, VarDesc,
};
use crate::object::Object;
use crate::registry::ModuleId;
use crate::types::Typed;

// -----------------------------------------------------------------------------
// Class

/// Flags a dummy class carries in place of real constructors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct DummyInfo {
    has_constructor: bool,
    has_default_constructor: bool,
}

/// The description of a reflected class.
///
/// Built with a [`ClassBuilder`] and owned by the
/// [`ClassManager`](crate::registry::ClassManager) after registration.
/// Lookups that follow the base class chain go through a
/// [`ClassRef`](crate::class::ClassRef).
pub struct Class {
    module: ModuleId,
    full_name: String,
    name_start: usize,
    description: Cow<'static, str>,
    base: Option<String>,
    properties: Vec<(Cow<'static, str>, Cow<'static, str>)>,
    attributes: Vec<Arc<VarDesc>>,
    methods: Vec<Arc<FuncDesc>>,
    signals: Vec<Arc<EventDesc>>,
    slots: Vec<Arc<EventHandlerDesc>>,
    constructors: Vec<Arc<ConstructorDesc>>,
    dummy: Option<DummyInfo>,
}

impl Class {
    fn empty(full_name: String) -> Self {
        let name_start = full_name.rfind("::").map_or(0, |pos| pos + 2);
        Self {
            module: ModuleId::MAIN,
            full_name,
            name_start,
            description: Cow::Borrowed(""),
            base: None,
            properties: Vec::new(),
            attributes: Vec::new(),
            methods: Vec::new(),
            signals: Vec::new(),
            slots: Vec::new(),
            constructors: Vec::new(),
            dummy: None,
        }
    }

    /// The module that registered this class.
    #[inline]
    pub fn module(&self) -> ModuleId {
        self.module
    }

    /// The name including the namespace, e.g. `"Geo::Circle"`.
    #[inline]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// The name without namespace, e.g. `"Circle"`.
    #[inline]
    pub fn name(&self) -> &str {
        &self.full_name[self.name_start..]
    }

    /// The namespace, empty for classes in the root namespace.
    #[inline]
    pub fn namespace(&self) -> &str {
        self.full_name[..self.name_start].trim_end_matches("::")
    }

    #[inline]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Full name of the base class.
    #[inline]
    pub fn base_name(&self) -> Option<&str> {
        self.base.as_deref()
    }

    /// Returns `true` for placeholders of classes that are not loaded yet.
    #[inline]
    pub fn is_dummy(&self) -> bool {
        self.dummy.is_some()
    }

    /// Properties declared by this class only.
    pub fn own_properties(&self) -> impl ExactSizeIterator<Item = (&str, &str)> {
        self.properties.iter().map(|(k, v)| (&**k, &**v))
    }

    #[inline]
    pub fn own_attributes(&self) -> &[Arc<VarDesc>] {
        &self.attributes
    }

    #[inline]
    pub fn own_methods(&self) -> &[Arc<FuncDesc>] {
        &self.methods
    }

    #[inline]
    pub fn own_signals(&self) -> &[Arc<EventDesc>] {
        &self.signals
    }

    #[inline]
    pub fn own_slots(&self) -> &[Arc<EventHandlerDesc>] {
        &self.slots
    }

    #[inline]
    pub fn constructors(&self) -> &[Arc<ConstructorDesc>] {
        &self.constructors
    }

    /// Returns `true` if objects of this class can be created.
    pub fn has_constructor(&self) -> bool {
        match self.dummy {
            Some(dummy) => dummy.has_constructor,
            None => !self.constructors.is_empty(),
        }
    }

    /// Returns `true` if objects of this class can be created without parameters.
    pub fn has_default_constructor(&self) -> bool {
        match self.dummy {
            Some(dummy) => dummy.has_default_constructor,
            None => self.constructors.iter().any(|c| c.is_default_constructor()),
        }
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.full_name)
            .field("module", &self.module)
            .field("base", &self.base)
            .field("dummy", &self.is_dummy())
            .field("attributes", &self.attributes.len())
            .field("methods", &self.methods.len())
            .field("signals", &self.signals.len())
            .field("slots", &self.slots.len())
            .field("constructors", &self.constructors.len())
            .finish()
    }
}

/// Adds `desc` unless the category already has a member of that name.
fn push_unique<D: MemberDesc>(list: &mut Vec<Arc<D>>, class: &str, desc: D) {
    if list.iter().any(|d| d.name() == desc.name()) {
        log::warn!(
            "class `{class}` already has a {} named `{}`, the second one is ignored",
            desc.kind(),
            desc.name()
        );
        return;
    }
    list.push(Arc::new(desc));
}

// -----------------------------------------------------------------------------
// ClassBuilder

/// Marker for [`ClassBuilder::dummy`].
pub enum Dummy {}

/// Builds a [`Class`] describing the Rust type `T`.
///
/// The class name may carry a namespace, `"Geo::Circle"`. Members declared
/// here resolve objects of derived classes through
/// [`Object::base`](crate::object::Object::base) using this full name.
///
/// # Example
///
/// ```
/// use pl_rtti::class::ClassBuilder;
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
/// let class = ClassBuilder::<Shape>::new("Shape")
///     .description("Base of all shapes")
///     .property("Category", "Geometry")
///     .attribute("Radius", "1.0", |s: &Shape| &s.radius, |s: &mut Shape| &mut s.radius)
///     .method("Grow", |s: &mut Shape, by: f32| s.radius += by)
///     .constructor("Default", Shape::default)
///     .build();
///
/// assert_eq!(class.full_name(), "Shape");
/// assert_eq!(class.own_attributes().len(), 1);
/// assert!(class.has_default_constructor());
/// ```
pub struct ClassBuilder<T> {
    class: Class,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ClassBuilder<T> {
    fn with_name(full_name: impl Into<String>) -> Self {
        Self {
            class: Class::empty(full_name.into()),
            _marker: PhantomData,
        }
    }

    fn owner(&self) -> Cow<'static, str> {
        Cow::Owned(self.class.full_name.clone())
    }

    /// Sets the module registering the class, [`ModuleId::MAIN`] by default.
    pub fn module(mut self, module: ModuleId) -> Self {
        self.class.module = module;
        self
    }

    pub fn description(mut self, description: impl Into<Cow<'static, str>>) -> Self {
        self.class.description = description.into();
        self
    }

    /// Sets the full name of the base class.
    pub fn base(mut self, base: impl Into<String>) -> Self {
        self.class.base = Some(base.into());
        self
    }

    /// Adds or replaces a property.
    pub fn property(
        mut self,
        key: impl Into<Cow<'static, str>>,
        value: impl Into<Cow<'static, str>>,
    ) -> Self {
        let (key, value) = (key.into(), value.into());
        match self.class.properties.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.class.properties.push((key, value)),
        }
        self
    }

    #[inline]
    pub fn build(self) -> Class {
        self.class
    }
}

impl<T: Object> ClassBuilder<T> {
    /// Starts a class named `full_name`.
    #[inline]
    pub fn new(full_name: impl Into<String>) -> Self {
        Self::with_name(full_name)
    }

    /// Adds an attribute stored in a field.
    pub fn attribute<V, G, M>(
        mut self,
        info: impl Into<MemberInfo>,
        default: impl Into<Cow<'static, str>>,
        get: G,
        get_mut: M,
    ) -> Self
    where
        V: Typed + Clone,
        G: Fn(&T) -> &V + Send + Sync + 'static,
        M: Fn(&mut T) -> &mut V + Send + Sync + 'static,
    {
        let desc = VarDesc::direct(info.into(), self.owner(), default.into(), get, get_mut);
        push_unique(&mut self.class.attributes, &self.class.full_name, desc);
        self
    }

    /// Adds an attribute backed by a getter and a setter.
    pub fn attribute_accessor<V, G, S>(
        mut self,
        info: impl Into<MemberInfo>,
        default: impl Into<Cow<'static, str>>,
        get: G,
        set: S,
    ) -> Self
    where
        V: Typed,
        G: Fn(&T) -> V + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        let desc = VarDesc::accessor(info.into(), self.owner(), default.into(), get, Some(set));
        push_unique(&mut self.class.attributes, &self.class.full_name, desc);
        self
    }

    /// Adds a read-only attribute backed by a getter.
    pub fn attribute_readonly<V, G>(
        mut self,
        info: impl Into<MemberInfo>,
        default: impl Into<Cow<'static, str>>,
        get: G,
    ) -> Self
    where
        V: Typed,
        G: Fn(&T) -> V + Send + Sync + 'static,
    {
        let desc = VarDesc::accessor(
            info.into(),
            self.owner(),
            default.into(),
            get,
            None::<fn(&mut T, V)>,
        );
        push_unique(&mut self.class.attributes, &self.class.full_name, desc);
        self
    }

    /// Adds a method.
    pub fn method<Args, R, F>(mut self, info: impl Into<MemberInfo>, func: F) -> Self
    where
        Args: TypedArgs,
        R: Typed,
        F: MethodFn<T, Args, R>,
    {
        let method = ErasedMethod::new::<T, Args, R, F>(self.owner(), func);
        let desc = FuncDesc::new(info.into(), method);
        push_unique(&mut self.class.methods, &self.class.full_name, desc);
        self
    }

    /// Adds a signal. The event is a field of `T` passing `Args`.
    pub fn signal<Args, F>(mut self, info: impl Into<MemberInfo>, event: F) -> Self
    where
        Args: TypedArgs,
        F: Fn(&T) -> &Event + Send + Sync + 'static,
    {
        let desc = EventDesc::new(info.into(), self.owner(), Signature::of::<(), Args>(), event);
        push_unique(&mut self.class.signals, &self.class.full_name, desc);
        self
    }

    /// Adds a slot, a method that signals with matching arguments can call.
    pub fn slot<Args, F>(mut self, info: impl Into<MemberInfo>, func: F) -> Self
    where
        Args: TypedArgs,
        F: MethodFn<T, Args, ()>,
    {
        let method = ErasedMethod::new::<T, Args, (), F>(self.owner(), func);
        let desc = EventHandlerDesc::new(info.into(), method);
        push_unique(&mut self.class.slots, &self.class.full_name, desc);
        self
    }

    /// Adds a constructor.
    pub fn constructor<Args, F>(mut self, info: impl Into<MemberInfo>, func: F) -> Self
    where
        Args: TypedArgs,
        F: FunctorFn<Args, T>,
    {
        let desc = ConstructorDesc::new::<T, Args, F>(info.into(), self.owner(), func);
        push_unique(&mut self.class.constructors, &self.class.full_name, desc);
        self
    }
}

impl ClassBuilder<Dummy> {
    /// Starts a placeholder for a class that is not loaded yet.
    ///
    /// A dummy has no members. It is replaced in place when the real class
    /// registers.
    pub fn dummy(full_name: impl Into<String>) -> Self {
        let mut builder = Self::with_name(full_name);
        builder.class.dummy = Some(DummyInfo::default());
        builder
    }

    /// Declares whether the real class has constructors.
    pub fn has_constructor(mut self, yes: bool) -> Self {
        if let Some(dummy) = &mut self.class.dummy {
            dummy.has_constructor = yes;
        }
        self
    }

    /// Declares whether the real class has a constructor without parameters.
    pub fn has_default_constructor(mut self, yes: bool) -> Self {
        if let Some(dummy) = &mut self.class.dummy {
            dummy.has_default_constructor = yes;
            dummy.has_constructor |= yes;
        }
        self
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{ClassBuilder, Dummy};
    use crate::event::Event;
    use crate::member::MemberDesc;
    use crate::object::Object;
    use crate::registry::ModuleId;

    struct Sprite {
        width: u32,
        visible: bool,
        moved: Event,
    }

    impl Sprite {
        fn new() -> Self {
            Self {
                width: 0,
                visible: true,
                moved: Event::of::<(i32, i32)>(),
            }
        }
    }

    impl Object for Sprite {
        fn class_name(&self) -> &str {
            "Gui::Sprite"
        }
    }

    #[test]
    fn names_and_namespace() {
        let class = ClassBuilder::<Sprite>::new("Gui::Sprite").build();
        assert_eq!(class.full_name(), "Gui::Sprite");
        assert_eq!(class.name(), "Sprite");
        assert_eq!(class.namespace(), "Gui");

        let class = ClassBuilder::<Sprite>::new("Sprite").build();
        assert_eq!(class.name(), "Sprite");
        assert_eq!(class.namespace(), "");
        assert_eq!(class.module(), ModuleId::MAIN);
    }

    #[test]
    fn members_are_unique_per_category() {
        let class = ClassBuilder::<Sprite>::new("Gui::Sprite")
            .attribute("Width", "0", |s: &Sprite| &s.width, |s: &mut Sprite| &mut s.width)
            .attribute("Width", "1", |s: &Sprite| &s.width, |s: &mut Sprite| &mut s.width)
            .attribute_readonly("Visible", "true", |s: &Sprite| s.visible)
            .method("Width", |s: &mut Sprite| s.width)
            .signal::<(i32, i32), _>("Moved", |s: &Sprite| &s.moved)
            .slot("Hide", |s: &mut Sprite| s.visible = false)
            .constructor("Default", Sprite::new)
            .build();

        assert_eq!(class.own_attributes().len(), 2);
        assert_eq!(class.own_attributes()[0].default_value(), "0");
        assert_eq!(class.own_methods()[0].name(), "Width");
        assert_eq!(class.own_signals()[0].signature().to_string(), "void(int,int)");
        assert_eq!(class.own_slots()[0].owner(), "Gui::Sprite");
        assert!(class.has_default_constructor());
        assert!(!class.is_dummy());
    }

    #[test]
    fn properties_replace() {
        let class = ClassBuilder::<Sprite>::new("Sprite")
            .property("Type", "A")
            .property("Other", "B")
            .property("Type", "C")
            .build();
        let props: Vec<_> = class.own_properties().collect();
        assert_eq!(props, vec![("Type", "C"), ("Other", "B")]);
    }

    #[test]
    fn dummies() {
        let dummy = ClassBuilder::<Dummy>::dummy("Plugin::Widget")
            .base("Plugin::Base")
            .has_default_constructor(true)
            .build();
        assert!(dummy.is_dummy());
        assert!(dummy.has_constructor());
        assert!(dummy.has_default_constructor());
        assert!(dummy.constructors().is_empty());
        assert_eq!(dummy.base_name(), Some("Plugin::Base"));
    }
}
