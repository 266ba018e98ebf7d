use alloc::sync::Arc;
use core::fmt;
use core::ops::Deref;

use serde_json::Value;

use crate::class::Class;
use crate::func::DynParams;
use crate::member::{ConstructorDesc, EventDesc, EventHandlerDesc, FuncDesc, MemberDesc, VarDesc};
use crate::object::ObjectRef;
use crate::registry::ClassManager;
use crate::types::DynValue;

// -----------------------------------------------------------------------------
// ClassRef

/// A registered [`Class`] together with the manager it lives in.
///
/// Member lookups search the class first, then its base classes. A member
/// redeclared by a derived class shadows the base member of the same name and
/// category. Base classes are resolved by name on every lookup, so a base
/// registered or upgraded later is picked up without rebinding.
///
/// Constructors are not inherited.
#[derive(Clone, Copy)]
pub struct ClassRef<'a> {
    class: &'a Class,
    manager: &'a ClassManager,
}

impl<'a> Deref for ClassRef<'a> {
    type Target = Class;

    #[inline]
    fn deref(&self) -> &Class {
        self.class
    }
}

impl<'a> ClassRef<'a> {
    #[inline]
    pub(crate) fn new(class: &'a Class, manager: &'a ClassManager) -> Self {
        Self { class, manager }
    }

    /// The plain class description.
    #[inline]
    pub fn class(&self) -> &'a Class {
        self.class
    }

    /// The manager this class is registered in.
    #[inline]
    pub fn manager(&self) -> &'a ClassManager {
        self.manager
    }

    /// The base class, if it names one that is registered.
    pub fn base_class(&self) -> Option<ClassRef<'a>> {
        self.manager.get_class(self.class.base_name()?)
    }

    /// This class followed by its resolvable base classes.
    fn chain(&self) -> Vec<&'a Class> {
        let mut chain = vec![self.class];
        let mut current = self.class;
        while let Some(base) = current.base_name()
            && let Some(next) = self.manager.class(base)
        {
            if chain.len() > self.manager.len() {
                break;
            }
            chain.push(next);
            current = next;
        }
        chain
    }

    /// Returns `true` if `name` appears in the base class chain.
    ///
    /// A class is not derived from itself. Unregistered bases still count by
    /// name, but the chain stops there.
    pub fn is_derived_from(&self, name: &str) -> bool {
        let mut current = self.class;
        let mut steps = 0;
        while let Some(base) = current.base_name() {
            if base == name {
                return true;
            }
            steps += 1;
            match self.manager.class(base) {
                Some(next) if steps <= self.manager.len() => current = next,
                _ => return false,
            }
        }
        false
    }

    fn find<D: MemberDesc>(
        &self,
        list: fn(&Class) -> &[Arc<D>],
        name: &str,
    ) -> Option<&'a Arc<D>> {
        self.chain()
            .into_iter()
            .find_map(|class| list(class).iter().find(|desc| desc.name() == name))
    }

    fn collect<D: MemberDesc>(&self, list: fn(&Class) -> &[Arc<D>]) -> Vec<&'a Arc<D>> {
        let mut members: Vec<&'a Arc<D>> = Vec::new();
        for class in self.chain().into_iter().rev() {
            for desc in list(class) {
                match members.iter().position(|m| m.name() == desc.name()) {
                    Some(index) => members[index] = desc,
                    None => members.push(desc),
                }
            }
        }
        members
    }

    /// Finds an attribute, searching base classes.
    pub fn attribute(&self, name: &str) -> Option<&'a Arc<VarDesc>> {
        self.find(Class::own_attributes, name)
    }

    /// All attributes, base class attributes first.
    pub fn attributes(&self) -> Vec<&'a Arc<VarDesc>> {
        self.collect(Class::own_attributes)
    }

    /// Finds a method, searching base classes.
    pub fn method(&self, name: &str) -> Option<&'a Arc<FuncDesc>> {
        self.find(Class::own_methods, name)
    }

    /// All methods, base class methods first.
    pub fn methods(&self) -> Vec<&'a Arc<FuncDesc>> {
        self.collect(Class::own_methods)
    }

    pub fn signal(&self, name: &str) -> Option<&'a Arc<EventDesc>> {
        self.find(Class::own_signals, name)
    }

    pub fn signals(&self) -> Vec<&'a Arc<EventDesc>> {
        self.collect(Class::own_signals)
    }

    pub fn slot(&self, name: &str) -> Option<&'a Arc<EventHandlerDesc>> {
        self.find(Class::own_slots, name)
    }

    pub fn slots(&self) -> Vec<&'a Arc<EventHandlerDesc>> {
        self.collect(Class::own_slots)
    }

    /// Finds a constructor of this class by name.
    pub fn constructor(&self, name: &str) -> Option<&'a Arc<ConstructorDesc>> {
        self.class.constructors().iter().find(|c| c.name() == name)
    }

    /// Finds a property, searching base classes.
    pub fn property(&self, key: &str) -> Option<&'a str> {
        self.chain()
            .into_iter()
            .find_map(|class| class.own_properties().find(|(k, _)| *k == key).map(|(_, v)| v))
    }

    /// All properties, base class values overridden by derived ones.
    pub fn properties(&self) -> Vec<(&'a str, &'a str)> {
        let mut properties: Vec<(&'a str, &'a str)> = Vec::new();
        for class in self.chain().into_iter().rev() {
            for (key, value) in class.own_properties() {
                match properties.iter_mut().find(|(k, _)| *k == key) {
                    Some(entry) => entry.1 = value,
                    None => properties.push((key, value)),
                }
            }
        }
        properties
    }

    // -------------------------------------------------------------------------
    // Object creation

    fn construct(constructor: &ConstructorDesc, values: &[DynValue]) -> Option<ObjectRef> {
        let mut params = DynParams::new(constructor.signature().clone());
        for (index, value) in values.iter().enumerate() {
            params.set(index, value.clone()).ok()?;
        }
        match constructor.create(&mut params) {
            Ok(object) => Some(object),
            Err(err) => {
                log::trace!("constructor `{}` failed: {err}", constructor.name());
                None
            }
        }
    }

    /// Creates an object with the constructor taking no parameters.
    pub fn create(&self) -> Option<ObjectRef> {
        let constructor = self
            .class
            .constructors()
            .iter()
            .find(|c| c.is_default_constructor())?;
        Self::construct(constructor, &[])
    }

    /// Creates an object with the first constructor whose parameter types
    /// match those of `params`.
    pub fn create_with(&self, params: &DynParams) -> Option<ObjectRef> {
        let constructor = self
            .class
            .constructors()
            .iter()
            .find(|c| c.signature().same_params(params.signature()))?;
        Self::construct(constructor, params.values())
    }

    /// Creates an object with the named constructor, whose parameter types
    /// must match those of `params`.
    pub fn create_named(&self, name: &str, params: &DynParams) -> Option<ObjectRef> {
        let constructor = self.constructor(name)?;
        if !constructor.signature().same_params(params.signature()) {
            return None;
        }
        Self::construct(constructor, params.values())
    }

    /// Creates an object with the named constructor from a parameter string.
    pub fn create_from_str(&self, name: &str, input: &str) -> Option<ObjectRef> {
        let constructor = self.constructor(name)?;
        match constructor.create_from_str(input) {
            Ok(object) => Some(object),
            Err(err) => {
                log::trace!("constructor `{name}` of `{}` failed: {err}", self.full_name());
                None
            }
        }
    }

    /// Creates an object with the named constructor from a parameter document.
    pub fn create_from_document(&self, name: &str, document: &Value) -> Option<ObjectRef> {
        let constructor = self.constructor(name)?;
        match constructor.create_from_document(document) {
            Ok(object) => Some(object),
            Err(err) => {
                log::trace!("constructor `{name}` of `{}` failed: {err}", self.full_name());
                None
            }
        }
    }
}

impl fmt::Debug for ClassRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.class, f)
    }
}

impl PartialEq for ClassRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self.class, other.class)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use crate::class::ClassBuilder;
    use crate::func::DynParams;
    use crate::member::MemberDesc;
    use crate::object::Object;
    use crate::registry::ClassManager;

    #[derive(Default)]
    struct Node {
        id: i32,
        label: String,
    }

    impl Object for Node {
        fn class_name(&self) -> &str {
            "Node"
        }
    }

    #[derive(Default)]
    struct Leaf {
        node: Node,
        weight: f32,
    }

    impl Object for Leaf {
        fn class_name(&self) -> &str {
            "Tree::Leaf"
        }

        fn base(&self, class: &str) -> Option<&dyn core::any::Any> {
            (class == "Node").then_some(&self.node as &dyn core::any::Any)
        }

        fn base_mut(&mut self, class: &str) -> Option<&mut dyn core::any::Any> {
            (class == "Node").then_some(&mut self.node as &mut dyn core::any::Any)
        }
    }

    fn manager() -> ClassManager {
        let mut manager = ClassManager::new();
        manager
            .register(
                ClassBuilder::<Node>::new("Node")
                    .property("Kind", "Node")
                    .property("Color", "Red")
                    .attribute("Id", "0", |n: &Node| &n.id, |n: &mut Node| &mut n.id)
                    .attribute("Label", "", |n: &Node| &n.label, |n: &mut Node| &mut n.label)
                    .method("Id", |n: &mut Node| n.id)
                    .constructor("Default", Node::default)
                    .build(),
            )
            .unwrap();
        manager
            .register(
                ClassBuilder::<Leaf>::new("Tree::Leaf")
                    .base("Node")
                    .property("Kind", "Leaf")
                    .attribute("Weight", "1", |l: &Leaf| &l.weight, |l: &mut Leaf| &mut l.weight)
                    .attribute("Label", "leaf", |l: &Leaf| &l.node.label, |l: &mut Leaf| {
                        &mut l.node.label
                    })
                    .constructor("Default", Leaf::default)
                    .constructor("Weighted", |weight: f32| Leaf {
                        weight,
                        ..Leaf::default()
                    })
                    .build(),
            )
            .unwrap();
        manager
    }

    #[test]
    fn inherited_members() {
        let manager = manager();
        let leaf = manager.get_class("Tree::Leaf").unwrap();
        assert_eq!(leaf.base_class().unwrap().full_name(), "Node");
        assert!(leaf.is_derived_from("Node"));
        assert!(!leaf.is_derived_from("Tree::Leaf"));

        let names: Vec<_> = leaf.attributes().iter().map(|a| a.name().to_owned()).collect();
        assert_eq!(names, ["Id", "Label", "Weight"]);
        assert_eq!(leaf.attribute("Label").unwrap().default_value(), "leaf");
        assert_eq!(leaf.attribute("Id").unwrap().owner(), "Node");
        assert!(leaf.method("Id").is_some());
        assert!(leaf.signal("Id").is_none());
    }

    #[test]
    fn merged_properties() {
        let manager = manager();
        let leaf = manager.get_class("Tree::Leaf").unwrap();
        assert_eq!(leaf.property("Kind"), Some("Leaf"));
        assert_eq!(leaf.property("Color"), Some("Red"));
        assert_eq!(leaf.properties(), vec![("Kind", "Leaf"), ("Color", "Red")]);
    }

    #[test]
    fn constructors_are_not_inherited() {
        let manager = manager();
        let leaf = manager.get_class("Tree::Leaf").unwrap();
        let node = manager.get_class("Node").unwrap();
        assert!(leaf.constructor("Weighted").is_some());
        assert!(node.constructor("Weighted").is_none());

        let object = leaf.create().unwrap();
        assert_eq!(object.class_name(), "Tree::Leaf");

        let object = leaf.create_from_str("Weighted", "2.5").unwrap();
        assert_eq!(object.with(|l: &Leaf| l.weight), Some(2.5));

        let mut params = DynParams::of::<(), (f32,)>((4.0,));
        let object = leaf.create_with(&params).unwrap();
        assert_eq!(object.with(|l: &Leaf| l.weight), Some(4.0));
        params.set(0, 1.5f32).unwrap();
        assert!(leaf.create_named("Weighted", &params).is_some());
        assert!(leaf.create_named("Default", &params).is_none());
        assert!(leaf.create_from_str("Missing", "").is_none());
    }
}
