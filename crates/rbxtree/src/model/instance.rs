//! Instances and the arena that owns them.
//!
//! A [`Dom`] owns every [`Instance`]; callers address them through [`Ref`]
//! handles. Handles are never reused, so a `Ref` to a removed instance stays
//! dangling instead of silently pointing at a newer one. The parent/child
//! links form a forest: a parent exclusively owns its children, while
//! [`Value::Instance`] properties are non-owning and may point anywhere,
//! including at removed instances.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::error::DomError;
use crate::model::Value;

/// Class name of the document root.
pub const DATA_MODEL: &str = "DataModel";

/// Handle to an instance in a [`Dom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ref(u32);

impl Ref {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// =============================================================================
// PROPERTIES
// =============================================================================

/// Insertion-ordered property map.
///
/// Setting an existing name replaces the value in place and keeps its
/// position.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Properties {
    entries: Vec<(String, Value)>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.entries.iter_mut().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Sets a property, returning the previous value.
    pub fn set(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        let name = name.into();
        match self.get_mut(&name) {
            Some(slot) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    /// Removes a property, preserving the order of the others.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let index = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(index).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Value)> {
        self.entries.iter_mut().map(|(n, v)| (n.as_str(), v))
    }
}

impl<S: Into<String>> FromIterator<(S, Value)> for Properties {
    fn from_iter<I: IntoIterator<Item = (S, Value)>>(iter: I) -> Self {
        let mut props = Properties::new();
        for (name, value) in iter {
            props.set(name, value);
        }
        props
    }
}

// =============================================================================
// INSTANCE
// =============================================================================

/// One node of the instance tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    pub class_name: String,
    /// Whether the instance is a top-level service of a place.
    pub is_service: bool,
    /// Opaque identifier carried through files. Not guaranteed unique.
    pub reference: String,
    pub properties: Properties,
    children: Vec<Ref>,
    parent: Option<Ref>,
}

impl Instance {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            is_service: false,
            reference: String::new(),
            properties: Properties::new(),
            children: Vec::new(),
            parent: None,
        }
    }

    pub fn with_service(mut self, is_service: bool) -> Self {
        self.is_service = is_service;
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = reference.into();
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, value: Value) -> Self {
        self.properties.set(name, value);
        self
    }

    /// The `Name` property, or the class name when it has none.
    pub fn name(&self) -> &str {
        match self.properties.get("Name") {
            Some(Value::String(name)) => name,
            _ => &self.class_name,
        }
    }

    pub fn children(&self) -> &[Ref] {
        &self.children
    }

    pub fn parent(&self) -> Option<Ref> {
        self.parent
    }

    pub fn is_data_model(&self) -> bool {
        self.class_name == DATA_MODEL
    }
}

// =============================================================================
// DOM
// =============================================================================

/// Arena owning a forest of instances.
#[derive(Debug, Clone, Default)]
pub struct Dom {
    slots: Vec<Option<Instance>>,
    live: usize,
}

impl Dom {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live instances.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn contains(&self, r: Ref) -> bool {
        self.get(r).is_some()
    }

    /// Inserts an instance without a parent.
    ///
    /// Any children or parent links already on `instance` are discarded.
    pub fn insert(&mut self, mut instance: Instance) -> Ref {
        instance.children.clear();
        instance.parent = None;
        let r = Ref(self.slots.len() as u32);
        self.slots.push(Some(instance));
        self.live += 1;
        r
    }

    /// Inserts an instance as the last child of `parent`.
    pub fn insert_child(&mut self, parent: Ref, instance: Instance) -> Result<Ref, DomError> {
        if !self.contains(parent) {
            return Err(DomError::Missing(parent));
        }
        let r = self.insert(instance);
        // A fresh instance has no descendants, so it cannot close a cycle.
        self.expect_mut(parent)?.children.push(r);
        self.expect_mut(r)?.parent = Some(parent);
        Ok(r)
    }

    /// Detaches every child of `r` in one pass, returning them in order.
    pub fn detach_children(&mut self, r: Ref) -> Result<Vec<Ref>, DomError> {
        let children = std::mem::take(&mut self.expect_mut(r)?.children);
        for child in &children {
            self.expect_mut(*child)?.parent = None;
        }
        Ok(children)
    }

    pub fn get(&self, r: Ref) -> Option<&Instance> {
        self.slots.get(r.index()).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, r: Ref) -> Option<&mut Instance> {
        self.slots.get_mut(r.index()).and_then(Option::as_mut)
    }

    fn expect_mut(&mut self, r: Ref) -> Result<&mut Instance, DomError> {
        self.get_mut(r).ok_or(DomError::Missing(r))
    }

    /// Moves `child` under `parent` (appended last), or detaches it when
    /// `parent` is `None`. Fails if `parent` is `child` or one of its
    /// descendants.
    pub fn set_parent(&mut self, child: Ref, parent: Option<Ref>) -> Result<(), DomError> {
        if !self.contains(child) {
            return Err(DomError::Missing(child));
        }
        if let Some(p) = parent {
            if !self.contains(p) {
                return Err(DomError::Missing(p));
            }
            if self.is_ancestor_or_self(child, p) {
                return Err(DomError::Cycle { child, parent: p });
            }
        }

        let old = self.expect_mut(child)?.parent.take();
        if let Some(old) = old {
            self.expect_mut(old)?.children.retain(|c| *c != child);
        }
        if let Some(p) = parent {
            self.expect_mut(p)?.children.push(child);
            self.expect_mut(child)?.parent = Some(p);
        }
        Ok(())
    }

    /// Whether `ancestor` is `r` or one of its ancestors.
    fn is_ancestor_or_self(&self, ancestor: Ref, r: Ref) -> bool {
        let mut cursor = Some(r);
        while let Some(c) = cursor {
            if c == ancestor {
                return true;
            }
            cursor = self.get(c).and_then(|i| i.parent);
        }
        false
    }

    /// Removes an instance together with its whole subtree, returning the
    /// removed root.
    pub fn remove(&mut self, r: Ref) -> Result<Instance, DomError> {
        self.set_parent(r, None)?;
        for d in self.descendants(r) {
            if let Some(slot) = self.slots.get_mut(d.index()) {
                if slot.take().is_some() {
                    self.live -= 1;
                }
            }
        }
        let removed = self.slots[r.index()].take().ok_or(DomError::Missing(r))?;
        self.live -= 1;
        Ok(removed)
    }

    pub fn children(&self, r: Ref) -> &[Ref] {
        self.get(r).map(|i| i.children.as_slice()).unwrap_or(&[])
    }

    /// All descendants of `r` in pre-order, excluding `r` itself.
    pub fn descendants(&self, r: Ref) -> Vec<Ref> {
        let mut out = Vec::new();
        let mut stack: Vec<Ref> = self.children(r).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev());
        }
        out
    }

    /// Instances without a parent, in insertion order.
    pub fn roots(&self) -> impl Iterator<Item = Ref> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, slot)| match slot {
            Some(inst) if inst.parent.is_none() => Some(Ref(i as u32)),
            _ => None,
        })
    }

    /// First child of `r` whose name is `name`.
    pub fn find_first_child(&self, r: Ref, name: &str) -> Option<Ref> {
        self.children(r)
            .iter()
            .copied()
            .find(|c| self.get(*c).is_some_and(|i| i.name() == name))
    }

    /// Dot-separated names from the outermost ancestor down to `r`. A
    /// `DataModel` ancestor is omitted, as are missing instances.
    pub fn full_name(&self, r: Ref) -> String {
        let mut names = Vec::new();
        let mut cursor = Some(r);
        while let Some(c) = cursor {
            let Some(inst) = self.get(c) else { break };
            if inst.is_data_model() && c != r {
                break;
            }
            names.push(inst.name());
            cursor = inst.parent;
        }
        names.reverse();
        names.join(".")
    }

    /// Deep-copies the subtree rooted at `r` into a new parentless subtree.
    ///
    /// References between instances of the copied subtree are remapped to
    /// the copies; references leaving it are kept as they are.
    pub fn clone_subtree(&mut self, r: Ref) -> Result<Ref, DomError> {
        if !self.contains(r) {
            return Err(DomError::Missing(r));
        }
        let mut order = vec![r];
        order.extend(self.descendants(r));

        let mut map: FxHashMap<Ref, Ref> = FxHashMap::default();
        for old in &order {
            let copy = self.get(*old).cloned().ok_or(DomError::Missing(*old))?;
            map.insert(*old, self.insert(copy));
        }
        for old in &order {
            let new = map[old];
            let children: Vec<Ref> = self.children(*old).iter().map(|c| map[c]).collect();
            for child in &children {
                self.expect_mut(*child)?.parent = Some(new);
            }
            let inst = self.expect_mut(new)?;
            inst.children = children;
            for (_, value) in inst.properties.iter_mut() {
                if let Value::Instance(target) = value {
                    if let Some(mapped) = map.get(target) {
                        *target = *mapped;
                    }
                }
            }
        }
        Ok(map[&r])
    }
}
