use crate::{schema::DescriptorId, Value};

use indexmap::IndexMap;
use std::fmt;
use std::ops;

/// Handle to a materialized instance in an [`ObjectGraph`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectId(usize);

/// One materialized object: its descriptor plus named property slots.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    descriptor: DescriptorId,
    properties: IndexMap<String, Value>,
}

/// Per-statement arena owning every materialized instance.
///
/// Handles give the reference semantics materialization needs (circular
/// ancestor binds, merge-in-place join collapsing, post-hand-off linking
/// from secondary result sets) without shared mutable ownership. The graph
/// is part of the produced result so consumers can traverse handles.
#[derive(Debug, Default)]
pub struct ObjectGraph {
    instances: Vec<Instance>,
}

static NULL: Value = Value::Null;

impl Instance {
    pub fn new(descriptor: DescriptorId) -> Instance {
        Instance {
            descriptor,
            properties: IndexMap::new(),
        }
    }

    pub fn descriptor(&self) -> &DescriptorId {
        &self.descriptor
    }

    /// Reads a property slot; unset slots read as null.
    pub fn property(&self, name: &str) -> &Value {
        self.properties.get(name).unwrap_or(&NULL)
    }

    pub fn set_property(&mut self, name: impl Into<String>, value: Value) {
        self.properties.insert(name.into(), value);
    }

    pub fn properties(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl ObjectGraph {
    pub fn new() -> ObjectGraph {
        ObjectGraph::default()
    }

    pub fn insert(&mut self, instance: Instance) -> ObjectId {
        let id = ObjectId(self.instances.len());
        self.instances.push(instance);
        id
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn property(&self, id: ObjectId, name: &str) -> &Value {
        self[id].property(name)
    }

    pub fn set_property(&mut self, id: ObjectId, name: impl Into<String>, value: Value) {
        self[id].set_property(name, value);
    }

    /// Appends to a collection slot.
    #[track_caller]
    pub fn push_property(&mut self, id: ObjectId, name: &str, value: Value) {
        match self.instances[id.0].properties.get_mut(name) {
            Some(slot) => slot.expect_list_mut().push(value),
            None => panic!("collection property `{name}` was never instantiated"),
        }
    }
}

impl ops::Index<ObjectId> for ObjectGraph {
    type Output = Instance;

    #[track_caller]
    fn index(&self, id: ObjectId) -> &Instance {
        &self.instances[id.0]
    }
}

impl ops::IndexMut<ObjectId> for ObjectGraph {
    #[track_caller]
    fn index_mut(&mut self, id: ObjectId) -> &mut Instance {
        &mut self.instances[id.0]
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "ObjectId({})", self.0)
    }
}

impl std::hash::Hash for Instance {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.descriptor.hash(state);
        self.properties.len().hash(state);
    }
}

impl Eq for Instance {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_property_reads_null() {
        let mut graph = ObjectGraph::new();
        let id = graph.insert(Instance::new("User".into()));
        assert!(graph.property(id, "name").is_null());
    }

    #[test]
    fn collection_append() {
        let mut graph = ObjectGraph::new();
        let id = graph.insert(Instance::new("User".into()));
        graph.set_property(id, "tags", Value::List(vec![]));
        graph.push_property(id, "tags", Value::from("x"));
        assert_eq!(graph.property(id, "tags").expect_list().len(), 1);
    }
}
