//! Live instance registry
//!
//! Every live component of an app is registered here under its id.
//! Destroyed components are deregistered, so a lookup miss means the
//! instance never existed or is gone.

use std::collections::BTreeMap;

use crate::{Component, SipaId};

#[derive(Debug, Default)]
pub struct ComponentRegistry {
    next_id: SipaId,
    instances: BTreeMap<SipaId, Component>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an id. Ids are never reused, not even across `reset`.
    pub fn next_id(&mut self) -> SipaId {
        self.next_id += 1;
        self.next_id
    }

    pub fn register(&mut self, component: Component) {
        tracing::trace!("registered component {}", component.id());
        self.instances.insert(component.id(), component);
    }

    pub fn deregister(&mut self, id: SipaId) -> Option<Component> {
        tracing::trace!("deregistered component {}", id);
        self.instances.remove(&id)
    }

    pub fn get(&self, id: SipaId) -> Option<Component> {
        self.instances.get(&id).cloned()
    }

    pub fn contains(&self, id: SipaId) -> bool {
        self.instances.contains_key(&id)
    }

    /// All live instances in creation order
    pub fn instances(&self) -> Vec<Component> {
        self.instances.values().cloned().collect()
    }

    /// Live instances of exactly one class
    pub fn instances_of(&self, class: &str) -> Vec<Component> {
        self.instances
            .values()
            .filter(|c| c.class().name() == class)
            .cloned()
            .collect()
    }

    /// Live instances owned by `parent`
    pub fn children_of(&self, parent: SipaId) -> Vec<Component> {
        self.instances
            .values()
            .filter(|c| c.parent_id() == Some(parent))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Forget every instance without running their hooks
    pub fn clear(&mut self) {
        self.instances.clear();
    }
}
