//! Tool registry.
//!
//! Built once at startup from the selected [`ApiGroup`]s and never mutated
//! afterwards; shared between transports behind an `Arc`.

mod catalog;
mod descriptor;
mod error;
mod groups;

#[cfg(test)]
mod descriptor_test;

use std::collections::HashMap;

pub use catalog::{DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
pub use descriptor::{Binding, ParamKind, ParamSpec, ToolDescriptor, UpstreamOperation};
pub use error::{RegistryError, RegistryResult};
pub use groups::ApiGroup;

#[derive(Debug, Clone)]
pub struct ToolRegistry {
    groups: Vec<ApiGroup>,
    tools: Vec<ToolDescriptor>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Register every tool of the given groups. Repeated groups are ignored.
    pub fn new(groups: &[ApiGroup]) -> Self {
        let mut selected: Vec<ApiGroup> = Vec::with_capacity(groups.len());
        for group in groups {
            if !selected.contains(group) {
                selected.push(*group);
            }
        }

        let mut registry = Self {
            groups: Vec::new(),
            tools: Vec::new(),
            index: HashMap::new(),
        };
        for group in &selected {
            for descriptor in catalog::descriptors_for(*group) {
                // Catalog names are unique per group and prefixed by the group name.
                let registered = registry.register(descriptor);
                debug_assert!(registered.is_ok(), "catalog collision: {:?}", registered);
            }
        }
        registry.groups = selected;
        registry
    }

    /// Registry of the default core groups.
    pub fn core() -> Self {
        Self::new(&ApiGroup::CORE)
    }

    /// Build a registry from explicit descriptors, rejecting duplicate names.
    pub fn from_descriptors(descriptors: Vec<ToolDescriptor>) -> RegistryResult<Self> {
        let mut registry = Self {
            groups: Vec::new(),
            tools: Vec::new(),
            index: HashMap::new(),
        };
        for descriptor in descriptors {
            if !registry.groups.contains(&descriptor.group) {
                registry.groups.push(descriptor.group);
            }
            registry.register(descriptor)?;
        }
        Ok(registry)
    }

    fn register(&mut self, descriptor: ToolDescriptor) -> RegistryResult<()> {
        if self.index.contains_key(&descriptor.name) {
            return Err(RegistryError::Duplicate {
                name: descriptor.name,
            });
        }
        self.index
            .insert(descriptor.name.clone(), self.tools.len());
        self.tools.push(descriptor);
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> RegistryResult<&ToolDescriptor> {
        self.index
            .get(name)
            .map(|&i| &self.tools[i])
            .ok_or_else(|| RegistryError::NotFound {
                name: name.to_string(),
            })
    }

    /// All descriptors in registration order.
    pub fn list_all(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    pub fn groups(&self) -> &[ApiGroup] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
