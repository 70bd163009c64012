use indexmap::IndexMap;
use indexmap::map::Entry;
use tracing::debug;

use crate::descriptor::{CompositeDescriptor, EnumDescriptor};
use crate::type_ref::TypeRef;

/// Descriptors in completion order
///
/// A type is inserted at most once. Composites complete after everything they
/// reference, so a referenced composite always precedes its referrer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    composites: IndexMap<TypeRef, CompositeDescriptor>,
    enums:      IndexMap<TypeRef, EnumDescriptor>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `type_ref` has any descriptor
    pub fn contains(&self, type_ref: &TypeRef) -> bool {
        self.composites.contains_key(type_ref) || self.enums.contains_key(type_ref)
    }

    /// Whether `type_ref` has a composite descriptor
    pub fn contains_composite(&self, type_ref: &TypeRef) -> bool {
        self.composites.contains_key(type_ref)
    }

    /// Whether `type_ref` has an enum descriptor
    pub fn contains_enum(&self, type_ref: &TypeRef) -> bool {
        self.enums.contains_key(type_ref)
    }

    /// Insert a composite descriptor; false if the type was already present
    pub fn insert_composite(&mut self, descriptor: CompositeDescriptor) -> bool {
        match self.composites.entry(descriptor.type_ref.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                debug!(type_ref = %descriptor.type_ref, members = descriptor.members.len(), "Registered composite");
                slot.insert(descriptor);
                true
            }
        }
    }

    /// Insert an enum descriptor; false if the type was already present
    pub fn insert_enum(&mut self, descriptor: EnumDescriptor) -> bool {
        match self.enums.entry(descriptor.type_ref.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                debug!(type_ref = %descriptor.type_ref, "Registered enum");
                slot.insert(descriptor);
                true
            }
        }
    }

    /// Composite descriptor for `type_ref`
    pub fn composite(&self, type_ref: &TypeRef) -> Option<&CompositeDescriptor> {
        self.composites.get(type_ref)
    }

    /// Enum descriptor for `type_ref`
    pub fn enum_descriptor(&self, type_ref: &TypeRef) -> Option<&EnumDescriptor> {
        self.enums.get(type_ref)
    }

    /// Composite descriptors in completion order
    pub fn composites(&self) -> impl Iterator<Item = &CompositeDescriptor> {
        self.composites.values()
    }

    /// Enum descriptors in first-seen order
    pub fn enums(&self) -> impl Iterator<Item = &EnumDescriptor> {
        self.enums.values()
    }

    /// Total number of descriptors
    pub fn len(&self) -> usize {
        self.composites.len() + self.enums.len()
    }

    /// Whether nothing was registered
    pub fn is_empty(&self) -> bool {
        self.composites.is_empty() && self.enums.is_empty()
    }

    /// Append descriptors from `other` that are not already present
    ///
    /// Existing entries win and keep their position.
    pub fn merge(&mut self, other: Self) {
        for descriptor in other.composites.into_values() {
            self.insert_composite(descriptor);
        }
        for descriptor in other.enums.into_values() {
            self.insert_enum(descriptor);
        }
    }
}
