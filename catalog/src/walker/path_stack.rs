use indexmap::IndexSet;
use itertools::Itertools;

use crate::type_ref::TypeRef;

/// Types on the active descent, outermost first
///
/// A type is on the path only while its own expansion is in progress, so a
/// type reachable twice along different branches is not mistaken for a cycle.
#[derive(Debug, Clone, Default)]
pub struct PathStack {
    entries: IndexSet<TypeRef>,
}

impl PathStack {
    /// Create an empty path
    pub fn new() -> Self {
        Self::default()
    }

    /// Push `type_ref`; false if it is already on the path
    pub fn push(&mut self, type_ref: TypeRef) -> bool {
        self.entries.insert(type_ref)
    }

    /// Pop the innermost entry
    pub fn pop(&mut self) -> Option<TypeRef> {
        self.entries.pop()
    }

    /// Whether `type_ref` is being expanded
    pub fn contains(&self, type_ref: &TypeRef) -> bool {
        self.entries.contains(type_ref)
    }

    /// Current depth
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no expansion is in progress
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries from outermost to innermost
    pub fn iter(&self) -> impl Iterator<Item = &TypeRef> {
        self.entries.iter()
    }

    /// Human-readable path, e.g. `Acme.Order -> Acme.LineItem`
    pub fn describe(&self) -> String {
        self.entries.iter().join(" -> ")
    }
}
