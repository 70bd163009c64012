//! Well-known generic definitions that drive shape classification
//!
//! Shapes are recognized by the definition name of the type itself or of one
//! of the interfaces it implements, never by member inspection.

use strum::{AsRefStr, EnumIter, IntoEnumIterator};

use crate::type_ref::TypeRef;

/// Shape family a definition belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeFamily {
    Nullable,
    Task,
    Dictionary,
    Set,
    Sequence,
}

/// Well-known definitions we classify by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumIter)]
pub enum WellKnownDefinition {
    #[strum(serialize = "System.Nullable")]
    Nullable,
    #[strum(serialize = "System.Threading.Tasks.Task")]
    Task,
    #[strum(serialize = "System.Threading.Tasks.ValueTask")]
    ValueTask,
    #[strum(serialize = "System.Collections.Generic.IDictionary")]
    Dictionary,
    #[strum(serialize = "System.Collections.Generic.IReadOnlyDictionary")]
    ReadOnlyDictionary,
    #[strum(serialize = "System.Collections.IDictionary")]
    NonGenericDictionary,
    #[strum(serialize = "System.Collections.Generic.ISet")]
    Set,
    #[strum(serialize = "System.Collections.Generic.IReadOnlySet")]
    ReadOnlySet,
    #[strum(serialize = "System.Collections.Generic.IList")]
    List,
    #[strum(serialize = "System.Collections.Generic.IReadOnlyList")]
    ReadOnlyList,
    #[strum(serialize = "System.Collections.Generic.ICollection")]
    Collection,
    #[strum(serialize = "System.Collections.Generic.IReadOnlyCollection")]
    ReadOnlyCollection,
    #[strum(serialize = "System.Collections.Generic.IEnumerable")]
    Enumerable,
    #[strum(serialize = "System.Collections.IList")]
    NonGenericList,
    #[strum(serialize = "System.Collections.ICollection")]
    NonGenericCollection,
    #[strum(serialize = "System.Collections.IEnumerable")]
    NonGenericEnumerable,
}

impl WellKnownDefinition {
    /// Try to detect a well-known definition from a type reference
    pub fn detect(type_ref: &TypeRef) -> Option<Self> {
        // an array of a well-known type is an array, not the definition
        if type_ref.as_str().ends_with(']') {
            return None;
        }
        let base = type_ref.base_type();
        Self::iter().find(|definition| definition.as_ref() == base)
    }

    /// Family used by the classification rules
    pub const fn family(self) -> ShapeFamily {
        match self {
            Self::Nullable => ShapeFamily::Nullable,
            Self::Task | Self::ValueTask => ShapeFamily::Task,
            Self::Dictionary | Self::ReadOnlyDictionary | Self::NonGenericDictionary => {
                ShapeFamily::Dictionary
            }
            Self::Set | Self::ReadOnlySet => ShapeFamily::Set,
            Self::List
            | Self::ReadOnlyList
            | Self::Collection
            | Self::ReadOnlyCollection
            | Self::Enumerable
            | Self::NonGenericList
            | Self::NonGenericCollection
            | Self::NonGenericEnumerable => ShapeFamily::Sequence,
        }
    }

    /// Number of generic arguments the definition carries when it is typed
    ///
    /// `None` for definitions that are meaningful at any arity (tasks).
    pub const fn typed_arity(self) -> Option<usize> {
        match self {
            Self::Task | Self::ValueTask => None,
            Self::Dictionary | Self::ReadOnlyDictionary => Some(2),
            Self::NonGenericDictionary
            | Self::NonGenericList
            | Self::NonGenericCollection
            | Self::NonGenericEnumerable => Some(0),
            Self::Nullable
            | Self::Set
            | Self::ReadOnlySet
            | Self::List
            | Self::ReadOnlyList
            | Self::Collection
            | Self::ReadOnlyCollection
            | Self::Enumerable => Some(1),
        }
    }

    /// Rank among sequence interfaces; higher is more specific
    pub const fn sequence_specificity(self) -> u8 {
        match self {
            Self::List => 5,
            Self::ReadOnlyList => 4,
            Self::Collection => 3,
            Self::ReadOnlyCollection => 2,
            Self::Enumerable => 1,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::TYPE_NULLABLE;

    #[test]
    fn test_nullable_matches_syntax_constant() {
        assert_eq!(WellKnownDefinition::Nullable.as_ref(), TYPE_NULLABLE);
    }

    #[test]
    fn test_detect() {
        assert_eq!(
            WellKnownDefinition::detect(&TypeRef::from("System.Collections.Generic.IList<int>")),
            Some(WellKnownDefinition::List)
        );
        assert_eq!(
            WellKnownDefinition::detect(&TypeRef::from("System.Threading.Tasks.Task")),
            Some(WellKnownDefinition::Task)
        );
        assert_eq!(
            WellKnownDefinition::detect(&TypeRef::from("System.Collections.Generic.IList<int>[]")),
            None
        );
        assert_eq!(
            WellKnownDefinition::detect(&TypeRef::from("System.Collections.Generic.List<int>")),
            None
        );
    }
}
