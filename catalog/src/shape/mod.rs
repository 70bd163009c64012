//! Structural shape of a type
//!
//! A shape is a pure function of what a type declares. It never depends on the
//! order in which a walk reaches the type.

mod classifier;
mod primitive;
mod well_known;

use serde::Serialize;
use strum::IntoStaticStr;

pub use self::classifier::TypeShapeClassifier;
pub use self::primitive::PrimitiveKind;
use crate::type_ref::TypeRef;
use crate::universe::EnumValue;

/// Structural category of a type plus its extracted inner types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, IntoStaticStr)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ShapeClassification {
    /// Known scalar
    Primitive {
        /// Scalar kind
        #[serde(rename = "primitive")]
        kind: PrimitiveKind,
    },
    /// Enumeration
    Enum {
        /// Integral kind backing the enum
        underlying: PrimitiveKind,
        /// Values combine as bit flags
        is_flags:   bool,
        /// Named values in declaration order
        values:     Vec<EnumValue>,
    },
    /// Nullable value wrapper
    Nullable {
        /// Wrapped type
        inner:       TypeRef,
        /// Shape of the wrapped type
        inner_shape: Box<Self>,
    },
    /// Asynchronous result wrapper
    TaskLike {
        /// Result type, absent for resultless tasks
        #[serde(skip_serializing_if = "Option::is_none")]
        result: Option<TypeRef>,
    },
    /// Built-in array
    Array {
        /// Element type
        element: TypeRef,
        /// Number of dimensions
        rank:    usize,
    },
    /// Ordered collection
    ListLike {
        /// Element type, `unknown` for untyped collections
        element: TypeRef,
    },
    /// Unordered unique collection
    SetLike {
        /// Element type
        element: TypeRef,
    },
    /// Key/value map
    DictionaryLike {
        /// Key type, `unknown` for untyped maps
        key:   TypeRef,
        /// Value type, `unknown` for untyped maps
        value: TypeRef,
    },
    /// Anything with members worth describing
    Composite,
}

impl ShapeClassification {
    /// Element, key, value, result, or wrapped type references, in that order
    ///
    /// Placeholders for unknown inner types are omitted.
    pub fn inner_types(&self) -> Vec<&TypeRef> {
        let inner: Vec<&TypeRef> = match self {
            Self::Nullable { inner, .. } => vec![inner],
            Self::TaskLike { result } => result.iter().collect(),
            Self::Array { element, .. }
            | Self::ListLike { element }
            | Self::SetLike { element } => vec![element],
            Self::DictionaryLike { key, value } => vec![key, value],
            Self::Primitive { .. } | Self::Enum { .. } | Self::Composite => Vec::new(),
        };
        inner.into_iter().filter(|t| !t.is_unknown()).collect()
    }

    /// Whether this shape wraps other types
    pub const fn is_container(&self) -> bool {
        matches!(
            self,
            Self::Nullable { .. }
                | Self::TaskLike { .. }
                | Self::Array { .. }
                | Self::ListLike { .. }
                | Self::SetLike { .. }
                | Self::DictionaryLike { .. }
        )
    }

    /// Primitives and enums are never expanded
    pub const fn is_leaf(&self) -> bool {
        matches!(self, Self::Primitive { .. } | Self::Enum { .. })
    }

    /// Short tag, e.g. `listLike`
    pub fn tag(&self) -> &'static str {
        self.into()
    }
}
