//! A newtype wrapper for type names used throughout the system
//!
//! This module provides the `TypeRef` type which represents fully-qualified,
//! closed type names (e.g. `System.Collections.Generic.List<Acme.LineItem>`)
//! with various utility methods for working with these names.

use serde::{Deserialize, Serialize};

use crate::constants::{QUALIFIED_MEMBER_SEPARATOR, TYPE_UNKNOWN};
use crate::error::Result;
use crate::shape::PrimitiveKind;
use crate::type_syntax::TypeSyntax;

/// Stable identity of a type in the analyzed universe
///
/// Names are canonicalized on construction, so two `TypeRef`s compare equal
/// exactly when they denote the same closed type regardless of how the host
/// spelled them: spacing is normalized and scalar keywords become system
/// names (`List<int>` is `List<System.Int32>`). Names that do not parse are kept verbatim (trimmed); the walk
/// treats them like any other name the universe may or may not describe.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(from = "String", into = "String")]
pub struct TypeRef(String);

impl TypeRef {
    /// Create a `TypeRef` representing an unknown type
    ///
    /// Used as the element, key, or value type of containers whose shape is
    /// known but whose inner types are not.
    pub fn unknown() -> Self {
        Self(TYPE_UNKNOWN.to_string())
    }

    /// Whether this is the unknown placeholder
    pub fn is_unknown(&self) -> bool {
        self.0 == TYPE_UNKNOWN
    }

    /// Get the underlying string reference
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Extract the definition name by stripping generic arguments and array suffixes
    /// For example: `System.Collections.Generic.List<int>` returns `System.Collections.Generic.List`
    pub fn base_type(&self) -> &str {
        self.0
            .split(['<', '['])
            .next()
            .unwrap_or(&self.0)
    }

    /// Get the short name (last segment of the definition name)
    /// For example: `Acme.Orders.Order` returns `Order`
    /// For generic types: `System.Collections.Generic.List<Acme.LineItem>` returns `List`
    pub fn short_name(&self) -> &str {
        let base = self.base_type();
        base.rsplit(['.', '+']).next().unwrap_or(base)
    }

    /// Parse the canonical name back into its syntax tree
    pub fn syntax(&self) -> Result<TypeSyntax> {
        TypeSyntax::parse(&self.0)
    }

    /// Generic arguments spelled in the name itself
    ///
    /// Hosts that track generic arguments separately answer
    /// [`TypeUniverse::resolve_generic_arguments`](crate::TypeUniverse::resolve_generic_arguments)
    /// themselves; this is the fallback for name-based universes.
    pub fn name_arguments(&self) -> Vec<Self> {
        self.syntax()
            .map(|syntax| {
                if syntax.is_array() {
                    Vec::new()
                } else {
                    syntax.arguments.iter().map(Self::from).collect()
                }
            })
            .unwrap_or_default()
    }

    /// Member name qualified by this type, e.g. `Acme.IHasValue.Value`
    pub fn qualify_member(&self, member_name: &str) -> String {
        format!("{}{QUALIFIED_MEMBER_SEPARATOR}{member_name}", self.0)
    }

    fn canonicalize(name: &str) -> String {
        TypeSyntax::parse(name).map_or_else(
            |_| name.trim().to_string(),
            |syntax| Self::system_names(syntax).to_string(),
        )
    }

    /// Rewrite scalar keywords to system names, through arguments and array elements
    fn system_names(mut syntax: TypeSyntax) -> TypeSyntax {
        if let Some(kind) = PrimitiveKind::from_type_name(&syntax.path) {
            syntax.path = kind.system_name();
        }
        syntax.arguments = syntax.arguments.into_iter().map(Self::system_names).collect();
        syntax
    }
}

impl From<&str> for TypeRef {
    fn from(s: &str) -> Self {
        Self(Self::canonicalize(s))
    }
}

impl From<String> for TypeRef {
    fn from(s: String) -> Self {
        Self(Self::canonicalize(&s))
    }
}

impl From<&String> for TypeRef {
    fn from(s: &String) -> Self {
        Self(Self::canonicalize(s))
    }
}

impl From<&TypeSyntax> for TypeRef {
    fn from(syntax: &TypeSyntax) -> Self {
        Self(Self::system_names(syntax.clone()).to_string())
    }
}

impl From<TypeRef> for String {
    fn from(type_ref: TypeRef) -> Self {
        type_ref.0
    }
}

impl std::fmt::Display for TypeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "tests fail loudly on bad fixtures")]
mod tests {
    use super::*;

    #[test]
    fn test_equality_ignores_spelling() {
        let a = TypeRef::from("System.Collections.Generic.Dictionary<System.String,System.Decimal>");
        let b = TypeRef::from(" System.Collections.Generic.Dictionary< System.String, System.Decimal > ");
        assert_eq!(a, b);
        assert_eq!(
            a.as_str(),
            "System.Collections.Generic.Dictionary<System.String, System.Decimal>"
        );
    }

    #[test]
    fn test_keywords_and_system_names_are_one_type() {
        assert_eq!(
            TypeRef::from("System.Collections.Generic.List<int>"),
            TypeRef::from("System.Collections.Generic.List<System.Int32>")
        );
        assert_eq!(
            TypeRef::from("System.Collections.Generic.Dictionary<string, decimal[]>").as_str(),
            "System.Collections.Generic.Dictionary<System.String, System.Decimal[]>"
        );
        assert_eq!(TypeRef::from("int?"), TypeRef::from("System.Nullable<System.Int32>"));
        assert_eq!(TypeRef::from("bool").as_str(), "System.Boolean");
        // only whole path segments are rewritten
        assert_eq!(TypeRef::from("Acme.int").as_str(), "Acme.int");
    }

    #[test]
    fn test_nullable_sugar_matches_wrapper() {
        assert_eq!(
            TypeRef::from("Acme.ShipmentStatus?"),
            TypeRef::from("System.Nullable<Acme.ShipmentStatus>")
        );
    }

    #[test]
    fn test_base_and_short_name() {
        let list = TypeRef::from("System.Collections.Generic.List<Acme.LineItem>");
        assert_eq!(list.base_type(), "System.Collections.Generic.List");
        assert_eq!(list.short_name(), "List");

        let nested = TypeRef::from("Acme.Outer+Inner");
        assert_eq!(nested.short_name(), "Inner");

        let array = TypeRef::from("Acme.LineItem[]");
        assert_eq!(array.base_type(), "Acme.LineItem");
    }

    #[test]
    fn test_name_arguments() {
        let map = TypeRef::from("System.Collections.Generic.Dictionary<string, Acme.Box<int>>");
        assert_eq!(
            map.name_arguments(),
            vec![TypeRef::from("string"), TypeRef::from("Acme.Box<int>")]
        );
        assert!(TypeRef::from("Acme.Box<int>[]").name_arguments().is_empty());
    }

    #[test]
    fn test_unparsable_names_are_kept() {
        let odd = TypeRef::from("  (int, string) ");
        assert_eq!(odd.as_str(), "(int, string)");
        assert!(odd.syntax().is_err());
    }

    #[test]
    fn test_serde_round_trip_canonicalizes() {
        let parsed: TypeRef = serde_json::from_str("\"Acme.Box< int >\"").unwrap();
        assert_eq!(parsed.as_str(), "Acme.Box<System.Int32>");
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "\"Acme.Box<System.Int32>\"");
    }
}
