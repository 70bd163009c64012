//! Entry point selection
//!
//! Which types count as roots is the host's decision. [`MarkerSelector`]
//! covers the usual case of a marker attribute or marker interface.

use tracing::debug;

use crate::error::Result;
use crate::type_ref::TypeRef;
use crate::universe::{AttributeInfo, ImplementedInterface, TypeKind, TypeUniverse, interface_closure};

/// Chooses the roots of a discovery run
pub trait EntryPointSelector {
    /// Roots in a stable order
    fn select_roots(&self, universe: &dyn TypeUniverse) -> Result<Vec<TypeRef>>;
}

/// What a marker predicate gets to look at
#[derive(Debug, Clone, Copy)]
pub struct MarkerCandidate<'a> {
    /// Candidate type
    pub type_ref:   &'a TypeRef,
    /// Attributes applied to the type
    pub attributes: &'a [AttributeInfo],
    /// Interface closure of the type
    pub interfaces: &'a [ImplementedInterface],
}

impl MarkerCandidate<'_> {
    /// Whether an attribute named `name` is applied
    ///
    /// Matches the full name or the short name, with or without the
    /// `Attribute` suffix.
    pub fn has_attribute(&self, name: &str) -> bool {
        let name = name.trim();
        let short = name.strip_suffix("Attribute").unwrap_or(name);
        self.attributes.iter().any(|attribute| {
            let full = attribute.type_ref.base_type();
            let attribute_short = attribute.type_ref.short_name();
            full == name
                || attribute_short == name
                || attribute_short.strip_suffix("Attribute") == Some(short)
        })
    }

    /// Whether the closure contains `interface`
    ///
    /// A bare definition name matches every instantiation of it.
    pub fn implements(&self, interface: &str) -> bool {
        let wanted = TypeRef::from(interface);
        self.interfaces.iter().any(|implemented| {
            implemented.interface == wanted || implemented.interface.base_type() == wanted.as_str()
        })
    }
}

type MarkerPredicate = Box<dyn Fn(&MarkerCandidate<'_>) -> bool + Send + Sync>;

/// Selects public types matching an injected predicate
pub struct MarkerSelector {
    predicate: MarkerPredicate,
}

impl MarkerSelector {
    /// Select types for which `predicate` holds
    pub fn new(predicate: impl Fn(&MarkerCandidate<'_>) -> bool + Send + Sync + 'static) -> Self {
        Self {
            predicate: Box::new(predicate),
        }
    }

    /// Select types carrying the attribute `name`
    pub fn with_attribute(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(move |candidate| candidate.has_attribute(&name))
    }

    /// Select types implementing `interface`
    pub fn implementing(interface: impl Into<String>) -> Self {
        let interface = interface.into();
        Self::new(move |candidate| candidate.implements(&interface))
    }

    /// Select types matching either selector
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self::new(move |candidate| (self.predicate)(candidate) || (other.predicate)(candidate))
    }
}

impl EntryPointSelector for MarkerSelector {
    fn select_roots(&self, universe: &dyn TypeUniverse) -> Result<Vec<TypeRef>> {
        let mut roots = Vec::new();
        for type_ref in universe.list_types()? {
            let Some(header) = universe.type_header(&type_ref)? else {
                continue;
            };
            if header.kind == TypeKind::GenericParameter || !universe.is_public(&type_ref)? {
                continue;
            }

            let attributes = universe.list_attributes(&type_ref)?;
            let interfaces = interface_closure(universe, &type_ref)?;
            let candidate = MarkerCandidate {
                type_ref:   &type_ref,
                attributes: &attributes,
                interfaces: &interfaces,
            };
            if (self.predicate)(&candidate) {
                debug!(type_ref = %type_ref, "Selected entry point");
                roots.push(type_ref);
            }
        }
        Ok(roots)
    }
}

/// A fixed list of roots
impl EntryPointSelector for Vec<TypeRef> {
    fn select_roots(&self, _universe: &dyn TypeUniverse) -> Result<Vec<TypeRef>> {
        Ok(self.to_vec())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, reason = "tests fail loudly on bad fixtures")]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::universe::JsonUniverse;

    fn universe() -> JsonUniverse {
        JsonUniverse::from_value(json!({
            "types": {
                "Acme.IMessage": { "kind": "interface" },
                "Acme.ICommand": { "kind": "interface", "interfaces": ["Acme.IMessage"] },
                "Acme.Order": {
                    "kind": "class",
                    "attributes": [{ "type": "Acme.Serialization.GenerateCodecAttribute" }]
                },
                "Acme.PlaceOrder": { "kind": "class", "interfaces": ["Acme.ICommand"] },
                "Acme.Hidden": {
                    "kind": "class",
                    "isPublic": false,
                    "interfaces": ["Acme.IMessage"]
                },
                "Acme.Envelope": {
                    "kind": "class",
                    "interfaces": ["Acme.IHandler<Acme.Order>"]
                },
                "Acme.IHandler<Acme.Order>": { "kind": "interface" },
                "Acme.Plain": { "kind": "class" }
            }
        }))
        .unwrap()
    }

    fn selected(selector: &MarkerSelector) -> Vec<String> {
        selector
            .select_roots(&universe())
            .unwrap()
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_attribute_markers_match_short_names() {
        for name in [
            "GenerateCodec",
            "GenerateCodecAttribute",
            "Acme.Serialization.GenerateCodecAttribute",
        ] {
            assert_eq!(selected(&MarkerSelector::with_attribute(name)), vec!["Acme.Order"]);
        }
    }

    #[test]
    fn test_interface_markers_follow_the_closure() {
        assert_eq!(
            selected(&MarkerSelector::implementing("Acme.IMessage")),
            vec!["Acme.ICommand", "Acme.PlaceOrder"]
        );
        assert_eq!(
            selected(&MarkerSelector::implementing("Acme.IHandler")),
            vec!["Acme.Envelope"]
        );
    }

    #[test]
    fn test_combined_selectors() {
        let selector = MarkerSelector::with_attribute("GenerateCodec")
            .or(MarkerSelector::implementing("Acme.ICommand"));
        assert_eq!(selected(&selector), vec!["Acme.Order", "Acme.PlaceOrder"]);
    }

    #[test]
    fn test_fixed_roots() {
        let roots = vec![TypeRef::from("Acme.Plain")];
        assert_eq!(roots.select_roots(&universe()).unwrap(), roots);
    }
}
