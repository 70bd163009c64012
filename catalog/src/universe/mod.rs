//! Query interface over the analyzed program's type universe
//!
//! The engine never inspects a program directly. Everything it knows about a
//! type comes through [`TypeUniverse`], which the host implements over whatever
//! symbol model it has. [`JsonUniverse`] is the implementation backed by a JSON
//! document.

mod json_universe;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::Display;

pub use self::json_universe::JsonUniverse;
use crate::error::Result;
use crate::shape::PrimitiveKind;
use crate::type_ref::TypeRef;

/// Declared kind of a type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum TypeKind {
    /// Reference type
    Class,
    /// Value type
    Struct,
    /// Interface
    Interface,
    /// Enumeration
    Enum,
    /// Single or multi-dimensional array
    Array,
    /// Unbound generic parameter such as `T`
    GenericParameter,
}

/// Header facts about a type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeHeader {
    /// Declared kind
    pub kind:        TypeKind,
    /// Abstract classes cannot be constructed directly
    pub is_abstract: bool,
}

impl TypeHeader {
    /// Header for a concrete type of `kind`
    pub const fn of(kind: TypeKind) -> Self {
        Self {
            kind,
            is_abstract: false,
        }
    }
}

/// Kind of a declared member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum MemberKind {
    /// Property with accessors
    Property,
    /// Field
    Field,
    /// Ordinary method
    Method,
    /// Indexed property, never collected
    Indexer,
}

const fn default_true() -> bool {
    true
}

/// A parameter of a method or constructor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterInfo {
    /// Parameter name
    pub name:        String,
    /// Declared parameter type
    #[serde(rename = "type")]
    pub type_ref:    TypeRef,
    /// Whether the parameter has a default value
    #[serde(default)]
    pub is_optional: bool,
}

/// An attribute applied to a type, member, or constructor
///
/// Argument values are opaque to the engine and pass through as supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeInfo {
    /// Attribute type
    #[serde(rename = "type")]
    pub type_ref:        TypeRef,
    /// Positional constructor arguments
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments:       Vec<serde_json::Value>,
    /// Named arguments in declaration order
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub named_arguments: IndexMap<String, serde_json::Value>,
}

/// A declared member as the host reports it
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberInfo {
    /// Member name
    pub name:        String,
    /// Member kind
    pub kind:        MemberKind,
    /// Property or field type, or method return type
    #[serde(rename = "type")]
    pub type_ref:    TypeRef,
    /// Static members belong to the type, not its instances
    #[serde(default)]
    pub is_static:   bool,
    /// Public accessibility
    #[serde(default = "default_true")]
    pub is_public:   bool,
    /// Has a public getter (always true for fields)
    #[serde(default = "default_true")]
    pub readable:    bool,
    /// Has a public setter, or is a non-readonly field
    #[serde(default = "default_true")]
    pub writable:    bool,
    /// Setter is init-only
    #[serde(default)]
    pub init_only:   bool,
    /// Must be set during construction
    #[serde(default)]
    pub required:    bool,
    /// Method parameters in declaration order
    #[serde(default)]
    pub parameters:  Vec<ParameterInfo>,
    /// Attributes applied to the member
    #[serde(default)]
    pub attributes:  Vec<AttributeInfo>,
}

/// A declared constructor
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstructorInfo {
    /// Parameters in declaration order
    #[serde(default)]
    pub parameters: Vec<ParameterInfo>,
    /// Public accessibility
    #[serde(default = "default_true")]
    pub is_public:  bool,
    /// Attributes applied to the constructor
    #[serde(default)]
    pub attributes: Vec<AttributeInfo>,
}

/// A named enum value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumValue {
    /// Value name
    pub name:  String,
    /// Underlying numeric value
    pub value: serde_json::Number,
}

/// Enum facts for types that are enums
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnumInfo {
    /// Integral kind backing the enum
    pub underlying: PrimitiveKind,
    /// Values combine as bit flags
    pub is_flags:   bool,
    /// Named values in declaration order
    pub values:     Vec<EnumValue>,
}

impl Default for EnumInfo {
    fn default() -> Self {
        Self {
            underlying: PrimitiveKind::Int32,
            is_flags:   false,
            values:     Vec::new(),
        }
    }
}

/// One entry of an interface closure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImplementedInterface {
    /// Closed interface type
    pub interface: TypeRef,
    /// Declared by the type itself rather than inherited
    pub direct:    bool,
}

/// Read-only queries over the analyzed program
///
/// Every query returns `Result`; an `Err` means the universe itself is
/// unavailable or corrupted and aborts discovery. A type the universe simply
/// does not know is not an error: `type_header` answers `None` for it.
pub trait TypeUniverse {
    /// Kind and abstractness of `type_ref`, `None` when it cannot be described
    fn type_header(&self, type_ref: &TypeRef) -> Result<Option<TypeHeader>>;

    /// Members declared by `type_ref` itself, in declaration order
    fn list_members(&self, type_ref: &TypeRef) -> Result<Vec<MemberInfo>>;

    /// Interfaces `type_ref` declares directly
    fn list_interfaces(&self, type_ref: &TypeRef) -> Result<Vec<TypeRef>>;

    /// Base types, nearest first
    fn list_base_types(&self, type_ref: &TypeRef) -> Result<Vec<TypeRef>>;

    /// Generic arguments of a closed or open constructed type
    fn resolve_generic_arguments(&self, type_ref: &TypeRef) -> Result<Vec<TypeRef>> {
        Ok(type_ref.name_arguments())
    }

    /// Whether the type is accessible to generated code
    fn is_public(&self, type_ref: &TypeRef) -> Result<bool>;

    /// Enum facts, `None` when `type_ref` is not an enum
    fn is_enum(&self, type_ref: &TypeRef) -> Result<Option<EnumInfo>>;

    /// Declared constructors
    fn list_constructors(&self, type_ref: &TypeRef) -> Result<Vec<ConstructorInfo>>;

    /// Attributes applied to the type
    fn list_attributes(&self, type_ref: &TypeRef) -> Result<Vec<AttributeInfo>>;

    /// Every closed type the universe declares, for entry-point selection
    fn list_types(&self) -> Result<Vec<TypeRef>>;
}

/// Transitive interface set of `type_ref`
///
/// Breadth-first: interfaces the type declares come first, then those of its
/// base types, then interfaces inherited from either. Each appears once and is
/// marked `direct` when the type declares it itself.
pub fn interface_closure(
    universe: &dyn TypeUniverse,
    type_ref: &TypeRef,
) -> Result<Vec<ImplementedInterface>> {
    let mut closure: IndexMap<TypeRef, bool> = IndexMap::new();
    let mut queue: Vec<TypeRef> = Vec::new();

    for interface in universe.list_interfaces(type_ref)? {
        if closure.insert(interface.clone(), true).is_none() {
            queue.push(interface);
        }
    }
    for base in universe.list_base_types(type_ref)? {
        for interface in universe.list_interfaces(&base)? {
            if !closure.contains_key(&interface) {
                closure.insert(interface.clone(), false);
                queue.push(interface);
            }
        }
    }

    let mut next = 0;
    while let Some(current) = queue.get(next).cloned() {
        next += 1;
        for inherited in universe.list_interfaces(&current)? {
            if inherited != *type_ref && !closure.contains_key(&inherited) {
                closure.insert(inherited.clone(), false);
                queue.push(inherited);
            }
        }
    }

    Ok(closure
        .into_iter()
        .map(|(interface, direct)| ImplementedInterface { interface, direct })
        .collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, reason = "tests fail loudly on bad fixtures")]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_interface_closure_order_and_direct_flags() {
        let universe = JsonUniverse::from_value(json!({
            "types": {
                "Acme.IRoot": { "kind": "interface" },
                "Acme.IChild": { "kind": "interface", "interfaces": ["Acme.IRoot"] },
                "Acme.IOther": { "kind": "interface" },
                "Acme.Base": { "kind": "class", "interfaces": ["Acme.IOther"] },
                "Acme.Derived": {
                    "kind": "class",
                    "baseType": "Acme.Base",
                    "interfaces": ["Acme.IChild"]
                }
            }
        }))
        .unwrap();

        let closure = interface_closure(&universe, &TypeRef::from("Acme.Derived")).unwrap();
        let names: Vec<_> = closure.iter().map(|i| i.interface.as_str()).collect();
        assert_eq!(names, vec!["Acme.IChild", "Acme.IOther", "Acme.IRoot"]);
        assert!(closure[0].direct);
        assert!(!closure[1].direct);
        assert!(!closure[2].direct);
    }

    #[test]
    fn test_member_info_defaults() {
        let member: MemberInfo = serde_json::from_value(json!({
            "name": "Sku",
            "kind": "property",
            "type": "string"
        }))
        .unwrap();
        assert!(member.is_public);
        assert!(member.readable && member.writable);
        assert!(!member.is_static && !member.required && !member.init_only);
        assert_eq!(member.type_ref, TypeRef::from("string"));
    }
}
