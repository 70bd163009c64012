//! Static descriptors produced by discovery
//!
//! Descriptors are immutable once built and are what emitters consume.

use serde::Serialize;

use crate::members::MemberDescriptor;
use crate::shape::{PrimitiveKind, ShapeClassification};
use crate::type_ref::TypeRef;
use crate::universe::{
    AttributeInfo, ConstructorInfo, EnumValue, ImplementedInterface, ParameterInfo, TypeHeader,
    TypeKind,
};

/// How generated code can obtain an instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ConstructionStrategy {
    /// A public parameterless constructor exists
    Parameterless,
    /// Parameterless, but required members must be set afterwards
    ParameterlessWithRequiredMembers,
    /// Only constructors taking arguments are public
    Parameterized,
    /// Interfaces, abstract or open types, or no public constructor
    NotConstructible,
}

impl ConstructionStrategy {
    /// Whether an instance can be created without arguments
    pub const fn is_default_constructible(self) -> bool {
        matches!(
            self,
            Self::Parameterless | Self::ParameterlessWithRequiredMembers
        )
    }

    /// Strategy for a type with the given header, public constructors, and members
    ///
    /// `declared_constructors` counts every declared constructor, public or
    /// not; a class declaring none gets the implicit parameterless one, and a
    /// struct always has it.
    pub fn determine(
        header: TypeHeader,
        is_closed: bool,
        declared_constructors: usize,
        public_constructors: &[ConstructorDescriptor],
        members: &[MemberDescriptor],
    ) -> Self {
        let instantiable = matches!(header.kind, TypeKind::Class | TypeKind::Struct);
        if !instantiable || header.is_abstract || !is_closed {
            return Self::NotConstructible;
        }

        let parameterless = header.kind == TypeKind::Struct
            || declared_constructors == 0
            || public_constructors
                .iter()
                .any(|constructor| constructor.parameters.iter().all(|p| p.is_optional));

        if parameterless {
            if members.iter().any(|member| member.required) {
                Self::ParameterlessWithRequiredMembers
            } else {
                Self::Parameterless
            }
        } else if public_constructors.is_empty() {
            Self::NotConstructible
        } else {
            Self::Parameterized
        }
    }
}

/// A public constructor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstructorDescriptor {
    /// Parameters in declaration order
    pub parameters: Vec<ParameterInfo>,
    /// Attributes applied to the constructor
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<AttributeInfo>,
}

impl From<ConstructorInfo> for ConstructorDescriptor {
    fn from(info: ConstructorInfo) -> Self {
        Self {
            parameters: info.parameters,
            attributes: info.attributes,
        }
    }
}

/// Everything generated code needs to know about one composite type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeDescriptor {
    /// Described type
    #[serde(rename = "type")]
    pub type_ref:          TypeRef,
    /// Declared kind
    pub kind:              TypeKind,
    /// `Composite`, or the container shape for registered containers
    pub shape:             ShapeClassification,
    /// Abstract classes cannot be constructed directly
    pub is_abstract:       bool,
    /// Members in collection order; names are unique
    pub members:           Vec<MemberDescriptor>,
    /// Public constructors in declaration order
    pub constructors:      Vec<ConstructorDescriptor>,
    /// How an instance can be created
    pub construction:      ConstructionStrategy,
    /// Base types, nearest first
    pub base_types:        Vec<TypeRef>,
    /// Interface closure in breadth-first order
    pub interfaces:        Vec<ImplementedInterface>,
    /// Attributes applied to the type
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes:        Vec<AttributeInfo>,
    /// Resolved generic arguments
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub generic_arguments: Vec<TypeRef>,
}

impl CompositeDescriptor {
    /// Look up a member by its (possibly qualified) name
    pub fn member(&self, name: &str) -> Option<&MemberDescriptor> {
        self.members.iter().find(|member| member.name == name)
    }

    /// Every type this descriptor points at that a codec must be able to handle
    ///
    /// Member and method parameter types, constructor parameter types, base
    /// types, and generic arguments. Interfaces are listed for reference only
    /// and are not included.
    pub fn referenced_types(&self) -> Vec<&TypeRef> {
        let member_types = self.members.iter().flat_map(|member| {
            std::iter::once(&member.type_ref)
                .chain(member.parameters.iter().map(|parameter| &parameter.type_ref))
        });
        let constructor_types = self
            .constructors
            .iter()
            .flat_map(|constructor| constructor.parameters.iter().map(|p| &p.type_ref));

        member_types
            .chain(constructor_types)
            .chain(&self.base_types)
            .chain(&self.generic_arguments)
            .collect()
    }
}

/// Lightweight descriptor for an enum
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumDescriptor {
    /// Described enum
    #[serde(rename = "type")]
    pub type_ref:   TypeRef,
    /// Integral kind backing the enum
    pub underlying: PrimitiveKind,
    /// Values combine as bit flags
    pub is_flags:   bool,
    /// Named values in declaration order
    pub values:     Vec<EnumValue>,
    /// Attributes applied to the enum
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<AttributeInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constructor(parameters: &[(&str, &str, bool)]) -> ConstructorDescriptor {
        ConstructorDescriptor {
            parameters: parameters
                .iter()
                .map(|(name, type_name, is_optional)| ParameterInfo {
                    name:        (*name).to_string(),
                    type_ref:    TypeRef::from(*type_name),
                    is_optional: *is_optional,
                })
                .collect(),
            attributes: Vec::new(),
        }
    }

    #[test]
    fn test_construction_strategy() {
        let class = TypeHeader::of(TypeKind::Class);

        assert_eq!(
            ConstructionStrategy::determine(class, true, 0, &[], &[]),
            ConstructionStrategy::Parameterless
        );
        assert_eq!(
            ConstructionStrategy::determine(class, true, 1, &[constructor(&[("id", "int", false)])], &[]),
            ConstructionStrategy::Parameterized
        );
        assert_eq!(
            ConstructionStrategy::determine(class, true, 1, &[constructor(&[("id", "int", true)])], &[]),
            ConstructionStrategy::Parameterless
        );
        assert_eq!(
            ConstructionStrategy::determine(class, true, 1, &[], &[]),
            ConstructionStrategy::NotConstructible
        );
        assert_eq!(
            ConstructionStrategy::determine(class, false, 0, &[], &[]),
            ConstructionStrategy::NotConstructible
        );

        let structure = TypeHeader::of(TypeKind::Struct);
        assert_eq!(
            ConstructionStrategy::determine(structure, true, 1, &[constructor(&[("x", "int", false)])], &[]),
            ConstructionStrategy::Parameterless
        );

        let abstract_class = TypeHeader {
            kind:        TypeKind::Class,
            is_abstract: true,
        };
        assert_eq!(
            ConstructionStrategy::determine(abstract_class, true, 0, &[], &[]),
            ConstructionStrategy::NotConstructible
        );
        assert_eq!(
            ConstructionStrategy::determine(TypeHeader::of(TypeKind::Interface), true, 0, &[], &[]),
            ConstructionStrategy::NotConstructible
        );
        assert!(ConstructionStrategy::ParameterlessWithRequiredMembers.is_default_constructible());
        assert!(!ConstructionStrategy::Parameterized.is_default_constructible());
    }
}
