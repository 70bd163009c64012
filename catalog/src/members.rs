//! Member collection with interface qualification
//!
//! A type's member list holds its own declared members first, then the members
//! of every public interface in its closure. Interface members keep their plain
//! name only when the collecting type is itself an interface and the name is
//! still free; everywhere else they are qualified by the declaring interface,
//! e.g. `Acme.IHasValue.Value`, the way explicit implementations are named.

use indexmap::IndexMap;
use itertools::Itertools;
use serde::Serialize;
use tracing::trace;

use crate::config::DiscoveryConfig;
use crate::error::Result;
use crate::shape::{ShapeClassification, TypeShapeClassifier};
use crate::type_ref::TypeRef;
use crate::universe::{
    AttributeInfo, MemberInfo, MemberKind, ParameterInfo, TypeKind, TypeUniverse,
    interface_closure,
};

/// One member of a composite descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDescriptor {
    /// Unique name within the owning descriptor, possibly qualified
    pub name:               String,
    /// Name as declared
    pub member_name:        String,
    /// Type that declares the member
    pub declaring_type:     TypeRef,
    /// Property or field type, or method return type
    #[serde(rename = "type")]
    pub type_ref:           TypeRef,
    /// Member kind
    pub kind:               MemberKind,
    /// Always false for collected members
    pub is_static:          bool,
    /// Has a public getter
    pub readable:           bool,
    /// Has a public setter
    pub writable:           bool,
    /// Setter is init-only
    pub init_only:          bool,
    /// Must be set during construction
    pub required:           bool,
    /// Method parameters
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters:         Vec<ParameterInfo>,
    /// Attributes applied to the member
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes:         Vec<AttributeInfo>,
    /// Collected from an interface under its qualified name
    pub explicit_interface: bool,
    /// Shape of `type_ref`, absent when it cannot be described
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape:              Option<ShapeClassification>,
}

/// Collects the member list of a type
pub struct MemberCollector<'a> {
    universe:   &'a dyn TypeUniverse,
    config:     &'a DiscoveryConfig,
    classifier: TypeShapeClassifier<'a>,
}

impl<'a> MemberCollector<'a> {
    /// Create a collector over `universe`
    pub const fn new(universe: &'a dyn TypeUniverse, config: &'a DiscoveryConfig) -> Self {
        Self {
            universe,
            config,
            classifier: TypeShapeClassifier::new(universe, config),
        }
    }

    /// Members of `type_ref` in collection order, names unique
    pub fn collect(&self, type_ref: &TypeRef) -> Result<Vec<MemberDescriptor>> {
        let is_interface = self
            .universe
            .type_header(type_ref)?
            .is_some_and(|header| header.kind == TypeKind::Interface);
        let include_methods = is_interface && self.config.include_interface_methods;

        let mut members: IndexMap<String, MemberDescriptor> = IndexMap::new();

        for member in self.universe.list_members(type_ref)? {
            if Self::is_collectable(&member, include_methods) {
                let name = member.name.clone();
                self.insert(&mut members, name, type_ref, member, false)?;
            }
        }

        for implemented in interface_closure(self.universe, type_ref)? {
            let interface = implemented.interface;
            if !self.universe.is_public(&interface)? {
                continue;
            }
            for member in self.universe.list_members(&interface)? {
                if !Self::is_collectable(&member, include_methods) {
                    continue;
                }
                let plain = is_interface && !members.contains_key(&member.name);
                let name = if plain {
                    member.name.clone()
                } else {
                    interface.qualify_member(&member.name)
                };
                self.insert(&mut members, name, &interface, member, !plain)?;
            }
        }

        Ok(members.into_values().collect())
    }

    fn is_collectable(member: &MemberInfo, include_methods: bool) -> bool {
        if !member.is_public || member.is_static {
            return false;
        }
        match member.kind {
            MemberKind::Property | MemberKind::Field => true,
            MemberKind::Method => include_methods,
            MemberKind::Indexer => false,
        }
    }

    fn insert(
        &self,
        members: &mut IndexMap<String, MemberDescriptor>,
        name: String,
        declaring_type: &TypeRef,
        member: MemberInfo,
        explicit_interface: bool,
    ) -> Result<()> {
        // overloads that collide on name are told apart by their parameter list
        let name = if members.contains_key(&name) && member.kind == MemberKind::Method {
            format!(
                "{name}({})",
                member.parameters.iter().map(|p| &p.type_ref).join(", ")
            )
        } else {
            name
        };
        if members.contains_key(&name) {
            trace!(member = %name, declaring_type = %declaring_type, "Member name already taken");
            return Ok(());
        }

        let shape = self.classifier.classify(&member.type_ref)?;
        members.insert(
            name.clone(),
            MemberDescriptor {
                name,
                member_name: member.name,
                declaring_type: declaring_type.clone(),
                type_ref: member.type_ref,
                kind: member.kind,
                is_static: member.is_static,
                readable: member.readable,
                writable: member.writable,
                init_only: member.init_only,
                required: member.required,
                parameters: member.parameters,
                attributes: member.attributes,
                explicit_interface,
                shape,
            },
        );
        Ok(())
    }
}
