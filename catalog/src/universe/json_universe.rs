//! Type universe backed by a JSON document
//!
//! ```json
//! {
//!   "types": {
//!     "Acme.Order": {
//!       "kind": "class",
//!       "members": [{ "name": "Items", "kind": "property", "type": "System.Collections.Generic.List<Acme.LineItem>" }]
//!     }
//!   },
//!   "genericDefinitions": {
//!     "Acme.Box<T>": { "kind": "class", "members": [{ "name": "Value", "kind": "property", "type": "T" }] }
//!   }
//! }
//! ```
//!
//! Closed instantiations of a generic definition are materialized on demand by
//! substituting its parameters through every type reference of the entry.
//! Arrays and known scalars are described without entries.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use error_stack::ResultExt;
use indexmap::IndexMap;
use serde::Deserialize;
use tracing::debug;

use super::{
    AttributeInfo, ConstructorInfo, EnumInfo, MemberInfo, ParameterInfo, TypeHeader, TypeKind,
    TypeUniverse,
};
use crate::constants::ROOT_BASE_TYPES;
use crate::error::{Error, Result};
use crate::shape::PrimitiveKind;
use crate::type_ref::TypeRef;
use crate::type_syntax::TypeSyntax;

/// Framework types every universe can rely on
const PRELUDE: &str = include_str!("prelude.json");

const fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UniverseDocument {
    #[serde(default)]
    types:               IndexMap<TypeRef, TypeEntry>,
    #[serde(default)]
    generic_definitions: IndexMap<String, TypeEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TypeEntry {
    kind:         TypeKind,
    #[serde(default = "default_true")]
    is_public:    bool,
    #[serde(default)]
    is_abstract:  bool,
    #[serde(default)]
    base_type:    Option<TypeRef>,
    #[serde(default)]
    interfaces:   Vec<TypeRef>,
    #[serde(default)]
    members:      Vec<MemberInfo>,
    #[serde(default)]
    constructors: Vec<ConstructorInfo>,
    #[serde(default)]
    attributes:   Vec<AttributeInfo>,
    #[serde(default, rename = "enum")]
    enum_info:    Option<EnumInfo>,
}

type Bindings = HashMap<String, TypeSyntax>;

fn close(type_ref: &TypeRef, bindings: &Bindings) -> TypeRef {
    type_ref.syntax().map_or_else(
        |_| type_ref.clone(),
        |syntax| TypeRef::from(&syntax.substitute(bindings)),
    )
}

fn close_parameters(parameters: &[ParameterInfo], bindings: &Bindings) -> Vec<ParameterInfo> {
    parameters
        .iter()
        .map(|parameter| ParameterInfo {
            type_ref: close(&parameter.type_ref, bindings),
            ..parameter.clone()
        })
        .collect()
}

fn close_attributes(attributes: &[AttributeInfo], bindings: &Bindings) -> Vec<AttributeInfo> {
    attributes
        .iter()
        .map(|attribute| AttributeInfo {
            type_ref: close(&attribute.type_ref, bindings),
            ..attribute.clone()
        })
        .collect()
}

impl TypeEntry {
    /// Copy of this entry with generic parameters replaced through `bindings`
    fn close(&self, bindings: &Bindings) -> Self {
        Self {
            kind:         self.kind,
            is_public:    self.is_public,
            is_abstract:  self.is_abstract,
            base_type:    self.base_type.as_ref().map(|base| close(base, bindings)),
            interfaces:   self
                .interfaces
                .iter()
                .map(|interface| close(interface, bindings))
                .collect(),
            members:      self
                .members
                .iter()
                .map(|member| MemberInfo {
                    type_ref: close(&member.type_ref, bindings),
                    parameters: close_parameters(&member.parameters, bindings),
                    attributes: close_attributes(&member.attributes, bindings),
                    ..member.clone()
                })
                .collect(),
            constructors: self
                .constructors
                .iter()
                .map(|constructor| ConstructorInfo {
                    parameters: close_parameters(&constructor.parameters, bindings),
                    attributes: close_attributes(&constructor.attributes, bindings),
                    ..constructor.clone()
                })
                .collect(),
            attributes:   close_attributes(&self.attributes, bindings),
            enum_info:    self.enum_info.clone(),
        }
    }
}

#[derive(Debug, Clone)]
struct GenericDefinition {
    parameters: Vec<String>,
    entry:      TypeEntry,
}

/// A [`TypeUniverse`] read from a JSON document
#[derive(Debug, Clone, Default)]
pub struct JsonUniverse {
    types:       IndexMap<TypeRef, TypeEntry>,
    /// Keyed by definition path and arity
    definitions: HashMap<(String, usize), GenericDefinition>,
    /// Parameter names declared by any definition
    parameter_names: HashSet<String>,
}

impl JsonUniverse {
    /// Parse a universe document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let document: UniverseDocument = serde_json::from_str(json)
            .change_context(Error::UniverseLoad("malformed universe document".to_string()))?;
        Self::from_document(document)
    }

    /// Build a universe from an already-parsed JSON value
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let document: UniverseDocument = serde_json::from_value(value)
            .change_context(Error::UniverseLoad("malformed universe document".to_string()))?;
        Self::from_document(document)
    }

    /// Read a universe document from disk
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::io_failed("read universe", path, e))?;
        Self::from_json_str(&json).attach(format!("Universe file: {}", path.display()))
    }

    /// The bundled framework prelude on its own
    pub fn prelude() -> Result<Self> {
        Self::from_json_str(PRELUDE).attach("Bundled prelude")
    }

    /// Layer this universe over the bundled prelude; entries here win
    pub fn with_prelude(self) -> Result<Self> {
        let mut universe = Self::prelude()?;
        universe.merge(self);
        Ok(universe)
    }

    /// Add every entry of `other`, replacing entries with the same name
    pub fn merge(&mut self, other: Self) {
        self.types.extend(other.types);
        self.definitions.extend(other.definitions);
        self.parameter_names.extend(other.parameter_names);
    }

    fn from_document(document: UniverseDocument) -> Result<Self> {
        let mut definitions = HashMap::new();
        let mut parameter_names = HashSet::new();
        for (open_form, entry) in document.generic_definitions {
            let syntax = TypeSyntax::parse(&open_form)
                .change_context(Error::UniverseLoad(format!(
                    "invalid generic definition '{open_form}'"
                )))?;
            if syntax.arguments.is_empty()
                || syntax.is_array()
                || !syntax.arguments.iter().all(|parameter| {
                    parameter.is_bare_identifier()
                        && PrimitiveKind::from_type_name(&parameter.path).is_none()
                })
            {
                return Err(Error::UniverseLoad(format!(
                    "generic definition '{open_form}' must list bare parameter names"
                ))
                .into());
            }
            let parameters: Vec<String> =
                syntax.arguments.iter().map(|p| p.path.clone()).collect();
            parameter_names.extend(parameters.iter().cloned());
            definitions.insert(
                (syntax.path, syntax.arguments.len()),
                GenericDefinition { parameters, entry },
            );
        }

        debug!(
            "Loaded type universe: {} types, {} generic definitions",
            document.types.len(),
            definitions.len()
        );

        Ok(Self {
            types: document.types,
            definitions,
            parameter_names,
        })
    }

    /// Entry for `type_ref`, materializing generic instantiations
    fn entry(&self, type_ref: &TypeRef) -> Option<Cow<'_, TypeEntry>> {
        if let Some(entry) = self.types.get(type_ref) {
            return Some(Cow::Borrowed(entry));
        }

        let syntax = type_ref.syntax().ok()?;
        if syntax.is_array() || syntax.arguments.is_empty() {
            return None;
        }
        let definition = self
            .definitions
            .get(&(syntax.path.clone(), syntax.arguments.len()))?;
        let bindings: Bindings = definition
            .parameters
            .iter()
            .cloned()
            .zip(syntax.arguments)
            .collect();
        Some(Cow::Owned(definition.entry.close(&bindings)))
    }
}

impl TypeUniverse for JsonUniverse {
    fn type_header(&self, type_ref: &TypeRef) -> Result<Option<TypeHeader>> {
        if let Some(entry) = self.entry(type_ref) {
            return Ok(Some(TypeHeader {
                kind:        entry.kind,
                is_abstract: entry.is_abstract,
            }));
        }
        if let Some(kind) = PrimitiveKind::from_type_name(type_ref.as_str()) {
            let declared = if kind == PrimitiveKind::String {
                TypeKind::Class
            } else {
                TypeKind::Struct
            };
            return Ok(Some(TypeHeader::of(declared)));
        }
        let Ok(syntax) = type_ref.syntax() else {
            return Ok(None);
        };
        if syntax.is_array() {
            return Ok(Some(TypeHeader::of(TypeKind::Array)));
        }
        if syntax.is_bare_identifier() && self.parameter_names.contains(&syntax.path) {
            return Ok(Some(TypeHeader::of(TypeKind::GenericParameter)));
        }
        Ok(None)
    }

    fn list_members(&self, type_ref: &TypeRef) -> Result<Vec<MemberInfo>> {
        Ok(self
            .entry(type_ref)
            .map(|entry| entry.members.clone())
            .unwrap_or_default())
    }

    fn list_interfaces(&self, type_ref: &TypeRef) -> Result<Vec<TypeRef>> {
        Ok(self
            .entry(type_ref)
            .map(|entry| entry.interfaces.clone())
            .unwrap_or_default())
    }

    fn list_base_types(&self, type_ref: &TypeRef) -> Result<Vec<TypeRef>> {
        let mut chain = Vec::new();
        let mut seen = HashSet::from([type_ref.clone()]);
        let mut current = self
            .entry(type_ref)
            .and_then(|entry| entry.base_type.clone());

        while let Some(base) = current {
            if ROOT_BASE_TYPES.contains(&base.as_str()) {
                break;
            }
            if !seen.insert(base.clone()) {
                return Err(Error::query_failed(
                    "list base types",
                    type_ref.as_str(),
                    format!("inheritance cycle through '{base}'"),
                )
                .into());
            }
            current = self.entry(&base).and_then(|entry| entry.base_type.clone());
            chain.push(base);
        }

        Ok(chain)
    }

    fn is_public(&self, type_ref: &TypeRef) -> Result<bool> {
        if let Some(entry) = self.entry(type_ref) {
            return Ok(entry.is_public);
        }
        if PrimitiveKind::from_type_name(type_ref.as_str()).is_some() {
            return Ok(true);
        }
        match type_ref.syntax().ok().and_then(|syntax| syntax.array_element()) {
            Some((element, _)) => self.is_public(&TypeRef::from(&element)),
            None => Ok(false),
        }
    }

    fn is_enum(&self, type_ref: &TypeRef) -> Result<Option<EnumInfo>> {
        Ok(self
            .entry(type_ref)
            .filter(|entry| entry.kind == TypeKind::Enum)
            .map(|entry| entry.enum_info.clone().unwrap_or_default()))
    }

    fn list_constructors(&self, type_ref: &TypeRef) -> Result<Vec<ConstructorInfo>> {
        Ok(self
            .entry(type_ref)
            .map(|entry| entry.constructors.clone())
            .unwrap_or_default())
    }

    fn list_attributes(&self, type_ref: &TypeRef) -> Result<Vec<AttributeInfo>> {
        Ok(self
            .entry(type_ref)
            .map(|entry| entry.attributes.clone())
            .unwrap_or_default())
    }

    fn list_types(&self) -> Result<Vec<TypeRef>> {
        Ok(self.types.keys().cloned().collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, reason = "tests fail loudly on bad fixtures")]
mod tests {
    use std::io::Write;

    use serde_json::json;

    use super::*;
    use crate::error::Error;

    #[test]
    fn test_generic_definition_is_closed_on_demand() {
        let universe = JsonUniverse::from_value(json!({
            "genericDefinitions": {
                "Acme.Box<T>": {
                    "kind": "class",
                    "interfaces": ["Acme.IHolder<T>"],
                    "members": [{ "name": "Items", "kind": "property", "type": "T[]" }],
                    "constructors": [{ "parameters": [{ "name": "value", "type": "T" }] }]
                }
            }
        }))
        .unwrap();

        let closed = TypeRef::from("Acme.Box<Acme.Item>");
        let members = universe.list_members(&closed).unwrap();
        assert_eq!(members[0].type_ref, TypeRef::from("Acme.Item[]"));
        assert_eq!(
            universe.list_interfaces(&closed).unwrap(),
            vec![TypeRef::from("Acme.IHolder<Acme.Item>")]
        );
        let constructors = universe.list_constructors(&closed).unwrap();
        assert_eq!(constructors[0].parameters[0].type_ref, TypeRef::from("Acme.Item"));
        assert_eq!(
            universe.type_header(&closed).unwrap(),
            Some(TypeHeader::of(TypeKind::Class))
        );
    }

    #[test]
    fn test_implicit_headers() {
        let universe = JsonUniverse::default();
        assert_eq!(
            universe.type_header(&TypeRef::from("int")).unwrap(),
            Some(TypeHeader::of(TypeKind::Struct))
        );
        assert_eq!(
            universe.type_header(&TypeRef::from("int[,]")).unwrap(),
            Some(TypeHeader::of(TypeKind::Array))
        );
        assert_eq!(universe.type_header(&TypeRef::from("Acme.Missing")).unwrap(), None);
        assert!(universe.is_public(&TypeRef::from("string[]")).unwrap());
        assert!(!universe.is_public(&TypeRef::from("Acme.Missing[]")).unwrap());
    }

    #[test]
    fn test_only_declared_parameters_are_generic_parameters() {
        let bare = JsonUniverse::default();
        assert_eq!(bare.type_header(&TypeRef::from("T")).unwrap(), None);

        let universe = JsonUniverse::from_value(json!({
            "genericDefinitions": {
                "Acme.Pair<TLeft, TRight>": { "kind": "struct" }
            }
        }))
        .unwrap();
        for parameter in ["TLeft", "TRight"] {
            assert_eq!(
                universe.type_header(&TypeRef::from(parameter)).unwrap(),
                Some(TypeHeader::of(TypeKind::GenericParameter))
            );
        }
        for unbound in ["void", "Widget", "T"] {
            assert_eq!(universe.type_header(&TypeRef::from(unbound)).unwrap(), None);
        }

        let mut merged = bare;
        merged.merge(universe);
        assert_eq!(
            merged.type_header(&TypeRef::from("TLeft")).unwrap(),
            Some(TypeHeader::of(TypeKind::GenericParameter))
        );
    }

    #[test]
    fn test_base_chain_stops_at_root_and_rejects_cycles() {
        let universe = JsonUniverse::from_value(json!({
            "types": {
                "Acme.A": { "kind": "class", "baseType": "Acme.B" },
                "Acme.B": { "kind": "class", "baseType": "System.Object" },
                "Acme.X": { "kind": "class", "baseType": "Acme.Y" },
                "Acme.Y": { "kind": "class", "baseType": "Acme.X" }
            }
        }))
        .unwrap();

        assert_eq!(
            universe.list_base_types(&TypeRef::from("Acme.A")).unwrap(),
            vec![TypeRef::from("Acme.B")]
        );
        let error = universe
            .list_base_types(&TypeRef::from("Acme.X"))
            .unwrap_err();
        assert!(matches!(error.current_context(), Error::UniverseQuery(_)));
    }

    #[test]
    fn test_prelude_describes_framework_collections() {
        let universe = JsonUniverse::prelude().unwrap();
        let list = TypeRef::from("System.Collections.Generic.List<Acme.Item>");
        assert!(
            universe
                .list_interfaces(&list)
                .unwrap()
                .contains(&TypeRef::from("System.Collections.Generic.IList<Acme.Item>"))
        );
        assert!(universe.type_header(&TypeRef::from("System.Threading.Tasks.Task")).unwrap().is_some());
    }

    #[test]
    fn test_local_entries_override_prelude() {
        let universe = JsonUniverse::from_value(json!({
            "genericDefinitions": {
                "System.Collections.Generic.List<T>": { "kind": "class", "isPublic": false }
            }
        }))
        .unwrap()
        .with_prelude()
        .unwrap();
        assert!(
            !universe
                .is_public(&TypeRef::from("System.Collections.Generic.List<int>"))
                .unwrap()
        );
    }

    #[test]
    fn test_load_errors() {
        let error = JsonUniverse::from_json_str("{ \"types\": 3 }").unwrap_err();
        assert!(matches!(error.current_context(), Error::UniverseLoad(_)));

        for closed in ["Acme.Box<int>", "Acme.Box<string>", "Acme.Pair<TKey, decimal>"] {
            let mut definitions = serde_json::Map::new();
            definitions.insert(closed.to_string(), json!({ "kind": "class" }));
            let error = JsonUniverse::from_value(json!({ "genericDefinitions": definitions }))
                .unwrap_err();
            assert!(matches!(error.current_context(), Error::UniverseLoad(_)), "{closed}");
        }
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "types": {{ "Acme.Order": {{ "kind": "class" }} }} }}"#).unwrap();

        let universe = JsonUniverse::from_file(file.path()).unwrap();
        assert_eq!(universe.list_types().unwrap(), vec![TypeRef::from("Acme.Order")]);

        let missing = JsonUniverse::from_file(Path::new("/nonexistent/universe.json")).unwrap_err();
        assert!(matches!(missing.current_context(), Error::FileOperation(_)));
    }
}
