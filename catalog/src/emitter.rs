//! Descriptor emission
//!
//! Turning descriptors into target-language source belongs to the host.
//! [`ManifestEmitter`] writes the catalog as a JSON manifest that such a
//! generator can consume.

use error_stack::ResultExt;
use serde::Serialize;

use crate::descriptor::{CompositeDescriptor, EnumDescriptor};
use crate::error::{Error, Result};
use crate::type_ref::TypeRef;
use crate::walker::Catalog;

/// Consumes a finished catalog
pub trait DescriptorEmitter {
    /// What the emitter produces
    type Output;

    /// Emit every descriptor of `catalog`
    fn emit(&self, catalog: &Catalog) -> Result<Self::Output>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Manifest<'a> {
    roots:      &'a [TypeRef],
    composites: Vec<&'a CompositeDescriptor>,
    enums:      Vec<&'a EnumDescriptor>,
}

/// Renders a catalog as a JSON manifest, descriptors in registry order
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestEmitter {
    pretty: bool,
}

impl ManifestEmitter {
    /// Indented output
    pub const fn pretty() -> Self {
        Self { pretty: true }
    }

    /// Single-line output
    pub const fn compact() -> Self {
        Self { pretty: false }
    }
}

impl DescriptorEmitter for ManifestEmitter {
    type Output = String;

    fn emit(&self, catalog: &Catalog) -> Result<String> {
        let manifest = Manifest {
            roots:      &catalog.roots,
            composites: catalog.registry.composites().collect(),
            enums:      catalog.registry.enums().collect(),
        };

        let rendered = if self.pretty {
            serde_json::to_string_pretty(&manifest)
        } else {
            serde_json::to_string(&manifest)
        };
        rendered.change_context(Error::Serialization("Failed to render manifest".to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, reason = "tests fail loudly on bad fixtures")]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::config::DiscoveryConfig;
    use crate::universe::JsonUniverse;
    use crate::walker::discover;

    #[test]
    fn test_manifest_layout() {
        let universe = JsonUniverse::from_value(json!({
            "types": {
                "Acme.Status": { "kind": "enum", "enum": { "values": [{ "name": "Open", "value": 0 }] } },
                "Acme.Ticket": {
                    "kind": "class",
                    "members": [
                        { "name": "Title", "kind": "property", "type": "string" },
                        { "name": "Status", "kind": "property", "type": "Acme.Status" }
                    ]
                }
            }
        }))
        .unwrap();
        let catalog = discover(
            &universe,
            &DiscoveryConfig::default(),
            &[TypeRef::from("Acme.Ticket")],
        )
        .unwrap();

        let compact = ManifestEmitter::compact().emit(&catalog).unwrap();
        assert!(!compact.contains('\n'));
        let manifest: Value = serde_json::from_str(&compact).unwrap();

        assert_eq!(manifest["roots"], json!(["Acme.Ticket"]));
        assert_eq!(manifest["composites"][0]["type"], "Acme.Ticket");
        assert_eq!(manifest["composites"][0]["construction"], "parameterless");
        assert_eq!(
            manifest["composites"][0]["members"][1]["shape"],
            json!({ "kind": "enum", "underlying": "Int32", "isFlags": false, "values": [{ "name": "Open", "value": 0 }] })
        );
        assert_eq!(manifest["enums"][0]["type"], "Acme.Status");

        let pretty = ManifestEmitter::pretty().emit(&catalog).unwrap();
        assert_eq!(serde_json::from_str::<Value>(&pretty).unwrap(), manifest);
    }
}
