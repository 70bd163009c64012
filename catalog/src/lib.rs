//! # Type Catalog
//!
//! Build-time discovery of the types a serializer generator must support.
//!
//! Starting from a set of root types, the crate walks a statically typed object
//! model: every reachable type is classified into a shape (primitive, enum,
//! nullable wrapper, task, array, list, set, dictionary, or composite), composites
//! have their members collected, and everything a composite references is visited
//! before the composite itself is registered. The result is a [`Catalog`] of
//! descriptors in dependency order that a [`DescriptorEmitter`] turns into output.
//!
//! The type model itself is supplied by the host through [`TypeUniverse`]. The
//! [`JsonUniverse`] implementation reads it from a JSON document.
//!
//! ```no_run
//! use std::path::Path;
//!
//! use type_catalog::{
//!     DescriptorEmitter, DiscoveryConfig, JsonUniverse, ManifestEmitter, TypeRef, discover,
//! };
//!
//! # fn main() -> type_catalog::Result<()> {
//! let universe = JsonUniverse::from_file(Path::new("universe.json"))?.with_prelude()?;
//! let catalog = discover(&universe, &DiscoveryConfig::default(), &[TypeRef::from("Acme.Order")])?;
//! println!("{}", ManifestEmitter::pretty().emit(&catalog)?);
//! # Ok(())
//! # }
//! ```

mod config;
mod constants;
mod descriptor;
mod emitter;
mod entry_point;
mod error;
mod members;
mod shape;
mod type_ref;
mod type_syntax;
mod universe;
mod walker;

pub use config::{ContainerDescriptorPolicy, DiscoveryConfig};
pub use constants::CONFIG_PATH_ENV_VAR;
pub use descriptor::{
    CompositeDescriptor, ConstructionStrategy, ConstructorDescriptor, EnumDescriptor,
};
pub use emitter::{DescriptorEmitter, ManifestEmitter};
pub use entry_point::{EntryPointSelector, MarkerCandidate, MarkerSelector};
pub use error::{Error, Result};
pub use members::{MemberCollector, MemberDescriptor};
pub use shape::{PrimitiveKind, ShapeClassification, TypeShapeClassifier};
pub use type_ref::TypeRef;
pub use type_syntax::TypeSyntax;
pub use universe::{
    AttributeInfo, ConstructorInfo, EnumInfo, EnumValue, ImplementedInterface, JsonUniverse,
    MemberInfo, MemberKind, ParameterInfo, TypeHeader, TypeKind, TypeUniverse, interface_closure,
};
pub use walker::{
    CancellationToken, Catalog, GraphWalker, PathStack, Registry, discover,
    discover_entry_points, discover_with_cancellation,
};
