//! Recursive discovery over the type graph
//!
//! Each reachable type is classified and dispatched by shape. Leaves stop the
//! descent, containers recurse into their inner types, and composites recurse
//! into everything they reference before their own descriptor is inserted. A
//! path stack guards against cycles; the registry makes repeat visits free.

mod path_stack;
mod registry;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use error_stack::ResultExt;
use tracing::{debug, info, trace, warn};

pub use self::path_stack::PathStack;
pub use self::registry::Registry;
use crate::config::{ContainerDescriptorPolicy, DiscoveryConfig};
use crate::descriptor::{
    CompositeDescriptor, ConstructionStrategy, ConstructorDescriptor, EnumDescriptor,
};
use crate::entry_point::EntryPointSelector;
use crate::error::{Error, Result};
use crate::members::{MemberCollector, MemberDescriptor};
use crate::shape::{ShapeClassification, TypeShapeClassifier};
use crate::type_ref::TypeRef;
use crate::universe::{TypeHeader, TypeKind, TypeUniverse, interface_closure};

/// Coarse signal to abandon a discovery run
///
/// Observed between root visits only; a root's expansion always completes.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Create a token that is not cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Result of a discovery run, handed to emitters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    /// Roots in the order they were visited
    pub roots:    Vec<TypeRef>,
    /// Descriptors in completion order
    pub registry: Registry,
}

/// Walks the type graph from a set of roots
///
/// One walker owns one registry. Independent root sets that must not share
/// descriptors use independent walkers.
pub struct GraphWalker<'a> {
    universe:     &'a dyn TypeUniverse,
    config:       &'a DiscoveryConfig,
    classifier:   TypeShapeClassifier<'a>,
    members:      MemberCollector<'a>,
    registry:     Registry,
    cancellation: Option<CancellationToken>,
}

impl<'a> GraphWalker<'a> {
    /// Create a walker with an empty registry
    pub fn new(universe: &'a dyn TypeUniverse, config: &'a DiscoveryConfig) -> Self {
        Self {
            universe,
            config,
            classifier: TypeShapeClassifier::new(universe, config),
            members: MemberCollector::new(universe, config),
            registry: Registry::new(),
            cancellation: None,
        }
    }

    /// Observe `token` between root visits
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Descriptors registered so far
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Take the registry out of the walker
    pub fn into_registry(self) -> Registry {
        self.registry
    }

    /// Visit every root with its own path; the registry is shared
    pub fn discover(&mut self, roots: &[TypeRef]) -> Result<&Registry> {
        for (completed, root) in roots.iter().enumerate() {
            if self
                .cancellation
                .as_ref()
                .is_some_and(CancellationToken::is_cancelled)
            {
                return Err(Error::Cancelled {
                    completed_roots: completed,
                    total_roots:     roots.len(),
                }
                .into());
            }

            debug!(root = %root, "Visiting root");
            let mut path = PathStack::new();
            self.visit(root, &mut path)
                .attach(format!("While discovering from root '{root}'"))?;
        }

        info!(
            roots = roots.len(),
            composites = self.registry.composites().count(),
            enums = self.registry.enums().count(),
            "Discovery complete"
        );
        Ok(&self.registry)
    }

    /// Visit one type on the current `path`
    pub fn visit(&mut self, type_ref: &TypeRef, path: &mut PathStack) -> Result<()> {
        if self.registry.contains(type_ref) {
            return Ok(());
        }
        if path.contains(type_ref) {
            trace!(type_ref = %type_ref, path = %path.describe(), "Cycle detected");
            return Ok(());
        }

        let Some(shape) = self.classifier.classify(type_ref)? else {
            trace!(type_ref = %type_ref, "Skipping unresolvable type");
            return Ok(());
        };
        if !self.universe.is_public(type_ref)? {
            trace!(type_ref = %type_ref, "Skipping inaccessible type");
            return Ok(());
        }

        match shape {
            ShapeClassification::Primitive { .. } => Ok(()),
            ShapeClassification::Enum {
                underlying,
                is_flags,
                values,
            } => {
                let attributes = self.universe.list_attributes(type_ref)?;
                self.registry.insert_enum(EnumDescriptor {
                    type_ref: type_ref.clone(),
                    underlying,
                    is_flags,
                    values,
                    attributes,
                });
                Ok(())
            }
            ShapeClassification::Composite => self.visit_composite(type_ref, path),
            container => self.visit_container(type_ref, container, path),
        }
    }

    /// Push `type_ref` onto `path`; `false` when the depth limit stops the descent
    fn enter(&self, type_ref: &TypeRef, path: &mut PathStack) -> bool {
        if path.len() >= self.config.max_depth {
            warn!(
                type_ref = %type_ref,
                limit = self.config.max_depth,
                path = %path.describe(),
                "Depth limit reached; type not expanded"
            );
            return false;
        }
        path.push(type_ref.clone());
        true
    }

    fn visit_container(
        &mut self,
        type_ref: &TypeRef,
        shape: ShapeClassification,
        path: &mut PathStack,
    ) -> Result<()> {
        if !self.enter(type_ref, path) {
            return Ok(());
        }
        for inner in shape.inner_types() {
            self.visit(inner, path)?;
        }

        let header = self.header(type_ref)?;
        let registered = self.needs_descriptor(&shape, header) && self.classifier.is_closed(type_ref)?;
        let descriptor = if registered {
            let descriptor = self.describe(type_ref, header, shape, Vec::new())?;
            self.visit_references(&descriptor, path)?;
            Some(descriptor)
        } else {
            None
        };
        path.pop();

        if let Some(descriptor) = descriptor {
            self.registry.insert_composite(descriptor);
        }
        Ok(())
    }

    fn visit_composite(&mut self, type_ref: &TypeRef, path: &mut PathStack) -> Result<()> {
        if !self.enter(type_ref, path) {
            return Ok(());
        }

        if !self.classifier.is_closed(type_ref)? {
            // open generic: nothing to describe, but its bound arguments may be
            debug!(type_ref = %type_ref, "Open generic type is not registered");
            for argument in self.universe.resolve_generic_arguments(type_ref)? {
                self.visit(&argument, path)?;
            }
            path.pop();
            return Ok(());
        }

        let header = self.header(type_ref)?;
        let members = self.members.collect(type_ref)?;
        let descriptor = self.describe(type_ref, header, ShapeClassification::Composite, members)?;
        self.visit_references(&descriptor, path)?;
        for implemented in &descriptor.interfaces {
            for argument in self.universe.resolve_generic_arguments(&implemented.interface)? {
                self.visit(&argument, path)?;
            }
        }
        path.pop();

        self.registry.insert_composite(descriptor);
        Ok(())
    }

    /// Visit everything a codec for `descriptor` depends on
    fn visit_references(&mut self, descriptor: &CompositeDescriptor, path: &mut PathStack) -> Result<()> {
        for member in &descriptor.members {
            self.visit(&member.type_ref, path)?;
            for parameter in &member.parameters {
                self.visit(&parameter.type_ref, path)?;
            }
        }
        for argument in &descriptor.generic_arguments {
            self.visit(argument, path)?;
        }
        for base in &descriptor.base_types {
            self.visit(base, path)?;
        }
        if self.config.walk_constructor_parameters {
            for constructor in &descriptor.constructors {
                for parameter in &constructor.parameters {
                    self.visit(&parameter.type_ref, path)?;
                }
            }
        }
        Ok(())
    }

    fn header(&self, type_ref: &TypeRef) -> Result<TypeHeader> {
        self.universe
            .type_header(type_ref)?
            .ok_or_else(|| {
                Error::query_failed("describe", type_ref.as_str(), "classified type has no header")
                    .into()
            })
    }

    /// Whether a container shape gets its own descriptor under the policy
    fn needs_descriptor(&self, shape: &ShapeClassification, header: TypeHeader) -> bool {
        match (self.config.container_descriptors, shape) {
            (ContainerDescriptorPolicy::Never, _) => false,
            (_, ShapeClassification::DictionaryLike { .. }) => true,
            (
                ContainerDescriptorPolicy::Concrete,
                ShapeClassification::ListLike { .. } | ShapeClassification::SetLike { .. },
            ) => matches!(header.kind, TypeKind::Class | TypeKind::Struct) && !header.is_abstract,
            _ => false,
        }
    }

    fn describe(
        &self,
        type_ref: &TypeRef,
        header: TypeHeader,
        shape: ShapeClassification,
        members: Vec<MemberDescriptor>,
    ) -> Result<CompositeDescriptor> {
        let declared = self.universe.list_constructors(type_ref)?;
        let declared_count = declared.len();
        let constructors: Vec<ConstructorDescriptor> = declared
            .into_iter()
            .filter(|constructor| constructor.is_public)
            .map(ConstructorDescriptor::from)
            .collect();
        let is_closed = self.classifier.is_closed(type_ref)?;
        let construction =
            ConstructionStrategy::determine(header, is_closed, declared_count, &constructors, &members);

        let mut base_types = Vec::new();
        for base in self.universe.list_base_types(type_ref)? {
            if self.universe.is_public(&base)? {
                base_types.push(base);
            }
        }

        let mut interfaces = Vec::new();
        for implemented in interface_closure(self.universe, type_ref)? {
            if self.universe.is_public(&implemented.interface)? {
                interfaces.push(implemented);
            }
        }

        Ok(CompositeDescriptor {
            type_ref: type_ref.clone(),
            kind: header.kind,
            shape,
            is_abstract: header.is_abstract,
            members,
            constructors,
            construction,
            base_types,
            interfaces,
            attributes: self.universe.list_attributes(type_ref)?,
            generic_arguments: self.universe.resolve_generic_arguments(type_ref)?,
        })
    }
}

/// Discover everything reachable from `roots`
pub fn discover(
    universe: &dyn TypeUniverse,
    config: &DiscoveryConfig,
    roots: &[TypeRef],
) -> Result<Catalog> {
    discover_with_cancellation(universe, config, roots, None)
}

/// Discover with an optional cancellation token
pub fn discover_with_cancellation(
    universe: &dyn TypeUniverse,
    config: &DiscoveryConfig,
    roots: &[TypeRef],
    cancellation: Option<CancellationToken>,
) -> Result<Catalog> {
    config.validate()?;

    let mut walker = GraphWalker::new(universe, config);
    if let Some(token) = cancellation {
        walker = walker.with_cancellation(token);
    }
    walker.discover(roots)?;

    Ok(Catalog {
        roots:    roots.to_vec(),
        registry: walker.into_registry(),
    })
}

/// Select roots with `selector`, then discover from them
pub fn discover_entry_points(
    universe: &dyn TypeUniverse,
    selector: &dyn EntryPointSelector,
    config: &DiscoveryConfig,
) -> Result<Catalog> {
    let roots = selector
        .select_roots(universe)
        .attach("While selecting entry points")?;
    info!(roots = roots.len(), "Selected entry points");
    discover(universe, config, &roots)
}
