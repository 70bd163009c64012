//! Shape classification rules
//!
//! Shapes overlap in the underlying type system (a dictionary is also a
//! collection of pairs, a set is also a collection), so the rules apply in a
//! fixed precedence and the first match wins:
//!
//! 1. enum
//! 2. known scalar
//! 3. nullable value wrapper
//! 4. task-like result wrapper
//! 5. array
//! 6. dictionary
//! 7. set
//! 8. sequence
//! 9. composite

use std::cmp::Reverse;

use indexmap::IndexMap;
use tracing::{debug, warn};

use super::ShapeClassification;
use super::primitive::PrimitiveKind;
use super::well_known::{ShapeFamily, WellKnownDefinition};
use crate::config::DiscoveryConfig;
use crate::error::Result;
use crate::type_ref::TypeRef;
use crate::universe::{TypeHeader, TypeKind, TypeUniverse, interface_closure};

/// A well-known definition found on a type or among its interfaces
#[derive(Debug, Clone)]
struct ShapeCandidate {
    definition: WellKnownDefinition,
    arguments:  Vec<TypeRef>,
    direct:     bool,
    order:      usize,
}

/// Classifies types by their declared shape
///
/// Stateless apart from the borrowed universe and configuration; the same
/// type always classifies the same way.
#[derive(Clone, Copy)]
pub struct TypeShapeClassifier<'a> {
    universe: &'a dyn TypeUniverse,
    config:   &'a DiscoveryConfig,
}

impl<'a> TypeShapeClassifier<'a> {
    /// Create a classifier over `universe`
    pub const fn new(universe: &'a dyn TypeUniverse, config: &'a DiscoveryConfig) -> Self {
        Self { universe, config }
    }

    /// Classify `type_ref`
    ///
    /// `None` for generic parameters and for types the universe cannot describe.
    ///
    /// `Nullable<X>` stays `Nullable` whatever `X` is: a nullable enum or a
    /// nullable composite is not unwrapped. `inner_shape` carries the full
    /// classification of `X`, falling back to `Composite` when `X` cannot be
    /// described.
    pub fn classify(&self, type_ref: &TypeRef) -> Result<Option<ShapeClassification>> {
        if let Some(shape) = self.classify_scalar(type_ref)? {
            return Ok(Some(shape));
        }

        let Some(header) = self.universe.type_header(type_ref)? else {
            debug!(type_ref = %type_ref, "Type cannot be described");
            return Ok(None);
        };
        if header.kind == TypeKind::GenericParameter {
            return Ok(None);
        }

        let shape = self.classify_described(type_ref, header)?;
        debug!(type_ref = %type_ref, shape = shape.tag(), "Classified type");
        Ok(Some(shape))
    }

    /// Apply only the enum and scalar rules
    pub fn classify_scalar(&self, type_ref: &TypeRef) -> Result<Option<ShapeClassification>> {
        if let Some(info) = self.universe.is_enum(type_ref)? {
            return Ok(Some(ShapeClassification::Enum {
                underlying: info.underlying,
                is_flags:   info.is_flags,
                values:     info.values,
            }));
        }
        Ok(PrimitiveKind::from_type_name(type_ref.as_str())
            .map(|kind| ShapeClassification::Primitive { kind }))
    }

    /// Whether every generic argument (and array element) is a describable,
    /// non-parameter type
    pub fn is_closed(&self, type_ref: &TypeRef) -> Result<bool> {
        if let Some((element, _)) = type_ref.syntax().ok().and_then(|s| s.array_element()) {
            let element = TypeRef::from(&element);
            return self.is_argument_closed(&element);
        }
        for argument in self.universe.resolve_generic_arguments(type_ref)? {
            if !self.is_argument_closed(&argument)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn is_argument_closed(&self, argument: &TypeRef) -> Result<bool> {
        match self.universe.type_header(argument)? {
            None => Ok(false),
            Some(header) if header.kind == TypeKind::GenericParameter => Ok(false),
            Some(_) => self.is_closed(argument),
        }
    }

    fn classify_described(
        &self,
        type_ref: &TypeRef,
        header: TypeHeader,
    ) -> Result<ShapeClassification> {
        let definition = WellKnownDefinition::detect(type_ref);

        if definition == Some(WellKnownDefinition::Nullable) {
            let arguments = self.universe.resolve_generic_arguments(type_ref)?;
            if let [inner] = arguments.as_slice() {
                let inner_shape = self
                    .classify(inner)?
                    .unwrap_or(ShapeClassification::Composite);
                return Ok(ShapeClassification::Nullable {
                    inner:       inner.clone(),
                    inner_shape: Box::new(inner_shape),
                });
            }
        }

        if self.is_task_like(type_ref, definition) {
            let arguments = self.universe.resolve_generic_arguments(type_ref)?;
            let result = match arguments.as_slice() {
                [single] => Some(single.clone()),
                _ => None,
            };
            return Ok(ShapeClassification::TaskLike { result });
        }

        if header.kind == TypeKind::Array {
            let (element, rank) = type_ref
                .syntax()
                .ok()
                .and_then(|syntax| syntax.array_element())
                .map_or_else(
                    || (TypeRef::unknown(), 1),
                    |(element, rank)| (TypeRef::from(&element), rank),
                );
            return Ok(ShapeClassification::Array { element, rank });
        }

        let candidates = self.candidates(type_ref, header)?;

        if let Some(shape) = Self::dictionary_shape(type_ref, &candidates) {
            return Ok(shape);
        }
        if let Some(shape) = Self::set_shape(&candidates) {
            return Ok(shape);
        }
        if let Some(shape) = Self::sequence_shape(&candidates) {
            return Ok(shape);
        }
        Ok(ShapeClassification::Composite)
    }

    fn is_task_like(&self, type_ref: &TypeRef, definition: Option<WellKnownDefinition>) -> bool {
        definition.is_some_and(|d| d.family() == ShapeFamily::Task)
            || self.config.is_configured_task_like(type_ref.base_type())
    }

    /// Well-known definitions on the type itself (when it is an interface) and
    /// across its interface closure, with arity-checked arguments
    fn candidates(&self, type_ref: &TypeRef, header: TypeHeader) -> Result<Vec<ShapeCandidate>> {
        let mut sources = Vec::new();
        if header.kind == TypeKind::Interface {
            sources.push((type_ref.clone(), true));
        }
        sources.extend(
            interface_closure(self.universe, type_ref)?
                .into_iter()
                .map(|implemented| (implemented.interface, implemented.direct)),
        );

        let mut candidates = Vec::new();
        for (order, (interface, direct)) in sources.into_iter().enumerate() {
            let Some(definition) = WellKnownDefinition::detect(&interface) else {
                continue;
            };
            if definition.family() == ShapeFamily::Nullable || definition.family() == ShapeFamily::Task
            {
                continue;
            }
            let arguments = self.universe.resolve_generic_arguments(&interface)?;
            if definition.typed_arity() != Some(arguments.len()) {
                continue;
            }
            candidates.push(ShapeCandidate {
                definition,
                arguments,
                direct,
                order,
            });
        }
        Ok(candidates)
    }

    fn dictionary_shape(
        type_ref: &TypeRef,
        candidates: &[ShapeCandidate],
    ) -> Option<ShapeClassification> {
        let dictionaries: Vec<&ShapeCandidate> = candidates
            .iter()
            .filter(|c| c.definition.family() == ShapeFamily::Dictionary)
            .collect();
        if dictionaries.is_empty() {
            return None;
        }

        // distinct (key, value) pairs, remembering whether any source was direct
        let mut pairs: IndexMap<(&TypeRef, &TypeRef), bool> = IndexMap::new();
        for candidate in &dictionaries {
            if let [key, value] = candidate.arguments.as_slice() {
                *pairs.entry((key, value)).or_default() |= candidate.direct;
            }
        }

        if pairs.is_empty() {
            // only the untyped dictionary interface
            return Some(ShapeClassification::DictionaryLike {
                key:   TypeRef::unknown(),
                value: TypeRef::unknown(),
            });
        }
        if pairs.len() > 1 {
            pairs.retain(|_, direct| *direct);
        }

        if let Some(((key, value), _)) = pairs.first()
            && pairs.len() == 1
        {
            return Some(ShapeClassification::DictionaryLike {
                key:   (*key).clone(),
                value: (*value).clone(),
            });
        }

        warn!(
            type_ref = %type_ref,
            "Ambiguous dictionary interfaces; describing as composite"
        );
        Some(ShapeClassification::Composite)
    }

    fn set_shape(candidates: &[ShapeCandidate]) -> Option<ShapeClassification> {
        candidates
            .iter()
            .filter(|c| c.definition.family() == ShapeFamily::Set)
            .min_by_key(|c| (!c.direct, c.order))
            .and_then(|c| c.arguments.first())
            .map(|element| ShapeClassification::SetLike {
                element: element.clone(),
            })
    }

    fn sequence_shape(candidates: &[ShapeCandidate]) -> Option<ShapeClassification> {
        let sequences = candidates
            .iter()
            .filter(|c| c.definition.family() == ShapeFamily::Sequence);

        let typed = sequences
            .clone()
            .filter(|c| c.definition.sequence_specificity() > 0)
            .max_by_key(|c| {
                (
                    c.definition.sequence_specificity(),
                    c.direct,
                    Reverse(c.order),
                )
            });

        match typed.and_then(|c| c.arguments.first()) {
            Some(element) => Some(ShapeClassification::ListLike {
                element: element.clone(),
            }),
            None if sequences.count() > 0 => Some(ShapeClassification::ListLike {
                element: TypeRef::unknown(),
            }),
            None => None,
        }
    }
}
