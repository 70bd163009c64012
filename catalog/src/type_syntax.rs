//! Parser for fully-qualified type names with nested generics
//!
//! This module uses nom to parse type names like:
//! - `System.String`
//! - `System.Collections.Generic.List<Acme.LineItem>`
//! - `System.Collections.Generic.Dictionary<System.String, System.Collections.Generic.List<int>>`
//! - `Acme.Matrix[,]`
//! - `Acme.ShipmentStatus?` (rewritten to `System.Nullable<Acme.ShipmentStatus>`)
//!
//! The parsed form renders back to a canonical string, which is what makes
//! [`TypeRef`](crate::TypeRef) equality independent of spacing in the input.

use std::collections::HashMap;
use std::fmt;

use itertools::Itertools;
use nom::branch::alt;
use nom::bytes::complete::{tag, take_while1};
use nom::character::complete::{char, multispace0};
use nom::combinator::{all_consuming, map, opt, recognize, value};
use nom::multi::{many0, many0_count, separated_list1};
use nom::sequence::{delimited, preceded, terminated};
use nom::{IResult, Parser};

use crate::constants::TYPE_NULLABLE;
use crate::error::{Error, Result};

/// A parsed type name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeSyntax {
    /// Dotted path without generic arguments, e.g. `System.Collections.Generic.List`
    pub path:        String,
    /// Generic arguments in declaration order
    pub arguments:   Vec<Self>,
    /// Array rank suffixes, innermost first (`int[][,]` is `[1, 2]`)
    pub array_ranks: Vec<usize>,
}

#[derive(Debug, Clone, Copy)]
enum Suffix {
    Array(usize),
    Nullable,
}

/// Parse an identifier segment (alphanumeric, underscore, or the arity backtick)
fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '_' || c == '`').parse(input)
}

/// Parse a namespace-qualified path; `+` separates nested types
fn dotted_path(input: &str) -> IResult<&str, &str> {
    recognize(separated_list1(
        alt((tag("::"), tag("."), tag("+"))),
        identifier,
    ))
    .parse(input)
}

/// Parse generic arguments recursively
fn generic_arguments(input: &str) -> IResult<&str, Vec<TypeSyntax>> {
    delimited(
        terminated(char('<'), multispace0),
        separated_list1(delimited(multispace0, char(','), multispace0), type_syntax),
        preceded(multispace0, char('>')),
    )
    .parse(input)
}

fn suffix(input: &str) -> IResult<&str, Suffix> {
    alt((
        map(
            delimited(char('['), many0_count(char(',')), char(']')),
            |commas| Suffix::Array(commas + 1),
        ),
        value(Suffix::Nullable, char('?')),
    ))
    .parse(input)
}

fn type_syntax(input: &str) -> IResult<&str, TypeSyntax> {
    let (input, path) = dotted_path(input)?;
    let (input, arguments) = opt(generic_arguments).parse(input)?;
    let (input, suffixes) = many0(suffix).parse(input)?;

    let mut syntax = TypeSyntax {
        path: path.to_string(),
        arguments: arguments.unwrap_or_default(),
        array_ranks: Vec::new(),
    };

    for suffix in suffixes {
        match suffix {
            Suffix::Array(rank) => syntax.array_ranks.push(rank),
            // `?` on an array is a nullable reference annotation and carries no shape
            Suffix::Nullable if !syntax.array_ranks.is_empty() => {}
            Suffix::Nullable => syntax = TypeSyntax::nullable_of(syntax),
        }
    }

    Ok((input, syntax))
}

impl TypeSyntax {
    /// Parse a complete type name
    pub fn parse(input: &str) -> Result<Self> {
        all_consuming(delimited(multispace0, type_syntax, multispace0))
            .parse(input)
            .map(|(_, syntax)| syntax)
            .map_err(|e| Error::invalid_type_name(input, format!("{e:?}")).into())
    }

    /// A bare name with no arguments or array suffixes
    pub fn named(path: impl Into<String>) -> Self {
        Self {
            path:        path.into(),
            arguments:   Vec::new(),
            array_ranks: Vec::new(),
        }
    }

    /// Wrap `inner` in the nullable value wrapper
    pub fn nullable_of(inner: Self) -> Self {
        Self {
            path:        TYPE_NULLABLE.to_string(),
            arguments:   vec![inner],
            array_ranks: Vec::new(),
        }
    }

    /// Whether this names an array
    pub const fn is_array(&self) -> bool {
        !self.array_ranks.is_empty()
    }

    /// Element type and rank of the outermost array suffix
    pub fn array_element(&self) -> Option<(Self, usize)> {
        let (&rank, inner_ranks) = self.array_ranks.split_last()?;
        let element = Self {
            path:        self.path.clone(),
            arguments:   self.arguments.clone(),
            array_ranks: inner_ranks.to_vec(),
        };
        Some((element, rank))
    }

    /// True for a single undotted identifier such as a generic parameter `T`
    pub fn is_bare_identifier(&self) -> bool {
        self.arguments.is_empty()
            && self.array_ranks.is_empty()
            && !self.path.contains(['.', '+', ':'])
    }

    /// Replace bare identifiers bound in `bindings` with their bound syntax
    ///
    /// Used to close a generic definition: `IList<T>` with `T = Acme.Item`
    /// becomes `IList<Acme.Item>`, and `T[]` becomes `Acme.Item[]`.
    pub fn substitute(&self, bindings: &HashMap<String, Self>) -> Self {
        if self.arguments.is_empty()
            && let Some(bound) = bindings.get(&self.path)
        {
            let mut result = bound.clone();
            result.array_ranks.extend_from_slice(&self.array_ranks);
            return result;
        }

        Self {
            path:        self.path.clone(),
            arguments:   self
                .arguments
                .iter()
                .map(|argument| argument.substitute(bindings))
                .collect(),
            array_ranks: self.array_ranks.clone(),
        }
    }
}

impl fmt::Display for TypeSyntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        if !self.arguments.is_empty() {
            write!(f, "<{}>", self.arguments.iter().join(", "))?;
        }
        for rank in &self.array_ranks {
            write!(f, "[{}]", ",".repeat(rank.saturating_sub(1)))?;
        }
        Ok(())
    }
}
