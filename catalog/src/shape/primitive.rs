//! Known scalar types
//!
//! Every scalar is recognized by its system name and, where one exists, by its
//! keyword alias, so `System.Int32` and `int` classify identically.

use std::collections::HashMap;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

/// Scalar kinds that are never expanded or registered
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
    EnumString,
    EnumIter,
)]
pub enum PrimitiveKind {
    /// `System.Boolean`
    Boolean,
    /// `System.Char`
    Char,
    /// `System.SByte`
    SByte,
    /// `System.Byte`
    Byte,
    /// `System.Int16`
    Int16,
    /// `System.UInt16`
    UInt16,
    /// `System.Int32`
    Int32,
    /// `System.UInt32`
    UInt32,
    /// `System.Int64`
    Int64,
    /// `System.UInt64`
    UInt64,
    /// `System.Int128`
    Int128,
    /// `System.UInt128`
    UInt128,
    /// `System.IntPtr`
    IntPtr,
    /// `System.UIntPtr`
    UIntPtr,
    /// `System.Half`
    Half,
    /// `System.Single`
    Single,
    /// `System.Double`
    Double,
    /// `System.Decimal`
    Decimal,
    /// `System.String`
    String,
    /// `System.DateTime`
    DateTime,
    /// `System.DateTimeOffset`
    DateTimeOffset,
    /// `System.DateOnly`
    DateOnly,
    /// `System.TimeOnly`
    TimeOnly,
    /// `System.TimeSpan`
    TimeSpan,
    /// `System.Guid`
    Guid,
}

/// Lookup from every accepted spelling to its kind
static PRIMITIVE_NAMES: LazyLock<HashMap<String, PrimitiveKind>> = LazyLock::new(|| {
    let mut names = HashMap::new();
    for kind in PrimitiveKind::iter() {
        names.insert(kind.system_name(), kind);
        if let Some(keyword) = kind.keyword() {
            names.insert(keyword.to_string(), kind);
        }
    }
    names
});

impl PrimitiveKind {
    /// Resolve a type name to a primitive kind
    pub fn from_type_name(type_name: &str) -> Option<Self> {
        PRIMITIVE_NAMES.get(type_name).copied()
    }

    /// Fully-qualified name, e.g. `System.Int32`
    pub fn system_name(self) -> String {
        format!("System.{}", self.as_ref())
    }

    /// Language keyword alias, e.g. `int`
    pub const fn keyword(self) -> Option<&'static str> {
        match self {
            Self::Boolean => Some("bool"),
            Self::Char => Some("char"),
            Self::SByte => Some("sbyte"),
            Self::Byte => Some("byte"),
            Self::Int16 => Some("short"),
            Self::UInt16 => Some("ushort"),
            Self::Int32 => Some("int"),
            Self::UInt32 => Some("uint"),
            Self::Int64 => Some("long"),
            Self::UInt64 => Some("ulong"),
            Self::IntPtr => Some("nint"),
            Self::UIntPtr => Some("nuint"),
            Self::Single => Some("float"),
            Self::Double => Some("double"),
            Self::Decimal => Some("decimal"),
            Self::String => Some("string"),
            Self::Int128
            | Self::UInt128
            | Self::Half
            | Self::DateTime
            | Self::DateTimeOffset
            | Self::DateOnly
            | Self::TimeOnly
            | Self::TimeSpan
            | Self::Guid => None,
        }
    }

    /// Whether this kind can back an enum
    pub const fn is_integral(self) -> bool {
        matches!(
            self,
            Self::SByte
                | Self::Byte
                | Self::Int16
                | Self::UInt16
                | Self::Int32
                | Self::UInt32
                | Self::Int64
                | Self::UInt64
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "tests fail loudly on bad fixtures")]
mod tests {
    use super::*;

    #[test]
    fn test_system_names_and_keywords_agree() {
        assert_eq!(PrimitiveKind::from_type_name("System.Int32"), Some(PrimitiveKind::Int32));
        assert_eq!(PrimitiveKind::from_type_name("int"), Some(PrimitiveKind::Int32));
        assert_eq!(PrimitiveKind::from_type_name("string"), Some(PrimitiveKind::String));
        assert_eq!(PrimitiveKind::from_type_name("System.Guid"), Some(PrimitiveKind::Guid));
        assert_eq!(PrimitiveKind::from_type_name("System.TimeSpan"), Some(PrimitiveKind::TimeSpan));
    }

    #[test]
    fn test_non_primitives() {
        assert_eq!(PrimitiveKind::from_type_name("System.Object"), None);
        assert_eq!(PrimitiveKind::from_type_name("Acme.Order"), None);
        assert_eq!(PrimitiveKind::from_type_name("Int32"), None);
    }

    #[test]
    fn test_parse_from_serialized_name() {
        let kind: PrimitiveKind = "UInt16".parse().unwrap();
        assert_eq!(kind, PrimitiveKind::UInt16);
        assert!(kind.is_integral());
        assert!(!PrimitiveKind::Decimal.is_integral());
    }
}
