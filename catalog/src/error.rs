use thiserror::Error;

// Error message prefixes
const MSG_FAILED_TO_PREFIX: &str = "Failed to";
const MSG_INVALID_PREFIX: &str = "Invalid";

/// Result type for the `type_catalog` library
pub type Result<T> = std::result::Result<T, error_stack::Report<Error>>;

/// Error categories surfaced by discovery
///
/// Only failures of the host universe, configuration, or the caller's inputs are
/// errors. Unresolvable, inaccessible, and ambiguous types are recovered inside the
/// walk and never show up here.
#[derive(Error, Debug)]
pub enum Error {
    /// Discovery was abandoned between two root visits
    #[error("Discovery cancelled after {completed_roots} of {total_roots} roots")]
    Cancelled {
        /// Roots fully visited before the cancellation was observed
        completed_roots: usize,
        /// Roots requested
        total_roots:     usize,
    },

    /// Configuration could not be loaded or is out of range
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Reading or writing a file failed
    #[error("File operation failed: {0}")]
    FileOperation(String),

    /// A caller-supplied argument was rejected
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A type name could not be parsed
    #[error("Invalid type name '{type_name}': {reason}")]
    InvalidTypeName {
        /// The offending input
        type_name: String,
        /// Parser diagnostic
        reason:    String,
    },

    /// Descriptor output could not be serialized
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// The host universe document could not be loaded
    #[error("Type universe could not be loaded: {0}")]
    UniverseLoad(String),

    /// The host universe failed to answer a query
    #[error("Type universe query failed: {0}")]
    UniverseQuery(String),
}

impl Error {
    // Builder methods for common patterns

    /// Create a "Failed to X" file error
    pub fn io_failed(
        operation: &str,
        path: &std::path::Path,
        error: impl std::fmt::Display,
    ) -> Self {
        Self::FileOperation(format!(
            "{MSG_FAILED_TO_PREFIX} {operation} {}: {error}",
            path.display()
        ))
    }

    /// Create an "Invalid X" argument error
    pub fn invalid(what: &str, details: impl std::fmt::Display) -> Self {
        Self::InvalidArgument(format!("{MSG_INVALID_PREFIX} {what}: {details}"))
    }

    /// Create a universe query failure for a specific query and type
    pub fn query_failed(query: &str, type_name: &str, reason: impl std::fmt::Display) -> Self {
        Self::UniverseQuery(format!(
            "{MSG_FAILED_TO_PREFIX} {query} for '{type_name}': {reason}"
        ))
    }

    /// Create an invalid type name error
    pub fn invalid_type_name(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTypeName {
            type_name: type_name.into(),
            reason:    reason.into(),
        }
    }
}
