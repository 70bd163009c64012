// ============================================================================
// CONFIGURATION CONSTANTS
// ============================================================================

/// Environment variable naming a JSON configuration file
pub const CONFIG_PATH_ENV_VAR: &str = "TYPE_CATALOG_CONFIG";

/// Default maximum depth of the recursive walk
pub const DEFAULT_MAX_DEPTH: usize = 256;

// ============================================================================
// TYPE NAME CONSTANTS
// ============================================================================

/// Placeholder for element, key, or value types that cannot be determined
pub const TYPE_UNKNOWN: &str = "unknown";

/// Canonical name of the nullable value wrapper
pub const TYPE_NULLABLE: &str = "System.Nullable";

/// Separator between a declaring interface and a member name
pub const QUALIFIED_MEMBER_SEPARATOR: &str = ".";

/// Base types that end an inheritance chain; never listed in a base chain
pub const ROOT_BASE_TYPES: [&str; 4] = ["System.Object", "object", "System.ValueType", "System.Enum"];
