//! Discovery configuration
//!
//! Every field has a default, so an empty JSON object is a valid configuration.

use std::path::Path;

use error_stack::ResultExt;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::{CONFIG_PATH_ENV_VAR, DEFAULT_MAX_DEPTH};
use crate::error::{Error, Result};

/// Which containers receive their own descriptor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContainerDescriptorPolicy {
    /// Only dictionary shapes, which need key and value codecs of their own
    #[default]
    Dictionaries,
    /// Dictionaries plus concrete list and set classes
    Concrete,
    /// No container is ever registered
    Never,
}

/// Knobs for a discovery run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DiscoveryConfig {
    /// Collect public methods declared by interface types
    pub include_interface_methods:   bool,
    /// Which containers get descriptors
    pub container_descriptors:       ContainerDescriptorPolicy,
    /// Deepest path expanded; types below it are left unregistered
    pub max_depth:                   usize,
    /// Additional definition names treated as task-like, e.g. `Acme.Deferred`
    pub task_like_definitions:       Vec<String>,
    /// Walk constructor parameter types as well as member types
    pub walk_constructor_parameters: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            include_interface_methods:   true,
            container_descriptors:       ContainerDescriptorPolicy::default(),
            max_depth:                   DEFAULT_MAX_DEPTH,
            task_like_definitions:       Vec::new(),
            walk_constructor_parameters: true,
        }
    }
}

impl DiscoveryConfig {
    /// Read and validate a configuration file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::io_failed("read configuration", path, e))?;
        let config: Self = serde_json::from_str(&json)
            .change_context(Error::Configuration(format!(
                "malformed configuration in {}",
                path.display()
            )))?;
        config.validate()?;
        debug!(path = %path.display(), "Loaded discovery configuration");
        Ok(config)
    }

    /// Configuration named by the environment, or the defaults
    pub fn load() -> Result<Self> {
        match std::env::var_os(CONFIG_PATH_ENV_VAR) {
            Some(path) => Self::from_json_file(Path::new(&path))
                .attach(format!("Named by {CONFIG_PATH_ENV_VAR}")),
            None => Ok(Self::default()),
        }
    }

    /// Reject values no run could honor
    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(Error::Configuration("maxDepth must be at least 1".to_string()).into());
        }
        if let Some(bad) = self
            .task_like_definitions
            .iter()
            .find(|name| name.trim().is_empty() || name.contains(['<', '[']))
        {
            return Err(Error::Configuration(format!(
                "taskLikeDefinitions entries must be bare definition names, got '{bad}'"
            ))
            .into());
        }
        Ok(())
    }

    /// Whether `definition` was configured as task-like
    pub fn is_configured_task_like(&self, definition: &str) -> bool {
        self.task_like_definitions
            .iter()
            .any(|name| name.trim() == definition)
    }
}
