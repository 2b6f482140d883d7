//! Container configuration.
//!
//! Options can be built in code, read from `IOTLOGIC_DI_*` environment
//! variables, or (with the `config` feature) deserialized from JSON.

use std::env;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::error::{DiError, DiResult};

/// Environment variable toggling build-time graph validation.
pub const ENV_VALIDATE_ON_BUILD: &str = "IOTLOGIC_DI_VALIDATE_ON_BUILD";
/// Environment variable toggling eager singleton construction.
pub const ENV_EAGER_SINGLETONS: &str = "IOTLOGIC_DI_EAGER_SINGLETONS";
/// Environment variable overriding the maximum resolution depth.
pub const ENV_MAX_DEPTH: &str = "IOTLOGIC_DI_MAX_DEPTH";

const DEFAULT_MAX_DEPTH: usize = 1024;

/// Options applied when a [`ServiceCollection`](crate::ServiceCollection) is built.
///
/// # Examples
///
/// ```rust
/// use iotlogic_di::{ContainerOptions, ServiceCollection};
///
/// let options = ContainerOptions::default()
///     .eager_singletons(true)
///     .max_depth(64);
///
/// let provider = ServiceCollection::with_options(options).build().unwrap();
/// assert!(provider.options().eager_singletons);
/// assert!(provider.options().validate_on_build);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default, deny_unknown_fields))]
pub struct ContainerOptions {
    /// Reject graphs with missing bindings, cycles or lifetime violations in `build()`
    pub validate_on_build: bool,
    /// Construct every singleton inside `build()`
    pub eager_singletons: bool,
    /// Deepest resolution chain allowed before `DepthExceeded`
    pub max_depth: usize,
}

impl Default for ContainerOptions {
    fn default() -> Self {
        Self {
            validate_on_build: true,
            eager_singletons: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ContainerOptions {
    pub fn validate_on_build(mut self, enabled: bool) -> Self {
        self.validate_on_build = enabled;
        self
    }

    pub fn eager_singletons(mut self, enabled: bool) -> Self {
        self.eager_singletons = enabled;
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Defaults overridden by any `IOTLOGIC_DI_*` variables that are set.
    pub fn from_env() -> DiResult<Self> {
        let mut options = Self::default();
        if let Some(value) = read_env(ENV_VALIDATE_ON_BUILD) {
            options.validate_on_build = parse_bool(ENV_VALIDATE_ON_BUILD, &value)?;
        }
        if let Some(value) = read_env(ENV_EAGER_SINGLETONS) {
            options.eager_singletons = parse_bool(ENV_EAGER_SINGLETONS, &value)?;
        }
        if let Some(value) = read_env(ENV_MAX_DEPTH) {
            options.max_depth = value.trim().parse().map_err(|_| {
                DiError::InvalidConfig(format!("{} must be a positive integer, got {:?}", ENV_MAX_DEPTH, value))
            })?;
        }
        options.check()?;
        Ok(options)
    }

    /// Parses options from a JSON object; missing fields keep their defaults.
    #[cfg(feature = "config")]
    pub fn from_json_str(json: &str) -> DiResult<Self> {
        let options: Self =
            serde_json::from_str(json).map_err(|e| DiError::InvalidConfig(e.to_string()))?;
        options.check()?;
        Ok(options)
    }

    fn check(&self) -> DiResult<()> {
        if self.max_depth == 0 {
            return Err(DiError::InvalidConfig("max_depth must be greater than 0".to_string()));
        }
        Ok(())
    }
}

fn read_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_bool(name: &str, value: &str) -> DiResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(DiError::InvalidConfig(format!("{} must be a boolean, got {:?}", name, value))),
    }
}
