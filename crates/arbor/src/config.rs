//! Scene configuration.
//!
//! Capacities are fixed when a [`Scene`](crate::ecs::Scene) is built. Every
//! field has a default, so a JSON file only needs the values it overrides:
//!
//! ```json
//! { "max_entities": 20000 }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SceneError};

/// Capacity limits for one scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Size of the entity id pool. Valid ids are `1..=max_entities`.
    pub max_entities: usize,
    /// Most component types one entity may carry at once.
    pub max_components_per_entity: usize,
}

impl SceneConfig {
    pub const DEFAULT_MAX_ENTITIES: usize = 5000;
    pub const DEFAULT_MAX_COMPONENTS: usize = 128;

    /// Parse a config from JSON and validate it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| SceneError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| SceneError::InvalidConfig(format!("{}: {e}", path.display())))?;
        let config = Self::from_json_str(&json)?;
        log::info!("loaded scene config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_entities == 0 {
            return Err(SceneError::InvalidConfig("max_entities must be at least 1".into()));
        }
        if self.max_entities > u32::MAX as usize {
            return Err(SceneError::InvalidConfig(format!(
                "max_entities {} does not fit an entity id",
                self.max_entities
            )));
        }
        Ok(())
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            max_entities: Self::DEFAULT_MAX_ENTITIES,
            max_components_per_entity: Self::DEFAULT_MAX_COMPONENTS,
        }
    }
}
