//! Registry Settings
//!
//! [`RegistrySettings`] controls bring-up of a [`World`](crate::World):
//! how many entities the allocator may hold, whether the built-in system
//! resources are created, and how loudly duplicate registrations are
//! reported.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use scene_registry::{RegistrySettings, World};
//!
//! let settings = RegistrySettings::from_json_str(r#"{ "entity_capacity": 4096 }"#)?;
//! let world = World::new(settings)?;
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrySettings {
    /// Maximum number of simultaneously live entities.
    pub entity_capacity: u32,
    /// Create the default material, material instance and texture at
    /// bring-up. These are system resources.
    pub create_system_resources: bool,
    /// Log a warning when the same native handle is registered twice.
    pub warn_on_duplicate_registration: bool,
    pub default_material_name: String,
    pub default_material_instance_name: String,
    pub default_texture_name: String,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            entity_capacity: 1 << 16,
            create_system_resources: true,
            warn_on_duplicate_registration: true,
            default_material_name: "DEFAULT_MATERIAL".to_string(),
            default_material_instance_name: "DEFAULT_MATERIAL_INSTANCE".to_string(),
            default_texture_name: "DEFAULT_WHITE_TEXTURE".to_string(),
        }
    }
}

impl RegistrySettings {
    /// Settings without system resources; handy for isolated tests.
    #[must_use]
    pub fn bare() -> Self {
        Self {
            create_system_resources: false,
            ..Default::default()
        }
    }

    /// Parses settings from JSON. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
