//! Form-wide settings.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::DEFAULT_SLOTS_PROP;

/// Errors raised while loading [`FormSettings`].
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings document is not valid JSON or has unknown keys.
    #[error("invalid form settings: {reason}")]
    Invalid {
        reason: String,
        #[source]
        source: serde_json::Error,
    },
}

impl SettingsError {
    /// Check if this error comes from a malformed document
    pub fn is_invalid(&self) -> bool {
        matches!(self, SettingsError::Invalid { .. })
    }
}

impl From<SettingsError> for crate::Error {
    fn from(err: SettingsError) -> Self {
        crate::Error::Settings(err)
    }
}

/// Settings applied when resolving form graphs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormSettings {
    /// Prop name dependency slots are injected under when neither the level
    /// nor the config names one.
    pub slots_prop_name: String,
    /// Turn references to unregistered modules into errors instead of
    /// placeholders.
    pub strict_references: bool,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            slots_prop_name: DEFAULT_SLOTS_PROP.to_owned(),
            strict_references: false,
        }
    }
}

impl FormSettings {
    /// Parses settings from a JSON document. Missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        serde_json::from_str(json).map_err(|source| SettingsError::Invalid {
            reason: source.to_string(),
            source,
        })
    }

    pub fn strict(mut self) -> Self {
        self.strict_references = true;
        self
    }
}
