//! Scanning policy, and reading it from the stored preferences.

use crate::error::{Error, Result};
use serde_json::Value;

/// The preference keys as the preference store names them.
const HEURISTICS_KEY: &str = "guessLandmarks";
const DEVELOPER_MODE_KEY: &str = "debugInfo";

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct ScanOptions {
    /// Guess `main` and `navigation` landmarks when the page lacks them.
    pub heuristics: bool,
    /// Attach lint warnings to landmarks and the page.
    pub developer_mode: bool,
}

impl ScanOptions {
    /// Reads options from a JSON object of stored preferences. Keys for other
    /// settings are ignored, missing ones keep their default.
    pub fn from_preferences(json: &str) -> Result<Self> {
        let preferences: Value = serde_json::from_str(json)?;
        let preferences = preferences.as_object().ok_or_else(|| Error::InvalidPreference {
            name: "<root>".into(),
            reason: format!("expected an object, got {}", preferences),
        })?;

        let mut options = Self::default();
        for (name, value) in preferences {
            if name == HEURISTICS_KEY || name == DEVELOPER_MODE_KEY {
                options.set(name, value)?;
            }
        }
        Ok(options)
    }

    /// Applies a single stored preference.
    pub fn set(&mut self, name: &str, value: &Value) -> Result<()> {
        let flag = match name {
            HEURISTICS_KEY => &mut self.heuristics,
            DEVELOPER_MODE_KEY => &mut self.developer_mode,
            _ => {
                return Err(Error::InvalidPreference {
                    name: name.to_owned(),
                    reason: "unknown preference".into(),
                })
            },
        };
        *flag = value.as_bool().ok_or_else(|| Error::InvalidPreference {
            name: name.to_owned(),
            reason: format!("expected a boolean, got {}", value),
        })?;
        Ok(())
    }
}
