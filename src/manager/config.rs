use serde::{Deserialize, Serialize};

use crate::error::BindingError;

/// Manager-wide settings.
///
/// ```
/// use bound_rust::BindingConfig;
///
/// let config = BindingConfig::from_json(r#"{ "ui_confined_by_default": false }"#).unwrap();
/// assert!(!config.ui_confined_by_default);
/// assert!(config.warn_unconfigured);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BindingConfig {
    /// Initial UI-confined flag of every new binder.
    pub ui_confined_by_default: bool,
    /// Log exchanges on unconfigured binders at `warn` instead of `debug`.
    pub warn_unconfigured: bool,
    /// Broadcast an `ExchangeRecord` after each exchange the manager runs.
    pub emit_exchange_events: bool,
}

impl Default for BindingConfig {
    fn default() -> Self {
        BindingConfig {
            ui_confined_by_default: true,
            warn_unconfigured: true,
            emit_exchange_events: true,
        }
    }
}

impl BindingConfig {
    pub fn from_json(json: &str) -> Result<Self, BindingError> {
        serde_json::from_str(json).map_err(|e| BindingError::Config(e.to_string()))
    }
}
