//! Tunables shared by solver-side helpers.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid settings JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid setting {name}: {value} (must be finite and positive)")]
    NotPositive { name: &'static str, value: f64 },
}

/// Numeric settings; missing JSON fields fall back to [`Settings::default`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Coefficient passed to [`Constraint::rescale`](crate::constraints::Constraint::rescale).
    pub rescale_coefficient: f64,
    /// Half-width of the centered difference used by gradient checks.
    pub finite_difference_step: f64,
    /// Relative tolerance of gradient checks.
    pub gradient_tolerance: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rescale_coefficient: 1.0,
            finite_difference_step: 1e-6,
            gradient_tolerance: 1e-5,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("rescale_coefficient", self.rescale_coefficient),
            ("finite_difference_step", self.finite_difference_step),
            ("gradient_tolerance", self.gradient_tolerance),
        ];
        for (name, value) in fields {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NotPositive { name, value });
            }
        }
        Ok(())
    }
}
