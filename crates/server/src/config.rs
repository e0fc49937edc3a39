//! Core configuration.
//!
//! Every field has a default, so a TOML file only needs the keys it changes.

use realmkeep_geometry::{Border, CostSchedule, Point};
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// Defaults
// ============================================================================

/// Minimum spacing between two routed inputs from one user.
pub const DEFAULT_COOLDOWN_MS: u64 = 150;

/// Ticks a preview stays visible before it is committed.
pub const DEFAULT_PREVIEW_DELAY_TICKS: u64 = 100;

/// Ticks without input before a session is dropped.
pub const DEFAULT_SESSION_IDLE_TICKS: u64 = 6000;

/// Ticks a committed change pushes the world's expiry forward.
pub const DEFAULT_RETENTION_TICKS: u64 = 20 * 60 * 60 * 24 * 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("{field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub cooldown_ms: u64,
    pub preview_delay_ticks: u64,
    pub session_idle_ticks: u64,
    pub retention_ticks: u64,
    /// Free-text word that backs out of any prompt.
    pub cancel_word: String,
    pub text: TextLimits,
    pub expansion: ExpansionConfig,
    pub overlay: OverlayConfig,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: DEFAULT_COOLDOWN_MS,
            preview_delay_ticks: DEFAULT_PREVIEW_DELAY_TICKS,
            session_idle_ticks: DEFAULT_SESSION_IDLE_TICKS,
            retention_ticks: DEFAULT_RETENTION_TICKS,
            cancel_word: "cancel".to_string(),
            text: TextLimits::default(),
            expansion: ExpansionConfig::default(),
            overlay: OverlayConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TextLimits {
    pub name_min: usize,
    pub name_max: usize,
    pub description_max: usize,
    pub announcement_max_lines: usize,
    pub announcement_max_line_len: usize,
    /// Case-insensitive substrings rejected in any player-written text.
    pub forbidden: Vec<String>,
    /// Tags a world may carry.
    pub tags: Vec<String>,
}

impl Default for TextLimits {
    fn default() -> Self {
        Self {
            name_min: 3,
            name_max: 24,
            description_max: 120,
            announcement_max_lines: 5,
            announcement_max_line_len: 80,
            forbidden: Vec::new(),
            tags: ["building", "survival", "creative", "minigame", "social"]
                .map(String::from)
                .to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExpansionConfig {
    /// Side length of a new or reset border. Must be a positive even integer.
    pub initial_size: f64,
    pub max_level: Option<u32>,
    pub refund_rate: f64,
    pub costs: CostSchedule,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            initial_size: 100.0,
            max_level: Some(10),
            refund_rate: 0.5,
            costs: CostSchedule::default(),
        }
    }
}

impl ExpansionConfig {
    pub fn initial_border(&self) -> Border {
        Border::new(Point::ORIGIN, self.initial_size)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Overlay labels players may pick.
    pub labels: Vec<String>,
    pub global_margin: i32,
    pub min_radius: i32,
    pub max_radius: i32,
    pub global_cost: u64,
    pub partial_cost_per_radius: u64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            labels: ["plains", "desert", "snowy_taiga", "jungle", "mushroom_fields"]
                .map(String::from)
                .to_vec(),
            global_margin: 16,
            min_radius: 1,
            max_radius: 64,
            global_cost: 500,
            partial_cost_per_radius: 10,
        }
    }
}

impl CoreConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: CoreConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let size = self.expansion.initial_size;
        if !(size > 0.0 && size.fract() == 0.0 && size % 2.0 == 0.0) {
            return Err(ConfigError::Invalid {
                field: "expansion.initial_size",
                reason: format!("must be a positive even integer, got {size}"),
            });
        }
        if !(0.0..=1.0).contains(&self.expansion.refund_rate) {
            return Err(ConfigError::Invalid {
                field: "expansion.refund_rate",
                reason: format!("must be within [0, 1], got {}", self.expansion.refund_rate),
            });
        }
        if self.preview_delay_ticks == 0 {
            return Err(ConfigError::Invalid {
                field: "preview_delay_ticks",
                reason: "must be at least one tick".to_string(),
            });
        }
        if self.cancel_word.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "cancel_word",
                reason: "must not be empty".to_string(),
            });
        }
        if self.text.name_min == 0 || self.text.name_min > self.text.name_max {
            return Err(ConfigError::Invalid {
                field: "text.name_min",
                reason: format!(
                    "need 0 < name_min <= name_max, got {}..={}",
                    self.text.name_min, self.text.name_max
                ),
            });
        }
        if self.overlay.min_radius < 0 || self.overlay.min_radius > self.overlay.max_radius {
            return Err(ConfigError::Invalid {
                field: "overlay.min_radius",
                reason: format!(
                    "need 0 <= min_radius <= max_radius, got {}..={}",
                    self.overlay.min_radius, self.overlay.max_radius
                ),
            });
        }
        Ok(())
    }
}
