//! Application configuration structures.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::CarrierCode;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Mock lookup behavior
    #[serde(default)]
    pub tracking: TrackingConfig,

    /// Lookup history persistence
    #[serde(default)]
    pub history: HistoryConfig,

    /// Arrival reminder settings
    #[serde(default)]
    pub reminder: ReminderConfig,

    /// Reverse geocoding for the user's city
    #[serde(default)]
    pub locality: LocalityConfig,

    /// Carriers in detection order
    #[serde(default = "defaults::default_carriers")]
    pub carriers: Vec<CarrierConfig>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Apply environment overrides (`PORT`).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(port) = std::env::var("PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => log::warn!("Ignoring invalid PORT value '{}'", port),
            }
        }
        self
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(AppError::validation("server.port must be > 0"));
        }
        if self.tracking.latency_min_ms > self.tracking.latency_max_ms {
            return Err(AppError::validation(
                "tracking.latency_min_ms must not exceed tracking.latency_max_ms",
            ));
        }
        if !(0.0..=1.0).contains(&self.tracking.failure_rate) {
            return Err(AppError::validation(
                "tracking.failure_rate must be within [0, 1]",
            ));
        }
        if self.history.capacity == 0 {
            return Err(AppError::validation("history.capacity must be > 0"));
        }
        if self.history.file_name.trim().is_empty() {
            return Err(AppError::validation("history.file_name is empty"));
        }
        if self.carriers.is_empty() {
            return Err(AppError::validation("No carriers defined"));
        }

        let mut seen = HashSet::new();
        for carrier in &self.carriers {
            if !seen.insert(carrier.code) {
                return Err(AppError::validation(format!(
                    "carrier '{}' is defined more than once",
                    carrier.code
                )));
            }
            if carrier.patterns.is_empty() {
                return Err(AppError::validation(format!(
                    "carrier '{}' has no patterns",
                    carrier.code
                )));
            }
            for pattern in &carrier.patterns {
                Regex::new(pattern).map_err(|e| AppError::pattern(pattern, e))?;
            }
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            tracking: TrackingConfig::default(),
            history: HistoryConfig::default(),
            reminder: ReminderConfig::default(),
            locality: LocalityConfig::default(),
            carriers: defaults::default_carriers(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "defaults::host")]
    pub host: String,

    #[serde(default = "defaults::port")]
    pub port: u16,

    /// Directory served for paths no API route matches
    #[serde(default)]
    pub static_dir: Option<String>,

    /// Allowed CORS origins; empty allows any origin
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: defaults::host(),
            port: defaults::port(),
            static_dir: None,
            cors_allowed_origins: Vec::new(),
        }
    }
}

/// Mock lookup behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Lower bound of the simulated upstream latency
    #[serde(default = "defaults::latency_min")]
    pub latency_min_ms: u64,

    /// Upper bound of the simulated upstream latency
    #[serde(default = "defaults::latency_max")]
    pub latency_max_ms: u64,

    /// Probability that a lookup reports "not found"
    #[serde(default = "defaults::failure_rate")]
    pub failure_rate: f64,

    /// Fixed RNG seed for reproducible runs
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            latency_min_ms: defaults::latency_min(),
            latency_max_ms: defaults::latency_max(),
            failure_rate: defaults::failure_rate(),
            seed: None,
        }
    }
}

/// Lookup history persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Maximum number of entries kept
    #[serde(default = "defaults::history_capacity")]
    pub capacity: usize,

    /// Storage key, relative to the storage directory
    #[serde(default = "defaults::history_file")]
    pub file_name: String,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: defaults::history_capacity(),
            file_name: defaults::history_file(),
        }
    }
}

/// Arrival reminder settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderConfig {
    /// Delay between "scheduled" and "delivered"
    #[serde(default = "defaults::reminder_delay")]
    pub delay_secs: u64,

    /// City assumed when geolocation is unavailable
    #[serde(default = "defaults::default_city")]
    pub default_city: String,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            delay_secs: defaults::reminder_delay(),
            default_city: defaults::default_city(),
        }
    }
}

/// Reverse geocoding settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalityConfig {
    #[serde(default = "defaults::geocoder_url")]
    pub geocoder_url: String,

    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for LocalityConfig {
    fn default() -> Self {
        Self {
            geocoder_url: defaults::geocoder_url(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// A carrier and the tracking-number patterns that identify it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarrierConfig {
    pub code: CarrierCode,

    /// Display name (e.g., "京东快递")
    pub name: String,

    /// Regular expressions; any match selects the carrier
    pub patterns: Vec<String>,
}

mod defaults {
    use super::{CarrierCode, CarrierConfig};

    // Server defaults
    pub fn host() -> String {
        "127.0.0.1".into()
    }
    pub fn port() -> u16 {
        3000
    }

    // Tracking defaults
    pub fn latency_min() -> u64 {
        1000
    }
    pub fn latency_max() -> u64 {
        2000
    }
    pub fn failure_rate() -> f64 {
        0.1
    }

    // History defaults
    pub fn history_capacity() -> usize {
        20
    }
    pub fn history_file() -> String {
        "expressHistory.json".into()
    }

    // Reminder defaults
    pub fn reminder_delay() -> u64 {
        5
    }
    pub fn default_city() -> String {
        "北京".into()
    }

    // Locality defaults
    pub fn geocoder_url() -> String {
        "https://nominatim.openstreetmap.org/reverse".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; tracker/0.1)".into()
    }
    pub fn timeout() -> u64 {
        10
    }

    // Carrier defaults; YTO's bare-digit pattern is the catch-all and must stay last.
    // Prefixed numbers accept 8 digits or more across the two rules.
    pub fn default_carriers() -> Vec<CarrierConfig> {
        vec![
            CarrierConfig {
                code: CarrierCode::Jd,
                name: "京东快递".to_string(),
                patterns: vec![r"^JD\d{10,}$".to_string(), r"^JD\d{8,9}$".to_string()],
            },
            CarrierConfig {
                code: CarrierCode::Sf,
                name: "顺丰快递".to_string(),
                patterns: vec![
                    r"^SF\d{10,}$".to_string(),
                    r"^SF\d{8,9}$".to_string(),
                    r"^\d{12}$".to_string(),
                ],
            },
            CarrierConfig {
                code: CarrierCode::Yto,
                name: "圆通快递".to_string(),
                patterns: vec![
                    r"^YT\d{10,}$".to_string(),
                    r"^YT\d{8,9}$".to_string(),
                    r"^\d{10,}$".to_string(),
                ],
            },
        ]
    }
}
