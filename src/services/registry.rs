//! Carrier registry.
//!
//! Compiles each configured carrier's patterns once and keeps them in
//! declaration order. Nothing is mutated after construction.

use regex::Regex;

use crate::error::{AppError, Result};
use crate::models::{CarrierCode, CarrierConfig, CarrierInfo, Config};

/// A carrier with its compiled matchers.
#[derive(Debug, Clone)]
pub struct Carrier {
    pub code: CarrierCode,
    pub name: String,
    pub patterns: Vec<Regex>,
}

impl Carrier {
    /// True if any pattern matches the tracking number.
    pub fn matches(&self, tracking_number: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(tracking_number))
    }

    pub fn info(&self) -> CarrierInfo {
        CarrierInfo {
            code: self.code,
            name: self.name.clone(),
        }
    }
}

/// Ordered, immutable carrier table.
#[derive(Debug, Clone)]
pub struct CarrierRegistry {
    carriers: Vec<Carrier>,
}

impl CarrierRegistry {
    /// Build a registry from configuration, compiling every pattern.
    pub fn from_config(carriers: &[CarrierConfig]) -> Result<Self> {
        let carriers = carriers
            .iter()
            .map(|c| {
                let patterns = c
                    .patterns
                    .iter()
                    .map(|p| Regex::new(p).map_err(|e| AppError::pattern(p, e)))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Carrier {
                    code: c.code,
                    name: c.name.clone(),
                    patterns,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        if carriers.is_empty() {
            return Err(AppError::config("carrier registry is empty"));
        }

        Ok(Self { carriers })
    }

    /// Registry with the three built-in carriers.
    pub fn builtin() -> Result<Self> {
        Self::from_config(&Config::default().carriers)
    }

    /// Look up a carrier by code.
    pub fn get(&self, code: CarrierCode) -> Option<&Carrier> {
        self.carriers.iter().find(|c| c.code == code)
    }

    /// Matchers of a carrier, empty if the code is not registered.
    pub fn lookup_patterns(&self, code: CarrierCode) -> &[Regex] {
        self.get(code).map(|c| c.patterns.as_slice()).unwrap_or(&[])
    }

    /// Every carrier in declaration order.
    pub fn all(&self) -> Vec<CarrierInfo> {
        self.carriers.iter().map(Carrier::info).collect()
    }

    /// Iterate carriers in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Carrier> {
        self.carriers.iter()
    }
}
