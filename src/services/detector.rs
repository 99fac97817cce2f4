//! Carrier detection from tracking-number shape.

use std::sync::Arc;

use crate::models::CarrierMatch;
use crate::services::CarrierRegistry;

/// First-match-wins carrier detector.
///
/// Carriers are tried in registry order, so a broad pattern declared late
/// (YTO's `^\d{10,}$`) only sees numbers every earlier carrier rejected.
#[derive(Debug, Clone)]
pub struct CarrierDetector {
    registry: Arc<CarrierRegistry>,
}

impl CarrierDetector {
    pub fn new(registry: Arc<CarrierRegistry>) -> Self {
        Self { registry }
    }

    /// Detect the carrier for a tracking number, `None` if unrecognized.
    pub fn detect(&self, tracking_number: &str) -> Option<CarrierMatch> {
        if tracking_number.is_empty() {
            return None;
        }

        let found = self
            .registry
            .iter()
            .find(|carrier| carrier.matches(tracking_number))
            .map(|carrier| CarrierMatch {
                code: carrier.code,
                name: carrier.name.clone(),
            });

        match &found {
            Some(m) => log::debug!("Detected carrier {} for {}", m.code, tracking_number),
            None => log::debug!("No carrier matches {}", tracking_number),
        }
        found
    }

    pub fn registry(&self) -> &CarrierRegistry {
        &self.registry
    }
}
