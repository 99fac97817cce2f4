//! Lookup request payloads.

use serde::{Deserialize, Deserializer};

use crate::error::Result;
use crate::models::CarrierCode;

/// One tracking lookup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrackingRequest {
    #[serde(
        default,
        rename = "trackingNumber",
        deserialize_with = "string_or_number"
    )]
    pub tracking_number: Option<String>,

    /// Carrier code, or `"auto"` / absent to detect from the number
    #[serde(default, rename = "courier")]
    pub carrier_override: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(serde_json::Number),
}

/// Accept a tracking number sent either as a JSON string or a bare number.
pub fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<StringOrNumber>::deserialize(deserializer)?;
    Ok(value.map(|v| match v {
        StringOrNumber::String(s) => s,
        StringOrNumber::Number(n) => n.to_string(),
    }))
}

impl TrackingRequest {
    /// Request with carrier auto-detection.
    pub fn auto(tracking_number: impl Into<String>) -> Self {
        Self {
            tracking_number: Some(tracking_number.into()),
            carrier_override: None,
        }
    }

    /// Request pinned to a carrier.
    pub fn with_carrier(tracking_number: impl Into<String>, carrier: impl Into<String>) -> Self {
        Self {
            tracking_number: Some(tracking_number.into()),
            carrier_override: Some(carrier.into()),
        }
    }

    /// Trimmed tracking number, empty when absent.
    pub fn number(&self) -> &str {
        self.tracking_number.as_deref().map(str::trim).unwrap_or("")
    }

    /// Parsed carrier override; `None` means auto-detect.
    pub fn carrier(&self) -> Result<Option<CarrierCode>> {
        match self.carrier_override.as_deref().map(str::trim) {
            None | Some("") | Some("auto") => Ok(None),
            Some(code) => code.parse().map(Some),
        }
    }
}
