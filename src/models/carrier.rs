//! Carrier identifiers and lookup results.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Identifier of a supported carrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CarrierCode {
    Jd,
    Sf,
    Yto,
}

impl CarrierCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CarrierCode::Jd => "jd",
            CarrierCode::Sf => "sf",
            CarrierCode::Yto => "yto",
        }
    }
}

impl fmt::Display for CarrierCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CarrierCode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "jd" => Ok(CarrierCode::Jd),
            "sf" => Ok(CarrierCode::Sf),
            "yto" => Ok(CarrierCode::Yto),
            _ => Err(AppError::UnsupportedCarrier(s.to_string())),
        }
    }
}

/// Public view of a carrier, as listed by `/api/couriers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarrierInfo {
    pub code: CarrierCode,
    pub name: String,
}

/// A carrier the detector settled on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CarrierMatch {
    pub code: CarrierCode,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("JD".parse::<CarrierCode>().unwrap(), CarrierCode::Jd);
        assert_eq!(" yto ".parse::<CarrierCode>().unwrap(), CarrierCode::Yto);
    }

    #[test]
    fn test_unknown_code_is_unsupported() {
        let err = "ems".parse::<CarrierCode>().unwrap_err();
        assert!(matches!(err, AppError::UnsupportedCarrier(code) if code == "ems"));
        assert!("auto".parse::<CarrierCode>().is_err());
    }

    #[test]
    fn test_wire_form_is_lowercase() {
        let json = serde_json::to_string(&CarrierInfo {
            code: CarrierCode::Sf,
            name: "顺丰快递".into(),
        })
        .unwrap();
        assert_eq!(json, r#"{"code":"sf","name":"顺丰快递"}"#);
    }
}
