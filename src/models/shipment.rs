//! Shipment records produced by a lookup.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::UserLocality;

/// Overall state of a shipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentStatus {
    Collected,
    InTransit,
    OutForDelivery,
    Delivered,
}

impl ShipmentStatus {
    pub const ALL: [ShipmentStatus; 4] = [
        ShipmentStatus::Delivered,
        ShipmentStatus::InTransit,
        ShipmentStatus::OutForDelivery,
        ShipmentStatus::Collected,
    ];

    /// Display text for the status.
    pub fn label(&self) -> &'static str {
        match self {
            ShipmentStatus::Collected => "已揽收",
            ShipmentStatus::InTransit => "运输中",
            ShipmentStatus::OutForDelivery => "派送中",
            ShipmentStatus::Delivered => "已签收",
        }
    }

    /// Badge class used by the front-end.
    pub fn badge(&self) -> &'static str {
        match self {
            ShipmentStatus::Delivered => "delivered",
            ShipmentStatus::InTransit | ShipmentStatus::OutForDelivery => "in-transit",
            ShipmentStatus::Collected => "pending",
        }
    }

    /// The parcel is on its way and has not been signed for.
    pub fn is_moving(&self) -> bool {
        matches!(self, ShipmentStatus::InTransit | ShipmentStatus::OutForDelivery)
    }
}

/// One status update in a shipment's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEvent {
    pub timestamp: DateTime<Utc>,
    pub status_text: String,
    pub location: String,
}

impl TimelineEvent {
    /// Whether the event's location or text names the given city.
    pub fn mentions(&self, locality: &UserLocality) -> bool {
        let city = locality.city_name.trim();
        !city.is_empty() && (self.location.contains(city) || self.status_text.contains(city))
    }
}

/// Recipient and parcel metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageInfo {
    pub recipient_name: String,
    /// Always masked, e.g. `138****8888`
    pub recipient_phone: String,
    pub recipient_address: String,
    pub weight: String,
}

/// Full result of a successful lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentRecord {
    pub tracking_number: String,
    pub carrier_name: String,
    pub status: ShipmentStatus,
    /// Mirrors `status.label()` for clients that only render text
    pub status_label: String,
    /// Most recent first
    pub timeline: Vec<TimelineEvent>,
    pub package_info: PackageInfo,
}
