// src/models/mod.rs

//! Domain models for the tracker application.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod carrier;
mod config;
mod history;
mod request;
mod session;
mod shipment;

// Re-export all public types
pub use carrier::{CarrierCode, CarrierInfo, CarrierMatch};
pub use config::{
    CarrierConfig, Config, HistoryConfig, LocalityConfig, ReminderConfig, ServerConfig,
    TrackingConfig,
};
pub use history::{HistoryRecord, push_history};
pub use request::{TrackingRequest, string_or_number};
pub use session::{Session, UserLocality};
pub use shipment::{PackageInfo, ShipmentRecord, ShipmentStatus, TimelineEvent};
