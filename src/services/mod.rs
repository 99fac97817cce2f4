//! Service layer for the tracker application.
//!
//! This module contains the business logic for:
//! - Carrier lookup tables (`CarrierRegistry`)
//! - Carrier detection (`CarrierDetector`)
//! - Mock timeline generation (`MockTimelineGenerator`)
//! - Arrival reminders (`ProximityNotifier`, `ReminderScheduler`)
//! - User city resolution (`locality`)
//! - Lookup orchestration (`TrackingService`)

mod detector;
pub mod locality;
mod notifier;
mod registry;
mod reminder;
mod timeline;
mod tracking;

pub use detector::CarrierDetector;
pub use locality::Coordinates;
pub use notifier::{ArrivalNotice, ProximityNotifier};
pub use registry::{Carrier, CarrierRegistry};
pub use reminder::{ReminderEvent, ReminderScheduler, SubscriptionId};
pub use timeline::MockTimelineGenerator;
pub use tracking::TrackingService;
