//! Per-user application state for the interactive front-end.

use serde::{Deserialize, Serialize};

use crate::services::SubscriptionId;

/// City the user is in, resolved once per session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserLocality {
    pub city_name: String,
}

impl UserLocality {
    pub fn new(city_name: impl Into<String>) -> Self {
        Self {
            city_name: city_name.into(),
        }
    }
}

/// Explicit state of one front-end session.
///
/// Holds what the page used to keep in DOM-bound fields: where the user is,
/// which address reminders go to, and whether the reminder toggle is on.
#[derive(Debug, Clone)]
pub struct Session {
    pub locality: UserLocality,
    pub contact: Option<String>,
    pub subscription: Option<SubscriptionId>,
}

impl Session {
    pub fn new(locality: UserLocality) -> Self {
        Self {
            locality,
            contact: None,
            subscription: None,
        }
    }

    /// Reminder toggle state.
    pub fn reminder_enabled(&self) -> bool {
        self.subscription.is_some()
    }
}
