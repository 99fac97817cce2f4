//! Delayed arrival reminders.
//!
//! A reminder is acknowledged immediately and "delivered" after a fixed
//! delay. Delivery re-checks the subscription when the timer fires, so
//! turning the toggle off cancels reminders already in flight.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::services::ArrivalNotice;

/// Handle of a reminder subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Reminder lifecycle events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderEvent {
    /// Reminder accepted; fired right away
    Scheduled {
        subscription: SubscriptionId,
        notice: ArrivalNotice,
    },
    /// Reminder sent after the delay
    Delivered {
        subscription: SubscriptionId,
        notice: ArrivalNotice,
    },
}

impl ReminderEvent {
    pub fn notice(&self) -> &ArrivalNotice {
        match self {
            ReminderEvent::Scheduled { notice, .. } | ReminderEvent::Delivered { notice, .. } => {
                notice
            }
        }
    }
}

type Subscriptions = Arc<Mutex<HashMap<SubscriptionId, String>>>;

/// Keeps reminder subscriptions and fires delayed deliveries.
pub struct ReminderScheduler {
    delay: Duration,
    next_id: AtomicU64,
    subscriptions: Subscriptions,
    events: mpsc::UnboundedSender<ReminderEvent>,
}

impl ReminderScheduler {
    /// Create a scheduler and the receiving end of its event stream.
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<ReminderEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            delay,
            next_id: AtomicU64::new(1),
            subscriptions: Arc::new(Mutex::new(HashMap::new())),
            events,
        };
        (scheduler, rx)
    }

    fn lock(subscriptions: &Subscriptions) -> MutexGuard<'_, HashMap<SubscriptionId, String>> {
        subscriptions.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register a contact address for reminders.
    pub fn subscribe(&self, contact: impl Into<String>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        Self::lock(&self.subscriptions).insert(id, contact.into());
        log::debug!("Reminder subscription {} created", id);
        id
    }

    /// Drop a subscription. Returns false if it was not active.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = Self::lock(&self.subscriptions).remove(&id).is_some();
        if removed {
            log::debug!("Reminder subscription {} cancelled", id);
        }
        removed
    }

    pub fn is_active(&self, id: SubscriptionId) -> bool {
        Self::lock(&self.subscriptions).contains_key(&id)
    }

    /// Contact address of an active subscription.
    pub fn contact(&self, id: SubscriptionId) -> Option<String> {
        Self::lock(&self.subscriptions).get(&id).cloned()
    }

    /// Acknowledge a reminder now and deliver it after the delay.
    ///
    /// Returns `None` without emitting anything if the subscription is not
    /// active.
    pub fn schedule(&self, id: SubscriptionId, notice: ArrivalNotice) -> Option<JoinHandle<()>> {
        if !self.is_active(id) {
            return None;
        }

        log::info!(
            "Arrival reminder scheduled for {} -> {} ({})",
            notice.tracking_number,
            notice.contact_address,
            notice.locality_name
        );
        let _ = self.events.send(ReminderEvent::Scheduled {
            subscription: id,
            notice: notice.clone(),
        });

        let delay = self.delay;
        let subscriptions = Arc::clone(&self.subscriptions);
        let events = self.events.clone();

        Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            if !Self::lock(&subscriptions).contains_key(&id) {
                log::info!(
                    "Reminder for {} dropped: subscription {} no longer active",
                    notice.tracking_number,
                    id
                );
                return;
            }

            log::info!("Sending reminder to {}: {}", notice.contact_address, notice.subject());
            if events
                .send(ReminderEvent::Delivered {
                    subscription: id,
                    notice,
                })
                .is_err()
            {
                log::debug!("Reminder receiver closed");
            }
        }))
    }
}
