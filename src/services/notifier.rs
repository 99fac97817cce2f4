//! Arrival notification rule.

use serde::Serialize;

use crate::models::{ShipmentRecord, UserLocality};

/// Payload of an arrival reminder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrivalNotice {
    pub tracking_number: String,
    pub contact_address: String,
    pub locality_name: String,
    pub carrier_name: String,
}

impl ArrivalNotice {
    /// Reminder e-mail subject.
    pub fn subject(&self) -> String {
        format!("快递到达提醒 - {}", self.tracking_number)
    }

    /// Reminder e-mail body.
    pub fn body(&self) -> String {
        format!(
            "您的快递 {} 已到达 {}，请注意查收。",
            self.tracking_number, self.locality_name
        )
    }
}

/// Decides whether a lookup should trigger an arrival reminder.
#[derive(Debug, Clone, Default)]
pub struct ProximityNotifier;

impl ProximityNotifier {
    pub fn new() -> Self {
        Self
    }

    /// True iff the subscription is on, a contact address is given, the
    /// parcel is still moving, and some event mentions the user's city.
    pub fn should_notify(
        &self,
        record: &ShipmentRecord,
        locality: &UserLocality,
        subscription_active: bool,
        contact_address: Option<&str>,
    ) -> bool {
        if !subscription_active {
            return false;
        }
        if contact_address.is_none_or(|c| c.trim().is_empty()) {
            return false;
        }
        record.status.is_moving() && record.timeline.iter().any(|e| e.mentions(locality))
    }

    /// Evaluate the rule and build the notice when it fires.
    pub fn evaluate(
        &self,
        record: &ShipmentRecord,
        locality: &UserLocality,
        subscription_active: bool,
        contact_address: Option<&str>,
    ) -> Option<ArrivalNotice> {
        if !self.should_notify(record, locality, subscription_active, contact_address) {
            return None;
        }
        Some(ArrivalNotice {
            tracking_number: record.tracking_number.clone(),
            contact_address: contact_address?.trim().to_string(),
            locality_name: locality.city_name.clone(),
            carrier_name: record.carrier_name.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PackageInfo, ShipmentStatus, TimelineEvent};
    use chrono::{Duration, Utc};

    fn record(status: ShipmentStatus, locations: &[&str]) -> ShipmentRecord {
        let now = Utc::now();
        ShipmentRecord {
            tracking_number: "SF1234567890".into(),
            carrier_name: "顺丰快递".into(),
            status,
            status_label: status.label().into(),
            timeline: locations
                .iter()
                .enumerate()
                .map(|(i, loc)| TimelineEvent {
                    timestamp: now - Duration::hours(i as i64),
                    status_text: "快件运输中，预计明天到达".into(),
                    location: loc.to_string(),
                })
                .collect(),
            package_info: PackageInfo {
                recipient_name: "张先生".into(),
                recipient_phone: "138****8888".into(),
                recipient_address: "北京市朝阳区某某街道某某小区".into(),
                weight: "1.2kg".into(),
            },
        }
    }

    #[test]
    fn test_fires_for_moving_parcel_in_city() {
        let notifier = ProximityNotifier::new();
        let beijing = UserLocality::new("北京");
        for status in [ShipmentStatus::InTransit, ShipmentStatus::OutForDelivery] {
            let r = record(status, &["上海", "北京"]);
            assert!(notifier.should_notify(&r, &beijing, true, Some("me@example.com")));
        }
    }

    #[test]
    fn test_inactive_subscription_never_fires() {
        let notifier = ProximityNotifier::new();
        let beijing = UserLocality::new("北京");
        for status in ShipmentStatus::ALL {
            let r = record(status, &["北京"]);
            assert!(!notifier.should_notify(&r, &beijing, false, Some("me@example.com")));
        }
    }

    #[test]
    fn test_requires_contact() {
        let notifier = ProximityNotifier::new();
        let r = record(ShipmentStatus::InTransit, &["北京"]);
        let beijing = UserLocality::new("北京");
        assert!(!notifier.should_notify(&r, &beijing, true, None));
        assert!(!notifier.should_notify(&r, &beijing, true, Some("   ")));
    }

    #[test]
    fn test_settled_status_does_not_fire() {
        let notifier = ProximityNotifier::new();
        let beijing = UserLocality::new("北京");
        for status in [ShipmentStatus::Delivered, ShipmentStatus::Collected] {
            let r = record(status, &["北京"]);
            assert!(!notifier.should_notify(&r, &beijing, true, Some("me@example.com")));
        }
    }

    #[test]
    fn test_other_city_does_not_fire() {
        let notifier = ProximityNotifier::new();
        let r = record(ShipmentStatus::InTransit, &["上海", "广州"]);
        let chengdu = UserLocality::new("成都");
        assert!(!notifier.should_notify(&r, &chengdu, true, Some("me@example.com")));
    }

    #[test]
    fn test_evaluate_builds_notice() {
        let notifier = ProximityNotifier::new();
        let r = record(ShipmentStatus::OutForDelivery, &["杭州"]);
        let notice = notifier
            .evaluate(&r, &UserLocality::new("杭州"), true, Some(" me@example.com "))
            .unwrap();

        assert_eq!(notice.contact_address, "me@example.com");
        assert_eq!(notice.carrier_name, "顺丰快递");
        assert_eq!(notice.subject(), "快递到达提醒 - SF1234567890");
        assert_eq!(notice.body(), "您的快递 SF1234567890 已到达 杭州，请注意查收。");
    }
}
