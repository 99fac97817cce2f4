//! Mock shipment timeline generator.
//!
//! Output has a fixed shape (3 to 7 events, newest first, full package
//! metadata) while status, times, cities and phrases are random. All
//! randomness comes from the caller's RNG so a seeded generator replays
//! exactly.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use crate::models::{PackageInfo, ShipmentRecord, ShipmentStatus, TimelineEvent};
use crate::utils::mask_phone;

/// Events are spread over this many days before `now`.
const WINDOW_DAYS: i64 = 7;
const MIN_EVENTS: usize = 3;
const MAX_EVENTS: usize = 7;

const LOCATIONS: [&str; 8] = [
    "北京", "上海", "广州", "深圳", "杭州", "成都", "武汉", "西安",
];

const ACTIONS: [&str; 6] = [
    "快件已签收，签收人：门卫",
    "快件正在派送中，请保持电话畅通",
    "快件已到达派送点，准备派送",
    "快件运输中，预计明天到达",
    "快件已发出，正在运输途中",
    "快件已揽收，准备发出",
];

const RECIPIENT_NAME: &str = "张先生";
const RECIPIENT_PHONE: &str = "13800008888";
const RECIPIENT_ADDRESS: &str = "北京市朝阳区某某街道某某小区";
const PACKAGE_WEIGHT: &str = "1.2kg";

/// Builds randomized but well-formed shipment records.
#[derive(Debug, Clone, Default)]
pub struct MockTimelineGenerator;

impl MockTimelineGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Generate a shipment record. Never fails.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        tracking_number: &str,
        carrier_name: &str,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> ShipmentRecord {
        let status = ShipmentStatus::ALL[rng.gen_range(0..ShipmentStatus::ALL.len())];
        let count = rng.gen_range(MIN_EVENTS..=MAX_EVENTS);

        ShipmentRecord {
            tracking_number: tracking_number.to_string(),
            carrier_name: carrier_name.to_string(),
            status,
            status_label: status.label().to_string(),
            timeline: Self::timeline(count, now, rng),
            package_info: Self::package_info(),
        }
    }

    /// `count` events with distinct timestamps, newest first.
    fn timeline<R: Rng + ?Sized>(
        count: usize,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Vec<TimelineEvent> {
        let window_ms = Duration::days(WINDOW_DAYS).num_milliseconds();

        // Distinct offsets keep the ordering strict; ascending offset is descending time.
        let mut offsets = BTreeSet::new();
        while offsets.len() < count {
            offsets.insert(rng.gen_range(0..window_ms));
        }

        offsets
            .into_iter()
            .map(|offset| TimelineEvent {
                timestamp: now - Duration::milliseconds(offset),
                location: LOCATIONS[rng.gen_range(0..LOCATIONS.len())].to_string(),
                status_text: ACTIONS[rng.gen_range(0..ACTIONS.len())].to_string(),
            })
            .collect()
    }

    fn package_info() -> PackageInfo {
        PackageInfo {
            recipient_name: RECIPIENT_NAME.to_string(),
            recipient_phone: mask_phone(RECIPIENT_PHONE),
            recipient_address: RECIPIENT_ADDRESS.to_string(),
            weight: PACKAGE_WEIGHT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use regex::Regex;

    fn generate(seed: u64) -> (ShipmentRecord, DateTime<Utc>) {
        let now = Utc::now();
        let mut rng = StdRng::seed_from_u64(seed);
        let record = MockTimelineGenerator::new().generate("JD12345678901", "京东快递", now, &mut rng);
        (record, now)
    }

    #[test]
    fn test_timeline_shape_over_many_seeds() {
        for seed in 0..500 {
            let (record, now) = generate(seed);
            let len = record.timeline.len();
            assert!((MIN_EVENTS..=MAX_EVENTS).contains(&len), "len {len}");

            for pair in record.timeline.windows(2) {
                assert!(pair[0].timestamp > pair[1].timestamp);
            }
            for event in &record.timeline {
                assert!(event.timestamp <= now);
                assert!(event.timestamp > now - Duration::days(WINDOW_DAYS));
                assert!(LOCATIONS.contains(&event.location.as_str()));
                assert!(ACTIONS.contains(&event.status_text.as_str()));
            }
        }
    }

    #[test]
    fn test_same_seed_same_record() {
        let now = Utc::now();
        let generator = MockTimelineGenerator::new();
        let a = generator.generate("SF12345678", "顺丰快递", now, &mut StdRng::seed_from_u64(9));
        let b = generator.generate("SF12345678", "顺丰快递", now, &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }

    #[test]
    fn test_record_carries_inputs() {
        let (record, _) = generate(1);
        assert_eq!(record.tracking_number, "JD12345678901");
        assert_eq!(record.carrier_name, "京东快递");
        assert_eq!(record.status_label, record.status.label());
    }

    #[test]
    fn test_package_info_is_masked() {
        let (record, _) = generate(2);
        let phone = Regex::new(r"^\d{3}\*{4}\d{4}$").unwrap();
        assert!(phone.is_match(&record.package_info.recipient_phone));
        assert!(!record.package_info.recipient_name.is_empty());
        assert!(!record.package_info.recipient_address.is_empty());
        assert_eq!(record.package_info.weight, "1.2kg");
    }

    #[test]
    fn test_every_status_is_reachable() {
        let mut seen = std::collections::HashSet::new();
        for seed in 0..200 {
            seen.insert(generate(seed).0.status);
        }
        assert_eq!(seen.len(), ShipmentStatus::ALL.len());
    }
}
