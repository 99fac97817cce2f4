//! Tracking lookup orchestration.
//!
//! One lookup runs validation, carrier resolution, simulated upstream
//! latency, the injected "not found" roll, timeline generation and the
//! history update, in that order. A lookup yields either a complete record
//! or an error, never both.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{AppError, Result};
use crate::models::{
    CarrierCode, CarrierInfo, CarrierMatch, Config, HistoryRecord, Session, ShipmentRecord,
    TrackingConfig, TrackingRequest,
};
use crate::services::{
    CarrierDetector, CarrierRegistry, MockTimelineGenerator, ProximityNotifier, ReminderScheduler,
    SubscriptionId,
};
use crate::storage::HistoryStore;
use crate::utils::is_valid_email;

/// Entry point shared by the HTTP server and the interactive front-end.
pub struct TrackingService {
    config: TrackingConfig,
    detector: CarrierDetector,
    generator: MockTimelineGenerator,
    notifier: ProximityNotifier,
    reminders: Option<ReminderScheduler>,
    history: Arc<dyn HistoryStore>,
    rng: Mutex<StdRng>,
}

impl TrackingService {
    /// Create a service from configuration. The configuration is validated first.
    pub fn new(config: &Config, history: Arc<dyn HistoryStore>) -> Result<Self> {
        config.validate()?;
        let tracking = config.tracking.clone();

        let registry = Arc::new(CarrierRegistry::from_config(&config.carriers)?);
        let rng = match tracking.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            config: tracking,
            detector: CarrierDetector::new(registry),
            generator: MockTimelineGenerator::new(),
            notifier: ProximityNotifier::new(),
            reminders: None,
            history,
            rng: Mutex::new(rng),
        })
    }

    /// Attach a reminder scheduler for front-end sessions.
    pub fn with_reminders(mut self, scheduler: ReminderScheduler) -> Self {
        self.reminders = Some(scheduler);
        self
    }

    fn rng(&self) -> MutexGuard<'_, StdRng> {
        self.rng.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Carrier list in detection order.
    pub fn couriers(&self) -> Vec<CarrierInfo> {
        self.detector.registry().all()
    }

    /// Detect the carrier of a tracking number.
    pub fn detect(&self, tracking_number: &str) -> Option<CarrierMatch> {
        self.detector.detect(tracking_number.trim())
    }

    /// Format check behind `/api/validate`.
    pub fn validate(&self, tracking_number: &str) -> Result<Option<CarrierMatch>> {
        let number = tracking_number.trim();
        if number.is_empty() {
            return Err(AppError::EmptyInput);
        }
        Ok(self.detector.detect(number))
    }

    fn resolve_carrier(&self, number: &str, code: Option<CarrierCode>) -> Result<CarrierMatch> {
        match code {
            None => self
                .detector
                .detect(number)
                .ok_or_else(|| AppError::UnrecognizedCarrier(number.to_string())),
            Some(code) => self
                .detector
                .registry()
                .get(code)
                .map(|c| CarrierMatch {
                    code: c.code,
                    name: c.name.clone(),
                })
                .ok_or_else(|| AppError::UnsupportedCarrier(code.to_string())),
        }
    }

    fn latency(&self) -> Duration {
        let ms = self
            .rng()
            .gen_range(self.config.latency_min_ms..=self.config.latency_max_ms);
        Duration::from_millis(ms)
    }

    /// Look up one tracking number.
    pub async fn track(&self, request: &TrackingRequest) -> Result<ShipmentRecord> {
        let number = request.number();
        if number.is_empty() {
            return Err(AppError::EmptyInput);
        }
        let carrier = self.resolve_carrier(number, request.carrier()?)?;
        log::info!("Tracking {} via {}", number, carrier.name);

        let latency = self.latency();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        if self.rng().gen_bool(self.config.failure_rate) {
            log::info!("Lookup for {} reported not found", number);
            return Err(AppError::NotFound(number.to_string()));
        }

        let record = {
            let mut rng = self.rng();
            self.generator
                .generate(number, &carrier.name, Utc::now(), &mut *rng)
        };

        if let Err(e) = self
            .history
            .record(HistoryRecord::new(number, &carrier.name))
            .await
        {
            log::warn!("Failed to record history for {}: {}", number, e);
        }

        log::debug!(
            "Lookup for {} done: {} with {} events",
            number,
            record.status.label(),
            record.timeline.len()
        );
        Ok(record)
    }

    /// Front-end search: auto-detect, look up, then arm an arrival reminder
    /// when the proximity rule fires.
    pub async fn search(&self, session: &Session, tracking_number: &str) -> Result<ShipmentRecord> {
        let record = self.track(&TrackingRequest::auto(tracking_number)).await?;
        self.check_reminder(session, &record);
        Ok(record)
    }

    fn check_reminder(&self, session: &Session, record: &ShipmentRecord) -> Option<SubscriptionId> {
        let scheduler = self.reminders.as_ref()?;
        let id = session.subscription?;

        // The scheduler owns the address; a missing entry means the subscription is gone.
        let contact = scheduler.contact(id);
        let notice = self.notifier.evaluate(
            record,
            &session.locality,
            contact.is_some(),
            contact.as_deref(),
        )?;
        scheduler.schedule(id, notice).map(|_| id)
    }

    /// Turn the reminder toggle on for a session.
    pub fn enable_reminder(&self, session: &mut Session, contact: &str) -> Result<SubscriptionId> {
        let scheduler = self
            .reminders
            .as_ref()
            .ok_or_else(|| AppError::config("arrival reminders are not enabled"))?;

        let contact = contact.trim();
        if !is_valid_email(contact) {
            return Err(AppError::validation("请输入有效的邮箱地址"));
        }

        if let Some(previous) = session.subscription.take() {
            scheduler.unsubscribe(previous);
        }
        let id = scheduler.subscribe(contact);
        session.contact = Some(contact.to_string());
        session.subscription = Some(id);
        log::info!("Arrival reminder enabled for {}", contact);
        Ok(id)
    }

    /// Turn the reminder toggle off; pending deliveries are dropped.
    pub fn disable_reminder(&self, session: &mut Session) {
        if let (Some(scheduler), Some(id)) = (self.reminders.as_ref(), session.subscription.take())
        {
            scheduler.unsubscribe(id);
            log::info!("Arrival reminder disabled");
        }
    }

    /// Past lookups, newest first.
    pub async fn history(&self) -> Result<Vec<HistoryRecord>> {
        self.history.load().await
    }

    pub async fn clear_history(&self) -> Result<()> {
        self.history.clear().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserLocality;
    use crate::services::ReminderEvent;
    use crate::storage::MemoryHistoryStore;

    fn config(failure_rate: f64) -> Config {
        let mut config = Config::default();
        config.tracking.latency_min_ms = 0;
        config.tracking.latency_max_ms = 0;
        config.tracking.failure_rate = failure_rate;
        config.tracking.seed = Some(42);
        config
    }

    fn service(failure_rate: f64) -> TrackingService {
        TrackingService::new(&config(failure_rate), Arc::new(MemoryHistoryStore::new(20))).unwrap()
    }

    #[tokio::test]
    async fn test_jd_lookup_end_to_end() {
        let service = service(0.0);
        let record = service
            .track(&TrackingRequest::auto("JD12345678901"))
            .await
            .unwrap();

        assert_eq!(record.tracking_number, "JD12345678901");
        assert_eq!(record.carrier_name, "京东快递");
        assert!((3..=7).contains(&record.timeline.len()));

        let history = service.history().await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].carrier_name, "京东快递");
    }

    #[tokio::test]
    async fn test_twelve_digits_route_to_sf() {
        let record = service(0.0)
            .track(&TrackingRequest::auto("123456789012"))
            .await
            .unwrap();
        assert_eq!(record.carrier_name, "顺丰快递");
    }

    #[tokio::test]
    async fn test_input_errors() {
        let service = service(0.0);
        assert!(matches!(
            service.track(&TrackingRequest::auto("   ")).await,
            Err(AppError::EmptyInput)
        ));
        assert!(matches!(
            service.track(&TrackingRequest::default()).await,
            Err(AppError::EmptyInput)
        ));
        assert!(matches!(
            service.track(&TrackingRequest::auto("12345")).await,
            Err(AppError::UnrecognizedCarrier(_))
        ));
        assert!(matches!(
            service
                .track(&TrackingRequest::with_carrier("JD12345678", "ems"))
                .await,
            Err(AppError::UnsupportedCarrier(_))
        ));
        assert!(service.history().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_override_skips_detection() {
        let record = service(0.0)
            .track(&TrackingRequest::with_carrier("ABC", "yto"))
            .await
            .unwrap();
        assert_eq!(record.carrier_name, "圆通快递");
    }

    #[tokio::test]
    async fn test_injected_failure_returns_no_record() {
        let service = service(1.0);
        let result = service.track(&TrackingRequest::auto("SF12345678")).await;
        assert!(matches!(result, Err(AppError::NotFound(n)) if n == "SF12345678"));
        assert!(service.history().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failure_rate_is_roughly_ten_percent() {
        let service = service(0.1);
        let mut failures = 0;
        for _ in 0..1000 {
            if service
                .track(&TrackingRequest::auto("YT1234567890"))
                .await
                .is_err()
            {
                failures += 1;
            }
        }
        assert!((50..=150).contains(&failures), "failures = {failures}");
    }

    #[tokio::test]
    async fn test_seeded_services_replay() {
        let a = service(0.0);
        let b = service(0.0);
        let ra = a.track(&TrackingRequest::auto("JD12345678")).await.unwrap();
        let rb = b.track(&TrackingRequest::auto("JD12345678")).await.unwrap();
        assert_eq!(ra.status, rb.status);
        assert_eq!(ra.timeline.len(), rb.timeline.len());
    }

    #[test]
    fn test_validate() {
        let service = service(0.0);
        assert!(matches!(service.validate(""), Err(AppError::EmptyInput)));
        assert_eq!(service.validate("hello").unwrap(), None);
        assert_eq!(
            service.validate("SF12345678").unwrap().unwrap().name,
            "顺丰快递"
        );
    }

    #[test]
    fn test_rejects_invalid_failure_rate() {
        let mut config = config(0.0);
        config.tracking.failure_rate = f64::NAN;
        assert!(TrackingService::new(&config, Arc::new(MemoryHistoryStore::new(20))).is_err());
    }

    #[test]
    fn test_rejects_zero_history_capacity() {
        let mut config = config(0.0);
        config.history.capacity = 0;
        assert!(matches!(
            TrackingService::new(&config, Arc::new(MemoryHistoryStore::new(20))),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_rejects_config_without_carriers() {
        let mut config = config(0.0);
        config.carriers.clear();
        assert!(TrackingService::new(&config, Arc::new(MemoryHistoryStore::new(20))).is_err());
    }

    fn service_with_reminders() -> (TrackingService, tokio::sync::mpsc::UnboundedReceiver<ReminderEvent>)
    {
        let (scheduler, rx) = ReminderScheduler::new(Duration::from_secs(5));
        (service(0.0).with_reminders(scheduler), rx)
    }

    #[tokio::test]
    async fn test_enable_reminder_requires_valid_email() {
        let (service, _rx) = service_with_reminders();
        let mut session = Session::new(UserLocality::new("北京"));

        assert!(matches!(
            service.enable_reminder(&mut session, "not-an-email"),
            Err(AppError::Validation(_))
        ));
        assert!(!session.reminder_enabled());

        service
            .enable_reminder(&mut session, "me@example.com")
            .unwrap();
        assert!(session.reminder_enabled());
        assert_eq!(session.contact.as_deref(), Some("me@example.com"));
    }

    #[tokio::test]
    async fn test_search_schedules_exactly_when_rule_fires() {
        let (service, mut rx) = service_with_reminders();
        let mut session = Session::new(UserLocality::new("北京"));
        let id = service
            .enable_reminder(&mut session, "me@example.com")
            .unwrap();

        let notifier = ProximityNotifier::new();
        let mut fired = 0;
        for _ in 0..200 {
            let record = service.search(&session, "SF1234567890").await.unwrap();
            let expected = notifier.should_notify(
                &record,
                &session.locality,
                true,
                session.contact.as_deref(),
            );
            match rx.try_recv() {
                Ok(ReminderEvent::Scheduled {
                    subscription,
                    notice,
                }) => {
                    assert!(expected);
                    assert_eq!(subscription, id);
                    assert_eq!(notice.locality_name, "北京");
                    assert_eq!(notice.carrier_name, "顺丰快递");
                    fired += 1;
                }
                Ok(other) => panic!("unexpected event {other:?}"),
                Err(_) => assert!(!expected),
            }
        }
        assert!(fired > 0);
    }

    #[tokio::test]
    async fn test_search_without_reminder_schedules_nothing() {
        let (service, mut rx) = service_with_reminders();
        let session = Session::new(UserLocality::new("北京"));
        for _ in 0..50 {
            service.search(&session, "JD12345678").await.unwrap();
        }
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_disable_drops_pending_delivery() {
        let (service, mut rx) = service_with_reminders();
        let mut session = Session::new(UserLocality::new("北京"));
        service
            .enable_reminder(&mut session, "me@example.com")
            .unwrap();

        let mut scheduled = false;
        for _ in 0..200 {
            service.search(&session, "YT1234567890").await.unwrap();
            if rx.try_recv().is_ok() {
                scheduled = true;
                break;
            }
        }
        assert!(scheduled);

        service.disable_reminder(&mut session);
        assert!(!session.reminder_enabled());

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_notice_uses_subscribed_address() {
        let (service, mut rx) = service_with_reminders();
        let mut session = Session::new(UserLocality::new("北京"));
        service
            .enable_reminder(&mut session, "me@example.com")
            .unwrap();
        session.contact = Some("someone-else@example.com".to_string());

        for _ in 0..200 {
            service.search(&session, "SF1234567890").await.unwrap();
            if let Ok(event) = rx.try_recv() {
                assert_eq!(event.notice().contact_address, "me@example.com");
                return;
            }
        }
        panic!("no reminder scheduled in 200 searches");
    }

    #[tokio::test]
    async fn test_stale_session_subscription_schedules_nothing() {
        let (service, mut rx) = service_with_reminders();
        let mut session = Session::new(UserLocality::new("北京"));
        service
            .enable_reminder(&mut session, "me@example.com")
            .unwrap();
        let stale = session.clone();
        service.disable_reminder(&mut session);

        for _ in 0..50 {
            service.search(&stale, "SF1234567890").await.unwrap();
        }
        assert!(rx.try_recv().is_err());
    }
}
