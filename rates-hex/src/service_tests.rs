//! ExchangeRateCache unit tests.

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use tokio::sync::Notify;

    use rates_types::{
        ApiRates, Clock, CurrencyCode, EventSink, NewRateRecord, PersistedRateRecord, RateApi,
        RateEvent, RateSource, RateStore, RepoError, SourceError,
    };

    use crate::ExchangeRateCache;
    use crate::service::CacheConfig;

    use CurrencyCode::{AED, EUR, GBP, USD};

    const EPS: f64 = 1e-9;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mock ports
    // ─────────────────────────────────────────────────────────────────────────

    /// Rate API that either returns a fixed payload or fails.
    pub struct MockApi {
        rates: Option<HashMap<String, f64>>,
        calls: Arc<AtomicUsize>,
    }

    impl MockApi {
        pub fn ok(rates: &[(&str, f64)]) -> Self {
            Self {
                rates: Some(rates.iter().map(|(c, r)| (c.to_string(), *r)).collect()),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        pub fn unreachable() -> Self {
            Self {
                rates: None,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        pub fn calls(&self) -> Arc<AtomicUsize> {
            self.calls.clone()
        }
    }

    #[async_trait]
    impl RateApi for MockApi {
        async fn fetch_latest(&self, base: CurrencyCode) -> Result<ApiRates, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.rates {
                Some(rates) => Ok(ApiRates {
                    base: base.code().to_string(),
                    date: None,
                    rates: rates.clone(),
                }),
                None => Err(SourceError::Http("connection refused".into())),
            }
        }
    }

    /// Simple in-memory store for testing the cache layer. Clones share rows.
    #[derive(Clone)]
    pub struct MockStore {
        rows: Arc<Mutex<Vec<PersistedRateRecord>>>,
        inserted: Arc<Mutex<Vec<NewRateRecord>>>,
        reachable: bool,
        clock: ManualClock,
    }

    impl MockStore {
        pub fn new(clock: ManualClock) -> Self {
            Self {
                rows: Arc::new(Mutex::new(Vec::new())),
                inserted: Arc::new(Mutex::new(Vec::new())),
                reachable: true,
                clock,
            }
        }

        pub fn unreachable(clock: ManualClock) -> Self {
            Self {
                reachable: false,
                ..Self::new(clock)
            }
        }

        pub fn with_row(self, from: &str, to: &str, rate: f64, created_at: DateTime<Utc>) -> Self {
            self.rows.lock().unwrap().push(PersistedRateRecord {
                from_currency: from.to_string(),
                to_currency: to.to_string(),
                rate,
                created_at,
            });
            self
        }

        pub fn inserted(&self) -> Arc<Mutex<Vec<NewRateRecord>>> {
            self.inserted.clone()
        }
    }

    #[async_trait]
    impl RateStore for MockStore {
        async fn insert_rate_records(&self, records: &[NewRateRecord]) -> Result<(), RepoError> {
            if !self.reachable {
                return Err(RepoError::Database("store offline".into()));
            }
            let now = self.clock.now();
            let mut rows = self.rows.lock().unwrap();
            for r in records {
                rows.push(PersistedRateRecord {
                    from_currency: r.from_currency.clone(),
                    to_currency: r.to_currency.clone(),
                    rate: r.rate,
                    created_at: now,
                });
            }
            self.inserted.lock().unwrap().extend_from_slice(records);
            Ok(())
        }

        async fn query_recent_rate_records(
            &self,
            since: DateTime<Utc>,
        ) -> Result<Vec<PersistedRateRecord>, RepoError> {
            if !self.reachable {
                return Err(RepoError::Database("store offline".into()));
            }
            let mut rows: Vec<_> = self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.created_at >= since)
                .cloned()
                .collect();
            rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(rows)
        }
    }

    /// Clock moved by hand.
    #[derive(Clone)]
    pub struct ManualClock(Arc<Mutex<DateTime<Utc>>>);

    impl ManualClock {
        pub fn at(t: DateTime<Utc>) -> Self {
            Self(Arc::new(Mutex::new(t)))
        }

        pub fn advance(&self, by: Duration) {
            *self.0.lock().unwrap() += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    /// Collects every emitted event.
    #[derive(Clone, Default)]
    pub struct RecordingSink(Arc<Mutex<Vec<RateEvent>>>);

    impl RecordingSink {
        pub fn events(&self) -> Vec<RateEvent> {
            self.0.lock().unwrap().clone()
        }
    }

    impl EventSink for RecordingSink {
        fn emit(&self, event: RateEvent) {
            self.0.lock().unwrap().push(event);
        }
    }

    fn cache_with_api<A: RateApi>(
        api: A,
        clock: &ManualClock,
    ) -> ExchangeRateCache<A, MockStore> {
        ExchangeRateCache::new(api, MockStore::new(clock.clone())).with_clock(clock.clone())
    }

    fn cache_with(
        api: MockApi,
        store: MockStore,
        clock: &ManualClock,
    ) -> ExchangeRateCache<MockApi, MockStore> {
        ExchangeRateCache::new(api, store).with_clock(clock.clone())
    }

    /// Yields until `done` holds; persistence runs on a detached task.
    async fn eventually(done: impl Fn() -> bool) {
        for _ in 0..1_000 {
            if done() {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("condition not reached");
    }

    fn live_rates() -> MockApi {
        MockApi::ok(&[
            ("USD", 0.2723),
            ("EUR", 0.2510),
            ("GBP", 0.2150),
            ("JPY", 42.1),
        ])
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Identity and fallback
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_identity_rate_performs_no_io() {
        let clock = ManualClock::at(t0());
        let api = MockApi::unreachable();
        let calls = api.calls();
        let cache = cache_with(api, MockStore::new(clock.clone()), &clock);

        for &c in CurrencyCode::all() {
            assert_eq!(cache.get_rate(c, c).await, 1.0);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(cache.get_cache_status().last_update.is_none());
    }

    #[tokio::test]
    async fn test_all_sources_down_uses_fallback_table() {
        let clock = ManualClock::at(t0());
        let cache = cache_with(
            MockApi::unreachable(),
            MockStore::unreachable(clock.clone()),
            &clock,
        );

        let converted = cache.convert_currency_async(100.0, USD, AED).await;

        assert_eq!(converted, 367.0);
        assert_eq!(cache.get_cache_status().source, Some(RateSource::Fallback));
    }

    #[tokio::test]
    async fn test_fallback_pairs_match_table() {
        let clock = ManualClock::at(t0());
        let cache = cache_with(
            MockApi::unreachable(),
            MockStore::unreachable(clock.clone()),
            &clock,
        );

        for (from, to, rate) in rates_types::FallbackTable::entries() {
            let converted = cache.convert_currency_async(250.0, from, to).await;
            assert!((converted - 250.0 * rate).abs() < EPS, "{from}->{to}");
        }
    }

    #[tokio::test]
    async fn test_cross_pair_composes_through_base() {
        let clock = ManualClock::at(t0());
        let cache = cache_with(
            MockApi::unreachable(),
            MockStore::unreachable(clock.clone()),
            &clock,
        );

        let converted = cache.convert_currency_async(100.0, USD, EUR).await;

        assert!((converted - 91.75).abs() < EPS);
    }

    #[tokio::test]
    async fn test_negative_amount_converts_linearly() {
        let clock = ManualClock::at(t0());
        let cache = cache_with(
            MockApi::unreachable(),
            MockStore::unreachable(clock.clone()),
            &clock,
        );

        let converted = cache.convert_currency_async(-50.0, GBP, AED).await;
        assert!((converted + 230.0).abs() < EPS);

        assert_eq!(cache.convert_currency_async(0.0, GBP, AED).await, 0.0);
        let fractional = cache.convert_currency_async(0.5, USD, AED).await;
        assert!((fractional - 1.835).abs() < EPS);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Persisted records
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_persisted_rate_overrides_fallback() {
        let clock = ManualClock::at(t0());
        let store = MockStore::new(clock.clone()).with_row("EUR", "AED", 4.10, t0());
        let cache = cache_with(MockApi::unreachable(), store, &clock);

        assert_eq!(cache.get_rate(EUR, AED).await, 4.10);
        assert!((cache.get_rate(AED, EUR).await - 1.0 / 4.10).abs() < EPS);
        assert_eq!(cache.get_cache_status().source, Some(RateSource::Database));
    }

    #[tokio::test]
    async fn test_reverse_rate_is_memoized() {
        let clock = ManualClock::at(t0());
        let store = MockStore::new(clock.clone()).with_row("EUR", "AED", 4.10, t0());
        let cache = cache_with(MockApi::unreachable(), store, &clock);

        cache.get_rate(EUR, AED).await;
        assert_eq!(cache.get_cache_status().rates_count, 1);

        cache.get_rate(AED, EUR).await;
        let status = cache.get_cache_status();
        assert_eq!(status.rates_count, 2);
        assert!(status
            .rates
            .iter()
            .any(|e| e.from == AED && e.to == EUR && (e.rate - 1.0 / 4.10).abs() < EPS));
    }

    #[tokio::test]
    async fn test_records_older_than_ttl_are_ignored() {
        let clock = ManualClock::at(t0());
        let store = MockStore::new(clock.clone()).with_row(
            "EUR",
            "AED",
            4.10,
            t0() - Duration::hours(2),
        );
        let cache = cache_with(MockApi::unreachable(), store, &clock);

        assert_eq!(cache.get_rate(EUR, AED).await, 4.0);
        assert_eq!(cache.get_cache_status().source, Some(RateSource::Fallback));
    }

    #[tokio::test]
    async fn test_newest_record_wins_for_a_pair() {
        let clock = ManualClock::at(t0());
        let store = MockStore::new(clock.clone())
            .with_row("USD", "AED", 3.60, t0() - Duration::minutes(30))
            .with_row("USD", "AED", 3.68, t0() - Duration::minutes(5));
        let cache = cache_with(MockApi::unreachable(), store, &clock);

        assert_eq!(cache.get_rate(USD, AED).await, 3.68);
    }

    #[tokio::test]
    async fn test_unusable_records_fall_through_to_fallback() {
        let clock = ManualClock::at(t0());
        let store = MockStore::new(clock.clone())
            .with_row("JPY", "AED", 0.025, t0())
            .with_row("USD", "AED", 0.0, t0());
        let sink = RecordingSink::default();
        let cache = cache_with(MockApi::unreachable(), store, &clock).with_event_sink(sink.clone());

        assert_eq!(cache.get_rate(USD, AED).await, 3.67);
        assert!(sink.events().iter().any(|e| matches!(
            e,
            RateEvent::SourceFailed {
                source: RateSource::Database,
                ..
            }
        )));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Live API
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_force_refresh_from_api_updates_status() {
        let clock = ManualClock::at(t0());
        let store = MockStore::new(clock.clone());
        let inserted = store.inserted();
        let cache = cache_with(live_rates(), store, &clock);

        cache.force_refresh().await;

        let status = cache.get_cache_status();
        assert_eq!(status.last_update, Some(t0()));
        assert_eq!(status.rates_count, 6);
        assert_eq!(status.source, Some(RateSource::Api));
        assert!(!status.is_updating);
        eventually(|| inserted.lock().unwrap().len() == 6).await;
    }

    #[tokio::test]
    async fn test_api_rates_populate_both_directions() {
        let clock = ManualClock::at(t0());
        let cache = cache_with(live_rates(), MockStore::new(clock.clone()), &clock);

        assert_eq!(cache.get_rate(AED, USD).await, 0.2723);
        assert!((cache.get_rate(USD, AED).await - 1.0 / 0.2723).abs() < EPS);
    }

    #[tokio::test]
    async fn test_cross_pair_prefers_cached_api_legs() {
        let clock = ManualClock::at(t0());
        let cache = cache_with(live_rates(), MockStore::new(clock.clone()), &clock);

        let rate = cache.get_rate(USD, EUR).await;

        assert!((rate - 0.2510 / 0.2723).abs() < EPS);
    }

    /// Store whose inserts never finish.
    struct StuckStore;

    #[async_trait]
    impl RateStore for StuckStore {
        async fn insert_rate_records(&self, _records: &[NewRateRecord]) -> Result<(), RepoError> {
            std::future::pending().await
        }

        async fn query_recent_rate_records(
            &self,
            _since: DateTime<Utc>,
        ) -> Result<Vec<PersistedRateRecord>, RepoError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_lookup_does_not_wait_for_persistence() {
        let clock = ManualClock::at(t0());
        let cache = ExchangeRateCache::new(live_rates(), StuckStore).with_clock(clock.clone());

        let rate = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            cache.get_rate(USD, AED),
        )
        .await
        .expect("lookup blocked on the store");

        assert!((rate - 1.0 / 0.2723).abs() < EPS);
        assert_eq!(cache.get_cache_status().source, Some(RateSource::Api));
        assert!(!cache.is_updating());
    }

    #[tokio::test]
    async fn test_persist_failure_is_swallowed_and_reported() {
        let clock = ManualClock::at(t0());
        let sink = RecordingSink::default();
        let cache = cache_with(live_rates(), MockStore::unreachable(clock.clone()), &clock)
            .with_event_sink(sink.clone());

        cache.force_refresh().await;

        assert_eq!(cache.get_cache_status().source, Some(RateSource::Api));
        eventually(|| {
            sink.events()
                .iter()
                .any(|e| matches!(e, RateEvent::PersistFailed { .. }))
        })
        .await;
    }

    #[tokio::test]
    async fn test_api_without_supported_currencies_falls_through() {
        let clock = ManualClock::at(t0());
        let store = MockStore::new(clock.clone()).with_row("GBP", "AED", 4.70, t0());
        let cache = cache_with(MockApi::ok(&[("JPY", 42.1)]), store, &clock);

        assert_eq!(cache.get_rate(GBP, AED).await, 4.70);
        assert_eq!(cache.get_cache_status().source, Some(RateSource::Database));
    }

    #[tokio::test]
    async fn test_fresh_api_rates_become_fallback_data() {
        let clock = ManualClock::at(t0());
        let store = MockStore::new(clock.clone());
        let inserted = store.inserted();
        let cache = cache_with(live_rates(), store.clone(), &clock);
        cache.force_refresh().await;
        eventually(|| !inserted.lock().unwrap().is_empty()).await;

        // Same rows, API now down: the records written above are read back.
        let offline = cache_with(MockApi::unreachable(), store, &clock);

        assert_eq!(offline.get_rate(AED, GBP).await, 0.2150);
        assert_eq!(offline.get_cache_status().source, Some(RateSource::Database));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Staleness and refresh guard
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_second_lookup_does_not_refresh_again() {
        let clock = ManualClock::at(t0());
        let api = live_rates();
        let calls = api.calls();
        let cache = cache_with(api, MockStore::new(clock.clone()), &clock);

        cache.get_rate(USD, AED).await;
        cache.get_rate(EUR, AED).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_staleness_boundary() {
        let clock = ManualClock::at(t0());
        let api = live_rates();
        let calls = api.calls();
        let cache = ExchangeRateCache::with_config(
            api,
            MockStore::new(clock.clone()),
            CacheConfig {
                ttl: Duration::hours(1),
            },
        )
        .with_clock(clock.clone());

        cache.get_rate(USD, AED).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        clock.advance(Duration::hours(1) - Duration::seconds(1));
        assert!(!cache.is_stale());
        cache.get_rate(USD, AED).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        clock.advance(Duration::seconds(1));
        assert!(cache.is_stale());
        cache.get_rate(USD, AED).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.get_cache_status().last_update, Some(t0() + Duration::hours(1)));
    }

    #[tokio::test]
    async fn test_shorter_ttl_refreshes_sooner() {
        let clock = ManualClock::at(t0());
        let api = live_rates();
        let calls = api.calls();
        let cache = cache_with(api, MockStore::new(clock.clone()), &clock)
            .with_ttl(Duration::minutes(5));

        cache.get_rate(USD, AED).await;
        clock.advance(Duration::minutes(5));
        cache.get_rate(USD, AED).await;

        assert_eq!(cache.ttl(), Duration::minutes(5));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_refresh_still_stamps_last_update() {
        let clock = ManualClock::at(t0());
        let api = MockApi::unreachable();
        let calls = api.calls();
        let cache = cache_with(api, MockStore::unreachable(clock.clone()), &clock);

        cache.get_rate(USD, AED).await;
        cache.get_rate(USD, AED).await;

        let status = cache.get_cache_status();
        assert_eq!(status.last_update, Some(t0()));
        assert!(!status.is_updating);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_force_refresh_ignores_ttl() {
        let clock = ManualClock::at(t0());
        let api = live_rates();
        let calls = api.calls();
        let cache = cache_with(api, MockStore::new(clock.clone()), &clock);

        cache.get_rate(USD, AED).await;
        clock.advance(Duration::minutes(1));
        cache.force_refresh().await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(
            cache.get_cache_status().last_update,
            Some(t0() + Duration::minutes(1))
        );
    }

    /// Rate API that blocks until released.
    struct GatedApi {
        gate: Arc<Notify>,
    }

    #[async_trait]
    impl RateApi for GatedApi {
        async fn fetch_latest(&self, _base: CurrencyCode) -> Result<ApiRates, SourceError> {
            self.gate.notified().await;
            Err(SourceError::Status(503))
        }
    }

    /// Rate API whose first request never completes.
    struct StallsOnceApi {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl RateApi for StallsOnceApi {
        async fn fetch_latest(&self, base: CurrencyCode) -> Result<ApiRates, SourceError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                std::future::pending::<()>().await;
            }
            Ok(ApiRates {
                base: base.code().to_string(),
                date: None,
                rates: HashMap::from([("USD".to_string(), 0.25)]),
            })
        }
    }

    #[tokio::test]
    async fn test_abandoned_refresh_leaves_cache_stale() {
        let clock = ManualClock::at(t0());
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = Arc::new(cache_with_api(
            StallsOnceApi {
                calls: calls.clone(),
            },
            &clock,
        ));

        let lookup = {
            let cache = cache.clone();
            tokio::spawn(async move { cache.get_rate(USD, AED).await })
        };
        while !cache.is_updating() {
            tokio::task::yield_now().await;
        }
        lookup.abort();
        assert!(lookup.await.unwrap_err().is_cancelled());

        let status = cache.get_cache_status();
        assert!(!status.is_updating);
        assert_eq!(status.last_update, None);
        assert!(cache.is_stale());

        clock.advance(Duration::minutes(30));
        assert_eq!(cache.get_rate(USD, AED).await, 4.0);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.get_cache_status().source, Some(RateSource::Api));
    }

    #[tokio::test]
    async fn test_concurrent_refresh_is_skipped() {
        let clock = ManualClock::at(t0());
        let gate = Arc::new(Notify::new());
        let sink = RecordingSink::default();
        let cache = Arc::new(
            ExchangeRateCache::new(
                GatedApi { gate: gate.clone() },
                MockStore::unreachable(clock.clone()),
            )
            .with_clock(clock.clone())
            .with_event_sink(sink.clone()),
        );

        let first = {
            let cache = cache.clone();
            tokio::spawn(async move { cache.refresh().await })
        };
        while !cache.is_updating() {
            tokio::task::yield_now().await;
        }

        // Does not wait for the in-flight refresh; answers from fallback.
        assert_eq!(cache.refresh().await, None);
        assert_eq!(cache.get_rate(USD, AED).await, 3.67);

        gate.notify_one();
        assert_eq!(first.await.unwrap(), Some(RateSource::Fallback));
        assert!(!cache.is_updating());
        assert!(sink.events().contains(&RateEvent::RefreshSkipped));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Synchronous API and introspection
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_sync_conversion_never_refreshes() {
        let clock = ManualClock::at(t0());
        let api = live_rates();
        let calls = api.calls();
        let cache = cache_with(api, MockStore::new(clock.clone()), &clock);

        assert_eq!(cache.convert_currency(100.0, USD, Some(AED)), 367.0);
        assert_eq!(cache.convert_currency(100.0, USD, None), 367.0);
        assert_eq!(cache.convert_currency(42.0, EUR, Some(EUR)), 42.0);

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(cache.get_cache_status().rates_count, 0);
    }

    #[tokio::test]
    async fn test_sync_conversion_uses_cached_rates() {
        let clock = ManualClock::at(t0());
        let cache = cache_with(live_rates(), MockStore::new(clock.clone()), &clock);
        cache.force_refresh().await;

        let converted = cache.convert_currency(10.0, AED, Some(USD));

        assert!((converted - 2.723).abs() < EPS);
    }

    #[tokio::test]
    async fn test_round_trip_product_is_one() {
        let clock = ManualClock::at(t0());
        let cache = cache_with(live_rates(), MockStore::new(clock.clone()), &clock);

        for &a in CurrencyCode::all() {
            for &b in CurrencyCode::all() {
                let product = cache.get_rate(a, b).await * cache.get_rate(b, a).await;
                assert!((product - 1.0).abs() < EPS, "{a}<->{b}");
            }
        }
    }

    #[tokio::test]
    async fn test_round_trip_product_is_one_on_fallback() {
        let clock = ManualClock::at(t0());
        let cache = cache_with(
            MockApi::unreachable(),
            MockStore::unreachable(clock.clone()),
            &clock,
        );

        for &a in CurrencyCode::all() {
            for &b in CurrencyCode::all() {
                let product = cache.get_rate(a, b).await * cache.get_rate(b, a).await;
                assert!((product - 1.0).abs() < EPS, "{a}<->{b}");
            }
        }
    }

    #[tokio::test]
    async fn test_status_is_a_snapshot() {
        let clock = ManualClock::at(t0());
        let cache = cache_with(live_rates(), MockStore::new(clock.clone()), &clock);
        cache.force_refresh().await;

        let before = cache.get_cache_status();
        cache.clear();

        assert_eq!(before.rates_count, 6);
        assert_eq!(before.rates.len(), 6);
        let after = cache.get_cache_status();
        assert_eq!(after.rates_count, 0);
        assert!(after.last_update.is_none());
        assert!(after.source.is_none());
    }

    #[test]
    fn test_supported_currencies() {
        let clock = ManualClock::at(t0());
        let cache = cache_with(
            MockApi::unreachable(),
            MockStore::new(clock.clone()),
            &clock,
        );

        assert_eq!(cache.supported_currencies(), &[AED, USD, EUR, GBP]);
    }

    #[tokio::test]
    async fn test_refresh_events_follow_the_chain() {
        let clock = ManualClock::at(t0());
        let sink = RecordingSink::default();
        let cache = cache_with(
            MockApi::unreachable(),
            MockStore::unreachable(clock.clone()),
            &clock,
        )
        .with_event_sink(sink.clone());

        cache.force_refresh().await;

        let events = sink.events();
        assert_eq!(events.len(), 3);
        assert!(matches!(
            events[0],
            RateEvent::SourceFailed {
                source: RateSource::Api,
                ..
            }
        ));
        assert!(matches!(
            events[1],
            RateEvent::SourceFailed {
                source: RateSource::Database,
                ..
            }
        ));
        assert_eq!(
            events[2],
            RateEvent::RefreshCompleted {
                source: RateSource::Fallback,
                rates: 6
            }
        );
    }
}
