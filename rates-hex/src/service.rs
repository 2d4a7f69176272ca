//! Exchange Rate Cache Service
//!
//! Process-wide cache of directed conversion rates, refreshed from three
//! sources in priority order: the live rate API, recently persisted rate
//! records, and the hardcoded fallback table.
//!
//! Contains NO infrastructure logic - the API client and the store are
//! injected through the `RateApi` and `RateStore` ports.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::{debug, instrument, warn};

use rates_types::{
    ApiRates, BASE_CURRENCY, CacheStatus, Clock, CurrencyCode, EventSink, FallbackTable,
    NewRateRecord, RateApi, RateEntry, RateEvent, RatePair, RateSource, RateStore, RepoError,
    Resolution, SourceError, SystemClock, is_usable_rate,
};

use crate::events::TracingSink;

/// Default time-to-live of a cache fill.
pub const DEFAULT_TTL_SECS: i64 = 3600;

/// Tunables for [`ExchangeRateCache`].
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Age after which the cache is refreshed on next access. Persisted
    /// records older than this are ignored as fallback data.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::seconds(DEFAULT_TTL_SECS),
        }
    }
}

/// Why a refresh tier could not supply rates.
#[derive(Debug, thiserror::Error)]
enum TierError {
    #[error(transparent)]
    Api(#[from] SourceError),

    #[error(transparent)]
    Store(#[from] RepoError),

    #[error("{0} source returned no usable rates")]
    Empty(RateSource),
}

/// Exchange rate cache with a self-healing three-tier refresh chain.
///
/// Generic over `A: RateApi` and `S: RateStore` - the adapters are injected at
/// compile time, so tests build isolated instances with mock ports.
///
/// No public operation fails: an unresolvable pair converts at the identity
/// rate.
pub struct ExchangeRateCache<A: RateApi, S: RateStore> {
    api: A,
    store: Arc<S>,
    rates: DashMap<RatePair, f64>,
    last_update: RwLock<Option<DateTime<Utc>>>,
    source: RwLock<Option<RateSource>>,
    is_updating: AtomicBool,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    events: Arc<dyn EventSink>,
}

/// Releases the in-flight flag however the refresh ends. A refresh dropped
/// before the chain finished leaves `last_update` untouched, so the next
/// lookup still sees a stale cache.
struct RefreshGuard<'a> {
    is_updating: &'a AtomicBool,
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        self.is_updating.store(false, Ordering::Release);
    }
}

impl<A: RateApi, S: RateStore> ExchangeRateCache<A, S> {
    /// Creates an empty cache. Nothing is fetched until the first rate request.
    pub fn new(api: A, store: S) -> Self {
        Self::with_config(api, store, CacheConfig::default())
    }

    /// Creates an empty cache with custom tunables.
    pub fn with_config(api: A, store: S, config: CacheConfig) -> Self {
        Self {
            api,
            store: Arc::new(store),
            rates: DashMap::new(),
            last_update: RwLock::new(None),
            source: RwLock::new(None),
            is_updating: AtomicBool::new(false),
            ttl: config.ttl,
            clock: Arc::new(SystemClock),
            events: Arc::new(TracingSink),
        }
    }

    /// Overrides the time-to-live from the config.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Replaces the time source.
    pub fn with_clock(mut self, clock: impl Clock) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Replaces the sink that receives refresh outcomes.
    pub fn with_event_sink(mut self, sink: impl EventSink) -> Self {
        self.events = Arc::new(sink);
        self
    }

    /// Age after which the cache counts as stale.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Rate lookup and conversion
    // ─────────────────────────────────────────────────────────────────────────────

    /// Rate such that `amount_in_to = amount_in_from * rate`.
    ///
    /// Refreshes first when the cache is stale and no refresh is in flight.
    /// A concurrent caller that finds a refresh in flight answers from the
    /// current contents without waiting.
    #[instrument(skip(self))]
    pub async fn get_rate(&self, from: CurrencyCode, to: CurrencyCode) -> f64 {
        let pair = RatePair::new(from, to);
        if pair.is_identity() {
            return 1.0;
        }

        if self.is_stale() && !self.is_updating() {
            self.refresh().await;
        }

        self.resolve(pair).or_identity()
    }

    /// Converts `amount`, refreshing first if needed.
    pub async fn convert_currency_async(
        &self,
        amount: f64,
        from: CurrencyCode,
        to: CurrencyCode,
    ) -> f64 {
        amount * self.get_rate(from, to).await
    }

    /// Rate from the current cache contents or the fallback table. Never
    /// performs I/O and never triggers a refresh.
    pub fn rate_cached(&self, from: CurrencyCode, to: CurrencyCode) -> f64 {
        let pair = RatePair::new(from, to);
        if pair.is_identity() {
            return 1.0;
        }
        self.resolve(pair).or_identity()
    }

    /// I/O-free conversion for contexts that cannot await a refresh.
    /// `to` defaults to the base currency.
    pub fn convert_currency(
        &self,
        amount: f64,
        from: CurrencyCode,
        to: Option<CurrencyCode>,
    ) -> f64 {
        amount * self.rate_cached(from, to.unwrap_or(BASE_CURRENCY))
    }

    /// Static list of supported currencies. Does not touch the cache.
    pub fn supported_currencies(&self) -> &'static [CurrencyCode] {
        CurrencyCode::all()
    }

    fn resolve(&self, pair: RatePair) -> Resolution {
        let resolution = self
            .cached(pair)
            .or_else(|| fallback(pair))
            .or_else(|| self.composed(pair));

        if !resolution.is_resolved() {
            warn!(pair = %pair, "No rate available from any source, using identity");
        }
        resolution
    }

    /// Direct cache entry, else the reciprocal of the reverse entry. A derived
    /// reciprocal is written back so the next lookup is direct.
    fn cached(&self, pair: RatePair) -> Resolution {
        let direct = self.rates.get(&pair).map(|r| *r);
        if let Resolution::Resolved(rate) = Resolution::from_rate(direct) {
            return Resolution::Resolved(rate);
        }

        let reverse = self.rates.get(&pair.reversed()).map(|r| *r);
        match Resolution::from_rate(reverse) {
            Resolution::Resolved(rate) => {
                let derived = 1.0 / rate;
                self.rates.insert(pair, derived);
                debug!(pair = %pair, rate = derived, "Memoized reverse rate");
                Resolution::Resolved(derived)
            }
            Resolution::Unresolved => Resolution::Unresolved,
        }
    }

    /// Cross pair composed through the base currency. Each leg prefers the
    /// cache and falls back to the hardcoded table.
    fn composed(&self, pair: RatePair) -> Resolution {
        if pair.from.is_base() || pair.to.is_base() {
            return Resolution::Unresolved;
        }

        let leg = |p: RatePair| self.cached(p).or_else(|| fallback(p)).rate();
        let to_base = leg(RatePair::new(pair.from, BASE_CURRENCY));
        let from_base = leg(RatePair::new(BASE_CURRENCY, pair.to));

        match (to_base, from_base) {
            (Some(a), Some(b)) => Resolution::from_rate(Some(a * b)),
            _ => Resolution::Unresolved,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Staleness and refresh
    // ─────────────────────────────────────────────────────────────────────────────

    /// Stale when never populated, or when at least one TTL has elapsed.
    pub fn is_stale(&self) -> bool {
        self.is_stale_at(self.clock.now())
    }

    fn is_stale_at(&self, now: DateTime<Utc>) -> bool {
        match *self.last_update.read() {
            None => true,
            Some(last) => now.signed_duration_since(last) >= self.ttl,
        }
    }

    pub fn is_updating(&self) -> bool {
        self.is_updating.load(Ordering::Acquire)
    }

    /// Clears the staleness timestamp and runs the full refresh chain.
    ///
    /// `last_update` is stamped on completion whichever tier supplied the data.
    #[instrument(skip(self))]
    pub async fn force_refresh(&self) {
        *self.last_update.write() = None;
        self.refresh().await;
    }

    /// Runs the refresh chain unless one is already in flight.
    ///
    /// Returns the tier that populated the cache, or `None` when skipped.
    pub async fn refresh(&self) -> Option<RateSource> {
        if self
            .is_updating
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            self.events.emit(RateEvent::RefreshSkipped);
            return None;
        }

        let _guard = RefreshGuard {
            is_updating: &self.is_updating,
        };

        let source = self.run_refresh_chain().await;
        *self.source.write() = Some(source);
        *self.last_update.write() = Some(self.clock.now());
        Some(source)
    }

    async fn run_refresh_chain(&self) -> RateSource {
        match self.load_from_api().await {
            Ok(rates) => {
                self.completed(RateSource::Api, rates);
                return RateSource::Api;
            }
            Err(e) => self.failed(RateSource::Api, e),
        }

        match self.load_from_store().await {
            Ok(rates) => {
                self.completed(RateSource::Database, rates);
                return RateSource::Database;
            }
            Err(e) => self.failed(RateSource::Database, e),
        }

        let rates = self.load_fallback();
        self.completed(RateSource::Fallback, rates);
        RateSource::Fallback
    }

    async fn load_from_api(&self) -> Result<usize, TierError> {
        let payload = self.api.fetch_latest(BASE_CURRENCY).await?;
        let entries = entries_from_api(&payload)?;
        if entries.is_empty() {
            return Err(TierError::Empty(RateSource::Api));
        }

        self.replace_all(&entries);

        let date = payload
            .date
            .unwrap_or_else(|| self.clock.now().date_naive());
        self.persist(&entries, date);

        Ok(entries.len())
    }

    /// Fire-and-forget write of fresh API rates on a detached task. Failures
    /// are reported to the event sink and never reach the caller.
    fn persist(&self, entries: &[RateEntry], date: NaiveDate) {
        let records: Vec<NewRateRecord> = entries
            .iter()
            .map(|e| NewRateRecord::from_entry(e, date))
            .collect();
        let store = Arc::clone(&self.store);
        let events = Arc::clone(&self.events);

        tokio::spawn(async move {
            if let Err(e) = store.insert_rate_records(&records).await {
                events.emit(RateEvent::PersistFailed {
                    reason: e.to_string(),
                });
            }
        });
    }

    async fn load_from_store(&self) -> Result<usize, TierError> {
        let since = self.clock.now() - self.ttl;
        let records = self.store.query_recent_rate_records(since).await?;

        // Newest first: the first row seen for a pair wins.
        let mut seen = HashSet::new();
        let entries: Vec<RateEntry> = records
            .iter()
            .filter(|r| r.created_at >= since)
            .filter_map(|r| r.to_entry())
            .filter(|e| seen.insert(e.pair()))
            .collect();

        if entries.is_empty() {
            return Err(TierError::Empty(RateSource::Database));
        }

        self.replace_all(&entries);
        Ok(entries.len())
    }

    fn load_fallback(&self) -> usize {
        let entries: Vec<RateEntry> = FallbackTable::entries()
            .into_iter()
            .map(|(from, to, rate)| RateEntry::new(from, to, rate))
            .collect();
        self.replace_all(&entries);
        entries.len()
    }

    /// Clear-then-repopulate. Each entry write is atomic; the table swap is not.
    fn replace_all(&self, entries: &[RateEntry]) {
        self.rates.clear();
        for entry in entries {
            self.rates.insert(entry.pair(), entry.rate);
        }
    }

    fn completed(&self, source: RateSource, rates: usize) {
        self.events
            .emit(RateEvent::RefreshCompleted { source, rates });
    }

    fn failed(&self, source: RateSource, err: TierError) {
        self.events.emit(RateEvent::SourceFailed {
            source,
            reason: err.to_string(),
        });
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Introspection
    // ─────────────────────────────────────────────────────────────────────────────

    /// Snapshot of the cache. No side effects.
    pub fn get_cache_status(&self) -> CacheStatus {
        let mut rates: Vec<RateEntry> = self
            .rates
            .iter()
            .map(|e| RateEntry::new(e.key().from, e.key().to, *e.value()))
            .collect();
        rates.sort_by_key(|e| e.pair());

        CacheStatus {
            rates_count: rates.len(),
            last_update: *self.last_update.read(),
            is_updating: self.is_updating(),
            source: *self.source.read(),
            rates,
        }
    }

    /// Empties the cache and forgets the last refresh.
    pub fn clear(&self) {
        self.rates.clear();
        *self.last_update.write() = None;
        *self.source.write() = None;
    }
}

fn fallback(pair: RatePair) -> Resolution {
    Resolution::from_rate(FallbackTable::resolve(pair.from, pair.to))
}

/// Base -> X from the payload plus the derived X -> base, for every supported
/// foreign currency the payload quotes with a usable rate.
fn entries_from_api(payload: &ApiRates) -> Result<Vec<RateEntry>, TierError> {
    if !payload.base.is_empty() && !payload.base.eq_ignore_ascii_case(BASE_CURRENCY.code()) {
        return Err(SourceError::Malformed(format!(
            "expected base {}, got {}",
            BASE_CURRENCY, payload.base
        ))
        .into());
    }

    let quoted: HashMap<CurrencyCode, f64> = payload
        .rates
        .iter()
        .filter_map(|(code, rate)| Some((code.parse::<CurrencyCode>().ok()?, *rate)))
        .collect();

    Ok(CurrencyCode::all()
        .iter()
        .filter(|c| !c.is_base())
        .filter_map(|&c| quoted.get(&c).copied().filter(|r| is_usable_rate(*r)).map(|r| (c, r)))
        .flat_map(|(c, rate)| {
            [
                RateEntry::new(BASE_CURRENCY, c, rate),
                RateEntry::new(c, BASE_CURRENCY, 1.0 / rate),
            ]
        })
        .collect())
}
