use super::{
    super::{cache::*, error::*, fetch::*},
    builder::*,
    configuration::*,
    handle::*,
    hooks::*,
    in_flight::*,
    stats::*,
};

use {
    parking_lot::*,
    std::{collections::*, fmt, sync::Arc},
    tokio::{sync::oneshot, task},
};

//
// AssetLoader
//

/// Keyed asset cache-loader.
///
/// Given a key, returns the decoded asset either from the cache or by fetching and decoding it,
/// with at most one fetch in flight per key no matter how many consumers ask for it.
///
/// For a request:
///
/// 1. If the key is cached, the handle is resolved right away (a hit). No fetch is started.
/// 2. Otherwise, if a fetch for the key is in flight, the consumer is registered as another
///    waiter on it.
/// 3. Otherwise a fetch is spawned with the consumer as its first waiter.
///
/// When the fetch and decode succeed, the asset is put into the cache and then delivered to every
/// current waiter. A failure is delivered to every current waiter and is *not* cached, so the
/// next request starts a fresh fetch. No retry is performed.
///
/// Cancelling a handle removes only that waiter. The fetch keeps running even if no waiters are
/// left, and its asset is still cached.
///
/// Cloning is cheap and clones share the same state.
///
/// Fetches are spawned on the configured runtime, or on the current Tokio runtime if none was
/// configured, in which case [request](Self::request) panics when called outside of a runtime.
pub struct AssetLoader<FetcherT, DecoderT, CacheT, CacheKeyT = UrlKey>
where
    DecoderT: Decoder,
{
    shared: Arc<LoaderShared<FetcherT, DecoderT, CacheT, CacheKeyT>>,
}

struct LoaderShared<FetcherT, DecoderT, CacheT, CacheKeyT>
where
    DecoderT: Decoder,
{
    fetcher: FetcherT,
    decoder: DecoderT,
    cache: CacheT,
    in_flight: Mutex<HashMap<CacheKeyT, InFlight<DecoderT::Asset>>>,
    configuration: LoaderConfiguration<CacheKeyT, DecoderT::Asset>,
    stats: LoaderStats,
}

impl<FetcherT, DecoderT, CacheT, CacheKeyT> AssetLoader<FetcherT, DecoderT, CacheT, CacheKeyT>
where
    FetcherT: Fetcher<CacheKeyT>,
    DecoderT: Decoder,
    DecoderT::Asset: CacheWeight,
    CacheT: AssetCache<CacheKeyT, DecoderT::Asset>,
    CacheKeyT: CacheKey,
{
    /// Constructor with default configuration.
    pub fn new(fetcher: FetcherT, decoder: DecoderT, cache: CacheT) -> Self {
        Self::builder(fetcher, decoder, cache).build()
    }

    /// Builder.
    pub fn builder(
        fetcher: FetcherT,
        decoder: DecoderT,
        cache: CacheT,
    ) -> AssetLoaderBuilder<FetcherT, DecoderT, CacheT, CacheKeyT> {
        AssetLoaderBuilder::new(fetcher, decoder, cache)
    }

    pub(crate) fn new_with(
        fetcher: FetcherT,
        decoder: DecoderT,
        cache: CacheT,
        configuration: LoaderConfiguration<CacheKeyT, DecoderT::Asset>,
    ) -> Self {
        Self {
            shared: Arc::new(LoaderShared {
                fetcher,
                decoder,
                cache,
                in_flight: Default::default(),
                configuration,
                stats: Default::default(),
            }),
        }
    }

    /// Request an asset on behalf of a consumer.
    ///
    /// The consumer has at most one live registration per key. If it already waits for this key,
    /// the earlier handle resolves to [AssetOutcome::Cancelled] and the new handle takes its
    /// place, so the consumer receives a single delivery.
    pub fn request(&self, key: CacheKeyT, consumer: ConsumerId) -> AssetHandle<DecoderT::Asset> {
        let (sender, receiver) = oneshot::channel();
        let waiter = Waiter::new(consumer, sender);
        let waiter_id = waiter.id;

        let spawn = {
            // The cache check and the registration must be atomic with respect to commits
            let mut in_flight = self.shared.in_flight.lock();

            if let Some(asset) = self.shared.cache.get(&key) {
                drop(in_flight);
                self.shared.stats.record_hit();
                tracing::debug!("hit: {}", key);
                return AssetHandle::resolved(consumer, AssetOutcome::Asset(asset));
            }

            match in_flight.get_mut(&key) {
                Some(record) => {
                    self.shared.stats.record_coalesced();
                    tracing::debug!("join ({}): {}", consumer, key);

                    if let Some(superseded) = record.register(waiter) {
                        self.shared.stats.record_superseded();
                        tracing::debug!("supersede ({}): {}", consumer, key);
                        superseded.send(AssetOutcome::Cancelled);
                    }

                    false
                }

                None => {
                    self.shared.stats.record_miss();
                    tracing::debug!("miss ({}): {}", consumer, key);

                    let mut record = InFlight::new();
                    record.register(waiter);
                    in_flight.insert(key.clone(), record);
                    true
                }
            }
        };

        // Spawning may drop the task on the spot, which abandons the record and needs the lock
        if spawn {
            self.spawn_resolution(key.clone());
        }

        AssetHandle::pending(consumer, receiver, self.canceller(key, waiter_id))
    }

    /// Load an asset on behalf of a new, anonymous consumer.
    pub async fn load(&self, key: CacheKeyT) -> AssetOutcome<DecoderT::Asset> {
        self.request(key, ConsumerId::next()).await
    }

    /// Start fetching an asset without waiting for it.
    ///
    /// The asset will only be put into the cache. Returns false if the key is already cached or
    /// in flight, in which case nothing happens.
    pub fn prefetch(&self, key: CacheKeyT) -> bool {
        {
            let mut in_flight = self.shared.in_flight.lock();

            if self.shared.cache.contains(&key) || in_flight.contains_key(&key) {
                return false;
            }

            tracing::debug!("prefetch: {}", key);
            in_flight.insert(key.clone(), InFlight::new());
        }

        self.spawn_resolution(key);
        true
    }

    /// Cached asset, if any.
    ///
    /// Counts as a use for the cache's eviction policy.
    pub fn cached(&self, key: &CacheKeyT) -> Option<DecoderT::Asset> {
        self.shared.cache.get(key)
    }

    /// Remove an asset from the cache.
    ///
    /// A fetch in flight for the key is not affected and will put its asset into the cache when
    /// it completes.
    pub fn invalidate(&self, key: &CacheKeyT) {
        self.shared.cache.remove(key)
    }

    /// Whether a fetch for the key is in flight.
    pub fn is_in_flight(&self, key: &CacheKeyT) -> bool {
        self.shared.in_flight.lock().contains_key(key)
    }

    /// Number of fetches in flight.
    pub fn in_flight_count(&self) -> usize {
        self.shared.in_flight.lock().len()
    }

    /// Number of consumers waiting for a key.
    pub fn waiter_count(&self, key: &CacheKeyT) -> usize {
        self.shared
            .in_flight
            .lock()
            .get(key)
            .map(|record| record.waiters.len())
            .unwrap_or_default()
    }

    /// Cache.
    pub fn cache(&self) -> &CacheT {
        &self.shared.cache
    }

    /// Statistics.
    pub fn stats(&self) -> &LoaderStats {
        &self.shared.stats
    }

    fn spawn_resolution(&self, key: CacheKeyT) {
        self.shared.stats.record_fetch();

        let resolution = Resolution {
            shared: self.shared.clone(),
            key: Some(key),
        };

        let task = resolution.run();
        match &self.shared.configuration.runtime {
            Some(runtime) => {
                runtime.spawn(task);
            }

            None => {
                tokio::spawn(task);
            }
        }
    }

    fn canceller(&self, key: CacheKeyT, waiter: WaiterId) -> Canceller {
        let shared = Arc::downgrade(&self.shared);
        Box::new(move || match shared.upgrade() {
            Some(shared) => shared.cancel(&key, waiter),
            None => false,
        })
    }
}

impl<FetcherT, DecoderT, CacheT, CacheKeyT> LoaderShared<FetcherT, DecoderT, CacheT, CacheKeyT>
where
    FetcherT: Fetcher<CacheKeyT>,
    DecoderT: Decoder,
    DecoderT::Asset: CacheWeight,
    CacheT: AssetCache<CacheKeyT, DecoderT::Asset>,
    CacheKeyT: CacheKey,
{
    async fn fetch_and_decode(self: &Arc<Self>, key: &CacheKeyT) -> Result<DecoderT::Asset, LoadError> {
        let bytes = self.fetcher.fetch(key).await?;

        if !self.configuration.decode_on_blocking_pool {
            return Ok(self.decoder.decode(bytes)?);
        }

        let shared = self.clone();
        match task::spawn_blocking(move || shared.decoder.decode(bytes)).await {
            Ok(asset) => Ok(asset?),
            Err(error) => Err(DecodeError::malformed(format!("decoder failed: {}", error)).into()),
        }
    }

    fn cost(&self, key: &CacheKeyT, asset: &DecoderT::Asset) -> usize {
        match &self.configuration.cost {
            Some(cost) => cost(CostHookContext::new(key, asset)),
            None => asset.cache_weight(),
        }
    }

    // Cache first, then collapse the in-flight record: a request arriving in between sees the
    // cache hit, one arriving before joins as a waiter, so there is never a second fetch.
    fn commit(&self, key: CacheKeyT, result: Result<DecoderT::Asset, LoadError>) {
        let outcome = match result {
            Ok(asset) => {
                let cost = self.cost(&key, &asset);
                tracing::debug!("store ({}): {}", cost, key);
                self.cache.put(key.clone(), asset.clone(), cost);
                AssetOutcome::Asset(asset)
            }

            Err(error) => {
                self.stats.record_failure();
                tracing::debug!("fail ({}): {}", error, key);
                AssetOutcome::Error(error)
            }
        };

        let record = self.in_flight.lock().remove(&key);
        match record {
            Some(record) => {
                if record.waiters.is_empty() {
                    tracing::debug!("no waiters: {}", key);
                }
                record.deliver(outcome);
            }

            None => tracing::error!("missing in-flight record: {}", key),
        }
    }

    fn abandon(&self, key: &CacheKeyT) {
        let record = self.in_flight.lock().remove(key);
        if let Some(record) = record {
            self.stats.record_failure();
            tracing::warn!("abandoned: {}", key);
            record.deliver(AssetOutcome::Error(LoadError::Abandoned));
        }
    }

    fn cancel(&self, key: &CacheKeyT, waiter: WaiterId) -> bool {
        let mut in_flight = self.in_flight.lock();

        let Some(record) = in_flight.get_mut(key) else {
            return false;
        };

        match record.remove(waiter) {
            Some(waiter) => {
                self.stats.record_cancellation();
                tracing::debug!("cancel ({}): {}", waiter.consumer, key);
                if record.waiters.is_empty() {
                    tracing::debug!("orphaned (fetch continues): {}", key);
                }
                true
            }

            None => false,
        }
    }
}

impl<FetcherT, DecoderT, CacheT, CacheKeyT> Clone for AssetLoader<FetcherT, DecoderT, CacheT, CacheKeyT>
where
    DecoderT: Decoder,
{
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<FetcherT, DecoderT, CacheT, CacheKeyT> fmt::Debug
    for AssetLoader<FetcherT, DecoderT, CacheT, CacheKeyT>
where
    DecoderT: Decoder,
    CacheT: fmt::Debug,
{
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let in_flight = self
            .shared
            .in_flight
            .try_lock()
            .map(|in_flight| in_flight.len())
            .unwrap_or_default();
        formatter
            .debug_struct("AssetLoader")
            .field("cache", &self.shared.cache)
            .field("in flight", &in_flight)
            .field("stats", &self.shared.stats)
            .finish()
    }
}

//
// Resolution
//

// Owns one in-flight record until its outcome is committed. If dropped before that (the task was
// cancelled with its runtime, or the fetcher panicked) the record is abandoned so the key does not
// stay stuck in flight.
struct Resolution<FetcherT, DecoderT, CacheT, CacheKeyT>
where
    FetcherT: Fetcher<CacheKeyT>,
    DecoderT: Decoder,
    DecoderT::Asset: CacheWeight,
    CacheT: AssetCache<CacheKeyT, DecoderT::Asset>,
    CacheKeyT: CacheKey,
{
    shared: Arc<LoaderShared<FetcherT, DecoderT, CacheT, CacheKeyT>>,
    key: Option<CacheKeyT>,
}

impl<FetcherT, DecoderT, CacheT, CacheKeyT> Resolution<FetcherT, DecoderT, CacheT, CacheKeyT>
where
    FetcherT: Fetcher<CacheKeyT>,
    DecoderT: Decoder,
    DecoderT::Asset: CacheWeight,
    CacheT: AssetCache<CacheKeyT, DecoderT::Asset>,
    CacheKeyT: CacheKey,
{
    async fn run(mut self) {
        let Some(key) = self.key.clone() else {
            return;
        };

        let result = self.shared.fetch_and_decode(&key).await;

        // Stay armed until the commit returns: it runs hooks that may panic
        self.shared.commit(key, result);
        self.key = None;
    }
}

impl<FetcherT, DecoderT, CacheT, CacheKeyT> Drop for Resolution<FetcherT, DecoderT, CacheT, CacheKeyT>
where
    FetcherT: Fetcher<CacheKeyT>,
    DecoderT: Decoder,
    DecoderT::Asset: CacheWeight,
    CacheT: AssetCache<CacheKeyT, DecoderT::Asset>,
    CacheKeyT: CacheKey,
{
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            self.shared.abandon(&key);
        }
    }
}
