use super::{
    super::super::{cache::*, configuration::*, entry::*, hooks::*, key::*, stats::*},
    builder::*,
};

use {
    lru::*,
    parking_lot::*,
    std::{fmt, sync::Arc},
};

//
// LruAssetCache
//

/// Least-recently-used [AssetCache] bounded by total cost.
///
/// Every [get](AssetCache::get) hit and every [put](AssetCache::put) marks the entry as most
/// recently used. When a put takes the total cost over the capacity, least-recently-used entries
/// are evicted until the total is within capacity or only the just-inserted entry remains.
///
/// Eviction is exact and synchronous: when [put](AssetCache::put) returns, the capacity bound
/// holds (except for a single oversized entry). For an approximate, concurrent alternative see
/// the Moka implementation.
///
/// Cloning is cheap and clones share the same state.
pub struct LruAssetCache<CacheKeyT = UrlKey, AssetT = bytes::Bytes>
where
    CacheKeyT: CacheKey,
{
    shared: Arc<LruShared<CacheKeyT, AssetT>>,
}

struct LruShared<CacheKeyT, AssetT>
where
    CacheKeyT: CacheKey,
{
    state: Mutex<LruState<CacheKeyT, AssetT>>,
    configuration: CacheConfiguration,
    eviction: Option<EvictionHook<CacheKeyT>>,
    stats: CacheStats,
}

struct LruState<CacheKeyT, AssetT>
where
    CacheKeyT: CacheKey,
{
    entries: LruCache<CacheKeyT, CacheEntry<AssetT>>,
    total_cost: usize,
}

impl<CacheKeyT, AssetT> LruAssetCache<CacheKeyT, AssetT>
where
    CacheKeyT: CacheKey,
{
    /// Constructor.
    pub fn new(capacity: usize) -> Self {
        Self::builder().capacity(capacity).build()
    }

    /// Builder.
    pub fn builder() -> LruAssetCacheBuilder<CacheKeyT, AssetT> {
        LruAssetCacheBuilder::default()
    }

    pub(crate) fn new_with(
        configuration: CacheConfiguration,
        eviction: Option<EvictionHook<CacheKeyT>>,
    ) -> Self {
        Self {
            shared: Arc::new(LruShared {
                state: Mutex::new(LruState {
                    entries: LruCache::unbounded(),
                    total_cost: 0,
                }),
                configuration,
                eviction,
                stats: CacheStats::default(),
            }),
        }
    }

    /// Capacity as a total cost.
    pub fn capacity(&self) -> usize {
        self.shared.configuration.capacity
    }

    /// Statistics.
    pub fn stats(&self) -> &CacheStats {
        &self.shared.stats
    }

    /// Keys ordered from most recently used to least recently used.
    pub fn keys(&self) -> Vec<CacheKeyT> {
        self.shared
            .state
            .lock()
            .entries
            .iter()
            .map(|(key, _entry)| key.clone())
            .collect()
    }
}

impl<CacheKeyT, AssetT> AssetCache<CacheKeyT, AssetT> for LruAssetCache<CacheKeyT, AssetT>
where
    CacheKeyT: CacheKey,
    AssetT: 'static + Clone + Send + Sync,
{
    fn get(&self, key: &CacheKeyT) -> Option<AssetT> {
        let asset = self
            .shared
            .state
            .lock()
            .entries
            .get(key)
            .map(|entry| entry.asset.clone());

        match asset {
            Some(_) => self.shared.stats.record_hit(),
            None => self.shared.stats.record_miss(),
        }

        asset
    }

    fn put(&self, key: CacheKeyT, asset: AssetT, cost: usize) {
        let capacity = self.shared.configuration.capacity;

        let evicted = {
            let mut guard = self.shared.state.lock();
            let state = &mut *guard;

            if let Some(replaced) = state.entries.put(key.clone(), CacheEntry::new(asset, cost)) {
                state.total_cost -= replaced.cost;
            }
            state.total_cost += cost;

            // The entry we just put is the most recently used, so it is the last one standing
            let mut evicted = Vec::new();
            while (state.total_cost > capacity) && (state.entries.len() > 1) {
                match state.entries.pop_lru() {
                    Some((evicted_key, entry)) => {
                        state.total_cost -= entry.cost;
                        evicted.push((evicted_key, entry.cost));
                    }

                    None => break,
                }
            }

            if state.total_cost > capacity {
                tracing::debug!("oversized ({} > {}): {}", cost, capacity, key);
            }

            evicted
        };

        self.shared.stats.record_insert();

        if !evicted.is_empty() {
            self.shared.stats.record_evictions(evicted.len() as u64);

            // Hooks are called without holding the lock so they may use the cache
            for (evicted_key, cost) in &evicted {
                tracing::debug!("evict: {}", evicted_key);
                if let Some(eviction) = &self.shared.eviction {
                    eviction(EvictionHookContext::new(evicted_key, *cost));
                }
            }
        }
    }

    fn remove(&self, key: &CacheKeyT) {
        let mut guard = self.shared.state.lock();
        let state = &mut *guard;
        if let Some(removed) = state.entries.pop(key) {
            state.total_cost -= removed.cost;
        }
    }

    fn remove_all(&self) {
        let mut state = self.shared.state.lock();
        state.entries.clear();
        state.total_cost = 0;
    }

    fn contains(&self, key: &CacheKeyT) -> bool {
        self.shared.state.lock().entries.contains(key)
    }

    fn len(&self) -> usize {
        self.shared.state.lock().entries.len()
    }

    fn total_cost(&self) -> usize {
        self.shared.state.lock().total_cost
    }
}

impl<CacheKeyT, AssetT> Clone for LruAssetCache<CacheKeyT, AssetT>
where
    CacheKeyT: CacheKey,
{
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<CacheKeyT, AssetT> fmt::Debug for LruAssetCache<CacheKeyT, AssetT>
where
    CacheKeyT: CacheKey,
{
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (len, total_cost) = self
            .shared
            .state
            .try_lock()
            .map(|state| (state.entries.len(), state.total_cost))
            .unwrap_or_default();
        formatter
            .debug_struct("LruAssetCache")
            .field("capacity", &self.shared.configuration.capacity)
            .field("entries", &len)
            .field("total_cost", &total_cost)
            .field("stats", &self.shared.stats)
            .finish()
    }
}
