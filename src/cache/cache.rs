use super::key::*;

//
// AssetCache
//

/// Bounded in-memory asset cache.
///
/// All operations are synchronous and never suspend. Implementations must be thread-safe and
/// should ensure that cloning is cheap and clones always refer to the same shared state.
///
/// Assets returned by [get](Self::get) are owned by the caller and remain valid after the entry
/// is evicted. Eviction is silent.
///
/// Implementations are either exact or approximate. An exact implementation, such as
/// [LruAssetCache](super::implementation::lru::LruAssetCache), evicts strictly by recency and
/// enforces the capacity on every put. An approximate implementation, such as the Moka one, may
/// apply its own admission policy: a put may be rejected and the counts may lag behind. The loader
/// works with either, as a rejected asset is simply fetched again on the next request.
pub trait AssetCache<CacheKeyT = UrlKey, AssetT = bytes::Bytes>
where
    Self: 'static + Clone + Send + Sync,
    CacheKeyT: CacheKey,
    AssetT: 'static + Clone + Send + Sync,
{
    /// Get an asset from the cache.
    ///
    /// A hit marks the entry as most recently used.
    fn get(&self, key: &CacheKeyT) -> Option<AssetT>;

    /// Put an asset in the cache, replacing any existing entry for the key.
    ///
    /// If the total cost now exceeds the capacity, other entries are evicted. In an exact
    /// implementation the entry being put is never evicted by its own insertion. Approximate
    /// implementations may reject it instead.
    fn put(&self, key: CacheKeyT, asset: AssetT, cost: usize);

    /// Remove an entry from the cache.
    ///
    /// A no-op if the key is absent.
    fn remove(&self, key: &CacheKeyT);

    /// Remove all entries from the cache.
    fn remove_all(&self);

    /// Whether the key is present, without touching its recency.
    fn contains(&self, key: &CacheKeyT) -> bool;

    /// Number of entries.
    fn len(&self) -> usize;

    /// Whether there are no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total cost of all entries.
    fn total_cost(&self) -> usize;
}
