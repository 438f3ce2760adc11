use super::super::super::{cache::*, entry::*, key::*};

//
// MokaAssetCache
//

/// Moka cache implementation.
///
/// Note that it is based on the `sync` version of Moka cache rather than its `future` version,
/// because [AssetCache] operations never suspend.
///
/// Moka's eviction policy is TinyLFU rather than LRU and its housekeeping is deferred, so
/// [len](AssetCache::len) and [total_cost](AssetCache::total_cost) are eventually consistent and
/// the capacity can be briefly exceeded. An entry whose cost alone exceeds the capacity is
/// rejected rather than kept. Prefer
/// [LruAssetCache](super::super::lru::LruAssetCache) when those bounds must be exact.
///
/// Build with [ForAssets::for_assets](super::ForAssets::for_assets) so that entry costs are used
/// as Moka weights.
pub type MokaAssetCache<CacheKeyT = UrlKey, AssetT = bytes::Bytes> =
    moka::sync::Cache<CacheKeyT, CacheEntry<AssetT>>;

impl<CacheKeyT, AssetT> AssetCache<CacheKeyT, AssetT> for MokaAssetCache<CacheKeyT, AssetT>
where
    CacheKeyT: CacheKey,
    AssetT: 'static + Clone + Send + Sync,
{
    fn get(&self, key: &CacheKeyT) -> Option<AssetT> {
        moka::sync::Cache::get(self, key).map(|entry| entry.asset)
    }

    fn put(&self, key: CacheKeyT, asset: AssetT, cost: usize) {
        self.insert(key, CacheEntry::new(asset, cost))
    }

    fn remove(&self, key: &CacheKeyT) {
        self.invalidate(key)
    }

    fn remove_all(&self) {
        self.invalidate_all()
    }

    fn contains(&self, key: &CacheKeyT) -> bool {
        self.contains_key(key)
    }

    fn len(&self) -> usize {
        self.entry_count().try_into().unwrap_or(usize::MAX)
    }

    fn total_cost(&self) -> usize {
        self.weighted_size().try_into().unwrap_or(usize::MAX)
    }
}
