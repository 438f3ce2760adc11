use super::{cache::*, key::*};

//
// TieredCache
//

/// Two-tiered [AssetCache].
///
/// The assumption is that the first cache is smaller than the next, e.g. a small exact LRU in
/// front of a large Moka cache. A hit in the next cache is promoted into the first.
///
/// Costs are not tracked per tier, so a promoted asset is put into the first cache with a cost
/// of `promotion_cost`.
///
/// [len](AssetCache::len) and [total_cost](AssetCache::total_cost) report the larger of the two
/// tiers rather than their sum, since entries are shared between them.
///
/// For more tiers you can chain this type.
#[derive(Clone, Debug)]
pub struct TieredCache<FirstCacheT, NextCacheT> {
    /// First cache.
    pub first: FirstCacheT,

    /// Next cache.
    pub next: NextCacheT,

    /// Cost used when promoting from the next cache into the first.
    pub promotion_cost: usize,
}

impl<FirstCacheT, NextCacheT> TieredCache<FirstCacheT, NextCacheT> {
    /// Constructor.
    pub fn new(first: FirstCacheT, next: NextCacheT, promotion_cost: usize) -> Self {
        Self {
            first,
            next,
            promotion_cost,
        }
    }
}

impl<CacheKeyT, AssetT, FirstCacheT, NextCacheT> AssetCache<CacheKeyT, AssetT>
    for TieredCache<FirstCacheT, NextCacheT>
where
    CacheKeyT: CacheKey,
    AssetT: 'static + Clone + Send + Sync,
    FirstCacheT: AssetCache<CacheKeyT, AssetT>,
    NextCacheT: AssetCache<CacheKeyT, AssetT>,
{
    fn get(&self, key: &CacheKeyT) -> Option<AssetT> {
        match self.first.get(key) {
            Some(asset) => Some(asset),
            None => {
                let asset = self.next.get(key)?;
                tracing::debug!("promote: {}", key);
                self.first
                    .put(key.clone(), asset.clone(), self.promotion_cost);
                Some(asset)
            }
        }
    }

    fn put(&self, key: CacheKeyT, asset: AssetT, cost: usize) {
        self.first.put(key.clone(), asset.clone(), cost);
        self.next.put(key, asset, cost)
    }

    fn remove(&self, key: &CacheKeyT) {
        self.first.remove(key);
        self.next.remove(key)
    }

    fn remove_all(&self) {
        self.first.remove_all();
        self.next.remove_all()
    }

    fn contains(&self, key: &CacheKeyT) -> bool {
        self.first.contains(key) || self.next.contains(key)
    }

    // Every entry is put into both tiers and the first is usually a subset of the next, so the
    // larger tier is the better estimate for both of these

    fn len(&self) -> usize {
        self.first.len().max(self.next.len())
    }

    fn total_cost(&self) -> usize {
        self.first.total_cost().max(self.next.total_cost())
    }
}
