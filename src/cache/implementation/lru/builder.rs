use super::{
    super::super::{configuration::*, hooks::*, key::*},
    cache::*,
};

use std::sync::*;

//
// LruAssetCacheBuilder
//

/// Builder for [LruAssetCache].
pub struct LruAssetCacheBuilder<CacheKeyT, AssetT>
where
    CacheKeyT: CacheKey,
{
    configuration: CacheConfiguration,
    eviction: Option<EvictionHook<CacheKeyT>>,
    asset: std::marker::PhantomData<fn() -> AssetT>,
}

impl<CacheKeyT, AssetT> LruAssetCacheBuilder<CacheKeyT, AssetT>
where
    CacheKeyT: CacheKey,
{
    /// Capacity as a total cost.
    ///
    /// What a unit of cost means is up to the loader's cost hook. By default it is the asset's
    /// [CacheWeight](super::super::super::CacheWeight), i.e. roughly bytes. Use a cost of 1 per
    /// asset to bound the number of entries instead.
    ///
    /// The default is 64 MiB.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.configuration.capacity = capacity;
        self
    }

    /// Provide a hook to be called for every entry evicted to satisfy capacity.
    ///
    /// The hook is called after the cache's internal lock is released, so it may use the cache.
    ///
    /// [None] by default.
    pub fn eviction_listener(
        mut self,
        eviction_listener: impl Fn(EvictionHookContext<CacheKeyT>) + 'static + Send + Sync,
    ) -> Self {
        self.eviction = Some(Arc::new(Box::new(eviction_listener)));
        self
    }

    /// Build.
    pub fn build(self) -> LruAssetCache<CacheKeyT, AssetT> {
        LruAssetCache::new_with(self.configuration, self.eviction)
    }
}

impl<CacheKeyT, AssetT> Default for LruAssetCacheBuilder<CacheKeyT, AssetT>
where
    CacheKeyT: CacheKey,
{
    fn default() -> Self {
        Self {
            configuration: Default::default(),
            eviction: None,
            asset: Default::default(),
        }
    }
}
