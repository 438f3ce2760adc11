use super::super::super::{entry::*, key::*};

/// Moka cache entry weigher.
///
/// Uses the [CacheEntry] cost so that capacity means the same thing as it does for the LRU
/// implementation.
pub fn weigher<CacheKeyT, AssetT>(cache_key: &CacheKeyT, entry: &CacheEntry<AssetT>) -> u32
where
    CacheKeyT: CacheKey,
{
    let weight = entry.cost.try_into().unwrap_or(u32::MAX);
    tracing::trace!("{} for {}", weight, cache_key);
    weight
}
