use super::{
    super::super::{entry::*, key::*},
    weigher::*,
};

//
// ForAssets
//

/// Add support for [CacheEntry] weigher.
pub trait ForAssets
where
    Self: Sized,
{
    /// Add support for [CacheEntry] weigher.
    fn for_assets(self) -> Self;
}

impl<CacheKeyT, AssetT> ForAssets
    for moka::sync::CacheBuilder<
        CacheKeyT,
        CacheEntry<AssetT>,
        moka::sync::Cache<CacheKeyT, CacheEntry<AssetT>>,
    >
where
    CacheKeyT: CacheKey,
    AssetT: 'static + Clone + Send + Sync,
{
    fn for_assets(self) -> Self {
        self.weigher(weigher)
    }
}
