use std::sync::*;

/// Hook to compute the cost of a decoded asset.
pub type CostHook<CacheKeyT, AssetT> =
    Arc<Box<dyn Fn(CostHookContext<CacheKeyT, AssetT>) -> usize + Send + Sync>>;

//
// CostHookContext
//

/// Context for [CostHook].
#[derive(Debug)]
pub struct CostHookContext<'this, CacheKeyT, AssetT> {
    /// Key.
    pub key: &'this CacheKeyT,

    /// Decoded asset.
    pub asset: &'this AssetT,
}

impl<'this, CacheKeyT, AssetT> CostHookContext<'this, CacheKeyT, AssetT> {
    /// Constructor.
    pub fn new(key: &'this CacheKeyT, asset: &'this AssetT) -> Self {
        Self { key, asset }
    }
}
