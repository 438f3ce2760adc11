use super::hooks::*;

use tokio::runtime::*;

//
// LoaderConfiguration
//

/// Loader configuration.
pub struct LoaderConfiguration<CacheKeyT, AssetT> {
    /// Decode on Tokio's blocking pool.
    pub decode_on_blocking_pool: bool,

    /// Runtime on which to spawn fetches. [None] means the current runtime.
    pub runtime: Option<Handle>,

    /// Cost (hook).
    pub cost: Option<CostHook<CacheKeyT, AssetT>>,
}

impl<CacheKeyT, AssetT> Default for LoaderConfiguration<CacheKeyT, AssetT> {
    fn default() -> Self {
        Self {
            decode_on_blocking_pool: true,
            runtime: None,
            cost: None,
        }
    }
}

impl<CacheKeyT, AssetT> Clone for LoaderConfiguration<CacheKeyT, AssetT> {
    fn clone(&self) -> Self {
        // Unfortunately we can't get away with #[derive(Clone)]
        // It would require CacheKeyT and AssetT to be Clone, too
        Self {
            decode_on_blocking_pool: self.decode_on_blocking_pool,
            runtime: self.runtime.clone(),
            cost: self.cost.clone(),
        }
    }
}
