use std::sync::*;

/// Hook called for every entry evicted to satisfy the cache's capacity.
///
/// Not called for explicit removals or for replaced entries.
pub type EvictionHook<CacheKeyT> = Arc<Box<dyn Fn(EvictionHookContext<CacheKeyT>) + Send + Sync>>;

//
// EvictionHookContext
//

/// Context for [EvictionHook].
#[derive(Clone, Debug)]
pub struct EvictionHookContext<'this, CacheKeyT> {
    /// Key of the evicted entry.
    pub key: &'this CacheKeyT,

    /// Cost of the evicted entry.
    pub cost: usize,
}

impl<'this, CacheKeyT> EvictionHookContext<'this, CacheKeyT> {
    /// Constructor.
    pub fn new(key: &'this CacheKeyT, cost: usize) -> Self {
        Self { key, cost }
    }
}
