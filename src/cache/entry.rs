//
// CacheEntry
//

/// Cache entry.
///
/// Immutable once inserted. Replacing the asset for a key means inserting a new entry.
#[derive(Clone, Debug)]
pub struct CacheEntry<AssetT> {
    /// Decoded asset.
    pub asset: AssetT,

    /// Cost counted against the cache's capacity.
    pub cost: usize,
}

impl<AssetT> CacheEntry<AssetT> {
    /// Constructor.
    pub fn new(asset: AssetT, cost: usize) -> Self {
        Self { asset, cost }
    }
}
