//
// CacheConfiguration
//

/// Cache configuration.
#[derive(Clone, Debug)]
pub struct CacheConfiguration {
    /// Capacity as a total cost.
    ///
    /// This is a soft target: a single entry whose cost alone exceeds it is still kept.
    pub capacity: usize,
}

impl Default for CacheConfiguration {
    fn default() -> Self {
        Self {
            capacity: 64 * 1024 * 1024, // 64 MiB
        }
    }
}
