/// Exact least-recently-used cache implementation.
pub mod lru;

/// Moka cache implementation.
#[cfg(feature = "moka")]
pub mod moka;
