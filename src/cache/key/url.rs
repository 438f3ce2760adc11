use super::{super::weight::*, key::*};

use {
    http::uri::*,
    std::{fmt, hash::*, sync::*},
};

//
// UrlKey
//

/// [CacheKey] implementation for assets addressed by URL.
///
/// The URL is kept as the exact string it was created from. No normalization is performed, so
/// `https://a/b?x=1&y=2` and `https://a/b?y=2&x=1` are different keys.
///
/// Cloning is cheap.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct UrlKey(Arc<str>);

impl UrlKey {
    /// Constructor.
    pub fn new(url: impl Into<Arc<str>>) -> Self {
        Self(url.into())
    }

    /// As string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse as a [Uri].
    pub fn to_uri(&self) -> Result<Uri, InvalidUri> {
        self.0.parse()
    }
}

impl CacheKey for UrlKey {}

impl CacheWeight for UrlKey {
    fn cache_weight(&self) -> usize {
        const SELF_SIZE: usize = size_of::<UrlKey>();
        SELF_SIZE + self.0.len()
    }
}

impl AsRef<str> for UrlKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UrlKey {
    fn from(url: &str) -> Self {
        Self::new(url)
    }
}

impl From<String> for UrlKey {
    fn from(url: String) -> Self {
        Self::new(url)
    }
}

impl From<&Uri> for UrlKey {
    fn from(uri: &Uri) -> Self {
        Self::new(uri.to_string())
    }
}

impl fmt::Display for UrlKey {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.0, formatter)
    }
}
