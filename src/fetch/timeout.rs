use super::{
    super::{cache::*, error::*},
    fetcher::*,
};

use {
    bytes::*,
    duration_str::*,
    std::{result::Result, time::*},
};

//
// TimeoutFetcher
//

/// [Fetcher] wrapper that gives up after a timeout.
///
/// A timeout is reported as [FetchError::Timeout] and is otherwise treated like any other fetch
/// failure: it is not cached and the next request for the key starts a fresh fetch.
#[derive(Clone, Debug)]
pub struct TimeoutFetcher<FetcherT> {
    /// Inner fetcher.
    pub inner: FetcherT,

    /// Timeout.
    pub timeout: Duration,
}

impl<FetcherT> TimeoutFetcher<FetcherT> {
    /// Constructor.
    pub fn new(inner: FetcherT, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    /// Constructor with the timeout parsed from a human string, e.g. "5s" or "1m 30s".
    ///
    /// See [duration-str](https://github.com/baoyachi/duration-str) for the syntax.
    pub fn new_from_str(inner: FetcherT, timeout: &str) -> Result<Self, ConfigurationError> {
        let timeout = parse(timeout).map_err(|error| ConfigurationError::InvalidDuration {
            input: timeout.into(),
            reason: error.to_string(),
        })?;
        Ok(Self::new(inner, timeout))
    }
}

impl<CacheKeyT, FetcherT> Fetcher<CacheKeyT> for TimeoutFetcher<FetcherT>
where
    CacheKeyT: CacheKey,
    FetcherT: Fetcher<CacheKeyT>,
{
    async fn fetch(&self, key: &CacheKeyT) -> Result<Bytes, FetchError> {
        match tokio::time::timeout(self.timeout, self.inner.fetch(key)).await {
            Ok(result) => result,

            Err(_) => {
                tracing::debug!("timeout ({}): {}", self.timeout.human_format(), key);
                Err(FetchError::Timeout(self.timeout))
            }
        }
    }
}
