use super::super::{cache::*, error::*};

use {bytes::*, std::sync::*};

//
// Fetcher
//

/// Produces the raw bytes for a key.
///
/// Retry policy, if any, belongs here and not in the loader. A fetcher that gives up (including
/// on its own timeout) reports a [FetchError].
///
/// Note that this is an `async` function written in longer form in order to include the `Send`
/// constraint. Implementations can simply use `async fn fetch`.
pub trait Fetcher<CacheKeyT = UrlKey>
where
    Self: 'static + Send + Sync,
    CacheKeyT: CacheKey,
{
    /// Fetch the raw bytes for a key.
    fn fetch(&self, key: &CacheKeyT) -> impl Future<Output = Result<Bytes, FetchError>> + Send;
}

impl<CacheKeyT, FetcherT> Fetcher<CacheKeyT> for Arc<FetcherT>
where
    CacheKeyT: CacheKey,
    FetcherT: Fetcher<CacheKeyT>,
{
    fn fetch(&self, key: &CacheKeyT) -> impl Future<Output = Result<Bytes, FetchError>> + Send {
        self.as_ref().fetch(key)
    }
}

//
// FetcherFn
//

/// [Fetcher] implemented by a function.
///
/// The function receives its own clone of the key so that the returned future can own it.
#[derive(Clone, Debug)]
pub struct FetcherFn<FunctionT>(pub FunctionT);

/// Create a [Fetcher] from a function.
pub fn fetcher_fn<CacheKeyT, FunctionT, FutureT>(function: FunctionT) -> FetcherFn<FunctionT>
where
    FunctionT: Fn(CacheKeyT) -> FutureT,
{
    FetcherFn(function)
}

impl<CacheKeyT, FunctionT, FutureT> Fetcher<CacheKeyT> for FetcherFn<FunctionT>
where
    CacheKeyT: CacheKey,
    FunctionT: 'static + Fn(CacheKeyT) -> FutureT + Send + Sync,
    FutureT: Future<Output = Result<Bytes, FetchError>> + Send,
{
    fn fetch(&self, key: &CacheKeyT) -> impl Future<Output = Result<Bytes, FetchError>> + Send {
        (self.0)(key.clone())
    }
}
