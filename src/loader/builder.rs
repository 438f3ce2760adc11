use super::{
    super::{cache::*, fetch::*},
    configuration::*,
    hooks::*,
    loader::*,
};

use {std::sync::*, tokio::runtime::*};

//
// AssetLoaderBuilder
//

/// Builder for [AssetLoader].
///
/// The fetcher, decoder, and cache are provided as generic type parameters. [HttpFetcher],
/// [LruAssetCache](super::super::cache::implementation::lru::LruAssetCache), and [UrlKey] should
/// suffice for loading images over HTTP.
pub struct AssetLoaderBuilder<FetcherT, DecoderT, CacheT, CacheKeyT>
where
    DecoderT: Decoder,
{
    fetcher: FetcherT,
    decoder: DecoderT,
    cache: CacheT,
    configuration: LoaderConfiguration<CacheKeyT, DecoderT::Asset>,
}

impl<FetcherT, DecoderT, CacheT, CacheKeyT> AssetLoaderBuilder<FetcherT, DecoderT, CacheT, CacheKeyT>
where
    FetcherT: Fetcher<CacheKeyT>,
    DecoderT: Decoder,
    DecoderT::Asset: CacheWeight,
    CacheT: AssetCache<CacheKeyT, DecoderT::Asset>,
    CacheKeyT: CacheKey,
{
    /// Constructor.
    pub fn new(fetcher: FetcherT, decoder: DecoderT, cache: CacheT) -> Self {
        Self {
            fetcher,
            decoder,
            cache,
            configuration: Default::default(),
        }
    }

    /// Whether to decode on Tokio's blocking pool.
    ///
    /// Turn this off for decoders so cheap that the hop to another thread costs more than the
    /// decoding itself.
    ///
    /// The default is true.
    pub fn decode_on_blocking_pool(mut self, decode_on_blocking_pool: bool) -> Self {
        self.configuration.decode_on_blocking_pool = decode_on_blocking_pool;
        self
    }

    /// Runtime on which to spawn fetches.
    ///
    /// Provide this in order to request assets from threads that are not part of a Tokio
    /// runtime, e.g. a UI thread.
    ///
    /// [None] by default, meaning the runtime current at the time of the request.
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.configuration.runtime = Some(runtime);
        self
    }

    /// Provide a hook to compute the cost of a decoded asset.
    ///
    /// The cost is what is counted against the cache's capacity. Return 1 to bound the number of
    /// cached assets rather than their size.
    ///
    /// [None] by default, meaning the asset's [CacheWeight].
    pub fn cost(
        mut self,
        cost: impl Fn(CostHookContext<CacheKeyT, DecoderT::Asset>) -> usize + 'static + Send + Sync,
    ) -> Self {
        self.configuration.cost = Some(Arc::new(Box::new(cost)));
        self
    }

    /// Build.
    pub fn build(self) -> AssetLoader<FetcherT, DecoderT, CacheT, CacheKeyT> {
        AssetLoader::new_with(self.fetcher, self.decoder, self.cache, self.configuration)
    }
}
