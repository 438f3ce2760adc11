use {
    asset_cache_loader::{
        cache::{implementation::lru::*, *},
        *,
    },
    bytes::*,
    http::StatusCode,
    std::{
        sync::{Arc, Barrier, atomic::*},
        time::*,
    },
    tokio::{sync::*, time::*},
};

//
// GatedFetcher
//

// Holds every fetch until the test opens the gate, so requests can pile up deterministically.
//
// URLs containing "fail" fail with 404 and URLs containing "panic" panic. Anything else returns
// the URL itself as the body.
struct GatedFetcher {
    calls: AtomicUsize,
    gate: Semaphore,
}

impl Default for GatedFetcher {
    fn default() -> Self {
        Self { calls: AtomicUsize::new(0), gate: Semaphore::new(0) }
    }
}

impl GatedFetcher {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn open(&self, fetches: usize) {
        self.gate.add_permits(fetches);
    }
}

impl Fetcher for GatedFetcher {
    async fn fetch(&self, key: &UrlKey) -> Result<Bytes, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.gate.acquire().await.map_err(FetchError::transport)?.forget();

        if key.as_str().contains("fail") {
            return Err(FetchError::Status(StatusCode::NOT_FOUND));
        }

        if key.as_str().contains("panic") {
            panic!("fetcher panicked: {}", key);
        }

        Ok(Bytes::copy_from_slice(key.as_str().as_bytes()))
    }
}

type TestLoader = AssetLoader<Arc<GatedFetcher>, BytesDecoder, LruAssetCache>;

fn loader() -> (TestLoader, Arc<GatedFetcher>) {
    let fetcher = Arc::new(GatedFetcher::default());
    let loader = AssetLoader::new(fetcher.clone(), BytesDecoder, LruAssetCache::new(1024 * 1024));
    (loader, fetcher)
}

// Wait for all in-flight fetches to commit
async fn settle<FetcherT, DecoderT, CacheT>(loader: &AssetLoader<FetcherT, DecoderT, CacheT>)
where
    FetcherT: Fetcher,
    DecoderT: Decoder,
    DecoderT::Asset: CacheWeight,
    CacheT: AssetCache<UrlKey, DecoderT::Asset>,
{
    timeout(Duration::from_secs(5), async {
        while loader.in_flight_count() > 0 {
            sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("settle");
}

async fn started(fetcher: &GatedFetcher, calls: usize) {
    timeout(Duration::from_secs(5), async {
        while fetcher.calls() < calls {
            sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("started");
}

const IMG1: &str = "https://gallery.example/img1.png";
const IMG2: &str = "https://gallery.example/img2.png";
const FAIL: &str = "https://gallery.example/fail.png";
const PANIC: &str = "https://gallery.example/panic.png";

#[tokio::test]
async fn concurrent_requests_share_one_fetch() {
    let (loader, fetcher) = loader();

    let first = loader.request(IMG1.into(), ConsumerId::next());
    let second = loader.request(IMG1.into(), ConsumerId::next());
    assert!(!first.is_resolved());
    assert!(!second.is_resolved());
    assert_eq!(loader.waiter_count(&IMG1.into()), 2);

    fetcher.open(1);

    let first = first.await.into_asset().expect("asset");
    let second = second.await.into_asset().expect("asset");
    assert_eq!(first, IMG1.as_bytes());
    assert_eq!(first, second);

    assert_eq!(fetcher.calls(), 1);
    assert_eq!(loader.stats().misses(), 1);
    assert_eq!(loader.stats().coalesced(), 1);
    assert_eq!(loader.stats().fetches(), 1);
    assert!(!loader.is_in_flight(&IMG1.into()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn many_concurrent_consumers_share_one_fetch() {
    let (loader, fetcher) = loader();

    let tasks: Vec<_> = (0..32)
        .map(|_| {
            let loader = loader.clone();
            tokio::spawn(async move { loader.request(IMG1.into(), ConsumerId::next()).await })
        })
        .collect();

    started(&fetcher, 1).await;
    fetcher.open(32);

    for task in tasks {
        let outcome = task.await.expect("join");
        assert_eq!(outcome.into_asset().expect("asset"), IMG1.as_bytes());
    }

    assert_eq!(fetcher.calls(), 1);
    let stats = loader.stats();
    assert_eq!(stats.hits() + stats.misses() + stats.coalesced(), 32);
}

#[tokio::test]
async fn request_after_commit_is_a_hit() {
    let (loader, fetcher) = loader();
    fetcher.open(1);

    let asset = loader.load(IMG1.into()).await.into_asset().expect("asset");

    let mut handle = loader.request(IMG1.into(), ConsumerId::next());
    assert!(handle.is_resolved());
    assert_eq!(handle.try_outcome().and_then(AssetOutcome::into_asset), Some(asset));

    assert_eq!(fetcher.calls(), 1);
    assert_eq!(loader.stats().hits(), 1);
    assert_eq!(loader.in_flight_count(), 0);
}

#[tokio::test]
async fn failure_is_delivered_to_all_waiters_and_not_cached() {
    let (loader, fetcher) = loader();

    let first = loader.request(FAIL.into(), ConsumerId::next());
    let second = loader.request(FAIL.into(), ConsumerId::next());
    fetcher.open(1);

    for outcome in [first.await, second.await] {
        assert!(matches!(
            outcome.error(),
            Some(LoadError::Fetch(FetchError::Status(status))) if *status == StatusCode::NOT_FOUND
        ));
    }

    assert!(loader.cached(&FAIL.into()).is_none());
    assert!(!loader.is_in_flight(&FAIL.into()));
    assert_eq!(loader.stats().failures(), 1);

    // No negative caching: the next request fetches again
    let handle = loader.request(FAIL.into(), ConsumerId::next());
    assert!(!handle.is_resolved());
    fetcher.open(1);
    assert!(handle.await.error().is_some());
    assert_eq!(fetcher.calls(), 2);
}

#[tokio::test]
async fn cancel_affects_only_its_own_handle() {
    let (loader, fetcher) = loader();

    let mut cancelled = loader.request(IMG1.into(), ConsumerId::next());
    let waiting = loader.request(IMG1.into(), ConsumerId::next());

    assert!(cancelled.cancel());
    assert_eq!(loader.waiter_count(&IMG1.into()), 1);
    assert!(loader.is_in_flight(&IMG1.into()));

    fetcher.open(1);

    assert!(waiting.await.asset().is_some());
    assert!(cancelled.await.is_cancelled());
    assert_eq!(loader.stats().cancellations(), 1);
}

#[tokio::test]
async fn cancel_twice_removes_once() {
    let (loader, _fetcher) = loader();

    let mut handle = loader.request(IMG1.into(), ConsumerId::next());
    assert!(handle.cancel());
    assert!(!handle.cancel());
    assert!(handle.is_resolved());
    assert_eq!(loader.stats().cancellations(), 1);
}

#[tokio::test]
async fn cancel_after_resolution_still_yields_cancelled() {
    let (loader, fetcher) = loader();
    fetcher.open(1);
    loader.load(IMG1.into()).await;

    let mut handle = loader.request(IMG1.into(), ConsumerId::next());
    assert!(handle.is_resolved());
    assert!(!handle.cancel());
    assert!(handle.await.is_cancelled());

    // The asset stays cached
    assert!(loader.cached(&IMG1.into()).is_some());
}

#[tokio::test]
async fn orphaned_fetch_is_still_cached() {
    let (loader, fetcher) = loader();

    let mut handle = loader.request(IMG1.into(), ConsumerId::next());
    handle.cancel();
    assert_eq!(loader.waiter_count(&IMG1.into()), 0);
    assert!(loader.is_in_flight(&IMG1.into()));

    fetcher.open(1);
    settle(&loader).await;

    assert_eq!(loader.cached(&IMG1.into()).as_deref(), Some(IMG1.as_bytes()));
    assert_eq!(fetcher.calls(), 1);
}

#[tokio::test]
async fn dropping_a_pending_handle_cancels_it() {
    let (loader, fetcher) = loader();

    let handle = loader.request(IMG1.into(), ConsumerId::next());
    let waiting = loader.request(IMG1.into(), ConsumerId::next());
    drop(handle);

    assert_eq!(loader.waiter_count(&IMG1.into()), 1);
    assert_eq!(loader.stats().cancellations(), 1);

    fetcher.open(1);
    assert!(waiting.await.asset().is_some());
}

#[tokio::test]
async fn same_consumer_is_registered_once() {
    let (loader, fetcher) = loader();
    let consumer = ConsumerId::next();

    let older = loader.request(IMG1.into(), consumer);
    let newer = loader.request(IMG1.into(), consumer);

    assert_eq!(loader.waiter_count(&IMG1.into()), 1);
    assert_eq!(loader.stats().superseded(), 1);
    assert!(older.await.is_cancelled());

    fetcher.open(1);
    assert!(newer.await.asset().is_some());
    assert_eq!(fetcher.calls(), 1);
}

#[tokio::test]
async fn recycled_consumer_moves_to_another_key() {
    let (loader, fetcher) = loader();
    let slot = ConsumerId::next();

    let mut first = loader.request(IMG1.into(), slot);
    first.cancel();
    let second = loader.request(IMG2.into(), slot);

    fetcher.open(2);

    assert_eq!(second.await.into_asset().as_deref(), Some(IMG2.as_bytes()));
    assert!(first.await.is_cancelled());

    settle(&loader).await;
    assert!(loader.cached(&IMG1.into()).is_some());
}

#[tokio::test]
async fn prefetch_starts_a_fetch_without_waiters() {
    let (loader, fetcher) = loader();

    assert!(loader.prefetch(IMG1.into()));
    assert!(!loader.prefetch(IMG1.into()));
    assert_eq!(loader.waiter_count(&IMG1.into()), 0);

    // A request joins the prefetch
    let handle = loader.request(IMG1.into(), ConsumerId::next());
    assert_eq!(loader.stats().coalesced(), 1);

    fetcher.open(1);
    assert!(handle.await.asset().is_some());

    settle(&loader).await;
    assert!(!loader.prefetch(IMG1.into()));
    assert_eq!(fetcher.calls(), 1);
}

#[tokio::test]
async fn invalidate_forces_a_new_fetch() {
    let (loader, fetcher) = loader();
    fetcher.open(2);

    loader.load(IMG1.into()).await;
    loader.invalidate(&IMG1.into());
    assert!(loader.cached(&IMG1.into()).is_none());

    assert!(loader.load(IMG1.into()).await.asset().is_some());
    assert_eq!(fetcher.calls(), 2);
}

#[tokio::test]
async fn try_outcome_before_and_after_resolution() {
    let (loader, fetcher) = loader();

    let mut handle = loader.request(IMG1.into(), ConsumerId::next());
    assert!(handle.try_outcome().is_none());

    fetcher.open(1);
    settle(&loader).await;

    assert!(handle.try_outcome().and_then(AssetOutcome::into_asset).is_some());
    assert!(handle.is_resolved());

    // Same outcome again
    assert!(handle.await.asset().is_some());
}

#[tokio::test]
async fn fetcher_panic_abandons_the_fetch() {
    let (loader, fetcher) = loader();

    let first = loader.request(PANIC.into(), ConsumerId::next());
    let second = loader.request(PANIC.into(), ConsumerId::next());
    fetcher.open(1);

    assert!(matches!(first.await.error(), Some(LoadError::Abandoned)));
    assert!(matches!(second.await.error(), Some(LoadError::Abandoned)));
    assert!(!loader.is_in_flight(&PANIC.into()));

    // Requestable again
    let handle = loader.request(PANIC.into(), ConsumerId::next());
    assert!(!handle.is_resolved());
    assert!(loader.is_in_flight(&PANIC.into()));
}

#[tokio::test]
async fn decode_error_is_delivered_and_not_cached() {
    let fetcher = Arc::new(GatedFetcher::default());
    let decoder = decoder_fn(|_bytes: Bytes| Err::<Bytes, _>(DecodeError::unsupported("webp")));
    let loader = AssetLoader::new(fetcher.clone(), decoder, LruAssetCache::new(1024));
    fetcher.open(1);

    let outcome = loader.load(IMG1.into()).await;
    assert!(matches!(
        outcome.error(),
        Some(LoadError::Decode(DecodeError::Unsupported(format))) if format == "webp"
    ));
    assert!(loader.cached(&IMG1.into()).is_none());
    assert_eq!(loader.stats().failures(), 1);
}

#[tokio::test]
async fn decoder_panic_is_a_decode_error() {
    let fetcher = Arc::new(GatedFetcher::default());
    let decoder = decoder_fn(|_bytes: Bytes| -> Result<Bytes, DecodeError> { panic!("bad pixels") });
    let loader = AssetLoader::new(fetcher.clone(), decoder, LruAssetCache::new(1024));
    fetcher.open(1);

    let outcome = loader.load(IMG1.into()).await;
    assert!(matches!(
        outcome.error(),
        Some(LoadError::Decode(DecodeError::Malformed(_)))
    ));
    assert!(!loader.is_in_flight(&IMG1.into()));
}

#[tokio::test]
async fn inline_decoding() {
    let fetcher = Arc::new(GatedFetcher::default());
    let decoder = decoder_fn(|bytes: Bytes| Ok(Arc::new(bytes.to_vec())));
    let loader = AssetLoader::builder(fetcher.clone(), decoder, LruAssetCache::new(1024))
        .decode_on_blocking_pool(false)
        .build();
    fetcher.open(1);

    let asset = loader.load(IMG1.into()).await.into_asset().expect("asset");
    assert_eq!(asset.as_slice(), IMG1.as_bytes());
}

#[tokio::test]
async fn cost_hook_bounds_the_number_of_assets() {
    let fetcher = Arc::new(GatedFetcher::default());
    let loader = AssetLoader::builder(fetcher.clone(), BytesDecoder, LruAssetCache::new(2))
        .cost(|_context| 1)
        .build();
    fetcher.open(3);

    for url in [IMG1, IMG2, "https://gallery.example/img3.png"] {
        loader.load(url.into()).await;
    }

    assert_eq!(loader.cache().len(), 2);
    assert_eq!(loader.cache().total_cost(), 2);
    assert!(loader.cached(&IMG1.into()).is_none());
}

#[tokio::test]
async fn default_cost_is_the_asset_weight() {
    let (loader, fetcher) = loader();
    fetcher.open(1);

    let asset = loader.load(IMG1.into()).await.into_asset().expect("asset");
    assert_eq!(loader.cache().total_cost(), asset.cache_weight());
}

#[test]
fn request_from_outside_the_runtime() {
    let runtime = tokio::runtime::Runtime::new().expect("runtime");

    let fetcher = Arc::new(GatedFetcher::default());
    let loader = AssetLoader::builder(fetcher.clone(), BytesDecoder, LruAssetCache::new(1024))
        .runtime(runtime.handle().clone())
        .build();
    fetcher.open(1);

    // This thread is not part of the runtime
    let handle = loader.request(IMG1.into(), ConsumerId::next());
    let outcome = runtime.block_on(handle);
    assert!(outcome.asset().is_some());
}

#[test]
fn request_on_a_shut_down_runtime_is_abandoned() {
    let runtime = tokio::runtime::Runtime::new().expect("runtime");
    let handle = runtime.handle().clone();
    drop(runtime);

    let fetcher = Arc::new(GatedFetcher::default());
    let loader = AssetLoader::builder(fetcher.clone(), BytesDecoder, LruAssetCache::new(1024))
        .runtime(handle)
        .build();

    let mut handle = loader.request(IMG1.into(), ConsumerId::next());
    assert!(matches!(
        handle.try_outcome().as_ref().and_then(AssetOutcome::error),
        Some(LoadError::Abandoned)
    ));
    assert!(!loader.is_in_flight(&IMG1.into()));
    assert_eq!(fetcher.calls(), 0);
}

#[test]
#[should_panic]
fn request_outside_of_a_runtime_panics() {
    let (loader, _fetcher) = loader();
    loader.request(IMG1.into(), ConsumerId::next());
}

#[tokio::test]
async fn panic_during_commit_abandons_the_fetch() {
    let fetcher = Arc::new(GatedFetcher::default());
    let loader = AssetLoader::builder(fetcher.clone(), BytesDecoder, LruAssetCache::new(1024))
        .cost(|_context| panic!("cost"))
        .build();
    fetcher.open(2);

    let outcome = timeout(Duration::from_secs(5), loader.load(IMG1.into()))
        .await
        .expect("resolved");
    assert!(matches!(outcome.error(), Some(LoadError::Abandoned)));
    assert!(!loader.is_in_flight(&IMG1.into()));
    assert!(loader.cached(&IMG1.into()).is_none());

    // Requestable again
    let outcome = timeout(Duration::from_secs(5), loader.load(IMG1.into()))
        .await
        .expect("resolved");
    assert!(matches!(outcome.error(), Some(LoadError::Abandoned)));
    assert_eq!(fetcher.calls(), 2);
}

#[test]
fn request_during_commit_is_a_hit() {
    let runtime = tokio::runtime::Runtime::new().expect("runtime");

    // The first eviction holds the commit between its cache put and the removal of its record
    let entered = Arc::new(Barrier::new(2));
    let release = Arc::new(Barrier::new(2));
    let held = Arc::new(AtomicBool::new(false));

    let cache = {
        let entered = entered.clone();
        let release = release.clone();
        let held = held.clone();
        LruAssetCache::<UrlKey, Bytes>::builder()
            .capacity(1)
            .eviction_listener(move |_context| {
                if !held.swap(true, Ordering::SeqCst) {
                    entered.wait();
                    release.wait();
                }
            })
            .build()
    };

    let fetcher = Arc::new(GatedFetcher::default());
    let loader = AssetLoader::builder(fetcher.clone(), BytesDecoder, cache)
        .runtime(runtime.handle().clone())
        .cost(|_context| 1)
        .build();
    loader.cache().put(IMG2.into(), Bytes::from_static(b"old"), 1);

    let first = loader.request(IMG1.into(), ConsumerId::next());
    fetcher.open(1);
    entered.wait();

    // Committed to the cache but still in flight
    assert!(loader.is_in_flight(&IMG1.into()));
    let mut second = loader.request(IMG1.into(), ConsumerId::next());
    assert!(second.is_resolved());
    assert!(second.try_outcome().and_then(AssetOutcome::into_asset).is_some());

    release.wait();

    assert!(runtime.block_on(first).asset().is_some());
    assert_eq!(fetcher.calls(), 1);
    assert_eq!(loader.stats().hits(), 1);
}
