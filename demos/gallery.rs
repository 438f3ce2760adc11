use {
    asset_cache_loader::{
        cache::{implementation::lru::*, *},
        *,
    },
    bytes::*,
    std::{sync::*, time::*},
    tokio::{time::sleep, *},
    tracing_subscriber::{filter::*, prelude::*, *},
};

// A scrolling image grid in miniature
//
// Pay attention to the tracing log to see what the loader and the cache are doing! Run with
// RUST_LOG=asset_cache_loader=trace for even more detail.
//
// Ten slots show a listing of forty images. We bind the first page, scroll past it so fast that
// most of it is recycled before the images arrive, then scroll back.

const LISTING_URL: &str = "https://gallery.example/images.json";

const IMAGE_COUNT: usize = 40;
const SLOT_COUNT: usize = 10;

// Enough for about two pages of decoded images
const CACHE_SIZE: usize = 20 * PIXEL_BYTES;

const PIXEL_BYTES: usize = 64 * 64 * 4;

#[main]
async fn main() {
    init_tracing();

    let fetcher = TimeoutFetcher::new_from_str(fetcher_fn(fake_fetch), "2s").expect("timeout");

    let listing = UrlListing::fetch(&fetcher, &LISTING_URL.into())
        .await
        .expect("UrlListing::fetch");
    tracing::info!("listing has {} images", listing.len());

    let cache = LruAssetCache::<UrlKey, Arc<Image>>::builder()
        .capacity(CACHE_SIZE)
        .eviction_listener(|context| {
            tracing::info!("evicted {} bytes: {}", context.cost, context.key)
        })
        .build();

    let loader = AssetLoader::new(fetcher, decoder_fn(decode), cache);

    let slots: Vec<_> = (0..SLOT_COUNT).map(|_| ConsumerId::next()).collect();
    let urls: Vec<_> = listing.into_iter().collect();

    // First page
    let handles = bind(&loader, &slots, &urls[..SLOT_COUNT]);
    show(handles).await;

    // Fling: each page is recycled after 30 ms, before its images arrive
    for page in urls[SLOT_COUNT..].chunks(SLOT_COUNT) {
        let mut handles = bind(&loader, &slots, page);
        sleep(Duration::from_millis(30)).await;
        for handle in &mut handles {
            handle.cancel();
        }
    }

    // Scroll back to the first page, which should still be cached
    let handles = bind(&loader, &slots, &urls[..SLOT_COUNT]);
    let resolved = handles.iter().filter(|handle| handle.is_resolved()).count();
    tracing::info!("{} of {} slots resolved without waiting", resolved, SLOT_COUNT);
    show(handles).await;

    // Let the orphaned fetches finish so they land in the cache
    while loader.in_flight_count() > 0 {
        sleep(Duration::from_millis(10)).await;
    }

    let stats = loader.stats();
    tracing::info!(
        "hits={} misses={} coalesced={} fetches={} failures={} cancellations={}",
        stats.hits(),
        stats.misses(),
        stats.coalesced(),
        stats.fetches(),
        stats.failures(),
        stats.cancellations(),
    );
    tracing::info!(
        "cache holds {} images, {} of {} bytes",
        loader.cache().len(),
        loader.cache().total_cost(),
        loader.cache().capacity(),
    );
}

//
// Image
//

#[derive(Debug)]
struct Image {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl CacheWeight for Image {
    fn cache_weight(&self) -> usize {
        self.pixels.cache_weight()
    }
}

fn decode(bytes: Bytes) -> Result<Arc<Image>, DecodeError> {
    // Our "format" is a single seed byte
    let seed = *bytes.first().ok_or_else(|| DecodeError::malformed("no seed"))?;
    Ok(Arc::new(Image {
        width: 64,
        height: 64,
        pixels: vec![seed; PIXEL_BYTES],
    }))
}

// Stands in for the network: a listing and one slow image per URL, with every seventh one failing
async fn fake_fetch(key: UrlKey) -> Result<Bytes, FetchError> {
    if key.as_str() == LISTING_URL {
        let urls: Vec<_> = (0..IMAGE_COUNT)
            .map(|index| format!("https://gallery.example/images/{}.png", index))
            .chain(["not a url".into()])
            .collect();
        let json = serde_json::to_vec(&urls).map_err(FetchError::transport)?;
        return Ok(json.into());
    }

    let index: usize = key
        .as_str()
        .rsplit('/')
        .next()
        .and_then(|name| name.strip_suffix(".png"))
        .and_then(|index| index.parse().ok())
        .ok_or_else(|| FetchError::InvalidUrl(key.to_string()))?;

    sleep(Duration::from_millis(50 + (index as u64 % 5) * 20)).await;

    if index % 7 == 6 {
        return Err(FetchError::Status(http::StatusCode::SERVICE_UNAVAILABLE));
    }

    Ok(Bytes::from(vec![index as u8]))
}

fn bind<FetcherT, DecoderT, CacheT>(
    loader: &AssetLoader<FetcherT, DecoderT, CacheT>,
    slots: &[ConsumerId],
    urls: &[UrlKey],
) -> Vec<AssetHandle<Arc<Image>>>
where
    FetcherT: Fetcher,
    DecoderT: Decoder<Asset = Arc<Image>>,
    CacheT: AssetCache<UrlKey, Arc<Image>>,
{
    slots
        .iter()
        .zip(urls)
        .map(|(slot, url)| loader.request(url.clone(), *slot))
        .collect()
}

async fn show(handles: Vec<AssetHandle<Arc<Image>>>) {
    for handle in handles {
        let consumer = handle.consumer();
        match handle.await {
            AssetOutcome::Asset(image) => {
                tracing::info!("{}: {}x{} image", consumer, image.width, image.height)
            }
            AssetOutcome::Error(error) => tracing::info!("{}: placeholder ({})", consumer, error),
            AssetOutcome::Cancelled => tracing::info!("{}: cancelled", consumer),
        }
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_timer(fmt::time::LocalTime::rfc_3339()))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();
}
