use super::{cache::*, error::*, fetch::*};

use std::{slice, vec};

//
// UrlListing
//

/// List of asset URLs, e.g. the contents of a gallery.
///
/// Read from a JSON array of URL strings. Entries that are not absolute URLs are skipped.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct UrlListing {
    /// URLs in listing order.
    pub urls: Vec<UrlKey>,
}

impl UrlListing {
    /// Parse from JSON.
    pub fn from_json(json: &[u8]) -> Result<Self, ListingError> {
        let entries: Vec<String> =
            serde_json::from_slice(json).map_err(|error| ListingError::Malformed(error.to_string()))?;

        let urls = entries
            .into_iter()
            .filter_map(|entry| {
                let key = UrlKey::from(entry);
                match key.to_uri() {
                    Ok(uri) if uri.scheme().is_some() && uri.host().is_some() => Some(key),

                    _ => {
                        tracing::warn!("skipping invalid URL: {:?}", key.as_str());
                        None
                    }
                }
            })
            .collect();

        Ok(Self { urls })
    }

    /// Fetch and parse.
    pub async fn fetch<FetcherT>(fetcher: &FetcherT, key: &UrlKey) -> Result<Self, ListingError>
    where
        FetcherT: Fetcher<UrlKey>,
    {
        let bytes = fetcher.fetch(key).await?;
        let listing = Self::from_json(&bytes)?;
        tracing::debug!("{} URLs: {}", listing.len(), key);
        Ok(listing)
    }

    /// Number of URLs.
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    /// Whether there are no URLs.
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// Iterate.
    pub fn iter(&self) -> slice::Iter<'_, UrlKey> {
        self.urls.iter()
    }
}

impl IntoIterator for UrlListing {
    type Item = UrlKey;
    type IntoIter = vec::IntoIter<UrlKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.urls.into_iter()
    }
}

impl<'this> IntoIterator for &'this UrlListing {
    type Item = &'this UrlKey;
    type IntoIter = slice::Iter<'this, UrlKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.urls.iter()
    }
}
