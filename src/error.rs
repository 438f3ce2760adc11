use {
    http::StatusCode,
    std::{error::Error, sync::*, time::*},
};

/// Shared, cloneable error source.
pub type SharedError = Arc<dyn Error + Send + Sync>;

//
// FetchError
//

/// Failure to produce raw bytes for a key.
///
/// Surfaced by a [Fetcher](crate::Fetcher) and passed through to every waiter unchanged.
#[derive(Clone, Debug, thiserror::Error)]
pub enum FetchError {
    /// The key could not be turned into a request.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The server answered with a non-success status.
    #[error("unexpected status: {0}")]
    Status(StatusCode),

    /// The response had no body.
    #[error("empty body")]
    EmptyBody,

    /// The body was larger than the configured limit.
    #[error("body larger than {0} bytes")]
    TooLarge(usize),

    /// The fetch took longer than the configured timeout.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// Network or transport failure.
    #[error("transport: {0}")]
    Transport(#[source] SharedError),
}

impl FetchError {
    /// Transport error.
    pub fn transport<ErrorT>(error: ErrorT) -> Self
    where
        ErrorT: Into<Box<dyn Error + Send + Sync>>,
    {
        let error: Box<dyn Error + Send + Sync> = error.into();
        Self::Transport(error.into())
    }
}

//
// DecodeError
//

/// Failure to turn raw bytes into an asset.
///
/// Surfaced by a [Decoder](crate::Decoder) and passed through to every waiter unchanged.
#[derive(Clone, Debug, thiserror::Error)]
pub enum DecodeError {
    /// The bytes are not a valid instance of the expected format.
    #[error("malformed: {0}")]
    Malformed(String),

    /// The format is not supported.
    #[error("unsupported: {0}")]
    Unsupported(String),
}

impl DecodeError {
    /// Malformed.
    pub fn malformed(message: impl ToString) -> Self {
        Self::Malformed(message.to_string())
    }

    /// Unsupported.
    pub fn unsupported(message: impl ToString) -> Self {
        Self::Unsupported(message.to_string())
    }
}

//
// LoadError
//

/// Terminal failure of a load, delivered to every waiter.
///
/// Cancellation is not an error. See [AssetOutcome](crate::AssetOutcome).
#[derive(Clone, Debug, thiserror::Error)]
pub enum LoadError {
    /// Fetch.
    #[error("fetch: {0}")]
    Fetch(#[from] FetchError),

    /// Decode.
    #[error("decode: {0}")]
    Decode(#[from] DecodeError),

    /// The fetch was dropped before it could resolve, e.g. because its runtime shut down or the
    /// fetcher panicked.
    #[error("abandoned")]
    Abandoned,
}

//
// ListingError
//

/// Failure to read a URL listing.
#[derive(Clone, Debug, thiserror::Error)]
pub enum ListingError {
    /// Fetch.
    #[error("fetch: {0}")]
    Fetch(#[from] FetchError),

    /// The listing is not a JSON array of strings.
    #[error("malformed listing: {0}")]
    Malformed(String),
}

//
// ConfigurationError
//

/// Invalid configuration value.
#[derive(Clone, Debug, thiserror::Error)]
pub enum ConfigurationError {
    /// The string is not a duration.
    #[error("invalid duration {input:?}: {reason}")]
    InvalidDuration {
        /// The string as given.
        input: String,

        /// Why it could not be parsed.
        reason: String,
    },
}
