use http::*;

//
// FetchConfiguration
//

/// HTTP fetch configuration.
#[derive(Clone, Debug)]
pub struct FetchConfiguration {
    /// Maximum body size.
    pub max_body_size: usize,

    /// Optional `User-Agent` header.
    pub user_agent: Option<HeaderValue>,
}

impl Default for FetchConfiguration {
    fn default() -> Self {
        Self {
            max_body_size: 16 * 1024 * 1024, // 16 MiB
            user_agent: None,
        }
    }
}
