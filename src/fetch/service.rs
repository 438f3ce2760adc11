use super::{
    super::{cache::*, error::*},
    configuration::*,
    fetcher::*,
};

use {
    bytes::*,
    http::{header::*, *},
    http_body::*,
    std::{error::Error, future::*, marker::*, pin::*, result::Result},
    tower::*,
};

//
// HttpFetcher
//

/// [Fetcher] for [UrlKey] over any Tower HTTP [Service].
///
/// Issues a GET for the key's URL and reads the whole response body into [Bytes]. Fails with a
/// [FetchError] if:
///
/// * The key is not a valid URI
/// * The service is not ready or the call fails
/// * The response status is not "success" (200 to 299)
/// * The body is empty or larger than the configured maximum
///
/// No retry is performed. Wrap in [TimeoutFetcher](super::TimeoutFetcher) for a timeout.
///
/// The request body type is a type parameter because a service may accept requests with several
/// body types. A GET is sent with the body type's [Default] (empty) value.
pub struct HttpFetcher<ServiceT, RequestBodyT> {
    service: ServiceT,
    configuration: FetchConfiguration,
    request_body: PhantomData<fn() -> RequestBodyT>,
}

impl<ServiceT, RequestBodyT> HttpFetcher<ServiceT, RequestBodyT> {
    /// Constructor.
    pub fn new(service: ServiceT) -> Self {
        Self {
            service,
            configuration: Default::default(),
            request_body: PhantomData,
        }
    }

    /// Maximum size in bytes of response bodies.
    ///
    /// The default is 16 MiB.
    pub fn max_body_size(mut self, max_body_size: usize) -> Self {
        self.configuration.max_body_size = max_body_size;
        self
    }

    /// `User-Agent` header to send.
    ///
    /// [None] by default.
    pub fn user_agent(mut self, user_agent: HeaderValue) -> Self {
        self.configuration.user_agent = Some(user_agent);
        self
    }

    /// Configuration.
    pub fn configuration(&self) -> &FetchConfiguration {
        &self.configuration
    }
}

impl<ServiceT, RequestBodyT, ResponseBodyT> Fetcher<UrlKey> for HttpFetcher<ServiceT, RequestBodyT>
where
    ServiceT: 'static
        + Service<Request<RequestBodyT>, Response = Response<ResponseBodyT>>
        + Clone
        + Send
        + Sync,
    ServiceT::Future: Send,
    ServiceT::Error: Into<Box<dyn Error + Send + Sync>>,
    RequestBodyT: 'static + Default + Send,
    ResponseBodyT: Body + Send,
    ResponseBodyT::Data: Send,
    ResponseBodyT::Error: Into<Box<dyn Error + Send + Sync>>,
{
    async fn fetch(&self, key: &UrlKey) -> Result<Bytes, FetchError> {
        let uri = key
            .to_uri()
            .map_err(|error| FetchError::InvalidUrl(format!("{}: {}", key, error)))?;

        let mut request = Request::new(RequestBodyT::default());
        *request.uri_mut() = uri;
        if let Some(user_agent) = &self.configuration.user_agent {
            request.headers_mut().insert(USER_AGENT, user_agent.clone());
        }

        // Tower services take `&mut self`, so each fetch gets its own clone
        let mut service = self.service.clone();
        poll_fn(|context| service.poll_ready(context))
            .await
            .map_err(FetchError::transport)?;
        let response = service.call(request).await.map_err(FetchError::transport)?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("status {}: {}", status, key);
            return Err(FetchError::Status(status));
        }

        let bytes = read_body(response.into_body(), self.configuration.max_body_size).await?;
        tracing::debug!("fetched {} bytes: {}", bytes.len(), key);
        Ok(bytes)
    }
}

impl<ServiceT, RequestBodyT> Clone for HttpFetcher<ServiceT, RequestBodyT>
where
    ServiceT: Clone,
{
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            configuration: self.configuration.clone(),
            request_body: PhantomData,
        }
    }
}

// Read a whole body, failing as soon as it is known to exceed `max_body_size`.
async fn read_body<BodyT>(body: BodyT, max_body_size: usize) -> Result<Bytes, FetchError>
where
    BodyT: Body,
    BodyT::Error: Into<Box<dyn Error + Send + Sync>>,
{
    let size_hint = body.size_hint();
    if size_hint.lower() > max_body_size as u64 {
        return Err(FetchError::TooLarge(max_body_size));
    }

    let mut body = pin!(body);
    let mut buffer = BytesMut::new();

    while let Some(frame) = poll_fn(|context| body.as_mut().poll_frame(context)).await {
        // Trailers are ignored
        if let Ok(data) = frame.map_err(FetchError::transport)?.into_data() {
            if buffer.len() + data.remaining() > max_body_size {
                return Err(FetchError::TooLarge(max_body_size));
            }
            buffer.put(data);
        }
    }

    if buffer.is_empty() {
        return Err(FetchError::EmptyBody);
    }

    Ok(buffer.freeze())
}
