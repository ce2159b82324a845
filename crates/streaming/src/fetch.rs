use std::future::Future;

use foundation::Dimensions;

use crate::protocol::{MalformedResponseError, parse_pixel_payload};
use crate::request::RequestDescriptor;

/// Status and text body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A platform HTTP client able to issue a GET.
///
/// Futures need not be `Send`; the browser implementation runs on the single
/// JS thread. Errors are the transport's description of what went wrong.
pub trait HttpTransport {
    fn get(&self, url: &str) -> impl Future<Output = Result<HttpResponse, String>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The exchange itself failed (DNS, connection, CORS, body read).
    Transport { url: String, cause: String },
    /// The service answered with a non-2xx status.
    Status { url: String, status: u16 },
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Transport { url, cause } => write!(f, "request to {url} failed: {cause}"),
            FetchError::Status { url, status } => {
                write!(f, "request to {url} returned HTTP {status}")
            }
        }
    }
}

impl std::error::Error for FetchError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    Fetch(FetchError),
    Malformed(MalformedResponseError),
}

impl std::fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchFailure::Fetch(e) => write!(f, "{e}"),
            FetchFailure::Malformed(e) => write!(f, "malformed response: {e}"),
        }
    }
}

impl std::error::Error for FetchFailure {}

impl From<FetchError> for FetchFailure {
    fn from(e: FetchError) -> Self {
        FetchFailure::Fetch(e)
    }
}

impl From<MalformedResponseError> for FetchFailure {
    fn from(e: MalformedResponseError) -> Self {
        FetchFailure::Malformed(e)
    }
}

/// Resolves request descriptors against a service base URL.
///
/// Each call is one independent exchange; overlapping calls are neither
/// merged nor cancelled.
#[derive(Debug, Clone)]
pub struct PanoramaFetcher<T> {
    base_url: String,
    transport: T,
}

impl<T: HttpTransport> PanoramaFetcher<T> {
    pub fn new(base_url: impl Into<String>, transport: T) -> Self {
        Self {
            base_url: base_url.into(),
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetch the pixel bytes for `descriptor`, validated against `dims`.
    pub async fn fetch(
        &self,
        descriptor: &RequestDescriptor,
        dims: Dimensions,
    ) -> Result<Vec<u8>, FetchFailure> {
        let url = descriptor.url(&self.base_url);
        let resp = self
            .transport
            .get(&url)
            .await
            .map_err(|cause| FetchError::Transport {
                url: url.clone(),
                cause,
            })?;
        if !resp.is_success() {
            return Err(FetchError::Status {
                url,
                status: resp.status,
            }
            .into());
        }
        Ok(parse_pixel_payload(&resp.body, dims)?)
    }
}
