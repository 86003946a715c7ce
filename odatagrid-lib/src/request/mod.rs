//! Single-flight, cancelable page fetching.
//!
//! The [`RequestController`] owns at most one authoritative request. Starting
//! a new fetch cancels the previous one immediately; a superseded request
//! resolves to [`FetchError::Cancelled`] even if its response arrives later.

mod response;
mod transport;

pub use response::parse_page;
pub use transport::HttpResponse;
pub use transport::ReqwestTransport;
pub use transport::Transport;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::Mutex;
use std::task::Context;
use std::task::Poll;

use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use crate::error::FetchError;
use crate::model::PageResult;
use crate::query::QueryState;
use crate::query::odata::encode_filter;
use crate::query::odata::encode_sort;

/// Builds the request URL for a query state.
///
/// Parameters, in order: `$orderby` (if any), `$filter` (if any),
/// `$count=true`, `$top`, `$skip`. Values are percent-encoded.
pub fn build_request_url(base_url: &str, state: &QueryState) -> String {
    let mut params = Vec::new();

    let orderby = encode_sort(state.sort());
    if !orderby.is_empty() {
        params.push(format!("$orderby={}", urlencoding::encode(&orderby)));
    }

    let filter = encode_filter(state.filter());
    if !filter.is_empty() {
        params.push(format!("$filter={}", urlencoding::encode(&filter)));
    }

    params.push("$count=true".to_string());
    params.push(format!("$top={}", state.top()));
    params.push(format!("$skip={}", state.skip()));

    format!("{}?{}", base_url, params.join("&"))
}

#[derive(Default)]
struct InFlight {
    generation: u64,
    token: Option<CancellationToken>,
}

/// Issues page fetches, honouring only the most recent one.
///
/// # Example
///
/// ```ignore
/// let controller = RequestController::new(ReqwestTransport::new(), base_url);
/// let first = controller.fetch_page(&state);
/// let second = controller.fetch_page(&next_state); // cancels `first`
///
/// assert!(first.await.unwrap_err().is_cancelled());
/// let page = second.await?;
/// ```
#[derive(Clone)]
pub struct RequestController {
    transport: Arc<dyn Transport>,
    base_url: String,
    in_flight: Arc<Mutex<InFlight>>,
}

impl RequestController {
    /// Creates a controller for the given endpoint.
    pub fn new(transport: impl Transport + 'static, base_url: impl Into<String>) -> Self {
        Self::with_shared_transport(Arc::new(transport), base_url)
    }

    /// Creates a controller around an already shared transport.
    pub fn with_shared_transport(transport: Arc<dyn Transport>, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
            in_flight: Arc::new(Mutex::new(InFlight::default())),
        }
    }

    /// Returns the endpoint base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the generation of the most recently issued request.
    pub fn current_generation(&self) -> u64 {
        self.lock().generation
    }

    /// Starts fetching the page described by `state`.
    ///
    /// Any previous request is cancelled before this call returns.
    pub fn fetch_page(&self, state: &QueryState) -> PendingFetch {
        let url = build_request_url(&self.base_url, state);
        let token = CancellationToken::new();

        let generation = {
            let mut in_flight = self.lock();
            if let Some(previous) = in_flight.token.replace(token.clone()) {
                if !previous.is_cancelled() {
                    log::debug!("cancelling request {}", in_flight.generation);
                    previous.cancel();
                }
            }
            in_flight.generation += 1;
            in_flight.generation
        };

        log::debug!("request {} GET {}", generation, url);

        let transport = self.transport.clone();
        let in_flight = self.in_flight.clone();
        let future = async move {
            let result = tokio::select! {
                _ = token.cancelled() => Err(FetchError::Cancelled),
                result = transport.get(&url) => result,
            };
            let outcome = finish_request(result, &token);

            let mut in_flight = in_flight.lock().unwrap_or_else(|e| e.into_inner());
            if in_flight.generation == generation {
                in_flight.token = None;
            }
            outcome
        };

        PendingFetch {
            generation,
            future: Box::pin(future),
        }
    }

    /// Cancels the outstanding request, if any.
    pub fn cancel(&self) {
        if let Some(token) = self.lock().token.take() {
            token.cancel();
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, InFlight> {
        self.in_flight.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl std::fmt::Debug for RequestController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestController")
            .field("base_url", &self.base_url)
            .field("generation", &self.current_generation())
            .finish_non_exhaustive()
    }
}

fn finish_request(
    result: Result<HttpResponse, FetchError>,
    token: &CancellationToken,
) -> Result<PageResult, FetchError> {
    // A response that lands after cancellation is still stale.
    if token.is_cancelled() {
        return Err(FetchError::Cancelled);
    }
    let response = result?;
    if !response.is_success() {
        return Err(FetchError::http(response.status, response.status_text));
    }
    parse_page(&response.body)
}

/// A page fetch in progress.
///
/// Resolves to the page, or to [`FetchError::Cancelled`] if a newer fetch was
/// started before this one could be applied.
pub struct PendingFetch {
    generation: u64,
    future: BoxFuture<'static, Result<PageResult, FetchError>>,
}

impl PendingFetch {
    /// Returns the generation this fetch was issued with.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Future for PendingFetch {
    type Output = Result<PageResult, FetchError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.future.as_mut().poll(cx)
    }
}

impl std::fmt::Debug for PendingFetch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingFetch")
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}
