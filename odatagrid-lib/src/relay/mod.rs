//! Cross-origin relay.
//!
//! A small HTTP/1 passthrough that forwards `GET {prefix}/*` to an upstream
//! OData service so the grid can be served from another origin. It carries
//! no query logic.

mod forward;

pub use forward::OriginCheck;
pub use forward::check_origin;
pub use forward::is_hop_by_hop;
pub use forward::target_url;

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use http_body_util::Full;
use hyper::Method;
use hyper::Request;
use hyper::Response;
use hyper::StatusCode;
use hyper::Uri;
use hyper::body::Bytes;
use hyper::body::Incoming;
use hyper::header;
use hyper::header::HeaderMap;
use hyper::header::HeaderName;
use hyper::header::HeaderValue;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use serde_json::json;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::error::RelayError;

/// Relay configuration.
///
/// # Example
///
/// ```
/// use odatagrid_lib::relay::RelayConfig;
///
/// let config = RelayConfig::default()
///     .with_prefix("/api")
///     .allow_origin("https://example.github.io");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// Listening address.
    ///
    /// Default: `127.0.0.1:3000`
    pub bind: SocketAddr,

    /// Path prefix stripped before forwarding.
    ///
    /// Default: `/odata`
    pub prefix: String,

    /// Upstream service root.
    ///
    /// Default: `https://services.odata.org`
    pub upstream: String,

    /// Origins that receive `Access-Control-Allow-Origin`. Requests from
    /// other origins are rejected; requests without `Origin` pass.
    pub allowed_origins: Vec<String>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
            prefix: "/odata".to_string(),
            upstream: "https://services.odata.org".to_string(),
            allowed_origins: vec![
                "http://localhost:55310".to_string(),
                "http://localhost:3000".to_string(),
            ],
        }
    }
}

impl RelayConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bind(mut self, bind: SocketAddr) -> Self {
        self.bind = bind;
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_upstream(mut self, upstream: impl Into<String>) -> Self {
        self.upstream = upstream.into();
        self
    }

    /// Replaces the allow-list.
    pub fn with_allowed_origins<I, S>(mut self, origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_origins = origins.into_iter().map(Into::into).collect();
        self
    }

    /// Adds one origin to the allow-list.
    pub fn allow_origin(mut self, origin: impl Into<String>) -> Self {
        self.allowed_origins.push(origin.into());
        self
    }

    /// Checks that the prefix is a path and the upstream an http(s) URL.
    pub fn validate(&self) -> Result<(), RelayError> {
        if !self.prefix.starts_with('/') {
            return Err(RelayError::config(format!(
                "prefix must start with '/': {}",
                self.prefix
            )));
        }
        let upstream = url::Url::parse(&self.upstream)
            .map_err(|e| RelayError::config(format!("upstream '{}': {}", self.upstream, e)))?;
        if !matches!(upstream.scheme(), "http" | "https") {
            return Err(RelayError::config(format!(
                "upstream must be http or https: {}",
                self.upstream
            )));
        }
        Ok(())
    }
}

struct RelayInner {
    config: RelayConfig,
    http_client: reqwest::Client,
}

/// A bound relay, ready to serve.
pub struct Relay {
    listener: TcpListener,
    local_addr: SocketAddr,
    inner: Arc<RelayInner>,
}

impl Relay {
    /// Validates the config and binds the listening socket.
    pub async fn bind(config: RelayConfig) -> Result<Self, RelayError> {
        config.validate()?;

        let listener = TcpListener::bind(config.bind)
            .await
            .map_err(|e| RelayError::bind(config.bind, e.to_string()))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| RelayError::bind(config.bind, e.to_string()))?;

        Ok(Self {
            listener,
            local_addr,
            inner: Arc::new(RelayInner {
                config,
                http_client: reqwest::Client::new(),
            }),
        })
    }

    /// Address actually bound (useful with port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serves connections until `shutdown` is cancelled.
    pub async fn serve(self, shutdown: CancellationToken) -> Result<(), RelayError> {
        log::info!(
            "Relay listening on {} ({}/* -> {})",
            self.local_addr,
            self.inner.config.prefix,
            self.inner.config.upstream
        );

        loop {
            let (stream, peer) = tokio::select! {
                _ = shutdown.cancelled() => {
                    log::info!("Relay shutting down");
                    return Ok(());
                }
                accepted = self.listener.accept() => match accepted {
                    Ok(conn) => conn,
                    Err(e) => {
                        log::warn!("Accept failed: {}", e);
                        continue;
                    }
                },
            };

            let inner = self.inner.clone();
            let shutdown = shutdown.clone();
            tokio::spawn(async move {
                let io = TokioIo::new(stream);
                let service = service_fn(move |req: Request<Incoming>| {
                    let inner = inner.clone();
                    async move { Ok::<_, Infallible>(inner.handle(req).await) }
                });
                let conn = http1::Builder::new().serve_connection(io, service);

                tokio::select! {
                    result = conn => {
                        if let Err(e) = result {
                            log::debug!("Connection from {} ended: {}", peer, e);
                        }
                    }
                    _ = shutdown.cancelled() => {}
                }
            });
        }
    }
}

impl std::fmt::Debug for Relay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Relay")
            .field("local_addr", &self.local_addr)
            .field("config", &self.inner.config)
            .finish()
    }
}

impl RelayInner {
    async fn handle(&self, req: Request<Incoming>) -> Response<Full<Bytes>> {
        let (parts, _) = req.into_parts();
        let origin = parts
            .headers
            .get(header::ORIGIN)
            .and_then(|v| v.to_str().ok());
        let check = check_origin(origin, &self.config.allowed_origins);
        if check == OriginCheck::Rejected {
            log::warn!("Rejected origin {:?}", origin);
            return json_response(
                StatusCode::FORBIDDEN,
                json!({ "error": "CORS not allowed by proxy" }),
            );
        }

        let mut response = match parts.method {
            Method::GET => self.forward(&parts.uri, &parts.headers).await,
            Method::OPTIONS => {
                let mut response = Response::new(Full::new(Bytes::new()));
                *response.status_mut() = StatusCode::NO_CONTENT;
                response.headers_mut().insert(
                    header::ACCESS_CONTROL_ALLOW_METHODS,
                    HeaderValue::from_static("GET"),
                );
                response.headers_mut().insert(
                    header::ACCESS_CONTROL_ALLOW_HEADERS,
                    HeaderValue::from_static("Accept"),
                );
                response
            }
            _ => {
                let mut response = json_response(
                    StatusCode::METHOD_NOT_ALLOWED,
                    json!({ "error": "Method not allowed" }),
                );
                response
                    .headers_mut()
                    .insert(header::ALLOW, HeaderValue::from_static("GET"));
                response
            }
        };

        if let OriginCheck::Allowed(origin) = check {
            if let Ok(value) = HeaderValue::from_str(&origin) {
                let headers = response.headers_mut();
                headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
                headers.insert(header::VARY, HeaderValue::from_static("Origin"));
            }
        }
        response
    }

    async fn forward(&self, uri: &Uri, headers: &HeaderMap) -> Response<Full<Bytes>> {
        let path_and_query = uri
            .path_and_query()
            .map(|p| p.as_str())
            .unwrap_or("/");
        let Some(target) = target_url(&self.config.upstream, &self.config.prefix, path_and_query)
        else {
            return json_response(StatusCode::NOT_FOUND, json!({ "error": "Not found" }));
        };

        let accept = headers
            .get(header::ACCEPT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/json");

        log::debug!("Relay GET {}", target);
        match self.fetch_upstream(&target, accept).await {
            Ok(response) => response,
            Err(e) => {
                log::error!("Proxy error for {}: {}", target, e);
                json_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Proxy error", "detail": e.to_string() }),
                )
            }
        }
    }

    async fn fetch_upstream(&self, target: &str, accept: &str) -> Result<Response<Full<Bytes>>, RelayError> {
        let upstream = self
            .http_client
            .get(target)
            .header(reqwest::header::ACCEPT, accept)
            .send()
            .await?;

        let status = StatusCode::from_u16(upstream.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
        let headers = upstream.headers().clone();
        let body = upstream.bytes().await?;

        let mut response = Response::new(Full::new(body));
        *response.status_mut() = status;
        for (name, value) in headers.iter() {
            // Content-Length is recomputed from the buffered body.
            if is_hop_by_hop(name.as_str()) || name.as_str().eq_ignore_ascii_case("content-length") {
                continue;
            }
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_str().as_bytes()),
                HeaderValue::from_bytes(value.as_bytes()),
            ) {
                response.headers_mut().append(name, value);
            }
        }
        Ok(response)
    }
}

fn json_response(status: StatusCode, body: serde_json::Value) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(body.to_string())));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
}
