//! Forward service abstraction layer.
//!
//! Both the HTTP routes and the client controller reach upstreams through
//! this trait, so tests can substitute mock implementations.

use super::executor::{build_client, execute_forward};
use super::types::{ForwardMethod, ForwardRequest, ForwardResponse};
use crate::config::DEFAULT_UPSTREAM_TIMEOUT_MS;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

/// Boxed future returned by `ForwardService` methods.
pub type ForwardFuture<'a> = Pin<Box<dyn Future<Output = ForwardResponse> + Send + 'a>>;

/// Trait for services that execute forward requests.
pub trait ForwardService: Send + Sync {
    /// Executes a forward request and returns the normalized envelope.
    ///
    /// # Arguments
    ///
    /// * `request` - The validated request to execute
    fn forward(&self, request: ForwardRequest) -> ForwardFuture<'_>;
}

/// In-process forward service backed by a shared `reqwest::Client`.
#[derive(Clone)]
pub struct HttpForwardService {
    client: reqwest::Client,
    default_timeout: Duration,
}

impl HttpForwardService {
    pub fn new(client: reqwest::Client, default_timeout: Duration) -> Self {
        Self {
            client,
            default_timeout,
        }
    }

    /// Creates a service with its own client and the given default timeout.
    pub fn with_timeout(default_timeout: Duration) -> reqwest::Result<Self> {
        Ok(Self::new(build_client()?, default_timeout))
    }

    /// Creates a new `HttpForwardService` wrapped in an `Arc`.
    pub fn arc(default_timeout: Duration) -> reqwest::Result<Arc<Self>> {
        Ok(Arc::new(Self::with_timeout(default_timeout)?))
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }
}

impl Default for HttpForwardService {
    fn default() -> Self {
        Self::new(
            reqwest::Client::new(),
            Duration::from_millis(DEFAULT_UPSTREAM_TIMEOUT_MS),
        )
    }
}

impl ForwardService for HttpForwardService {
    fn forward(&self, request: ForwardRequest) -> ForwardFuture<'_> {
        Box::pin(async move {
            execute_forward(&self.client, &request, self.default_timeout).await
        })
    }
}

impl<T: ForwardService + ?Sized> ForwardService for Arc<T> {
    fn forward(&self, request: ForwardRequest) -> ForwardFuture<'_> {
        (**self).forward(request)
    }
}

/// Extension trait for `ForwardService` that provides convenience methods.
pub trait ForwardServiceExt: ForwardService {
    /// Executes a GET request against `url` with the given key.
    fn get(&self, url: &str, api_key: &str) -> ForwardFuture<'_> {
        self.forward(ForwardRequest::new(ForwardMethod::Get, url, api_key))
    }

    /// Executes a POST request against `url` with an optional JSON body.
    fn post(&self, url: &str, api_key: &str, body: Option<String>) -> ForwardFuture<'_> {
        let mut request = ForwardRequest::new(ForwardMethod::Post, url, api_key);
        request.body = body;
        self.forward(request)
    }
}

impl<T: ForwardService + ?Sized> ForwardServiceExt for T {}
