//! Debounced parameter lookup for the compile endpoint.

use super::catalog::parameters_endpoint;
use super::parameters::{parameters_from_response, ParameterError, PromptParameter};
use super::url::build_target_url;
use crate::proxy::{ForwardMethod, ForwardRequest, ForwardService};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Quiet period after the last resource-id change before fetching.
pub const PARAMETER_FETCH_DEBOUNCE: Duration = Duration::from_millis(500);

/// Everything needed to look up one prompt's parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterFetch {
    pub base_url: String,
    pub api_key: String,
    pub resource_id: String,
}

impl ParameterFetch {
    pub fn request(&self) -> ForwardRequest {
        let url = build_target_url(&self.base_url, parameters_endpoint(), Some(&self.resource_id));
        ForwardRequest::new(ForwardMethod::Get, url, self.api_key.trim())
    }
}

/// Outcome delivered to the session once a fetch completes.
#[derive(Debug, Clone, PartialEq)]
pub struct ParametersLoaded {
    pub resource_id: String,
    pub outcome: Result<Vec<PromptParameter>, ParameterError>,
}

/// Issues the parameters request through `service` and interprets it.
pub async fn fetch_parameters(
    service: &dyn ForwardService,
    fetch: &ParameterFetch,
) -> Result<Vec<PromptParameter>, ParameterError> {
    let response = service.forward(fetch.request()).await;
    parameters_from_response(&response)
}

/// Keeps at most one pending lookup: scheduling a new one aborts the
/// previous timer or request.
pub struct ParameterAutoFetch {
    service: Arc<dyn ForwardService>,
    debounce: Duration,
    pending: Option<JoinHandle<()>>,
    tx: mpsc::UnboundedSender<ParametersLoaded>,
}

impl ParameterAutoFetch {
    pub fn new(
        service: Arc<dyn ForwardService>,
        debounce: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<ParametersLoaded>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                service,
                debounce,
                pending: None,
                tx,
            },
            rx,
        )
    }

    pub fn schedule(&mut self, fetch: ParameterFetch) {
        self.cancel();

        let service = Arc::clone(&self.service);
        let debounce = self.debounce;
        let tx = self.tx.clone();

        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            tracing::debug!(resource_id = %fetch.resource_id, "Fetching prompt parameters");
            let outcome = fetch_parameters(service.as_ref(), &fetch).await;
            // The receiver may be gone if the session was dropped.
            let _ = tx.send(ParametersLoaded {
                resource_id: fetch.resource_id,
                outcome,
            });
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl Drop for ParameterAutoFetch {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::{ForwardFuture, ForwardResponse, ResponseMeta};
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingService {
        urls: Mutex<Vec<String>>,
    }

    impl ForwardService for RecordingService {
        fn forward(&self, request: ForwardRequest) -> ForwardFuture<'_> {
            self.urls.lock().unwrap().push(request.target_url);
            Box::pin(async {
                ForwardResponse::success(
                    json!({"parameters": [{"name": "topic", "required": true}]}),
                    ResponseMeta {
                        status: 200,
                        status_text: "OK".into(),
                        duration: 1,
                        response_headers: HashMap::new(),
                    },
                )
            })
        }
    }

    fn fetch(id: &str) -> ParameterFetch {
        ParameterFetch {
            base_url: "https://forge.example.com/".into(),
            api_key: "sk-test".into(),
            resource_id: id.into(),
        }
    }

    #[test]
    fn test_request_targets_parameters_path() {
        let request = fetch("p1").request();
        assert_eq!(request.method, ForwardMethod::Get);
        assert_eq!(
            request.target_url,
            "https://forge.example.com/api/v1/prompts/p1/parameters"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_changes_fetch_once() {
        let service = Arc::new(RecordingService::default());
        let (mut auto, mut rx) =
            ParameterAutoFetch::new(service.clone(), PARAMETER_FETCH_DEBOUNCE);

        auto.schedule(fetch("p"));
        tokio::time::sleep(Duration::from_millis(100)).await;
        auto.schedule(fetch("p1"));
        tokio::time::sleep(Duration::from_millis(100)).await;
        auto.schedule(fetch("p12"));

        let loaded = rx.recv().await.unwrap();
        assert_eq!(loaded.resource_id, "p12");
        assert_eq!(loaded.outcome.unwrap()[0].name, "topic");

        let urls = service.urls.lock().unwrap();
        assert_eq!(urls.len(), 1);
        assert!(urls[0].ends_with("/prompts/p12/parameters"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending() {
        let service = Arc::new(RecordingService::default());
        let (mut auto, mut rx) =
            ParameterAutoFetch::new(service.clone(), PARAMETER_FETCH_DEBOUNCE);

        auto.schedule(fetch("p1"));
        auto.cancel();
        tokio::time::sleep(PARAMETER_FETCH_DEBOUNCE * 2).await;

        assert!(rx.try_recv().is_err());
        assert!(service.urls.lock().unwrap().is_empty());
    }
}
