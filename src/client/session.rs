//! Session-scoped state of the request builder UI.
//!
//! Every user action is a method on `Session`; rendering reads the public
//! accessors. Two independent slices change asynchronously: `response`
//! (driven by submissions) and `parameters` (driven by the debounced
//! parameter fetch).

use super::autofetch::ParameterFetch;
use super::catalog::{self, Endpoint};
use super::compile::{normalize_compile_result, CompiledPrompt, CompiledViewMode};
use super::log::{ActivityLog, LogLine};
use super::parameters::{ParameterError, PromptParameter, VariableForm};
use super::redact::redact_key;
use super::url::build_target_url;
use crate::proxy::{ForwardRequest, ForwardResponse, ForwardService};
use thiserror::Error;

/// Pre-submit validation failures, in the order they are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Base URL and API key are required")]
    MissingCredentials,

    #[error("A prompt ID is required for this endpoint")]
    MissingResourceId,

    #[error("A request body is required for this endpoint")]
    MissingBody,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResponseView {
    Empty,
    /// Pretty-printed result.
    Raw(String),
    /// Structured rendering of a compile result.
    Compiled {
        prompt: CompiledPrompt,
        mode: CompiledViewMode,
        raw: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParameterState {
    Idle,
    Loading { resource_id: String },
    Loaded(VariableForm),
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct Session {
    base_url: String,
    api_key: String,
    endpoint: &'static Endpoint,
    resource_id: String,
    body: String,
    error: Option<String>,
    response: ResponseView,
    log: ActivityLog,
    in_flight: bool,
    parameters: ParameterState,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        let endpoint = catalog::default_endpoint();
        Self {
            base_url: String::new(),
            api_key: String::new(),
            endpoint,
            resource_id: String::new(),
            body: endpoint.default_body.unwrap_or_default().to_string(),
            error: None,
            response: ResponseView::Empty,
            log: ActivityLog::new(),
            in_flight: false,
            parameters: ParameterState::Idle,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn endpoint(&self) -> &'static Endpoint {
        self.endpoint
    }

    pub fn resource_id(&self) -> &str {
        &self.resource_id
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn response(&self) -> &ResponseView {
        &self.response
    }

    pub fn log(&self) -> &ActivityLog {
        &self.log
    }

    pub fn parameters(&self) -> &ParameterState {
        &self.parameters
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Log lines to display, including the waiting placeholder.
    pub fn log_lines(&self) -> impl Iterator<Item = LogLine<'_>> {
        self.log.render(self.in_flight)
    }

    pub fn set_base_url(&mut self, base_url: impl Into<String>) -> Option<ParameterFetch> {
        self.base_url = base_url.into();
        self.parameter_fetch()
    }

    pub fn set_api_key(&mut self, api_key: impl Into<String>) -> Option<ParameterFetch> {
        self.api_key = api_key.into();
        self.parameter_fetch()
    }

    /// Updates the resource id. The returned fetch, if any, should be
    /// handed to the debounced parameter loader.
    pub fn set_resource_id(&mut self, resource_id: impl Into<String>) -> Option<ParameterFetch> {
        self.resource_id = resource_id.into();
        self.parameters = ParameterState::Idle;
        self.parameter_fetch()
    }

    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = body.into();
    }

    /// Switches endpoint and loads its default body. Returns false for an
    /// unknown id, leaving the session untouched.
    pub fn select_endpoint(&mut self, id: &str) -> bool {
        let Some(endpoint) = catalog::find(id) else {
            return false;
        };
        self.endpoint = endpoint;
        self.body = endpoint.default_body.unwrap_or_default().to_string();
        self.parameters = ParameterState::Idle;
        self.error = None;
        true
    }

    /// Updates one variable field and recomputes the body from the form.
    pub fn set_variable(&mut self, name: &str, value: impl Into<String>) -> bool {
        let ParameterState::Loaded(form) = &mut self.parameters else {
            return false;
        };
        if !form.set(name, value) {
            return false;
        }
        self.body = form.body();
        true
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    pub fn toggle_compiled_view(&mut self) {
        if let ResponseView::Compiled { mode, .. } = &mut self.response {
            *mode = mode.toggled();
        }
    }

    /// The fetch to schedule when the compile endpoint has everything it
    /// needs to look up parameters.
    pub fn parameter_fetch(&self) -> Option<ParameterFetch> {
        if !self.endpoint.is_compile() {
            return None;
        }
        let resource_id = self.resource_id.trim();
        if resource_id.is_empty() || self.base_url.trim().is_empty() || self.api_key.trim().is_empty()
        {
            return None;
        }
        Some(ParameterFetch {
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            resource_id: resource_id.to_string(),
        })
    }

    pub fn mark_parameters_loading(&mut self, resource_id: &str) {
        self.parameters = ParameterState::Loading {
            resource_id: resource_id.to_string(),
        };
    }

    /// Applies a parameter lookup. Results for a resource id that is no
    /// longer current, or arriving after the endpoint changed, are dropped.
    pub fn apply_parameters(
        &mut self,
        resource_id: &str,
        outcome: Result<Vec<PromptParameter>, ParameterError>,
    ) -> bool {
        if !self.endpoint.is_compile() || self.resource_id.trim() != resource_id {
            return false;
        }
        self.parameters = match outcome {
            Ok(parameters) => {
                let form = VariableForm::from_parameters(parameters);
                self.body = form.body();
                ParameterState::Loaded(form)
            }
            Err(e) => ParameterState::Failed(e.to_string()),
        };
        true
    }

    pub fn target_url(&self) -> String {
        build_target_url(&self.base_url, self.endpoint, Some(&self.resource_id))
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.base_url.trim().is_empty() || self.api_key.trim().is_empty() {
            return Err(ValidationError::MissingCredentials);
        }
        if self.endpoint.requires_id && self.resource_id.trim().is_empty() {
            return Err(ValidationError::MissingResourceId);
        }
        if self.endpoint.requires_body && self.body.trim().is_empty() {
            return Err(ValidationError::MissingBody);
        }
        Ok(())
    }

    /// Builds the request the current form describes.
    pub fn build_request(&self) -> Result<ForwardRequest, ValidationError> {
        self.validate()?;
        let mut request = ForwardRequest::new(
            self.endpoint.method,
            self.target_url(),
            self.api_key.trim(),
        );
        if self.endpoint.method.carries_body() && !self.body.trim().is_empty() {
            request.body = Some(self.body.clone());
        }
        Ok(request)
    }

    /// Validates and starts a submission.
    ///
    /// On failure only the error field changes. On success the previous
    /// error, response and log are cleared and the request preamble is
    /// logged.
    pub fn begin_submission(&mut self) -> Result<ForwardRequest, ValidationError> {
        let request = match self.build_request() {
            Ok(request) => request,
            Err(e) => {
                self.error = Some(e.to_string());
                return Err(e);
            }
        };

        self.error = None;
        self.response = ResponseView::Empty;
        self.log.clear();

        self.log
            .info(format!("{} {}", request.method, request.target_url));
        self.log
            .info(format!("Authorization: Bearer {}", redact_key(&request.api_key)));
        if let Some(body) = &request.body {
            self.log.info(format!("Request body: {} bytes", body.len()));
        }
        self.log.info("Sending request...");

        self.in_flight = true;
        Ok(request)
    }

    /// Records the envelope returned for the in-flight submission.
    pub fn complete_submission(&mut self, response: ForwardResponse) {
        self.in_flight = false;

        let summary = format!(
            "Response: {} {} ({}ms)",
            response.meta.status, response.meta.status_text, response.meta.duration
        );
        if response.is_success_status() {
            self.log.success(summary);
        } else {
            self.log.error(summary);
        }

        if let Some(remaining) = response.header("x-ratelimit-remaining") {
            let limit = response.header("x-ratelimit-limit").unwrap_or("?");
            self.log
                .data(format!("Rate limit: {}/{} remaining", remaining, limit));
        }
        if let Some(request_id) = response.header("x-request-id") {
            self.log.data(format!("Request ID: {}", request_id));
        }

        match (&response.error, &response.result) {
            (Some(error), None) => {
                self.log.error(format!("Error: {}", error));
                self.error = Some(error.clone());
            }
            _ => self.log.success("Request completed"),
        }

        if let Some(result) = response.result {
            let raw = serde_json::to_string_pretty(&result).unwrap_or_else(|_| result.to_string());
            self.response = if self.endpoint.is_compile() {
                match normalize_compile_result(&result) {
                    Ok(extraction) => ResponseView::Compiled {
                        prompt: extraction.prompt,
                        mode: CompiledViewMode::default(),
                        raw,
                    },
                    Err(e) => {
                        self.log.data(format!("{}; showing raw response", e));
                        ResponseView::Raw(raw)
                    }
                }
            } else {
                ResponseView::Raw(raw)
            };
        }
    }

    /// Runs a full submission through `service`.
    pub async fn submit(&mut self, service: &dyn ForwardService) -> Result<(), ValidationError> {
        let request = self.begin_submission()?;
        let response = service.forward(request).await;
        self.complete_submission(response);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::catalog::COMPILE_ENDPOINT_ID;
    use crate::client::log::Severity;
    use crate::proxy::{ForwardFuture, ForwardMethod, ResponseMeta};
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct StubService {
        response: ForwardResponse,
        calls: Mutex<Vec<ForwardRequest>>,
    }

    impl StubService {
        fn new(response: ForwardResponse) -> Self {
            Self {
                response,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl ForwardService for StubService {
        fn forward(&self, request: ForwardRequest) -> ForwardFuture<'_> {
            self.calls.lock().unwrap().push(request);
            let response = self.response.clone();
            Box::pin(async move { response })
        }
    }

    fn reached(status: u16, result: Value, headers: &[(&str, &str)]) -> ForwardResponse {
        ForwardResponse::success(
            result,
            ResponseMeta {
                status,
                status_text: crate::shared::status_text(status),
                duration: 42,
                response_headers: headers
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect::<HashMap<_, _>>(),
            },
        )
    }

    fn ready_session() -> Session {
        let mut session = Session::new();
        session.set_base_url("https://forge.example.com/");
        session.set_api_key("sk-abcdefghij");
        session
    }

    fn messages(session: &Session) -> Vec<String> {
        session
            .log()
            .entries()
            .iter()
            .map(|e| e.message.clone())
            .collect()
    }

    #[test]
    fn test_validation_order() {
        let mut session = Session::new();
        assert!(session.select_endpoint(COMPILE_ENDPOINT_ID));
        session.set_body("");
        assert_eq!(session.validate(), Err(ValidationError::MissingCredentials));

        session.set_base_url("https://x.com");
        session.set_api_key("k");
        assert_eq!(session.validate(), Err(ValidationError::MissingResourceId));

        session.set_resource_id("p1");
        assert_eq!(session.validate(), Err(ValidationError::MissingBody));

        session.set_body("{}");
        assert_eq!(session.validate(), Ok(()));
    }

    #[test]
    fn test_failed_validation_only_sets_error() {
        let mut session = Session::new();
        session.log.info("previous");

        let err = session.begin_submission().unwrap_err();
        assert_eq!(err, ValidationError::MissingCredentials);
        assert_eq!(session.error(), Some("Base URL and API key are required"));
        assert_eq!(session.log().len(), 1);
        assert!(!session.is_in_flight());
    }

    #[tokio::test]
    async fn test_validation_failure_makes_no_call() {
        let service = StubService::new(reached(200, json!({}), &[]));
        let mut session = Session::new();
        assert!(session.submit(&service).await.is_err());
        assert!(service.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_submission_preamble() {
        let mut session = ready_session();
        session.select_endpoint("create-prompt");
        session.set_body(r#"{"name":"x"}"#);

        let request = session.begin_submission().unwrap();
        assert_eq!(request.method, ForwardMethod::Post);
        assert_eq!(request.target_url, "https://forge.example.com/api/v1/prompts");
        assert!(session.is_in_flight());

        let lines = messages(&session);
        assert_eq!(
            lines,
            [
                "POST https://forge.example.com/api/v1/prompts",
                "Authorization: Bearer sk-abc...ghij",
                "Request body: 12 bytes",
                "Sending request...",
            ]
        );
        assert!(lines.iter().all(|l| !l.contains("sk-abcdefghij")));
        assert_eq!(session.log_lines().last(), Some(LogLine::Waiting));
    }

    #[test]
    fn test_get_sends_no_body_line() {
        let mut session = ready_session();
        session.set_body("{\"ignored\":true}");
        let request = session.begin_submission().unwrap();
        assert!(request.body.is_none());
        assert!(!messages(&session).iter().any(|l| l.starts_with("Request body")));
    }

    #[tokio::test]
    async fn test_success_response_logged_and_stored() {
        let service = StubService::new(reached(
            200,
            json!({"prompts": []}),
            &[
                ("x-ratelimit-remaining", "99"),
                ("x-ratelimit-limit", "100"),
                ("x-request-id", "req_42"),
            ],
        ));
        let mut session = ready_session();
        session.submit(&service).await.unwrap();

        let entries = session.log().entries();
        let summary = &entries[3];
        assert_eq!(summary.message, "Response: 200 OK (42ms)");
        assert_eq!(summary.severity, Severity::Success);

        let lines = messages(&session);
        assert!(lines.contains(&"Rate limit: 99/100 remaining".to_string()));
        assert!(lines.contains(&"Request ID: req_42".to_string()));
        assert_eq!(lines.last().unwrap(), "Request completed");
        assert_eq!(
            session.response(),
            &ResponseView::Raw("{\n  \"prompts\": []\n}".to_string())
        );
        assert!(session.error().is_none());
        assert!(!session.is_in_flight());
    }

    #[test]
    fn test_application_error_is_error_severity() {
        let mut session = ready_session();
        session.begin_submission().unwrap();
        session.complete_submission(reached(404, json!({"error": "nope"}), &[]));

        let summary = session
            .log()
            .entries()
            .iter()
            .find(|e| e.message.starts_with("Response:"))
            .unwrap();
        assert_eq!(summary.severity, Severity::Error);
        assert_eq!(summary.message, "Response: 404 Not Found (42ms)");
        // Reached but failed upstream is not a session error.
        assert!(session.error().is_none());
        assert!(matches!(session.response(), ResponseView::Raw(_)));
    }

    #[test]
    fn test_network_error_surfaces_everywhere() {
        let mut session = ready_session();
        session.begin_submission().unwrap();
        session.complete_submission(ForwardResponse::network_error("connection refused", 3));

        assert_eq!(session.error(), Some("connection refused"));
        let lines = messages(&session);
        assert!(lines.contains(&"Response: 0 Network Error (3ms)".to_string()));
        assert_eq!(lines.last().unwrap(), "Error: connection refused");
        assert_eq!(session.response(), &ResponseView::Empty);
    }

    #[test]
    fn test_new_submission_resets_state() {
        let mut session = ready_session();
        session.begin_submission().unwrap();
        session.complete_submission(ForwardResponse::network_error("boom", 1));
        assert!(session.error().is_some());

        session.begin_submission().unwrap();
        assert!(session.error().is_none());
        assert_eq!(session.response(), &ResponseView::Empty);
        assert_eq!(session.log().len(), 3);
    }

    #[test]
    fn test_compile_result_rendered_structurally() {
        let mut session = ready_session();
        session.select_endpoint(COMPILE_ENDPOINT_ID);
        session.set_resource_id("p1");
        session.begin_submission().unwrap();
        session.complete_submission(reached(
            200,
            json!({"data": {"compiled": "# Hi", "promptId": "p1", "version": 2, "variables": {}}}),
            &[],
        ));

        match session.response() {
            ResponseView::Compiled { prompt, mode, .. } => {
                assert_eq!(prompt.compiled, "# Hi");
                assert_eq!(*mode, CompiledViewMode::Rendered);
            }
            other => panic!("expected compiled view, got {:?}", other),
        }

        session.toggle_compiled_view();
        assert!(matches!(
            session.response(),
            ResponseView::Compiled { mode: CompiledViewMode::Raw, .. }
        ));
    }

    #[test]
    fn test_compile_unrecognized_falls_back_to_raw() {
        let mut session = ready_session();
        session.select_endpoint(COMPILE_ENDPOINT_ID);
        session.set_resource_id("p1");
        session.begin_submission().unwrap();
        session.complete_submission(reached(200, json!({"text": "hello"}), &[]));

        assert!(matches!(session.response(), ResponseView::Raw(_)));
        assert!(messages(&session)
            .iter()
            .any(|l| l.starts_with("unrecognized compile result shape")));
    }

    #[test]
    fn test_parameter_fetch_only_for_compile() {
        let mut session = ready_session();
        assert!(session.set_resource_id("p1").is_none());

        session.select_endpoint(COMPILE_ENDPOINT_ID);
        let fetch = session.set_resource_id(" p1 ").unwrap();
        assert_eq!(fetch.resource_id, "p1");
        assert_eq!(fetch.base_url, "https://forge.example.com/");

        let mut session = Session::new();
        session.select_endpoint(COMPILE_ENDPOINT_ID);
        assert!(session.set_resource_id("p1").is_none());
    }

    #[test]
    fn test_parameters_drive_body() {
        let mut session = ready_session();
        session.select_endpoint(COMPILE_ENDPOINT_ID);
        session.set_resource_id("p1");
        session.mark_parameters_loading("p1");

        let applied = session.apply_parameters(
            "p1",
            Ok(vec![
                PromptParameter {
                    name: "topic".into(),
                    required: true,
                    description: None,
                },
                PromptParameter {
                    name: "tone".into(),
                    required: false,
                    description: None,
                },
            ]),
        );
        assert!(applied);
        assert_eq!(
            serde_json::from_str::<Value>(session.body()).unwrap(),
            json!({"variables": {}})
        );

        assert!(session.set_variable("tone", "playful"));
        assert_eq!(
            serde_json::from_str::<Value>(session.body()).unwrap(),
            json!({"variables": {"tone": "playful"}})
        );

        assert!(session.set_variable("tone", ""));
        assert_eq!(
            serde_json::from_str::<Value>(session.body()).unwrap(),
            json!({"variables": {}})
        );
    }

    #[test]
    fn test_stale_parameters_dropped() {
        let mut session = ready_session();
        session.select_endpoint(COMPILE_ENDPOINT_ID);
        session.set_resource_id("p2");

        assert!(!session.apply_parameters("p1", Ok(vec![])));
        assert_eq!(session.parameters(), &ParameterState::Idle);
    }

    #[test]
    fn test_parameter_error_is_scoped() {
        let mut session = ready_session();
        session.select_endpoint(COMPILE_ENDPOINT_ID);
        session.set_resource_id("p1");
        session.apply_parameters("p1", Err(ParameterError::UnrecognizedShape));

        assert_eq!(
            session.parameters(),
            &ParameterState::Failed("Unexpected parameters response".into())
        );
        assert!(session.error().is_none());
        assert!(session.validate().is_ok());
    }

    #[test]
    fn test_clear_log() {
        let mut session = ready_session();
        session.begin_submission().unwrap();
        session.clear_log();
        assert!(session.log().is_empty());
    }

    #[test]
    fn test_unknown_endpoint_ignored() {
        let mut session = Session::new();
        let before = session.endpoint().id;
        assert!(!session.select_endpoint("nope"));
        assert_eq!(session.endpoint().id, before);
    }
}
