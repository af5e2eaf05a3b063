//! Client controller: the request builder behind the Prompt Forge UI.
//!
//! A `Session` turns form input into a `ForwardRequest`, submits it through
//! any `ForwardService`, and records the outcome in a response view and an
//! activity log.

pub mod autofetch;
pub mod catalog;
pub mod compile;
pub mod log;
pub mod parameters;
pub mod redact;
pub mod remote;
pub mod session;
pub mod url;

pub use autofetch::{ParameterAutoFetch, ParameterFetch, ParametersLoaded, PARAMETER_FETCH_DEBOUNCE};
pub use catalog::{Endpoint, ENDPOINTS};
pub use compile::{normalize_compile_result, CompiledPrompt, CompiledViewMode};
pub use log::{ActivityLog, LogEntry, LogLine, Severity};
pub use parameters::{ParameterError, PromptParameter, VariableForm};
pub use redact::redact_key;
pub use remote::RemoteForwardService;
pub use session::{ParameterState, ResponseView, Session, ValidationError};
pub use url::build_target_url;
