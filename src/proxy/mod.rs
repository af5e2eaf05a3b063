pub mod executor;
pub mod response_builder;
pub mod service;
pub mod types;

pub use executor::{build_client, execute_forward};
pub use response_builder::{build_network_error, build_success, collect_headers, parse_result, ResponseBuildParams};
pub use service::{ForwardFuture, ForwardService, ForwardServiceExt, HttpForwardService};
pub use types::*;
