pub mod client;
pub mod config;
pub mod error;
pub mod proxy;
pub mod routes;
pub mod shared;
pub mod vision;

pub use config::Config;
pub use error::AppError;
pub use proxy::{execute_forward, ForwardRequest, ForwardResponse, ForwardService};
pub use routes::{router, AppState};
