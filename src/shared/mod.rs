//! Shared utilities used across the forwarding service.

pub mod status_text;
pub mod timing;

pub use status_text::status_text;
pub use timing::RequestTimer;
