//! Timing utilities for forwarded requests.

use std::time::Instant;

/// Wall-clock timer for a single forwarded call.
///
/// Started before the outbound request is built and read once the body has
/// been consumed or the call has failed, so the reported duration covers the
/// whole round trip in both outcomes.
#[derive(Debug, Clone, Copy)]
pub struct RequestTimer {
    started: Instant,
}

impl RequestTimer {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    /// Milliseconds elapsed since `start`.
    pub fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }
}

impl Default for RequestTimer {
    fn default() -> Self {
        Self::start()
    }
}
