//! Call timing
//!
//! Measures a single gateway round trip for the debug log.

use std::time::{Duration, Instant};

/// Timer for one remote call
#[derive(Debug)]
pub struct Timer {
    start: Instant,
    method: String,
}

impl Timer {
    /// Start timing a call to `method`
    pub fn start(method: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            method: method.into(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed().as_millis() as u64
    }

    /// Stop the timer and log the call duration with its HTTP status
    pub fn finish(self, status: u16) -> Duration {
        tracing::debug!(
            "{} answered HTTP {} in {}ms",
            self.method,
            status,
            self.elapsed_ms()
        );
        self.elapsed()
    }
}
