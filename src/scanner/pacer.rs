//! Pacing between candidates
//!
//! The quote API is rate limited (roughly 400 requests/min). Each candidate
//! costs two requests, so one candidate per 500 ms stays well under it.

use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::{self, Instant};
use tracing::trace;

/// Called by the scanner after every evaluated candidate
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self);
}

/// Sleep a fixed amount every time
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay(pub Duration);

#[async_trait]
impl Pacer for FixedDelay {
    async fn pause(&self) {
        trace!("Pausing {:?}", self.0);
        time::sleep(self.0).await;
    }
}

/// Keep at least `interval` between consecutive pause exits.
///
/// Time already spent waiting on quotes counts towards the interval.
#[derive(Debug)]
pub struct MinInterval {
    interval: Duration,
    last: Mutex<Instant>,
}

impl MinInterval {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: Mutex::new(Instant::now()),
        }
    }
}

#[async_trait]
impl Pacer for MinInterval {
    async fn pause(&self) {
        let deadline = *self.last.lock().unwrap_or_else(|e| e.into_inner()) + self.interval;
        time::sleep_until(deadline).await;
        *self.last.lock().unwrap_or_else(|e| e.into_inner()) = Instant::now();
    }
}

/// No pacing at all
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

#[async_trait]
impl Pacer for NoDelay {
    async fn pause(&self) {}
}
