use std::time::Duration;

use async_trait::async_trait;
use tokio::{
    sync::mpsc,
    time::{Interval, MissedTickBehavior, interval},
};

/// Drives the polling loop.
#[async_trait]
pub trait Ticker: Send {
    /// Wait for the next tick.
    ///
    /// Returns `false` once the ticker will never fire again.
    async fn tick(&mut self) -> bool;
}

/// Fixed-period ticker, the first tick fires immediately.
pub struct IntervalTicker(Interval);

impl IntervalTicker {
    pub fn new(period: Duration) -> Self {
        let mut interval = interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self(interval)
    }
}

#[async_trait]
impl Ticker for IntervalTicker {
    async fn tick(&mut self) -> bool {
        self.0.tick().await;
        true
    }
}

/// Ticks on every message, stops when all the senders are gone.
#[async_trait]
impl Ticker for mpsc::Receiver<()> {
    async fn tick(&mut self) -> bool {
        self.recv().await.is_some()
    }
}
