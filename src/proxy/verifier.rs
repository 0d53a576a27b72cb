//! Batch verifier driving the proxy checker over a whole upload
//!
//! Proxies are checked in fixed-size batches. Checks inside a batch run
//! concurrently; batches run one after another with a short delay between
//! them and a longer cooldown every `pause_threshold` proxies, so the remote
//! API is not hammered. Progress is reported through a [`ProgressSink`], but
//! only when it has moved enough or enough time has passed.

use crate::proxy::checker::ProxyChecker;
use crate::proxy::clock::{Clock, TokioClock};
use crate::proxy::models::Proxy;
use crate::proxy::report::VerificationReport;
use crate::Result;
use async_trait::async_trait;
use futures::future::join_all;
use log::{info, warn};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use uuid::Uuid;

/// Default number of proxies checked concurrently
const DEFAULT_BATCH_SIZE: usize = 10;

/// Default number of processed proxies between cooldowns
const DEFAULT_PAUSE_THRESHOLD: usize = 180;

const DEFAULT_COOLDOWN: Duration = Duration::from_secs(10);
const DEFAULT_BATCH_DELAY: Duration = Duration::from_millis(500);

/// Default minimum progress increase, in percent, between two reports
const DEFAULT_PROGRESS_STEP: u8 = 5;

const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_secs(30);

/// Configuration for the batch verifier
#[derive(Debug, Clone)]
pub struct VerifierConfig {
    /// Number of proxies checked concurrently
    pub batch_size: usize,
    /// A cooldown follows every time this many proxies have been processed
    pub pause_threshold: usize,
    /// Length of the cooldown
    pub cooldown: Duration,
    /// Delay between two consecutive batches
    pub batch_delay: Duration,
    /// Minimum progress increase that triggers a report
    pub progress_step: u8,
    /// Report anyway once this much time passed since the last report
    pub progress_interval: Duration,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            pause_threshold: DEFAULT_PAUSE_THRESHOLD,
            cooldown: DEFAULT_COOLDOWN,
            batch_delay: DEFAULT_BATCH_DELAY,
            progress_step: DEFAULT_PROGRESS_STEP,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

impl VerifierConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Batch size is clamped to at least one
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Threshold is clamped to at least one
    pub fn with_pause_threshold(mut self, threshold: usize) -> Self {
        self.pause_threshold = threshold.max(1);
        self
    }

    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn with_batch_delay(mut self, delay: Duration) -> Self {
        self.batch_delay = delay;
        self
    }

    pub fn with_progress_step(mut self, step: u8) -> Self {
        self.progress_step = step;
        self
    }

    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }
}

/// A throttled progress event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    /// Floor of processed / total * 100
    pub percent: u8,
    pub processed: usize,
    pub total: usize,
    /// Set when a cooldown starts right after this update
    pub pause: Option<Duration>,
}

impl fmt::Display for ProgressUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "⏳ Progress: {}% ({}/{} proxies checked)",
            self.percent, self.processed, self.total
        )?;
        if let Some(pause) = self.pause {
            write!(
                f,
                "\n⏸ Pausing for {} seconds after checking {} proxies...",
                pause.as_secs(),
                self.processed
            )?;
        }
        Ok(())
    }
}

/// Receiver of progress events
///
/// Delivery failures are logged by the verifier and never abort a run.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    async fn report(&self, update: &ProgressUpdate) -> Result<()>;
}

/// Sink that drops every update
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

#[async_trait]
impl ProgressSink for NoProgress {
    async fn report(&self, _update: &ProgressUpdate) -> Result<()> {
        Ok(())
    }
}

/// Bookkeeping for a single run; never shared between runs
#[derive(Debug)]
pub(crate) struct RunState {
    total: usize,
    processed: usize,
    last_reported_percent: u8,
    last_report_at: Instant,
}

impl RunState {
    pub(crate) fn new(total: usize, started_at: Instant) -> Self {
        Self {
            total,
            processed: 0,
            last_reported_percent: 0,
            last_report_at: started_at,
        }
    }

    pub(crate) fn record_batch(&mut self, size: usize) {
        self.processed = (self.processed + size).min(self.total);
    }

    pub(crate) fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        (self.processed * 100 / self.total) as u8
    }

    pub(crate) fn has_remaining(&self) -> bool {
        self.processed < self.total
    }

    /// True on every multiple of the threshold except the end of the run
    pub(crate) fn at_cooldown_boundary(&self, threshold: usize) -> bool {
        self.processed > 0 && self.processed % threshold == 0 && self.has_remaining()
    }

    pub(crate) fn progress_due(&self, now: Instant, config: &VerifierConfig) -> bool {
        let percent = self.percent();
        percent >= self.last_reported_percent.saturating_add(config.progress_step)
            || now.saturating_duration_since(self.last_report_at) > config.progress_interval
            || self.at_cooldown_boundary(config.pause_threshold)
    }

    /// Build the update to emit and remember it as the last one reported
    pub(crate) fn mark_reported(&mut self, now: Instant, pause: Option<Duration>) -> ProgressUpdate {
        let percent = self.percent().max(self.last_reported_percent);
        self.last_reported_percent = percent;
        self.last_report_at = now;
        ProgressUpdate {
            percent,
            processed: self.processed,
            total: self.total,
            pause,
        }
    }
}

/// Drives [`ProxyChecker`] across a list of proxies in paced batches
#[derive(Clone)]
pub struct BatchVerifier {
    checker: ProxyChecker,
    config: VerifierConfig,
    clock: Arc<dyn Clock>,
}

impl BatchVerifier {
    pub fn new(checker: ProxyChecker, config: VerifierConfig) -> Self {
        Self::with_clock(checker, config, Arc::new(TokioClock))
    }

    pub fn with_clock(checker: ProxyChecker, config: VerifierConfig, clock: Arc<dyn Clock>) -> Self {
        let config = VerifierConfig {
            batch_size: config.batch_size.max(1),
            pause_threshold: config.pause_threshold.max(1),
            ..config
        };
        Self {
            checker,
            config,
            clock,
        }
    }

    /// Check every proxy and split the results into active and dead
    ///
    /// Each proxy yields exactly one result and both partitions keep the
    /// input order.
    pub async fn verify(&self, proxies: Vec<Proxy>, progress: &dyn ProgressSink) -> VerificationReport {
        let run_id = Uuid::new_v4();
        let total = proxies.len();
        let mut state = RunState::new(total, self.clock.now());
        let mut report = VerificationReport::new();

        info!("[{}] Checking {} proxies", run_id, total);

        for batch in proxies.chunks(self.config.batch_size) {
            let results = join_all(batch.iter().map(|proxy| self.checker.check_proxy(proxy))).await;
            report.extend(results);
            state.record_batch(batch.len());

            let now = self.clock.now();
            let cooldown = state.at_cooldown_boundary(self.config.pause_threshold);

            if state.progress_due(now, &self.config) {
                let update = state.mark_reported(now, cooldown.then_some(self.config.cooldown));
                if let Err(e) = progress.report(&update).await {
                    warn!("[{}] Failed to deliver progress update: {:#}", run_id, e);
                }
            }

            if cooldown {
                info!(
                    "[{}] Cooling down for {:?} after {} proxies",
                    run_id, self.config.cooldown, state.processed
                );
                self.clock.sleep(self.config.cooldown).await;
            } else if state.has_remaining() {
                self.clock.sleep(self.config.batch_delay).await;
            }
        }

        info!(
            "[{}] Finished: {} active, {} dead",
            run_id,
            report.active.len(),
            report.dead.len()
        );

        report
    }
}
