//! Restartable, cancellable fixed-period fetch loop.
//!
//! Each [`start`] call owns exactly one timer task. Results are published
//! through a `watch` channel; a failed tick keeps the last good snapshot and
//! only updates the error annotation.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::error::Result;

type FetchFn<T> = Arc<dyn Fn() -> BoxFuture<'static, Result<T>> + Send + Sync>;

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Latest published view of one poller.
#[derive(Debug, Clone, PartialEq)]
pub struct PollState<T> {
    /// Last successful result, kept across failed ticks.
    pub snapshot: Option<T>,
    /// Message of the most recent failure, cleared by the next success.
    pub error: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
    pub last_success_at: Option<DateTime<Utc>>,
    /// Number of results published so far, scheduled or manual.
    pub ticks: u64,
}

impl<T> Default for PollState<T> {
    fn default() -> Self {
        Self {
            snapshot: None,
            error: None,
            updated_at: None,
            last_success_at: None,
            ticks: 0,
        }
    }
}

#[derive(Default)]
struct PublishGate {
    stopped: bool,
    // Sequence number of the newest fetch whose result was published
    published: u64,
}

struct Shared<T> {
    name: String,
    fetch: FetchFn<T>,
    state: watch::Sender<PollState<T>>,
    // Every publish happens while holding this lock.
    gate: Mutex<PublishGate>,
    started: AtomicU64,
    token: CancellationToken,
}

impl<T: Send + Sync + 'static> Shared<T> {
    async fn fetch_and_publish(&self) {
        let seq = self.started.fetch_add(1, Ordering::SeqCst) + 1;
        let result = tokio::select! {
            _ = self.token.cancelled() => return,
            result = (self.fetch)() => result,
        };

        let mut gate = self.gate.lock().await;
        if gate.stopped || self.token.is_cancelled() {
            tracing::debug!(poller = %self.name, "Discarding result that resolved after stop");
            return;
        }
        if seq < gate.published {
            tracing::debug!(poller = %self.name, seq, "Discarding result overtaken by newer fetch");
            return;
        }
        gate.published = seq;

        let now = Utc::now();
        if let Err(e) = &result {
            tracing::warn!(poller = %self.name, "Poll failed: {e}");
        }
        self.state.send_modify(|state| {
            state.ticks += 1;
            state.updated_at = Some(now);
            match result {
                Ok(snapshot) => {
                    state.snapshot = Some(snapshot);
                    state.error = None;
                    state.last_success_at = Some(now);
                }
                Err(e) => state.error = Some(e.to_string()),
            }
        });
    }
}

/// Handle to a running poller. Dropping it cancels the loop.
pub struct PollerHandle<T> {
    shared: Arc<Shared<T>>,
    task: Option<JoinHandle<()>>,
}

/// Fetch immediately, then every `period` until the handle is stopped.
pub fn start<T, F, Fut>(name: impl Into<String>, period: Duration, fetch: F) -> PollerHandle<T>
where
    T: Send + Sync + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
{
    let name = name.into();
    let period = if period < MIN_PERIOD {
        tracing::warn!(poller = %name, ?period, "Poll period too small, clamping");
        MIN_PERIOD
    } else {
        period
    };

    let (state, _) = watch::channel(PollState::default());
    let shared = Arc::new(Shared {
        name,
        fetch: Arc::new(move || fetch().boxed()),
        state,
        gate: Mutex::new(PublishGate::default()),
        started: AtomicU64::new(0),
        token: CancellationToken::new(),
    });

    tracing::info!(poller = %shared.name, ?period, "Starting poller");
    let task = tokio::spawn({
        let shared = shared.clone();
        async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = shared.token.cancelled() => break,
                    _ = ticker.tick() => shared.fetch_and_publish().await,
                }
            }
            tracing::debug!(poller = %shared.name, "Poll loop exited");
        }
    });

    PollerHandle {
        shared,
        task: Some(task),
    }
}

impl<T: Clone + Send + Sync + 'static> PollerHandle<T> {
    pub fn subscribe(&self) -> watch::Receiver<PollState<T>> {
        self.shared.state.subscribe()
    }

    pub fn latest(&self) -> PollState<T> {
        self.shared.state.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        !self.shared.token.is_cancelled()
    }

    /// Out-of-band fetch. Does not move the scheduled ticks. If a fetch
    /// started later publishes first, this result is dropped.
    pub fn refresh(&self) {
        if !self.is_running() {
            return;
        }
        let shared = self.shared.clone();
        tokio::spawn(async move { shared.fetch_and_publish().await });
    }

    /// Stop the loop. Nothing is published once this returns, including
    /// results of fetches that were already in flight.
    pub async fn stop(mut self) {
        self.shared.gate.lock().await.stopped = true;
        self.shared.token.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
        tracing::info!(poller = %self.shared.name, "Poller stopped");
    }
}

impl<T> Drop for PollerHandle<T> {
    fn drop(&mut self) {
        // A publish already holding the gate may still finish; later ones
        // see the cancelled token.
        if let Ok(mut gate) = self.shared.gate.try_lock() {
            gate.stopped = true;
        }
        self.shared.token.cancel();
    }
}
