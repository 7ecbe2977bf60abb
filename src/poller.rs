//! Verification status poller — watches one call until it resolves.
//!
//! **Why this exists**: after `CallVerificationService::initiate`, the call
//! progresses on the backend (ringing, in-progress, verifying, ...) and the
//! only way to observe it is to poll the status endpoint. This module owns
//! that loop: cadence, change detection, the 3-minute advisory, and a hard
//! attempt budget.
//!
//! **Design**:
//! - One spawned task per session; sessions share no mutable state.
//! - Updates flow through a channel exposed by [`PollHandle`] (`recv()` or
//!   the `Stream` impl) — consumers never install callbacks.
//! - A status is delivered only when it differs structurally from the last
//!   delivered one; identical consecutive polls are silent.
//! - Transient fetch failures are swallowed and retried on the normal
//!   cadence. Only a service-reported `error` status is terminal.
//! - Cancellation is checked at both suspension points (fetch and sleep);
//!   after [`PollHandle::cancel`] returns, no update is observable.
//! - Exhausting the attempt budget delivers one final synthetic `timeout`
//!   status, so consumers never have to infer a timeout from silence.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use futures_util::Stream;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use uuid::Uuid;

use crate::call_verification::StatusSource;
use crate::models::enums::CallState;
use crate::models::verification::VerificationStatus;

/// Calls are cut off by the backend at 3 minutes; the poller mirrors that
/// limit for its one-shot advisory and its end-of-call cadence.
pub const CALL_TIME_LIMIT: Duration = Duration::from_secs(180);

/// Poll faster while the patient is actually on the line.
const ACTIVE_CALL_INTERVAL: Duration = Duration::from_secs(2);
/// Tightest cadence once the call is expected to end any moment.
const NEAR_LIMIT_INTERVAL: Duration = Duration::from_secs(1);

const STATUS_CHANNEL_CAPACITY: usize = 16;

/// Polling limits for one session.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Hard cap on status fetches. The default (100 at a 3 s base interval)
    /// bounds a session to roughly five minutes.
    pub max_attempts: u32,
    /// Wait between polls when the call is neither active nor near the
    /// 3-minute limit.
    pub base_interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_attempts: 100,
            base_interval: Duration::from_secs(3),
        }
    }
}

/// How a poll session ended.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// The remote service reported `ended` or `error`.
    Completed(VerificationStatus),
    /// The attempt budget ran out without a terminal status.
    TimedOut,
    Cancelled,
}

/// Handle to a running poll session.
///
/// Consume updates via [`recv`](Self::recv) or the `Stream` impl. Dropping
/// the handle stops the session at its next suspension point; call
/// [`cancel`](Self::cancel) to stop it explicitly.
pub struct PollHandle {
    session_id: Uuid,
    updates: mpsc::Receiver<VerificationStatus>,
    cancel_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<PollOutcome>,
}

impl PollHandle {
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Next status update; `None` once the session has stopped for any
    /// reason.
    pub async fn recv(&mut self) -> Option<VerificationStatus> {
        self.updates.recv().await
    }

    /// Stop the session. No update is observable after this returns, even
    /// if a status fetch was in flight — queued updates are discarded.
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel_tx.take() {
            let _ = cancel.send(());
        }
        self.updates.close();
        while self.updates.try_recv().is_ok() {}
    }

    /// Wait for the session's terminal disposition, discarding any unread
    /// updates along the way.
    pub async fn outcome(mut self) -> PollOutcome {
        while self.updates.recv().await.is_some() {}
        self.task.await.unwrap_or(PollOutcome::Cancelled)
    }
}

impl Stream for PollHandle {
    type Item = VerificationStatus;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.updates.poll_recv(cx)
    }
}

/// Start polling verification status for `record_id`.
///
/// The caller must already have initiated the verification call. Sessions
/// are fully independent — it is the caller's job not to start a second
/// session for a record whose previous session is still running. Must be
/// called within a Tokio runtime.
pub fn start_polling(
    source: Arc<dyn StatusSource>,
    record_id: impl Into<String>,
    config: PollConfig,
) -> PollHandle {
    let record_id = record_id.into();
    let session_id = Uuid::new_v4();
    let (updates_tx, updates_rx) = mpsc::channel(STATUS_CHANNEL_CAPACITY);
    let (cancel_tx, cancel_rx) = oneshot::channel();

    tracing::info!(
        %session_id,
        %record_id,
        max_attempts = config.max_attempts,
        "verification polling started"
    );
    let task = tokio::spawn(poll_loop(
        source, record_id, session_id, config, updates_tx, cancel_rx,
    ));

    PollHandle {
        session_id,
        updates: updates_rx,
        cancel_tx: Some(cancel_tx),
        task,
    }
}

async fn poll_loop(
    source: Arc<dyn StatusSource>,
    record_id: String,
    session_id: Uuid,
    config: PollConfig,
    updates: mpsc::Sender<VerificationStatus>,
    mut cancel_rx: oneshot::Receiver<()>,
) -> PollOutcome {
    let started = Instant::now();
    let mut attempts: u32 = 0;
    let mut last_status: Option<VerificationStatus> = None;
    let mut warning_emitted = false;

    loop {
        if attempts >= config.max_attempts {
            tracing::info!(%session_id, attempts, "verification polling exhausted its attempt budget");
            let _ = updates.send(VerificationStatus::timed_out()).await;
            return PollOutcome::TimedOut;
        }

        // One-shot advisory once the call crosses the 3-minute limit. Not a
        // poll attempt, and invisible to change detection.
        if !warning_emitted && started.elapsed() >= CALL_TIME_LIMIT {
            warning_emitted = true;
            if updates
                .send(VerificationStatus::timeout_warning())
                .await
                .is_err()
            {
                return PollOutcome::Cancelled;
            }
        }

        let fetched = tokio::select! {
            _ = &mut cancel_rx => {
                tracing::debug!(%session_id, "verification polling cancelled");
                return PollOutcome::Cancelled;
            }
            result = source.fetch_status(&record_id) => result,
        };

        let mut next_interval = config.base_interval;
        match fetched {
            Ok(status) => {
                if last_status.as_ref() != Some(&status) {
                    last_status = Some(status.clone());
                    if updates.send(status.clone()).await.is_err() {
                        return PollOutcome::Cancelled;
                    }
                }
                if status.is_terminal() {
                    tracing::info!(
                        %session_id,
                        state = %status.status,
                        "verification call reached a terminal status"
                    );
                    return PollOutcome::Completed(status);
                }
                if status.status == CallState::InProgress {
                    next_interval = ACTIVE_CALL_INTERVAL;
                } else if started.elapsed() >= CALL_TIME_LIMIT {
                    next_interval = NEAR_LIMIT_INTERVAL;
                }
            }
            Err(err) => {
                // A blip must not kill the session; retry on the base cadence.
                tracing::debug!(%session_id, error = %err, "status poll failed, will retry");
            }
        }

        attempts += 1;
        tokio::select! {
            _ = &mut cancel_rx => {
                tracing::debug!(%session_id, "verification polling cancelled");
                return PollOutcome::Cancelled;
            }
            _ = sleep(next_interval) => {}
        }
    }
}
