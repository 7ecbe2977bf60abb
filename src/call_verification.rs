//! Phone-call verification — initiation, status reads, and the status seam
//! the poller consumes.
//!
//! The backend places an automated call to the patient, verifies identity
//! and document details, and exposes progress at
//! `GET /health-records/{id}/verify/status`. This module owns the two HTTP
//! operations; the polling cadence lives in [`crate::poller`].

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures_util::future::BoxFuture;

use crate::client::{ApiClient, ApiError};
use crate::models::verification::{InitiateVerificationRequest, VerificationStatus};

/// Where the poller reads statuses from. Implemented by
/// [`CallVerificationService`] and by [`ScriptedStatusSource`] for tests.
pub trait StatusSource: Send + Sync + 'static {
    fn fetch_status<'a>(
        &'a self,
        record_id: &'a str,
    ) -> BoxFuture<'a, Result<VerificationStatus, ApiError>>;
}

pub struct CallVerificationService {
    client: Arc<ApiClient>,
}

impl CallVerificationService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// `POST /health-records/{id}/verify` — ask the backend to place the
    /// verification call. `patient_phone` overrides the number stored on
    /// the record.
    pub async fn initiate(
        &self,
        record_id: &str,
        patient_phone: Option<&str>,
    ) -> Result<(), ApiError> {
        let request = InitiateVerificationRequest {
            patient_phone: patient_phone.map(String::from),
        };
        tracing::info!(record_id, "initiating verification call");
        self.client
            .post_unit(&format!("/health-records/{record_id}/verify"), &request)
            .await
    }

    /// `GET /health-records/{id}/verify/status`.
    pub async fn status(&self, record_id: &str) -> Result<VerificationStatus, ApiError> {
        self.client
            .get_json(&format!("/health-records/{record_id}/verify/status"))
            .await
    }
}

impl StatusSource for CallVerificationService {
    fn fetch_status<'a>(
        &'a self,
        record_id: &'a str,
    ) -> BoxFuture<'a, Result<VerificationStatus, ApiError>> {
        Box::pin(self.status(record_id))
    }
}

// ═══════════════════════════════════════════════════════════
// ScriptedStatusSource — test double
// ═══════════════════════════════════════════════════════════

/// Scripted status source for tests — pops queued replies in order, then
/// repeats the configured tail reply. An exhausted script with no tail
/// reports a transient fetch failure.
pub struct ScriptedStatusSource {
    replies: Mutex<VecDeque<Reply>>,
    tail: Option<Reply>,
    calls: AtomicUsize,
}

#[derive(Clone)]
enum Reply {
    Status(VerificationStatus),
    TransientError,
}

impl ScriptedStatusSource {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            tail: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Queue a successful status reply.
    pub fn status(mut self, status: VerificationStatus) -> Self {
        self.replies
            .get_mut()
            .expect("script lock")
            .push_back(Reply::Status(status));
        self
    }

    /// Queue a transient fetch failure.
    pub fn transient_error(mut self) -> Self {
        self.replies
            .get_mut()
            .expect("script lock")
            .push_back(Reply::TransientError);
        self
    }

    /// Reply used for every fetch once the queue runs dry.
    pub fn then_repeat(mut self, status: VerificationStatus) -> Self {
        self.tail = Some(Reply::Status(status));
        self
    }

    /// Total fetches observed.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for ScriptedStatusSource {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusSource for ScriptedStatusSource {
    fn fetch_status<'a>(
        &'a self,
        _record_id: &'a str,
    ) -> BoxFuture<'a, Result<VerificationStatus, ApiError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = {
            let mut replies = self.replies.lock().expect("script lock");
            replies.pop_front().or_else(|| self.tail.clone())
        };
        let result = match reply {
            Some(Reply::Status(status)) => Ok(status),
            Some(Reply::TransientError) | None => {
                Err(ApiError::Http("scripted status fetch failure".into()))
            }
        };
        Box::pin(std::future::ready(result))
    }
}
