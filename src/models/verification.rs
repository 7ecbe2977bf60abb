use serde::{Deserialize, Serialize};

use super::enums::CallState;

/// Advisory delivered once when a call crosses the 3-minute limit.
pub const TIMEOUT_WARNING_MESSAGE: &str =
    "The 3-minute call limit has been reached. The call will end automatically.";

/// Status of one verification call, as reported by the telephony pipeline.
///
/// Structural equality across all fields drives the poller's change
/// detection — two payloads with the same `status` but different
/// `call_duration` are distinct updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationStatus {
    pub status: CallState,
    /// Whether the patient was verified. Meaningful once `status` is `ended`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
    /// Call duration in seconds, present on/after completion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_duration: Option<f64>,
    /// Human-readable diagnostic, present on `error`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl VerificationStatus {
    pub fn new(status: CallState) -> Self {
        Self {
            status,
            verified: None,
            call_duration: None,
            message: None,
        }
    }

    /// No further polling happens after a terminal status.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Synthetic 3-minute advisory, produced client-side by the poller.
    pub fn timeout_warning() -> Self {
        Self {
            status: CallState::TimeoutWarning,
            verified: None,
            call_duration: None,
            message: Some(TIMEOUT_WARNING_MESSAGE.to_string()),
        }
    }

    /// Synthetic outcome when polling exhausts its attempt budget.
    pub fn timed_out() -> Self {
        Self {
            status: CallState::Timeout,
            verified: None,
            call_duration: None,
            message: Some("Polling timed out".to_string()),
        }
    }
}

/// Payload for `POST /health-records/{id}/verify`. Serializes to `{}` when
/// no override number is given, matching what the backend expects.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiateVerificationRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_phone: Option<String>,
}
