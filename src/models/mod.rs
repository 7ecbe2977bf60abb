pub mod enums;
pub mod record;
pub mod user;
pub mod verification;

pub use enums::{CallState, DocumentType};
pub use record::HealthRecord;
pub use user::{AuthResponse, LoginRequest, RegisterRequest, User};
pub use verification::VerificationStatus;

/// Errors raised while interpreting backend payloads.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Invalid {field} value: {value}")]
    InvalidEnum { field: String, value: String },
}
