use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One uploaded health document and its backend-maintained metadata.
///
/// `extracted_data` and `structured_data` are whatever the backend's AI
/// pipeline produced for this document — their shape is owned by the
/// backend and rendered opaquely by shells, so they stay untyped JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub document_type: String,
    pub file_url: String,
    #[serde(default)]
    pub extracted_data: Option<serde_json::Value>,
    #[serde(default)]
    pub structured_data: Option<serde_json::Value>,
    #[serde(default)]
    pub processing_metadata: Option<serde_json::Value>,
    #[serde(default)]
    pub patient_name: Option<String>,
    #[serde(default)]
    pub patient_phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
