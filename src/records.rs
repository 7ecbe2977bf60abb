//! Health records — list, fetch, upload, share, delete.
//!
//! Uploads are validated client-side before they go on the wire, mirroring
//! what the upload form enforces: a title, an accepted file format (sniffed
//! from magic bytes, not the filename) and a 5 MB cap.

use std::sync::Arc;

use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};

use crate::client::{ApiClient, ApiError};
use crate::models::enums::DocumentType;
use crate::models::record::HealthRecord;

/// Upload size cap enforced client-side.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// A record upload, validated before it goes on the wire.
#[derive(Debug, Clone)]
pub struct NewRecord {
    pub title: String,
    pub description: String,
    pub document_type: DocumentType,
    pub patient_name: Option<String>,
    pub patient_phone: Option<String>,
    pub file_name: String,
    pub file_data: Vec<u8>,
}

#[derive(Debug, Deserialize)]
struct RecordsEnvelope {
    #[serde(default)]
    records: Vec<HealthRecord>,
}

#[derive(Debug, Deserialize)]
struct RecordEnvelope {
    record: HealthRecord,
}

#[derive(Debug, Serialize)]
struct ShareRequest<'a> {
    email: &'a str,
}

pub struct HealthRecordService {
    client: Arc<ApiClient>,
}

impl HealthRecordService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// `GET /health-records` — all records owned by the current user.
    pub async fn list(&self) -> Result<Vec<HealthRecord>, ApiError> {
        let envelope: RecordsEnvelope = self.client.get_json("/health-records").await?;
        Ok(envelope.records)
    }

    /// `GET /health-records/{id}`.
    pub async fn get(&self, id: &str) -> Result<HealthRecord, ApiError> {
        let envelope: RecordEnvelope = self
            .client
            .get_json(&format!("/health-records/{id}"))
            .await?;
        Ok(envelope.record)
    }

    /// `GET /health-records/{id}/full` — includes the complete extraction
    /// output rather than the trimmed listing shape.
    pub async fn get_full(&self, id: &str) -> Result<HealthRecord, ApiError> {
        let envelope: RecordEnvelope = self
            .client
            .get_json(&format!("/health-records/{id}/full"))
            .await?;
        Ok(envelope.record)
    }

    /// `POST /health-records/upload` (multipart). The backend queues the
    /// document for OCR and AI structuring; the returned record has no
    /// extraction output yet.
    pub async fn upload(&self, record: &NewRecord) -> Result<HealthRecord, ApiError> {
        let mime = validate_upload(record)?;
        let envelope: RecordEnvelope = self
            .client
            .post_multipart("/health-records/upload", || build_upload_form(record, mime))
            .await?;
        Ok(envelope.record)
    }

    /// `DELETE /health-records/{id}`.
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client.delete(&format!("/health-records/{id}")).await
    }

    /// `POST /health-records/{id}/share` — share with another account by
    /// email.
    pub async fn share(&self, id: &str, email: &str) -> Result<(), ApiError> {
        self.client
            .post_unit(&format!("/health-records/{id}/share"), &ShareRequest { email })
            .await
    }

    /// `GET /health-records/shared` — records other users shared with us.
    pub async fn shared(&self) -> Result<Vec<HealthRecord>, ApiError> {
        let envelope: RecordsEnvelope = self.client.get_json("/health-records/shared").await?;
        Ok(envelope.records)
    }
}

/// Validate a pending upload and resolve its MIME type.
fn validate_upload(record: &NewRecord) -> Result<&'static str, ApiError> {
    if record.title.trim().is_empty() {
        return Err(ApiError::InvalidUpload("A title is required".into()));
    }
    if record.file_data.is_empty() {
        return Err(ApiError::InvalidUpload("The file is empty".into()));
    }
    if record.file_data.len() > MAX_UPLOAD_BYTES {
        return Err(ApiError::InvalidUpload(
            "File size should be less than 5MB".into(),
        ));
    }
    detect_mime_from_bytes(&record.file_data).ok_or_else(|| {
        ApiError::InvalidUpload("Only PDF, JPEG and PNG files are accepted".into())
    })
}

/// Detect an accepted MIME type from file magic bytes (not extension or
/// caller-supplied Content-Type).
fn detect_mime_from_bytes(bytes: &[u8]) -> Option<&'static str> {
    // JPEG: FF D8 FF
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("image/jpeg");
    }
    // PNG: 89 50 4E 47
    if bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
        return Some("image/png");
    }
    // PDF: %PDF
    if bytes.starts_with(b"%PDF") {
        return Some("application/pdf");
    }
    None
}

/// Part names match the backend's upload route. Name and phone are always
/// present, empty when unset.
fn build_upload_form(record: &NewRecord, mime: &'static str) -> Result<Form, ApiError> {
    let file = Part::bytes(record.file_data.clone())
        .file_name(record.file_name.clone())
        .mime_str(mime)
        .map_err(|e| ApiError::InvalidUpload(e.to_string()))?;

    Ok(Form::new()
        .part("file", file)
        .text("title", record.title.clone())
        .text("description", record.description.clone())
        .text("documentType", record.document_type.as_str())
        .text("patientName", record.patient_name.clone().unwrap_or_default())
        .text("patientPhone", record.patient_phone.clone().unwrap_or_default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::StaticToken;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use axum::extract::{Multipart, Path, State};
    use axum::routing::{delete, get, post};
    use axum::{Json, Router};

    const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn service(base: &str) -> HealthRecordService {
        HealthRecordService::new(Arc::new(ApiClient::new(
            base,
            Arc::new(StaticToken::new("tok-1")),
        )))
    }

    fn record_json(id: &str) -> serde_json::Value {
        serde_json::json!({
            "_id": id,
            "userId": "u1",
            "title": "Blood panel",
            "documentType": "Lab Result",
            "fileUrl": "https://storage.example.com/records/panel.pdf",
            "createdAt": "2026-03-02T09:15:00Z",
            "updatedAt": "2026-03-02T09:15:00Z"
        })
    }

    fn upload_record(file_data: Vec<u8>) -> NewRecord {
        NewRecord {
            title: "Blood panel".into(),
            description: "Annual checkup".into(),
            document_type: DocumentType::LabResult,
            patient_name: Some("Asha Nair".into()),
            patient_phone: None,
            file_name: "panel.png".into(),
            file_data,
        }
    }

    // ── Validation ──────────────────────────────────────────

    #[test]
    fn detects_accepted_formats() {
        assert_eq!(detect_mime_from_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]), Some("image/jpeg"));
        assert_eq!(detect_mime_from_bytes(&PNG_MAGIC), Some("image/png"));
        assert_eq!(detect_mime_from_bytes(b"%PDF-1.7"), Some("application/pdf"));
        assert_eq!(detect_mime_from_bytes(b"GIF89a"), None);
        assert_eq!(detect_mime_from_bytes(b""), None);
    }

    #[test]
    fn rejects_missing_title() {
        let mut record = upload_record(PNG_MAGIC.to_vec());
        record.title = "   ".into();
        let err = validate_upload(&record).unwrap_err();
        assert!(matches!(err, ApiError::InvalidUpload(_)));
    }

    #[test]
    fn rejects_oversized_file() {
        let record = upload_record(vec![0x89; MAX_UPLOAD_BYTES + 1]);
        let err = validate_upload(&record).unwrap_err();
        assert!(err.to_string().contains("5MB"));
    }

    #[test]
    fn rejects_unknown_format() {
        let record = upload_record(b"GIF89a....".to_vec());
        let err = validate_upload(&record).unwrap_err();
        assert!(matches!(err, ApiError::InvalidUpload(_)));
    }

    #[test]
    fn accepts_png_within_limits() {
        let record = upload_record(PNG_MAGIC.to_vec());
        assert_eq!(validate_upload(&record).unwrap(), "image/png");
    }

    // ── Wire behavior ───────────────────────────────────────

    #[tokio::test]
    async fn list_unwraps_envelope() {
        let app = Router::new().route(
            "/health-records",
            get(|| async {
                Json(serde_json::json!({ "records": [record_json("r1"), record_json("r2")] }))
            }),
        );
        let base = serve(app).await;

        let records = service(&base).list().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "r1");
    }

    #[tokio::test]
    async fn list_tolerates_missing_records_key() {
        let app = Router::new()
            .route("/health-records", get(|| async { Json(serde_json::json!({})) }));
        let base = serve(app).await;

        let records = service(&base).list().await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn get_full_hits_full_path() {
        let app = Router::new().route(
            "/health-records/:id/full",
            get(|Path(id): Path<String>| async move {
                Json(serde_json::json!({ "record": record_json(&id) }))
            }),
        );
        let base = serve(app).await;

        let record = service(&base).get_full("r42").await.unwrap();
        assert_eq!(record.id, "r42");
    }

    #[tokio::test]
    async fn delete_hits_record_path() {
        let app = Router::new().route(
            "/health-records/:id",
            delete(|Path(id): Path<String>| async move {
                assert_eq!(id, "r1");
                Json(serde_json::json!({ "message": "Record deleted" }))
            }),
        );
        let base = serve(app).await;

        service(&base).delete("r1").await.unwrap();
    }

    #[tokio::test]
    async fn share_posts_email() {
        let app = Router::new().route(
            "/health-records/:id/share",
            post(|Path(id): Path<String>, Json(body): Json<serde_json::Value>| async move {
                assert_eq!(id, "r1");
                assert_eq!(body["email"], "careteam@example.com");
                Json(serde_json::json!({ "message": "shared" }))
            }),
        );
        let base = serve(app).await;

        service(&base)
            .share("r1", "careteam@example.com")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn upload_sends_expected_parts() {
        type Seen = Arc<Mutex<BTreeMap<String, String>>>;
        let seen: Seen = Arc::new(Mutex::new(BTreeMap::new()));

        async fn handler(
            State(seen): State<Seen>,
            mut multipart: Multipart,
        ) -> Json<serde_json::Value> {
            while let Some(field) = multipart.next_field().await.unwrap() {
                let name = field.name().unwrap_or_default().to_string();
                if name == "file" {
                    let len = field.bytes().await.unwrap().len();
                    seen.lock().unwrap().insert(name, len.to_string());
                } else {
                    let value = field.text().await.unwrap();
                    seen.lock().unwrap().insert(name, value);
                }
            }
            Json(serde_json::json!({ "record": {
                "_id": "r-new",
                "userId": "u1",
                "title": "Blood panel",
                "documentType": "Lab Result",
                "fileUrl": "https://storage.example.com/records/panel.png",
                "createdAt": "2026-03-02T09:15:00Z",
                "updatedAt": "2026-03-02T09:15:00Z"
            }}))
        }

        let app = Router::new()
            .route("/health-records/upload", post(handler))
            .with_state(seen.clone());
        let base = serve(app).await;

        let uploaded = service(&base)
            .upload(&upload_record(PNG_MAGIC.to_vec()))
            .await
            .unwrap();
        assert_eq!(uploaded.id, "r-new");

        let parts = seen.lock().unwrap().clone();
        assert_eq!(parts["title"], "Blood panel");
        assert_eq!(parts["description"], "Annual checkup");
        assert_eq!(parts["documentType"], "Lab Result");
        assert_eq!(parts["patientName"], "Asha Nair");
        assert_eq!(parts["patientPhone"], "");
        assert_eq!(parts["file"], PNG_MAGIC.len().to_string());
    }
}
