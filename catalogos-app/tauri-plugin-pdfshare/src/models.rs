use std::fmt;

use base64::Engine;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A share request as the OS delivered it, before any filtering.
///
/// On Android this mirrors the activity `Intent`: its action, its declared
/// MIME type and whatever `EXTRA_STREAM` carried. On desktop it is built from
/// launch arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareIntent {
    pub action: Option<String>,
    pub mime_type: Option<String>,
    /// Stream locators attached to the intent (content URIs or file paths).
    pub streams: Vec<String>,
}

impl ShareIntent {
    pub fn new(action: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            action: Some(action.into()),
            mime_type: Some(mime_type.into()),
            streams: Vec::new(),
        }
    }

    pub fn with_stream(mut self, locator: impl Into<String>) -> Self {
        self.streams.push(locator.into());
        self
    }
}

/// Whether the intent carried one document or a list of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareKind {
    Single,
    Multiple,
}

/// Opaque reference to shared content. Only the content resolver knows how
/// to turn it into bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentLocator(String);

impl ContentLocator {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A share intent that passed the action/type filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareEvent {
    pub kind: ShareKind,
    pub mime_type: String,
    pub locators: Vec<ContentLocator>,
}

/// One fully-read shared document.
#[derive(Debug, Clone)]
pub struct PdfPayload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    /// Standard alphabet, padded, no line wrapping.
    pub base64: String,
}

impl PdfPayload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let base64 = base64::engine::general_purpose::STANDARD.encode(&bytes);
        Self {
            file_name: file_name.into(),
            bytes,
            base64,
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Payload handed to the frontend when delivery waits for the page to
/// signal readiness.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedPdf {
    pub id: String,
    pub file_name: String,
    pub base64_data: String,
    pub file_size: usize,
    /// Milliseconds since epoch
    pub received_at: i64,
}

impl From<PdfPayload> for ReceivedPdf {
    fn from(payload: PdfPayload) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            file_size: payload.size(),
            file_name: payload.file_name,
            base64_data: payload.base64,
            received_at: Utc::now().timestamp_millis(),
        }
    }
}

/// Response from the get_pending_pdfs command.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingPdfsResponse {
    pub pdfs: Vec<ReceivedPdf>,
    pub has_pending: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_base64_decodes_to_original_bytes() {
        let bytes = b"%PDF-1.7\n%\xe2\xe3\xcf\xd3\n1 0 obj\n".to_vec();
        let payload = PdfPayload::new("a.pdf", bytes.clone());

        let decoded = base64::engine::general_purpose::STANDARD
            .decode(&payload.base64)
            .unwrap();
        assert_eq!(decoded, bytes);
        assert_eq!(payload.size(), bytes.len());
    }

    #[test]
    fn test_payload_base64_is_not_wrapped() {
        let payload = PdfPayload::new("big.pdf", vec![0xAB; 4096]);
        assert!(!payload.base64.contains('\n'));
        assert!(!payload.base64.contains('\r'));
    }

    #[test]
    fn test_received_pdf_uses_camel_case() {
        let pdf = ReceivedPdf::from(PdfPayload::new("Invoice.pdf", vec![1, 2, 3]));
        let json = serde_json::to_value(&pdf).unwrap();

        assert_eq!(json["fileName"], "Invoice.pdf");
        assert_eq!(json["base64Data"], "AQID");
        assert_eq!(json["fileSize"], 3);
        assert!(json["receivedAt"].as_i64().unwrap() > 0);
        assert!(!json["id"].as_str().unwrap().is_empty());
    }
}
