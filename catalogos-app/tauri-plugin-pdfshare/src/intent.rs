//! Filtering of raw share intents.

use tracing::debug;

use crate::models::{ContentLocator, ShareEvent, ShareIntent, ShareKind};

/// `Intent.ACTION_SEND`
pub const ACTION_SEND: &str = "android.intent.action.SEND";

/// `Intent.ACTION_SEND_MULTIPLE`
pub const ACTION_SEND_MULTIPLE: &str = "android.intent.action.SEND_MULTIPLE";

/// The only MIME type this bridge accepts. Matched exactly.
pub const PDF_MIME_TYPE: &str = "application/pdf";

impl ShareEvent {
    /// Classify an intent. Returns `None` for anything that is not a PDF
    /// share (wrong action, wrong or missing type, nothing attached); that is
    /// a no-op, not an error.
    pub fn from_intent(intent: &ShareIntent) -> Option<ShareEvent> {
        let action = intent.action.as_deref()?;
        let mime_type = intent.mime_type.as_deref()?;

        let kind = match action {
            ACTION_SEND => ShareKind::Single,
            ACTION_SEND_MULTIPLE => ShareKind::Multiple,
            _ => return None,
        };

        if mime_type != PDF_MIME_TYPE {
            debug!("Ignoring share of type {}", mime_type);
            return None;
        }

        let locators: Vec<ContentLocator> = match kind {
            // ACTION_SEND carries a single EXTRA_STREAM
            ShareKind::Single => intent
                .streams
                .first()
                .map(ContentLocator::new)
                .into_iter()
                .collect(),
            ShareKind::Multiple => intent.streams.iter().map(ContentLocator::new).collect(),
        };

        if locators.is_empty() {
            debug!("Share intent carried no stream");
            return None;
        }

        Some(ShareEvent {
            kind,
            mime_type: mime_type.to_string(),
            locators,
        })
    }
}
