use tracing::{debug, error};

use crate::models::{ContentLocator, PdfPayload, ShareEvent, ShareIntent};
use crate::resolver::{read_payload, ContentResolver};

/// Turns incoming share intents into fully-read PDF payloads.
///
/// Every locator is processed on its own: a locator that cannot be opened
/// or read is logged and skipped, and its siblings are unaffected. Nothing
/// here returns an error.
pub struct ShareIntentAdapter<C> {
    resolver: C,
}

impl<C: ContentResolver> ShareIntentAdapter<C> {
    pub fn new(resolver: C) -> Self {
        Self { resolver }
    }

    /// The PDFs the intent carries, read one locator at a time as the
    /// iterator advances. Empty for anything that is not a PDF share.
    pub fn handle_intent<'a>(
        &'a self,
        intent: &ShareIntent,
    ) -> impl Iterator<Item = PdfPayload> + 'a {
        debug!(
            "Received intent - Action: {:?}, Type: {:?}",
            intent.action, intent.mime_type
        );

        ShareEvent::from_intent(intent)
            .into_iter()
            .flat_map(|event| event.locators)
            .filter_map(move |locator| self.process_locator(&locator))
    }

    #[cfg(test)]
    pub(crate) fn resolver(&self) -> &C {
        &self.resolver
    }

    fn process_locator(&self, locator: &ContentLocator) -> Option<PdfPayload> {
        debug!("Received PDF URI: {}", locator);

        match read_payload(&self.resolver, locator) {
            Ok(payload) => Some(payload),
            Err(e) => {
                error!("Error processing PDF {}: {}", locator, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use base64::Engine;

    use super::*;
    use crate::intent::{ACTION_SEND, ACTION_SEND_MULTIPLE, PDF_MIME_TYPE};
    use crate::resolver::testing::{Entry, MemoryResolver};
    use crate::resolver::DEFAULT_FILE_NAME;

    #[test]
    fn test_single_share_yields_one_payload() {
        let bytes = b"%PDF-1.7\n1 0 obj << /Type /Catalog >> endobj\n%%EOF".to_vec();
        let adapter = ShareIntentAdapter::new(
            MemoryResolver::default().with_document("content://media/9", "Invoice.pdf", &bytes),
        );

        let intent = ShareIntent::new(ACTION_SEND, PDF_MIME_TYPE).with_stream("content://media/9");
        let payloads: Vec<_> = adapter.handle_intent(&intent).collect();

        assert_eq!(payloads.len(), 1);
        let payload = &payloads[0];
        assert_eq!(payload.file_name, "Invoice.pdf");
        assert_eq!(payload.size(), bytes.len());

        let decoded = base64::engine::general_purpose::STANDARD
            .decode(&payload.base64)
            .unwrap();
        assert_eq!(decoded, bytes);
    }

    #[test]
    fn test_multi_share_isolates_failures() {
        let resolver = MemoryResolver::default()
            .with_document("content://m/1", "one.pdf", b"1")
            .with("content://m/3", Entry::FailsMidRead(vec![0; 10]))
            .with_document("content://m/4", "four.pdf", b"4444")
            .with("content://m/5", Entry::BrokenMetadata(b"55".to_vec()));
        let adapter = ShareIntentAdapter::new(resolver);

        // m/2 cannot be opened, m/3 breaks mid-read
        let intent = ShareIntent::new(ACTION_SEND_MULTIPLE, PDF_MIME_TYPE)
            .with_stream("content://m/1")
            .with_stream("content://m/2")
            .with_stream("content://m/3")
            .with_stream("content://m/4")
            .with_stream("content://m/5");
        let payloads: Vec<_> = adapter.handle_intent(&intent).collect();

        let names: Vec<&str> = payloads.iter().map(|p| p.file_name.as_str()).collect();
        assert_eq!(names, ["one.pdf", "four.pdf", DEFAULT_FILE_NAME]);
        assert_eq!(payloads[1].bytes, b"4444");
    }

    #[test]
    fn test_non_pdf_share_is_ignored() {
        let adapter = ShareIntentAdapter::new(
            MemoryResolver::default().with_document("content://img/1", "photo.png", b"\x89PNG"),
        );

        let intent = ShareIntent::new(ACTION_SEND, "image/png").with_stream("content://img/1");
        assert!(adapter.handle_intent(&intent).next().is_none());
    }

    #[test]
    fn test_unopenable_single_share_is_swallowed() {
        let adapter = ShareIntentAdapter::new(MemoryResolver::default());
        let intent = ShareIntent::new(ACTION_SEND, PDF_MIME_TYPE).with_stream("content://gone/1");
        assert!(adapter.handle_intent(&intent).next().is_none());
    }

    #[test]
    fn test_empty_document_is_still_delivered() {
        let adapter = ShareIntentAdapter::new(
            MemoryResolver::default().with_document("content://m/empty", "empty.pdf", b""),
        );
        let intent = ShareIntent::new(ACTION_SEND, PDF_MIME_TYPE).with_stream("content://m/empty");

        let payloads: Vec<_> = adapter.handle_intent(&intent).collect();
        assert_eq!(payloads.len(), 1);
        assert_eq!(payloads[0].size(), 0);
        assert_eq!(payloads[0].base64, "");
    }

    #[test]
    fn test_locators_are_read_one_at_a_time() {
        let adapter = ShareIntentAdapter::new(
            MemoryResolver::default()
                .with_document("content://m/1", "one.pdf", b"1")
                .with_document("content://m/2", "two.pdf", b"22")
                .with_document("content://m/3", "three.pdf", b"333"),
        );
        let intent = ShareIntent::new(ACTION_SEND_MULTIPLE, PDF_MIME_TYPE)
            .with_stream("content://m/1")
            .with_stream("content://m/2")
            .with_stream("content://m/3");

        let mut payloads = adapter.handle_intent(&intent);
        assert_eq!(adapter.resolver.opened(), 0);

        assert_eq!(payloads.next().unwrap().file_name, "one.pdf");
        assert_eq!(adapter.resolver.opened(), 1);

        assert_eq!(payloads.next().unwrap().file_name, "two.pdf");
        assert_eq!(adapter.resolver.opened(), 2);
    }
}
