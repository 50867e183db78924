//! Routing read payloads to the page according to the delivery mode.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, error, info};

use crate::adapter::ShareIntentAdapter;
use crate::config::{Config, DeliveryMode};
use crate::delivery::{DeliveryOutcome, PendingPdfs, TimedDelivery, ViewProvider};
use crate::error::Result;
use crate::models::{PdfPayload, PendingPdfsResponse, ReceivedPdf, ShareIntent};
use crate::resolver::ContentResolver;

/// A timed delivery that still has to be spawned on a runtime.
pub type PendingDelivery = Pin<Box<dyn Future<Output = DeliveryOutcome> + Send + 'static>>;

/// Pushes a PDF to a page that has signalled it is ready.
pub trait PdfEmitter: Send + Sync + 'static {
    fn emit_pdf(&self, pdf: &ReceivedPdf) -> Result<()>;
}

pub struct Dispatcher<P, E> {
    mode: DeliveryMode,
    webview_label: String,
    timed: Arc<TimedDelivery<P>>,
    emitter: E,
    pending: Mutex<PendingPdfs>,
}

impl<P: ViewProvider, E: PdfEmitter> Dispatcher<P, E> {
    pub fn new(config: &Config, provider: P, emitter: E) -> Self {
        Self {
            mode: config.delivery,
            webview_label: config.webview_label.clone(),
            timed: Arc::new(TimedDelivery::new(
                provider,
                config.initial_delay(),
                config.retry_delay(),
            )),
            emitter,
            pending: Mutex::new(PendingPdfs::new()),
        }
    }

    /// Read the intent's PDFs and route each one as soon as it is read.
    ///
    /// Timed deliveries are handed to `spawn`. Returns how many documents
    /// were read.
    pub fn route<C, S>(
        &self,
        adapter: &ShareIntentAdapter<C>,
        intent: &ShareIntent,
        mut spawn: S,
    ) -> usize
    where
        C: ContentResolver,
        S: FnMut(PendingDelivery),
    {
        let mut count = 0;
        for payload in adapter.handle_intent(intent) {
            count += 1;
            if let Some(delivery) = self.dispatch(payload) {
                spawn(delivery);
            }
        }
        count
    }

    /// Route one payload. Only the timed mode has work left for the caller.
    pub fn dispatch(&self, payload: PdfPayload) -> Option<PendingDelivery> {
        match self.mode {
            DeliveryMode::Timed => {
                let timed = self.timed.clone();
                Some(Box::pin(async move { timed.deliver(&payload).await }))
            }
            DeliveryMode::OnReady => {
                let offered = self.pending().offer(ReceivedPdf::from(payload));
                if let Some(pdf) = offered {
                    match self.emitter.emit_pdf(&pdf) {
                        Ok(()) => info!("Sent PDF data to JavaScript: {}", pdf.file_name),
                        Err(e) => error!("Error sending to JavaScript: {}", e),
                    }
                }
                None
            }
        }
    }

    /// The page is listening: hand over the backlog and let later PDFs
    /// through as events.
    pub fn mark_ready(&self) -> Vec<ReceivedPdf> {
        let pdfs = self.pending().mark_ready();
        info!("Page ready, handing over {} pending PDF(s)", pdfs.len());
        pdfs
    }

    pub fn take_pending(&self) -> PendingPdfsResponse {
        let pdfs = self.pending().take_all();
        PendingPdfsResponse {
            has_pending: !pdfs.is_empty(),
            pdfs,
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending().has_pending()
    }

    pub fn clear_pending(&self) {
        self.pending().clear();
    }

    /// A fresh page load has no listener until it calls `ready` again.
    pub fn page_load_started(&self, label: &str) {
        if label != self.webview_label {
            return;
        }
        let mut pending = self.pending();
        if pending.is_ready() {
            debug!("Webview {} reloading, closing ready gate", label);
            pending.close();
        }
    }

    fn pending(&self) -> MutexGuard<'_, PendingPdfs> {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use super::*;
    use crate::delivery::testing::{FakeProvider, RecordingView};
    use crate::error::Error;
    use crate::intent::{ACTION_SEND, ACTION_SEND_MULTIPLE, PDF_MIME_TYPE};
    use crate::resolver::testing::{Entry, MemoryResolver};

    #[derive(Clone, Default)]
    struct RecordingEmitter {
        emitted: Arc<Mutex<Vec<String>>>,
        reject: bool,
    }

    impl PdfEmitter for RecordingEmitter {
        fn emit_pdf(&self, pdf: &ReceivedPdf) -> Result<()> {
            if self.reject {
                return Err(Error::Script("no listeners".into()));
            }
            self.emitted.lock().unwrap().push(pdf.file_name.clone());
            Ok(())
        }
    }

    fn config(delivery: DeliveryMode) -> Config {
        Config {
            delivery,
            ..Config::default()
        }
    }

    fn one_broken_of_four() -> ShareIntentAdapter<MemoryResolver> {
        ShareIntentAdapter::new(
            MemoryResolver::default()
                .with_document("content://m/1", "one.pdf", b"1")
                .with("content://m/2", Entry::FailsMidRead(vec![0; 4]))
                .with_document("content://m/3", "three.pdf", b"333")
                .with_document("content://m/4", "four.pdf", b"4444"),
        )
    }

    fn multi_share() -> ShareIntent {
        ShareIntent::new(ACTION_SEND_MULTIPLE, PDF_MIME_TYPE)
            .with_stream("content://m/1")
            .with_stream("content://m/2")
            .with_stream("content://m/3")
            .with_stream("content://m/4")
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_mode_schedules_one_delivery_per_document() {
        let view = RecordingView::default();
        let dispatcher = Dispatcher::new(
            &config(DeliveryMode::Timed),
            FakeProvider::with_view(view.clone()),
            RecordingEmitter::default(),
        );
        let adapter = one_broken_of_four();

        let mut handles = Vec::new();
        let read = dispatcher.route(&adapter, &multi_share(), |delivery| {
            handles.push(tokio::spawn(delivery));
        });
        assert_eq!(read, 3);
        assert_eq!(handles.len(), 3);

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert!(view.scripts.lock().unwrap().is_empty());

        for handle in handles {
            assert_eq!(handle.await.unwrap(), DeliveryOutcome::Sent);
        }

        let scripts = view.scripts.lock().unwrap();
        assert_eq!(scripts.len(), 3);
        for name in ["'one.pdf'", "'three.pdf'", "'four.pdf'"] {
            assert_eq!(scripts.iter().filter(|s| s.contains(name)).count(), 1);
        }
    }

    #[test]
    fn test_each_delivery_is_scheduled_right_after_its_read() {
        let dispatcher = Dispatcher::new(
            &config(DeliveryMode::Timed),
            FakeProvider::default(),
            RecordingEmitter::default(),
        );
        let adapter = one_broken_of_four();

        // Streams opened by the time each delivery is handed over
        let mut opened_at_spawn = Vec::new();
        dispatcher.route(&adapter, &multi_share(), |_delivery| {
            opened_at_spawn.push(adapter.resolver().opened());
        });
        assert_eq!(opened_at_spawn, [1, 3, 4]);
    }

    #[test]
    fn test_on_ready_queues_then_emits() {
        let emitter = RecordingEmitter::default();
        let dispatcher = Dispatcher::new(
            &config(DeliveryMode::OnReady),
            FakeProvider::default(),
            emitter.clone(),
        );
        let adapter = one_broken_of_four();

        let read = dispatcher.route(&adapter, &multi_share(), |_| {
            panic!("nothing is spawned while waiting for the page")
        });
        assert_eq!(read, 3);
        assert!(dispatcher.has_pending());
        assert!(emitter.emitted.lock().unwrap().is_empty());

        let backlog: Vec<String> = dispatcher
            .mark_ready()
            .into_iter()
            .map(|pdf| pdf.file_name)
            .collect();
        assert_eq!(backlog, ["one.pdf", "three.pdf", "four.pdf"]);
        assert!(!dispatcher.has_pending());

        let single = ShareIntent::new(ACTION_SEND, PDF_MIME_TYPE).with_stream("content://m/4");
        dispatcher.route(&adapter, &single, |_| panic!("nothing to spawn once ready"));
        assert_eq!(*emitter.emitted.lock().unwrap(), ["four.pdf"]);
        assert!(!dispatcher.has_pending());
    }

    #[test]
    fn test_on_ready_emit_failure_is_swallowed() {
        let emitter = RecordingEmitter {
            reject: true,
            ..Default::default()
        };
        let dispatcher =
            Dispatcher::new(&config(DeliveryMode::OnReady), FakeProvider::default(), emitter);
        dispatcher.mark_ready();

        assert!(dispatcher.dispatch(PdfPayload::new("a.pdf", vec![1])).is_none());
        assert!(!dispatcher.has_pending());
    }

    #[test]
    fn test_take_and_clear_pending() {
        let dispatcher = Dispatcher::new(
            &config(DeliveryMode::OnReady),
            FakeProvider::default(),
            RecordingEmitter::default(),
        );
        assert!(!dispatcher.take_pending().has_pending);

        dispatcher.dispatch(PdfPayload::new("a.pdf", vec![1]));
        dispatcher.dispatch(PdfPayload::new("b.pdf", vec![2]));
        let response = dispatcher.take_pending();
        assert!(response.has_pending);
        assert_eq!(response.pdfs.len(), 2);
        assert!(!dispatcher.has_pending());

        dispatcher.dispatch(PdfPayload::new("c.pdf", vec![3]));
        dispatcher.clear_pending();
        assert!(!dispatcher.has_pending());
    }

    #[test]
    fn test_page_load_closes_gate_only_for_configured_webview() {
        let emitter = RecordingEmitter::default();
        let dispatcher = Dispatcher::new(
            &config(DeliveryMode::OnReady),
            FakeProvider::default(),
            emitter.clone(),
        );
        dispatcher.mark_ready();

        // Another window reloading leaves the main page listening
        dispatcher.page_load_started("settings");
        dispatcher.dispatch(PdfPayload::new("a.pdf", vec![1]));
        assert_eq!(*emitter.emitted.lock().unwrap(), ["a.pdf"]);

        dispatcher.page_load_started("main");
        dispatcher.dispatch(PdfPayload::new("b.pdf", vec![2]));
        assert_eq!(emitter.emitted.lock().unwrap().len(), 1);
        assert!(dispatcher.has_pending());

        let backlog = dispatcher.mark_ready();
        assert_eq!(backlog.len(), 1);
        assert_eq!(backlog[0].file_name, "b.pdf");
    }
}
