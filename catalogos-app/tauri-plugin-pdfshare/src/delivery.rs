//! Handing payloads to the web layer.
//!
//! Two strategies:
//! - [`TimedDelivery`] waits a fixed delay, then evaluates a script that calls
//!   the page callback (with one in-script retry).
//! - [`PendingPdfs`] holds payloads until the page says it is ready, then
//!   lets them through directly.

use std::collections::VecDeque;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::error::Result;
use crate::models::{PdfPayload, ReceivedPdf};
use crate::script::delivery_script;

/// Something a script can be evaluated against.
pub trait ScriptTarget {
    fn eval_script(&self, script: &str) -> Result<()>;
}

/// Hands out the current view at delivery time. `None` while the view does
/// not exist (yet).
pub trait ViewProvider: Send + Sync + 'static {
    type View: ScriptTarget + Send;

    fn current_view(&self) -> Option<Self::View>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Sent,
    ViewUnavailable,
    EvalFailed,
}

pub struct TimedDelivery<P> {
    provider: P,
    initial_delay: Duration,
    retry_delay: Duration,
}

impl<P: ViewProvider> TimedDelivery<P> {
    pub fn new(provider: P, initial_delay: Duration, retry_delay: Duration) -> Self {
        Self {
            provider,
            initial_delay,
            retry_delay,
        }
    }

    /// Wait the initial delay, then run the delivery script once.
    ///
    /// Never fails: a missing view or a rejected script is logged and
    /// reported through the outcome only.
    pub async fn deliver(&self, payload: &PdfPayload) -> DeliveryOutcome {
        tokio::time::sleep(self.initial_delay).await;

        let Some(view) = self.provider.current_view() else {
            warn!(
                "Webview not available, dropping shared PDF: {}",
                payload.file_name
            );
            return DeliveryOutcome::ViewUnavailable;
        };

        let script = delivery_script(payload, self.retry_delay);
        match view.eval_script(&script) {
            Ok(()) => {
                info!("Sent PDF data to JavaScript: {}", payload.file_name);
                DeliveryOutcome::Sent
            }
            Err(e) => {
                error!("Error sending to JavaScript: {}", e);
                DeliveryOutcome::EvalFailed
            }
        }
    }
}

/// Ready gate for the page-driven flow.
#[derive(Debug, Default)]
pub struct PendingPdfs {
    ready: bool,
    queue: VecDeque<ReceivedPdf>,
}

impl PendingPdfs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Queue the PDF, or give it back if the page is already listening.
    pub fn offer(&mut self, pdf: ReceivedPdf) -> Option<ReceivedPdf> {
        if self.ready {
            return Some(pdf);
        }
        self.queue.push_back(pdf);
        None
    }

    /// Open the gate and return everything that was waiting, oldest first.
    pub fn mark_ready(&mut self) -> Vec<ReceivedPdf> {
        self.ready = true;
        self.take_all()
    }

    /// Queue again until the next `mark_ready`.
    pub fn close(&mut self) {
        self.ready = false;
    }

    pub fn take_all(&mut self) -> Vec<ReceivedPdf> {
        self.queue.drain(..).collect()
    }

    pub fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}
