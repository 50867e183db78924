use tauri::{AppHandle, Emitter, Manager, Runtime, WebviewWindow};

use crate::adapter::ShareIntentAdapter;
use crate::config::Config;
use crate::delivery::{ScriptTarget, ViewProvider};
use crate::dispatch::{Dispatcher, PdfEmitter};
use crate::error::Result;
use crate::models::{PendingPdfsResponse, ReceivedPdf, ShareIntent};
use crate::platform::{Platform, PlatformResolver};

/// Event emitted with a [`ReceivedPdf`] body once the page has called `ready`.
pub const PDF_RECEIVED_EVENT: &str = "pdf-received";

impl<R: Runtime> ScriptTarget for WebviewWindow<R> {
    fn eval_script(&self, script: &str) -> Result<()> {
        self.eval(script).map_err(Into::into)
    }
}

impl<R: Runtime> PdfEmitter for AppHandle<R> {
    fn emit_pdf(&self, pdf: &ReceivedPdf) -> Result<()> {
        self.emit(PDF_RECEIVED_EVENT, pdf).map_err(Into::into)
    }
}

/// Looks the webview window up by label each time it is asked.
pub struct WebviewProvider<R: Runtime> {
    app: AppHandle<R>,
    label: String,
}

impl<R: Runtime> ViewProvider for WebviewProvider<R> {
    type View = WebviewWindow<R>;

    fn current_view(&self) -> Option<WebviewWindow<R>> {
        self.app.get_webview_window(&self.label)
    }
}

/// Access to the pdfshare APIs.
pub struct PdfShare<R: Runtime> {
    platform: Platform,
    adapter: ShareIntentAdapter<PlatformResolver>,
    dispatcher: Dispatcher<WebviewProvider<R>, AppHandle<R>>,
}

impl<R: Runtime> PdfShare<R> {
    pub(crate) fn new(app: AppHandle<R>, config: Config, platform: Platform) -> Self {
        let provider = WebviewProvider {
            app: app.clone(),
            label: config.webview_label.clone(),
        };

        Self {
            adapter: ShareIntentAdapter::new(platform.resolver()),
            platform,
            dispatcher: Dispatcher::new(&config, provider, app),
        }
    }

    /// Read and deliver every PDF carried by `intent`.
    ///
    /// Returns how many documents were read. Anything that is not a PDF
    /// share is ignored.
    pub fn handle_intent(&self, intent: &ShareIntent) -> usize {
        self.dispatcher.route(&self.adapter, intent, |delivery| {
            tauri::async_runtime::spawn(delivery);
        })
    }

    /// Pick up the intent the platform currently holds, if any.
    pub(crate) fn check_platform_intent(&self) {
        if let Some(intent) = self.platform.take_intent() {
            self.handle_intent(&intent);
        }
    }

    /// The page is listening: hand over the backlog and let later PDFs
    /// through as events.
    pub fn mark_ready(&self) -> Vec<ReceivedPdf> {
        self.dispatcher.mark_ready()
    }

    pub fn take_pending(&self) -> PendingPdfsResponse {
        self.dispatcher.take_pending()
    }

    pub fn has_pending(&self) -> bool {
        self.dispatcher.has_pending()
    }

    pub fn clear_pending(&self) {
        self.dispatcher.clear_pending()
    }

    pub(crate) fn page_load_started(&self, label: &str) {
        self.dispatcher.page_load_started(label)
    }
}
