use tauri::{
    plugin::{Builder, TauriPlugin},
    webview::PageLoadEvent,
    Manager, RunEvent, Runtime,
};
use tracing::info;

pub use models::*;

#[cfg(desktop)]
mod desktop;
#[cfg(mobile)]
mod mobile;
#[cfg(target_os = "android")]
mod android;

#[cfg(desktop)]
use desktop as platform;
#[cfg(mobile)]
use mobile as platform;

mod adapter;
mod bridge;
mod commands;
mod config;
mod delivery;
mod dispatch;
mod error;
mod intent;
mod models;
mod resolver;
mod script;

pub use adapter::ShareIntentAdapter;
pub use bridge::{PdfShare, PDF_RECEIVED_EVENT};
pub use config::{Config, DeliveryMode};
pub use delivery::{DeliveryOutcome, PendingPdfs, ScriptTarget, TimedDelivery, ViewProvider};
pub use dispatch::{Dispatcher, PdfEmitter, PendingDelivery};
pub use error::{Error, Result};
pub use intent::{ACTION_SEND, ACTION_SEND_MULTIPLE, PDF_MIME_TYPE};
pub use resolver::{ContentResolver, FsContentResolver, DEFAULT_FILE_NAME};
pub use script::{delivery_script, escape_js, CALLBACK_NAME};

#[cfg(desktop)]
pub use desktop::intent_from_paths;

/// Extensions to [`tauri::App`], [`tauri::AppHandle`] and [`tauri::Window`] to access the pdfshare APIs.
pub trait PdfShareExt<R: Runtime> {
    fn pdfshare(&self) -> &PdfShare<R>;
}

impl<R: Runtime, T: Manager<R>> crate::PdfShareExt<R> for T {
    fn pdfshare(&self) -> &PdfShare<R> {
        self.state::<PdfShare<R>>().inner()
    }
}

/// Initializes the pdfshare plugin.
///
/// PDFs shared into the app (Android share sheet, or files passed on the
/// command line on desktop) are read, base64 encoded and handed to the page:
/// - `Timed` delivery (default) calls `window.handleReceivedPdf(name, data, size)`
///   after a fixed delay
/// - `OnReady` delivery queues PDFs until the page invokes `ready`, then emits
///   `pdf-received` events
///
/// The intent is checked at startup and again whenever the app resumes.
pub fn init<R: Runtime>() -> TauriPlugin<R, Option<Config>> {
    Builder::<R, Option<Config>>::new("pdfshare")
        .invoke_handler(tauri::generate_handler![
            commands::ready,
            commands::get_pending_pdfs,
            commands::has_pending_pdfs,
            commands::clear_pending_pdfs,
        ])
        .setup(|app, api| {
            let config = api.config().clone().unwrap_or_default();
            info!(
                "pdfshare: {:?} delivery to webview '{}'",
                config.delivery, config.webview_label
            );

            let platform = platform::init(app, api)?;
            app.manage(PdfShare::new(app.clone(), config, platform));
            app.pdfshare().check_platform_intent();
            Ok(())
        })
        .on_page_load(|webview, payload| {
            if matches!(payload.event(), PageLoadEvent::Started) {
                if let Some(pdfshare) = webview.try_state::<PdfShare<R>>() {
                    pdfshare.page_load_started(webview.label());
                }
            }
        })
        .on_event(|app, event| {
            if let RunEvent::Resumed = event {
                if let Some(pdfshare) = app.try_state::<PdfShare<R>>() {
                    pdfshare.check_platform_intent();
                }
            }
        })
        .build()
}
