use tauri::{command, AppHandle, Runtime};

use crate::models::*;
use crate::PdfShareExt;
use crate::Result;

/// Signal that the page has registered its `pdf-received` listener.
///
/// Returns the PDFs that arrived before the page was ready. Later PDFs are
/// emitted as events.
#[command]
pub(crate) async fn ready<R: Runtime>(app: AppHandle<R>) -> Result<Vec<ReceivedPdf>> {
    Ok(app.pdfshare().mark_ready())
}

/// Take the PDFs still queued for the page.
#[command]
pub(crate) async fn get_pending_pdfs<R: Runtime>(app: AppHandle<R>) -> Result<PendingPdfsResponse> {
    Ok(app.pdfshare().take_pending())
}

#[command]
pub(crate) async fn has_pending_pdfs<R: Runtime>(app: AppHandle<R>) -> Result<bool> {
    Ok(app.pdfshare().has_pending())
}

/// Drop queued PDFs without delivering them.
#[command]
pub(crate) async fn clear_pending_pdfs<R: Runtime>(app: AppHandle<R>) -> Result<()> {
    app.pdfshare().clear_pending();
    Ok(())
}
