//! JavaScript generated for the webview.

use std::time::Duration;

use crate::models::PdfPayload;

/// Page-defined function that receives shared PDFs:
/// `window.handleReceivedPdf(fileName, base64Data, fileSize)`.
pub const CALLBACK_NAME: &str = "handleReceivedPdf";

/// Escape a string for use inside a single-quoted JS string literal.
///
/// Order matters: backslashes first, so the escapes added afterwards are not
/// doubled.
pub fn escape_js(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}

fn call_expression(payload: &PdfPayload) -> String {
    // base64 output has no quotes or backslashes, only the name needs escaping
    format!(
        "window.{cb}('{name}','{data}',{size});",
        cb = CALLBACK_NAME,
        name = escape_js(&payload.file_name),
        data = payload.base64,
        size = payload.size(),
    )
}

/// Script that calls the callback if the page already defines it, and
/// otherwise tries exactly once more after `retry_delay`.
pub fn delivery_script(payload: &PdfPayload, retry_delay: Duration) -> String {
    let call = call_expression(payload);
    format!(
        "if(window.{cb}){{{call}}}else{{console.log('{cb} not ready, retrying...');setTimeout(function(){{if(window.{cb}){{{call}}}}},{ms});}}",
        cb = CALLBACK_NAME,
        call = call,
        ms = retry_delay.as_millis(),
    )
}
