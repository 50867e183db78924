use std::path::Path;
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use tauri::{plugin::PluginApi, AppHandle, Runtime};
use tracing::debug;

use crate::intent::{ACTION_SEND, ACTION_SEND_MULTIPLE, PDF_MIME_TYPE};
use crate::models::ShareIntent;
use crate::resolver::FsContentResolver;

pub type PlatformResolver = FsContentResolver;

/// Initialize the desktop side.
///
/// Desktop has no share sheet. PDFs passed on the command line ("open with")
/// are turned into a share intent that is handed out once.
pub fn init<R: Runtime, C: DeserializeOwned>(
    _app: &AppHandle<R>,
    _api: PluginApi<R, C>,
) -> crate::Result<Platform> {
    let launch_intent = intent_from_paths(std::env::args_os().skip(1));
    if let Some(intent) = &launch_intent {
        debug!("Launched with {} PDF argument(s)", intent.streams.len());
    }

    Ok(Platform {
        launch_intent: Mutex::new(launch_intent),
    })
}

pub struct Platform {
    launch_intent: Mutex<Option<ShareIntent>>,
}

impl Platform {
    pub fn resolver(&self) -> PlatformResolver {
        FsContentResolver
    }

    /// The launch intent, at most once.
    pub fn take_intent(&self) -> Option<ShareIntent> {
        self.launch_intent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }
}

/// Build a share intent from existing `.pdf` files among `paths`.
pub fn intent_from_paths<I, P>(paths: I) -> Option<ShareIntent>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let streams: Vec<String> = paths
        .into_iter()
        .filter(|p| is_pdf_file(p.as_ref()))
        .map(|p| p.as_ref().to_string_lossy().into_owned())
        .collect();

    let action = match streams.len() {
        0 => return None,
        1 => ACTION_SEND,
        _ => ACTION_SEND_MULTIPLE,
    };

    Some(ShareIntent {
        action: Some(action.to_string()),
        mime_type: Some(PDF_MIME_TYPE.to_string()),
        streams,
    })
}

fn is_pdf_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}
