use serde::de::DeserializeOwned;
use tauri::{plugin::PluginApi, AppHandle, Runtime};

use crate::models::ShareIntent;

#[cfg(target_os = "android")]
pub type PlatformResolver = crate::android::AndroidContentResolver;

// iOS hands shared documents over as file URLs
#[cfg(target_os = "ios")]
pub type PlatformResolver = crate::resolver::FsContentResolver;

/// Initialize the mobile side.
///
/// Nothing is registered with the native layer: on Android the activity
/// intent and the content resolver are reached over JNI from Rust.
pub fn init<R: Runtime, C: DeserializeOwned>(
    _app: &AppHandle<R>,
    _api: PluginApi<R, C>,
) -> crate::Result<Platform> {
    Ok(Platform)
}

pub struct Platform;

impl Platform {
    pub fn resolver(&self) -> PlatformResolver {
        PlatformResolver::default()
    }

    /// The activity's current share intent, consumed on read.
    #[cfg(target_os = "android")]
    pub fn take_intent(&self) -> Option<ShareIntent> {
        match crate::android::take_share_intent() {
            Ok(intent) => intent,
            Err(e) => {
                tracing::error!("Failed to read activity intent: {}", e);
                None
            }
        }
    }

    /// No share intents reach the app process on iOS.
    #[cfg(target_os = "ios")]
    pub fn take_intent(&self) -> Option<ShareIntent> {
        None
    }
}
