//! Turning content locators into names and bytes.
//!
//! The [`ContentResolver`] trait is the seam between the adapter and the
//! platform: Android goes through `ContentResolver` over JNI, desktop (and
//! iOS, where shares arrive as file URLs) read from the filesystem.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

use tauri::Url;
use tracing::{debug, error};

use crate::error::{Error, Result};
use crate::models::{ContentLocator, PdfPayload};

/// Name used when the locator exposes no usable display name.
pub const DEFAULT_FILE_NAME: &str = "shared_document.pdf";

/// Read granularity when draining a content stream.
pub const READ_CHUNK_SIZE: usize = 16 * 1024;

pub trait ContentResolver: Send + Sync {
    /// Look up the human-readable name of the content.
    ///
    /// `Ok(None)` means the query ran but produced no rows or no name column.
    fn query_display_name(&self, locator: &ContentLocator) -> Result<Option<String>>;

    /// Open a byte stream for the content. Dropping the stream closes it.
    fn open_stream(&self, locator: &ContentLocator) -> Result<Box<dyn Read + Send>>;
}

/// Resolve the display name, falling back to [`DEFAULT_FILE_NAME`].
///
/// Query failures are logged here and never propagate.
pub fn resolve_display_name<C>(resolver: &C, locator: &ContentLocator) -> String
where
    C: ContentResolver + ?Sized,
{
    match resolver.query_display_name(locator) {
        Ok(Some(name)) if !name.is_empty() => name,
        Ok(_) => DEFAULT_FILE_NAME.to_string(),
        Err(e) => {
            error!("Error getting filename: {}", e);
            DEFAULT_FILE_NAME.to_string()
        }
    }
}

/// Drain a stream to the end.
pub fn drain_stream(stream: &mut dyn Read) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut chunk = vec![0u8; READ_CHUNK_SIZE];

    loop {
        match stream.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => buffer.extend_from_slice(&chunk[..n]),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    Ok(buffer)
}

/// Read one locator into a [`PdfPayload`].
pub fn read_payload<C>(resolver: &C, locator: &ContentLocator) -> Result<PdfPayload>
where
    C: ContentResolver + ?Sized,
{
    let file_name = resolve_display_name(resolver, locator);

    let bytes = {
        let mut stream = resolver.open_stream(locator)?;
        drain_stream(&mut stream)?
        // stream closed here
    };

    debug!(
        "PDF read successfully: {} ({} bytes)",
        file_name,
        bytes.len()
    );

    Ok(PdfPayload::new(file_name, bytes))
}

/// Resolver for plain paths and `file://` URLs.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsContentResolver;

impl FsContentResolver {
    fn path_for(locator: &ContentLocator) -> Result<PathBuf> {
        let raw = locator.as_str();
        if raw.starts_with("file:") {
            let url = Url::parse(raw)
                .map_err(|e| Error::StreamUnavailable(format!("{}: {}", raw, e)))?;
            return url
                .to_file_path()
                .map_err(|_| Error::StreamUnavailable(raw.to_string()));
        }
        Ok(PathBuf::from(raw))
    }
}

impl ContentResolver for FsContentResolver {
    fn query_display_name(&self, locator: &ContentLocator) -> Result<Option<String>> {
        let path = Self::path_for(locator)?;
        Ok(path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned()))
    }

    fn open_stream(&self, locator: &ContentLocator) -> Result<Box<dyn Read + Send>> {
        let path = Self::path_for(locator)?;
        let file = File::open(&path)
            .map_err(|e| Error::StreamUnavailable(format!("{}: {}", display(&path), e)))?;
        Ok(Box::new(file))
    }
}

fn display(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
