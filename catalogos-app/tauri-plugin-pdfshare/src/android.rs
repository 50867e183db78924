//! Android intent and content access over JNI.
//!
//! The hosting activity is whatever `ndk_context` points at. Calls are
//! synchronous and run on the calling thread, attaching it to the VM if
//! needed. Any pending Java exception is cleared before an error is
//! returned.
//!
//! The host activity must call `setIntent(intent)` from `onNewIntent` so a
//! share received while running is visible through `getIntent()` on resume.

use std::io::{self, Read};

use jni::objects::{GlobalRef, JObject, JString, JValue};
use jni::{JNIEnv, JavaVM};
use tracing::debug;

use crate::error::{Error, Result};
use crate::intent::{ACTION_SEND, ACTION_SEND_MULTIPLE};
use crate::models::{ContentLocator, ShareIntent};
use crate::resolver::{ContentResolver, READ_CHUNK_SIZE};

/// `Intent.EXTRA_STREAM`
const EXTRA_STREAM: &str = "android.intent.extra.STREAM";

/// `OpenableColumns.DISPLAY_NAME`
const DISPLAY_NAME_COLUMN: &str = "_display_name";

/// `ContentResolver.query(Uri, String[], String, String[], String)`
const QUERY_SIGNATURE: &str = "(Landroid/net/Uri;[Ljava/lang/String;Ljava/lang/String;\
[Ljava/lang/String;Ljava/lang/String;)Landroid/database/Cursor;";

/// Local references one bridge call may hold at once.
const LOCAL_FRAME_CAPACITY: i32 = 16;

fn with_env<T, F>(f: F) -> Result<T>
where
    F: for<'local> FnOnce(&mut JNIEnv<'local>, &JObject<'local>) -> jni::errors::Result<T>,
{
    let ctx = ndk_context::android_context();
    // SAFETY: the pointer is the process-wide JavaVM registered by the NDK glue.
    let vm = unsafe { JavaVM::from_raw(ctx.vm().cast()) }
        .map_err(|e| Error::Bridge(format!("failed to obtain JavaVM: {}", e)))?;
    let mut env = vm
        .attach_current_thread()
        .map_err(|e| Error::Bridge(format!("failed to attach JNI thread: {}", e)))?;

    let ptr = ctx.context();
    if ptr.is_null() {
        return Err(Error::Bridge("Android context is null".into()));
    }

    // The thread may already be attached, in which case nothing frees local
    // references until it detaches. Every call gets its own frame.
    let result = env.with_local_frame(LOCAL_FRAME_CAPACITY, |env| {
        // SAFETY: a valid global reference to the hosting activity.
        let activity = unsafe { JObject::from_raw(ptr.cast()) };
        f(env, &activity)
    });
    if result.is_err() && env.exception_check().unwrap_or(false) {
        let _ = env.exception_describe();
        let _ = env.exception_clear();
    }
    result.map_err(|e| Error::Bridge(e.to_string()))
}

fn string_result(
    env: &mut JNIEnv<'_>,
    obj: &JObject<'_>,
    method: &str,
) -> jni::errors::Result<Option<String>> {
    let value = env.call_method(obj, method, "()Ljava/lang/String;", &[])?.l()?;
    if value.is_null() {
        return Ok(None);
    }
    let value = JString::from(value);
    let text: String = env.get_string(&value)?.into();
    Ok(Some(text))
}

fn to_java_string(env: &mut JNIEnv<'_>, obj: &JObject<'_>) -> jni::errors::Result<String> {
    Ok(string_result(env, obj, "toString")?.unwrap_or_default())
}

fn parse_uri<'local>(
    env: &mut JNIEnv<'local>,
    locator: &ContentLocator,
) -> jni::errors::Result<JObject<'local>> {
    let raw = env.new_string(locator.as_str())?;
    env.call_static_method(
        "android/net/Uri",
        "parse",
        "(Ljava/lang/String;)Landroid/net/Uri;",
        &[JValue::Object(&raw)],
    )?
    .l()
}

fn content_resolver<'local>(
    env: &mut JNIEnv<'local>,
    activity: &JObject<'local>,
) -> jni::errors::Result<JObject<'local>> {
    env.call_method(
        activity,
        "getContentResolver",
        "()Landroid/content/ContentResolver;",
        &[],
    )?
    .l()
}

/// Read the activity's current intent. Share intents are marked consumed
/// (action cleared) so a later resume does not deliver them again.
pub fn take_share_intent() -> Result<Option<ShareIntent>> {
    with_env(|env, activity| {
        let intent = env
            .call_method(activity, "getIntent", "()Landroid/content/Intent;", &[])?
            .l()?;
        if intent.is_null() {
            return Ok(None);
        }

        let action = string_result(env, &intent, "getAction")?;
        let mime_type = string_result(env, &intent, "getType")?;
        let extra = env.new_string(EXTRA_STREAM)?;
        let mut streams = Vec::new();

        let is_share = match action.as_deref() {
            Some(ACTION_SEND) => {
                let uri = env
                    .call_method(
                        &intent,
                        "getParcelableExtra",
                        "(Ljava/lang/String;)Landroid/os/Parcelable;",
                        &[JValue::Object(&extra)],
                    )?
                    .l()?;
                if !uri.is_null() {
                    streams.push(to_java_string(env, &uri)?);
                }
                true
            }
            Some(ACTION_SEND_MULTIPLE) => {
                let list = env
                    .call_method(
                        &intent,
                        "getParcelableArrayListExtra",
                        "(Ljava/lang/String;)Ljava/util/ArrayList;",
                        &[JValue::Object(&extra)],
                    )?
                    .l()?;
                if !list.is_null() {
                    let size = env.call_method(&list, "size", "()I", &[])?.i()?;
                    for index in 0..size {
                        let item = env
                            .call_method(
                                &list,
                                "get",
                                "(I)Ljava/lang/Object;",
                                &[JValue::Int(index)],
                            )?
                            .l()?;
                        if !item.is_null() {
                            streams.push(to_java_string(env, &item)?);
                        }
                        env.delete_local_ref(item)?;
                    }
                }
                true
            }
            _ => false,
        };

        if is_share {
            let cleared = JObject::null();
            env.call_method(
                &intent,
                "setAction",
                "(Ljava/lang/String;)Landroid/content/Intent;",
                &[JValue::Object(&cleared)],
            )?;
        }

        Ok(Some(ShareIntent {
            action,
            mime_type,
            streams,
        }))
    })
}

/// `ContentResolver`-backed access to `content://` URIs.
#[derive(Debug, Clone, Copy, Default)]
pub struct AndroidContentResolver;

impl ContentResolver for AndroidContentResolver {
    fn query_display_name(&self, locator: &ContentLocator) -> Result<Option<String>> {
        with_env(|env, activity| {
            let resolver = content_resolver(env, activity)?;
            let uri = parse_uri(env, locator)?;
            let none = JObject::null();

            let cursor = env
                .call_method(
                    &resolver,
                    "query",
                    QUERY_SIGNATURE,
                    &[
                        JValue::Object(&uri),
                        JValue::Object(&none),
                        JValue::Object(&none),
                        JValue::Object(&none),
                        JValue::Object(&none),
                    ],
                )?
                .l()?;
            if cursor.is_null() {
                return Ok(None);
            }

            let name = display_name_from_cursor(env, &cursor);
            env.call_method(&cursor, "close", "()V", &[])?;
            name
        })
        .map_err(|e| Error::Metadata(e.to_string()))
    }

    fn open_stream(&self, locator: &ContentLocator) -> Result<Box<dyn Read + Send>> {
        let stream = with_env(|env, activity| {
            let resolver = content_resolver(env, activity)?;
            let uri = parse_uri(env, locator)?;
            let input = env
                .call_method(
                    &resolver,
                    "openInputStream",
                    "(Landroid/net/Uri;)Ljava/io/InputStream;",
                    &[JValue::Object(&uri)],
                )?
                .l()?;
            if input.is_null() {
                return Ok(None);
            }
            Ok(Some(env.new_global_ref(input)?))
        })
        .map_err(|e| Error::StreamUnavailable(format!("{}: {}", locator, e)))?;

        let stream = stream.ok_or_else(|| Error::StreamUnavailable(locator.to_string()))?;
        Ok(Box::new(JavaInputStream { stream }))
    }
}

fn display_name_from_cursor(
    env: &mut JNIEnv<'_>,
    cursor: &JObject<'_>,
) -> jni::errors::Result<Option<String>> {
    if !env.call_method(cursor, "moveToFirst", "()Z", &[])?.z()? {
        return Ok(None);
    }

    let column = env.new_string(DISPLAY_NAME_COLUMN)?;
    let index = env
        .call_method(
            cursor,
            "getColumnIndex",
            "(Ljava/lang/String;)I",
            &[JValue::Object(&column)],
        )?
        .i()?;
    if index < 0 {
        return Ok(None);
    }

    let value = env
        .call_method(cursor, "getString", "(I)Ljava/lang/String;", &[JValue::Int(index)])?
        .l()?;
    if value.is_null() {
        return Ok(None);
    }
    let value = JString::from(value);
    let name: String = env.get_string(&value)?.into();
    Ok(Some(name))
}

/// `java.io.InputStream` exposed as [`Read`]. Closed on drop.
struct JavaInputStream {
    stream: GlobalRef,
}

impl Read for JavaInputStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let len = buf.len().min(READ_CHUNK_SIZE) as i32;
        let stream = &self.stream;

        with_env(|env, _activity| {
            let array = env.new_byte_array(len)?;
            let read = env
                .call_method(
                    stream.as_obj(),
                    "read",
                    "([BII)I",
                    &[JValue::Object(&array), JValue::Int(0), JValue::Int(len)],
                )?
                .i()?;
            // -1 is end of stream
            if read <= 0 {
                return Ok(0);
            }

            let mut chunk = vec![0i8; read as usize];
            env.get_byte_array_region(&array, 0, &mut chunk)?;
            for (dst, src) in buf.iter_mut().zip(&chunk) {
                *dst = *src as u8;
            }
            Ok(read as usize)
        })
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
    }
}

impl Drop for JavaInputStream {
    fn drop(&mut self) {
        let stream = &self.stream;
        let closed = with_env(|env, _activity| {
            env.call_method(stream.as_obj(), "close", "()V", &[])?;
            Ok(())
        });
        if let Err(e) = closed {
            debug!("Failed to close content stream: {}", e);
        }
    }
}
