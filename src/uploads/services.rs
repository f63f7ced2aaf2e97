use anyhow::Context;
use bytes::Bytes;
use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use crate::state::AppState;

/// Multipart field that carries the profile picture.
pub const PROFILE_PICTURE_FIELD: &str = "profilePicture";

#[derive(Debug, Clone)]
pub struct UploadItem {
    pub file_name: String,
    pub content_type: Option<String>,
    pub body: Bytes,
}

/// Persists one uploaded file and returns its relative path (`uploads/<stored-name>`).
pub async fn save_upload(st: &AppState, item: UploadItem) -> anyhow::Result<String> {
    let name = stored_name(&item.file_name, OffsetDateTime::now_utc());
    let size = item.body.len();
    st.storage
        .put_object(&name, item.body)
        .await
        .with_context(|| format!("store upload {}", name))?;
    info!(
        stored = %name,
        original = %item.file_name,
        content_type = item.content_type.as_deref().unwrap_or("unknown"),
        size,
        "profile picture stored"
    );
    Ok(format!("{}/{}", st.config.uploads.url_prefix, name))
}

/// Best-effort removal of a previously stored upload. Failures are only logged.
pub async fn discard_upload(st: &AppState, path: &str) {
    let Some(key) = storage_key(&st.config.uploads.url_prefix, path) else {
        warn!(path, "not a managed upload path; leaving it alone");
        return;
    };
    if let Err(e) = st.storage.delete_object(key).await {
        warn!(error = %e, path, "failed to remove stored upload");
    }
}

fn storage_key<'a>(url_prefix: &str, path: &'a str) -> Option<&'a str> {
    path.strip_prefix(url_prefix)?
        .strip_prefix('/')
        .filter(|key| !key.is_empty())
}

/// `<unix-millis>-<uuid>-<original-name>`; the uuid keeps same-millisecond
/// uploads of identically named files apart.
fn stored_name(original: &str, now: OffsetDateTime) -> String {
    let millis = now.unix_timestamp_nanos() / 1_000_000;
    format!(
        "{}-{}-{}",
        millis,
        Uuid::new_v4().simple(),
        sanitize_file_name(original)
    )
}

fn sanitize_file_name(original: &str) -> String {
    let base = original
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}
