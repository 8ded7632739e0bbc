//! Google Cloud Storage path helpers.
//!
//! `sqlrun` only reads scripts from the local filesystem; these helpers let
//! callers recognise `gs://` locations and report them clearly.

use crate::error::{CoreError, CoreResult};
use regex::Regex;
use std::sync::OnceLock;

static GS_PATH_RE: OnceLock<Regex> = OnceLock::new();

fn gs_path_re() -> &'static Regex {
    GS_PATH_RE.get_or_init(|| Regex::new(r"^gs://([^/]+)/(.*)$").expect("valid regex"))
}

/// Whether `path` points into Google Cloud Storage.
pub fn is_gs_path(path: &str) -> bool {
    path.starts_with("gs://")
}

/// Split `gs://bucket/path/to/object` into `("bucket", "path/to/object")`.
pub fn bucket_name(gcs_path: &str) -> CoreResult<(String, String)> {
    let caps = gs_path_re()
        .captures(gcs_path)
        .ok_or_else(|| CoreError::InvalidStoragePath {
            path: gcs_path.to_string(),
        })?;
    Ok((caps[1].to_string(), caps[2].to_string()))
}
