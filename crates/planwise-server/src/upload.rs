//! Buffering a single uploaded file out of a multipart body.

use axum::extract::Multipart;
use axum::extract::multipart::{Field, MultipartError};
use axum::http::StatusCode;
use thiserror::Error;
use tracing::debug;

/// Bytes allowed on top of the file itself for boundaries and part headers.
pub const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

#[derive(Debug, Error)]
pub enum UploadError {
    /// No part with the expected name, or the body is not multipart at all.
    #[error("Missing file")]
    MissingFile,

    #[error("File too large (limit {limit} bytes)")]
    TooLarge { limit: usize },

    /// The part was found but its content could not be read.
    #[error("Could not read file")]
    Read(#[source] MultipartError),
}

fn is_length_limit(err: &MultipartError) -> bool {
    err.status() == StatusCode::PAYLOAD_TOO_LARGE
}

/// Find the part called `field_name` and read it fully into memory, failing
/// once it exceeds `limit` bytes. Other parts are skipped.
pub async fn read_file_field(
    multipart: &mut Multipart,
    field_name: &str,
    limit: usize,
) -> Result<Vec<u8>, UploadError> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Err(UploadError::MissingFile),
            Err(e) if is_length_limit(&e) => return Err(UploadError::TooLarge { limit }),
            Err(e) => {
                debug!(error = %e, "malformed multipart body");
                return Err(UploadError::MissingFile);
            }
        };
        if field.name() == Some(field_name) {
            debug!(file_name = ?field.file_name(), "reading uploaded file");
            return read_capped(field, limit).await;
        }
    }
}

async fn read_capped(mut field: Field<'_>, limit: usize) -> Result<Vec<u8>, UploadError> {
    let mut buf = Vec::new();
    loop {
        let chunk = match field.chunk().await {
            Ok(Some(chunk)) => chunk,
            Ok(None) => return Ok(buf),
            Err(e) if is_length_limit(&e) => return Err(UploadError::TooLarge { limit }),
            Err(e) => return Err(UploadError::Read(e)),
        };
        if buf.len() + chunk.len() > limit {
            return Err(UploadError::TooLarge { limit });
        }
        buf.extend_from_slice(&chunk);
    }
}
