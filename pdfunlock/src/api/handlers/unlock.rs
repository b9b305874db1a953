//! HTTP handler for unlocking an uploaded PDF.

use axum::extract::{Multipart, State, multipart::MultipartRejection};
use tracing::{debug, info, instrument};

use crate::AppState;
use crate::api::models::unlock::UnlockRequest;
use crate::errors::{Result, ValidationError};
use crate::unlock::{self, UnlockedDocument};

/// Unlock the uploaded PDF and send it back as an attachment.
///
/// Failures re-render the form with a message (see [`crate::errors::Error`]).
#[instrument(skip_all)]
pub async fn unlock_pdf(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<UnlockedDocument> {
    // A body that isn't multipart can't have carried a file
    let multipart = multipart.map_err(|rejection| {
        debug!(%rejection, "Request is not a multipart upload");
        ValidationError::MissingFile
    })?;

    let limit = state.config.limits.max_upload_size;
    let (upload, password) = UnlockRequest::from_multipart(multipart, limit).await?.validate()?;

    info!(filename = %upload.filename, size = upload.bytes.len(), "Unlocking uploaded document");

    let prefix = state.config.download_prefix.clone();
    let document = tokio::task::spawn_blocking(move || unlock::unlock(&upload, &password, &prefix)).await??;

    Ok(document)
}
