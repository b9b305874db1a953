//! HTTP handler for the upload form.

use axum::{http::StatusCode, response::Html};
use tracing::instrument;

use crate::form::render_form;

/// Serve the empty upload form
#[instrument(err)]
pub async fn show_form() -> Result<Html<String>, StatusCode> {
    render_form(None).map(Html).map_err(|e| {
        tracing::error!("Failed to render upload form: {:#}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })
}
