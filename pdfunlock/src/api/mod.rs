//! HTTP layer.
//!
//! - **[`handlers`]**: Axum route handlers
//! - **[`models`]**: Request parsing and response types
//!
//! # Routes
//!
//! - `GET /`: the upload form
//! - `POST /desbloquear`: multipart upload (`pdf_file`, `senha`), answered with the unlocked PDF
//!   as an attachment, or with the form and an error message
//! - `GET /healthz`: liveness probe

pub mod handlers;
pub mod models;
