//! Axum route handlers.
//!
//! - [`form`]: renders the upload form
//! - [`unlock`]: accepts the upload and returns the unlocked document
//!
//! No handler ever answers a failed unlock with an error status: validation, password and
//! processing failures all come back as the form with a message (see [`crate::errors::Error`]).

pub mod form;
pub mod unlock;
