use crate::form::render_form;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error as ThisError;

/// The request did not carry a usable upload.
#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// No `pdf_file` part, or the body was not multipart at all
    #[error("Nenhum arquivo enviado.")]
    MissingFile,

    /// A `pdf_file` part was sent without a filename
    #[error("Selecione um arquivo PDF válido.")]
    EmptyFilename,

    /// The request body exceeded the configured upload limit
    #[error("O arquivo excede o tamanho máximo permitido ({} MB).", .limit.div_ceil(1024 * 1024))]
    TooLarge { limit: usize },
}

#[derive(ThisError, Debug)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The document is encrypted and the supplied password opened neither handler
    #[error("Senha incorreta. Verifique os dados com a paciente.")]
    IncorrectPassword,

    /// Parsing, decryption or reassembly failed
    #[error("Falha ao processar o arquivo: {message}")]
    Processing { message: String },
}

impl Error {
    /// The message shown to the user above the upload form.
    ///
    /// Processing failures carry the underlying error text verbatim. PDF library errors describe
    /// document structure only, so the password never reaches this string.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        Error::Processing { message: err.to_string() }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Processing { message: err.to_string() }
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Error::Processing { message: err.to_string() }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match &self {
            Error::Validation(_) => tracing::debug!("Validation error: {}", self),
            Error::IncorrectPassword => tracing::info!("Decryption rejected the supplied password"),
            Error::Processing { .. } => tracing::warn!("Processing error: {}", self),
        }

        // Every failure is a normal page: the form again, with the message on top
        match render_form(Some(&self.user_message())) {
            Ok(html) => (StatusCode::OK, Html(html)).into_response(),
            Err(e) => {
                tracing::error!("Failed to render upload form: {:#}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

/// Type alias for unlock operation results
pub type Result<T> = std::result::Result<T, Error>;
