use crate::errors::{Error, Result, ValidationError};
use crate::unlock::{Password, UnlockedDocument, Upload, basename};
use axum::{
    extract::{Multipart, multipart::MultipartError},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use tracing::debug;

/// Form field carrying the PDF
pub const FILE_FIELD: &str = "pdf_file";
/// Form field carrying the password
pub const PASSWORD_FIELD: &str = "senha";

/// `attr-char` from RFC 5987: everything else in `filename*` is percent-encoded.
const ATTR_CHAR_ESCAPES: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b'-')
    .remove(b'.')
    .remove(b'^')
    .remove(b'_')
    .remove(b'`')
    .remove(b'|')
    .remove(b'~');

#[derive(Debug)]
pub struct FilePart {
    pub filename: Option<String>,
    pub bytes: Bytes,
}

/// The multipart body of `POST /desbloquear`, before validation.
#[derive(Debug, Default)]
pub struct UnlockRequest {
    pub file: Option<FilePart>,
    pub password: Option<Password>,
}

impl UnlockRequest {
    /// Read all fields of the upload into memory. `limit` is only used to word the error when the
    /// body limit trips.
    pub async fn from_multipart(mut multipart: Multipart, limit: usize) -> Result<Self> {
        let mut request = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(|e| multipart_error(e, limit))? {
            let name = field.name().unwrap_or_default().to_string();

            match name.as_str() {
                FILE_FIELD => {
                    let filename = field.file_name().map(str::to_string);
                    let bytes = field.bytes().await.map_err(|e| multipart_error(e, limit))?;
                    debug!(filename = ?filename, size = bytes.len(), "Received file field");
                    request.file = Some(FilePart { filename, bytes });
                }
                PASSWORD_FIELD => {
                    let value = field.text().await.map_err(|e| multipart_error(e, limit))?;
                    request.password = Some(Password::new(value));
                }
                other => debug!(field = other, "Ignoring unexpected form field"),
            }
        }

        Ok(request)
    }

    /// A file must be attached and carry a filename with a non-empty last path component. A
    /// missing password is the empty password.
    pub fn validate(self) -> std::result::Result<(Upload, Password), ValidationError> {
        let file = self.file.ok_or(ValidationError::MissingFile)?;
        let filename = file
            .filename
            .filter(|name| !basename(name).is_empty())
            .ok_or(ValidationError::EmptyFilename)?;

        Ok((
            Upload {
                filename,
                bytes: file.bytes,
            },
            self.password.unwrap_or_default(),
        ))
    }
}

fn multipart_error(err: MultipartError, limit: usize) -> Error {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ValidationError::TooLarge { limit }.into()
    } else {
        Error::Processing { message: err.body_text() }
    }
}

/// `Content-Disposition` value forcing a download under `filename`.
///
/// Names that are not plain printable ASCII get an ASCII fallback plus an RFC 5987 `filename*`.
pub fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c == ' ' || c.is_ascii_graphic() => c,
            _ => '_',
        })
        .collect();

    if fallback == filename {
        format!("attachment; filename=\"{filename}\"")
    } else {
        format!(
            "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
            utf8_percent_encode(filename, ATTR_CHAR_ESCAPES)
        )
    }
}

impl IntoResponse for UnlockedDocument {
    fn into_response(self) -> Response {
        let value = content_disposition(&self.filename);
        let disposition = HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static("attachment"));

        (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            self.bytes,
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_filename() {
        assert_eq!(
            content_disposition("LIBERADO_sample_encrypted.pdf"),
            r#"attachment; filename="LIBERADO_sample_encrypted.pdf""#
        );
        assert_eq!(
            content_disposition("LIBERADO_meu exame.pdf"),
            r#"attachment; filename="LIBERADO_meu exame.pdf""#
        );
    }

    #[test]
    fn test_non_ascii_filename() {
        assert_eq!(
            content_disposition("LIBERADO_exame_março.pdf"),
            r#"attachment; filename="LIBERADO_exame_mar_o.pdf"; filename*=UTF-8''LIBERADO_exame_mar%C3%A7o.pdf"#
        );
    }

    #[test]
    fn test_quotes_are_not_passed_through() {
        let value = content_disposition(r#"LIBERADO_a"b.pdf"#);

        assert!(value.starts_with(r#"attachment; filename="LIBERADO_a_b.pdf"; "#));
        assert!(value.ends_with("filename*=UTF-8''LIBERADO_a%22b.pdf"));
    }

    #[test]
    fn test_validation() {
        let missing = UnlockRequest::default();
        assert_eq!(missing.validate().unwrap_err(), ValidationError::MissingFile);

        let unnamed = UnlockRequest {
            file: Some(FilePart {
                filename: Some(String::new()),
                bytes: Bytes::from_static(b"%PDF"),
            }),
            password: None,
        };
        assert_eq!(unnamed.validate().unwrap_err(), ValidationError::EmptyFilename);

        let directory_only = UnlockRequest {
            file: Some(FilePart {
                filename: Some("laudos/".to_string()),
                bytes: Bytes::from_static(b"%PDF"),
            }),
            password: None,
        };
        assert_eq!(directory_only.validate().unwrap_err(), ValidationError::EmptyFilename);

        let named = UnlockRequest {
            file: Some(FilePart {
                filename: Some("exame.pdf".to_string()),
                bytes: Bytes::from_static(b"%PDF"),
            }),
            password: None,
        };
        let (upload, password) = named.validate().unwrap();
        assert_eq!(upload.filename, "exame.pdf");
        assert_eq!(password.expose(), "");
    }
}
