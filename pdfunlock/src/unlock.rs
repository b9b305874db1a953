//! The unlock operation: parse, decrypt if needed, copy pages into a fresh document, serialize.
//!
//! Everything here is synchronous and CPU-bound; the HTTP handler runs it on the blocking pool.

use crate::errors::{Error, Result};
use crate::pdf::{Decryptable, SourceDocument, copy::copy_pages};
use bytes::Bytes;
use std::fmt;
use tracing::{debug, info, instrument};

/// An uploaded file, held in memory for the duration of one request.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub bytes: Bytes,
}

/// A decryption credential. Never printed: `Debug` is redacted.
#[derive(Clone, Default)]
pub struct Password(String);

impl Password {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// The unencrypted copy, ready to be sent back.
#[derive(Debug)]
pub struct UnlockedDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

/// Remove the encryption from `upload` using `password`.
///
/// Unencrypted documents pass through the same copy, whatever the password.
#[instrument(skip_all, fields(filename = %upload.filename, size = upload.bytes.len()))]
pub fn unlock(upload: &Upload, password: &Password, download_prefix: &str) -> Result<UnlockedDocument> {
    let mut source = SourceDocument::parse(upload.bytes.clone())?;

    if source.is_encrypted() {
        debug!("Document is encrypted, attempting decryption");
        if !source.try_decrypt(password.expose())? {
            return Err(Error::IncorrectPassword);
        }
    }

    let mut output = copy_pages(source.document())?;
    let page_count = source.page_count();
    drop(source);

    let mut bytes = Vec::new();
    output.save_to(&mut bytes)?;

    info!(page_count, output_size = bytes.len(), "Document unlocked");

    Ok(UnlockedDocument {
        filename: download_filename(download_prefix, &upload.filename),
        bytes,
        page_count,
    })
}

/// The last path component of a client-supplied filename. Empty when the name ends in a separator.
pub fn basename(filename: &str) -> &str {
    filename.rsplit(['/', '\\']).next().unwrap_or(filename)
}

/// `<prefix><basename>`, dropping any directory part a client put in the filename.
///
/// Names without a basename are rejected during validation; should one get here anyway, the
/// separators are trimmed instead of producing a bare prefix.
pub fn download_filename(prefix: &str, original: &str) -> String {
    match basename(original) {
        "" => format!("{prefix}{}", original.trim_matches(['/', '\\'])),
        name => format!("{prefix}{name}"),
    }
}
