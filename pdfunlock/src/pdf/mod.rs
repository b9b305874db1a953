//! PDF document access on top of `lopdf`.
//!
//! The rest of the crate only sees [`SourceDocument`] through the [`Decryptable`] capability and
//! the page copy in [`copy`]; `lopdf`'s error conventions for a wrong password stay in here.

pub mod copy;

use bytes::Bytes;
use lopdf::Document;
use lopdf::encryption::DecryptionError;

/// The two questions the unlock flow asks of an uploaded document.
pub trait Decryptable {
    fn is_encrypted(&self) -> bool;

    /// Try to remove encryption with `password`.
    ///
    /// Returns `Ok(false)` when the password matches neither the user nor the owner password.
    /// Any other failure (unsupported security handler, damaged encryption dictionary) is an
    /// error.
    fn try_decrypt(&mut self, password: &str) -> Result<bool, lopdf::Error>;
}

/// A parsed upload. Lives only as long as the request that carried it.
///
/// A document whose user password is not empty can't be read without that password: parsing it
/// yields only the encryption dictionary. The raw bytes are kept so [`Decryptable::try_decrypt`]
/// can parse again with the candidate password.
pub struct SourceDocument {
    bytes: Bytes,
    inner: Document,
}

impl SourceDocument {
    pub fn parse(bytes: impl Into<Bytes>) -> Result<Self, lopdf::Error> {
        let bytes = bytes.into();
        let inner = Document::load_mem(&bytes)?;
        Ok(Self { bytes, inner })
    }

    pub fn page_count(&self) -> usize {
        self.inner.get_pages().len()
    }

    pub fn document(&self) -> &Document {
        &self.inner
    }
}

impl Decryptable for SourceDocument {
    fn is_encrypted(&self) -> bool {
        self.inner.is_encrypted()
    }

    fn try_decrypt(&mut self, password: &str) -> Result<bool, lopdf::Error> {
        match Document::load_mem_with_password(&self.bytes, password) {
            Ok(document) => {
                self.inner = document;
                Ok(true)
            }
            Err(lopdf::Error::InvalidPassword | lopdf::Error::Decryption(DecryptionError::IncorrectPassword)) => {
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}
