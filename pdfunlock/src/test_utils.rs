//! Test utilities: in-memory PDF fixtures and a test server.

use crate::config::Config;
use axum_test::TestServer;
use lopdf::encryption::crypt_filters::{Aes128CryptFilter, Aes256CryptFilter, CryptFilter};
use lopdf::{Document, EncryptionState, EncryptionVersion, Object, Permissions, Stream, StringFormat, dictionary};
use std::collections::BTreeMap;
use std::sync::Arc;

pub fn create_test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        ..Default::default()
    }
}

pub fn create_test_server(config: Config) -> TestServer {
    crate::Application::new(config).into_test_server()
}

/// Build a document with one page per entry, each showing its text in Helvetica.
///
/// `MediaBox` and `Resources` live on the Pages node rather than on each page, so copies have to
/// resolve inheritance to stay renderable.
pub fn create_test_document(pages: &[&str]) -> Document {
    let mut doc = Document::with_version("1.5");

    // Encryption keys are derived from the first ID entry
    doc.trailer.set(
        "ID",
        Object::Array(vec![
            Object::String(b"pdfunlock-test-id".to_vec(), StringFormat::Literal),
            Object::String(b"pdfunlock-test-id".to_vec(), StringFormat::Literal),
        ]),
    );

    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => Object::Reference(font_id),
        },
    });

    let mut kids = Vec::new();
    for text in pages {
        let content = format!("BT\n/F1 24 Tf\n72 720 Td\n({text}) Tj\nET\n");
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "Contents" => Object::Reference(content_id),
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => Object::Reference(resources_id),
            "MediaBox" => vec![Object::Integer(0), Object::Integer(0), Object::Integer(612), Object::Integer(792)],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    doc
}

pub fn save_to_bytes(mut doc: Document) -> Vec<u8> {
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("Failed to serialize test document");
    bytes
}

pub fn create_test_pdf(pages: &[&str]) -> Vec<u8> {
    save_to_bytes(create_test_document(pages))
}

/// Security handler a fixture is encrypted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cipher {
    /// Standard handler revision 3, RC4 with a 128-bit key
    Rc4_128,
    /// Standard handler revision 4, AESV2 crypt filter
    Aes128,
    /// Standard handler revision 6, AESV3 crypt filter
    Aes256,
}

pub const ALL_CIPHERS: [Cipher; 3] = [Cipher::Rc4_128, Cipher::Aes128, Cipher::Aes256];

fn standard_crypt_filter(filter: Arc<dyn CryptFilter>) -> BTreeMap<Vec<u8>, Arc<dyn CryptFilter>> {
    BTreeMap::from([(b"StdCF".to_vec(), filter)])
}

/// An RC4 128-bit encrypted PDF with the given user and owner passwords.
pub fn create_encrypted_pdf(pages: &[&str], user_password: &str, owner_password: &str) -> Vec<u8> {
    create_encrypted_pdf_with(Cipher::Rc4_128, pages, user_password, owner_password)
}

pub fn create_encrypted_pdf_with(cipher: Cipher, pages: &[&str], user_password: &str, owner_password: &str) -> Vec<u8> {
    let mut doc = create_test_document(pages);
    let file_encryption_key = [0x5a_u8; 32];

    let version = match cipher {
        Cipher::Rc4_128 => EncryptionVersion::V2 {
            document: &doc,
            owner_password,
            user_password,
            key_length: 128,
            permissions: Permissions::all(),
        },
        Cipher::Aes128 => EncryptionVersion::V4 {
            document: &doc,
            encrypt_metadata: true,
            crypt_filters: standard_crypt_filter(Arc::new(Aes128CryptFilter)),
            stream_filter: b"StdCF".to_vec(),
            string_filter: b"StdCF".to_vec(),
            owner_password,
            user_password,
            permissions: Permissions::all(),
        },
        Cipher::Aes256 => EncryptionVersion::V5 {
            encrypt_metadata: true,
            crypt_filters: standard_crypt_filter(Arc::new(Aes256CryptFilter)),
            file_encryption_key: &file_encryption_key,
            stream_filter: b"StdCF".to_vec(),
            string_filter: b"StdCF".to_vec(),
            owner_password,
            user_password,
            permissions: Permissions::all(),
        },
    };
    let state = EncryptionState::try_from(version).expect("Failed to derive encryption state");
    doc.encrypt(&state).expect("Failed to encrypt test document");

    save_to_bytes(doc)
}

/// Text of each page, in page order, with surrounding whitespace trimmed.
pub fn page_texts(bytes: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(bytes).expect("Failed to parse PDF");
    assert!(!doc.is_encrypted(), "expected an unencrypted document");

    doc.get_pages()
        .into_keys()
        .map(|number| doc.extract_text(&[number]).expect("Failed to extract text").trim().to_string())
        .collect()
}
