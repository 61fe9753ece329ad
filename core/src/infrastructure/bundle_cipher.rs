// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Bundle Cipher
//!
//! Reads and writes the file format produced by
//! `openssl enc -aes-256-cbc -salt -pbkdf2`, which is what cb-tumblebug's
//! `encCredential.sh` uses for `credentials.yaml.enc`:
//!
//! ```text
//! "Salted__" | salt (8 bytes) | AES-256-CBC ciphertext (PKCS#7 padded)
//! ```
//!
//! Key and IV are the first 32 and next 16 bytes of
//! PBKDF2-HMAC-SHA256(passphrase, salt, 10 000 iterations).
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure Layer
//! - **Purpose:** Symmetric decryption primitive for the credential bundle

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use sha2::Sha256;

use crate::domain::errors::CipherError;

type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;
type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;

const SALT_MAGIC: &[u8; 8] = b"Salted__";
const SALT_LEN: usize = 8;
const KEY_LEN: usize = 32;
const IV_LEN: usize = 16;
const BLOCK_LEN: usize = 16;
/// `openssl enc -pbkdf2` default iteration count
pub const PBKDF2_ITERATIONS: u32 = 10_000;

fn derive_key_iv(passphrase: &str, salt: &[u8]) -> [u8; KEY_LEN + IV_LEN] {
    let mut derived = [0u8; KEY_LEN + IV_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(passphrase.as_bytes(), salt, PBKDF2_ITERATIONS, &mut derived);
    derived
}

/// Decrypt a salted bundle into UTF-8 plaintext
pub fn decrypt(bundle: &[u8], passphrase: &str) -> Result<String, CipherError> {
    if bundle.len() < SALT_MAGIC.len() + SALT_LEN || &bundle[..SALT_MAGIC.len()] != SALT_MAGIC {
        return Err(CipherError::MissingSaltHeader);
    }
    let salt = &bundle[SALT_MAGIC.len()..SALT_MAGIC.len() + SALT_LEN];
    let ciphertext = &bundle[SALT_MAGIC.len() + SALT_LEN..];
    if ciphertext.is_empty() || ciphertext.len() % BLOCK_LEN != 0 {
        return Err(CipherError::InvalidLength(ciphertext.len()));
    }

    let derived = derive_key_iv(passphrase, salt);
    let plaintext = Aes256CbcDec::new_from_slices(&derived[..KEY_LEN], &derived[KEY_LEN..])
        .map_err(|_| CipherError::BadDecrypt)?
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CipherError::BadDecrypt)?;

    String::from_utf8(plaintext).map_err(|_| CipherError::InvalidUtf8)
}

/// Encrypt plaintext into the salted bundle format with a caller-chosen salt
pub fn encrypt_with_salt(plaintext: &str, passphrase: &str, salt: [u8; SALT_LEN]) -> Vec<u8> {
    let derived = derive_key_iv(passphrase, &salt);
    let ciphertext = Aes256CbcEnc::new_from_slices(&derived[..KEY_LEN], &derived[KEY_LEN..])
        .map(|cipher| cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes()))
        .unwrap_or_default();

    let mut bundle = Vec::with_capacity(SALT_MAGIC.len() + SALT_LEN + ciphertext.len());
    bundle.extend_from_slice(SALT_MAGIC);
    bundle.extend_from_slice(&salt);
    bundle.extend_from_slice(&ciphertext);
    bundle
}
