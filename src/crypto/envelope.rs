//! Password-keyed envelope: the plaintext gets a fixed magic header before
//! encryption, and decryption checks it to tell a wrong password from a
//! good one.

use sha2::{Digest, Sha256};

use crate::crypto::rabbit::Rabbit;
use crate::error::{Result, UiError};

pub const MAGIC_HEADER: &[u8; 8] = b"MAGIC123";
const PDF_SIGNATURE: &[u8] = b"%PDF";

/// First 16 bytes of the SHA-256 of the UTF-8 password.
pub fn derive_key(password: &str) -> [u8; 16] {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    let digest = hasher.finalize();
    let mut key = [0u8; 16];
    key.copy_from_slice(&digest[..16]);
    key
}

pub fn seal(data: &[u8], cipher: &mut Rabbit) -> Vec<u8> {
    let mut out = Vec::with_capacity(MAGIC_HEADER.len() + data.len());
    out.extend_from_slice(MAGIC_HEADER);
    out.extend_from_slice(data);
    cipher.apply_keystream(&mut out);
    out
}

pub fn open(data: &[u8], cipher: &mut Rabbit) -> Result<Vec<u8>> {
    let mut out = data.to_vec();
    cipher.apply_keystream(&mut out);
    let header_ok = out.len() >= MAGIC_HEADER.len() && constant_time_eq(&out[..MAGIC_HEADER.len()], MAGIC_HEADER);
    if !header_ok {
        return Err(UiError::WrongPassword);
    }
    Ok(out.split_off(MAGIC_HEADER.len()))
}

/// Compares without stopping at the first differing byte.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

pub fn is_pdf(data: &[u8]) -> bool {
    data.starts_with(PDF_SIGNATURE)
}

/// Surrounding whitespace in the password is ignored.
fn password_key(password: &str) -> Result<[u8; 16]> {
    let password = password.trim();
    if password.is_empty() {
        return Err(UiError::MissingPassword);
    }
    Ok(derive_key(password))
}

pub fn encrypt_pdf(data: &[u8], password: &str) -> Result<Vec<u8>> {
    let key = password_key(password)?;
    if !is_pdf(data) {
        return Err(UiError::InvalidPdf);
    }
    Ok(seal(data, &mut Rabbit::new(&key)))
}

pub fn decrypt_pdf(data: &[u8], password: &str) -> Result<Vec<u8>> {
    let key = password_key(password)?;
    let plain = open(data, &mut Rabbit::new(&key))?;
    if !is_pdf(&plain) {
        return Err(UiError::DecryptedNotPdf);
    }
    Ok(plain)
}
