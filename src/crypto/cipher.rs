//! AES-256-CBC envelope cipher.
//!
//! The wire format is fixed for compatibility with already-stored secrets:
//! the IV and ciphertext are individually hex-encoded, concatenated as
//! `hex(iv) || hex(ciphertext)`, and the combined ASCII string is base64
//! encoded into a single self-describing envelope.

use crate::errors::{CipherError, CipherResult};
use aes::cipher::{block_padding::NoPadding, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::{engine::general_purpose::STANDARD, Engine};
use rand::RngCore;

/// AES-256 key length in bytes.
pub const KEY_LEN: usize = 32;
/// AES block size in bytes; CBC IVs are one block long.
const BLOCK_SIZE: usize = 16;
const IV_LEN: usize = BLOCK_SIZE;
/// Hex expansion of the IV inside the combined envelope string.
const IV_HEX_LEN: usize = IV_LEN * 2;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Encrypts `plaintext` into an envelope string using AES-256-CBC.
///
/// A fresh random IV is drawn on every call, so encrypting identical input
/// twice yields different envelopes. The input is PKCS#7 padded first; a
/// plaintext already block-aligned still receives a full padding block.
pub fn encrypt(plaintext: &str, key: &[u8]) -> CipherResult<String> {
    if key.len() != KEY_LEN {
        return Err(CipherError::InvalidKeyLength(key.len()));
    }

    let mut iv = [0u8; IV_LEN];
    rand::rng().fill_bytes(&mut iv);

    let padded = pkcs7_pad(plaintext.as_bytes());
    let ciphertext = Aes256CbcEnc::new_from_slices(key, &iv)
        .map_err(|_| CipherError::InvalidKeyLength(key.len()))?
        .encrypt_padded_vec_mut::<NoPadding>(&padded);

    let combined = format!("{}{}", hex::encode(iv), hex::encode(&ciphertext));
    Ok(STANDARD.encode(combined))
}

/// Decrypts an envelope string produced by [`encrypt`].
///
/// Rejects tampered or malformed input with a distinct error per failure
/// mode; all of them are deterministic, so none is worth retrying.
pub fn decrypt(envelope: &str, key: &[u8]) -> CipherResult<String> {
    if key.len() != KEY_LEN {
        return Err(CipherError::InvalidKeyLength(key.len()));
    }

    let combined = STANDARD
        .decode(envelope)
        .map_err(|err| CipherError::MalformedEnvelope(format!("invalid base64: {err}")))?;
    if combined.len() < IV_HEX_LEN {
        return Err(CipherError::MalformedEnvelope(
            "too short to contain an iv".into(),
        ));
    }

    let (iv_hex, ciphertext_hex) = combined.split_at(IV_HEX_LEN);
    let iv = hex::decode(iv_hex)
        .map_err(|err| CipherError::MalformedEnvelope(format!("invalid iv hex: {err}")))?;
    if iv.len() != IV_LEN {
        return Err(CipherError::InvalidIvLength(iv.len()));
    }
    let ciphertext = hex::decode(ciphertext_hex)
        .map_err(|err| CipherError::MalformedEnvelope(format!("invalid ciphertext hex: {err}")))?;
    if ciphertext.len() % BLOCK_SIZE != 0 {
        return Err(CipherError::InvalidCiphertextLength(ciphertext.len()));
    }

    let padded = Aes256CbcDec::new_from_slices(key, &iv)
        .map_err(|_| CipherError::InvalidKeyLength(key.len()))?
        .decrypt_padded_vec_mut::<NoPadding>(&ciphertext)
        .map_err(|_| CipherError::InvalidCiphertextLength(ciphertext.len()))?;

    let plaintext = pkcs7_unpad(&padded)?;
    String::from_utf8(plaintext.to_vec()).map_err(|_| CipherError::InvalidUtf8)
}

/// Pads to the next block boundary; always appends 1..=16 bytes.
fn pkcs7_pad(data: &[u8]) -> Vec<u8> {
    let padding = BLOCK_SIZE - data.len() % BLOCK_SIZE;
    let mut padded = Vec::with_capacity(data.len() + padding);
    padded.extend_from_slice(data);
    padded.extend(std::iter::repeat(padding as u8).take(padding));
    padded
}

/// Validates and strips PKCS#7 padding. Every pad byte must equal the
/// declared pad length, which must be in 1..=16 and fit inside the buffer.
fn pkcs7_unpad(data: &[u8]) -> CipherResult<&[u8]> {
    let Some(&last) = data.last() else {
        return Err(CipherError::InvalidPadding);
    };
    let padding = last as usize;
    if padding == 0 || padding > BLOCK_SIZE {
        return Err(CipherError::InvalidPadding);
    }
    if data.len() < padding {
        return Err(CipherError::InvalidPadding);
    }
    if data[data.len() - padding..].iter().any(|&b| b != last) {
        return Err(CipherError::InvalidPadding);
    }
    Ok(&data[..data.len() - padding])
}
