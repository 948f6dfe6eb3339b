//! AES-GCM keyed directly by the PIN.
//!
//! The key is the PIN's character bytes repeated to 16 bytes. There is no
//! KDF: envelopes issued by existing tags were sealed this way.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes128Gcm, Nonce,
};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

use super::{CipherError, Pin};

/// IV size for AES-GCM.
pub const IV_SIZE: usize = 12;

/// Authentication tag size appended by GCM.
pub const TAG_SIZE: usize = 16;

/// Raw key size derived from the PIN.
const KEY_SIZE: usize = 16;

/// Repeats the PIN's character bytes to fill the key.
fn pin_key(pin: &Pin) -> Zeroizing<[u8; KEY_SIZE]> {
    let mut key = Zeroizing::new([0u8; KEY_SIZE]);
    for (slot, byte) in key.iter_mut().zip(pin.as_bytes().iter().cycle()) {
        *slot = *byte;
    }
    key
}

fn cipher_for(pin: &Pin) -> Result<Aes128Gcm, CipherError> {
    let key = pin_key(pin);
    Aes128Gcm::new_from_slice(key.as_slice())
        .map_err(|e| CipherError::PlatformUnavailable(e.to_string()))
}

/// Seals `plaintext`. Output: IV (12 bytes) || ciphertext || tag (16 bytes).
pub fn seal(plaintext: &[u8], pin: &Pin) -> Result<Vec<u8>, CipherError> {
    let mut iv = [0u8; IV_SIZE];
    OsRng
        .try_fill_bytes(&mut iv)
        .map_err(|e| CipherError::PlatformUnavailable(e.to_string()))?;

    let ciphertext = cipher_for(pin)?
        .encrypt(Nonce::from_slice(&iv), plaintext)
        .map_err(|e| CipherError::PlatformUnavailable(e.to_string()))?;

    let mut result = Vec::with_capacity(IV_SIZE + ciphertext.len());
    result.extend_from_slice(&iv);
    result.extend_from_slice(&ciphertext);
    Ok(result)
}

/// Opens an envelope produced by [`seal`].
pub fn open(envelope: &[u8], pin: &Pin) -> Result<Vec<u8>, CipherError> {
    if envelope.len() < IV_SIZE + TAG_SIZE {
        return Err(CipherError::EnvelopeTooShort {
            len: envelope.len(),
            min: IV_SIZE + TAG_SIZE,
        });
    }

    let (iv, ciphertext) = envelope.split_at(IV_SIZE);
    cipher_for(pin)?
        .decrypt(Nonce::from_slice(iv), ciphertext)
        .map_err(|_| CipherError::AuthFailure)
}
