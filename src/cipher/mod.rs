//! PIN-derived envelope cipher.
//!
//! Two generations share one interface:
//! - [`CipherMethod::Xor`]: legacy repeating-key XOR, unauthenticated
//! - [`CipherMethod::AesGcm`]: AES-GCM with a random 12-byte IV
//!
//! New envelopes are always sealed with [`CipherMethod::CURRENT`]. A missing
//! method marker means the legacy generation.

pub mod aes;
pub mod envelope;
pub mod pin;
pub mod xor;

pub use envelope::{from_url_safe_b64, to_url_safe_b64, CipherEnvelope};
pub use pin::{Pin, PinEntry, PinError, PIN_LENGTH};

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while sealing or opening an envelope.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CipherError {
    #[error("Authentication failed: wrong PIN or tampered envelope")]
    AuthFailure,

    #[error("Envelope too short: {len} bytes, need at least {min}")]
    EnvelopeTooShort { len: usize, min: usize },

    #[error("Invalid envelope encoding: {0}")]
    InvalidEncoding(String),

    #[error("Unknown encryption method: {0}")]
    UnknownMethod(String),

    #[error("Crypto platform unavailable: {0}")]
    PlatformUnavailable(String),
}

/// Cipher generation, tagged on stored records and tag URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CipherMethod {
    #[serde(rename = "XOR")]
    Xor,
    #[serde(rename = "AES-GCM")]
    AesGcm,
}

impl CipherMethod {
    /// Generation used for everything newly issued.
    pub const CURRENT: CipherMethod = CipherMethod::AesGcm;

    /// Resolves an optional marker. Absent means [`CipherMethod::Xor`].
    pub fn from_marker(marker: Option<&str>) -> Result<Self, CipherError> {
        match marker.map(str::trim) {
            None | Some("") => Ok(CipherMethod::Xor),
            Some(m) if m.eq_ignore_ascii_case("XOR") => Ok(CipherMethod::Xor),
            Some(m) if m.eq_ignore_ascii_case("AES-GCM") => Ok(CipherMethod::AesGcm),
            Some(other) => Err(CipherError::UnknownMethod(other.to_string())),
        }
    }

    pub fn marker(self) -> &'static str {
        match self {
            CipherMethod::Xor => "XOR",
            CipherMethod::AesGcm => "AES-GCM",
        }
    }

    /// Whether a wrong PIN is detected by the cipher itself.
    pub fn is_authenticated(self) -> bool {
        matches!(self, CipherMethod::AesGcm)
    }

    pub fn seal(self, plaintext: &[u8], pin: &Pin) -> Result<Vec<u8>, CipherError> {
        match self {
            CipherMethod::Xor => Ok(xor::apply(plaintext, pin.as_bytes())),
            CipherMethod::AesGcm => aes::seal(plaintext, pin),
        }
    }

    /// Opens sealed bytes.
    ///
    /// With [`CipherMethod::Xor`] a wrong PIN is not detected here; the
    /// caller has to validate what comes out.
    pub fn open(self, envelope: &[u8], pin: &Pin) -> Result<Vec<u8>, CipherError> {
        match self {
            CipherMethod::Xor => Ok(xor::apply(envelope, pin.as_bytes())),
            CipherMethod::AesGcm => aes::open(envelope, pin),
        }
    }
}

impl Default for CipherMethod {
    fn default() -> Self {
        CipherMethod::Xor
    }
}

impl fmt::Display for CipherMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker())
    }
}
