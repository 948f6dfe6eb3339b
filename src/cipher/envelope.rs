//! Sealed bytes together with the method that sealed them, and their
//! base64 transport forms.

use base64::{
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
    Engine,
};

use super::{CipherError, CipherMethod, Pin};

/// An opaque sealed blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CipherEnvelope {
    pub method: CipherMethod,
    pub bytes: Vec<u8>,
}

impl CipherEnvelope {
    pub fn seal(method: CipherMethod, plaintext: &[u8], pin: &Pin) -> Result<Self, CipherError> {
        Ok(Self {
            method,
            bytes: method.seal(plaintext, pin)?,
        })
    }

    pub fn open(&self, pin: &Pin) -> Result<Vec<u8>, CipherError> {
        self.method.open(&self.bytes, pin)
    }

    /// Standard base64, as written to the record store.
    pub fn to_stored(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    pub fn from_stored(method: CipherMethod, blob: &str) -> Result<Self, CipherError> {
        let bytes = STANDARD
            .decode(blob.trim())
            .map_err(|e| CipherError::InvalidEncoding(e.to_string()))?;
        Ok(Self { method, bytes })
    }

    /// URL-safe unpadded base64, as embedded in a tag URL.
    pub fn to_url_payload(&self) -> String {
        to_url_safe_b64(&self.bytes)
    }

    pub fn from_url_payload(method: CipherMethod, payload: &str) -> Result<Self, CipherError> {
        Ok(Self {
            method,
            bytes: from_url_safe_b64(payload)?,
        })
    }
}

/// Encodes with `-`/`_` and no `=` padding.
pub fn to_url_safe_b64(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Reverses [`to_url_safe_b64`]: swaps the alphabet back, re-pads to a
/// multiple of four, then decodes as standard base64.
///
/// Payloads already in the standard alphabet, padded or not, also decode.
pub fn from_url_safe_b64(payload: &str) -> Result<Vec<u8>, CipherError> {
    let mut standard: String = payload
        .trim()
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();

    while standard.len() % 4 != 0 {
        standard.push('=');
    }

    STANDARD
        .decode(standard.as_bytes())
        .map_err(|e| CipherError::InvalidEncoding(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_safe_inverse_across_padding_cases() {
        for len in [0usize, 1, 12, 13, 33] {
            let bytes: Vec<u8> = (0..len).map(|i| (i * 37 + 250) as u8).collect();
            let encoded = to_url_safe_b64(&bytes);
            assert!(!encoded.contains(&['+', '/', '='][..]), "len {}", len);
            assert_eq!(from_url_safe_b64(&encoded).unwrap(), bytes, "len {}", len);
        }
    }

    #[test]
    fn test_url_safe_alphabet_used() {
        // 0xfb 0xff encodes to "+/8=" in the standard alphabet
        assert_eq!(to_url_safe_b64(&[0xfb, 0xff]), "-_8");
        assert_eq!(from_url_safe_b64("-_8").unwrap(), vec![0xfb, 0xff]);
        assert_eq!(from_url_safe_b64("+/8=").unwrap(), vec![0xfb, 0xff]);
    }

    #[test]
    fn test_invalid_payload() {
        assert!(matches!(
            from_url_safe_b64("a"),
            Err(CipherError::InvalidEncoding(_))
        ));
        assert!(from_url_safe_b64("ab$d").is_err());
    }

    #[test]
    fn test_envelope_transport_forms() {
        let pin = Pin::parse("1357").unwrap();
        let envelope = CipherEnvelope::seal(CipherMethod::AesGcm, b"{\"a\":1}", &pin).unwrap();

        let stored = CipherEnvelope::from_stored(CipherMethod::AesGcm, &envelope.to_stored()).unwrap();
        assert_eq!(stored, envelope);

        let url =
            CipherEnvelope::from_url_payload(CipherMethod::AesGcm, &envelope.to_url_payload()).unwrap();
        assert_eq!(url.open(&pin).unwrap(), b"{\"a\":1}");
    }
}
