//! Base62 text for arbitrary-precision unsigned integers.
//!
//! Alphabet ordinals: `A`..`Z` are 0–25, `a`..`z` are 26–51 and `0`..`9` are
//! 52–61. Digit characters are NOT ordinals 0–9: `"0"` decodes to 52.
//!
//! Encoding drops the width of the original decimal payload (`"007"` and
//! `"7"` encode identically). Fixed-width payloads are re-padded after
//! decoding with [`decode_decimal_padded`] and [`decode_to_bits`].

use num_bigint::BigUint;
use num_traits::Zero;

use super::CodecError;

/// Characters in ordinal order.
pub const ALPHABET: &[u8; 62] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

const BASE: u32 = 62;

/// Ordinal of a base62 character, or `None` outside the alphabet.
pub fn ordinal(c: char) -> Option<u32> {
    match c {
        'A'..='Z' => Some(c as u32 - 'A' as u32),
        'a'..='z' => Some(c as u32 - 'a' as u32 + 26),
        '0'..='9' => Some(c as u32 - '0' as u32 + 52),
        _ => None,
    }
}

/// Encodes an integer. Zero encodes to `"A"`.
pub fn encode(value: &BigUint) -> String {
    if value.is_zero() {
        return (ALPHABET[0] as char).to_string();
    }

    value
        .to_radix_be(BASE)
        .into_iter()
        .map(|digit| ALPHABET[usize::from(digit)] as char)
        .collect()
}

/// Decodes base62 text with Horner accumulation.
pub fn decode(s: &str) -> Result<BigUint, CodecError> {
    if s.is_empty() {
        return Err(CodecError::EmptyField);
    }

    let mut value = BigUint::zero();
    for (position, character) in s.chars().enumerate() {
        let digit =
            ordinal(character).ok_or(CodecError::InvalidCharacter { character, position })?;
        value = value * BASE + digit;
    }

    Ok(value)
}

/// Encodes a string of decimal digits.
///
/// Leading zeros are not preserved. Returns `None` if `digits` is empty or
/// contains anything other than ASCII digits.
pub fn encode_decimal(digits: &str) -> Option<String> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    BigUint::parse_bytes(digits.as_bytes(), 10).map(|value| encode(&value))
}

/// Decodes to a decimal string left-padded with `'0'` to exactly `width`.
pub fn decode_decimal_padded(s: &str, width: usize) -> Result<String, CodecError> {
    let decimal = decode(s)?.to_str_radix(10);
    pad_to_width(decimal, width, "digits")
}

/// Decodes to a binary string left-padded with `'0'` to exactly `width` bits.
pub fn decode_to_bits(s: &str, width: usize) -> Result<String, CodecError> {
    let bits = decode(s)?.to_str_radix(2);
    pad_to_width(bits, width, "bits")
}

fn pad_to_width(text: String, width: usize, unit: &'static str) -> Result<String, CodecError> {
    if text.len() > width {
        return Err(CodecError::WidthOverflow {
            actual: text.len(),
            width,
            unit,
        });
    }
    Ok(format!("{:0>width$}", text, width = width))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alphabet_ordinals() {
        for (i, c) in ALPHABET.iter().enumerate() {
            assert_eq!(ordinal(*c as char), Some(i as u32));
        }
        assert_eq!(ordinal('0'), Some(52));
        assert_eq!(ordinal('9'), Some(61));
        assert_eq!(ordinal('-'), None);
        assert_eq!(ordinal('+'), None);
    }

    #[test]
    fn test_inverse_on_spot_values() {
        let spot: [u64; 6] = [0, 1, 61, 62, 3843, (1u64 << 53) + 7];
        for n in spot {
            let value = BigUint::from(n);
            let encoded = encode(&value);
            assert_eq!(decode(&encoded).unwrap(), value, "n = {}", n);
        }
    }

    #[test]
    fn test_known_encodings() {
        assert_eq!(encode(&BigUint::from(0u32)), "A");
        assert_eq!(encode(&BigUint::from(61u32)), "9");
        assert_eq!(encode(&BigUint::from(62u32)), "BA");
        assert_eq!(encode(&BigUint::from(3843u32)), "99");
    }

    #[test]
    fn test_beyond_u64() {
        let value = BigUint::parse_bytes(b"123456789012345678901234567890", 10).unwrap();
        assert_eq!(decode(&encode(&value)).unwrap(), value);
    }

    #[test]
    fn test_invalid_characters_are_errors() {
        assert_eq!(
            decode("AB-C"),
            Err(CodecError::InvalidCharacter {
                character: '-',
                position: 2
            })
        );
        assert_eq!(decode(""), Err(CodecError::EmptyField));
    }

    #[test]
    fn test_sentinel_is_not_zero() {
        // "0" is ordinal 52, the integer zero is "A"
        assert_eq!(decode("0").unwrap(), BigUint::from(52u32));
        assert_eq!(decode("A").unwrap(), BigUint::zero());
    }

    #[test]
    fn test_leading_zero_loss_and_repadding() {
        assert_eq!(encode_decimal("007"), encode_decimal("7"));
        let encoded = encode_decimal("007").unwrap();
        assert_eq!(decode_decimal_padded(&encoded, 3).unwrap(), "007");
    }

    #[test]
    fn test_encode_decimal_rejects_non_digits() {
        assert_eq!(encode_decimal(""), None);
        assert_eq!(encode_decimal("12a"), None);
        assert_eq!(encode_decimal("+12"), None);
    }

    #[test]
    fn test_decode_to_bits() {
        assert_eq!(decode_to_bits("A", 17).unwrap(), "0".repeat(17));
        assert_eq!(decode_to_bits("0", 17).unwrap(), "00000000000110100");
        assert!(matches!(
            decode_to_bits("BAAA", 17),
            Err(CodecError::WidthOverflow { width: 17, .. })
        ));
    }
}
