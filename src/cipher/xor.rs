//! Legacy repeating-key XOR.
//!
//! Unauthenticated: opening with the wrong PIN succeeds and yields garbage.
//! Kept only so tags issued before AES-GCM still resolve.

/// XORs `data` with `key` repeated to its length. Its own inverse.
pub fn apply(data: &[u8], key: &[u8]) -> Vec<u8> {
    if key.is_empty() {
        return data.to_vec();
    }

    data.iter()
        .zip(key.iter().cycle())
        .map(|(byte, k)| byte ^ k)
        .collect()
}
