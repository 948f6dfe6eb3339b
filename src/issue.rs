//! Issuing tags from a profile.
//!
//! Everything issued here is sealed with [`CipherMethod::CURRENT`]; the
//! `_with` variants exist for producing legacy fixtures.

use chrono::Datelike;
use num_bigint::BigUint;
use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;
use tracing::debug;

use crate::cipher::{CipherEnvelope, CipherError, CipherMethod, Pin};
use crate::codec::{base62, encode_profile, CodecError};
use crate::profile::MedicalProfile;
use crate::resolve::ServerlessPayload;
use crate::store::StoredRecord;

/// Birth years a serverless scanner accepts.
const PLAUSIBLE_YEARS: std::ops::RangeInclusive<i32> = 1000..=2999;

/// Random bytes behind a generated tag ID.
const TAG_ID_BYTES: usize = 9;

/// Errors that can occur while issuing a tag.
#[derive(Error, Debug)]
pub enum IssueError {
    #[error("Record encoding failed: {0}")]
    Codec(#[from] CodecError),

    #[error("Sealing failed: {0}")]
    Cipher(#[from] CipherError),

    #[error("Profile serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Birth year {0} would be rejected when scanned (must be 1000-2999)")]
    ImplausibleBirthYear(i32),
}

/// How a tag carries its profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Stored record referenced by a tag ID.
    Online,
    /// Whole profile embedded in the tag URL.
    Serverless,
}

/// Result of [`issue`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issued {
    Serverless(ServerlessPayload),
    Online(StoredRecord),
}

/// Issues a tag in the given mode with the current cipher.
pub fn issue(profile: &MedicalProfile, pin: &Pin, mode: DeliveryMode) -> Result<Issued, IssueError> {
    match mode {
        DeliveryMode::Serverless => issue_serverless(profile, pin).map(Issued::Serverless),
        DeliveryMode::Online => issue_online(profile, pin).map(Issued::Online),
    }
}

pub fn issue_serverless(profile: &MedicalProfile, pin: &Pin) -> Result<ServerlessPayload, IssueError> {
    issue_serverless_with(profile, pin, CipherMethod::CURRENT)
}

/// Encodes the compact record and seals it for a tag URL.
///
/// Free-text fields (address, vehicle number, notes) are dropped.
pub fn issue_serverless_with(
    profile: &MedicalProfile,
    pin: &Pin,
    method: CipherMethod,
) -> Result<ServerlessPayload, IssueError> {
    let year = profile.date_of_birth.year();
    if !PLAUSIBLE_YEARS.contains(&year) {
        return Err(IssueError::ImplausibleBirthYear(year));
    }

    let record = encode_profile(profile)?.assemble();
    let envelope = CipherEnvelope::seal(method, record.as_bytes(), pin)?;
    debug!(%method, bytes = envelope.bytes.len(), "sealed serverless record");

    Ok(ServerlessPayload::from_envelope(&envelope))
}

pub fn issue_online(profile: &MedicalProfile, pin: &Pin) -> Result<StoredRecord, IssueError> {
    issue_online_with(profile, pin, CipherMethod::CURRENT)
}

/// Seals the profile JSON. Name and blood group stay in clear.
pub fn issue_online_with(
    profile: &MedicalProfile,
    pin: &Pin,
    method: CipherMethod,
) -> Result<StoredRecord, IssueError> {
    let json = serde_json::to_vec(profile)?;
    let envelope = CipherEnvelope::seal(method, &json, pin)?;
    debug!(%method, bytes = envelope.bytes.len(), "sealed online record");

    Ok(StoredRecord {
        full_name: profile.full_name.clone(),
        blood_group: profile.blood_group,
        encrypted_blob: envelope.to_stored(),
        is_encrypted: true,
        encryption_method: Some(method.marker().to_string()),
    })
}

/// A fresh random tag ID for an online record, in base62.
pub fn generate_tag_id() -> Result<String, IssueError> {
    let mut bytes = [0u8; TAG_ID_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| CipherError::PlatformUnavailable(e.to_string()))?;
    Ok(base62::encode(&BigUint::from_bytes_be(&bytes)))
}

/// Stores the profile JSON without a PIN.
pub fn issue_online_plain(profile: &MedicalProfile) -> Result<StoredRecord, IssueError> {
    Ok(StoredRecord {
        full_name: profile.full_name.clone(),
        blood_group: profile.blood_group,
        encrypted_blob: serde_json::to_string(profile)?,
        is_encrypted: false,
        encryption_method: None,
    })
}
