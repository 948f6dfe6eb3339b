//! Compact record codec.
//!
//! Maps a [`MedicalProfile`] to and from the four-field record string carried
//! in serverless tags:
//!
//! ```text
//! numericPart-binaryPart-name-contactPart
//! ```
//!
//! - [`base62`]: arbitrary-precision integer ⇄ base62 text
//! - [`fields`]: fixed-width decimal packing of the scalar fields
//! - [`flags`]: 17-bit flag vector for booleans and checklists
//! - [`record`]: joining and splitting the four fields

pub mod base62;
pub mod fields;
pub mod flags;
pub mod record;

pub use fields::{ScalarFields, NUMERIC_WIDTH};
pub use flags::{MedicalFlags, FLAG_WIDTH, NO_FLAGS_SENTINEL};
pub use record::{EncodedRecord, DELIMITER};

use thiserror::Error;

use crate::profile::MedicalProfile;

/// Errors that can occur while encoding or decoding a record.
///
/// Every decoding variant means the record is malformed; none of them is
/// ever replaced by a default value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Empty base62 field")]
    EmptyField,

    #[error("Invalid base62 character {character:?} at position {position}")]
    InvalidCharacter { character: char, position: usize },

    #[error("Decoded value needs {actual} {unit}, field holds {width}")]
    WidthOverflow {
        actual: usize,
        width: usize,
        unit: &'static str,
    },

    #[error("Record has {0} parts, expected 4")]
    WrongPartCount(usize),

    #[error("{field} value {value} does not fit in {width} digits")]
    FieldOverflow {
        field: &'static str,
        value: String,
        width: usize,
    },

    #[error("Invalid {field} index {index:?}")]
    InvalidIndex { field: &'static str, index: char },

    #[error("Invalid date of birth digits: {0}")]
    InvalidDate(String),

    #[error("Invalid flag bits: {0:?}")]
    InvalidBits(String),

    #[error("Phone number must be a non-empty string of digits: {0:?}")]
    InvalidPhoneNumber(String),

    #[error("Name must not contain the record delimiter '-'")]
    DelimiterInName,
}

/// Encodes a profile into its record fields.
///
/// Fails when the name contains the delimiter, a measurement does not fit
/// its fixed width, or the phone number is not purely numeric.
pub fn encode_profile(profile: &MedicalProfile) -> Result<EncodedRecord, CodecError> {
    if profile.full_name.contains(DELIMITER) {
        return Err(CodecError::DelimiterInName);
    }

    Ok(EncodedRecord {
        numeric: fields::pack(&ScalarFields::of(profile))?,
        binary: flags::pack(&MedicalFlags::of(profile)),
        name: profile.full_name.clone(),
        contact: fields::pack_contact(&profile.emergency_contact)?,
    })
}

/// Decodes record fields back into a profile.
///
/// This performs no plausibility checking; see
/// [`crate::resolve`] for the scan-side rules.
pub fn decode_record(record: &EncodedRecord) -> Result<MedicalProfile, CodecError> {
    let scalars = fields::unpack(&record.numeric)?;
    let flags = flags::unpack(&record.binary)?;
    let contact = fields::unpack_contact(&record.contact)?;

    Ok(assemble_profile(&record.name, scalars, flags, contact))
}

/// Builds a profile from decoded parts.
pub(crate) fn assemble_profile(
    name: &str,
    scalars: ScalarFields,
    flags: MedicalFlags,
    contact: String,
) -> MedicalProfile {
    let mut profile = MedicalProfile::new(
        name,
        scalars.date_of_birth,
        scalars.height_cm,
        scalars.weight_kg,
        scalars.blood_group,
        scalars.substance_use,
        contact,
    );
    profile.pregnant = flags.pregnant;
    profile.organ_donor = flags.organ_donor;
    profile.allergies = flags.allergies;
    profile.medications = flags.medications;
    profile.medical_conditions = flags.medical_conditions;
    profile
}
