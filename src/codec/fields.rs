//! Fixed-width decimal packing of the scalar profile fields.
//!
//! Layout of the 16-digit numeric payload:
//!
//! ```text
//! [0..8)   date of birth, YYYYMMDD
//! [8..11)  height in cm, zero-padded
//! [11..14) weight in kg, zero-padded
//! [14]     blood group index
//! [15]     substance-use index
//! ```

use chrono::{Datelike, NaiveDate};

use super::{base62, CodecError};
use crate::profile::{BloodGroup, MedicalProfile, SubstanceUse};

/// Width of the packed numeric payload in decimal digits.
pub const NUMERIC_WIDTH: usize = 16;

const DOB_WIDTH: usize = 8;
const MEASURE_WIDTH: usize = 3;
const MEASURE_MAX: u16 = 999;

const DOB_RANGE: std::ops::Range<usize> = 0..8;
const HEIGHT_RANGE: std::ops::Range<usize> = 8..11;
const WEIGHT_RANGE: std::ops::Range<usize> = 11..14;
const BLOOD_GROUP_POS: usize = 14;
const SUBSTANCE_POS: usize = 15;

/// The scalar fields carried in the numeric part of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalarFields {
    pub date_of_birth: NaiveDate,
    pub height_cm: u16,
    pub weight_kg: u16,
    pub blood_group: BloodGroup,
    pub substance_use: SubstanceUse,
}

impl ScalarFields {
    pub fn of(profile: &MedicalProfile) -> Self {
        Self {
            date_of_birth: profile.date_of_birth,
            height_cm: profile.height_cm,
            weight_kg: profile.weight_kg,
            blood_group: profile.blood_group,
            substance_use: profile.substance_use,
        }
    }

    /// Builds the 16-digit decimal payload.
    ///
    /// Values that do not fit their width are rejected, never truncated.
    pub fn to_digits(&self) -> Result<String, CodecError> {
        let dob = birth_digits(self.date_of_birth)?;
        let height = measurement("height", self.height_cm)?;
        let weight = measurement("weight", self.weight_kg)?;

        Ok(format!(
            "{}{}{}{}{}",
            dob,
            height,
            weight,
            self.blood_group.index(),
            self.substance_use.index()
        ))
    }

    /// Parses a 16-digit decimal payload.
    pub fn from_digits(digits: &str) -> Result<Self, CodecError> {
        if digits.len() != NUMERIC_WIDTH || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CodecError::WidthOverflow {
                actual: digits.len(),
                width: NUMERIC_WIDTH,
                unit: "digits",
            });
        }

        let bytes = digits.as_bytes();
        Ok(Self {
            date_of_birth: parse_birth_digits(&digits[DOB_RANGE])?,
            height_cm: parse_measurement(&digits[HEIGHT_RANGE]),
            weight_kg: parse_measurement(&digits[WEIGHT_RANGE]),
            blood_group: index_digit(bytes[BLOOD_GROUP_POS], "blood group", BloodGroup::from_index)?,
            substance_use: index_digit(bytes[SUBSTANCE_POS], "substance use", SubstanceUse::from_index)?,
        })
    }
}

/// Packs scalar fields into a base62 numeric part.
pub fn pack(fields: &ScalarFields) -> Result<String, CodecError> {
    let digits = fields.to_digits()?;
    base62::encode_decimal(&digits).ok_or(CodecError::FieldOverflow {
        field: "numeric payload",
        value: digits,
        width: NUMERIC_WIDTH,
    })
}

/// Decodes a numeric part to its zero-padded 16-digit payload.
pub fn unpack_digits(numeric_part: &str) -> Result<String, CodecError> {
    base62::decode_decimal_padded(numeric_part, NUMERIC_WIDTH)
}

/// Decodes a numeric part into scalar fields.
pub fn unpack(numeric_part: &str) -> Result<ScalarFields, CodecError> {
    ScalarFields::from_digits(&unpack_digits(numeric_part)?)
}

/// Whether the payload's birth year starts with `1` or `2` (years 1000–2999).
pub fn has_plausible_birth_year(digits: &str) -> bool {
    matches!(digits.as_bytes().first(), Some(b'1' | b'2'))
}

/// Packs a phone number. Leading zeros are lost.
pub fn pack_contact(phone: &str) -> Result<String, CodecError> {
    base62::encode_decimal(phone).ok_or_else(|| CodecError::InvalidPhoneNumber(phone.to_string()))
}

/// Unpacks a phone number as plain decimal, without leading zeros.
pub fn unpack_contact(contact_part: &str) -> Result<String, CodecError> {
    Ok(base62::decode(contact_part)?.to_str_radix(10))
}

fn birth_digits(date: NaiveDate) -> Result<String, CodecError> {
    let digits = format!("{:04}{:02}{:02}", date.year(), date.month(), date.day());
    if digits.len() != DOB_WIDTH || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CodecError::FieldOverflow {
            field: "date of birth",
            value: date.to_string(),
            width: DOB_WIDTH,
        });
    }
    Ok(digits)
}

fn parse_birth_digits(digits: &str) -> Result<NaiveDate, CodecError> {
    let invalid = || CodecError::InvalidDate(digits.to_string());

    let year: i32 = digits[0..4].parse().map_err(|_| invalid())?;
    let month: u32 = digits[4..6].parse().map_err(|_| invalid())?;
    let day: u32 = digits[6..8].parse().map_err(|_| invalid())?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

fn measurement(field: &'static str, value: u16) -> Result<String, CodecError> {
    if value > MEASURE_MAX {
        return Err(CodecError::FieldOverflow {
            field,
            value: value.to_string(),
            width: MEASURE_WIDTH,
        });
    }
    Ok(format!("{:03}", value))
}

// Three ASCII digits always fit in a u16.
fn parse_measurement(digits: &str) -> u16 {
    digits
        .bytes()
        .fold(0u16, |acc, b| acc * 10 + u16::from(b - b'0'))
}

fn index_digit<T>(
    digit: u8,
    field: &'static str,
    lookup: fn(u8) -> Option<T>,
) -> Result<T, CodecError> {
    lookup(digit - b'0').ok_or(CodecError::InvalidIndex {
        field,
        index: digit as char,
    })
}
