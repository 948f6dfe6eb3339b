//! The 17-bit flag vector.
//!
//! Bit 0 is the leftmost character of the padded bit string:
//!
//! ```text
//! 0       pregnant
//! 1       organ donor
//! 2..=6   allergies, catalog order
//! 7..=11  medications, catalog order
//! 12..=16 medical conditions, catalog order
//! ```

use std::collections::BTreeSet;

use num_bigint::BigUint;

use super::{base62, CodecError};
use crate::profile::{Allergy, Catalog, Condition, MedicalProfile, Medication};

/// Number of bits in the flag vector.
pub const FLAG_WIDTH: usize = 17;

/// Binary part written when no flag is set.
///
/// This is the literal string `"0"`, not the base62 encoding of zero
/// (which would be `"A"`). Decoders short-circuit on it.
pub const NO_FLAGS_SENTINEL: &str = "0";

const PREGNANT_BIT: usize = 0;
const ORGAN_DONOR_BIT: usize = 1;
const ALLERGY_OFFSET: usize = 2;
const MEDICATION_OFFSET: usize = 7;
const CONDITION_OFFSET: usize = 12;

/// Booleans and checklist selections carried in the binary part.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MedicalFlags {
    pub pregnant: bool,
    pub organ_donor: bool,
    pub allergies: BTreeSet<Allergy>,
    pub medications: BTreeSet<Medication>,
    pub medical_conditions: BTreeSet<Condition>,
}

impl MedicalFlags {
    pub fn of(profile: &MedicalProfile) -> Self {
        Self {
            pregnant: profile.pregnant,
            organ_donor: profile.organ_donor,
            allergies: profile.allergies.clone(),
            medications: profile.medications.clone(),
            medical_conditions: profile.medical_conditions.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.pregnant
            && !self.organ_donor
            && self.allergies.is_empty()
            && self.medications.is_empty()
            && self.medical_conditions.is_empty()
    }

    fn bit_array(&self) -> [bool; FLAG_WIDTH] {
        let mut bits = [false; FLAG_WIDTH];
        bits[PREGNANT_BIT] = self.pregnant;
        bits[ORGAN_DONOR_BIT] = self.organ_donor;
        set_catalog_bits(&mut bits, ALLERGY_OFFSET, &self.allergies);
        set_catalog_bits(&mut bits, MEDICATION_OFFSET, &self.medications);
        set_catalog_bits(&mut bits, CONDITION_OFFSET, &self.medical_conditions);
        bits
    }

    /// Renders the 17-character `'0'`/`'1'` string.
    pub fn to_bits(&self) -> String {
        self.bit_array()
            .iter()
            .map(|&set| if set { '1' } else { '0' })
            .collect()
    }

    /// The flag vector as an integer, bit 0 most significant.
    pub fn to_value(&self) -> u32 {
        self.bit_array()
            .iter()
            .fold(0u32, |acc, &set| (acc << 1) | u32::from(set))
    }

    /// Reads a 17-character `'0'`/`'1'` string.
    pub fn from_bits(bits: &str) -> Result<Self, CodecError> {
        if bits.len() != FLAG_WIDTH {
            return Err(CodecError::InvalidBits(bits.to_string()));
        }

        let mut flags = [false; FLAG_WIDTH];
        for (slot, b) in flags.iter_mut().zip(bits.bytes()) {
            *slot = match b {
                b'0' => false,
                b'1' => true,
                _ => return Err(CodecError::InvalidBits(bits.to_string())),
            };
        }

        Ok(Self {
            pregnant: flags[PREGNANT_BIT],
            organ_donor: flags[ORGAN_DONOR_BIT],
            allergies: catalog_from_bits(&flags, ALLERGY_OFFSET),
            medications: catalog_from_bits(&flags, MEDICATION_OFFSET),
            medical_conditions: catalog_from_bits(&flags, CONDITION_OFFSET),
        })
    }
}

fn set_catalog_bits<T: Catalog>(bits: &mut [bool; FLAG_WIDTH], offset: usize, items: &BTreeSet<T>) {
    for item in items {
        bits[offset + item.position()] = true;
    }
}

fn catalog_from_bits<T: Catalog>(bits: &[bool; FLAG_WIDTH], offset: usize) -> BTreeSet<T> {
    T::ALL
        .iter()
        .copied()
        .filter(|item| bits[offset + item.position()])
        .collect()
}

/// Packs flags into a binary part.
pub fn pack(flags: &MedicalFlags) -> String {
    if flags.is_empty() {
        return NO_FLAGS_SENTINEL.to_string();
    }

    base62::encode(&BigUint::from(flags.to_value()))
}

/// Unpacks a binary part.
pub fn unpack(binary_part: &str) -> Result<MedicalFlags, CodecError> {
    if binary_part == NO_FLAGS_SENTINEL {
        return Ok(MedicalFlags::default());
    }

    MedicalFlags::from_bits(&base62::decode_to_bits(binary_part, FLAG_WIDTH)?)
}
