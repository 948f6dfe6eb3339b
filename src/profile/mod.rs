//! The medical profile a tag holder maintains.
//!
//! This module provides:
//! - [`MedicalProfile`]: the full profile as shown to first responders
//! - [`BloodGroup`] and [`SubstanceUse`]: single-digit indexed enumerations
//! - Fixed checklist catalogs (allergies, medications, conditions)
//! - Derived display metrics (age, BMI)

pub mod catalog;
pub mod derived;

pub use catalog::{Allergy, Catalog, Condition, Medication};
pub use derived::{
    age_display, age_in_months, age_in_years, bmi, cm_to_inches, kg_to_pounds, AgeDisplay,
    BmiCategory, HealthSummary,
};

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when parsing profile values from text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProfileError {
    #[error("Unknown {kind}: {label}")]
    UnknownLabel { kind: &'static str, label: String },
}

/// ABO/Rh blood group. The declaration order is the wire index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BloodGroup {
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
}

impl BloodGroup {
    /// All blood groups in wire-index order.
    pub const ALL: [BloodGroup; 8] = [
        BloodGroup::APositive,
        BloodGroup::ANegative,
        BloodGroup::BPositive,
        BloodGroup::BNegative,
        BloodGroup::OPositive,
        BloodGroup::ONegative,
        BloodGroup::AbPositive,
        BloodGroup::AbNegative,
    ];

    /// Single-digit index used in the packed numeric field.
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Looks up a blood group by its packed index.
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(usize::from(index)).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            BloodGroup::APositive => "A+",
            BloodGroup::ANegative => "A-",
            BloodGroup::BPositive => "B+",
            BloodGroup::BNegative => "B-",
            BloodGroup::OPositive => "O+",
            BloodGroup::ONegative => "O-",
            BloodGroup::AbPositive => "AB+",
            BloodGroup::AbNegative => "AB-",
        }
    }
}

impl fmt::Display for BloodGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BloodGroup {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|group| group.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ProfileError::UnknownLabel {
                kind: "blood group",
                label: s.to_string(),
            })
    }
}

/// Substance-use category. The declaration order is the wire index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SubstanceUse {
    #[serde(rename = "None")]
    Neither,
    #[serde(rename = "Alcohol only")]
    AlcoholOnly,
    #[serde(rename = "Tobacco only")]
    TobaccoOnly,
    #[serde(rename = "Both")]
    Both,
}

impl SubstanceUse {
    /// All categories in wire-index order.
    pub const ALL: [SubstanceUse; 4] = [
        SubstanceUse::Neither,
        SubstanceUse::AlcoholOnly,
        SubstanceUse::TobaccoOnly,
        SubstanceUse::Both,
    ];

    /// Single-digit index used in the packed numeric field.
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Looks up a category by its packed index.
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(usize::from(index)).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            SubstanceUse::Neither => "None",
            SubstanceUse::AlcoholOnly => "Alcohol only",
            SubstanceUse::TobaccoOnly => "Tobacco only",
            SubstanceUse::Both => "Both",
        }
    }
}

impl Default for SubstanceUse {
    fn default() -> Self {
        Self::Neither
    }
}

impl fmt::Display for SubstanceUse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SubstanceUse {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        // Short CLI spellings alongside the display labels
        let found = match wanted.to_ascii_lowercase().as_str() {
            "none" => Some(SubstanceUse::Neither),
            "alcohol" | "alcohol only" => Some(SubstanceUse::AlcoholOnly),
            "tobacco" | "tobacco only" => Some(SubstanceUse::TobaccoOnly),
            "both" => Some(SubstanceUse::Both),
            _ => None,
        };
        found.ok_or_else(|| ProfileError::UnknownLabel {
            kind: "substance use category",
            label: s.to_string(),
        })
    }
}

/// A tag holder's medical profile.
///
/// The JSON form (camelCase keys, labels for enumerations, `YYYY-MM-DD`
/// dates) is the plaintext sealed into online-mode envelopes. The optional
/// free-text fields only exist in online mode; the compact record codec
/// does not carry them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalProfile {
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    /// Height in centimetres.
    pub height_cm: u16,
    /// Weight in kilograms.
    pub weight_kg: u16,
    pub blood_group: BloodGroup,
    #[serde(default)]
    pub substance_use: SubstanceUse,
    #[serde(default)]
    pub pregnant: bool,
    #[serde(default)]
    pub organ_donor: bool,
    #[serde(default)]
    pub allergies: BTreeSet<Allergy>,
    #[serde(default)]
    pub medications: BTreeSet<Medication>,
    #[serde(default)]
    pub medical_conditions: BTreeSet<Condition>,
    /// Emergency contact phone number, digits only.
    pub emergency_contact: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medical_notes: Option<String>,
}

impl MedicalProfile {
    /// Creates a profile with no flags set and no optional free text.
    pub fn new(
        full_name: impl Into<String>,
        date_of_birth: NaiveDate,
        height_cm: u16,
        weight_kg: u16,
        blood_group: BloodGroup,
        substance_use: SubstanceUse,
        emergency_contact: impl Into<String>,
    ) -> Self {
        Self {
            full_name: full_name.into(),
            date_of_birth,
            height_cm,
            weight_kg,
            blood_group,
            substance_use,
            pregnant: false,
            organ_donor: false,
            allergies: BTreeSet::new(),
            medications: BTreeSet::new(),
            medical_conditions: BTreeSet::new(),
            emergency_contact: emergency_contact.into(),
            address: None,
            vehicle_number: None,
            medical_notes: None,
        }
    }

    /// Computes age and BMI as of `today`.
    pub fn summary(&self, today: NaiveDate) -> HealthSummary {
        HealthSummary::of(self, today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blood_group_indices_match_wire_table() {
        let labels: Vec<&str> = BloodGroup::ALL.iter().map(|g| g.label()).collect();
        assert_eq!(labels, ["A+", "A-", "B+", "B-", "O+", "O-", "AB+", "AB-"]);
        assert_eq!(BloodGroup::OPositive.index(), 4);
        assert_eq!(BloodGroup::from_index(6), Some(BloodGroup::AbPositive));
        assert_eq!(BloodGroup::from_index(8), None);
    }

    #[test]
    fn test_substance_use_indices_match_wire_table() {
        assert_eq!(SubstanceUse::Neither.index(), 0);
        assert_eq!(SubstanceUse::Both.index(), 3);
        assert_eq!(SubstanceUse::from_index(2), Some(SubstanceUse::TobaccoOnly));
        assert_eq!(SubstanceUse::from_index(4), None);
    }

    #[test]
    fn test_label_parsing() {
        assert_eq!("ab-".parse::<BloodGroup>().unwrap(), BloodGroup::AbNegative);
        assert_eq!(" O+ ".parse::<BloodGroup>().unwrap(), BloodGroup::OPositive);
        assert!("C+".parse::<BloodGroup>().is_err());

        assert_eq!("alcohol".parse::<SubstanceUse>().unwrap(), SubstanceUse::AlcoholOnly);
        assert_eq!("Tobacco only".parse::<SubstanceUse>().unwrap(), SubstanceUse::TobaccoOnly);
        assert!("coffee".parse::<SubstanceUse>().is_err());
    }

    #[test]
    fn test_profile_json_uses_labels() {
        let mut profile = MedicalProfile::new(
            "Ada Lovelace",
            NaiveDate::from_ymd_opt(1985, 12, 10).unwrap(),
            165,
            58,
            BloodGroup::AbNegative,
            SubstanceUse::AlcoholOnly,
            "5550100",
        );
        profile.allergies.insert(Allergy::PetDander);
        profile.address = Some("12 Analytical Row".to_string());

        let json = serde_json::to_string(&profile).unwrap();
        assert!(json.contains("\"fullName\":\"Ada Lovelace\""));
        assert!(json.contains("\"dateOfBirth\":\"1985-12-10\""));
        assert!(json.contains("\"bloodGroup\":\"AB-\""));
        assert!(json.contains("\"substanceUse\":\"Alcohol only\""));
        assert!(json.contains("\"allergies\":[\"Pet Dander\"]"));
        assert!(!json.contains("vehicleNumber"));

        let back: MedicalProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(back, profile);
    }

    #[test]
    fn test_profile_json_defaults_optional_sections() {
        let json = r#"{
            "fullName": "Sam",
            "dateOfBirth": "2001-02-03",
            "heightCm": 180,
            "weightKg": 80,
            "bloodGroup": "B+",
            "emergencyContact": "123"
        }"#;
        let profile: MedicalProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.substance_use, SubstanceUse::Neither);
        assert!(!profile.pregnant);
        assert!(profile.allergies.is_empty());
        assert!(profile.medical_notes.is_none());
    }
}
