//! Fixed checklist catalogs.
//!
//! Each catalog is an ordered, closed list of five items. The position of an
//! item inside its catalog is its bit position in the packed flag vector, so
//! the order here is part of the wire format and must never change.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ProfileError;

/// An ordered, closed checklist.
pub trait Catalog: Copy + Ord + fmt::Debug + 'static {
    /// Catalog name used in error messages.
    const KIND: &'static str;

    /// Every item, in wire order.
    const ALL: &'static [Self];

    /// Position inside [`Catalog::ALL`].
    fn position(self) -> usize;

    /// Human readable label.
    fn label(self) -> &'static str;

    /// Case-insensitive label lookup.
    fn from_label(label: &str) -> Option<Self> {
        let wanted = label.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|item| item.label().eq_ignore_ascii_case(wanted))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Allergy {
    Pollen,
    Dust,
    #[serde(rename = "Pet Dander")]
    PetDander,
    Peanuts,
    Shellfish,
}

impl Catalog for Allergy {
    const KIND: &'static str = "allergy";
    const ALL: &'static [Self] = &[
        Allergy::Pollen,
        Allergy::Dust,
        Allergy::PetDander,
        Allergy::Peanuts,
        Allergy::Shellfish,
    ];

    fn position(self) -> usize {
        self as usize
    }

    fn label(self) -> &'static str {
        match self {
            Allergy::Pollen => "Pollen",
            Allergy::Dust => "Dust",
            Allergy::PetDander => "Pet Dander",
            Allergy::Peanuts => "Peanuts",
            Allergy::Shellfish => "Shellfish",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Medication {
    Aspirin,
    Ibuprofen,
    Penicillin,
    Insulin,
    Metformin,
}

impl Catalog for Medication {
    const KIND: &'static str = "medication";
    const ALL: &'static [Self] = &[
        Medication::Aspirin,
        Medication::Ibuprofen,
        Medication::Penicillin,
        Medication::Insulin,
        Medication::Metformin,
    ];

    fn position(self) -> usize {
        self as usize
    }

    fn label(self) -> &'static str {
        match self {
            Medication::Aspirin => "Aspirin",
            Medication::Ibuprofen => "Ibuprofen",
            Medication::Penicillin => "Penicillin",
            Medication::Insulin => "Insulin",
            Medication::Metformin => "Metformin",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Condition {
    Asthma,
    Diabetes,
    Hypertension,
    Arthritis,
    Migraine,
}

impl Catalog for Condition {
    const KIND: &'static str = "medical condition";
    const ALL: &'static [Self] = &[
        Condition::Asthma,
        Condition::Diabetes,
        Condition::Hypertension,
        Condition::Arthritis,
        Condition::Migraine,
    ];

    fn position(self) -> usize {
        self as usize
    }

    fn label(self) -> &'static str {
        match self {
            Condition::Asthma => "Asthma",
            Condition::Diabetes => "Diabetes",
            Condition::Hypertension => "Hypertension",
            Condition::Arthritis => "Arthritis",
            Condition::Migraine => "Migraine",
        }
    }
}

macro_rules! catalog_text_impls {
    ($($ty:ty),*) => {$(
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $ty {
            type Err = ProfileError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$ty as Catalog>::from_label(s).ok_or_else(|| ProfileError::UnknownLabel {
                    kind: <$ty as Catalog>::KIND,
                    label: s.to_string(),
                })
            }
        }
    )*};
}

catalog_text_impls!(Allergy, Medication, Condition);
