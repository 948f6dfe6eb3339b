//! Display metrics derived from a resolved profile.
//!
//! All functions here are pure. Nothing is stored; callers recompute on
//! display with the current date.

use std::fmt;

use chrono::{Datelike, NaiveDate};

use super::MedicalProfile;

/// Centimetres per inch.
const CM_PER_INCH: f64 = 2.54;

/// Pounds per kilogram.
const LB_PER_KG: f64 = 2.20462;

/// Under this age (in years) the age is shown in months.
const INFANT_YEARS: u32 = 2;

/// Whole years between `date_of_birth` and `today`. Zero for future dates.
pub fn age_in_years(date_of_birth: NaiveDate, today: NaiveDate) -> u32 {
    age_in_months(date_of_birth, today) / 12
}

/// Whole months between `date_of_birth` and `today`. Zero for future dates.
pub fn age_in_months(date_of_birth: NaiveDate, today: NaiveDate) -> u32 {
    if today <= date_of_birth {
        return 0;
    }

    let mut months = (today.year() - date_of_birth.year()) * 12
        + today.month() as i32
        - date_of_birth.month() as i32;
    if today.day() < date_of_birth.day() {
        months -= 1;
    }

    u32::try_from(months).unwrap_or(0)
}

/// Age as it should be displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeDisplay {
    Months(u32),
    Years(u32),
}

impl fmt::Display for AgeDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgeDisplay::Months(m) => write!(f, "{} months", m),
            AgeDisplay::Years(y) => write!(f, "{} years", y),
        }
    }
}

/// Picks months for infants and years for everyone else.
pub fn age_display(date_of_birth: NaiveDate, today: NaiveDate) -> AgeDisplay {
    let years = age_in_years(date_of_birth, today);
    if years < INFANT_YEARS {
        AgeDisplay::Months(age_in_months(date_of_birth, today))
    } else {
        AgeDisplay::Years(years)
    }
}

/// Body-mass index rounded to one decimal place.
///
/// Returns `None` for a zero height.
pub fn bmi(height_cm: u16, weight_kg: u16) -> Option<f64> {
    if height_cm == 0 {
        return None;
    }

    let height_m = f64::from(height_cm) / 100.0;
    let raw = f64::from(weight_kg) / (height_m * height_m);
    Some((raw * 10.0).round() / 10.0)
}

/// WHO adult BMI bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            BmiCategory::Underweight
        } else if bmi < 25.0 {
            BmiCategory::Normal
        } else if bmi < 30.0 {
            BmiCategory::Overweight
        } else {
            BmiCategory::Obese
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::Normal => "Normal",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::Obese => "Obese",
        }
    }
}

impl fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn cm_to_inches(cm: u16) -> f64 {
    f64::from(cm) / CM_PER_INCH
}

pub fn kg_to_pounds(kg: u16) -> f64 {
    f64::from(kg) * LB_PER_KG
}

/// Everything computed for display once a profile is resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct HealthSummary {
    pub age: AgeDisplay,
    pub bmi: Option<f64>,
    pub bmi_category: Option<BmiCategory>,
    pub height_in: f64,
    pub weight_lb: f64,
}

impl HealthSummary {
    pub fn of(profile: &MedicalProfile, today: NaiveDate) -> Self {
        let bmi = bmi(profile.height_cm, profile.weight_kg);
        Self {
            age: age_display(profile.date_of_birth, today),
            bmi,
            bmi_category: bmi.map(BmiCategory::from_bmi),
            height_in: cm_to_inches(profile.height_cm),
            weight_lb: kg_to_pounds(profile.weight_kg),
        }
    }
}
