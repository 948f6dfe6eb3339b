//! Issue command: build a profile and produce a tag.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, ValueEnum};

use opentag::config::OpenTagConfig;
use opentag::issue::generate_tag_id;
use opentag::profile::{Allergy, BloodGroup, Condition, MedicalProfile, Medication, SubstanceUse};
use opentag::{issue, DeliveryMode, FileStore, Issued, Pin, RecordStore};

use super::CommandExecutor;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeArg {
    /// Whole profile in the tag URL
    Serverless,
    /// Profile in the record store, tag ID in the QR code
    Online,
}

/// Issue a PIN-protected tag for a medical profile.
///
/// The profile comes either from a JSON file (--profile) or from the
/// individual field flags.
#[derive(Args, Debug)]
pub struct IssueCommand {
    /// 4-digit PIN protecting the tag
    #[arg(short, long)]
    pub pin: String,

    /// Delivery mode
    #[arg(short, long, value_enum, default_value = "serverless")]
    pub mode: ModeArg,

    /// Read the whole profile from a JSON file
    #[arg(long, conflicts_with_all = ["name", "dob", "height", "weight", "blood_group", "contact"])]
    pub profile: Option<PathBuf>,

    /// Full name (must not contain '-')
    #[arg(long, required_unless_present = "profile")]
    pub name: Option<String>,

    /// Date of birth, YYYY-MM-DD
    #[arg(long, required_unless_present = "profile")]
    pub dob: Option<NaiveDate>,

    /// Height in cm (0-999)
    #[arg(long, required_unless_present = "profile")]
    pub height: Option<u16>,

    /// Weight in kg (0-999)
    #[arg(long, required_unless_present = "profile")]
    pub weight: Option<u16>,

    /// Blood group: A+, A-, B+, B-, O+, O-, AB+, AB-
    #[arg(long, required_unless_present = "profile")]
    pub blood_group: Option<BloodGroup>,

    /// Emergency contact phone number (digits only)
    #[arg(long, required_unless_present = "profile")]
    pub contact: Option<String>,

    /// Substance use: none, alcohol, tobacco, both
    #[arg(long, default_value = "none")]
    pub substance: SubstanceUse,

    #[arg(long)]
    pub pregnant: bool,

    #[arg(long)]
    pub organ_donor: bool,

    /// Allergy (repeatable): Pollen, Dust, "Pet Dander", Peanuts, Shellfish
    #[arg(long = "allergy")]
    pub allergies: Vec<Allergy>,

    /// Medication (repeatable): Aspirin, Ibuprofen, Penicillin, Insulin, Metformin
    #[arg(long = "medication")]
    pub medications: Vec<Medication>,

    /// Condition (repeatable): Asthma, Diabetes, Hypertension, Arthritis, Migraine
    #[arg(long = "condition")]
    pub conditions: Vec<Condition>,

    /// Address (online mode only)
    #[arg(long)]
    pub address: Option<String>,

    /// Vehicle number (online mode only)
    #[arg(long)]
    pub vehicle: Option<String>,

    /// Free-text medical notes (online mode only)
    #[arg(long)]
    pub notes: Option<String>,

    /// Tag ID for online mode (random if omitted)
    #[arg(long)]
    pub tag_id: Option<String>,

    /// Record store file for online mode (overrides config)
    #[arg(long)]
    pub store: Option<PathBuf>,

    /// Base URL for serverless tags (overrides config)
    #[arg(long)]
    pub base_url: Option<String>,
}

impl IssueCommand {
    fn build_profile(&self) -> Result<MedicalProfile> {
        if let Some(path) = &self.profile {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read profile from {}", path.display()))?;
            return serde_json::from_str(&content).context("Failed to parse profile JSON");
        }

        let (Some(name), Some(dob), Some(height), Some(weight), Some(blood_group), Some(contact)) = (
            &self.name,
            self.dob,
            self.height,
            self.weight,
            self.blood_group,
            &self.contact,
        ) else {
            bail!("Provide --profile or all of --name, --dob, --height, --weight, --blood-group, --contact");
        };

        let mut profile = MedicalProfile::new(
            name.as_str(),
            dob,
            height,
            weight,
            blood_group,
            self.substance,
            contact.as_str(),
        );
        profile.pregnant = self.pregnant;
        profile.organ_donor = self.organ_donor;
        profile.allergies = self.allergies.iter().copied().collect();
        profile.medications = self.medications.iter().copied().collect();
        profile.medical_conditions = self.conditions.iter().copied().collect();
        profile.address = self.address.clone();
        profile.vehicle_number = self.vehicle.clone();
        profile.medical_notes = self.notes.clone();
        Ok(profile)
    }
}

impl CommandExecutor for IssueCommand {
    fn execute(&self, config: &OpenTagConfig) -> Result<()> {
        let pin = Pin::parse(&self.pin).context("Invalid PIN")?;
        let profile = self.build_profile()?;

        let mode = match self.mode {
            ModeArg::Serverless => DeliveryMode::Serverless,
            ModeArg::Online => DeliveryMode::Online,
        };

        match issue(&profile, &pin, mode).context("Failed to issue tag")? {
            Issued::Serverless(payload) => {
                if profile.address.is_some()
                    || profile.vehicle_number.is_some()
                    || profile.medical_notes.is_some()
                {
                    eprintln!("Note: address, vehicle number and notes are not carried by serverless tags");
                }

                let base_url = self.base_url.as_deref().unwrap_or(&config.scan_base_url);
                println!("{}", payload.url(base_url));
            }
            Issued::Online(record) => {
                let store_path = match &self.store {
                    Some(path) => path.clone(),
                    None => config
                        .resolved_store_path()
                        .context("Failed to locate record store")?,
                };
                let tag_id = match &self.tag_id {
                    Some(id) => id.clone(),
                    None => generate_tag_id().context("Failed to generate tag ID")?,
                };

                let store = FileStore::new(&store_path);
                let rt = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
                rt.block_on(store.put(&tag_id, record))
                    .with_context(|| format!("Failed to write {}", store_path.display()))?;

                println!("Tag ID: {}", tag_id);
                eprintln!("Stored in {}", store_path.display());
            }
        }

        Ok(())
    }
}
