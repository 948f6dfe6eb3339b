//! Command module - Strategy pattern for CLI commands.
//!
//! Each command is a separate module implementing the `CommandExecutor` trait.

mod inspect;
mod issue;
mod lookup;
mod scan;

pub use inspect::InspectCommand;
pub use issue::IssueCommand;
pub use lookup::LookupCommand;
pub use scan::ScanCommand;

use std::io::Write;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Local;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use opentag::config::OpenTagConfig;
use opentag::profile::{Catalog, MedicalProfile};
use opentag::{resolve, PinEntry, PinPrompt, PinProvider, RecordStore, ScriptedPins, TagSource};

/// Trait for command execution - Strategy pattern.
///
/// Each command struct holds its parsed arguments and implements
/// this trait to define its execution logic.
pub trait CommandExecutor {
    /// Executes the command with its parsed arguments.
    fn execute(&self, config: &OpenTagConfig) -> Result<()>;
}

/// Reads PIN attempts from stdin, one line each. EOF cancels.
pub struct StdinPins {
    lines: Lines<BufReader<Stdin>>,
}

impl StdinPins {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }
}

#[async_trait]
impl PinProvider for StdinPins {
    async fn request_pin(&mut self, prompt: &PinPrompt) -> Option<String> {
        if let Some(placeholder) = &prompt.placeholder {
            eprintln!("Tag: {} (blood group {})", placeholder.full_name, placeholder.blood_group);
        }
        if let Some(error) = &prompt.error {
            eprintln!("{}", error);
        }
        eprint!("Enter 4-digit PIN: ");
        let _ = std::io::stderr().flush();

        let line = self.lines.next_line().await.ok().flatten()?;

        // Same rules as the PIN boxes: digits only, first four kept
        let mut entry = PinEntry::new();
        entry.input(&line);
        match entry.pin() {
            Some(pin) => Some(String::from_utf8_lossy(pin.as_bytes()).into_owned()),
            None => Some(line.trim().to_string()),
        }
    }
}

/// Resolves `source`, taking the PIN from `--pin` or prompting on stdin.
pub fn resolve_blocking<S>(source: TagSource, store: &S, pin: Option<&str>) -> Result<MedicalProfile>
where
    S: RecordStore + ?Sized,
{
    let rt = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;

    rt.block_on(async {
        let profile = match pin {
            Some(pin) => resolve(&source, store, &mut ScriptedPins::new([pin])).await,
            None => resolve(&source, store, &mut StdinPins::new()).await,
        };
        profile.context("Failed to resolve tag")
    })
}

/// Prints a resolved profile, as JSON or as a human readable card.
pub fn print_profile(profile: &MedicalProfile, json: bool) -> Result<()> {
    if json {
        let text = serde_json::to_string_pretty(profile).context("Failed to serialize profile")?;
        println!("{}", text);
        return Ok(());
    }

    let summary = profile.summary(Local::now().date_naive());

    println!("{}", profile.full_name);
    println!("{}", "=".repeat(profile.full_name.chars().count().max(8)));
    println!("  Date of birth: {} ({})", profile.date_of_birth, summary.age);
    println!("  Blood group: {}", profile.blood_group);
    println!(
        "  Height: {} cm ({:.1} in)",
        profile.height_cm, summary.height_in
    );
    println!(
        "  Weight: {} kg ({:.1} lbs)",
        profile.weight_kg, summary.weight_lb
    );
    match (summary.bmi, summary.bmi_category) {
        (Some(bmi), Some(category)) => println!("  BMI: {:.1} ({})", bmi, category),
        _ => println!("  BMI: n/a"),
    }
    println!("  Substance use: {}", profile.substance_use);
    println!("  Pregnant: {}", yes_no(profile.pregnant));
    println!("  Organ donor: {}", yes_no(profile.organ_donor));
    println!("  Allergies: {}", list(&profile.allergies));
    println!("  Medications: {}", list(&profile.medications));
    println!("  Medical conditions: {}", list(&profile.medical_conditions));
    println!("  Emergency contact: {}", profile.emergency_contact);

    for (label, value) in [
        ("Address", &profile.address),
        ("Vehicle number", &profile.vehicle_number),
        ("Medical notes", &profile.medical_notes),
    ] {
        if let Some(value) = value {
            println!("  {}: {}", label, value);
        }
    }

    Ok(())
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

fn list<'a, T, I>(items: I) -> String
where
    T: Catalog + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let labels: Vec<&str> = items.into_iter().map(|item| item.label()).collect();
    if labels.is_empty() {
        "None".to_string()
    } else {
        labels.join(", ")
    }
}
