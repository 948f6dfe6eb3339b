//! Inspect command: show how a plaintext record string decodes.

use anyhow::{Context, Result};
use clap::Args;

use opentag::codec::{fields, flags, EncodedRecord};
use opentag::config::OpenTagConfig;
use opentag::decode_record;

use super::{print_profile, CommandExecutor};

/// Decode a plaintext record (numeric-binary-name-contact) step by step.
#[derive(Args, Debug)]
pub struct InspectCommand {
    /// Record string, as sealed inside a serverless tag
    pub record: String,

    /// Print the decoded profile as JSON
    #[arg(long)]
    pub json: bool,
}

impl CommandExecutor for InspectCommand {
    fn execute(&self, _config: &OpenTagConfig) -> Result<()> {
        let record: EncodedRecord = self.record.parse().context("Failed to split record")?;

        let digits = fields::unpack_digits(&record.numeric).context("Failed to decode numeric part")?;
        let bits = flags::unpack(&record.binary)
            .context("Failed to decode binary part")?
            .to_bits();
        let contact = fields::unpack_contact(&record.contact).context("Failed to decode contact")?;

        println!("Record Structure");
        println!("================");
        println!("  Numeric part: {} -> {}", record.numeric, digits);
        println!(
            "    DOB {}  height {}  weight {}  blood {}  substance {}",
            &digits[0..8],
            &digits[8..11],
            &digits[11..14],
            &digits[14..15],
            &digits[15..16]
        );
        println!(
            "    Plausible birth year: {}",
            if fields::has_plausible_birth_year(&digits) { "yes" } else { "no" }
        );
        println!("  Binary part: {} -> {}", record.binary, bits);
        println!("  Name: {}", record.name);
        println!("  Contact part: {} -> {}", record.contact, contact);
        println!();

        let profile = decode_record(&record).context("Failed to decode record")?;
        print_profile(&profile, self.json)
    }
}
