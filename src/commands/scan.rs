//! Scan command: resolve a serverless tag.

use anyhow::Result;
use clap::Args;

use opentag::config::OpenTagConfig;
use opentag::{MemoryStore, TagSource};

use super::{print_profile, resolve_blocking, CommandExecutor};

/// Resolve a serverless tag URL.
///
/// Prompts for the PIN on stdin until it is correct (Ctrl-D to give up),
/// unless --pin is given.
#[derive(Args, Debug)]
pub struct ScanCommand {
    /// Tag URL, query string (data=...&enc=...) or bare payload
    pub tag: String,

    /// PIN to try once instead of prompting
    #[arg(short, long)]
    pub pin: Option<String>,

    /// Print the profile as JSON
    #[arg(long)]
    pub json: bool,
}

impl CommandExecutor for ScanCommand {
    fn execute(&self, _config: &OpenTagConfig) -> Result<()> {
        // Serverless tags never touch the store
        let store = MemoryStore::new();
        let profile = resolve_blocking(
            TagSource::Serverless(self.tag.clone()),
            &store,
            self.pin.as_deref(),
        )?;
        print_profile(&profile, self.json)
    }
}
