//! Lookup command: resolve an online tag from the record store.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use opentag::config::OpenTagConfig;
use opentag::{FileStore, TagSource};

use super::{print_profile, resolve_blocking, CommandExecutor};

/// Resolve an online tag by its ID.
#[derive(Args, Debug)]
pub struct LookupCommand {
    /// Tag ID printed by `issue --mode online`
    pub tag_id: String,

    /// PIN to try once instead of prompting
    #[arg(short, long)]
    pub pin: Option<String>,

    /// Record store file (overrides config)
    #[arg(long)]
    pub store: Option<PathBuf>,

    /// Print the profile as JSON
    #[arg(long)]
    pub json: bool,
}

impl CommandExecutor for LookupCommand {
    fn execute(&self, config: &OpenTagConfig) -> Result<()> {
        let store_path = match &self.store {
            Some(path) => path.clone(),
            None => config
                .resolved_store_path()
                .context("Failed to locate record store")?,
        };

        let store = FileStore::new(store_path);
        let profile = resolve_blocking(
            TagSource::Online(self.tag_id.clone()),
            &store,
            self.pin.as_deref(),
        )?;
        print_profile(&profile, self.json)
    }
}
