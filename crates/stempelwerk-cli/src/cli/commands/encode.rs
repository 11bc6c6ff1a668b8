// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `stempelwerk encode` — build a binary payload from JSON.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, ensure};
use clap::Args;
use stempelwerk_core::{Stamp, encode};
use tracing::info;

/// Build a payload from a JSON array of stamps
#[derive(Args)]
pub struct EncodeCommand {
    /// JSON file holding an array of stamps, as printed by `inspect --full`
    pub stamps: PathBuf,

    /// Where to write the payload
    #[arg(long, short = 'o')]
    pub output: PathBuf,
}

impl EncodeCommand {
    pub fn run(&self) -> anyhow::Result<()> {
        let json = fs::read_to_string(&self.stamps)
            .with_context(|| format!("failed to read {}", self.stamps.display()))?;
        let stamps: Vec<Stamp> = serde_json::from_str(&json)
            .with_context(|| format!("{} is not a stamp array", self.stamps.display()))?;
        ensure!(
            u32::try_from(stamps.len()).is_ok(),
            "too many stamps: {}",
            stamps.len()
        );

        let payload = encode(&stamps);
        fs::write(&self.output, &payload)
            .with_context(|| format!("failed to write {}", self.output.display()))?;
        info!(
            stamps = stamps.len(),
            bytes = payload.len(),
            output = %self.output.display(),
            "Payload written"
        );
        Ok(())
    }
}
