// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line definitions.

pub mod commands;

use std::path::Path;

use anyhow::Context;
use clap::{Parser, Subcommand};
use stempelwerk_core::StampLimits;

pub use commands::{EncodeCommand, InspectCommand, StampCommand};

#[derive(Parser)]
#[command(name = "stempelwerk")]
#[command(about = "Apply binary stamp payloads to PDF documents")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Stamp a PDF with the overlays described by a payload
    Stamp(StampCommand),

    /// Decode a payload and print its stamps as JSON
    Inspect(InspectCommand),

    /// Build a payload from a JSON array of stamps
    Encode(EncodeCommand),
}

/// Decoder limits from an optional JSON file, with `--strict` applied on top.
pub fn load_limits(path: Option<&Path>, strict: bool) -> anyhow::Result<StampLimits> {
    let mut limits = match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read limits from {}", path.display()))?;
            StampLimits::from_json(&json)?
        }
        None => StampLimits::default(),
    };
    if strict {
        limits.reject_trailing_bytes = true;
    }
    Ok(limits)
}
