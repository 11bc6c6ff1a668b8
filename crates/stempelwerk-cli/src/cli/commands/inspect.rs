// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `stempelwerk inspect` — decode a payload and print it as JSON.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use serde::Serialize;
use stempelwerk_core::{Placement, Stamp, StampType, decode_with};

use crate::cli::load_limits;

/// Decode a payload and print its stamps as JSON
#[derive(Args)]
pub struct InspectCommand {
    /// Binary stamp payload
    pub payload: PathBuf,

    /// Include raw image bytes instead of their length
    #[arg(long)]
    pub full: bool,

    /// Reject payloads with bytes after the last stamp
    #[arg(long)]
    pub strict: bool,

    /// JSON file with decoder limits
    #[arg(long)]
    pub limits: Option<PathBuf>,
}

/// Compact view of one stamp.
#[derive(Debug, Serialize)]
struct StampSummary<'a> {
    index: usize,
    kind: StampType,
    placement: &'a Placement,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_bytes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    font_size: Option<f64>,
    /// `#RRGGBB`
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
}

impl<'a> StampSummary<'a> {
    fn new(index: usize, stamp: &'a Stamp) -> Self {
        let mut summary = Self {
            index,
            kind: stamp.stamp_type(),
            placement: stamp.placement(),
            image_bytes: None,
            font_size: None,
            color: None,
            text: None,
        };
        match stamp {
            Stamp::Image(image) => summary.image_bytes = Some(image.image.len()),
            Stamp::Text(text) => {
                summary.font_size = Some(text.font_size);
                summary.color = Some(format!(
                    "#{:02X}{:02X}{:02X}",
                    text.color.red(),
                    text.color.green(),
                    text.color.blue()
                ));
                summary.text = Some(&text.text);
            }
        }
        summary
    }
}

impl InspectCommand {
    pub fn run(&self) -> anyhow::Result<()> {
        println!("{}", self.render()?);
        Ok(())
    }

    fn render(&self) -> anyhow::Result<String> {
        let payload = fs::read(&self.payload)
            .with_context(|| format!("failed to read payload {}", self.payload.display()))?;
        let limits = load_limits(self.limits.as_deref(), self.strict)?;
        let stamps = decode_with(&payload, &limits)?;

        let json = if self.full {
            serde_json::to_string_pretty(&stamps)?
        } else {
            let summaries: Vec<StampSummary<'_>> = stamps
                .iter()
                .enumerate()
                .map(|(index, stamp)| StampSummary::new(index, stamp))
                .collect();
            serde_json::to_string_pretty(&summaries)?
        };
        Ok(json)
    }
}

#[cfg(test)]
mod tests {
    use stempelwerk_core::{DecodeError, ImageStamp, encode};

    use super::*;
    use crate::cli::commands::fixtures::text_stamp;

    fn image_stamp() -> Stamp {
        Stamp::Image(ImageStamp {
            placement: Placement {
                page_index: 1,
                cx: 100.0,
                cy: 200.0,
                width: 50.0,
                height: 20.0,
                rotation_deg: 0.0,
            },
            image: vec![0x89, b'P', b'N', b'G', 0, 0, 0, 0],
        })
    }

    fn command(payload: &[u8]) -> (tempfile::TempDir, InspectCommand) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stamps.bin");
        fs::write(&path, payload).unwrap();
        let cmd = InspectCommand {
            payload: path,
            full: false,
            strict: false,
            limits: None,
        };
        (dir, cmd)
    }

    #[test]
    fn summary_replaces_image_bytes_with_length() {
        let (_dir, cmd) = command(&encode(&[image_stamp(), text_stamp(0, "HELLO")]));
        let json: serde_json::Value = serde_json::from_str(&cmd.render().unwrap()).unwrap();

        assert_eq!(json[0]["kind"], "Image");
        assert_eq!(json[0]["image_bytes"], 8);
        assert!(json[0].get("text").is_none());
        assert_eq!(json[1]["kind"], "Text");
        assert_eq!(json[1]["text"], "HELLO");
        assert_eq!(json[1]["color"], "#CC0000");
        assert_eq!(json[1]["placement"]["rotation_deg"], 30.0);
    }

    #[test]
    fn full_output_parses_back_into_stamps() {
        let stamps = vec![image_stamp()];
        let (_dir, mut cmd) = command(&encode(&stamps));
        cmd.full = true;

        let parsed: Vec<Stamp> = serde_json::from_str(&cmd.render().unwrap()).unwrap();
        assert_eq!(parsed, stamps);
    }

    #[test]
    fn bad_payload_surfaces_decode_error() {
        let (_dir, cmd) = command(b"not a payload");
        let err = cmd.render().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DecodeError>(),
            Some(DecodeError::BadMagic(_))
        ));
    }
}
