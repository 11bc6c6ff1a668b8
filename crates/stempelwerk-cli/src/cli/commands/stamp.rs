// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `stempelwerk stamp` — apply a payload to a PDF file.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use stempelwerk_document::{RenderMode, StampOptions, StampReport, Stamper};
use tracing::info;

use crate::cli::load_limits;

/// Stamp a PDF with the overlays described by a binary payload
#[derive(Args)]
pub struct StampCommand {
    /// Source PDF
    pub pdf: PathBuf,

    /// Binary stamp payload
    pub payload: PathBuf,

    /// Where to write the stamped PDF
    #[arg(long, short = 'o')]
    pub output: PathBuf,

    /// Attach stamps as annotations instead of painting them into the page
    #[arg(long)]
    pub annotations: bool,

    /// Reject payloads with bytes after the last stamp
    #[arg(long)]
    pub strict: bool,

    /// JSON file with decoder limits
    #[arg(long)]
    pub limits: Option<PathBuf>,

    /// Print the per-stamp report as JSON on stdout
    #[arg(long)]
    pub report: bool,
}

impl StampCommand {
    pub fn run(&self) -> anyhow::Result<()> {
        let report = self.execute()?;
        if self.report {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Ok(())
    }

    fn options(&self) -> anyhow::Result<StampOptions> {
        let render_mode = if self.annotations {
            RenderMode::Annotation
        } else {
            RenderMode::PageContent
        };
        Ok(StampOptions {
            limits: load_limits(self.limits.as_deref(), self.strict)?,
            render_mode,
        })
    }

    /// Stamp and write the output file. Nothing is written on failure.
    fn execute(&self) -> anyhow::Result<StampReport> {
        let pdf = fs::read(&self.pdf)
            .with_context(|| format!("failed to read PDF {}", self.pdf.display()))?;
        let payload = fs::read(&self.payload)
            .with_context(|| format!("failed to read payload {}", self.payload.display()))?;

        let outcome = Stamper::new(self.options()?).stamp(&pdf, &payload)?;

        fs::write(&self.output, &outcome.pdf)
            .with_context(|| format!("failed to write {}", self.output.display()))?;
        info!(
            output = %self.output.display(),
            applied = outcome.report.applied,
            failed = outcome.report.failed(),
            "Stamped PDF written"
        );
        Ok(outcome.report)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use stempelwerk_core::{StempelwerkError, encode};

    use super::*;
    use crate::cli::commands::fixtures::{blank_pdf, text_stamp};

    fn command(dir: &Path, payload: &[u8]) -> StampCommand {
        let pdf_path = dir.join("in.pdf");
        let payload_path = dir.join("stamps.bin");
        fs::write(&pdf_path, blank_pdf()).unwrap();
        fs::write(&payload_path, payload).unwrap();
        StampCommand {
            pdf: pdf_path,
            payload: payload_path,
            output: dir.join("out.pdf"),
            annotations: false,
            strict: false,
            limits: None,
            report: false,
        }
    }

    #[test]
    fn writes_stamped_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let payload = encode(&[text_stamp(0, "APPROVED"), text_stamp(4, "LOST")]);
        let cmd = command(dir.path(), &payload);

        let report = cmd.execute().unwrap();
        assert_eq!(report.total, 2);
        assert_eq!(report.applied, 1);
        assert_eq!(report.failures[0].category, "PAGE_OUT_OF_RANGE");

        let written = fs::read(&cmd.output).unwrap();
        assert!(written.starts_with(b"%PDF"));
    }

    #[test]
    fn failure_leaves_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let cmd = command(dir.path(), &encode(&[text_stamp(9, "LOST")]));

        let err = cmd.execute().unwrap_err();
        let err = err.downcast_ref::<StempelwerkError>().unwrap();
        assert_eq!(err.category(), "ALL_STAMPS_FAILED");
        assert!(!cmd.output.exists());
    }

    #[test]
    fn strict_rejects_trailing_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let mut payload = encode(&[text_stamp(0, "APPROVED")]);
        payload.extend_from_slice(&[0, 0]);

        let lenient = command(dir.path(), &payload);
        assert!(lenient.execute().is_ok());

        let strict = StampCommand {
            strict: true,
            output: dir.path().join("strict.pdf"),
            ..command(dir.path(), &payload)
        };
        let err = strict.execute().unwrap_err();
        let err = err.downcast_ref::<StempelwerkError>().unwrap();
        assert_eq!(err.category(), "TRAILING_BYTES");
    }

    #[test]
    fn annotations_flag_selects_render_mode() {
        let dir = tempfile::tempdir().unwrap();
        let cmd = StampCommand {
            annotations: true,
            ..command(dir.path(), &[])
        };
        assert_eq!(cmd.options().unwrap().render_mode, RenderMode::Annotation);
    }

    #[test]
    fn missing_input_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let cmd = StampCommand {
            pdf: dir.path().join("absent.pdf"),
            ..command(dir.path(), &[])
        };
        let err = cmd.execute().unwrap_err();
        assert!(err.to_string().contains("absent.pdf"));
    }
}
