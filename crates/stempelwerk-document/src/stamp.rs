// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stamp applier — validates decoded stamps, lays them out on their pages, and
// hands the result to a PDF engine.
//
// A stamp that fails validation or whose image cannot be decoded is skipped
// and recorded in the `StampReport`; the remaining stamps are still applied.
// The call only fails as a whole when the document itself is unusable or when
// every stamp was skipped.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use stempelwerk_core::error::Result;
use stempelwerk_core::{ApplyError, Stamp, StampError, StampLimits, decode_with};
use tracing::{debug, info, instrument, warn};

use crate::canvas::{Matrix, PageCanvas, Rect};
use crate::engine::{Annotation, AnnotationKind, PdfEngine};
use crate::font::{FontMetrics, HelveticaBold};
use crate::image::{ImageCodec, RasterCodec};
use crate::pdf::LopdfEngine;

/// Smallest side of an annotation rectangle, in points.
const MIN_ANNOTATION_SIDE: f64 = 1.0;

/// How stamps end up in the document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Painted into the page content stream.
    #[default]
    PageContent,
    /// Attached as `/Stamp` and `/FreeText` annotations.
    Annotation,
}

/// Applier configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StampOptions {
    pub limits: StampLimits,
    pub render_mode: RenderMode,
}

/// A stamp that was skipped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StampFailure {
    /// Position of the stamp in the payload.
    pub index: usize,
    pub page_index: u32,
    /// Machine-readable reason, see [`StampError::category`].
    pub category: &'static str,
    pub message: String,
}

/// What happened to each stamp of one call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StampReport {
    pub total: usize,
    pub applied: usize,
    pub failures: Vec<StampFailure>,
}

impl StampReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    fn record(&mut self, index: usize, stamp: &Stamp, err: &StampError) {
        warn!(
            index,
            page_index = stamp.page_index(),
            category = err.category(),
            %err,
            "Stamp skipped"
        );
        self.failures.push(StampFailure {
            index,
            page_index: stamp.page_index(),
            category: err.category(),
            message: err.to_string(),
        });
    }
}

/// Stamped document plus the per-stamp report.
#[derive(Debug, Clone)]
pub struct StampOutcome {
    pub pdf: Vec<u8>,
    pub report: StampReport,
}

/// Either a per-stamp failure or one that aborts the whole call.
enum DrawError {
    Stamp(StampError),
    Apply(ApplyError),
}

impl From<StampError> for DrawError {
    fn from(err: StampError) -> Self {
        Self::Stamp(err)
    }
}

impl From<ApplyError> for DrawError {
    fn from(err: ApplyError) -> Self {
        Self::Apply(err)
    }
}

/// Applies stamp payloads to PDFs.
///
/// The image codec and font metrics are type parameters so tests (and hosts
/// with their own decoders) can swap them without touching the layout code.
#[derive(Debug, Clone)]
pub struct Stamper<C = RasterCodec, F = HelveticaBold> {
    codec: C,
    font: F,
    options: StampOptions,
}

impl Stamper {
    pub fn new(options: StampOptions) -> Self {
        Self::with_parts(RasterCodec, HelveticaBold, options)
    }
}

impl Default for Stamper {
    fn default() -> Self {
        Self::new(StampOptions::default())
    }
}

impl<C: ImageCodec, F: FontMetrics> Stamper<C, F> {
    pub fn with_parts(codec: C, font: F, options: StampOptions) -> Self {
        Self {
            codec,
            font,
            options,
        }
    }

    pub fn options(&self) -> &StampOptions {
        &self.options
    }

    // -- Entry point ----------------------------------------------------------

    /// Decode `payload`, apply it to `pdf`, and serialise the result.
    ///
    /// The payload is decoded before the PDF is parsed, so a malformed payload
    /// is reported as such even when the PDF is also broken.
    #[instrument(skip_all, fields(pdf_len = pdf.len(), payload_len = payload.len()))]
    pub fn stamp(&self, pdf: &[u8], payload: &[u8]) -> Result<StampOutcome> {
        let stamps = decode_with(payload, &self.options.limits)?;
        let mut engine = LopdfEngine::from_bytes(pdf)?;
        let report = self.apply(&mut engine, &stamps)?;
        let pdf = engine.serialize()?;

        info!(
            total = report.total,
            applied = report.applied,
            failed = report.failed(),
            "Stamping complete"
        );
        Ok(StampOutcome { pdf, report })
    }

    // -- Application ----------------------------------------------------------

    /// Apply already-decoded stamps to `engine`. Serialisation is left to the
    /// caller.
    pub fn apply<E: PdfEngine>(
        &self,
        engine: &mut E,
        stamps: &[Stamp],
    ) -> std::result::Result<StampReport, ApplyError> {
        let page_count = engine.page_count();
        if page_count == 0 {
            return Err(ApplyError::NoPages);
        }

        let mut report = StampReport {
            total: stamps.len(),
            ..StampReport::default()
        };

        // Ascending page order, payload order within a page.
        let mut pages: BTreeMap<usize, Vec<(usize, &Stamp)>> = BTreeMap::new();
        for (index, stamp) in stamps.iter().enumerate() {
            match self.check(stamp, page_count) {
                Ok(page) => pages.entry(page).or_default().push((index, stamp)),
                Err(err) => report.record(index, stamp, &err),
            }
        }

        for (page, batch) in pages {
            match self.options.render_mode {
                RenderMode::PageContent => self.paint_page(engine, page, &batch, &mut report)?,
                RenderMode::Annotation => self.annotate_page(engine, page, &batch, &mut report)?,
            }
        }

        if report.applied == 0 && report.failed() > 0 {
            return Err(ApplyError::AllStampsFailed {
                failed: report.failed(),
                total: report.total,
            });
        }
        Ok(report)
    }

    fn check(&self, stamp: &Stamp, page_count: usize) -> std::result::Result<usize, StampError> {
        let page = stamp.page_index() as usize;
        if page >= page_count {
            return Err(StampError::PageOutOfRange {
                page_index: stamp.page_index(),
                page_count,
            });
        }
        stamp.validate(&self.options.limits)?;
        Ok(page)
    }

    fn paint_page<E: PdfEngine>(
        &self,
        engine: &mut E,
        page: usize,
        batch: &[(usize, &Stamp)],
        report: &mut StampReport,
    ) -> std::result::Result<(), ApplyError> {
        let mut canvas = PageCanvas::new();
        for &(index, stamp) in batch {
            match self.draw(engine, &mut canvas, stamp) {
                Ok(_) => report.applied += 1,
                Err(DrawError::Stamp(err)) => report.record(index, stamp, &err),
                Err(DrawError::Apply(err)) => return Err(err),
            }
        }
        if !canvas.is_empty() {
            engine.append_page_content(page, &canvas)?;
        }
        debug!(page, stamps = batch.len(), "Page stamped");
        Ok(())
    }

    fn annotate_page<E: PdfEngine>(
        &self,
        engine: &mut E,
        page: usize,
        batch: &[(usize, &Stamp)],
        report: &mut StampReport,
    ) -> std::result::Result<(), ApplyError> {
        for &(index, stamp) in batch {
            let mut appearance = PageCanvas::new();
            match self.draw(engine, &mut appearance, stamp) {
                Ok(bounds) => {
                    let annotation = self.annotation(stamp, bounds, appearance);
                    engine.add_annotation(page, &annotation)?;
                    report.applied += 1;
                }
                Err(DrawError::Stamp(err)) => report.record(index, stamp, &err),
                Err(DrawError::Apply(err)) => return Err(err),
            }
        }
        debug!(page, stamps = batch.len(), "Page annotated");
        Ok(())
    }

    // -- Layout ---------------------------------------------------------------

    /// Draw one stamp and return the page-space bounds of what was drawn.
    fn draw<E: PdfEngine>(
        &self,
        engine: &mut E,
        canvas: &mut PageCanvas,
        stamp: &Stamp,
    ) -> std::result::Result<Rect, DrawError> {
        let placement = stamp.placement();
        let rotation = placement.normalized_rotation();
        let turn = Matrix::rotation_about(placement.cx, placement.cy, rotation);

        match stamp {
            Stamp::Image(image) => {
                let decoded = self.codec.decode(&image.image)?;
                let handle = engine.embed_image(&decoded)?;
                let (x, y, width, height) = image.rect();
                let rect = Rect::from_origin(x, y, width, height);
                canvas.draw_rotated_image(handle, rect, rotation);
                Ok(rect.transformed(&turn))
            }
            Stamp::Text(text) => {
                let size = text.font_size;
                let width = self.font.string_width(&text.text, size);
                let cap_height = self.font.cap_height(size);
                let origin = (placement.cx - width / 2.0, placement.cy - cap_height / 2.0);

                let mut scope = canvas.save_state();
                scope.rotate_about(placement.cx, placement.cy, rotation);
                scope.draw_text(
                    self.font.base_font(),
                    size,
                    text.color.rgb_unit(),
                    origin,
                    &text.text,
                );

                let descent = self.font.descent(size);
                let extent = Rect::from_origin(origin.0, origin.1 + descent, width, cap_height - descent);
                Ok(extent.transformed(&turn))
            }
        }
    }

    fn annotation(&self, stamp: &Stamp, bounds: Rect, appearance: PageCanvas) -> Annotation {
        let rect = bounds.at_least(MIN_ANNOTATION_SIDE);
        match stamp {
            Stamp::Image(_) => Annotation {
                kind: AnnotationKind::Stamp,
                rect,
                contents: None,
                default_appearance: None,
                appearance,
            },
            Stamp::Text(text) => {
                let (r, g, b) = text.color.rgb_unit();
                Annotation {
                    kind: AnnotationKind::FreeText,
                    rect,
                    contents: Some(text.text.clone()),
                    default_appearance: Some(format!(
                        "/HeBo {} Tf {} {} {} rg",
                        text.font_size, r, g, b
                    )),
                    appearance,
                }
            }
        }
    }
}

/// Stamp `pdf` with `payload` using default limits, painting into page
/// content.
pub fn stamp(pdf: &[u8], payload: &[u8]) -> Result<Vec<u8>> {
    Stamper::new(StampOptions::default())
        .stamp(pdf, payload)
        .map(|outcome| outcome.pdf)
}
