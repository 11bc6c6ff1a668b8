// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// stempelwerk-document — Applies decoded stamp payloads to PDF documents.
//
// Provides the engine/codec/font seams (`PdfEngine`, `ImageCodec`,
// `FontMetrics`), their production implementations (lopdf, the `image` crate,
// built-in Helvetica-Bold metrics), the per-page drawing canvas, and the stamp
// applier with its `stamp(pdf, payload)` entry point.

pub mod canvas;
pub mod engine;
pub mod font;
pub mod image;
pub mod pdf;
pub mod stamp;

#[cfg(test)]
pub(crate) mod fixtures;

// Re-export the primary types so callers can use `stempelwerk_document::Stamper` etc.
pub use canvas::{Matrix, PageCanvas, Rect};
pub use engine::{Annotation, AnnotationKind, ImageHandle, PdfEngine};
pub use font::{FontMetrics, HelveticaBold};
pub use self::image::{DecodedImage, ImageCodec, RasterCodec};
pub use pdf::LopdfEngine;
pub use stamp::{
    RenderMode, StampFailure, StampOptions, StampOutcome, StampReport, Stamper, stamp,
};
