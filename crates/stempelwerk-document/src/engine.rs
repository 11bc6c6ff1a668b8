// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF engine abstraction — the document capabilities the stamp applier needs.
//
// The production implementation is `pdf::LopdfEngine`; tests substitute a
// recording engine so placement can be checked without parsing PDF output.

use stempelwerk_core::ApplyError;

use crate::canvas::{PageCanvas, Rect};
use crate::image::DecodedImage;

/// Engine-issued reference to an embedded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageHandle(pub usize);

/// Annotation subtypes the applier produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationKind {
    /// `/Stamp`, used for image stamps.
    Stamp,
    /// `/FreeText`, used for text stamps.
    FreeText,
}

impl AnnotationKind {
    pub fn subtype(self) -> &'static str {
        match self {
            Self::Stamp => "Stamp",
            Self::FreeText => "FreeText",
        }
    }
}

/// A page annotation whose normal appearance is drawn from `appearance`.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub kind: AnnotationKind,
    /// Annotation rectangle; also the appearance stream's bounding box.
    pub rect: Rect,
    /// Alternate text shown by viewers.
    pub contents: Option<String>,
    /// `/DA` default appearance string (free-text annotations).
    pub default_appearance: Option<String>,
    pub appearance: PageCanvas,
}

/// Document operations the stamp applier relies on.
///
/// Each call owns its engine exclusively; none of these methods are expected
/// to be thread-safe.
pub trait PdfEngine {
    fn page_count(&self) -> usize;

    /// Add a bitmap to the document and return a handle canvases can draw.
    fn embed_image(&mut self, image: &DecodedImage) -> Result<ImageHandle, ApplyError>;

    /// Append drawing ops after the page's existing content. Existing
    /// content is kept and its graphics state cannot leak into the ops.
    fn append_page_content(
        &mut self,
        page_index: usize,
        canvas: &PageCanvas,
    ) -> Result<(), ApplyError>;

    fn add_annotation(
        &mut self,
        page_index: usize,
        annotation: &Annotation,
    ) -> Result<(), ApplyError>;

    /// Write the whole document. Called once, after every page mutation.
    fn serialize(&mut self) -> Result<Vec<u8>, ApplyError>;
}
