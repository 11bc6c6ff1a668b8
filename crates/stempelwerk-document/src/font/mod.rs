// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Font module — metrics for the built-in text stamp face.

pub mod helvetica_bold;

pub use helvetica_bold::{HelveticaBold, encode_win_ansi};

/// Metrics of a font that can be referenced by name without embedding.
///
/// Widths are in glyph space (1/1000 em), so a width `w` at size `s` covers
/// `w * s / 1000` points.
pub trait FontMetrics {
    /// PostScript name written as `/BaseFont`.
    fn base_font(&self) -> &'static str;

    /// Advance width of the glyph the character is written as.
    fn glyph_width(&self, ch: char) -> f64;

    /// Height of capital letters above the baseline.
    fn cap_height_units(&self) -> f64;

    /// Depth below the baseline (negative).
    fn descender_units(&self) -> f64;

    fn string_width(&self, text: &str, size: f64) -> f64 {
        text.chars().map(|ch| self.glyph_width(ch)).sum::<f64>() * size / 1000.0
    }

    fn cap_height(&self, size: f64) -> f64 {
        self.cap_height_units() * size / 1000.0
    }

    fn descent(&self, size: f64) -> f64 {
        self.descender_units() * size / 1000.0
    }
}
