// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for Stempelwerk: stamps, placement, and colour.

use serde::{Deserialize, Serialize};

use crate::config::StampLimits;
use crate::error::StampError;

/// Payload magic number ("PSTM" when the little-endian bytes are read as ASCII).
pub const PAYLOAD_MAGIC: u32 = 0x4D54_5350;

/// The only payload version understood by this decoder.
pub const PAYLOAD_VERSION: u32 = 1;

/// Wire discriminant of a stamp record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StampType {
    Image,
    Text,
}

impl StampType {
    /// The leading type byte on the wire.
    pub fn wire_tag(self) -> u8 {
        match self {
            Self::Image => 1,
            Self::Text => 2,
        }
    }

    pub fn from_wire_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(Self::Image),
            2 => Some(Self::Text),
            _ => None,
        }
    }
}

/// Kind of a length-prefixed block, used in limit errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    Image,
    Text,
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Image => write!(f, "image"),
            Self::Text => write!(f, "text"),
        }
    }
}

/// Fields shared by every stamp record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// 0-based target page.
    pub page_index: u32,
    /// Center x in PDF user-space points.
    pub cx: f64,
    /// Center y in PDF user-space points.
    pub cy: f64,
    /// Nominal width (image stamps only).
    pub width: f64,
    /// Nominal height (image stamps only).
    pub height: f64,
    /// Clockwise rotation in degrees, any real value.
    pub rotation_deg: f64,
}

impl Placement {
    /// Rotation folded into `[0, 360)`.
    pub fn normalized_rotation(&self) -> f64 {
        normalize_rotation(self.rotation_deg)
    }

    fn validate(&self, limits: &StampLimits) -> Result<(), StampError> {
        let fields = [
            ("cx", self.cx),
            ("cy", self.cy),
            ("width", self.width),
            ("height", self.height),
            ("rotation_deg", self.rotation_deg),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(StampError::NonFinite { field });
            }
        }
        if self.cx.abs() > limits.max_coordinate || self.cy.abs() > limits.max_coordinate {
            return Err(StampError::CoordinateOutOfRange {
                cx: self.cx,
                cy: self.cy,
                limit: limits.max_coordinate,
            });
        }
        Ok(())
    }
}

/// Fold any finite angle into `[0, 360)`; `450` becomes `90`, `-90` becomes `270`.
pub fn normalize_rotation(degrees: f64) -> f64 {
    let folded = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs.
    if folded >= 360.0 { 0.0 } else { folded }
}

/// Packed `0xAARRGGBB` colour. The alpha byte is carried but never used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Argb(pub u32);

impl Argb {
    pub fn red(self) -> u8 {
        ((self.0 >> 16) & 0xFF) as u8
    }

    pub fn green(self) -> u8 {
        ((self.0 >> 8) & 0xFF) as u8
    }

    pub fn blue(self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    /// RGB channels scaled to `0.0..=1.0` for PDF colour operators.
    pub fn rgb_unit(self) -> (f32, f32, f32) {
        (
            f32::from(self.red()) / 255.0,
            f32::from(self.green()) / 255.0,
            f32::from(self.blue()) / 255.0,
        )
    }
}

/// A raster image overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageStamp {
    pub placement: Placement,
    /// Encoded image (PNG in practice).
    pub image: Vec<u8>,
}

impl ImageStamp {
    /// Lower-left corner and size of the unrotated placement rectangle.
    pub fn rect(&self) -> (f64, f64, f64, f64) {
        let p = &self.placement;
        (p.cx - p.width / 2.0, p.cy - p.height / 2.0, p.width, p.height)
    }
}

/// A single line of text drawn in the built-in bold face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStamp {
    pub placement: Placement,
    pub font_size: f64,
    pub color: Argb,
    pub text: String,
}

/// One overlay instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stamp {
    Image(ImageStamp),
    Text(TextStamp),
}

impl Stamp {
    pub fn placement(&self) -> &Placement {
        match self {
            Self::Image(s) => &s.placement,
            Self::Text(s) => &s.placement,
        }
    }

    pub fn page_index(&self) -> u32 {
        self.placement().page_index
    }

    pub fn stamp_type(&self) -> StampType {
        match self {
            Self::Image(_) => StampType::Image,
            Self::Text(_) => StampType::Text,
        }
    }

    /// Check value ranges. A failure here skips only this stamp; the page
    /// index is checked separately against the document.
    pub fn validate(&self, limits: &StampLimits) -> Result<(), StampError> {
        let placement = self.placement();
        placement.validate(limits)?;

        match self {
            Self::Image(stamp) => {
                let (w, h) = (placement.width, placement.height);
                if w <= 0.0 || h <= 0.0 || w > limits.max_dimension || h > limits.max_dimension {
                    return Err(StampError::InvalidSize {
                        width: w,
                        height: h,
                    });
                }
                if stamp.image.is_empty() {
                    return Err(StampError::EmptyImage);
                }
            }
            Self::Text(stamp) => {
                if !stamp.font_size.is_finite() {
                    return Err(StampError::NonFinite { field: "font_size" });
                }
                if stamp.font_size <= 0.0 || stamp.font_size > limits.max_font_size {
                    return Err(StampError::FontSizeOutOfRange(stamp.font_size));
                }
            }
        }
        Ok(())
    }
}
