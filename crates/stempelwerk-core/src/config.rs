// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Decoder and validation limits.

use serde::{Deserialize, Serialize};

use crate::error::{Result, StempelwerkError};

/// Upper bounds applied while decoding and validating a payload.
///
/// Length and count limits are fatal when exceeded (they bound allocation for
/// hostile input); numeric range limits make a single stamp fail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StampLimits {
    /// Maximum number of stamp records in one payload.
    pub max_stamp_count: u32,
    /// Maximum length of an image block in bytes.
    pub max_image_bytes: u32,
    /// Maximum length of a text block in bytes.
    pub max_text_bytes: u32,
    /// Maximum absolute value of a stamp center coordinate, in points.
    pub max_coordinate: f64,
    /// Maximum image stamp width or height, in points.
    pub max_dimension: f64,
    /// Maximum text stamp font size, in points.
    pub max_font_size: f64,
    /// Fail decoding when bytes remain after the last declared stamp.
    pub reject_trailing_bytes: bool,
}

impl Default for StampLimits {
    fn default() -> Self {
        Self {
            max_stamp_count: 10_000,
            max_image_bytes: 100 * 1024 * 1024,
            max_text_bytes: 10 * 1024 * 1024,
            max_coordinate: 1e6,
            max_dimension: 1e6,
            max_font_size: 1000.0,
            reject_trailing_bytes: false,
        }
    }
}

impl StampLimits {
    /// Limits that also reject trailing bytes after the last stamp.
    pub fn strict() -> Self {
        Self {
            reject_trailing_bytes: true,
            ..Self::default()
        }
    }

    /// Parse limits from JSON. Missing fields take their default values.
    pub fn from_json(json: &str) -> Result<Self> {
        let limits: Self = serde_json::from_str(json)?;
        limits.check()?;
        Ok(limits)
    }

    fn check(&self) -> Result<()> {
        let ranges = [
            ("max_coordinate", self.max_coordinate),
            ("max_dimension", self.max_dimension),
            ("max_font_size", self.max_font_size),
        ];
        for (name, value) in ranges {
            if !value.is_finite() || value <= 0.0 {
                return Err(StempelwerkError::Config(format!(
                    "{name} must be a positive finite number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let limits = StampLimits::from_json(r#"{"max_stamp_count": 5}"#).unwrap();
        assert_eq!(limits.max_stamp_count, 5);
        assert_eq!(limits.max_text_bytes, 10 * 1024 * 1024);
        assert!(!limits.reject_trailing_bytes);
    }

    #[test]
    fn negative_range_is_rejected() {
        let err = StampLimits::from_json(r#"{"max_font_size": -1.0}"#).unwrap_err();
        assert_eq!(err.category(), "CONFIG");
    }

    #[test]
    fn strict_rejects_trailing_bytes() {
        assert!(StampLimits::strict().reject_trailing_bytes);
    }
}
