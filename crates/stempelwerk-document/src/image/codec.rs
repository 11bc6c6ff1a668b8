// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image codec — turns encoded stamp images (PNG in practice) into 8-bit RGB
// planes plus an optional alpha mask, the shape a PDF image XObject wants.

use image::DynamicImage;
use stempelwerk_core::StampError;
use tracing::{debug, instrument};

/// A decoded bitmap ready to be embedded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    /// Interleaved RGB, `width * height * 3` bytes.
    pub rgb: Vec<u8>,
    /// One byte per pixel; `None` when every pixel is opaque.
    pub alpha: Option<Vec<u8>>,
}

impl DecodedImage {
    /// Split a decoded image into colour and alpha planes.
    pub fn from_dynamic(image: &DynamicImage) -> Self {
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        let pixels = (width as usize) * (height as usize);

        let mut rgb = Vec::with_capacity(pixels * 3);
        let mut alpha = Vec::with_capacity(pixels);
        for pixel in rgba.pixels() {
            rgb.extend_from_slice(&pixel.0[..3]);
            alpha.push(pixel.0[3]);
        }
        let alpha = if alpha.iter().all(|&a| a == u8::MAX) {
            None
        } else {
            Some(alpha)
        };

        Self {
            width,
            height,
            rgb,
            alpha,
        }
    }
}

/// Decodes image bytes. A failure only skips the stamp that carried them.
pub trait ImageCodec {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedImage, StampError>;
}

/// Codec backed by the `image` crate (PNG, JPEG, and whatever else it was
/// built with).
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterCodec;

impl ImageCodec for RasterCodec {
    #[instrument(skip_all, fields(data_len = bytes.len()))]
    fn decode(&self, bytes: &[u8]) -> Result<DecodedImage, StampError> {
        let dynamic = image::load_from_memory(bytes)
            .map_err(|err| StampError::ImageDecode(format!("failed to decode image: {}", err)))?;
        if dynamic.width() == 0 || dynamic.height() == 0 {
            return Err(StampError::ImageDecode("image has zero size".into()));
        }
        debug!(
            width = dynamic.width(),
            height = dynamic.height(),
            "Stamp image decoded"
        );
        Ok(DecodedImage::from_dynamic(&dynamic))
    }
}
