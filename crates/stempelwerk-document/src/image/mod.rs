// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — decoding stamp images into drawable bitmaps.

pub mod codec;

pub use codec::{DecodedImage, ImageCodec, RasterCodec};
