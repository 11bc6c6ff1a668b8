// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Payload module — the little-endian binary stamp format.
//
// Layout: `magic: u32`, `version: u32`, `count: u32`, then `count` records of
// `type: u8`, `page_index: u32`, `cx, cy, w, h, rotation: f64`, followed by
// `image_len: u32` + bytes (type 1) or `font_size: f64`, `argb: u32`,
// `text_len: u32` + UTF-8 bytes (type 2).

pub mod reader;
pub mod writer;

pub use reader::{PayloadReader, decode, decode_with};
pub use writer::{PayloadWriter, encode};

/// Size of the fixed payload header.
pub const HEADER_LEN: usize = 12;

/// Bytes shared by every record: type, page index, five doubles.
pub const RECORD_FIXED_LEN: usize = 1 + 4 + 5 * 8;

/// Smallest possible record (an image stamp with an empty block).
pub const MIN_RECORD_LEN: usize = RECORD_FIXED_LEN + 4;
