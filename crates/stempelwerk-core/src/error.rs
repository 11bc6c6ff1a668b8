// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Stempelwerk.
//
// Three layers: `DecodeError` (the payload itself is malformed, fatal),
// `StampError` (one stamp is unusable, recoverable), and `ApplyError` (the PDF
// engine or the partial-failure policy aborted the call, fatal).

use thiserror::Error;

use crate::types::BlockKind;

/// Fatal payload decoding failures.
///
/// Every variant invalidates the position of all later records, so decoding
/// stops at the first one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("invalid magic number: 0x{0:08X}")]
    BadMagic(u32),

    #[error("unsupported payload version: {0}, expected 1")]
    UnsupportedVersion(u32),

    #[error("payload truncated at offset {offset}: need {needed} bytes, have {available}")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("unknown stamp type {stamp_type} at index {index} (offset {offset})")]
    UnknownStampType {
        stamp_type: u8,
        index: usize,
        offset: usize,
    },

    #[error("stamp count {count} exceeds limit of {limit}")]
    CountLimitExceeded { count: u32, limit: u32 },

    #[error("{kind} block of {len} bytes at offset {offset} exceeds limit of {limit}")]
    LengthLimitExceeded {
        kind: BlockKind,
        len: u32,
        limit: u32,
        offset: usize,
    },

    #[error("{count} trailing bytes after the last stamp")]
    TrailingBytes { count: usize },
}

impl DecodeError {
    /// Short machine-stable category.
    pub fn category(&self) -> &'static str {
        match self {
            Self::BadMagic(_) => "BAD_MAGIC",
            Self::UnsupportedVersion(_) => "UNSUPPORTED_VERSION",
            Self::Truncated { .. } => "TRUNCATED",
            Self::UnknownStampType { .. } => "UNKNOWN_STAMP_TYPE",
            Self::CountLimitExceeded { .. } => "COUNT_LIMIT",
            Self::LengthLimitExceeded { .. } => "LENGTH_LIMIT",
            Self::TrailingBytes { .. } => "TRAILING_BYTES",
        }
    }
}

/// Recoverable failures of a single stamp. The stamp is skipped and counted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StampError {
    #[error("page index {page_index} out of range (document has {page_count} pages)")]
    PageOutOfRange { page_index: u32, page_count: usize },

    #[error("field `{field}` is not a finite number")]
    NonFinite { field: &'static str },

    #[error("center ({cx}, {cy}) outside the allowed coordinate range ±{limit}")]
    CoordinateOutOfRange { cx: f64, cy: f64, limit: f64 },

    #[error("invalid stamp size {width}x{height}")]
    InvalidSize { width: f64, height: f64 },

    #[error("font size {0} out of range")]
    FontSizeOutOfRange(f64),

    #[error("image stamp carries no image bytes")]
    EmptyImage,

    #[error("image could not be decoded: {0}")]
    ImageDecode(String),
}

impl StampError {
    /// Short machine-stable category.
    pub fn category(&self) -> &'static str {
        match self {
            Self::PageOutOfRange { .. } => "PAGE_OUT_OF_RANGE",
            Self::NonFinite { .. } => "NON_FINITE",
            Self::CoordinateOutOfRange { .. } => "COORDINATE_OUT_OF_RANGE",
            Self::InvalidSize { .. } => "INVALID_SIZE",
            Self::FontSizeOutOfRange(_) => "FONT_SIZE_OUT_OF_RANGE",
            Self::EmptyImage => "EMPTY_IMAGE",
            Self::ImageDecode(_) => "IMAGE_DECODE",
        }
    }
}

/// Fatal failures while applying stamps to a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplyError {
    #[error("failed to load PDF: {0}")]
    PdfLoad(String),

    #[error("PDF has no pages")]
    NoPages,

    #[error("PDF engine error: {0}")]
    Engine(String),

    #[error("failed to serialise PDF: {0}")]
    Serialize(String),

    #[error("failed to process any stamps: {failed} errors out of {total} stamps")]
    AllStampsFailed { failed: usize, total: usize },
}

impl ApplyError {
    /// Short machine-stable category.
    pub fn category(&self) -> &'static str {
        match self {
            Self::PdfLoad(_) => "PDF_LOAD",
            Self::NoPages => "NO_PAGES",
            Self::Engine(_) => "ENGINE",
            Self::Serialize(_) => "SERIALIZE",
            Self::AllStampsFailed { .. } => "ALL_STAMPS_FAILED",
        }
    }
}

/// Top-level error type for all Stempelwerk operations.
#[derive(Debug, Error)]
pub enum StempelwerkError {
    #[error("payload decoding failed: {0}")]
    Decode(#[from] DecodeError),

    #[error("stamping failed: {0}")]
    Apply(#[from] ApplyError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StempelwerkError {
    /// Short machine-stable category, suitable for bridge error details.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Decode(err) => err.category(),
            Self::Apply(err) => err.category(),
            Self::Config(_) => "CONFIG",
            Self::Io(_) => "IO",
            Self::Serialization(_) => "SERIALIZATION",
        }
    }

    /// True when the caller's payload was malformed, as opposed to the PDF
    /// engine or image codec failing.
    pub fn is_payload_error(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, StempelwerkError>;
