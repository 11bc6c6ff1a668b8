// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stempelwerk — Core stamp types, limits, errors, and the binary payload codec
// shared across all crates.

pub mod config;
pub mod error;
pub mod payload;
pub mod types;

pub use config::StampLimits;
pub use error::{ApplyError, DecodeError, StampError, StempelwerkError};
pub use payload::{PayloadReader, PayloadWriter, decode, decode_with, encode};
pub use types::*;
