// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — the lopdf-backed engine and content-stream encoding.

pub mod content;
pub mod engine;

pub use engine::LopdfEngine;
