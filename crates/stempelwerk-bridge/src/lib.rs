// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// stempelwerk-bridge — Host method-channel adapter.
//
// Mobile hosts forward `stampPdf` calls on the `pdf_stamp_editor` channel to
// this crate and relay the response unchanged. The adapter owns argument
// checking and result codes; all stamping work happens in
// `stempelwerk-document`.

pub mod channel;
pub mod handler;

pub use channel::{
    BAD_ARGS, CHANNEL_NAME, MethodCall, MethodResponse, MethodValue, STAMP_FAILED, STAMP_PDF,
};
pub use handler::{MethodHandler, StampPdfHandler, handle_method_call};
