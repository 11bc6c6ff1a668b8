// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Method dispatch — validates channel arguments and runs the stamper.
//
// Argument problems are reported as `BAD_ARGS` before any decoding happens;
// every failure after that is `STAMP_FAILED` with the error category in
// `details`.

use stempelwerk_document::{StampOptions, Stamper};
use tracing::{debug, info, instrument, warn};

use crate::channel::{BAD_ARGS, MethodCall, MethodResponse, STAMP_FAILED, STAMP_PDF};

/// Something that can answer channel calls.
pub trait MethodHandler {
    fn handle(&self, call: &MethodCall) -> MethodResponse;
}

/// Handler for the `stampPdf` method.
#[derive(Debug, Clone, Default)]
pub struct StampPdfHandler {
    stamper: Stamper,
}

impl StampPdfHandler {
    pub fn new(options: StampOptions) -> Self {
        Self {
            stamper: Stamper::new(options),
        }
    }
}

impl MethodHandler for StampPdfHandler {
    #[instrument(skip_all, fields(method = %call.method))]
    fn handle(&self, call: &MethodCall) -> MethodResponse {
        if call.method != STAMP_PDF {
            debug!("Method not implemented");
            return MethodResponse::NotImplemented;
        }

        let (Some(pdf), Some(payload)) = (call.bytes_argument("pdf"), call.bytes_argument("payload"))
        else {
            return MethodResponse::error(BAD_ARGS, "Missing pdf/payload", None);
        };
        if pdf.is_empty() {
            return MethodResponse::error(BAD_ARGS, "PDF data is empty", None);
        }
        if payload.is_empty() {
            return MethodResponse::error(BAD_ARGS, "Payload data is empty", None);
        }

        match self.stamper.stamp(pdf, payload) {
            Ok(outcome) => {
                info!(
                    applied = outcome.report.applied,
                    failed = outcome.report.failed(),
                    "stampPdf succeeded"
                );
                MethodResponse::Success {
                    result: outcome.pdf,
                }
            }
            Err(err) => {
                warn!(category = err.category(), %err, "stampPdf failed");
                MethodResponse::error(STAMP_FAILED, err.to_string(), Some(err.category().to_string()))
            }
        }
    }
}

/// Answer a call with the default stamper configuration.
pub fn handle_method_call(call: &MethodCall) -> MethodResponse {
    StampPdfHandler::default().handle(call)
}

#[cfg(test)]
mod tests {
    use lopdf::Document;
    use printpdf::{Mm, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg};
    use stempelwerk_core::{Argb, Placement, Stamp, TextStamp, encode};

    use super::*;
    use crate::channel::MethodValue;

    fn blank_pdf() -> Vec<u8> {
        let mut doc = PdfDocument::new("Bridge Fixture");
        doc.with_pages(vec![PdfPage::new(Mm(210.0), Mm(297.0), Vec::new())]);
        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        doc.save(&PdfSaveOptions::default(), &mut warnings)
    }

    fn text_payload(page_index: u32) -> Vec<u8> {
        encode(&[Stamp::Text(TextStamp {
            placement: Placement {
                page_index,
                cx: 100.0,
                cy: 100.0,
                width: 0.0,
                height: 0.0,
                rotation_deg: 15.0,
            },
            font_size: 18.0,
            color: Argb(0xFF00_00FF),
            text: "PAID".into(),
        })])
    }

    fn call(pdf: Vec<u8>, payload: Vec<u8>) -> MethodCall {
        MethodCall::new(STAMP_PDF)
            .with_argument("pdf", MethodValue::Bytes(pdf))
            .with_argument("payload", MethodValue::Bytes(payload))
    }

    fn message(response: &MethodResponse) -> &str {
        match response {
            MethodResponse::Error { message, .. } => message,
            other => panic!("expected an error, got {other:?}"),
        }
    }

    #[test]
    fn unknown_method_is_not_implemented() {
        let response = handle_method_call(&MethodCall::new("getPlatformVersion"));
        assert_eq!(response, MethodResponse::NotImplemented);
    }

    #[test]
    fn missing_or_mistyped_arguments_are_bad_args() {
        let response = handle_method_call(&MethodCall::new(STAMP_PDF));
        assert_eq!(response.code(), Some(BAD_ARGS));
        assert_eq!(message(&response), "Missing pdf/payload");

        let mistyped = MethodCall::new(STAMP_PDF)
            .with_argument("pdf", MethodValue::String("file.pdf".into()))
            .with_argument("payload", MethodValue::Bytes(vec![1]));
        assert_eq!(handle_method_call(&mistyped).code(), Some(BAD_ARGS));
    }

    #[test]
    fn empty_arguments_are_bad_args() {
        let response = handle_method_call(&call(Vec::new(), vec![1]));
        assert_eq!(message(&response), "PDF data is empty");

        let response = handle_method_call(&call(vec![1], Vec::new()));
        assert_eq!(message(&response), "Payload data is empty");
    }

    #[test]
    fn decode_failure_reports_category_in_details() {
        let response = handle_method_call(&call(blank_pdf(), vec![0u8; 12]));
        match response {
            MethodResponse::Error { code, details, .. } => {
                assert_eq!(code, STAMP_FAILED);
                assert_eq!(details.as_deref(), Some("BAD_MAGIC"));
            }
            other => panic!("expected an error, got {other:?}"),
        }
    }

    #[test]
    fn all_stamps_failing_is_stamp_failed() {
        let response = handle_method_call(&call(blank_pdf(), text_payload(7)));
        assert_eq!(response.code(), Some(STAMP_FAILED));
        assert_eq!(
            message(&response),
            "stamping failed: failed to process any stamps: 1 errors out of 1 stamps"
        );
    }

    #[test]
    fn success_returns_loadable_pdf() {
        let response = handle_method_call(&call(blank_pdf(), text_payload(0)));
        let MethodResponse::Success { result } = response else {
            panic!("expected success");
        };
        let doc = Document::load_mem(&result).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }
}
