// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Subcommand implementations.

pub mod encode;
pub mod inspect;
pub mod stamp;

pub use encode::EncodeCommand;
pub use inspect::InspectCommand;
pub use stamp::StampCommand;

#[cfg(test)]
pub(crate) mod fixtures {
    use printpdf::{Mm, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg};
    use stempelwerk_core::{Argb, Placement, Stamp, TextStamp};

    pub fn blank_pdf() -> Vec<u8> {
        let mut doc = PdfDocument::new("CLI Fixture");
        doc.with_pages(vec![PdfPage::new(Mm(210.0), Mm(297.0), Vec::new())]);
        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        doc.save(&PdfSaveOptions::default(), &mut warnings)
    }

    pub fn text_stamp(page_index: u32, text: &str) -> Stamp {
        Stamp::Text(TextStamp {
            placement: Placement {
                page_index,
                cx: 300.0,
                cy: 400.0,
                width: 0.0,
                height: 0.0,
                rotation_deg: 30.0,
            },
            font_size: 24.0,
            color: Argb(0xFFCC_0000),
            text: text.into(),
        })
    }
}
