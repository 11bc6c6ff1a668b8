// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Payload writer — the encoder counterpart used by host apps, tools, and tests.

use byteorder::{ByteOrder, LittleEndian};

use crate::types::{PAYLOAD_MAGIC, PAYLOAD_VERSION, Placement, Stamp};

/// Growable little-endian buffer producing the stamp payload format.
///
/// Primitive writers are public so malformed payloads can be assembled by
/// hand in tests.
#[derive(Debug, Default)]
pub struct PayloadWriter {
    buf: Vec<u8>,
}

impl PayloadWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn u32(&mut self, value: u32) {
        let mut raw = [0u8; 4];
        LittleEndian::write_u32(&mut raw, value);
        self.buf.extend_from_slice(&raw);
    }

    pub fn f64(&mut self, value: f64) {
        let mut raw = [0u8; 8];
        LittleEndian::write_f64(&mut raw, value);
        self.buf.extend_from_slice(&raw);
    }

    /// Length-prefixed block. Blocks must be shorter than 4 GiB.
    pub fn block(&mut self, bytes: &[u8]) {
        self.u32(bytes.len() as u32);
        self.buf.extend_from_slice(bytes);
    }

    /// Magic, version, and the declared record count.
    pub fn header(&mut self, count: u32) {
        self.u32(PAYLOAD_MAGIC);
        self.u32(PAYLOAD_VERSION);
        self.u32(count);
    }

    fn placement(&mut self, placement: &Placement) {
        self.u32(placement.page_index);
        self.f64(placement.cx);
        self.f64(placement.cy);
        self.f64(placement.width);
        self.f64(placement.height);
        self.f64(placement.rotation_deg);
    }

    /// Append one complete record.
    pub fn stamp(&mut self, stamp: &Stamp) {
        self.u8(stamp.stamp_type().wire_tag());
        self.placement(stamp.placement());
        match stamp {
            Stamp::Image(s) => self.block(&s.image),
            Stamp::Text(s) => {
                self.f64(s.font_size);
                self.u32(s.color.0);
                self.block(s.text.as_bytes());
            }
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Encode stamps into a complete payload.
pub fn encode(stamps: &[Stamp]) -> Vec<u8> {
    let mut writer = PayloadWriter::new();
    writer.header(stamps.len() as u32);
    for stamp in stamps {
        writer.stamp(stamp);
    }
    writer.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::{HEADER_LEN, MIN_RECORD_LEN, RECORD_FIXED_LEN};
    use crate::types::{Argb, ImageStamp, TextStamp};

    fn placement() -> Placement {
        Placement {
            page_index: 7,
            cx: 1.0,
            cy: 2.0,
            width: 3.0,
            height: 4.0,
            rotation_deg: 5.0,
        }
    }

    #[test]
    fn header_is_pstm_little_endian() {
        let bytes = encode(&[]);
        assert_eq!(bytes, [0x50, 0x53, 0x54, 0x4D, 1, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(&bytes[..4], b"PSTM");
    }

    #[test]
    fn image_record_length() {
        let stamp = Stamp::Image(ImageStamp {
            placement: placement(),
            image: vec![0; 10],
        });
        assert_eq!(encode(&[stamp]).len(), HEADER_LEN + MIN_RECORD_LEN + 10);
    }

    #[test]
    fn text_record_layout() {
        let stamp = Stamp::Text(TextStamp {
            placement: placement(),
            font_size: 9.0,
            color: Argb(0x11223344),
            text: "ab".into(),
        });
        let bytes = encode(&[stamp]);
        let record = &bytes[HEADER_LEN..];

        assert_eq!(record[0], 2);
        assert_eq!(&record[1..5], &7u32.to_le_bytes());
        let tail = &record[RECORD_FIXED_LEN..];
        assert_eq!(&tail[..8], &9.0f64.to_le_bytes());
        assert_eq!(&tail[8..12], &[0x44, 0x33, 0x22, 0x11]);
        assert_eq!(&tail[12..16], &2u32.to_le_bytes());
        assert_eq!(&tail[16..], b"ab");
    }
}
