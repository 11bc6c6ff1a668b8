// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Payload reader — bounds-checked cursor and the stamp record decoder.

use byteorder::{ByteOrder, LittleEndian};
use tracing::{debug, instrument, warn};

use super::MIN_RECORD_LEN;
use crate::config::StampLimits;
use crate::error::DecodeError;
use crate::types::{
    Argb, BlockKind, ImageStamp, PAYLOAD_MAGIC, PAYLOAD_VERSION, Placement, Stamp, StampType,
    TextStamp,
};

/// Cursor over a borrowed payload buffer.
///
/// Every read checks the remaining length first and fails with
/// [`DecodeError::Truncated`] instead of panicking.
#[derive(Debug, Clone)]
pub struct PayloadReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> PayloadReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Current read position.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        let available = self.remaining();
        if n > available {
            return Err(DecodeError::Truncated {
                offset: self.offset,
                needed: n,
                available,
            });
        }
        let start = self.offset;
        self.offset += n;
        Ok(&self.data[start..start + n])
    }

    pub fn u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    pub fn u32(&mut self) -> Result<u32, DecodeError> {
        Ok(LittleEndian::read_u32(self.take(4)?))
    }

    /// IEEE-754 double; the bit pattern is preserved exactly (NaN payloads,
    /// infinities, and negative zero included).
    pub fn f64(&mut self) -> Result<f64, DecodeError> {
        Ok(LittleEndian::read_f64(self.take(8)?))
    }

    pub fn bytes(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        self.take(n)
    }

    /// A `u32` length prefix followed by that many bytes, capped at `limit`.
    pub fn block(&mut self, kind: BlockKind, limit: u32) -> Result<&'a [u8], DecodeError> {
        let offset = self.offset;
        let len = self.u32()?;
        if len > limit {
            return Err(DecodeError::LengthLimitExceeded {
                kind,
                len,
                limit,
                offset,
            });
        }
        self.take(len as usize)
    }

    /// Read and check the 12-byte header, returning the declared stamp count.
    pub fn header(&mut self, limits: &StampLimits) -> Result<u32, DecodeError> {
        let magic = self.u32()?;
        if magic != PAYLOAD_MAGIC {
            return Err(DecodeError::BadMagic(magic));
        }
        let version = self.u32()?;
        if version != PAYLOAD_VERSION {
            return Err(DecodeError::UnsupportedVersion(version));
        }
        let count = self.u32()?;
        if count > limits.max_stamp_count {
            return Err(DecodeError::CountLimitExceeded {
                count,
                limit: limits.max_stamp_count,
            });
        }
        Ok(count)
    }

    /// Read one complete stamp record.
    pub fn stamp(&mut self, index: usize, limits: &StampLimits) -> Result<Stamp, DecodeError> {
        let record_offset = self.offset;
        let tag = self.u8()?;
        let placement = Placement {
            page_index: self.u32()?,
            cx: self.f64()?,
            cy: self.f64()?,
            width: self.f64()?,
            height: self.f64()?,
            rotation_deg: self.f64()?,
        };

        // The record length of an unknown type is unknowable, so nothing after
        // it can be located.
        let stamp_type = StampType::from_wire_tag(tag).ok_or(DecodeError::UnknownStampType {
            stamp_type: tag,
            index,
            offset: record_offset,
        })?;

        let stamp = match stamp_type {
            StampType::Image => {
                let image = self.block(BlockKind::Image, limits.max_image_bytes)?;
                Stamp::Image(ImageStamp {
                    placement,
                    image: image.to_vec(),
                })
            }
            StampType::Text => {
                let font_size = self.f64()?;
                let color = Argb(self.u32()?);
                let text = self.block(BlockKind::Text, limits.max_text_bytes)?;
                Stamp::Text(TextStamp {
                    placement,
                    font_size,
                    color,
                    text: String::from_utf8_lossy(text).into_owned(),
                })
            }
        };
        Ok(stamp)
    }
}

/// Decode a payload with the default [`StampLimits`].
pub fn decode(payload: &[u8]) -> Result<Vec<Stamp>, DecodeError> {
    decode_with(payload, &StampLimits::default())
}

/// Decode a payload into its ordered stamps.
///
/// Any framing problem aborts the whole decode. Value ranges are not checked
/// here; see [`Stamp::validate`].
#[instrument(skip_all, fields(payload_len = payload.len()))]
pub fn decode_with(payload: &[u8], limits: &StampLimits) -> Result<Vec<Stamp>, DecodeError> {
    let mut reader = PayloadReader::new(payload);
    let count = reader.header(limits)? as usize;

    // Never trust `count` for the allocation size.
    let mut stamps = Vec::with_capacity(count.min(reader.remaining() / MIN_RECORD_LEN));
    for index in 0..count {
        stamps.push(reader.stamp(index, limits)?);
    }

    if !reader.is_exhausted() {
        let trailing = reader.remaining();
        if limits.reject_trailing_bytes {
            return Err(DecodeError::TrailingBytes { count: trailing });
        }
        warn!(trailing, "Ignoring trailing bytes after the last stamp");
    }

    debug!(stamps = stamps.len(), "Payload decoded");
    Ok(stamps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::writer::{PayloadWriter, encode};

    fn placement(page_index: u32) -> Placement {
        Placement {
            page_index,
            cx: 300.0,
            cy: 400.0,
            width: 0.0,
            height: 0.0,
            rotation_deg: 0.0,
        }
    }

    fn text(page_index: u32, text: &str) -> Stamp {
        Stamp::Text(TextStamp {
            placement: placement(page_index),
            font_size: 24.0,
            color: Argb(0x00FF_0000),
            text: text.into(),
        })
    }

    fn image(page_index: u32) -> Stamp {
        Stamp::Image(ImageStamp {
            placement: Placement {
                width: 50.0,
                height: 20.0,
                rotation_deg: 30.0,
                ..placement(page_index)
            },
            image: vec![0x89, b'P', b'N', b'G'],
        })
    }

    /// The worked example: one red "HELLO" at (300, 400) on page 0.
    fn hello_payload() -> Vec<u8> {
        let mut bytes = vec![0x50, 0x53, 0x54, 0x4D, 1, 0, 0, 0, 1, 0, 0, 0];
        bytes.push(2);
        bytes.extend_from_slice(&0u32.to_le_bytes());
        for value in [300.0f64, 400.0, 0.0, 0.0, 0.0, 24.0] {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        bytes.extend_from_slice(&0x00FF_0000u32.to_le_bytes());
        bytes.extend_from_slice(&5u32.to_le_bytes());
        bytes.extend_from_slice(b"HELLO");
        bytes
    }

    #[test]
    fn decodes_hand_built_hello_payload() {
        let stamps = decode(&hello_payload()).unwrap();
        assert_eq!(stamps, vec![text(0, "HELLO")]);
    }

    #[test]
    fn encoder_matches_hand_built_bytes() {
        assert_eq!(encode(&[text(0, "HELLO")]), hello_payload());
    }

    #[test]
    fn preserves_order_and_variants() {
        let stamps = vec![image(2), text(0, "a"), image(0), text(1, "ünïcødé")];
        assert_eq!(decode(&encode(&stamps)).unwrap(), stamps);
    }

    #[test]
    fn wrong_magic_fails_regardless_of_rest() {
        let mut payload = hello_payload();
        payload[0] = 0x51;
        assert!(matches!(decode(&payload), Err(DecodeError::BadMagic(_))));

        // Header only, no count and no records.
        let short = 0xDEAD_BEEFu32.to_le_bytes();
        assert_eq!(decode(&short), Err(DecodeError::BadMagic(0xDEAD_BEEF)));
    }

    #[test]
    fn wrong_version_fails_regardless_of_rest() {
        let mut payload = hello_payload();
        payload[4] = 2;
        assert_eq!(decode(&payload), Err(DecodeError::UnsupportedVersion(2)));

        let mut writer = PayloadWriter::new();
        writer.u32(crate::types::PAYLOAD_MAGIC);
        writer.u32(0);
        assert_eq!(
            decode(&writer.into_bytes()),
            Err(DecodeError::UnsupportedVersion(0))
        );
    }

    #[test]
    fn primitives_keep_exact_bits() {
        let values = [
            0.0f64,
            -0.0,
            f64::NAN,
            f64::from_bits(0x7FF8_0000_DEAD_BEEF),
            f64::INFINITY,
            f64::NEG_INFINITY,
            f64::MIN_POSITIVE,
            f64::MAX,
            -1.5e-300,
        ];
        let ints = [0u32, 1, 0x4D54_5350, u32::MAX];

        let mut writer = PayloadWriter::new();
        for v in values {
            writer.f64(v);
        }
        for i in ints {
            writer.u32(i);
        }
        let bytes = writer.into_bytes();

        let mut reader = PayloadReader::new(&bytes);
        for v in values {
            assert_eq!(reader.f64().unwrap().to_bits(), v.to_bits());
        }
        for i in ints {
            assert_eq!(reader.u32().unwrap(), i);
        }
        assert!(reader.is_exhausted());
    }

    #[test]
    fn every_truncation_fails_at_or_before_the_cut() {
        let payload = encode(&[text(0, "HELLO"), image(1), text(3, "")]);
        for cut in 0..payload.len() {
            match decode(&payload[..cut]) {
                Err(DecodeError::Truncated {
                    offset,
                    needed,
                    available,
                }) => {
                    assert!(offset <= cut, "cut {cut}: error offset {offset}");
                    assert_eq!(available, cut - offset);
                    assert!(needed > available);
                }
                other => panic!("cut {cut}: expected truncation, got {other:?}"),
            }
        }
    }

    #[test]
    fn oversized_block_is_truncation_not_panic() {
        let mut writer = PayloadWriter::new();
        writer.header(1);
        writer.u8(1);
        writer.u32(0);
        for _ in 0..5 {
            writer.f64(1.0);
        }
        writer.u32(1_000);
        writer.u8(0xAA);
        assert!(matches!(
            decode(&writer.into_bytes()),
            Err(DecodeError::Truncated { needed: 1_000, .. })
        ));
    }

    #[test]
    fn unknown_type_aborts_everything_after_it() {
        let mut writer = PayloadWriter::new();
        writer.header(2);
        writer.u8(99);
        writer.u32(0);
        for _ in 0..5 {
            writer.f64(0.0);
        }
        writer.stamp(&text(0, "never seen"));

        assert_eq!(
            decode(&writer.into_bytes()),
            Err(DecodeError::UnknownStampType {
                stamp_type: 99,
                index: 0,
                offset: 12,
            })
        );
    }

    #[test]
    fn count_limit_is_enforced_before_reading_records() {
        let mut writer = PayloadWriter::new();
        writer.header(10_001);
        assert_eq!(
            decode(&writer.into_bytes()),
            Err(DecodeError::CountLimitExceeded {
                count: 10_001,
                limit: 10_000,
            })
        );
    }

    #[test]
    fn text_block_limit_is_enforced() {
        let limits = StampLimits {
            max_text_bytes: 4,
            ..StampLimits::default()
        };
        let payload = encode(&[text(0, "HELLO")]);
        assert!(matches!(
            decode_with(&payload, &limits),
            Err(DecodeError::LengthLimitExceeded {
                kind: BlockKind::Text,
                len: 5,
                limit: 4,
                ..
            })
        ));
    }

    #[test]
    fn trailing_bytes_tolerated_unless_strict() {
        let mut payload = encode(&[text(0, "HELLO")]);
        payload.extend_from_slice(&[0, 0, 0]);

        assert_eq!(decode(&payload).unwrap().len(), 1);
        assert_eq!(
            decode_with(&payload, &StampLimits::strict()),
            Err(DecodeError::TrailingBytes { count: 3 })
        );
    }

    #[test]
    fn invalid_utf8_is_replaced_not_fatal() {
        let mut writer = PayloadWriter::new();
        writer.header(1);
        writer.u8(2);
        writer.u32(0);
        for _ in 0..5 {
            writer.f64(0.0);
        }
        writer.f64(12.0);
        writer.u32(0xFF00_0000);
        writer.block(&[b'O', 0xFF, b'K']);

        let stamps = decode(&writer.into_bytes()).unwrap();
        let Stamp::Text(stamp) = &stamps[0] else {
            panic!("expected a text stamp");
        };
        assert_eq!(stamp.text, "O\u{FFFD}K");
    }

    #[test]
    fn empty_payload_with_zero_count_is_valid() {
        let mut writer = PayloadWriter::new();
        writer.header(0);
        assert_eq!(decode(&writer.into_bytes()).unwrap(), Vec::new());
    }

    #[test]
    fn huge_count_does_not_preallocate() {
        let limits = StampLimits {
            max_stamp_count: u32::MAX,
            ..StampLimits::default()
        };
        let mut writer = PayloadWriter::new();
        writer.header(u32::MAX);
        assert!(matches!(
            decode_with(&writer.into_bytes(), &limits),
            Err(DecodeError::Truncated { offset: 12, .. })
        ));
    }
}
