// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Content-stream encoding — canvas ops to PDF operators.

use std::collections::BTreeSet;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Object, ObjectId, StringFormat};
use stempelwerk_core::ApplyError;

use crate::canvas::DrawOp;
use crate::engine::ImageHandle;
use crate::font::encode_win_ansi;

/// Prefix of image XObject names added by the stamper.
pub const IMAGE_PREFIX: &str = "StwIm";
/// Prefix of font resource names added by the stamper.
pub const FONT_PREFIX: &str = "StwF";

#[derive(Debug, Clone)]
struct Entry<K> {
    key: K,
    name: String,
    id: ObjectId,
}

/// Resources a content stream refers to, with names that do not collide with
/// the ones already present on the target.
#[derive(Debug, Clone, Default)]
pub struct ResourceSet {
    images: Vec<Entry<ImageHandle>>,
    fonts: Vec<Entry<&'static str>>,
    reserved: BTreeSet<String>,
}

impl ResourceSet {
    /// Start a set that never hands out any of `names`.
    pub fn reserving(names: impl IntoIterator<Item = String>) -> Self {
        Self {
            reserved: names.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn add_image(&mut self, handle: ImageHandle, id: ObjectId) {
        if self.image_name(handle).is_none() {
            let name = self.fresh_name(IMAGE_PREFIX);
            self.images.push(Entry {
                key: handle,
                name,
                id,
            });
        }
    }

    pub fn add_font(&mut self, base_font: &'static str, id: ObjectId) {
        if self.font_name(base_font).is_none() {
            let name = self.fresh_name(FONT_PREFIX);
            self.fonts.push(Entry {
                key: base_font,
                name,
                id,
            });
        }
    }

    pub fn image_name(&self, handle: ImageHandle) -> Option<&str> {
        self.images
            .iter()
            .find(|entry| entry.key == handle)
            .map(|entry| entry.name.as_str())
    }

    pub fn font_name(&self, base_font: &str) -> Option<&str> {
        self.fonts
            .iter()
            .find(|entry| entry.key == base_font)
            .map(|entry| entry.name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty() && self.fonts.is_empty()
    }

    /// Non-empty resource categories with their `(name, object)` entries.
    pub fn categories(&self) -> Vec<(&'static str, Vec<(&str, ObjectId)>)> {
        let mut out = Vec::with_capacity(2);
        if !self.images.is_empty() {
            out.push((
                "XObject",
                self.images.iter().map(|e| (e.name.as_str(), e.id)).collect(),
            ));
        }
        if !self.fonts.is_empty() {
            out.push((
                "Font",
                self.fonts.iter().map(|e| (e.name.as_str(), e.id)).collect(),
            ));
        }
        out
    }

    /// Standalone `/Resources` dictionary, used for appearance streams.
    pub fn to_dictionary(&self) -> Dictionary {
        let mut resources = Dictionary::new();
        for (category, entries) in self.categories() {
            let mut dict = Dictionary::new();
            for (name, id) in entries {
                dict.set(name, Object::Reference(id));
            }
            resources.set(category, Object::Dictionary(dict));
        }
        resources
    }

    fn fresh_name(&mut self, prefix: &str) -> String {
        let mut counter = 0usize;
        loop {
            let candidate = format!("{}{}", prefix, counter);
            if self.reserved.insert(candidate.clone()) {
                return candidate;
            }
            counter += 1;
        }
    }
}

fn real(value: f64) -> Object {
    Object::Real(value as f32)
}

fn name(value: &str) -> Object {
    Object::Name(value.as_bytes().to_vec())
}

/// Translate canvas ops into content operators.
///
/// Every image and font the canvas uses must already be in `resources`.
pub fn operations(ops: &[DrawOp], resources: &ResourceSet) -> Result<Vec<Operation>, ApplyError> {
    let mut out = Vec::with_capacity(ops.len() * 2);
    for op in ops {
        match op {
            DrawOp::SaveState => out.push(Operation::new("q", vec![])),
            DrawOp::RestoreState => out.push(Operation::new("Q", vec![])),
            DrawOp::Transform(matrix) => {
                out.push(Operation::new(
                    "cm",
                    matrix.as_array().into_iter().map(real).collect(),
                ));
            }
            DrawOp::Image { handle, rect } => {
                let resource = resources.image_name(*handle).ok_or_else(|| {
                    ApplyError::Engine(format!("image {} was not registered", handle.0))
                })?;
                // The unit-square scale stays local to this image.
                out.push(Operation::new("q", vec![]));
                out.push(Operation::new(
                    "cm",
                    vec![
                        real(rect.width()),
                        real(0.0),
                        real(0.0),
                        real(rect.height()),
                        real(rect.llx),
                        real(rect.lly),
                    ],
                ));
                out.push(Operation::new("Do", vec![name(resource)]));
                out.push(Operation::new("Q", vec![]));
            }
            DrawOp::Text {
                font,
                size,
                rgb,
                x,
                y,
                text,
            } => {
                let resource = resources.font_name(font).ok_or_else(|| {
                    ApplyError::Engine(format!("font {} was not registered", font))
                })?;
                out.push(Operation::new("BT", vec![]));
                out.push(Operation::new("Tf", vec![name(resource), real(*size)]));
                out.push(Operation::new(
                    "rg",
                    vec![
                        Object::Real(rgb.0),
                        Object::Real(rgb.1),
                        Object::Real(rgb.2),
                    ],
                ));
                out.push(Operation::new("Td", vec![real(*x), real(*y)]));
                out.push(Operation::new(
                    "Tj",
                    vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
                ));
                out.push(Operation::new("ET", vec![]));
            }
        }
    }
    Ok(out)
}

/// Serialise operators into content-stream bytes.
pub fn encode(operations: Vec<Operation>) -> Result<Vec<u8>, ApplyError> {
    Content { operations }
        .encode()
        .map_err(|err| ApplyError::Engine(format!("failed to encode content stream: {}", err)))
}

/// PDF text string: PDFDocEncoding-compatible ASCII as-is, anything else as
/// UTF-16BE with a byte-order mark.
pub fn text_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::String(text.as_bytes().to_vec(), StringFormat::Literal);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}
