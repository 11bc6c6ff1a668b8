// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// lopdf engine — applies canvases and annotations to a loaded `lopdf::Document`.
//
// Existing page content is bracketed by `q`/`Q` before anything is appended,
// so whatever graphics state the original streams leave behind never reaches
// the stamps. Page resources are merged in place; inherited resources are
// copied onto the page first so sibling pages are left untouched.

use std::io::Write;

use flate2::Compression;
use flate2::write::ZlibEncoder;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat, dictionary};
use stempelwerk_core::ApplyError;
use tracing::{debug, info, instrument, warn};

use super::content::{self, ResourceSet, text_string};
use crate::canvas::{DrawOp, PageCanvas, Rect};
use crate::engine::{Annotation, ImageHandle, PdfEngine};
use crate::image::DecodedImage;

/// Upper bound on `/Parent` hops when looking for inherited resources.
const MAX_TREE_DEPTH: usize = 64;

/// Where a page's resource dictionary lives.
#[derive(Debug, Clone, Copy)]
enum ResourcesHome {
    /// Inline in the page dictionary.
    Page,
    /// An indirect dictionary, possibly shared with other pages.
    Shared(ObjectId),
}

/// [`PdfEngine`] backed by `lopdf`.
pub struct LopdfEngine {
    document: Document,
    /// Page object ids in document order.
    pages: Vec<ObjectId>,
    /// Image XObjects embedded so far, indexed by [`ImageHandle`].
    images: Vec<ObjectId>,
    /// Font dictionaries added so far, one per base font.
    fonts: Vec<(&'static str, ObjectId)>,
}

impl LopdfEngine {
    // -- Construction ---------------------------------------------------------

    /// Parse a PDF held in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, ApplyError> {
        let document = Document::load_mem(data).map_err(|err| {
            ApplyError::PdfLoad(format!("failed to load PDF from memory: {}", err))
        })?;
        let engine = Self::from_document(document);
        debug!(pages = engine.pages.len(), "PDF loaded from bytes");
        Ok(engine)
    }

    pub fn from_document(document: Document) -> Self {
        // `get_pages` is keyed by 1-based page number, so values come out in
        // document order.
        let pages = document.get_pages().into_values().collect();
        Self {
            document,
            pages,
            images: Vec::new(),
            fonts: Vec::new(),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    // -- Object access --------------------------------------------------------

    fn page_id(&self, page_index: usize) -> Result<ObjectId, ApplyError> {
        self.pages.get(page_index).copied().ok_or_else(|| {
            ApplyError::Engine(format!(
                "page {} out of range (document has {} pages)",
                page_index,
                self.pages.len()
            ))
        })
    }

    fn dict(&self, id: ObjectId) -> Result<&Dictionary, ApplyError> {
        self.document
            .get_object(id)
            .and_then(|obj| obj.as_dict())
            .map_err(|err| ApplyError::Engine(format!("object {:?} is not a dictionary: {}", id, err)))
    }

    fn dict_mut(&mut self, id: ObjectId) -> Result<&mut Dictionary, ApplyError> {
        self.document
            .get_object_mut(id)
            .and_then(|obj| obj.as_dict_mut())
            .map_err(|err| ApplyError::Engine(format!("object {:?} is not a dictionary: {}", id, err)))
    }

    // -- Resources ------------------------------------------------------------

    fn font_id(&mut self, base_font: &'static str) -> ObjectId {
        if let Some((_, id)) = self.fonts.iter().find(|(name, _)| *name == base_font) {
            return *id;
        }
        let id = self.document.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => base_font,
            "Encoding" => "WinAnsiEncoding",
        });
        self.fonts.push((base_font, id));
        id
    }

    /// Register every image and font `canvas` draws into `resources`, then
    /// encode the canvas against them.
    fn encode_canvas(
        &mut self,
        canvas: &PageCanvas,
        resources: &mut ResourceSet,
    ) -> Result<Vec<u8>, ApplyError> {
        for op in canvas.ops() {
            match op {
                DrawOp::Image { handle, .. } => {
                    let id = self.images.get(handle.0).copied().ok_or_else(|| {
                        ApplyError::Engine(format!("unknown image handle {}", handle.0))
                    })?;
                    resources.add_image(*handle, id);
                }
                DrawOp::Text { font, .. } => {
                    let id = self.font_id(*font);
                    resources.add_font(*font, id);
                }
                _ => {}
            }
        }
        content::encode(content::operations(canvas.ops(), resources)?)
    }

    /// The page's effective resources with every category dictionary resolved
    /// inline, plus where they have to be written back to.
    fn page_resources(&self, page_id: ObjectId) -> Result<(ResourcesHome, Dictionary), ApplyError> {
        let page = self.dict(page_id)?;
        let (home, raw) = match page.get(b"Resources") {
            Ok(Object::Reference(id)) => (ResourcesHome::Shared(*id), self.dict(*id)?.clone()),
            Ok(Object::Dictionary(dict)) => (ResourcesHome::Page, dict.clone()),
            _ => (ResourcesHome::Page, self.inherited_resources(page)),
        };

        let mut resources = Dictionary::new();
        for (key, value) in raw.iter() {
            let resolved = match value {
                Object::Reference(id) => match self.document.get_object(*id) {
                    Ok(Object::Dictionary(dict)) => Object::Dictionary(dict.clone()),
                    _ => value.clone(),
                },
                other => other.clone(),
            };
            resources.set(key.clone(), resolved);
        }
        Ok((home, resources))
    }

    fn inherited_resources(&self, page: &Dictionary) -> Dictionary {
        let mut parent = page.get(b"Parent").and_then(|p| p.as_reference()).ok();
        for _ in 0..MAX_TREE_DEPTH {
            let Some(id) = parent else {
                break;
            };
            let Ok(node) = self.dict(id) else {
                break;
            };
            match node.get(b"Resources") {
                Ok(Object::Dictionary(dict)) => return dict.clone(),
                Ok(Object::Reference(res_id)) => {
                    if let Ok(dict) = self.dict(*res_id) {
                        return dict.clone();
                    }
                }
                _ => {}
            }
            parent = node.get(b"Parent").and_then(|p| p.as_reference()).ok();
        }
        Dictionary::new()
    }

    fn write_resources(
        &mut self,
        page_id: ObjectId,
        home: ResourcesHome,
        resources: Dictionary,
    ) -> Result<(), ApplyError> {
        match home {
            ResourcesHome::Page => {
                self.dict_mut(page_id)?
                    .set("Resources", Object::Dictionary(resources));
            }
            ResourcesHome::Shared(id) => {
                *self.dict_mut(id)? = resources;
            }
        }
        Ok(())
    }

    // -- Content streams ------------------------------------------------------

    /// The page's content streams as a flat list of references.
    fn content_refs(&mut self, page_id: ObjectId) -> Result<Vec<Object>, ApplyError> {
        let contents = self.dict(page_id)?.get(b"Contents").ok().cloned();
        let refs = match contents {
            Some(Object::Reference(id)) => match self.document.get_object(id) {
                Ok(Object::Array(items)) => items.clone(),
                _ => vec![Object::Reference(id)],
            },
            Some(Object::Array(items)) => items,
            Some(Object::Stream(stream)) => {
                warn!(?page_id, "Page content stream is a direct object, moving it");
                vec![Object::Reference(self.document.add_object(stream))]
            }
            _ => Vec::new(),
        };
        Ok(refs)
    }

    /// Bracket existing content with `q`/`Q` and append `stamp` after it.
    fn wrap_contents(&mut self, page_id: ObjectId, stamp: Vec<u8>) -> Result<(), ApplyError> {
        let existing = self.content_refs(page_id)?;
        let mut contents = Vec::with_capacity(existing.len() + 2);
        let mut tail = Vec::with_capacity(stamp.len() + 2);

        if !existing.is_empty() {
            let open = self
                .document
                .add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
            contents.push(Object::Reference(open));
            contents.extend(existing);
            tail.extend_from_slice(b"Q\n");
        }
        tail.extend(stamp);
        let stamp_id = self.document.add_object(Stream::new(Dictionary::new(), tail));
        contents.push(Object::Reference(stamp_id));

        self.dict_mut(page_id)?
            .set("Contents", Object::Array(contents));
        Ok(())
    }

    // -- Annotations ----------------------------------------------------------

    fn push_annotation(&mut self, page_id: ObjectId, annot_id: ObjectId) -> Result<(), ApplyError> {
        let shared = self
            .dict(page_id)?
            .get(b"Annots")
            .and_then(|obj| obj.as_reference())
            .ok();
        if let Some(array_id) = shared
            && let Ok(Object::Array(items)) = self.document.get_object_mut(array_id)
        {
            items.push(Object::Reference(annot_id));
            return Ok(());
        }

        let page = self.dict_mut(page_id)?;
        if let Ok(Object::Array(items)) = page.get_mut(b"Annots") {
            items.push(Object::Reference(annot_id));
        } else {
            page.set("Annots", Object::Array(vec![Object::Reference(annot_id)]));
        }
        Ok(())
    }
}

impl PdfEngine for LopdfEngine {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn embed_image(&mut self, image: &DecodedImage) -> Result<ImageHandle, ApplyError> {
        let mut dict = image_dictionary(image.width, image.height, "DeviceRGB");
        if let Some(alpha) = &image.alpha {
            let mask = flate_stream(image_dictionary(image.width, image.height, "DeviceGray"), alpha)?;
            dict.set("SMask", self.document.add_object(mask));
        }
        let id = self.document.add_object(flate_stream(dict, &image.rgb)?);

        let handle = ImageHandle(self.images.len());
        self.images.push(id);
        debug!(
            handle = handle.0,
            width = image.width,
            height = image.height,
            masked = image.alpha.is_some(),
            "Image embedded"
        );
        Ok(handle)
    }

    #[instrument(skip(self, canvas), fields(ops = canvas.ops().len()))]
    fn append_page_content(
        &mut self,
        page_index: usize,
        canvas: &PageCanvas,
    ) -> Result<(), ApplyError> {
        let page_id = self.page_id(page_index)?;
        let (home, mut resources) = self.page_resources(page_id)?;

        let mut added = ResourceSet::reserving(existing_names(&resources));
        let stamp = self.encode_canvas(canvas, &mut added)?;

        for (category, entries) in added.categories() {
            let mut dict = match resources.remove(category.as_bytes()) {
                Some(Object::Dictionary(dict)) => dict,
                Some(_) => {
                    warn!(category, "Unresolvable resource category replaced");
                    Dictionary::new()
                }
                None => Dictionary::new(),
            };
            for (name, id) in entries {
                dict.set(name, Object::Reference(id));
            }
            resources.set(category, Object::Dictionary(dict));
        }
        self.write_resources(page_id, home, resources)?;
        self.wrap_contents(page_id, stamp)?;

        debug!(page_index, "Stamp content appended");
        Ok(())
    }

    #[instrument(skip(self, annotation), fields(subtype = annotation.kind.subtype()))]
    fn add_annotation(
        &mut self,
        page_index: usize,
        annotation: &Annotation,
    ) -> Result<(), ApplyError> {
        let page_id = self.page_id(page_index)?;

        let mut resources = ResourceSet::default();
        let appearance = self.encode_canvas(&annotation.appearance, &mut resources)?;
        let bbox = rect_object(&annotation.rect);
        let form_id = self.document.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Form",
                "BBox" => bbox.clone(),
                "Resources" => resources.to_dictionary(),
            },
            appearance,
        ));

        let mut annot = dictionary! {
            "Type" => "Annot",
            "Subtype" => annotation.kind.subtype(),
            "Rect" => bbox,
            // Print flag.
            "F" => 4,
            "P" => page_id,
            "AP" => dictionary! { "N" => form_id },
        };
        if let Some(contents) = &annotation.contents {
            annot.set("Contents", text_string(contents));
        }
        if let Some(da) = &annotation.default_appearance {
            annot.set(
                "DA",
                Object::String(da.as_bytes().to_vec(), StringFormat::Literal),
            );
        }
        let annot_id = self.document.add_object(annot);
        self.push_annotation(page_id, annot_id)?;

        debug!(page_index, ?annot_id, "Annotation added");
        Ok(())
    }

    #[instrument(skip_all)]
    fn serialize(&mut self) -> Result<Vec<u8>, ApplyError> {
        let mut output = Vec::new();
        self.document.save_to(&mut output).map_err(|err| {
            ApplyError::Serialize(format!("failed to serialise stamped PDF: {}", err))
        })?;
        info!(output_bytes = output.len(), "Stamped PDF serialised");
        Ok(output)
    }
}

// -- Helpers ------------------------------------------------------------------

/// Every name already defined in any resource category.
fn existing_names(resources: &Dictionary) -> Vec<String> {
    resources
        .iter()
        .filter_map(|(_, value)| value.as_dict().ok())
        .flat_map(|dict| dict.iter().map(|(name, _)| String::from_utf8_lossy(name).into_owned()))
        .collect()
}

fn image_dictionary(width: u32, height: u32, color_space: &str) -> Dictionary {
    dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => i64::from(width),
        "Height" => i64::from(height),
        "ColorSpace" => color_space,
        "BitsPerComponent" => 8,
    }
}

fn flate_stream(mut dict: Dictionary, data: &[u8]) -> Result<Stream, ApplyError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|err| ApplyError::Engine(format!("failed to compress image data: {}", err)))?;
    let compressed = encoder
        .finish()
        .map_err(|err| ApplyError::Engine(format!("failed to compress image data: {}", err)))?;
    dict.set("Filter", "FlateDecode");
    Ok(Stream::new(dict, compressed))
}

fn rect_object(rect: &Rect) -> Object {
    Object::Array(
        rect.as_array()
            .into_iter()
            .map(|value| Object::Real(value as f32))
            .collect(),
    )
}
