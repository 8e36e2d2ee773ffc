mod audit_page;
mod compositor;
mod config;
mod diagnostics;
mod error;
mod fonts;
mod geometry;
mod image_xobject;
mod lopdf_utils;
mod page_content;
mod pdf_object;
mod signature_image;
mod signature_placement;
mod signing_request;
mod text_placement;
mod text_wrap;
mod upload;
mod watermark;

use fonts::EmbeddedFonts;
use lopdf::{Document, Object, ObjectId};
use page_content::PageCanvas;
use std::collections::{HashMap, HashSet};

pub use audit_page::{used_signers, AuditCursor, AuditKind, AuditLine, AuditTrail};
pub use compositor::{content_hash, CompositingResult, Compositor};
pub use config::{CompositorConfig, WatermarkConfig};
pub use diagnostics::{Diagnostic, SkipReason};
pub use error::Error;
pub use fonts::FontFace;
pub use geometry::{PageGeometry, Rectangle, TEXT_ANCHOR_OFFSET};
pub use lopdf;
pub use page_content::{Color, ContentBuilder};
pub use signature_image::{
    png_bytes_from_data_url, EmbeddedImage, ResolvedSignatures, SignatureImages,
};
pub use signing_request::{
    CompositeMode, PlanTier, RequestPayload, SignatureImageMap, SignaturePlacement, Signer,
    SigningRequest, TextPlacement,
};
pub use text_wrap::{wrap_text, DEFAULT_WRAP_WIDTH};
pub use upload::ScopedUpload;

/// A PDF document being composed. Drawing always goes on top of existing content.
#[derive(Debug, Clone)]
pub struct PdfCompositingDocument {
    raw_document: Document,
    /// The two font faces, added once and shared by all pages.
    fonts: EmbeddedFonts,
    /// Opacity (in percent) to the `ExtGState` implementing it.
    graphics_states: HashMap<u32, ObjectId>,
    /// Pages whose original content is already wrapped in `q`/`Q`, or that we created.
    isolated_pages: HashSet<ObjectId>,
}

impl PdfCompositingDocument {
    pub fn new(mut raw_document: Document) -> Self {
        let fonts = EmbeddedFonts::embed(&mut raw_document);
        PdfCompositingDocument {
            raw_document,
            fonts,
            graphics_states: HashMap::new(),
            isolated_pages: HashSet::new(),
        }
    }

    /// Parse a PDF file from memory.
    pub fn load(pdf_bytes: &[u8]) -> Result<Self, Error> {
        let raw_document = Document::load_mem(pdf_bytes)?;
        if raw_document.is_encrypted() {
            return Err(Error::from("Encrypted PDF documents are not supported."));
        }
        Ok(Self::new(raw_document))
    }

    /// A document without any pages.
    pub fn empty() -> Self {
        use lopdf::Object::*;
        let mut raw_document = Document::with_version("1.7");
        let pages_id = raw_document.add_object(lopdf::Dictionary::from_iter(vec![
            ("Type", Name("Pages".as_bytes().to_vec())),
            ("Kids", Array(vec![])),
            ("Count", Integer(0)),
        ]));
        let catalog_id = raw_document.add_object(lopdf::Dictionary::from_iter(vec![
            ("Type", Name("Catalog".as_bytes().to_vec())),
            ("Pages", Reference(pages_id)),
        ]));
        raw_document.trailer.set("Root", Reference(catalog_id));
        Self::new(raw_document)
    }

    pub fn finished(self) -> Document {
        self.raw_document
    }

    pub fn get_document_ref(&self) -> &Document {
        &self.raw_document
    }

    /// Page object ids in page order.
    pub fn page_ids(&self) -> Vec<ObjectId> {
        self.raw_document.get_pages().into_values().collect()
    }

    pub fn page_count(&self) -> usize {
        self.raw_document.get_pages().len()
    }

    pub fn page_geometry(&self, page_id: ObjectId) -> Result<PageGeometry, Error> {
        let media_box = lopdf_utils::media_box(&self.raw_document, page_id)?;
        Ok(PageGeometry::from_media_box(media_box))
    }

    /// Add a blank page at the end of the document.
    pub fn append_page(&mut self, geometry: PageGeometry) -> Result<ObjectId, Error> {
        let page_id = self.raw_document.append_blank_page(geometry)?;
        self.isolated_pages.insert(page_id);
        Ok(page_id)
    }

    /// Draw the content of `builder` on top of the page.
    pub fn draw(&mut self, page_id: ObjectId, builder: ContentBuilder) -> Result<(), Error> {
        if builder.is_empty() {
            return Ok(());
        }
        if self.isolated_pages.insert(page_id) {
            self.raw_document.isolate_page_content(page_id)?;
        }
        let (operations, resources) = builder.into_parts();
        for face in resources.fonts {
            self.raw_document.add_page_resource(
                page_id,
                "Font",
                face.resource_name(),
                self.fonts.object_id(face),
            )?;
        }
        for (name, object_id) in resources.xobjects {
            self.raw_document
                .add_page_resource(page_id, "XObject", &name, object_id)?;
        }
        for (name, object_id) in resources.graphics_states {
            self.raw_document
                .add_page_resource(page_id, "ExtGState", &name, object_id)?;
        }
        self.raw_document.draw_operations(page_id, operations)
    }

    /// Shared `ExtGState` for fill and stroke `opacity`, with its resource name.
    pub fn graphics_state(&mut self, opacity: f32) -> (String, ObjectId) {
        let percent = (opacity.clamp(0.0, 1.0) * 100.0).round() as u32;
        let name = format!("SFGs{}", percent);
        if let Some(object_id) = self.graphics_states.get(&percent) {
            return (name, *object_id);
        }
        let alpha = percent as f32 / 100.0;
        let object_id = self.raw_document.add_object(lopdf::Dictionary::from_iter(vec![
            ("Type", Object::Name("ExtGState".as_bytes().to_vec())),
            ("ca", alpha.into()),
            ("CA", alpha.into()),
        ]));
        self.graphics_states.insert(percent, object_id);
        (name, object_id)
    }

    /// Serialize the document.
    pub fn save(self, compress: bool) -> Result<Vec<u8>, Error> {
        let mut raw_document = self.finished();
        if compress {
            raw_document.compress();
        }
        let mut pdf_file_data: Vec<u8> = Vec::new();
        raw_document.save_to(&mut pdf_file_data)?;
        Ok(pdf_file_data)
    }
}
