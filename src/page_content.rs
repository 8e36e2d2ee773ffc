use crate::fonts::{text_operand, FontFace};
use crate::geometry::{PageGeometry, Rectangle};
use crate::lopdf_utils;
use crate::pdf_object::PdfObjectDeref;
use crate::Error;
use lopdf::{
    content::{Content, Operation},
    Dictionary, Document, Object, ObjectId, Stream,
};
use std::collections::BTreeMap;

/// RGB color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color(pub f32, pub f32, pub f32);

impl Color {
    pub const fn gray(level: f32) -> Self {
        Color(level, level, level)
    }
}

/// Operations for one page plus the resources they refer to.
#[derive(Debug, Clone, Default)]
pub struct ContentBuilder {
    operations: Vec<Operation>,
    fonts: Vec<FontFace>,
    xobjects: BTreeMap<String, ObjectId>,
    graphics_states: BTreeMap<String, ObjectId>,
}

impl ContentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Draw a single line of text with its baseline starting at `(x, y)`.
    pub fn text(&mut self, face: FontFace, size: f32, color: Color, x: f32, y: f32, text: &str) {
        if !self.fonts.contains(&face) {
            self.fonts.push(face);
        }
        // The following lines use commands: see p643 (Table A.1) for more info
        self.operations.push(Operation::new("BT", vec![]));
        self.operations.push(Operation::new(
            "Tf",
            vec![Object::Name(face.resource_name().as_bytes().to_vec()), size.into()],
        ));
        self.operations.push(Operation::new(
            "rg",
            vec![color.0.into(), color.1.into(), color.2.into()],
        ));
        self.operations
            .push(Operation::new("Td", vec![x.into(), y.into()]));
        self.operations
            .push(Operation::new("Tj", vec![text_operand(text)]));
        self.operations.push(Operation::new("ET", vec![]));
    }

    /// Paint a registered image XObject scaled into `rect`.
    pub fn image(&mut self, xobject_name: &str, xobject_id: ObjectId, rect: Rectangle) {
        self.xobjects.insert(xobject_name.to_owned(), xobject_id);
        // `q` = Save graphics state
        self.operations.push(Operation::new("q", vec![]));
        // `cm` = Concatenate matrix to current transformation matrix
        self.operations.push(Operation::new(
            "cm",
            vec![
                rect.width.into(),
                0i32.into(),
                0i32.into(),
                rect.height.into(),
                rect.x.into(),
                rect.y.into(),
            ],
        ));
        // `Do` = Invoke named XObject
        self.operations.push(Operation::new(
            "Do",
            vec![Object::Name(xobject_name.as_bytes().to_vec())],
        ));
        // `Q` = Restore graphics state
        self.operations.push(Operation::new("Q", vec![]));
    }

    /// Outline `rect` without filling it.
    pub fn stroke_rect(&mut self, rect: Rectangle, color: Color, line_width: f32) {
        self.operations.push(Operation::new("q", vec![]));
        self.operations.push(Operation::new(
            "RG",
            vec![color.0.into(), color.1.into(), color.2.into()],
        ));
        self.operations
            .push(Operation::new("w", vec![line_width.into()]));
        self.operations.push(Operation::new(
            "re",
            vec![
                rect.x.into(),
                rect.y.into(),
                rect.width.into(),
                rect.height.into(),
            ],
        ));
        // `S` = Stroke path
        self.operations.push(Operation::new("S", vec![]));
        self.operations.push(Operation::new("Q", vec![]));
    }

    /// Run `draw` inside its own graphics state with `gs_name` applied (opacity).
    pub fn with_graphics_state<F: FnOnce(&mut Self)>(
        &mut self,
        gs_name: &str,
        gs_id: ObjectId,
        draw: F,
    ) {
        self.graphics_states.insert(gs_name.to_owned(), gs_id);
        self.operations.push(Operation::new("q", vec![]));
        self.operations.push(Operation::new(
            "gs",
            vec![Object::Name(gs_name.as_bytes().to_vec())],
        ));
        draw(self);
        self.operations.push(Operation::new("Q", vec![]));
    }

    pub(crate) fn into_parts(self) -> (Vec<Operation>, PageResources) {
        (
            self.operations,
            PageResources {
                fonts: self.fonts,
                xobjects: self.xobjects,
                graphics_states: self.graphics_states,
            },
        )
    }
}

/// Named resources a content stream needs on its page.
#[derive(Debug, Clone, Default)]
pub(crate) struct PageResources {
    pub fonts: Vec<FontFace>,
    pub xobjects: BTreeMap<String, ObjectId>,
    pub graphics_states: BTreeMap<String, ObjectId>,
}

pub(crate) trait PageCanvas {
    /// Add `object_id` under `name` to the `category` sub-dictionary of the page resources.
    fn add_page_resource(
        &mut self,
        page_id: ObjectId,
        category: &str,
        name: &str,
        object_id: ObjectId,
    ) -> Result<(), Error>;

    /// Wrap the existing content of a page in `q`/`Q` so later drawing starts
    /// from the default graphics state.
    fn isolate_page_content(&mut self, page_id: ObjectId) -> Result<(), Error>;

    /// Append an encoded content stream after the existing ones.
    fn append_page_content(&mut self, page_id: ObjectId, data: Vec<u8>) -> Result<(), Error>;

    /// Add a blank page at the end of the document.
    fn append_blank_page(&mut self, geometry: PageGeometry) -> Result<ObjectId, Error>;

    /// Encode `operations` and add them on top of the page.
    fn draw_operations(
        &mut self,
        page_id: ObjectId,
        operations: Vec<Operation>,
    ) -> Result<(), Error> {
        let content = Content { operations };
        self.append_page_content(page_id, content.encode()?)
    }
}

impl PageCanvas for Document {
    fn add_page_resource(
        &mut self,
        page_id: ObjectId,
        category: &str,
        name: &str,
        object_id: ObjectId,
    ) -> Result<(), Error> {
        // Inherited and indirect dictionaries are copied onto the page, so other
        // pages sharing them are not affected.
        let mut resources = lopdf_utils::page_resources(self, page_id)?;
        let mut entries = match resources.get(category.as_bytes()) {
            Ok(entries) => entries.to_owned_dict(self)?,
            Err(_) => Dictionary::new(),
        };
        entries.set(name, Object::Reference(object_id));
        resources.set(category, Object::Dictionary(entries));
        self.get_object_mut(page_id)?
            .as_dict_mut()?
            .set("Resources", Object::Dictionary(resources));
        Ok(())
    }

    fn isolate_page_content(&mut self, page_id: ObjectId) -> Result<(), Error> {
        let existing = lopdf_utils::content_stream_ids(self, page_id)?;
        if existing.is_empty() {
            return Ok(());
        }
        let save_id = self.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
        let restore_id = self.add_object(Stream::new(Dictionary::new(), b"\nQ\n".to_vec()));
        let mut contents = Vec::with_capacity(existing.len() + 2);
        contents.push(Object::Reference(save_id));
        contents.extend(existing.into_iter().map(Object::Reference));
        contents.push(Object::Reference(restore_id));
        self.get_object_mut(page_id)?
            .as_dict_mut()?
            .set("Contents", Object::Array(contents));
        Ok(())
    }

    fn append_page_content(&mut self, page_id: ObjectId, data: Vec<u8>) -> Result<(), Error> {
        let mut contents = lopdf_utils::content_stream_ids(self, page_id)?
            .into_iter()
            .map(Object::Reference)
            .collect::<Vec<Object>>();
        let content_id = self.add_object(Stream::new(Dictionary::new(), data));
        contents.push(Object::Reference(content_id));
        self.get_object_mut(page_id)?
            .as_dict_mut()?
            .set("Contents", Object::Array(contents));
        Ok(())
    }

    fn append_blank_page(&mut self, geometry: PageGeometry) -> Result<ObjectId, Error> {
        let pages_id = lopdf_utils::pages_root_id(self)?;
        let page_id = self.add_object(lopdf::Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    geometry.origin_x.into(),
                    geometry.origin_y.into(),
                    (geometry.origin_x + geometry.width).into(),
                    (geometry.origin_y + geometry.height).into(),
                ]),
            ),
            ("Resources", Object::Dictionary(Dictionary::new())),
        ]));

        let pages = self.get_object_mut(pages_id)?.as_dict_mut()?;
        let count = pages.get(b"Count").and_then(Object::as_i64).unwrap_or(0);
        pages.get_mut(b"Kids")?.as_array_mut()?.push(Object::Reference(page_id));
        pages.set("Count", count + 1);
        Ok(page_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    fn one_page_document() -> (Document, ObjectId) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let content_id = doc.add_object(Stream::new(dictionary! {}, b"1 0 0 1 50 50 cm".to_vec()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ],
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        (doc, page_id)
    }

    #[test]
    fn existing_content_is_isolated_before_drawing() {
        let (mut doc, page_id) = one_page_document();
        doc.isolate_page_content(page_id).unwrap();
        let mut builder = ContentBuilder::new();
        builder.stroke_rect(
            Rectangle {
                x: 1.0,
                y: 2.0,
                width: 3.0,
                height: 4.0,
            },
            Color::gray(0.5),
            1.0,
        );
        let (operations, _) = builder.into_parts();
        doc.draw_operations(page_id, operations).unwrap();

        let content = doc.get_page_content(page_id).unwrap();
        let content = Content::decode(&content).unwrap();
        let operators = content
            .operations
            .iter()
            .map(|op| op.operator.as_str())
            .collect::<Vec<_>>();
        assert_eq!(
            operators,
            vec!["q", "cm", "Q", "q", "RG", "w", "re", "S", "Q"]
        );
    }

    #[test]
    fn resources_are_added_to_the_page() {
        let (mut doc, page_id) = one_page_document();
        let font_id = doc.add_object(dictionary! { "Type" => "Font" });
        doc.add_page_resource(page_id, "Font", "F9", font_id).unwrap();
        let resources = lopdf_utils::page_resources(&doc, page_id).unwrap();
        let fonts = resources.get(b"Font").unwrap().as_dict().unwrap();
        assert_eq!(fonts.get(b"F9").unwrap().as_reference().unwrap(), font_id);
    }

    #[test]
    fn blank_page_is_appended_last() {
        let (mut doc, first_page) = one_page_document();
        let page_id = doc
            .append_blank_page(PageGeometry::new(595.28, 841.89))
            .unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages.get(&1), Some(&first_page));
        assert_eq!(pages.get(&2), Some(&page_id));
    }

    #[test]
    fn text_registers_its_font_once() {
        let mut builder = ContentBuilder::new();
        builder.text(FontFace::Bold, 12.0, Color::gray(0.0), 0.0, 0.0, "a");
        builder.text(FontFace::Bold, 12.0, Color::gray(0.0), 0.0, 0.0, "b");
        let (_, resources) = builder.into_parts();
        assert_eq!(resources.fonts, vec![FontFace::Bold]);
    }
}
