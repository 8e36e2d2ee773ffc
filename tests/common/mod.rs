#![allow(dead_code)]

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use pdf_compositor::lopdf::{
    content::{Content, Operation},
    dictionary, Document, Object, ObjectId, Stream,
};

/// A US Letter document with `page_count` pages, each showing "Page n".
/// Fonts and the media box are inherited from the page tree root.
pub fn sample_pdf(page_count: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for page_number in 1..=page_count {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new(
                    "Tf",
                    vec![Object::Name(b"F1".to_vec()), Object::Integer(24)],
                ),
                Operation::new("Td", vec![Object::Integer(100), Object::Integer(600)]),
                Operation::new(
                    "Tj",
                    vec![Object::string_literal(format!("Page {}", page_number))],
                ),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(page_count as i64),
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// A small RGBA signature image.
pub fn signature_png() -> Vec<u8> {
    let (width, height) = (4, 2);
    let data = (0..width * height)
        .flat_map(|i| [20, 20, 120, if i % 2 == 0 { 255 } else { 0 }])
        .collect::<Vec<u8>>();
    let mut bytes = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut bytes, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(&data).unwrap();
    }
    bytes
}

pub fn png_data_url(png_bytes: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png_bytes))
}

pub fn load(pdf: &[u8]) -> Document {
    Document::load_mem(pdf).unwrap()
}

pub fn page_id(doc: &Document, page_number: u32) -> ObjectId {
    doc.get_pages()[&page_number]
}

pub fn page_operations(doc: &Document, page_number: u32) -> Vec<Operation> {
    let content = doc.get_page_content(page_id(doc, page_number)).unwrap();
    Content::decode(&content).unwrap().operations
}

/// The `Tj` strings of a page. Non ASCII bytes come out as replacement characters.
pub fn page_texts(doc: &Document, page_number: u32) -> Vec<String> {
    page_operations(doc, page_number)
        .into_iter()
        .filter(|op| op.operator == "Tj")
        .filter_map(|op| {
            op.operands
                .first()
                .and_then(|operand| operand.as_str().ok())
                .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
        })
        .collect()
}

pub fn page_has_text(doc: &Document, page_number: u32, needle: &str) -> bool {
    page_texts(doc, page_number)
        .iter()
        .any(|text| text.contains(needle))
}

pub fn count_operator(doc: &Document, page_number: u32, operator: &str) -> usize {
    page_operations(doc, page_number)
        .iter()
        .filter(|op| op.operator == operator)
        .count()
}

/// The `/Resources` sub-dictionary `category` of a page, resolved.
pub fn page_resource_names(doc: &Document, page_number: u32, category: &[u8]) -> Vec<Vec<u8>> {
    let page = doc
        .get_object(page_id(doc, page_number))
        .unwrap()
        .as_dict()
        .unwrap();
    let resources = match page.get(b"Resources").unwrap() {
        Object::Reference(id) => doc.get_object(*id).unwrap().as_dict().unwrap(),
        other => other.as_dict().unwrap(),
    };
    match resources.get(category) {
        Ok(entries) => entries
            .as_dict()
            .unwrap()
            .iter()
            .map(|(name, _)| name.clone())
            .collect(),
        Err(_) => Vec::new(),
    }
}
