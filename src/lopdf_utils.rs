use crate::pdf_object::PdfObjectDeref;
use crate::Error;
use lopdf::{Dictionary, Document, Object, ObjectId};

/// US Letter, used when no `/MediaBox` can be found.
pub(crate) const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// Guards against `Parent` cycles in malformed page trees.
const MAX_TREE_DEPTH: usize = 32;

/// Look up a page attribute, walking up the `Parent` chain for inheritable keys.
pub(crate) fn inherited_attribute<'a>(
    raw_doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Result<Option<&'a Object>, Error> {
    let mut node = raw_doc.get_object(page_id)?.as_dict()?;
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = node.get(key) {
            return Ok(Some(value.deref(raw_doc)?));
        }
        match node.get(b"Parent") {
            Ok(parent) => node = parent.deref(raw_doc)?.as_dict()?,
            Err(_) => return Ok(None),
        }
    }
    log::warn!("Page tree is deeper than {} levels.", MAX_TREE_DEPTH);
    Ok(None)
}

/// The page `/MediaBox` as `[llx, lly, urx, ury]`.
pub(crate) fn media_box(raw_doc: &Document, page_id: ObjectId) -> Result<[f32; 4], Error> {
    let media_box = inherited_attribute(raw_doc, page_id, b"MediaBox")?
        .and_then(|obj| obj.as_array().ok())
        .and_then(|list| {
            let values = list
                .iter()
                .filter_map(|item| item.deref(raw_doc).ok()?.as_number())
                .collect::<Vec<f32>>();
            <[f32; 4]>::try_from(values).ok()
        });
    Ok(media_box.unwrap_or_else(|| {
        log::debug!(
            "Page `({},{})` has no usable MediaBox, using US Letter.",
            page_id.0,
            page_id.1
        );
        DEFAULT_MEDIA_BOX
    }))
}

/// Owned copy of the resources that apply to a page, inherited ones included.
pub(crate) fn page_resources(raw_doc: &Document, page_id: ObjectId) -> Result<Dictionary, Error> {
    match inherited_attribute(raw_doc, page_id, b"Resources")? {
        Some(resources) => resources.to_owned_dict(raw_doc),
        None => Ok(Dictionary::new()),
    }
}

/// The object ids of the content streams of a page, in drawing order.
pub(crate) fn content_stream_ids(
    raw_doc: &Document,
    page_id: ObjectId,
) -> Result<Vec<ObjectId>, Error> {
    let page = raw_doc.get_object(page_id)?.as_dict()?;
    let contents = match page.get(b"Contents") {
        Ok(contents) => contents,
        Err(_) => return Ok(vec![]),
    };
    let list = match contents {
        Object::Reference(id) => match raw_doc.get_object(*id)? {
            Object::Array(list) => list,
            _ => return Ok(vec![*id]),
        },
        Object::Array(list) => list,
        _ => return Err(Error::from("Page `Contents` is not a stream reference.")),
    };
    Ok(list
        .iter()
        .filter_map(|item| item.as_reference().ok())
        .collect())
}

/// Object id of the root `Pages` node.
pub(crate) fn pages_root_id(raw_doc: &Document) -> Result<ObjectId, Error> {
    let root = raw_doc.trailer.get(b"Root")?.deref(raw_doc)?.as_dict()?;
    Ok(root.get(b"Pages")?.as_reference()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    fn document_with_inheritance() -> (Document, ObjectId) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => 1,
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(300),
                    Object::Real(400.5),
                ],
                "Resources" => dictionary! {
                    "Font" => dictionary! { "F1" => font_id },
                },
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
    fn media_box_is_inherited() {
        let (doc, page_id) = document_with_inheritance();
        assert_eq!(media_box(&doc, page_id).unwrap(), [0.0, 0.0, 300.0, 400.5]);
    }

    #[test]
    fn resources_are_inherited() {
        let (doc, page_id) = document_with_inheritance();
        let resources = page_resources(&doc, page_id).unwrap();
        assert!(resources.get(b"Font").unwrap().as_dict().unwrap().has(b"F1"));
    }

    #[test]
    fn page_without_contents_has_no_streams() {
        let (doc, page_id) = document_with_inheritance();
        assert!(content_stream_ids(&doc, page_id).unwrap().is_empty());
    }

    #[test]
    fn finds_pages_root() {
        let (doc, page_id) = document_with_inheritance();
        let pages_id = pages_root_id(&doc).unwrap();
        let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
        assert_eq!(page.get(b"Parent").unwrap().as_reference().unwrap(), pages_id);
    }
}
