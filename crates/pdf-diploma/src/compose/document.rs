//! Single-page output document scaffolding

use crate::types::Result;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

/// Fresh document with an empty `Pages` node reserved
pub(crate) fn new_document_with_pages() -> (Document, ObjectId) {
    let mut output = Document::with_version("1.5");
    let pages_id = output.new_object_id();
    (output, pages_id)
}

/// Add the only page of the document and wire up `Pages` and the catalog.
pub(crate) fn add_single_page(
    output: &mut Document,
    pages_id: ObjectId,
    media_box: [f32; 4],
    rotate: Option<i64>,
    fonts: Dictionary,
    xobjects: Dictionary,
    content: String,
) -> ObjectId {
    let mut resources = Dictionary::new();
    if !xobjects.is_empty() {
        resources.set("XObject", Object::Dictionary(xobjects));
    }
    if !fonts.is_empty() {
        resources.set("Font", Object::Dictionary(fonts));
    }

    let content_id = output.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

    let mut page_dict = Dictionary::new();
    page_dict.set("Type", Object::Name(b"Page".to_vec()));
    page_dict.set("Parent", Object::Reference(pages_id));
    page_dict.set("MediaBox", rect_object(media_box));
    if let Some(degrees) = rotate {
        page_dict.set("Rotate", Object::Integer(degrees));
    }
    page_dict.set("Contents", Object::Reference(content_id));
    page_dict.set("Resources", Object::Dictionary(resources));
    let page_id = output.add_object(page_dict);

    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(vec![Object::Reference(page_id)])),
        ("Count", Object::Integer(1)),
    ]);
    output.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = output.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    output.trailer.set("Root", Object::Reference(catalog_id));

    page_id
}

fn rect_object(rect: [f32; 4]) -> Object {
    Object::Array(rect.iter().map(|v| Object::Real(*v)).collect())
}

/// Compress streams and serialize
pub(crate) fn save_to_bytes(mut doc: Document) -> Result<Vec<u8>> {
    doc.compress();
    let mut writer = Vec::new();
    doc.save_to(&mut writer)?;
    Ok(writer)
}
