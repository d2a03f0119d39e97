//! Template page import
//!
//! The template's first page is turned into a Form XObject in the output
//! document so it can be painted underneath the overlay without touching its
//! resource names.

use crate::types::Result;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;

// =============================================================================
// XObject Creation
// =============================================================================

/// Create a Form XObject from a source page.
///
/// # Arguments
/// * `output` - The output document to add the XObject to
/// * `source` - The source document containing the page
/// * `page_id` - The object ID of the source page
/// * `bbox` - The page's MediaBox, used as the form's bounding box
/// * `cache` - Source → output object IDs already copied
pub fn create_page_xobject(
    output: &mut Document,
    source: &Document,
    page_id: ObjectId,
    bbox: Vec<Object>,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<ObjectId> {
    let page_dict = source.get_dictionary(page_id)?;

    let content_data = get_page_content(source, page_dict)?;

    let mut xobject_dict = Dictionary::new();
    xobject_dict.set("Type", Object::Name(b"XObject".to_vec()));
    xobject_dict.set("Subtype", Object::Name(b"Form".to_vec()));
    xobject_dict.set("BBox", Object::Array(bbox));
    xobject_dict.set("FormType", Object::Integer(1));

    // Resources may live on the page or on any ancestor in the page tree
    if let Some(resources) = inherited_attribute(source, page_id, b"Resources") {
        xobject_dict.set(
            "Resources",
            copy_object_deep(output, source, &resources, cache)?,
        );
    }

    Ok(output.add_object(Stream::new(xobject_dict, content_data)))
}

/// Look up an inheritable page attribute (MediaBox, Resources, Rotate),
/// walking up the `Parent` chain.
pub fn inherited_attribute(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut current = doc.get_dictionary(page_id).ok()?;
    // Bounded walk; malformed trees can contain Parent cycles
    for _ in 0..32 {
        if let Ok(value) = current.get(key) {
            return Some(value.clone());
        }
        let parent = current.get(b"Parent").ok()?.as_reference().ok()?;
        current = doc.get_dictionary(parent).ok()?;
    }
    None
}

// =============================================================================
// Page Content Extraction
// =============================================================================

/// Get the content stream data from a page.
fn get_page_content(doc: &Document, page_dict: &Dictionary) -> Result<Vec<u8>> {
    let contents = match page_dict.get(b"Contents") {
        Ok(c) => c,
        Err(_) => return Ok(Vec::new()),
    };

    match contents {
        Object::Reference(id) => match doc.get_object(*id)? {
            Object::Array(arr) => get_concatenated_content_streams(doc, arr),
            _ => get_single_content_stream(doc, *id),
        },
        Object::Array(arr) => get_concatenated_content_streams(doc, arr),
        _ => Ok(Vec::new()),
    }
}

fn get_single_content_stream(doc: &Document, id: ObjectId) -> Result<Vec<u8>> {
    if let Ok(stream) = doc.get_object(id)?.as_stream() {
        Ok(stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone()))
    } else {
        Ok(Vec::new())
    }
}

fn get_concatenated_content_streams(doc: &Document, refs: &[Object]) -> Result<Vec<u8>> {
    let mut result = Vec::new();

    for obj in refs {
        if let Object::Reference(id) = obj {
            result.extend_from_slice(&get_single_content_stream(doc, *id)?);
            result.push(b'\n');
        }
    }

    Ok(result)
}

// =============================================================================
// Deep Copy
// =============================================================================

/// Deep copy an object from source to output document, following references.
///
/// The output ID is reserved before the referenced object is copied, so
/// reference cycles resolve to the same copy instead of recursing forever.
pub fn copy_object_deep(
    output: &mut Document,
    source: &Document,
    obj: &Object,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Object> {
    match obj {
        Object::Reference(id) => {
            if let Some(&new_id) = cache.get(id) {
                return Ok(Object::Reference(new_id));
            }

            let new_id = output.new_object_id();
            cache.insert(*id, new_id);

            let referenced = source.get_object(*id)?;
            let copied = copy_object_deep(output, source, referenced, cache)?;
            output.objects.insert(new_id, copied);

            Ok(Object::Reference(new_id))
        }
        Object::Dictionary(dict) => Ok(Object::Dictionary(copy_dictionary(
            output, source, dict, cache,
        )?)),
        Object::Array(arr) => {
            let new_arr: Result<Vec<_>> = arr
                .iter()
                .map(|item| copy_object_deep(output, source, item, cache))
                .collect();
            Ok(Object::Array(new_arr?))
        }
        Object::Stream(stream) => Ok(Object::Stream(Stream {
            dict: copy_dictionary(output, source, &stream.dict, cache)?,
            content: stream.content.clone(),
            allows_compression: stream.allows_compression,
            start_position: None,
        })),
        _ => Ok(obj.clone()),
    }
}

fn copy_dictionary(
    output: &mut Document,
    source: &Document,
    dict: &Dictionary,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Dictionary> {
    let mut new_dict = Dictionary::new();
    for (key, value) in dict.iter() {
        new_dict.set(key.clone(), copy_object_deep(output, source, value, cache)?);
    }
    Ok(new_dict)
}

// =============================================================================
// Page Dimensions
// =============================================================================

/// Extract numeric value from a PDF object
pub fn extract_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}
