//! Diploma template loading

use super::xobject::{extract_number, inherited_attribute};
use crate::constants::DEFAULT_PAGE_DIMENSIONS;
use crate::types::{DiplomaError, Result};
use lopdf::{Document, Object, ObjectId};
use std::path::Path;

/// A parsed template PDF. Only its first page is ever used.
///
/// Loaded once per batch and shared read-only by every row.
#[derive(Debug, Clone)]
pub struct Template {
    document: Document,
    page_id: ObjectId,
    media_box: [f32; 4],
    rotate: Option<i64>,
}

impl Template {
    /// Parse template bytes.
    ///
    /// Fails when the bytes are not a readable PDF or the PDF has no pages.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let document = Document::load_mem(bytes)
            .map_err(|e| DiplomaError::Template(format!("cannot read PDF: {}", e)))?;

        let page_id = document
            .get_pages()
            .values()
            .next()
            .copied()
            .ok_or_else(|| DiplomaError::Template("PDF has no pages".to_string()))?;

        let media_box = inherited_attribute(&document, page_id, b"MediaBox")
            .and_then(|obj| parse_rect(&document, &obj))
            .unwrap_or([0.0, 0.0, DEFAULT_PAGE_DIMENSIONS.0, DEFAULT_PAGE_DIMENSIONS.1]);

        let rotate = inherited_attribute(&document, page_id, b"Rotate")
            .and_then(|obj| obj.as_i64().ok())
            .filter(|degrees| degrees % 360 != 0);

        Ok(Self {
            document,
            page_id,
            media_box,
            rotate,
        })
    }

    /// Read and parse a template file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        Self::from_bytes(&bytes)
    }

    /// Page width and height in points
    pub fn page_size(&self) -> (f32, f32) {
        let [x0, y0, x1, y1] = self.media_box;
        ((x1 - x0).abs(), (y1 - y0).abs())
    }

    pub fn media_box(&self) -> [f32; 4] {
        self.media_box
    }

    pub(crate) fn document(&self) -> &Document {
        &self.document
    }

    pub(crate) fn page_id(&self) -> ObjectId {
        self.page_id
    }

    pub(crate) fn rotate(&self) -> Option<i64> {
        self.rotate
    }
}

/// `[x0 y0 x1 y1]`, resolving an indirect array if needed.
fn parse_rect(doc: &Document, obj: &Object) -> Option<[f32; 4]> {
    let arr = match obj {
        Object::Reference(id) => doc.get_object(*id).ok()?.as_array().ok()?,
        other => other.as_array().ok()?,
    };
    if arr.len() != 4 {
        return None;
    }
    let mut rect = [0.0; 4];
    for (slot, value) in rect.iter_mut().zip(arr) {
        *slot = extract_number(value)?;
    }
    let [x0, y0, x1, y1] = rect;
    if (x1 - x0).abs() < f32::EPSILON || (y1 - y0).abs() < f32::EPSILON {
        return None;
    }
    Some(rect)
}
