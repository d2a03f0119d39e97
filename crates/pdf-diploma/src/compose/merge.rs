//! Stamping an overlay onto the template page

use super::document::{add_single_page, new_document_with_pages};
use super::overlay::Overlay;
use super::template::Template;
use super::xobject::create_page_xobject;
use crate::constants::TEMPLATE_XOBJECT_NAME;
use crate::types::Result;
use lopdf::{Dictionary, Document, Object};
use std::collections::HashMap;

/// Build a one-page document: the template page painted first, the overlay
/// on top. The template's MediaBox and rotation carry over unchanged.
pub fn merge_onto_template(template: &Template, overlay: &Overlay) -> Result<Document> {
    let (mut output, pages_id) = new_document_with_pages();
    let media_box = template.media_box();

    let mut cache = HashMap::new();
    let bbox = media_box.iter().map(|v| Object::Real(*v)).collect();
    let template_id = create_page_xobject(
        &mut output,
        template.document(),
        template.page_id(),
        bbox,
        &mut cache,
    )?;

    let mut xobjects = Dictionary::new();
    xobjects.set(TEMPLATE_XOBJECT_NAME, Object::Reference(template_id));
    let mut fonts = Dictionary::new();

    let mut content = format!("q /{} Do Q\n", TEMPLATE_XOBJECT_NAME);
    content.push_str(&overlay.write_into(&mut output, &mut fonts, &mut xobjects));

    add_single_page(
        &mut output,
        pages_id,
        media_box,
        template.rotate(),
        fonts,
        xobjects,
        content,
    );
    Ok(output)
}
