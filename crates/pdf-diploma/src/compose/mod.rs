//! Diploma composition
//!
//! One diploma is the template's first page with a per-row overlay stamped on
//! top. Everything here is synchronous and free of I/O apart from the async
//! loaders on [`Template`]; callers running inside a runtime should move
//! [`compose`] onto a blocking thread.

mod document;
mod merge;
mod overlay;
mod template;
mod xobject;

pub use merge::merge_onto_template;
pub use overlay::{
    ImageRect, Overlay, SignatureOutcome, SkipReason, TextRun, build_overlay,
};
pub use template::Template;

use crate::config::LayoutConfig;
use crate::types::{DiplomaRow, Result};
use document::save_to_bytes;
use tracing::debug;

/// A finished diploma and what happened to its signature
#[derive(Debug, Clone)]
pub struct ComposedDiploma {
    /// Serialized one-page PDF
    pub bytes: Vec<u8>,
    pub signature: SignatureOutcome,
}

/// Compose one diploma against an already-parsed template.
///
/// Errors only when the output PDF cannot be assembled or serialized. An
/// unusable signature image is not an error; see [`SignatureOutcome`].
pub fn compose(
    template: &Template,
    layout: &LayoutConfig,
    row: &DiplomaRow,
    signature: Option<&[u8]>,
) -> Result<ComposedDiploma> {
    let (overlay, outcome) = build_overlay(template.page_size(), layout, row, signature);
    let document = merge_onto_template(template, &overlay)?;
    let bytes = save_to_bytes(document)?;

    debug!(
        nombre = %row.nombre,
        bytes = bytes.len(),
        signed = outcome.is_embedded(),
        "Composed diploma"
    );

    Ok(ComposedDiploma {
        bytes,
        signature: outcome,
    })
}

/// [`compose`] taking the raw template PDF
pub fn compose_bytes(
    template_bytes: &[u8],
    layout: &LayoutConfig,
    row: &DiplomaRow,
    signature: Option<&[u8]>,
) -> Result<ComposedDiploma> {
    let template = Template::from_bytes(template_bytes)?;
    compose(&template, layout, row, signature)
}
