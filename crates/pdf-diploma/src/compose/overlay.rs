//! The per-row overlay: text runs and the signature image
//!
//! An overlay is a transient single page holding only what is drawn for one
//! diploma. It can be written on top of the template page or saved on its
//! own for inspection.

use super::document::{add_single_page, new_document_with_pages, save_to_bytes};
use crate::config::{Color, FontSpec, LayoutConfig, SignatureField};
use crate::constants::SIGNATURE_XOBJECT_NAME;
use crate::fonts::StandardFont;
use crate::layout::place_text;
use crate::locale::{fecha_a_espanol, title_case, upper_case};
use crate::transparency::make_background_transparent;
use crate::types::{DiplomaRow, Result};
use image::RgbaImage;
use lopdf::{Dictionary, Document, Object, Stream};
use tracing::{debug, warn};

// =============================================================================
// Types
// =============================================================================

/// One string drawn at a resolved position
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    /// Displayed text, after case transforms
    pub text: String,
    pub font: StandardFont,
    pub size: f32,
    pub color: Color,
    /// Left edge of the baseline
    pub x: f32,
    pub y: f32,
}

/// Placed image rectangle in page coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Why a diploma was produced without a signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The caller supplied no signature bytes
    NotProvided,
    /// The bytes could not be decoded or processed
    Unreadable(String),
}

/// What happened to the signature while composing a row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureOutcome {
    Embedded,
    Skipped(SkipReason),
}

impl SignatureOutcome {
    pub fn is_embedded(&self) -> bool {
        matches!(self, SignatureOutcome::Embedded)
    }
}

#[derive(Debug, Clone)]
struct PlacedImage {
    image: RgbaImage,
    rect: ImageRect,
}

/// Everything drawn on top of the template for a single diploma
#[derive(Debug, Clone)]
pub struct Overlay {
    width: f32,
    height: f32,
    runs: Vec<TextRun>,
    signature: Option<PlacedImage>,
}

// =============================================================================
// Building
// =============================================================================

/// Lay out one row against the layout and page size.
///
/// Signature problems never fail the row; they are logged and reported in
/// the returned outcome.
pub fn build_overlay(
    page_size: (f32, f32),
    layout: &LayoutConfig,
    row: &DiplomaRow,
    signature: Option<&[u8]>,
) -> (Overlay, SignatureOutcome) {
    let (page_width, page_height) = page_size;
    let mut overlay = Overlay::new(page_width, page_height);

    let nombre = title_case(&row.nombre);
    let curso = upper_case(&row.curso);
    let fecha = fecha_a_espanol(row.fecha.trim());
    let profesor = row.profesor.trim();

    overlay.push_field(&nombre, &layout.estudiante.font, &layout.estudiante.placement);
    overlay.push_field(&curso, &layout.curso.font, &layout.curso.placement);

    let outcome = match signature {
        None => SignatureOutcome::Skipped(SkipReason::NotProvided),
        Some(bytes) => match overlay.place_signature(bytes, &layout.profesor_signature) {
            Ok(()) => SignatureOutcome::Embedded,
            Err(reason) => {
                warn!(
                    profesor = %profesor,
                    error = %reason,
                    "Signature render failed; diploma emitted unsigned"
                );
                SignatureOutcome::Skipped(SkipReason::Unreadable(reason))
            }
        },
    };

    overlay.push_field(profesor, &layout.profesor.font, &layout.profesor.placement);
    overlay.push_field(&fecha, &layout.fecha.font, &layout.fecha.placement);

    (overlay, outcome)
}

impl Overlay {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            runs: Vec::new(),
            signature: None,
        }
    }

    pub fn page_size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn text_runs(&self) -> &[TextRun] {
        &self.runs
    }

    pub fn signature_rect(&self) -> Option<ImageRect> {
        self.signature.as_ref().map(|placed| placed.rect)
    }

    /// Draw `text` at an explicit position
    pub fn push_text(&mut self, text: &str, spec: &FontSpec, x: f32, y: f32) {
        self.runs.push(TextRun {
            text: text.to_string(),
            font: spec.font,
            size: spec.size,
            color: spec.color,
            x,
            y,
        });
    }

    fn push_field(&mut self, text: &str, spec: &FontSpec, placement: &crate::layout::Placement) {
        let (x, y) = place_text(text, spec.font, spec.size, placement, self.width);
        debug!(text, x, y, "Placed text field");
        self.push_text(text, spec, x, y);
    }

    /// Key out the background and fit the image into the signature box.
    fn place_signature(
        &mut self,
        bytes: &[u8],
        field: &SignatureField,
    ) -> std::result::Result<(), String> {
        let image =
            make_background_transparent(bytes, field.bg_threshold).map_err(|e| e.to_string())?;
        let rect = fit_in_box(image.width(), image.height(), field)
            .ok_or_else(|| "signature image has no pixels".to_string())?;
        self.signature = Some(PlacedImage { image, rect });
        Ok(())
    }

    // =========================================================================
    // Writing
    // =========================================================================

    /// Add the overlay's fonts and image to `output`, registering them in
    /// the given resource dictionaries, and return the content operators.
    pub(crate) fn write_into(
        &self,
        output: &mut Document,
        fonts: &mut Dictionary,
        xobjects: &mut Dictionary,
    ) -> String {
        let mut ops = String::new();
        let mut used_fonts: Vec<StandardFont> = Vec::new();

        if let Some(placed) = &self.signature {
            let image_id = add_image_xobject(output, &placed.image);
            xobjects.set(SIGNATURE_XOBJECT_NAME, Object::Reference(image_id));
            let r = placed.rect;
            ops.push_str(&format!(
                "q {} 0 0 {} {} {} cm /{} Do Q\n",
                r.width, r.height, r.x, r.y, SIGNATURE_XOBJECT_NAME
            ));
        }

        for run in &self.runs {
            let index = match used_fonts.iter().position(|f| *f == run.font) {
                Some(i) => i,
                None => {
                    used_fonts.push(run.font);
                    used_fonts.len() - 1
                }
            };
            let encoded = escape_pdf_string(&run.font.encode_win_ansi(&run.text));
            ops.push_str(&format!(
                "BT /F{} {} Tf {} {} {} rg {} {} Td ({}) Tj ET\n",
                index + 1,
                run.size,
                run.color.r,
                run.color.g,
                run.color.b,
                run.x,
                run.y,
                encoded
            ));
        }

        for (i, font) in used_fonts.iter().enumerate() {
            let font_id = output.add_object(font_dictionary(*font));
            fonts.set(format!("F{}", i + 1).into_bytes(), Object::Reference(font_id));
        }

        ops
    }

    /// Save the overlay alone as a one-page PDF
    pub fn into_document(self) -> Document {
        let (mut output, pages_id) = new_document_with_pages();
        let mut fonts = Dictionary::new();
        let mut xobjects = Dictionary::new();
        let content = self.write_into(&mut output, &mut fonts, &mut xobjects);

        let media_box = [0.0, 0.0, self.width, self.height];
        add_single_page(
            &mut output,
            pages_id,
            media_box,
            None,
            fonts,
            xobjects,
            content,
        );
        output
    }

    pub fn to_pdf_bytes(self) -> Result<Vec<u8>> {
        save_to_bytes(self.into_document())
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Scale `width × height` uniformly into the square box and center it there.
fn fit_in_box(width: u32, height: u32, field: &SignatureField) -> Option<ImageRect> {
    if width == 0 || height == 0 {
        return None;
    }
    let (w, h) = (width as f32, height as f32);
    let scale = (field.size / w).min(field.size / h);
    let (draw_w, draw_h) = (w * scale, h * scale);
    Some(ImageRect {
        x: field.x + (field.size - draw_w) / 2.0,
        y: field.y + (field.size - draw_h) / 2.0,
        width: draw_w,
        height: draw_h,
    })
}

fn font_dictionary(font: StandardFont) -> Dictionary {
    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"Font".to_vec()));
    dict.set("Subtype", Object::Name(b"Type1".to_vec()));
    dict.set("BaseFont", Object::Name(font.pdf_name().as_bytes().to_vec()));
    dict.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
    dict
}

/// RGB image XObject with the alpha channel as a soft mask
fn add_image_xobject(output: &mut Document, image: &RgbaImage) -> lopdf::ObjectId {
    let (width, height) = image.dimensions();
    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    let mut alpha = Vec::with_capacity((width * height) as usize);
    for pixel in image.pixels() {
        let [r, g, b, a] = pixel.0;
        rgb.extend_from_slice(&[r, g, b]);
        alpha.push(a);
    }

    let mut mask_dict = Dictionary::new();
    mask_dict.set("Type", Object::Name(b"XObject".to_vec()));
    mask_dict.set("Subtype", Object::Name(b"Image".to_vec()));
    mask_dict.set("Width", Object::Integer(width as i64));
    mask_dict.set("Height", Object::Integer(height as i64));
    mask_dict.set("ColorSpace", Object::Name(b"DeviceGray".to_vec()));
    mask_dict.set("BitsPerComponent", Object::Integer(8));
    let mask_id = output.add_object(Stream::new(mask_dict, alpha));

    let mut image_dict = Dictionary::new();
    image_dict.set("Type", Object::Name(b"XObject".to_vec()));
    image_dict.set("Subtype", Object::Name(b"Image".to_vec()));
    image_dict.set("Width", Object::Integer(width as i64));
    image_dict.set("Height", Object::Integer(height as i64));
    image_dict.set("ColorSpace", Object::Name(b"DeviceRGB".to_vec()));
    image_dict.set("BitsPerComponent", Object::Integer(8));
    image_dict.set("SMask", Object::Reference(mask_id));
    output.add_object(Stream::new(image_dict, rgb))
}

/// Literal-string body for already-encoded bytes.
fn escape_pdf_string(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        match b {
            b'(' | b')' | b'\\' => {
                out.push('\\');
                out.push(b as char);
            }
            0x20..=0x7E => out.push(b as char),
            _ => out.push_str(&format!("\\{:03o}", b)),
        }
    }
    out
}
