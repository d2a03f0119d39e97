//! Text placement
//!
//! Computes the left-baseline anchor for a string so that, once drawn with
//! the given font, it satisfies one of three placement policies.

use crate::fonts::StandardFont;

/// Where a text field goes on the page, resolved once when the layout loads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    /// Draw at the configured point verbatim
    Fixed { x: f32, y: f32 },
    /// Center on the page width, then shift by a calibration offset
    PageCentered { y: f32, fine_tune_offset_x: f32 },
    /// Center between two x bounds, never starting left of `x_min`
    RangeCentered { x_min: f32, x_max: f32, y: f32 },
}

impl Placement {
    pub fn y(&self) -> f32 {
        match *self {
            Placement::Fixed { y, .. }
            | Placement::PageCentered { y, .. }
            | Placement::RangeCentered { y, .. } => y,
        }
    }
}

/// Anchor `(x, y)` for drawing `text` with `font` at `size`.
///
/// `text` must already be in its displayed form (case transforms applied).
pub fn place_text(
    text: &str,
    font: StandardFont,
    size: f32,
    placement: &Placement,
    page_width: f32,
) -> (f32, f32) {
    let width = font.string_width(text, size);

    match *placement {
        Placement::Fixed { x, y } => (x, y),
        Placement::PageCentered {
            y,
            fine_tune_offset_x,
        } => (page_centered_x(width, page_width, fine_tune_offset_x), y),
        Placement::RangeCentered { x_min, x_max, y } => {
            (range_centered_x(width, x_min, x_max), y)
        }
    }
}

/// `page_width/2 - width/2 + offset`
pub fn page_centered_x(text_width: f32, page_width: f32, fine_tune_offset_x: f32) -> f32 {
    page_width / 2.0 - text_width / 2.0 + fine_tune_offset_x
}

/// Center within `[x_min, x_max]`.
///
/// The right-edge clamp runs first and the left-edge clamp last, so text
/// wider than the range starts at `x_min` and overflows to the right.
pub fn range_centered_x(text_width: f32, x_min: f32, x_max: f32) -> f32 {
    let center = (x_min + x_max) / 2.0;
    let mut x = center - text_width / 2.0;

    let right_bound = x_max - text_width;
    if x > right_bound {
        x = right_bound;
    }
    if x < x_min {
        x = x_min;
    }
    x
}
