//! Shared constants for diploma rendering
//!
//! Calibration values and defaults used by the layout model and the
//! compositor.

// =============================================================================
// Default Page Dimensions
// =============================================================================

/// Default page width in points (US Letter: 8.5" × 11")
pub const DEFAULT_PAGE_WIDTH_PT: f32 = 612.0;

/// Default page height in points (US Letter)
pub const DEFAULT_PAGE_HEIGHT_PT: f32 = 792.0;

/// Default page dimensions as tuple (width, height)
pub const DEFAULT_PAGE_DIMENSIONS: (f32, f32) = (DEFAULT_PAGE_WIDTH_PT, DEFAULT_PAGE_HEIGHT_PT);

// =============================================================================
// Field Calibration
// =============================================================================

/// Horizontal nudge applied to the page-centered student name.
///
/// Compensates for template artwork that is not symmetric around the page
/// center.
pub const STUDENT_FINE_TUNE_OFFSET_X: f32 = 60.0;

/// Horizontal nudge applied to the page-centered course name
pub const COURSE_FINE_TUNE_OFFSET_X: f32 = 70.0;

/// Default fill color for text fields
pub const DEFAULT_TEXT_COLOR: &str = "#000000";

// =============================================================================
// Signature Image
// =============================================================================

/// Side of the square box the signature is fitted into (points)
pub const DEFAULT_SIGNATURE_SIZE: f32 = 125.0;

/// Channel floor at which a pixel counts as paper background
pub const DEFAULT_BG_THRESHOLD: u8 = 245;

/// Channel ceiling below which a pixel counts as ink when recoloring
pub const DEFAULT_RECOLOR_THRESHOLD: u8 = 200;

// =============================================================================
// Resource Names
// =============================================================================

/// Resource name of the imported template page
pub const TEMPLATE_XOBJECT_NAME: &str = "Tpl";

/// Resource name of the signature image
pub const SIGNATURE_XOBJECT_NAME: &str = "Sig";
