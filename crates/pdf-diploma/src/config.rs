//! Layout configuration
//!
//! The layout maps each diploma field to its font, color and position. It is
//! loaded from JSON once per batch and validated completely on load, so a
//! bad configuration stops the batch before the first row is rendered.

use crate::constants::{
    COURSE_FINE_TUNE_OFFSET_X, DEFAULT_BG_THRESHOLD, DEFAULT_SIGNATURE_SIZE, DEFAULT_TEXT_COLOR,
    STUDENT_FINE_TUNE_OFFSET_X,
};
use crate::fonts::StandardFont;
use crate::layout::Placement;
use crate::types::{DiplomaError, Result};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

// =============================================================================
// Color
// =============================================================================

/// RGB fill color with components in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };

    /// Parse `#RGB` or `#RRGGBB` (case-insensitive hex digits).
    pub fn from_hex(hex: &str) -> Result<Self> {
        let invalid = || DiplomaError::Config(format!("Invalid color '{}'", hex));

        let digits = hex.strip_prefix('#').ok_or_else(invalid)?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let expanded: String = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            6 => digits.to_string(),
            _ => return Err(invalid()),
        };

        let channel = |i: usize| {
            u8::from_str_radix(&expanded[i..i + 2], 16)
                .map(|v| v as f32 / 255.0)
                .map_err(|_| invalid())
        };
        Ok(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }

    pub fn to_rgb8(self) -> [u8; 3] {
        let byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [byte(self.r), byte(self.g), byte(self.b)]
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl FromStr for Color {
    type Err = DiplomaError;

    fn from_str(s: &str) -> Result<Self> {
        Color::from_hex(s)
    }
}

// =============================================================================
// Typed Layout
// =============================================================================

/// The diploma fields a layout must configure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutField {
    Estudiante,
    Curso,
    ProfesorSignature,
    Profesor,
    Fecha,
}

impl LayoutField {
    pub const REQUIRED: [LayoutField; 5] = [
        LayoutField::Estudiante,
        LayoutField::Curso,
        LayoutField::ProfesorSignature,
        LayoutField::Profesor,
        LayoutField::Fecha,
    ];

    /// Key used in the layout JSON
    pub fn key(self) -> &'static str {
        match self {
            LayoutField::Estudiante => "estudiante",
            LayoutField::Curso => "curso",
            LayoutField::ProfesorSignature => "profesor-signature",
            LayoutField::Profesor => "profesor",
            LayoutField::Fecha => "fecha",
        }
    }

    /// Calibration offset used when the field is page-centered and the
    /// layout does not give one.
    fn default_fine_tune_offset(self) -> f32 {
        match self {
            LayoutField::Estudiante => STUDENT_FINE_TUNE_OFFSET_X,
            LayoutField::Curso => COURSE_FINE_TUNE_OFFSET_X,
            _ => 0.0,
        }
    }

    /// Fields that are always centered on the page unless given a range
    fn is_page_centered(self) -> bool {
        matches!(self, LayoutField::Estudiante | LayoutField::Curso)
    }
}

impl fmt::Display for LayoutField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSpec {
    pub font: StandardFont,
    pub size: f32,
    pub color: Color,
}

/// A text field: how it looks and where it goes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextField {
    pub font: FontSpec,
    pub placement: Placement,
}

/// Box the signature image is fitted into
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignatureField {
    /// Bottom-left corner of the square box
    pub x: f32,
    pub y: f32,
    /// Side length of the square box
    pub size: f32,
    pub bg_threshold: u8,
}

/// Validated layout for every diploma field
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    pub estudiante: TextField,
    pub curso: TextField,
    pub profesor_signature: SignatureField,
    pub profesor: TextField,
    pub fecha: TextField,
}

impl LayoutConfig {
    /// Load and validate a layout JSON file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        Self::from_json(&bytes)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let raw: RawLayout = serde_json::from_slice(bytes)
            .map_err(|e| DiplomaError::Config(format!("Failed to parse layout: {}", e)))?;
        raw.resolve()
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let raw: RawLayout = serde_json::from_value(value)
            .map_err(|e| DiplomaError::Config(format!("Failed to parse layout: {}", e)))?;
        raw.resolve()
    }
}

// =============================================================================
// Raw JSON Shape
// =============================================================================

/// Numbers may arrive as JSON numbers or numeric strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Number {
    Float(f64),
    Text(String),
}

impl Number {
    fn value(&self, field: LayoutField, key: &str) -> Result<f32> {
        let parsed = match self {
            Number::Float(v) => Some(*v),
            Number::Text(s) => s.trim().parse::<f64>().ok(),
        };
        match parsed {
            Some(v) if v.is_finite() => Ok(v as f32),
            _ => Err(DiplomaError::Config(format!(
                "Field '{}': '{}' is not a number",
                field, key
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawFont {
    name: String,
    size: Number,
    color: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawDirective {
    font: Option<RawFont>,
    x: Option<Number>,
    y: Option<Number>,
    x_range: Option<(Number, Number)>,
    fine_tune_offset_x: Option<Number>,
    size: Option<Number>,
    bg_threshold: Option<Number>,
}

/// `nombre` and `firma` are older names; the canonical key wins when both
/// are present.
#[derive(Debug, Deserialize)]
struct RawLayout {
    estudiante: Option<RawDirective>,
    nombre: Option<RawDirective>,
    curso: Option<RawDirective>,
    #[serde(rename = "profesor-signature")]
    profesor_signature: Option<RawDirective>,
    firma: Option<RawDirective>,
    profesor: Option<RawDirective>,
    fecha: Option<RawDirective>,
}

impl RawLayout {
    fn resolve(self) -> Result<LayoutConfig> {
        Ok(LayoutConfig {
            estudiante: resolve_text(LayoutField::Estudiante, self.estudiante.or(self.nombre))?,
            curso: resolve_text(LayoutField::Curso, self.curso)?,
            profesor_signature: resolve_signature(self.profesor_signature.or(self.firma))?,
            profesor: resolve_text(LayoutField::Profesor, self.profesor)?,
            fecha: resolve_text(LayoutField::Fecha, self.fecha)?,
        })
    }
}

fn missing(field: LayoutField) -> DiplomaError {
    DiplomaError::Config(format!("Missing required layout field '{}'", field))
}

/// Prefix a nested configuration error with the field it belongs to.
fn in_field(field: LayoutField, err: DiplomaError) -> DiplomaError {
    match err {
        DiplomaError::Config(msg) => DiplomaError::Config(format!("Field '{}': {}", field, msg)),
        other => other,
    }
}

fn required(field: LayoutField, key: &str, value: Option<&Number>) -> Result<f32> {
    value
        .ok_or_else(|| DiplomaError::Config(format!("Field '{}' is missing '{}'", field, key)))?
        .value(field, key)
}

fn resolve_text(field: LayoutField, raw: Option<RawDirective>) -> Result<TextField> {
    let raw = raw.ok_or_else(|| missing(field))?;

    let raw_font = raw
        .font
        .as_ref()
        .ok_or_else(|| DiplomaError::Config(format!("Field '{}' is missing 'font'", field)))?;
    let font = raw_font
        .name
        .parse::<StandardFont>()
        .map_err(|e| in_field(field, e))?;
    let size = raw_font.size.value(field, "font.size")?;
    if size <= 0.0 {
        return Err(DiplomaError::Config(format!(
            "Field '{}': font size must be positive",
            field
        )));
    }
    let color = Color::from_hex(raw_font.color.as_deref().unwrap_or(DEFAULT_TEXT_COLOR))
        .map_err(|e| in_field(field, e))?;

    Ok(TextField {
        font: FontSpec { font, size, color },
        placement: resolve_placement(field, &raw)?,
    })
}

fn resolve_placement(field: LayoutField, raw: &RawDirective) -> Result<Placement> {
    let y = required(field, "y", raw.y.as_ref())?;

    if let Some((min, max)) = &raw.x_range {
        let x_min = min.value(field, "x_range")?;
        let x_max = max.value(field, "x_range")?;
        if x_min >= x_max {
            return Err(DiplomaError::Config(format!(
                "Field '{}': x_range must satisfy x_min < x_max (got {} .. {})",
                field, x_min, x_max
            )));
        }
        return Ok(Placement::RangeCentered { x_min, x_max, y });
    }

    if !field.is_page_centered() {
        if let Some(x) = &raw.x {
            return Ok(Placement::Fixed {
                x: x.value(field, "x")?,
                y,
            });
        }
    }

    let fine_tune_offset_x = match &raw.fine_tune_offset_x {
        Some(offset) => offset.value(field, "fine_tune_offset_x")?,
        None => field.default_fine_tune_offset(),
    };
    Ok(Placement::PageCentered {
        y,
        fine_tune_offset_x,
    })
}

fn resolve_signature(raw: Option<RawDirective>) -> Result<SignatureField> {
    let field = LayoutField::ProfesorSignature;
    let raw = raw.ok_or_else(|| missing(field))?;

    let x = required(field, "x", raw.x.as_ref())?;
    let y = required(field, "y", raw.y.as_ref())?;

    let size = match &raw.size {
        Some(size) => size.value(field, "size")?,
        None => DEFAULT_SIGNATURE_SIZE,
    };
    if size <= 0.0 {
        return Err(DiplomaError::Config(format!(
            "Field '{}': size must be positive",
            field
        )));
    }

    let bg_threshold = match &raw.bg_threshold {
        Some(threshold) => {
            let value = threshold.value(field, "bg_threshold")?;
            if !(0.0..=255.0).contains(&value) || value.fract() != 0.0 {
                return Err(DiplomaError::Config(format!(
                    "Field '{}': bg_threshold must be an integer within 0..=255 (got {})",
                    field, value
                )));
            }
            value as u8
        }
        None => DEFAULT_BG_THRESHOLD,
    };

    Ok(SignatureField {
        x,
        y,
        size,
        bg_threshold,
    })
}
