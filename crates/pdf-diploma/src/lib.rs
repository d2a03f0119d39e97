pub mod compose;
pub mod config;
pub mod constants;
pub mod fonts;
pub mod layout;
pub mod locale;
pub mod transparency;
mod types;

pub use compose::{
    ComposedDiploma, Overlay, SignatureOutcome, SkipReason, Template, build_overlay, compose,
    compose_bytes, merge_onto_template,
};
pub use config::{Color, FontSpec, LayoutConfig, LayoutField, SignatureField, TextField};
pub use fonts::StandardFont;
pub use layout::Placement;
pub use locale::{clean_name, fecha_a_espanol, title_case, upper_case};
pub use transparency::{make_background_transparent, recolor_ink};
pub use types::*;
