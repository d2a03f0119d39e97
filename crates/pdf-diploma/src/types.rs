use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiplomaError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid layout configuration: {0}")]
    Config(String),
    #[error("Unusable template: {0}")]
    Template(String),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, DiplomaError>;

/// One roster line: the four values printed on a diploma.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiplomaRow {
    pub nombre: String,
    pub curso: String,
    pub fecha: String,
    pub profesor: String,
}

impl DiplomaRow {
    pub fn new(
        nombre: impl Into<String>,
        curso: impl Into<String>,
        fecha: impl Into<String>,
        profesor: impl Into<String>,
    ) -> Self {
        Self {
            nombre: nombre.into(),
            curso: curso.into(),
            fecha: fecha.into(),
            profesor: profesor.into(),
        }
    }

    /// A row with every value empty (after trimming) carries no data.
    pub fn is_blank(&self) -> bool {
        [&self.nombre, &self.curso, &self.fecha, &self.profesor]
            .iter()
            .all(|v| v.trim().is_empty())
    }
}
