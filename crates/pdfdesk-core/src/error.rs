use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfDeskError {
    #[error("Failed to parse PDF: {0}")]
    Parse(String),

    #[error("Invalid page selection: {0}")]
    InvalidSelection(String),

    #[error("Invalid rectangle: {0}")]
    InvalidRect(String),

    #[error("Invalid rotation: {0} degrees (quarter turns only)")]
    InvalidRotation(i64),

    #[error("PDF operation failed: {0}")]
    Operation(String),

    #[error("External tool unavailable: {0}")]
    ToolMissing(String),

    #[error("Wrong password")]
    WrongPassword,

    #[error("No content produced: {0}")]
    NoContent(String),
}

impl From<shared_pdf::PdfError> for PdfDeskError {
    fn from(err: shared_pdf::PdfError) -> Self {
        match err {
            shared_pdf::PdfError::Parse(msg) => PdfDeskError::Parse(msg),
            shared_pdf::PdfError::Malformed(msg) | shared_pdf::PdfError::Write(msg) => {
                PdfDeskError::Operation(msg)
            }
        }
    }
}

impl From<shared_geom::GeomError> for PdfDeskError {
    fn from(err: shared_geom::GeomError) -> Self {
        match err {
            shared_geom::GeomError::InvalidRect(msg) => PdfDeskError::InvalidRect(msg),
            shared_geom::GeomError::UnknownAnchor(key) => {
                PdfDeskError::InvalidSelection(format!("unknown anchor key '{}'", key))
            }
            shared_geom::GeomError::InvalidPitch(msg) => PdfDeskError::InvalidRect(msg),
        }
    }
}
