use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("Failed to parse PDF: {0}")]
    Parse(String),

    #[error("Malformed document: {0}")]
    Malformed(String),

    #[error("Failed to write PDF: {0}")]
    Write(String),
}
