use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompareError {
    #[error("Failed to parse PDF: {0}")]
    Parse(String),

    #[error("Text extraction failed: {0}")]
    TextExtraction(String),

    #[error("External tool unavailable: {0}")]
    ToolMissing(String),

    #[error("Rasterization failed: {0}")]
    Raster(String),

    #[error("Page counts differ: {left} vs {right} pages")]
    PageCountMismatch { left: usize, right: usize },

    #[error("Page bitmaps differ in size: {left_w}x{left_h} vs {right_w}x{right_h}")]
    SizeMismatch {
        left_w: u32,
        left_h: u32,
        right_w: u32,
        right_h: u32,
    },

    #[error("No content produced: {0}")]
    NoContent(String),

    #[error("Report generation failed: {0}")]
    Report(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<shared_pdf::PdfError> for CompareError {
    fn from(err: shared_pdf::PdfError) -> Self {
        match err {
            shared_pdf::PdfError::Parse(msg) => CompareError::Parse(msg),
            shared_pdf::PdfError::Malformed(msg) | shared_pdf::PdfError::Write(msg) => {
                CompareError::Report(msg)
            }
        }
    }
}
