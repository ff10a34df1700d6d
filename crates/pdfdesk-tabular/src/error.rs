use thiserror::Error;

#[derive(Error, Debug)]
pub enum TabularError {
    #[error("Table has no content")]
    EmptyTable,

    #[error("PDF generation failed: {0}")]
    Pdf(String),
}

impl From<shared_pdf::PdfError> for TabularError {
    fn from(err: shared_pdf::PdfError) -> Self {
        TabularError::Pdf(err.to_string())
    }
}
