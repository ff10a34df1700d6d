use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum GeomError {
    #[error("Invalid rectangle: {0}")]
    InvalidRect(String),

    #[error("Unknown anchor key: '{0}'")]
    UnknownAnchor(String),

    #[error("Invalid mosaic pitch: {0}")]
    InvalidPitch(String),
}
