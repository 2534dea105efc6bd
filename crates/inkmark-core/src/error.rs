use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Failed to parse PDF: {0}")]
    Parse(String),

    #[error("PDF structure error: {0}")]
    Structure(String),

    #[error("Failed to serialize PDF: {0}")]
    Save(String),

    #[error("Failed to encode annotation data: {0}")]
    Encode(String),

    #[error("Page index {0} is out of range")]
    PageOutOfRange(usize),
}
