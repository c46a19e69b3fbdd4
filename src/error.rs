//! Error types for the assignment cover library

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the assignment cover library
#[derive(Error, Debug)]
pub enum Error {
    /// PDF writing or reading error
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decode/encode error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Malformed data URI
    #[error("Invalid data URI: {0}")]
    InvalidDataUri(String),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Text generation service answered with a non-success status
    #[error("Generation service error (status {status}): {message}")]
    Generation { status: u16, message: String },

    /// Text generation service returned no usable text
    #[error("Generation service returned no usable text")]
    EmptySuggestion,

    /// Date parsing error
    #[error("Invalid date expression: {0}")]
    InvalidDateExpression(String),

    /// Cover sheet file could not be parsed
    #[error("Invalid cover sheet: {0}")]
    SheetParse(#[from] toml::de::Error),

    /// Cover sheet could not be serialized
    #[error("Could not write cover sheet: {0}")]
    SheetWrite(#[from] toml::ser::Error),

    /// File not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// General error
    #[error("{0}")]
    General(String),
}
