//! PDF output module

mod content;
pub mod fonts;
mod images;
pub mod inspect;
pub mod writer;

// Re-export commonly used items
pub use fonts::FontBook;
pub use inspect::{inspect_file, inspect_pdf, PdfSummary};
pub use writer::{write_pdf, DocumentInfo};
