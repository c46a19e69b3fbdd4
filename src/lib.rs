//! Assignment Cover Library
//!
//! Builds cover pages for academic assignments and exports them as A4 PDFs.
//! This library provides functionality to:
//! - Hold the cover fields of an editing session
//! - Render them through one of four fixed templates
//! - Preview the result scaled to a container, as SVG
//! - Refine the topic into a more academic title through a text-generation service
//! - Export the unscaled page as a single-page PDF
//!
//! # Example
//!
//! ```no_run
//! use assignment_cover::fields::CoverFields;
//! use assignment_cover::template::{render, TemplateKind};
//! use assignment_cover::preview::render_svg;
//!
//! let fields = CoverFields::sample();
//! let document = render(&fields, TemplateKind::Formal);
//! let svg = render_svg(&document, 0.75);
//! std::fs::write("cover.svg", svg).expect("Failed to write preview");
//! ```

pub mod config;
pub mod date;
pub mod document;
pub mod error;
pub mod export;
pub mod fields;
pub mod layout;
pub mod logo;
pub mod pdf;
pub mod preview;
pub mod refine;
pub mod shell;
pub mod template;

// Re-export commonly used items
pub use error::{Error, Result};
pub use shell::{Session, Shell};
