//! Page geometry and text measurement
//!
//! Every template draws into a fixed canonical box of
//! [`CANONICAL_WIDTH`] × [`CANONICAL_HEIGHT`] units (y grows downward).
//! Display scaling and PDF placement only ever map that box; they never
//! re-layout it.

use crate::document::FontFace;

/// Canonical document width in layout units
pub const CANONICAL_WIDTH: f64 = 800.0;

/// Canonical document height (A4 proportion at the canonical width)
pub const CANONICAL_HEIGHT: f64 = 1131.0;

/// Simple length type in millimeters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Length(pub f64);

impl Length {
    /// Create a length from millimeters
    pub fn from_mm(mm: f64) -> Self {
        Length(mm)
    }

    /// Get the value in millimeters
    pub fn mm(&self) -> f64 {
        self.0
    }

    /// Get the value in points (1/72 inch)
    pub fn pt(&self) -> f64 {
        self.0 * 72.0 / 25.4
    }
}

/// Page orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Page dimensions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageDimensions {
    pub width: Length,
    pub height: Length,
}

impl PageDimensions {
    /// A4 size (210mm × 297mm)
    pub fn a4() -> Self {
        Self {
            width: Length::from_mm(210.0),
            height: Length::from_mm(297.0),
        }
    }

    /// The same sheet turned to the requested orientation
    pub fn oriented(self, orientation: Orientation) -> Self {
        let (short, long) = if self.width.mm() <= self.height.mm() {
            (self.width, self.height)
        } else {
            (self.height, self.width)
        };
        match orientation {
            Orientation::Portrait => Self { width: short, height: long },
            Orientation::Landscape => Self { width: long, height: short },
        }
    }
}

/// Margins for page content
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub top: Length,
    pub bottom: Length,
    pub left: Length,
    pub right: Length,
}

impl Margins {
    /// Create margins with same value on all sides
    pub fn uniform(margin: Length) -> Self {
        Self {
            top: margin,
            bottom: margin,
            left: margin,
            right: margin,
        }
    }

    /// Edge-to-edge output
    pub fn none() -> Self {
        Self::uniform(Length::from_mm(0.0))
    }
}

/// Maps canonical document units onto a PDF page (points, origin bottom-left)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageMapping {
    /// Points per canonical unit
    pub scale: f64,
    /// Left edge of the document on the page, in points
    pub origin_x: f64,
    /// Top edge of the document on the page, in points
    pub top: f64,
}

impl PageMapping {
    pub fn x(&self, x: f64) -> f64 {
        self.origin_x + x * self.scale
    }

    pub fn y(&self, y: f64) -> f64 {
        self.top - y * self.scale
    }

    pub fn len(&self, len: f64) -> f64 {
        len * self.scale
    }
}

/// Fit the canonical box inside the page's content area
///
/// The document is scaled uniformly, centered horizontally and pinned to the
/// top margin, the way a captured region is placed on a PDF page.
pub fn fit_to_page(page: &PageDimensions, margins: &Margins) -> PageMapping {
    let available_width = (page.width.pt() - margins.left.pt() - margins.right.pt()).max(0.0);
    let available_height = (page.height.pt() - margins.top.pt() - margins.bottom.pt()).max(0.0);

    let scale = (available_width / CANONICAL_WIDTH).min(available_height / CANONICAL_HEIGHT);
    let used_width = CANONICAL_WIDTH * scale;

    PageMapping {
        scale,
        origin_x: margins.left.pt() + (available_width - used_width) / 2.0,
        top: page.height.pt() - margins.top.pt(),
    }
}

/// Average glyph advance as a fraction of the font size
///
/// The standard PDF fonts are not embedded, so widths are estimated rather
/// than shaped.
fn average_advance(face: FontFace) -> f64 {
    match face {
        FontFace::Sans => 0.52,
        FontFace::SansBold => 0.57,
        FontFace::Serif => 0.46,
        FontFace::SerifBold => 0.50,
        FontFace::SerifItalic => 0.44,
    }
}

/// Estimate the rendered width of a single line of text
pub fn estimate_text_width(text: &str, face: FontFace, size: f64, tracking: f64) -> f64 {
    let chars = text.chars().count();
    if chars == 0 {
        return 0.0;
    }
    chars as f64 * size * average_advance(face) + tracking * (chars - 1) as f64
}

/// Greedy word wrap against an estimated width
///
/// Newlines in the input are hard breaks. A single word wider than
/// `max_width` is kept whole on its own line. Blank input yields no lines.
pub fn wrap_text(
    text: &str,
    face: FontFace,
    size: f64,
    tracking: f64,
    max_width: f64,
) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            if current.is_empty() {
                current.push_str(word);
                continue;
            }
            let candidate = format!("{} {}", current, word);
            if estimate_text_width(&candidate, face, size, tracking) > max_width {
                lines.push(std::mem::replace(&mut current, word.to_string()));
            } else {
                current = candidate;
            }
        }
        lines.push(current);
    }
    lines
}
