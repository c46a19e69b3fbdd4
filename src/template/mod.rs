//! Cover page templates
//!
//! Each template is a pure function from [`CoverFields`] to a
//! [`RenderedDocument`] at canonical size. All four draw every field; they
//! differ only in arrangement and typography.

mod academic;
mod formal;
mod minimalist;
mod modern;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::document::{
    Color, FontFace, ImageNode, Node, Rect, RenderedDocument, Stroke, TextBlock, TextStyle,
};
use crate::error::Error;
use crate::fields::CoverFields;
use crate::layout::{wrap_text, CANONICAL_WIDTH};

/// Line printed under the default emblem
pub const DEFAULT_MOTTO: &str = "Excellence \u{2022} Innovation \u{2022} Integrity";

/// The fixed set of visual layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    Formal,
    Modern,
    #[default]
    Academic,
    Minimalist,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 4] = [
        TemplateKind::Formal,
        TemplateKind::Modern,
        TemplateKind::Academic,
        TemplateKind::Minimalist,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TemplateKind::Formal => "formal",
            TemplateKind::Modern => "modern",
            TemplateKind::Academic => "academic",
            TemplateKind::Minimalist => "minimalist",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            TemplateKind::Formal => "Serif title page inside a double navy border",
            TemplateKind::Modern => "Bold sans-serif layout with a dark emblem sidebar",
            TemplateKind::Academic => "Centered serif layout with a watermark emblem",
            TemplateKind::Minimalist => "Oversized title with a quiet details grid",
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TemplateKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        TemplateKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::General(format!("Unknown template: {}", s)))
    }
}

/// Render the cover page for a field snapshot
pub fn render(fields: &CoverFields, kind: TemplateKind) -> RenderedDocument {
    match kind {
        TemplateKind::Formal => formal::render(fields),
        TemplateKind::Modern => modern::render(fields),
        TemplateKind::Academic => academic::render(fields),
        TemplateKind::Minimalist => minimalist::render(fields),
    }
}

/// Accumulates nodes for one document
pub(crate) struct Canvas {
    doc: RenderedDocument,
}

impl Canvas {
    pub(crate) fn new(kind: TemplateKind, background: Color) -> Self {
        Self {
            doc: RenderedDocument::new(kind, background),
        }
    }

    pub(crate) fn fill(&mut self, frame: Rect, color: Color) {
        self.doc.nodes.push(Node::Rect {
            frame,
            fill: Some(color),
            stroke: None,
        });
    }

    pub(crate) fn boxed(&mut self, frame: Rect, fill: Option<Color>, stroke: Color, width: f64) {
        self.doc.nodes.push(Node::Rect {
            frame,
            fill,
            stroke: Some(Stroke { color: stroke, width }),
        });
    }

    pub(crate) fn line(&mut self, from: (f64, f64), to: (f64, f64), color: Color, width: f64) {
        self.doc.nodes.push(Node::Line {
            from,
            to,
            stroke: Stroke { color, width },
        });
    }

    /// Single-line text; returns the y just below the line box
    pub(crate) fn label(&mut self, text: &str, x: f64, top: f64, style: TextStyle) -> f64 {
        self.push_text(text, vec![text.to_string()], x, top, style)
    }

    /// Text wrapped to `max_width`; returns the y just below the block
    pub(crate) fn paragraph(
        &mut self,
        text: &str,
        x: f64,
        top: f64,
        max_width: f64,
        style: TextStyle,
    ) -> f64 {
        let lines = wrap_text(text, style.face, style.size, style.tracking, max_width);
        self.push_text(text, lines, x, top, style)
    }

    fn push_text(
        &mut self,
        text: &str,
        lines: Vec<String>,
        x: f64,
        top: f64,
        style: TextStyle,
    ) -> f64 {
        let rows = lines.len().max(1) as f64;
        // The first baseline sits at the font's ascent inside the line box
        let baseline = top + (style.line_height - style.size) / 2.0 + style.size * 0.8;
        self.doc.nodes.push(Node::Text(TextBlock {
            text: text.to_string(),
            lines,
            x,
            baseline,
            style,
        }));
        top + rows * style.line_height
    }

    pub(crate) fn image(&mut self, frame: Rect, fields: &CoverFields, opacity: f64) -> bool {
        match fields.logo_source() {
            Some(source) => {
                self.doc.nodes.push(Node::Image(ImageNode { frame, source, opacity }));
                true
            }
            None => false,
        }
    }

    /// Institution emblem, with the motto under the default image
    ///
    /// Draws nothing when the logo is hidden. Returns the y below the emblem.
    pub(crate) fn emblem(
        &mut self,
        fields: &CoverFields,
        center_x: f64,
        top: f64,
        size: f64,
        motto: bool,
    ) -> f64 {
        let frame = Rect::new(center_x - size / 2.0, top, size, size);
        if !self.image(frame, fields, 1.0) {
            return top;
        }
        let mut bottom = frame.bottom();
        if motto && fields.custom_logo.is_none() {
            let style = TextStyle::new(FontFace::SerifBold, 10.0, Color::NAVY)
                .centered()
                .tracking_em(0.1);
            bottom = self.label(DEFAULT_MOTTO, center_x, bottom + 12.0, style);
        }
        bottom
    }

    pub(crate) fn finish(self) -> RenderedDocument {
        self.doc
    }
}

/// Horizontal center of the canonical page
pub(crate) const CENTER_X: f64 = CANONICAL_WIDTH / 2.0;
