//! Live preview: scale-to-fit sizing and SVG output
//!
//! The preview never re-lays out a document. It measures the hosting
//! container, derives one uniform scale factor, and draws the canonical-size
//! document inside a `scale()` transform. The exported PDF always works from
//! the unscaled document.

use parking_lot::Mutex;
use quick_xml::escape::escape;

use crate::document::{FontFace, Node, RenderedDocument, TextAlign};
use crate::layout::{CANONICAL_HEIGHT, CANONICAL_WIDTH};

/// Largest scale the preview may grow to on wide containers
pub const MAX_PREVIEW_SCALE: f64 = 1.2;

/// Scale factor that fits the canonical width into `container_width`
///
/// Clamped above at [`MAX_PREVIEW_SCALE`]; there is no lower clamp.
pub fn fit_scale(container_width: f64) -> f64 {
    (container_width / CANONICAL_WIDTH).min(MAX_PREVIEW_SCALE)
}

/// Vertical space the scaled preview occupies in the surrounding flow
pub fn reserved_height(scale: f64) -> f64 {
    CANONICAL_HEIGHT * scale
}

/// Current preview scale, recomputed from container measurements
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleToFit {
    scale: f64,
}

impl Default for ScaleToFit {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}

impl ScaleToFit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-measure after mount or a resize; returns the new scale
    ///
    /// Widths that are not positive finite numbers carry no layout
    /// information and leave the current scale in place.
    pub fn measure(&mut self, container_width: f64) -> f64 {
        if container_width.is_finite() && container_width > 0.0 {
            self.scale = fit_scale(container_width);
        }
        self.scale
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn reserved_height(&self) -> f64 {
        reserved_height(self.scale)
    }
}

/// Scroll position of a surface
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollOffset {
    pub x: f64,
    pub y: f64,
}

/// The scrollable surface hosting the preview
#[derive(Debug, Default)]
pub struct Surface {
    scroll: Mutex<ScrollOffset>,
}

impl Surface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scroll_offset(&self) -> ScrollOffset {
        *self.scroll.lock()
    }

    pub fn scroll_to(&self, x: f64, y: f64) {
        *self.scroll.lock() = ScrollOffset { x, y };
    }

    pub fn scroll_to_origin(&self) {
        self.scroll_to(0.0, 0.0);
    }
}

fn font_attributes(face: FontFace) -> String {
    let family = if face.is_serif() {
        "'Times New Roman', Times, serif"
    } else {
        "Helvetica, Arial, sans-serif"
    };
    let mut attrs = format!("font-family=\"{}\"", family);
    if face.is_bold() {
        attrs.push_str(" font-weight=\"bold\"");
    }
    if face.is_italic() {
        attrs.push_str(" font-style=\"italic\"");
    }
    attrs
}

/// Render the document as an SVG preview at `scale`
///
/// The outer SVG is `800 * scale` wide and exactly the reserved height tall.
pub fn render_svg(doc: &RenderedDocument, scale: f64) -> String {
    let width = doc.width * scale;
    let height = reserved_height(scale);

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{:.2}\" height=\"{:.2}\" \
         viewBox=\"0 0 {:.2} {:.2}\" data-template=\"{}\">\n",
        width, height, width, height, doc.template
    ));
    svg.push_str(&format!("<g id=\"assignment-preview\" transform=\"scale({})\">\n", scale));
    svg.push_str(&format!(
        "<rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" fill=\"{}\"/>\n",
        doc.width,
        doc.height,
        doc.background.to_hex()
    ));

    for node in &doc.nodes {
        match node {
            Node::Rect { frame, fill, stroke } => {
                let fill = fill.map(|c| c.to_hex()).unwrap_or_else(|| "none".to_string());
                let stroke = stroke
                    .map(|s| {
                        format!(" stroke=\"{}\" stroke-width=\"{}\"", s.color.to_hex(), s.width)
                    })
                    .unwrap_or_default();
                svg.push_str(&format!(
                    "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\"{}/>\n",
                    frame.x, frame.y, frame.width, frame.height, fill, stroke
                ));
            }
            Node::Line { from, to, stroke } => {
                svg.push_str(&format!(
                    "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" \
                     stroke=\"{}\" stroke-width=\"{}\"/>\n",
                    from.0,
                    from.1,
                    to.0,
                    to.1,
                    stroke.color.to_hex(),
                    stroke.width
                ));
            }
            Node::Text(block) => {
                let anchor = match block.style.align {
                    TextAlign::Left => "start",
                    TextAlign::Center => "middle",
                    TextAlign::Right => "end",
                };
                for (i, line) in block.lines.iter().enumerate() {
                    let y = block.baseline + i as f64 * block.style.line_height;
                    svg.push_str(&format!(
                        "<text x=\"{}\" y=\"{}\" {} font-size=\"{}\" letter-spacing=\"{}\" \
                         fill=\"{}\" text-anchor=\"{}\">{}</text>\n",
                        block.x,
                        y,
                        font_attributes(block.style.face),
                        block.style.size,
                        block.style.tracking,
                        block.style.color.to_hex(),
                        anchor,
                        escape(line.as_str())
                    ));
                }
            }
            Node::Image(image) => {
                svg.push_str(&format!(
                    "<image x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" opacity=\"{}\" \
                     preserveAspectRatio=\"xMidYMin meet\" href=\"{}\"/>\n",
                    image.frame.x,
                    image.frame.y,
                    image.frame.width,
                    image.frame.height,
                    image.opacity,
                    escape(image.source.reference())
                ));
            }
        }
    }

    svg.push_str("</g>\n</svg>\n");
    svg
}
