//! The rendered document: a flat, ordered list of drawing nodes at canonical size
//!
//! Templates produce a [`RenderedDocument`]; the SVG preview and the PDF writer
//! both consume it. Nodes are painted in order, later nodes on top.

use crate::layout::{CANONICAL_HEIGHT, CANONICAL_WIDTH};
use crate::logo::DataUri;
use crate::template::TemplateKind;

/// Image used whenever no custom logo has been uploaded
pub const DEFAULT_LOGO_URL: &str =
    "https://upload.wikimedia.org/wikipedia/en/3/3a/Emerson_University_Multan_Logo.png";

/// An sRGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    pub const WHITE: Color = Color(0xff, 0xff, 0xff);
    pub const BLACK: Color = Color(0x00, 0x00, 0x00);
    pub const PAPER: Color = Color(0xfa, 0xfa, 0xfa);
    pub const NAVY: Color = Color(0x1e, 0x3a, 0x8a);
    pub const NAVY_DARK: Color = Color(0x17, 0x25, 0x54);
    pub const NAVY_PALE: Color = Color(0xef, 0xf6, 0xff);
    pub const NAVY_LIGHT: Color = Color(0xdb, 0xea, 0xfe);
    pub const SKY: Color = Color(0x03, 0x69, 0xa1);
    pub const SKY_BRIGHT: Color = Color(0x02, 0x84, 0xc7);
    pub const SLATE_50: Color = Color(0xf8, 0xfa, 0xfc);
    pub const SLATE_100: Color = Color(0xf1, 0xf5, 0xf9);
    pub const SLATE_200: Color = Color(0xe2, 0xe8, 0xf0);
    pub const SLATE_300: Color = Color(0xcb, 0xd5, 0xe1);
    pub const SLATE_400: Color = Color(0x94, 0xa3, 0xb8);
    pub const SLATE_500: Color = Color(0x64, 0x74, 0x8b);
    pub const SLATE_700: Color = Color(0x33, 0x41, 0x55);
    pub const SLATE_800: Color = Color(0x1e, 0x29, 0x3b);
    pub const SLATE_900: Color = Color(0x0f, 0x17, 0x2a);

    /// `#rrggbb`
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }

    /// Components scaled to 0.0..=1.0
    pub fn to_unit(&self) -> (f64, f64, f64) {
        (
            self.0 as f64 / 255.0,
            self.1 as f64 / 255.0,
            self.2 as f64 / 255.0,
        )
    }
}

/// Font faces available to templates
///
/// These map to the standard PDF Type1 fonts so exported files need no
/// embedded font programs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FontFace {
    Sans,
    SansBold,
    Serif,
    SerifBold,
    SerifItalic,
}

impl FontFace {
    pub const ALL: [FontFace; 5] = [
        FontFace::Sans,
        FontFace::SansBold,
        FontFace::Serif,
        FontFace::SerifBold,
        FontFace::SerifItalic,
    ];

    /// PostScript name of the standard font
    pub fn base_font(&self) -> &'static str {
        match self {
            FontFace::Sans => "Helvetica",
            FontFace::SansBold => "Helvetica-Bold",
            FontFace::Serif => "Times-Roman",
            FontFace::SerifBold => "Times-Bold",
            FontFace::SerifItalic => "Times-Italic",
        }
    }

    pub fn is_serif(&self) -> bool {
        matches!(self, FontFace::Serif | FontFace::SerifBold | FontFace::SerifItalic)
    }

    pub fn is_bold(&self) -> bool {
        matches!(self, FontFace::SansBold | FontFace::SerifBold)
    }

    pub fn is_italic(&self) -> bool {
        matches!(self, FontFace::SerifItalic)
    }
}

/// Horizontal anchor of a text block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    /// `x` is the left edge
    Left,
    /// `x` is the center line
    Center,
    /// `x` is the right edge
    Right,
}

/// Typography of a text block
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub face: FontFace,
    pub size: f64,
    pub color: Color,
    pub align: TextAlign,
    /// Extra space between glyphs, in layout units
    pub tracking: f64,
    /// Baseline-to-baseline distance
    pub line_height: f64,
}

impl TextStyle {
    pub fn new(face: FontFace, size: f64, color: Color) -> Self {
        Self {
            face,
            size,
            color,
            align: TextAlign::Left,
            tracking: 0.0,
            line_height: size * 1.2,
        }
    }

    pub fn centered(mut self) -> Self {
        self.align = TextAlign::Center;
        self
    }

    pub fn right(mut self) -> Self {
        self.align = TextAlign::Right;
        self
    }

    /// Tracking as a fraction of the font size (CSS `em` letter spacing)
    pub fn tracking_em(mut self, em: f64) -> Self {
        self.tracking = self.size * em;
        self
    }

    pub fn leading(mut self, factor: f64) -> Self {
        self.line_height = self.size * factor;
        self
    }
}

/// Axis-aligned rectangle in layout units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// Outline paint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f64,
}

/// Where an image node's pixels come from
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    /// The user's uploaded logo
    Custom(DataUri),
    /// The placeholder at [`DEFAULT_LOGO_URL`]
    DefaultLogo,
}

impl ImageSource {
    /// Reference usable as an image `src`/`href`
    pub fn reference(&self) -> &str {
        match self {
            ImageSource::Custom(uri) => uri.as_str(),
            ImageSource::DefaultLogo => DEFAULT_LOGO_URL,
        }
    }
}

/// A block of text, possibly wrapped over several lines
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    /// The source string, verbatim
    pub text: String,
    /// Wrapped lines as drawn
    pub lines: Vec<String>,
    pub x: f64,
    /// Baseline of the first line
    pub baseline: f64,
    pub style: TextStyle,
}

/// An image fitted inside a frame (aspect preserved, centered, top aligned)
#[derive(Debug, Clone, PartialEq)]
pub struct ImageNode {
    pub frame: Rect,
    pub source: ImageSource,
    pub opacity: f64,
}

/// One drawing instruction
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Rect {
        frame: Rect,
        fill: Option<Color>,
        stroke: Option<Stroke>,
    },
    Line {
        from: (f64, f64),
        to: (f64, f64),
        stroke: Stroke,
    },
    Text(TextBlock),
    Image(ImageNode),
}

/// A template rendered at canonical size
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedDocument {
    pub template: TemplateKind,
    pub width: f64,
    pub height: f64,
    pub background: Color,
    pub nodes: Vec<Node>,
}

impl RenderedDocument {
    pub fn new(template: TemplateKind, background: Color) -> Self {
        Self {
            template,
            width: CANONICAL_WIDTH,
            height: CANONICAL_HEIGHT,
            background,
            nodes: Vec::new(),
        }
    }

    pub fn text_blocks(&self) -> impl Iterator<Item = &TextBlock> {
        self.nodes.iter().filter_map(|node| match node {
            Node::Text(block) => Some(block),
            _ => None,
        })
    }

    pub fn images(&self) -> impl Iterator<Item = &ImageNode> {
        self.nodes.iter().filter_map(|node| match node {
            Node::Image(image) => Some(image),
            _ => None,
        })
    }

    /// Whether the drawn lines of some text block spell out `value`
    ///
    /// Wrapped lines are rejoined with single spaces, so `value` is compared
    /// with its whitespace runs collapsed the same way.
    pub fn contains_text(&self, value: &str) -> bool {
        let wanted = value.split_whitespace().collect::<Vec<_>>().join(" ");
        self.text_blocks()
            .any(|block| block.lines.join(" ").contains(&wanted))
    }
}
