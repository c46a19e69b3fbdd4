//! Content stream operators for the cover page
//!
//! Coordinates arrive in canonical layout units (origin top-left) and leave
//! as PDF points (origin bottom-left) through a [`PageMapping`].

use super::fonts::FontSet;
use crate::document::{Color, FontFace, Rect, Stroke, TextAlign, TextBlock};
use crate::layout::PageMapping;

/// Resource name of a font face
pub(crate) fn font_resource(face: FontFace) -> String {
    let index = FontFace::ALL.iter().position(|f| *f == face).unwrap_or(0);
    format!("F{}", index + 1)
}

/// Map a character to its WinAnsiEncoding byte
///
/// Characters outside the encoding become `?`.
fn win_ansi_byte(c: char) -> u8 {
    match c {
        '\u{20}'..='\u{7e}' => c as u8,
        '\u{a0}'..='\u{ff}' => c as u8,
        '\u{20ac}' => 0x80,
        '\u{201a}' => 0x82,
        '\u{201e}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201c}' => 0x93,
        '\u{201d}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{2122}' => 0x99,
        '\t' => b' ',
        _ => b'?',
    }
}

/// Whether every character of `text` has a WinAnsiEncoding byte
pub(crate) fn is_win_ansi(text: &str) -> bool {
    text.chars().all(|c| c == '?' || win_ansi_byte(c) != b'?')
}

/// Encode text as the body of a PDF literal string
///
/// Delimiters and backslashes are escaped, bytes above 0x7e are written as
/// octal escapes so the content stream stays ASCII.
pub(crate) fn escape_pdf_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match win_ansi_byte(c) {
            b'\\' => out.push_str("\\\\"),
            b'(' => out.push_str("\\("),
            b')' => out.push_str("\\)"),
            byte if byte > 0x7e => out.push_str(&format!("\\{:03o}", byte)),
            byte => out.push(byte as char),
        }
    }
    out
}

fn color_operands(color: Color) -> String {
    let (r, g, b) = color.to_unit();
    format!("{:.3} {:.3} {:.3}", r, g, b)
}

/// Accumulates the operators of one page
pub(crate) struct ContentBuilder {
    mapping: PageMapping,
    ops: String,
}

impl ContentBuilder {
    pub(crate) fn new(mapping: PageMapping) -> Self {
        Self {
            mapping,
            ops: String::new(),
        }
    }

    /// Fill a rectangle given directly in page points
    pub(crate) fn fill_page(&mut self, width: f64, height: f64, color: Color) {
        self.ops.push_str(&format!(
            "{} rg\n0 0 {:.2} {:.2} re\nf\n",
            color_operands(color),
            width,
            height
        ));
    }

    pub(crate) fn rect(&mut self, frame: &Rect, fill: Option<Color>, stroke: Option<Stroke>) {
        let m = self.mapping;
        let path = format!(
            "{:.2} {:.2} {:.2} {:.2} re\n",
            m.x(frame.x),
            m.y(frame.bottom()),
            m.len(frame.width),
            m.len(frame.height)
        );
        if let Some(color) = fill {
            self.ops.push_str(&format!("{} rg\n{}f\n", color_operands(color), path));
        }
        if let Some(stroke) = stroke {
            self.ops.push_str(&format!(
                "{} RG\n{:.2} w\n{}S\n",
                color_operands(stroke.color),
                m.len(stroke.width),
                path
            ));
        }
    }

    pub(crate) fn line(&mut self, from: (f64, f64), to: (f64, f64), stroke: Stroke) {
        let m = self.mapping;
        self.ops.push_str(&format!(
            "{} RG\n{:.2} w\n{:.2} {:.2} m\n{:.2} {:.2} l\nS\n",
            color_operands(stroke.color),
            m.len(stroke.width),
            m.x(from.0),
            m.y(from.1),
            m.x(to.0),
            m.y(to.1)
        ));
    }

    pub(crate) fn text(&mut self, block: &TextBlock, fonts: &mut FontSet<'_>) {
        let m = self.mapping;
        let style = &block.style;

        for (i, line) in block.lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            let run = fonts.run(style.face, line, style.size, style.tracking);
            let left = match style.align {
                TextAlign::Left => block.x,
                TextAlign::Center => block.x - run.width / 2.0,
                TextAlign::Right => block.x - run.width,
            };
            let baseline = block.baseline + i as f64 * style.line_height;

            self.ops.push_str("BT\n");
            self.ops.push_str(&format!("/{} {:.2} Tf\n", run.font, m.len(style.size)));
            self.ops.push_str(&format!("{:.3} Tc\n", m.len(style.tracking)));
            self.ops.push_str(&format!("{} rg\n", color_operands(style.color)));
            self.ops.push_str(&format!("1 0 0 1 {:.2} {:.2} Tm\n", m.x(left), m.y(baseline)));
            self.ops.push_str(&run.show);
            self.ops.push_str("\nET\n");
        }
    }

    /// Paint an image XObject into `placement` (canonical units)
    pub(crate) fn image(&mut self, name: &str, placement: &Rect) {
        let m = self.mapping;
        self.ops.push_str(&format!(
            "q\n{:.2} 0 0 {:.2} {:.2} {:.2} cm\n/{} Do\nQ\n",
            m.len(placement.width),
            m.len(placement.height),
            m.x(placement.x),
            m.y(placement.bottom()),
            name
        ));
    }

    /// Open a graphics state scope, optionally with an ExtGState applied
    pub(crate) fn save(&mut self, ext_state: Option<&str>) {
        self.ops.push_str("q\n");
        if let Some(name) = ext_state {
            self.ops.push_str(&format!("/{} gs\n", name));
        }
    }

    pub(crate) fn restore(&mut self) {
        self.ops.push_str("Q\n");
    }

    pub(crate) fn into_bytes(self) -> Vec<u8> {
        self.ops.into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::TextStyle;
    use crate::layout::{fit_to_page, Margins, PageDimensions};
    use crate::pdf::fonts::FontBook;

    fn mapping() -> PageMapping {
        fit_to_page(&PageDimensions::a4(), &Margins::none())
    }

    #[test]
    fn test_escape_pdf_string() {
        assert_eq!(escape_pdf_string("plain"), "plain");
        assert_eq!(escape_pdf_string("a (b) c\\d"), "a \\(b\\) c\\\\d");
        assert_eq!(escape_pdf_string("A \u{2022} B"), "A \\225 B");
        assert_eq!(escape_pdf_string("caf\u{e9}"), "caf\\351");
        assert_eq!(escape_pdf_string("\u{4e2d}"), "?");
    }

    #[test]
    fn test_is_win_ansi() {
        assert!(is_win_ansi("Caf\u{e9} \u{2022} \u{20ac}5?"));
        assert!(!is_win_ansi("\u{141}ukasz"));
        assert!(!is_win_ansi("\u{645}\u{62d}\u{645}\u{62f}"));
    }

    #[test]
    fn test_font_resources_are_distinct() {
        let names: Vec<String> = FontFace::ALL.iter().map(|f| font_resource(*f)).collect();
        assert_eq!(names, vec!["F1", "F2", "F3", "F4", "F5"]);
    }

    #[test]
    fn test_text_emits_one_run_per_line() {
        let mut builder = ContentBuilder::new(mapping());
        let block = TextBlock {
            text: "first\nsecond".to_string(),
            lines: vec!["first".to_string(), "second".to_string()],
            x: 400.0,
            baseline: 100.0,
            style: TextStyle::new(FontFace::SerifBold, 20.0, Color::NAVY).centered(),
        };
        let book = FontBook::empty();
        builder.text(&block, &mut FontSet::new(&book));
        let ops = String::from_utf8(builder.into_bytes()).unwrap();

        assert_eq!(ops.matches("BT\n").count(), 2);
        assert!(ops.contains("/F4 "));
        assert!(ops.contains("(first) Tj"));
        assert!(ops.contains("(second) Tj"));
    }

    #[test]
    fn test_rect_maps_to_page_points() {
        let m = mapping();
        let mut builder = ContentBuilder::new(m);
        builder.rect(&Rect::new(0.0, 0.0, 800.0, 1131.0), Some(Color::BLACK), None);
        let ops = String::from_utf8(builder.into_bytes()).unwrap();

        // Full canonical box covers the page width and starts at the bottom
        let expected = format!(
            "{:.2} {:.2} {:.2} {:.2} re",
            m.x(0.0),
            m.y(1131.0),
            m.len(800.0),
            m.len(1131.0)
        );
        assert!(ops.contains(&expected), "{}", ops);
        assert!(ops.contains("0.000 0.000 0.000 rg"));
    }
}
