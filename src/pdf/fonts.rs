//! Embedded TrueType fonts for text the standard fonts cannot encode
//!
//! The standard Type1 fonts only reach WinAnsiEncoding. A line with any other
//! character is shaped with rustybuzz against an installed font that covers
//! it, then written as glyph ids through a Type0 font with Identity-H
//! encoding. A ToUnicode CMap maps the glyphs back to the original text.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use fontdb::{Database, FaceInfo, Style, Weight, ID};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use once_cell::sync::Lazy;
use rustybuzz::ttf_parser::{self, GlyphId};
use rustybuzz::{Face, UnicodeBuffer};
use tracing::{debug, warn};

use super::content::{escape_pdf_string, font_resource, is_win_ansi};
use crate::document::FontFace;
use crate::error::{Error, Result};
use crate::layout::estimate_text_width;

static SYSTEM_FONTS: Lazy<Arc<FontBook>> = Lazy::new(|| Arc::new(FontBook::system()));

/// Installed or explicitly loaded fonts that text can fall back to
#[derive(Debug, Clone)]
pub struct FontBook {
    db: Database,
}

impl Default for FontBook {
    fn default() -> Self {
        Self::empty()
    }
}

impl FontBook {
    /// A book with no fonts; non-WinAnsi text degrades to `?`
    pub fn empty() -> Self {
        Self { db: Database::new() }
    }

    /// Every font installed on the system
    pub fn system() -> Self {
        let mut db = Database::new();
        db.load_system_fonts();
        if db.is_empty() {
            warn!("No system fonts found, text outside WinAnsi will be replaced");
        } else {
            debug!(faces = db.len(), "loaded system fonts");
        }
        Self { db }
    }

    /// The system book, loaded once per process
    pub fn shared() -> Arc<FontBook> {
        Arc::clone(&SYSTEM_FONTS)
    }

    /// Add the faces of one font file
    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        self.db.load_font_file(path)?;
        Ok(())
    }

    /// Add every font under `dir`, recursively
    pub fn load_dir(&mut self, dir: &Path) -> Result<()> {
        if !dir.is_dir() {
            return Err(Error::FileNotFound(dir.to_path_buf()));
        }
        self.db.load_fonts_dir(dir);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.db.len()
    }

    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }

    /// Closest face to `face` that has a glyph for every character of `text`
    pub fn find(&self, face: FontFace, text: &str) -> Option<ID> {
        let mut candidates: Vec<(u32, &str, ID)> = self
            .db
            .faces()
            .map(|info| (mismatch(info, face), info.post_script_name.as_str(), info.id))
            .collect();
        candidates.sort();
        candidates
            .into_iter()
            .map(|(_, _, id)| id)
            .find(|id| self.covers(*id, text))
    }

    fn covers(&self, id: ID, text: &str) -> bool {
        self.db
            .with_face_data(id, |data, index| {
                embeddable(data) && Face::from_slice(data, index).is_some_and(|f| covers(&f, text))
            })
            .unwrap_or(false)
    }

    fn load(&self, id: ID) -> Option<(Vec<u8>, u32, String)> {
        let name = self.db.face(id)?.post_script_name.clone();
        self.db
            .with_face_data(id, |data, index| (data.to_vec(), index, name))
    }
}

/// Distance between an installed face and the requested one; lower is closer
fn mismatch(info: &FaceInfo, face: FontFace) -> u32 {
    let weight = if face.is_bold() { Weight::BOLD } else { Weight::NORMAL };
    let style = if face.is_italic() { Style::Italic } else { Style::Normal };
    let family = info
        .families
        .first()
        .map(|(name, _)| name.as_str())
        .unwrap_or_default();
    let serif = family.contains("Serif") && !family.contains("Sans");

    let mut score = u32::from(info.weight.0.abs_diff(weight.0)) / 100;
    if info.style != style {
        score += 4;
    }
    if serif != face.is_serif() {
        score += 2;
    }
    if info.monospaced {
        score += 3;
    }
    if info.stretch != fontdb::Stretch::Normal {
        score += 1;
    }
    score
}

/// FontFile2 carries a single TrueType-outline font, not a collection
fn embeddable(data: &[u8]) -> bool {
    !data.starts_with(b"ttcf")
}

fn covers(face: &ttf_parser::Face<'_>, text: &str) -> bool {
    face.tables().glyf.is_some()
        && text
            .chars()
            .filter(|c| !c.is_whitespace() && !c.is_control())
            .all(|c| face.glyph_index(c).is_some())
}

/// One positioned line, ready for the content stream
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TextRun {
    /// Font resource name
    pub font: String,
    /// Text showing operator with its operand
    pub show: String,
    /// Advance width in layout units, tracking included
    pub width: f64,
}

/// A font program embedded into the page
struct EmbeddedFont {
    face: FontFace,
    resource: String,
    base_font: String,
    data: Vec<u8>,
    index: u32,
    /// glyph id -> (advance in font units, text the glyph stands for)
    glyphs: BTreeMap<u16, (u16, String)>,
}

impl EmbeddedFont {
    fn covers(&self, text: &str) -> bool {
        Face::from_slice(&self.data, self.index).is_some_and(|f| covers(&f, text))
    }

    fn shape(&mut self, line: &str, size: f64, tracking: f64) -> Option<TextRun> {
        let face = Face::from_slice(&self.data, self.index)?;
        let units_per_em = f64::from(face.units_per_em());

        let mut buffer = UnicodeBuffer::new();
        buffer.push_str(line);
        let shaped = rustybuzz::shape(&face, &[], buffer);
        let infos = shaped.glyph_infos();
        let positions = shaped.glyph_positions();

        // Clusters are byte offsets into the line; each spans up to the next one
        let mut starts: Vec<usize> = infos.iter().map(|info| info.cluster as usize).collect();
        starts.sort_unstable();
        starts.dedup();
        let cluster_text = |start: usize| {
            let end = starts
                .iter()
                .copied()
                .find(|s| *s > start)
                .unwrap_or(line.len());
            line.get(start..end).unwrap_or_default()
        };

        let mut mapped = HashSet::new();
        let mut pieces = Vec::new();
        let mut current = String::new();
        let mut advance = 0.0;

        for (info, position) in infos.iter().zip(positions) {
            let gid = u16::try_from(info.glyph_id).unwrap_or(0);
            let nominal = face.glyph_hor_advance(GlyphId(gid)).unwrap_or(0);
            let text = if mapped.insert(info.cluster) {
                cluster_text(info.cluster as usize)
            } else {
                ""
            };
            let entry = self
                .glyphs
                .entry(gid)
                .or_insert_with(|| (nominal, String::new()));
            if entry.1.is_empty() {
                entry.1 = text.to_string();
            }

            current.push_str(&format!("{:04X}", gid));
            // Shaping can move glyphs away from their nominal advance (kerning)
            let drift = f64::from(nominal) - f64::from(position.x_advance);
            let adjust = (drift * 1000.0 / units_per_em).round() as i64;
            if adjust != 0 {
                pieces.push(format!("<{}>", std::mem::take(&mut current)));
                pieces.push(adjust.to_string());
            }
            advance += f64::from(position.x_advance);
        }

        let show = if pieces.is_empty() {
            format!("<{}> Tj", current)
        } else {
            if !current.is_empty() {
                pieces.push(format!("<{}>", current));
            }
            format!("[{}] TJ", pieces.join(" "))
        };
        let gaps = infos.len().saturating_sub(1) as f64;

        Some(TextRun {
            font: self.resource.clone(),
            show,
            width: advance * size / units_per_em + tracking * gaps,
        })
    }

    /// Write the Type0 font and its descendants; returns the Type0 font id
    fn write(&self, doc: &mut Document) -> Result<ObjectId> {
        let face = Face::from_slice(&self.data, self.index)
            .ok_or_else(|| Error::General(format!("Font {} could not be parsed", self.base_font)))?;
        let scale = 1000.0 / f64::from(face.units_per_em());
        let units = |value: i16| Object::Integer((f64::from(value) * scale).round() as i64);
        let bbox = face.global_bounding_box();
        let base_font = Object::Name(self.base_font.as_bytes().to_vec());

        let mut file = Dictionary::new();
        file.set("Length1", Object::Integer(self.data.len() as i64));
        let file_id = doc.add_object(Stream::new(file, self.data.clone()));

        let mut flags = 32;
        if self.face.is_serif() {
            flags |= 2;
        }
        if face.is_italic() {
            flags |= 64;
        }

        let mut descriptor = Dictionary::new();
        descriptor.set("Type", Object::Name(b"FontDescriptor".to_vec()));
        descriptor.set("FontName", base_font.clone());
        descriptor.set("Flags", Object::Integer(flags));
        descriptor.set(
            "FontBBox",
            Object::Array(vec![
                units(bbox.x_min),
                units(bbox.y_min),
                units(bbox.x_max),
                units(bbox.y_max),
            ]),
        );
        descriptor.set("ItalicAngle", Object::Real(face.italic_angle().unwrap_or(0.0)));
        descriptor.set("Ascent", units(face.ascender()));
        descriptor.set("Descent", units(face.descender()));
        descriptor.set("CapHeight", units(face.capital_height().unwrap_or(face.ascender())));
        descriptor.set("StemV", Object::Integer(if self.face.is_bold() { 120 } else { 80 }));
        descriptor.set("FontFile2", Object::Reference(file_id));
        let descriptor_id = doc.add_object(Object::Dictionary(descriptor));

        let mut widths = Vec::with_capacity(self.glyphs.len() * 2);
        for (gid, (advance, _)) in &self.glyphs {
            widths.push(Object::Integer(i64::from(*gid)));
            widths.push(Object::Array(vec![Object::Integer(
                (f64::from(*advance) * scale).round() as i64,
            )]));
        }

        let mut system_info = Dictionary::new();
        system_info.set("Registry", Object::String(b"Adobe".to_vec(), StringFormat::Literal));
        system_info.set("Ordering", Object::String(b"Identity".to_vec(), StringFormat::Literal));
        system_info.set("Supplement", Object::Integer(0));

        let mut cid_font = Dictionary::new();
        cid_font.set("Type", Object::Name(b"Font".to_vec()));
        cid_font.set("Subtype", Object::Name(b"CIDFontType2".to_vec()));
        cid_font.set("BaseFont", base_font.clone());
        cid_font.set("CIDSystemInfo", Object::Dictionary(system_info));
        cid_font.set("FontDescriptor", Object::Reference(descriptor_id));
        cid_font.set("CIDToGIDMap", Object::Name(b"Identity".to_vec()));
        cid_font.set("W", Object::Array(widths));
        let cid_font_id = doc.add_object(Object::Dictionary(cid_font));

        let to_unicode_id = doc.add_object(Stream::new(
            Dictionary::new(),
            to_unicode_cmap(&self.glyphs).into_bytes(),
        ));

        let mut font = Dictionary::new();
        font.set("Type", Object::Name(b"Font".to_vec()));
        font.set("Subtype", Object::Name(b"Type0".to_vec()));
        font.set("BaseFont", base_font);
        font.set("Encoding", Object::Name(b"Identity-H".to_vec()));
        font.set("DescendantFonts", Object::Array(vec![Object::Reference(cid_font_id)]));
        font.set("ToUnicode", Object::Reference(to_unicode_id));
        Ok(doc.add_object(Object::Dictionary(font)))
    }
}

/// Font name usable as a PDF name object
fn base_font_name(post_script_name: &str, fallback: usize) -> String {
    let name: String = post_script_name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    if name.is_empty() {
        format!("EmbeddedFont{}", fallback)
    } else {
        name
    }
}

/// ToUnicode CMap from glyph ids to the text they were shaped from
fn to_unicode_cmap(glyphs: &BTreeMap<u16, (u16, String)>) -> String {
    let mapped: Vec<(u16, &str)> = glyphs
        .iter()
        .filter(|(_, (_, text))| !text.is_empty())
        .map(|(gid, (_, text))| (*gid, text.as_str()))
        .collect();

    let mut cmap = String::from(
        "/CIDInit /ProcSet findresource begin
12 dict begin
begincmap
/CIDSystemInfo
<< /Registry (Adobe)
/Ordering (UCS)
/Supplement 0
>> def
/CMapName /Adobe-Identity-UCS def
/CMapType 2 def
1 begincodespacerange
<0000> <FFFF>
endcodespacerange
",
    );
    // At most 100 entries per bfchar section
    for chunk in mapped.chunks(100) {
        cmap.push_str(&format!("{} beginbfchar\n", chunk.len()));
        for (gid, text) in chunk {
            let target: String = text.encode_utf16().map(|unit| format!("{:04X}", unit)).collect();
            cmap.push_str(&format!("<{:04X}> <{}>\n", gid, target));
        }
        cmap.push_str("endbfchar\n");
    }
    cmap.push_str(
        "endcmap
CMapName currentdict /CMap defineresource pop
end
end
",
    );
    cmap
}

/// Fonts used by one page: the standard five plus whatever had to be embedded
pub(crate) struct FontSet<'a> {
    book: &'a FontBook,
    embedded: Vec<EmbeddedFont>,
    loaded: Vec<ID>,
}

impl<'a> FontSet<'a> {
    pub(crate) fn new(book: &'a FontBook) -> Self {
        Self {
            book,
            embedded: Vec::new(),
            loaded: Vec::new(),
        }
    }

    /// Lay out one line in `face`
    ///
    /// WinAnsi text stays on the standard font. Anything else goes through an
    /// embedded font; when no installed font covers the line it falls back to
    /// the standard font with `?` for the missing characters.
    pub(crate) fn run(&mut self, face: FontFace, line: &str, size: f64, tracking: f64) -> TextRun {
        if !is_win_ansi(line) {
            if let Some(run) = self
                .embedded_for(face, line)
                .and_then(|index| self.embedded[index].shape(line, size, tracking))
            {
                return run;
            }
            warn!("No installed font covers {:?}, unsupported characters become '?'", line);
        }
        TextRun {
            font: font_resource(face),
            show: format!("({}) Tj", escape_pdf_string(line)),
            width: estimate_text_width(line, face, size, tracking),
        }
    }

    fn embedded_for(&mut self, face: FontFace, line: &str) -> Option<usize> {
        if let Some(index) = self
            .embedded
            .iter()
            .position(|font| font.face == face && font.covers(line))
        {
            return Some(index);
        }

        let id = self.book.find(face, line)?;
        if let Some(index) = self.loaded.iter().position(|loaded| *loaded == id) {
            return Some(index);
        }

        let (data, index, post_script_name) = self.book.load(id)?;
        let number = self.embedded.len() + 1;
        let base_font = base_font_name(&post_script_name, number);
        debug!(font = %base_font, "embedding fallback font");
        self.embedded.push(EmbeddedFont {
            face,
            resource: format!("E{}", number),
            base_font,
            data,
            index,
            glyphs: BTreeMap::new(),
        });
        self.loaded.push(id);
        Some(self.embedded.len() - 1)
    }

    pub(crate) fn embedded_count(&self) -> usize {
        self.embedded.len()
    }

    /// Write the embedded fonts and register them in `fonts`
    pub(crate) fn finish(self, doc: &mut Document, fonts: &mut Dictionary) -> Result<()> {
        for font in &self.embedded {
            let id = font.write(doc)?;
            fonts.set(font.resource.clone(), Object::Reference(id));
        }
        Ok(())
    }
}
