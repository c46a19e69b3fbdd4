//! Single-page PDF output for a rendered cover page

use std::collections::HashMap;

use lopdf::{text_string, Dictionary, Document, Object, ObjectId, Stream};
use tracing::{debug, warn};

use super::content::{font_resource, ContentBuilder};
use super::fonts::{FontBook, FontSet};
use super::images::{contain, prepare_image};
use crate::document::{Color, FontFace, ImageNode, Node, Rect, RenderedDocument, Stroke};
use crate::error::Result;
use crate::export::{Assets, ExportOptions};
use crate::fields::CoverFields;
use crate::layout::{fit_to_page, Margins};
use crate::template::TemplateKind;

/// Document information dictionary entries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentInfo {
    pub title: String,
    pub author: String,
    pub subject: String,
    pub keywords: String,
}

impl DocumentInfo {
    pub fn from_fields(fields: &CoverFields, template: TemplateKind) -> Self {
        Self {
            title: fields.topic.clone(),
            author: fields.author.clone(),
            subject: fields.subject.clone(),
            keywords: format!("assignment cover, {}", template),
        }
    }
}

fn add_standard_font(doc: &mut Document, face: FontFace) -> ObjectId {
    let mut font = Dictionary::new();
    font.set("Type", Object::Name(b"Font".to_vec()));
    font.set("Subtype", Object::Name(b"Type1".to_vec()));
    font.set("BaseFont", Object::Name(face.base_font().as_bytes().to_vec()));
    font.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
    doc.add_object(Object::Dictionary(font))
}

fn add_info(doc: &mut Document, info: &DocumentInfo) -> ObjectId {
    let mut dict = Dictionary::new();
    dict.set("Title", text_string(&info.title));
    dict.set("Author", text_string(&info.author));
    dict.set("Subject", text_string(&info.subject));
    dict.set("Keywords", text_string(&info.keywords));
    dict.set("Creator", text_string(env!("CARGO_PKG_NAME")));
    doc.add_object(Object::Dictionary(dict))
}

/// Image XObjects and opacity states shared by the page
struct PageResources {
    images: Dictionary,
    states: Dictionary,
    /// (reference, pixel width) -> (resource name, width, height)
    image_cache: HashMap<(String, u32), (String, u32, u32)>,
    /// opacity in thousandths -> resource name
    state_cache: HashMap<u32, String>,
}

impl PageResources {
    fn new() -> Self {
        Self {
            images: Dictionary::new(),
            states: Dictionary::new(),
            image_cache: HashMap::new(),
            state_cache: HashMap::new(),
        }
    }

    fn opacity_state(&mut self, opacity: f64) -> Option<String> {
        let opacity = opacity.clamp(0.0, 1.0);
        if opacity >= 1.0 {
            return None;
        }
        let key = (opacity * 1000.0).round() as u32;
        if let Some(name) = self.state_cache.get(&key) {
            return Some(name.clone());
        }
        let name = format!("GS{}", self.state_cache.len() + 1);
        let mut state = Dictionary::new();
        state.set("Type", Object::Name(b"ExtGState".to_vec()));
        state.set("ca", Object::Real(opacity as f32));
        state.set("CA", Object::Real(opacity as f32));
        self.states.set(name.clone(), Object::Dictionary(state));
        self.state_cache.insert(key, name.clone());
        Some(name)
    }

    /// Embed the image behind `node`, reusing an earlier embedding of the
    /// same source at the same resolution
    fn image(
        &mut self,
        doc: &mut Document,
        node: &ImageNode,
        bytes: &[u8],
        options: &ExportOptions,
    ) -> Result<(String, u32, u32)> {
        let max_width = (node.frame.width * options.pixel_density).ceil().max(1.0) as u32;
        let key = (node.source.reference().to_string(), max_width);
        if let Some(entry) = self.image_cache.get(&key) {
            return Ok(entry.clone());
        }

        let prepared = prepare_image(bytes, max_width, options.background, options.jpeg_quality())?;

        let mut dict = Dictionary::new();
        dict.set("Type", Object::Name(b"XObject".to_vec()));
        dict.set("Subtype", Object::Name(b"Image".to_vec()));
        dict.set("Width", Object::Integer(prepared.width as i64));
        dict.set("Height", Object::Integer(prepared.height as i64));
        dict.set("ColorSpace", Object::Name(b"DeviceRGB".to_vec()));
        dict.set("BitsPerComponent", Object::Integer(8));
        dict.set("Filter", Object::Name(b"DCTDecode".to_vec()));
        let stream = Stream::new(dict, prepared.jpeg).with_compression(false);
        let id = doc.add_object(stream);

        let name = format!("Im{}", self.image_cache.len() + 1);
        self.images.set(name.clone(), Object::Reference(id));
        let entry = (name, prepared.width, prepared.height);
        self.image_cache.insert(key, entry.clone());
        Ok(entry)
    }
}

/// Frame drawn where an image could not be loaded
fn placeholder(content: &mut ContentBuilder, frame: &Rect) {
    content.rect(
        frame,
        Some(Color::SLATE_100),
        Some(Stroke {
            color: Color::SLATE_300,
            width: 1.0,
        }),
    );
}

/// Write `document` as a one-page PDF and return the file bytes
///
/// The canonical box is scaled uniformly into the page's content area. Text
/// uses the standard Type1 fonts, except for lines they cannot encode, which
/// get a covering font from `fonts` embedded. Images are embedded as JPEG.
pub fn write_pdf(
    document: &RenderedDocument,
    assets: &Assets,
    fonts: &FontBook,
    options: &ExportOptions,
    info: &DocumentInfo,
) -> Result<Vec<u8>> {
    let page = options.page.oriented(options.orientation);
    let (page_width, page_height) = (page.width.pt(), page.height.pt());
    let mapping = fit_to_page(&page, &Margins::uniform(options.margin));

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut font_dict = Dictionary::new();
    for face in FontFace::ALL {
        let font_id = add_standard_font(&mut doc, face);
        font_dict.set(font_resource(face), Object::Reference(font_id));
    }

    let mut content = ContentBuilder::new(mapping);
    let mut resources = PageResources::new();
    let mut embedded = FontSet::new(fonts);

    content.fill_page(page_width, page_height, options.background);
    content.rect(
        &Rect::new(0.0, 0.0, document.width, document.height),
        Some(document.background),
        None,
    );

    for node in &document.nodes {
        match node {
            Node::Rect { frame, fill, stroke } => content.rect(frame, *fill, *stroke),
            Node::Line { from, to, stroke } => content.line(*from, *to, *stroke),
            Node::Text(block) => content.text(block, &mut embedded),
            Node::Image(image) => {
                let state = resources.opacity_state(image.opacity);
                content.save(state.as_deref());

                let embedded = match assets.get(image.source.reference()) {
                    Some(bytes) => match resources.image(&mut doc, image, bytes, options) {
                        Ok(entry) => Some(entry),
                        Err(e) => {
                            warn!("Could not embed image, drawing placeholder: {}", e);
                            None
                        }
                    },
                    None => None,
                };
                match embedded {
                    Some((name, width, height)) => {
                        content.image(&name, &contain(&image.frame, width, height))
                    }
                    None => placeholder(&mut content, &image.frame),
                }

                content.restore();
            }
        }
    }

    embedded.finish(&mut doc, &mut font_dict)?;
    let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

    let mut page_resources = Dictionary::new();
    page_resources.set("Font", Object::Dictionary(font_dict));
    if !resources.image_cache.is_empty() {
        page_resources.set("XObject", Object::Dictionary(resources.images));
    }
    if !resources.state_cache.is_empty() {
        page_resources.set("ExtGState", Object::Dictionary(resources.states));
    }

    let mut page_dict = Dictionary::new();
    page_dict.set("Type", Object::Name(b"Page".to_vec()));
    page_dict.set("Parent", Object::Reference(pages_id));
    page_dict.set(
        "MediaBox",
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(page_width as f32),
            Object::Real(page_height as f32),
        ]),
    );
    page_dict.set("Contents", Object::Reference(content_id));
    page_dict.set("Resources", Object::Dictionary(page_resources));
    let page_id = doc.add_object(Object::Dictionary(page_dict));

    let mut pages = Dictionary::new();
    pages.set("Type", Object::Name(b"Pages".to_vec()));
    pages.set("Kids", Object::Array(vec![Object::Reference(page_id)]));
    pages.set("Count", Object::Integer(1));
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));
    let catalog_id = doc.add_object(Object::Dictionary(catalog));
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let info_id = add_info(&mut doc, info);
    doc.trailer.set("Info", Object::Reference(info_id));

    if options.compress {
        doc.compress();
    }

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    debug!(
        template = %document.template,
        nodes = document.nodes.len(),
        bytes = bytes.len(),
        "wrote cover page"
    );
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Field;
    use crate::logo::DataUri;
    use crate::preview::render_svg;
    use crate::template::render;
    use image::{ImageFormat, Rgba, RgbaImage};
    use quick_xml::events::Event;
    use quick_xml::Reader;
    use std::io::Cursor;

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    fn page_content(bytes: &[u8]) -> String {
        let doc = Document::load_mem(bytes).unwrap();
        let page_id = *doc.get_pages().values().next().unwrap();
        String::from_utf8_lossy(&doc.get_page_content(page_id).unwrap()).into_owned()
    }

    /// Text drawn on the page, one line after another
    fn extracted_text(bytes: &[u8]) -> String {
        let doc = Document::load_mem(bytes).unwrap();
        doc.extract_text(&[1]).unwrap().replace('\n', " ")
    }

    /// Text of every `<text>` element of an SVG preview, in order
    fn svg_text(svg: &str) -> String {
        let mut reader = Reader::from_str(svg);
        let mut text = String::new();
        let mut in_text = false;
        loop {
            match reader.read_event().unwrap() {
                Event::Start(e) if e.name().as_ref() == b"text" => in_text = true,
                Event::End(e) if e.name().as_ref() == b"text" => {
                    in_text = false;
                    text.push(' ');
                }
                Event::Text(t) if in_text => text.push_str(&t.unescape().unwrap()),
                Event::Eof => break,
                _ => {}
            }
        }
        text
    }

    fn punctuated_fields() -> CoverFields {
        CoverFields {
            institution: "Institut f\u{fc}r Datenwissenschaft & KI".to_string(),
            author: "Zo\u{eb} O'Brien-N\u{fa}\u{f1}ez".to_string(),
            roll_number: "<BS/2291>".to_string(),
            subject: "Data Systems (II) \\ Practice".to_string(),
            topic: "Caf\u{e9} Networks \u{2022} \u{201c}Quoted\u{201d} \u{2013} Part 2".to_string(),
            program: "M.Sc. R&D".to_string(),
            semester: "7th".to_string(),
            submission_date: "3 M\u{e4}r 2026".to_string(),
            supervisor: "Prof. Ren\u{e9}e L\u{f8}vstad".to_string(),
            show_logo: false,
            custom_logo: None,
        }
    }

    fn non_latin_fields() -> CoverFields {
        CoverFields {
            author: "\u{141}ukasz \u{17b}\u{f3}\u{142}\u{107}".to_string(),
            // "Θεωρία Γράφων"
            subject: "\u{398}\u{3b5}\u{3c9}\u{3c1}\u{3af}\u{3b1} \
                      \u{393}\u{3c1}\u{3ac}\u{3c6}\u{3c9}\u{3bd}"
                .to_string(),
            // "Проф. Иван Петров"
            supervisor: "\u{41f}\u{440}\u{43e}\u{444}. \u{418}\u{432}\u{430}\u{43d} \
                         \u{41f}\u{435}\u{442}\u{440}\u{43e}\u{432}"
                .to_string(),
            institution: "Politechnika \u{141}\u{f3}dzka".to_string(),
            ..punctuated_fields()
        }
    }

    fn export(fields: &CoverFields, kind: TemplateKind, fonts: &FontBook) -> Vec<u8> {
        let document = render(fields, kind);
        let info = DocumentInfo::from_fields(fields, kind);
        write_pdf(&document, &Assets::new(), fonts, &ExportOptions::default(), &info).unwrap()
    }

    fn logo_png() -> Vec<u8> {
        let img = RgbaImage::from_pixel(64, 32, Rgba([30, 58, 138, 200]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png).unwrap();
        bytes
    }

    #[test]
    fn test_writes_single_page_with_field_text() {
        let mut fields = CoverFields::sample();
        fields.author = "Ana Lee".to_string();
        fields.show_logo = false;
        let document = render(&fields, TemplateKind::Formal);
        let info = DocumentInfo::from_fields(&fields, TemplateKind::Formal);

        let bytes = write_pdf(
            &document,
            &Assets::new(),
            &FontBook::empty(),
            &ExportOptions::default(),
            &info,
        )
        .unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);

        let content = page_content(&bytes);
        assert!(content.contains("(Ana Lee"));
        assert!(!content.contains(" Do\n"));
    }

    #[test]
    fn test_missing_image_draws_placeholder() {
        let fields = CoverFields::sample();
        let document = render(&fields, TemplateKind::Modern);
        let info = DocumentInfo::from_fields(&fields, document.template);

        let bytes = write_pdf(
            &document,
            &Assets::new(),
            &FontBook::empty(),
            &ExportOptions::default(),
            &info,
        )
        .unwrap();
        assert!(!contains(&bytes, b"/DCTDecode"));
        let content = page_content(&bytes);
        assert!(content.contains("0.945 0.961 0.976 rg"));
    }

    #[test]
    fn test_custom_logo_is_embedded_once_per_resolution() {
        let mut fields = CoverFields::sample();
        let logo = logo_png();
        let uri = DataUri::encode("image/png", &logo);
        fields.set_logo(uri.clone());
        let document = render(&fields, TemplateKind::Minimalist);
        let info = DocumentInfo::from_fields(&fields, document.template);

        let mut assets = Assets::new();
        assets.insert(uri.as_str(), logo);

        let bytes = write_pdf(
            &document,
            &assets,
            &FontBook::empty(),
            &ExportOptions::default(),
            &info,
        )
        .unwrap();
        assert!(contains(&bytes, b"/DCTDecode"));

        let content = page_content(&bytes);
        assert_eq!(content.matches("/Im1 Do").count(), 1);
        // Minimalist draws its logo at half opacity
        assert!(content.contains("/GS1 gs"));
    }

    #[test]
    fn test_uncompressed_output_is_readable() {
        let fields = CoverFields::sample();
        let document = render(&fields, TemplateKind::Academic);
        let info = DocumentInfo::from_fields(&fields, document.template);
        let options = ExportOptions {
            compress: false,
            ..ExportOptions::default()
        };

        let bytes = write_pdf(
            &document,
            &Assets::new(),
            &FontBook::empty(),
            &options,
            &info,
        )
        .unwrap();
        assert!(contains(&bytes, b"Times-Bold"));
        assert!(contains(&bytes, b"(Muhammad Ayoub"));
    }

    #[test]
    fn test_every_field_is_drawn_in_every_template() {
        let fields = punctuated_fields();
        for kind in TemplateKind::ALL {
            let pdf_text = extracted_text(&export(&fields, kind, &FontBook::empty()));
            let preview_text = svg_text(&render_svg(&render(&fields, kind), 0.5));
            for field in Field::ALL {
                let value = fields.get(field);
                assert!(
                    pdf_text.contains(value),
                    "{} PDF is missing {:?} = {:?}:\n{}",
                    kind,
                    field,
                    value,
                    pdf_text
                );
                assert!(
                    preview_text.contains(value),
                    "{} preview is missing {:?} = {:?}",
                    kind,
                    field,
                    value
                );
            }
        }
    }

    #[test]
    fn test_non_latin_text_embeds_a_font() {
        let fonts = FontBook::shared();
        let fields = non_latin_fields();
        let covered = Field::ALL
            .iter()
            .all(|field| fonts.find(FontFace::Serif, fields.get(*field)).is_some());
        if !covered {
            eprintln!("no installed font covers the sample text, skipping");
            return;
        }

        for kind in TemplateKind::ALL {
            let bytes = export(&fields, kind, &fonts);
            let doc = Document::load_mem(&bytes).unwrap();
            let page_id = *doc.get_pages().values().next().unwrap();
            let page_fonts = doc.get_page_fonts(page_id).unwrap();
            assert!(page_fonts.contains_key(b"E1".as_slice()), "{} embedded no font", kind);

            let text = extracted_text(&bytes);
            assert!(!text.contains("?ukasz"));
            for field in Field::ALL {
                let value = fields.get(field);
                assert!(text.contains(value), "{} PDF is missing {:?}:\n{}", kind, value, text);
            }
        }
    }

    #[test]
    fn test_non_latin_text_without_fonts_degrades() {
        let fields = non_latin_fields();
        let text = extracted_text(&export(&fields, TemplateKind::Formal, &FontBook::empty()));
        assert!(text.contains("?ukasz"));
        assert!(text.contains("Politechnika ?\u{f3}dzka"));
    }
}
