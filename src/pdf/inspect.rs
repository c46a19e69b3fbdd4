//! Reading back exported PDFs

use std::path::Path;

use lopdf::{decode_text_string, Document, Object};

use crate::error::{Error, Result};

/// What an exported cover page looks like from the outside
#[derive(Debug, Clone, PartialEq)]
pub struct PdfSummary {
    pub page_count: usize,
    /// Width and height of the first page's MediaBox, in points
    pub page_size: (f64, f64),
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
}

fn info_entry(doc: &Document, key: &[u8]) -> Option<String> {
    let info_id = match doc.trailer.get(b"Info").ok()? {
        Object::Reference(id) => *id,
        _ => return None,
    };
    let info = doc.get_dictionary(info_id).ok()?;
    // PDFDocEncoding unless the string carries a UTF-16BE or UTF-8 mark
    decode_text_string(info.get(key).ok()?).ok()
}

fn page_size(doc: &Document) -> Result<(f64, f64)> {
    let page_id = *doc
        .get_pages()
        .values()
        .next()
        .ok_or_else(|| Error::General("PDF has no pages".to_string()))?;
    let media_box = doc.get_dictionary(page_id)?.get(b"MediaBox")?.as_array()?;
    if media_box.len() != 4 {
        return Err(Error::General("MediaBox must have four entries".to_string()));
    }
    let value = |i: usize| -> Result<f64> { Ok(media_box[i].as_float()? as f64) };
    Ok((value(2)? - value(0)?, value(3)? - value(1)?))
}

/// Summarize a PDF held in memory
pub fn inspect_pdf(bytes: &[u8]) -> Result<PdfSummary> {
    let doc = Document::load_mem(bytes)?;
    let page_count = doc.get_pages().len();

    Ok(PdfSummary {
        page_count,
        page_size: page_size(&doc)?,
        title: info_entry(&doc, b"Title"),
        author: info_entry(&doc, b"Author"),
        subject: info_entry(&doc, b"Subject"),
    })
}

/// Summarize a PDF file
pub fn inspect_file(path: &Path) -> Result<PdfSummary> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    let bytes = std::fs::read(path)?;
    inspect_pdf(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{Assets, ExportOptions};
    use crate::fields::CoverFields;
    use crate::pdf::{write_pdf, DocumentInfo, FontBook};
    use crate::template::{render, TemplateKind};
    use lopdf::{Dictionary, StringFormat};

    #[test]
    fn test_inspect_nonexistent_file() {
        let result = inspect_file(Path::new("nonexistent.pdf"));
        assert!(matches!(result.unwrap_err(), Error::FileNotFound(_)));
    }

    #[test]
    fn test_inspect_garbage_fails() {
        assert!(inspect_pdf(b"not a pdf").is_err());
    }

    #[test]
    fn test_info_strings_use_pdf_doc_encoding() {
        let mut doc = Document::with_version("1.5");
        let mut info = Dictionary::new();
        info.set(
            "Title",
            Object::String(vec![b'A', 0x80, b'B', 0x84, 0x18], StringFormat::Literal),
        );
        info.set("Author", lopdf::text_string("\u{141}ukasz"));
        let info_id = doc.add_object(Object::Dictionary(info));
        doc.trailer.set("Info", Object::Reference(info_id));

        assert_eq!(
            info_entry(&doc, b"Title").as_deref(),
            Some("A\u{2022}B\u{2014}\u{2d8}")
        );
        assert_eq!(info_entry(&doc, b"Author").as_deref(), Some("\u{141}ukasz"));
        assert_eq!(info_entry(&doc, b"Subject"), None);
    }

    #[test]
    fn test_inspect_exported_cover() {
        let mut fields = CoverFields::sample();
        fields.topic = "R\u{e9}seaux Neuronaux".to_string();
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

        let summary = inspect_pdf(&bytes).unwrap();
        assert_eq!(summary.page_count, 1);
        assert!((summary.page_size.0 - 595.28).abs() < 0.05);
        assert!((summary.page_size.1 - 841.89).abs() < 0.05);
        assert_eq!(summary.title.as_deref(), Some("R\u{e9}seaux Neuronaux"));
        assert_eq!(summary.author.as_deref(), Some("Muhammad Ayoub"));
        assert_eq!(summary.subject.as_deref(), Some("Artificial Intelligence"));
    }
}
