//! PDF export: naming, asset resolution, capture and saving
//!
//! An export works from an unscaled snapshot of the rendered document. The
//! preview scale never leaks into the output: the canonical box is mapped
//! onto an A4 page and written as a single-page PDF.

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use regex::Regex;
use reqwest::Client;
use tracing::{debug, error, info, warn};

use crate::document::{Color, ImageSource, RenderedDocument, DEFAULT_LOGO_URL};
use crate::error::{Error, Result};
use crate::fields::CoverFields;
use crate::layout::{Length, Orientation, PageDimensions};
use crate::pdf::{write_pdf, DocumentInfo, FontBook};
use crate::preview::Surface;

/// Message shown to the user when an export fails
pub const EXPORT_FAILURE_NOTICE: &str = "Something went wrong during PDF generation. \
     Try again, or save the SVG preview and print it from a browser.";

const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Output file name for an author/subject pair
///
/// Every run of whitespace becomes a single underscore. Path separators are
/// replaced too, so the name always lands inside the output directory.
pub fn export_file_name(author: &str, subject: &str) -> String {
    format!(
        "Assignment_{}_{}.pdf",
        file_name_part(author),
        file_name_part(subject)
    )
}

fn file_name_part(value: &str) -> String {
    WHITESPACE_RUN
        .replace_all(value, "_")
        .replace(['/', '\\'], "_")
}

/// Capture and page settings of an export
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    pub margin: Length,
    /// Raster image quality, 0.0..=1.0
    pub image_quality: f64,
    /// Device pixels per canonical unit for embedded images
    pub pixel_density: f64,
    pub background: Color,
    pub page: PageDimensions,
    pub orientation: Orientation,
    pub compress: bool,
    /// Wait before capture so pending image loads can finish
    pub settle_delay: Duration,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            margin: Length::from_mm(0.0),
            image_quality: 1.0,
            pixel_density: 2.0,
            background: Color::WHITE,
            page: PageDimensions::a4(),
            orientation: Orientation::Portrait,
            compress: true,
            settle_delay: Duration::from_millis(400),
        }
    }
}

impl ExportOptions {
    /// JPEG quality for embedded images (1..=100)
    pub fn jpeg_quality(&self) -> u8 {
        (self.image_quality.clamp(0.0, 1.0) * 100.0).round().max(1.0) as u8
    }
}

/// Raw image bytes keyed by image reference
#[derive(Debug, Clone, Default)]
pub struct Assets {
    images: HashMap<String, Vec<u8>>,
    /// References that failed to load and are not retried
    unavailable: HashSet<String>,
}

impl Assets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, reference: impl Into<String>, bytes: Vec<u8>) {
        self.images.insert(reference.into(), bytes);
    }

    pub fn get(&self, reference: &str) -> Option<&[u8]> {
        self.images.get(reference).map(|bytes| bytes.as_slice())
    }

    pub fn contains(&self, reference: &str) -> bool {
        self.images.contains_key(reference)
    }

    /// Whether `reference` was already looked up, successfully or not
    pub fn is_settled(&self, reference: &str) -> bool {
        self.contains(reference) || self.unavailable.contains(reference)
    }

    pub fn mark_unavailable(&mut self, reference: impl Into<String>) {
        self.unavailable.insert(reference.into());
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// Loads the pixels behind every image node of a document
#[derive(Debug, Clone)]
pub struct AssetResolver {
    client: Option<Client>,
}

impl AssetResolver {
    /// Resolver that fetches the remote default logo over HTTP
    pub fn online() -> Result<Self> {
        let client = Client::builder().timeout(FETCH_TIMEOUT).build()?;
        Ok(Self {
            client: Some(client),
        })
    }

    /// Resolver that never touches the network
    pub fn offline() -> Self {
        Self { client: None }
    }

    /// Resolve every distinct image of `doc`
    ///
    /// Images that cannot be loaded are left out; the PDF writer draws a
    /// placeholder frame for them.
    pub async fn resolve(&self, doc: &RenderedDocument) -> Assets {
        let mut assets = Assets::new();
        self.complete(doc, &mut assets).await;
        assets
    }

    /// Resolve the images of `doc` that `assets` has not looked up yet
    pub async fn complete(&self, doc: &RenderedDocument, assets: &mut Assets) {
        for image in doc.images() {
            let reference = image.source.reference();
            if assets.is_settled(reference) {
                continue;
            }
            match self.fetch(&image.source).await {
                Ok(bytes) => {
                    debug!(bytes = bytes.len(), "resolved image asset");
                    assets.insert(reference, bytes);
                }
                Err(e) => {
                    warn!("Image unavailable, drawing placeholder: {}", e);
                    assets.mark_unavailable(reference);
                }
            }
        }
    }

    async fn fetch(&self, source: &ImageSource) -> Result<Vec<u8>> {
        match source {
            ImageSource::Custom(uri) => uri.decode(),
            ImageSource::DefaultLogo => {
                let client = self.client.as_ref().ok_or_else(|| {
                    Error::General("offline mode, default logo not fetched".to_string())
                })?;
                let response = client.get(DEFAULT_LOGO_URL).send().await?.error_for_status()?;
                Ok(response.bytes().await?.to_vec())
            }
        }
    }
}

/// Surfaces user-facing failure messages
pub trait Notifier: Send + Sync + Debug {
    fn alert(&self, message: &str);
}

/// Writes alerts to standard error
#[derive(Debug, Default)]
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn alert(&self, message: &str) {
        eprintln!("{}", message);
    }
}

/// Keeps alerts in memory
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    alerts: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn alert(&self, message: &str) {
        self.alerts.lock().push(message.to_string());
    }
}

/// Result of one export request
#[derive(Debug, Clone, PartialEq)]
pub enum ExportOutcome {
    /// The PDF was written to this path
    Saved(PathBuf),
    /// Capture or saving failed; the user was alerted
    Failed(String),
    /// Another export was already running
    Busy,
    /// The preview document could not be found
    Unresolved,
}

/// Runs the capture-and-save pipeline
#[derive(Debug)]
pub struct ExportController {
    options: ExportOptions,
    assets: AssetResolver,
    fonts: Arc<FontBook>,
    out_dir: PathBuf,
    notifier: Arc<dyn Notifier>,
}

impl ExportController {
    pub fn new(
        out_dir: impl Into<PathBuf>,
        options: ExportOptions,
        assets: AssetResolver,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            options,
            assets,
            fonts: FontBook::shared(),
            out_dir: out_dir.into(),
            notifier,
        }
    }

    /// Fonts to embed for text outside WinAnsi (the system fonts by default)
    pub fn with_fonts(mut self, fonts: Arc<FontBook>) -> Self {
        self.fonts = fonts;
        self
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Export the document produced by `snapshot`
    ///
    /// Resets the surface scroll, then waits for the settle delay while the
    /// images of the current document load. The document is captured again
    /// once the delay is over, so edits made meanwhile are part of the
    /// export. Failures are logged and reported through the notifier, never
    /// returned.
    pub async fn run<F>(&self, surface: &Surface, snapshot: F) -> ExportOutcome
    where
        F: Fn() -> Option<(RenderedDocument, CoverFields)>,
    {
        surface.scroll_to_origin();

        match self.capture(&snapshot).await {
            Ok(path) => {
                info!("Saved {}", path.display());
                ExportOutcome::Saved(path)
            }
            Err(e) => {
                error!("PDF generation failed: {}", e);
                self.notifier.alert(EXPORT_FAILURE_NOTICE);
                ExportOutcome::Failed(e.to_string())
            }
        }
    }

    async fn capture<F>(&self, snapshot: &F) -> Result<PathBuf>
    where
        F: Fn() -> Option<(RenderedDocument, CoverFields)>,
    {
        let unmounted = || Error::General("the preview document is no longer mounted".to_string());

        let (document, _) = snapshot().ok_or_else(unmounted)?;
        let (mut assets, ()) = tokio::join!(
            self.assets.resolve(&document),
            tokio::time::sleep(self.options.settle_delay)
        );

        let (document, fields) = snapshot().ok_or_else(unmounted)?;
        self.assets.complete(&document, &mut assets).await;

        let file_name = export_file_name(&fields.author, &fields.subject);
        let info = DocumentInfo::from_fields(&fields, document.template);
        let bytes = write_pdf(&document, &assets, &self.fonts, &self.options, &info)?;
        debug!(bytes = bytes.len(), file = %file_name, "PDF written");

        save_atomically(&self.out_dir, &file_name, &bytes)
    }
}

/// Write `bytes` to `dir/file_name` through a temporary file in `dir`
///
/// Readers never observe a partially written PDF.
pub fn save_atomically(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(bytes)?;
    file.as_file().sync_all()?;

    let target = dir.join(file_name);
    file.persist(&target).map_err(|e| Error::Io(e.error))?;
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{render, TemplateKind};

    #[test]
    fn test_export_file_name_collapses_whitespace() {
        assert_eq!(
            export_file_name("Ana Lee", "Data Systems"),
            "Assignment_Ana_Lee_Data_Systems.pdf"
        );
        assert_eq!(
            export_file_name("Muhammad  Ayoub", "Artificial\tIntelligence"),
            "Assignment_Muhammad_Ayoub_Artificial_Intelligence.pdf"
        );
        assert_eq!(export_file_name("", ""), "Assignment__.pdf");
    }

    #[test]
    fn test_export_file_name_stays_in_directory() {
        assert_eq!(
            export_file_name("a/b", "c\\d"),
            "Assignment_a_b_c_d.pdf"
        );
    }

    #[test]
    fn test_default_options() {
        let options = ExportOptions::default();
        assert_eq!(options.margin.mm(), 0.0);
        assert_eq!(options.jpeg_quality(), 100);
        assert_eq!(options.pixel_density, 2.0);
        assert_eq!(options.background, Color::WHITE);
        assert_eq!(options.orientation, Orientation::Portrait);
        assert!(options.compress);
        assert_eq!(options.settle_delay, Duration::from_millis(400));
    }

    #[test]
    fn test_jpeg_quality_is_clamped() {
        let mut options = ExportOptions::default();
        options.image_quality = 0.0;
        assert_eq!(options.jpeg_quality(), 1);
        options.image_quality = 7.0;
        assert_eq!(options.jpeg_quality(), 100);
        options.image_quality = 0.85;
        assert_eq!(options.jpeg_quality(), 85);
    }

    #[tokio::test]
    async fn test_offline_resolver_skips_default_logo() {
        let doc = render(&CoverFields::sample(), TemplateKind::Academic);
        let assets = AssetResolver::offline().resolve(&doc).await;
        assert!(assets.is_empty());
    }

    #[tokio::test]
    async fn test_resolver_decodes_custom_logo_once() {
        let mut fields = CoverFields::sample();
        let uri = crate::logo::DataUri::encode("image/png", b"not really a png");
        fields.set_logo(uri.clone());

        // Academic draws the logo twice (emblem and watermark)
        let doc = render(&fields, TemplateKind::Academic);
        assert!(doc.images().count() >= 2);

        let assets = AssetResolver::offline().resolve(&doc).await;
        assert_eq!(assets.len(), 1);
        assert_eq!(assets.get(uri.as_str()), Some(&b"not really a png"[..]));
    }

    #[tokio::test]
    async fn test_complete_only_looks_up_new_images() {
        let resolver = AssetResolver::offline();
        let mut fields = CoverFields::sample();
        let mut assets = resolver.resolve(&render(&fields, TemplateKind::Formal)).await;
        assert!(assets.is_empty());
        assert!(assets.is_settled(DEFAULT_LOGO_URL));

        let uri = crate::logo::DataUri::encode("image/png", b"crest");
        fields.set_logo(uri.clone());
        resolver
            .complete(&render(&fields, TemplateKind::Formal), &mut assets)
            .await;
        assert_eq!(assets.len(), 1);
        assert!(assets.contains(uri.as_str()));
    }

    #[test]
    fn test_save_atomically_writes_target() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_atomically(dir.path(), "out.pdf", b"%PDF-1.5").unwrap();
        assert_eq!(path, dir.path().join("out.pdf"));
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.5");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_save_atomically_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(save_atomically(&missing, "out.pdf", b"x").is_err());
    }

    #[test]
    fn test_recording_notifier() {
        let notifier = RecordingNotifier::new();
        notifier.alert(EXPORT_FAILURE_NOTICE);
        assert_eq!(notifier.alerts(), vec![EXPORT_FAILURE_NOTICE.to_string()]);
    }
}
