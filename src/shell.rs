//! The editing session: fields, template choice, preview and async actions
//!
//! [`Shell`] owns the one mutable session. Every change goes through its
//! methods and the preview is always rendered from the current snapshot.
//! Refinement and export are guarded by busy flags so at most one of each
//! runs at a time.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::document::RenderedDocument;
use crate::error::Result;
use crate::export::{ExportController, ExportOutcome};
use crate::fields::{CoverFields, Field};
use crate::logo::load_logo;
use crate::preview::{render_svg, ScaleToFit, Surface};
use crate::refine::TitleRefiner;
use crate::template::{render, TemplateKind};

/// Identifier of the preview document an export captures
pub const PREVIEW_DOCUMENT_ID: &str = "assignment-preview";

/// Reference to a document mounted in the shell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentHandle(String);

impl DocumentHandle {
    pub fn new(id: impl Into<String>) -> Self {
        DocumentHandle(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

/// A flag that at most one task can hold
#[derive(Debug, Default)]
pub struct BusyFlag(AtomicBool);

impl BusyFlag {
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Set the flag unless it is already set; it clears when the guard drops
    pub fn try_acquire(&self) -> Option<BusyGuard<'_>> {
        self.0
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| BusyGuard(&self.0))
    }
}

/// Clears its [`BusyFlag`] on drop
#[derive(Debug)]
pub struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// In-flight markers for the two async actions
#[derive(Debug, Default)]
pub struct AsyncFlags {
    pub enhancing: BusyFlag,
    pub generating: BusyFlag,
}

/// Mutable state of one editing session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub fields: CoverFields,
    pub template: TemplateKind,
}

impl Session {
    pub fn new(fields: CoverFields, template: TemplateKind) -> Self {
        Self { fields, template }
    }

    /// Sample fields on the default template
    pub fn starter() -> Self {
        Self::new(CoverFields::sample(), TemplateKind::default())
    }
}

pub struct Shell {
    session: Mutex<Session>,
    flags: AsyncFlags,
    fit: Mutex<ScaleToFit>,
    surface: Surface,
    refiner: TitleRefiner,
    exporter: ExportController,
}

impl Shell {
    pub fn new(session: Session, refiner: TitleRefiner, exporter: ExportController) -> Self {
        Self {
            session: Mutex::new(session),
            flags: AsyncFlags::default(),
            fit: Mutex::new(ScaleToFit::new()),
            surface: Surface::new(),
            refiner,
            exporter,
        }
    }

    /// Snapshot of the current fields
    pub fn fields(&self) -> CoverFields {
        self.session.lock().fields.clone()
    }

    pub fn template(&self) -> TemplateKind {
        self.session.lock().template
    }

    pub fn set_field(&self, field: Field, value: impl Into<String>) {
        self.session.lock().fields.set(field, value);
    }

    pub fn set_show_logo(&self, show: bool) {
        self.session.lock().fields.show_logo = show;
    }

    pub fn select_template(&self, kind: TemplateKind) {
        debug!(template = %kind, "template selected");
        self.session.lock().template = kind;
    }

    /// Load a logo file into the session
    ///
    /// On failure the previous logo stays in place and the error is returned.
    pub async fn load_logo(&self, path: &Path) -> Result<()> {
        match load_logo(path).await {
            Ok(uri) => {
                self.session.lock().fields.set_logo(uri);
                info!("Using logo {}", path.display());
                Ok(())
            }
            Err(e) => {
                warn!("Logo not loaded, keeping the current one: {}", e);
                Err(e)
            }
        }
    }

    pub fn remove_logo(&self) {
        self.session.lock().fields.remove_logo();
    }

    /// Render the current snapshot at canonical size
    pub fn render(&self) -> RenderedDocument {
        let session = self.session.lock();
        render(&session.fields, session.template)
    }

    /// Measure the hosting container for the first time
    pub fn mount(&self, container_width: f64) -> f64 {
        self.resize(container_width)
    }

    /// Re-measure after the container changed size; returns the new scale
    pub fn resize(&self, container_width: f64) -> f64 {
        self.fit.lock().measure(container_width)
    }

    pub fn scale(&self) -> f64 {
        self.fit.lock().scale()
    }

    pub fn reserved_height(&self) -> f64 {
        self.fit.lock().reserved_height()
    }

    /// SVG preview of the current snapshot at the current scale
    pub fn preview_svg(&self) -> String {
        render_svg(&self.render(), self.scale())
    }

    pub fn preview_handle(&self) -> DocumentHandle {
        DocumentHandle::new(PREVIEW_DOCUMENT_ID)
    }

    /// The document behind `handle`, rendered from one consistent snapshot
    pub fn resolve(&self, handle: &DocumentHandle) -> Option<(RenderedDocument, CoverFields)> {
        if handle.id() != PREVIEW_DOCUMENT_ID {
            return None;
        }
        let session = self.session.lock();
        Some((render(&session.fields, session.template), session.fields.clone()))
    }

    pub fn is_enhancing(&self) -> bool {
        self.flags.enhancing.is_set()
    }

    pub fn is_generating(&self) -> bool {
        self.flags.generating.is_set()
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Replace the topic with a refined title
    ///
    /// Returns `false` without doing anything when a refinement is already
    /// running. A failed refinement leaves the topic untouched.
    pub async fn refine_title(&self) -> bool {
        let Some(_busy) = self.flags.enhancing.try_acquire() else {
            debug!("refinement already in flight");
            return false;
        };

        let (subject, topic) = {
            let session = self.session.lock();
            (session.fields.subject.clone(), session.fields.topic.clone())
        };

        let refined = self.refiner.refine(&subject, &topic).await;
        if refined != topic {
            self.session.lock().fields.topic = refined;
        }
        true
    }

    /// Export the document behind `handle` as a PDF
    pub async fn export_pdf(&self, handle: &DocumentHandle) -> ExportOutcome {
        if self.resolve(handle).is_none() {
            warn!("Nothing to export for document '{}'", handle.id());
            return ExportOutcome::Unresolved;
        }
        let Some(_busy) = self.flags.generating.try_acquire() else {
            debug!("export already in flight");
            return ExportOutcome::Busy;
        };

        self.exporter
            .run(&self.surface, || self.resolve(handle))
            .await
    }
}
