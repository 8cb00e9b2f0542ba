//! One annotation session: the loaded image, its markers and the canvas.

use std::cell::{Cell, OnceCell};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

use ab_glyph::FontArc;
use image::RgbaImage;

use crate::config::Config;
use crate::error::{ErrorKind, Result, TaggerError};
use crate::export::{self, ExportJob, ExportKind, ExportReport, ExportSink, ShareTarget};
use crate::marker::MarkerStore;
use crate::surface::{Mode, RenderSurface};

const NO_RESULTS: &str = "Resultados:\n0 marcadores";

/// The authoritative full-resolution pixels. Never drawn on directly.
#[derive(Debug)]
pub struct LoadedImage {
    pub path: PathBuf,
    pub pixels: RgbaImage,
}

/// A message for the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn from_error(err: &TaggerError) -> Self {
        let message = match err.kind() {
            ErrorKind::ImageLoadFailed => "Could not load the image.".to_owned(),
            ErrorKind::NoImageLoaded => "Load an image first.".to_owned(),
            ErrorKind::ExportIoFailure => match err {
                TaggerError::PartialExport { written, source } => format!(
                    "Export failed: {source}\nAlready saved: {}",
                    written.display()
                ),
                _ => format!("Export failed: {err}"),
            },
            ErrorKind::ShareUnavailable => {
                "Sharing is not available. The image was saved.".to_owned()
            }
            ErrorKind::Configuration => err.to_string(),
        };
        Self::new("Error", message)
    }

    pub fn from_report(report: &ExportReport) -> Self {
        let mut message = match (&report.image, &report.results) {
            (Some(image), Some(results)) => format!(
                "Image and results saved:\nImage: {}\nResults: {}",
                image.display(),
                results.display()
            ),
            (Some(image), None) if report.kind == ExportKind::Share => {
                format!("Shared {}", image.display())
            }
            (Some(image), None) => format!("Image saved to: {}", image.display()),
            (None, Some(results)) => format!("Results saved to: {}", results.display()),
            (None, None) => "Nothing was written.".to_owned(),
        };
        if report.title_skipped {
            message.push_str("\nThe title was left out: no usable font was found.");
        }
        Self::new("Saved", message)
    }
}

pub struct Session {
    config: Config,
    image: Option<LoadedImage>,
    surface: RenderSurface,
    results: String,
    results_stale: Rc<Cell<bool>>,
    font: OnceCell<Option<FontArc>>,
}

impl Session {
    pub fn new(config: Config) -> Self {
        let catalog = Arc::new(config.classes.clone());
        let mut store = MarkerStore::new(catalog);
        let results_stale = Rc::new(Cell::new(false));
        let flag = Rc::clone(&results_stale);
        store.subscribe(move |_| flag.set(true));
        let surface = RenderSurface::new(store, config.surface_settings());

        Self {
            config,
            image: None,
            surface,
            results: NO_RESULTS.to_owned(),
            results_stale,
            font: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn surface(&self) -> &RenderSurface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut RenderSurface {
        &mut self.surface
    }

    pub fn image(&self) -> Option<&LoadedImage> {
        self.image.as_ref()
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    /// Decodes `path` and makes it the current image. On failure nothing
    /// changes.
    pub fn open_image(&mut self, path: &Path) -> Result<()> {
        let decoded = image::open(path).map_err(|source| TaggerError::ImageLoadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_pixels(path.to_path_buf(), decoded.to_rgba8());
        Ok(())
    }

    /// Installs already-decoded pixels. `path` drives export naming.
    pub fn load_pixels(&mut self, path: PathBuf, pixels: RgbaImage) {
        log::info!(
            "loaded {} ({}x{})",
            path.display(),
            pixels.width(),
            pixels.height()
        );
        self.surface.load(pixels.clone());
        self.image = Some(LoadedImage { path, pixels });
        // the tally only shows up after the first placement or mode toggle
        self.results = NO_RESULTS.to_owned();
        self.results_stale.set(false);
    }

    pub fn toggle_edit_mode(&mut self) -> Mode {
        let mode = self.surface.toggle_edit_mode();
        self.results_stale.set(true);
        mode
    }

    /// Current results text, recomputed after store changes and mode
    /// toggles. Right after a load it reads "0 marcadores".
    pub fn results_text(&mut self) -> &str {
        if self.results_stale.replace(false) {
            self.results = if self.image.is_some() {
                self.surface.store().tally().to_string()
            } else {
                NO_RESULTS.to_owned()
            };
        }
        &self.results
    }

    /// Exports the markers as they are right now. `title` is trimmed and
    /// skipped when empty.
    pub fn export(
        &self,
        kind: ExportKind,
        title: &str,
        sink: &mut dyn ExportSink,
        share: &mut dyn ShareTarget,
    ) -> Result<ExportReport> {
        let image = self.image.as_ref().ok_or(TaggerError::NoImageLoaded)?;
        let snapshot = self.surface.store().snapshot();

        let title = Some(title.trim()).filter(|t| !t.is_empty());
        let font = match title {
            Some(_) if kind != ExportKind::ResultsOnly => self.title_font(),
            _ => None,
        };

        let job = ExportJob {
            source: &image.path,
            original: &image.pixels,
            snapshot,
            style: self.config.export_style(),
            title,
            font,
        };
        export::run_export(kind, job, sink, share)
    }

    fn title_font(&self) -> Option<&FontArc> {
        self.font
            .get_or_init(|| export::load_title_font(self.config.font_path.as_deref()))
            .as_ref()
    }
}
