//! Burning markers into the full-resolution image and writing the results.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use ab_glyph::{FontArc, PxScale};
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use tiny_skia::{ColorU8, Paint, PathBuilder, Pixmap, Stroke, Transform};

use crate::error::{Result, TaggerError};
use crate::marker::MarkerSnapshot;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportKind {
    /// Annotated image and results text.
    Both,
    ImageOnly,
    ResultsOnly,
    /// Writes the image, then hands it to the share target with the results
    /// as caption.
    Share,
}

impl ExportKind {
    pub const ALL: [ExportKind; 4] = [
        ExportKind::Both,
        ExportKind::ImageOnly,
        ExportKind::ResultsOnly,
        ExportKind::Share,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ExportKind::Both => "Save image and results",
            ExportKind::ImageOnly => "Save image only",
            ExportKind::ResultsOnly => "Save results only",
            ExportKind::Share => "Share",
        }
    }

    fn writes_image(self) -> bool {
        !matches!(self, ExportKind::ResultsOnly)
    }

    fn writes_results(self) -> bool {
        matches!(self, ExportKind::Both | ExportKind::ResultsOnly)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportPaths {
    pub image: PathBuf,
    pub results: PathBuf,
}

/// `photo.jpg` becomes `photo_edit.png` and `photo_edit.txt`.
pub fn export_paths(source: &Path) -> ExportPaths {
    let stem = source.with_extension("").into_os_string();
    let with_suffix = |suffix: &str| {
        let mut s = OsString::from(&stem);
        s.push(suffix);
        PathBuf::from(s)
    };
    ExportPaths {
        image: with_suffix("_edit.png"),
        results: with_suffix("_edit.txt"),
    }
}

/// How markers and the title look in the exported image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExportStyle {
    /// Circle radius in image pixels.
    pub radius: f32,
    pub stroke_width: f32,
    pub title_color: [u8; 3],
    pub title_scale: f32,
    pub title_origin: (i32, i32),
}

impl Default for ExportStyle {
    fn default() -> Self {
        Self {
            radius: 20.0,
            stroke_width: 3.0,
            title_color: [255, 255, 0],
            title_scale: 48.0,
            title_origin: (20, 20),
        }
    }
}

#[derive(Debug)]
pub struct Rendered {
    pub image: RgbaImage,
    pub circles: usize,
    pub title_drawn: bool,
}

/// Draws every marker of `snapshot` as a circle outline onto a copy of
/// `original`. Positions are used as-is, no viewport transform applies.
pub fn render_annotated(
    original: &RgbaImage,
    snapshot: &MarkerSnapshot,
    style: &ExportStyle,
    title: Option<(&str, &FontArc)>,
) -> Result<Rendered> {
    let (width, height) = original.dimensions();
    let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
        TaggerError::ExportRender(format!("cannot allocate {width}x{height} canvas"))
    })?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(original.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }

    let stroke = Stroke {
        width: style.stroke_width,
        ..Default::default()
    };
    let mut circles = 0;
    for marker in snapshot.markers() {
        let [r, g, b] = marker.color;
        let mut paint = Paint::default();
        paint.set_color_rgba8(r, g, b, 255);
        paint.anti_alias = true;

        let Some(path) = PathBuilder::from_circle(
            marker.position.x as f32,
            marker.position.y as f32,
            style.radius,
        ) else {
            log::warn!("skipping marker with degenerate circle");
            continue;
        };
        pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        circles += 1;
    }

    let mut image = RgbaImage::new(width, height);
    for (dst, src) in image.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }

    let mut title_drawn = false;
    if let Some((text, font)) = title {
        let [r, g, b] = style.title_color;
        draw_text_mut(
            &mut image,
            Rgba([r, g, b, 255]),
            style.title_origin.0,
            style.title_origin.1,
            PxScale::from(style.title_scale),
            font,
            text,
        );
        title_drawn = true;
    }

    Ok(Rendered {
        image,
        circles,
        title_drawn,
    })
}

/// Looks for a usable TrueType font, preferring `preferred` when given, then
/// common system fonts, then the Ubuntu Light face shipped with egui.
pub fn load_title_font(preferred: Option<&Path>) -> Option<FontArc> {
    const CANDIDATES: &[&str] = &[
        "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/System/Library/Fonts/Supplemental/Arial.ttf",
        "/System/Library/Fonts/Supplemental/Helvetica.ttf",
        "C:\\Windows\\Fonts\\arial.ttf",
    ];

    let preferred = preferred.map(Path::to_path_buf);
    let fallbacks = CANDIDATES.iter().map(PathBuf::from);
    for path in preferred.into_iter().chain(fallbacks) {
        let Ok(bytes) = std::fs::read(&path) else {
            continue;
        };
        match FontArc::try_from_vec(bytes) {
            Ok(font) => {
                log::debug!("title font {}", path.display());
                return Some(font);
            }
            Err(e) => log::warn!("unusable font {}: {e}", path.display()),
        }
    }
    match FontArc::try_from_slice(epaint_default_fonts::UBUNTU_LIGHT) {
        Ok(font) => {
            log::debug!("title font: bundled Ubuntu Light");
            Some(font)
        }
        Err(e) => {
            log::warn!("bundled font unusable: {e}");
            None
        }
    }
}

/// Destination for exported files.
pub trait ExportSink {
    fn write_image(&mut self, image: &RgbaImage, path: &Path) -> Result<()>;
    fn write_text(&mut self, text: &str, path: &Path) -> Result<()>;
}

/// Writes straight to the filesystem; the image format follows the
/// extension.
#[derive(Clone, Copy, Debug, Default)]
pub struct FileSink;

impl ExportSink for FileSink {
    fn write_image(&mut self, image: &RgbaImage, path: &Path) -> Result<()> {
        image.save(path).map_err(|e| match e {
            image::ImageError::IoError(source) => TaggerError::ExportIo {
                path: path.to_path_buf(),
                source,
            },
            source => TaggerError::ExportEncode {
                path: path.to_path_buf(),
                source,
            },
        })
    }

    fn write_text(&mut self, text: &str, path: &Path) -> Result<()> {
        std::fs::write(path, text).map_err(|source| TaggerError::ExportIo {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Platform "send to" integration.
pub trait ShareTarget {
    fn share(&mut self, file: &Path, caption: &str) -> Result<()>;
}

/// Share target for platforms without a share sheet.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnavailableShare;

impl ShareTarget for UnavailableShare {
    fn share(&mut self, _file: &Path, _caption: &str) -> Result<()> {
        Err(TaggerError::ShareUnavailable(
            "no share integration on this platform".into(),
        ))
    }
}

/// Everything an export needs, captured before any drawing starts.
pub struct ExportJob<'a> {
    pub source: &'a Path,
    pub original: &'a RgbaImage,
    pub snapshot: MarkerSnapshot,
    pub style: ExportStyle,
    /// Trimmed, non-empty title text, if the user asked for one.
    pub title: Option<&'a str>,
    pub font: Option<&'a FontArc>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportReport {
    pub kind: ExportKind,
    pub image: Option<PathBuf>,
    pub results: Option<PathBuf>,
    pub circles: usize,
    pub title_drawn: bool,
    /// A title was requested for the image but no font could draw it.
    pub title_skipped: bool,
}

/// Runs one export. Files already written stay on disk when a later step
/// fails; a failed results write after a successful image write comes back
/// as [`TaggerError::PartialExport`] naming the image.
pub fn run_export(
    kind: ExportKind,
    job: ExportJob<'_>,
    sink: &mut dyn ExportSink,
    share: &mut dyn ShareTarget,
) -> Result<ExportReport> {
    let paths = export_paths(job.source);
    let results_text = job.snapshot.tally().to_string();
    let mut report = ExportReport {
        kind,
        image: None,
        results: None,
        circles: 0,
        title_drawn: false,
        title_skipped: false,
    };

    if kind.writes_image() {
        let title = job.title.zip(job.font);
        if job.title.is_some() && title.is_none() {
            log::warn!("no usable font found, exporting without title");
        }
        let rendered = render_annotated(job.original, &job.snapshot, &job.style, title)?;
        sink.write_image(&rendered.image, &paths.image)
            .inspect_err(|e| log::error!("export failed: {e}"))?;
        log::info!(
            "exported {} markers to {}",
            rendered.circles,
            paths.image.display()
        );
        report.image = Some(paths.image.clone());
        report.circles = rendered.circles;
        report.title_drawn = rendered.title_drawn;
        report.title_skipped = job.title.is_some() && !rendered.title_drawn;
    }

    if kind.writes_results() {
        if let Err(e) = sink.write_text(&results_text, &paths.results) {
            log::error!("export failed: {e}");
            return Err(match report.image {
                Some(written) => TaggerError::PartialExport {
                    written,
                    source: Box::new(e),
                },
                None => e,
            });
        }
        log::info!("wrote results to {}", paths.results.display());
        report.results = Some(paths.results.clone());
    }

    if kind == ExportKind::Share {
        share
            .share(&paths.image, &results_text)
            .inspect_err(|e| log::warn!("{e}"))?;
    }

    Ok(report)
}
