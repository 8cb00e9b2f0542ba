//! Tap-to-count image annotation.
//!
//! Markers live in image-pixel space inside a [`MarkerStore`]. The
//! [`RenderSurface`] maps taps from the screen into that space and maps
//! markers back out for drawing under the current pan and zoom. Export draws
//! the same markers straight onto the full-resolution image.

pub mod catalog;
pub mod config;
pub mod coords;
pub mod error;
pub mod export;
pub mod marker;
pub mod session;
pub mod surface;
pub mod tally;

pub use catalog::{ClassCatalog, ClassDef};
pub use config::Config;
pub use coords::{
    ImagePoint, ImageSize, ScreenPoint, ScreenVec, ViewportPoint, ViewportTransform,
};
pub use error::{ErrorKind, Result, TaggerError};
pub use export::{ExportKind, ExportReport, ExportSink, FileSink, ShareTarget, UnavailableShare};
pub use marker::{Marker, MarkerSnapshot, MarkerStore, StoreEvent};
pub use session::{LoadedImage, Notice, Session};
pub use surface::{MarkerSprite, Mode, PointerOutcome, RenderSurface, SurfaceSettings};
pub use tally::{ClassCount, Tally};
