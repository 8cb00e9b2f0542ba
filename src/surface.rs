//! Pannable, zoomable canvas that turns taps into markers.

use std::cell::Cell;
use std::rc::Rc;

use image::RgbaImage;

use crate::coords::{ImagePoint, ImageSize, ScreenPoint, ViewportTransform};
use crate::error::{Result, TaggerError};
use crate::marker::MarkerStore;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    View,
    Edit,
}

impl Mode {
    pub fn toggled(self) -> Self {
        match self {
            Mode::View => Mode::Edit,
            Mode::Edit => Mode::View,
        }
    }
}

/// What a pointer-down ended up doing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerOutcome {
    MarkerAdded(usize),
    GestureStarted,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceSettings {
    /// Marker radius in screen pixels, independent of zoom.
    pub edit_radius: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Default for SurfaceSettings {
    fn default() -> Self {
        Self {
            edit_radius: 20.0,
            min_zoom: 0.1,
            max_zoom: 10.0,
        }
    }
}

/// A marker ready to paint: a filled circle in screen space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarkerSprite {
    pub center: ScreenPoint,
    pub radius: f64,
    pub color: [f32; 3],
}

#[derive(Clone, Copy, Debug)]
struct PanGesture {
    last: ScreenPoint,
}

#[derive(Debug)]
pub struct RenderSurface {
    settings: SurfaceSettings,
    store: MarkerStore,
    image_size: Option<ImageSize>,
    pending_texture: Option<RgbaImage>,
    transform: ViewportTransform,
    mode: Mode,
    current_class: usize,
    canvas_origin: ScreenPoint,
    viewport_size: Option<(f64, f64)>,
    pan: Option<PanGesture>,
    redraw: Rc<Cell<bool>>,
}

impl RenderSurface {
    pub fn new(mut store: MarkerStore, settings: SurfaceSettings) -> Self {
        let redraw = Rc::new(Cell::new(true));
        let flag = Rc::clone(&redraw);
        store.subscribe(move |_| flag.set(true));
        Self {
            settings,
            store,
            image_size: None,
            pending_texture: None,
            transform: ViewportTransform::identity(),
            mode: Mode::View,
            current_class: 0,
            canvas_origin: ScreenPoint::new(0.0, 0.0),
            viewport_size: None,
            pan: None,
            redraw,
        }
    }

    pub fn store(&self) -> &MarkerStore {
        &self.store
    }

    pub fn transform(&self) -> ViewportTransform {
        self.transform
    }

    pub fn image_size(&self) -> Option<ImageSize> {
        self.image_size
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn current_class(&self) -> usize {
        self.current_class
    }

    /// Replaces the displayed image. Resets the transform, the markers and
    /// the mode.
    pub fn load(&mut self, texture: RgbaImage) {
        let size = ImageSize::new(texture.width(), texture.height());
        self.transform = match self.viewport_size {
            Some((w, h)) => ViewportTransform::centered(size, w, h),
            None => ViewportTransform::identity(),
        };
        self.image_size = Some(size);
        self.pending_texture = Some(texture);
        self.mode = Mode::View;
        self.pan = None;
        self.store.reset();
        self.redraw.set(true);
        log::debug!("surface loaded {}x{}", size.width, size.height);
    }

    /// The displayed copy waiting to be uploaded to the GPU, if any.
    pub fn take_texture_upload(&mut self) -> Option<RgbaImage> {
        self.pending_texture.take()
    }

    pub fn set_edit_mode(&mut self, enabled: bool) {
        self.mode = if enabled { Mode::Edit } else { Mode::View };
    }

    pub fn toggle_edit_mode(&mut self) -> Mode {
        self.mode = self.mode.toggled();
        self.mode
    }

    pub fn set_current_class(&mut self, index: usize) -> Result<()> {
        self.store.catalog().check_index(index)?;
        self.current_class = index;
        Ok(())
    }

    /// Where the canvas sits in the window, and how big it is.
    pub fn set_viewport(&mut self, origin: ScreenPoint, width: f64, height: f64) {
        self.canvas_origin = origin;
        self.viewport_size = Some((width, height));
    }

    pub fn screen_to_image(&self, p: ScreenPoint) -> ImagePoint {
        self.transform.inverse(p.to_viewport(self.canvas_origin))
    }

    pub fn image_to_screen(&self, p: ImagePoint) -> ScreenPoint {
        self.transform.forward(p).to_screen(self.canvas_origin)
    }

    /// In edit mode a press on the image places a marker of the current
    /// class. Anything else starts a pan.
    pub fn handle_pointer_down(&mut self, p: ScreenPoint) -> Result<PointerOutcome> {
        if self.mode == Mode::Edit {
            let size = self.image_size.ok_or(TaggerError::NoImageLoaded)?;
            let target = self.screen_to_image(p);
            if size.contains(target) {
                let index = self.store.add(target, self.current_class)?;
                return Ok(PointerOutcome::MarkerAdded(index));
            }
        }
        self.pan = Some(PanGesture { last: p });
        Ok(PointerOutcome::GestureStarted)
    }

    /// Continues a pan started by [`handle_pointer_down`]. Returns whether
    /// the view moved.
    ///
    /// [`handle_pointer_down`]: Self::handle_pointer_down
    pub fn handle_pointer_move(&mut self, p: ScreenPoint) -> bool {
        let Some(pan) = self.pan.as_mut() else {
            return false;
        };
        let delta = p - pan.last;
        pan.last = p;
        if delta.dx == 0.0 && delta.dy == 0.0 {
            return false;
        }
        self.transform.pan_by(delta);
        self.redraw.set(true);
        true
    }

    pub fn handle_pointer_up(&mut self) {
        self.pan = None;
    }

    pub fn is_panning(&self) -> bool {
        self.pan.is_some()
    }

    /// Scroll or pinch zoom about a screen point.
    pub fn zoom_at(&mut self, anchor: ScreenPoint, factor: f64) {
        let before = self.transform;
        self.transform.zoom_about(
            anchor.to_viewport(self.canvas_origin),
            factor,
            self.settings.min_zoom,
            self.settings.max_zoom,
        );
        if self.transform != before {
            log::trace!("zoom {:.3}", self.transform.scale());
            self.redraw.set(true);
        }
    }

    /// The image's on-screen bounds as `(top_left, bottom_right)`.
    pub fn image_rect(&self) -> Option<(ScreenPoint, ScreenPoint)> {
        let size = self.image_size?;
        Some((
            self.image_to_screen(ImagePoint::new(0.0, 0.0)),
            self.image_to_screen(ImagePoint::new(size.width as f64, size.height as f64)),
        ))
    }

    /// Every stored marker mapped through the current transform, in
    /// insertion order. The radius stays fixed in screen pixels.
    pub fn render(&self) -> Vec<MarkerSprite> {
        self.store
            .iter()
            .map(|m| MarkerSprite {
                center: self.image_to_screen(m.position),
                radius: self.settings.edit_radius,
                color: m.color.map(|c| c as f32 / 255.0),
            })
            .collect()
    }

    /// Returns and clears the "needs repaint" flag.
    pub fn take_redraw(&self) -> bool {
        self.redraw.replace(false)
    }
}
