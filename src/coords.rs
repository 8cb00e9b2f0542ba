//! Coordinate spaces and the viewport transform.
//!
//! Three spaces are in play and each has its own point type so they cannot be
//! mixed up by accident:
//!
//! - [`ScreenPoint`]: raw pointer input, in window coordinates.
//! - [`ViewportPoint`]: relative to the top-left corner of the canvas.
//! - [`ImagePoint`]: pixels of the loaded image, origin at its top-left.
//!
//! Screen and viewport differ by the canvas origin only. Viewport and image
//! are related by [`ViewportTransform`].

use std::ops::{Add, Sub};

/// A point in window coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

/// A displacement in screen (and viewport) units.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct ScreenVec {
    pub dx: f64,
    pub dy: f64,
}

/// A point relative to the canvas origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportPoint {
    pub x: f64,
    pub y: f64,
}

/// A point in image-pixel space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImagePoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn to_viewport(self, canvas_origin: ScreenPoint) -> ViewportPoint {
        ViewportPoint::new(self.x - canvas_origin.x, self.y - canvas_origin.y)
    }
}

impl ScreenVec {
    pub const fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }
}

impl ViewportPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn to_screen(self, canvas_origin: ScreenPoint) -> ScreenPoint {
        ScreenPoint::new(self.x + canvas_origin.x, self.y + canvas_origin.y)
    }
}

impl ImagePoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Sub for ScreenPoint {
    type Output = ScreenVec;

    fn sub(self, rhs: Self) -> ScreenVec {
        ScreenVec::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Add<ScreenVec> for ViewportPoint {
    type Output = ViewportPoint;

    fn add(self, rhs: ScreenVec) -> ViewportPoint {
        ViewportPoint::new(self.x + rhs.dx, self.y + rhs.dy)
    }
}

/// Dimensions of the loaded image in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Half-open bounds test: `[0, width) x [0, height)`.
    pub fn contains(&self, p: ImagePoint) -> bool {
        p.x >= 0.0 && p.y >= 0.0 && p.x < self.width as f64 && p.y < self.height as f64
    }
}

/// Pan/zoom lens between image space and viewport space.
///
/// `viewport = origin + scale * image`, so `origin` is where the image's
/// top-left pixel currently sits inside the canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportTransform {
    origin: ViewportPoint,
    scale: f64,
}

impl Default for ViewportTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl ViewportTransform {
    pub const fn identity() -> Self {
        Self {
            origin: ViewportPoint::new(0.0, 0.0),
            scale: 1.0,
        }
    }

    /// Returns `None` for a degenerate (zero, negative or non-finite) scale.
    pub fn new(origin: ViewportPoint, scale: f64) -> Option<Self> {
        if scale.is_finite() && scale > 0.0 && origin.x.is_finite() && origin.y.is_finite() {
            Some(Self { origin, scale })
        } else {
            None
        }
    }

    /// Scale 1.0 with the image centered in a viewport of the given size.
    pub fn centered(image: ImageSize, viewport_width: f64, viewport_height: f64) -> Self {
        Self {
            origin: ViewportPoint::new(
                ((viewport_width - image.width as f64) * 0.5).round(),
                ((viewport_height - image.height as f64) * 0.5).round(),
            ),
            scale: 1.0,
        }
    }

    pub fn origin(&self) -> ViewportPoint {
        self.origin
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn forward(&self, p: ImagePoint) -> ViewportPoint {
        ViewportPoint::new(
            self.origin.x + self.scale * p.x,
            self.origin.y + self.scale * p.y,
        )
    }

    pub fn inverse(&self, p: ViewportPoint) -> ImagePoint {
        ImagePoint::new(
            (p.x - self.origin.x) / self.scale,
            (p.y - self.origin.y) / self.scale,
        )
    }

    pub fn pan_by(&mut self, delta: ScreenVec) {
        self.origin = self.origin + delta;
    }

    /// Multiplies the scale by `factor`, clamped to `[min, max]`, keeping the
    /// image point under `anchor` fixed on screen.
    pub fn zoom_about(&mut self, anchor: ViewportPoint, factor: f64, min: f64, max: f64) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let pinned = self.inverse(anchor);
        self.scale = (self.scale * factor).clamp(min, max);
        self.origin = ViewportPoint::new(
            anchor.x - self.scale * pinned.x,
            anchor.y - self.scale * pinned.y,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    fn close(a: ViewportPoint, b: ViewportPoint) -> bool {
        (a.x - b.x).abs() < EPS && (a.y - b.y).abs() < EPS
    }

    #[test]
    fn round_trip_reproduces_viewport_point() {
        let transforms = [
            ViewportTransform::identity(),
            ViewportTransform::new(ViewportPoint::new(-37.5, 112.25), 0.1).unwrap(),
            ViewportTransform::new(ViewportPoint::new(400.0, -9.0), 3.7).unwrap(),
            ViewportTransform::new(ViewportPoint::new(1.0e4, 2.5e3), 10.0).unwrap(),
        ];
        let points = [
            ViewportPoint::new(0.0, 0.0),
            ViewportPoint::new(123.456, 789.012),
            ViewportPoint::new(-50.0, 3000.5),
        ];
        for t in &transforms {
            for &p in &points {
                assert!(close(t.forward(t.inverse(p)), p), "{t:?} {p:?}");
            }
        }
    }

    #[test]
    fn degenerate_scale_is_rejected() {
        let o = ViewportPoint::new(0.0, 0.0);
        assert!(ViewportTransform::new(o, 0.0).is_none());
        assert!(ViewportTransform::new(o, -1.0).is_none());
        assert!(ViewportTransform::new(o, f64::NAN).is_none());
        assert!(ViewportTransform::new(o, 2.0).is_some());
    }

    #[test]
    fn zoom_keeps_anchor_fixed() {
        let mut t = ViewportTransform::new(ViewportPoint::new(10.0, 20.0), 1.5).unwrap();
        let anchor = ViewportPoint::new(200.0, 150.0);
        let before = t.inverse(anchor);
        t.zoom_about(anchor, 2.0, 0.1, 10.0);
        assert!((t.scale() - 3.0).abs() < EPS);
        assert!(close(t.forward(before), anchor));
    }

    #[test]
    fn zoom_is_clamped() {
        let mut t = ViewportTransform::identity();
        t.zoom_about(ViewportPoint::new(0.0, 0.0), 100.0, 0.1, 10.0);
        assert_eq!(t.scale(), 10.0);
        t.zoom_about(ViewportPoint::new(0.0, 0.0), 1e-6, 0.1, 10.0);
        assert_eq!(t.scale(), 0.1);
    }

    #[test]
    fn pan_moves_origin() {
        let mut t = ViewportTransform::identity();
        t.pan_by(ScreenVec::new(5.0, -3.0));
        assert_eq!(t.origin(), ViewportPoint::new(5.0, -3.0));
        assert_eq!(t.inverse(ViewportPoint::new(5.0, -3.0)), ImagePoint::new(0.0, 0.0));
    }

    #[test]
    fn centered_places_image_in_middle() {
        let t = ViewportTransform::centered(ImageSize::new(100, 50), 300.0, 250.0);
        assert_eq!(t.origin(), ViewportPoint::new(100.0, 100.0));
        assert_eq!(t.scale(), 1.0);
    }

    #[test]
    fn bounds_are_half_open() {
        let size = ImageSize::new(10, 5);
        assert!(size.contains(ImagePoint::new(0.0, 0.0)));
        assert!(size.contains(ImagePoint::new(9.99, 4.99)));
        assert!(!size.contains(ImagePoint::new(10.0, 0.0)));
        assert!(!size.contains(ImagePoint::new(0.0, 5.0)));
        assert!(!size.contains(ImagePoint::new(-0.01, 1.0)));
    }

    #[test]
    fn screen_viewport_offset() {
        let canvas = ScreenPoint::new(12.0, 48.0);
        let p = ScreenPoint::new(100.0, 100.0);
        let v = p.to_viewport(canvas);
        assert_eq!(v, ViewportPoint::new(88.0, 52.0));
        assert_eq!(v.to_screen(canvas), p);
    }
}
