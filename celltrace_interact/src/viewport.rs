// Copyright 2025 the Celltrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canvas pixels to frame-normalized coordinates, and zoom.

use kurbo::{Point, Rect, Size, Vec2};

/// Factor applied by one zoom step.
pub const ZOOM_STEP: f64 = 1.5;
/// Smallest zoom; the whole frame is visible.
pub const MIN_ZOOM: f64 = 1.0;
/// Largest zoom.
pub const MAX_ZOOM: f64 = 50.0;

/// Region size assumed by [`Viewport::zoom_to_point`] when the frame has no regions.
const FALLBACK_REGION_SIZE: f64 = 0.01;

/// Maps canvas pixels to frame-normalized coordinates.
///
/// The canvas shows a square of side `1 / zoom` in normalized units, centered on
/// [`center`](Self::center). A pixel `px` maps to
/// `center + (px - size / 2) / (zoom * size)` on each axis.
///
/// ```
/// use celltrace_interact::Viewport;
/// use kurbo::{Point, Size};
///
/// let mut vp = Viewport::new(Size::new(400.0, 400.0));
/// assert_eq!(vp.to_normalized(Point::new(200.0, 100.0)), Point::new(0.5, 0.25));
///
/// vp.zoom_in();
/// assert_eq!(vp.zoom(), 1.5);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Viewport {
    size: Size,
    zoom: f64,
    center: Point,
}

impl Viewport {
    /// A viewport over a canvas of `size` pixels showing the whole frame.
    ///
    /// Dimensions below one pixel are raised to one.
    pub fn new(size: Size) -> Self {
        Self {
            size: clamp_size(size),
            zoom: MIN_ZOOM,
            center: Point::new(0.5, 0.5),
        }
    }

    /// Canvas size in pixels.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Change the canvas size, keeping zoom and center.
    pub fn set_size(&mut self, size: Size) {
        self.size = clamp_size(size);
    }

    /// Current zoom factor.
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Normalized point at the middle of the canvas.
    pub fn center(&self) -> Point {
        self.center
    }

    /// Move the view so `center` is in the middle of the canvas.
    pub fn set_center(&mut self, center: Point) {
        self.center = center;
    }

    /// Convert a canvas pixel position to frame-normalized coordinates.
    pub fn to_normalized(&self, px: Point) -> Point {
        Point::new(
            self.center.x + (px.x - self.size.width * 0.5) / (self.zoom * self.size.width),
            self.center.y + (px.y - self.size.height * 0.5) / (self.zoom * self.size.height),
        )
    }

    /// Convert a frame-normalized point to a canvas pixel position.
    pub fn to_canvas(&self, p: Point) -> Point {
        Point::new(
            (p.x - self.center.x) * self.zoom * self.size.width + self.size.width * 0.5,
            (p.y - self.center.y) * self.zoom * self.size.height + self.size.height * 0.5,
        )
    }

    /// Scale a normalized point to canvas pixels at zoom 1, ignoring the view center.
    ///
    /// Distances between scaled points are the distances handle picking compares
    /// against a radius already divided by the zoom.
    pub fn to_frame_pixels(&self, p: Point) -> Point {
        Point::new(p.x * self.size.width, p.y * self.size.height)
    }

    /// The normalized rectangle currently on screen.
    pub fn visible_rect(&self) -> Rect {
        let half = 0.5 / self.zoom;
        Rect::new(
            self.center.x - half,
            self.center.y - half,
            self.center.x + half,
            self.center.y + half,
        )
    }

    /// Set the zoom, clamped to [`MIN_ZOOM`]..=[`MAX_ZOOM`].
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = if zoom.is_nan() {
            MIN_ZOOM
        } else {
            zoom.clamp(MIN_ZOOM, MAX_ZOOM)
        };
    }

    /// Zoom in by one step.
    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom * ZOOM_STEP);
    }

    /// Zoom out by one step.
    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom / ZOOM_STEP);
    }

    /// Zoom by a number of wheel steps; positive zooms in.
    pub fn zoom_steps(&mut self, steps: i32) {
        self.set_zoom(self.zoom * ZOOM_STEP.powi(steps));
    }

    /// Center on `bounds` and zoom so its larger side fills half the canvas.
    pub fn zoom_to_region(&mut self, bounds: Rect) {
        self.center = bounds.center();
        self.set_zoom(0.5 / bounds.width().max(bounds.height()));
    }

    /// Center on `p` and zoom as [`zoom_to_region`](Self::zoom_to_region) would for a
    /// region of `mean_size` (width, height), or of side 0.01 when `None`.
    pub fn zoom_to_point(&mut self, p: Point, mean_size: Option<(f64, f64)>) {
        let side = mean_size.map_or(FALLBACK_REGION_SIZE, |(w, h)| w.max(h));
        self.center = p;
        self.set_zoom(0.5 / side);
    }

    /// Set the center to `origin` moved against a pixel drag of `delta`, so the
    /// content follows the pointer.
    pub fn pan_from(&mut self, origin: Point, delta: Vec2) {
        self.center = Point::new(
            origin.x - delta.x / (self.zoom * self.size.width),
            origin.y - delta.y / (self.zoom * self.size.height),
        );
    }

    /// Show the whole frame again.
    pub fn reset(&mut self) {
        self.zoom = MIN_ZOOM;
        self.center = Point::new(0.5, 0.5);
    }
}

fn clamp_size(size: Size) -> Size {
    Size::new(size.width.max(1.0), size.height.max(1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_mapping_round_trips_at_zoom() {
        let mut vp = Viewport::new(Size::new(400.0, 200.0));
        vp.set_zoom(2.0);
        let n = vp.to_normalized(Point::new(300.0, 100.0));
        assert_eq!(n, Point::new(0.625, 0.5));
        assert_eq!(vp.to_canvas(n), Point::new(300.0, 100.0));
        assert_eq!(vp.visible_rect(), Rect::new(0.25, 0.25, 0.75, 0.75));
    }

    #[test]
    fn zoom_steps_are_clamped() {
        let mut vp = Viewport::new(Size::new(100.0, 100.0));
        vp.zoom_out();
        assert_eq!(vp.zoom(), MIN_ZOOM);
        vp.zoom_in();
        vp.zoom_in();
        assert_eq!(vp.zoom(), 2.25);
        vp.zoom_steps(20);
        assert_eq!(vp.zoom(), MAX_ZOOM);
        vp.zoom_steps(-40);
        assert_eq!(vp.zoom(), MIN_ZOOM);
    }

    #[test]
    fn zoom_to_region_uses_larger_side() {
        let mut vp = Viewport::new(Size::new(100.0, 100.0));
        vp.zoom_to_region(Rect::new(0.25, 0.25, 0.5, 0.375));
        assert_eq!(vp.zoom(), 2.0);
        assert_eq!(vp.center(), Point::new(0.375, 0.3125));

        // A degenerate box zooms as far as allowed.
        vp.zoom_to_region(Rect::new(0.5, 0.5, 0.5, 0.5));
        assert_eq!(vp.zoom(), MAX_ZOOM);
    }

    #[test]
    fn zoom_to_point_uses_mean_size() {
        let mut vp = Viewport::new(Size::new(100.0, 100.0));
        vp.zoom_to_point(Point::new(0.25, 0.75), Some((0.125, 0.0625)));
        assert_eq!(vp.zoom(), 4.0);
        assert_eq!(vp.center(), Point::new(0.25, 0.75));

        vp.zoom_to_point(Point::new(0.5, 0.5), None);
        assert!((vp.zoom() - MAX_ZOOM).abs() < 1e-9);

        vp.reset();
        assert_eq!(vp.zoom(), MIN_ZOOM);
        assert_eq!(vp.center(), Point::new(0.5, 0.5));
    }

    #[test]
    fn pan_follows_pointer() {
        let mut vp = Viewport::new(Size::new(200.0, 100.0));
        vp.set_zoom(2.0);
        let origin = vp.center();
        vp.pan_from(origin, Vec2::new(100.0, -50.0));
        assert_eq!(vp.center(), Point::new(0.25, 0.75));
    }
}
