//! Drawing-surface dimensions

use serde::{Deserialize, Serialize};

/// Size of the drawing surface in CSS pixels plus its device-pixel scale
///
/// The backing store is `css * pixel_ratio` pixels, never smaller than 1x1.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSize {
    pub css_width: f32,
    pub css_height: f32,
    pub pixel_ratio: f32,
}

impl Default for SurfaceSize {
    fn default() -> Self {
        Self::new(1920.0, 1080.0, 1.0)
    }
}

impl SurfaceSize {
    /// Create a new surface size
    #[inline]
    pub const fn new(css_width: f32, css_height: f32, pixel_ratio: f32) -> Self {
        Self {
            css_width,
            css_height,
            pixel_ratio,
        }
    }

    /// Measure from a viewport, capping the device pixel ratio
    pub fn from_viewport(css_width: f32, css_height: f32, device_pixel_ratio: f32, max_ratio: f32) -> Self {
        let ratio = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
            device_pixel_ratio.min(max_ratio.max(1.0))
        } else {
            1.0
        };
        Self::new(css_width.max(0.0), css_height.max(0.0), ratio)
    }

    /// Lower the pixel ratio until neither backing-store side exceeds `max_dimension`
    ///
    /// The CSS size is kept, so pointer mapping is unaffected.
    pub fn limit_to(self, max_dimension: u32) -> Self {
        let max = max_dimension.max(1) as f32 - 0.5;
        let longest = self.css_width.max(self.css_height);
        if !longest.is_finite() || longest * self.pixel_ratio <= max {
            return self;
        }
        Self::new(self.css_width, self.css_height, self.pixel_ratio.min(max / longest))
    }

    /// Backing-store width in device pixels
    #[inline]
    pub fn width(self) -> u32 {
        Self::to_pixels(self.css_width * self.pixel_ratio)
    }

    /// Backing-store height in device pixels
    #[inline]
    pub fn height(self) -> u32 {
        Self::to_pixels(self.css_height * self.pixel_ratio)
    }

    /// Get aspect ratio (width / height) of the backing store
    #[inline]
    pub fn aspect_ratio(self) -> f32 {
        self.width() as f32 / self.height() as f32
    }

    /// Resolution uniform value: `[width, height, aspect]`
    #[inline]
    pub fn resolution(self) -> [f32; 3] {
        [self.width() as f32, self.height() as f32, self.aspect_ratio()]
    }

    fn to_pixels(v: f32) -> u32 {
        if v.is_finite() {
            (v.round() as u32).max(1)
        } else {
            1
        }
    }
}
