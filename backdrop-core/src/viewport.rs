/// Width/height of the drawing surface in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

impl ViewportSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height. A zero height is treated as 1 so the projection stays finite.
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    /// Distance from the center to the right and bottom edges
    pub fn half_extents(&self) -> (f32, f32) {
        (self.width as f32 / 2.0, self.height as f32 / 2.0)
    }
}

impl Default for ViewportSize {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

/// Clamp a device pixel ratio to `[1, max]`
pub fn capped_pixel_ratio(device_ratio: f64, max: f64) -> f64 {
    if device_ratio.is_finite() {
        device_ratio.clamp(1.0, max)
    } else {
        1.0
    }
}
