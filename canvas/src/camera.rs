//! Canvas-local points and the screen-to-canvas camera.

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use serde::{Deserialize, Serialize};

/// A point in either screen or canvas-local space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Component-wise offset from `other` to `self`.
    #[must_use]
    pub fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }

    #[must_use]
    pub fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }

    #[must_use]
    pub fn scale(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    /// Midpoint between `self` and `other`.
    #[must_use]
    pub fn midpoint(self, other: Self) -> Self {
        Self::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Rotate `self` about `pivot` by `radians` (positive is clockwise in
    /// y-down screen space).
    #[must_use]
    pub fn rotate_about(self, pivot: Self, radians: f64) -> Self {
        let (sin, cos) = radians.sin_cos();
        let d = self.sub(pivot);
        Self::new(pivot.x + d.x * cos - d.y * sin, pivot.y + d.x * sin + d.y * cos)
    }
}

/// Surface transform applied to raw input before it reaches the router.
///
/// `pan_x` / `pan_y` are the translation deltas inherited from the host view,
/// in screen pixels. `zoom` is a scale factor (1.0 = no zoom).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub pan_x: f64,
    pub pan_y: f64,
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self { pan_x: 0.0, pan_y: 0.0, zoom: 1.0 }
    }
}

impl Camera {
    /// Convert a screen-space point to canvas-local coordinates.
    #[must_use]
    pub fn screen_to_canvas(&self, screen: Point) -> Point {
        Point {
            x: (screen.x - self.pan_x) / self.zoom,
            y: (screen.y - self.pan_y) / self.zoom,
        }
    }

    /// Finite pan and a finite, positive zoom. Anything else would map input
    /// points to non-finite coordinates.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.pan_x.is_finite() && self.pan_y.is_finite() && self.zoom.is_finite() && self.zoom > 0.0
    }
}
