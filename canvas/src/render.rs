//! Rendering: rasterizes a scene into an RGBA image.
//!
//! This is the only module that touches pixels. It receives a read-only
//! [`Scene`] and produces an [`RgbaImage`]; it never mutates engine state. The
//! same output backs on-disk snapshots attached to saved canvas records.
//!
//! Layers, bottom to top: background, ruler grid, committed strokes, the
//! in-progress stroke, shape elements, the provisional shape, labels, and the
//! handles of the selected element. Label text is not rasterized; each label
//! is shown as an anchor marker with an underline sized to its text.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::path::Path;

use image::{ImageFormat, Rgba, RgbaImage};

use crate::camera::Point;
use crate::doc::{ElementId, Label, Pipe, ShapeElement, SketchSnapshot};
use crate::path::Polyline;
use crate::transform;

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const GRID_MINOR: Rgba<u8> = Rgba([236, 238, 242, 255]);
const GRID_MAJOR: Rgba<u8> = Rgba([205, 210, 220, 255]);
const STROKE: Rgba<u8> = Rgba([31, 26, 23, 255]);
const STROKE_IN_PROGRESS: Rgba<u8> = Rgba([120, 120, 120, 255]);
const PIPE: Rgba<u8> = Rgba([36, 90, 160, 255]);
const DOTTED: Rgba<u8> = Rgba([200, 60, 60, 255]);
const PROVISIONAL: Rgba<u8> = Rgba([150, 170, 200, 255]);
const LABEL: Rgba<u8> = Rgba([60, 130, 60, 255]);
const DRAG_HANDLE: Rgba<u8> = Rgba([40, 120, 220, 255]);
const ROTATE_HANDLE: Rgba<u8> = Rgba([240, 150, 30, 255]);

const GRID_MINOR_STEP: u32 = 10;
const GRID_MAJOR_STEP: u32 = 50;
const DASH_ON: f64 = 8.0;
const DASH_OFF: f64 = 6.0;
const HANDLE_RADIUS: f64 = 6.0;
const LABEL_CHAR_WIDTH: f64 = 6.0;

/// Read-only input for one frame.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub snapshot: SketchSnapshot,
    pub selected_id: Option<ElementId>,
    pub provisional: Option<ShapeElement>,
}

/// Output size and decoration switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub width: u32,
    pub height: u32,
    /// Draw the background ruler grid.
    pub grid: bool,
    /// Stroke thickness in pixels.
    pub stroke_width: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { width: 1024, height: 600, grid: true, stroke_width: 2 }
    }
}

/// Draw `scene` into a new image.
#[must_use]
pub fn rasterize(scene: &Scene, opts: &RenderOptions) -> RgbaImage {
    let mut img = RgbaImage::from_pixel(opts.width, opts.height, BACKGROUND);
    if opts.grid {
        draw_grid(&mut img);
    }

    let snap = &scene.snapshot;
    for segment in snap.paths.iter() {
        if let Some(line) = segment.path.polyline() {
            draw_polyline(&mut img, line, STROKE, opts.stroke_width);
        }
    }
    if let Some(line) = &snap.current_path {
        draw_polyline(&mut img, line, STROKE_IN_PROGRESS, opts.stroke_width);
    }

    for element in snap.elements.iter() {
        draw_element(&mut img, element, None, opts.stroke_width);
    }
    if let Some(shape) = &scene.provisional {
        draw_element(&mut img, shape, Some(PROVISIONAL), opts.stroke_width);
    }

    for label in snap.labels.iter() {
        draw_label(&mut img, label);
    }

    if let Some(handles) = scene
        .selected_id
        .and_then(|id| snap.elements.iter().find(|e| e.id() == id))
        .and_then(transform::handles)
    {
        fill_circle(&mut img, handles.drag, HANDLE_RADIUS, DRAG_HANDLE);
        fill_circle(&mut img, handles.rotate, HANDLE_RADIUS, ROTATE_HANDLE);
    }

    img
}

/// Rasterize `scene` and write it to `path` as PNG.
///
/// # Errors
///
/// Returns the encoder or I/O error if the file cannot be written.
pub fn save_png(scene: &Scene, opts: &RenderOptions, path: &Path) -> Result<(), image::ImageError> {
    rasterize(scene, opts).save_with_format(path, ImageFormat::Png)
}

// =============================================================
// Layers
// =============================================================

fn draw_grid(img: &mut RgbaImage) {
    let (w, h) = img.dimensions();
    for x in (0..w).step_by(GRID_MINOR_STEP as usize) {
        let color = if x % GRID_MAJOR_STEP == 0 { GRID_MAJOR } else { GRID_MINOR };
        for y in 0..h {
            img.put_pixel(x, y, color);
        }
    }
    for y in (0..h).step_by(GRID_MINOR_STEP as usize) {
        let color = if y % GRID_MAJOR_STEP == 0 { GRID_MAJOR } else { GRID_MINOR };
        for x in 0..w {
            // Major verticals stay on top of minor horizontals.
            if img.get_pixel(x, y) != &GRID_MAJOR {
                img.put_pixel(x, y, color);
            }
        }
    }
}

fn draw_polyline(img: &mut RgbaImage, line: &Polyline, color: Rgba<u8>, width: u32) {
    for pair in line.points().windows(2) {
        draw_line(img, pair[0], pair[1], color, width);
    }
}

fn draw_element(img: &mut RgbaImage, element: &ShapeElement, tint: Option<Rgba<u8>>, width: u32) {
    match element {
        ShapeElement::Pipe(p) => draw_pipe(img, p, tint.unwrap_or(PIPE), width),
        ShapeElement::DottedLine(l) => {
            let (a, b) = l.effective_endpoints();
            draw_dashed_line(img, a, b, tint.unwrap_or(DOTTED), width);
        }
    }
}

fn draw_pipe(img: &mut RgbaImage, p: &Pipe, color: Rgba<u8>, width: u32) {
    let c = p.center();
    let (hw, hh) = (p.width / 2.0, p.height / 2.0);
    let corners = [
        Point::new(c.x - hw, c.y - hh),
        Point::new(c.x + hw, c.y - hh),
        Point::new(c.x + hw, c.y + hh),
        Point::new(c.x - hw, c.y + hh),
    ]
    .map(|corner| corner.rotate_about(c, p.rotation));
    for i in 0..corners.len() {
        draw_line(img, corners[i], corners[(i + 1) % corners.len()], color, width);
    }
    // Center line marks the pipe's run.
    let run_a = Point::new(c.x - hw, c.y).rotate_about(c, p.rotation);
    let run_b = Point::new(c.x + hw, c.y).rotate_about(c, p.rotation);
    draw_line(img, run_a, run_b, color, 1);
}

fn draw_label(img: &mut RgbaImage, label: &Label) {
    let anchor = Point::new(label.x, label.y);
    fill_circle(img, anchor, 3.0, LABEL);
    #[allow(clippy::cast_precision_loss)]
    let underline = LABEL_CHAR_WIDTH * label.text.chars().count() as f64;
    let base = anchor.add(Point::new(0.0, 4.0));
    draw_line(img, base, base.add(Point::new(underline, 0.0)), LABEL, 1);
}

// =============================================================
// Primitives
// =============================================================

fn draw_dashed_line(img: &mut RgbaImage, a: Point, b: Point, color: Rgba<u8>, width: u32) {
    let len = a.distance(b);
    if len <= f64::EPSILON {
        return;
    }
    let dir = b.sub(a).scale(1.0 / len);
    let mut t = 0.0;
    while t < len {
        let end = (t + DASH_ON).min(len);
        draw_line(img, a.add(dir.scale(t)), a.add(dir.scale(end)), color, width);
        t += DASH_ON + DASH_OFF;
    }
}

fn draw_line(img: &mut RgbaImage, a: Point, b: Point, color: Rgba<u8>, width: u32) {
    let steps = a.distance(b).ceil().max(1.0);
    let mut i = 0.0;
    while i <= steps {
        let t = i / steps;
        stamp(img, a.add(b.sub(a).scale(t)), color, width);
        i += 1.0;
    }
}

/// Paint a `width`-sized square centred on `p`, clipped to the image.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_possible_wrap)]
fn stamp(img: &mut RgbaImage, p: Point, color: Rgba<u8>, width: u32) {
    let half = i64::from(width.max(1)) / 2;
    let cx = p.x.round() as i64;
    let cy = p.y.round() as i64;
    let size = i64::from(width.max(1));
    for dy in 0..size {
        for dx in 0..size {
            put(img, cx - half + dx, cy - half + dy, color);
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn fill_circle(img: &mut RgbaImage, center: Point, radius: f64, color: Rgba<u8>) {
    let r = radius.ceil() as i64;
    let cx = center.x.round() as i64;
    let cy = center.y.round() as i64;
    for dy in -r..=r {
        for dx in -r..=r {
            #[allow(clippy::cast_precision_loss)]
            let inside = ((dx * dx + dy * dy) as f64) <= radius * radius;
            if inside {
                put(img, cx + dx, cy + dy, color);
            }
        }
    }
}

fn put(img: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>) {
    let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) else {
        return;
    };
    if x < img.width() && y < img.height() {
        img.put_pixel(x, y, color);
    }
}
