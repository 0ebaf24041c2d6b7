use image::{ImageBuffer, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};
use log::warn;
use migration_common::{Cell, Ecm, Fibre, OrderedPair};
use palette::{FromColor, Hsv, Srgb};
use rand::prelude::*;
use rand::seq::SliceRandom;

// Color definitions for named colors (RGBA format)
const COLOR_MAP: &[(&str, [u8; 4])] = &[
    ("black", [0, 0, 0, 255]),
    ("white", [255, 255, 255, 255]),
    ("red", [255, 0, 0, 255]),
    ("green", [0, 255, 0, 255]),
    ("blue", [0, 0, 255, 255]),
    ("yellow", [255, 255, 0, 255]),
    ("cyan", [0, 255, 255, 255]),
    ("magenta", [255, 0, 255, 255]),
    ("grey", [128, 128, 128, 255]),
];

/// Parse a color name to RGBA values
pub fn parse_color(color_name: &str) -> [u8; 4] {
    for &(name, color) in COLOR_MAP {
        if name.eq_ignore_ascii_case(color_name) {
            return color;
        }
    }
    warn!("Color '{}' not recognized, using black.", color_name);
    [0, 0, 0, 255]
}

/// One color per cell label, spread over the hue circle with a little
/// saturation/value jitter and shuffled so that neighboring labels differ.
/// The same seed always yields the same palette.
pub fn generate_color_palette(count: usize, seed: u64) -> Vec<[u8; 4]> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut colors: Vec<[u8; 4]> = (0..count)
        .map(|i| {
            let hue = i as f32 / count as f32;
            let saturation: f32 = 0.7 + rng.random_range(-0.1..0.1);
            let value: f32 = 0.8 + rng.random_range(-0.1..0.1);
            let rgb = Srgb::from_color(Hsv::new(hue * 360.0, saturation, value));
            [
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
                255,
            ]
        })
        .collect();
    colors.shuffle(&mut rng);
    colors
}

/// Everything needed to turn an ECM into a frame.
#[derive(Debug, Clone)]
pub struct FrameStyle {
    /// Frame side in pixels; the domain is square.
    pub canvas_width: u32,
    /// Multiplier on the drawn cell radius.
    pub scaling_factor: f64,
    pub background: [u8; 4],
    pub fibre_color: [u8; 4],
    /// Indexed by `label - 1`, wrapping around.
    pub cell_colors: Vec<[u8; 4]>,
}

impl FrameStyle {
    fn cell_color(&self, cell: &Cell) -> Rgba<u8> {
        if self.cell_colors.is_empty() {
            return Rgba([0, 0, 0, 255]);
        }
        let index = (cell.label.saturating_sub(1) as usize) % self.cell_colors.len();
        Rgba(self.cell_colors[index])
    }
}

/// Domain coordinates to pixel coordinates; `y` grows upward in the domain.
fn to_pixel(point: OrderedPair, pixels_per_unit: f64, canvas: f64) -> (f32, f32) {
    (
        (point.x * pixels_per_unit) as f32,
        (canvas - point.y * pixels_per_unit) as f32,
    )
}

fn draw_fibre(image: &mut RgbaImage, fibre: &Fibre, pixels_per_unit: f64, canvas: f64, color: Rgba<u8>) {
    let (e1, e2) = fibre.endpoints();
    let start = to_pixel(e1, pixels_per_unit, canvas);
    let end = to_pixel(e2, pixels_per_unit, canvas);

    // Thick fibres are drawn as parallel strokes along the unit normal.
    let strokes = (fibre.width * pixels_per_unit).round().max(1.0) as i32;
    let (dx, dy) = (end.0 - start.0, end.1 - start.1);
    let length = (dx * dx + dy * dy).sqrt().max(f32::EPSILON);
    let (nx, ny) = (-dy / length, dx / length);
    for k in 0..strokes {
        let offset = k as f32 - (strokes - 1) as f32 / 2.0;
        draw_line_segment_mut(
            image,
            (start.0 + nx * offset, start.1 + ny * offset),
            (end.0 + nx * offset, end.1 + ny * offset),
            color,
        );
    }
}

/// Renders one generation: fibres as line segments, then cells as filled
/// circles on top.
pub fn draw_frame(ecm: &Ecm, style: &FrameStyle) -> RgbaImage {
    let canvas = style.canvas_width as f64;
    let pixels_per_unit = canvas / ecm.matrix.width;
    let mut image = ImageBuffer::from_pixel(style.canvas_width, style.canvas_width, Rgba(style.background));

    let fibre_color = Rgba(style.fibre_color);
    for fibre in &ecm.fibres {
        draw_fibre(&mut image, fibre, pixels_per_unit, canvas, fibre_color);
    }

    for cell in &ecm.cells {
        let (x, y) = to_pixel(cell.position, pixels_per_unit, canvas);
        let radius = (style.scaling_factor * cell.radius * pixels_per_unit).round().max(1.0) as i32;
        draw_filled_circle_mut(&mut image, (x.round() as i32, y.round() as i32), radius, style.cell_color(cell));
    }

    image
}
