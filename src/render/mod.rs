//! Raster rendering of the visible tunnel slice
//!
//! `paint` is a pure function of its inputs: it fills the surface with rock,
//! rasterizes the tunnel interior scanline by scanline (the raster
//! equivalent of walking the wall offsets down one side and up the other as
//! a single closed polygon), and stamps the drone marker on top. The
//! `sub_offset` argument shifts every boundary vertically so scrolling is
//! continuous rather than stepping by whole segments.

use crate::game::{WallSegment, CENTER_X, DRONE_SIZE, DRONE_TOP_Y, SEGMENT_HEIGHT};

/// Packed RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Surrounding rock
pub const ROCK: Rgb = Rgb(0x80, 0x80, 0x80);
/// Tunnel interior
pub const TUNNEL: Rgb = Rgb(0xff, 0xff, 0xff);
/// Drone marker
pub const DRONE: Rgb = Rgb(0xff, 0x00, 0x00);

/// Fixed-size RGB pixel buffer
#[derive(Debug, Clone)]
pub struct Surface {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
}

impl Surface {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![ROCK; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn fill(&mut self, color: Rgb) {
        self.pixels.fill(color);
    }

    pub fn set(&mut self, x: i32, y: i32, color: Rgb) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.pixels[y as usize * self.width + x as usize] = color;
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Rgb {
        self.pixels[y * self.width + x]
    }

    /// Fill one horizontal span, clipped to the surface
    fn fill_span(&mut self, y: usize, x_start: f64, x_end: f64, color: Rgb) {
        let start = x_start.max(0.0) as usize;
        let end = (x_end.min(self.width as f64)).max(0.0) as usize;
        for x in start..end {
            self.pixels[y * self.width + x] = color;
        }
    }
}

/// Paint the visible tunnel slice and the drone marker.
///
/// `visible` starts at the leading-edge segment; `sub_offset` is the scroll
/// offset remainder modulo the segment height; `drone_x` is the drone's left
/// edge.
pub fn paint(surface: &mut Surface, visible: &[WallSegment], sub_offset: f64, drone_x: f64) {
    surface.fill(ROCK);

    if !visible.is_empty() {
        for y in 0..surface.height() {
            let pos = (y as f64 + sub_offset) / SEGMENT_HEIGHT;
            let index = pos.floor() as usize;
            if index >= visible.len() {
                break;
            }
            let t = pos - index as f64;

            // Interpolate toward the next segment; hold at the last one.
            let a = visible[index];
            let b = visible.get(index + 1).copied().unwrap_or(a);
            let left = a.left + (b.left - a.left) * t;
            let right = a.right + (b.right - a.right) * t;

            surface.fill_span(y, CENTER_X + left, CENTER_X + right, TUNNEL);
        }
    }

    draw_drone(surface, drone_x);
}

/// Downward-pointing triangle, apex at the bottom center
fn draw_drone(surface: &mut Surface, drone_x: f64) {
    let size = DRONE_SIZE as i32;
    let top = DRONE_TOP_Y as i32;
    let x0 = drone_x as i32;

    for dy in 0..size {
        // Row width shrinks linearly to the apex.
        let half = (size as f64 / 2.0) * (1.0 - dy as f64 / size as f64);
        let center = x0 as f64 + DRONE_SIZE / 2.0;
        let start = (center - half) as i32;
        let end = (center + half).ceil() as i32;
        for x in start..end {
            surface.set(x, top + dy, DRONE);
        }
    }
}
