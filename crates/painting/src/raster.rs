//! CPU raster surface - 8-bit RGBA storage with round-capped line stroking

use std::io::Cursor;

use thiserror::Error;
use tracing::debug;

use crate::surface::DisplaySurface;
use crate::types::{CanvasPoint, Color};

#[derive(Debug, Error)]
pub enum RasterError {
    #[error("Pixel buffer does not match {width}x{height}")]
    BufferSize { width: u32, height: u32 },
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// An 8-bit straight-alpha RGBA surface that implements [`DisplaySurface`].
///
/// Used to produce the revealed drawing outside the browser, e.g. to hand a
/// PNG to the scoring collaborator. Lines are stroked as capsules (round caps
/// and joins) with one pixel of anti-aliasing.
pub struct RasterSurface {
    /// Surface dimensions
    pub width: u32,
    pub height: u32,
    /// Pixel data in row-major order
    pixels: Vec<[u8; 4]>,
    /// Sub-paths of the current path
    path: Vec<Vec<CanvasPoint>>,
    /// First uncommitted segment of the current path as
    /// `(sub-path index, start point index)`
    cursor: (usize, usize),
    /// Scratch coverage buffer, one entry per pixel
    coverage: Vec<f32>,
    /// Coverage already blended by the current path, one entry per pixel
    applied: Vec<f32>,
    /// Pixels with non-zero `applied`
    touched: Vec<usize>,
}

impl RasterSurface {
    /// Create a new surface, initialized to transparent black
    pub fn new(width: u32, height: u32) -> Self {
        let pixel_count = (width as usize) * (height as usize);
        Self {
            width,
            height,
            pixels: vec![[0, 0, 0, 0]; pixel_count],
            path: Vec::new(),
            cursor: (0, 0),
            coverage: vec![0.0; pixel_count],
            applied: vec![0.0; pixel_count],
            touched: Vec::new(),
        }
    }

    /// Get a pixel at the given coordinates
    /// Returns None if coordinates are out of bounds
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[self.index(x, y)])
    }

    /// Raw RGBA bytes, row-major
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Number of pixels with non-zero alpha
    pub fn painted_pixel_count(&self) -> usize {
        self.pixels.iter().filter(|p| p[3] > 0).count()
    }

    /// Copy into an `image` buffer
    pub fn to_image(&self) -> Result<image::RgbaImage, RasterError> {
        image::RgbaImage::from_raw(self.width, self.height, self.as_bytes().to_vec()).ok_or(
            RasterError::BufferSize {
                width: self.width,
                height: self.height,
            },
        )
    }

    /// Encode the surface as PNG
    pub fn to_png(&self) -> Result<Vec<u8>, RasterError> {
        let mut cursor = Cursor::new(Vec::new());
        self.to_image()?
            .write_to(&mut cursor, image::ImageFormat::Png)?;
        Ok(cursor.into_inner())
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.width as usize) + (x as usize)
    }

    /// Straight-alpha "source over" compositing
    #[inline]
    fn blend_pixel(&mut self, index: usize, color: [f32; 4], alpha: f32) {
        let dst = self.pixels[index];
        let dst_a = dst[3] as f32 / 255.0;
        let src_a = (color[3] * alpha).clamp(0.0, 1.0);
        let out_a = src_a + dst_a * (1.0 - src_a);
        if out_a <= 0.0 {
            return;
        }

        let channel = |i: usize| {
            let dst_c = dst[i] as f32 / 255.0;
            let out = (color[i] * src_a + dst_c * dst_a * (1.0 - src_a)) / out_a;
            (out * 255.0).round().clamp(0.0, 255.0) as u8
        };
        self.pixels[index] = [
            channel(0),
            channel(1),
            channel(2),
            (out_a * 255.0).round() as u8,
        ];
    }

    /// Accumulate capsule coverage for one segment into the scratch buffer.
    /// Returns the touched bounding box `(x0, y0, x1, y1)`, exclusive max.
    fn cover_segment(&mut self, a: CanvasPoint, b: CanvasPoint, radius: f32) -> Option<(u32, u32, u32, u32)> {
        let reach = radius + 1.0;
        let x_min = (a.x.min(b.x) - reach).floor().max(0.0) as u32;
        let y_min = (a.y.min(b.y) - reach).floor().max(0.0) as u32;
        let x_max = ((a.x.max(b.x) + reach).ceil().max(0.0) as u32).min(self.width);
        let y_max = ((a.y.max(b.y) + reach).ceil().max(0.0) as u32).min(self.height);

        if x_min >= x_max || y_min >= y_max {
            return None;
        }

        let abx = b.x - a.x;
        let aby = b.y - a.y;
        let len_sq = abx * abx + aby * aby;

        for py in y_min..y_max {
            for px in x_min..x_max {
                let cx = px as f32 + 0.5;
                let cy = py as f32 + 0.5;
                let t = if len_sq > 0.0 {
                    (((cx - a.x) * abx + (cy - a.y) * aby) / len_sq).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let dx = cx - (a.x + t * abx);
                let dy = cy - (a.y + t * aby);
                let dist = (dx * dx + dy * dy).sqrt();
                let cov = (radius + 0.5 - dist).clamp(0.0, 1.0);
                if cov > 0.0 {
                    let index = self.index(px, py);
                    if cov > self.coverage[index] {
                        self.coverage[index] = cov;
                    }
                }
            }
        }

        Some((x_min, y_min, x_max, y_max))
    }
}

impl DisplaySurface for RasterSurface {
    fn clear(&mut self) {
        self.pixels.fill([0, 0, 0, 0]);
    }

    fn begin_path(&mut self) {
        self.path.clear();
        self.cursor = (0, 0);
        for index in self.touched.drain(..) {
            self.applied[index] = 0.0;
        }
    }

    fn move_to(&mut self, x: f32, y: f32) {
        self.path.push(vec![CanvasPoint::new(x, y)]);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        match self.path.last_mut() {
            Some(sub_path) => sub_path.push(CanvasPoint::new(x, y)),
            // A line with no current point behaves like move_to
            None => self.path.push(vec![CanvasPoint::new(x, y)]),
        }
    }

    fn stroke_path(&mut self, color: Color, width: f32, opacity: f32) {
        if width <= 0.0 || opacity <= 0.0 {
            return;
        }
        let radius = width / 2.0;

        let mut bounds: Option<(u32, u32, u32, u32)> = None;
        let mut fresh = 0;
        let (first_sub, first_point) = self.cursor;
        for sub in first_sub..self.path.len() {
            let start = if sub == first_sub { first_point } else { 0 };
            for i in start..self.path[sub].len().saturating_sub(1) {
                let (a, b) = (self.path[sub][i], self.path[sub][i + 1]);
                fresh += 1;
                if let Some(bb) = self.cover_segment(a, b, radius) {
                    bounds = Some(match bounds {
                        Some(cur) => (cur.0.min(bb.0), cur.1.min(bb.1), cur.2.max(bb.2), cur.3.max(bb.3)),
                        None => bb,
                    });
                }
            }
        }
        if let Some(last) = self.path.last() {
            self.cursor = (self.path.len() - 1, last.len().saturating_sub(1));
        }
        if fresh == 0 {
            return;
        }

        let Some((x0, y0, x1, y1)) = bounds else {
            debug!("stroke_path: path outside surface bounds");
            return;
        };

        let rgba = color.to_rgba_f32(1.0);
        for py in y0..y1 {
            for px in x0..x1 {
                let index = self.index(px, py);
                let cov = std::mem::take(&mut self.coverage[index]);
                let prev = self.applied[index];
                if cov <= prev {
                    continue;
                }
                if prev == 0.0 {
                    self.touched.push(index);
                }
                self.applied[index] = cov;
                // Top the pixel up from `prev` to `cov` so joints between
                // commits of one path are not blended twice
                let before = prev * opacity;
                if before < 1.0 {
                    self.blend_pixel(index, rgba, (cov * opacity - before) / (1.0 - before));
                }
            }
        }
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn set_size(&mut self, width: u32, height: u32) {
        *self = RasterSurface::new(width, height);
    }
}
