//! CPU rasterization into an RGBA image.
//!
//! [`RasterSurface`] behaves like a transparent 2D canvas: `clear` erases to
//! transparent, shapes are anti-aliased by pixel coverage and composited with
//! source-over in straight alpha. Glowing lines get a soft quadratic halo out
//! to `width / 2 + glow` pixels from the stroke's center line.

use glam::{UVec2, Vec2};
use image::{Rgba, RgbaImage};

use crate::color::Color;
use crate::stage::ContainerId;
use crate::surface::{DotStyle, LineStyle, Surface, SurfaceFactory};

/// Peak alpha of the glow halo relative to the stroke.
const GLOW_STRENGTH: f32 = 0.45;

/// An in-memory canvas.
#[derive(Debug, Clone)]
pub struct RasterSurface {
    image: RgbaImage,
}

impl RasterSurface {
    pub fn new(size: UVec2) -> Self {
        Self {
            image: RgbaImage::new(size.x, size.y),
        }
    }

    /// The pixels, straight (non-premultiplied) alpha.
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Flatten onto an opaque background, as the page behind the canvas would.
    pub fn composite_over(&self, background: Color) -> RgbaImage {
        let [r, g, b, _] = background.to_rgba8();
        let (w, h) = self.image.dimensions();
        let mut out = RgbaImage::from_pixel(w, h, Rgba([r, g, b, 255]));
        for (dst, src) in out.pixels_mut().zip(self.image.pixels()) {
            let alpha = src[3] as f32 / 255.0;
            for c in 0..3 {
                let blended = src[c] as f32 * alpha + dst[c] as f32 * (1.0 - alpha);
                dst[c] = blended.round() as u8;
            }
        }
        out
    }

    /// Composite `color` onto one pixel with coverage `alpha`.
    fn blend(&mut self, x: u32, y: u32, color: Color, alpha: f32) {
        if alpha <= 0.0 {
            return;
        }
        let src_a = (color.a * alpha).clamp(0.0, 1.0);
        let dst = self.image.get_pixel_mut(x, y);
        let dst_a = dst[3] as f32 / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);
        if out_a <= 0.0 {
            return;
        }
        let src = [color.r, color.g, color.b];
        for c in 0..3 {
            let d = dst[c] as f32 / 255.0;
            let v = (src[c] * src_a + d * dst_a * (1.0 - src_a)) / out_a;
            dst[c] = (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        }
        dst[3] = (out_a * 255.0).round() as u8;
    }

    /// Pixel rows/columns touched by a box around `min..max`, clipped to the image.
    fn clip(&self, min: Vec2, max: Vec2) -> Option<(u32, u32, u32, u32)> {
        let (w, h) = self.image.dimensions();
        if w == 0 || h == 0 || !(min.is_finite() && max.is_finite()) {
            return None;
        }
        let x0 = min.x.floor().max(0.0);
        let y0 = min.y.floor().max(0.0);
        let x1 = max.x.ceil().min(w as f32 - 1.0);
        let y1 = max.y.ceil().min(h as f32 - 1.0);
        if x0 > x1 || y0 > y1 {
            return None;
        }
        Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
    }
}

impl Surface for RasterSurface {
    fn size(&self) -> UVec2 {
        UVec2::new(self.image.width(), self.image.height())
    }

    fn resize(&mut self, size: UVec2) {
        if size != self.size() {
            self.image = RgbaImage::new(size.x, size.y);
        }
    }

    fn clear(&mut self) {
        for pixel in self.image.pixels_mut() {
            *pixel = Rgba([0, 0, 0, 0]);
        }
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, style: &DotStyle) {
        if radius <= 0.0 {
            return;
        }
        let color = style.color.with_opacity(style.opacity);
        let reach = Vec2::splat(radius + 1.0);
        let Some((x0, y0, x1, y1)) = self.clip(center - reach, center + reach) else {
            return;
        };
        for y in y0..=y1 {
            for x in x0..=x1 {
                let pixel = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let coverage = (radius + 0.5 - pixel.distance(center)).clamp(0.0, 1.0);
                self.blend(x, y, color, coverage);
            }
        }
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, style: &LineStyle) {
        if style.width <= 0.0 {
            return;
        }
        let color = style.color.with_opacity(style.opacity);
        let half = style.width * 0.5;
        let halo = half + style.glow.max(0.0);
        let reach = Vec2::splat(halo + 1.0);
        let Some((x0, y0, x1, y1)) = self.clip(from.min(to) - reach, from.max(to) + reach) else {
            return;
        };
        for y in y0..=y1 {
            for x in x0..=x1 {
                let pixel = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let d = distance_to_segment(pixel, from, to);
                let mut coverage = (half + 0.5 - d).clamp(0.0, 1.0);
                if style.is_glowing() && d < halo {
                    let falloff = 1.0 - d / halo;
                    coverage = coverage.max(falloff * falloff * GLOW_STRENGTH);
                }
                self.blend(x, y, color, coverage);
            }
        }
    }
}

fn distance_to_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Makes [`RasterSurface`]s.
#[derive(Debug, Default)]
pub struct RasterFactory;

impl SurfaceFactory for RasterFactory {
    type Surface = RasterSurface;

    fn create_surface(&mut self, _container: ContainerId, size: UVec2) -> RasterSurface {
        RasterSurface::new(size)
    }
}
