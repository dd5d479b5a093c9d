//! In-memory RGB raster the show paints on.
//!
//! Channels are kept as `f32` so the slow trailing fade can take many
//! frames to reach the background without banding.

use crate::color::{self, Rgb};
use crate::fireworks::render::{BlendMode, Canvas, GradientStop};

#[derive(Debug, Clone, PartialEq)]
pub struct PixelSurface {
    width: usize,
    height: usize,
    pixels: Vec<[f32; 3]>,
    blend: BlendMode,
}

impl PixelSurface {
    pub fn new(width: usize, height: usize, background: Rgb) -> Self {
        Self {
            width,
            height,
            pixels: vec![color::to_unit(background); width * height],
            blend: BlendMode::SourceOver,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Colour at `(x, y)`; out-of-bounds reads are black.
    pub fn pixel(&self, x: usize, y: usize) -> Rgb {
        if x >= self.width || y >= self.height {
            return color::BLACK;
        }
        color::from_unit(self.pixels[y * self.width + x])
    }

    #[inline]
    fn blend_pixel(&mut self, idx: usize, src: [f32; 3], alpha: f32) {
        let dst = &mut self.pixels[idx];
        for c in 0..3 {
            let target = match self.blend {
                BlendMode::SourceOver => src[c],
                BlendMode::Screen => 1.0 - (1.0 - dst[c]) * (1.0 - src[c]),
            };
            dst[c] += (target - dst[c]) * alpha;
        }
    }

    /// Pixel rows/columns touched by a box around `center`, clipped.
    fn span(&self, center: (f32, f32), reach: f32) -> Option<(usize, usize, usize, usize)> {
        let x0 = (center.0 - reach).floor().max(0.0);
        let y0 = (center.1 - reach).floor().max(0.0);
        let x1 = (center.0 + reach).ceil().min(self.width as f32);
        let y1 = (center.1 + reach).ceil().min(self.height as f32);
        if !(x0 < x1 && y0 < y1) {
            return None;
        }
        Some((x0 as usize, y0 as usize, x1 as usize, y1 as usize))
    }
}

/// Sample a gradient at `t`, interpolating premultiplied colour. Returns the
/// straight colour and its alpha.
fn sample_gradient(stops: &[GradientStop], t: f32) -> ([f32; 3], f32) {
    let premul = |stop: &GradientStop| {
        let c = color::to_unit(stop.color);
        [c[0] * stop.alpha, c[1] * stop.alpha, c[2] * stop.alpha]
    };

    let Some(first) = stops.first() else {
        return ([0.0; 3], 0.0);
    };
    if t <= first.offset {
        return (color::to_unit(first.color), first.alpha);
    }

    for pair in stops.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        if t <= b.offset {
            let span = b.offset - a.offset;
            let f = if span > 0.0 { (t - a.offset) / span } else { 1.0 };
            let (pa, pb) = (premul(a), premul(b));
            let alpha = a.alpha + (b.alpha - a.alpha) * f;
            if alpha <= 0.0 {
                return ([0.0; 3], 0.0);
            }
            let mut c = [0.0; 3];
            for i in 0..3 {
                c[i] = (pa[i] + (pb[i] - pa[i]) * f) / alpha;
            }
            return (c, alpha);
        }
    }

    let last = &stops[stops.len() - 1];
    (color::to_unit(last.color), last.alpha)
}

impl Canvas for PixelSurface {
    fn fade(&mut self, color: Rgb, alpha: f32) {
        let c = color::to_unit(color);
        let keep = 1.0 - alpha;
        for px in &mut self.pixels {
            for i in 0..3 {
                px[i] = px[i] * keep + c[i] * alpha;
            }
        }
    }

    fn set_blend(&mut self, mode: BlendMode) {
        self.blend = mode;
    }

    fn fill_circle(&mut self, center: (f32, f32), radius: f32, color: Rgb, alpha: f32) {
        if alpha <= 0.0 || radius < 0.0 {
            return;
        }
        // Half a pixel of soft edge keeps sub-pixel embers visible
        let reach = radius + 0.5;
        let Some((x0, y0, x1, y1)) = self.span(center, reach) else {
            return;
        };
        let src = color::to_unit(color);
        for y in y0..y1 {
            for x in x0..x1 {
                let dx = x as f32 + 0.5 - center.0;
                let dy = y as f32 + 0.5 - center.1;
                let coverage = (reach - (dx * dx + dy * dy).sqrt()).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend_pixel(y * self.width + x, src, alpha * coverage);
                }
            }
        }
    }

    fn fill_radial_gradient(&mut self, center: (f32, f32), radius: f32, stops: &[GradientStop], alpha: f32) {
        if alpha <= 0.0 || radius <= 0.0 {
            return;
        }
        let Some((x0, y0, x1, y1)) = self.span(center, radius) else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                let dx = x as f32 + 0.5 - center.0;
                let dy = y as f32 + 0.5 - center.1;
                let t = (dx * dx + dy * dy).sqrt() / radius;
                let (src, stop_alpha) = sample_gradient(stops, t);
                let a = stop_alpha * alpha;
                if a > 0.0 {
                    self.blend_pixel(y * self.width + x, src, a);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fireworks::render::flash_stops;

    fn brightness(c: Rgb) -> u32 {
        c.0 as u32 + c.1 as u32 + c.2 as u32
    }

    #[test]
    fn test_fade_converges_to_fade_colour() {
        let mut s = PixelSurface::new(4, 4, color::WHITE);
        for _ in 0..200 {
            s.fade(color::NIGHT, 0.15);
        }
        assert_eq!(s.pixel(2, 2), color::NIGHT);
    }

    #[test]
    fn test_single_fade_keeps_trail() {
        let mut s = PixelSurface::new(1, 1, color::WHITE);
        s.fade(color::BLACK, 0.15);
        assert_eq!(s.pixel(0, 0), (217, 217, 217));
    }

    #[test]
    fn test_screen_never_darkens() {
        let mut s = PixelSurface::new(8, 8, (120, 60, 200));
        s.set_blend(BlendMode::Screen);
        let before = s.clone();
        s.fill_circle((4.0, 4.0), 3.0, (10, 250, 0), 1.0);
        for y in 0..8 {
            for x in 0..8 {
                let (a, b) = (before.pixel(x, y), s.pixel(x, y));
                assert!(b.0 >= a.0 && b.1 >= a.1 && b.2 >= a.2);
            }
        }
    }

    #[test]
    fn test_circle_lights_center_only() {
        let mut s = PixelSurface::new(10, 10, color::BLACK);
        s.set_blend(BlendMode::Screen);
        s.fill_circle((5.5, 5.5), 1.0, color::WHITE, 1.0);
        assert_eq!(s.pixel(5, 5), color::WHITE);
        assert_eq!(s.pixel(0, 0), color::BLACK);
        assert_eq!(s.pixel(9, 9), color::BLACK);
    }

    #[test]
    fn test_sub_pixel_circle_still_visible() {
        let mut s = PixelSurface::new(3, 3, color::BLACK);
        s.set_blend(BlendMode::Screen);
        s.fill_circle((1.5, 1.5), 0.2, color::WHITE, 1.0);
        assert!(brightness(s.pixel(1, 1)) > 0);
    }

    #[test]
    fn test_offscreen_shapes_are_clipped() {
        let mut s = PixelSurface::new(5, 5, color::BLACK);
        s.fill_circle((-50.0, -50.0), 3.0, color::WHITE, 1.0);
        s.fill_radial_gradient((100.0, 2.0), 4.0, &flash_stops(color::WHITE), 1.0);
        assert_eq!(s, PixelSurface::new(5, 5, color::BLACK));

        s.fill_circle((-0.5, 2.5), 1.0, color::WHITE, 1.0);
        assert!(brightness(s.pixel(0, 2)) > 0);
    }

    #[test]
    fn test_gradient_white_core_transparent_rim() {
        let mut s = PixelSurface::new(41, 41, color::BLACK);
        s.set_blend(BlendMode::Screen);
        s.fill_radial_gradient((20.5, 20.5), 20.0, &flash_stops(color::HEART_RED), 1.0);
        assert_eq!(s.pixel(20, 20), color::WHITE);
        // Past 80% of the radius nothing is painted
        assert_eq!(s.pixel(20, 3), color::BLACK);
        assert_eq!(s.pixel(0, 0), color::BLACK);
        // At 20% the flash colour dominates
        let ring = s.pixel(20, 16);
        assert!(ring.0 > 200 && ring.1 < 80);
    }

    #[test]
    fn test_gradient_sampling() {
        let stops = flash_stops(color::PLANET_RED);
        let (c, a) = sample_gradient(&stops, 0.0);
        assert_eq!((color::from_unit(c), a), (color::WHITE, 1.0));
        let (c, a) = sample_gradient(&stops, 0.2);
        assert_eq!((color::from_unit(c), a), (color::PLANET_RED, 1.0));
        let (c, a) = sample_gradient(&stops, 0.5);
        assert!((a - 0.5).abs() < 1e-6);
        assert_eq!(color::from_unit(c), color::PLANET_RED);
        assert_eq!(sample_gradient(&stops, 0.9).1, 0.0);
        assert_eq!(sample_gradient(&stops, 3.0).1, 0.0);
        assert_eq!(sample_gradient(&[], 0.5).1, 0.0);
    }
}
