// Pixel math truncates on purpose; coordinates are bounds-checked first.
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]

use ab_glyph::{point, Font, FontRef, GlyphId, InvalidFont, PxScale, ScaleFont};
use image::{Rgb, RgbImage};

static REGULAR_TTF: &[u8] = include_bytes!("../../fonts/DejaVuSans.ttf");
static BOLD_TTF: &[u8] = include_bytes!("../../fonts/DejaVuSans-Bold.ttf");

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Weight {
    Regular,
    Bold,
}

/// A pixel region, in image coordinates.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Rect {
    pub(crate) x: u32,
    pub(crate) y: u32,
    pub(crate) width: u32,
    pub(crate) height: u32,
}

impl Rect {
    pub(crate) fn from_corners(x0: u32, y0: u32, x1: u32, y1: u32) -> Rect {
        Rect {
            x: x0,
            y: y0,
            width: x1.saturating_sub(x0),
            height: y1.saturating_sub(y0),
        }
    }

    /// Shrink the rect by `by` pixels on every side.
    pub(crate) fn inset(&self, by: u32) -> Rect {
        Rect {
            x: self.x.saturating_add(by),
            y: self.y.saturating_add(by),
            width: self.width.saturating_sub(by.saturating_mul(2)),
            height: self.height.saturating_sub(by.saturating_mul(2)),
        }
    }

    fn contains(&self, x: i64, y: i64) -> bool {
        x >= i64::from(self.x)
            && y >= i64::from(self.y)
            && x < i64::from(self.x) + i64::from(self.width)
            && y < i64::from(self.y) + i64::from(self.height)
    }
}

/// Owns the image being rendered into; dropped or consumed when the render
/// call ends, so no drawing state outlives a render.
pub(crate) struct Canvas {
    img: RgbImage,
    regular: FontRef<'static>,
    bold: FontRef<'static>,
}

impl Canvas {
    pub(crate) fn new(width: u32, height: u32, background: Rgb<u8>) -> Result<Canvas, InvalidFont> {
        Ok(Canvas {
            img: RgbImage::from_pixel(width, height, background),
            regular: FontRef::try_from_slice(REGULAR_TTF)?,
            bold: FontRef::try_from_slice(BOLD_TTF)?,
        })
    }

    pub(crate) fn width(&self) -> u32 {
        self.img.width()
    }

    pub(crate) fn fill_rect(&mut self, rect: Rect, color: Rgb<u8>) {
        let x1 = rect.x.saturating_add(rect.width).min(self.img.width());
        let y1 = rect.y.saturating_add(rect.height).min(self.img.height());
        for y in rect.y..y1 {
            for x in rect.x..x1 {
                self.img.put_pixel(x, y, color);
            }
        }
    }

    /// One-pixel outline just inside the rect's edges.
    pub(crate) fn stroke_rect(&mut self, rect: Rect, color: Rgb<u8>) {
        if rect.width == 0 || rect.height == 0 {
            return;
        }
        self.hline(rect.x, rect.y, rect.width, color);
        self.hline(rect.x, rect.y + rect.height - 1, rect.width, color);
        self.vline(rect.x, rect.y, rect.height, color);
        self.vline(rect.x + rect.width - 1, rect.y, rect.height, color);
    }

    fn hline(&mut self, x: u32, y: u32, length: u32, color: Rgb<u8>) {
        if y >= self.img.height() {
            return;
        }
        let x1 = x.saturating_add(length).min(self.img.width());
        for px in x..x1 {
            self.img.put_pixel(px, y, color);
        }
    }

    fn vline(&mut self, x: u32, y: u32, length: u32, color: Rgb<u8>) {
        if x >= self.img.width() {
            return;
        }
        let y1 = y.saturating_add(length).min(self.img.height());
        for py in y..y1 {
            self.img.put_pixel(x, py, color);
        }
    }

    /// Draw one line of text with its top-left corner at (`x`, `y`), clipped
    /// to `clip`.  Coverage is alpha-blended over whatever is already on the
    /// canvas.
    pub(crate) fn draw_text(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        px: f32,
        weight: Weight,
        color: Rgb<u8>,
        clip: Rect,
    ) {
        let font = match weight {
            Weight::Regular => &self.regular,
            Weight::Bold => &self.bold,
        };
        let img = &mut self.img;
        let scale = PxScale::from(px);
        let scaled = font.as_scaled(scale);
        let baseline = y + scaled.ascent();
        let mut caret = x;
        let mut prev: Option<GlyphId> = None;
        for ch in text.chars() {
            let id = font.glyph_id(ch);
            if let Some(last) = prev {
                caret += scaled.kern(last, id);
            }
            let glyph = id.with_scale_and_position(scale, point(caret, baseline));
            caret += scaled.h_advance(id);
            prev = Some(id);
            let Some(outline) = font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outline.px_bounds();
            outline.draw(|gx, gy, coverage| {
                let ix = bounds.min.x as i64 + i64::from(gx);
                let iy = bounds.min.y as i64 + i64::from(gy);
                if coverage > 0.0
                    && clip.contains(ix, iy)
                    && ix < i64::from(img.width())
                    && iy < i64::from(img.height())
                    && ix >= 0
                    && iy >= 0
                {
                    let base = *img.get_pixel(ix as u32, iy as u32);
                    img.put_pixel(ix as u32, iy as u32, blend(base, color, coverage));
                }
            });
        }
    }

    /// Advance width of `text` at the given pixel size, for centering.
    pub(crate) fn text_width(&self, text: &str, px: f32, weight: Weight) -> f32 {
        let font = match weight {
            Weight::Regular => &self.regular,
            Weight::Bold => &self.bold,
        };
        let scaled = font.as_scaled(PxScale::from(px));
        let mut width = 0.0;
        let mut prev: Option<GlyphId> = None;
        for ch in text.chars() {
            let id = font.glyph_id(ch);
            if let Some(last) = prev {
                width += scaled.kern(last, id);
            }
            width += scaled.h_advance(id);
            prev = Some(id);
        }
        width
    }

    pub(crate) fn into_image(self) -> RgbImage {
        self.img
    }
}

fn blend(base: Rgb<u8>, over: Rgb<u8>, alpha: f32) -> Rgb<u8> {
    let a = alpha.clamp(0.0, 1.0);
    let mix =
        |b: u8, o: u8| -> u8 { (f32::from(b) + (f32::from(o) - f32::from(b)) * a).round() as u8 };
    Rgb([
        mix(base[0], over[0]),
        mix(base[1], over[1]),
        mix(base[2], over[2]),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
    const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

    #[test]
    fn test_new_fills_background() {
        let canvas = Canvas::new(4, 3, BLACK).unwrap();
        let img = canvas.into_image();
        assert_eq!(img.dimensions(), (4, 3));
        assert!(img.pixels().all(|&p| p == BLACK));
    }

    #[test]
    fn test_fill_rect_covers_exact_region() {
        let mut canvas = Canvas::new(10, 10, WHITE).unwrap();
        let rect = Rect {
            x: 2,
            y: 3,
            width: 4,
            height: 2,
        };
        canvas.fill_rect(rect, BLACK);
        let img = canvas.into_image();
        let mut filled = 0;
        for (x, y, &p) in img.enumerate_pixels() {
            let inside = (2..6).contains(&x) && (3..5).contains(&y);
            assert_eq!(p == BLACK, inside, "pixel ({x}, {y})");
            if inside {
                filled += 1;
            }
        }
        assert_eq!(filled, 8);
    }

    #[test]
    fn test_fill_rect_clamps_to_image() {
        let mut canvas = Canvas::new(4, 4, WHITE).unwrap();
        canvas.fill_rect(
            Rect {
                x: 2,
                y: 2,
                width: 100,
                height: 100,
            },
            BLACK,
        );
        let img = canvas.into_image();
        assert_eq!(img.pixels().filter(|&&p| p == BLACK).count(), 4);
    }

    #[test]
    fn test_stroke_rect_outlines_only() {
        let mut canvas = Canvas::new(8, 8, WHITE).unwrap();
        let rect = Rect {
            x: 1,
            y: 1,
            width: 5,
            height: 4,
        };
        canvas.stroke_rect(rect, BLACK);
        let img = canvas.into_image();
        assert_eq!(*img.get_pixel(1, 1), BLACK);
        assert_eq!(*img.get_pixel(5, 4), BLACK);
        assert_eq!(*img.get_pixel(3, 2), WHITE);
        assert_eq!(*img.get_pixel(0, 0), WHITE);
    }

    #[test]
    fn test_draw_text_respects_clip() {
        let clip = Rect {
            x: 0,
            y: 0,
            width: 20,
            height: 20,
        };
        let mut canvas = Canvas::new(40, 40, WHITE).unwrap();
        canvas.draw_text("88888888", 2.0, 2.0, 16.0, Weight::Regular, BLACK, clip);
        let img = canvas.into_image();
        let inked = |img: &RgbImage, range_x: std::ops::Range<u32>| {
            img.enumerate_pixels()
                .filter(|&(x, _, &p)| range_x.contains(&x) && p != WHITE)
                .count()
        };
        assert!(inked(&img, 0..20) > 0, "no pixels drawn inside the clip");
        assert_eq!(inked(&img, 20..40), 0, "pixels leaked outside the clip");
    }

    #[test]
    fn test_text_width_grows_with_text() {
        let canvas = Canvas::new(1, 1, WHITE).unwrap();
        let one = canvas.text_width("M", 12.0, Weight::Regular);
        let two = canvas.text_width("MM", 12.0, Weight::Regular);
        assert!(one > 0.0);
        assert!(two > one);
    }
}
