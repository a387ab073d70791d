//! Offscreen text raster backed by the embedded 8x8 bitmap font.

use std::fmt;
use std::str::FromStr;

use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{Rgba, RgbaImage};

use crate::config::{BOLD_WEIGHT, GLYPH_SIZE_PX, RASTER_HEIGHT, RASTER_WIDTH};
use crate::error::FontSpecError;

const GLYPH_CELLS: u32 = 8;
const INK: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Font description used both for drawing and as part of the target cache key.
///
/// Parsed from CSS-style shorthand (`"900 150px Inter, sans-serif"`). Style
/// keywords and a size token are accepted, but the raster always draws
/// upright at [`GLYPH_SIZE_PX`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FontSpec {
    pub weight: u16,
    pub family: String,
}

impl FontSpec {
    pub fn is_bold(&self) -> bool {
        self.weight >= BOLD_WEIGHT
    }
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            weight: 400,
            family: "sans-serif".to_string(),
        }
    }
}

impl FromStr for FontSpec {
    type Err = FontSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut tokens = s.split_whitespace().peekable();
        if tokens.peek().is_none() {
            return Err(FontSpecError::Empty);
        }

        let mut weight = 400;
        while let Some(token) = tokens.peek() {
            match *token {
                "normal" => weight = 400,
                "bold" => weight = 700,
                "italic" | "oblique" => {}
                t if is_pixel_size(t) => {}
                t if t.chars().all(|c| c.is_ascii_digit()) => {
                    weight = t
                        .parse::<u16>()
                        .ok()
                        .filter(|w| (1..=1000).contains(w))
                        .ok_or_else(|| FontSpecError::InvalidWeight(t.to_string()))?;
                }
                _ => break,
            }
            tokens.next();
        }

        let family = tokens.collect::<Vec<_>>().join(" ");
        if family.is_empty() {
            return Err(FontSpecError::MissingFamily);
        }

        Ok(Self { weight, family })
    }
}

/// A positive pixel size such as `150px`.
fn is_pixel_size(token: &str) -> bool {
    token
        .strip_suffix("px")
        .and_then(|n| n.parse::<f32>().ok())
        .is_some_and(|size| size > 0.0)
}

impl fmt::Display for FontSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}px {}", self.weight, GLYPH_SIZE_PX, self.family)
    }
}

/// Draw `text` in white onto a transparent canvas, centered on both axes.
pub fn render_text(text: &str, font: &FontSpec) -> RgbaImage {
    let mut canvas = RgbaImage::new(RASTER_WIDTH, RASTER_HEIGHT);

    let scale = (GLYPH_SIZE_PX / GLYPH_CELLS).max(1) as i64;
    let advance = GLYPH_CELLS as i64 * scale;
    let bold_offset = if font.is_bold() { scale / 2 } else { 0 };

    let chars = text.chars().count() as i64;
    let text_width = chars * advance + bold_offset;
    let left = (RASTER_WIDTH as i64 - text_width) / 2;
    let top = (RASTER_HEIGHT as i64 - advance) / 2;

    for (index, ch) in text.chars().enumerate() {
        let Some(rows) = BASIC_FONTS.get(ch) else {
            continue;
        };
        let origin_x = left + index as i64 * advance;
        draw_glyph(&mut canvas, &rows, origin_x, top, scale);
        if bold_offset > 0 {
            draw_glyph(&mut canvas, &rows, origin_x + bold_offset, top, scale);
        }
    }

    canvas
}

fn draw_glyph(canvas: &mut RgbaImage, rows: &[u8; 8], origin_x: i64, origin_y: i64, scale: i64) {
    let (width, height) = (canvas.width() as i64, canvas.height() as i64);

    for (row, bits) in rows.iter().enumerate() {
        for col in 0..GLYPH_CELLS as i64 {
            if bits & (1 << col) == 0 {
                continue;
            }
            let x0 = origin_x + col * scale;
            let y0 = origin_y + row as i64 * scale;
            for y in y0.max(0)..(y0 + scale).min(height) {
                for x in x0.max(0)..(x0 + scale).min(width) {
                    canvas.put_pixel(x as u32, y as u32, INK);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ink_count(canvas: &RgbaImage) -> usize {
        canvas.pixels().filter(|p| p.0[3] > 0).count()
    }

    #[test]
    fn test_parse_shorthand() {
        let font: FontSpec = "900 150px Inter, sans-serif".parse().unwrap();
        assert_eq!(font.weight, 900);
        assert_eq!(font.family, "Inter, sans-serif");
        assert!(font.is_bold());
    }

    #[test]
    fn test_parse_keywords_and_defaults() {
        let font: FontSpec = "bold Inter".parse().unwrap();
        assert_eq!(font.weight, 700);

        let font: FontSpec = "monospace".parse().unwrap();
        assert_eq!(font.weight, 400);
        assert!(!font.is_bold());
    }

    #[test]
    fn test_parse_skips_style_keywords() {
        let font: FontSpec = "italic 700 150px Inter".parse().unwrap();
        assert_eq!(font.weight, 700);
        assert_eq!(font.family, "Inter");

        let font: FontSpec = "oblique normal 12.5px Inter".parse().unwrap();
        assert_eq!(font.weight, 400);
        assert_eq!(font.family, "Inter");
    }

    #[test]
    fn test_size_token_needs_number() {
        let font: FontSpec = "900 abcpx Inter".parse().unwrap();
        assert_eq!(font.weight, 900);
        assert_eq!(font.family, "abcpx Inter");

        assert_eq!("900 150px".parse::<FontSpec>(), Err(FontSpecError::MissingFamily));
        assert!(!is_pixel_size("px"));
        assert!(!is_pixel_size("0px"));
        assert!(is_pixel_size("150px"));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<FontSpec>(), Err(FontSpecError::Empty));
        assert_eq!("900 150px".parse::<FontSpec>(), Err(FontSpecError::MissingFamily));
        assert_eq!(
            "5000 Inter".parse::<FontSpec>(),
            Err(FontSpecError::InvalidWeight("5000".to_string()))
        );
    }

    #[test]
    fn test_render_has_fixed_canvas() {
        let canvas = render_text("A", &FontSpec::default());
        assert_eq!(canvas.dimensions(), (RASTER_WIDTH, RASTER_HEIGHT));
        assert!(ink_count(&canvas) > 0);
    }

    #[test]
    fn test_render_is_centered() {
        let canvas = render_text("SINGULARITY", &FontSpec::default());
        let (mut min_x, mut max_x) = (u32::MAX, 0);
        for (x, _, p) in canvas.enumerate_pixels() {
            if p.0[3] > 0 {
                min_x = min_x.min(x);
                max_x = max_x.max(x);
            }
        }
        let center = (min_x + max_x) as f32 / 2.0;
        assert!((center - RASTER_WIDTH as f32 / 2.0).abs() < 150.0);
    }

    #[test]
    fn test_bold_adds_ink() {
        let regular = render_text("I", &"400 Inter".parse().unwrap());
        let bold = render_text("I", &"900 Inter".parse().unwrap());
        assert!(ink_count(&bold) > ink_count(&regular));
    }

    #[test]
    fn test_blank_text_has_no_ink() {
        assert_eq!(ink_count(&render_text("", &FontSpec::default())), 0);
        assert_eq!(ink_count(&render_text("   ", &FontSpec::default())), 0);
    }
}
