//! Raster Canvas - RGBA Pixmap, PNG Download
//!
//! Paints a [`Composition`] into a `tiny-skia` pixmap. Text uses the 8x8
//! bitmap faces from `font8x8`, so the output does not depend on installed
//! fonts. Glyphs outside those faces (the emoji) are drawn as tinted stars.

use font8x8::UnicodeFonts;
use tiny_skia::{
    Color, FillRule, GradientStop, LinearGradient, Paint, PathBuilder, Pixmap, Point, Rect,
    SpreadMode, Transform,
};

use crate::canvas::{Canvas, CanvasError, ExportFormat};
use crate::compositor::{Composition, DrawOp, TextAlign};
use crate::config::DEFAULT_PRIMARY_COLOR;

/// Bitmap faces are 8 dots square; one em maps onto the full cell.
const CELL_DOTS: f32 = 8.0;
/// Row holding the baseline inside an 8x8 cell.
const BASELINE_ROW: f32 = 7.0;

const STAR_TINTS: [(u8, u8, u8); 6] = [
    (255, 214, 0),
    (255, 120, 40),
    (120, 220, 255),
    (255, 90, 170),
    (150, 255, 120),
    (200, 160, 255),
];

/// Canvas backed by an RGBA pixmap, encoded as PNG.
#[derive(Debug, Clone, Default)]
pub struct PngCanvas {
    pixmap: Option<Pixmap>,
}

impl PngCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pixmap(&self) -> Option<&Pixmap> {
        self.pixmap.as_ref()
    }
}

impl Canvas for PngCanvas {
    fn format(&self) -> ExportFormat {
        ExportFormat::Png
    }

    fn draw(&mut self, composition: &Composition) {
        self.pixmap = rasterize(composition);
    }

    fn encode(&self) -> Result<Vec<u8>, CanvasError> {
        let pixmap = self.pixmap.as_ref().ok_or(CanvasError::Empty)?;
        pixmap
            .encode_png()
            .map_err(|e| CanvasError::Encode(e.to_string()))
    }
}

/// Render a composition. `None` for a zero-sized canvas.
pub fn rasterize(composition: &Composition) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(composition.size.width, composition.size.height)?;
    let (w, h) = (pixmap.width() as f32, pixmap.height() as f32);

    for op in &composition.ops {
        match op {
            DrawOp::LinearGradient { from, to, stops } => {
                let stops = stops
                    .iter()
                    .map(|(offset, color)| GradientStop::new(*offset as f32, parse_color(color)))
                    .collect();
                let shader = LinearGradient::new(
                    Point::from_xy(from.0 as f32, from.1 as f32),
                    Point::from_xy(to.0 as f32, to.1 as f32),
                    stops,
                    SpreadMode::Pad,
                    Transform::identity(),
                );
                if let (Some(shader), Some(rect)) = (shader, Rect::from_xywh(0.0, 0.0, w, h)) {
                    let mut paint = Paint::default();
                    paint.shader = shader;
                    pixmap.fill_rect(rect, &paint, Transform::identity(), None);
                }
            }
            DrawOp::Text {
                text,
                x,
                y,
                font_px,
                align,
                color,
                transform,
            } => {
                let ts = transform
                    .map(|t| {
                        Transform::from_translate(t.translate.0 as f32, t.translate.1 as f32)
                            .pre_rotate(t.rotate.to_degrees() as f32)
                    })
                    .unwrap_or_else(Transform::identity);
                draw_text(
                    &mut pixmap,
                    text,
                    (*x as f32, *y as f32),
                    *font_px as f32,
                    *align,
                    parse_color(color),
                    ts,
                );
            }
        }
    }

    Some(pixmap)
}

fn draw_text(
    pixmap: &mut Pixmap,
    text: &str,
    (x, y): (f32, f32),
    font_px: f32,
    align: TextAlign,
    color: Color,
    ts: Transform,
) {
    let advance = font_px;
    let dot = font_px / CELL_DOTS;
    let width = advance * text.chars().count() as f32;
    let left = match align {
        TextAlign::Left => x,
        TextAlign::Center => x - width / 2.0,
        TextAlign::Right => x - width,
    };
    let top = y - BASELINE_ROW * dot;

    let mut paint = Paint::default();
    paint.set_color(color);

    for (i, c) in text.chars().enumerate() {
        let cell_x = left + i as f32 * advance;
        match font8x8::BASIC_FONTS.get(c) {
            Some(rows) => {
                for (row, bits) in rows.iter().enumerate() {
                    for col in 0..8 {
                        if bits & (1 << col) == 0 {
                            continue;
                        }
                        let rect = Rect::from_xywh(
                            cell_x + col as f32 * dot,
                            top + row as f32 * dot,
                            dot,
                            dot,
                        );
                        if let Some(rect) = rect {
                            pixmap.fill_rect(rect, &paint, ts, None);
                        }
                    }
                }
            }
            None => draw_star(pixmap, c, cell_x + advance / 2.0, y - font_px * 0.35, font_px / 2.0, ts),
        }
    }
}

fn draw_star(pixmap: &mut Pixmap, glyph: char, cx: f32, cy: f32, radius: f32, ts: Transform) {
    let mut pb = PathBuilder::new();
    for i in 0..10 {
        let r = if i % 2 == 0 { radius } else { radius * 0.45 };
        let angle = std::f32::consts::PI * (i as f32 / 5.0) - std::f32::consts::FRAC_PI_2;
        let (px, py) = (cx + r * angle.cos(), cy + r * angle.sin());
        if i == 0 {
            pb.move_to(px, py);
        } else {
            pb.line_to(px, py);
        }
    }
    pb.close();

    if let Some(path) = pb.finish() {
        let (r, g, b) = STAR_TINTS[glyph as usize % STAR_TINTS.len()];
        let mut paint = Paint::default();
        paint.set_color_rgba8(r, g, b, 255);
        pixmap.fill_path(&path, &paint, FillRule::Winding, ts, None);
    }
}

/// `#rgb` or `#rrggbb`. Anything else falls back to the default primary.
pub fn parse_color(css: &str) -> Color {
    parse_hex(css)
        .or_else(|| parse_hex(DEFAULT_PRIMARY_COLOR))
        .unwrap_or(Color::WHITE)
}

fn parse_hex(css: &str) -> Option<Color> {
    let hex = css.trim().strip_prefix('#')?;
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    let (r, g, b) = match hex.len() {
        3 => {
            let expand = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
            (expand(0)?, expand(1)?, expand(2)?)
        }
        6 => (channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?),
        _ => return None,
    };
    Some(Color::from_rgba8(r, g, b, 255))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::{compose, CanvasSize};
    use crate::generator::MintRecord;
    use crate::hashing::{sha256, TokenDigest};

    fn record() -> MintRecord {
        MintRecord {
            user_id: "0xABC".into(),
            user_name: "Alice".into(),
            token: "ABCDEFGHIJKLMNOPQRST".into(),
            serial: "UVWXYZ0123456789AB".into(),
            value: "53.22".into(),
            timestamp: "2024-01-01 00:00:00".into(),
            digest: TokenDigest::from_bytes(sha256(b"UVWXYZ0123456789AB2024-01-01 00:00:00")),
            gate_code: "KLMN".into(),
        }
    }

    fn render(width: u32) -> Pixmap {
        let size = CanvasSize {
            width,
            height: width * 4 / 5,
        };
        rasterize(&compose(&record(), size, "#00ffcc")).unwrap()
    }

    #[test]
    fn test_same_record_same_pixels() {
        assert_eq!(render(400).data(), render(400).data());
        assert_eq!(render(270).data(), render(270).data());
    }

    #[test]
    fn test_pixmap_matches_canvas_size() {
        let pixmap = render(270);
        assert_eq!((pixmap.width(), pixmap.height()), (270, 216));
    }

    #[test]
    fn test_gradient_starts_at_primary() {
        let pixel = render(400).pixel(0, 0).unwrap();
        assert!(pixel.red() < 10);
        assert!(pixel.green() > 240);
        assert!((190..=215).contains(&pixel.blue()));
    }

    #[test]
    fn test_code_corner_has_text() {
        // Top-right band only holds the gate code over the gradient.
        let pixmap = render(400);
        let white = (250..400)
            .flat_map(|x| (0..28).map(move |y| (x, y)))
            .filter_map(|(x, y)| pixmap.pixel(x, y))
            .filter(|p| p.red() > 245 && p.green() > 245 && p.blue() > 245)
            .count();
        assert!(white > 0);
    }

    #[test]
    fn test_png_encoding() {
        let mut canvas = PngCanvas::new();
        assert!(matches!(canvas.encode(), Err(CanvasError::Empty)));
        canvas.draw(&compose(&record(), CanvasSize::fit(800.0), "#00ffcc"));
        let bytes = canvas.encode().unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
        assert_eq!(canvas.format(), ExportFormat::Png);
    }

    #[test]
    fn test_zero_sized_canvas_has_nothing_to_encode() {
        let mut canvas = PngCanvas::new();
        canvas.draw(&compose(&record(), CanvasSize::fit(0.0), "#00ffcc"));
        assert!(canvas.pixmap().is_none());
        assert!(canvas.encode().is_err());
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#fff"), Color::from_rgba8(255, 255, 255, 255));
        assert_eq!(parse_color("#ff00ff"), Color::from_rgba8(255, 0, 255, 255));
        assert_eq!(parse_color("teal"), Color::from_rgba8(0, 255, 204, 255));
    }
}
