//! Image Compositor - Fixed Layout, Uniform Scale
//!
//! `compose` is pure: the same record and colour give the same display list
//! at every width, differing only by the `width / 400` scale factor.

use serde::Serialize;

use crate::generator::MintRecord;
use crate::seeded::SeededStream;

/// Layout is authored against this canvas.
pub const BASE_WIDTH: f64 = 400.0;
pub const BASE_HEIGHT: f64 = 320.0;
pub const ASPECT_RATIO: f64 = BASE_WIDTH / BASE_HEIGHT;
pub const CONTAINER_FILL: f64 = 0.9;

pub const GRADIENT_END: &str = "#ff00ff";
pub const TEXT_COLOR: &str = "#fff";
pub const TITLE: &str = "EMOJI NFT";

pub const GLYPH_TABLE_LEN: usize = 100;
const CURATED_GLYPHS: [&str; 12] = [
    "😀", "😂", "🤓", "😎", "😍", "🥰", "⭐", "✨", "⚡", "💥", "🔥", "🌈",
];
const FILLER_GLYPH: &str = "🌟";
const GLYPH_STEP: u64 = 10;
const MAX_TILT: f64 = 0.5;

/// 12 curated glyphs padded with the filler to 100 entries.
pub fn glyph_table() -> Vec<&'static str> {
    let mut table: Vec<&'static str> = CURATED_GLYPHS.to_vec();
    table.resize(GLYPH_TABLE_LEN, FILLER_GLYPH);
    table
}

/// Glyph table indices for a digest prefix: h, h+10, h+20 (mod 100).
pub fn glyph_indices(prefix: u32) -> [usize; 3] {
    let h = u64::from(prefix);
    let len = GLYPH_TABLE_LEN as u64;
    [0, 1, 2].map(|i| ((h + i * GLYPH_STEP) % len) as usize)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    /// Full-size layout, used when no container width is known.
    pub const BASE: CanvasSize = CanvasSize {
        width: BASE_WIDTH as u32,
        height: BASE_HEIGHT as u32,
    };

    /// `min(0.9 * container, 400)` wide, 5:4. Fractional pixels truncate as
    /// they do on a canvas element.
    pub fn fit(container_width: f64) -> Self {
        let width = (container_width.max(0.0) * CONTAINER_FILL).min(BASE_WIDTH) as u32;
        let height = (f64::from(width) / ASPECT_RATIO) as u32;
        Self { width, height }
    }

    pub fn scale(&self) -> f64 {
        f64::from(self.width) / BASE_WIDTH
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// Translate, then rotate; text coordinates are relative to the result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Transform {
    pub translate: (f64, f64),
    pub rotate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    /// Fill the whole canvas with a linear gradient from `from` to `to`.
    LinearGradient {
        from: (f64, f64),
        to: (f64, f64),
        stops: Vec<(f64, String)>,
    },
    Text {
        text: String,
        x: f64,
        y: f64,
        font_px: f64,
        align: TextAlign,
        color: String,
        transform: Option<Transform>,
    },
}

/// Display list for one token image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Composition {
    pub size: CanvasSize,
    pub ops: Vec<DrawOp>,
}

impl Composition {
    /// Rotation angles of the glyphs, in draw order.
    pub fn rotations(&self) -> Vec<f64> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text {
                    transform: Some(t), ..
                } => Some(t.rotate),
                _ => None,
            })
            .collect()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

struct Pen {
    scale: f64,
    ops: Vec<DrawOp>,
    font_px: f64,
    align: TextAlign,
}

impl Pen {
    fn font(&mut self, base_px: f64) {
        self.font_px = base_px * self.scale;
    }

    fn text(&mut self, text: impl Into<String>, x: f64, y: f64) {
        self.push(text.into(), x, y, None);
    }

    fn push(&mut self, text: String, x: f64, y: f64, transform: Option<Transform>) {
        self.ops.push(DrawOp::Text {
            text,
            x,
            y,
            font_px: self.font_px,
            align: self.align,
            color: TEXT_COLOR.to_string(),
            transform,
        });
    }
}

pub fn compose(record: &MintRecord, size: CanvasSize, primary_color: &str) -> Composition {
    let scale = size.scale();
    let width = f64::from(size.width);
    let height = f64::from(size.height);
    let mut stream = SeededStream::from_digest(&record.digest);

    let mut pen = Pen {
        scale,
        ops: Vec::with_capacity(16),
        font_px: 0.0,
        align: TextAlign::Center,
    };

    pen.ops.push(DrawOp::LinearGradient {
        from: (0.0, 0.0),
        to: (width, height),
        stops: vec![
            (0.0, primary_color.to_string()),
            (1.0, GRADIENT_END.to_string()),
        ],
    });

    pen.font(20.0);
    pen.text(TITLE, width / 2.0, 50.0 * scale);
    pen.font(12.0);
    pen.text(record.digest.short_hex(), width / 2.0, 300.0 * scale);

    let table = glyph_table();
    pen.font(30.0);
    for (i, index) in glyph_indices(record.digest.prefix_value()).into_iter().enumerate() {
        let transform = Transform {
            translate: (width / 2.0, 120.0 * scale),
            rotate: (stream.next_unit() - 0.5) * MAX_TILT,
        };
        let y = -60.0 * scale + i as f64 * 30.0 * scale;
        pen.push(table[index].to_string(), 0.0, y, Some(transform));
    }

    pen.font(16.0);
    pen.text(format!("{} Coins", record.value), width / 2.0, 180.0 * scale);

    pen.font(12.0);
    pen.align = TextAlign::Left;
    pen.text(format!("ID: {}", record.user_id), 20.0 * scale, 220.0 * scale);
    pen.text(format!("Name: {}", record.user_name), 20.0 * scale, 240.0 * scale);
    pen.text(format!("Token: {}", record.token), 20.0 * scale, 260.0 * scale);
    pen.text(format!("Time: {}", record.timestamp), 20.0 * scale, 280.0 * scale);

    pen.align = TextAlign::Right;
    pen.text(format!("Code: {}", record.gate_code), width - 20.0 * scale, 20.0 * scale);

    Composition { size, ops: pen.ops }
}
