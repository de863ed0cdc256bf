//! Drawing Surfaces
//!
//! A canvas paints a [`Composition`] and encodes it for download. The PNG
//! backend is in `raster`; `SvgCanvas` keeps a vector master.

use std::fmt::{self, Write as _};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::compositor::{Composition, DrawOp, TextAlign};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Svg,
    Png,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Svg => "svg",
            ExportFormat::Png => "png",
        }
    }

    pub fn media_type(&self) -> &'static str {
        match self {
            ExportFormat::Svg => "image/svg+xml",
            ExportFormat::Png => "image/png",
        }
    }
}

#[derive(Debug, Error)]
pub enum CanvasError {
    #[error("Nothing drawn yet")]
    Empty,

    #[error("Encoding failed: {0}")]
    Encode(String),
}

pub trait Canvas {
    fn format(&self) -> ExportFormat;

    /// Replace whatever was drawn before.
    fn draw(&mut self, composition: &Composition);

    fn encode(&self) -> Result<Vec<u8>, CanvasError>;
}

/// Canvas that keeps the last composition as an SVG document.
#[derive(Debug, Clone, Default)]
pub struct SvgCanvas {
    document: Option<String>,
}

impl SvgCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document(&self) -> Option<&str> {
        self.document.as_deref()
    }
}

impl Canvas for SvgCanvas {
    fn format(&self) -> ExportFormat {
        ExportFormat::Svg
    }

    fn draw(&mut self, composition: &Composition) {
        self.document = Some(render_svg(composition));
    }

    fn encode(&self) -> Result<Vec<u8>, CanvasError> {
        self.document
            .as_ref()
            .map(|d| d.clone().into_bytes())
            .ok_or(CanvasError::Empty)
    }
}

/// Serialize a composition as a standalone SVG document.
pub fn render_svg(composition: &Composition) -> String {
    let mut svg = String::new();
    // Writing into a String cannot fail.
    let _ = write_svg(&mut svg, composition);
    svg
}

fn write_svg(svg: &mut String, composition: &Composition) -> fmt::Result {
    let (w, h) = (composition.size.width, composition.size.height);
    write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
    )?;

    for (i, op) in composition.ops.iter().enumerate() {
        match op {
            DrawOp::LinearGradient { from, to, stops } => {
                let id = format!("bg{i}");
                write!(
                    svg,
                    r#"<defs><linearGradient id="{id}" gradientUnits="userSpaceOnUse" x1="{}" y1="{}" x2="{}" y2="{}">"#,
                    num(from.0),
                    num(from.1),
                    num(to.0),
                    num(to.1)
                )?;
                for (offset, color) in stops {
                    write!(
                        svg,
                        r#"<stop offset="{}" stop-color="{}"/>"#,
                        num(*offset),
                        escape(color)
                    )?;
                }
                write!(
                    svg,
                    r#"</linearGradient></defs><rect x="0" y="0" width="{w}" height="{h}" fill="url(#{id})"/>"#
                )?;
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
                let anchor = match align {
                    TextAlign::Left => "start",
                    TextAlign::Center => "middle",
                    TextAlign::Right => "end",
                };
                let transform = transform
                    .map(|t| {
                        format!(
                            r#" transform="translate({} {}) rotate({})""#,
                            num(t.translate.0),
                            num(t.translate.1),
                            num(t.rotate.to_degrees())
                        )
                    })
                    .unwrap_or_default();
                write!(
                    svg,
                    r#"<text x="{}" y="{}" font-family="Arial" font-size="{}" text-anchor="{anchor}" fill="{}"{transform}>{}</text>"#,
                    num(*x),
                    num(*y),
                    num(*font_px),
                    escape(color),
                    escape(text)
                )?;
            }
        }
    }

    svg.push_str("</svg>");
    Ok(())
}

fn num(v: f64) -> String {
    let s = format!("{v:.4}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::{CanvasSize, Transform};

    fn composition() -> Composition {
        Composition {
            size: CanvasSize { width: 400, height: 320 },
            ops: vec![
                DrawOp::LinearGradient {
                    from: (0.0, 0.0),
                    to: (400.0, 320.0),
                    stops: vec![(0.0, "#00ffcc".into()), (1.0, "#ff00ff".into())],
                },
                DrawOp::Text {
                    text: "Token: a&b<c".into(),
                    x: 20.0,
                    y: 260.0,
                    font_px: 12.0,
                    align: TextAlign::Left,
                    color: "#fff".into(),
                    transform: None,
                },
                DrawOp::Text {
                    text: "⭐".into(),
                    x: 0.0,
                    y: -60.0,
                    font_px: 30.0,
                    align: TextAlign::Center,
                    color: "#fff".into(),
                    transform: Some(Transform {
                        translate: (200.0, 120.0),
                        rotate: std::f64::consts::FRAC_PI_2,
                    }),
                },
            ],
        }
    }

    #[test]
    fn test_svg_structure() {
        let svg = render_svg(&composition());
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains(r#"viewBox="0 0 400 320""#));
        assert!(svg.contains(r##"stop-color="#ff00ff""##));
        assert!(svg.contains(r#"text-anchor="start""#));
        assert!(svg.contains(r#"transform="translate(200 120) rotate(90)""#));
    }

    #[test]
    fn test_text_is_escaped() {
        let svg = render_svg(&composition());
        assert!(svg.contains("Token: a&amp;b&lt;c"));
    }

    #[test]
    fn test_empty_canvas_refuses_encode() {
        let canvas = SvgCanvas::new();
        assert!(matches!(canvas.encode(), Err(CanvasError::Empty)));
    }

    #[test]
    fn test_draw_replaces_document() {
        let mut canvas = SvgCanvas::new();
        canvas.draw(&composition());
        let first = canvas.encode().unwrap();
        let mut smaller = composition();
        smaller.size = CanvasSize { width: 200, height: 160 };
        canvas.draw(&smaller);
        assert_ne!(first, canvas.encode().unwrap());
        assert_eq!(canvas.format().extension(), "svg");
    }

    #[test]
    fn test_num_formatting() {
        assert_eq!(num(20.0), "20");
        assert_eq!(num(0.5), "0.5");
        assert_eq!(num(-0.00001), "0");
    }
}
