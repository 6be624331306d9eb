//! Figure composition: color-mapped panel, vertical colorbar and title.
//!
//! Produces a PNG visualization of an index raster in the layout the web
//! client expects: title line across the top, the rendered raster panel on
//! the left and a labeled colorbar on the right.

use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage};
use thiserror::Error;

use cropsense_core::raster::{Raster, RasterElement};

use crate::glyphs::{glyph, text_width, GLYPH_ADVANCE, GLYPH_HEIGHT, GLYPH_WIDTH};
use crate::render::{raster_to_rgba, ColormapParams};
use crate::scheme::evaluate;

const MARGIN: u32 = 12;
const TITLE_HEIGHT: u32 = 16;
const PANEL_BAR_GAP: u32 = 10;
const BAR_WIDTH: u32 = 14;
const TICK_GAP: u32 = 4;

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const INK: Rgba<u8> = Rgba([40, 40, 40, 255]);

/// Errors produced while composing a figure.
#[derive(Error, Debug)]
pub enum FigureError {
    #[error("cannot render an empty raster")]
    EmptyRaster,

    #[error("png encoding failed: {0}")]
    Encode(String),
}

/// An encoded visualization, ready to write to disk or serve over HTTP.
#[derive(Debug, Clone)]
pub struct VisualizationArtifact {
    /// PNG-encoded figure.
    pub png: Vec<u8>,
    /// Figure width in pixels.
    pub width: u32,
    /// Figure height in pixels.
    pub height: u32,
    /// Title drawn across the top of the figure.
    pub title: String,
}

impl VisualizationArtifact {
    pub fn byte_len(&self) -> usize {
        self.png.len()
    }
}

/// Render `raster` through `params` and compose the full figure.
///
/// The colorbar spans the panel height; tick labels mark five evenly
/// spaced values across the params range, bottom to top.
pub fn render_figure<T: RasterElement>(
    raster: &Raster<T>,
    params: &ColormapParams,
    title: &str,
) -> Result<VisualizationArtifact, FigureError> {
    let (rows, cols) = raster.shape();
    if rows == 0 || cols == 0 {
        return Err(FigureError::EmptyRaster);
    }
    let (panel_h, panel_w) = (rows as u32, cols as u32);

    let label_w = text_width(&format_tick(params.max)) as u32;
    let width = MARGIN + panel_w + PANEL_BAR_GAP + BAR_WIDTH + TICK_GAP + label_w + MARGIN;
    let height = MARGIN + TITLE_HEIGHT + panel_h + MARGIN;

    let mut img = RgbaImage::from_pixel(width, height, BACKGROUND);

    draw_text(&mut img, MARGIN, MARGIN + 2, title, INK);

    // Panel. Transparent (nodata) cells keep the background.
    let rgba = raster_to_rgba(raster, params);
    let panel_top = MARGIN + TITLE_HEIGHT;
    for row in 0..panel_h {
        for col in 0..panel_w {
            let off = ((row * panel_w + col) * 4) as usize;
            if rgba[off + 3] > 0 {
                img.put_pixel(
                    MARGIN + col,
                    panel_top + row,
                    Rgba([rgba[off], rgba[off + 1], rgba[off + 2], 255]),
                );
            }
        }
    }

    // Colorbar, high values at the top.
    let bar_left = MARGIN + panel_w + PANEL_BAR_GAP;
    for row in 0..panel_h {
        let t = if panel_h > 1 {
            1.0 - row as f64 / (panel_h - 1) as f64
        } else {
            1.0
        };
        let c = evaluate(params.scheme, t);
        for col in 0..BAR_WIDTH {
            img.put_pixel(bar_left + col, panel_top + row, Rgba([c.r, c.g, c.b, 255]));
        }
    }

    // Five tick labels from min (bottom) to max (top).
    let label_left = bar_left + BAR_WIDTH + TICK_GAP;
    for i in 0..5 {
        let frac = i as f64 / 4.0;
        let value = params.min + frac * (params.max - params.min);
        let y_center = panel_top as f64 + (1.0 - frac) * (panel_h.saturating_sub(1)) as f64;
        let y = (y_center - GLYPH_HEIGHT as f64 / 2.0)
            .clamp(panel_top as f64, (panel_top + panel_h) as f64 - GLYPH_HEIGHT as f64)
            as u32;
        draw_text(&mut img, label_left, y, &format_tick(value), INK);
    }

    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| FigureError::Encode(e.to_string()))?;

    Ok(VisualizationArtifact {
        png,
        width,
        height,
        title: title.to_string(),
    })
}

fn format_tick(value: f64) -> String {
    format!("{}", value.round() as i64)
}

fn draw_text(img: &mut RgbaImage, x: u32, y: u32, text: &str, color: Rgba<u8>) {
    let mut cursor = x;
    for c in text.chars() {
        let rows = glyph(c);
        for (dy, row) in rows.iter().enumerate() {
            for dx in 0..GLYPH_WIDTH {
                if row & (1 << (GLYPH_WIDTH - 1 - dx)) != 0 {
                    let px = cursor + dx as u32;
                    let py = y + dy as u32;
                    if px < img.width() && py < img.height() {
                        img.put_pixel(px, py, color);
                    }
                }
            }
        }
        cursor += GLYPH_ADVANCE as u32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheme::ColorScheme;

    fn gradient_raster() -> Raster<u8> {
        let mut r: Raster<u8> = Raster::new(32, 32);
        for row in 0..32 {
            for col in 0..32 {
                r.set(row, col, (row * 8) as u8).unwrap();
            }
        }
        r
    }

    #[test]
    fn produces_valid_png() {
        let raster = gradient_raster();
        let params = ColormapParams::byte_scaled(ColorScheme::RedYellowGreen);
        let fig = render_figure(&raster, &params, "NDVI 4.5, -74.1").unwrap();

        assert_eq!(&fig.png[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
        assert!(fig.byte_len() > 0);
        assert_eq!(fig.title, "NDVI 4.5, -74.1");

        let decoded = image::load_from_memory(&fig.png).unwrap();
        assert_eq!(decoded.width(), fig.width);
        assert_eq!(decoded.height(), fig.height);
    }

    #[test]
    fn figure_is_larger_than_panel() {
        let raster = gradient_raster();
        let params = ColormapParams::byte_scaled(ColorScheme::RedYellowGreen);
        let fig = render_figure(&raster, &params, "NDVI").unwrap();
        assert!(fig.width > 32);
        assert!(fig.height > 32);
    }

    #[test]
    fn empty_raster_is_rejected() {
        let raster: Raster<u8> = Raster::new(0, 0);
        let params = ColormapParams::byte_scaled(ColorScheme::Grayscale);
        assert!(matches!(
            render_figure(&raster, &params, "NDVI"),
            Err(FigureError::EmptyRaster)
        ));
    }
}
