//! Canvas rasterizer
//!
//! Captures an element of the report tree as an RGB bitmap. Every capture
//! works on a neutralized clone (form controls turned into static text) and
//! runs on tokio's blocking pool so the exporter can await it.

pub mod layout;
pub mod paint;
pub mod text;

use crate::assets::AssetStore;
use crate::error::{IrshadError, Result};
use crate::fonts::FontHandle;
use image::RgbImage;
use irshad_common::dom::Element;
use irshad_common::layout::{A4_WIDTH_PX, CAPTURE_SCALE};
use irshad_common::neutralize;
use std::sync::Arc;
use text::TextShaper;
use tiny_skia::Pixmap;

/// Opaque RGB raster, 3 bytes per pixel, rows top to bottom
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedBitmap {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl CapturedBitmap {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Solid white bitmap
    pub fn blank(width: u32, height: u32) -> Self {
        Self::new(width, height, vec![255; (width * height * 3) as usize])
    }

    /// Drop alpha from a pixmap painted over opaque white
    pub fn from_pixmap(pixmap: &Pixmap) -> Self {
        let pixels = pixmap
            .data()
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect();
        Self::new(pixmap.width(), pixmap.height(), pixels)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn to_rgb_image(&self) -> Option<RgbImage> {
        RgbImage::from_raw(self.width, self.height, self.pixels.clone())
    }

    /// Rows `y..y + height`, clamped to the bitmap
    pub fn crop_rows(&self, y: u32, height: u32) -> Result<CapturedBitmap> {
        let image = self
            .to_rgb_image()
            .ok_or_else(|| IrshadError::Capture("bitmap size mismatch".to_string()))?;
        let y = y.min(self.height);
        let height = height.min(self.height - y);
        let strip = image::imageops::crop_imm(&image, 0, y, self.width, height).to_image();
        Ok(Self::new(strip.width(), strip.height(), strip.into_raw()))
    }
}

/// Turns an element into pixels
pub trait Rasterizer: Send + Sync {
    fn rasterize(&self, element: &Element, font: &FontHandle) -> Result<CapturedBitmap>;
}

/// Lays the element out at A4 width and paints it with tiny-skia
#[derive(Debug, Clone)]
pub struct CanvasRasterizer {
    assets: AssetStore,
    scale: f32,
    viewport_width: f32,
}

impl CanvasRasterizer {
    pub fn new(assets: AssetStore) -> Self {
        Self {
            assets,
            scale: CAPTURE_SCALE,
            viewport_width: A4_WIDTH_PX,
        }
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        if scale > 0.0 {
            self.scale = scale;
        }
        self
    }
}

impl Rasterizer for CanvasRasterizer {
    fn rasterize(&self, element: &Element, font: &FontHandle) -> Result<CapturedBitmap> {
        let shaper = TextShaper::new(font);
        let list = layout::layout(element, self.viewport_width, &shaper, &self.assets)?;
        log::debug!(
            "layout: {} items, {:.0}x{:.0}px",
            list.items.len(),
            list.width,
            list.height
        );
        paint::paint(&list, self.scale, &shaper)
    }
}

/// Neutralize a clone of `element` and rasterize it on the blocking pool
pub async fn capture(
    rasterizer: Arc<dyn Rasterizer>,
    font: &FontHandle,
    element: &Element,
) -> Result<CapturedBitmap> {
    let clone = neutralize(element);
    let font = font.clone();
    tokio::task::spawn_blocking(move || rasterizer.rasterize(&clone, &font))
        .await
        .map_err(|e| IrshadError::Capture(format!("capture task failed: {}", e)))?
}
