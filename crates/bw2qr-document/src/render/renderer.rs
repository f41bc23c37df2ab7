// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Style renderer — turns a QR symbol into a framed, captioned PNG.
//
// Layers, back to front:
//
//   1. rounded frame in the frame color, on a transparent canvas
//   2. module raster (modules plus `border_px_size` quiet border)
//   3. logo badge, centred over the raster
//   4. caption, centred in the bottom band across the full frame width
//
// Every layer is composited with alpha-aware overlay, and the output only
// depends on (symbol, style, title, logo).

use std::sync::Arc;

use ab_glyph::{FontArc, PxScale};
use image::imageops;
use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::drawing::text_size;
use tracing::{debug, instrument};

use bw2qr_core::error::{Bw2QrError, Result};
use bw2qr_core::{Color, Palette, PixelRect, RasterFormat, RenderedImage, StyleConfig};

use crate::image::processor::ImageProcessor;
use crate::qr::symbol::QrSymbol;
use crate::render::caption::{draw_caption, fit_title};
use crate::render::context::ImagingContext;
use crate::render::frame::fill_rounded_rect;

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

fn rgba(color: Color) -> Rgba<u8> {
    Rgba(color.rgba())
}

/// Pixel geometry of one rendered image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub width: u32,
    pub height: u32,
    /// Module raster plus its quiet border.
    pub symbol: PixelRect,
    /// Bottom band of the frame, full image width, where the caption goes.
    pub caption_band: PixelRect,
}

/// Renders QR symbols with one fixed style.
pub struct StyleRenderer {
    style: StyleConfig,
    palette: Palette,
    font: Option<FontArc>,
    _context: Arc<ImagingContext>,
}

impl std::fmt::Debug for StyleRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StyleRenderer")
            .field("style", &self.style)
            .field("has_font", &self.font.is_some())
            .finish_non_exhaustive()
    }
}

impl StyleRenderer {
    /// Validate `style`, initialise the imaging context and resolve the font.
    #[instrument(skip_all, fields(font = %style.frame_font_family))]
    pub fn new(style: StyleConfig) -> Result<Self> {
        style.validate()?;
        let palette = style.palette()?;
        let context = ImagingContext::acquire();
        let font = if style.frame_font_size > 0.0 {
            context.font(&style.frame_font_family)
        } else {
            None
        };
        Ok(Self {
            style,
            palette,
            font,
            _context: context,
        })
    }

    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    /// Whether captions can be drawn.
    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Geometry for a symbol of `symbol_size` modules.
    ///
    /// Fails with `InvalidArgument` when the image would not fit in `u32`
    /// pixel coordinates.
    pub fn layout(&self, symbol_size: usize) -> Result<Layout> {
        let s = &self.style;
        let (width, height) = u32::try_from(symbol_size)
            .ok()
            .and_then(|modules| s.canvas_size(modules))
            .ok_or_else(|| {
                Bw2QrError::InvalidArgument(format!(
                    "a {symbol_size}-module symbol is too large for the style's pixel sizes"
                ))
            })?;
        let frame = s.frame_border_width_size;
        let side = width - 2 * frame;
        Ok(Layout {
            width,
            height,
            symbol: PixelRect {
                x: frame,
                y: frame,
                width: side,
                height: side,
            },
            caption_band: PixelRect {
                x: 0,
                y: frame + side,
                width,
                height: s.frame_border_height_size,
            },
        })
    }

    /// Render `symbol` with an optional caption and logo.
    ///
    /// An empty `title` disables the caption; `logo` is ignored when the
    /// style's logo size is 0.
    #[instrument(skip_all, fields(size = symbol.size(), has_logo = logo.is_some()))]
    pub fn render(
        &self,
        symbol: &QrSymbol,
        title: &str,
        logo: Option<&DynamicImage>,
    ) -> Result<RenderedImage> {
        let layout = self.layout(symbol.size())?;
        let mut canvas = RgbaImage::from_pixel(layout.width, layout.height, TRANSPARENT);

        fill_rounded_rect(
            &mut canvas,
            0,
            0,
            layout.width,
            layout.height,
            self.style.frame_border_radius,
            rgba(self.palette.frame),
        );

        let raster = self.module_raster(symbol, layout.symbol.width);
        imageops::overlay(
            &mut canvas,
            &raster,
            i64::from(layout.symbol.x),
            i64::from(layout.symbol.y),
        );

        let logo = logo.filter(|_| self.style.frame_logo_size > 0);
        if let Some(logo) = logo {
            let badge = self.badge(logo);
            let x = i64::from(layout.symbol.x)
                + (i64::from(layout.symbol.width) - i64::from(badge.width())) / 2;
            let y = i64::from(layout.symbol.y)
                + (i64::from(layout.symbol.height) - i64::from(badge.height())) / 2;
            imageops::overlay(&mut canvas, &badge, x, y);
        }

        if self.style.has_caption(title) {
            self.caption(&mut canvas, title, layout.caption_band);
        }

        let data = ImageProcessor::from_rgba(canvas).to_png_bytes()?;
        debug!(
            width = layout.width,
            height = layout.height,
            bytes = data.len(),
            "qr image rendered"
        );

        Ok(RenderedImage {
            width: layout.width,
            height: layout.height,
            format: RasterFormat::Png,
            data,
            symbol_area: layout.symbol,
            module_px: self.style.module_px_size,
            has_logo: logo.is_some(),
        })
    }

    /// Modules as `module_px` squares on the background, with the quiet border.
    ///
    /// `side` comes from the checked layout.
    fn module_raster(&self, symbol: &QrSymbol, side: u32) -> RgbaImage {
        let m = self.style.module_px_size;
        let border = self.style.border_px_size;
        let dark = rgba(self.palette.module);
        let mut raster = RgbaImage::from_pixel(side, side, rgba(self.palette.background));

        for row in 0..symbol.size() {
            for col in 0..symbol.size() {
                if !symbol.is_dark(col, row) {
                    continue;
                }
                let x0 = border + col as u32 * m;
                let y0 = border + row as u32 * m;
                for y in y0..y0 + m {
                    for x in x0..x0 + m {
                        raster.put_pixel(x, y, dark);
                    }
                }
            }
        }
        raster
    }

    /// The logo resized to the logo size, on a rounded badge.
    fn badge(&self, logo: &DynamicImage) -> RgbaImage {
        let size = self.style.frame_logo_size;
        let padding = (size / 8).max(2);
        let side = size + 2 * padding;

        let mut badge = RgbaImage::from_pixel(side, side, TRANSPARENT);
        fill_rounded_rect(
            &mut badge,
            0,
            0,
            side,
            side,
            self.style.frame_border_radius / 2,
            rgba(self.palette.frame),
        );

        let icon = ImageProcessor::from_dynamic(logo.clone())
            .resize(size, size)
            .into_rgba();
        let x = (side - icon.width()) / 2;
        let y = (side - icon.height()) / 2;
        imageops::overlay(&mut badge, &icon, i64::from(x), i64::from(y));
        badge
    }

    fn caption(&self, canvas: &mut RgbaImage, title: &str, band: PixelRect) {
        let Some(font) = &self.font else {
            debug!("no font, caption skipped");
            return;
        };
        let size = self.style.frame_font_size as f32;
        let scale = PxScale::from(size);
        let text = fit_title(title, band.width, |candidate| {
            text_size(scale, font, candidate).0
        });
        draw_caption(canvas, font, size, rgba(self.palette.font), &text, band);
    }
}
