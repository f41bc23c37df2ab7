// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer — lays rendered QR codes out in page grids.
//
// Every page is a `printpdf` op list: an optional header text section,
// then one image XObject per grid cell.

use std::path::Path;

use bw2qr_core::error::{Bw2QrError, Result};
use bw2qr_core::{PaperSize, RenderedImage};
use printpdf::{
    BuiltinFont, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Point, Pt, RawImage,
    RawImageData, RawImageFormat, TextItem, XObjectTransform,
};
use tracing::{debug, info, instrument};

use crate::image::processor::ImageProcessor;

/// Native resolution of rendered images on paper.
const DPI: f32 = 150.0;

/// Minimum distance between the grid and the page edge.
const MARGIN_MM: f32 = 10.0;

const HEADER_FONT_SIZE_PT: f32 = 9.0;

/// Places rendered images on pages, `columns` x `rows` per page.
pub struct PdfWriter {
    paper_size: PaperSize,
    /// Document title; "bw2qr" when unset.
    title: Option<String>,
    /// Line printed at the top of every page.
    header: Option<String>,
}

impl PdfWriter {
    pub fn new(paper_size: PaperSize) -> Self {
        Self {
            paper_size,
            title: None,
            header: None,
        }
    }

    pub fn a4() -> Self {
        Self::new(PaperSize::A4)
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Print `header` at the top of each page (e.g. the encryption IV).
    pub fn set_header(&mut self, header: impl Into<String>) {
        self.header = Some(header.into());
    }

    /// Lay `images` out row-major, `columns * rows` per page.
    ///
    /// Cells are sized for the largest image at 150 dpi. The grid is scaled
    /// down uniformly when it does not fit inside the page margins, and is
    /// centred on the page. No images yields a single blank page.
    #[instrument(skip(self, images), fields(images = images.len()))]
    pub fn place(&self, images: &[RenderedImage], columns: usize, rows: usize) -> Result<Vec<u8>> {
        if columns == 0 || rows == 0 {
            return Err(Bw2QrError::InvalidArgument(format!(
                "page grid must be at least 1x1, got {columns}x{rows}"
            )));
        }

        let (w_mm, h_mm) = self.paper_size.dimensions_mm();
        let (page_w, page_h) = (Mm(w_mm as f32), Mm(h_mm as f32));
        let title = self.title.as_deref().unwrap_or("bw2qr");
        info!(paper = ?self.paper_size, title, columns, rows, "Creating QR code PDF");

        let page_w_pt = page_w.into_pt().0;
        let page_h_pt = page_h.into_pt().0;
        let margin_pt = Mm(MARGIN_MM).into_pt().0;

        let cell_w_pt = images.iter().map(|i| px_to_pt(i.width)).fold(0.0, f32::max);
        let cell_h_pt = images.iter().map(|i| px_to_pt(i.height)).fold(0.0, f32::max);
        let grid_w_pt = cell_w_pt * columns as f32;
        let grid_h_pt = cell_h_pt * rows as f32;

        // Do not upscale.
        let scale = if grid_w_pt > 0.0 && grid_h_pt > 0.0 {
            let usable_w = page_w_pt - 2.0 * margin_pt;
            let usable_h = page_h_pt - 2.0 * margin_pt;
            (usable_w / grid_w_pt).min(usable_h / grid_h_pt).min(1.0)
        } else {
            1.0
        };

        // Margins: page minus grid occupancy, split evenly.
        let left_pt = (page_w_pt - grid_w_pt * scale) / 2.0;
        let top_pt = (page_h_pt - grid_h_pt * scale) / 2.0;

        let mut doc = PdfDocument::new(title);
        let mut pages: Vec<PdfPage> = Vec::new();

        for chunk in images.chunks(columns * rows) {
            let mut ops = self.header_ops(page_h_pt, margin_pt);

            for (index, image) in chunk.iter().enumerate() {
                let raw = to_raw_image(image)?;
                let xobject_id = doc.add_image(&raw);

                let (col, row) = (index % columns, index / columns);
                let img_w_pt = px_to_pt(image.width) * scale;
                let img_h_pt = px_to_pt(image.height) * scale;
                let x = left_pt + col as f32 * cell_w_pt * scale + (cell_w_pt * scale - img_w_pt) / 2.0;
                // PDF origin is bottom-left.
                let y = page_h_pt
                    - top_pt
                    - (row + 1) as f32 * cell_h_pt * scale
                    + (cell_h_pt * scale - img_h_pt) / 2.0;

                ops.push(Op::UseXobject {
                    id: xobject_id,
                    transform: XObjectTransform {
                        translate_x: Some(Pt(x)),
                        translate_y: Some(Pt(y)),
                        scale_x: Some(scale),
                        scale_y: Some(scale),
                        dpi: Some(DPI),
                        rotate: None,
                    },
                });
            }

            pages.push(PdfPage::new(page_w, page_h, ops));
        }

        if pages.is_empty() {
            pages.push(PdfPage::new(page_w, page_h, self.header_ops(page_h_pt, margin_pt)));
        }

        doc.with_pages(pages);

        debug!(pages = doc.pages.len(), scale, "Grid layout complete");

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);
        if !warnings.is_empty() {
            debug!(warnings = warnings.len(), "printpdf reported warnings");
        }
        Ok(bytes)
    }

    /// Lay out and write the PDF directly to a file.
    pub fn write_to_file(
        &self,
        images: &[RenderedImage],
        columns: usize,
        rows: usize,
        path: impl AsRef<Path>,
    ) -> Result<()> {
        let bytes = self.place(images, columns, rows)?;
        std::fs::write(path.as_ref(), &bytes)?;
        info!(path = %path.as_ref().display(), bytes = bytes.len(), "Wrote PDF");
        Ok(())
    }

    /// Text ops for the header line, placed inside the top margin.
    fn header_ops(&self, page_h_pt: f32, margin_pt: f32) -> Vec<Op> {
        let Some(header) = &self.header else {
            return Vec::new();
        };
        vec![
            Op::StartTextSection,
            Op::SetTextCursor {
                pos: Point {
                    x: Pt(margin_pt),
                    y: Pt(page_h_pt - margin_pt / 2.0 - HEADER_FONT_SIZE_PT / 2.0),
                },
            },
            Op::SetFontSizeBuiltinFont {
                size: Pt(HEADER_FONT_SIZE_PT),
                font: BuiltinFont::Courier,
            },
            Op::WriteTextBuiltinFont {
                items: vec![TextItem::Text(header.clone())],
                font: BuiltinFont::Courier,
            },
            Op::EndTextSection,
        ]
    }
}

fn px_to_pt(px: u32) -> f32 {
    px as f32 / DPI * 72.0
}

/// Decode a rendered PNG into an opaque RGB raw image for printpdf.
fn to_raw_image(image: &RenderedImage) -> Result<RawImage> {
    let rgb = ImageProcessor::from_bytes(&image.data)
        .map_err(|err| Bw2QrError::PdfError(format!("failed to decode image for PDF: {err}")))?
        .flatten(::image::Rgba([255, 255, 255, 255]))
        .into_dynamic()
        .to_rgb8();
    let (width, height) = (rgb.width() as usize, rgb.height() as usize);
    Ok(RawImage {
        pixels: RawImageData::U8(rgb.into_raw()),
        width,
        height,
        data_format: RawImageFormat::RGB8,
        tag: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bw2qr_core::{PixelRect, RasterFormat};

    fn image(width: u32, height: u32) -> RenderedImage {
        let data = ImageProcessor::from_rgba(image::RgbaImage::from_pixel(
            width,
            height,
            image::Rgba([0, 0, 0, 255]),
        ))
        .to_png_bytes()
        .unwrap();
        RenderedImage {
            width,
            height,
            format: RasterFormat::Png,
            data,
            symbol_area: PixelRect {
                x: 0,
                y: 0,
                width,
                height,
            },
            module_px: 1,
            has_logo: false,
        }
    }

    fn page_count(pdf: &[u8]) -> usize {
        lopdf::Document::load_mem(pdf).unwrap().get_pages().len()
    }

    #[test]
    fn images_fill_pages_row_major() {
        let images: Vec<_> = (0..7).map(|_| image(40, 50)).collect();
        let pdf = PdfWriter::a4().place(&images, 2, 3).unwrap();
        assert!(pdf.starts_with(b"%PDF"));
        assert_eq!(page_count(&pdf), 2);
    }

    #[test]
    fn exact_multiple_does_not_add_a_page() {
        let images: Vec<_> = (0..6).map(|_| image(40, 50)).collect();
        assert_eq!(page_count(&PdfWriter::a4().place(&images, 2, 3).unwrap()), 1);
    }

    #[test]
    fn no_images_yields_one_blank_page() {
        assert_eq!(page_count(&PdfWriter::a4().place(&[], 2, 3).unwrap()), 1);
    }

    #[test]
    fn empty_grid_is_rejected() {
        assert!(matches!(
            PdfWriter::a4().place(&[image(4, 4)], 0, 3),
            Err(Bw2QrError::InvalidArgument(_))
        ));
    }

    #[test]
    fn oversized_grid_is_scaled_down() {
        // 3000 px at 150 dpi is 20 inches, far larger than A5.
        let images: Vec<_> = (0..4).map(|_| image(3000, 3000)).collect();
        let pdf = PdfWriter::new(PaperSize::A5).place(&images, 2, 2).unwrap();
        assert_eq!(page_count(&pdf), 1);
    }

    fn text_sections(pdf: &[u8]) -> usize {
        let doc = lopdf::Document::load_mem(pdf).unwrap();
        let (_, page_id) = doc.get_pages().into_iter().next().unwrap();
        let content = doc.get_page_content(page_id).unwrap();
        lopdf::content::Content::decode(&content)
            .unwrap()
            .operations
            .iter()
            .filter(|op| op.operator == "BT")
            .count()
    }

    #[test]
    fn header_is_printed_on_every_page() {
        let mut writer = PdfWriter::new(PaperSize::Letter);
        writer.set_title("Vault backup");
        let images: Vec<_> = (0..3).map(|_| image(10, 10)).collect();
        assert_eq!(text_sections(&writer.place(&images, 1, 1).unwrap()), 0);

        writer.set_header("IV: AAECAwQFBgcICQoLDA0ODw==");
        let pdf = writer.place(&images, 1, 1).unwrap();
        assert_eq!(page_count(&pdf), 3);
        assert_eq!(text_sections(&pdf), 1);
    }

    #[test]
    fn write_to_file_creates_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("codes.pdf");
        PdfWriter::a4()
            .write_to_file(&[image(20, 20)], 3, 4, &path)
            .unwrap();
        assert_eq!(page_count(&std::fs::read(&path).unwrap()), 1);
    }
}
