//! # PDF Backend
//!
//! A from-scratch PDF 1.7 writer behind the [`Backend`] trait. Drawing calls
//! append operators to the current page's content stream; `save` assembles
//! the object graph and serializes it.
//!
//! ## PDF Structure (simplified)
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- objects (fonts, pages, content streams, images)
//! 2 0 obj ... endobj
//! ...
//! xref                <- cross-reference table (byte offsets of each object)
//! trailer             <- points to the root object
//! %%EOF
//! ```
//!
//! Only the standard Type1 fonts are used, so nothing needs embedding. Text
//! is encoded as WinAnsi.

use std::collections::HashMap;
use std::fmt::Write as FmtWrite; // for write! on String
use std::io::Write as IoWrite; // for write! on Vec<u8>

use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::backend::Backend;
use crate::component::{wrap_text, ParagraphStyle, TableBlock};
use crate::config::Metadata;
use crate::error::Result;
use crate::geometry::Rect;
use crate::image_loader::{load_image, ImagePixelData, LoadedImage};
use crate::style::{Color, StandardFont, TextAlign};
use crate::table::CellStyles;

/// Approximate cap height of the standard fonts as a fraction of the size.
const ASCENT: f64 = 0.8;

/// Content of a finished page, waiting for `save`.
struct FinishedPage {
    width: f64,
    height: f64,
    content: String,
    /// Indexes into `PdfBackend::images` used on this page.
    images: Vec<usize>,
}

/// Writes everything it is asked to draw into a PDF document.
pub struct PdfBackend {
    metadata: Metadata,
    pages: Vec<FinishedPage>,
    content: String,
    page_images: Vec<usize>,
    /// Fonts in order of first use; the index is the `/F<n>` resource name.
    fonts: Vec<StandardFont>,
    images: Vec<LoadedImage>,
    image_by_source: HashMap<String, usize>,
}

struct PdfObject {
    data: Vec<u8>,
}

impl PdfBackend {
    pub fn new(metadata: Metadata) -> Self {
        Self {
            metadata,
            pages: Vec::new(),
            content: String::new(),
            page_images: Vec::new(),
            fonts: Vec::new(),
            images: Vec::new(),
            image_by_source: HashMap::new(),
        }
    }

    fn font_resource(&mut self, font: StandardFont) -> usize {
        match self.fonts.iter().position(|f| *f == font) {
            Some(i) => i,
            None => {
                self.fonts.push(font);
                self.fonts.len() - 1
            }
        }
    }

    fn image_resource(&mut self, source: &str) -> Result<usize> {
        if let Some(&idx) = self.image_by_source.get(source) {
            return Ok(idx);
        }
        let image = load_image(source)?;
        self.images.push(image);
        let idx = self.images.len() - 1;
        self.image_by_source.insert(source.to_string(), idx);
        Ok(idx)
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let _ = write!(
            self.content,
            "q\n{:.3} {:.3} {:.3} rg\n{:.2} {:.2} {:.2} {:.2} re\nf\nQ\n",
            color.r, color.g, color.b, rect.x, rect.y, rect.width, rect.height
        );
    }

    fn stroke_line(&mut self, x1: f64, x2: f64, y: f64, weight: f64, color: Color) {
        let _ = write!(
            self.content,
            "q\n{:.3} {:.3} {:.3} RG\n{:.2} w\n{:.2} {:.2} m\n{:.2} {:.2} l\nS\nQ\n",
            color.r, color.g, color.b, weight, x1, y, x2, y
        );
    }

    /// One line of text with its baseline at `baseline`, aligned in
    /// `[left, left + width]`.
    #[allow(clippy::too_many_arguments)]
    fn show_text(
        &mut self,
        text: &str,
        font: StandardFont,
        font_size: f64,
        color: Color,
        align: TextAlign,
        left: f64,
        width: f64,
        baseline: f64,
    ) {
        let text_width = font.measure(text, font_size);
        let x = match align {
            TextAlign::Left => left,
            TextAlign::Right => left + width - text_width,
            TextAlign::Center => left + (width - text_width) / 2.0,
        };
        let idx = self.font_resource(font);
        let _ = write!(
            self.content,
            "BT\n{:.3} {:.3} {:.3} rg\n/F{} {:.1} Tf\n{:.2} {:.2} Td\n({}) Tj\nET\n",
            color.r,
            color.g,
            color.b,
            idx,
            font_size,
            x,
            baseline,
            Self::encode_text(text)
        );
    }

    /// Escape and WinAnsi-encode a string for a `( ... ) Tj` operator.
    fn encode_text(text: &str) -> String {
        let mut out = String::new();
        for ch in text.chars() {
            let b = Self::unicode_to_winansi(ch).unwrap_or(b'?');
            match b {
                b'\\' => out.push_str("\\\\"),
                b'(' => out.push_str("\\("),
                b')' => out.push_str("\\)"),
                0x20..=0x7E => out.push(b as char),
                _ => {
                    let _ = write!(out, "\\{:03o}", b);
                }
            }
        }
        out
    }

    /// A PDF text string for the Info dictionary. Printable ASCII stays a
    /// literal string; anything else is UTF-16BE with a byte order mark,
    /// written as a hex string.
    fn pdf_text_string(s: &str) -> String {
        if s.bytes().all(|b| (0x20..=0x7E).contains(&b)) {
            return format!("({})", Self::escape_pdf_string(s));
        }
        let mut out = String::from("<FEFF");
        for unit in s.encode_utf16() {
            let _ = write!(out, "{:04X}", unit);
        }
        out.push('>');
        out
    }

    /// Escape special characters in a PDF string.
    fn escape_pdf_string(s: &str) -> String {
        s.replace('\\', "\\\\")
            .replace('(', "\\(")
            .replace(')', "\\)")
    }

    /// Map a Unicode codepoint to a WinAnsiEncoding byte value.
    fn unicode_to_winansi(ch: char) -> Option<u8> {
        let cp = ch as u32;
        if (0x20..=0x7E).contains(&cp) || (0xA0..=0xFF).contains(&cp) {
            return Some(cp as u8);
        }
        match cp {
            0x20AC => Some(0x80), // Euro sign
            0x2026 => Some(0x85), // Horizontal ellipsis
            0x2018 => Some(0x91), // Left single quotation mark
            0x2019 => Some(0x92), // Right single quotation mark
            0x201C => Some(0x93), // Left double quotation mark
            0x201D => Some(0x94), // Right double quotation mark
            0x2022 => Some(0x95), // Bullet
            0x2013 => Some(0x96), // En dash
            0x2014 => Some(0x97), // Em dash
            0x2122 => Some(0x99), // Trade mark sign
            _ => None,
        }
    }

    fn stream_object(dict: &str, payload: &[u8]) -> PdfObject {
        let mut data: Vec<u8> = Vec::new();
        let _ = write!(data, "<< {} /Length {} >>\nstream\n", dict, payload.len());
        data.extend_from_slice(payload);
        data.extend_from_slice(b"\nendstream");
        PdfObject { data }
    }

    /// Write one image as an XObject (plus its SMask). Returns the object id.
    fn write_image_xobject(objects: &mut Vec<PdfObject>, image: &LoadedImage) -> usize {
        match &image.pixel_data {
            ImagePixelData::Jpeg { data, color_space } => {
                let dict = format!(
                    "/Type /XObject /Subtype /Image /Width {} /Height {} \
                     /ColorSpace {} /BitsPerComponent 8 /Filter /DCTDecode",
                    image.width_px,
                    image.height_px,
                    color_space.pdf_name()
                );
                objects.push(Self::stream_object(&dict, data));
                objects.len() - 1
            }
            ImagePixelData::Decoded { rgb, alpha } => {
                let smask_ref = alpha
                    .as_ref()
                    .map(|alpha| {
                        let dict = format!(
                            "/Type /XObject /Subtype /Image /Width {} /Height {} \
                             /ColorSpace /DeviceGray /BitsPerComponent 8 /Filter /FlateDecode",
                            image.width_px, image.height_px
                        );
                        objects.push(Self::stream_object(&dict, &compress_to_vec_zlib(alpha, 6)));
                        format!(" /SMask {} 0 R", objects.len() - 1)
                    })
                    .unwrap_or_default();

                let dict = format!(
                    "/Type /XObject /Subtype /Image /Width {} /Height {} \
                     /ColorSpace /DeviceRGB /BitsPerComponent 8 /Filter /FlateDecode{}",
                    image.width_px, image.height_px, smask_ref
                );
                objects.push(Self::stream_object(&dict, &compress_to_vec_zlib(rgb, 6)));
                objects.len() - 1
            }
        }
    }

    /// Assemble the object graph for every finished page.
    fn build_objects(&self) -> (Vec<PdfObject>, Option<usize>) {
        // 0 = placeholder (PDF objects are 1-indexed), 1 = Catalog, 2 = Pages
        let mut objects: Vec<PdfObject> = (0..3).map(|_| PdfObject { data: vec![] }).collect();

        let font_ids: Vec<usize> = self
            .fonts
            .iter()
            .map(|font| {
                let dict = format!(
                    "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                    font.pdf_name()
                );
                objects.push(PdfObject {
                    data: dict.into_bytes(),
                });
                objects.len() - 1
            })
            .collect();
        let font_resources = font_ids
            .iter()
            .enumerate()
            .map(|(i, id)| format!("/F{} {} 0 R", i, id))
            .collect::<Vec<_>>()
            .join(" ");

        let image_ids: Vec<usize> = self
            .images
            .iter()
            .map(|image| Self::write_image_xobject(&mut objects, image))
            .collect();

        let mut page_ids = Vec::with_capacity(self.pages.len());
        for page in &self.pages {
            let compressed = compress_to_vec_zlib(page.content.as_bytes(), 6);
            objects.push(Self::stream_object("/Filter /FlateDecode", &compressed));
            let content_id = objects.len() - 1;

            let mut resources = format!("/Font << {} >>", font_resources);
            if !page.images.is_empty() {
                let xobjects = page
                    .images
                    .iter()
                    .map(|idx| format!("/Im{} {} 0 R", idx, image_ids[*idx]))
                    .collect::<Vec<_>>()
                    .join(" ");
                let _ = write!(resources, " /XObject << {} >>", xobjects);
            }

            let page_dict = format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Contents {} 0 R /Resources << {} >> >>",
                page.width, page.height, content_id, resources
            );
            objects.push(PdfObject {
                data: page_dict.into_bytes(),
            });
            page_ids.push(objects.len() - 1);
        }

        objects[1].data = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();
        let kids = page_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        objects[2].data = format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids, page_ids.len())
            .into_bytes();

        let info_id = if self.metadata.title.is_some()
            || self.metadata.author.is_some()
            || self.metadata.subject.is_some()
        {
            let mut info = String::from("<< ");
            let fields = [
                ("Title", &self.metadata.title),
                ("Author", &self.metadata.author),
                ("Subject", &self.metadata.subject),
            ];
            for (key, value) in fields {
                if let Some(value) = value {
                    let _ = write!(info, "/{} {} ", key, Self::pdf_text_string(value));
                }
            }
            info.push_str("/Producer (Folio) >>");
            objects.push(PdfObject {
                data: info.into_bytes(),
            });
            Some(objects.len() - 1)
        } else {
            None
        };

        (objects, info_id)
    }

    /// Serialize all objects into the final PDF byte stream.
    fn serialize(objects: &[PdfObject], info_id: Option<usize>) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = vec![0; objects.len()];

        output.extend_from_slice(b"%PDF-1.7\n");
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, obj) in objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let _ = write!(output, "{} 0 obj\n", i);
            output.extend_from_slice(&obj.data);
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        let _ = write!(output, "xref\n0 {}\n", objects.len());
        let _ = write!(output, "0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            let _ = write!(output, "{:010} 00000 n \n", offset);
        }

        let _ = write!(output, "trailer\n<< /Size {} /Root 1 0 R", objects.len());
        if let Some(id) = info_id {
            let _ = write!(output, " /Info {} 0 R", id);
        }
        let _ = write!(output, " >>\nstartxref\n{}\n%%EOF\n", xref_offset);

        output
    }
}

impl Backend for PdfBackend {
    fn draw_image(&mut self, rect: Rect, source: &str) -> Result<()> {
        let idx = self.image_resource(source)?;
        if !self.page_images.contains(&idx) {
            self.page_images.push(idx);
        }
        let _ = write!(
            self.content,
            "q\n{:.4} 0 0 {:.4} {:.2} {:.2} cm\n/Im{} Do\nQ\n",
            rect.width, rect.height, rect.x, rect.y, idx
        );
        Ok(())
    }

    fn draw_text(&mut self, rect: Rect, text: &str, style: &ParagraphStyle) -> Result<f64> {
        let lines = wrap_text(text, style.font, style.font_size, rect.width);
        let first_baseline = rect.top() - style.font_size * ASCENT;
        for (i, line) in lines.iter().enumerate() {
            self.show_text(
                line,
                style.font,
                style.font_size,
                style.color,
                style.align,
                rect.x,
                rect.width,
                first_baseline - i as f64 * style.leading,
            );
        }
        Ok(lines.len() as f64 * style.leading)
    }

    fn draw_table(&mut self, rect: Rect, table: &TableBlock) -> Result<f64> {
        let styles = CellStyles::resolve(&table.spec);
        let widths = table.resolve_column_widths(rect.width);
        let row_height = table.row_height();
        let top = rect.top();

        let mut lefts = Vec::with_capacity(widths.len() + 1);
        let mut x = rect.x;
        for w in &widths {
            lefts.push(x);
            x += w;
        }
        lefts.push(x);

        for (r, row) in table.spec.cells.iter().enumerate() {
            let row_bottom = top - (r + 1) as f64 * row_height;
            for (c, text) in row.iter().enumerate().take(widths.len()) {
                let cell = styles.cell(r, c);
                if let Some(bg) = cell.background {
                    self.fill_rect(Rect::new(lefts[c], row_bottom, widths[c], row_height), bg);
                }
                self.show_text(
                    text,
                    cell.font,
                    table.font_size,
                    cell.text_color,
                    cell.align,
                    lefts[c] + table.cell_padding,
                    widths[c] - 2.0 * table.cell_padding,
                    row_bottom + table.cell_padding + table.font_size * (1.2 - ASCENT),
                );
            }
        }

        for line in &styles.lines {
            let y = top - line.boundary as f64 * row_height;
            self.stroke_line(lefts[line.first_col], lefts[line.last_col + 1], y, line.weight, line.color);
        }

        Ok(table.height())
    }

    fn finish_page(&mut self, page_size: (f64, f64)) -> Result<()> {
        self.pages.push(FinishedPage {
            width: page_size.0,
            height: page_size.1,
            content: std::mem::take(&mut self.content),
            images: std::mem::take(&mut self.page_images),
        });
        Ok(())
    }

    fn save(&mut self) -> Result<Vec<u8>> {
        let (objects, info_id) = self.build_objects();
        Ok(Self::serialize(&objects, info_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_loader::tests::png_bytes;
    use crate::table::{compile, DataTable, TableFlags};
    use base64::Engine;

    fn text_of(bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).into_owned()
    }

    fn content_of(backend: &PdfBackend, page: usize) -> &str {
        &backend.pages[page].content
    }

    #[test]
    fn test_escape_pdf_string() {
        assert_eq!(PdfBackend::escape_pdf_string("Hello (World)"), "Hello \\(World\\)");
        assert_eq!(PdfBackend::escape_pdf_string("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn test_info_strings_are_utf16_when_not_ascii() {
        assert_eq!(PdfBackend::pdf_text_string("Budget (Q3)"), "(Budget \\(Q3\\))");
        assert_eq!(PdfBackend::pdf_text_string("Årsbudget"), "<FEFF00C500720073006200750064006700650074>");
        assert_eq!(PdfBackend::pdf_text_string("€"), "<FEFF20AC>");
    }

    #[test]
    fn test_encode_text_uses_winansi() {
        assert_eq!(PdfBackend::encode_text("a(b)"), "a\\(b\\)");
        assert_eq!(PdfBackend::encode_text("120 \u{20AC}"), "120 \\200");
        assert_eq!(PdfBackend::encode_text("\u{4E2D}"), "?");
    }

    #[test]
    fn test_empty_document_is_valid_pdf() {
        let mut backend = PdfBackend::new(Metadata::default());
        backend.finish_page((595.28, 841.89)).unwrap();
        let bytes = backend.save().unwrap();

        assert!(bytes.starts_with(b"%PDF-1.7"));
        let text = text_of(&bytes);
        assert!(text.contains("xref"));
        assert!(text.contains("trailer"));
        assert!(text.contains("/MediaBox [0 0 595.28 841.89]"));
        assert!(text.ends_with("%%EOF\n"));
        assert!(!text.contains("/Info"));
    }

    #[test]
    fn test_metadata_in_info_dictionary() {
        let mut backend = PdfBackend::new(Metadata {
            title: Some("Budget (Q3)".to_string()),
            author: Some("Finance".to_string()),
            subject: Some("Översikt".to_string()),
        });
        backend.finish_page((100.0, 100.0)).unwrap();
        let text = text_of(&backend.save().unwrap());
        assert!(text.contains("/Subject <FEFF00D6"));
        assert!(text.contains("/Title (Budget \\(Q3\\))"));
        assert!(text.contains("/Author (Finance)"));
        assert!(text.contains("/Info"));
    }

    #[test]
    fn test_text_wraps_and_registers_font() {
        let mut backend = PdfBackend::new(Metadata::default());
        let style = ParagraphStyle {
            font: StandardFont::Courier,
            ..Default::default()
        };
        let used = backend
            .draw_text(Rect::new(10.0, 0.0, 60.0, 100.0), "aaaa bbbb cccc", &style)
            .unwrap();
        assert_eq!(used, 2.0 * style.leading);
        backend.finish_page((200.0, 200.0)).unwrap();

        let content = content_of(&backend, 0);
        assert!(content.contains("(aaaa bbbb) Tj"));
        assert!(content.contains("(cccc) Tj"));
        assert!(content.contains("/F0 10.0 Tf"));

        let text = text_of(&backend.save().unwrap());
        assert!(text.contains("/BaseFont /Courier"));
        assert!(text.contains("/Subtype /Type1"));
    }

    #[test]
    fn test_right_aligned_text_ends_at_right_edge() {
        let mut backend = PdfBackend::new(Metadata::default());
        let style = ParagraphStyle {
            font: StandardFont::Courier,
            align: TextAlign::Right,
            ..Default::default()
        };
        backend
            .draw_text(Rect::new(0.0, 0.0, 100.0, 20.0), "abcde", &style)
            .unwrap();
        // 5 chars * 6pt = 30pt wide, so it starts at 70.
        assert!(backend.content.contains("70.00 12.00 Td"));
    }

    #[test]
    fn test_table_draws_styles_in_order() {
        let data = DataTable::new(
            vec!["Label".into(), "Amount".into()],
            vec![vec!["a".into(), (-1.0).into()], vec!["b".into(), 2.0.into()]],
        )
        .unwrap();
        let flags = TableFlags {
            zebra_stripe: true,
            totals_line: true,
            negative_highlight_column: Some(2),
            ..Default::default()
        };
        let block = TableBlock::new(compile(&data, &flags).unwrap());
        let mut backend = PdfBackend::new(Metadata::default());
        let used = backend
            .draw_table(Rect::new(0.0, 0.0, 200.0, 300.0), &block)
            .unwrap();
        assert_eq!(used, block.height());

        let content = backend.content.clone();
        assert!(content.contains("(Label) Tj"));
        assert!(content.contains("1.000 0.000 0.000 rg"), "negative row should be red");
        assert!(content.contains("0.941 0.941 0.941 rg"), "zebra gray background");
        // Header separator and totals line.
        assert_eq!(content.matches(" l\nS\n").count(), 2);

        backend.finish_page((300.0, 300.0)).unwrap();
        let text = text_of(&backend.save().unwrap());
        assert!(text.contains("/BaseFont /Courier-Bold"));
        assert!(text.contains("/BaseFont /Courier "));
    }

    #[test]
    fn test_table_with_stale_widths_draws_every_column() {
        let data = DataTable::new(vec!["a".into(), "b".into()], vec![vec![1.0.into(), 2.0.into()]]).unwrap();
        let mut block = TableBlock::new(compile(&data, &TableFlags::default()).unwrap())
            .with_column_widths(vec![crate::units::Length::pt(40.0), crate::units::Length::pt(60.0)])
            .unwrap();
        for row in &mut block.spec.cells {
            row.push("extra".to_string());
        }

        let mut backend = PdfBackend::new(Metadata::default());
        backend.draw_table(Rect::new(0.0, 0.0, 300.0, 100.0), &block).unwrap();
        assert_eq!(backend.content.matches("(extra) Tj").count(), 2);
    }

    #[test]
    fn test_images_are_shared_between_pages() {
        let b64 = base64::engine::general_purpose::STANDARD.encode(png_bytes(2, 2, [10, 20, 30, 255]));
        let src = format!("data:image/png;base64,{}", b64);

        let mut backend = PdfBackend::new(Metadata::default());
        backend.draw_image(Rect::new(0.0, 0.0, 20.0, 20.0), &src).unwrap();
        backend.finish_page((100.0, 100.0)).unwrap();
        backend.draw_image(Rect::new(50.0, 50.0, 20.0, 20.0), &src).unwrap();
        backend.finish_page((100.0, 100.0)).unwrap();

        assert_eq!(backend.images.len(), 1);
        assert!(content_of(&backend, 1).contains("/Im0 Do"));
        let text = text_of(&backend.save().unwrap());
        assert_eq!(text.matches("/Subtype /Image").count(), 1);
        assert_eq!(text.matches("/XObject << /Im0").count(), 2);
    }

    #[test]
    fn test_missing_image_propagates() {
        let mut backend = PdfBackend::new(Metadata::default());
        let err = backend
            .draw_image(Rect::new(0.0, 0.0, 1.0, 1.0), "./missing/logo.png")
            .unwrap_err();
        assert!(matches!(err, crate::error::FolioError::Image(_)));
    }
}
