use std::path::{Path, PathBuf};

use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
    Rgb,
};

use crate::error::Result;
use crate::models::Resource;

const PAGE_WIDTH: f32 = 215.9;
const PAGE_HEIGHT: f32 = 279.4;
const MARGIN: f32 = 19.05;
const PT_TO_MM: f32 = 0.3528;
/// Average Helvetica glyph width as a fraction of the font size.
const AVG_GLYPH_WIDTH: f32 = 0.5;

const BRAND: &str = "Alyssa Harper Helps";
const FOOTER: &str = "(c) 2025 Alyssa Harper Helps | Follow @alyssaharperadvice on TikTok";

const PINK: (f32, f32, f32) = (1.0, 0.0, 0.431);
const CYAN: (f32, f32, f32) = (0.0, 0.949, 0.918);
const INK: (f32, f32, f32) = (0.0, 0.0, 0.0);

#[derive(Clone, Copy)]
struct TextStyle {
    size: f32,
    bold: bool,
    color: (f32, f32, f32),
    centered: bool,
    leading: f32,
    space_after: f32,
}

const TITLE: TextStyle = TextStyle { size: 24.0, bold: true, color: PINK, centered: true, leading: 1.2, space_after: 4.2 };
const SUBTITLE: TextStyle = TextStyle { size: 14.0, bold: false, color: CYAN, centered: true, leading: 1.2, space_after: 7.0 };
const HEADING: TextStyle = TextStyle { size: 16.0, bold: true, color: PINK, centered: false, leading: 1.2, space_after: 3.5 };
const BODY: TextStyle = TextStyle { size: 11.0, bold: false, color: INK, centered: false, leading: 1.45, space_after: 3.5 };

/// Lays text out top to bottom, starting a new page when the cursor
/// reaches the bottom margin.
struct Layout {
    doc: PdfDocumentReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    layer: PdfLayerReference,
    cursor: f32,
    pages: usize,
}

impl Layout {
    fn new(title: &str) -> Result<Self> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
        let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;
        let layer = doc.get_page(page).get_layer(layer);
        Ok(Self {
            doc,
            regular,
            bold,
            layer,
            cursor: PAGE_HEIGHT - MARGIN,
            pages: 1,
        })
    }

    fn space(&mut self, mm: f32) {
        self.cursor -= mm;
    }

    fn ensure_room(&mut self, height: f32) {
        if self.cursor - height >= MARGIN {
            return;
        }
        self.pages += 1;
        let (page, layer) = self.doc.add_page(
            Mm(PAGE_WIDTH),
            Mm(PAGE_HEIGHT),
            format!("Layer {}", self.pages),
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.cursor = PAGE_HEIGHT - MARGIN;
    }

    fn paragraph(&mut self, text: &str, style: TextStyle) {
        let text = pdf_safe(text);
        let size_mm = style.size * PT_TO_MM;
        let line_height = size_mm * style.leading;
        let chars_per_line = ((PAGE_WIDTH - 2.0 * MARGIN) / (size_mm * AVG_GLYPH_WIDTH)) as usize;

        let (r, g, b) = style.color;
        for line in textwrap::wrap(&text, chars_per_line.max(10)) {
            self.ensure_room(line_height);
            self.cursor -= line_height;

            let x = if style.centered {
                let width = line.chars().count() as f32 * size_mm * AVG_GLYPH_WIDTH;
                ((PAGE_WIDTH - width) / 2.0).max(MARGIN)
            } else {
                MARGIN
            };
            let font = if style.bold { &self.bold } else { &self.regular };

            self.layer.set_fill_color(Color::Rgb(Rgb::new(r, g, b, None)));
            self.layer
                .use_text(&*line, style.size, Mm(x), Mm(self.cursor), font);
        }
        self.space(style.space_after);
    }

    fn finish(self) -> Result<Vec<u8>> {
        Ok(self.doc.save_to_bytes()?)
    }
}

/// Render the branded PDF for one resource.
pub fn render_resource(resource: &Resource) -> Result<Vec<u8>> {
    let mut layout = Layout::new(&resource.title)?;

    layout.paragraph(BRAND, SUBTITLE);
    layout.paragraph(&resource.title, TITLE);
    layout.paragraph(
        &format!("Day {} | {}", resource.day, resource.category),
        SUBTITLE,
    );
    layout.space(7.6);

    if !resource.hook.is_empty() {
        layout.paragraph(&resource.hook, HEADING);
        layout.space(2.5);
    }

    if !resource.key_points.is_empty() {
        layout.paragraph("Key Takeaways:", HEADING);
        for point in &resource.key_points {
            layout.paragraph(&format!("-> {}", point), BODY);
        }
        layout.space(5.1);
    }

    for para in resource.full_content.split("\n\n") {
        let para = para.trim();
        if para.is_empty() {
            continue;
        }
        layout.paragraph(para, BODY);
        layout.space(2.5);
    }

    layout.space(12.7);
    layout.paragraph(FOOTER, SUBTITLE);

    layout.finish()
}

/// Render and write the PDF under `dir`, named by [`Resource::pdf_filename`].
pub fn write_resource_pdf(resource: &Resource, dir: &Path) -> Result<PathBuf> {
    let bytes = render_resource(resource)?;
    std::fs::create_dir_all(dir)?;
    let path = dir.join(resource.pdf_filename());
    std::fs::write(&path, bytes)?;
    Ok(path)
}

/// The built-in PDF fonts only cover Latin-1; fold common typographic
/// characters to ASCII and drop what is left outside that range.
fn pdf_safe(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            '\u{2018}' | '\u{2019}' => Some('\''),
            '\u{201C}' | '\u{201D}' => Some('"'),
            '\u{2013}' | '\u{2014}' => Some('-'),
            '\u{2022}' => Some('*'),
            '\u{2026}' => Some('.'),
            '\n' | '\r' | '\t' => Some(' '),
            c if (c as u32) < 0x100 => Some(c),
            _ => None,
        })
        .collect()
}
