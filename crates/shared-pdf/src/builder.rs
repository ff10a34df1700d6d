//! Building report documents from scratch.
//!
//! `ReportBuilder` accumulates pages of drawing commands and assembles the
//! final `lopdf` document in one pass: fonts, image XObjects, and alpha
//! graphics states are deduplicated across pages and referenced per page
//! through generated aliases.

use std::collections::{BTreeMap, BTreeSet};

use lopdf::{dictionary, Dictionary, Document, Object, Stream};

use crate::content::{embed_rgb_image, image_ops, rect_ops, text_ops};
use crate::error::PdfError;

/// Handle to an image registered with [`ReportBuilder::add_image`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageHandle(usize);

enum DrawCmd {
    Text {
        font: String,
        size: f64,
        x: f64,
        y: f64,
        color: (f32, f32, f32),
        text: String,
    },
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: (f32, f32, f32),
        filled: bool,
    },
    Image {
        index: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        alpha: Option<f64>,
    },
}

#[derive(Default)]
struct PageDraft {
    cmds: Vec<DrawCmd>,
}

pub struct ReportBuilder {
    page_width: f64,
    page_height: f64,
    pages: Vec<PageDraft>,
    images: Vec<(u32, u32, Vec<u8>)>,
}

impl ReportBuilder {
    pub fn new(page_width: f64, page_height: f64) -> Self {
        Self {
            page_width,
            page_height,
            pages: Vec::new(),
            images: Vec::new(),
        }
    }

    pub fn page_width(&self) -> f64 {
        self.page_width
    }

    pub fn page_height(&self) -> f64 {
        self.page_height
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Begin a new page; subsequent draw calls land on it.
    pub fn start_page(&mut self) {
        self.pages.push(PageDraft::default());
    }

    fn current_page(&mut self) -> &mut PageDraft {
        if self.pages.is_empty() {
            self.pages.push(PageDraft::default());
        }
        self.pages.last_mut().unwrap()
    }

    /// Draw a text run in a standard-14 font at a point-space position.
    pub fn text(
        &mut self,
        base_font: &str,
        font_size: f64,
        x: f64,
        y: f64,
        color: (f32, f32, f32),
        text: &str,
    ) {
        self.current_page().cmds.push(DrawCmd::Text {
            font: base_font.to_string(),
            size: font_size,
            x,
            y,
            color,
            text: text.to_string(),
        });
    }

    pub fn filled_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: (f32, f32, f32)) {
        self.current_page().cmds.push(DrawCmd::Rect {
            x,
            y,
            width,
            height,
            color,
            filled: true,
        });
    }

    /// Register raw 8-bit RGB pixels for later placement.
    pub fn add_image(&mut self, width: u32, height: u32, rgb: Vec<u8>) -> Result<ImageHandle, PdfError> {
        if rgb.len() != width as usize * height as usize * 3 {
            return Err(PdfError::Write(format!(
                "image data length {} does not match {}x{} RGB",
                rgb.len(),
                width,
                height
            )));
        }
        self.images.push((width, height, rgb));
        Ok(ImageHandle(self.images.len() - 1))
    }

    /// Place a registered image into a point-space rectangle; `alpha` draws
    /// it translucently through an ExtGState.
    pub fn image(
        &mut self,
        handle: ImageHandle,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        alpha: Option<f64>,
    ) {
        self.current_page().cmds.push(DrawCmd::Image {
            index: handle.0,
            x,
            y,
            width,
            height,
            alpha,
        });
    }

    /// Assemble the document and return its bytes.
    pub fn finish(self) -> Result<Vec<u8>, PdfError> {
        if self.pages.is_empty() {
            return Err(PdfError::Write("report has no pages".into()));
        }

        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        // Deduplicated shared resources.
        let mut font_aliases: BTreeMap<String, (String, lopdf::ObjectId)> = BTreeMap::new();
        let mut gs_aliases: BTreeMap<String, (String, lopdf::ObjectId)> = BTreeMap::new();
        let mut image_ids = Vec::with_capacity(self.images.len());
        for (width, height, rgb) in &self.images {
            image_ids.push(embed_rgb_image(&mut doc, *width, *height, rgb)?);
        }

        let mut page_ids = Vec::with_capacity(self.pages.len());
        for draft in &self.pages {
            let mut ops = Vec::new();
            let mut fonts_used = BTreeSet::new();
            let mut images_used = BTreeSet::new();
            let mut gs_used = BTreeSet::new();

            for cmd in &draft.cmds {
                match cmd {
                    DrawCmd::Text {
                        font,
                        size,
                        x,
                        y,
                        color,
                        text,
                    } => {
                        let alias = {
                            let next = format!("F{}", font_aliases.len() + 1);
                            let entry = font_aliases.entry(font.clone()).or_insert_with(|| {
                                let font_id = doc.add_object(dictionary! {
                                    "Type" => "Font",
                                    "Subtype" => "Type1",
                                    "BaseFont" => Object::Name(font.as_bytes().to_vec()),
                                });
                                (next, font_id)
                            });
                            entry.0.clone()
                        };
                        fonts_used.insert(font.clone());
                        ops.extend(text_ops(&alias, *size, *x, *y, *color, text));
                    }
                    DrawCmd::Rect {
                        x,
                        y,
                        width,
                        height,
                        color,
                        filled,
                    } => {
                        ops.extend(rect_ops(*x, *y, *width, *height, *color, *filled));
                    }
                    DrawCmd::Image {
                        index,
                        x,
                        y,
                        width,
                        height,
                        alpha,
                    } => {
                        let gs_alias = alpha.map(|a| {
                            let key = format!("{:.3}", a);
                            let next = format!("GS{}", gs_aliases.len() + 1);
                            let entry = gs_aliases.entry(key.clone()).or_insert_with(|| {
                                let gs_id = doc.add_object(dictionary! {
                                    "Type" => "ExtGState",
                                    "ca" => Object::Real(a as f32),
                                    "CA" => Object::Real(a as f32),
                                });
                                (next, gs_id)
                            });
                            gs_used.insert(key);
                            entry.0.clone()
                        });
                        images_used.insert(*index);
                        ops.extend(image_ops(
                            &format!("Im{}", index),
                            *x,
                            *y,
                            *width,
                            *height,
                            gs_alias.as_deref(),
                        ));
                    }
                }
            }

            let encoded = lopdf::content::Content { operations: ops }
                .encode()
                .map_err(|e| PdfError::Write(e.to_string()))?;
            let content_id = doc.add_object(Stream::new(Dictionary::new(), encoded));

            let mut resources = Dictionary::new();
            if !fonts_used.is_empty() {
                let mut fonts = Dictionary::new();
                for font in &fonts_used {
                    let (alias, id) = &font_aliases[font];
                    fonts.set(alias.as_bytes(), Object::Reference(*id));
                }
                resources.set("Font", Object::Dictionary(fonts));
            }
            if !images_used.is_empty() {
                let mut xobjects = Dictionary::new();
                for index in &images_used {
                    xobjects.set(
                        format!("Im{}", index).as_bytes(),
                        Object::Reference(image_ids[*index]),
                    );
                }
                resources.set("XObject", Object::Dictionary(xobjects));
            }
            if !gs_used.is_empty() {
                let mut gstates = Dictionary::new();
                for key in &gs_used {
                    let (alias, id) = &gs_aliases[key];
                    gstates.set(alias.as_bytes(), Object::Reference(*id));
                }
                resources.set("ExtGState", Object::Dictionary(gstates));
            }

            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => Object::Reference(pages_id),
                "MediaBox" => vec![
                    0.into(),
                    0.into(),
                    Object::Real(self.page_width as f32),
                    Object::Real(self.page_height as f32),
                ],
                "Contents" => Object::Reference(content_id),
                "Resources" => Object::Dictionary(resources),
            });
            page_ids.push(page_id);
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Count" => page_ids.len() as i64,
                "Kids" => page_ids
                    .iter()
                    .map(|id| Object::Reference(*id))
                    .collect::<Vec<_>>(),
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));
        doc.compress();

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)
            .map_err(|e| PdfError::Write(e.to_string()))?;
        Ok(buffer)
    }
}
