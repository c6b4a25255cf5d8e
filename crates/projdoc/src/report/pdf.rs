//! PDF backend: interprets a [`DrawOp`] plan with `lopdf`.
//!
//! The renderer owns all cursor and font state. Text is set in the standard
//! Helvetica faces with `WinAnsiEncoding`, wrapped greedily on an estimated
//! glyph width, and flows onto new pages when it reaches the bottom margin.
//! The whole document is assembled in memory; callers receive bytes only once
//! rendering has succeeded.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use serde::{Deserialize, Serialize};

use super::layout::{DrawOp, Gap};
use crate::error::Result;

const REGULAR: &str = "F1";
const BOLD: &str = "F2";

/// Page geometry in PDF points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSetup {
    /// Page width.
    pub width: f32,
    /// Page height.
    pub height: f32,
    /// Margin on every edge.
    pub margin: f32,
}

impl Default for PageSetup {
    /// US Letter with 50pt margins.
    fn default() -> Self {
        Self {
            width: 612.0,
            height: 792.0,
            margin: 50.0,
        }
    }
}

impl PageSetup {
    fn printable_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }
}

#[derive(Debug, Clone, Copy)]
struct Style {
    font: &'static str,
    size: f32,
    centered: bool,
    underline: bool,
}

impl Style {
    const fn new(font: &'static str, size: f32) -> Self {
        Self {
            font,
            size,
            centered: false,
            underline: false,
        }
    }

    fn line_height(self) -> f32 {
        self.size * 1.35
    }

    /// Helvetica averages a little over half an em per glyph.
    fn char_width(self) -> f32 {
        if self.font == BOLD {
            self.size * 0.56
        } else {
            self.size * 0.5
        }
    }
}

fn style_for(op: &DrawOp) -> Option<Style> {
    Some(match op {
        DrawOp::Title(_) => Style {
            centered: true,
            ..Style::new(BOLD, 22.0)
        },
        DrawOp::ProjectHeading(_) => Style::new(BOLD, 18.0),
        DrawOp::ContributorHeading(_) => Style {
            underline: true,
            ..Style::new(BOLD, 16.0)
        },
        DrawOp::SectionTitle(_) => Style::new(BOLD, 14.0),
        DrawOp::FieldLabel(_) => Style::new(BOLD, 11.0),
        DrawOp::FieldBody(_) => Style::new(REGULAR, 11.0),
        DrawOp::Notice(_) => Style {
            centered: true,
            ..Style::new(REGULAR, 12.0)
        },
        DrawOp::PageBreak | DrawOp::Spacing(_) => return None,
    })
}

fn gap_height(gap: Gap) -> f32 {
    match gap {
        Gap::Small => 6.0,
        Gap::Medium => 12.0,
        Gap::Large => 28.0,
    }
}

/// Map text to `WinAnsiEncoding` bytes; unmappable characters become `?`.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{2026}' => 0x85,
            '\u{20AC}' => 0x80,
            '\t' => b' ',
            c if (' '..='~').contains(&c) || ('\u{A0}'..='\u{FF}').contains(&c) => {
                u8::try_from(u32::from(c)).unwrap_or(b'?')
            }
            _ => b'?',
        })
        .collect()
}

/// Greedy word wrap to at most `max_chars` per line.
///
/// Explicit newlines are kept; words longer than a line are split.
fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut line = String::new();
        let mut len = 0;
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > max_chars {
                if len > 0 {
                    lines.push(std::mem::take(&mut line));
                    len = 0;
                }
                let rest = word.split_off(max_chars);
                lines.push(word.into_iter().collect());
                word = rest;
            }
            if word.is_empty() {
                continue;
            }
            let needed = if len == 0 { word.len() } else { len + 1 + word.len() };
            if needed > max_chars {
                lines.push(std::mem::take(&mut line));
                len = 0;
            }
            if len > 0 {
                line.push(' ');
                len += 1;
            }
            line.extend(word.iter());
            len += word.len();
        }
        lines.push(line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[allow(clippy::cast_possible_truncation)]
fn pt(value: f32) -> Object {
    Object::Integer(value.round() as i64)
}

struct PageWriter {
    setup: PageSetup,
    pages: Vec<Vec<Operation>>,
    current: Vec<Operation>,
    y: f32,
}

impl PageWriter {
    fn new(setup: PageSetup) -> Self {
        Self {
            setup,
            pages: Vec::new(),
            current: Vec::new(),
            y: setup.height - setup.margin,
        }
    }

    fn at_top(&self) -> bool {
        self.current.is_empty()
    }

    fn new_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.current));
        self.y = self.setup.height - self.setup.margin;
    }

    fn space(&mut self, height: f32) {
        if !self.at_top() {
            self.y -= height;
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    fn text(&mut self, text: &str, style: Style) {
        let usable = self.setup.printable_width();
        let max_chars = (usable / style.char_width()).floor().max(1.0) as usize;

        for line in wrap(text, max_chars) {
            if self.y - style.line_height() < self.setup.margin && !self.at_top() {
                self.new_page();
            }
            self.y -= style.line_height();

            let width = line.chars().count() as f32 * style.char_width();
            let x = if style.centered {
                self.setup.margin + ((usable - width) / 2.0).max(0.0)
            } else {
                self.setup.margin
            };

            self.current.extend([
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec![style.font.into(), pt(style.size)]),
                Operation::new("Td", vec![pt(x), pt(self.y)]),
                Operation::new("Tj", vec![Object::string_literal(encode_win_ansi(&line))]),
                Operation::new("ET", vec![]),
            ]);

            if style.underline && !line.is_empty() {
                let underline_y = self.y - 2.0;
                self.current.extend([
                    Operation::new("w", vec![Object::Integer(1)]),
                    Operation::new("m", vec![pt(x), pt(underline_y)]),
                    Operation::new("l", vec![pt(x + width), pt(underline_y)]),
                    Operation::new("S", vec![]),
                ]);
            }
        }
    }

    fn finish(mut self) -> Vec<Vec<Operation>> {
        if !self.current.is_empty() || self.pages.is_empty() {
            self.pages.push(self.current);
        }
        self.pages
    }
}

/// Lay out `ops` into page content streams.
fn paginate(ops: &[DrawOp], setup: PageSetup) -> Vec<Vec<Operation>> {
    let mut writer = PageWriter::new(setup);
    for op in ops {
        match op {
            DrawOp::PageBreak => {
                if !writer.at_top() {
                    writer.new_page();
                }
            }
            DrawOp::Spacing(gap) => writer.space(gap_height(*gap)),
            DrawOp::Title(text)
            | DrawOp::ProjectHeading(text)
            | DrawOp::ContributorHeading(text)
            | DrawOp::SectionTitle(text)
            | DrawOp::FieldLabel(text)
            | DrawOp::FieldBody(text)
            | DrawOp::Notice(text) => {
                if let Some(style) = style_for(op) {
                    writer.text(text, style);
                }
            }
        }
    }
    writer.finish()
}

fn font(doc: &mut Document, base: &str) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base,
        "Encoding" => "WinAnsiEncoding",
    })
}

/// Render a plan into a complete PDF document.
///
/// # Errors
///
/// Returns an error if a content stream cannot be encoded or the document
/// cannot be serialized.
pub fn render(title: &str, ops: &[DrawOp], setup: PageSetup) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular = font(&mut doc, "Helvetica");
    let bold = font(&mut doc, "Helvetica-Bold");
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            REGULAR => regular,
            BOLD => bold,
        },
    });

    let mut kids = Vec::new();
    for operations in paginate(ops, setup) {
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let page_count = i64::try_from(kids.len()).unwrap_or(i64::MAX);
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(page_count),
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                pt(setup.width),
                pt(setup.height),
            ],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(encode_win_ansi(title)),
        "Producer" => Object::string_literal("projdoc"),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}
