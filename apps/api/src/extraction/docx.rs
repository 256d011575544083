//! DOCX text extraction.
//!
//! Output order: body paragraphs, then top-level table cells (row-major, tables in
//! document order), then per section the default header and footer paragraphs.
//! A section without its own header/footer reference reuses the previous one.

use std::collections::HashMap;
use std::io::{Cursor, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use zip::result::ZipError;
use zip::ZipArchive;

use super::ExtractionError;

const MAIN_PART: &str = "word/document.xml";
const MAIN_RELS: &str = "word/_rels/document.xml.rels";

pub(super) fn extract_text(filename: &str, bytes: &[u8]) -> Result<String, ExtractionError> {
    let fail = |reason: String| ExtractionError::Docx {
        filename: filename.to_string(),
        reason,
    };

    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).map_err(|e| fail(format!("not a DOCX archive: {e}")))?;

    let main = read_part(&mut archive, MAIN_PART)
        .map_err(&fail)?
        .ok_or_else(|| fail(format!("missing {MAIN_PART}")))?;
    let body = parse_part(&main).map_err(|e| fail(format!("malformed {MAIN_PART}: {e}")))?;

    let relationships = match read_part(&mut archive, MAIN_RELS).map_err(&fail)? {
        Some(xml) => {
            parse_relationships(&xml).map_err(|e| fail(format!("malformed {MAIN_RELS}: {e}")))?
        }
        None => HashMap::new(),
    };

    let mut items = body.paragraphs;
    for table in body.tables {
        for row in table {
            items.extend(row);
        }
    }

    let mut header: Option<String> = None;
    let mut footer: Option<String> = None;
    for section in &body.sections {
        if section.header.is_some() {
            header = section.header.clone();
        }
        if section.footer.is_some() {
            footer = section.footer.clone();
        }
        for rel_id in [&header, &footer].into_iter().flatten() {
            if let Some(target) = relationships.get(rel_id) {
                items.extend(read_story(&mut archive, target).map_err(&fail)?);
            }
        }
    }

    Ok(items
        .into_iter()
        .filter(|item| !item.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n"))
}

/// Paragraphs of a header or footer part.
fn read_story(archive: &mut ZipArchive<Cursor<&[u8]>>, target: &str) -> Result<Vec<String>, String> {
    let path = match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("word/{target}"),
    };
    match read_part(archive, &path)? {
        Some(xml) => parse_part(&xml)
            .map(|content| content.paragraphs)
            .map_err(|e| format!("malformed {path}: {e}")),
        None => Ok(Vec::new()),
    }
}

fn read_part(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    name: &str,
) -> Result<Option<String>, String> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(format!("failed to open {name}: {e}")),
    };
    let mut xml = String::new();
    file.read_to_string(&mut xml)
        .map_err(|e| format!("failed to read {name}: {e}"))?;
    Ok(Some(xml))
}

#[derive(Debug, Default, Clone)]
struct SectionRefs {
    header: Option<String>,
    footer: Option<String>,
}

#[derive(Debug, Default)]
struct PartContent {
    /// Paragraphs that are direct children of `body`, `hdr` or `ftr`.
    paragraphs: Vec<String>,
    /// Top-level tables: rows of cell texts.
    tables: Vec<Vec<Vec<String>>>,
    sections: Vec<SectionRefs>,
}

/// Event-driven walk over a WordprocessingML part.
#[derive(Default)]
struct PartWalker {
    stack: Vec<Vec<u8>>,
    paragraphs: Vec<String>,
    table_depth: usize,
    table: Option<Vec<Vec<String>>>,
    row: Option<Vec<String>>,
    cell: Option<Vec<String>>,
    content: PartContent,
}

impl PartWalker {
    fn parent(&self) -> &[u8] {
        self.stack.last().map(Vec::as_slice).unwrap_or_default()
    }

    fn in_top_table(&self) -> bool {
        self.table_depth == 1 && self.table.is_some()
    }

    fn open(&mut self, element: &BytesStart<'_>) -> Result<(), quick_xml::Error> {
        let name = element.local_name();
        match name.as_ref() {
            b"p" => self.paragraphs.push(String::new()),
            b"tbl" => {
                self.table_depth += 1;
                if self.table_depth == 1 && self.parent() == b"body" {
                    self.table = Some(Vec::new());
                }
            }
            b"tr" if self.in_top_table() => self.row = Some(Vec::new()),
            b"tc" if self.in_top_table() => self.cell = Some(Vec::new()),
            b"sectPr" => self.content.sections.push(SectionRefs::default()),
            b"tab" if self.parent() == b"r" => self.push_text("\t"),
            b"br" | b"cr" if self.parent() == b"r" => self.push_text("\n"),
            b"headerReference" | b"footerReference" if self.parent() == b"sectPr" => {
                self.record_reference(element)?
            }
            _ => {}
        }
        Ok(())
    }

    fn close(&mut self, name: &[u8]) {
        match name {
            b"p" => {
                let text = self.paragraphs.pop().unwrap_or_default();
                let parent = self.parent().to_vec();
                match parent.as_slice() {
                    b"body" | b"hdr" | b"ftr" => self.content.paragraphs.push(text),
                    b"tc" if self.table_depth == 1 => {
                        if let Some(cell) = self.cell.as_mut() {
                            cell.push(text);
                        }
                    }
                    _ => {}
                }
            }
            b"tc" if self.table_depth == 1 => {
                if let (Some(cell), Some(row)) = (self.cell.take(), self.row.as_mut()) {
                    row.push(cell.join("\n"));
                }
            }
            b"tr" if self.table_depth == 1 => {
                if let (Some(row), Some(table)) = (self.row.take(), self.table.as_mut()) {
                    table.push(row);
                }
            }
            b"tbl" => {
                if self.table_depth == 1 {
                    if let Some(table) = self.table.take() {
                        self.content.tables.push(table);
                    }
                }
                self.table_depth = self.table_depth.saturating_sub(1);
            }
            _ => {}
        }
    }

    fn push_text(&mut self, text: &str) {
        if let Some(paragraph) = self.paragraphs.last_mut() {
            paragraph.push_str(text);
        }
    }

    fn record_reference(&mut self, element: &BytesStart<'_>) -> Result<(), quick_xml::Error> {
        let mut kind = String::from("default");
        let mut rel_id = None;
        for attr in element.attributes() {
            let attr = attr?;
            match attr.key.local_name().as_ref() {
                b"type" => kind = attr.unescape_value()?.into_owned(),
                b"id" => rel_id = Some(attr.unescape_value()?.into_owned()),
                _ => {}
            }
        }
        if kind != "default" {
            return Ok(());
        }
        if let Some(section) = self.content.sections.last_mut() {
            if element.local_name().as_ref() == b"headerReference" {
                section.header = rel_id;
            } else {
                section.footer = rel_id;
            }
        }
        Ok(())
    }
}

fn parse_part(xml: &str) -> Result<PartContent, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut walker = PartWalker::default();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                walker.open(&e)?;
                walker.stack.push(e.local_name().as_ref().to_vec());
            }
            Event::Empty(e) => {
                walker.open(&e)?;
                walker.close(e.local_name().as_ref());
            }
            Event::End(e) => {
                walker.stack.pop();
                walker.close(e.local_name().as_ref());
            }
            Event::Text(t) if walker.parent() == b"t" => {
                let text = t.unescape()?;
                walker.push_text(&text);
            }
            Event::CData(t) if walker.parent() == b"t" => {
                let text = String::from_utf8_lossy(&t).into_owned();
                walker.push_text(&text);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(walker.content)
}

/// Maps relationship ids to part targets.
fn parse_relationships(xml: &str) -> Result<HashMap<String, String>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut relationships = HashMap::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                let mut id = None;
                let mut target = None;
                let mut external = false;
                for attr in e.attributes() {
                    let attr = attr?;
                    match attr.key.local_name().as_ref() {
                        b"Id" => id = Some(attr.unescape_value()?.into_owned()),
                        b"Target" => target = Some(attr.unescape_value()?.into_owned()),
                        b"TargetMode" => external = attr.unescape_value()? == "External",
                        _ => {}
                    }
                }
                if let (Some(id), Some(target), false) = (id, target, external) {
                    relationships.insert(id, target);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(relationships)
}
