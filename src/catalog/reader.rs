// SPDX-License-Identifier: MPL-2.0
//! Strict `.ts` loader built on `quick-xml`.
//!
//! The reader walks the document once and either returns a complete
//! [`Catalog`] or the first structural problem it finds, reported with the
//! file name and line. Text content is never trimmed: translations such as
//! `"宽度: "` keep their trailing space.
//!
//! Accepted layout (as produced by `lupdate`):
//!
//! ```text
//! <TS version language sourcelanguage>
//!   <context>
//!     <name/>
//!     <message numerus?>
//!       <location filename? line?/>*
//!       <source/> <comment/>? <extracomment/>? <translatorcomment/>?
//!       <translation type?>text | <numerusform/>*</translation>
//!     </message>*
//!   </context>*
//! </TS>
//! ```

use super::{Catalog, Context, Location, Message, TranslationStatus};
use crate::error::{Error, Result, IN_MEMORY_ORIGIN};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

const UTF8_BOM: char = '\u{feff}';

/// Reads and parses a `.ts` file.
pub fn read_file(path: impl AsRef<Path>) -> Result<Catalog> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let text = String::from_utf8(bytes)
        .map_err(|e| Error::parse(path, format!("file is not valid UTF-8: {e}")))?;

    let mut catalog = parse(&text, path.to_path_buf())?;
    catalog.set_origin(path.to_path_buf());
    log::debug!(
        "loaded {} messages in {} contexts from {}",
        catalog.len(),
        catalog.contexts().len(),
        path.display()
    );
    Ok(catalog)
}

/// Parses `.ts` content held in memory. `origin` only labels diagnostics.
pub fn read_str(xml: &str, origin: Option<&Path>) -> Result<Catalog> {
    let origin = origin.map_or_else(|| PathBuf::from(IN_MEMORY_ORIGIN), Path::to_path_buf);
    parse(xml, origin)
}

fn parse(xml: &str, origin: PathBuf) -> Result<Catalog> {
    let xml = xml.strip_prefix(UTF8_BOM).unwrap_or(xml);
    TsReader::new(xml, origin).read_document()
}

struct TsReader<'a> {
    reader: Reader<&'a [u8]>,
    xml: &'a str,
    origin: PathBuf,
    /// Last absolute line seen per file, for relative `line="+N"` markers.
    last_lines: HashMap<String, i64>,
    last_filename: Option<String>,
}

impl<'a> TsReader<'a> {
    fn new(xml: &'a str, origin: PathBuf) -> Self {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(false);
        Self {
            reader,
            xml,
            origin,
            last_lines: HashMap::new(),
            last_filename: None,
        }
    }

    fn current_line(&self) -> usize {
        let position = usize::try_from(self.reader.buffer_position()).unwrap_or(usize::MAX);
        let end = position.min(self.xml.len());
        self.xml.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count() + 1
    }

    fn fail(&self, reason: impl std::fmt::Display) -> Error {
        Error::parse(
            self.origin.clone(),
            format!("line {}: {}", self.current_line(), reason),
        )
    }

    fn next(&mut self) -> Result<Event<'a>> {
        match self.reader.read_event() {
            Ok(event) => Ok(event),
            Err(e) => Err(self.fail(e)),
        }
    }

    fn read_document(mut self) -> Result<Catalog> {
        let mut catalog = Catalog::new();

        let root = loop {
            match self.next()? {
                Event::Start(e) => break (e, false),
                Event::Empty(e) => break (e, true),
                Event::Text(t) if is_blank(&t) => {}
                Event::Decl(_) | Event::DocType(_) | Event::Comment(_) | Event::PI(_) => {}
                Event::Eof => return Err(self.fail("document has no root element")),
                _ => return Err(self.fail("unexpected content before root element")),
            }
        };

        let (root, is_empty) = root;
        if root.name().as_ref() != b"TS" {
            return Err(self.fail(format!(
                "root element is <{}>, expected <TS>",
                element_name(&root)
            )));
        }
        for (key, value) in self.attributes(&root)? {
            match key.as_str() {
                "version" => catalog.version = Some(value),
                "language" => catalog.language = Some(value),
                "sourcelanguage" => catalog.source_language = Some(value),
                _ => {}
            }
        }

        if !is_empty {
            loop {
                match self.next()? {
                    Event::Start(e) if e.name().as_ref() == b"context" => {
                        let context = self.read_context()?;
                        catalog.push_context(context);
                    }
                    Event::Empty(e) if e.name().as_ref() == b"context" => {
                        return Err(self.fail("<context> without <name>"));
                    }
                    // <defaultcodec>, <dependencies> and friends carry nothing we use.
                    Event::Start(e) => self.skip_element(&e)?,
                    Event::End(_) => break,
                    Event::Eof => return Err(self.fail("unexpected end of document inside <TS>")),
                    Event::Text(t) if !is_blank(&t) => {
                        return Err(self.fail("unexpected text inside <TS>"));
                    }
                    _ => {}
                }
            }
        }

        loop {
            match self.next()? {
                Event::Eof => break,
                Event::Text(t) if is_blank(&t) => {}
                Event::Comment(_) | Event::PI(_) => {}
                _ => return Err(self.fail("unexpected content after </TS>")),
            }
        }

        Ok(catalog)
    }

    fn read_context(&mut self) -> Result<Context> {
        let mut name = None;
        let mut messages = Vec::new();

        loop {
            match self.next()? {
                Event::Start(e) => match e.name().as_ref() {
                    b"name" => name = Some(self.read_text("name")?),
                    b"message" => messages.push(self.read_message(&e)?),
                    _ => self.skip_element(&e)?,
                },
                Event::Empty(e) => match e.name().as_ref() {
                    b"name" => name = Some(String::new()),
                    b"message" => return Err(self.fail("<message> without <source>")),
                    _ => {}
                },
                Event::End(_) => break,
                Event::Eof => return Err(self.fail("unexpected end of document inside <context>")),
                Event::Text(t) if !is_blank(&t) => {
                    return Err(self.fail("unexpected text inside <context>"));
                }
                _ => {}
            }
        }

        match name {
            Some(name) if !name.is_empty() => Ok(Context { name, messages }),
            Some(_) => Err(self.fail("<context> has an empty <name>")),
            None => Err(self.fail("<context> without <name>")),
        }
    }

    fn read_message(&mut self, start: &BytesStart<'_>) -> Result<Message> {
        let mut message = Message::default();
        let mut source = None;

        for (key, value) in self.attributes(start)? {
            if key == "numerus" {
                message.numerus = value == "yes";
            }
        }

        loop {
            match self.next()? {
                Event::Start(e) => match e.name().as_ref() {
                    b"location" => {
                        message.locations.push(self.read_location(&e)?);
                        self.skip_element(&e)?;
                    }
                    b"source" => source = Some(self.read_text("source")?),
                    b"comment" => message.comment = Some(self.read_text("comment")?),
                    b"extracomment" => {
                        message.extra_comment = Some(self.read_text("extracomment")?);
                    }
                    b"translatorcomment" => {
                        message.translator_comment = Some(self.read_text("translatorcomment")?);
                    }
                    b"translation" => {
                        message.status = self.translation_status(&e)?;
                        self.read_translation(&mut message)?;
                    }
                    _ => self.skip_element(&e)?,
                },
                Event::Empty(e) => match e.name().as_ref() {
                    b"location" => message.locations.push(self.read_location(&e)?),
                    b"source" => source = Some(String::new()),
                    b"translation" => message.status = self.translation_status(&e)?,
                    _ => {}
                },
                Event::End(_) => break,
                Event::Eof => return Err(self.fail("unexpected end of document inside <message>")),
                Event::Text(t) if !is_blank(&t) => {
                    return Err(self.fail("unexpected text inside <message>"));
                }
                _ => {}
            }
        }

        match source {
            Some(source) if !source.is_empty() => {
                message.source = source;
                Ok(message)
            }
            Some(_) => Err(self.fail("<message> has an empty <source>")),
            None => Err(self.fail("<message> without <source>")),
        }
    }

    fn translation_status(&self, start: &BytesStart<'_>) -> Result<TranslationStatus> {
        let kind = self
            .attributes(start)?
            .into_iter()
            .find(|(key, _)| key == "type")
            .map(|(_, value)| value);
        TranslationStatus::from_type_attr(kind.as_deref()).map_err(|reason| self.fail(reason))
    }

    /// Reads `<translation>` content: plain text, or `<numerusform>` /
    /// `<lengthvariant>` children (the first length variant is the primary text).
    fn read_translation(&mut self, message: &mut Message) -> Result<()> {
        let mut text = String::new();
        let mut forms = Vec::new();
        let mut variant = None;

        loop {
            match self.next()? {
                Event::Text(t) => text.push_str(&self.unescape(&t)?),
                Event::CData(c) => text.push_str(&String::from_utf8_lossy(&c)),
                Event::Empty(e) if e.name().as_ref() == b"byte" => text.push(self.byte_value(&e)?),
                Event::Empty(e) if e.name().as_ref() == b"numerusform" => forms.push(String::new()),
                Event::Start(e) => match e.name().as_ref() {
                    b"numerusform" => forms.push(self.read_text("numerusform")?),
                    b"lengthvariant" => {
                        let value = self.read_text("lengthvariant")?;
                        variant.get_or_insert(value);
                    }
                    _ => {
                        return Err(self.fail(format!(
                            "unexpected <{}> inside <translation>",
                            element_name(&e)
                        )));
                    }
                },
                Event::End(_) => break,
                Event::Eof => {
                    return Err(self.fail("unexpected end of document inside <translation>"));
                }
                _ => {}
            }
        }

        if !forms.is_empty() {
            message.translation = forms[0].clone();
            message.numerus_forms = forms;
        } else if let Some(variant) = variant {
            message.translation = variant;
        } else {
            message.translation = text;
        }
        Ok(())
    }

    fn read_location(&mut self, start: &BytesStart<'_>) -> Result<Location> {
        let mut filename = None;
        let mut line_attr = None;
        for (key, value) in self.attributes(start)? {
            match key.as_str() {
                "filename" => filename = Some(value),
                "line" => line_attr = Some(value),
                _ => {}
            }
        }

        // A missing filename repeats the previous location's file.
        let filename = match filename.or_else(|| self.last_filename.clone()) {
            Some(name) => name,
            None => return Err(self.fail("<location> without filename")),
        };

        let line = match line_attr {
            None => None,
            Some(raw) => {
                let absolute = if raw.starts_with('+') || raw.starts_with('-') {
                    let delta: i64 = raw
                        .parse()
                        .map_err(|_| self.fail(format!("invalid line '{raw}' in <location>")))?;
                    self.last_lines
                        .get(&filename)
                        .copied()
                        .unwrap_or(0)
                        .checked_add(delta)
                        .ok_or_else(|| self.fail(format!("line '{raw}' out of range in <location>")))?
                } else {
                    raw.parse::<i64>()
                        .map_err(|_| self.fail(format!("invalid line '{raw}' in <location>")))?
                };
                let line = u32::try_from(absolute)
                    .map_err(|_| self.fail(format!("line {absolute} out of range in <location>")))?;
                self.last_lines.insert(filename.clone(), absolute);
                Some(line)
            }
        };

        self.last_filename = Some(filename.clone());
        Ok(Location { filename, line })
    }

    /// Collects the text of a leaf element up to its closing tag.
    fn read_text(&mut self, element: &str) -> Result<String> {
        let mut text = String::new();
        loop {
            match self.next()? {
                Event::Text(t) => text.push_str(&self.unescape(&t)?),
                Event::CData(c) => text.push_str(&String::from_utf8_lossy(&c)),
                Event::Empty(e) if e.name().as_ref() == b"byte" => text.push(self.byte_value(&e)?),
                Event::Start(e) | Event::Empty(e) => {
                    return Err(self.fail(format!(
                        "unexpected <{}> inside <{element}>",
                        element_name(&e)
                    )));
                }
                Event::End(_) => return Ok(text),
                Event::Eof => {
                    return Err(self.fail(format!("unexpected end of document inside <{element}>")));
                }
                _ => {}
            }
        }
    }

    /// `<byte value="x1b"/>` encodes a control character `lupdate` cannot
    /// put into XML text.
    fn byte_value(&self, start: &BytesStart<'_>) -> Result<char> {
        let raw = self
            .attributes(start)?
            .into_iter()
            .find(|(key, _)| key == "value")
            .map(|(_, value)| value)
            .ok_or_else(|| self.fail("<byte> without value"))?;
        let code = match raw.strip_prefix('x').or_else(|| raw.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16),
            None => raw.parse::<u32>(),
        }
        .map_err(|_| self.fail(format!("invalid <byte> value '{raw}'")))?;
        char::from_u32(code).ok_or_else(|| self.fail(format!("invalid <byte> value '{raw}'")))
    }

    fn skip_element(&mut self, start: &BytesStart<'_>) -> Result<()> {
        let mut depth = 1usize;
        while depth > 0 {
            match self.next()? {
                Event::Start(_) => depth += 1,
                Event::End(_) => depth -= 1,
                Event::Eof => {
                    return Err(self.fail(format!(
                        "unexpected end of document inside <{}>",
                        element_name(start)
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn attributes(&self, start: &BytesStart<'_>) -> Result<Vec<(String, String)>> {
        let mut attrs = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| self.fail(e))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
            let value = attr.unescape_value().map_err(|e| self.fail(e))?.to_string();
            attrs.push((key, value));
        }
        Ok(attrs)
    }

    fn unescape(&self, text: &quick_xml::events::BytesText<'_>) -> Result<String> {
        text.unescape()
            .map(|cow| cow.to_string())
            .map_err(|e| self.fail(e))
    }
}

fn element_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.name().as_ref()).to_string()
}

fn is_blank(text: &[u8]) -> bool {
    text.iter().all(u8::is_ascii_whitespace)
}
