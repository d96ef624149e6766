// SPDX-License-Identifier: MPL-2.0
//! `.ts` export using `quick-xml`'s indenting writer.
//!
//! Output follows `lupdate`'s layout (4-space indentation, one element per
//! line) so regenerated files diff cleanly against hand-maintained ones.

use super::{Catalog, Message};
use crate::config::defaults::TS_INDENT_WIDTH;
use crate::error::{Error, Result};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::fs;
use std::io::Write;
use std::path::Path;

const HEADER: &[u8] = b"<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<!DOCTYPE TS>\n";
const DEFAULT_VERSION: &str = "2.1";

/// Serializes a catalog to `.ts` XML.
pub fn write_string(catalog: &Catalog) -> Result<String> {
    let mut writer = Writer::new_with_indent(HEADER.to_vec(), b' ', TS_INDENT_WIDTH);

    let mut root = BytesStart::new("TS");
    root.push_attribute(("version", catalog.version.as_deref().unwrap_or(DEFAULT_VERSION)));
    if let Some(language) = &catalog.language {
        root.push_attribute(("language", language.as_str()));
    }
    if let Some(source_language) = &catalog.source_language {
        root.push_attribute(("sourcelanguage", source_language.as_str()));
    }
    writer.write_event(Event::Start(root))?;

    for context in catalog.contexts() {
        writer.write_event(Event::Start(BytesStart::new("context")))?;
        writer
            .create_element("name")
            .write_text_content(BytesText::new(&context.name))?;
        for message in &context.messages {
            write_message(&mut writer, message)?;
        }
        writer.write_event(Event::End(BytesEnd::new("context")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("TS")))?;

    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    String::from_utf8(bytes).map_err(|e| Error::Export(e.to_string()))
}

/// Writes a catalog to `path`, creating parent directories.
pub fn write_file(catalog: &Catalog, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let content = write_string(catalog)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut file = fs::File::create(path)?;
    file.write_all(content.as_bytes())?;
    log::debug!("wrote {} messages to {}", catalog.len(), path.display());
    Ok(())
}

fn write_message(writer: &mut Writer<Vec<u8>>, message: &Message) -> Result<()> {
    let mut start = BytesStart::new("message");
    if message.numerus {
        start.push_attribute(("numerus", "yes"));
    }
    writer.write_event(Event::Start(start))?;

    for location in &message.locations {
        let mut element = BytesStart::new("location");
        element.push_attribute(("filename", location.filename.as_str()));
        if let Some(line) = location.line {
            element.push_attribute(("line", line.to_string().as_str()));
        }
        writer.write_event(Event::Empty(element))?;
    }

    write_text_element(writer, "source", &message.source)?;
    if let Some(comment) = &message.comment {
        write_text_element(writer, "comment", comment)?;
    }
    if let Some(extra) = &message.extra_comment {
        write_text_element(writer, "extracomment", extra)?;
    }
    if let Some(note) = &message.translator_comment {
        write_text_element(writer, "translatorcomment", note)?;
    }

    let mut translation = BytesStart::new("translation");
    if let Some(kind) = message.status.type_attr() {
        translation.push_attribute(("type", kind));
    }
    if message.numerus && !message.numerus_forms.is_empty() {
        writer.write_event(Event::Start(translation))?;
        for form in &message.numerus_forms {
            write_text_element(writer, "numerusform", form)?;
        }
        writer.write_event(Event::End(BytesEnd::new("translation")))?;
    } else if message.translation.is_empty() {
        writer.write_event(Event::Empty(translation))?;
    } else {
        writer.write_event(Event::Start(translation))?;
        writer.write_event(Event::Text(BytesText::new(&message.translation)))?;
        writer.write_event(Event::End(BytesEnd::new("translation")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("message")))?;
    Ok(())
}

fn write_text_element(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<()> {
    writer
        .create_element(name)
        .write_text_content(BytesText::new(text))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{read_str, Location, TranslationStatus};

    fn sample() -> Catalog {
        let mut catalog = Catalog::new().with_language("zh_CN");
        catalog.version = Some("2.0".into());
        catalog.insert(
            "SizeDialog",
            Message::new("Width: ", "宽度: ").with_location("../../Components/attribute.py", 41),
        );
        catalog.insert(
            "View",
            Message::new("Save & <Close>", "").with_status(TranslationStatus::Unfinished),
        );
        catalog
    }

    #[test]
    fn writes_header_and_root_attributes() {
        let xml = write_string(&sample()).expect("serializes");
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<!DOCTYPE TS>\n"));
        assert!(xml.contains(r#"<TS version="2.0" language="zh_CN">"#));
        assert!(xml.ends_with("</TS>\n"));
    }

    #[test]
    fn keeps_trailing_whitespace_inline() {
        let xml = write_string(&sample()).expect("serializes");
        assert!(xml.contains("<source>Width: </source>"), "{xml}");
        assert!(xml.contains("<translation>宽度: </translation>"), "{xml}");
        assert!(xml.contains(r#"<location filename="../../Components/attribute.py" line="41"/>"#));
    }

    #[test]
    fn escapes_markup_and_marks_unfinished() {
        let xml = write_string(&sample()).expect("serializes");
        assert!(xml.contains("Save &amp; &lt;Close&gt;"), "{xml}");
        assert!(xml.contains(r#"<translation type="unfinished"/>"#), "{xml}");
    }

    #[test]
    fn written_catalog_reads_back_identically() {
        let mut catalog = sample();
        catalog.insert(
            "NoteWindow",
            Message::new("%n scene(s)", "")
                .with_numerus_forms(vec!["%n 个场景".into()])
                .with_comment("status bar"),
        );

        let xml = write_string(&catalog).expect("serializes");
        let reloaded = read_str(&xml, None).expect("reads back");

        assert_eq!(reloaded.entry_set(), catalog.entry_set());
        let numerus = &reloaded.context("NoteWindow").unwrap().messages[0];
        assert_eq!(numerus.numerus_forms, vec!["%n 个场景"]);
        assert_eq!(numerus.comment.as_deref(), Some("status bar"));
        assert_eq!(
            reloaded.context("SizeDialog").unwrap().messages[0].locations,
            vec![Location::new("../../Components/attribute.py", Some(41))]
        );
    }

    #[test]
    fn write_file_creates_parent_directories() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested").join("zh_CN.ts");
        write_file(&sample(), &path).expect("writes");
        assert!(path.exists());
    }
}
