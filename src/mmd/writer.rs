use std::fs;
use std::io::Write;
use std::path::Path;

use failure::Error;
use log::{debug, info};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use tempfile::NamedTempFile;

use crate::xml_query::XmlQuery;

use super::tree::Element;

const RELATED_DATASET: [&str; 1] = ["*:related_dataset"];

/// Serialize the tree as an indented UTF-8 document with an XML declaration.
pub fn to_xml_bytes(root: &Element) -> Result<Vec<u8>, Error> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new(b"1.0", Some(b"UTF-8"), None)))?;
    write_element(&mut writer, root)?;

    Ok(writer.into_inner())
}

fn write_element<W: Write>(writer: &mut Writer<W>, element: &Element) -> Result<(), Error> {
    let mut start = BytesStart::borrowed_name(element.name.as_bytes());
    for (name, value) in &element.attributes {
        start.push_attribute((name.as_str(), value.as_str()));
    }

    if element.text.is_none() && element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    if let Some(text) = &element.text {
        writer.write_event(Event::Text(BytesText::from_plain_str(text)))?;
    }
    for child in &element.children {
        write_element(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::borrowed(element.name.as_bytes())))?;

    Ok(())
}

/// Write the document to `path` through a temporary file in the same directory.
pub fn write_document(root: &Element, path: &Path) -> Result<(), Error> {
    let bytes = to_xml_bytes(root)?;

    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(directory)?;
    file.write_all(&bytes)?;
    file.persist(path)?;

    info!("Wrote MMD document to {}", path.display());

    Ok(())
}

/// Whether an existing document at `path` already references its parent dataset.
pub fn contains_related_dataset(path: &Path) -> bool {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };

    match XmlQuery::new(&RELATED_DATASET).select(&bytes) {
        Ok(selection) => selection.first(RELATED_DATASET[0]).is_some(),
        Err(e) => {
            debug!("Unable to parse existing document {}: {}", path.display(), e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::mmd::tree::text_element;
    use crate::test_utils;

    fn document() -> Element {
        Element::mmd_root()
            .with_child(text_element("title", "S1A & friends").with_attribute("xml:lang", "en"))
            .with_child(Element::mmd("note"))
            .with_child(
                Element::mmd("related_dataset")
                    .with_attribute("relation_type", "parent")
                    .with_text("no.met:9a3f5a4c"),
            )
    }

    #[test]
    fn serializes_escaped_and_indented() {
        let xml = String::from_utf8(to_xml_bytes(&document()).unwrap()).unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("xmlns:mmd=\"http://www.met.no/schema/mmd\""));
        assert!(xml.contains("\n  <mmd:title xml:lang=\"en\">S1A &amp; friends</mmd:title>"));
        assert!(xml.contains("<mmd:note/>"));
    }

    #[test]
    fn written_document_is_detected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("product.xml");

        assert!(!contains_related_dataset(&path));

        write_document(&document(), &path).unwrap();

        assert!(contains_related_dataset(&path));
    }

    #[test]
    fn documents_without_parent() {
        let path = test_utils::create_temp_file_with_suffix(
            ".xml",
            "<mmd:mmd xmlns:mmd=\"http://www.met.no/schema/mmd\"><mmd:title>x</mmd:title></mmd:mmd>",
        );

        assert!(!contains_related_dataset(&path));
    }
}
