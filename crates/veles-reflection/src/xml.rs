//! XML export for decoded object trees.
//!
//! Renders a [`Node`] tree as indented XML: one element per node, the
//! qualified type as an attribute, scalar values as a `value` attribute.

use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use crate::node::Node;
use crate::{Error, Result};

/// XML exporter for decoded trees.
pub struct XmlExporter;

impl XmlExporter {
    /// Export a decoded tree to an XML string.
    pub fn to_xml_string(node: &Node) -> Result<String> {
        let mut output = Vec::new();
        Self::write_xml(node, &mut output)?;
        String::from_utf8(output).map_err(|e| Error::Export(e.to_string()))
    }

    /// Write a decoded tree as XML to a writer.
    pub fn write_xml<W: Write>(node: &Node, sink: W) -> Result<()> {
        let mut writer = Writer::new_with_indent(sink, b' ', 2);

        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
            .map_err(|e| Error::Export(e.to_string()))?;

        write_node(&mut writer, node)
    }
}

fn write_node<W: Write>(writer: &mut Writer<W>, node: &Node) -> Result<()> {
    let name = encode_xml_name(&node.name);

    let mut start = BytesStart::new(name.as_ref());
    start.push_attribute(("type", node.type_name.as_str()));
    if let Some(value) = &node.value {
        start.push_attribute(("value", value.to_string().as_str()));
    }

    if node.children.is_empty() {
        writer
            .write_event(Event::Empty(start))
            .map_err(|e| Error::Export(e.to_string()))?;
    } else {
        writer
            .write_event(Event::Start(start))
            .map_err(|e| Error::Export(e.to_string()))?;

        for child in &node.children {
            write_node(writer, child)?;
        }

        writer
            .write_event(Event::End(BytesEnd::new(name.as_ref())))
            .map_err(|e| Error::Export(e.to_string()))?;
    }

    Ok(())
}

/// Make a node name usable as an XML element name.
///
/// Array labels like `[3]` are not valid XML names; invalid characters are
/// replaced with underscores and a leading digit gets an underscore prefix.
fn encode_xml_name(name: &str) -> std::borrow::Cow<'_, str> {
    let valid_start = name
        .chars()
        .next()
        .map(|c| c.is_ascii_alphabetic() || c == '_')
        .unwrap_or(false);

    if valid_start && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-') {
        return name.into();
    }

    let mut encoded = String::with_capacity(name.len() + 1);
    for (i, c) in name.chars().enumerate() {
        if c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-' {
            if i == 0 && c.is_ascii_digit() {
                encoded.push('_');
            }
            encoded.push(c);
        } else {
            encoded.push('_');
        }
    }
    if encoded.is_empty() {
        encoded.push('_');
    }

    encoded.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Value;

    #[test]
    fn test_encode_xml_name() {
        assert_eq!(encode_xml_name("health"), "health");
        assert_eq!(encode_xml_name("_base"), "_base");
        assert_eq!(encode_xml_name("[0]"), "_0_");
        assert_eq!(encode_xml_name("3d"), "_3d");
        assert_eq!(encode_xml_name(""), "_");
    }

    #[test]
    fn test_export_tree() {
        let mut root = Node::new("_root", "game::Actor");
        root.children
            .push(Node::leaf("hp", "uint32", Value::Uint32(55)));

        let mut list = Node::new("tags", "game::TagList");
        list.children
            .push(Node::leaf("[0]", "keen::BlobString", Value::String("npc".into())));
        root.children.push(list);

        let xml = XmlExporter::to_xml_string(&root).unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(xml.contains("<_root type=\"game::Actor\">"));
        assert!(xml.contains("<hp type=\"uint32\" value=\"55\"/>"));
        assert!(xml.contains("<_0_ type=\"keen::BlobString\" value=\"npc\"/>"));
        assert!(xml.contains("</_root>"));
    }

    #[test]
    fn test_export_absent_node() {
        let node = Node::new("extra", "game::MaybeU32");
        let xml = XmlExporter::to_xml_string(&node).unwrap();
        assert!(xml.contains("<extra type=\"game::MaybeU32\"/>"));
    }
}
