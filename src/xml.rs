// src/xml.rs
// Tolerant Atom/XML parsing into a generic node tree.
//
// The syndication archives mix several XML vocabularies with inconsistent
// namespace prefixes, and individual documents are occasionally malformed.
// Instead of binding a serde schema, feed bytes are read event-by-event and
// assembled into a plain tree queried by local name only. Parsing never
// fails: on the first unrecoverable reader error the loop stops and keeps
// every node built so far. quick-xml resolves only the five predefined XML
// entities, so hostile DTD entity expansion is not a concern; unknown
// entities are kept verbatim rather than dropping the surrounding text.

use std::borrow::Cow;

use quick_xml::events::Event;
use quick_xml::Reader;

/// One parsed element: local name, attributes (local names, document
/// order), directly contained text, and child elements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Node {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<Node>,
}

impl Node {
    fn named(name: String) -> Self {
        Node {
            name,
            ..Node::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Concatenated text content directly inside this element.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// First direct child with the given local name.
    pub fn child(&self, local_name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name == local_name)
    }

    /// First descendant with the given local name, document order.
    pub fn descendant(&self, local_name: &str) -> Option<&Node> {
        for child in &self.children {
            if child.name == local_name {
                return Some(child);
            }
            if let Some(found) = child.descendant(local_name) {
                return Some(found);
            }
        }
        None
    }

    /// Every descendant with the given local name, document order.
    pub fn descendants(&self, local_name: &str) -> Vec<&Node> {
        let mut out = Vec::new();
        self.collect_descendants(local_name, &mut out);
        out
    }

    fn collect_descendants<'a>(&'a self, local_name: &str, out: &mut Vec<&'a Node>) {
        for child in &self.children {
            if child.name == local_name {
                out.push(child);
            }
            child.collect_descendants(local_name, out);
        }
    }

    /// Attribute value by local name (any or no prefix).
    pub fn attribute(&self, local_name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == local_name)
            .map(|(_, v)| v.as_str())
    }

    /// Syndication entries anywhere in the document, document order.
    pub fn entries(&self) -> Vec<&Node> {
        self.descendants("entry")
    }
}

/// Parse one feed document into a synthetic root node. Best-effort: a
/// malformed tail is dropped, a completely unparseable document yields a
/// root with no children.
pub fn parse(bytes: &[u8]) -> Node {
    let mut reader = Reader::from_reader(bytes);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    // stack[0] is the synthetic document root.
    let mut stack = vec![Node::default()];
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let mut node = Node::named(local_name(e.name()));
                read_attributes(&e, &mut node);
                stack.push(node);
            }
            Ok(Event::Empty(e)) => {
                let mut node = Node::named(local_name(e.name()));
                read_attributes(&e, &mut node);
                attach(&mut stack, node);
            }
            Ok(Event::End(_)) => {
                if stack.len() > 1 {
                    let node = stack.pop().unwrap_or_default();
                    attach(&mut stack, node);
                }
            }
            Ok(Event::Text(t)) => {
                let text = t
                    .unescape()
                    .map(Cow::into_owned)
                    .unwrap_or_else(|_| String::from_utf8_lossy(&t).into_owned());
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&text);
                }
            }
            Ok(Event::CData(t)) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&t));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            // Unrecoverable markup error: keep what was built so far.
            Err(e) => {
                tracing::debug!(error = ?e, position = reader.buffer_position(), "stopping tolerant parse");
                break;
            }
        }
        buf.clear();
    }

    // Unterminated elements at EOF still belong to the tree.
    while stack.len() > 1 {
        let node = stack.pop().unwrap_or_default();
        attach(&mut stack, node);
    }
    stack.pop().unwrap_or_default()
}

fn attach(stack: &mut [Node], node: Node) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    }
}

fn local_name(name: quick_xml::name::QName<'_>) -> String {
    String::from_utf8_lossy(name.local_name().into_inner()).into_owned()
}

fn read_attributes(e: &quick_xml::events::BytesStart<'_>, node: &mut Node) {
    for attr in e.attributes().with_checks(false).flatten() {
        let key = attr.key;
        // Namespace declarations are not data.
        if key.into_inner() == b"xmlns" || key.prefix().is_some_and(|p| p.into_inner() == b"xmlns") {
            continue;
        }
        let value = attr
            .unescape_value()
            .map(Cow::into_owned)
            .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned());
        node.attributes.push((local_name(key), value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queries_ignore_namespace_prefixes() {
        let doc = parse(
            br#"<feed xmlns="http://www.w3.org/2005/Atom" xmlns:cbc="urn:x">
                  <entry>
                    <title>Obra</title>
                    <cbc:ContractFolderID>EXP-1</cbc:ContractFolderID>
                  </entry>
                </feed>"#,
        );
        let entries = doc.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].child("title").unwrap().text(), "Obra");
        assert_eq!(
            entries[0].descendant("ContractFolderID").unwrap().text(),
            "EXP-1"
        );
    }

    #[test]
    fn undeclared_prefixes_are_fine() {
        let doc = parse(b"<feed><entry><cac:Thing><cbc:Code>45261215</cbc:Code></cac:Thing></entry></feed>");
        assert_eq!(doc.entries()[0].descendant("Code").unwrap().text(), "45261215");
    }

    #[test]
    fn missing_nodes_yield_empty_results() {
        let doc = parse(b"<feed><entry/></feed>");
        let entry = doc.entries()[0];
        assert!(entry.child("title").is_none());
        assert!(entry.descendant("TotalAmount").is_none());
        assert!(entry.descendants("ItemClassificationCode").is_empty());
        assert_eq!(entry.attribute("href"), None);
    }

    #[test]
    fn truncated_document_keeps_recoverable_entries() {
        let doc = parse(
            b"<feed><entry><title>first</title></entry><entry><title>sec",
        );
        let entries = doc.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].child("title").unwrap().text(), "first");
        // The truncated entry survives with whatever text made it in.
        assert!(entries[1].child("title").is_some());
    }

    #[test]
    fn garbage_yields_zero_entries_without_panicking() {
        assert!(parse(b"not xml at all <<<>>>").entries().is_empty());
        assert!(parse(b"").entries().is_empty());
    }

    #[test]
    fn mismatched_end_tags_do_not_abort() {
        let doc = parse(b"<feed><entry><title>ok</wrong></entry></feed>");
        assert_eq!(doc.entries()[0].child("title").unwrap().text(), "ok");
    }

    #[test]
    fn attributes_resolve_by_local_name() {
        let doc = parse(br#"<feed><entry><link ns1:type="x" href="https://e.test/1"/></entry></feed>"#);
        let link = doc.entries()[0].child("link").unwrap();
        assert_eq!(link.attribute("href"), Some("https://e.test/1"));
        assert_eq!(link.attribute("type"), Some("x"));
    }

    #[test]
    fn cdata_and_entities_become_text() {
        let doc = parse(b"<feed><entry><title>a &amp; <![CDATA[b < c]]></title></entry></feed>");
        assert_eq!(doc.entries()[0].child("title").unwrap().text(), "a & b < c");
    }
}
