//! A minimal, allocating XML DOM. DTSX/conmgr/mapping documents are small
//! (single files, not streamed multi-gigabyte feeds) and their shape is
//! deeply optional/nested, so a tree is easier to walk than raw push events.

use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct XmlElement {
    pub tag: String,
    pub attrs: HashMap<String, String>,
    pub children: Vec<XmlElement>,
    pub text: String,
}

impl XmlElement {
    /// Tag name with any `Prefix:` namespace alias stripped.
    pub fn local_name(&self) -> &str {
        self.tag.rsplit(':').next().unwrap_or(&self.tag)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(|s| s.as_str())
    }

    pub fn children_named<'a>(&'a self, local_name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.local_name() == local_name)
    }

    pub fn child_named(&self, local_name: &str) -> Option<&XmlElement> {
        self.children_named(local_name).next()
    }

    /// Depth-first search for the first descendant with this local name.
    pub fn find_descendant(&self, local_name: &str) -> Option<&XmlElement> {
        for child in &self.children {
            if child.local_name() == local_name {
                return Some(child);
            }
            if let Some(found) = child.find_descendant(local_name) {
                return Some(found);
            }
        }
        None
    }

    /// Collects every descendant (not self) with this local name.
    pub fn find_all_descendants<'a>(&'a self, local_name: &str, out: &mut Vec<&'a XmlElement>) {
        for child in &self.children {
            if child.local_name() == local_name {
                out.push(child);
            }
            child.find_all_descendants(local_name, out);
        }
    }

    /// Text of a `DTS:Property Name="X"` style child, if present.
    pub fn property_text(&self, name: &str) -> Option<&str> {
        self.children_named("Property")
            .find(|p| p.attr("Name") == Some(name))
            .map(|p| p.text.as_str())
    }
}

/// Parses a full XML document into a synthetic root wrapping every
/// top-level element (documents are expected to have exactly one, but this
/// tolerates stray siblings rather than failing).
pub fn parse(xml: &str) -> Result<XmlElement, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut root = XmlElement {
        tag: "#document".to_string(),
        ..Default::default()
    };
    let mut stack: Vec<XmlElement> = vec![];
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                let mut attrs = HashMap::new();
                for attr in e.attributes().flatten() {
                    let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
                    let value = attr.decode_and_unescape_value(reader.decoder()).unwrap_or_default();
                    attrs.insert(key, value.into_owned());
                }
                stack.push(XmlElement {
                    tag,
                    attrs,
                    children: Vec::new(),
                    text: String::new(),
                });
            }
            Event::Empty(e) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                let mut attrs = HashMap::new();
                for attr in e.attributes().flatten() {
                    let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
                    let value = attr.decode_and_unescape_value(reader.decoder()).unwrap_or_default();
                    attrs.insert(key, value.into_owned());
                }
                let elem = XmlElement {
                    tag,
                    attrs,
                    children: Vec::new(),
                    text: String::new(),
                };
                match stack.last_mut() {
                    Some(parent) => parent.children.push(elem),
                    None => root.children.push(elem),
                }
            }
            Event::Text(t) => {
                let text = t.unescape().unwrap_or_default().into_owned();
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&text);
                }
            }
            Event::CData(t) => {
                let text = String::from_utf8_lossy(t.as_ref()).into_owned();
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&text);
                }
            }
            Event::End(_) => {
                if let Some(finished) = stack.pop() {
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(finished),
                        None => root.children.push(finished),
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(root)
}
