//! OSM XML serialization
//!
//! Builds an explicit element tree (name, attributes, ordered children)
//! and renders it in a separate pass through a `quick_xml::Writer`, so the
//! construction logic stays unit-testable independent of any network code.
//! Given identical inputs the output is byte-identical: attributes keep
//! insertion order and tag maps iterate sorted.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use crate::error::Result;
use crate::way::OsmWay;

/// Application identifier attached to changesets as `created_by`
pub const CREATED_BY: &str = concat!("tiger-review/", env!("CARGO_PKG_VERSION"));

/// A single XML element: tag name, ordered attributes, ordered children.
/// No text content; the OSM changeset payloads are attribute-only.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn new(name: &str) -> Self {
        XmlElement {
            name: name.to_string(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, key: &str, value: impl ToString) -> Self {
        self.attributes.push((key.to_string(), value.to_string()));
        self
    }

    pub fn child(mut self, child: XmlElement) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(&self) -> &[XmlElement] {
        &self.children
    }

    fn write_into(&self, writer: &mut Writer<Vec<u8>>) -> Result<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }
        if self.children.is_empty() {
            writer.write_event(Event::Empty(start))?;
        } else {
            writer.write_event(Event::Start(start))?;
            for child in &self.children {
                child.write_into(writer)?;
            }
            writer.write_event(Event::End(BytesEnd::new(self.name.as_str())))?;
        }
        Ok(())
    }

    /// Render as a complete document with an XML declaration
    pub fn to_document_string(&self) -> Result<String> {
        let mut writer = Writer::new(Vec::new());
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        self.write_into(&mut writer)?;
        bytes_to_string(writer.into_inner())
    }

    /// Render without an XML declaration (the OSM API accepts headless
    /// changeset-creation bodies)
    pub fn to_fragment_string(&self) -> Result<String> {
        let mut writer = Writer::new(Vec::new());
        self.write_into(&mut writer)?;
        bytes_to_string(writer.into_inner())
    }
}

fn bytes_to_string(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes)
        .map_err(|e| crate::error::Error::Parse(format!("non-UTF-8 XML output: {}", e)))
}

/// Convert a way to its OSM XML element.
///
/// Attributes: id, version (incremented when `increment_version`, for the
/// server's optimistic-concurrency check), changeset. Children: one `nd`
/// per node id in original order, then one `tag` per non-empty tag value,
/// skipping `tiger:`-prefixed keys (case-insensitive) when `strip_tiger`.
pub fn way_to_xml(
    way: &OsmWay,
    changeset: u64,
    increment_version: bool,
    strip_tiger: bool,
) -> XmlElement {
    let version = if increment_version {
        way.version + 1
    } else {
        way.version
    };
    let mut element = XmlElement::new("way")
        .attr("id", way.id)
        .attr("version", version)
        .attr("changeset", changeset);

    for node_id in &way.nodes {
        element = element.child(XmlElement::new("nd").attr("ref", node_id));
    }

    for (key, value) in &way.tags {
        if value.is_empty() {
            continue;
        }
        if strip_tiger && key.to_lowercase().starts_with("tiger:") {
            continue;
        }
        element = element.child(XmlElement::new("tag").attr("k", key).attr("v", value));
    }

    element
}

/// Build the `osmChange` upload document for a batch of queued ways.
///
/// Every way shares the document root and changeset id; versions are
/// always incremented and TIGER tags always stripped on this path.
pub fn osm_change_document(ways: &[OsmWay], changeset: u64) -> Result<String> {
    let mut root = XmlElement::new("osmChange").attr("version", "0.6");
    for way in ways {
        root = root.child(XmlElement::new("modify").child(way_to_xml(way, changeset, true, true)));
    }
    root.to_document_string()
}

/// Metadata tags attached once at changeset creation
#[derive(Debug, Clone)]
pub struct ChangesetMeta {
    pub created_by: String,
    pub comment: String,
    pub source: Option<String>,
    pub host: Option<String>,
}

impl ChangesetMeta {
    pub fn new(comment: &str) -> Self {
        ChangesetMeta {
            created_by: CREATED_BY.to_string(),
            comment: comment.to_string(),
            source: None,
            host: None,
        }
    }

    pub fn with_source(mut self, source: &str) -> Self {
        if !source.is_empty() {
            self.source = Some(source.to_string());
        }
        self
    }

    pub fn with_host(mut self, host: &str) -> Self {
        if !host.is_empty() {
            self.host = Some(host.to_string());
        }
        self
    }
}

/// Build the `PUT /api/0.6/changeset/create` request body
pub fn changeset_creation_document(meta: &ChangesetMeta) -> Result<String> {
    let tag = |k: &str, v: &str| XmlElement::new("tag").attr("k", k).attr("v", v);

    let mut changeset = XmlElement::new("changeset")
        .child(tag("created_by", &meta.created_by))
        .child(tag("comment", &meta.comment));
    if let Some(source) = &meta.source {
        changeset = changeset.child(tag("source", source));
    }
    if let Some(host) = &meta.host {
        changeset = changeset.child(tag("host", host));
    }

    XmlElement::new("osm").child(changeset).to_fragment_string()
}
