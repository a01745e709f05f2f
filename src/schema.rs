//! Parsed protocol description, before any type mapping.
//!
//! Two front ends produce the same tree: Wayland protocol XML (the usual
//! `.xml` files shipped with wayland-protocols) and an equivalent JSON form.
//! Argument types stay as raw strings here; they are classified later so an
//! unknown type is reported with full request/event context.
use std::path::Path;

use roxmltree::Node;
use serde::Deserialize;

use crate::error::{GenError, SchemaError};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProtocolTree {
    pub name: String,
    #[serde(default)]
    pub interfaces: Vec<InterfaceNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InterfaceNode {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub requests: Vec<MessageNode>,
    #[serde(default)]
    pub events: Vec<MessageNode>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageNode {
    pub name: String,
    /// `destructor` for requests that destroy their receiver
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub since: Option<u32>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub args: Vec<ArgNode>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArgNode {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub interface: Option<String>,
    #[serde(default, rename = "allow-null")]
    pub allow_null: bool,
    #[serde(default)]
    pub summary: Option<String>,
}

fn default_version() -> u32 {
    1
}

impl MessageNode {
    pub fn is_destructor(&self) -> bool {
        self.kind.as_deref() == Some("destructor")
    }
}

// ————————————————————————————————————————————————————————————————————————————
// FRONT ENDS
// ————————————————————————————————————————————————————————————————————————————

/// Read a schema file; `.json` selects the JSON form, anything else XML.
pub fn load(path: &Path) -> Result<ProtocolTree, GenError> {
    let source = std::fs::read_to_string(path).map_err(|source| GenError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let is_json = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let tree = if is_json { parse_json(&source) } else { parse_xml(&source) };
    tree.map_err(|source| GenError::Schema {
        path: path.to_path_buf(),
        source,
    })
}

/// JSON form; errors name the offending path, e.g. `interfaces[0].requests[1]`.
pub fn parse_json(src: &str) -> Result<ProtocolTree, SchemaError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize(de).map_err(|err| {
        let path = err.path().to_string();
        SchemaError::Json(format!("at JSON path {path}: {}", err.into_inner()))
    })
}

pub fn parse_xml(src: &str) -> Result<ProtocolTree, SchemaError> {
    let doc = roxmltree::Document::parse(src)?;
    let root = doc.root_element();
    if root.tag_name().name() != "protocol" {
        return Err(SchemaError::UnexpectedRoot(root.tag_name().name().to_string()));
    }
    let interfaces = elements(root, "interface")
        .map(parse_interface)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ProtocolTree {
        name: required(root, "name")?.to_string(),
        interfaces,
    })
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn parse_interface(node: Node<'_, '_>) -> Result<InterfaceNode, SchemaError> {
    let version = match node.attribute("version") {
        Some(raw) => parse_u32(node, "version", raw)?,
        None => default_version(),
    };
    Ok(InterfaceNode {
        name: required(node, "name")?.to_string(),
        version,
        requests: elements(node, "request").map(parse_message).collect::<Result<_, _>>()?,
        events: elements(node, "event").map(parse_message).collect::<Result<_, _>>()?,
    })
}

fn parse_message(node: Node<'_, '_>) -> Result<MessageNode, SchemaError> {
    let since = node
        .attribute("since")
        .map(|raw| parse_u32(node, "since", raw))
        .transpose()?;
    Ok(MessageNode {
        name: required(node, "name")?.to_string(),
        kind: node.attribute("type").map(str::to_string),
        since,
        summary: summary_of(node),
        args: elements(node, "arg").map(parse_arg).collect::<Result<_, _>>()?,
    })
}

fn parse_arg(node: Node<'_, '_>) -> Result<ArgNode, SchemaError> {
    Ok(ArgNode {
        name: required(node, "name")?.to_string(),
        ty: required(node, "type")?.to_string(),
        interface: node.attribute("interface").map(str::to_string),
        allow_null: node.attribute("allow-null") == Some("true"),
        summary: node.attribute("summary").map(str::to_string),
    })
}

/// `<description summary="..">` child, or a `summary` attribute on the node itself.
fn summary_of(node: Node<'_, '_>) -> Option<String> {
    node.attribute("summary")
        .or_else(|| elements(node, "description").find_map(|d| d.attribute("summary")))
        .map(|s| s.split_whitespace().collect::<Vec<_>>().join(" "))
}

fn elements<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    tag: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(move |c| c.is_element() && c.tag_name().name() == tag)
}

fn required<'a>(node: Node<'a, '_>, attribute: &'static str) -> Result<&'a str, SchemaError> {
    node.attribute(attribute).ok_or_else(|| SchemaError::MissingAttribute {
        element: describe(node),
        attribute,
    })
}

fn parse_u32(node: Node<'_, '_>, attribute: &'static str, raw: &str) -> Result<u32, SchemaError> {
    raw.trim().parse().map_err(|_| SchemaError::BadAttribute {
        element: describe(node),
        attribute,
        value: raw.to_string(),
    })
}

fn describe(node: Node<'_, '_>) -> String {
    match node.attribute("name") {
        Some(name) => format!("{} name=\"{name}\"", node.tag_name().name()),
        None => node.tag_name().name().to_string(),
    }
}

// ------------------------------- Tests ------------------------------------ //
