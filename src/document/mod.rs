//! Document model consumed by the compliance checker
//!
//! A document is a list of nodes; each node carries a style map (CSS-like
//! properties), an attribute map (content, src, alt, ...) and child nodes.
//! Both maps default to empty when absent from the input.

use crate::error::CompatError;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// A style or attribute value
///
/// Null and non-scalar values (objects, arrays) are kept but count as blank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Null,
    Other(serde_json::Value),
}

impl AttrValue {
    /// Textual form as it would appear in markup
    pub fn as_text(&self) -> String {
        match self {
            AttrValue::Text(s) => s.clone(),
            AttrValue::Number(n) => n.to_string(),
            AttrValue::Bool(b) => b.to_string(),
            AttrValue::Null => String::new(),
            AttrValue::Other(v) => v.to_string(),
        }
    }

    /// True for null, non-scalar values and empty or whitespace-only text
    pub fn is_blank(&self) -> bool {
        match self {
            AttrValue::Text(s) => s.trim().is_empty(),
            AttrValue::Number(_) | AttrValue::Bool(_) => false,
            AttrValue::Null | AttrValue::Other(_) => true,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Text(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Text(s)
    }
}

impl From<f64> for AttrValue {
    fn from(n: f64) -> Self {
        AttrValue::Number(n)
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        AttrValue::Bool(b)
    }
}

/// Node kinds the checker treats specially
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Image,
    Button,
    Link,
    Text,
    Other,
}

impl NodeKind {
    pub fn from_type(node_type: &str) -> Self {
        match node_type {
            "image" => NodeKind::Image,
            "button" => NodeKind::Button,
            "link" => NodeKind::Link,
            "text" => NodeKind::Text,
            _ => NodeKind::Other,
        }
    }
}

/// One block in a composed document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "BTreeMap::is_empty")]
    pub style: BTreeMap<String, AttrValue>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, AttrValue>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

/// Treat an explicit `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Node {
    pub fn new(id: &str, node_type: &str) -> Self {
        Self {
            id: id.to_string(),
            node_type: node_type.to_string(),
            ..Self::default()
        }
    }

    /// Set a style property
    pub fn style(mut self, property: &str, value: impl Into<AttrValue>) -> Self {
        self.style.insert(property.to_string(), value.into());
        self
    }

    /// Set an attribute
    pub fn attr(mut self, name: &str, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    /// Append a child node
    pub fn child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn kind(&self) -> NodeKind {
        NodeKind::from_type(&self.node_type)
    }

    /// Style value, if present and not blank
    pub fn style_value(&self, property: &str) -> Option<&AttrValue> {
        self.style.get(property).filter(|v| !v.is_blank())
    }

    /// Attribute value, if present and not blank
    pub fn attr_value(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name).filter(|v| !v.is_blank())
    }

    /// Number of nodes in this subtree, including this one
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Node::subtree_len).sum::<usize>()
    }
}

/// Parse a document (a JSON array of nodes)
pub fn parse_document(json: &str) -> Result<Vec<Node>, CompatError> {
    serde_json::from_str(json).map_err(CompatError::InvalidDocument)
}

/// Load a document from a JSON file
pub fn load_document(path: &Path) -> Result<Vec<Node>, CompatError> {
    let content = std::fs::read_to_string(path).map_err(|source| CompatError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_document(&content)
}
