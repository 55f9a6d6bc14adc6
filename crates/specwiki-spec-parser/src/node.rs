//! Order-preserving document tree.
//!
//! The YAML document is loaded once into a [`Node`] tree. Extraction code
//! walks the tree through the typed accessors below, so a key holding the
//! wrong kind of value fails locally with a [`ParseError::Shape`].

use std::collections::HashSet;
use std::fmt;

use serde::de::{self, Deserialize, Deserializer, EnumAccess, MapAccess, SeqAccess, VariantAccess, Visitor};

use crate::error::ParseError;

/// A node of the loaded document.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// YAML `null` (or an empty value such as `description:`).
    Null,
    /// Any scalar, rendered as text (`200` and `true` included).
    Scalar(String),
    Sequence(Vec<Node>),
    /// Key/value pairs in document order. A repeated key keeps only its
    /// last occurrence, at the position where that occurrence appears.
    Mapping(Vec<(String, Node)>),
}

impl Node {
    /// Parse a YAML (or JSON) document into a tree.
    ///
    /// Mappings are read pair by pair rather than through a map type, so a
    /// key that occurs twice is accepted and the later occurrence wins.
    pub fn from_yaml(input: &str) -> Result<Node, ParseError> {
        if input.trim().is_empty() {
            return Ok(Node::Null);
        }
        serde_yaml::from_str(input).map_err(|e| ParseError::Document(e.to_string()))
    }

    /// Human-readable kind, used in shape errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Null => "null",
            Node::Scalar(_) => "scalar",
            Node::Sequence(_) => "sequence",
            Node::Mapping(_) => "mapping",
        }
    }

    /// Scalar text. `null` reads as the empty string.
    pub fn as_str(&self, at: &str) -> Result<&str, ParseError> {
        match self {
            Node::Scalar(s) => Ok(s),
            Node::Null => Ok(""),
            other => Err(other.shape_error(at, "scalar")),
        }
    }

    /// Ordered key/value pairs. `null` reads as an empty mapping.
    pub fn as_mapping(&self, at: &str) -> Result<&[(String, Node)], ParseError> {
        match self {
            Node::Mapping(pairs) => Ok(pairs),
            Node::Null => Ok(&[]),
            other => Err(other.shape_error(at, "mapping")),
        }
    }

    /// Ordered elements. `null` reads as an empty sequence.
    pub fn as_sequence(&self, at: &str) -> Result<&[Node], ParseError> {
        match self {
            Node::Sequence(items) => Ok(items),
            Node::Null => Ok(&[]),
            other => Err(other.shape_error(at, "sequence")),
        }
    }

    /// A sequence of scalars, as owned strings.
    pub fn as_string_list(&self, at: &str) -> Result<Vec<String>, ParseError> {
        self.as_sequence(at)?
            .iter()
            .enumerate()
            .map(|(i, item)| item.as_str(&format!("{at}[{i}]")).map(str::to_string))
            .collect()
    }

    /// Look up a key in a mapping node.
    pub fn get(&self, key: &str) -> Option<&Node> {
        match self {
            Node::Mapping(pairs) => pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    fn shape_error(&self, at: &str, expected: &'static str) -> ParseError {
        ParseError::Shape {
            at: at.to_string(),
            expected,
            found: self.kind(),
        }
    }
}

/// Append `key` to a dotted key path.
pub(crate) fn child_path(at: &str, key: &str) -> String {
    if at.is_empty() {
        key.to_string()
    } else {
        format!("{at}.{key}")
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(NodeVisitor)
    }
}

struct NodeVisitor;

impl<'de> Visitor<'de> for NodeVisitor {
    type Value = Node;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a YAML node")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Node, E> {
        Ok(Node::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Node, E> {
        Ok(Node::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Node, D::Error>
    where
        D: Deserializer<'de>,
    {
        Node::deserialize(deserializer)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Node, E> {
        Ok(Node::Scalar(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Node, E> {
        Ok(Node::Scalar(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Node, E> {
        Ok(Node::Scalar(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Node, E> {
        Ok(Node::Scalar(float_text(v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Node, E> {
        Ok(Node::Scalar(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Node, E> {
        Ok(Node::Scalar(v))
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Node, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::new();
        while let Some(item) = seq.next_element::<Node>()? {
            items.push(item);
        }
        Ok(Node::Sequence(items))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Node, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut pairs = Vec::new();
        while let Some((key, value)) = map.next_entry::<Node, Node>()? {
            let key = match key {
                Node::Scalar(text) => text,
                Node::Null => String::new(),
                other => {
                    return Err(de::Error::custom(format!(
                        "mapping keys must be scalars, found {}",
                        other.kind()
                    )))
                }
            };
            pairs.push((key, value));
        }
        Ok(Node::Mapping(last_occurrences(pairs)))
    }

    /// Tagged values (`!custom value`) keep only the value.
    fn visit_enum<A>(self, data: A) -> Result<Node, A::Error>
    where
        A: EnumAccess<'de>,
    {
        let (_tag, variant): (String, _) = data.variant()?;
        variant.newtype_variant::<Node>()
    }
}

/// Drop every pair whose key occurs again later in the mapping.
fn last_occurrences(pairs: Vec<(String, Node)>) -> Vec<(String, Node)> {
    let mut seen = HashSet::with_capacity(pairs.len());
    let mut kept: Vec<_> = pairs
        .into_iter()
        .rev()
        .filter(|(key, _)| seen.insert(key.clone()))
        .collect();
    kept.reverse();
    kept
}

/// Render a float the way YAML writes it (`1.0`, not `1`).
fn float_text(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 {
        format!("{v:.1}")
    } else {
        v.to_string()
    }
}
