//! A small structured-document tree (map / sequence / scalar) that decoders work on.
//!
//! Keeping decoders on this tree rather than on a YAML library's value type means the
//! validation rules do not care which parser produced the document.

use std::fmt;

use serde::de::{self, DeserializeSeed, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde_yaml::{Mapping, Value as YamlValue};

/// Where a node sits in its document, as a path such as `options[1].long`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Mark {
    path: String,
}

impl Mark {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn key(&self, key: &str) -> Mark {
        let path = if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.path, key)
        };
        Mark { path }
    }

    pub fn index(&self, index: usize) -> Mark {
        Mark {
            path: format!("{}[{}]", self.path, index),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "document root")
        } else {
            write!(f, "{}", self.path)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Null,
    Scalar(String),
    Sequence(Vec<Node>),
    Map(Vec<(String, Node)>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    kind: NodeKind,
    mark: Mark,
}

impl Node {
    pub fn null() -> Self {
        Self::new(NodeKind::Null)
    }

    pub fn scalar(text: impl Into<String>) -> Self {
        Self::new(NodeKind::Scalar(text.into()))
    }

    pub fn sequence(items: impl IntoIterator<Item = Node>) -> Self {
        Self::new(NodeKind::Sequence(items.into_iter().collect())).with_mark(Mark::root())
    }

    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, Node)>) -> Self {
        let entries = entries
            .into_iter()
            .map(|(key, node)| (key.into(), node))
            .collect();
        Self::new(NodeKind::Map(entries)).with_mark(Mark::root())
    }

    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            mark: Mark::root(),
        }
    }

    /// Moves this node to `mark`, re-marking every descendant to match.
    pub fn with_mark(mut self, mark: Mark) -> Self {
        self.kind = match self.kind {
            NodeKind::Sequence(items) => NodeKind::Sequence(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(index, item)| item.with_mark(mark.index(index)))
                    .collect(),
            ),
            NodeKind::Map(entries) => NodeKind::Map(
                entries
                    .into_iter()
                    .map(|(key, node)| {
                        let child = mark.key(&key);
                        (key, node.with_mark(child))
                    })
                    .collect(),
            ),
            other => other,
        };
        self.mark = mark;
        self
    }

    /// Parses YAML text into a tree rooted at [`Mark::root`].
    ///
    /// Scalars keep the text as written: `-0`, `3.10` and `0x10` stay as they are instead of
    /// being read as numbers and printed back.
    pub fn parse_yaml(text: &str) -> Result<Node, serde_yaml::Error> {
        let shape: YamlValue = serde_yaml::from_str(text)?;
        if shape.is_null() {
            return Ok(Node::null());
        }
        NodeSeed {
            shape: &shape,
            mark: Mark::root(),
        }
        .deserialize(serde_yaml::Deserializer::from_str(text))
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn mark(&self) -> &Mark {
        &self.mark
    }

    pub fn is_null(&self) -> bool {
        matches!(self.kind, NodeKind::Null)
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Scalar(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Node]> {
        match &self.kind {
            NodeKind::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&[(String, Node)]> {
        match &self.kind {
            NodeKind::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Looks up `key` when this node is a map.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_map()?
            .iter()
            .find(|(candidate, _)| candidate == key)
            .map(|(_, node)| node)
    }
}

/// Second pass over a document whose structure is already known from `shape`. Knowing the
/// shape lets every scalar be requested as a string, which serde_yaml answers with the
/// written text.
struct NodeSeed<'s> {
    shape: &'s YamlValue,
    mark: Mark,
}

impl<'de, 's> DeserializeSeed<'de> for NodeSeed<'s> {
    type Value = Node;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Node, D::Error> {
        let NodeSeed { shape, mark } = self;
        let kind = match untagged(shape) {
            YamlValue::Null => {
                deserializer.deserialize_ignored_any(IgnoredAny)?;
                NodeKind::Null
            }
            YamlValue::Sequence(items) => NodeKind::Sequence(deserializer.deserialize_seq(
                SequenceVisitor {
                    items,
                    mark: &mark,
                },
            )?),
            YamlValue::Mapping(mapping) => NodeKind::Map(deserializer.deserialize_map(
                MappingVisitor {
                    mapping,
                    mark: &mark,
                },
            )?),
            _ => NodeKind::Scalar(deserializer.deserialize_str(TextVisitor)?),
        };
        Ok(Node { kind, mark })
    }
}

struct SequenceVisitor<'s, 'm> {
    items: &'s [YamlValue],
    mark: &'m Mark,
}

impl<'de, 's, 'm> Visitor<'de> for SequenceVisitor<'s, 'm> {
    type Value = Vec<Node>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a sequence of {} items", self.items.len())
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<Vec<Node>, A::Error> {
        let mut nodes = Vec::with_capacity(self.items.len());
        for (index, item) in self.items.iter().enumerate() {
            let seed = NodeSeed {
                shape: item,
                mark: self.mark.index(index),
            };
            match access.next_element_seed(seed)? {
                Some(node) => nodes.push(node),
                None => return Err(de::Error::invalid_length(index, &self)),
            }
        }
        Ok(nodes)
    }
}

struct MappingVisitor<'s, 'm> {
    mapping: &'s Mapping,
    mark: &'m Mark,
}

impl<'de, 's, 'm> Visitor<'de> for MappingVisitor<'s, 'm> {
    type Value = Vec<(String, Node)>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a map of {} entries", self.mapping.len())
    }

    fn visit_map<A: MapAccess<'de>>(
        self,
        mut access: A,
    ) -> Result<Vec<(String, Node)>, A::Error> {
        let mut entries = Vec::with_capacity(self.mapping.len());
        for (index, (key, value)) in self.mapping.iter().enumerate() {
            let Some(key) = access.next_key_seed(KeySeed { shape: key })? else {
                return Err(de::Error::invalid_length(index, &self));
            };
            let node = access.next_value_seed(NodeSeed {
                shape: value,
                mark: self.mark.key(&key),
            })?;
            entries.push((key, node));
        }
        Ok(entries)
    }
}

struct KeySeed<'s> {
    shape: &'s YamlValue,
}

impl<'de, 's> DeserializeSeed<'de> for KeySeed<'s> {
    type Value = String;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<String, D::Error> {
        match untagged(self.shape) {
            complex @ (YamlValue::Sequence(_) | YamlValue::Mapping(_)) => {
                deserializer.deserialize_ignored_any(IgnoredAny)?;
                Ok(serde_yaml::to_string(complex)
                    .map(|text| text.trim().to_string())
                    .unwrap_or_else(|_| "<complex key>".to_string()))
            }
            _ => deserializer.deserialize_str(TextVisitor),
        }
    }
}

struct TextVisitor;

impl<'de> Visitor<'de> for TextVisitor {
    type Value = String;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a scalar")
    }

    fn visit_str<E: de::Error>(self, text: &str) -> Result<String, E> {
        Ok(text.to_string())
    }

    fn visit_string<E: de::Error>(self, text: String) -> Result<String, E> {
        Ok(text)
    }
}

fn untagged(value: &YamlValue) -> &YamlValue {
    match value {
        YamlValue::Tagged(tagged) => untagged(&tagged.value),
        other => other,
    }
}
