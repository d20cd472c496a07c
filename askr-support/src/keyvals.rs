//! Ordered key/value record store.
//!
//! A store holds exactly one record. Every key and value is a span into the single buffer
//! the store was created with, so one buffer may back many stores but a store never mixes
//! text from two buffers.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Range;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpanError {
    OutOfBounds { span: Range<usize>, len: usize },
    NotCharBoundary { span: Range<usize> },
}

impl fmt::Display for SpanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpanError::OutOfBounds { span, len } => write!(
                f,
                "span {}..{} is outside the record buffer of {} bytes",
                span.start, span.end, len
            ),
            SpanError::NotCharBoundary { span } => write!(
                f,
                "span {}..{} does not fall on character boundaries",
                span.start, span.end
            ),
        }
    }
}

impl std::error::Error for SpanError {}

/// A key span. Hashes and compares by the text it covers, so lookups work with `&str`.
#[derive(Clone)]
struct Key {
    buffer: Arc<str>,
    span: Range<usize>,
}

impl Key {
    fn as_str(&self) -> &str {
        &self.buffer[self.span.clone()]
    }
}

impl Borrow<str> for Key {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct KeyValueStore {
    buffer: Arc<str>,
    order: Vec<Key>,
    entries: HashMap<Key, Range<usize>>,
}

impl KeyValueStore {
    pub fn new(buffer: Arc<str>) -> Self {
        Self {
            buffer,
            order: Vec::new(),
            entries: HashMap::new(),
        }
    }

    pub fn buffer(&self) -> &Arc<str> {
        &self.buffer
    }

    /// Inserts `key = value`. A key seen before keeps its position and takes the new value.
    pub fn insert(&mut self, key: Range<usize>, value: Range<usize>) -> Result<(), SpanError> {
        self.check(&key)?;
        self.check(&value)?;
        let key = Key {
            buffer: Arc::clone(&self.buffer),
            span: key,
        };
        if let Some(existing) = self.entries.get_mut(key.as_str()) {
            *existing = value;
            return Ok(());
        }
        self.order.push(key.clone());
        self.entries.insert(key, value);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(key)
            .map(|span| &self.buffer[span.clone()])
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Entries in the order their keys were first inserted.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.order.iter().filter_map(move |key| {
            self.entries
                .get(key)
                .map(|span| (key.as_str(), &self.buffer[span.clone()]))
        })
    }

    fn check(&self, span: &Range<usize>) -> Result<(), SpanError> {
        if span.start > span.end || span.end > self.buffer.len() {
            return Err(SpanError::OutOfBounds {
                span: span.clone(),
                len: self.buffer.len(),
            });
        }
        if !self.buffer.is_char_boundary(span.start) || !self.buffer.is_char_boundary(span.end) {
            return Err(SpanError::NotCharBoundary { span: span.clone() });
        }
        Ok(())
    }
}
