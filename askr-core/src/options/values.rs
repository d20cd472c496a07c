use std::collections::HashMap;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("option values need a non-empty key")]
    EmptyKey,
}

/// Values collected for options, keyed by option name.
///
/// Each key maps to a sequence of strings. Values accumulate across repeated occurrences of
/// an option, and a single comma separated argument contributes one entry per element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionValues {
    order: Vec<String>,
    values: HashMap<String, Vec<String>>,
}

impl OptionValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Splits `raw` on `,` and appends every trimmed, non-empty token to `key`.
    pub fn add(&mut self, key: &str, raw: &str) -> Result<(), ValueError> {
        let entry = self.entry(key)?;
        entry.extend(
            raw.split(',')
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(str::to_string),
        );
        Ok(())
    }

    /// Records an occurrence of `key` without a value.
    pub fn touch(&mut self, key: &str) -> Result<(), ValueError> {
        self.entry(key).map(|_| ())
    }

    pub fn get(&self, key: &str) -> &[String] {
        self.values.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Keys in the order they were first seen.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn entry(&mut self, key: &str) -> Result<&mut Vec<String>, ValueError> {
        if key.is_empty() {
            return Err(ValueError::EmptyKey);
        }
        if !self.values.contains_key(key) {
            self.order.push(key.to_string());
        }
        Ok(self.values.entry(key.to_string()).or_default())
    }
}
