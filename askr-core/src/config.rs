//! The script configuration document.
//!
//! The document is a map. Its `options` section declares script specific command line
//! options; the `reader`, `filter` and `output` sections belong to the record pipeline and
//! are only carried here.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::document::Node;
use crate::error::{ConfigError, OptionError};
use crate::options::{DecodeOptions, OptionRegistry};

#[derive(Debug, Clone)]
pub struct ConfigDocument {
    root: Node,
}

impl ConfigDocument {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        debug!(path = %path.display(), bytes = text.len(), "read configuration");
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let root = Node::parse_yaml(text)?;
        if root.as_map().is_none() {
            return Err(ConfigError::NotAMap);
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn section(&self, name: &str) -> Option<&Node> {
        self.root.get(name)
    }

    pub fn options(&self) -> Option<&Node> {
        self.section("options")
    }

    /// The built-in options followed by every option this document declares.
    pub fn build_registry(&self, options: &DecodeOptions) -> Result<OptionRegistry, OptionError> {
        let mut registry = OptionRegistry::with_builtins();
        if let Some(section) = self.options() {
            let added = registry.decode_and_append(section, options)?;
            debug!(added, "decoded script options");
        }
        Ok(registry)
    }
}
