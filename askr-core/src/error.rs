use askr_support::quoted;
use thiserror::Error;

use crate::document::Mark;

/// Problems found while decoding, registering or compiling option definitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionError {
    #[error("{mark}: unsupported key {}", quoted(.key))]
    UnknownKey { key: String, mark: Mark },
    #[error("{mark}: {} key is required", quoted(.key))]
    MissingKey { key: &'static str, mark: Mark },
    #[error("{mark}: {} value must be a scalar", quoted(.key))]
    NotScalar { key: &'static str, mark: Mark },
    #[error("{mark}: 'short' value should start with a '-' followed by a single letter")]
    MalformedShort { value: String, mark: Mark },
    #[error("{mark}: 'long' value {reason}")]
    MalformedLong {
        value: String,
        reason: &'static str,
        mark: Mark,
    },
    #[error(
        "{mark}: unsupported 'argument' value {} (expected no, none, required or optional)",
        quoted(.value)
    )]
    UnknownArgument { value: String, mark: Mark },
    #[error("{mark}: expected an option definition map")]
    NotAMap { mark: Mark },
    #[error("{mark}: expected a sequence of option definitions")]
    NotASequence { mark: Mark },
    #[error("{option} uses {short:?}, which cannot name a short option")]
    InvalidShort { short: char, option: String },
    #[error("short option '-{short}' is defined by both {first} and {second}")]
    DuplicateShort {
        short: char,
        first: String,
        second: String,
    },
    #[error("long option '--{long}' is defined by both {first} and {second}")]
    DuplicateLong {
        long: String,
        first: String,
        second: String,
    },
    #[error("cannot add {option} after the option registry has been compiled")]
    Sealed { option: String },
}

impl OptionError {
    /// Location of the offending configuration node, when the error came from one.
    pub fn mark(&self) -> Option<&Mark> {
        match self {
            OptionError::UnknownKey { mark, .. }
            | OptionError::MissingKey { mark, .. }
            | OptionError::NotScalar { mark, .. }
            | OptionError::MalformedShort { mark, .. }
            | OptionError::MalformedLong { mark, .. }
            | OptionError::UnknownArgument { mark, .. }
            | OptionError::NotAMap { mark }
            | OptionError::NotASequence { mark } => Some(mark),
            OptionError::InvalidShort { .. }
            | OptionError::DuplicateShort { .. }
            | OptionError::DuplicateLong { .. }
            | OptionError::Sealed { .. } => None,
        }
    }
}

/// Failures loading the configuration document itself.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("expected a map with options / reader / filter / output sections")]
    NotAMap,
    #[error(transparent)]
    Option(#[from] OptionError),
}
