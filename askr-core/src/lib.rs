mod config;
mod document;
mod error;
mod getopt;
mod options;

pub use crate::config::ConfigDocument;
pub use crate::document::{Mark, Node, NodeKind};
pub use crate::error::{ConfigError, OptionError};
pub use crate::getopt::{parse_short_specifier, Getopt, GetoptError, Parsed};
pub use crate::options::{
    decode_option, validate_keys, ArgumentPolicy, Arity, CompiledOptions, DecodeOptions,
    LongOption, OptionRegistry, OptionSpec, OptionValues, Origin, Phase, ValueError, OPTION_KEYS,
};

/// Version shown in the help banner.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
