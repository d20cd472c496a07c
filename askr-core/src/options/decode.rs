use tracing::warn;

use crate::document::{Mark, Node};
use crate::error::OptionError;

use super::spec::{Arity, OptionSpec};

/// The keys an option definition may use.
pub const OPTION_KEYS: &[&str] = &["name", "description", "argument", "short", "long"];

/// How an unrecognised `argument` value is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ArgumentPolicy {
    /// Fall back to no argument, with a warning.
    #[default]
    Lenient,
    Strict,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    pub arguments: ArgumentPolicy,
}

impl DecodeOptions {
    pub fn strict() -> Self {
        Self {
            arguments: ArgumentPolicy::Strict,
        }
    }
}

/// Rejects any key of the map `node` that is not listed in `valid_keys`.
pub fn validate_keys(node: &Node, valid_keys: &[&str]) -> Result<(), OptionError> {
    let entries = node.as_map().ok_or_else(|| OptionError::NotAMap {
        mark: node.mark().clone(),
    })?;
    for (key, value) in entries {
        if !valid_keys.contains(&key.as_str()) {
            return Err(OptionError::UnknownKey {
                key: key.clone(),
                mark: value.mark().clone(),
            });
        }
    }
    Ok(())
}

/// Converts one entry of an `options` section into an option definition.
pub fn decode_option(node: &Node, options: &DecodeOptions) -> Result<OptionSpec, OptionError> {
    validate_keys(node, OPTION_KEYS)?;

    let (name, _) = required(node, "name")?;
    let (description, _) = required(node, "description")?;

    let arity = match scalar(node, "argument")? {
        None => Arity::None,
        Some((text, mark)) => match Arity::from_keyword(text) {
            Some(arity) => arity,
            None => match options.arguments {
                ArgumentPolicy::Lenient => {
                    warn!(value = text, at = %mark, "unknown 'argument' value, assuming none");
                    Arity::None
                }
                ArgumentPolicy::Strict => {
                    return Err(OptionError::UnknownArgument {
                        value: text.to_string(),
                        mark: mark.clone(),
                    })
                }
            },
        },
    };

    let short = decode_short(node)?;
    let long = decode_long(node)?;

    Ok(OptionSpec::named(name, long, short, description, arity))
}

fn decode_short(node: &Node) -> Result<char, OptionError> {
    let (text, mark) = required(node, "short")?;
    let mut chars = text.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some('-'), Some(flag), None) if flag != '-' && flag != ':' && !flag.is_whitespace() => {
            Ok(flag)
        }
        _ => Err(OptionError::MalformedShort {
            value: text.to_string(),
            mark: mark.clone(),
        }),
    }
}

fn decode_long(node: &Node) -> Result<String, OptionError> {
    let Some((text, mark)) = scalar(node, "long")? else {
        return Ok(String::new());
    };
    let malformed = |reason: &'static str| OptionError::MalformedLong {
        value: text.to_string(),
        reason,
        mark: mark.clone(),
    };
    let long = text
        .strip_prefix("--")
        .ok_or_else(|| malformed("must start with '--'"))?;
    if long.is_empty() {
        return Err(malformed("must name the option after '--'"));
    }
    if long.contains('=') {
        return Err(malformed("must not contain '='"));
    }
    Ok(long.to_string())
}

fn required<'n>(node: &'n Node, key: &'static str) -> Result<(&'n str, &'n Mark), OptionError> {
    scalar(node, key)?.ok_or_else(|| OptionError::MissingKey {
        key,
        mark: node.mark().clone(),
    })
}

/// The scalar text under `key`; absent and null values read as `None`.
fn scalar<'n>(node: &'n Node, key: &'static str) -> Result<Option<(&'n str, &'n Mark)>, OptionError> {
    match node.get(key) {
        None => Ok(None),
        Some(value) if value.is_null() => Ok(None),
        Some(value) => match value.as_scalar() {
            Some(text) => Ok(Some((text, value.mark()))),
            None => Err(OptionError::NotScalar {
                key,
                mark: value.mark().clone(),
            }),
        },
    }
}
