//! A `getopt_long` compatible argument scanner driven by compiled option tables.
//!
//! Short options may be clustered (`-VH`) and take attached values (`-D3`). Long options
//! accept `--name=value`, `--name value` for required values, and any unambiguous prefix of
//! a long name. Operands are permuted behind the options, and `--` ends option scanning.

use std::collections::VecDeque;

use thiserror::Error;

use crate::options::{Arity, CompiledOptions, LongOption, OptionRegistry, OptionSpec};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GetoptError {
    #[error("invalid option -- '{0}'")]
    UnknownShort(char),
    #[error("unrecognized option '--{0}'")]
    UnknownLong(String),
    #[error("option requires an argument -- '{0}'")]
    MissingShortArgument(char),
    #[error("option '--{0}' requires an argument")]
    MissingLongArgument(String),
    #[error("option '--{0}' doesn't allow an argument")]
    UnexpectedArgument(String),
    #[error("option '--{name}' is ambiguous; possibilities: {}", possibilities(.candidates))]
    Ambiguous {
        name: String,
        candidates: Vec<String>,
    },
}

fn possibilities(candidates: &[String]) -> String {
    candidates
        .iter()
        .map(|candidate| format!("'--{candidate}'"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed<'a> {
    /// A recognised option. `index` is its position in the registry.
    Option {
        index: usize,
        option: &'a OptionSpec,
        value: Option<String>,
    },
    Operand(String),
}

#[derive(Debug, Clone)]
pub struct Getopt<'a> {
    registry: &'a OptionRegistry,
    shorts: Vec<(char, Arity)>,
    long_table: Vec<LongOption<'a>>,
    args: Vec<String>,
    position: usize,
    /// Remaining characters of a short option cluster: argument index and byte offset.
    pending: Option<(usize, usize)>,
    operands: VecDeque<String>,
    scanning: bool,
}

impl<'a> Getopt<'a> {
    pub fn new<I, S>(compiled: &CompiledOptions<'a>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            registry: compiled.registry(),
            shorts: parse_short_specifier(compiled.short_specifier()),
            long_table: compiled.long_table().to_vec(),
            args: args.into_iter().map(Into::into).collect(),
            position: 0,
            pending: None,
            operands: VecDeque::new(),
            scanning: true,
        }
    }

    fn matched(&self, index: usize, value: Option<String>) -> Result<Parsed<'a>, GetoptError> {
        let registry: &'a OptionRegistry = self.registry;
        match registry.get(index) {
            Some(option) => Ok(Parsed::Option {
                index,
                option,
                value,
            }),
            None => unreachable!("compiled option tables are indexed like their registry"),
        }
    }

    fn take_next_argument(&mut self) -> Option<String> {
        let value = self.args.get(self.position).cloned()?;
        self.position += 1;
        Some(value)
    }

    fn short_option(&mut self, arg_index: usize, offset: usize) -> Result<Parsed<'a>, GetoptError> {
        let arg = &self.args[arg_index];
        let Some(flag) = arg[offset..].chars().next() else {
            return Err(GetoptError::UnknownShort('\0'));
        };
        let next = offset + flag.len_utf8();
        let attached = (next < arg.len()).then(|| arg[next..].to_string());

        let Some(index) = self.shorts.iter().position(|(short, _)| *short == flag) else {
            if attached.is_some() {
                self.pending = Some((arg_index, next));
            }
            return Err(GetoptError::UnknownShort(flag));
        };
        match self.shorts[index].1 {
            Arity::None => {
                if attached.is_some() {
                    self.pending = Some((arg_index, next));
                }
                self.matched(index, None)
            }
            Arity::Optional => self.matched(index, attached),
            Arity::Required => match attached {
                Some(value) => self.matched(index, Some(value)),
                None => match self.take_next_argument() {
                    Some(value) => self.matched(index, Some(value)),
                    None => Err(GetoptError::MissingShortArgument(flag)),
                },
            },
        }
    }

    fn long_option(&mut self, body: &str) -> Result<Parsed<'a>, GetoptError> {
        let (name, inline) = match body.split_once('=') {
            Some((name, value)) => (name, Some(value.to_string())),
            None => (body, None),
        };
        let index = self.resolve_long(name)?;
        let entry = self.long_table[index];
        match entry.has_arg {
            Arity::None => match inline {
                Some(_) => Err(GetoptError::UnexpectedArgument(entry.name.to_string())),
                None => self.matched(index, None),
            },
            Arity::Optional => self.matched(index, inline),
            Arity::Required => match inline {
                Some(value) => self.matched(index, Some(value)),
                None => match self.take_next_argument() {
                    Some(value) => self.matched(index, Some(value)),
                    None => Err(GetoptError::MissingLongArgument(entry.name.to_string())),
                },
            },
        }
    }

    /// Finds the table entry for `name`: an exact match, or else the only entry it prefixes.
    fn resolve_long(&self, name: &str) -> Result<usize, GetoptError> {
        if name.is_empty() {
            return Err(GetoptError::UnknownLong(String::new()));
        }
        let mut candidates = Vec::new();
        for (index, entry) in self.long_table.iter().enumerate() {
            if entry.is_sentinel() {
                break;
            }
            if entry.name.is_empty() {
                continue;
            }
            if entry.name == name {
                return Ok(index);
            }
            if entry.name.starts_with(name) {
                candidates.push(index);
            }
        }
        match candidates.as_slice() {
            [] => Err(GetoptError::UnknownLong(name.to_string())),
            [index] => Ok(*index),
            _ => Err(GetoptError::Ambiguous {
                name: name.to_string(),
                candidates: candidates
                    .iter()
                    .map(|index| self.long_table[*index].name.to_string())
                    .collect(),
            }),
        }
    }
}

impl<'a> Iterator for Getopt<'a> {
    type Item = Result<Parsed<'a>, GetoptError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some((arg_index, offset)) = self.pending.take() {
            return Some(self.short_option(arg_index, offset));
        }
        while self.position < self.args.len() {
            let arg = self.args[self.position].clone();
            self.position += 1;
            if !self.scanning || arg == "-" || !arg.starts_with('-') {
                self.operands.push_back(arg);
                continue;
            }
            if arg == "--" {
                self.scanning = false;
                continue;
            }
            if let Some(body) = arg.strip_prefix("--") {
                return Some(self.long_option(body));
            }
            return Some(self.short_option(self.position - 1, 1));
        }
        self.operands.pop_front().map(|operand| Ok(Parsed::Operand(operand)))
    }
}

/// Splits a short-option specifier such as `"D:VHs::"` into characters and arities.
pub fn parse_short_specifier(specifier: &str) -> Vec<(char, Arity)> {
    let chars: Vec<char> = specifier.chars().collect();
    let mut shorts = Vec::new();
    let mut index = 0;
    while index < chars.len() {
        let flag = chars[index];
        index += 1;
        let colons = chars[index..]
            .iter()
            .take(2)
            .take_while(|ch| **ch == ':')
            .count();
        index += colons;
        let arity = match colons {
            0 => Arity::None,
            1 => Arity::Required,
            _ => Arity::Optional,
        };
        shorts.push((flag, arity));
    }
    shorts
}
