use std::collections::HashMap;

use tracing::debug;

use crate::document::Node;
use crate::error::OptionError;
use crate::VERSION;

use super::decode::{decode_option, DecodeOptions};
use super::spec::{Arity, OptionSpec, Origin};

const HELP_COLUMN: usize = 25;

/// Characters a short specifier gives a meaning of their own, or that end a long table.
const RESERVED_SHORTS: [char; 3] = [':', '-', '\0'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Still accepting options.
    Open,
    /// Handed to a parser; no further options may be added.
    Compiled,
}

/// One entry of a long-option table, shaped like `struct option` of `getopt_long`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LongOption<'a> {
    pub name: &'a str,
    pub has_arg: Arity,
    pub val: char,
}

impl<'a> LongOption<'a> {
    /// The all-empty entry terminating every table.
    pub const SENTINEL: LongOption<'static> = LongOption {
        name: "",
        has_arg: Arity::None,
        val: '\0',
    };

    pub fn is_sentinel(&self) -> bool {
        self.name.is_empty() && self.val == '\0'
    }
}

/// Ordered collection of option definitions: built-ins first, then script options in
/// document order.
#[derive(Debug, Clone)]
pub struct OptionRegistry {
    options: Vec<OptionSpec>,
    phase: Phase,
}

impl Default for OptionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl OptionRegistry {
    pub fn new() -> Self {
        Self {
            options: Vec::new(),
            phase: Phase::Open,
        }
    }

    /// A registry holding the options every askr invocation supports.
    pub fn with_builtins() -> Self {
        Self {
            options: builtin_options(),
            phase: Phase::Open,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn append(&mut self, option: OptionSpec) -> Result<(), OptionError> {
        if self.phase == Phase::Compiled {
            return Err(OptionError::Sealed {
                option: option.to_string(),
            });
        }
        self.options.push(option);
        Ok(())
    }

    /// Decodes every entry of an `options` section and appends it, stopping at the first
    /// failure. A null section adds nothing. Returns the number of options added.
    pub fn decode_and_append(
        &mut self,
        section: &Node,
        options: &DecodeOptions,
    ) -> Result<usize, OptionError> {
        if section.is_null() {
            return Ok(0);
        }
        let items = section
            .as_sequence()
            .ok_or_else(|| OptionError::NotASequence {
                mark: section.mark().clone(),
            })?;
        for item in items {
            let option = decode_option(item, options)?;
            debug!(option = %option, at = %item.mark(), "adding script option");
            self.append(option)?;
        }
        Ok(items.len())
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&OptionSpec> {
        self.options.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &OptionSpec> + '_ {
        self.options.iter()
    }

    pub fn find_short(&self, short: char) -> Option<&OptionSpec> {
        self.options.iter().find(|option| option.short() == short)
    }

    pub fn find_long(&self, long: &str) -> Option<&OptionSpec> {
        if long.is_empty() {
            return None;
        }
        self.options.iter().find(|option| option.long() == long)
    }

    /// Short-option specifier for a getopt style parser, e.g. `"D:VHs:"`.
    pub fn compile_short_specifier(&self) -> String {
        let mut specifier = String::with_capacity(self.options.len() * 2);
        for option in &self.options {
            specifier.push(option.short());
            specifier.push_str(option.arity().suffix());
        }
        specifier
    }

    /// Long-option table in registry order, terminated by [`LongOption::SENTINEL`].
    pub fn compile_long_table(&self) -> Vec<LongOption<'_>> {
        self.options
            .iter()
            .map(|option| LongOption {
                name: option.long(),
                has_arg: option.arity(),
                val: option.short(),
            })
            .chain(std::iter::once(LongOption::SENTINEL))
            .collect()
    }

    /// Checks that every short form is usable and that it, and every non-empty long form,
    /// resolves to one option.
    pub fn validate(&self) -> Result<(), OptionError> {
        let mut shorts: HashMap<char, &OptionSpec> = HashMap::new();
        let mut longs: HashMap<&str, &OptionSpec> = HashMap::new();
        for option in &self.options {
            if RESERVED_SHORTS.contains(&option.short()) {
                return Err(OptionError::InvalidShort {
                    short: option.short(),
                    option: option.to_string(),
                });
            }
            if let Some(first) = shorts.insert(option.short(), option) {
                return Err(OptionError::DuplicateShort {
                    short: option.short(),
                    first: first.to_string(),
                    second: option.to_string(),
                });
            }
            if option.long().is_empty() {
                continue;
            }
            if let Some(first) = longs.insert(option.long(), option) {
                return Err(OptionError::DuplicateLong {
                    long: option.long().to_string(),
                    first: first.to_string(),
                    second: option.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Validates the registry, closes it to further additions and compiles the parser
    /// inputs. The result borrows the registry for as long as a parser uses it.
    pub fn compile(&mut self) -> Result<CompiledOptions<'_>, OptionError> {
        self.validate()?;
        self.phase = Phase::Compiled;
        let registry: &OptionRegistry = self;
        let compiled = CompiledOptions {
            registry,
            short: registry.compile_short_specifier(),
            long: registry.compile_long_table(),
        };
        debug!(
            short = %compiled.short,
            options = registry.len(),
            "compiled option registry"
        );
        Ok(compiled)
    }

    /// Help text: banner, usage line, then one line per option. Script options are listed
    /// after a "Script specific options:" heading.
    pub fn render_help(&self) -> String {
        let mut lines = vec![
            format!("askr v{VERSION}"),
            "Usage: askr [switches] [--] [programfile] [arguments]".to_string(),
        ];
        let mut in_script_section = false;
        for option in &self.options {
            if option.origin() == Origin::Script && !in_script_section {
                lines.push(String::new());
                lines.push("Script specific options:".to_string());
                in_script_section = true;
            }
            lines.push(format!(
                "\t-{} | --{:<width$}{}",
                option.short(),
                option.long(),
                option.description(),
                width = HELP_COLUMN
            ));
        }
        lines.join("\n")
    }
}

fn builtin_options() -> Vec<OptionSpec> {
    vec![
        OptionSpec::builtin(
            "debug",
            'D',
            "enable and set a debug level (bit-field)",
            Arity::Required,
        ),
        OptionSpec::builtin(
            "verbose",
            'V',
            "enable verbose output and results",
            Arity::None,
        ),
        OptionSpec::builtin("help", 'H', "show the help message (this)", Arity::None),
    ]
}

/// The parser inputs compiled from a registry.
#[derive(Debug, Clone)]
pub struct CompiledOptions<'a> {
    registry: &'a OptionRegistry,
    short: String,
    long: Vec<LongOption<'a>>,
}

impl<'a> CompiledOptions<'a> {
    pub fn registry(&self) -> &'a OptionRegistry {
        self.registry
    }

    pub fn short_specifier(&self) -> &str {
        &self.short
    }

    pub fn long_table(&self) -> &[LongOption<'a>] {
        &self.long
    }

    pub fn option(&self, index: usize) -> Option<&'a OptionSpec> {
        self.registry.get(index)
    }
}
