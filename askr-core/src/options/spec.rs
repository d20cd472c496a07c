use std::borrow::Cow;
use std::fmt;

use serde::Serialize;
use tracing::trace;

/// Whether an option consumes a value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Arity {
    #[default]
    None,
    Required,
    Optional,
}

impl Arity {
    /// Maps the keywords accepted for the `argument` key.
    pub fn from_keyword(text: &str) -> Option<Arity> {
        match text {
            "no" | "none" => Some(Arity::None),
            "required" => Some(Arity::Required),
            "optional" => Some(Arity::Optional),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Arity::None => "none",
            Arity::Required => "required",
            Arity::Optional => "optional",
        }
    }

    /// The `has_arg` code used by `getopt_long`: no, required, optional.
    pub fn has_arg(self) -> i32 {
        match self {
            Arity::None => 0,
            Arity::Required => 1,
            Arity::Optional => 2,
        }
    }

    /// Suffix following the option character in a short-option specifier.
    pub fn suffix(self) -> &'static str {
        match self {
            Arity::None => "",
            Arity::Required => ":",
            Arity::Optional => "::",
        }
    }
}

/// Where an option definition came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Builtin,
    Script,
}

/// One command line switch definition.
///
/// Every constructor sets all fields at once; there is no partially initialised state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionSpec {
    name: String,
    long: String,
    short: char,
    description: String,
    arity: Arity,
    origin: Origin,
}

impl OptionSpec {
    /// A compiled-in option. Built-ins carry no name.
    pub fn builtin(
        long: impl Into<String>,
        short: char,
        description: impl Into<String>,
        arity: Arity,
    ) -> Self {
        let option = Self {
            name: String::new(),
            long: long.into(),
            short,
            description: description.into(),
            arity,
            origin: Origin::Builtin,
        };
        trace!(long = %option.long, short = %option.short, "built-in option");
        option
    }

    /// An option declared by a script's configuration document.
    pub fn named(
        name: impl Into<String>,
        long: impl Into<String>,
        short: char,
        description: impl Into<String>,
        arity: Arity,
    ) -> Self {
        let option = Self {
            name: name.into(),
            long: long.into(),
            short,
            description: description.into(),
            arity,
            origin: Origin::Script,
        };
        trace!(name = %option.name, short = %option.short, "script option");
        option
    }

    /// Re-initialises every field, turning this into a script option.
    pub fn init(
        &mut self,
        name: impl Into<String>,
        long: impl Into<String>,
        short: char,
        description: impl Into<String>,
        arity: Arity,
    ) {
        *self = Self::named(name, long, short, description, arity);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn long(&self) -> &str {
        &self.long
    }

    pub fn short(&self) -> char {
        self.short
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// Key under which parsed values for this option are stored.
    pub fn key(&self) -> Cow<'_, str> {
        if !self.name.is_empty() {
            Cow::Borrowed(&self.name)
        } else if !self.long.is_empty() {
            Cow::Borrowed(&self.long)
        } else {
            Cow::Owned(self.short.to_string())
        }
    }
}

impl fmt::Display for OptionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'-{}", self.short)?;
        if !self.long.is_empty() {
            write!(f, " | --{}", self.long)?;
        }
        write!(f, "'")?;
        if !self.name.is_empty() {
            write!(f, " ({})", self.name)?;
        }
        Ok(())
    }
}
