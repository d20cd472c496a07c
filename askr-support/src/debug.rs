//! Debug level bit-field.
//!
//! The set is a plain value: the host builds one from `-D` switches and passes it to
//! whatever needs to know which diagnostics are enabled.

use std::fmt;

const WIDTH: u32 = 16;

/// The individual debug bits. One or several of these can be enabled at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    None = 0,
    Basic = 1,
    Advanced = 2,
    Memory = 3,
    Cpp = 4,
    PluginSetup = 5,
    PluginDetails = 6,
}

impl Level {
    pub const ALL: [Level; 7] = [
        Level::None,
        Level::Basic,
        Level::Advanced,
        Level::Memory,
        Level::Cpp,
        Level::PluginSetup,
        Level::PluginDetails,
    ];

    pub fn bit(self) -> u32 {
        self as u32
    }

    pub fn name(self) -> &'static str {
        match self {
            Level::None => "none",
            Level::Basic => "basic",
            Level::Advanced => "advanced",
            Level::Memory => "memory",
            Level::Cpp => "cpp",
            Level::PluginSetup => "plugin-setup",
            Level::PluginDetails => "plugin-details",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseLevelError {
    Empty,
    InvalidHex(String),
    InvalidIndex(String),
    OutOfRange(u64),
}

impl fmt::Display for ParseLevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseLevelError::Empty => write!(f, "debug level must not be empty"),
            ParseLevelError::InvalidHex(text) => {
                write!(f, "invalid hexadecimal debug mask '{text}'")
            }
            ParseLevelError::InvalidIndex(text) => write!(f, "invalid debug level '{text}'"),
            ParseLevelError::OutOfRange(value) => write!(
                f,
                "debug level {value} is out of range (expected 0-{})",
                WIDTH - 1
            ),
        }
    }
}

impl std::error::Error for ParseLevelError {}

/// A 16-bit set of enabled debug levels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DebugLevels {
    bits: u16,
}

impl DebugLevels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bits(bits: u16) -> Self {
        Self { bits }
    }

    pub fn bits(&self) -> u16 {
        self.bits
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    pub fn enable(&mut self, level: Level) {
        self.bits |= 1 << level.bit();
    }

    pub fn enabled(&self, level: Level) -> bool {
        self.bits & (1 << level.bit()) != 0
    }

    /// Applies one `-D` argument.
    ///
    /// A `0x` prefix followed by at least one digit is a hexadecimal mask that is OR-ed into
    /// the set; anything else is a decimal bit index.
    pub fn apply(&mut self, text: &str) -> Result<(), ParseLevelError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ParseLevelError::Empty);
        }
        if text.len() > 2 && text.starts_with("0x") {
            let mask = u64::from_str_radix(&text[2..], 16)
                .map_err(|_| ParseLevelError::InvalidHex(text.to_string()))?;
            if mask > u64::from(u16::MAX) {
                return Err(ParseLevelError::OutOfRange(mask));
            }
            self.bits |= mask as u16;
            return Ok(());
        }
        let index: u64 = text
            .parse()
            .map_err(|_| ParseLevelError::InvalidIndex(text.to_string()))?;
        if index >= u64::from(WIDTH) {
            return Err(ParseLevelError::OutOfRange(index));
        }
        self.bits |= 1 << index;
        Ok(())
    }

    /// Names of the enabled levels that have a meaning, in bit order.
    pub fn names(&self) -> Vec<&'static str> {
        Level::ALL
            .iter()
            .filter(|level| self.enabled(**level))
            .map(|level| level.name())
            .collect()
    }

    /// The log filter directive matching this set.
    pub fn log_filter(&self, verbose: bool) -> &'static str {
        if self.enabled(Level::Advanced)
            || self.enabled(Level::Cpp)
            || self.enabled(Level::PluginDetails)
        {
            "trace"
        } else if self.enabled(Level::Basic) || self.enabled(Level::PluginSetup) {
            "debug"
        } else if verbose {
            "info"
        } else {
            "warn"
        }
    }
}
