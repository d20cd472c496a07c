use std::borrow::Cow;
use std::fmt;

mod debug;
mod keyvals;

pub use debug::{DebugLevels, Level, ParseLevelError};
pub use keyvals::{KeyValueStore, SpanError};

fn escape_single_quotes(input: &str) -> Cow<'_, str> {
    if input.contains('\'') {
        Cow::Owned(input.replace('\'', "\\'"))
    } else {
        Cow::Borrowed(input)
    }
}

/// Wraps `text` in single quotes the way every askr diagnostic names a key or value.
pub fn quoted(text: &str) -> String {
    format!("'{}'", escape_single_quotes(text))
}

/// One-line diagnostic for a problem found in a configuration document.
pub fn config_error(path: &str, error: impl fmt::Display) -> String {
    format!("error in {path}: {error}")
}

/// One-line diagnostic for a bad command line.
pub fn usage_error(program: &str, error: impl fmt::Display) -> String {
    format!("{program}: {error}")
}
