mod decode;
mod registry;
mod spec;
mod values;

pub use decode::{decode_option, validate_keys, ArgumentPolicy, DecodeOptions, OPTION_KEYS};
pub use registry::{CompiledOptions, LongOption, OptionRegistry, Phase};
pub use spec::{Arity, OptionSpec, Origin};
pub use values::{OptionValues, ValueError};
