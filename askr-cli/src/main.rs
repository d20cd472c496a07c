use std::env;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

use askr_core::{
    CompiledOptions, ConfigDocument, ConfigError, DecodeOptions, Getopt, LongOption,
    OptionRegistry, OptionValues, Origin, Parsed,
};
use askr_support::{config_error, usage_error, DebugLevels, Level};

const PROGRAM: &str = "askr";
const LOG_ENV: &str = "ASKR_LOG";
const EX_USAGE: u8 = 64;

const HOST_AFTER_HELP: &str = "\
Everything after PROGRAMFILE is parsed against the options the script declares,
together with the built-in -D/--debug, -V/--verbose and -H/--help switches.

Set ASKR_LOG to a tracing filter (e.g. `askr_core=trace`) to override the log level.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Emit {
    /// The decoded option registry as JSON.
    Registry,
    /// The short option specifier and the long option table.
    Getopt,
}

#[derive(Parser)]
#[command(
    name = "askr",
    version,
    about = "Run an askr script with the command line options it declares.",
    after_help = HOST_AFTER_HELP
)]
struct HostCli {
    /// Print compiled option tables instead of parsing script arguments.
    #[arg(long, value_enum)]
    emit: Option<Emit>,

    /// Reject unknown `argument` values in option definitions instead of assuming `none`.
    #[arg(long)]
    strict_arguments: bool,

    /// Path to the script's YAML configuration.
    #[arg(value_name = "PROGRAMFILE")]
    program: PathBuf,

    /// Arguments parsed against the script's options.
    #[arg(
        value_name = "ARG",
        trailing_var_arg = true,
        allow_hyphen_values = true,
        num_args = 0..
    )]
    args: Vec<String>,
}

fn main() -> ExitCode {
    let cli = HostCli::parse_from(split_script_args(env::args_os().collect()));
    let logging = Logging::init();

    match run(&cli, &logging) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{}", usage_error(PROGRAM, format!("{err:#}")));
            ExitCode::FAILURE
        }
    }
}

/// Ends host switch parsing at PROGRAMFILE: everything after it belongs to the script, even
/// arguments that look like host switches.
fn split_script_args(raw: Vec<OsString>) -> Vec<OsString> {
    let mut args = Vec::with_capacity(raw.len() + 1);
    let mut rest = raw.into_iter();
    args.extend(rest.next());
    while let Some(arg) = rest.next() {
        let text = arg.to_string_lossy();
        if text == "--" {
            args.push(arg);
            break;
        }
        if text == "--emit" {
            args.push(arg);
            args.extend(rest.next());
            continue;
        }
        let is_switch = text.starts_with('-') && text != "-";
        args.push(arg);
        if !is_switch {
            args.push(OsString::from("--"));
            break;
        }
    }
    args.extend(rest);
    args
}

type LogHandle = reload::Handle<EnvFilter, Registry>;

struct Logging {
    handle: LogHandle,
    /// Set when `ASKR_LOG` chose the filter; `-D`/`-V` then leave it alone.
    pinned: bool,
}

impl Logging {
    fn init() -> Self {
        let from_env = EnvFilter::try_from_env(LOG_ENV).ok();
        let pinned = from_env.is_some();
        let (filter, handle) =
            reload::Layer::new(from_env.unwrap_or_else(|| EnvFilter::new("warn")));
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .init();
        Self { handle, pinned }
    }

    fn follow(&self, levels: &DebugLevels, verbose: bool) -> Result<()> {
        if self.pinned {
            return Ok(());
        }
        self.handle
            .reload(EnvFilter::new(levels.log_filter(verbose)))
            .context("failed to update the log filter")
    }
}

fn run(cli: &HostCli, logging: &Logging) -> Result<ExitCode> {
    let path = cli.program.display().to_string();
    let options = if cli.strict_arguments {
        DecodeOptions::strict()
    } else {
        DecodeOptions::default()
    };

    let mut registry = match load_registry(cli, &options) {
        Ok(registry) => registry,
        Err(err) => {
            eprintln!("{}", config_error(&path, err));
            return Ok(ExitCode::FAILURE);
        }
    };
    let compiled = match registry.compile() {
        Ok(compiled) => compiled,
        Err(err) => {
            eprintln!("{}", config_error(&path, err));
            return Ok(ExitCode::FAILURE);
        }
    };

    if let Some(emit) = cli.emit {
        emit_tables(emit, &compiled)?;
        return Ok(ExitCode::SUCCESS);
    }

    let mut session = Session::default();
    for item in Getopt::new(&compiled, cli.args.iter().cloned()) {
        let parsed = match item {
            Ok(parsed) => parsed,
            Err(err) => {
                eprintln!("{}", usage_error(PROGRAM, err));
                return Ok(ExitCode::from(EX_USAGE));
            }
        };
        if let Err(message) = session.apply(&compiled, parsed)? {
            eprintln!("{}", usage_error(PROGRAM, message));
            return Ok(ExitCode::from(EX_USAGE));
        }
    }

    logging.follow(&session.debug, session.verbose)?;
    session.report(&compiled);
    Ok(ExitCode::SUCCESS)
}

fn load_registry(cli: &HostCli, options: &DecodeOptions) -> Result<OptionRegistry, ConfigError> {
    let document = ConfigDocument::load(&cli.program)?;
    Ok(document.build_registry(options)?)
}

/// Everything the command line switched on.
#[derive(Debug, Default)]
struct Session {
    debug: DebugLevels,
    verbose: bool,
    values: OptionValues,
    operands: Vec<String>,
}

impl Session {
    /// Records one parsed item. The inner error is a usage problem with the argument itself.
    fn apply(
        &mut self,
        compiled: &CompiledOptions<'_>,
        parsed: Parsed<'_>,
    ) -> Result<Result<(), String>> {
        let (option, value) = match parsed {
            Parsed::Option { option, value, .. } => (option, value),
            Parsed::Operand(operand) => {
                self.operands.push(operand);
                return Ok(Ok(()));
            }
        };

        match (option.origin(), option.short()) {
            (Origin::Builtin, 'D') => {
                let text = value.unwrap_or_default();
                if let Err(err) = self.debug.apply(&text) {
                    return Ok(Err(err.to_string()));
                }
            }
            (Origin::Builtin, 'V') => self.verbose = true,
            (Origin::Builtin, 'H') => println!("{}", compiled.registry().render_help()),
            _ => {
                let key = option.key();
                let recorded = match value {
                    Some(value) => self.values.add(&key, &value),
                    None => self.values.touch(&key),
                };
                recorded.with_context(|| format!("failed to record {option}"))?;
            }
        }
        Ok(Ok(()))
    }

    fn report(&self, compiled: &CompiledOptions<'_>) {
        if self.debug.enabled(Level::Basic) {
            debug!(
                specifier = compiled.short_specifier(),
                levels = ?self.debug.names(),
                "compiled short options"
            );
        }
        if !self.verbose {
            return;
        }
        for key in self.values.keys() {
            info!(option = key, values = ?self.values.get(key), "script option");
        }
        if !self.operands.is_empty() {
            info!(operands = ?self.operands, "script operands");
        }
    }
}

fn emit_tables(emit: Emit, compiled: &CompiledOptions<'_>) -> Result<()> {
    match emit {
        Emit::Registry => {
            let options: Vec<_> = compiled.registry().iter().collect();
            let json = serde_json::to_string_pretty(&options)
                .context("failed to serialize the option registry")?;
            println!("{json}");
        }
        Emit::Getopt => {
            println!("{}", compiled.short_specifier());
            for entry in compiled.long_table() {
                println!("{}", long_entry(entry));
            }
        }
    }
    Ok(())
}

/// One long table entry in C initializer form, e.g. `{"select", 1, 's'}`.
fn long_entry(entry: &LongOption<'_>) -> String {
    let val = if entry.is_sentinel() {
        "0".to_string()
    } else {
        format!("'{}'", entry.val)
    };
    format!(
        "{{\"{}\", {}, {}}}",
        entry.name,
        entry.has_arg.has_arg(),
        val
    )
}
