use anyhow::{ensure, Result};

use askr_core::{
    Arity, ConfigDocument, DecodeOptions, Getopt, LongOption, OptionError, OptionRegistry,
    OptionValues, Parsed,
};

const SELECT_SCRIPT: &str = r#"
options:
  - name: select
    long: --select
    short: -s
    argument: required
    description: "pick one"
"#;

#[test]
fn select_option_extends_builtin_specifier() -> Result<()> {
    let document = ConfigDocument::parse(SELECT_SCRIPT)?;
    let mut registry = document.build_registry(&DecodeOptions::default())?;
    let compiled = registry.compile()?;

    ensure!(
        compiled.short_specifier() == "D:VHs:",
        "unexpected specifier {}",
        compiled.short_specifier()
    );
    let table = compiled.long_table();
    ensure!(table.len() == 5, "expected 4 entries and a sentinel");
    ensure!(table[4] == LongOption::SENTINEL);
    ensure!(
        table[3]
            == LongOption {
                name: "select",
                has_arg: Arity::Required,
                val: 's',
            }
    );
    Ok(())
}

#[test]
fn long_without_dashes_is_rejected() -> Result<()> {
    let document = ConfigDocument::parse(
        "options:\n  - {name: x, description: d, short: \"-x\", long: \"select\"}\n",
    )?;
    let err = document
        .build_registry(&DecodeOptions::default())
        .expect_err("long value lacks '--'");
    ensure!(
        matches!(err, OptionError::MalformedLong { .. }),
        "unexpected error {err:?}"
    );
    ensure!(
        err.to_string() == "options[0].long: 'long' value must start with '--'",
        "unexpected message {err}"
    );
    Ok(())
}

#[test]
fn parsed_values_accumulate_per_option() -> Result<()> {
    let document = ConfigDocument::parse(SELECT_SCRIPT)?;
    let mut registry = document.build_registry(&DecodeOptions::default())?;
    let compiled = registry.compile()?;

    let mut values = OptionValues::new();
    let mut operands = Vec::new();
    for item in Getopt::new(&compiled, ["-s", "a,b", "input.csv", "--select=c", "-V"]) {
        match item? {
            Parsed::Option {
                option,
                value: Some(value),
                ..
            } => values.add(&option.key(), &value)?,
            Parsed::Option { option, .. } => values.touch(&option.key())?,
            Parsed::Operand(operand) => operands.push(operand),
        }
    }

    ensure!(values.get("select") == ["a", "b", "c"]);
    ensure!(values.contains("verbose") && values.get("verbose").is_empty());
    ensure!(values.get("missing").is_empty());
    ensure!(operands == ["input.csv"]);
    Ok(())
}

#[test]
fn conflicting_script_option_is_reported_at_compile_time() -> Result<()> {
    let document = ConfigDocument::parse(
        "options:\n  - {name: helper, description: d, short: -H, long: --helper}\n",
    )?;
    let mut registry = document.build_registry(&DecodeOptions::default())?;
    let err = registry.compile().expect_err("-H is taken by help");
    ensure!(matches!(err, OptionError::DuplicateShort { short: 'H', .. }));
    Ok(())
}

#[test]
fn help_lists_script_options_after_builtins() -> Result<()> {
    let document = ConfigDocument::parse(SELECT_SCRIPT)?;
    let registry: OptionRegistry = document.build_registry(&DecodeOptions::default())?;
    let help = registry.render_help();
    let heading = help
        .find("Script specific options:")
        .expect("script heading");
    let help_line = help.find("--help").expect("help line");
    let select_line = help.find("--select").expect("select line");
    ensure!(help_line < heading && heading < select_line);
    Ok(())
}
