//! Registry assembly, validation, compilation and help rendering.

use askr_core::{
    Arity, DecodeOptions, Mark, Node, OptionError, OptionRegistry, OptionSpec, Phase, VERSION,
};

fn select() -> OptionSpec {
    OptionSpec::named("select", "select", 's', "pick one", Arity::Required)
}

#[test]
fn builtins_compile_in_order() {
    let registry = OptionRegistry::with_builtins();
    assert_eq!(registry.compile_short_specifier(), "D:VH");
    let names: Vec<_> = registry
        .compile_long_table()
        .iter()
        .map(|entry| entry.name)
        .collect();
    assert_eq!(names, ["debug", "verbose", "help", ""]);
}

#[test]
fn optional_arguments_use_double_colon() {
    let mut registry = OptionRegistry::new();
    registry
        .append(OptionSpec::named("level", "", 'l', "", Arity::Optional))
        .expect("append");
    registry
        .append(OptionSpec::named("quiet", "quiet", 'q', "", Arity::None))
        .expect("append");
    assert_eq!(registry.compile_short_specifier(), "l::q");
    let table = registry.compile_long_table();
    assert_eq!(table.len(), 3);
    assert!(!table[0].is_sentinel());
    assert!(table[2].is_sentinel());
}

#[test]
fn compile_seals_the_registry() {
    let mut registry = OptionRegistry::with_builtins();
    registry.append(select()).expect("append while open");
    {
        let compiled = registry.compile().expect("compile");
        assert_eq!(compiled.short_specifier(), "D:VHs:");
        assert_eq!(compiled.long_table().len(), 5);
        assert_eq!(compiled.option(3).map(OptionSpec::name), Some("select"));
    }
    assert_eq!(registry.phase(), Phase::Compiled);
    let err = registry
        .append(OptionSpec::named("late", "late", 'l', "", Arity::None))
        .expect_err("sealed");
    assert!(matches!(err, OptionError::Sealed { .. }));
    assert_eq!(registry.len(), 4);
}

#[test]
fn duplicate_flags_fail_compilation() {
    let mut registry = OptionRegistry::with_builtins();
    registry
        .append(OptionSpec::named("dump", "dump", 'D', "", Arity::None))
        .expect("append");
    let err = registry.compile().expect_err("duplicate -D");
    assert_eq!(
        err.to_string(),
        "short option '-D' is defined by both '-D | --debug' and '-D | --dump' (dump)"
    );
    assert_eq!(registry.phase(), Phase::Open);

    let mut registry = OptionRegistry::with_builtins();
    registry
        .append(OptionSpec::named("v", "verbose", 'w', "", Arity::None))
        .expect("append");
    assert!(matches!(
        registry.validate(),
        Err(OptionError::DuplicateLong { .. })
    ));
}

#[test]
fn reserved_characters_cannot_be_short_options() {
    for short in [':', '-', '\0'] {
        let mut registry = OptionRegistry::with_builtins();
        registry
            .append(OptionSpec::named("odd", "odd", short, "", Arity::None))
            .expect("append");
        let err = registry.compile().expect_err("reserved short");
        assert!(matches!(err, OptionError::InvalidShort { short: found, .. } if found == short));
        assert_eq!(err.mark(), None);
        assert_eq!(registry.phase(), Phase::Open);
    }

    let mut registry = OptionRegistry::new();
    registry
        .append(OptionSpec::named("colon", "colon", ':', "", Arity::Required))
        .expect("append");
    assert_eq!(
        registry.validate().map_err(|err| err.to_string()),
        Err("'-: | --colon' (colon) uses ':', which cannot name a short option".to_string())
    );
}

#[test]
fn empty_long_forms_never_collide() {
    let mut registry = OptionRegistry::new();
    registry
        .append(OptionSpec::named("a", "", 'a', "", Arity::None))
        .expect("append");
    registry
        .append(OptionSpec::named("b", "", 'b', "", Arity::None))
        .expect("append");
    assert!(registry.validate().is_ok());
    assert!(registry.find_long("").is_none());
    assert_eq!(registry.find_short('b').map(OptionSpec::name), Some("b"));
}

#[test]
fn decode_and_append_stops_at_first_failure() {
    let section = Node::parse_yaml(
        "- {name: a, description: first, short: -a}\n\
         - {name: b, description: second, short: b}\n\
         - {name: c, description: third, short: -c}\n",
    )
    .expect("valid yaml")
    .with_mark(Mark::root().key("options"));
    let mut registry = OptionRegistry::with_builtins();
    let err = registry
        .decode_and_append(&section, &DecodeOptions::default())
        .expect_err("second entry is malformed");
    assert_eq!(err.mark().map(Mark::path), Some("options[1].short"));
    assert_eq!(registry.len(), 4);
}

#[test]
fn decode_and_append_requires_a_sequence() {
    let mut registry = OptionRegistry::new();
    assert_eq!(
        registry
            .decode_and_append(&Node::null(), &DecodeOptions::default())
            .expect("null section"),
        0
    );
    let err = registry
        .decode_and_append(&Node::scalar("nope"), &DecodeOptions::default())
        .expect_err("scalar section");
    assert!(matches!(err, OptionError::NotASequence { .. }));
}

#[test]
fn help_separates_script_options() {
    let mut registry = OptionRegistry::with_builtins();
    registry.append(select()).expect("append");
    let help = registry.render_help();
    let lines: Vec<_> = help.lines().collect();
    assert_eq!(lines[0], format!("askr v{VERSION}"));
    assert_eq!(
        lines[1],
        "Usage: askr [switches] [--] [programfile] [arguments]"
    );
    assert_eq!(
        lines[4],
        "\t-H | --help                     show the help message (this)"
    );
    assert_eq!(lines[5], "");
    assert_eq!(lines[6], "Script specific options:");
    assert_eq!(
        lines[7],
        "\t-s | --select                   pick one"
    );
    assert_eq!(lines.len(), 8);
}

#[test]
fn help_without_script_options_has_no_heading() {
    let help = OptionRegistry::with_builtins().render_help();
    assert!(!help.contains("Script specific options:"));
    assert_eq!(help.lines().count(), 5);
}
