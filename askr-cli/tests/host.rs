use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::{tempdir, TempDir};

const SELECT_SCRIPT: &str = r#"options:
  - name: select
    long: --select
    short: -s
    argument: required
    description: pick one
reader:
  type: csv
"#;

fn askr_binary() -> &'static str {
    env!("CARGO_BIN_EXE_askr")
}

fn write_script(contents: &str) -> anyhow::Result<(TempDir, PathBuf)> {
    let tmp = tempdir()?;
    let path = tmp.path().join("script.yaml");
    fs::write(&path, contents)?;
    Ok((tmp, path))
}

fn askr(script: &Path, args: &[&str]) -> Output {
    Command::new(askr_binary())
        .env_remove("ASKR_LOG")
        .arg(script)
        .args(args)
        .output()
        .expect("run askr")
}

#[test]
fn help_lists_builtin_and_script_options() -> anyhow::Result<()> {
    let (_tmp, script) = write_script(SELECT_SCRIPT)?;
    let output = askr(&script, &["-H"]);

    assert!(output.status.success(), "help should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("askr v"), "banner missing: {stdout}");
    assert!(stdout.contains("\t-H | --help"), "help line missing: {stdout}");
    assert!(
        stdout.contains("Script specific options:\n\t-s | --select"),
        "script section missing: {stdout}"
    );
    Ok(())
}

#[test]
fn emit_getopt_prints_compiled_tables() -> anyhow::Result<()> {
    let (_tmp, script) = write_script(SELECT_SCRIPT)?;
    let output = Command::new(askr_binary())
        .env_remove("ASKR_LOG")
        .args(["--emit", "getopt"])
        .arg(&script)
        .output()
        .expect("run askr --emit getopt");

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "D:VHs:\n\
         {\"debug\", 1, 'D'}\n\
         {\"verbose\", 0, 'V'}\n\
         {\"help\", 0, 'H'}\n\
         {\"select\", 1, 's'}\n\
         {\"\", 0, 0}\n"
    );
    Ok(())
}

#[test]
fn emit_registry_prints_json() -> anyhow::Result<()> {
    let (_tmp, script) = write_script(SELECT_SCRIPT)?;
    let output = Command::new(askr_binary())
        .env_remove("ASKR_LOG")
        .arg("--emit=registry")
        .arg(&script)
        .output()
        .expect("run askr --emit registry");

    assert!(output.status.success());
    let registry: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    let options = registry.as_array().expect("registry is an array");
    assert_eq!(options.len(), 4);
    assert_eq!(options[0]["long"], "debug");
    assert_eq!(options[0]["origin"], "builtin");
    assert_eq!(options[3]["name"], "select");
    assert_eq!(options[3]["arity"], "required");
    assert_eq!(options[3]["origin"], "script");
    Ok(())
}

#[test]
fn script_options_are_collected_verbosely() -> anyhow::Result<()> {
    let (_tmp, script) = write_script(SELECT_SCRIPT)?;
    let output = askr(&script, &["input.csv", "-s", "a, b", "-V"]);

    assert!(output.status.success(), "parse should succeed");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains(r#"["a", "b"]"#), "values missing: {stderr}");
    assert!(stderr.contains("input.csv"), "operands missing: {stderr}");
    Ok(())
}

#[test]
fn quiet_without_verbose() -> anyhow::Result<()> {
    let (_tmp, script) = write_script(SELECT_SCRIPT)?;
    let output = askr(&script, &["--select=a"]);

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    assert!(output.stderr.is_empty());
    Ok(())
}

#[test]
fn unknown_option_is_a_usage_error() -> anyhow::Result<()> {
    let (_tmp, script) = write_script(SELECT_SCRIPT)?;
    let output = askr(&script, &["-x"]);

    assert_eq!(output.status.code(), Some(64));
    assert_eq!(
        String::from_utf8_lossy(&output.stderr).trim_end(),
        "askr: invalid option -- 'x'"
    );

    let output = askr(&script, &["--select"]);
    assert_eq!(output.status.code(), Some(64));
    assert_eq!(
        String::from_utf8_lossy(&output.stderr).trim_end(),
        "askr: option '--select' requires an argument"
    );
    Ok(())
}

#[test]
fn bad_debug_level_is_a_usage_error() -> anyhow::Result<()> {
    let (_tmp, script) = write_script(SELECT_SCRIPT)?;
    let output = askr(&script, &["-D", "zz"]);

    assert_eq!(output.status.code(), Some(64));
    assert_eq!(
        String::from_utf8_lossy(&output.stderr).trim_end(),
        "askr: invalid debug level 'zz'"
    );

    let output = askr(&script, &["-D", "0x3"]);
    assert!(output.status.success(), "hex mask should be accepted");
    Ok(())
}

#[test]
fn configuration_errors_name_the_file() -> anyhow::Result<()> {
    let (_tmp, script) = write_script("options:\n  - {description: d, short: -x}\n")?;
    let output = askr(&script, &[]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(
        stderr.trim_end(),
        format!(
            "error in {}: options[0]: 'name' key is required",
            script.display()
        )
    );
    Ok(())
}

#[test]
fn non_map_document_is_rejected() -> anyhow::Result<()> {
    let (_tmp, script) = write_script("- just\n- a list\n")?;
    let output = askr(&script, &[]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("expected a map with options / reader / filter / output sections"),
        "unexpected stderr: {stderr}"
    );
    Ok(())
}

#[test]
fn duplicate_short_options_fail_before_parsing() -> anyhow::Result<()> {
    let (_tmp, script) =
        write_script("options:\n  - {name: verbosity, description: d, short: -V}\n")?;
    let output = askr(&script, &["-V"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("short option '-V'"), "unexpected stderr: {stderr}");
    Ok(())
}

#[test]
fn strict_arguments_rejects_unknown_argument_values() -> anyhow::Result<()> {
    let (_tmp, script) = write_script(
        "options:\n  - {name: mode, description: d, short: -m, argument: maybe}\n",
    )?;

    let lenient = askr(&script, &["-m"]);
    assert!(lenient.status.success(), "lenient decoding assumes 'none'");
    let stderr = String::from_utf8_lossy(&lenient.stderr);
    assert!(stderr.contains("maybe"), "expected a warning: {stderr}");

    let strict = Command::new(askr_binary())
        .env_remove("ASKR_LOG")
        .arg("--strict-arguments")
        .arg(&script)
        .output()
        .expect("run askr --strict-arguments");
    assert_eq!(strict.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&strict.stderr);
    assert!(
        stderr.contains("unsupported 'argument' value 'maybe'"),
        "unexpected stderr: {stderr}"
    );
    Ok(())
}

#[test]
fn missing_program_file_is_a_clap_error() {
    let output = Command::new(askr_binary())
        .env_remove("ASKR_LOG")
        .output()
        .expect("run askr without arguments");
    assert_eq!(output.status.code(), Some(2));
}
