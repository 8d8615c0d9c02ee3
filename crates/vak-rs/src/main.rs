//! Command-line entry point for checking vak config files.

use anyhow::Context;
use clap::{Parser, Subcommand};
use log::{debug, info};
use std::path::{Path, PathBuf};
use vak_rs::config::{Command, VakConfig};

/// Command-line options for the vak binary.
#[derive(Parser, Debug)]
#[command(name = "vak", version, about = "Validate vak experiment configs")]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Validate a config file and report the sections it defines
    Check {
        /// Path to a .toml, .json5 or .json config file
        config: PathBuf,
        /// Require the section for this command (train, learncurve, eval, predict)
        #[arg(long)]
        command: Option<Command>,
        /// Also check that directories named in the config exist
        #[arg(long)]
        check_paths: bool,
        /// Print the validated config as JSON
        #[arg(long)]
        print: bool,
    },
}

/// Entry point for the vak CLI.
fn main() -> anyhow::Result<()> {
    vak_rs::init_logging();

    let cli = Cli::parse();
    debug!("parsed cli: {:?}", cli);
    match cli.command {
        CliCommand::Check {
            config,
            command,
            check_paths,
            print,
        } => {
            let report = check(&config, command, check_paths, print)?;
            println!("{report}");
        }
    }
    Ok(())
}

/// Validate one config file and render what should be printed on success.
fn check(
    path: &Path,
    command: Option<Command>,
    check_paths: bool,
    print: bool,
) -> anyhow::Result<String> {
    info!(
        "checking config (path={}, command={:?}, check_paths={})",
        path.display(),
        command,
        check_paths
    );
    let config = VakConfig::load_from_path(path)
        .with_context(|| format!("invalid config: {}", path.display()))?;
    if let Some(command) = command {
        config
            .require(command)
            .with_context(|| format!("cannot run {command} with {}", path.display()))?;
    }
    if check_paths {
        config.check_paths()?;
    }

    if print {
        return Ok(serde_json::to_string_pretty(&config)?);
    }
    Ok(format!(
        "{}: ok [{}]",
        path.display(),
        config.section_names().join(", ")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    const TRAIN_TOML: &str = r#"
[PREP]
audio_format = "wav"

[DATALOADER]
window_size = 88

[TRAIN]
models = "TweetyNet"
batch_size = 4
num_epochs = 1
root_results_dir = "./results"
"#;

    fn write_config(temp: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = temp.path().join(name);
        fs::write(&path, contents).expect("write");
        path
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_check_with_command() {
        let cli = Cli::try_parse_from(["vak", "check", "config.toml", "--command", "learncurve"])
            .expect("parse");
        let CliCommand::Check {
            config, command, ..
        } = cli.command;
        assert_eq!(config, PathBuf::from("config.toml"));
        assert_eq!(command, Some(Command::Learncurve));
    }

    #[test]
    fn rejects_unknown_command_name() {
        assert!(Cli::try_parse_from(["vak", "check", "c.toml", "--command", "fit"]).is_err());
    }

    #[test]
    fn check_reports_sections() {
        let temp = TempDir::new().expect("tmp");
        let path = write_config(&temp, "train.toml", TRAIN_TOML);

        let report = check(&path, Some(Command::Train), false, false).expect("report");
        assert!(report.ends_with("ok [PREP, DATALOADER, TRAIN]"));
    }

    #[test]
    fn check_fails_for_wrong_command() {
        let temp = TempDir::new().expect("tmp");
        let path = write_config(&temp, "train.toml", TRAIN_TOML);

        let err = check(&path, Some(Command::Eval), false, false).unwrap_err();
        assert!(format!("{err:#}").contains("[EVAL]"));
    }

    #[test]
    fn check_fails_for_conflicting_sections() {
        let temp = TempDir::new().expect("tmp");
        let contents = format!("{TRAIN_TOML}\n[EVAL]\nmodels = \"TweetyNet\"\n");
        let path = write_config(&temp, "both.toml", &contents);

        let err = check(&path, None, false, false).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("TRAIN") && msg.contains("EVAL"));
    }

    #[test]
    fn check_prints_json() {
        let temp = TempDir::new().expect("tmp");
        let path = write_config(&temp, "train.toml", TRAIN_TOML);

        let report = check(&path, None, false, true).expect("report");
        let value: serde_json::Value = serde_json::from_str(&report).expect("json");
        assert_eq!(value["TRAIN"]["batch_size"], serde_json::json!(4));
    }
}
