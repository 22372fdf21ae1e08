//! Command line interface definition using clap.
//!
//! This module defines the [`Cli`] structure, its subcommands and the
//! layered configuration merge that runs after parsing.

use camino::Utf8PathBuf;
use clap::parser::ValueSource;
use clap::{ArgMatches, Args, CommandFactory, FromArgMatches, Parser, Subcommand};
use ortho_config::declarative::LayerComposition;
use ortho_config::figment::{Figment, providers::Env};
use ortho_config::uncased::Uncased;
use ortho_config::{
    ConfigDiscovery, MergeComposer, OrthoConfig, OrthoMergeExt, OrthoResult, sanitize_value,
};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::sync::Arc;

mod parsing;

use parsing::parse_percentage;

const CONFIG_ENV_VAR: &str = "STEPCHECK_CONFIG_PATH";
const ENV_PREFIX: &str = "STEPCHECK_";

/// Base directory searched for step implementations when none is given.
pub const DEFAULT_BASEDIR: &str = "tests";

/// Verify that sentences resolve to the expected step implementations.
#[derive(Debug, Clone, Default, PartialEq, Parser, Serialize, Deserialize, OrthoConfig)]
#[command(author, version, about, long_about = None, subcommand_required = true)]
#[ortho_config(prefix = "STEPCHECK")]
pub struct Cli {
    /// Enable verbose diagnostic logging.
    #[arg(short, long)]
    #[ortho_config(default = false)]
    pub verbose: bool,

    /// Print plain `PASS`/`FAIL` markers instead of emoji.
    #[arg(long)]
    pub no_emoji: Option<bool>,

    /// Directory to scan for step implementations.
    ///
    /// May be repeated; defaults to `tests` when omitted everywhere.
    #[arg(short = 'b', long = "basedir", value_name = "DIR")]
    #[ortho_config(merge_strategy = "append")]
    pub basedir: Vec<Utf8PathBuf>,

    /// Minimum step coverage, in percent, the run must reach.
    #[arg(long, value_name = "N", value_parser = parse_percentage)]
    pub cover_min_percentage: Option<f64>,

    /// List every step implementation no sentence targets.
    #[arg(long)]
    #[ortho_config(default = false)]
    pub cover_show_missing: bool,

    /// Subcommand to execute.
    ///
    /// `OrthoConfig` merging ignores this field; CLI parsing supplies it.
    #[serde(skip)]
    #[command(subcommand)]
    #[ortho_config(skip_cli)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Step source directories, falling back to [`DEFAULT_BASEDIR`].
    #[must_use]
    pub fn basedirs(&self) -> Vec<Utf8PathBuf> {
        if self.basedir.is_empty() {
            vec![Utf8PathBuf::from(DEFAULT_BASEDIR)]
        } else {
            self.basedir.clone()
        }
    }
}

/// Arguments accepted by the `matches` command.
#[derive(Debug, Args, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct MatchesArgs {
    /// Sentence catalogs to verify, in order.
    #[arg(required = true, value_name = "CATALOG")]
    pub catalogs: Vec<Utf8PathBuf>,
}

/// Available top-level commands.
#[derive(Debug, Subcommand, PartialEq, Eq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Commands {
    /// Check that catalog sentences match the expected steps and arguments.
    Matches(MatchesArgs),
}

/// Parse CLI arguments.
///
/// Returns both the parsed CLI struct and the `ArgMatches` required for
/// configuration merging.
///
/// # Errors
///
/// Returns a `clap::Error` when parsing fails or help/version output was
/// requested.
pub fn parse_from<I, T>(iter: I) -> Result<(Cli, ArgMatches), clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let mut command = Cli::command();
    let matches = command.try_get_matches_from_mut(iter)?;
    // Clone matches before from_arg_matches_mut consumes the values.
    let matches_for_merge = matches.clone();
    let mut matches_for_parse = matches;
    let cli = Cli::from_arg_matches_mut(&mut matches_for_parse)
        .map_err(|clap_err| clap_err.with_cmd(&command))?;
    Ok((cli, matches_for_merge))
}

/// Return the prefixed environment provider for CLI configuration.
fn env_provider() -> Env {
    Env::prefixed(ENV_PREFIX)
}

fn config_discovery() -> ConfigDiscovery {
    ConfigDiscovery::builder("stepcheck")
        .env_var(CONFIG_ENV_VAR)
        .build()
}

/// Return `true` when no CLI overrides were supplied.
///
/// The merge pipeline treats an empty JSON object as "no overrides".
fn is_empty_value(value: &serde_json::Value) -> bool {
    matches!(value, serde_json::Value::Object(map) if map.is_empty())
}

fn cli_overrides_from_matches(cli: &Cli, matches: &ArgMatches) -> OrthoResult<serde_json::Value> {
    let value = sanitize_value(cli)?;
    let mut map = match value {
        serde_json::Value::Object(map) => map,
        other => {
            return Err(Arc::new(ortho_config::OrthoError::Validation {
                key: String::from("cli"),
                message: format!(
                    "expected parsed CLI values to serialize to an object, got {other:?}"
                ),
            }));
        }
    };

    map.remove("command");
    for field in [
        "verbose",
        "no_emoji",
        "basedir",
        "cover_min_percentage",
        "cover_show_missing",
    ] {
        if matches.value_source(field) != Some(ValueSource::CommandLine) {
            map.remove(field);
        }
    }

    Ok(serde_json::Value::Object(map))
}

/// Merge configuration layers over the parsed CLI values.
///
/// Precedence, lowest first: defaults, configuration file, `STEPCHECK_*`
/// environment variables, explicit command line values. `basedir` entries
/// accumulate across layers.
///
/// # Errors
///
/// Returns an [`ortho_config::OrthoError`] if layer composition or merging
/// fails.
pub fn merge_with_config(cli: &Cli, matches: &ArgMatches) -> OrthoResult<Cli> {
    let command = cli.command.clone();
    let mut errors = Vec::new();
    let mut composer = MergeComposer::with_capacity(4);

    match sanitize_value(&Cli::default()) {
        Ok(value) => composer.push_defaults(value),
        Err(err) => errors.push(err),
    }

    let mut file_layers = config_discovery().compose_layers();
    errors.append(&mut file_layers.required_errors);
    if file_layers.value.is_empty() {
        errors.append(&mut file_layers.optional_errors);
    }
    for layer in file_layers.value {
        composer.push_layer(layer);
    }

    let env_provider = env_provider()
        .map(|key| Uncased::new(key.as_str().to_ascii_uppercase()))
        .split("__");
    match Figment::from(env_provider)
        .extract::<serde_json::Value>()
        .into_ortho_merge()
    {
        Ok(value) => composer.push_environment(value),
        Err(err) => errors.push(err),
    }

    match cli_overrides_from_matches(cli, matches) {
        Ok(value) if !is_empty_value(&value) => composer.push_cli(value),
        Ok(_) => {}
        Err(err) => errors.push(err),
    }

    let composition = LayerComposition::new(composer.layers(), errors);
    let mut merged = composition.into_merge_result(Cli::merge_from_layers)?;
    merged.command = command;
    Ok(merged)
}
