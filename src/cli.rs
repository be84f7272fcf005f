use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser};

use crate::config::Config;
use crate::logging::Verbosity;

/// Options that take a value and may be spelled with a single dash,
/// Go `flag` style (`-timeout 30`, `-timeout=30`).
const VALUE_OPTIONS: &[&str] = &["timeout", "config"];

#[derive(Parser, Debug)]
#[command(
    name = "docker-autostart",
    version,
    about = "Start Docker Desktop if it is not running, then run a docker command",
    override_usage = "docker-autostart [options] <docker-command> [args...]",
    after_help = "Example: docker-autostart ps"
)]
pub struct Cli {
    /// Verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Quiet mode
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,

    /// Timeout in seconds for Docker to start [default: 120]
    #[arg(long, value_name = "SECONDS", allow_negative_numbers = true)]
    pub timeout: Option<i64>,

    /// YAML file overriding the engine binary, probes and desktop commands
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Docker command and its arguments, passed through untouched
    #[arg(
        value_name = "DOCKER_COMMAND",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub command: Vec<OsString>,
}

impl Cli {
    /// Parse process arguments, accepting single-dash long options.
    pub fn parse_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = OsString>,
    {
        Self::parse_from(normalize_args(args))
    }

    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.verbose, self.quiet)
    }

    /// Defaults, then the `--config` file, then command-line flags.
    pub fn resolve_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        if let Some(timeout) = self.timeout {
            config.timeout = timeout;
        }
        Ok(config)
    }
}

/// Full help text, starting with the `Usage:` line.
pub fn usage() -> String {
    Cli::command().render_help().to_string()
}

/// Rewrite `-timeout`/`-config` (and their `=value` forms) to the double-dash
/// spelling clap understands. Stops at `--` or the first positional so the
/// forwarded command is never touched.
pub fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut iter = args.into_iter();
    let mut out: Vec<OsString> = iter.next().into_iter().collect();

    while let Some(arg) = iter.next() {
        let Some(text) = arg.to_str() else {
            out.push(arg);
            break;
        };
        if text == "--" || !text.starts_with('-') || text == "-" {
            out.push(arg);
            break;
        }

        let single_dash = text.strip_prefix('-').filter(|rest| !rest.starts_with('-'));
        let matched = single_dash.and_then(|rest| {
            VALUE_OPTIONS.iter().find_map(|name| {
                if rest == *name {
                    Some(false)
                } else if rest.strip_prefix(name)?.starts_with('=') {
                    Some(true)
                } else {
                    None
                }
            })
        });

        match matched {
            Some(inline_value) => {
                out.push(format!("-{text}").into());
                if !inline_value && let Some(value) = iter.next() {
                    out.push(value);
                }
            }
            None => {
                let takes_value = VALUE_OPTIONS
                    .iter()
                    .any(|name| text.strip_prefix("--") == Some(*name));
                out.push(arg);
                if takes_value && let Some(value) = iter.next() {
                    out.push(value);
                }
            }
        }
    }

    out.extend(iter);
    out
}
