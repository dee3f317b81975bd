//! tzcompat CLI - checks the installed time zone data module
//!
//! Collaborator values (release, ICU version, tzdb versions reported by other
//! components) come from a YAML config file, `TZCOMPAT_*` environment
//! variables, or flags, in increasing order of precedence. Both the `icu` and
//! `platform` reporters must be set before `check` or `consistency` run;
//! a missing one is a usage error (exit 2), not a failed check.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::ffi::OsString;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tzcompat_gate::{
    Check, ReporterConfig, TzdbVersionSource, ValidatorConfig, COMPATIBILITY_CHECK,
    CONSISTENCY_CHECK, ICU_REPORTER, PLATFORM_REPORTER,
};
use tzcompat_policy::SdkPolicyTable;

#[derive(Parser)]
#[command(name = "tzcompat")]
#[command(about = "Check the time zone data module against the platform release", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (YAML)
    #[arg(short, long, env = "TZCOMPAT_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Module version file
    #[arg(long, env = "TZCOMPAT_VERSION_FILE", global = true)]
    version_file: Option<PathBuf>,

    /// Policy table file (YAML or JSON) replacing the built-in table
    #[arg(long, env = "TZCOMPAT_POLICY", global = true)]
    policy: Option<PathBuf>,

    /// SDK integer of the running release
    #[arg(long, env = "TZCOMPAT_SDK", global = true)]
    sdk: Option<u32>,

    /// Bundled ICU major version
    #[arg(long, env = "TZCOMPAT_ICU_MAJOR", global = true)]
    icu_major: Option<u32>,

    /// tzdb version reported by ICU
    #[arg(long, env = "TZCOMPAT_ICU_TZDATA", global = true)]
    icu_tzdata: Option<String>,

    /// tzdb version reported by the platform time utilities
    #[arg(long, env = "TZCOMPAT_PLATFORM_TZDATA", global = true)]
    platform_tzdata: Option<String>,

    /// File holding the platform tzdb version
    #[arg(long, global = true, conflicts_with = "platform_tzdata")]
    platform_tzdata_file: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every check
    Check,

    /// Major format version against the policy table
    Compat,

    /// tzdb version against the other reporters
    Consistency,

    /// Print the active policy table
    Table,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Yaml,
}

/// Run using the current process arguments.
pub fn run() -> anyhow::Result<bool> {
    run_with_args(std::env::args_os())
}

/// Run using the provided arguments. `Ok(false)` means a check failed.
pub fn run_with_args<I, T>(args: I) -> anyhow::Result<bool>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    let filter = if cli.verbose { "debug" } else { "info" };
    // a second init (tests calling in-process) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .try_init();

    let config = resolve_config(&cli)?;
    let format = cli.format;

    match cli.command {
        Commands::Table => {
            let table = config.table()?;
            print_table(&table, format)?;
            Ok(true)
        }
        Commands::Check => {
            let validator = config.validator()?;
            let platform = config.platform()?;
            let sources = config.sources()?;
            let refs: Vec<&dyn TzdbVersionSource> = sources.iter().map(|s| s.as_ref()).collect();

            let report = validator.run(&platform, &refs);
            match format {
                OutputFormat::Text => println!("{}", report),
                OutputFormat::Json => println!("{}", report.to_json()?),
                OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&report)?),
            }
            Ok(report.passed())
        }
        Commands::Compat => {
            let validator = config.validator()?;
            let platform = config.platform()?;

            let check = match validator.check_compatibility(&platform) {
                Ok(resolved) => Check::pass(
                    COMPATIBILITY_CHECK,
                    format!(
                        "module format {} matches rule {}",
                        resolved.version, resolved.rule_id
                    ),
                ),
                Err(err) => Check::fail(COMPATIBILITY_CHECK, err.to_string(), err.kind()),
            };
            print_check(&check, format)
        }
        Commands::Consistency => {
            let validator = config.validator()?;
            let sources = config.sources()?;
            let refs: Vec<&dyn TzdbVersionSource> = sources.iter().map(|s| s.as_ref()).collect();

            let check = match validator.check_tzdb_consistency(&refs) {
                Ok(version) => Check::pass(
                    CONSISTENCY_CHECK,
                    format!("{} reporters agree on tzdb {}", refs.len(), version),
                ),
                Err(err) => Check::fail(CONSISTENCY_CHECK, err.to_string(), err.kind()),
            };
            print_check(&check, format)
        }
    }
}

/// Config file first, then env and flags on top (clap prefers a flag over its env)
fn resolve_config(cli: &Cli) -> anyhow::Result<ValidatorConfig> {
    let mut config = match &cli.config {
        Some(path) => ValidatorConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ValidatorConfig::default(),
    };

    if let Some(path) = &cli.version_file {
        config.version_file = path.clone();
    }
    if let Some(path) = &cli.policy {
        config.policy_table = Some(path.clone());
    }
    if let Some(sdk) = cli.sdk {
        config.platform.sdk = Some(sdk);
    }
    if let Some(major) = cli.icu_major {
        config.platform.icu_major = Some(major);
    }
    if let Some(version) = &cli.icu_tzdata {
        config.set_reporter(ReporterConfig::literal(ICU_REPORTER, version));
    }
    if let Some(version) = &cli.platform_tzdata {
        config.set_reporter(ReporterConfig::literal(PLATFORM_REPORTER, version));
    }
    if let Some(path) = &cli.platform_tzdata_file {
        config.set_reporter(ReporterConfig::from_file(PLATFORM_REPORTER, path));
    }

    tracing::debug!(
        version_file = %config.version_file.display(),
        reporters = config.reporters.len(),
        "resolved configuration"
    );
    Ok(config)
}

fn print_check(check: &Check, format: OutputFormat) -> anyhow::Result<bool> {
    match format {
        OutputFormat::Text => {
            let mark = if check.error.is_none() { "ok" } else { "FAIL" };
            println!("[{}] {}: {}", mark, check.name, check.message);
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(check)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(check)?),
    }
    Ok(check.error.is_none())
}

fn print_table(table: &SdkPolicyTable, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            println!("policy table: {}", table.name);
            for release in table.releases() {
                if let Some(line) = table.describe(release) {
                    println!("  {}", line);
                }
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(table)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(table)?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("tzcompat").chain(args.iter().copied()))
    }

    #[test]
    fn test_flags_override_config() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("tzcompat.yaml");
        std::fs::write(
            &config_path,
            "platform:\n  sdk: 33\nreporters:\n  - name: icu\n    version: 2023c\n",
        )
        .unwrap();

        let cli = parse(&[
            "check",
            "--config",
            config_path.to_str().unwrap(),
            "--sdk",
            "34",
            "--icu-tzdata",
            "2024a",
            "--platform-tzdata",
            "2024a",
        ]);
        let config = resolve_config(&cli).unwrap();

        assert_eq!(config.platform.sdk, Some(34));
        assert_eq!(config.reporters.len(), 2);
        assert_eq!(config.reporters[0].name, ICU_REPORTER);
        assert_eq!(config.reporters[0].version.as_deref(), Some("2024a"));
        assert_eq!(config.reporters[1].name, PLATFORM_REPORTER);
    }

    #[test]
    fn test_single_reporter_is_config_error() {
        let cli = parse(&["consistency", "--icu-tzdata", "2024a"]);
        let config = resolve_config(&cli).unwrap();

        let err = config.sources().err().expect("expected config error");
        assert!(err.to_string().contains(PLATFORM_REPORTER));
    }

    #[test]
    fn test_platform_file_conflicts_with_literal() {
        let result = Cli::try_parse_from([
            "tzcompat",
            "consistency",
            "--platform-tzdata",
            "2024a",
            "--platform-tzdata-file",
            "/tmp/v",
        ]);
        assert!(result.is_err());
    }
}
