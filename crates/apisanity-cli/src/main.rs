// crates/apisanity-cli/src/main.rs
// ============================================================================
// Module: API Sanity CLI Entry Point
// Description: Command dispatcher for planning and running sanity suites.
// Purpose: Load configuration and contracts, then plan or execute cases.
// Dependencies: apisanity-config, apisanity-contract, apisanity-core, apisanity-providers,
// clap, thiserror, tokio.
// ============================================================================

//! ## Overview
//! The `apisanity` CLI wires the configuration, the contract loader, the
//! built-in providers, and the engine together. `run` executes every planned
//! case against the configured target and exits with failure when any case
//! fails or the run aborts. `plan` lists cases without sending requests.
//! `config validate` checks a configuration file.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use apisanity_config::ReportFormat;
use apisanity_config::SanityConfig;
use apisanity_config::SecuritySourceConfig;
use apisanity_contract::load_contract;
use apisanity_core::EngineError;
use apisanity_core::PlannedCase;
use apisanity_core::ProviderRegistry;
use apisanity_core::RunReporter;
use apisanity_core::RunTally;
use apisanity_core::SanityEngine;
use apisanity_providers::ConsoleReporter;
use apisanity_providers::EnvSecurityProvider;
use apisanity_providers::HttpTransport;
use apisanity_providers::JsonLinesReporter;
use apisanity_providers::JsonSchemaValidator;
use apisanity_providers::RandomFakeGenerator;
use apisanity_providers::StaticSecurityProvider;
use clap::ArgAction;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "apisanity", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Execute every planned case against the configured target.
    Run(RunCommand),
    /// List planned cases without sending requests.
    Plan(PlanCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Configuration for the `run` command.
#[derive(Args, Debug)]
struct RunCommand {
    /// Optional config file path (defaults to apisanity.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Override `target.base_url`.
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,
    /// Override `report.format`.
    #[arg(long, value_enum, value_name = "FORMAT")]
    format: Option<FormatArg>,
    /// Override `generator.seed`.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,
}

/// Configuration for the `plan` command.
#[derive(Args, Debug)]
struct PlanCommand {
    /// Optional config file path (defaults to apisanity.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Emit one JSON record per case.
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a configuration file.
    Validate(ConfigValidateCommand),
}

/// Configuration for the `config validate` command.
#[derive(Args, Debug)]
struct ConfigValidateCommand {
    /// Optional config file path (defaults to apisanity.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Report format selection.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum FormatArg {
    /// Human-readable lines.
    Console,
    /// One JSON record per event.
    JsonLines,
}

impl From<FormatArg> for ReportFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Console => Self::Console,
            FormatArg::JsonLines => Self::JsonLines,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

/// Engine type assembled from the built-in providers.
type CliEngine =
    SanityEngine<HttpTransport, RandomFakeGenerator, JsonSchemaValidator, Arc<dyn RunReporter>>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&format!("apisanity {version}"))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }
    let Some(command) = cli.command else {
        write_stdout_line("usage: apisanity <run|plan|config validate> [--config PATH]")
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    };
    match command {
        Commands::Run(command) => command_run(command).await,
        Commands::Plan(command) => command_plan(&command),
        Commands::Config {
            command,
        } => match command {
            ConfigCommand::Validate(command) => command_config_validate(&command),
        },
    }
}

// ============================================================================
// SECTION: Run Command
// ============================================================================

/// Executes the `run` command.
async fn command_run(command: RunCommand) -> CliResult<ExitCode> {
    let mut config = load_config(command.config)?;
    if let Some(base_url) = command.base_url {
        config.target.base_url = base_url;
    }
    if let Some(format) = command.format {
        config.report.format = format.into();
    }
    if let Some(seed) = command.seed {
        config.generator.seed = Some(seed);
    }
    config.validate().map_err(|err| CliError::new(format!("config load failed: {err}")))?;
    let engine = build_engine(&config)?;
    let abort = engine.abort_handle();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            abort.trigger("interrupted");
        }
    });
    let outcome = engine.run().await;
    interrupt.abort();
    Ok(exit_code_for(&outcome))
}

/// Maps a run outcome to a process exit code.
fn exit_code_for(outcome: &Result<RunTally, EngineError>) -> ExitCode {
    match outcome {
        Ok(tally) if tally.fails == 0 => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(err) => emit_error(&err.to_string()),
    }
}

// ============================================================================
// SECTION: Plan Command
// ============================================================================

/// Executes the `plan` command.
fn command_plan(command: &PlanCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.clone())?;
    let engine = build_engine(&config)?;
    for planned in engine.plan() {
        let line = if command.json {
            serde_json::to_string(&planned)
                .map_err(|err| CliError::new(format!("plan encoding failed: {err}")))?
        } else {
            render_planned(&planned)
        };
        write_stdout_line(&line).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Renders a planned case as a single line.
fn render_planned(planned: &PlannedCase) -> String {
    let marker = if planned.skipped { "SKIP" } else { "CASE" };
    format!(
        "{marker} {} {} {}",
        planned.case.method, planned.case.path_template, planned.case.status_code
    )
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Executes the config validation command.
fn command_config_validate(command: &ConfigValidateCommand) -> CliResult<ExitCode> {
    let _config = load_config(command.config.clone())?;
    write_stdout_line("config ok").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Assembly
// ============================================================================

/// Loads configuration from the given or default path.
fn load_config(path: Option<PathBuf>) -> CliResult<SanityConfig> {
    SanityConfig::load(path.as_deref())
        .map_err(|err| CliError::new(format!("config load failed: {err}")))
}

/// Builds an engine from validated configuration.
fn build_engine(config: &SanityConfig) -> CliResult<CliEngine> {
    let contract_path = config
        .contract_path()
        .map_err(|err| CliError::new(format!("config load failed: {err}")))?;
    let contract = load_contract(&contract_path).map_err(|err| {
        CliError::new(format!("contract load failed ({}): {err}", contract_path.display()))
    })?;
    let transport = HttpTransport::new(config.target.clone())
        .map_err(|err| CliError::new(format!("transport setup failed: {err}")))?;
    Ok(SanityEngine::new(
        contract,
        build_registry(config),
        config.to_run_options(),
        transport,
        RandomFakeGenerator::new(config.generator.clone()),
        JsonSchemaValidator::new(config.validator),
        build_reporter(config),
    ))
}

/// Builds the provider registry from static values and security entries.
fn build_registry(config: &SanityConfig) -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();
    if let Some(values) = &config.static_values {
        registry.set_static_values(values.clone());
    }
    for entry in &config.security {
        match &entry.provider {
            SecuritySourceConfig::Static {
                token: Some(token),
                ..
            } => {
                registry.register_security(
                    entry.scheme.clone(),
                    StaticSecurityProvider::token(token.clone()),
                );
            }
            SecuritySourceConfig::Static {
                token: None,
                headers,
            } => {
                registry.register_security(
                    entry.scheme.clone(),
                    StaticSecurityProvider::headers(headers.clone()),
                );
            }
            SecuritySourceConfig::Env(env) => {
                registry
                    .register_security(entry.scheme.clone(), EnvSecurityProvider::new(env.clone()));
            }
        }
    }
    registry
}

/// Builds the stdout reporter for the configured format.
fn build_reporter(config: &SanityConfig) -> Arc<dyn RunReporter> {
    match config.report.format {
        ReportFormat::Console => {
            Arc::new(ConsoleReporter::new(std::io::stdout(), config.report.color))
        }
        ReportFormat::JsonLines => Arc::new(JsonLinesReporter::new(std::io::stdout())),
    }
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
