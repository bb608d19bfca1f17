//! Command line interface of the agent.
use crate::agent_config::{AgentConfig, AgentConfigError, AgentConfigLoader};
use crate::logging::LoggingError;
use clap::Parser;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

const DEFAULT_CONFIG_PATH: &str = "/etc/otel-config-agent/config.yaml";

const RUST_VERSION: &str = env!("CARGO_PKG_RUST_VERSION");
const VERSION: &str = match option_env!("OTEL_CONFIG_AGENT_VERSION") {
    Some(version) => version,
    None => env!("CARGO_PKG_VERSION"),
};
const GIT_COMMIT: &str = match option_env!("GIT_COMMIT") {
    Some(commit) => commit,
    None => "development",
};

pub fn binary_metadata() -> String {
    format!("OTel Collector Config Agent Version: {VERSION}, Rust Version: {RUST_VERSION}, GitCommit: {GIT_COMMIT}")
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Could not read agent config: `{0}`")]
    ConfigRead(#[from] AgentConfigError),
    #[error("Could not initialize logging: `{0}`")]
    LoggingInit(#[from] LoggingError),
}

/// What action was requested from the CLI?
#[derive(Debug)]
pub enum CliCommand {
    /// Normal operation requested: run the agent with the loaded config.
    Run(Box<AgentConfig>),
    /// Do a "one-shot" operation and exit successfully.
    Quit(OneShotOperation),
}

#[derive(Debug)]
pub enum OneShotOperation {
    PrintVersion,
    PrintDebugInfo(Cli, Box<AgentConfig>),
}

impl OneShotOperation {
    pub fn run_one_shot(&self) {
        match self {
            OneShotOperation::PrintVersion => println!("{}", binary_metadata()),
            OneShotOperation::PrintDebugInfo(cli, config) => {
                println!("Printing debug info");
                println!("CLI: {:#?}", cli);
                println!("Config: {:#?}", config);
            }
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, about, long_about = None)] // Read from `Cargo.toml`
pub struct Cli {
    /// Path of the agent configuration file. Every setting can also be passed through
    /// `OTEL_AGENT_` prefixed environment variables.
    #[arg(short, long, default_value_t = String::from(DEFAULT_CONFIG_PATH))]
    config: String,

    #[arg(long)]
    print_debug_info: bool,

    #[arg(long)]
    version: bool,
}

impl Cli {
    /// Parses command line arguments and decides how the application runs
    pub fn init() -> Result<CliCommand, CliError> {
        Self::parse().into_command()
    }

    fn into_command(self) -> Result<CliCommand, CliError> {
        if self.version {
            return Ok(CliCommand::Quit(OneShotOperation::PrintVersion));
        }

        let loader = AgentConfigLoader::new(&self.config_path());
        let agent_config = loader.load().inspect_err(|err| {
            println!(
                "Could not read agent config from {}: {}",
                loader.config_path().to_string_lossy(),
                err
            )
        })?;

        if self.print_debug_info {
            return Ok(CliCommand::Quit(OneShotOperation::PrintDebugInfo(
                self,
                Box::new(agent_config),
            )));
        }

        agent_config.log.try_init()?;
        info!("{}", binary_metadata());
        info!(
            "Starting OTel Collector Config Agent with config '{}'",
            loader.config_path().to_string_lossy()
        );

        Ok(CliCommand::Run(Box::new(agent_config)))
    }

    fn config_path(&self) -> PathBuf {
        PathBuf::from(&self.config)
    }
}
