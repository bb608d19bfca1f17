use otel_config_agent::cli::{Cli, CliCommand};
use otel_config_agent::run::AgentRunner;
use std::process::ExitCode;
use tracing::{error, info};

fn main() -> ExitCode {
    let agent_config = match Cli::init() {
        Ok(CliCommand::Run(agent_config)) => agent_config,
        Ok(CliCommand::Quit(operation)) => {
            operation.run_one_shot();
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            // logging might not be initialized yet
            eprintln!("Error initializing the agent: {err}");
            return ExitCode::FAILURE;
        }
    };

    match AgentRunner::new(*agent_config).and_then(AgentRunner::run) {
        Ok(()) => {
            info!("exiting gracefully");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error_msg = %err, "the agent stopped with an error");
            ExitCode::FAILURE
        }
    }
}
