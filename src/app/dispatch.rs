use crate::cli::{Cli, Commands, PlanArgs};
use crate::config::{Config, require_credential};
use crate::crew::{FileSink, RunOutput};
use crate::llm::create_provider;
use crate::trip::{TripPlanner, TripRequest};
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

/// Generate one itinerary from CLI arguments and print it.
///
/// The request is validated before the credential is resolved, so a bad
/// date range never reaches the model.
async fn run_plan(config: &Config, args: PlanArgs) -> Result<()> {
    let request = TripRequest::parse(
        &args.origin,
        &args.destination,
        &args.start,
        &args.end,
        &args.interests,
    )?;
    let credential = require_credential()?;
    let provider = create_provider(&config.llm, &credential)?;

    let out_dir = args.out.unwrap_or_else(|| config.output.resolved_dir());
    let sink = Arc::new(FileSink::new(&out_dir));
    let planner = TripPlanner::from_config(config, provider, sink);

    let output = planner.plan(&request).await?;
    info!(dir = %out_dir.display(), "artifacts written");
    println!("{}", render_output(&output, args.show_all));
    Ok(())
}

fn render_output(output: &RunOutput, show_all: bool) -> String {
    if !show_all {
        return output.final_result.text.clone();
    }
    output
        .results
        .iter()
        .map(|result| format!("## {} ({})\n\n{}", result.task_id, result.agent_role, result.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Plan(args) => run_plan(&config, args).await,

        Commands::Serve { port, host } => {
            let port = port.unwrap_or(config.gateway.port);
            let host = host.unwrap_or_else(|| config.gateway.host.clone());
            if port == 0 {
                info!("Starting Itinera web UI on {host} (random port)");
            } else {
                info!("Starting Itinera web UI on {host}:{port}");
            }
            crate::gateway::run_gateway(&host, port, config).await
        }
    }
}
