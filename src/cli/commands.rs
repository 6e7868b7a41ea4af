use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// `Itinera` - multi-agent travel itinerary planner.
#[derive(Parser, Debug)]
#[command(name = "itinera")]
#[command(version)]
#[command(about = "Plan a trip with a crew of language-model agents.", long_about = None)]
pub struct Cli {
    /// Log at DEBUG instead of INFO (per task and tool call)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Use this config file instead of ~/.itinera/config.toml
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate an itinerary and print it
    Plan(PlanArgs),

    /// Start the web UI
    Serve {
        /// Port to listen on (use 0 for random available port)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct PlanArgs {
    /// Where the traveller starts
    #[arg(long = "from", default_value = crate::trip::DEFAULT_ORIGIN)]
    pub origin: String,

    /// Destination city
    #[arg(long = "to", default_value = crate::trip::DEFAULT_DESTINATION)]
    pub destination: String,

    /// Arrival date (YYYY-MM-DD)
    #[arg(long)]
    pub start: String,

    /// Departure date (YYYY-MM-DD)
    #[arg(long)]
    pub end: String,

    /// What the traveller cares about
    #[arg(long, default_value = crate::trip::DEFAULT_INTERESTS)]
    pub interests: String,

    /// Directory for the markdown artifacts (overrides output.dir)
    #[arg(long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Print the location and guide reports before the itinerary
    #[arg(long)]
    pub show_all: bool,
}
