use anyhow::Result;
use clap::Parser;

mod output;
mod scenarios;
mod sse_client;

use output::print_test_summary;
use scenarios::{connection_test, update_cadence, ScenarioOutcome};

#[derive(Parser)]
#[command(name = "sse-test-client")]
#[command(about = "Changes-feed integration testing tool")]
struct Cli {
    /// Base URL of the backend (e.g., http://localhost:8080)
    #[arg(long)]
    base_url: String,

    /// Recipe whose changes feed to exercise
    #[arg(long, default_value = "all")]
    recipe: String,

    /// Test scenario to run
    #[arg(long, value_enum)]
    scenario: ScenarioChoice,

    /// Enable verbose output
    #[arg(long, short)]
    verbose: bool,
}

#[derive(clap::ValueEnum, Clone)]
enum ScenarioChoice {
    /// Probe /health and confirm the changes stream opens
    ConnectionTest,
    /// Verify update events arrive on the expected cadence with the expected payload
    UpdateCadence,
    /// Run all scenarios
    All,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let mut outcomes: Vec<ScenarioOutcome> = Vec::new();
    match cli.scenario {
        ScenarioChoice::ConnectionTest => {
            outcomes.push(connection_test(&cli.base_url, &cli.recipe).await);
        }
        ScenarioChoice::UpdateCadence => {
            outcomes.push(update_cadence(&cli.base_url, &cli.recipe).await);
        }
        ScenarioChoice::All => {
            outcomes.push(connection_test(&cli.base_url, &cli.recipe).await);
            outcomes.push(update_cadence(&cli.base_url, &cli.recipe).await);
        }
    }

    if !print_test_summary(&outcomes) {
        std::process::exit(1);
    }
    Ok(())
}
