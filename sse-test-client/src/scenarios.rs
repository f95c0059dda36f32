use std::time::Duration;

use anyhow::Result;
use log::*;

use crate::output::print_scenario_start;
use crate::sse_client::Connection;

/// Changes clients are told to retry after 2000 ms and updates arrive on the
/// same cadence; waiting two periods plus slack keeps slow CI from flaking.
const UPDATE_WAIT: Duration = Duration::from_millis(5000);

pub struct ScenarioOutcome {
    pub name: &'static str,
    pub passed: bool,
    pub detail: String,
}

impl ScenarioOutcome {
    fn pass(name: &'static str, detail: String) -> Self {
        Self {
            name,
            passed: true,
            detail,
        }
    }

    fn fail(name: &'static str, detail: String) -> Self {
        Self {
            name,
            passed: false,
            detail,
        }
    }
}

/// Probes /health, then confirms the changes stream opens and produces a
/// first update event.
pub async fn connection_test(base_url: &str, recipe: &str) -> ScenarioOutcome {
    const NAME: &str = "connection-test";
    print_scenario_start(NAME);

    match run_connection_test(base_url, recipe).await {
        Ok(detail) => ScenarioOutcome::pass(NAME, detail),
        Err(e) => ScenarioOutcome::fail(NAME, e.to_string()),
    }
}

async fn run_connection_test(base_url: &str, recipe: &str) -> Result<String> {
    let status = reqwest::get(format!("{base_url}/health")).await?.status();
    anyhow::ensure!(status.is_success(), "health probe returned {status}");
    info!("Health probe ok");

    let mut connection = Connection::establish(base_url, recipe).await?;
    let event = connection.wait_for_event("update", UPDATE_WAIT).await?;

    Ok(format!(
        "stream opened, first update carried time {}",
        event.data["time"]
    ))
}

/// Collects several updates and checks cadence and payload shape.
pub async fn update_cadence(base_url: &str, recipe: &str) -> ScenarioOutcome {
    const NAME: &str = "update-cadence";
    print_scenario_start(NAME);

    match run_update_cadence(base_url, recipe).await {
        Ok(detail) => ScenarioOutcome::pass(NAME, detail),
        Err(e) => ScenarioOutcome::fail(NAME, e.to_string()),
    }
}

async fn run_update_cadence(base_url: &str, recipe: &str) -> Result<String> {
    let mut connection = Connection::establish(base_url, recipe).await?;

    let mut events = Vec::with_capacity(3);
    for _ in 0..3 {
        let event = connection.wait_for_event("update", UPDATE_WAIT).await?;
        anyhow::ensure!(
            event.data["time"].is_string(),
            "update payload missing a time string: {}",
            event.data
        );
        events.push(event);
    }

    let gaps: Vec<Duration> = events
        .windows(2)
        .map(|pair| pair[1].timestamp.duration_since(pair[0].timestamp))
        .collect();
    debug!("Observed update gaps: {:?}", gaps);

    let average_millis =
        gaps.iter().map(Duration::as_millis).sum::<u128>() / gaps.len() as u128;

    Ok(format!(
        "{} updates received, average gap {average_millis} ms",
        events.len()
    ))
}
