use colored::*;

use crate::scenarios::ScenarioOutcome;

pub fn print_scenario_start(name: &str) {
    println!("{} {}", "▶".blue().bold(), name.bold());
}

pub fn print_test_summary(outcomes: &[ScenarioOutcome]) -> bool {
    println!();
    println!("{}", "Test Summary".bold().underline());

    let mut all_passed = true;
    for outcome in outcomes {
        if outcome.passed {
            println!(
                "  {} {} - {}",
                "PASS".green().bold(),
                outcome.name,
                outcome.detail
            );
        } else {
            all_passed = false;
            println!(
                "  {} {} - {}",
                "FAIL".red().bold(),
                outcome.name,
                outcome.detail
            );
        }
    }

    println!();
    if all_passed {
        println!("{}", "All scenarios passed".green().bold());
    } else {
        println!("{}", "Some scenarios failed".red().bold());
    }
    all_passed
}
