use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ostrava_sim::{
    capacity::Resource,
    scenario::{ScenarioLoader, ScenarioOverrides},
    simulation::{RunReport, Simulation},
    web::{self, WebServerConfig},
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Migrant housing and resource capacity simulation")]
struct Cli {
    /// Path to the scenario YAML file
    #[arg(long, default_value = "scenarios/ostrava.yaml")]
    scenario: PathBuf,

    /// Override the number of individuals to sample
    #[arg(long)]
    count: Option<usize>,

    /// Override the random seed (entropy when neither is set)
    #[arg(long)]
    seed: Option<u64>,

    /// Override the minimum income
    #[arg(long)]
    income_min: Option<u64>,

    /// Override the maximum income
    #[arg(long)]
    income_max: Option<u64>,

    /// Resource profile name (built-in preset or scenario-defined)
    #[arg(long)]
    profile: Option<String>,

    /// Report usage per housing category
    #[arg(long)]
    breakdown: bool,

    /// Print the run report as JSON instead of a text summary
    #[arg(long)]
    json: bool,

    /// Also write the JSON report to this file
    #[arg(long)]
    output: Option<PathBuf>,

    /// Serve the HTTP API instead of running a single batch
    #[arg(long)]
    serve: bool,

    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let loader = ScenarioLoader::new(".");
    let mut scenario = loader.load(&cli.scenario)?;

    ScenarioOverrides {
        count: cli.count,
        seed: cli.seed,
        income_min: cli.income_min,
        income_max: cli.income_max,
        resource_profile: cli.profile,
        breakdown: cli.breakdown,
    }
    .apply(&mut scenario)
    .with_context(|| format!("Invalid overrides for {}", cli.scenario.display()))?;

    if cli.serve {
        return web::run(WebServerConfig {
            scenario,
            host: cli.host,
            port: cli.port,
        })
        .await;
    }

    let simulation = Simulation::from_scenario(&scenario)?;
    let run = tokio::task::spawn_blocking(move || simulation.run()).await??;
    let report = run.report;

    let json = serde_json::to_string_pretty(&report)?;
    if let Some(path) = &cli.output {
        fs::write(path, &json)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
    }
    if cli.json {
        println!("{json}");
    } else {
        print_summary(&report);
    }
    Ok(())
}

fn print_summary(report: &RunReport) {
    println!(
        "Scenario '{}': {} individuals (seed {})",
        report.scenario, report.count, report.seed
    );
    println!("Housing:");
    for (category, count) in report.housing.iter() {
        println!("  {:<20} {:>8}", category.label(), count);
    }
    if let Some(breakdown) = &report.breakdown {
        println!("Usage by housing:");
        for (category, usage) in breakdown.iter() {
            println!(
                "  {:<20} water {:>12.2} L  electricity {:>10.2} kWh  land {:>10.2} sqm",
                category.label(),
                usage.water,
                usage.electricity,
                usage.land
            );
        }
    }
    println!("Total Water Usage: {:.2} Litres/day", report.usage.water);
    println!(
        "Total Electricity Usage: {:.2} kWh/day",
        report.usage.electricity
    );
    println!("Total Land Required: {:.2} sqm", report.usage.land);
    println!("Remaining capacity:");
    for (resource, status) in report.capacity.iter() {
        println!(
            "  {:<12} {:>7.2}% ({:.2} {} left) {}",
            resource_label(resource),
            status.percent_remaining,
            status.remaining,
            resource.unit(),
            status.status
        );
    }
}

fn resource_label(resource: Resource) -> &'static str {
    match resource {
        Resource::Water => "Water",
        Resource::Electricity => "Electricity",
        Resource::Land => "Land",
    }
}
