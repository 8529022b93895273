//! BDD Scenario CLI
//!
//! Generate template data from scenario models, or run the expected
//! behaviour of every scenario variant.

use bdd_core::{prepare_template_data, UserStoryLoader};
use bdd_sim::{before_all, export_template_data, load_model_graph, ScenarioResult, ScenarioRunner, SimConfig};
use clap::{Parser, Subcommand};
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// BDD scenario model tool
#[derive(Parser, Debug)]
#[command(name = "bdd-sim")]
#[command(about = "Resolve and run BDD robotic test scenarios", long_about = None)]
struct Args {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export template data, one JSON file per user story
    Generate {
        /// Run configuration (JSON)
        #[arg(short, long)]
        config: PathBuf,

        /// Output directory, overrides the configured one
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run scenario variants and report pass/fail
    Run {
        /// Run configuration (JSON)
        #[arg(short, long)]
        config: PathBuf,

        /// Scenario to run (compact variant name); all when absent
        #[arg(short = 'S', long)]
        scenario: Option<String>,

        /// Behaviour steps per run, overrides the configured count
        #[arg(long)]
        max_count: Option<u32>,

        /// Advance a virtual clock instead of sleeping
        #[arg(long)]
        virtual_time: bool,

        /// JSON output for CI parsing
        #[arg(long)]
        json: bool,
    },
}

fn generate(config_path: &Path, output: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
    let config = SimConfig::from_file(config_path)?;
    let graph = load_model_graph(&config)?;
    let us_loader = UserStoryLoader::new(&graph)?;
    let stories = prepare_template_data(&us_loader, &graph)?;

    let output_dir = output.unwrap_or_else(|| config.output_dir.clone());
    let sources: Vec<String> = config.models.iter().map(|m| m.url.clone()).collect();
    let written = export_template_data(&stories, &sources, &output_dir)?;
    info!("Exported {} user stories to {}", written.len(), output_dir.display());
    Ok(())
}

fn run(
    config_path: &Path,
    scenario: Option<String>,
    max_count: Option<u32>,
    virtual_time: bool,
    json: bool,
) -> Result<usize, Box<dyn Error>> {
    let mut config = SimConfig::from_file(config_path)?;
    if let Some(max_count) = max_count {
        config.max_count = max_count;
        config.validate()?;
    }

    let env = before_all(load_model_graph(&config)?, &config)?;
    let runner = ScenarioRunner::new(&env).with_virtual_time(virtual_time);

    let results: Vec<ScenarioResult> = match scenario {
        Some(name) => vec![runner.run(&name)],
        None => runner.run_all(),
    };

    let total = results.len();
    let failed_count = results.iter().filter(|r| !r.passed).count();

    if json {
        // JSON output for CI parsing
        let summary = serde_json::json!({
            "total": total,
            "passed": total - failed_count,
            "failed": failed_count,
            "results": results.iter().map(|r| {
                serde_json::json!({
                    "scenario": r.scenario,
                    "variant": r.variant.as_ref().map(|v| v.as_str()),
                    "run_id": r.run_id.map(|id| id.to_string()),
                    "passed": r.passed,
                    "steps": r.steps,
                    "elapsed_secs": r.elapsed.as_secs_f64(),
                    "failure_reason": r.failure_reason,
                })
            }).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(failed_count);
    }

    for result in &results {
        if result.passed {
            info!("✓ {} PASSED ({} steps)", result.scenario, result.steps);
        } else {
            error!(
                "✗ {} FAILED: {}",
                result.scenario,
                result.failure_reason.as_deref().unwrap_or("unknown")
            );
        }
    }

    if failed_count == 0 {
        info!("✅ All {} scenarios passed!", total);
    } else {
        error!("❌ {}/{} scenarios failed!", failed_count, total);
    }
    Ok(failed_count)
}

fn main() {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    let outcome = match args.command {
        Command::Generate { config, output } => generate(&config, output).map(|_| 0),
        Command::Run {
            config,
            scenario,
            max_count,
            virtual_time,
            json,
        } => run(&config, scenario, max_count, virtual_time, json),
    };

    // Exit with proper code for CI
    match outcome {
        Ok(0) => {}
        Ok(_) => std::process::exit(1),
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}
