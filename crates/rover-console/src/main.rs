//! Operator console entry point.

use clap::{value_parser, Arg, Command};
use tracing_subscriber::EnvFilter;

mod harness;

use harness::{run_simulator, SimulatorConfig};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Command::new("rover-console")
        .version("0.1.0")
        .about("Rescue rover operator console")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("simulate")
                .about("Run a scripted mission against a simulated link")
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .default_value("42")
                        .value_parser(value_parser!(u64))
                        .help("Random seed for reproducibility"),
                )
                .arg(
                    Arg::new("duration-secs")
                        .long("duration-secs")
                        .default_value("20")
                        .value_parser(value_parser!(u64))
                        .help("Mission length in seconds"),
                )
                .arg(
                    Arg::new("outages")
                        .long("outages")
                        .default_value("2")
                        .value_parser(value_parser!(u32))
                        .help("Number of link outages to script"),
                ),
        );

    match cli.get_matches().subcommand() {
        Some(("simulate", matches)) => {
            let config = SimulatorConfig {
                seed: *matches.get_one::<u64>("seed").unwrap_or(&42),
                duration_secs: *matches.get_one::<u64>("duration-secs").unwrap_or(&20),
                outages: *matches.get_one::<u32>("outages").unwrap_or(&2),
            };
            let stats = run_simulator(config).await;
            println!("mission complete");
            println!("  commands submitted: {}", stats.commands_submitted);
            println!("  commands refused:   {}", stats.commands_refused);
            println!("  evidence captured:  {}", stats.evidence_captured);
            println!("  outages survived:   {}", stats.outages_survived);
            println!("  syncs completed:    {}", stats.syncs_completed);
        }
        _ => unreachable!("subcommand required"),
    }
}
