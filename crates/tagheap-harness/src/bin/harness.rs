//! CLI entrypoint for the tagheap scenario harness.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use tagheap_harness::{HarnessReport, Scenario};

/// Scenario tooling for the tagheap allocator.
#[derive(Debug, Parser)]
#[command(name = "tagheap-harness")]
#[command(about = "Scenario driver for the tagheap allocator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List available scenarios.
    List,
    /// Run one scenario, or all of them, and print a report.
    Run {
        /// Scenario name, or "all".
        #[arg(long, default_value = "all")]
        scenario: String,
        /// Write the JSON report to this path.
        #[arg(long)]
        json: Option<PathBuf>,
        /// Print each scenario's final heap dump.
        #[arg(long)]
        dump: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    match cli.command {
        Command::List => {
            for scenario in Scenario::ALL {
                println!("{:<10} {}", scenario.name(), scenario.description());
            }
        }
        Command::Run {
            scenario,
            json,
            dump,
        } => {
            let selected: Vec<Scenario> = if scenario == "all" {
                Scenario::ALL.to_vec()
            } else {
                match Scenario::from_name(&scenario) {
                    Ok(found) => vec![found],
                    Err(err) => {
                        eprintln!("{err}");
                        std::process::exit(2);
                    }
                }
            };

            let reports: Vec<_> = selected.into_iter().map(Scenario::run).collect();
            if dump {
                for report in &reports {
                    println!("----- {} DUMP -----", report.scenario);
                    print!("{}", report.final_dump);
                }
            }

            let report = HarnessReport::new("tagheap scenarios", reports);
            print!("{}", report.to_markdown());

            if let Some(path) = json {
                if let Err(err) = std::fs::write(&path, report.to_json()) {
                    eprintln!("failed to write {}: {err}", path.display());
                    std::process::exit(2);
                }
            }

            if !report.all_passed() {
                std::process::exit(1);
            }
        }
    }
}
