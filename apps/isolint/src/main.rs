use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use isolint_isolation::{Config, OutputFormat};
use log::{debug, info};
use std::io::{BufWriter, Write};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "isolint")]
#[command(about = "Structural isolation analysis for codebases", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Check coupling, cohesion, layer boundaries and component size
    Isolation(Config),
}

fn main() -> Result<()> {
    env_logger::init();

    // stdio is blocked by LineWriter, use a BufWriter to reduce syscalls.
    // See https://github.com/rust-lang/rust/issues/60673
    let mut stdout = BufWriter::new(std::io::stdout());

    let cli = Cli::parse();
    debug!("Parsed CLI arguments: {:?}", cli.command);

    let start = Instant::now();

    match cli.command {
        Commands::Isolation(cfg) => {
            let num_threads = rayon::current_num_threads();
            let format = cfg.format;
            let fail_on = cfg.fail_on;
            info!("Running isolation check (using {} threads)", num_threads);

            let result = isolint_isolation::run_isolation_check(cfg)?;
            debug!("Found {} issues", result.issues.len());

            let elapsed_ms = start.elapsed().as_millis();

            match format {
                OutputFormat::Json => isolint_isolation::print_json(&mut stdout, &result)?,
                OutputFormat::Tree => {
                    if result.issues.is_empty() {
                        isolint_isolation::print_no_issues_message(
                            &mut stdout,
                            result.files_analyzed,
                        )?;
                    } else {
                        isolint_isolation::print_issues_tree(&mut stdout, &result)?;
                    }
                    writeln!(
                        stdout,
                        "\n{} Finished in {}ms on {} files (using {} threads).",
                        "●".bright_blue(),
                        elapsed_ms.to_string().cyan(),
                        result.files_analyzed.to_string().cyan(),
                        num_threads.to_string().cyan()
                    )?;
                }
            }
            stdout.flush()?;

            // Non-zero exit to fail CI
            if result.has_issues_at_or_above(fail_on) {
                info!("Issues at or above {} severity found", fail_on);
                std::process::exit(1);
            }

            Ok(())
        }
    }
}
