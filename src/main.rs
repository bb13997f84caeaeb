mod cli;
mod commands;
mod formatting;
mod progress;
mod settings;

use std::process::ExitCode;

use cli::Commands;
use commands::{run_audit, run_check, run_guide};
use settings::AuditOverrides;

#[tokio::main]
async fn main() -> ExitCode {
    run().await
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

async fn run() -> ExitCode {
    let raw_args: Vec<String> = std::env::args().collect();
    let args = cli::parse();
    init_logging(args.verbose);

    match args.command {
        Commands::Audit {
            guide,
            urls,
            results_dir,
            screenshots_dir,
            viewport,
            nav_timeout,
            settle_ms,
            dedup,
            no_screenshots,
            headed,
            format,
            output,
        } => {
            let overrides = AuditOverrides {
                results_dir,
                screenshots_dir,
                nav_timeout,
                settle_ms,
                dedup,
                no_screenshots,
                headed,
            };
            run_audit(
                &raw_args,
                args.config,
                args.verbose,
                guide,
                urls,
                viewport,
                overrides,
                format,
                output,
            )
            .await
        }
        Commands::Guide {
            guide,
            format,
            output,
        } => run_guide(args.config, args.verbose, guide, format, output).await,
        Commands::Check {
            guide,
            snapshot,
            viewport,
            results,
            format,
            output,
        } => {
            run_check(
                args.config,
                args.verbose,
                guide,
                snapshot,
                viewport,
                results,
                format,
                output,
            )
            .await
        }
    }
}
