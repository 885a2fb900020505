//! Latency probe
//!
//! Drives GET traffic against the direct and proxied health endpoints of a
//! deployment and prints their 95th-percentile latencies.

use clap::Parser;
use pocker_health::{
    cli::ProbeCli,
    config::{display_config_summary, load_probe_config, EnvManager},
    error::{AppError, ErrorReporter, Result},
    logging::Logger,
    output::{emit_summary, FormattingOptions, SummaryHandlerFactory},
    build_info, ProbeExecutor,
};
use std::{path::Path, process};

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        process::exit(1);
    }));

    let cli = ProbeCli::parse();
    let reporter = ErrorReporter::new(cli.use_colors(), cli.verbose || cli.debug);

    if let Err(e) = run_probe(cli).await {
        reporter.report_error(&e);
        print_error_suggestions(&e);
        process::exit(e.exit_code());
    }
}

async fn run_probe(cli: ProbeCli) -> Result<()> {
    let default_summary = cli.default_summary;

    if cli.env_help {
        print!("{}", EnvManager::display_env_help());
        return Ok(());
    }

    if cli.check_env {
        print!("{}", EnvManager::check_environment(Path::new(".env"))?);
        println!("Environment OK");
        return Ok(());
    }

    if cli.debug {
        println!("{}", build_info());
        println!("Debug mode enabled");
        println!();
    }

    let config = load_probe_config(cli)?;

    if config.debug {
        println!("Configuration loaded successfully:");
        println!("{}", display_config_summary(&config));
        println!();
    }

    let logger = Logger::console("probe", config.log_settings());
    let options = FormattingOptions::default()
        .with_color(config.enable_color)
        .with_internal(config.show_internal);

    let executor = ProbeExecutor::from_config(config, logger.clone())?;

    executor.setup().await;
    let results = executor.run().await?;

    if results.failed_iterations > 0 {
        logger
            .info(&format!(
                "{} of {} iterations failed",
                results.failed_iterations, results.iterations
            ))
            .field("success_rate", results.success_rate())
            .log()
            .await;
    }

    // Failed iterations are reported in the log; the run itself succeeded.
    let handler = SummaryHandlerFactory::create(default_summary, options);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    emit_summary(handler.as_ref(), &results.summary, &mut out)
}

/// Print helpful suggestions for common errors
fn print_error_suggestions(error: &AppError) {
    match error {
        AppError::Config(_) | AppError::Validation(_) => {
            eprintln!();
            eprintln!("Configuration help:");
            eprintln!("  - Check your .env file format");
            eprintln!("  - Subdomains may only contain letters, digits and '-'");
            eprintln!("  - URL overrides must start with http:// or https://");
        }
        AppError::Network(_) => {
            eprintln!();
            eprintln!("Network troubleshooting:");
            eprintln!("  - Check your internet connection");
            eprintln!("  - Verify the subdomain and base domain");
        }
        AppError::TestExecution(_) => {
            eprintln!();
            eprintln!("Execution troubleshooting:");
            eprintln!("  - Reduce --vus or --iterations");
            eprintln!("  - Increase timeout with --timeout option");
        }
        _ => {}
    }
}
