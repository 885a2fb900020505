//! Health-check server
//!
//! Answers every HTTP request with `200 ok` and logs each connection.

use clap::Parser;
use pocker_health::{
    build_info,
    cli::ServerCli,
    config::{display_server_summary, load_server_config, EnvManager},
    error::{AppError, ErrorReporter, Result},
    logging::Logger,
    HealthServer,
};
use std::{path::Path, process};

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        process::exit(1);
    }));

    let cli = ServerCli::parse();
    let reporter = ErrorReporter::new(cli.use_colors(), cli.verbose || cli.debug);

    if let Err(e) = run_server(cli).await {
        reporter.report_error(&e);
        if let AppError::Bind(_) = e {
            eprintln!();
            eprintln!("Is another process already listening on that port?");
            eprintln!("  - Pick another one with --port or SERVER_PORT");
        }
        process::exit(e.exit_code());
    }
}

async fn run_server(cli: ServerCli) -> Result<()> {
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

    let config = load_server_config(cli)?;

    if config.debug {
        println!("Configuration loaded successfully:");
        println!("{}", display_server_summary(&config));
        println!();
    }

    let logger = Logger::console("server", config.log_settings());
    let server = HealthServer::bind(config, logger.clone()).await?;

    server
        .serve_with_shutdown(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => logger.info("Shutdown signal received").log().await,
                Err(e) => {
                    logger
                        .error(&format!("Failed to listen for shutdown signal: {}", e))
                        .log()
                        .await;
                    std::future::pending::<()>().await;
                }
            }
        })
        .await
}
