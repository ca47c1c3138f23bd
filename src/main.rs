use clap::Parser;
use page_harvest::config::TransportKind;
use page_harvest::{HarvestConfig, Harvester, LogDiagnostics, transport};
use std::process::ExitCode;
use std::sync::Arc;

mod args;
use args::Args;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    env_logger::init();

    // Parse command-line arguments
    let args = Args::parse();

    let mut config = match HarvestConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            ::log::error!("Failed to load {}: {}", args.config.display(), e);
            return ExitCode::FAILURE;
        }
    };
    args.apply(&mut config);

    if config.transport.kind == TransportKind::WebDriver {
        ::log::info!(
            "Rendering pages through the WebDriver server at {}",
            config.transport.webdriver_url
        );
    }

    let fetcher = match transport::from_config(&config.transport) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            ::log::error!("Failed to set up the fetch transport: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let harvester = match Harvester::new(config, fetcher.clone(), Arc::new(LogDiagnostics)) {
        Ok(harvester) => harvester,
        Err(e) => {
            ::log::error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    ::log::info!("Starting harvest of {}", harvester.config().search_url);
    let start_time = std::time::Instant::now();

    let result = harvester.run(args.links_only).await;
    fetcher.close().await;

    match result {
        Ok(summary) => {
            ::log::info!(
                "Harvest complete - {} new links ({} total), {} new articles ({} total) in {:.2} seconds",
                summary.new_links,
                summary.total_links,
                summary.new_articles,
                summary.total_articles,
                start_time.elapsed().as_secs_f64()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            ::log::error!("Failed to write datasets: {}", e);
            ExitCode::FAILURE
        }
    }
}
