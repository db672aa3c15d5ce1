use std::process::ExitCode;
use tracing::{error, info};
use wsbuzz::config::{AppConfig, load_config};
use wsbuzz::logging;
use wsbuzz::pipeline::{Pipeline, PipelineContext};

#[tokio::main]
async fn main() -> ExitCode {
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.json".into());

    // Load configuration from file
    let config: AppConfig = match load_config(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Config load error ({}): {}", config_path, e);
            return ExitCode::FAILURE;
        }
    };

    // Initialize logging
    match logging::init(&config.log_level, &config.log_dir, config.console_logging) {
        Ok(path) => info!("Logging to {}", path.display()),
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return ExitCode::FAILURE;
        }
    }

    let pipeline = Pipeline::new(PipelineContext::from_config(&config));

    info!(
        "Scanning up to {} posts from r/{}",
        config.max_posts, config.reddit.subreddit
    );
    let report = match pipeline
        .run(config.max_posts, config.output_dir.as_path())
        .await
    {
        Ok(report) => report,
        Err(e) => {
            error!("Run aborted: {}", e);
            return ExitCode::FAILURE;
        }
    };

    for failure in &report.failures {
        info!("Failed: {} ({})", failure.symbol, failure.reason);
    }
    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{}", json),
        Err(e) => error!("Failed to serialize report: {}", e),
    }

    ExitCode::SUCCESS
}
