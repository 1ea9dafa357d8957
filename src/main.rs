use anyhow::Result;
use clap::Parser;
use log::info;

mod cli;
use cli::commands::{ self, OutputFormat };
use cli::{ Commands, PatentCli };

#[tokio::main]
async fn main() -> Result<()> {
    // Parse the command line arguments
    let cli = PatentCli::parse();

    // Pick up API keys and MODEL_ID from .env
    dotenv::dotenv().ok();

    // Setup logging
    setup_logging(&cli.log_level);

    let format = OutputFormat::parse(&cli.output_format)?;
    let config_path = cli.config.as_deref();

    match &cli.command {
        Commands::Assess { input, stream, output } => {
            let config = commands::load_config(config_path)?;
            let request = commands::resolve_request(input)?;
            commands::assess::execute(&config, request, *stream, output.as_deref(), format).await?;
        }

        Commands::Interactive { stream } => {
            let config = commands::load_config(config_path)?;
            commands::interactive::execute(&config, *stream).await?;
        }

        Commands::Extract { patent } => {
            commands::extract::execute(patent.as_deref(), format).await?;
        }

        Commands::Match { input } => {
            let request = commands::resolve_request(input)?;
            commands::matching::execute(request, format).await?;
        }

        Commands::Samples => {
            commands::samples::execute(format)?;
        }
    }

    Ok(())
}

fn setup_logging(log_level: &str) {
    // Set up the logger based on the log level
    let level = match log_level.to_lowercase().as_str() {
        "trace" => log::LevelFilter::Trace,
        "debug" => log::LevelFilter::Debug,
        "info" => log::LevelFilter::Info,
        "warn" => log::LevelFilter::Warn,
        "error" => log::LevelFilter::Error,
        _ => log::LevelFilter::Info,
    };

    env_logger::Builder::new().filter_level(level).init();

    info!("Logger initialized with level: {}", log_level);
}
