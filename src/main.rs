use clap::Parser;
use newsstand::core::article::{Endpoint, Period};
use newsstand::core::config::{self, CliOverrides, NewsstandConfig};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;

#[derive(Parser)]
#[command(name = "newsstand", about = "Browse the most popular NYT articles in your terminal")]
struct Args {
    /// Ranking to browse on launch
    #[arg(short, long, value_enum)]
    endpoint: Option<Endpoint>,

    /// Time window to browse on launch
    #[arg(short, long, value_enum)]
    period: Option<Period>,

    /// Skip downloading article images
    #[arg(long)]
    no_images: bool,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to newsstand.log in current directory
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create("newsstand.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = match config::load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            log::warn!("Ignoring config file: {}", e);
            NewsstandConfig::default()
        }
    };
    let resolved = config::resolve(
        &file_config,
        CliOverrides {
            endpoint: args.endpoint,
            period: args.period,
            no_images: args.no_images,
        },
    );

    log::info!(
        "Newsstand starting up with {:?}, images {}",
        resolved.default_filter,
        if resolved.images_enabled { "on" } else { "off" }
    );
    if resolved.api_key.is_none() {
        log::warn!("No API key configured; requests will fail until NYT_API_KEY is set");
    }

    newsstand::tui::run(resolved)
}
