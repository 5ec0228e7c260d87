use clap::Parser;
use coze::core::config;
use coze::tui;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;

#[derive(Parser)]
#[command(name = "coze", about = "Terminal chat client")]
struct Args {
    /// Backend base URL (overrides config and COZE_BACKEND_URL)
    #[arg(short, long)]
    backend_url: Option<String>,

    /// Language code sent with every prompt (overrides config and COZE_LANGUAGE)
    #[arg(short, long)]
    language: Option<String>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to coze.log in current directory
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::create("coze.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("coze: {e}");
            std::process::exit(1);
        }
    };
    let resolved = config::resolve(
        &file_config,
        args.backend_url.as_deref(),
        args.language.as_deref(),
    );

    log::info!("Coze starting up (backend: {})", resolved.backend_url);

    tui::run(resolved)
}
