use anyhow::Result;
use clap::Parser;
use std::fs;
use std::path::Path;

mod models;
mod repositories;
mod services;
mod settings;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "config.toml")]
    config: String,
    /// Overrides `server.listen` from the config.
    #[arg(short, long)]
    listen: Option<String>,
    #[arg(long, default_value = "log4rs.yaml")]
    log4rs: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    let mut settings = settings::Settings::load(&args.config)?;
    if let Some(listen) = args.listen {
        settings.server.listen = listen;
    }

    init_logging(&args.log4rs)?;
    log::info!("Starting PIX deposit proxy.");

    services::start_services(settings).await
}

fn init_logging(path: &str) -> Result<(), anyhow::Error> {
    if !Path::new("logs").exists() {
        fs::create_dir("logs")?;
    }

    match log4rs::init_file(path, Default::default()) {
        Ok(_) => {
            println!("[*] Logging initialized successfully.");
            Ok(())
        }
        Err(e) => {
            println!("[ERROR] Failed to initialize logging: {}", e);
            Err(anyhow::anyhow!("Could not initialize logging: {}", e))
        }
    }
}
