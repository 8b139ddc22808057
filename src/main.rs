use std::path::PathBuf;

use clap::{Arg, Command};

use collecte::{
    boot,
    config::{Config, DEFAULT_CONFIG_FILE},
    tui,
};

fn main() {
    boot::init_common();

    let matches = Command::new("collecte")
        .about("Barcode weigh-in entry console for the Bouffe Action kiosk")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("FILE")
                .help("Path to the TOML configuration file"),
        )
        .arg(
            Arg::new("server-url")
                .long("server-url")
                .short('s')
                .value_name("URL")
                .help("Override the backend base URL"),
        )
        .get_matches();

    let config_path = matches
        .get_one::<String>("config")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    let mut config = match Config::from_file(&config_path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Failed to load configuration: {err:#}");
            std::process::exit(1);
        }
    };

    if let Some(url) = matches.get_one::<String>("server-url") {
        config.server_url = url.clone();
    }

    log::info!("Using backend at {}", config.server_url);

    if let Err(err) = tui::start(config) {
        log::error!("TUI exited with error: {err:#}");
        eprintln!("collecte exited with error: {err:#}");
        std::process::exit(1);
    }
}
