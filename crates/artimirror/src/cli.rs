use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Debug, Parser)]
#[command(name = "artimirror", version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
pub struct App {
    /// API key used for the search and for every download.
    #[arg(long, env = "ARTIMIRROR_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Path to the JSON configuration file.
    #[arg(long, default_value = "config.json")]
    pub config: PathBuf,

    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Also write logs to this file, rotated daily with five backups kept.
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}
