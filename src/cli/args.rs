use clap::Parser;
use std::env;

use crate::cli::command::Command;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Record, browse, search and delete trees",
    long_about = "A small tree catalog. Without a subcommand it serves the REST API backed by SQLite; with `trees ...` it acts as a client of a running server.",
    subcommand_required = false,
    arg_required_else_help = false
)]
pub struct Cli {
    #[arg(
        long,
        default_value_t = false,
        help = "Reset all persisted state (delete the SQLite database) before starting"
    )]
    pub reset: bool,

    #[arg(
        long,
        env = "ARBORETUM_DATA_DIR",
        default_value = ".arboretum/",
        value_name = "DIR",
        help = "Directory to store persistent data"
    )]
    pub data_dir: String,

    #[arg(
        long = "log-file",
        env = "ARBORETUM_LOG_FILE",
        value_name = "PATH",
        help = "Write logs to PATH (in addition to stderr)"
    )]
    pub log_file: Option<String>,

    #[arg(
        long = "api-listen",
        env = "ARBORETUM_API_LISTEN",
        value_name = "ADDR",
        default_value = "127.0.0.1:8083",
        help = "REST API listen address (host:port)"
    )]
    pub api_listen: std::net::SocketAddr,

    #[arg(
        long = "api-url",
        env = "ARBORETUM_API_URL",
        value_name = "URL",
        default_value = "http://127.0.0.1:8083",
        help = "Base URL of the server used by client subcommands"
    )]
    pub api_url: url::Url,

    #[command(subcommand)]
    pub cmd: Option<Command>,
}

pub fn parse() -> Cli {
    let dotenv_path = env::var("DOTENV_PATH").unwrap_or(".env".into());
    if dotenvy::from_filename(&dotenv_path).is_ok() {
        log::debug!("Loaded env from {}", dotenv_path);
    }
    Cli::parse()
}
