use std::net::SocketAddr;
use std::path::PathBuf;

use url::Url;

const DB_FILE_NAME: &str = "arboretum.sqlite";

#[derive(Clone, Debug)]
pub struct Context {
    pub data_dir: PathBuf,
    pub reset: bool,
    pub log_file: Option<PathBuf>,
    pub api_listen: SocketAddr,
    pub api_url: Url,
}

impl Context {
    pub fn from_cli(cli: &crate::cli::Cli) -> Self {
        Self {
            data_dir: PathBuf::from(&cli.data_dir),
            reset: cli.reset,
            log_file: cli.log_file.as_ref().map(PathBuf::from),
            api_listen: cli.api_listen,
            api_url: cli.api_url.clone(),
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }
}
