mod args;
mod command;
mod trees_cmd;

pub use args::Cli;
pub use command::Command;
pub use trees_cmd::TreesCmd;

pub use args::parse;
