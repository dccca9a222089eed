use clap::Subcommand;

use crate::cli::trees_cmd::TreesCmd;

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    #[command(
        about = "Browse and edit the catalog through the REST API",
        long_about = "List, search, inspect, plant and remove trees by talking to a running arboretum server at --api-url."
    )]
    Trees {
        #[command(subcommand)]
        cmd: TreesCmd,
    },
}
