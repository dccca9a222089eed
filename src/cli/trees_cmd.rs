use clap::Subcommand;

#[derive(Subcommand, Debug, Clone)]
pub enum TreesCmd {
    #[command(
        about = "List recorded trees",
        long_about = "Print every tree in the catalog, optionally narrowed by a case-insensitive search over common name, scientific name and location."
    )]
    List {
        #[arg(long, short = 's', value_name = "TERM", help = "Only show trees matching TERM")]
        search: Option<String>,
    },
    #[command(about = "Show a single tree")]
    Get {
        #[arg(long, value_name = "ID")]
        id: i64,
    },
    #[command(
        about = "Plant a new tree",
        long_about = "Record a new tree. Common name and location are required; height is in meters and must not be negative."
    )]
    Create {
        #[arg(long, value_name = "NAME")]
        common_name: String,
        #[arg(long, value_name = "NAME")]
        scientific_name: Option<String>,
        #[arg(long, value_name = "PLACE")]
        location: String,
        #[arg(long, value_name = "METERS", allow_negative_numbers = true)]
        height: Option<f64>,
        #[arg(long, value_name = "TEXT")]
        description: Option<String>,
        #[arg(long, default_value_t = false, help = "Mark the tree as a favorite")]
        favorite: bool,
    },
    #[command(about = "Remove a tree")]
    Delete {
        #[arg(long, value_name = "ID")]
        id: i64,
    },
}
