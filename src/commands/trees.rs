use anyhow::{Context, Result};

use crate::cli;
use crate::client::TreesClient;
use crate::types::NewTree;
use crate::ui;

impl cli::TreesCmd {
    pub async fn run(&self, client: &TreesClient) -> Result<()> {
        match self {
            cli::TreesCmd::List { search } => {
                let trees = client.list_trees().await.context("listing trees")?;
                log::debug!("fetched {} trees", trees.len());
                println!("{}", ui::render_list(&trees, search.as_deref()));
                Ok(())
            }
            cli::TreesCmd::Get { id } => {
                let tree = client
                    .get_tree(*id)
                    .await
                    .with_context(|| format!("fetching tree {id}"))?;
                match tree {
                    Some(tree) => {
                        print!("{}", ui::render_card(&tree));
                        Ok(())
                    }
                    None => anyhow::bail!("tree {id} not found"),
                }
            }
            cli::TreesCmd::Create {
                common_name,
                scientific_name,
                location,
                height,
                description,
                favorite,
            } => {
                let input = NewTree {
                    common_name: common_name.clone(),
                    scientific_name: scientific_name.clone(),
                    location: location.clone(),
                    height: *height,
                    description: description.clone(),
                    is_favorite: *favorite,
                };
                let tree = client.create_tree(&input).await?;
                print!("{}", ui::render_card(&tree));
                Ok(())
            }
            cli::TreesCmd::Delete { id } => {
                client.delete_tree(*id).await?;
                Ok(())
            }
        }
    }
}
