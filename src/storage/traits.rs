use std::sync::Arc;

use crate::types::{NewTree, Tree, TreeId};

/// Persistence for the `trees` table. Every method is a single statement;
/// nothing spans more than one call.
pub trait Storage {
    /// All rows in store order, empty when nothing has been recorded.
    fn list_trees(&self) -> anyhow::Result<Vec<Tree>>;
    /// Persists `tree` and returns the stored row with its id and timestamp.
    fn create_tree(&self, tree: &NewTree) -> anyhow::Result<Tree>;
    fn load_tree(&self, id: TreeId) -> anyhow::Result<Option<Tree>>;
    /// Returns whether a row was removed. Deleting a missing id is not an error.
    fn delete_tree(&self, id: TreeId) -> anyhow::Result<bool>;
}

impl<T: Storage + ?Sized> Storage for Arc<T> {
    fn list_trees(&self) -> anyhow::Result<Vec<Tree>> {
        (**self).list_trees()
    }

    fn create_tree(&self, tree: &NewTree) -> anyhow::Result<Tree> {
        (**self).create_tree(tree)
    }

    fn load_tree(&self, id: TreeId) -> anyhow::Result<Option<Tree>> {
        (**self).load_tree(id)
    }

    fn delete_tree(&self, id: TreeId) -> anyhow::Result<bool> {
        (**self).delete_tree(id)
    }
}
