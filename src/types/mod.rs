mod new_tree;
mod tree;
mod tree_error;

pub use new_tree::NewTree;
pub use tree::{Tree, TreeId};
pub use tree_error::ValidationError;
