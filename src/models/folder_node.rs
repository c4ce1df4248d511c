use std::collections::BTreeMap;

use serde::Serialize;

/// One directory of the remote namespace. Built fresh on every tree load;
/// the `BTreeMap` keys children by segment name, which gives the rendering
/// projections their lexicographic sibling order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FolderNode {
    pub path: String,
    pub name: String,
    pub children: BTreeMap<String, FolderNode>,
}

impl FolderNode {
    pub fn new(path: &str, name: &str) -> Self {
        FolderNode {
            path: path.to_string(),
            name: name.to_string(),
            children: BTreeMap::new(),
        }
    }

    /// Looks a node up by its full path, e.g. `"a/b/c"` from the root.
    pub fn descend(&self, path: &str) -> Option<&FolderNode> {
        let mut node = self;
        for segment in crate::remote_path::segments(path) {
            node = node.children.get(segment)?;
        }
        Some(node)
    }
}
