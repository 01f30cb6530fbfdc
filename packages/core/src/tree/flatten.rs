//! Depth-annotated pre-order listing of a forest
//!
//! Admin screens render the hierarchy as an indented list (parent pickers,
//! sortable tables), which is easier to produce from a flat sequence than from
//! nested `TreeNode`s.

use crate::models::Node;
use crate::tree::TreeNode;
use serde::{Deserialize, Serialize};

/// One row of a flattened forest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatEntry {
    pub node: Node,
    /// Distance from the root (roots are depth 0)
    pub depth: usize,
}

/// Pre-order flatten, children in their stored order
pub fn flatten(forest: &[TreeNode]) -> Vec<FlatEntry> {
    let mut out = Vec::new();
    let mut stack: Vec<(&TreeNode, usize)> = forest.iter().rev().map(|tree| (tree, 0)).collect();

    while let Some((tree, depth)) = stack.pop() {
        out.push(FlatEntry {
            node: tree.node.clone(),
            depth,
        });
        stack.extend(tree.children.iter().rev().map(|child| (child, depth + 1)));
    }

    out
}
