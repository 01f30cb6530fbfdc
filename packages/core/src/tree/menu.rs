//! Navigation menu projection
//!
//! The public site shows only visible entries. `HiddenNodePolicy` decides what
//! happens beneath a hidden entry: either the whole subtree disappears, or its
//! visible children move up into the hidden entry's slot.

use crate::models::{PageKind, HREF_KEY, SLUG_KEY};
use crate::tree::TreeNode;
use serde::{Deserialize, Serialize};

/// Treatment of visible descendants under a hidden node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HiddenNodePolicy {
    /// Drop the hidden node and everything below it
    #[default]
    Skip,
    /// Drop only the hidden node, lifting its projected children into its place
    SpliceChildren,
}

/// Menu entry sent to the site renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: String,
    pub title: String,
    pub kind: String,
    /// `/{slug}` for pages, the href for links, absent for containers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    pub children: Vec<MenuItem>,
}

/// Keep only visible nodes, applying `policy` under hidden ones
pub fn menu_forest(forest: &[TreeNode], policy: HiddenNodePolicy) -> Vec<TreeNode> {
    fold_forest(
        forest,
        |tree| tree.node.visible || policy == HiddenNodePolicy::SpliceChildren,
        |tree, children| {
            if tree.node.visible {
                vec![TreeNode {
                    node: tree.node.clone(),
                    children,
                }]
            } else {
                children
            }
        },
    )
}

/// Shape a (usually already projected) forest into renderer-facing items
pub fn to_menu_items(forest: &[TreeNode]) -> Vec<MenuItem> {
    fold_forest(
        forest,
        |_| true,
        |tree, children| {
            let node = &tree.node;
            let target = match node.node_type.parse::<PageKind>() {
                Ok(PageKind::Page) => node.property_str(SLUG_KEY).map(|slug| format!("/{slug}")),
                Ok(PageKind::Link) => node.property_str(HREF_KEY).map(str::to_string),
                _ => None,
            };
            vec![MenuItem {
                id: node.id.clone(),
                title: node.title.clone(),
                kind: node.node_type.clone(),
                target,
                children,
            }]
        },
    )
}

/// Post-order fold without recursion
///
/// `enter` decides whether a subtree is visited at all; `exit` receives a node
/// plus the folded output of its visited children and returns the items that
/// replace the node in its parent's list.
fn fold_forest<T, E, X>(forest: &[TreeNode], enter: E, mut exit: X) -> Vec<T>
where
    E: Fn(&TreeNode) -> bool,
    X: FnMut(&TreeNode, Vec<T>) -> Vec<T>,
{
    struct Frame<'a, T> {
        tree: &'a TreeNode,
        next_child: usize,
        folded: Vec<T>,
    }

    let mut out = Vec::new();

    for root in forest.iter().filter(|tree| enter(*tree)) {
        let mut stack = vec![Frame {
            tree: root,
            next_child: 0,
            folded: Vec::new(),
        }];

        while let Some(frame) = stack.last_mut() {
            let tree = frame.tree;
            if let Some(child) = tree.children.get(frame.next_child) {
                frame.next_child += 1;
                if enter(child) {
                    stack.push(Frame {
                        tree: child,
                        next_child: 0,
                        folded: Vec::new(),
                    });
                }
                continue;
            }

            let Some(done) = stack.pop() else { break };
            let items = exit(done.tree, done.folded);
            match stack.last_mut() {
                Some(parent) => parent.folded.extend(items),
                None => out.extend(items),
            }
        }
    }

    out
}
