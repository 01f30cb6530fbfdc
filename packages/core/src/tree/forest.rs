//! Forest construction from a flat node list
//!
//! Builds the nested structure consumed by the navigation menu and the org
//! chart. Construction is pure and iterative:
//!
//! 1. Index every node by ID (first occurrence of a duplicate ID wins)
//! 2. Attach each node to its parent when the parent resolves, otherwise
//!    make it a root (dangling references fail safe)
//! 3. Sort siblings by `order`, ties kept in input order
//! 4. Walk from the roots; anything left unreached sits on a stored cycle and
//!    is promoted to root at its earliest cycle member
//! 5. Assemble `TreeNode`s bottom-up in reverse discovery order

use crate::models::Node;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// A node together with its ordered children
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    #[serde(flatten)]
    pub node: Node,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Leaf wrapper around a node
    pub fn leaf(node: Node) -> Self {
        Self {
            node,
            children: Vec::new(),
        }
    }

    /// Number of nodes in this subtree, including itself
    pub fn size(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(tree) = stack.pop() {
            count += 1;
            stack.extend(tree.children.iter());
        }
        count
    }
}

/// Total number of nodes across a forest
pub fn forest_size(forest: &[TreeNode]) -> usize {
    forest.iter().map(TreeNode::size).sum()
}

/// Convert a flat list of nodes into an ordered forest.
///
/// Every distinct input node appears exactly once in the output. The input is
/// never modified; nodes are cloned into the result.
///
/// # Examples
///
/// ```rust
/// use schoolsite_core::models::Node;
/// use schoolsite_core::tree::build_forest;
/// use serde_json::json;
///
/// let nodes = vec![
///     Node::new_with_id("b", "page", "B", Some("a".into()), json!({})).with_order(2),
///     Node::new_with_id("a", "page", "A", None, json!({})),
///     Node::new_with_id("c", "page", "C", Some("a".into()), json!({})).with_order(1),
///     Node::new_with_id("d", "page", "D", Some("gone".into()), json!({})),
/// ];
///
/// let forest = build_forest(&nodes);
/// assert_eq!(forest.len(), 2); // "a" and the orphan "d"
/// let kids: Vec<_> = forest[0].children.iter().map(|t| t.node.id.as_str()).collect();
/// assert_eq!(kids, ["c", "b"]);
/// ```
pub fn build_forest(nodes: &[Node]) -> Vec<TreeNode> {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(nodes.len());
    let mut unique: Vec<&Node> = Vec::with_capacity(nodes.len());

    for node in nodes {
        if index.contains_key(node.id.as_str()) {
            warn!(node_id = %node.id, "Duplicate node id ignored while building forest");
            continue;
        }
        index.insert(node.id.as_str(), unique.len());
        unique.push(node);
    }

    let count = unique.len();
    let mut parent_of: Vec<Option<usize>> = vec![None; count];
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); count];
    let mut roots: Vec<usize> = Vec::new();

    for (i, node) in unique.iter().enumerate() {
        match node.parent_id.as_deref().and_then(|p| index.get(p)) {
            Some(&parent) if parent != i => {
                parent_of[i] = Some(parent);
                children[parent].push(i);
            }
            resolved => {
                if node.parent_id.is_some() && resolved.is_none() {
                    debug!(
                        node_id = %node.id,
                        parent_id = ?node.parent_id,
                        "Dangling parent reference, treating node as root"
                    );
                }
                roots.push(i);
            }
        }
    }

    let sort_key = |&i: &usize| (unique[i].order, i);
    for siblings in children.iter_mut() {
        siblings.sort_by_key(sort_key);
    }
    roots.sort_by_key(sort_key);

    let mut walk = Walk::new(count);
    for &root in &roots {
        walk.discover(root, &children);
    }

    // Nodes still unvisited hang off a parent cycle stored in the data
    let mut promoted = Vec::new();
    for i in 0..count {
        if walk.visited[i] {
            continue;
        }
        let root = cycle_entry(i, &parent_of);
        warn!(
            node_id = %unique[root].id,
            "Parent cycle in stored nodes, promoting node to root"
        );
        promoted.push(root);
        walk.discover(root, &children);
    }

    if !promoted.is_empty() {
        roots.extend(promoted);
        roots.sort_by_key(sort_key);
    }

    walk.assemble(&unique, &roots)
}

/// Earliest (by input position) member of the cycle reached by walking up from `start`
fn cycle_entry(start: usize, parent_of: &[Option<usize>]) -> usize {
    let mut seen = HashSet::new();
    let mut current = start;

    while seen.insert(current) {
        match parent_of[current] {
            Some(parent) => current = parent,
            // Unreachable for unvisited nodes, kept total anyway
            None => return current,
        }
    }

    let mut earliest = current;
    let mut member = parent_of[current].unwrap_or(current);
    while member != current {
        earliest = earliest.min(member);
        member = parent_of[member].unwrap_or(current);
    }
    earliest
}

/// Traversal state shared by the root walk and cycle promotion
struct Walk {
    visited: Vec<bool>,
    tree_children: Vec<Vec<usize>>,
    discovery: Vec<usize>,
}

impl Walk {
    fn new(count: usize) -> Self {
        Self {
            visited: vec![false; count],
            tree_children: vec![Vec::new(); count],
            discovery: Vec::with_capacity(count),
        }
    }

    /// Depth-first discovery with an explicit stack; each node gets exactly one tree parent
    fn discover(&mut self, start: usize, children: &[Vec<usize>]) {
        if self.visited[start] {
            return;
        }
        self.visited[start] = true;
        self.discovery.push(start);

        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            for &child in &children[current] {
                if self.visited[child] {
                    continue;
                }
                self.visited[child] = true;
                self.discovery.push(child);
                self.tree_children[current].push(child);
                stack.push(child);
            }
        }
    }

    /// Build subtrees children-first, then hand back the roots in order
    fn assemble(mut self, unique: &[&Node], roots: &[usize]) -> Vec<TreeNode> {
        let mut slots: Vec<Option<TreeNode>> = vec![None; unique.len()];

        for &current in self.discovery.iter().rev() {
            let kids = std::mem::take(&mut self.tree_children[current])
                .into_iter()
                .filter_map(|child| slots[child].take())
                .collect();
            slots[current] = Some(TreeNode {
                node: unique[current].clone(),
                children: kids,
            });
        }

        roots.iter().filter_map(|&root| slots[root].take()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(id: &str, parent: Option<&str>, order: i64) -> Node {
        Node::new_with_id(id, "page", id.to_uppercase(), parent.map(str::to_string), json!({}))
            .with_order(order)
    }

    fn ids(forest: &[TreeNode]) -> Vec<&str> {
        forest.iter().map(|t| t.node.id.as_str()).collect()
    }

    fn all_ids(forest: &[TreeNode]) -> Vec<String> {
        let mut out = Vec::new();
        let mut stack: Vec<&TreeNode> = forest.iter().collect();
        while let Some(tree) = stack.pop() {
            out.push(tree.node.id.clone());
            stack.extend(tree.children.iter());
        }
        out.sort();
        out
    }

    #[test]
    fn test_empty_input() {
        assert!(build_forest(&[]).is_empty());
    }

    #[test]
    fn test_nested_structure() {
        let nodes = vec![
            node("root", None, 0),
            node("child", Some("root"), 0),
            node("grandchild", Some("child"), 0),
        ];

        let forest = build_forest(&nodes);

        assert_eq!(ids(&forest), ["root"]);
        assert_eq!(ids(&forest[0].children), ["child"]);
        assert_eq!(ids(&forest[0].children[0].children), ["grandchild"]);
    }

    #[test]
    fn test_every_node_appears_once() {
        let nodes = vec![
            node("a", None, 0),
            node("b", Some("a"), 1),
            node("c", Some("a"), 0),
            node("d", Some("c"), 0),
            node("e", Some("missing"), 0),
            node("f", None, 5),
            node("g", Some("f"), 0),
        ];

        let forest = build_forest(&nodes);

        assert_eq!(forest_size(&forest), nodes.len());
        assert_eq!(all_ids(&forest), ["a", "b", "c", "d", "e", "f", "g"]);
    }

    #[test]
    fn test_dangling_parent_becomes_root() {
        let nodes = vec![node("orphan", Some("deleted-parent"), 0)];
        let forest = build_forest(&nodes);

        assert_eq!(ids(&forest), ["orphan"]);
        assert!(forest[0].children.is_empty());
    }

    #[test]
    fn test_siblings_sorted_by_order_stable() {
        let nodes = vec![
            node("p", None, 0),
            node("x", Some("p"), 2),
            node("y", Some("p"), 1),
            node("z", Some("p"), 2),
            node("w", Some("p"), 1),
            node("v", Some("p"), -3),
        ];

        let forest = build_forest(&nodes);

        assert_eq!(ids(&forest[0].children), ["v", "y", "w", "x", "z"]);
    }

    #[test]
    fn test_roots_sorted_by_order() {
        let nodes = vec![node("late", None, 9), node("early", None, 1), node("mid", None, 5)];
        assert_eq!(ids(&build_forest(&nodes)), ["early", "mid", "late"]);
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let mut second = node("a", None, 0);
        second.title = "Second".to_string();
        let nodes = vec![node("a", None, 0), second];

        let forest = build_forest(&nodes);

        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].node.title, "A");
    }

    #[test]
    fn test_self_parent_is_root() {
        let nodes = vec![node("loop", Some("loop"), 0)];
        assert_eq!(ids(&build_forest(&nodes)), ["loop"]);
    }

    #[test]
    fn test_stored_cycle_is_broken_at_earliest_member() {
        // tail -> b -> c -> b ... "tail" is listed first but is not on the cycle
        let nodes = vec![
            node("tail", Some("c"), 0),
            node("b", Some("c"), 0),
            node("c", Some("b"), 1),
            node("solo", None, 0),
        ];

        let forest = build_forest(&nodes);

        assert_eq!(forest_size(&forest), 4);
        assert_eq!(ids(&forest), ["b", "solo"]);
        let b = &forest[0];
        assert_eq!(ids(&b.children), ["c"]);
        assert_eq!(ids(&b.children[0].children), ["tail"]);
    }

    #[test]
    fn test_pure_and_repeatable() {
        let nodes = vec![
            node("a", None, 1),
            node("b", Some("a"), 0),
            node("c", Some("zz"), 0),
        ];
        let snapshot = nodes.clone();

        let first = build_forest(&nodes);
        let second = build_forest(&nodes);

        assert_eq!(first, second);
        assert_eq!(nodes, snapshot);
    }

    #[test]
    fn test_deep_chain_does_not_recurse() {
        let depth = 10_000;
        let mut nodes = vec![node("n0", None, 0)];
        for i in 1..depth {
            nodes.push(node(&format!("n{i}"), Some(&format!("n{}", i - 1)), 0));
        }

        let forest = build_forest(&nodes);

        assert_eq!(forest.len(), 1);
        assert_eq!(forest_size(&forest), depth);

        // Tear down iteratively so the test itself does not overflow on drop
        let mut pending = forest;
        while let Some(mut tree) = pending.pop() {
            pending.append(&mut tree.children);
        }
    }

    #[test]
    fn test_tree_node_serializes_flat_with_children() {
        let forest = build_forest(&[node("a", None, 0), node("b", Some("a"), 0)]);
        let json = serde_json::to_value(&forest[0]).unwrap();

        assert_eq!(json["id"], "a");
        assert_eq!(json["children"][0]["id"], "b");
        assert_eq!(json["children"][0]["parentId"], "a");
    }
}
