//! Snapshot queries over parent references
//!
//! `Hierarchy` indexes an already-fetched node list so the service layer can
//! answer ancestry questions (cycle checks, subtree collection, breadcrumbs)
//! without another round-trip to the store. Every walk tracks visited IDs, so
//! corrupted data containing a parent cycle cannot loop forever.

use crate::models::Node;
use std::collections::{HashMap, HashSet, VecDeque};

/// Default bound on upward walks, mirrors `SiteConfig::ancestor_walk_limit`
pub const DEFAULT_WALK_LIMIT: usize = 1000;

/// Adjacency index over a borrowed node snapshot
pub struct Hierarchy<'a> {
    by_id: HashMap<&'a str, &'a Node>,
    children: HashMap<&'a str, Vec<&'a Node>>,
    walk_limit: usize,
}

impl<'a> Hierarchy<'a> {
    /// Index a snapshot; for duplicate IDs the first occurrence wins
    pub fn new(nodes: &'a [Node]) -> Self {
        let mut by_id: HashMap<&str, &Node> = HashMap::with_capacity(nodes.len());
        for node in nodes {
            by_id.entry(node.id.as_str()).or_insert(node);
        }

        // input order, so the stable sort below breaks ties like `build_forest`
        let mut children: HashMap<&str, Vec<&Node>> = HashMap::new();
        for node in nodes {
            if !std::ptr::eq(by_id[node.id.as_str()], node) {
                continue;
            }
            if let Some(parent_id) = node.parent_id.as_deref() {
                children.entry(parent_id).or_default().push(node);
            }
        }
        for siblings in children.values_mut() {
            siblings.sort_by_key(|node| node.order);
        }

        Self {
            by_id,
            children,
            walk_limit: DEFAULT_WALK_LIMIT,
        }
    }

    /// Override the maximum number of upward steps per walk
    pub fn with_walk_limit(mut self, walk_limit: usize) -> Self {
        self.walk_limit = walk_limit;
        self
    }

    pub fn get(&self, id: &str) -> Option<&'a Node> {
        self.by_id.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Resolved parent, `None` for roots and dangling references
    pub fn parent_of(&self, id: &str) -> Option<&'a Node> {
        let parent_id = self.get(id)?.parent_id.as_deref()?;
        self.get(parent_id)
    }

    /// Direct children sorted by `order` (ties in input order)
    pub fn children_of(&self, id: &str) -> &[&'a Node] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether `candidate` sits strictly below `ancestor_id`
    ///
    /// Walks up from `candidate` comparing parent references against
    /// `ancestor_id`, so the answer is right even when `ancestor_id` is not in
    /// the snapshot yet (dangling references to it count). The walk stops at a
    /// root, an unknown node or an already visited node. Running out of walk
    /// budget counts as a descendant, so a move that cannot be verified is
    /// refused.
    pub fn is_descendant(&self, ancestor_id: &str, candidate: &str) -> bool {
        let mut visited = HashSet::new();
        let mut current = candidate;

        for _ in 0..self.walk_limit {
            let Some(parent_id) = self.get(current).and_then(|n| n.parent_id.as_deref()) else {
                return false;
            };
            if parent_id == ancestor_id {
                return true;
            }
            if !visited.insert(parent_id) {
                return false;
            }
            current = parent_id;
        }

        true
    }

    /// IDs of every node below `id`, breadth-first, excluding `id` itself
    pub fn descendant_ids(&self, id: &str) -> Vec<String> {
        let mut visited: HashSet<&str> = HashSet::from([id]);
        let mut queue: VecDeque<&str> = VecDeque::from([id]);
        let mut out = Vec::new();

        while let Some(current) = queue.pop_front() {
            for child in self.children_of(current) {
                if visited.insert(child.id.as_str()) {
                    out.push(child.id.clone());
                    queue.push_back(child.id.as_str());
                }
            }
        }

        out
    }

    /// Root-to-node path (breadcrumbs), including the node itself
    ///
    /// Returns an empty list for unknown IDs.
    pub fn ancestors_path(&self, id: &str) -> Vec<&'a Node> {
        let Some(mut current) = self.get(id) else {
            return Vec::new();
        };

        let mut visited = HashSet::new();
        let mut path = vec![current];
        visited.insert(current.id.as_str());

        while path.len() <= self.walk_limit {
            match self.parent_of(&current.id) {
                Some(parent) if visited.insert(parent.id.as_str()) => {
                    path.push(parent);
                    current = parent;
                }
                _ => break,
            }
        }

        path.reverse();
        path
    }
}

/// Whether `candidate` sits strictly below `ancestor_id` in `nodes`
pub fn is_descendant(nodes: &[Node], ancestor_id: &str, candidate: &str, walk_limit: usize) -> bool {
    Hierarchy::new(nodes)
        .with_walk_limit(walk_limit)
        .is_descendant(ancestor_id, candidate)
}

/// Every ID below `id` in `nodes`
pub fn descendant_ids(nodes: &[Node], id: &str) -> Vec<String> {
    Hierarchy::new(nodes).descendant_ids(id)
}

/// Root-to-node path for page headers
pub fn breadcrumbs(nodes: &[Node], id: &str) -> Vec<Node> {
    Hierarchy::new(nodes)
        .ancestors_path(id)
        .into_iter()
        .cloned()
        .collect()
}
