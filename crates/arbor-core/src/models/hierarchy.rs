//! Read views assembled by the directory service.

use serde::{Deserialize, Serialize};

use super::member::Member;
use super::node::Node;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeWithMembers {
    #[serde(flatten)]
    pub node: Node,
    pub members: Vec<Member>,
}

/// A node with its nested children, in name order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeTree {
    #[serde(flatten)]
    pub node: Node,
    pub children: Vec<NodeTree>,
}

impl NodeTree {
    /// Number of nodes in this subtree, including the root.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(NodeTree::node_count).sum::<usize>()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hierarchy {
    pub node: Node,
    /// Root first, immediate parent last.
    pub ancestors: Vec<Node>,
    /// Pre-order: each child followed by its own subtree.
    pub descendants: Vec<Node>,
}

/// Direct-member statistics. Members of descendant nodes are not counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeStats {
    pub total_members: u64,
    pub active_members: u64,
    pub disabled_members: u64,
    pub child_group_count: u64,
}
