//! In-memory forest assembly from a tenant's flat node list.

use std::collections::HashMap;

use arbor_core::models::hierarchy::NodeTree;
use arbor_core::models::node::Node;
use tracing::warn;
use uuid::Uuid;

/// Link a flat, name-ordered node list into a forest.
///
/// Sibling order follows input order. A node whose parent is absent from
/// `nodes` (orphaned out of band) is returned as a root instead of being
/// dropped. Nodes on a stored parent loop, unreachable from any root, are
/// also surfaced as roots, so the forest always holds every input node.
pub fn build_forest(nodes: Vec<Node>) -> Vec<NodeTree> {
    let index: HashMap<Uuid, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, node)| (node.id, i))
        .collect();

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    let mut roots = Vec::new();
    for (i, node) in nodes.iter().enumerate() {
        match node.parent_id.map(|p| (p, index.get(&p))) {
            None => roots.push(i),
            Some((_, Some(&parent))) if parent != i => children[parent].push(i),
            Some((parent_id, _)) => {
                warn!(
                    node_id = %node.id,
                    parent_id = %parent_id,
                    "Node parent not found in tenant; treating as root"
                );
                roots.push(i);
            }
        }
    }

    let mut slots: Vec<Option<Node>> = nodes.into_iter().map(Some).collect();
    let mut built: Vec<Option<NodeTree>> = (0..slots.len()).map(|_| None).collect();
    let mut claimed = vec![false; slots.len()];

    let mut forest: Vec<NodeTree> = roots
        .into_iter()
        .filter_map(|root| assemble(root, &children, &mut slots, &mut built, &mut claimed))
        .collect();

    for i in 0..slots.len() {
        if claimed[i] {
            continue;
        }
        if let Some(node) = &slots[i] {
            warn!(node_id = %node.id, "Node sits on a parent loop; treating as root");
        }
        if let Some(tree) = assemble(i, &children, &mut slots, &mut built, &mut claimed) {
            forest.push(tree);
        }
    }

    forest
}

/// Build the subtree under `root` without recursion: collect a pre-order
/// with an explicit stack, then fold it back in reverse so every child is
/// finished before its parent.
fn assemble(
    root: usize,
    children: &[Vec<usize>],
    slots: &mut [Option<Node>],
    built: &mut [Option<NodeTree>],
    claimed: &mut [bool],
) -> Option<NodeTree> {
    let mut order = Vec::new();
    let mut stack = vec![root];
    while let Some(i) = stack.pop() {
        if claimed[i] {
            continue;
        }
        claimed[i] = true;
        order.push(i);
        stack.extend(children[i].iter().rev().copied());
    }

    for &i in order.iter().rev() {
        let node = slots[i].take()?;
        let kids = children[i]
            .iter()
            .filter_map(|&c| built[c].take())
            .collect();
        built[i] = Some(NodeTree {
            node,
            children: kids,
        });
    }

    built[root].take()
}

/// Total node count of a forest, roots included.
pub fn forest_size(forest: &[NodeTree]) -> usize {
    forest.iter().map(NodeTree::node_count).sum()
}
