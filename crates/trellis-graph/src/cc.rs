//! Connected-component labelling.
//!
//! Connectivity is weak: an edge joins its endpoints regardless of its
//! direction, so a one-way passage still counts as a link between two parts
//! of a zone.

use std::collections::{BTreeMap, BTreeSet};

use crate::NodeId;
use crate::traits::Pather;

/// Undirected adjacency built from the pather's outgoing neighbours.
fn undirected<P: Pather + ?Sized>(pather: &P) -> BTreeMap<NodeId, BTreeSet<NodeId>> {
    let mut nodes = Vec::new();
    pather.nodes(&mut nodes);

    let mut adj: BTreeMap<NodeId, BTreeSet<NodeId>> =
        nodes.iter().map(|&n| (n, BTreeSet::new())).collect();
    let mut nbuf = Vec::with_capacity(8);
    for &n in &nodes {
        nbuf.clear();
        pather.neighbors(n, &mut nbuf);
        for &m in &nbuf {
            if !adj.contains_key(&m) {
                continue;
            }
            adj.entry(n).or_default().insert(m);
            adj.entry(m).or_default().insert(n);
        }
    }
    adj
}

/// Label every node with a component and return the components.
///
/// Each component is sorted ascending and the components are ordered by their
/// smallest member. An empty graph has no components.
pub fn connected_components<P: Pather + ?Sized>(pather: &P) -> Vec<Vec<NodeId>> {
    let adj = undirected(pather);
    let mut labelled: BTreeSet<NodeId> = BTreeSet::new();
    let mut components = Vec::new();
    let mut stack = Vec::new();

    // BTreeMap iteration is ascending, so components come out ordered.
    for &start in adj.keys() {
        if labelled.contains(&start) {
            continue;
        }

        // Iterative DFS from `start`.
        let mut comp = vec![start];
        labelled.insert(start);
        stack.clear();
        stack.push(start);

        while let Some(cur) = stack.pop() {
            let Some(ns) = adj.get(&cur) else {
                continue;
            };
            for &m in ns {
                if labelled.insert(m) {
                    comp.push(m);
                    stack.push(m);
                }
            }
        }

        comp.sort_unstable();
        components.push(comp);
    }

    components
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GraphStore, SimpleGraph};

    fn ids(v: &[u32]) -> Vec<NodeId> {
        v.iter().map(|&i| NodeId(i)).collect()
    }

    fn two_pairs() -> SimpleGraph {
        let mut g = SimpleGraph::new();
        for i in 1..=4 {
            g.add_node(NodeId(i), None);
        }
        g.add_undirected_edge(NodeId(1), NodeId(2), 1);
        g.add_undirected_edge(NodeId(3), NodeId(4), 1);
        g
    }

    #[test]
    fn finds_each_pair() {
        let comps = connected_components(&two_pairs());
        assert_eq!(comps, vec![ids(&[1, 2]), ids(&[3, 4])]);
    }

    #[test]
    fn one_way_edges_join_components() {
        let mut g = two_pairs();
        g.add_edge(NodeId(4), NodeId(1), 3);
        assert_eq!(connected_components(&g), vec![ids(&[1, 2, 3, 4])]);
    }

    #[test]
    fn isolated_nodes_are_singletons() {
        let mut g = two_pairs();
        g.add_node(NodeId(0), None);
        let comps = connected_components(&g);
        assert_eq!(comps.len(), 3);
        assert_eq!(comps[0], ids(&[0]));
    }

    #[test]
    fn empty_graph_has_no_components() {
        assert!(connected_components(&SimpleGraph::new()).is_empty());
    }
}
