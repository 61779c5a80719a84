use std::collections::BTreeMap;

use crate::nexthop::{CacheStats, Lookup, NextHopCache};
use crate::traits::{GraphStore, NextHops, Pather, ShortestPaths, Subgraphs, WeightedPather};
use crate::{Coord, Edge, NodeId};

/// Adjacency-map graph with a built-in next-hop cache.
///
/// Nodes and edges are kept in ordered maps so every enumeration, and
/// therefore every search, is deterministic. Any mutation drops the cache.
#[derive(Debug, Clone, Default)]
pub struct SimpleGraph {
    nodes: BTreeMap<NodeId, Option<Coord>>,
    out: BTreeMap<NodeId, BTreeMap<NodeId, i32>>,
    cache: NextHopCache,
}

impl SimpleGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the edge in both directions with the same weight.
    pub fn add_undirected_edge(&mut self, a: NodeId, b: NodeId, weight: i32) {
        self.add_edge(a, b, weight);
        self.add_edge(b, a, weight);
    }

    /// Remove both directions of an edge. Returns `true` if either existed.
    pub fn remove_undirected_edge(&mut self, a: NodeId, b: NodeId) -> bool {
        let ab = self.remove_edge(a, b);
        let ba = self.remove_edge(b, a);
        ab || ba
    }

    /// Node ids in ascending order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    pub fn edge_count(&self) -> usize {
        self.out.values().map(BTreeMap::len).sum()
    }

    /// Make sure a tree for `source` is cached.
    fn ensure_source(&mut self, source: NodeId) {
        if self.cache.has_source(source) {
            return;
        }
        let tree = self.shortest_path_tree(source);
        self.cache.insert_tree(&tree);
    }
}

impl Pather for SimpleGraph {
    fn nodes(&self, buf: &mut Vec<NodeId>) {
        buf.extend(self.nodes.keys().copied());
    }

    fn neighbors(&self, n: NodeId, buf: &mut Vec<NodeId>) {
        if let Some(adj) = self.out.get(&n) {
            buf.extend(adj.keys().copied());
        }
    }
}

impl WeightedPather for SimpleGraph {
    fn cost(&self, from: NodeId, to: NodeId) -> i64 {
        self.edge_weight(from, to)
            .map_or(crate::UNREACHABLE, i64::from)
    }
}

impl GraphStore for SimpleGraph {
    fn add_node(&mut self, id: NodeId, coord: Option<Coord>) -> bool {
        match self.nodes.get_mut(&id) {
            Some(slot) => {
                if coord.is_some() {
                    *slot = coord;
                }
                false
            }
            None => {
                self.nodes.insert(id, coord);
                self.cache.invalidate();
                true
            }
        }
    }

    fn remove_node(&mut self, id: NodeId) -> bool {
        if self.nodes.remove(&id).is_none() {
            return false;
        }
        self.out.remove(&id);
        for adj in self.out.values_mut() {
            adj.remove(&id);
        }
        self.cache.invalidate();
        true
    }

    fn add_edge(&mut self, from: NodeId, to: NodeId, weight: i32) -> Option<i32> {
        debug_assert!(weight > 0, "edge {from} -> {to} has non-positive weight {weight}");
        let prev = self.out.entry(from).or_default().insert(to, weight);
        self.cache.invalidate();
        prev
    }

    fn remove_edge(&mut self, from: NodeId, to: NodeId) -> bool {
        let Some(adj) = self.out.get_mut(&from) else {
            return false;
        };
        let removed = adj.remove(&to).is_some();
        if adj.is_empty() {
            self.out.remove(&from);
        }
        if removed {
            self.cache.invalidate();
        }
        removed
    }

    fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    fn edge_weight(&self, from: NodeId, to: NodeId) -> Option<i32> {
        self.out.get(&from).and_then(|adj| adj.get(&to)).copied()
    }

    fn coord(&self, id: NodeId) -> Option<Coord> {
        self.nodes.get(&id).copied().flatten()
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn edges(&self) -> Vec<Edge> {
        self.out
            .iter()
            .flat_map(|(&from, adj)| {
                adj.iter().map(move |(&to, &weight)| Edge { from, to, weight })
            })
            .collect()
    }

    fn degree(&self, id: NodeId) -> usize {
        let mut adjacent: Vec<NodeId> = self
            .out
            .get(&id)
            .map(|adj| adj.keys().copied().collect())
            .unwrap_or_default();
        for (&from, adj) in &self.out {
            if adj.contains_key(&id) {
                adjacent.push(from);
            }
        }
        adjacent.sort_unstable();
        adjacent.dedup();
        adjacent.retain(|&n| n != id);
        adjacent.len()
    }
}

impl ShortestPaths for SimpleGraph {}

impl Subgraphs for SimpleGraph {}

impl NextHops for SimpleGraph {
    fn next_hop(&mut self, source: NodeId, destination: NodeId) -> Option<NodeId> {
        if !self.contains_node(source) || !self.contains_node(destination) {
            return None;
        }
        let lookup = match self.cache.next_hop(source, destination) {
            Lookup::Miss => {
                self.ensure_source(source);
                self.cache.next_hop(source, destination)
            }
            found => found,
        };
        match lookup {
            Lookup::Found(h) => Some(h),
            Lookup::Unreachable | Lookup::Miss => None,
        }
    }

    fn distance(&mut self, source: NodeId, destination: NodeId) -> Option<i64> {
        if !self.contains_node(source) || !self.contains_node(destination) {
            return None;
        }
        let lookup = match self.cache.cost(source, destination) {
            Lookup::Miss => {
                self.ensure_source(source);
                self.cache.cost(source, destination)
            }
            found => found,
        };
        match lookup {
            Lookup::Found(c) => Some(c),
            Lookup::Unreachable | Lookup::Miss => None,
        }
    }

    fn invalidate_next_hops(&mut self) {
        self.cache.invalidate();
    }

    fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
