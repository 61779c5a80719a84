//! Memoized next-hop answers.
//!
//! The cache is filled one source at a time: a miss for `(source, _)`
//! computes the whole shortest-path tree from `source`, so every later query
//! from the same source is a map lookup until the next invalidation.

use std::collections::HashMap;

use crate::NodeId;
use crate::dijkstra::ShortestPathTree;

/// Outcome of a cache lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<T> {
    /// No tree cached for this source yet.
    Miss,
    /// The source is cached and the destination is not reachable from it.
    Unreachable,
    Found(T),
}

/// Counters describing cache behaviour since creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Number of source trees inserted.
    pub fills: u64,
    /// Bumped on every invalidation; answers from older generations are gone.
    pub generation: u64,
    /// Number of sources currently cached.
    pub sources: usize,
}

#[derive(Debug, Clone)]
struct Row {
    hops: HashMap<NodeId, NodeId>,
    costs: HashMap<NodeId, i64>,
}

/// Per-source table of next hops and path costs.
#[derive(Debug, Clone, Default)]
pub struct NextHopCache {
    rows: HashMap<NodeId, Row>,
    generation: u64,
    hits: u64,
    misses: u64,
    fills: u64,
}

impl NextHopCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a tree rooted at `source` is cached.
    pub fn has_source(&self, source: NodeId) -> bool {
        self.rows.contains_key(&source)
    }

    /// Store every answer derivable from `tree`, replacing any previous row
    /// for the same source.
    pub fn insert_tree(&mut self, tree: &ShortestPathTree) {
        let hops = tree.next_hops();
        let costs = tree
            .reached()
            .iter()
            .filter_map(|&n| tree.cost_to(n).map(|c| (n, c)))
            .collect();
        self.rows.insert(tree.source(), Row { hops, costs });
        self.fills += 1;
        log::debug!(
            "next-hop cache: filled source {} (generation {})",
            tree.source(),
            self.generation
        );
    }

    /// Look up the next hop from `source` towards `destination`.
    pub fn next_hop(&mut self, source: NodeId, destination: NodeId) -> Lookup<NodeId> {
        match self.rows.get(&source) {
            None => {
                self.misses += 1;
                Lookup::Miss
            }
            Some(row) => {
                self.hits += 1;
                match row.hops.get(&destination) {
                    Some(&h) => Lookup::Found(h),
                    None => Lookup::Unreachable,
                }
            }
        }
    }

    /// Look up the path cost from `source` to `destination`.
    pub fn cost(&mut self, source: NodeId, destination: NodeId) -> Lookup<i64> {
        match self.rows.get(&source) {
            None => {
                self.misses += 1;
                Lookup::Miss
            }
            Some(row) => {
                self.hits += 1;
                match row.costs.get(&destination) {
                    Some(&c) => Lookup::Found(c),
                    None => Lookup::Unreachable,
                }
            }
        }
    }

    /// Drop every row.
    pub fn invalidate(&mut self) {
        if !self.rows.is_empty() {
            log::debug!(
                "next-hop cache: invalidating {} sources (generation {})",
                self.rows.len(),
                self.generation
            );
        }
        self.rows.clear();
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            fills: self.fills,
            generation: self.generation,
            sources: self.rows.len(),
        }
    }
}
