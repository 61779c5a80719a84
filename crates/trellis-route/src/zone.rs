//! A named partition of the world graph with its own next-hop cache.

use std::collections::BTreeSet;

use trellis_graph::{
    CacheStats, Coord, Edge, GraphBackend, NodeId, Pather, SimpleGraph, connected_components,
};

use crate::error::{Result, RouteError};
use crate::repair::RepairPolicy;

/// Unordered node pair, smaller id first.
pub(crate) fn pair(a: NodeId, b: NodeId) -> (NodeId, NodeId) {
    if a <= b { (a, b) } else { (b, a) }
}

/// A route zone: a set of nodes, the edges between them, and a graph backend
/// answering shortest-path questions for them.
///
/// Every topology change drops the whole next-hop cache. Queries take
/// `&mut self` because a miss fills the cache.
#[derive(Debug, Clone)]
pub struct RouteZone<B: GraphBackend = SimpleGraph> {
    name: String,
    graph: B,
    /// Edges added by subgraph repair rather than by the author.
    pub(crate) synthesized: BTreeSet<(NodeId, NodeId)>,
    policy: RepairPolicy,
    primary: Option<NodeId>,
    repair_cost: i32,
    generation: u64,
}

impl RouteZone<SimpleGraph> {
    /// Create an empty zone backed by a [`SimpleGraph`].
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_backend(name, SimpleGraph::new())
    }
}

impl<B: GraphBackend> RouteZone<B> {
    /// Create a zone around an existing backend. Nodes and edges already in
    /// the backend count as author-declared.
    pub fn with_backend(name: impl Into<String>, mut graph: B) -> Self {
        graph.invalidate_next_hops();
        Self {
            name: name.into(),
            graph,
            synthesized: BTreeSet::new(),
            policy: RepairPolicy::default(),
            primary: None,
            repair_cost: 1,
            generation: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn rename(&mut self, name: String) {
        self.name = name;
    }

    pub fn policy(&self) -> RepairPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: RepairPolicy) {
        self.policy = policy;
    }

    /// Node whose component is kept as the primary one during repair.
    pub fn primary(&self) -> Option<NodeId> {
        self.primary
    }

    pub fn set_primary(&mut self, node: Option<NodeId>) {
        self.primary = node;
    }

    /// Weight given to synthesized edges when coordinates are missing.
    pub fn repair_cost(&self) -> i32 {
        self.repair_cost
    }

    /// Set the flat repair cost. Values below 1 are clamped to 1.
    pub fn set_repair_cost(&mut self, cost: i32) {
        self.repair_cost = cost.max(1);
    }

    /// Bumped on every topology change.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Read-only access to the backend.
    pub fn backend(&self) -> &B {
        &self.graph
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.graph.cache_stats()
    }

    fn touch(&mut self) {
        self.graph.invalidate_next_hops();
        self.generation = self.generation.wrapping_add(1);
    }

    fn require(&self, id: NodeId) -> Result<()> {
        if self.graph.contains_node(id) {
            Ok(())
        } else {
            Err(RouteError::UnknownNode {
                node: id,
                scope: format!("zone `{}`", self.name),
            })
        }
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Add a node. Returns `false` if it was already a member, in which case
    /// its declared position is kept.
    pub fn add_node(&mut self, id: NodeId) -> bool {
        let fresh = self.graph.add_node(id, None);
        self.touch();
        fresh
    }

    /// Add a node with a declared map position (used by repair heuristics).
    pub fn add_node_at(&mut self, id: NodeId, at: Coord) -> bool {
        let fresh = self.graph.add_node(id, Some(at));
        self.touch();
        fresh
    }

    /// Remove a node and every edge touching it.
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        let removed = self.graph.remove_node(id);
        if removed {
            self.synthesized.retain(|&(a, b)| a != id && b != id);
        }
        self.touch();
        removed
    }

    fn check_edge(&self, a: NodeId, b: NodeId, weight: i32) -> Result<()> {
        self.require(a)?;
        self.require(b)?;
        if weight <= 0 {
            return Err(RouteError::InvalidWeight {
                from: a,
                to: b,
                weight,
            });
        }
        Ok(())
    }

    /// Declare a two-way passage between `a` and `b`.
    ///
    /// Re-declaring an existing edge replaces its weight; declaring an edge
    /// that repair had synthesized turns it into an author edge.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId, weight: i32) -> Result<()> {
        self.check_edge(a, b, weight)?;
        self.graph.add_edge(a, b, weight);
        self.graph.add_edge(b, a, weight);
        self.synthesized.remove(&pair(a, b));
        self.touch();
        Ok(())
    }

    /// Declare a passage usable only from `from` to `to`.
    ///
    /// If repair had synthesized a link between the two nodes, its reverse
    /// direction is dropped so only the author's edge remains.
    pub fn add_one_way_edge(&mut self, from: NodeId, to: NodeId, weight: i32) -> Result<()> {
        self.check_edge(from, to, weight)?;
        self.graph.add_edge(from, to, weight);
        if self.synthesized.remove(&pair(from, to)) {
            self.graph.remove_edge(to, from);
        }
        self.touch();
        Ok(())
    }

    /// Remove both directions of the edge between `a` and `b`.
    pub fn remove_edge(&mut self, a: NodeId, b: NodeId) -> bool {
        let ab = self.graph.remove_edge(a, b);
        let ba = self.graph.remove_edge(b, a);
        self.synthesized.remove(&pair(a, b));
        self.touch();
        ab || ba
    }

    /// Remove only the `from -> to` direction.
    pub fn remove_one_way_edge(&mut self, from: NodeId, to: NodeId) -> bool {
        let removed = self.graph.remove_edge(from, to);
        if self.graph.edge_weight(to, from).is_none() {
            self.synthesized.remove(&pair(from, to));
        }
        self.touch();
        removed
    }

    /// Insert a two-way edge on behalf of subgraph repair.
    pub(crate) fn add_synthesized_edge(&mut self, a: NodeId, b: NodeId, weight: i32) {
        self.graph.add_edge(a, b, weight);
        self.graph.add_edge(b, a, weight);
        self.synthesized.insert(pair(a, b));
        self.touch();
    }

    // -----------------------------------------------------------------------
    // Inspection
    // -----------------------------------------------------------------------

    pub fn contains(&self, id: NodeId) -> bool {
        self.graph.contains_node(id)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Member nodes in ascending order.
    pub fn nodes(&self) -> Vec<NodeId> {
        let mut buf = Vec::new();
        self.graph.nodes(&mut buf);
        buf
    }

    pub fn coord(&self, id: NodeId) -> Option<Coord> {
        self.graph.coord(id)
    }

    pub fn edge_weight(&self, from: NodeId, to: NodeId) -> Option<i32> {
        self.graph.edge_weight(from, to)
    }

    /// Every directed edge, author-declared and synthesized.
    pub fn edges(&self) -> Vec<Edge> {
        self.graph.edges()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edges().len()
    }

    /// Directed edges declared by the author.
    pub fn declared_edges(&self) -> Vec<Edge> {
        self.graph
            .edges()
            .into_iter()
            .filter(|e| !self.is_synthesized(e.from, e.to))
            .collect()
    }

    /// Whether the edge between `a` and `b` was added by subgraph repair.
    pub fn is_synthesized(&self, a: NodeId, b: NodeId) -> bool {
        self.synthesized.contains(&pair(a, b))
    }

    /// Number of distinct neighbours of `id`, in either direction.
    pub fn degree(&self, id: NodeId) -> usize {
        self.graph.degree(id)
    }

    /// Like [`degree`](Self::degree) but ignoring synthesized edges.
    pub fn declared_degree(&self, id: NodeId) -> usize {
        let view = DeclaredView { zone: self };
        let mut out = Vec::new();
        view.neighbors(id, &mut out);
        let mut adjacent: BTreeSet<NodeId> = out.into_iter().collect();
        for e in self.declared_edges() {
            if e.to == id {
                adjacent.insert(e.from);
            }
        }
        adjacent.remove(&id);
        adjacent.len()
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// The node to move to from `source` on a shortest path to `destination`.
    ///
    /// `next_hop(a, a)` is `a`. The first query from a source after an
    /// invalidation computes the whole shortest-path tree from it; later
    /// queries from that source are cache lookups.
    pub fn next_hop(&mut self, source: NodeId, destination: NodeId) -> Result<NodeId> {
        self.require(source)?;
        self.require(destination)?;
        self.graph
            .next_hop(source, destination)
            .ok_or_else(|| self.unreachable(source, destination))
    }

    /// Shortest-path cost from `source` to `destination`.
    pub fn distance(&mut self, source: NodeId, destination: NodeId) -> Result<i64> {
        self.require(source)?;
        self.require(destination)?;
        self.graph
            .distance(source, destination)
            .ok_or_else(|| self.unreachable(source, destination))
    }

    /// Full path from `source` to `destination`, built by following
    /// [`next_hop`](Self::next_hop) until the destination is reached.
    ///
    /// # Panics
    ///
    /// Panics if the walk visits more nodes than the zone holds or steps
    /// along an edge that does not exist. Either means the backend served a
    /// corrupt next-hop answer.
    pub fn path(&mut self, source: NodeId, destination: NodeId) -> Result<Vec<NodeId>> {
        self.require(source)?;
        self.require(destination)?;
        let limit = self.graph.node_count();
        let mut path = vec![source];
        let mut cur = source;
        while cur != destination {
            let hop = self.next_hop(cur, destination)?;
            if path.len() >= limit || self.graph.edge_weight(cur, hop).is_none() {
                log::error!(
                    "zone `{}`: corrupt next-hop walk {:?} -> {hop} towards {destination}",
                    self.name,
                    path
                );
                panic!(
                    "zone `{}`: next-hop walk from {source} to {destination} broke the path invariant at {cur} -> {hop}",
                    self.name
                );
            }
            path.push(hop);
            cur = hop;
        }
        Ok(path)
    }

    /// Sum of edge weights along `path`, or `None` if a step is not an edge.
    pub fn path_cost(&self, path: &[NodeId]) -> Option<i64> {
        path.windows(2).try_fold(0i64, |acc, w| {
            Some(acc + i64::from(self.graph.edge_weight(w[0], w[1])?))
        })
    }

    /// Whether the zone forms a single connected component. An empty zone
    /// counts as connected.
    pub fn is_connected(&self) -> bool {
        self.graph.connected_components().len() <= 1
    }

    /// Connected components over every edge, including synthesized ones.
    pub fn components(&self) -> Vec<Vec<NodeId>> {
        self.graph.connected_components()
    }

    /// Connected components over author-declared edges only.
    pub fn declared_components(&self) -> Vec<Vec<NodeId>> {
        connected_components(&DeclaredView { zone: self })
    }

    fn unreachable(&self, from: NodeId, to: NodeId) -> RouteError {
        RouteError::Unreachable {
            zone: self.name.clone(),
            from,
            to,
        }
    }
}

/// The zone graph with synthesized edges hidden.
struct DeclaredView<'a, B: GraphBackend> {
    zone: &'a RouteZone<B>,
}

impl<B: GraphBackend> Pather for DeclaredView<'_, B> {
    fn nodes(&self, buf: &mut Vec<NodeId>) {
        self.zone.graph.nodes(buf);
    }

    fn neighbors(&self, n: NodeId, buf: &mut Vec<NodeId>) {
        let start = buf.len();
        self.zone.graph.neighbors(n, buf);
        let mut i = start;
        while i < buf.len() {
            if self.zone.is_synthesized(n, buf[i]) {
                buf.swap_remove(i);
            } else {
                i += 1;
            }
        }
    }
}
