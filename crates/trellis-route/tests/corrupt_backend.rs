//! A backend serving bogus next hops must make path walking abort.

use trellis_graph::{
    CacheStats, Coord, Edge, GraphStore, NextHops, NodeId, Pather, ShortestPaths, SimpleGraph,
    Subgraphs, WeightedPather,
};
use trellis_route::RouteZone;

/// Delegates storage to a `SimpleGraph` but always answers "stay put".
#[derive(Debug, Clone, Default)]
struct StuckGraph(SimpleGraph);

impl Pather for StuckGraph {
    fn nodes(&self, buf: &mut Vec<NodeId>) {
        self.0.nodes(buf)
    }

    fn neighbors(&self, n: NodeId, buf: &mut Vec<NodeId>) {
        self.0.neighbors(n, buf)
    }
}

impl WeightedPather for StuckGraph {
    fn cost(&self, from: NodeId, to: NodeId) -> i64 {
        self.0.cost(from, to)
    }
}

impl GraphStore for StuckGraph {
    fn add_node(&mut self, id: NodeId, coord: Option<Coord>) -> bool {
        self.0.add_node(id, coord)
    }
    fn remove_node(&mut self, id: NodeId) -> bool {
        self.0.remove_node(id)
    }
    fn add_edge(&mut self, from: NodeId, to: NodeId, weight: i32) -> Option<i32> {
        self.0.add_edge(from, to, weight)
    }
    fn remove_edge(&mut self, from: NodeId, to: NodeId) -> bool {
        self.0.remove_edge(from, to)
    }
    fn contains_node(&self, id: NodeId) -> bool {
        self.0.contains_node(id)
    }
    fn edge_weight(&self, from: NodeId, to: NodeId) -> Option<i32> {
        self.0.edge_weight(from, to)
    }
    fn coord(&self, id: NodeId) -> Option<Coord> {
        self.0.coord(id)
    }
    fn node_count(&self) -> usize {
        self.0.node_count()
    }
    fn edges(&self) -> Vec<Edge> {
        self.0.edges()
    }
    fn degree(&self, id: NodeId) -> usize {
        self.0.degree(id)
    }
}

impl ShortestPaths for StuckGraph {}

impl Subgraphs for StuckGraph {}

impl NextHops for StuckGraph {
    fn next_hop(&mut self, source: NodeId, _destination: NodeId) -> Option<NodeId> {
        Some(source)
    }
    fn distance(&mut self, source: NodeId, destination: NodeId) -> Option<i64> {
        self.0.distance(source, destination)
    }
    fn invalidate_next_hops(&mut self) {
        self.0.invalidate_next_hops()
    }
    fn cache_stats(&self) -> CacheStats {
        self.0.cache_stats()
    }
}

fn stuck_zone() -> RouteZone<StuckGraph> {
    let mut z = RouteZone::with_backend("stuck", StuckGraph::default());
    for i in 1..=3 {
        z.add_node(NodeId(i));
    }
    z.add_edge(NodeId(1), NodeId(2), 1).unwrap();
    z.add_edge(NodeId(2), NodeId(3), 1).unwrap();
    z
}

#[test]
#[should_panic(expected = "broke the path invariant")]
fn looping_next_hop_panics() {
    let mut z = stuck_zone();
    let _ = z.path(NodeId(1), NodeId(3));
}

#[test]
fn queries_that_do_not_walk_still_work() {
    let mut z = stuck_zone();
    assert_eq!(z.distance(NodeId(1), NodeId(3)).unwrap(), 2);
    assert!(z.is_connected());
}
