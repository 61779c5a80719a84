use crate::cc::connected_components;
use crate::dijkstra::{ShortestPathTree, dijkstra_tree};
use crate::nexthop::CacheStats;
use crate::{Coord, Edge, NodeId};

/// Minimal graph interface: node and neighbour enumeration.
pub trait Pather {
    /// Append every node of the graph into `buf`, in ascending id order.
    /// The caller clears `buf` before calling.
    fn nodes(&self, buf: &mut Vec<NodeId>);

    /// Append the outgoing neighbours of `n` into `buf`. The caller clears
    /// `buf` before calling.
    fn neighbors(&self, n: NodeId, buf: &mut Vec<NodeId>);
}

/// Pather with weighted (positive-cost) edges.
pub trait WeightedPather: Pather {
    /// Cost of moving from `from` to adjacent `to`. Must be > 0.
    fn cost(&self, from: NodeId, to: NodeId) -> i64;
}

/// Node and edge registration primitives.
pub trait GraphStore: WeightedPather {
    /// Insert a node. Returns `false` if it already existed, in which case
    /// its coordinate is replaced when `coord` is `Some` and kept otherwise.
    fn add_node(&mut self, id: NodeId, coord: Option<Coord>) -> bool;

    /// Remove a node together with every edge touching it.
    fn remove_node(&mut self, id: NodeId) -> bool;

    /// Insert or re-weight the directed edge `from -> to`. Returns the
    /// previous weight if the edge already existed.
    fn add_edge(&mut self, from: NodeId, to: NodeId, weight: i32) -> Option<i32>;

    /// Remove the directed edge `from -> to`.
    fn remove_edge(&mut self, from: NodeId, to: NodeId) -> bool;

    fn contains_node(&self, id: NodeId) -> bool;

    fn edge_weight(&self, from: NodeId, to: NodeId) -> Option<i32>;

    fn coord(&self, id: NodeId) -> Option<Coord>;

    fn node_count(&self) -> usize;

    /// All directed edges, ordered by `(from, to)`.
    fn edges(&self) -> Vec<Edge>;

    /// Number of distinct nodes adjacent to `id` in either direction.
    fn degree(&self, id: NodeId) -> usize;
}

/// Single-source shortest paths.
pub trait ShortestPaths: WeightedPather {
    /// Full Dijkstra tree rooted at `source`.
    fn shortest_path_tree(&self, source: NodeId) -> ShortestPathTree {
        dijkstra_tree(self, source)
    }
}

/// Memoized `(source, destination) -> next node` answers.
pub trait NextHops {
    /// Adjacent node to move to from `source` towards `destination`, or
    /// `None` if unreachable. `next_hop(a, a)` is `Some(a)`.
    fn next_hop(&mut self, source: NodeId, destination: NodeId) -> Option<NodeId>;

    /// Shortest-path cost from `source` to `destination`.
    fn distance(&mut self, source: NodeId, destination: NodeId) -> Option<i64>;

    /// Drop every cached answer.
    fn invalidate_next_hops(&mut self);

    fn cache_stats(&self) -> CacheStats;
}

/// Connected-component detection.
pub trait Subgraphs: Pather {
    /// Weakly connected components. Each component is sorted and the list is
    /// ordered by smallest member.
    fn connected_components(&self) -> Vec<Vec<NodeId>> {
        connected_components(self)
    }
}

/// Everything a route zone needs from its graph.
pub trait GraphBackend: GraphStore + ShortestPaths + NextHops + Subgraphs {}

impl<T: GraphStore + ShortestPaths + NextHops + Subgraphs> GraphBackend for T {}
