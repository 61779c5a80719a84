use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::NodeId;
use crate::traits::WeightedPather;

/// Sentinel value meaning "unreachable" in cost queries.
///
/// Path costs are `i64` while edge weights are `i32`, so a sum along any
/// simple path fits.
pub const UNREACHABLE: i64 = i64::MAX;

/// Heap entry, ordered so the max-heap pops the cheapest node first and
/// breaks cost ties on the lowest id.
#[derive(Clone, Copy, Eq, PartialEq)]
struct NodeRef {
    node: NodeId,
    cost: i64,
}

impl Ord for NodeRef {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for NodeRef {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Result of a single-source Dijkstra run.
#[derive(Debug, Clone)]
pub struct ShortestPathTree {
    source: NodeId,
    costs: HashMap<NodeId, i64>,
    parents: HashMap<NodeId, NodeId>,
    order: Vec<NodeId>,
}

impl ShortestPathTree {
    /// The root of the tree.
    pub fn source(&self) -> NodeId {
        self.source
    }

    /// Reached nodes in the order they were settled (source first).
    pub fn reached(&self) -> &[NodeId] {
        &self.order
    }

    pub fn contains(&self, n: NodeId) -> bool {
        self.costs.contains_key(&n)
    }

    /// Cost from the source to `n`, or `None` if `n` was not reached.
    pub fn cost_to(&self, n: NodeId) -> Option<i64> {
        self.costs.get(&n).copied()
    }

    /// Cost from the source to `n`, or [`UNREACHABLE`].
    pub fn cost_at(&self, n: NodeId) -> i64 {
        self.cost_to(n).unwrap_or(UNREACHABLE)
    }

    /// Predecessor of `n` on its shortest path.
    pub fn parent(&self, n: NodeId) -> Option<NodeId> {
        self.parents.get(&n).copied()
    }

    /// Full path from the source to `n`, both endpoints included.
    pub fn path_to(&self, n: NodeId) -> Option<Vec<NodeId>> {
        if !self.contains(n) {
            return None;
        }
        let mut path = vec![n];
        let mut cur = n;
        while let Some(p) = self.parent(cur) {
            path.push(p);
            cur = p;
        }
        path.reverse();
        Some(path)
    }

    /// First step from the source towards every reached node. The source maps
    /// to itself.
    pub fn next_hops(&self) -> HashMap<NodeId, NodeId> {
        let mut hops = HashMap::with_capacity(self.order.len());
        hops.insert(self.source, self.source);
        // Parents are always settled before their children.
        for &n in self.order.iter().skip(1) {
            let Some(p) = self.parent(n) else {
                continue;
            };
            let hop = if p == self.source {
                n
            } else {
                match hops.get(&p) {
                    Some(&h) => h,
                    None => continue,
                }
            };
            hops.insert(n, hop);
        }
        hops
    }
}

/// Compute the shortest-path tree rooted at `source`.
///
/// The source is always part of the tree, even if the pather does not list
/// it. Costs that would overflow are treated as unreachable.
pub fn dijkstra_tree<P: WeightedPather + ?Sized>(pather: &P, source: NodeId) -> ShortestPathTree {
    let mut costs: HashMap<NodeId, i64> = HashMap::new();
    let mut parents: HashMap<NodeId, NodeId> = HashMap::new();
    let mut settled: HashSet<NodeId> = HashSet::new();
    let mut order = Vec::new();

    let mut open: BinaryHeap<NodeRef> = BinaryHeap::new();
    costs.insert(source, 0);
    open.push(NodeRef {
        node: source,
        cost: 0,
    });

    let mut nbuf = Vec::with_capacity(8);

    while let Some(current) = open.pop() {
        let cn = current.node;
        if settled.contains(&cn) {
            continue;
        }
        // Skip stale heap entries.
        if costs.get(&cn).is_some_and(|&c| c < current.cost) {
            continue;
        }
        settled.insert(cn);
        order.push(cn);

        nbuf.clear();
        pather.neighbors(cn, &mut nbuf);

        for &nn in nbuf.iter() {
            if settled.contains(&nn) {
                continue;
            }
            let step = pather.cost(cn, nn);
            debug_assert!(step > 0, "edge {cn} -> {nn} has non-positive cost {step}");
            let Some(tentative) = current.cost.checked_add(step) else {
                continue;
            };
            let better = match costs.get(&nn) {
                Some(&old) => {
                    tentative < old || (tentative == old && parents.get(&nn).is_some_and(|&p| cn < p))
                }
                None => true,
            };
            if !better {
                continue;
            }
            costs.insert(nn, tentative);
            parents.insert(nn, cn);
            open.push(NodeRef {
                node: nn,
                cost: tentative,
            });
        }
    }

    log::trace!("dijkstra from {source}: settled {} nodes", order.len());

    ShortestPathTree {
        source,
        costs,
        parents,
        order,
    }
}
