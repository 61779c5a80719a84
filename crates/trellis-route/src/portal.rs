//! Zone-level search graph.
//!
//! Vertices are gateway nodes (plus the two endpoints of a query). Two
//! vertices are linked when they share a zone, weighted by their shortest
//! distance inside that zone. Dijkstra over this graph yields the cheapest
//! sequence of zones to cross, possibly through several intermediate zones.

use std::collections::BTreeMap;

use trellis_graph::{NodeId, Pather, UNREACHABLE, WeightedPather};

/// Snapshot of gateway declarations and zone topology a graph was built from.
pub(crate) type Stamp = (u64, Vec<(String, u64)>);

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Link {
    pub(crate) cost: i64,
    pub(crate) zone: String,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PortalGraph {
    links: BTreeMap<NodeId, BTreeMap<NodeId, Link>>,
    pub(crate) stamp: Stamp,
}

impl PortalGraph {
    /// Record a directed link, keeping the cheaper one if a link between the
    /// same vertices already exists. Equal costs keep the earlier zone.
    pub(crate) fn insert(&mut self, from: NodeId, to: NodeId, cost: i64, zone: &str) {
        let slot = self.links.entry(from).or_default();
        match slot.get(&to) {
            Some(l) if l.cost <= cost => {}
            _ => {
                slot.insert(
                    to,
                    Link {
                        cost,
                        zone: zone.to_string(),
                    },
                );
            }
        }
    }

    pub(crate) fn link(&self, from: NodeId, to: NodeId) -> Option<&Link> {
        self.links.get(&from).and_then(|m| m.get(&to))
    }

    #[cfg(test)]
    pub(crate) fn link_count(&self) -> usize {
        self.links.values().map(BTreeMap::len).sum()
    }
}

impl Pather for PortalGraph {
    fn nodes(&self, buf: &mut Vec<NodeId>) {
        let mut all: Vec<NodeId> = self
            .links
            .iter()
            .flat_map(|(&from, m)| std::iter::once(from).chain(m.keys().copied()))
            .collect();
        all.sort_unstable();
        all.dedup();
        buf.extend(all);
    }

    fn neighbors(&self, n: NodeId, buf: &mut Vec<NodeId>) {
        if let Some(m) = self.links.get(&n) {
            buf.extend(m.keys().copied());
        }
    }
}

impl WeightedPather for PortalGraph {
    fn cost(&self, from: NodeId, to: NodeId) -> i64 {
        self.link(from, to).map_or(UNREACHABLE, |l| l.cost)
    }
}
