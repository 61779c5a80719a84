//! Subgraph detection and repair.
//!
//! A zone whose graph falls apart into several connected components usually
//! means the author forgot an edge. Under [`RepairPolicy::Connect`] every
//! secondary component gets one synthesized two-way edge to the primary
//! component, so next-hop queries inside the zone cannot fail for that reason.
//!
//! # Choosing the edge
//!
//! The primary component is the one holding the zone's designated primary
//! node, or else the largest one (ties go to the component with the lowest
//! node id). Each other component, taken in order of its lowest node id, is
//! linked by the pair `(u, v)` with `u` in the component and `v` in the
//! primary that minimises the Manhattan distance between their declared
//! coordinates. Pairs where either node has no coordinate rank after every
//! pair that has both. Remaining ties go to the lowest `(u, v)`.
//!
//! The synthesized weight is the coordinate distance (at least 1) or the
//! zone's flat repair cost when coordinates are missing.

use trellis_graph::{GraphBackend, NodeId, manhattan};

use crate::zone::RouteZone;

/// What to do when a zone is found to be disconnected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RepairPolicy {
    /// Synthesize connecting edges.
    #[default]
    Connect,
    /// Leave the zone alone and only report its components. Use this for
    /// zones that are split on purpose, e.g. by a locked door.
    ReportOnly,
}

/// An edge added by repair. Always two-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SynthesizedEdge {
    /// Node in the component being attached.
    pub from: NodeId,
    /// Node in the primary component.
    pub to: NodeId,
    pub weight: i32,
}

/// Connectivity analysis of one zone.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SubgraphReport {
    pub zone: String,
    pub policy: RepairPolicy,
    /// Components found before any repair of this pass.
    pub components: Vec<Vec<NodeId>>,
    /// Edges added by this pass.
    pub synthesized: Vec<SynthesizedEdge>,
    /// Connectivity once the pass finished.
    pub connected: bool,
}

impl SubgraphReport {
    /// Whether the zone was split when analysed.
    pub fn was_disconnected(&self) -> bool {
        self.components.len() > 1
    }

    /// Whether this pass changed the zone.
    pub fn repaired(&self) -> bool {
        !self.synthesized.is_empty()
    }
}

/// Ranking key for a candidate link; smaller is better.
type LinkKey = (bool, i32, NodeId, NodeId);

fn primary_index<B: GraphBackend>(zone: &RouteZone<B>, components: &[Vec<NodeId>]) -> usize {
    if let Some(p) = zone.primary() {
        if let Some(i) = components.iter().position(|c| c.binary_search(&p).is_ok()) {
            return i;
        }
        log::warn!(
            "zone `{}`: primary node {p} is not a member, falling back to the largest component",
            zone.name()
        );
    }
    // Components are ordered by lowest id, so the first maximum wins ties.
    let mut best = 0;
    for (i, c) in components.iter().enumerate() {
        if c.len() > components[best].len() {
            best = i;
        }
    }
    best
}

fn best_link<B: GraphBackend>(
    zone: &RouteZone<B>,
    component: &[NodeId],
    primary: &[NodeId],
) -> Option<SynthesizedEdge> {
    let mut best: Option<LinkKey> = None;
    for &u in component {
        let cu = zone.coord(u);
        for &v in primary {
            let key = match (cu, zone.coord(v)) {
                (Some(a), Some(b)) => (false, manhattan(a, b), u, v),
                _ => (true, 0, u, v),
            };
            if best.is_none_or(|b| key < b) {
                best = Some(key);
            }
        }
    }
    best.map(|(flat, dist, from, to)| SynthesizedEdge {
        from,
        to,
        weight: if flat { zone.repair_cost() } else { dist.max(1) },
    })
}

impl<B: GraphBackend> RouteZone<B> {
    /// Describe the zone's components without changing anything.
    pub fn analyze(&self) -> SubgraphReport {
        let components = self.components();
        let connected = components.len() <= 1;
        SubgraphReport {
            zone: self.name().to_string(),
            policy: self.policy(),
            components,
            synthesized: Vec::new(),
            connected,
        }
    }

    /// Apply the zone's repair policy.
    ///
    /// Idempotent: a connected zone is left untouched.
    pub fn repair(&mut self) -> SubgraphReport {
        let mut report = self.analyze();
        if report.connected {
            return report;
        }

        if self.policy() == RepairPolicy::ReportOnly {
            log::info!(
                "zone `{}`: {} components left as declared",
                self.name(),
                report.components.len()
            );
            return report;
        }

        let pi = primary_index(self, &report.components);
        let links: Vec<SynthesizedEdge> = report
            .components
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != pi)
            .filter_map(|(_, c)| best_link(self, c, &report.components[pi]))
            .collect();

        for link in &links {
            log::info!(
                "zone `{}`: synthesized edge {} <-> {} (weight {})",
                self.name(),
                link.from,
                link.to,
                link.weight
            );
            self.add_synthesized_edge(link.from, link.to, link.weight);
        }

        report.synthesized = links;
        report.connected = self.is_connected();
        report
    }

    /// Edges currently present because of repair, ordered by node pair.
    pub fn synthesized_edges(&self) -> Vec<SynthesizedEdge> {
        self.synthesized
            .iter()
            .map(|&(a, b)| SynthesizedEdge {
                from: a,
                to: b,
                weight: self.edge_weight(a, b).unwrap_or(self.repair_cost()),
            })
            .collect()
    }

    /// Remove every synthesized edge. Returns how many were removed.
    pub fn clear_synthesized(&mut self) -> usize {
        let pairs: Vec<(NodeId, NodeId)> = self.synthesized.iter().copied().collect();
        for &(a, b) in &pairs {
            self.remove_edge(a, b);
        }
        pairs.len()
    }

    /// Drop all synthesized edges and repair again from the author's edges.
    ///
    /// Useful after the author added the missing edges by hand: links that
    /// are no longer needed disappear.
    pub fn revalidate(&mut self) -> SubgraphReport {
        let removed = self.clear_synthesized();
        if removed > 0 {
            log::debug!("zone `{}`: cleared {removed} synthesized edges", self.name());
        }
        self.repair()
    }
}
