//! The registry of route zones and the gateways stitching them together.

use std::collections::{BTreeMap, BTreeSet};

use trellis_graph::{GraphBackend, NodeId, SimpleGraph, dijkstra_tree};

use crate::error::{Result, RouteError};
use crate::portal::{PortalGraph, Stamp};
use crate::repair::SubgraphReport;
use crate::zone::RouteZone;

/// A declared cross-zone link. Zone names are stored in ascending order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Gateway {
    pub node: NodeId,
    pub zones: (String, String),
}

/// One intra-zone stretch of a route.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Leg {
    pub zone: String,
    pub path: Vec<NodeId>,
    pub cost: i64,
}

/// A resolved route: the legs it crosses and the concatenated node path.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoutePlan {
    pub legs: Vec<Leg>,
    /// Every node to visit, endpoints included. Gateways appear once.
    pub path: Vec<NodeId>,
    pub cost: i64,
}

impl RoutePlan {
    fn stay(at: NodeId) -> Self {
        Self {
            legs: Vec::new(),
            path: vec![at],
            cost: 0,
        }
    }

    fn from_legs(legs: Vec<Leg>) -> Self {
        let mut path: Vec<NodeId> = Vec::new();
        for leg in &legs {
            let skip = usize::from(!path.is_empty());
            path.extend(leg.path.iter().skip(skip));
        }
        let cost = legs.iter().map(|l| l.cost).sum();
        Self { legs, path, cost }
    }

    /// Zones crossed, in order, without consecutive repeats.
    pub fn zones(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for leg in &self.legs {
            if out.last() != Some(&leg.zone.as_str()) {
                out.push(&leg.zone);
            }
        }
        out
    }
}

fn zone_pair(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

/// Top-level registry: zones by name plus the gateway declarations.
///
/// Queries take `&mut self` because answering them fills zone caches.
#[derive(Debug, Clone)]
pub struct RouteTable<B: GraphBackend = SimpleGraph> {
    zones: BTreeMap<String, RouteZone<B>>,
    /// Registration order, used to pick a node's home zone.
    order: Vec<String>,
    gateways: BTreeMap<NodeId, BTreeSet<(String, String)>>,
    gateway_version: u64,
    portals: Option<PortalGraph>,
}

impl RouteTable<SimpleGraph> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<B: GraphBackend> Default for RouteTable<B> {
    fn default() -> Self {
        Self {
            zones: BTreeMap::new(),
            order: Vec::new(),
            gateways: BTreeMap::new(),
            gateway_version: 0,
            portals: None,
        }
    }
}

impl<B: GraphBackend> RouteTable<B> {
    // -----------------------------------------------------------------------
    // Zones
    // -----------------------------------------------------------------------

    /// Register `zone` under `name`. The zone takes the name it is
    /// registered under.
    pub fn register_zone(&mut self, name: impl Into<String>, mut zone: RouteZone<B>) -> Result<()> {
        let name = name.into();
        if self.zones.contains_key(&name) {
            return Err(RouteError::DuplicateZone(name));
        }
        zone.rename(name.clone());
        log::debug!(
            "registered zone `{name}` ({} nodes, {} edges)",
            zone.node_count(),
            zone.edge_count()
        );
        self.order.push(name.clone());
        self.zones.insert(name, zone);
        self.portals = None;
        Ok(())
    }

    /// Remove a zone and every gateway declaration mentioning it.
    pub fn unregister_zone(&mut self, name: &str) -> Result<RouteZone<B>> {
        let zone = self
            .zones
            .remove(name)
            .ok_or_else(|| RouteError::UnknownZone(name.to_string()))?;
        self.order.retain(|n| n != name);
        for pairs in self.gateways.values_mut() {
            pairs.retain(|(a, b)| a != name && b != name);
        }
        self.gateways.retain(|_, pairs| !pairs.is_empty());
        self.gateways_changed();
        Ok(zone)
    }

    pub fn zone(&self, name: &str) -> Option<&RouteZone<B>> {
        self.zones.get(name)
    }

    /// Mutable access to a zone. Topology changes made through it are picked
    /// up by the next cross-zone query.
    pub fn zone_mut(&mut self, name: &str) -> Option<&mut RouteZone<B>> {
        self.zones.get_mut(name)
    }

    /// Zones in name order.
    pub fn zones(&self) -> impl Iterator<Item = &RouteZone<B>> {
        self.zones.values()
    }

    pub fn zone_names(&self) -> impl Iterator<Item = &str> {
        self.zones.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    fn zone_checked(&self, name: &str) -> Result<&RouteZone<B>> {
        self.zones
            .get(name)
            .ok_or_else(|| RouteError::UnknownZone(name.to_string()))
    }

    /// Names of every zone containing `node`, in name order.
    pub fn zones_of(&self, node: NodeId) -> Vec<&str> {
        self.zones
            .iter()
            .filter(|(_, z)| z.contains(node))
            .map(|(n, _)| n.as_str())
            .collect()
    }

    /// The first registered zone containing `node`.
    pub fn home_zone(&self, node: NodeId) -> Option<&str> {
        self.order
            .iter()
            .find(|n| self.zones.get(n.as_str()).is_some_and(|z| z.contains(node)))
            .map(String::as_str)
    }

    /// Number of distinct nodes across all zones.
    pub fn node_count(&self) -> usize {
        self.zones
            .values()
            .flat_map(|z| z.nodes())
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Run every zone's repair policy, in name order.
    pub fn repair_all(&mut self) -> Vec<SubgraphReport> {
        self.zones.values_mut().map(RouteZone::repair).collect()
    }

    // -----------------------------------------------------------------------
    // Gateways
    // -----------------------------------------------------------------------

    /// Declare `node` as a link between `zone_a` and `zone_b`.
    ///
    /// The node must already be a member of both zones.
    pub fn register_gateway(&mut self, node: NodeId, zone_a: &str, zone_b: &str) -> Result<()> {
        for name in [zone_a, zone_b] {
            self.zone_checked(name)?;
        }
        for name in [zone_a, zone_b] {
            if !self.zone_checked(name)?.contains(node) {
                return Err(RouteError::GatewayNotInZone {
                    node,
                    zone: name.to_string(),
                });
            }
        }
        self.declare_gateway(node, zone_a, zone_b)
    }

    /// Like [`register_gateway`](Self::register_gateway) but without the
    /// membership check. A gateway missing from one of its zones is ignored
    /// by routing and reported by the linter.
    pub fn declare_gateway(&mut self, node: NodeId, zone_a: &str, zone_b: &str) -> Result<()> {
        self.zone_checked(zone_a)?;
        self.zone_checked(zone_b)?;
        if zone_a == zone_b {
            log::warn!("gateway {node} links zone `{zone_a}` to itself, ignored");
            return Ok(());
        }
        self.gateways
            .entry(node)
            .or_default()
            .insert(zone_pair(zone_a, zone_b));
        self.gateways_changed();
        Ok(())
    }

    /// Withdraw a gateway declaration. Returns `false` if it did not exist.
    pub fn remove_gateway(&mut self, node: NodeId, zone_a: &str, zone_b: &str) -> bool {
        let Some(pairs) = self.gateways.get_mut(&node) else {
            return false;
        };
        let removed = pairs.remove(&zone_pair(zone_a, zone_b));
        if pairs.is_empty() {
            self.gateways.remove(&node);
        }
        if removed {
            self.gateways_changed();
        }
        removed
    }

    /// Every gateway declaration, ordered by node then zone pair.
    pub fn gateways(&self) -> Vec<Gateway> {
        self.gateways
            .iter()
            .flat_map(|(&node, pairs)| {
                pairs.iter().map(move |zones| Gateway {
                    node,
                    zones: zones.clone(),
                })
            })
            .collect()
    }

    pub fn is_gateway(&self, node: NodeId) -> bool {
        self.gateways.contains_key(&node)
    }

    /// Whether `node` is declared as a gateway between the two zones.
    pub fn is_gateway_between(&self, node: NodeId, zone_a: &str, zone_b: &str) -> bool {
        self.gateways
            .get(&node)
            .is_some_and(|pairs| pairs.contains(&zone_pair(zone_a, zone_b)))
    }

    /// Gateway nodes usable from inside `zone`: declared for it and actually
    /// members of it.
    fn gateways_in(&self, zone: &str) -> Vec<NodeId> {
        let Some(z) = self.zones.get(zone) else {
            return Vec::new();
        };
        self.gateways
            .iter()
            .filter(|(_, pairs)| pairs.iter().any(|(a, b)| a == zone || b == zone))
            .map(|(&n, _)| n)
            .filter(|&n| z.contains(n))
            .collect()
    }

    fn gateways_changed(&mut self) {
        self.gateway_version = self.gateway_version.wrapping_add(1);
        self.portals = None;
    }

    // -----------------------------------------------------------------------
    // Routing
    // -----------------------------------------------------------------------

    fn stamp(&self) -> Stamp {
        (
            self.gateway_version,
            self.zones
                .iter()
                .map(|(n, z)| (n.clone(), z.generation()))
                .collect(),
        )
    }

    /// Rebuild the gateway-to-gateway graph if any zone or gateway changed
    /// since it was last built.
    fn refresh_portals(&mut self) {
        let stamp = self.stamp();
        if self.portals.as_ref().is_some_and(|p| p.stamp == stamp) {
            return;
        }

        let mut graph = PortalGraph::default();
        let names: Vec<String> = self.zones.keys().cloned().collect();
        for name in &names {
            let members = self.gateways_in(name);
            let Some(zone) = self.zones.get_mut(name) else {
                continue;
            };
            for &u in &members {
                for &v in &members {
                    if u == v {
                        continue;
                    }
                    if let Ok(cost) = zone.distance(u, v) {
                        graph.insert(u, v, cost, name);
                    }
                }
            }
        }
        log::debug!("rebuilt portal graph over {} zones", names.len());
        graph.stamp = stamp;
        self.portals = Some(graph);
    }

    fn leg(&mut self, zone: &str, from: NodeId, to: NodeId) -> Result<Leg> {
        let z = self
            .zones
            .get_mut(zone)
            .ok_or_else(|| RouteError::UnknownZone(zone.to_string()))?;
        let path = z.path(from, to)?;
        let cost = z.distance(from, to)?;
        Ok(Leg {
            zone: zone.to_string(),
            path,
            cost,
        })
    }

    fn owned_zones_of(&self, node: NodeId) -> Result<Vec<String>> {
        let zones: Vec<String> = self.zones_of(node).into_iter().map(String::from).collect();
        if zones.is_empty() {
            return Err(RouteError::UnknownNode {
                node,
                scope: "any zone".to_string(),
            });
        }
        Ok(zones)
    }

    /// Cheapest zone shared by both endpoints in which `to` is reachable.
    /// The error is the first unreachability seen, if any zone was shared.
    fn best_shared_zone(
        &mut self,
        from: NodeId,
        to: NodeId,
        from_zones: &[String],
        to_zones: &[String],
    ) -> std::result::Result<String, Option<RouteError>> {
        let mut best: Option<(i64, &String)> = None;
        let mut first_err = None;
        for name in from_zones.iter().filter(|n| to_zones.contains(n)) {
            let Some(zone) = self.zones.get_mut(name) else {
                continue;
            };
            match zone.distance(from, to) {
                Ok(c) if best.is_none_or(|(b, _)| c < b) => best = Some((c, name)),
                Ok(_) => {}
                Err(e) => {
                    first_err.get_or_insert(e);
                }
            }
        }
        best.map(|(_, n)| n.clone()).ok_or(first_err)
    }

    /// Resolve the full route from `from` to `to`, legs included.
    ///
    /// Endpoints sharing a zone are routed inside the cheapest such zone.
    /// Otherwise the cheapest chain of gateways is searched, crossing as many
    /// intermediate zones as needed.
    pub fn plan(&mut self, from: NodeId, to: NodeId) -> Result<RoutePlan> {
        let from_zones = self.owned_zones_of(from)?;
        let to_zones = self.owned_zones_of(to)?;
        if from == to {
            return Ok(RoutePlan::stay(from));
        }

        let shared_err = match self.best_shared_zone(from, to, &from_zones, &to_zones) {
            Ok(zone) => return Ok(RoutePlan::from_legs(vec![self.leg(&zone, from, to)?])),
            Err(e) => e,
        };

        self.refresh_portals();
        let mut graph = self.portals.clone().unwrap_or_default();
        for name in &from_zones {
            for g in self.gateways_in(name) {
                if g == from {
                    continue;
                }
                if let Some(Ok(c)) = self.zones.get_mut(name).map(|z| z.distance(from, g)) {
                    graph.insert(from, g, c, name);
                }
            }
        }
        for name in &to_zones {
            for g in self.gateways_in(name) {
                if g == to {
                    continue;
                }
                if let Some(Ok(c)) = self.zones.get_mut(name).map(|z| z.distance(g, to)) {
                    graph.insert(g, to, c, name);
                }
            }
        }

        let no_route = || RouteError::NoRoute {
            from,
            to,
            from_zone: from_zones[0].clone(),
            to_zone: to_zones[0].clone(),
        };
        let Some(hops) = dijkstra_tree(&graph, from).path_to(to) else {
            return Err(shared_err.unwrap_or_else(no_route));
        };

        let mut legs = Vec::with_capacity(hops.len().saturating_sub(1));
        for w in hops.windows(2) {
            let zone = graph.link(w[0], w[1]).ok_or_else(no_route)?.zone.clone();
            legs.push(self.leg(&zone, w[0], w[1])?);
        }
        let plan = RoutePlan::from_legs(legs);
        log::debug!(
            "route {from} -> {to}: {} nodes through {:?}",
            plan.path.len(),
            plan.zones()
        );
        Ok(plan)
    }

    /// The ordered sequence of nodes from `from` to `to`, both included.
    pub fn route(&mut self, from: NodeId, to: NodeId) -> Result<Vec<NodeId>> {
        self.plan(from, to).map(|p| p.path)
    }

    /// Total weight of the route from `from` to `to`.
    pub fn route_cost(&mut self, from: NodeId, to: NodeId) -> Result<i64> {
        self.plan(from, to).map(|p| p.cost)
    }

    /// The node to move to next. Inside a shared zone this is a cache lookup.
    pub fn next_hop(&mut self, from: NodeId, to: NodeId) -> Result<NodeId> {
        let from_zones = self.owned_zones_of(from)?;
        let to_zones = self.owned_zones_of(to)?;
        if from == to {
            return Ok(from);
        }
        if let Ok(zone) = self.best_shared_zone(from, to, &from_zones, &to_zones) {
            if let Some(z) = self.zones.get_mut(&zone) {
                return z.next_hop(from, to);
            }
        }
        let plan = self.plan(from, to)?;
        Ok(plan.path.get(1).copied().unwrap_or(from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(v: u32) -> NodeId {
        NodeId(v)
    }

    fn zone(nodes: &[u32], edges: &[(u32, u32, i32)]) -> RouteZone {
        let mut z = RouteZone::new("");
        for &i in nodes {
            z.add_node(n(i));
        }
        for &(a, b, w) in edges {
            z.add_edge(n(a), n(b), w).unwrap();
        }
        z
    }

    /// A = {1,2,3}, B = {3,4,5}, C = {5,6}, chained through gateways 3 and 5.
    fn chain() -> RouteTable {
        let mut t = RouteTable::new();
        t.register_zone("a", zone(&[1, 2, 3], &[(1, 2, 1), (2, 3, 1)]))
            .unwrap();
        t.register_zone("b", zone(&[3, 4, 5], &[(3, 4, 1), (4, 5, 1)]))
            .unwrap();
        t.register_zone("c", zone(&[5, 6], &[(5, 6, 1)])).unwrap();
        t.register_gateway(n(3), "a", "b").unwrap();
        t.register_gateway(n(5), "b", "c").unwrap();
        t
    }

    #[test]
    fn duplicate_zone_rejected() {
        let mut t = RouteTable::new();
        t.register_zone("a", RouteZone::new("x")).unwrap();
        assert_eq!(t.zone("a").unwrap().name(), "a");
        assert_eq!(
            t.register_zone("a", RouteZone::new("a")),
            Err(RouteError::DuplicateZone("a".into()))
        );
    }

    #[test]
    fn gateway_errors() {
        let mut t = chain();
        assert_eq!(
            t.register_gateway(n(3), "a", "nowhere"),
            Err(RouteError::UnknownZone("nowhere".into()))
        );
        assert_eq!(
            t.register_gateway(n(1), "a", "b"),
            Err(RouteError::GatewayNotInZone {
                node: n(1),
                zone: "b".into()
            })
        );
    }

    #[test]
    fn multi_hop_route() {
        let mut t = chain();
        let plan = t.plan(n(1), n(6)).unwrap();
        assert_eq!(plan.path, vec![n(1), n(2), n(3), n(4), n(5), n(6)]);
        assert_eq!(plan.cost, 5);
        assert_eq!(plan.zones(), vec!["a", "b", "c"]);
        assert_eq!(t.next_hop(n(1), n(6)).unwrap(), n(2));
        assert_eq!(t.next_hop(n(6), n(1)).unwrap(), n(5));
    }

    #[test]
    fn same_zone_route_and_trivial_route() {
        let mut t = chain();
        assert_eq!(t.route(n(1), n(3)).unwrap(), vec![n(1), n(2), n(3)]);
        assert_eq!(t.route(n(4), n(4)).unwrap(), vec![n(4)]);
        assert_eq!(t.route_cost(n(4), n(4)).unwrap(), 0);
    }

    #[test]
    fn no_route_without_gateway() {
        let mut t = chain();
        assert!(t.remove_gateway(n(5), "c", "b"));
        assert!(matches!(
            t.route(n(1), n(6)),
            Err(RouteError::NoRoute { from_zone, to_zone, .. }) if from_zone == "a" && to_zone == "c"
        ));
    }

    #[test]
    fn unknown_endpoint() {
        let mut t = chain();
        assert!(matches!(
            t.route(n(1), n(99)),
            Err(RouteError::UnknownNode { node, .. }) if node == n(99)
        ));
    }

    #[test]
    fn unregister_drops_gateways() {
        let mut t = chain();
        let c = t.unregister_zone("c").unwrap();
        assert_eq!(c.node_count(), 2);
        assert_eq!(t.gateways().len(), 1);
        assert!(!t.is_gateway(n(5)));
        assert!(t.unregister_zone("c").is_err());
    }

    #[test]
    fn home_zone_follows_registration_order() {
        let t = chain();
        assert_eq!(t.home_zone(n(3)), Some("a"));
        assert_eq!(t.zones_of(n(3)), vec!["a", "b"]);
        assert_eq!(t.home_zone(n(42)), None);
        assert_eq!(t.node_count(), 6);
    }

    #[test]
    fn zone_mutation_refreshes_cross_zone_routes() {
        let mut t = RouteTable::new();
        t.register_zone("a", zone(&[1, 10, 11], &[(1, 10, 1), (1, 11, 3)]))
            .unwrap();
        t.register_zone("b", zone(&[10, 11, 20], &[(10, 20, 5), (11, 20, 1)]))
            .unwrap();
        t.register_gateway(n(10), "a", "b").unwrap();
        t.register_gateway(n(11), "a", "b").unwrap();

        assert_eq!(t.route(n(1), n(20)).unwrap(), vec![n(1), n(11), n(20)]);
        assert!(t.zone_mut("b").unwrap().remove_edge(n(11), n(20)));
        assert_eq!(t.route(n(1), n(20)).unwrap(), vec![n(1), n(10), n(20)]);
    }

    #[test]
    fn heavy_gateway_route_is_found() {
        let mut t = RouteTable::new();
        t.register_zone("a", zone(&[1, 2], &[(1, 2, 2_000_000_000)]))
            .unwrap();
        t.register_zone("b", zone(&[2, 3], &[(2, 3, 2_000_000_000)]))
            .unwrap();
        t.register_gateway(n(2), "a", "b").unwrap();
        let plan = t.plan(n(1), n(3)).unwrap();
        assert_eq!(plan.path, vec![n(1), n(2), n(3)]);
        assert_eq!(plan.cost, 4_000_000_000);
        assert_eq!(t.next_hop(n(1), n(3)).unwrap(), n(2));
    }

    #[test]
    fn declared_gateway_missing_from_zone_is_ignored_by_routing() {
        let mut t = chain();
        t.declare_gateway(n(1), "a", "c").unwrap();
        assert!(t.is_gateway_between(n(1), "c", "a"));
        assert_eq!(t.route(n(1), n(6)).unwrap().len(), 6);
    }

    #[test]
    fn repair_all_reports_every_zone() {
        let mut t = chain();
        t.zone_mut("b").unwrap().add_node(n(7));
        let reports = t.repair_all();
        assert_eq!(reports.len(), 3);
        assert!(reports[1].repaired());
        assert_eq!(t.route(n(1), n(7)).unwrap().last(), Some(&n(7)));
    }
}
