//! End-to-end routing scenarios.

use trellis_route::{LintKind, NodeId, RouteError, RouteTable, RouteZone, lint};

fn n(v: u32) -> NodeId {
    NodeId(v)
}

/// Zone over `nodes` with every pair linked at weight 1.
fn clique(name: &str, nodes: &[u32]) -> RouteZone {
    let mut z = RouteZone::new(name);
    for &i in nodes {
        z.add_node(n(i));
    }
    for (k, &a) in nodes.iter().enumerate() {
        for &b in &nodes[k + 1..] {
            z.add_edge(n(a), n(b), 1).unwrap();
        }
    }
    z
}

#[test]
fn gateway_outside_both_zones_is_rejected() {
    let mut t = RouteTable::new();
    t.register_zone("a", clique("a", &[1, 2])).unwrap();
    t.register_zone("b", clique("b", &[3, 4])).unwrap();
    assert_eq!(
        t.register_gateway(n(5), "a", "b"),
        Err(RouteError::GatewayNotInZone {
            node: n(5),
            zone: "a".into()
        })
    );
    assert!(t.gateways().is_empty());
}

#[test]
fn cross_zone_route_passes_through_gateway() {
    let mut t = RouteTable::new();
    t.register_zone("a", clique("a", &[1, 2, 3])).unwrap();
    // Zone B holds gateway 3 on its boundary, linked to 4 by an explicit edge.
    let mut b = clique("b", &[4, 5, 6]);
    b.add_node(n(3));
    b.add_edge(n(3), n(4), 1).unwrap();
    t.register_zone("b", b).unwrap();
    t.register_gateway(n(3), "a", "b").unwrap();

    let path = t.route(n(1), n(6)).unwrap();
    assert_eq!(path.first(), Some(&n(1)));
    assert_eq!(path.last(), Some(&n(6)));
    let i3 = path.iter().position(|&x| x == n(3)).unwrap();
    let i4 = path.iter().position(|&x| x == n(4)).unwrap();
    assert_eq!(i4, i3 + 1);
    assert_eq!(path, vec![n(1), n(3), n(4), n(6)]);
    assert_eq!(t.route_cost(n(1), n(6)).unwrap(), 3);
}

#[test]
fn cache_follows_topology_changes() {
    let mut z = RouteZone::new("manor");
    for i in 1..=4 {
        z.add_node(n(i));
    }
    z.add_edge(n(1), n(2), 1).unwrap();
    z.add_edge(n(2), n(4), 1).unwrap();
    z.add_edge(n(1), n(3), 2).unwrap();
    z.add_edge(n(3), n(4), 2).unwrap();

    assert_eq!(z.next_hop(n(1), n(4)).unwrap(), n(2));
    z.remove_edge(n(2), n(4));
    assert_eq!(z.next_hop(n(1), n(4)).unwrap(), n(3));
    z.add_edge(n(1), n(4), 1).unwrap();
    assert_eq!(z.next_hop(n(1), n(4)).unwrap(), n(4));
}

#[test]
fn disconnected_zone_gets_exactly_one_link() {
    let mut z = RouteZone::new("ruins");
    for i in 1..=4 {
        z.add_node(n(i));
    }
    z.add_edge(n(1), n(2), 1).unwrap();
    z.add_edge(n(3), n(4), 1).unwrap();
    assert!(!z.is_connected());
    assert!(matches!(
        z.next_hop(n(1), n(4)),
        Err(RouteError::Unreachable { .. })
    ));

    let report = z.repair();
    assert!(z.is_connected());
    assert_eq!(report.synthesized.len(), 1);
    assert_eq!(z.synthesized_edges().len(), 1);
    assert!(z.next_hop(n(1), n(4)).is_ok());
}

#[test]
fn orphan_node_yields_one_diagnostic() {
    let mut z = clique("barn", &[1, 2, 3]);
    z.add_node(n(4));
    let mut t = RouteTable::new();
    t.register_zone("barn", z).unwrap();
    let nodes = t.zone("barn").unwrap().node_count();
    let edges = t.zone("barn").unwrap().edge_count();

    let report = lint(&t);
    let about: Vec<_> = report.about(n(4)).collect();
    assert_eq!(about.len(), 1);
    assert_eq!(about[0].kind, LintKind::OrphanNode);
    assert_eq!(about[0].zone, "barn");

    assert_eq!(lint(&t), report);
    assert_eq!(t.zone("barn").unwrap().node_count(), nodes);
    assert_eq!(t.zone("barn").unwrap().edge_count(), edges);
}

#[test]
fn unreachable_inside_split_zone_is_recoverable() {
    let mut t = RouteTable::new();
    let mut z = clique("keep", &[1, 2]);
    z.add_node(n(3));
    z.set_policy(trellis_route::RepairPolicy::ReportOnly);
    t.register_zone("keep", z).unwrap();
    t.repair_all();

    let err = t.route(n(1), n(3)).unwrap_err();
    assert!(!err.is_config_error());
    assert!(matches!(err, RouteError::Unreachable { ref zone, .. } if zone == "keep"));
}
