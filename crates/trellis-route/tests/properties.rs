use proptest::prelude::*;
use trellis_route::{NodeId, RouteTable, RouteZone};

const INF: i64 = i64::MAX / 4;

/// All-pairs shortest paths over the zone's directed edges.
fn floyd_warshall(zone: &RouteZone, n: usize) -> Vec<Vec<i64>> {
    let mut d = vec![vec![INF; n]; n];
    for (i, row) in d.iter_mut().enumerate() {
        row[i] = 0;
    }
    for e in zone.edges() {
        let (a, b) = (e.from.get() as usize, e.to.get() as usize);
        d[a][b] = d[a][b].min(i64::from(e.weight));
    }
    for k in 0..n {
        for i in 0..n {
            for j in 0..n {
                if d[i][k] + d[k][j] < d[i][j] {
                    d[i][j] = d[i][k] + d[k][j];
                }
            }
        }
    }
    d
}

/// A connected zone: a weighted chain 0-1-...-(n-1) plus extra edges.
fn zone_strategy() -> impl Strategy<Value = (usize, RouteZone)> {
    (
        2usize..8,
        prop::collection::vec(1i32..10, 7),
        prop::collection::vec((0usize..8, 0usize..8, 1i32..10, any::<bool>()), 0..12),
    )
        .prop_map(|(n, chain, extra)| {
            let mut z = RouteZone::new("prop");
            for i in 0..n {
                z.add_node(NodeId(i as u32));
            }
            for i in 1..n {
                z.add_edge(NodeId(i as u32 - 1), NodeId(i as u32), chain[i - 1])
                    .unwrap();
            }
            for (a, b, w, one_way) in extra {
                let (a, b) = (NodeId((a % n) as u32), NodeId((b % n) as u32));
                if a == b {
                    continue;
                }
                if one_way {
                    z.add_one_way_edge(a, b, w).unwrap();
                } else {
                    z.add_edge(a, b, w).unwrap();
                }
            }
            (n, z)
        })
}

proptest! {
    #[test]
    fn route_cost_matches_independent_shortest_paths((n, zone) in zone_strategy()) {
        let expected = floyd_warshall(&zone, n);
        let mut t = RouteTable::new();
        t.register_zone("prop", zone).unwrap();

        for a in 0..n {
            for b in 0..n {
                let (from, to) = (NodeId(a as u32), NodeId(b as u32));
                let path = t.route(from, to).unwrap();
                prop_assert_eq!(path.first(), Some(&from));
                prop_assert_eq!(path.last(), Some(&to));
                prop_assert!(path.len() <= n);
                let walked = t.zone("prop").unwrap().path_cost(&path).unwrap();
                prop_assert_eq!(walked, expected[a][b]);
                prop_assert_eq!(t.route_cost(from, to).unwrap(), expected[a][b]);
            }
        }
    }

    #[test]
    fn repair_twice_equals_repair_once(
        n in 1u32..10,
        edges in prop::collection::vec((0u32..10, 0u32..10), 0..8),
    ) {
        let mut z = RouteZone::new("prop");
        for i in 0..n {
            z.add_node(NodeId(i));
        }
        for (a, b) in edges {
            let (a, b) = (NodeId(a % n), NodeId(b % n));
            if a != b {
                z.add_edge(a, b, 1).unwrap();
            }
        }

        let first = z.repair();
        prop_assert!(first.connected);
        let once = z.edges();
        let second = z.repair();
        prop_assert!(second.synthesized.is_empty());
        prop_assert_eq!(z.edges(), once);
        prop_assert_eq!(
            first.synthesized.len(),
            first.components.len().saturating_sub(1)
        );
    }
}
