//! Declarative world description and the builder that turns it into a
//! [`RouteTable`].
//!
//! Authors declare zones, their nodes and edges, and the gateways between
//! zones once; [`WorldBuilder`] consumes the declaration at world-build time.
//! With the `serde` feature the whole description can be loaded from JSON.

use trellis_graph::{Coord, GraphBackend, NodeId, SimpleGraph};

use crate::error::{Result, RouteError};
use crate::lint::{LintConfig, LintReport, Linter};
use crate::repair::{RepairPolicy, SubgraphReport};
use crate::table::RouteTable;
use crate::zone::RouteZone;

#[cfg(feature = "serde")]
fn default_weight() -> i32 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeConfig {
    pub id: NodeId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub at: Option<Coord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeConfig {
    pub from: NodeId,
    pub to: NodeId,
    #[cfg_attr(feature = "serde", serde(default = "default_weight"))]
    pub weight: i32,
    /// Only passable from `from` to `to`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub one_way: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ZoneConfig {
    pub name: String,
    pub nodes: Vec<NodeConfig>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub edges: Vec<EdgeConfig>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub repair: RepairPolicy,
    #[cfg_attr(feature = "serde", serde(default))]
    pub primary: Option<NodeId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub repair_cost: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GatewayConfig {
    pub node: NodeId,
    pub zones: [String; 2],
}

/// A complete world declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldConfig {
    pub zones: Vec<ZoneConfig>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub gateways: Vec<GatewayConfig>,
}

/// Build-time switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BuildOptions {
    /// Run each zone's repair policy once the table is assembled.
    pub repair: bool,
    /// Fail the build on gateways whose node is missing from a zone. When
    /// off, such gateways are kept for the linter and ignored by routing.
    pub strict_gateways: bool,
    /// Lint the table before repair and return the report.
    pub lint: bool,
    pub lint_config: LintConfig,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            repair: true,
            strict_gateways: true,
            lint: false,
            lint_config: LintConfig::default(),
        }
    }
}

/// Output of [`WorldBuilder::build`].
#[derive(Debug, Clone)]
pub struct BuiltWorld<B: GraphBackend = SimpleGraph> {
    pub table: RouteTable<B>,
    /// One report per zone, in name order. Empty when repair is disabled.
    pub repairs: Vec<SubgraphReport>,
    /// Present when linting was requested.
    pub lint: Option<LintReport>,
}

#[derive(Debug, Clone, Default)]
pub struct WorldBuilder {
    options: BuildOptions,
}

impl WorldBuilder {
    pub fn new(options: BuildOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Build a table backed by [`SimpleGraph`].
    pub fn build(&self, config: &WorldConfig) -> Result<BuiltWorld> {
        self.build_with_backend(config)
    }

    /// Build a table with a custom backend type.
    ///
    /// Configuration errors abort the build before anything can be queried.
    pub fn build_with_backend<B: GraphBackend + Default>(
        &self,
        config: &WorldConfig,
    ) -> Result<BuiltWorld<B>> {
        let mut table = RouteTable::<B>::default();
        for zc in &config.zones {
            let zone = build_zone::<B>(zc)?;
            table.register_zone(zc.name.clone(), zone)?;
        }

        for gw in &config.gateways {
            let [a, b] = &gw.zones;
            if self.options.strict_gateways {
                table.register_gateway(gw.node, a, b)?;
            } else if let Err(e) = table.register_gateway(gw.node, a, b) {
                if !matches!(e, RouteError::GatewayNotInZone { .. }) {
                    return Err(e);
                }
                log::warn!("{e}; keeping the declaration for the linter");
                table.declare_gateway(gw.node, a, b)?;
            }
        }

        let lint = self
            .options
            .lint
            .then(|| Linter::new(self.options.lint_config).lint(&table));

        let repairs = if self.options.repair {
            table.repair_all()
        } else {
            Vec::new()
        };

        log::info!(
            "built world: {} zones, {} nodes, {} gateways",
            table.len(),
            table.node_count(),
            table.gateways().len()
        );
        Ok(BuiltWorld {
            table,
            repairs,
            lint,
        })
    }
}

/// Turn one zone declaration into a zone. Nodes are added before edges, so
/// edge order within the declaration does not matter.
pub fn build_zone<B: GraphBackend + Default>(config: &ZoneConfig) -> Result<RouteZone<B>> {
    let mut zone = RouteZone::with_backend(config.name.clone(), B::default());
    zone.set_policy(config.repair);
    zone.set_primary(config.primary);
    if let Some(cost) = config.repair_cost {
        zone.set_repair_cost(cost);
    }
    for node in &config.nodes {
        match node.at {
            Some(at) => zone.add_node_at(node.id, at),
            None => zone.add_node(node.id),
        };
    }
    for edge in &config.edges {
        if edge.one_way {
            zone.add_one_way_edge(edge.from, edge.to, edge.weight)?;
        } else {
            zone.add_edge(edge.from, edge.to, edge.weight)?;
        }
    }
    Ok(zone)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(v: u32) -> NodeId {
        NodeId(v)
    }

    fn nodes(ids: &[u32]) -> Vec<NodeConfig> {
        ids.iter()
            .map(|&i| NodeConfig { id: n(i), at: None })
            .collect()
    }

    fn edge(from: u32, to: u32) -> EdgeConfig {
        EdgeConfig {
            from: n(from),
            to: n(to),
            weight: 1,
            one_way: false,
        }
    }

    fn world() -> WorldConfig {
        WorldConfig {
            zones: vec![
                ZoneConfig {
                    name: "house".into(),
                    nodes: nodes(&[1, 2, 3]),
                    edges: vec![edge(1, 2)],
                    repair: RepairPolicy::Connect,
                    primary: None,
                    repair_cost: Some(3),
                },
                ZoneConfig {
                    name: "garden".into(),
                    nodes: nodes(&[2, 4]),
                    edges: vec![edge(2, 4)],
                    repair: RepairPolicy::ReportOnly,
                    primary: None,
                    repair_cost: None,
                },
            ],
            gateways: vec![GatewayConfig {
                node: n(2),
                zones: ["house".into(), "garden".into()],
            }],
        }
    }

    #[test]
    fn builds_and_repairs() {
        let mut built = WorldBuilder::default().build(&world()).unwrap();
        assert_eq!(built.repairs.len(), 2);
        assert!(built.lint.is_none());
        let house = built.table.zone("house").unwrap();
        assert!(house.is_connected());
        assert_eq!(house.synthesized_edges()[0].weight, 3);
        assert_eq!(built.table.route(n(3), n(4)).unwrap().last(), Some(&n(4)));
    }

    #[test]
    fn lint_sees_the_pre_repair_world() {
        let options = BuildOptions {
            lint: true,
            ..BuildOptions::default()
        };
        let built = WorldBuilder::new(options).build(&world()).unwrap();
        let report = built.lint.unwrap();
        assert_eq!(report.about(n(3)).count(), 1);
    }

    #[test]
    fn repair_can_be_switched_off() {
        let options = BuildOptions {
            repair: false,
            ..BuildOptions::default()
        };
        let built = WorldBuilder::new(options).build(&world()).unwrap();
        assert!(built.repairs.is_empty());
        assert!(!built.table.zone("house").unwrap().is_connected());
    }

    #[test]
    fn config_errors_fail_fast() {
        let mut cfg = world();
        cfg.zones.push(cfg.zones[0].clone());
        assert!(matches!(
            WorldBuilder::default().build(&cfg),
            Err(RouteError::DuplicateZone(name)) if name == "house"
        ));

        let mut cfg = world();
        cfg.zones[0].edges.push(EdgeConfig {
            weight: -2,
            ..edge(1, 3)
        });
        assert!(matches!(
            WorldBuilder::default().build(&cfg),
            Err(RouteError::InvalidWeight { weight: -2, .. })
        ));
    }

    #[test]
    fn lenient_gateways_are_left_for_the_linter() {
        let mut cfg = world();
        cfg.gateways.push(GatewayConfig {
            node: n(1),
            zones: ["house".into(), "garden".into()],
        });
        assert!(matches!(
            WorldBuilder::default().build(&cfg),
            Err(RouteError::GatewayNotInZone { zone, .. }) if zone == "garden"
        ));

        let options = BuildOptions {
            strict_gateways: false,
            lint: true,
            ..BuildOptions::default()
        };
        let built = WorldBuilder::new(options).build(&cfg).unwrap();
        assert!(built.lint.unwrap().has_errors());
        assert_eq!(built.table.gateways().len(), 2);
    }

    #[test]
    fn unknown_gateway_zone_is_always_fatal() {
        let mut cfg = world();
        cfg.gateways[0].zones[1] = "moon".into();
        let options = BuildOptions {
            strict_gateways: false,
            ..BuildOptions::default()
        };
        assert_eq!(
            WorldBuilder::new(options).build(&cfg).err(),
            Some(RouteError::UnknownZone("moon".into()))
        );
    }
}
