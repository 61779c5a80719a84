//! Shared world model used by the demo binaries.
//!
//! Demonstrates: declaring a zoned world, subgraph repair, linting, and NPCs
//! walking to random goals one next hop per turn.

use std::path::Path;

use rand::{RngExt, SeedableRng};
use trellis_route::{
    BuildOptions, BuiltWorld, Coord, EdgeConfig, GatewayConfig, NodeConfig, NodeId, RepairPolicy,
    RouteError, RouteTable, WorldBuilder, WorldConfig, ZoneConfig,
};

// ---------------------------------------------------------------------------
// Sample world
// ---------------------------------------------------------------------------

// Inn
pub const COMMON_ROOM: NodeId = NodeId(1);
pub const KITCHEN: NodeId = NodeId(2);
pub const STAIRS: NodeId = NodeId(3);
pub const GUEST_ROOM: NodeId = NodeId(4);
pub const INN_DOOR: NodeId = NodeId(5);
// Square
pub const FOUNTAIN: NodeId = NodeId(10);
pub const MARKET: NodeId = NodeId(11);
pub const CHAPEL_GATE: NodeId = NodeId(12);
pub const WELL: NodeId = NodeId(13);
// Chapel
pub const NAVE: NodeId = NodeId(20);
pub const CRYPT: NodeId = NodeId(21);

fn node(id: NodeId, x: i32, y: i32) -> NodeConfig {
    NodeConfig {
        id,
        at: Some(Coord::new(x, y)),
    }
}

fn edge(from: NodeId, to: NodeId, weight: i32) -> EdgeConfig {
    EdgeConfig {
        from,
        to,
        weight,
        one_way: false,
    }
}

/// A small village: an inn, the square outside it and a chapel.
///
/// The well in the square was left without edges on purpose so repair and
/// the linter have something to find. The crypt is reachable from the nave
/// only by a one-way chute.
pub fn village() -> WorldConfig {
    WorldConfig {
        zones: vec![
            ZoneConfig {
                name: "inn".into(),
                nodes: vec![
                    node(COMMON_ROOM, 0, 0),
                    node(KITCHEN, 1, 0),
                    node(STAIRS, 0, 1),
                    node(GUEST_ROOM, 0, 2),
                    node(INN_DOOR, -1, 0),
                ],
                edges: vec![
                    edge(COMMON_ROOM, KITCHEN, 1),
                    edge(COMMON_ROOM, STAIRS, 1),
                    edge(STAIRS, GUEST_ROOM, 2),
                    edge(COMMON_ROOM, INN_DOOR, 1),
                ],
                repair: RepairPolicy::Connect,
                primary: Some(COMMON_ROOM),
                repair_cost: None,
            },
            ZoneConfig {
                name: "square".into(),
                nodes: vec![
                    node(INN_DOOR, -1, 0),
                    node(FOUNTAIN, -4, 0),
                    node(MARKET, -4, 3),
                    node(CHAPEL_GATE, -8, 0),
                    node(WELL, -5, -2),
                ],
                edges: vec![
                    edge(INN_DOOR, FOUNTAIN, 3),
                    edge(FOUNTAIN, MARKET, 3),
                    edge(FOUNTAIN, CHAPEL_GATE, 4),
                ],
                repair: RepairPolicy::Connect,
                primary: None,
                repair_cost: None,
            },
            ZoneConfig {
                name: "chapel".into(),
                nodes: vec![
                    node(CHAPEL_GATE, -8, 0),
                    node(NAVE, -10, 0),
                    node(CRYPT, -10, 1),
                ],
                edges: vec![
                    edge(CHAPEL_GATE, NAVE, 2),
                    EdgeConfig {
                        one_way: true,
                        ..edge(NAVE, CRYPT, 1)
                    },
                ],
                repair: RepairPolicy::ReportOnly,
                primary: None,
                repair_cost: None,
            },
        ],
        gateways: vec![
            GatewayConfig {
                node: INN_DOOR,
                zones: ["inn".into(), "square".into()],
            },
            GatewayConfig {
                node: CHAPEL_GATE,
                zones: ["square".into(), "chapel".into()],
            },
        ],
    }
}

/// Read a world declaration from a JSON file.
pub fn load_world(path: &Path) -> Result<WorldConfig, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Build `config` with linting enabled.
pub fn build_world(config: &WorldConfig, options: BuildOptions) -> Result<BuiltWorld, RouteError> {
    WorldBuilder::new(BuildOptions {
        lint: true,
        ..options
    })
    .build(config)
}

// ---------------------------------------------------------------------------
// NPC walk
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Npc {
    pub name: String,
    pub at: NodeId,
    pub goal: NodeId,
    /// Turns spent waiting because the goal could not be reached.
    pub stuck: u32,
}

/// What an NPC did during one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Moved { from: NodeId, to: NodeId },
    Arrived { at: NodeId, next_goal: NodeId },
    Waited { reason: String },
}

/// Turn-based simulation of NPCs walking between random goals.
pub struct Simulation {
    pub table: RouteTable,
    pub npcs: Vec<Npc>,
    nodes: Vec<NodeId>,
    rng: rand::rngs::StdRng,
    pub turn: u32,
}

impl Simulation {
    pub fn new(table: RouteTable, npc_count: usize, seed: u64) -> Self {
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        let mut nodes: Vec<NodeId> = table.zones().flat_map(|z| z.nodes()).collect();
        nodes.sort_unstable();
        nodes.dedup();

        let names = ["Alda", "Bram", "Cosi", "Dunn", "Ebba", "Fenn"];
        let mut npcs = Vec::new();
        if !nodes.is_empty() {
            for i in 0..npc_count {
                let at = nodes[rng.random_range(0..nodes.len())];
                let goal = nodes[rng.random_range(0..nodes.len())];
                npcs.push(Npc {
                    name: names[i % names.len()].to_string(),
                    at,
                    goal,
                    stuck: 0,
                });
            }
        }

        Self {
            table,
            npcs,
            nodes,
            rng,
            turn: 0,
        }
    }

    fn random_node(&mut self) -> NodeId {
        self.nodes[self.rng.random_range(0..self.nodes.len())]
    }

    /// Advance every NPC by one step.
    pub fn step(&mut self) -> Vec<(String, Action)> {
        self.turn += 1;
        let mut out = Vec::with_capacity(self.npcs.len());
        for i in 0..self.npcs.len() {
            let (at, goal) = (self.npcs[i].at, self.npcs[i].goal);
            let action = if at == goal {
                let next_goal = self.random_node();
                self.npcs[i].goal = next_goal;
                Action::Arrived { at, next_goal }
            } else {
                match self.table.next_hop(at, goal) {
                    Ok(to) => {
                        self.npcs[i].at = to;
                        self.npcs[i].stuck = 0;
                        Action::Moved { from: at, to }
                    }
                    Err(e) => {
                        log::debug!("{} cannot move: {e}", self.npcs[i].name);
                        self.npcs[i].stuck += 1;
                        // Give up after a few turns and pick something else.
                        if self.npcs[i].stuck > 2 {
                            self.npcs[i].goal = self.random_node();
                            self.npcs[i].stuck = 0;
                        }
                        Action::Waited {
                            reason: e.to_string(),
                        }
                    }
                }
            };
            out.push((self.npcs[i].name.clone(), action));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_route::LintKind;

    #[test]
    fn village_builds_and_routes_across_zones() {
        let mut built = build_world(&village(), BuildOptions::default()).unwrap();
        let plan = built.table.plan(GUEST_ROOM, NAVE).unwrap();
        assert_eq!(plan.zones(), vec!["inn", "square", "chapel"]);
        assert_eq!(plan.path.first(), Some(&GUEST_ROOM));
        assert_eq!(plan.path.last(), Some(&NAVE));
        // The chute only goes down.
        assert!(built.table.route(CRYPT, NAVE).is_err());
    }

    #[test]
    fn village_lint_finds_the_well_and_the_chute() {
        let built = build_world(&village(), BuildOptions::default()).unwrap();
        let report = built.lint.unwrap();
        assert!(report.about(WELL).any(|d| d.kind == LintKind::OrphanNode));
        assert!(report.iter().any(|d| d.kind == LintKind::AsymmetricEdge));
        assert!(!report.has_errors());
    }

    #[test]
    fn bundled_json_matches_village() {
        let path = Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/worlds/village.json"));
        assert_eq!(load_world(path).unwrap(), village());
    }

    #[test]
    fn simulation_moves_along_edges() {
        let built = build_world(&village(), BuildOptions::default()).unwrap();
        let mut sim = Simulation::new(built.table, 3, 7);
        for _ in 0..20 {
            for (_, action) in sim.step() {
                if let Action::Moved { from, to } = action {
                    let linked = sim
                        .table
                        .zones()
                        .any(|z| z.edge_weight(from, to).is_some());
                    assert!(linked, "{from} -> {to} is not an edge");
                }
            }
        }
        assert_eq!(sim.turn, 20);
    }
}
