//! Zoned route tables for NPC movement.
//!
//! A world is split into named [`RouteZone`]s, each with its own graph
//! backend and next-hop cache. A [`RouteTable`] registers the zones and the
//! gateway nodes linking them, and answers "where do I step next?" and "what
//! is the whole way there?" for an NPC standing anywhere in the world.
//!
//! - **Zones** cache a full shortest-path tree per queried source, so after
//!   the first query every next hop from that source is a lookup. Any
//!   topology change drops the zone's cache.
//! - **Subgraph repair** ([`RouteZone::repair`]) detects zones split into
//!   several components and, unless the zone opts out, synthesizes the
//!   missing links.
//! - **The linter** ([`Linter`]) reports authoring mistakes without touching
//!   the table.
//! - **Configuration** ([`WorldConfig`], [`WorldBuilder`]) turns a
//!   declarative world description into a ready table.
//!
//! ```
//! use trellis_route::{NodeId, RouteTable, RouteZone};
//!
//! let mut hall = RouteZone::new("hall");
//! for id in [1, 2, 3] {
//!     hall.add_node(NodeId(id));
//! }
//! hall.add_edge(NodeId(1), NodeId(2), 1)?;
//! hall.add_edge(NodeId(2), NodeId(3), 1)?;
//!
//! let mut table = RouteTable::new();
//! table.register_zone("hall", hall)?;
//! assert_eq!(table.next_hop(NodeId(1), NodeId(3))?, NodeId(2));
//! # Ok::<(), trellis_route::RouteError>(())
//! ```

mod config;
mod error;
mod lint;
mod portal;
mod repair;
mod table;
mod zone;

pub use config::{
    BuildOptions, BuiltWorld, EdgeConfig, GatewayConfig, NodeConfig, WorldBuilder, WorldConfig,
    ZoneConfig, build_zone,
};
pub use error::{Result, RouteError};
pub use lint::{Diagnostic, LintConfig, LintKind, LintReport, Linter, Severity, lint};
pub use repair::{RepairPolicy, SubgraphReport, SynthesizedEdge};
pub use table::{Gateway, Leg, RoutePlan, RouteTable};
pub use trellis_graph::{CacheStats, Coord, Edge, GraphBackend, NodeId, SimpleGraph};
pub use zone::RouteZone;
