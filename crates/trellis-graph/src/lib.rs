//! Weighted location graphs for NPC routing.
//!
//! This crate is the graph layer underneath `trellis-route`. It stores nodes
//! and positively-weighted directed edges and provides:
//!
//! - **Dijkstra** shortest-path trees ([`dijkstra_tree`])
//! - a **next-hop cache** filled one source tree at a time ([`NextHopCache`])
//! - **connected components** (weak connectivity) ([`connected_components`])
//!
//! [`SimpleGraph`] bundles all of the above behind the capability traits the
//! routing layer requires.
//!
//! # Trait hierarchy
//!
//! | Trait | Required for |
//! |---|---|
//! | [`Pather`] | connected components |
//! | [`WeightedPather`] : [`Pather`] | Dijkstra |
//! | [`GraphStore`] : [`WeightedPather`] | node/edge registration |
//! | [`ShortestPaths`], [`NextHops`], [`Subgraphs`] | routing capabilities |
//! | [`GraphBackend`] | all of the above, blanket-implemented |

mod cc;
mod dijkstra;
mod distance;
mod graph;
mod nexthop;
mod node;
mod traits;

pub use cc::connected_components;
pub use dijkstra::{ShortestPathTree, UNREACHABLE, dijkstra_tree};
pub use distance::manhattan;
pub use graph::SimpleGraph;
pub use nexthop::{CacheStats, Lookup, NextHopCache};
pub use node::{Coord, Edge, NodeId};
pub use traits::{
    GraphBackend, GraphStore, NextHops, Pather, ShortestPaths, Subgraphs, WeightedPather,
};
