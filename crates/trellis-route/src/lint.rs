//! Read-only structural checks over a built route table.
//!
//! The linter never changes the table and never fails; it only produces
//! diagnostics for authors to act on. Disconnection is judged on the edges
//! the author declared, so a zone that repair already stitched together is
//! still reported.

use std::fmt;

use trellis_graph::{GraphBackend, NodeId};

use crate::table::RouteTable;
use crate::zone::RouteZone;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

/// What a diagnostic is about. Declaration order is report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LintKind {
    /// A gateway names a zone that does not contain the gateway node.
    GatewayNodeMissing,
    /// The zone's declared edges form more than one component.
    DisconnectedZone,
    /// A node without any declared edge.
    OrphanNode,
    /// An edge whose reverse direction is missing.
    AsymmetricEdge,
    /// A node present in two zones without a gateway declaration for them.
    UndeclaredSharedNode,
    /// An edge added by subgraph repair.
    SynthesizedEdge,
    EmptyZone,
}

/// One finding.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Diagnostic {
    pub zone: String,
    pub kind: LintKind,
    pub severity: Severity,
    /// Nodes the finding is about: a single node, an edge's endpoints, or one
    /// representative per component.
    pub nodes: Vec<NodeId>,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: zone `{}`: {}", self.severity, self.zone, self.message)
    }
}

/// Which checks run and how strict they are.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LintConfig {
    /// Flag edges whose reverse direction is missing.
    pub expect_symmetric: bool,
    pub warn_disconnected: bool,
    /// List synthesized edges as informational diagnostics.
    pub report_synthesized: bool,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            expect_symmetric: true,
            warn_disconnected: true,
            report_synthesized: false,
        }
    }
}

/// Ordered diagnostics from one lint pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LintReport {
    pub diagnostics: Vec<Diagnostic>,
}

impl LintReport {
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }

    /// Diagnostics mentioning `node`.
    pub fn about(&self, node: NodeId) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.nodes.contains(&node))
    }
}

impl<'a> IntoIterator for &'a LintReport {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.iter()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Linter {
    config: LintConfig,
}

impl Linter {
    pub fn new(config: LintConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LintConfig {
        &self.config
    }

    /// Check every zone and gateway of `table`.
    pub fn lint<B: GraphBackend>(&self, table: &RouteTable<B>) -> LintReport {
        let mut out = Vec::new();
        for zone in table.zones() {
            self.lint_zone(zone, &mut out);
        }
        self.lint_gateways(table, &mut out);
        out.sort_by(|a, b| (&a.zone, a.kind, &a.nodes).cmp(&(&b.zone, b.kind, &b.nodes)));
        LintReport { diagnostics: out }
    }

    fn lint_zone<B: GraphBackend>(&self, zone: &RouteZone<B>, out: &mut Vec<Diagnostic>) {
        let name = zone.name();
        let push = |out: &mut Vec<Diagnostic>,
                    kind: LintKind,
                    severity: Severity,
                    nodes: Vec<NodeId>,
                    message: String| {
            out.push(Diagnostic {
                zone: name.to_string(),
                kind,
                severity,
                nodes,
                message,
            })
        };

        if zone.node_count() == 0 {
            push(
                out,
                LintKind::EmptyZone,
                Severity::Info,
                Vec::new(),
                "zone has no nodes".to_string(),
            );
            return;
        }

        let mut orphans = Vec::new();
        for n in zone.nodes() {
            if zone.declared_degree(n) == 0 {
                orphans.push(n);
                push(
                    out,
                    LintKind::OrphanNode,
                    Severity::Warning,
                    vec![n],
                    format!("node {n} has no edges"),
                );
            }
        }

        if self.config.warn_disconnected {
            // Orphans already have their own diagnostic.
            let parts: Vec<NodeId> = zone
                .declared_components()
                .into_iter()
                .filter(|c| !(c.len() == 1 && orphans.contains(&c[0])))
                .map(|c| c[0])
                .collect();
            if parts.len() > 1 {
                let list: Vec<String> = parts.iter().map(ToString::to_string).collect();
                push(
                    out,
                    LintKind::DisconnectedZone,
                    Severity::Warning,
                    parts.clone(),
                    format!(
                        "declared edges form {} separate subgraphs (containing {})",
                        parts.len(),
                        list.join(", ")
                    ),
                );
            }
        }

        if self.config.expect_symmetric {
            for e in zone.declared_edges() {
                if zone.edge_weight(e.to, e.from).is_none() {
                    push(
                        out,
                        LintKind::AsymmetricEdge,
                        Severity::Warning,
                        vec![e.from, e.to],
                        format!("edge {} -> {} has no way back", e.from, e.to),
                    );
                }
            }
        }

        if self.config.report_synthesized {
            for s in zone.synthesized_edges() {
                push(
                    out,
                    LintKind::SynthesizedEdge,
                    Severity::Info,
                    vec![s.from, s.to],
                    format!(
                        "edge {} <-> {} (weight {}) was added by subgraph repair",
                        s.from, s.to, s.weight
                    ),
                );
            }
        }
    }

    fn lint_gateways<B: GraphBackend>(&self, table: &RouteTable<B>, out: &mut Vec<Diagnostic>) {
        for gw in table.gateways() {
            let (a, b) = &gw.zones;
            for name in [a, b] {
                let present = table.zone(name).is_some_and(|z| z.contains(gw.node));
                if !present {
                    out.push(Diagnostic {
                        zone: name.clone(),
                        kind: LintKind::GatewayNodeMissing,
                        severity: Severity::Error,
                        nodes: vec![gw.node],
                        message: format!(
                            "gateway {} between `{a}` and `{b}` is not a member of this zone",
                            gw.node
                        ),
                    });
                }
            }
        }

        // Nodes shared by two zones without a declaration linking them.
        let names: Vec<&str> = table.zone_names().collect();
        for (i, &a) in names.iter().enumerate() {
            let Some(za) = table.zone(a) else {
                continue;
            };
            for &b in &names[i + 1..] {
                let Some(zb) = table.zone(b) else {
                    continue;
                };
                for n in za.nodes() {
                    if zb.contains(n) && !table.is_gateway_between(n, a, b) {
                        out.push(Diagnostic {
                            zone: a.to_string(),
                            kind: LintKind::UndeclaredSharedNode,
                            severity: Severity::Warning,
                            nodes: vec![n],
                            message: format!(
                                "node {n} is also in zone `{b}` but is not declared a gateway"
                            ),
                        });
                    }
                }
            }
        }
    }
}

/// Lint `table` with the default configuration.
pub fn lint<B: GraphBackend>(table: &RouteTable<B>) -> LintReport {
    Linter::default().lint(table)
}
