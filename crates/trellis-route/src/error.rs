use trellis_graph::NodeId;

/// Errors produced while building or querying a route table.
///
/// [`Unreachable`](Self::Unreachable) and [`NoRoute`](Self::NoRoute) are
/// ordinary query results the game loop is expected to handle (the NPC waits
/// or picks another goal). Everything else is a configuration fault that
/// should stop the world from being built.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    /// No path between two nodes of the same zone.
    #[error("zone `{zone}`: no path from {from} to {to}")]
    Unreachable {
        zone: String,
        from: NodeId,
        to: NodeId,
    },

    /// No gateway sequence connects the zones of the two endpoints.
    #[error("no gateway route from {from} (zone `{from_zone}`) to {to} (zone `{to_zone}`)")]
    NoRoute {
        from: NodeId,
        to: NodeId,
        from_zone: String,
        to_zone: String,
    },

    #[error("zone `{0}` is already registered")]
    DuplicateZone(String),

    #[error("unknown zone `{0}`")]
    UnknownZone(String),

    #[error("gateway {node} is not a member of zone `{zone}`")]
    GatewayNotInZone { node: NodeId, zone: String },

    /// A node was referenced that is not a member of the zone (or of any zone).
    #[error("node {node} is not part of {scope}")]
    UnknownNode { node: NodeId, scope: String },

    #[error("edge {from} -> {to} has non-positive weight {weight}")]
    InvalidWeight { from: NodeId, to: NodeId, weight: i32 },
}

impl RouteError {
    /// Whether this error describes a broken world declaration rather than a
    /// query that simply has no answer.
    pub fn is_config_error(&self) -> bool {
        !matches!(self, Self::Unreachable { .. } | Self::NoRoute { .. })
    }
}

pub type Result<T, E = RouteError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runtime_errors_are_not_config_errors() {
        let e = RouteError::Unreachable {
            zone: "cellar".into(),
            from: NodeId(1),
            to: NodeId(2),
        };
        assert!(!e.is_config_error());
        assert_eq!(e.to_string(), "zone `cellar`: no path from #1 to #2");
        assert!(RouteError::DuplicateZone("cellar".into()).is_config_error());
    }

    #[test]
    fn gateway_message() {
        let e = RouteError::GatewayNotInZone {
            node: NodeId(5),
            zone: "house".into(),
        };
        assert_eq!(e.to_string(), "gateway #5 is not a member of zone `house`");
    }
}
