use crate::ids::{EdgeId, NodeId, PortId};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("edge {edge} references port {port} which does not exist")]
    DanglingEdge { edge: EdgeId, port: PortId },
    #[error("edge {edge} is connected to removed node {node}")]
    DisconnectedEndpoint { edge: EdgeId, node: NodeId },
    #[error("port {port} belongs to unknown node {node}")]
    UnknownNode { port: PortId, node: NodeId },
    #[error("edge {edge} has weight {weight}; weights must be finite and non-negative")]
    InvalidWeight { edge: EdgeId, weight: f64 },
    #[error("edge {edge} has delta {delta}; deltas must be at least 1")]
    InvalidDelta { edge: EdgeId, delta: u32 },
    #[error("node {node} has an invalid size ({width} x {height})")]
    InvalidSize {
        node: NodeId,
        width: f64,
        height: f64,
    },
}

impl Error {
    /// Display name of the element the error is about.
    pub fn element(&self) -> String {
        match self {
            Error::DanglingEdge { edge, .. }
            | Error::DisconnectedEndpoint { edge, .. }
            | Error::InvalidWeight { edge, .. }
            | Error::InvalidDelta { edge, .. } => edge.to_string(),
            Error::UnknownNode { port, .. } => port.to_string(),
            Error::InvalidSize { node, .. } => node.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
