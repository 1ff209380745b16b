//! Socket types and the connection-compatibility predicate.
//!
//! A socket is a typed connection point on a node. The editor draws one
//! handle per socket and consults [`can_connect`] while the user drags an
//! edge, so socket lists must be computable without mounting the node.

use crate::config::ConfigError;
use serde::Serialize;
use std::fmt;
use vscript_core::types::ValueType;

/// Well-known socket ids. The editor and the connection validator address
/// sockets by id, so the conventional flow handles get fixed names.
pub mod socket_ids {
    /// Incoming execution edge.
    pub const PREV: &str = "prev";
    /// Outgoing execution edge.
    pub const NEXT: &str = "next";
    /// Execution edge into a node's nested body.
    pub const BODY: &str = "body";
    /// Primary data output.
    pub const VALUE: &str = "value";
    /// A call's result output.
    pub const RESULT: &str = "result";
    /// A branch's wired condition input.
    pub const CONDITION: &str = "condition";
}

/// One typed connection point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Socket {
    /// Stable handle id, unique within the node's inputs or outputs.
    pub id: String,
    /// Display label. May carry a refinement hint ("value (number)") that
    /// never affects compatibility.
    pub label: String,
    pub ty: ValueType,
}

impl Socket {
    pub fn new(id: impl Into<String>, label: impl Into<String>, ty: ValueType) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            ty,
        }
    }

    pub fn flow(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(id, label, ValueType::Flow)
    }
}

/// Why a node is rendered in a degraded state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DegradedReason {
    /// The call or return node references a function that no longer exists.
    /// Persists until the user repoints the node.
    #[error("unknown function `{0}`")]
    UnknownFunction(String),
    /// A call node with no callee configured yet.
    #[error("no function selected")]
    CalleeUnset,
    /// Expression mode with nothing typed into the expression field.
    #[error("expression is empty")]
    EmptyExpression,
    /// The configuration payload did not decode.
    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),
}

/// Descriptor-level node health. `Degraded` never prevents the node from
/// exposing a usable socket list; it only drives the warning marker.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NodeState {
    #[default]
    Ok,
    Degraded(DegradedReason),
}

impl NodeState {
    pub fn is_degraded(&self) -> bool {
        matches!(self, NodeState::Degraded(_))
    }
}

/// The socket lists a node exposes right now, plus its health.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SocketLayout {
    pub inputs: Vec<Socket>,
    pub outputs: Vec<Socket>,
    pub state: NodeState,
}

impl SocketLayout {
    pub fn new(inputs: Vec<Socket>, outputs: Vec<Socket>) -> Self {
        Self {
            inputs,
            outputs,
            state: NodeState::Ok,
        }
    }

    pub fn degraded(mut self, reason: DegradedReason) -> Self {
        self.state = NodeState::Degraded(reason);
        self
    }

    pub fn input(&self, id: &str) -> Option<&Socket> {
        self.inputs.iter().find(|socket| socket.id == id)
    }

    pub fn output(&self, id: &str) -> Option<&Socket> {
        self.outputs.iter().find(|socket| socket.id == id)
    }
}

impl fmt::Display for SocketLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fmt_list = |sockets: &[Socket]| {
            sockets
                .iter()
                .map(|s| format!("{}:{}", s.id, s.ty))
                .collect::<Vec<_>>()
                .join(", ")
        };
        write!(
            f,
            "[{}] -> [{}]",
            fmt_list(&self.inputs),
            fmt_list(&self.outputs)
        )
    }
}

/// Whether the user may draw an edge from `output` into `input`.
/// Pure wrapper over the type rule; the editor calls this on every drag.
pub fn can_connect(output: &Socket, input: &Socket) -> bool {
    output.ty.connects_to(input.ty)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_connect_follows_type_rule() {
        let out_num = Socket::new("result", "result", ValueType::Number);
        let in_num = Socket::new("a", "a", ValueType::Number);
        let in_any = Socket::new("b", "b", ValueType::Any);
        let in_flow = Socket::flow("prev", "prev");

        assert!(can_connect(&out_num, &in_num));
        assert!(can_connect(&out_num, &in_any));
        assert!(!can_connect(&out_num, &in_flow));
        assert!(can_connect(&Socket::flow("next", "next"), &in_flow));
    }

    #[test]
    fn test_layout_lookup_by_id() {
        let layout = SocketLayout::new(
            vec![Socket::flow(socket_ids::PREV, "prev")],
            vec![Socket::new(socket_ids::VALUE, "value", ValueType::Table)],
        );
        assert!(layout.input(socket_ids::PREV).is_some());
        assert!(layout.output(socket_ids::VALUE).is_some());
        assert!(layout.output("missing").is_none());
    }
}
