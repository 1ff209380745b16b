//! vscript_nodes: Node socket descriptors for the graph editor.
//!
//! Every node kind registers one pure function that maps its current
//! configuration (plus the registry's symbol state) to the socket lists the
//! node exposes right now. The editor resolves sockets through the kind
//! registry both to draw handles and to validate connections, so the same
//! function serves both and may run for nodes that are not mounted.

mod config;
mod context;
mod descriptors;
mod kind;
mod socket;

pub use config::{
    decode_or_default, ConfigError, ControlConfig, ControlMode, FunctionDefineConfig,
    FunctionRefConfig, PackConfig, ParamConfig, VariableConfig,
};
pub use context::SocketContext;
pub use descriptors::{builtin_kinds, kind_ids};
pub use kind::{ComputeSockets, NodeKindRegistry, NodeKindSpec};
pub use socket::{can_connect, socket_ids, DegradedReason, NodeState, Socket, SocketLayout};
