//! The node-kind registry.
//!
//! Each node kind the editor can place is one record here: identity,
//! palette metadata, and the pure socket-resolution function as an ordinary
//! field. The table is populated once at startup; nothing is attached to
//! components at runtime.

use crate::context::SocketContext;
use crate::socket::SocketLayout;
use indexmap::IndexMap;
use serde_json::Value;

/// Signature of a kind's socket-resolution function. Must be deterministic
/// in `(context, config)` and callable for unmounted nodes.
pub type ComputeSockets = fn(&SocketContext<'_>, &Value) -> SocketLayout;

/// One registered node kind.
#[derive(Clone)]
pub struct NodeKindSpec {
    /// Stable kind identifier, e.g. `"function/call"`.
    pub id: &'static str,
    /// Palette display name.
    pub label: &'static str,
    /// Palette grouping.
    pub category: &'static str,
    pub compute_sockets: ComputeSockets,
}

impl std::fmt::Debug for NodeKindSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeKindSpec")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("category", &self.category)
            .finish()
    }
}

/// Registry of node kinds, iterated in registration order by the palette.
#[derive(Debug, Default)]
pub struct NodeKindRegistry {
    kinds: IndexMap<&'static str, NodeKindSpec>,
}

impl NodeKindRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// All built-in kinds, in palette order.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for spec in crate::descriptors::builtin_kinds() {
            registry.register(spec);
        }
        registry
    }

    /// Register a kind. Re-registering an id replaces the previous spec.
    pub fn register(&mut self, spec: NodeKindSpec) {
        self.kinds.insert(spec.id, spec);
    }

    pub fn get(&self, id: &str) -> Option<&NodeKindSpec> {
        self.kinds.get(id)
    }

    /// Resolve sockets for a node of kind `id`. `None` for unknown kinds;
    /// the editor cannot draw handles for a kind it never registered.
    pub fn compute_sockets(
        &self,
        id: &str,
        ctx: &SocketContext<'_>,
        config: &Value,
    ) -> Option<SocketLayout> {
        self.kinds
            .get(id)
            .map(|spec| (spec.compute_sockets)(ctx, config))
    }

    /// Registered kinds in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &NodeKindSpec> {
        self.kinds.values()
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}
