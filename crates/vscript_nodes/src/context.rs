//! The read-only view socket resolution runs against.

use rustc_hash::FxHashMap;
use vscript_core::ids::DocumentId;
use vscript_core::types::ValueType;
use vscript_registry::{FunctionSymbol, SymbolRegistry, VariableSymbol};

/// Everything a `compute_sockets` function may consult: the registry state
/// of one document, plus the resolved types of whatever is already connected
/// upstream (keyed by input socket id).
///
/// Carries only borrows; building one per resolution is free. Two contexts
/// over the same registry snapshot and upstream map resolve identically.
pub struct SocketContext<'a> {
    registry: &'a SymbolRegistry,
    document: DocumentId,
    upstream: FxHashMap<&'a str, ValueType>,
}

impl<'a> SocketContext<'a> {
    pub fn new(registry: &'a SymbolRegistry, document: DocumentId) -> Self {
        Self {
            registry,
            document,
            upstream: FxHashMap::default(),
        }
    }

    /// Record the resolved type of the edge connected to `socket_id`.
    pub fn with_upstream(mut self, socket_id: &'a str, ty: ValueType) -> Self {
        self.upstream.insert(socket_id, ty);
        self
    }

    pub fn document(&self) -> DocumentId {
        self.document
    }

    pub fn variable(&self, name: &str) -> Option<&'a VariableSymbol> {
        self.registry.variable(self.document, name)
    }

    pub fn function(&self, name: &str) -> Option<&'a FunctionSymbol> {
        self.registry.function(self.document, name)
    }

    pub fn upstream_type(&self, socket_id: &str) -> Option<ValueType> {
        self.upstream.get(socket_id).copied()
    }

    /// Presentation refinement for wildcard sockets: when the formal type is
    /// `any` but the connected upstream type is known, the label gains a
    /// hint. The socket type itself never changes, so compatibility checks
    /// are unaffected.
    pub fn refined_label(&self, socket_id: &str, label: &str, ty: ValueType) -> String {
        if ty.is_wildcard() {
            if let Some(upstream) = self.upstream_type(socket_id) {
                if !upstream.is_flow() && !upstream.is_wildcard() {
                    return format!("{label} ({upstream})");
                }
            }
        }
        label.to_string()
    }
}
