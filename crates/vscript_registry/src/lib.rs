//! vscript_registry: Scoped symbol registry for the graph editor.
//!
//! Tracks, per document, the scope tree, the two symbol namespaces
//! (variables and functions), which scopes are currently entered, and who
//! wants to be told when any of that changes. The registry is the single
//! source of truth that socket resolution and autocomplete read from.
//!
//! All operations are total: lookup misses are `Option::None`, unknown
//! scopes fall open to document-wide visibility, and teardown races degrade
//! instead of panicking.

mod observe;
mod registry;
mod scope;
mod symbol;

pub use observe::{ChangeFlags, RegistryEvent, SubscriptionId};
pub use registry::{FunctionDecl, SymbolRegistry, VariableDecl, VisibleSymbol};
pub use scope::{Scope, ScopeKind};
pub use symbol::{
    FunctionPatch, FunctionSymbol, Parameter, ScopedTable, SymbolEntry, VariablePatch,
    VariableSymbol,
};
