//! Symbol definitions and the generic scoped symbol table.
//!
//! Variables and functions are separate namespaces with identical table
//! mechanics, so the table is generic over the entry type and instantiated
//! twice per document.

use crate::scope::ScopeKind;
use indexmap::IndexMap;
use vscript_core::ids::{NodeId, ScopeId};
use vscript_core::intern::InternedString;
use vscript_core::types::ValueType;

/// A variable declaration visible to the graph.
#[derive(Debug, Clone)]
pub struct VariableSymbol {
    /// Interned name; the table key.
    pub name: InternedString,
    /// The name as typed by the user, kept for display and matching.
    pub name_text: String,
    /// Declared value type.
    pub ty: ValueType,
    /// Owning scope; `None` means the symbol is global to its document.
    pub scope: Option<ScopeId>,
    /// Cached kind of the owning scope, for filtering without a tree walk.
    pub scope_kind: Option<ScopeKind>,
    /// Immutability marker. Informational; nothing in the core enforces it.
    pub is_constant: bool,
    /// The graph node that declared this variable, when known.
    pub node: Option<NodeId>,
}

/// One parameter of a function signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub ty: ValueType,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: ValueType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// A function declaration visible to the graph. Call nodes resolve their
/// sockets from this signature by name.
#[derive(Debug, Clone)]
pub struct FunctionSymbol {
    pub name: InternedString,
    pub name_text: String,
    /// Ordered parameter list; drives the call node's input sockets.
    pub params: Vec<Parameter>,
    pub return_ty: ValueType,
    pub scope: Option<ScopeId>,
    pub scope_kind: Option<ScopeKind>,
    /// The function-definition node that owns this symbol.
    pub node: NodeId,
}

/// Partial update for a variable. Unset fields are left untouched.
/// Rescoping goes through a fresh `declare`, not a patch.
#[derive(Debug, Clone, Copy, Default)]
pub struct VariablePatch {
    pub ty: Option<ValueType>,
    pub is_constant: Option<bool>,
}

/// Partial update for a function signature.
#[derive(Debug, Clone, Default)]
pub struct FunctionPatch {
    pub params: Option<Vec<Parameter>>,
    pub return_ty: Option<ValueType>,
}

/// Common surface the table needs from both symbol kinds.
pub trait SymbolEntry {
    fn name(&self) -> InternedString;
    fn name_text(&self) -> &str;
    fn scope(&self) -> Option<ScopeId>;
}

impl SymbolEntry for VariableSymbol {
    fn name(&self) -> InternedString {
        self.name
    }
    fn name_text(&self) -> &str {
        &self.name_text
    }
    fn scope(&self) -> Option<ScopeId> {
        self.scope
    }
}

impl SymbolEntry for FunctionSymbol {
    fn name(&self) -> InternedString {
        self.name
    }
    fn name_text(&self) -> &str {
        &self.name_text
    }
    fn scope(&self) -> Option<ScopeId> {
        self.scope
    }
}

/// An insertion-ordered symbol table keyed by interned name.
///
/// Iteration order is the declaration order the user saw, which the UI
/// relies on for stable listings. Overwriting a name keeps its original
/// position, so "the symbol named X" stays put while its fields change.
#[derive(Debug, Clone)]
pub struct ScopedTable<S> {
    entries: IndexMap<InternedString, S>,
}

impl<S: SymbolEntry> ScopedTable<S> {
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Insert or overwrite by name. Returns the replaced entry, if any.
    pub fn declare(&mut self, symbol: S) -> Option<S> {
        self.entries.insert(symbol.name(), symbol)
    }

    /// Merge an update into the named entry. No-op when the name is absent.
    /// Returns whether anything was found to update.
    pub fn update(&mut self, name: InternedString, f: impl FnOnce(&mut S)) -> bool {
        match self.entries.get_mut(&name) {
            Some(entry) => {
                f(entry);
                true
            }
            None => false,
        }
    }

    /// Remove by name, preserving the relative order of the rest.
    pub fn remove(&mut self, name: InternedString) -> Option<S> {
        self.entries.shift_remove(&name)
    }

    pub fn lookup(&self, name: InternedString) -> Option<&S> {
        self.entries.get(&name)
    }

    pub fn contains(&self, name: InternedString) -> bool {
        self.entries.contains_key(&name)
    }

    /// All entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &S> {
        self.entries.values()
    }

    /// Entries owned directly by `scope`, in insertion order.
    pub fn iter_scope(&self, scope: Option<ScopeId>) -> impl Iterator<Item = &S> + '_ {
        self.entries.values().filter(move |s| s.scope() == scope)
    }

    /// Drop every entry owned by one of `scopes`. Returns the removed names.
    pub fn remove_scope_members(&mut self, scopes: &[ScopeId]) -> Vec<InternedString> {
        let mut removed = Vec::new();
        self.entries.retain(|name, entry| match entry.scope() {
            Some(id) if scopes.contains(&id) => {
                removed.push(*name);
                false
            }
            _ => true,
        });
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: SymbolEntry> Default for ScopedTable<S> {
    fn default() -> Self {
        Self::new()
    }
}
