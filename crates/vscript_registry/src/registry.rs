//! The symbol registry: one service object owning every document's scope
//! tree and symbol tables.
//!
//! Constructed once per editor session and passed by reference to every
//! consumer. Nothing here is reachable through globals, so tests can spin up
//! as many independent registries as they like.
//!
//! Every operation is total. Lookup misses return `None`, mutations on
//! missing names are no-ops, and visibility queries against a scope that no
//! longer exists fail open to the whole document rather than hiding
//! everything mid-teardown.

use crate::observe::{ChangeFlags, RegistryEvent, Subscribers, SubscriptionId};
use crate::scope::{Scope, ScopeKind, ScopeTree};
use crate::symbol::{
    FunctionPatch, FunctionSymbol, Parameter, ScopedTable, SymbolEntry, VariablePatch,
    VariableSymbol,
};
use rustc_hash::{FxHashMap, FxHashSet};
use vscript_core::ids::{DocumentId, NodeId, ScopeId};
use vscript_core::intern::{InternedString, StringInterner};
use vscript_core::types::ValueType;

/// Everything the registry tracks for one document. Created lazily on first
/// write and released again once the last scope and symbol are gone.
#[derive(Debug, Default)]
struct DocumentState {
    scopes: ScopeTree,
    variables: ScopedTable<VariableSymbol>,
    functions: ScopedTable<FunctionSymbol>,
}

impl DocumentState {
    fn is_empty(&self) -> bool {
        self.scopes.is_empty() && self.variables.is_empty() && self.functions.is_empty()
    }
}

/// A variable declaration request.
#[derive(Debug, Clone)]
pub struct VariableDecl<'a> {
    pub name: &'a str,
    pub ty: ValueType,
    /// Owning scope; `None` declares the variable global.
    pub scope: Option<ScopeId>,
    pub is_constant: bool,
    /// The node performing the declaration, when the host tracks it.
    pub node: Option<NodeId>,
}

impl<'a> VariableDecl<'a> {
    pub fn new(name: &'a str, ty: ValueType) -> Self {
        Self {
            name,
            ty,
            scope: None,
            is_constant: false,
            node: None,
        }
    }

    pub fn in_scope(mut self, scope: ScopeId) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn constant(mut self) -> Self {
        self.is_constant = true;
        self
    }

    pub fn declared_by(mut self, node: NodeId) -> Self {
        self.node = Some(node);
        self
    }
}

/// A function declaration request.
#[derive(Debug, Clone)]
pub struct FunctionDecl<'a> {
    pub name: &'a str,
    pub params: Vec<Parameter>,
    pub return_ty: ValueType,
    /// Owning scope; `None` declares the function global.
    pub scope: Option<ScopeId>,
    /// The function-definition node. Call nodes follow this back-reference.
    pub node: NodeId,
}

/// One entry of the merged visibility view handed to autocomplete.
#[derive(Debug, Clone, Copy)]
pub enum VisibleSymbol<'a> {
    Variable(&'a VariableSymbol),
    Function(&'a FunctionSymbol),
}

impl<'a> VisibleSymbol<'a> {
    pub fn name_text(&self) -> &'a str {
        match self {
            VisibleSymbol::Variable(v) => &v.name_text,
            VisibleSymbol::Function(f) => &f.name_text,
        }
    }

    /// The type a suggestion list displays: the variable's declared type, or
    /// `function` for functions.
    pub fn ty(&self) -> ValueType {
        match self {
            VisibleSymbol::Variable(v) => v.ty,
            VisibleSymbol::Function(_) => ValueType::Function,
        }
    }

    pub fn scope(&self) -> Option<ScopeId> {
        match self {
            VisibleSymbol::Variable(v) => v.scope,
            VisibleSymbol::Function(f) => f.scope,
        }
    }

    pub fn is_function(&self) -> bool {
        matches!(self, VisibleSymbol::Function(_))
    }
}

/// The registry service. One per editor session.
pub struct SymbolRegistry {
    interner: StringInterner,
    documents: FxHashMap<DocumentId, DocumentState>,
    subscribers: Subscribers,
}

impl SymbolRegistry {
    pub fn new() -> Self {
        Self {
            interner: StringInterner::new(),
            documents: FxHashMap::default(),
            subscribers: Subscribers::default(),
        }
    }

    /// The shared name interner. Hand this to UI code that needs to resolve
    /// interned names back to text.
    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    /// Whether any state is currently held for `document`. Empty documents
    /// are released eagerly, so this flips back to `false` once the last
    /// scope and symbol are gone.
    pub fn contains_document(&self, document: DocumentId) -> bool {
        self.documents.contains_key(&document)
    }

    // ========================================================================
    // Subscriptions
    // ========================================================================

    /// Register a change callback. It runs synchronously after every
    /// mutation, once the registries are consistent.
    pub fn subscribe(
        &mut self,
        callback: impl Fn(&RegistryEvent) + 'static,
    ) -> SubscriptionId {
        self.subscribers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    // ========================================================================
    // Scope lifecycle
    // ========================================================================

    /// Create a scope owned by `owner` under `parent` (`None` = global
    /// root). Returns the new scope id.
    pub fn create_scope(
        &mut self,
        document: DocumentId,
        kind: ScopeKind,
        owner: NodeId,
        parent: Option<ScopeId>,
    ) -> ScopeId {
        let state = self.documents.entry(document).or_default();
        let id = state.scopes.create(kind, owner, parent);
        self.subscribers.notify(document, ChangeFlags::SCOPES);
        id
    }

    /// Destroy `id` and everything nested inside it. Member symbols of every
    /// destroyed scope are cascade-deleted; the owning nodes are going away
    /// with the scope, so orphaned symbols would only dangle.
    pub fn destroy_scope(&mut self, document: DocumentId, id: ScopeId) {
        let Some(state) = self.documents.get_mut(&document) else {
            return;
        };
        let active_before = state.scopes.active_len();
        let destroyed = state.scopes.destroy(id);
        if destroyed.is_empty() {
            return;
        }

        let mut changes = ChangeFlags::SCOPES;
        if state.scopes.active_len() != active_before {
            changes |= ChangeFlags::ACTIVE;
        }
        if !state.variables.remove_scope_members(&destroyed).is_empty() {
            changes |= ChangeFlags::VARIABLES;
        }
        if !state.functions.remove_scope_members(&destroyed).is_empty() {
            changes |= ChangeFlags::FUNCTIONS;
        }

        self.release_if_empty(document);
        self.subscribers.notify(document, changes);
    }

    pub fn enter_scope(&mut self, document: DocumentId, id: ScopeId) {
        let Some(state) = self.documents.get_mut(&document) else {
            return;
        };
        if state.scopes.enter(id) {
            self.subscribers.notify(document, ChangeFlags::ACTIVE);
        }
    }

    pub fn exit_scope(&mut self, document: DocumentId, id: ScopeId) {
        let Some(state) = self.documents.get_mut(&document) else {
            return;
        };
        if state.scopes.exit(id) {
            self.subscribers.notify(document, ChangeFlags::ACTIVE);
        }
    }

    /// The most recently entered scope still active in `document`.
    pub fn current_scope(&self, document: DocumentId) -> Option<ScopeId> {
        self.documents
            .get(&document)
            .and_then(|state| state.scopes.current())
    }

    pub fn scope(&self, document: DocumentId, id: ScopeId) -> Option<&Scope> {
        self.documents
            .get(&document)
            .and_then(|state| state.scopes.get(id))
    }

    // ========================================================================
    // Variables
    // ========================================================================

    /// Insert or overwrite a variable by name. Declaring an empty name is a
    /// no-op; the editor clears names while the user is still typing.
    pub fn declare_variable(&mut self, document: DocumentId, decl: VariableDecl<'_>) {
        if decl.name.is_empty() {
            return;
        }
        let name = self.interner.intern(decl.name);
        let state = self.documents.entry(document).or_default();

        // A scope that no longer exists degrades to a global declaration.
        let scope = decl.scope.filter(|s| state.scopes.contains(*s));
        let scope_kind = scope
            .and_then(|s| state.scopes.get(s))
            .map(|scope| scope.kind);

        let previous = state.variables.declare(VariableSymbol {
            name,
            name_text: decl.name.to_string(),
            ty: decl.ty,
            scope,
            scope_kind,
            is_constant: decl.is_constant,
            node: decl.node,
        });

        if let Some(old) = previous {
            if old.scope != scope {
                detach_member(state, old.scope, name);
            }
        }
        if let Some(scope_id) = scope {
            if let Some(scope) = state.scopes.get_mut(scope_id) {
                scope.members.insert(name);
            }
        }
        self.subscribers.notify(document, ChangeFlags::VARIABLES);
    }

    /// Merge `patch` into the named variable. No-op when absent.
    pub fn update_variable(
        &mut self,
        document: DocumentId,
        name: &str,
        patch: VariablePatch,
    ) -> bool {
        let Some(name) = self.interner.get(name) else {
            return false;
        };
        let Some(state) = self.documents.get_mut(&document) else {
            return false;
        };
        let touched = state.variables.update(name, |var| {
            if let Some(ty) = patch.ty {
                var.ty = ty;
            }
            if let Some(is_constant) = patch.is_constant {
                var.is_constant = is_constant;
            }
        });
        if touched {
            self.subscribers.notify(document, ChangeFlags::VARIABLES);
        }
        touched
    }

    pub fn remove_variable(&mut self, document: DocumentId, name: &str) -> bool {
        let Some(name) = self.interner.get(name) else {
            return false;
        };
        let Some(state) = self.documents.get_mut(&document) else {
            return false;
        };
        let Some(removed) = state.variables.remove(name) else {
            return false;
        };
        detach_member(state, removed.scope, name);
        self.release_if_empty(document);
        self.subscribers.notify(document, ChangeFlags::VARIABLES);
        true
    }

    pub fn variable(&self, document: DocumentId, name: &str) -> Option<&VariableSymbol> {
        let name = self.interner.get(name)?;
        self.documents
            .get(&document)?
            .variables
            .lookup(name)
    }

    /// All variables of `document`, in declaration order.
    pub fn variables(&self, document: DocumentId) -> Vec<&VariableSymbol> {
        self.documents
            .get(&document)
            .map(|state| state.variables.iter().collect())
            .unwrap_or_default()
    }

    // ========================================================================
    // Functions
    // ========================================================================

    /// Insert or overwrite a function signature by name.
    pub fn declare_function(&mut self, document: DocumentId, decl: FunctionDecl<'_>) {
        if decl.name.is_empty() {
            return;
        }
        let name = self.interner.intern(decl.name);
        let state = self.documents.entry(document).or_default();

        let scope = decl.scope.filter(|s| state.scopes.contains(*s));
        let scope_kind = scope
            .and_then(|s| state.scopes.get(s))
            .map(|scope| scope.kind);

        let previous = state.functions.declare(FunctionSymbol {
            name,
            name_text: decl.name.to_string(),
            params: decl.params,
            return_ty: decl.return_ty,
            scope,
            scope_kind,
            node: decl.node,
        });

        if let Some(old) = previous {
            if old.scope != scope {
                detach_member(state, old.scope, name);
            }
        }
        if let Some(scope_id) = scope {
            if let Some(scope) = state.scopes.get_mut(scope_id) {
                scope.members.insert(name);
            }
        }
        self.subscribers.notify(document, ChangeFlags::FUNCTIONS);
    }

    /// Merge `patch` into the named function. No-op when absent.
    pub fn update_function(
        &mut self,
        document: DocumentId,
        name: &str,
        patch: FunctionPatch,
    ) -> bool {
        let Some(name) = self.interner.get(name) else {
            return false;
        };
        let Some(state) = self.documents.get_mut(&document) else {
            return false;
        };
        let touched = state.functions.update(name, |func| {
            if let Some(params) = patch.params {
                func.params = params;
            }
            if let Some(return_ty) = patch.return_ty {
                func.return_ty = return_ty;
            }
        });
        if touched {
            self.subscribers.notify(document, ChangeFlags::FUNCTIONS);
        }
        touched
    }

    pub fn remove_function(&mut self, document: DocumentId, name: &str) -> bool {
        let Some(name) = self.interner.get(name) else {
            return false;
        };
        let Some(state) = self.documents.get_mut(&document) else {
            return false;
        };
        let Some(removed) = state.functions.remove(name) else {
            return false;
        };
        detach_member(state, removed.scope, name);
        self.release_if_empty(document);
        self.subscribers.notify(document, ChangeFlags::FUNCTIONS);
        true
    }

    pub fn function(&self, document: DocumentId, name: &str) -> Option<&FunctionSymbol> {
        let name = self.interner.get(name)?;
        self.documents
            .get(&document)?
            .functions
            .lookup(name)
    }

    /// All functions of `document`, in declaration order.
    pub fn functions(&self, document: DocumentId) -> Vec<&FunctionSymbol> {
        self.documents
            .get(&document)
            .map(|state| state.functions.iter().collect())
            .unwrap_or_default()
    }

    // ========================================================================
    // Visibility
    // ========================================================================

    /// Variables visible at `scope` (`None` = the global scope), nearest
    /// declaration first. Shadowed names resolve to the innermost scope.
    pub fn visible_variables(
        &self,
        document: DocumentId,
        scope: Option<ScopeId>,
    ) -> Vec<&VariableSymbol> {
        match self.documents.get(&document) {
            Some(state) => visible_entries(&state.scopes, &state.variables, scope),
            None => Vec::new(),
        }
    }

    /// Functions visible at `scope`, same resolution rules as variables.
    pub fn visible_functions(
        &self,
        document: DocumentId,
        scope: Option<ScopeId>,
    ) -> Vec<&FunctionSymbol> {
        match self.documents.get(&document) {
            Some(state) => visible_entries(&state.scopes, &state.functions, scope),
            None => Vec::new(),
        }
    }

    /// The merged view both namespaces project for suggestion lists:
    /// variables first, then functions, each in visibility order.
    pub fn visible_symbols(
        &self,
        document: DocumentId,
        scope: Option<ScopeId>,
    ) -> Vec<VisibleSymbol<'_>> {
        let mut merged: Vec<VisibleSymbol<'_>> = Vec::new();
        merged.extend(
            self.visible_variables(document, scope)
                .into_iter()
                .map(VisibleSymbol::Variable),
        );
        merged.extend(
            self.visible_functions(document, scope)
                .into_iter()
                .map(VisibleSymbol::Function),
        );
        merged
    }

    // ========================================================================
    // Node lifecycle hooks
    // ========================================================================

    /// Mount hook for scope-introducing nodes. Creates the node's scope,
    /// enters it, and declares the initial locals (loop index, function
    /// parameters) inside it. Returns the scope id for the paired unmount.
    pub fn node_mounted(
        &mut self,
        document: DocumentId,
        node: NodeId,
        kind: ScopeKind,
        parent: Option<ScopeId>,
        locals: &[(&str, ValueType)],
    ) -> ScopeId {
        let state = self.documents.entry(document).or_default();
        let scope_id = state.scopes.create(kind, node, parent);
        state.scopes.enter(scope_id);

        let mut changes = ChangeFlags::SCOPES | ChangeFlags::ACTIVE;
        for (local_name, ty) in locals {
            if local_name.is_empty() {
                continue;
            }
            let name = self.interner.intern(local_name);
            state.variables.declare(VariableSymbol {
                name,
                name_text: (*local_name).to_string(),
                ty: *ty,
                scope: Some(scope_id),
                scope_kind: Some(kind),
                is_constant: false,
                node: Some(node),
            });
            if let Some(scope) = state.scopes.get_mut(scope_id) {
                scope.members.insert(name);
            }
            changes |= ChangeFlags::VARIABLES;
        }
        self.subscribers.notify(document, changes);
        scope_id
    }

    /// Teardown hook paired with [`Self::node_mounted`]. Exits and destroys
    /// every scope the node owns and removes every symbol it declared, in
    /// whatever scope that symbol landed. Safe to call more than once and
    /// safe to call for nodes that never introduced a scope.
    pub fn node_unmounted(&mut self, document: DocumentId, node: NodeId) {
        let Some(state) = self.documents.get_mut(&document) else {
            return;
        };

        let owned: Vec<ScopeId> = state
            .scopes
            .iter()
            .filter(|scope| scope.owner == node)
            .map(|scope| scope.id)
            .collect();

        let mut changes = ChangeFlags::empty();
        let active_before = state.scopes.active_len();
        let mut destroyed = Vec::new();
        for scope_id in owned {
            destroyed.extend(state.scopes.destroy(scope_id));
        }
        if !destroyed.is_empty() {
            changes |= ChangeFlags::SCOPES;
            if state.scopes.active_len() != active_before {
                changes |= ChangeFlags::ACTIVE;
            }
            if !state.variables.remove_scope_members(&destroyed).is_empty() {
                changes |= ChangeFlags::VARIABLES;
            }
            if !state.functions.remove_scope_members(&destroyed).is_empty() {
                changes |= ChangeFlags::FUNCTIONS;
            }
        }

        // Symbols this node declared into scopes that outlive it.
        let declared_vars: Vec<InternedString> = state
            .variables
            .iter()
            .filter(|var| var.node == Some(node))
            .map(|var| var.name)
            .collect();
        for name in declared_vars {
            if let Some(removed) = state.variables.remove(name) {
                detach_member(state, removed.scope, name);
                changes |= ChangeFlags::VARIABLES;
            }
        }
        let declared_fns: Vec<InternedString> = state
            .functions
            .iter()
            .filter(|func| func.node == node)
            .map(|func| func.name)
            .collect();
        for name in declared_fns {
            if let Some(removed) = state.functions.remove(name) {
                detach_member(state, removed.scope, name);
                changes |= ChangeFlags::FUNCTIONS;
            }
        }

        self.release_if_empty(document);
        self.subscribers.notify(document, changes);
    }

    fn release_if_empty(&mut self, document: DocumentId) {
        if self
            .documents
            .get(&document)
            .is_some_and(|state| state.is_empty())
        {
            self.documents.remove(&document);
        }
    }
}

impl Default for SymbolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SymbolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymbolRegistry")
            .field("documents", &self.documents.len())
            .field("subscribers", &self.subscribers)
            .finish()
    }
}

/// Shared visibility walk for both namespaces.
///
/// Innermost-to-outermost over the scope chain, then the globals; the first
/// occurrence of a name wins, which is exactly nearest-scope-wins shadowing.
/// A scope id that no longer exists falls open to every entry in the table:
/// mid-teardown the editor would rather over-show than blank out.
fn visible_entries<'a, S: SymbolEntry>(
    scopes: &ScopeTree,
    table: &'a ScopedTable<S>,
    scope: Option<ScopeId>,
) -> Vec<&'a S> {
    if let Some(id) = scope {
        if !scopes.contains(id) {
            return table.iter().collect();
        }
    }

    let chain = match scope {
        Some(id) => scopes.chain(id),
        None => Vec::new(),
    };

    let mut seen: FxHashSet<InternedString> = FxHashSet::default();
    let mut result = Vec::new();
    for scope_id in &chain {
        for entry in table.iter_scope(Some(*scope_id)) {
            if seen.insert(entry.name()) {
                result.push(entry);
            }
        }
    }
    for entry in table.iter_scope(None) {
        if seen.insert(entry.name()) {
            result.push(entry);
        }
    }
    result
}

/// Drop `name` from a scope's member cache, unless the other namespace still
/// declares the same name in the same scope.
fn detach_member(state: &mut DocumentState, scope: Option<ScopeId>, name: InternedString) {
    let Some(scope_id) = scope else {
        return;
    };
    let still_used = state
        .variables
        .lookup(name)
        .is_some_and(|var| var.scope == Some(scope_id))
        || state
            .functions
            .lookup(name)
            .is_some_and(|func| func.scope == Some(scope_id));
    if still_used {
        return;
    }
    if let Some(scope) = state.scopes.get_mut(scope_id) {
        scope.members.remove(&name);
    }
}
