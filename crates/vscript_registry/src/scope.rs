//! The per-document scope tree and active-scope tracking.
//!
//! Scopes form a tree rooted at the document's implicit global scope. The
//! global scope has no record of its own: it is the `None` parent every
//! top-level scope hangs off, and globally-scoped symbols carry no scope id
//! at all.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use vscript_core::ids::{NodeId, ScopeId};
use vscript_core::intern::InternedString;

/// What kind of construct introduced a scope.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeKind {
    Function,
    Loop,
    Block,
}

/// One scope record. Owned by the graph node that introduced it.
#[derive(Debug, Clone)]
pub struct Scope {
    pub id: ScopeId,
    /// Enclosing scope; `None` means the implicit global root.
    pub parent: Option<ScopeId>,
    pub kind: ScopeKind,
    /// The node whose mount created this scope.
    pub owner: NodeId,
    /// Names declared directly in this scope. Cache kept in step with the
    /// symbol tables for O(1) scope-local membership checks.
    pub members: FxHashSet<InternedString>,
    pub children: FxHashSet<ScopeId>,
}

/// The scope tree of one document, plus which scopes are currently entered.
///
/// The active list is ordered by entry time but supports removal from any
/// position: UI remounts enter and exit out of order, so this is not a
/// strict stack. "Current" always means the most recently entered scope
/// that is still active.
#[derive(Debug, Default)]
pub struct ScopeTree {
    scopes: FxHashMap<ScopeId, Scope>,
    active: Vec<ScopeId>,
    next_id: u32,
}

impl ScopeTree {
    /// Parent-chain walks are bounded to guard against a corrupted tree.
    const MAX_CHAIN_DEPTH: usize = 500;

    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scope under `parent` (`None` = under the global root).
    /// A parent id that no longer exists degrades to the global root rather
    /// than failing.
    pub fn create(&mut self, kind: ScopeKind, owner: NodeId, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(self.next_id);
        self.next_id += 1;

        let parent = parent.filter(|p| self.scopes.contains_key(p));
        if let Some(parent_id) = parent {
            if let Some(parent_scope) = self.scopes.get_mut(&parent_id) {
                parent_scope.children.insert(id);
            }
        }
        self.scopes.insert(
            id,
            Scope {
                id,
                parent,
                kind,
                owner,
                members: FxHashSet::default(),
                children: FxHashSet::default(),
            },
        );
        id
    }

    /// Destroy `id` and every scope nested inside it. Destroyed scopes are
    /// also removed from the active list. Returns the destroyed ids so the
    /// caller can cascade symbol removal; empty when `id` is already gone.
    pub fn destroy(&mut self, id: ScopeId) -> Vec<ScopeId> {
        if !self.scopes.contains_key(&id) {
            return Vec::new();
        }
        let parent = self.scopes.get(&id).and_then(|scope| scope.parent);
        let mut destroyed = Vec::new();
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            if let Some(scope) = self.scopes.remove(&next) {
                pending.extend(scope.children.iter().copied());
                destroyed.push(next);
            }
        }
        if let Some(parent_scope) = parent.and_then(|p| self.scopes.get_mut(&p)) {
            parent_scope.children.remove(&id);
        }
        self.active.retain(|active| !destroyed.contains(active));
        destroyed
    }

    /// Mark `id` as entered. Re-entering an already-active scope moves it to
    /// the top of the entry order. Unknown ids are ignored. Returns whether
    /// the active order changed.
    pub fn enter(&mut self, id: ScopeId) -> bool {
        if !self.scopes.contains_key(&id) {
            return false;
        }
        self.active.retain(|&active| active != id);
        self.active.push(id);
        true
    }

    /// Mark `id` as exited, wherever it sits in the entry order. Returns
    /// whether it was active.
    pub fn exit(&mut self, id: ScopeId) -> bool {
        let before = self.active.len();
        self.active.retain(|&active| active != id);
        self.active.len() != before
    }

    /// The most recently entered scope still active.
    pub fn current(&self) -> Option<ScopeId> {
        self.active.last().copied()
    }

    pub fn is_active(&self, id: ScopeId) -> bool {
        self.active.contains(&id)
    }

    pub fn get(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(&id)
    }

    pub fn get_mut(&mut self, id: ScopeId) -> Option<&mut Scope> {
        self.scopes.get_mut(&id)
    }

    pub fn contains(&self, id: ScopeId) -> bool {
        self.scopes.contains_key(&id)
    }

    /// All live scopes, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Scope> {
        self.scopes.values()
    }

    pub(crate) fn active_len(&self) -> usize {
        self.active.len()
    }

    /// The scope chain from `id` to the root, innermost first. An unknown
    /// `id` yields an empty chain; callers treat that as fail-open.
    pub fn chain(&self, id: ScopeId) -> Vec<ScopeId> {
        let mut chain = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let Some(scope) = self.scopes.get(&current) else {
                break;
            };
            chain.push(current);
            if chain.len() >= Self::MAX_CHAIN_DEPTH {
                break;
            }
            cursor = scope.parent;
        }
        chain
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}
