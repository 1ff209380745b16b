//! Registry integration tests.
//!
//! Exercises the scope tree, both symbol namespaces, visibility resolution,
//! the node lifecycle hooks, and change notification together.

use std::cell::RefCell;
use std::rc::Rc;
use vscript_core::ids::{DocumentId, NodeId};
use vscript_core::types::ValueType;
use vscript_registry::{
    ChangeFlags, FunctionDecl, Parameter, ScopeKind, SymbolRegistry, VariableDecl, VariablePatch,
};

const DOC: DocumentId = DocumentId(1);
const OTHER_DOC: DocumentId = DocumentId(2);

fn node(n: u32) -> NodeId {
    NodeId(n)
}

/// Helper: the visible variable names at a scope, in resolution order.
fn visible_names(
    registry: &SymbolRegistry,
    scope: Option<vscript_core::ids::ScopeId>,
) -> Vec<String> {
    registry
        .visible_variables(DOC, scope)
        .iter()
        .map(|var| var.name_text.clone())
        .collect()
}

// ============================================================================
// Symbol tables
// ============================================================================

#[test]
fn test_declare_twice_keeps_one_entry_with_latest_type() {
    let mut registry = SymbolRegistry::new();
    registry.declare_variable(DOC, VariableDecl::new("count", ValueType::Number));
    registry.declare_variable(DOC, VariableDecl::new("count", ValueType::String));

    let all = registry.variables(DOC);
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].ty, ValueType::String);
}

#[test]
fn test_update_merges_fields() {
    let mut registry = SymbolRegistry::new();
    registry.declare_variable(DOC, VariableDecl::new("hp", ValueType::Number));

    let touched = registry.update_variable(
        DOC,
        "hp",
        VariablePatch {
            is_constant: Some(true),
            ..Default::default()
        },
    );
    assert!(touched);
    let var = registry.variable(DOC, "hp").unwrap();
    assert_eq!(var.ty, ValueType::Number);
    assert!(var.is_constant);

    assert!(!registry.update_variable(DOC, "missing", VariablePatch::default()));
}

#[test]
fn test_empty_name_declarations_are_ignored() {
    let mut registry = SymbolRegistry::new();
    registry.declare_variable(DOC, VariableDecl::new("", ValueType::Number));
    assert!(registry.variables(DOC).is_empty());
    assert!(!registry.contains_document(DOC));
}

#[test]
fn test_document_state_released_when_empty() {
    let mut registry = SymbolRegistry::new();
    registry.declare_variable(DOC, VariableDecl::new("x", ValueType::Number));
    assert!(registry.contains_document(DOC));

    registry.remove_variable(DOC, "x");
    assert!(!registry.contains_document(DOC));
}

#[test]
fn test_documents_are_isolated() {
    let mut registry = SymbolRegistry::new();
    registry.declare_variable(DOC, VariableDecl::new("shared", ValueType::Number));
    registry.declare_variable(OTHER_DOC, VariableDecl::new("shared", ValueType::String));

    assert_eq!(registry.variable(DOC, "shared").unwrap().ty, ValueType::Number);
    assert_eq!(
        registry.variable(OTHER_DOC, "shared").unwrap().ty,
        ValueType::String
    );
    assert_eq!(registry.visible_variables(DOC, None).len(), 1);
}

#[test]
fn test_variables_and_functions_may_share_a_name() {
    let mut registry = SymbolRegistry::new();
    registry.declare_variable(DOC, VariableDecl::new("spawn", ValueType::Table));
    registry.declare_function(
        DOC,
        FunctionDecl {
            name: "spawn",
            params: vec![],
            return_ty: ValueType::Nil,
            scope: None,
            node: node(9),
        },
    );

    assert!(registry.variable(DOC, "spawn").is_some());
    assert!(registry.function(DOC, "spawn").is_some());
}

// ============================================================================
// Visibility
// ============================================================================

#[test]
fn test_scoped_variable_invisible_at_global() {
    let mut registry = SymbolRegistry::new();
    let loop_scope = registry.create_scope(DOC, ScopeKind::Loop, node(1), None);
    registry.declare_variable(
        DOC,
        VariableDecl::new("i", ValueType::Number).in_scope(loop_scope),
    );

    assert_eq!(visible_names(&registry, Some(loop_scope)), vec!["i"]);
    assert!(visible_names(&registry, None).is_empty());
}

#[test]
fn test_globals_visible_everywhere() {
    let mut registry = SymbolRegistry::new();
    registry.declare_variable(DOC, VariableDecl::new("score", ValueType::Number));
    let fn_scope = registry.create_scope(DOC, ScopeKind::Function, node(1), None);
    let block = registry.create_scope(DOC, ScopeKind::Block, node(2), Some(fn_scope));

    assert_eq!(visible_names(&registry, Some(block)), vec!["score"]);
    assert_eq!(visible_names(&registry, Some(fn_scope)), vec!["score"]);
    assert_eq!(visible_names(&registry, None), vec!["score"]);
}

#[test]
fn test_parent_scope_symbols_visible_in_child() {
    let mut registry = SymbolRegistry::new();
    let outer = registry.create_scope(DOC, ScopeKind::Function, node(1), None);
    let inner = registry.create_scope(DOC, ScopeKind::Block, node(2), Some(outer));
    registry.declare_variable(
        DOC,
        VariableDecl::new("acc", ValueType::Number).in_scope(outer),
    );

    assert_eq!(visible_names(&registry, Some(inner)), vec!["acc"]);
    // Not the other way around: a child declaration stays invisible outside.
    registry.declare_variable(
        DOC,
        VariableDecl::new("tmp", ValueType::String).in_scope(inner),
    );
    assert_eq!(visible_names(&registry, Some(outer)), vec!["acc"]);
}

#[test]
fn test_shadowing_resolves_to_nearest_scope() {
    let mut registry = SymbolRegistry::new();
    registry.declare_variable(DOC, VariableDecl::new("count", ValueType::Number));
    let block = registry.create_scope(DOC, ScopeKind::Block, node(1), None);

    // Same name, different type, declared in the block. The registry keys by
    // name per namespace, so the block declaration overwrites; nearest-scope
    // resolution is observed through the single surviving entry.
    registry.declare_variable(
        DOC,
        VariableDecl::new("count", ValueType::String).in_scope(block),
    );

    let visible = registry.visible_variables(DOC, Some(block));
    let count = visible
        .iter()
        .find(|var| var.name_text == "count")
        .expect("count must be visible in the block");
    assert_eq!(count.ty, ValueType::String);
    assert_eq!(count.scope, Some(block));
}

#[test]
fn test_inner_declarations_listed_before_outer() {
    let mut registry = SymbolRegistry::new();
    registry.declare_variable(DOC, VariableDecl::new("g", ValueType::Number));
    let outer = registry.create_scope(DOC, ScopeKind::Function, node(1), None);
    let inner = registry.create_scope(DOC, ScopeKind::Block, node(2), Some(outer));
    registry.declare_variable(
        DOC,
        VariableDecl::new("o", ValueType::Number).in_scope(outer),
    );
    registry.declare_variable(
        DOC,
        VariableDecl::new("n", ValueType::Number).in_scope(inner),
    );

    assert_eq!(visible_names(&registry, Some(inner)), vec!["n", "o", "g"]);
}

#[test]
fn test_unknown_scope_falls_open_to_all_symbols() {
    let mut registry = SymbolRegistry::new();
    let scope = registry.create_scope(DOC, ScopeKind::Loop, node(1), None);
    registry.declare_variable(
        DOC,
        VariableDecl::new("i", ValueType::Number).in_scope(scope),
    );
    registry.declare_variable(DOC, VariableDecl::new("g", ValueType::String));
    registry.destroy_scope(DOC, scope);

    // `i` died with its scope; a stale scope id still shows everything left.
    let stale = vscript_core::ids::ScopeId(999);
    assert_eq!(visible_names(&registry, Some(stale)), vec!["g"]);
}

// ============================================================================
// Scope teardown
// ============================================================================

#[test]
fn test_destroy_scope_cascades_symbols() {
    let mut registry = SymbolRegistry::new();
    let fn_scope = registry.create_scope(DOC, ScopeKind::Function, node(1), None);
    let block = registry.create_scope(DOC, ScopeKind::Block, node(2), Some(fn_scope));
    registry.declare_variable(
        DOC,
        VariableDecl::new("a", ValueType::Number).in_scope(fn_scope),
    );
    registry.declare_variable(
        DOC,
        VariableDecl::new("b", ValueType::Number).in_scope(block),
    );
    registry.declare_variable(DOC, VariableDecl::new("g", ValueType::Number));

    registry.destroy_scope(DOC, fn_scope);

    // Nothing retrievable anywhere still claims the destroyed scopes.
    assert!(registry.variable(DOC, "a").is_none());
    assert!(registry.variable(DOC, "b").is_none());
    assert_eq!(visible_names(&registry, None), vec!["g"]);
    assert!(registry.scope(DOC, fn_scope).is_none());
    assert!(registry.scope(DOC, block).is_none());
}

#[test]
fn test_destroy_scope_twice_is_harmless() {
    let mut registry = SymbolRegistry::new();
    let scope = registry.create_scope(DOC, ScopeKind::Block, node(1), None);
    registry.destroy_scope(DOC, scope);
    registry.destroy_scope(DOC, scope);
    assert!(!registry.contains_document(DOC));
}

// ============================================================================
// Node lifecycle hooks
// ============================================================================

#[test]
fn test_mount_declares_locals_and_enters_scope() {
    let mut registry = SymbolRegistry::new();
    let scope = registry.node_mounted(
        DOC,
        node(4),
        ScopeKind::Loop,
        None,
        &[("i", ValueType::Number)],
    );

    assert_eq!(registry.current_scope(DOC), Some(scope));
    let i = registry.variable(DOC, "i").unwrap();
    assert_eq!(i.scope, Some(scope));
    assert_eq!(i.scope_kind, Some(ScopeKind::Loop));
    assert_eq!(i.node, Some(node(4)));
}

#[test]
fn test_unmount_reverses_mount_completely() {
    let mut registry = SymbolRegistry::new();
    registry.declare_variable(DOC, VariableDecl::new("keep", ValueType::Number));
    let scope = registry.node_mounted(
        DOC,
        node(4),
        ScopeKind::Loop,
        None,
        &[("i", ValueType::Number)],
    );
    // The node also wrote a variable into the global scope.
    registry.declare_variable(
        DOC,
        VariableDecl::new("latest", ValueType::Number).declared_by(node(4)),
    );

    registry.node_unmounted(DOC, node(4));

    assert!(registry.scope(DOC, scope).is_none());
    assert!(registry.variable(DOC, "i").is_none());
    assert!(registry.variable(DOC, "latest").is_none());
    assert_eq!(visible_names(&registry, None), vec!["keep"]);
    assert_eq!(registry.current_scope(DOC), None);

    // Idempotent.
    registry.node_unmounted(DOC, node(4));
    assert_eq!(visible_names(&registry, None), vec!["keep"]);
}

#[test]
fn test_nested_mounts_unwind_out_of_order() {
    let mut registry = SymbolRegistry::new();
    let outer = registry.node_mounted(DOC, node(1), ScopeKind::Function, None, &[]);
    let middle = registry.node_mounted(DOC, node(2), ScopeKind::Loop, Some(outer), &[]);
    let inner = registry.node_mounted(DOC, node(3), ScopeKind::Block, Some(middle), &[]);

    // Remount storm: the middle node unmounts before the inner one.
    registry.node_unmounted(DOC, node(2));
    // Destroying the middle scope takes the nested one with it.
    assert!(registry.scope(DOC, inner).is_none());
    assert_eq!(registry.current_scope(DOC), Some(outer));
}

// ============================================================================
// Notifications
// ============================================================================

#[test]
fn test_subscribers_see_consistent_state() {
    let mut registry = SymbolRegistry::new();
    let events: Rc<RefCell<Vec<ChangeFlags>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    let subscription = registry.subscribe(move |event| {
        assert_eq!(event.document, DOC);
        sink.borrow_mut().push(event.changes);
    });

    registry.declare_variable(DOC, VariableDecl::new("x", ValueType::Number));
    let scope = registry.create_scope(DOC, ScopeKind::Block, node(1), None);
    registry.enter_scope(DOC, scope);
    registry.destroy_scope(DOC, scope);

    let seen = events.borrow().clone();
    assert_eq!(seen.len(), 4);
    assert_eq!(seen[0], ChangeFlags::VARIABLES);
    assert_eq!(seen[1], ChangeFlags::SCOPES);
    assert_eq!(seen[2], ChangeFlags::ACTIVE);
    assert!(seen[3].contains(ChangeFlags::SCOPES | ChangeFlags::ACTIVE));

    assert!(registry.unsubscribe(subscription));
    registry.declare_variable(DOC, VariableDecl::new("y", ValueType::Number));
    assert_eq!(events.borrow().len(), 4);
}

#[test]
fn test_noop_mutations_do_not_notify() {
    let mut registry = SymbolRegistry::new();
    let fired = Rc::new(RefCell::new(0u32));
    let sink = Rc::clone(&fired);
    registry.subscribe(move |_| *sink.borrow_mut() += 1);

    registry.remove_variable(DOC, "ghost");
    registry.exit_scope(DOC, vscript_core::ids::ScopeId(3));
    registry.update_variable(DOC, "ghost", VariablePatch::default());
    assert_eq!(*fired.borrow(), 0);
}

// ============================================================================
// Functions
// ============================================================================

#[test]
fn test_function_signature_roundtrip() {
    let mut registry = SymbolRegistry::new();
    registry.declare_function(
        DOC,
        FunctionDecl {
            name: "add",
            params: vec![
                Parameter::new("a", ValueType::Number),
                Parameter::new("b", ValueType::Number),
            ],
            return_ty: ValueType::Number,
            scope: None,
            node: node(7),
        },
    );

    let add = registry.function(DOC, "add").unwrap();
    assert_eq!(add.params.len(), 2);
    assert_eq!(add.params[1].name, "b");
    assert_eq!(add.return_ty, ValueType::Number);
    assert_eq!(add.node, node(7));
}

#[test]
fn test_merged_visibility_lists_variables_before_functions() {
    let mut registry = SymbolRegistry::new();
    registry.declare_function(
        DOC,
        FunctionDecl {
            name: "update",
            params: vec![],
            return_ty: ValueType::Nil,
            scope: None,
            node: node(1),
        },
    );
    registry.declare_variable(DOC, VariableDecl::new("dt", ValueType::Number));

    let merged = registry.visible_symbols(DOC, None);
    let names: Vec<_> = merged.iter().map(|sym| sym.name_text()).collect();
    assert_eq!(names, vec!["dt", "update"]);
    assert_eq!(merged[1].ty(), ValueType::Function);
}
