use criterion::{black_box, criterion_group, criterion_main, Criterion};
use vscript_core::ids::{DocumentId, NodeId};
use vscript_core::types::ValueType;
use vscript_registry::{ScopeKind, SymbolRegistry, VariableDecl};

const DOC: DocumentId = DocumentId(1);

/// Build a document with a deep scope chain: 64 nested block scopes, each
/// declaring 8 variables, plus 32 globals. Roughly the worst case a large
/// hand-built graph produces.
fn build_deep_document() -> (SymbolRegistry, vscript_core::ids::ScopeId) {
    let mut registry = SymbolRegistry::new();

    for g in 0..32 {
        registry.declare_variable(DOC, VariableDecl::new(&format!("global_{g}"), ValueType::Number));
    }

    let mut innermost = registry.create_scope(DOC, ScopeKind::Function, NodeId(0), None);
    for depth in 0..64 {
        let scope =
            registry.create_scope(DOC, ScopeKind::Block, NodeId(depth + 1), Some(innermost));
        for v in 0..8 {
            registry.declare_variable(
                DOC,
                VariableDecl::new(&format!("local_{depth}_{v}"), ValueType::Number).in_scope(scope),
            );
        }
        innermost = scope;
    }

    (registry, innermost)
}

fn bench_visibility(c: &mut Criterion) {
    let (registry, innermost) = build_deep_document();

    c.bench_function("visible_variables_deep_chain", |b| {
        b.iter(|| {
            let visible = registry.visible_variables(black_box(DOC), black_box(Some(innermost)));
            black_box(visible.len())
        })
    });

    c.bench_function("visible_variables_global_only", |b| {
        b.iter(|| {
            let visible = registry.visible_variables(black_box(DOC), black_box(None));
            black_box(visible.len())
        })
    });
}

criterion_group!(benches, bench_visibility);
criterion_main!(benches);
