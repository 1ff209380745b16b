//! vscript_complete: Identifier suggestions for expression inputs.
//!
//! Filters the visibility view down to what matches the fragment under the
//! cursor. Queried on every keystroke, so this stays allocation-light: one
//! pass over the visible symbols, two output groups, no scoring model.

use unicode_xid::UnicodeXID;
use vscript_core::ids::{DocumentId, ScopeId};
use vscript_registry::{SymbolRegistry, VisibleSymbol};

/// Caller-supplied candidate filter, e.g. "numeric variables only".
pub type SuggestFilter<'f> = &'f dyn Fn(&VisibleSymbol<'_>) -> bool;

/// Whether `fragment` can begin an identifier in the scripting target:
/// a letter or an underscore, never a digit.
pub fn is_identifier_fragment(fragment: &str) -> bool {
    fragment
        .chars()
        .next()
        .is_some_and(|c| c == '_' || c.is_xid_start())
}

/// Rank the symbols visible at `scope` against `fragment`.
///
/// Case-insensitive. Names starting with the fragment come first, names
/// merely containing it after those; inside each group the visibility order
/// (innermost scope first, then globals) is preserved. A fragment that
/// cannot begin an identifier yields nothing; suggestions never trigger
/// off digits or operators.
pub fn suggest<'a>(
    registry: &'a SymbolRegistry,
    document: DocumentId,
    scope: Option<ScopeId>,
    fragment: &str,
    filter: Option<SuggestFilter<'_>>,
) -> Vec<VisibleSymbol<'a>> {
    if !is_identifier_fragment(fragment) {
        return Vec::new();
    }
    let needle = fragment.to_lowercase();

    let mut prefix_matches = Vec::new();
    let mut contains_matches = Vec::new();
    for symbol in registry.visible_symbols(document, scope) {
        if let Some(filter) = filter {
            if !filter(&symbol) {
                continue;
            }
        }
        let name = symbol.name_text().to_lowercase();
        if name.starts_with(&needle) {
            prefix_matches.push(symbol);
        } else if name.contains(&needle) {
            contains_matches.push(symbol);
        }
    }

    prefix_matches.extend(contains_matches);
    prefix_matches
}
