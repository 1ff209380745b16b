//! vscript_core: Core types for the vscript graph-editor front-end.
//!
//! Provides the id newtypes, the closed value-type set shared by symbols and
//! sockets, and string interning for symbol names.

pub mod ids;
pub mod intern;
pub mod types;

// Re-export commonly used types
pub use ids::{DocumentId, NodeId, ScopeId};
pub use intern::{InternedString, StringInterner};
pub use types::ValueType;
