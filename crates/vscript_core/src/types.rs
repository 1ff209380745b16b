//! The value-type set shared by symbols and sockets.
//!
//! Types are nominal tags, not a structural type system: two types are
//! compatible when they are equal, when either side is the `any` wildcard,
//! or when both are the `flow` pseudo-type. Ambiguity always resolves to
//! `any` rather than an error.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A value type tag. The set is closed and mirrors the scripting target's
/// primitive types, plus two editor-level tags: [`ValueType::Any`] (the
/// wildcard, compatible with every data type) and [`ValueType::Flow`]
/// (execution-order edges, never carrying data).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Nil,
    String,
    Number,
    Boolean,
    Table,
    Function,
    Thread,
    Userdata,
    Vector,
    Buffer,
    /// The wildcard type, written `any`. Connects to every data type.
    Any,
    /// Execution-order pseudo-type. Flow sockets only connect to flow sockets.
    Flow,
}

impl ValueType {
    /// All data types, in palette display order. Excludes `flow`, which is
    /// never user-selectable.
    pub const DATA_TYPES: [ValueType; 11] = [
        ValueType::Nil,
        ValueType::String,
        ValueType::Number,
        ValueType::Boolean,
        ValueType::Table,
        ValueType::Function,
        ValueType::Thread,
        ValueType::Userdata,
        ValueType::Vector,
        ValueType::Buffer,
        ValueType::Any,
    ];

    #[inline]
    pub fn is_flow(self) -> bool {
        self == ValueType::Flow
    }

    #[inline]
    pub fn is_wildcard(self) -> bool {
        self == ValueType::Any
    }

    /// The type name as the scripting target spells it.
    pub fn name(self) -> &'static str {
        match self {
            ValueType::Nil => "nil",
            ValueType::String => "string",
            ValueType::Number => "number",
            ValueType::Boolean => "boolean",
            ValueType::Table => "table",
            ValueType::Function => "function",
            ValueType::Thread => "thread",
            ValueType::Userdata => "userdata",
            ValueType::Vector => "vector",
            ValueType::Buffer => "buffer",
            ValueType::Any => "any",
            ValueType::Flow => "flow",
        }
    }

    /// Connection-compatibility rule used by the editor when the user draws
    /// an edge from an output of type `self` to an input of type `other`.
    ///
    /// Flow connects only to flow. Data connects on equality or when either
    /// end is the wildcard. Data and flow never mix, so a wildcard output
    /// still cannot reach a flow input.
    pub fn connects_to(self, other: ValueType) -> bool {
        match (self.is_flow(), other.is_flow()) {
            (true, true) => true,
            (true, false) | (false, true) => false,
            (false, false) => self == other || self.is_wildcard() || other.is_wildcard(),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_types_connect() {
        assert!(ValueType::Number.connects_to(ValueType::Number));
        assert!(ValueType::Table.connects_to(ValueType::Table));
    }

    #[test]
    fn test_mismatched_types_reject() {
        assert!(!ValueType::Number.connects_to(ValueType::String));
        assert!(!ValueType::Boolean.connects_to(ValueType::Nil));
    }

    #[test]
    fn test_wildcard_connects_to_any_data() {
        for ty in ValueType::DATA_TYPES {
            assert!(ValueType::Any.connects_to(ty), "any -> {ty}");
            assert!(ty.connects_to(ValueType::Any), "{ty} -> any");
        }
    }

    #[test]
    fn test_flow_only_connects_to_flow() {
        assert!(ValueType::Flow.connects_to(ValueType::Flow));
        for ty in ValueType::DATA_TYPES {
            assert!(!ValueType::Flow.connects_to(ty), "flow -> {ty}");
            assert!(!ty.connects_to(ValueType::Flow), "{ty} -> flow");
        }
    }

    #[test]
    fn test_serde_spelling() {
        let json = serde_json::to_string(&ValueType::Userdata).unwrap();
        assert_eq!(json, "\"userdata\"");
        let back: ValueType = serde_json::from_str("\"any\"").unwrap();
        assert_eq!(back, ValueType::Any);
    }
}
