//! vscript_tests: Cross-crate integration tests.
//!
//! Empty on purpose; the editor-pipeline tests live under `tests/`.
