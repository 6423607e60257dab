//! # Error Types
//!
//! Errors in the category algebra are invariant violations: a category
//! string that is not a well-formed tree, two structurally different
//! categories claiming the same fingerprint, or a combinator asked to
//! build something its operands cannot support.
//!
//! None of these are recoverable. A parse of a category string that fails
//! means the grammar is corrupt; an interning collision would silently merge
//! two categories in every count table downstream.

use thiserror::Error;

/// Errors raised by the category algebra.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CategoryError {
    /// The category string is not a well-formed tree.
    #[error("Malformed category '{text}': {reason}")]
    MalformedCategory { text: String, reason: String },

    /// Two structurally different categories hashed to the same fingerprint.
    #[error("Interning collision on fingerprint {fingerprint:#018x}: '{existing}' vs '{incoming}'")]
    InternCollision {
        fingerprint: u64,
        existing: String,
        incoming: String,
    },

    /// A handle that was never issued by this interner.
    #[error("Unknown category handle {id}")]
    UnknownHandle { id: u32 },

    /// A rule was replayed on operands it cannot combine.
    #[error("Unhandled combination: {rule} cannot combine {operands}")]
    UnhandledCombination { rule: String, operands: String },

    /// A working-category node handle outside its arena.
    #[error("Working node {node} out of bounds (arena has {len} nodes)")]
    DanglingNode { node: u32, len: usize },

    /// A configuration value outside its supported range.
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl CategoryError {
    /// Shorthand for a malformed-category error.
    pub fn malformed(text: &str, reason: impl Into<String>) -> Self {
        CategoryError::MalformedCategory {
            text: text.to_string(),
            reason: reason.into(),
        }
    }
}
