//! # CCG Core - Category Algebra
//!
//! This crate provides the category algebra of Combinatory Categorial
//! Grammar:
//!
//! - **Categories**: Immutable atomic and slash categories, parsing and display
//! - **Interning**: Content-addressed handles with hard failure on collision
//! - **Rules**: The closed set of rule types and grammar rules over handles
//! - **Combinators**: Application, generalised composition, substitution,
//!   type-raising, coordination and punctuation over grammar categories
//! - **Working categories**: Arena-backed categories carrying head words and
//!   dependencies, combined by unification
//! - **Admissibility**: Shape limits for induced categories
//!
//! ## Example
//!
//! ```rust
//! use ccg_core::{combinators, Category};
//!
//! let verb: Category = "(S\\NP)/NP".parse().unwrap();
//! let np: Category = "NP".parse().unwrap();
//! let vp = combinators::forward_apply(&verb, &np).unwrap();
//! assert_eq!(vp.to_string(), "S\\NP");
//! ```

pub mod admissible;
pub mod category;
pub mod combinators;
pub mod config;
pub mod derive;
pub mod error;
pub mod intern;
pub mod parse;
pub mod rule;
pub mod unify;
pub mod working;

// Re-export key types at crate root for convenience
pub use admissible::{ArityLimits, Rejection};
pub use category::{Category, CategoryKind, Direction};
pub use combinators::Combination;
pub use config::{CombinatorConfig, CoordinationStyle};
pub use error::CategoryError;
pub use intern::{CatId, CategoryInterner, SymbolId, Vocab};
pub use rule::{HeadDirection, Rule, RuleType};
pub use unify::Unifier;
pub use working::{
    DependencyEdge, DerivationContext, HeadWord, HeadWordList, Marker, WorkingCategory,
};
