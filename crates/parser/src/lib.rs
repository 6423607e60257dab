//! # CCG Parser - Packed-Forest CYK Parsing
//!
//! This crate charts part-of-speech tagged sentences under a shared,
//! growing CCG grammar:
//!
//! - **Grammar store**: Interned categories, lexicon and rule tables with a
//!   four-valued validity lattice and first-writer-wins discovery
//! - **Forest**: Equivalence-class chart items with backpointers, inside and
//!   outside passes, expected counts and lazy k-best extraction
//! - **Normal forms**: Pure predicates removing spurious derivations
//! - **CYK engine**: Bottom-up span filling, unary closure and root check
//! - **Dependencies**: Replay of ranked derivations through the
//!   dependency-propagating combinators
//!
//! ## Example
//!
//! ```rust
//! use ccg_core::Category;
//! use ccg_parser::{Grammar, Parser, ParserConfig, Sentence, UniformScorer};
//!
//! let config = ParserConfig::default();
//! let grammar = Grammar::new(&config).unwrap();
//! grammar.add_lexical("DT", &"NP/N".parse().unwrap()).unwrap();
//! grammar.add_lexical("NN", &Category::n()).unwrap();
//! grammar.add_top(&Category::np()).unwrap();
//!
//! let parser = Parser::new(config).unwrap();
//! let sentence = Sentence::from_tagged("the/DT cat/NN").unwrap();
//! let chart = parser.parse(&grammar, &UniformScorer, &sentence).unwrap();
//! assert_eq!(chart.parses(), 1.0);
//! ```

pub mod config;
pub mod cyk;
pub mod dependencies;
pub mod error;
pub mod forest;
pub mod grammar;
pub mod normal_form;
pub mod scorer;
pub mod sentence;
pub mod validity;

pub use config::{DiscoveryMode, ParserConfig, TypeRaiseTarget};
pub use cyk::Parser;
pub use dependencies::dependencies;
pub use error::ParseError;
pub use forest::{
    expected_counts, BackPointer, Cell, Chart, ChartItem, Derivation, DerivationTree, ItemId,
    ItemKey, PunctHistory,
};
pub use grammar::Grammar;
pub use normal_form::{NormalForm, Step};
pub use scorer::{ExpectedCounts, Scorer, UniformScorer};
pub use sentence::{Mood, Sentence, Token};
pub use validity::{RuleKey, Validity, ValidityTable};
