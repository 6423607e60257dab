//! # CCG Induction - Lexicon Induction and EM Training
//!
//! This crate grows a CCG lexicon from part-of-speech tagged text:
//!
//! - **Seeding**: Atomic categories for noun, verb, conjunction and
//!   punctuation tags
//! - **Proposals**: New categories from tag bigrams and from partial parses,
//!   buffered per tag and checked against arity limits before merging
//! - **Model**: Dirichlet-smoothed rule probabilities over expected counts
//! - **Trainer**: Worker-per-sentence EM over a shared grammar store
//!
//! ## Example
//!
//! ```rust
//! use ccg_induction::{Trainer, TrainerConfig};
//! use ccg_parser::Sentence;
//!
//! let corpus = vec![
//!     Sentence::from_tagged("dogs/NNS bark/VBP").unwrap(),
//!     Sentence::from_tagged("cats/NNS sleep/VBP").unwrap(),
//! ];
//! let config = TrainerConfig::default().with_threads(2).with_max_iterations(3);
//! let mut trainer = Trainer::new(config).unwrap();
//! let report = trainer.train(&corpus).unwrap();
//! assert!(!report.iterations.is_empty());
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod model;
pub mod partial;
pub mod proposals;
pub mod seed;
pub mod trainer;

pub use config::TrainerConfig;
pub use context::propose_from_context;
pub use error::InductionError;
pub use model::CountModel;
pub use partial::propose_from_chart;
pub use proposals::{MergeReport, ProposalBuffer};
pub use seed::{seed_lexicon, SeedTags};
pub use trainer::{IterationStats, Trainer, TrainingReport};
