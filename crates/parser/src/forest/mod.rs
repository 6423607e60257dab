//! Packed forests: charts, inside/outside and k-best extraction.

mod chart;
mod inside_outside;
mod item;
mod kbest;
mod tree;

pub use chart::{Cell, Chart};
pub use inside_outside::{expected_counts, inside, outside};
pub use item::{BackPointer, ChartItem, ItemId, ItemKey, PunctHistory};
pub use kbest::Derivation;
pub use tree::DerivationTree;
