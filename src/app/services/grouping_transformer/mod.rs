//! Grouping transformer: one raw row in, one structured record out
//!
//! ## Architecture
//!
//! - [`transformer`] - row walk, plain-field copying and block attachment
//! - [`accumulator`] - per-family entry state driven by column roles
//! - [`stats`] - counters collected across rows
//!
//! Plain columns are copied under their header name. Grouped columns feed a
//! fresh per-family accumulator for every row; a Name (institutions) or Text
//! (press, footnotes) value opens a new entry and the other roles attach to
//! the entry opened last. Institution entries with both a city and a state
//! are geocoded when they close.

pub mod accumulator;
pub mod stats;
pub mod transformer;

#[cfg(test)]
pub mod tests;

pub use accumulator::{Accepted, FamilyAccumulator, PendingEntry};
pub use stats::TransformStats;
pub use transformer::{GroupingTransformer, normalize_apostrophes};
