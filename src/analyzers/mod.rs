//! Survey aggregation.
//!
//! Tallies the parsed records of one survey day, derives the percentages,
//! the bicycle average and the Hanley Highway/Westway peak hours.

pub mod aggregate;
pub mod analyzer;
pub mod types;
pub mod utility;
