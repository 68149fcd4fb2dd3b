//! Matrix query engine: reference resolution, filtering, assembly.
//!
//! # Responsibility
//! - Host the pure transformation logic of the matrix: seed-time reference
//!   expansion, cumulative filter evaluation and display-grid assembly.
//! - Stay independent of how the data arrives; every function here takes
//!   plain collections and returns plain values.

pub mod assemble;
pub mod filter;
pub mod resolve;
