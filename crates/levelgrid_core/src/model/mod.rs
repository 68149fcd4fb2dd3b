//! Canonical domain model for the career-level matrix.
//!
//! # Responsibility
//! - Define the data shapes shared by the engine, repository and facade.
//! - Keep the model pure: no persistence or filtering behavior lives here.
//!
//! # Invariants
//! - `Capability` is the fact table of the matrix; `JobLevel` and `Criterion`
//!   are its dimension tables and carry no foreign keys themselves.

pub mod matrix;
