//! Use-case facade over engine and repository.
//!
//! # Responsibility
//! - Orchestrate repository reads/writes and engine transformations into the
//!   entry points external callers (API/CLI layers) invoke.
//! - Keep those callers decoupled from storage and engine details.

pub mod matrix_service;
