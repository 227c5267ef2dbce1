//! Article domain model.
//!
//! # Responsibility
//! - Define the single entity type shared by the store, renderer and remote
//!   repository.
//! - Convert between loose field bags (remote rows, seed records) and the
//!   typed record.
//!
//! # Invariants
//! - Known fields keep their wire names (`authorUrl`, `publishedOn`, ...).
//! - Unknown fields are retained, never dropped or renamed.

pub mod article;
