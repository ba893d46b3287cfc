//! Core types and trait definitions for the Leadbook lead store.
//!
//! No HTTP or database code lives here; the store and server crates build on
//! these types.

pub mod error;
pub mod lead;
pub mod metrics;
pub mod query;
pub mod seed;
pub mod store;

pub use error::{Error, Result};
