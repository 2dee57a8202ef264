//! Core types shared across rowgraph facilities
//!
//! This crate provides the constants used by both the logging facility and
//! the persistence layer:
//!
//! - **Schema constants**: Canonical field keys and event names
//! - **Layout constants**: Column prefixes and identity column naming

pub mod layout;
pub mod schema;
