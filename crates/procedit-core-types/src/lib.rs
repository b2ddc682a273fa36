//! Core types shared across procedit crates
//!
//! This crate provides foundational types used by the engine, the
//! configuration store and the logging facility:
//!
//! - **Type identifiers**: `TypeId` and the canonical `TypeUnion` set
//! - **Schema constants**: Canonical field keys and event names

pub mod schema;
pub mod type_union;

pub use type_union::{TypeId, TypeUnion};
