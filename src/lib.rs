//! Retort - Forward-chaining rule engine
//!
//! This crate re-exports all layers of the Retort system for convenient
//! access. For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 2: retort_engine     — Fact list, agenda, engine loop
//! Layer 1: retort_rete       — RETE network: patterns, DNF, nodes, tokens
//! Layer 0: retort_foundation — Core types (Value, Fact, Interner, Error)
//! ```
//!
//! The matching core is incremental: declaring or retracting a fact
//! triggers one synchronous depth-first cascade through the node graph,
//! and every rule's conflict set afterwards equals what a from-scratch
//! evaluation over the live fact set would produce.

pub use retort_engine as engine;
pub use retort_foundation as foundation;
pub use retort_rete as rete;
