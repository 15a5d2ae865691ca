//! Incremental RETE matching network for Retort.
//!
//! This crate provides:
//! - [`Condition`], [`FactPattern`], [`FieldTest`] - Rule condition trees
//! - [`to_dnf`] / [`normalize`] - Disjunctive-normal-form rule compilation
//! - [`ReteNetwork`] - The alpha/beta node graph with per-node memories
//! - [`Token`] / [`Context`] - The propagation protocol between nodes
//! - [`Activation`] - Complete matches exposed to the agenda
//!
//! The network maintains, incrementally, the exact set of activations a
//! from-scratch evaluation of every rule against the current fact set
//! would produce; fact insertion and retraction each trigger one
//! synchronous depth-first cascade instead of a re-match.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod activation;
mod check;
mod dnf;
mod network;
mod node;
mod pattern;
mod token;

pub use activation::Activation;
pub use check::{AlphaCheck, alpha_checks};
pub use dnf::{BranchElem, normalize, to_dnf};
pub use network::ReteNetwork;
pub use pattern::{Condition, FactPattern, FieldTest, Predicate};
pub use token::{CaptureKey, Context, Token, TokenTag};
