//! Fact storage, agenda, and the forward-chaining loop for Retort.
//!
//! This crate provides:
//! - [`FactList`] - Indexed fact storage with duplicate detection
//! - [`Agenda`] - Conflict resolution (salience, recency) and refraction
//! - [`Engine`] - The reset/declare/retract/run lifecycle around a
//!   [`retort_rete::ReteNetwork`]

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod agenda;
mod engine;
mod factlist;

pub use agenda::Agenda;
pub use engine::{Effect, Engine, Rule};
pub use factlist::FactList;
