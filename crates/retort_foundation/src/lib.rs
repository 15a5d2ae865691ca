//! Core types, values, and persistent collections for Retort.
//!
//! This crate provides:
//! - [`Value`] - The value type for fact fields
//! - [`Fact`] and [`FactId`] - Structured records with stable identities
//! - [`Interner`] - Interned keywords and capture-variable symbols
//! - [`Error`] - Rich error types for compilation and runtime failures
//! - Persistent collections ([`RtVec`], [`RtSet`], [`RtMap`])

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod collections;
mod error;
mod fact;
mod intern;
mod value;

pub use collections::{RtMap, RtSet, RtVec};
pub use error::{Error, ErrorKind, Result, RuntimeLimit};
pub use fact::{Fact, FactId, FieldKey};
pub use intern::{Interner, KeywordId, SymbolId};
pub use value::Value;
