//! Integration tests for Layer 0: Foundation
//!
//! Tests for values, facts, and interning.

mod facts;
mod values;
