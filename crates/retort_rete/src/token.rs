//! Tokens and binding contexts flowing through the matching network.
//!
//! A token bundles the facts that contributed to a partial match with the
//! variable bindings accumulated so far, tagged as asserting (valid) or
//! retracting (invalid) that combination. Tokens are immutable; nodes that
//! need a different context or fact set construct a new token. The
//! persistent collections make those per-hop copies O(1).

use std::fmt;

use retort_foundation::{Error, Fact, Result, RtMap, RtSet, SymbolId, Value};

// =============================================================================
// Capture Keys & Contexts
// =============================================================================

/// Key of one binding in a context.
///
/// A capture made under an inverted field test carries `negated = true`;
/// the two polarities of the same variable name are distinct keys and are
/// never treated as equal during merges.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct CaptureKey {
    /// The capture variable.
    pub name: SymbolId,
    /// Whether the capture happened under an inverted test.
    pub negated: bool,
}

impl CaptureKey {
    /// A positively captured variable.
    #[must_use]
    pub const fn positive(name: SymbolId) -> Self {
        Self {
            name,
            negated: false,
        }
    }

    /// A variable captured under an inverted test.
    #[must_use]
    pub const fn negated(name: SymbolId) -> Self {
        Self {
            name,
            negated: true,
        }
    }

    /// The same key with the opposite polarity.
    #[must_use]
    pub const fn flipped(self) -> Self {
        Self {
            name: self.name,
            negated: !self.negated,
        }
    }
}

impl fmt::Debug for CaptureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            write!(f, "!{:?}", self.name)
        } else {
            write!(f, "{:?}", self.name)
        }
    }
}

/// A binding context: capture variables to bound values.
///
/// Consistency rules between two contexts (or a context and a new
/// binding):
/// - the same key present on both sides must hold equal values;
/// - a negated key on one side and its positive twin on the other holding
///   an *equal* value are inconsistent — the negation asserted the
///   variable is not that value.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Context {
    bindings: RtMap<CaptureKey, Value>,
}

impl Context {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns true if the context holds no bindings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Gets a binding by key.
    #[must_use]
    pub fn get(&self, key: CaptureKey) -> Option<&Value> {
        self.bindings.get(&key)
    }

    /// Gets the positively bound value of a variable.
    #[must_use]
    pub fn bound(&self, name: SymbolId) -> Option<&Value> {
        self.get(CaptureKey::positive(name))
    }

    /// Iterates over the bindings.
    pub fn iter(&self) -> impl Iterator<Item = (&CaptureKey, &Value)> {
        self.bindings.iter()
    }

    /// Attempts to add a binding, returning the extended context.
    ///
    /// Returns `None` when the binding is inconsistent with an existing
    /// one; re-binding a key to an equal value is a no-op.
    #[must_use]
    pub fn bind(&self, key: CaptureKey, value: Value) -> Option<Self> {
        if let Some(existing) = self.bindings.get(&key) {
            return (*existing == value).then(|| self.clone());
        }
        // Opposite polarity holding the same value contradicts the
        // negation's "not this value" assertion.
        if let Some(flipped) = self.bindings.get(&key.flipped()) {
            if *flipped == value {
                return None;
            }
        }
        Some(Self {
            bindings: self.bindings.insert(key, value),
        })
    }

    /// Tests whether two contexts could merge without conflict.
    #[must_use]
    pub fn consistent_with(&self, other: &Self) -> bool {
        for (key, value) in self.bindings.iter() {
            if let Some(theirs) = other.bindings.get(key) {
                if theirs != value {
                    return false;
                }
            }
            if let Some(theirs) = other.bindings.get(&key.flipped()) {
                if theirs == value {
                    return false;
                }
            }
        }
        true
    }

    /// Merges two contexts the compiler guaranteed consistent.
    ///
    /// # Errors
    ///
    /// Returns a context-conflict error when the contexts disagree; callers
    /// check [`Context::consistent_with`] first, so a failure here means a
    /// compiler defect and propagation must halt rather than continue with
    /// corrupt memory.
    pub fn merge(&self, other: &Self) -> Result<Self> {
        let mut merged = self.clone();
        for (key, value) in other.bindings.iter() {
            merged = merged
                .bind(*key, value.clone())
                .ok_or_else(|| Error::context_conflict(format!("{key:?}")))?;
        }
        Ok(merged)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.bindings.iter()).finish()
    }
}

// =============================================================================
// Tokens
// =============================================================================

/// Whether a token asserts or retracts its fact combination.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TokenTag {
    /// The combination now holds.
    Valid,
    /// A previously asserted combination no longer holds.
    Invalid,
}

/// An immutable bundle of facts plus accumulated bindings.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Token {
    /// Valid or invalid.
    pub tag: TokenTag,
    /// The contributing facts (order-irrelevant).
    pub facts: RtSet<Fact>,
    /// Accumulated variable bindings.
    pub context: Context,
}

impl Token {
    /// Creates a valid single-fact token with an empty context.
    #[must_use]
    pub fn valid(fact: Fact) -> Self {
        Self {
            tag: TokenTag::Valid,
            facts: RtSet::unit(fact),
            context: Context::new(),
        }
    }

    /// Creates an invalid single-fact token with an empty context.
    #[must_use]
    pub fn invalid(fact: Fact) -> Self {
        Self {
            tag: TokenTag::Invalid,
            facts: RtSet::unit(fact),
            context: Context::new(),
        }
    }

    /// Returns true if the token asserts its combination.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self.tag, TokenTag::Valid)
    }

    /// Returns a copy of this token carrying a different context.
    #[must_use]
    pub fn with_context(&self, context: Context) -> Self {
        Self {
            tag: self.tag,
            facts: self.facts.clone(),
            context,
        }
    }

    /// Returns the invalid form of this token.
    #[must_use]
    pub fn invalidated(&self) -> Self {
        Self {
            tag: TokenTag::Invalid,
            facts: self.facts.clone(),
            context: self.context.clone(),
        }
    }

    /// Combines this token with a partial match from the other side of a
    /// join, keeping this token's tag.
    ///
    /// # Errors
    ///
    /// Propagates the context-merge conflict described at
    /// [`Context::merge`].
    pub fn combine(&self, facts: &RtSet<Fact>, context: &Context) -> Result<Self> {
        Ok(Self {
            tag: self.tag,
            facts: self.facts.union(facts),
            context: self.context.merge(context)?,
        })
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.tag {
            TokenTag::Valid => "+",
            TokenTag::Invalid => "-",
        };
        write!(f, "Token({tag} {:?} {:?})", self.facts, self.context)
    }
}
