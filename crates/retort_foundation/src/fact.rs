//! Facts: identified, typed, field-to-value records.
//!
//! A fact is immutable once declared; "update" is modeled as retract plus
//! re-declare. Equality and hashing ignore the identifier so that the fact
//! list can detect structural duplicates.

use std::fmt;
use std::hash::{Hash, Hasher};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::collections::RtMap;
use crate::intern::KeywordId;
use crate::value::Value;

/// Fact identifier.
///
/// Assigned by the fact list on declaration, monotonically increasing,
/// never reused. Recency ordering on ids drives conflict resolution.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FactId(u64);

impl FactId {
    /// Creates a fact id from a raw index.
    #[must_use]
    pub const fn new(index: u64) -> Self {
        Self(index)
    }

    /// Returns the raw index of this id.
    #[must_use]
    pub const fn index(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for FactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FactId({})", self.0)
    }
}

impl fmt::Display for FactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "f-{}", self.0)
    }
}

/// Key addressing one field of a fact: by name or by position.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum FieldKey {
    /// Positional field (the `1` in a bare `fact(1, "a")`).
    Pos(u32),
    /// Named field.
    Named(KeywordId),
}

impl fmt::Debug for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pos(i) => write!(f, "#{i}"),
            Self::Named(kw) => write!(f, "{kw:?}"),
        }
    }
}

/// An identified, typed, field-to-value record.
///
/// Fields are keyed by [`FieldKey`] and matched structurally, never by
/// reference. The id is `None` until the fact list declares the fact.
#[derive(Clone)]
pub struct Fact {
    /// Identifier assigned on declaration.
    id: Option<FactId>,
    /// The fact's kind (its "type" for pattern matching).
    kind: KeywordId,
    /// Field values.
    fields: RtMap<FieldKey, Value>,
}

impl Fact {
    /// Creates a fact of the given kind with no fields.
    #[must_use]
    pub fn new(kind: KeywordId) -> Self {
        Self {
            id: None,
            kind,
            fields: RtMap::new(),
        }
    }

    /// Creates the implicit initial fact.
    ///
    /// Declared by the engine on every reset; anchors rules whose
    /// condition is empty or begins with a negation.
    #[must_use]
    pub fn initial() -> Self {
        Self::new(KeywordId::INITIAL_FACT)
    }

    /// Returns a copy of this fact with the field set.
    #[must_use]
    pub fn with(mut self, key: FieldKey, value: impl Into<Value>) -> Self {
        self.fields = self.fields.insert(key, value.into());
        self
    }

    /// Returns a copy of this fact with a named field set.
    #[must_use]
    pub fn with_named(self, name: KeywordId, value: impl Into<Value>) -> Self {
        self.with(FieldKey::Named(name), value)
    }

    /// Returns a copy of this fact with the next positional field set.
    ///
    /// Positions are assigned in call order starting from 0.
    #[must_use]
    pub fn with_arg(self, value: impl Into<Value>) -> Self {
        let next = self.next_position();
        self.with(FieldKey::Pos(next), value)
    }

    /// Returns a copy of this fact carrying the given id.
    #[must_use]
    pub fn with_id(mut self, id: FactId) -> Self {
        self.id = Some(id);
        self
    }

    /// Returns this fact's id, if declared.
    #[must_use]
    pub const fn id(&self) -> Option<FactId> {
        self.id
    }

    /// Returns this fact's kind.
    #[must_use]
    pub const fn kind(&self) -> KeywordId {
        self.kind
    }

    /// Gets a field value.
    #[must_use]
    pub fn get(&self, key: FieldKey) -> Option<&Value> {
        self.fields.get(&key)
    }

    /// Returns true if the fact has the given field.
    #[must_use]
    pub fn has(&self, key: FieldKey) -> bool {
        self.fields.contains_key(&key)
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the fact has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates over the fact's fields.
    pub fn iter(&self) -> impl Iterator<Item = (&FieldKey, &Value)> {
        self.fields.iter()
    }

    /// Iterates over the fact's field keys.
    pub fn keys(&self) -> impl Iterator<Item = &FieldKey> {
        self.fields.keys()
    }

    fn next_position(&self) -> u32 {
        self.fields
            .keys()
            .filter_map(|k| match k {
                FieldKey::Pos(i) => Some(*i + 1),
                FieldKey::Named(_) => None,
            })
            .max()
            .unwrap_or(0)
    }
}

// Equality and hashing ignore the id: duplicate detection is structural.
impl PartialEq for Fact {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.fields == other.fields
    }
}

impl Eq for Fact {}

impl Hash for Fact {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.fields.hash(state);
    }
}

impl fmt::Debug for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fact(:{}", self.kind.index())?;
        if let Some(id) = self.id {
            write!(f, " @{id}")?;
        }
        // Deterministic field order for readable assertions.
        let mut fields: Vec<_> = self.fields.iter().collect();
        fields.sort_by_key(|(k, _)| **k);
        for (k, v) in fields {
            write!(f, " {k:?}={v:?}")?;
        }
        write!(f, ")")
    }
}
