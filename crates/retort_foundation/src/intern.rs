//! String interning for keywords and capture variables.
//!
//! Fact kinds, field names, and rule names are interned as keywords;
//! capture-variable names are interned as symbols. Interning gives the
//! matcher cheap `Copy` comparisons on the hot path.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Interned capture-variable identifier.
///
/// Symbols name the variables a pattern binds (the `X` in `a = X`).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SymbolId(pub(crate) u32);

impl SymbolId {
    /// Returns the raw index of this symbol.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymbolId({})", self.0)
    }
}

/// Interned keyword identifier.
///
/// Keywords name fact kinds, fields, and rules. They are interned for
/// fast comparison during alpha-network checks.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KeywordId(pub(crate) u32);

impl KeywordId {
    /// Returns the raw index of this keyword.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }

    /// Reserved keyword naming the implicit initial fact: `initial-fact`.
    ///
    /// Rules whose condition is empty, or whose first element is a
    /// negation, are anchored on a fact of this kind that the engine
    /// declares on every reset.
    pub const INITIAL_FACT: KeywordId = KeywordId(0);
}

impl fmt::Debug for KeywordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeywordId({})", self.0)
    }
}

/// Interner for keywords and symbols.
///
/// Not thread-safe; the engine owns one and hands out `&mut` access.
#[derive(Clone, Debug, Default)]
pub struct Interner {
    /// Keyword string storage, indexed by `KeywordId`.
    keywords: Vec<Arc<str>>,
    /// Map from keyword string to `KeywordId`.
    keyword_map: HashMap<Arc<str>, KeywordId>,
    /// Symbol string storage, indexed by `SymbolId`.
    symbols: Vec<Arc<str>>,
    /// Map from symbol string to `SymbolId`.
    symbol_map: HashMap<Arc<str>, SymbolId>,
}

impl Interner {
    /// Reserved keywords pre-interned at startup, in index order.
    const RESERVED_KEYWORDS: &'static [&'static str] = &[
        "initial-fact", // KeywordId(0) = INITIAL_FACT
    ];

    /// Creates a new interner with reserved keywords pre-interned.
    #[must_use]
    pub fn new() -> Self {
        let mut interner = Self::default();

        for (i, &kw) in Self::RESERVED_KEYWORDS.iter().enumerate() {
            let id = interner.intern_keyword(kw);
            debug_assert_eq!(
                id.0 as usize, i,
                "reserved keyword '{kw}' should have index {i}, got {}",
                id.0
            );
        }

        interner
    }

    /// Interns a keyword, returning its [`KeywordId`].
    ///
    /// # Panics
    ///
    /// Panics if the number of interned keywords exceeds `u32::MAX`.
    pub fn intern_keyword(&mut self, s: &str) -> KeywordId {
        if let Some(&id) = self.keyword_map.get(s) {
            return id;
        }

        let idx = u32::try_from(self.keywords.len()).expect("too many keywords");
        let arc: Arc<str> = s.into();
        self.keywords.push(arc.clone());

        let id = KeywordId(idx);
        self.keyword_map.insert(arc, id);
        id
    }

    /// Gets the string for a keyword.
    #[must_use]
    pub fn keyword(&self, id: KeywordId) -> Option<&str> {
        self.keywords.get(id.0 as usize).map(AsRef::as_ref)
    }

    /// Interns a capture-variable symbol, returning its [`SymbolId`].
    ///
    /// # Panics
    ///
    /// Panics if the number of interned symbols exceeds `u32::MAX`.
    pub fn intern_symbol(&mut self, s: &str) -> SymbolId {
        if let Some(&id) = self.symbol_map.get(s) {
            return id;
        }

        let idx = u32::try_from(self.symbols.len()).expect("too many symbols");
        let arc: Arc<str> = s.into();
        self.symbols.push(arc.clone());

        let id = SymbolId(idx);
        self.symbol_map.insert(arc, id);
        id
    }

    /// Gets the string for a symbol.
    #[must_use]
    pub fn symbol(&self, id: SymbolId) -> Option<&str> {
        self.symbols.get(id.0 as usize).map(AsRef::as_ref)
    }

    /// Returns the number of interned keywords.
    #[must_use]
    pub fn keyword_count(&self) -> usize {
        self.keywords.len()
    }

    /// Returns the number of interned symbols.
    #[must_use]
    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }
}
