//! [`Mode`]: a discrete labelled robot state, e.g.
//! `{"phase": "preparing", "source": "table"}`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ModeError;

/// A mapping from string keys to string values, unique-keyed, with the
/// empty mode (no entries) as a distinguished value.
///
/// Entries are stored in a [`BTreeMap`] so that [`Ord`]/[`PartialOrd`] fall
/// out as the canonical lexicographic ordering over sorted `(key, value)`
/// pairs, and so that [`PartialEq`]/[`Eq`]/[`Hash`] give a total, never-
/// failing structural comparison suitable for use as a map key. Two modes
/// whose key sets differ are simply unequal under `==`; code that must
/// instead treat a key-set mismatch as an error (mirroring the stricter
/// comparison the original system enforces) should use [`Mode::checked_eq`].
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Mode {
    entries: BTreeMap<String, String>,
}

impl Mode {
    /// The mode with no entries.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A mode with a single `(key, value)` entry.
    pub fn single(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(key.into(), value.into());
        Self { entries }
    }

    /// A mode built from an arbitrary collection of `(key, value)` pairs.
    pub fn new<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self { entries: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }

    /// True when the mode has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The mode's `(key, value)` entries.
    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.entries
    }

    /// True when `self` and `other` share the same set of keys.
    pub fn key_set_matches(&self, other: &Mode) -> bool {
        self.entries.keys().eq(other.entries.keys())
    }

    /// Equality that fails when the two modes have different key sets,
    /// rather than silently reporting `false` the way `==` does.
    pub fn checked_eq(&self, other: &Mode) -> Result<bool, ModeError> {
        if !self.key_set_matches(other) {
            return Err(ModeError::KeySetMismatch);
        }
        Ok(self == other)
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}:{}", k, v)?;
        }
        write!(f, "}}")
    }
}
