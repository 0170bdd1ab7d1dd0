//! String hashing for name-keyed lookups
//!
//! Component type names, mesh names and material names are all referenced by
//! a fixed-width key derived from the name with xxh3.

use std::fmt;
use xxhash_rust::xxh3::xxh3_64;

/// Fixed-width key derived from a string name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HashId(pub u64);

impl HashId {
    /// Hash a name into a key
    pub fn of(name: &str) -> Self {
        Self(xxh3_64(name.as_bytes()))
    }

    /// Raw key value
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for HashId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl From<&str> for HashId {
    fn from(name: &str) -> Self {
        Self::of(name)
    }
}

/// Shorthand for [`HashId::of`]
pub fn string_id(name: &str) -> HashId {
    HashId::of(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_deterministic() {
        assert_eq!(string_id("AnimationComponent"), string_id("AnimationComponent"));
        assert_eq!(HashId::from("Cube"), HashId::of("Cube"));
    }

    #[test]
    fn test_distinct_names_distinct_keys() {
        assert_ne!(string_id("AnimationComponent"), string_id("AnimationBufferComponent"));
    }
}
