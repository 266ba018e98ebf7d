//! Provide hash containers, re-exports *hashbrown* and *foldhash*.
//!
//! The containers are plain `hashbrown` types hashed by `foldhash` with its
//! fixed default seed, so hashing a key gives the same result in every
//! process and iteration order only depends on the inserted keys. Both the
//! name-keyed registries and the id-keyed handler sets use them.
//!
//! # Examples
//!
//! ```
//! use core::hash::BuildHasher;
//! use pl_utils::hash::{FixedHashState, HashMap};
//!
//! let state = FixedHashState::default();
//! assert_eq!(state.hash_one("Circle"), FixedHashState::default().hash_one("Circle"));
//!
//! let mut classes: HashMap<&str, u32> = HashMap::default();
//! classes.insert("Circle", 1);
//! assert_eq!(classes.get("Circle"), Some(&1));
//! ```

// -----------------------------------------------------------------------------
// Exports

/// Hash state with a fixed seed.
pub type FixedHashState = foldhash::fast::FixedState;

/// A [`hashbrown::HashMap`] using [`FixedHashState`].
pub type HashMap<K, V, S = FixedHashState> = hashbrown::HashMap<K, V, S>;

/// A [`hashbrown::HashSet`] using [`FixedHashState`].
pub type HashSet<T, S = FixedHashState> = hashbrown::HashSet<T, S>;

// -----------------------------------------------------------------------------
// Re-export crates

pub use foldhash;
pub use hashbrown;

// -----------------------------------------------------------------------------
// Tests
