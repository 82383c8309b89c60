//! Key to grouped values, the one primitive every stage is built on.
//!
//! A distributed runner would shuffle pairs to workers by key. Here the same
//! contract is a sorted map: every value sharing a key lands in one group,
//! and groups are handed to the caller one key at a time.
use std::collections::BTreeMap;

/// Collect `(key, value)` pairs into groups.
///
/// Values keep the order they arrived in within each group. Keys come back
/// in ascending order.
pub fn group_by_key<K, V, I>(pairs: I) -> BTreeMap<K, Vec<V>>
where
    K: Ord,
    I: IntoIterator<Item = (K, V)>,
{
    let mut groups: BTreeMap<K, Vec<V>> = BTreeMap::new();
    for (key, value) in pairs {
        groups.entry(key).or_default().push(value);
    }
    groups
}

/// Fold every value sharing a key with `reduce`.
///
/// `reduce` must be associative and commutative. Callers are free to run
/// this on arbitrary partitions of the input and reduce the partial results
/// again, which only gives the same answer under that contract.
pub fn reduce_by_key<K, V, I, F>(pairs: I, mut reduce: F) -> BTreeMap<K, V>
where
    K: Ord,
    I: IntoIterator<Item = (K, V)>,
    F: FnMut(V, V) -> V,
{
    let mut reduced: BTreeMap<K, V> = BTreeMap::new();
    for (key, value) in pairs {
        match reduced.remove_entry(&key) {
            Some((key, current)) => {
                reduced.insert(key, reduce(current, value));
            }
            None => {
                reduced.insert(key, value);
            }
        }
    }
    reduced
}
