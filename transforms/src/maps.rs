//! Filter and fold over hash maps.
//!
//! Entries are visited in the map's iteration order, which is unspecified.

use crate::Error;
use fanfold_parallel::{Concurrent, Strategy};
use std::{
    collections::HashMap,
    hash::{BuildHasher, Hash},
};

/// Returns the entries of `map` that satisfy `predicate`.
pub fn filter<K, V, S, P>(predicate: P, map: &HashMap<K, V, S>) -> HashMap<K, V, S>
where
    K: Clone + Eq + Hash,
    V: Clone,
    S: BuildHasher + Default,
    P: Fn(&K, &V) -> bool,
{
    map.iter()
        .filter(|&(key, value)| predicate(key, value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Returns the entries of `map` that satisfy `predicate`, calling it from up to `concurrency`
/// worker threads.
pub fn filter_concurrent<K, V, S, P>(
    predicate: P,
    map: &HashMap<K, V, S>,
    concurrency: usize,
) -> Result<HashMap<K, V, S>, Error>
where
    K: Clone + Eq + Hash + Sync,
    V: Clone + Sync,
    S: BuildHasher + Default,
    P: Fn(&K, &V) -> bool + Sync,
{
    let accepted: Vec<(&K, &V)> = Concurrent::from(concurrency)
        .filter(map, |&(key, value)| predicate(key, value))?;
    Ok(accepted
        .into_iter()
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect())
}

/// Folds every entry of `map` into `acc`.
pub fn fold<K, V, S, A, F>(mut combine: F, acc: A, map: &HashMap<K, V, S>) -> A
where
    F: FnMut(&K, &V, A) -> A,
{
    map.iter().fold(acc, |acc, (key, value)| combine(key, value, acc))
}

/// Folds every entry of `map` into the accumulator handle `acc`, calling `combine` from up to
/// `concurrency` worker threads.
///
/// `combine` may run concurrently and must synchronize any mutation of the accumulator.
pub fn fold_concurrent<K, V, S, A, F>(
    combine: F,
    acc: A,
    map: &HashMap<K, V, S>,
    concurrency: usize,
) -> Result<A, Error>
where
    K: Sync,
    V: Sync,
    A: Clone + Send,
    F: Fn(&K, &V, A) -> A + Sync,
{
    Concurrent::from(concurrency).fold(map, acc, |(key, value), acc| combine(key, value, acc))
}
