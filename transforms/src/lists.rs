//! Filter and fold over cons lists.

use crate::Error;
use fanfold_cons::List;
use fanfold_parallel::{Concurrent, Strategy};

/// Returns a list of the values of `list` that satisfy `predicate`, in order.
pub fn filter<T, P>(predicate: P, list: &List<T>) -> List<T>
where
    T: Clone,
    P: Fn(&T) -> bool,
{
    list.iter().filter(|&value| predicate(value)).cloned().collect()
}

/// Returns a list of the values of `list` that satisfy `predicate`, calling it from up to
/// `concurrency` worker threads.
///
/// The order of the returned list is unspecified.
pub fn filter_concurrent<T, P>(
    predicate: P,
    list: &List<T>,
    concurrency: usize,
) -> Result<List<T>, Error>
where
    T: Clone + Sync,
    P: Fn(&T) -> bool + Sync,
{
    let accepted: Vec<&T> =
        Concurrent::from(concurrency).filter(list, |value| predicate(*value))?;
    Ok(accepted.into_iter().cloned().collect())
}

/// Folds the values of `list` into `acc`, front to back.
pub fn fold<T, A, F>(mut combine: F, acc: A, list: &List<T>) -> A
where
    F: FnMut(&T, A) -> A,
{
    list.iter().fold(acc, |acc, value| combine(value, acc))
}

/// Folds the values of `list` into the accumulator handle `acc`, calling `combine` from up to
/// `concurrency` worker threads.
///
/// `combine` may run concurrently and must synchronize any mutation of the accumulator.
pub fn fold_concurrent<T, A, F>(
    combine: F,
    acc: A,
    list: &List<T>,
    concurrency: usize,
) -> Result<A, Error>
where
    T: Sync,
    A: Clone + Send,
    F: Fn(&T, A) -> A + Sync,
{
    Concurrent::from(concurrency).fold(list, acc, combine)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fanfold_cons::list;
    use fanfold_macros::test_traced;
    use proptest::prelude::*;
    use std::sync::{
        atomic::{AtomicU64, Ordering},
        Mutex,
    };
    use test_case::test_case;

    #[test_case(list![], |_| true, list![]; "empty list")]
    #[test_case(list![1, 2, 3, 4, 5], |_| false, list![]; "none match")]
    #[test_case(list![1, 2, 3, 4, 5], |v| v % 2 == 1, list![1, 3, 5]; "odd only")]
    #[test_case(list![1, 2, 3], |_| true, list![1, 2, 3]; "all match")]
    fn test_filter(list: List<u32>, predicate: fn(&u32) -> bool, expected: List<u32>) {
        assert_eq!(filter(predicate, &list), expected);
    }

    #[test_case(1)]
    #[test_case(5)]
    #[test_case(10)]
    fn test_filter_concurrent(concurrency: usize) {
        let list: List<u32> = (1..=10).collect();
        let actual = filter_concurrent(|v| v % 2 == 0, &list, concurrency).unwrap();

        let mut values: Vec<u32> = actual.iter().copied().collect();
        values.sort_unstable();
        assert_eq!(values, vec![2, 4, 6, 8, 10]);
    }

    #[test]
    fn test_filter_concurrent_zero_concurrency() {
        let list = list![1, 2, 3];
        assert!(filter_concurrent(|_| true, &list, 0).unwrap().is_empty());
    }

    #[test]
    fn test_fold() {
        let list = list!["fan", "out", "fan", "in"];
        let words = fold(
            |word, mut acc: Vec<String>| {
                acc.push(word.to_uppercase());
                acc
            },
            Vec::new(),
            &list,
        );
        assert_eq!(words, vec!["FAN", "OUT", "FAN", "IN"]);
        assert_eq!(fold(|_, acc| acc + 1, 0, &List::<u8>::new()), 0);
    }

    #[test_traced]
    fn test_fold_concurrent() {
        let list: List<u64> = (1..=10).collect();
        for concurrency in [1, 3, 10] {
            let total = AtomicU64::new(0);
            fold_concurrent(
                |v, acc: &AtomicU64| {
                    acc.fetch_add(v * v, Ordering::SeqCst);
                    acc
                },
                &total,
                &list,
                concurrency,
            )
            .unwrap();
            assert_eq!(total.load(Ordering::SeqCst), 385);
        }
    }

    #[test]
    fn test_fold_concurrent_into_list() {
        // A list accumulator behind a lock: every call prepends one value
        let list: List<u64> = (0..100).collect();
        let acc = Mutex::new(List::new());
        fold_concurrent(
            |v, acc: &Mutex<List<u64>>| {
                let mut guard = acc.lock().unwrap();
                *guard = guard.cons(*v);
                drop(guard);
                acc
            },
            &acc,
            &list,
            8,
        )
        .unwrap();

        let mut values: Vec<u64> = acc.into_inner().unwrap().iter().copied().collect();
        values.sort_unstable();
        assert_eq!(values, (0..100).collect::<Vec<_>>());
    }

    proptest! {
        #[test]
        fn filter_concurrent_matches_filter(
            values in prop::collection::vec(any::<u16>(), 0..200),
            concurrency in 1usize..12,
        ) {
            let list: List<u16> = values.into_iter().collect();
            let divisible = |v: &u16| v % 3 == 0;

            let mut expected: Vec<u16> = filter(divisible, &list).iter().copied().collect();
            let mut actual: Vec<u16> = filter_concurrent(divisible, &list, concurrency)
                .unwrap()
                .iter()
                .copied()
                .collect();
            expected.sort_unstable();
            actual.sort_unstable();
            prop_assert_eq!(actual, expected);
        }
    }
}
