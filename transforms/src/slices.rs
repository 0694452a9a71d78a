//! Filter and fold over slices.

use crate::Error;
use fanfold_parallel::{Concurrent, Strategy};

/// Returns the elements of `items` that satisfy `predicate`, in order.
pub fn filter<T, P>(predicate: P, items: &[T]) -> Vec<T>
where
    T: Clone,
    P: Fn(&T) -> bool,
{
    // Reserve for the case where every element is kept
    let mut result = Vec::with_capacity(items.len());
    result.extend(items.iter().filter(|&item| predicate(item)).cloned());
    result
}

/// Returns the elements of `items` that satisfy `predicate`, calling it from up to
/// `concurrency` worker threads.
///
/// The order of the returned elements is unspecified.
pub fn filter_concurrent<T, P>(
    predicate: P,
    items: &[T],
    concurrency: usize,
) -> Result<Vec<T>, Error>
where
    T: Clone + Sync,
    P: Fn(&T) -> bool + Sync,
{
    let accepted: Vec<&T> =
        Concurrent::from(concurrency).filter(items, |item| predicate(*item))?;
    Ok(accepted.into_iter().cloned().collect())
}

/// Folds `items` into `acc`, front to back.
pub fn fold<T, A, F>(mut combine: F, acc: A, items: &[T]) -> A
where
    F: FnMut(&T, A) -> A,
{
    items.iter().fold(acc, |acc, item| combine(item, acc))
}

/// Folds `items` into the accumulator handle `acc`, calling `combine` from up to `concurrency`
/// worker threads.
///
/// `combine` may run concurrently and must synchronize any mutation of the accumulator.
pub fn fold_concurrent<T, A, F>(
    combine: F,
    acc: A,
    items: &[T],
    concurrency: usize,
) -> Result<A, Error>
where
    T: Sync,
    A: Clone + Send,
    F: Fn(&T, A) -> A + Sync,
{
    Concurrent::from(concurrency).fold(items, acc, combine)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fanfold_macros::test_traced;
    use proptest::prelude::*;
    use rand::Rng;
    use std::{
        sync::{
            atomic::{AtomicI64, Ordering},
            Mutex,
        },
        thread,
        time::Duration,
    };
    use test_case::test_case;

    fn jitter() {
        let millis = rand::thread_rng().gen_range(0..20);
        thread::sleep(Duration::from_millis(millis));
    }

    #[test_case(vec![], |_| false, vec![]; "empty list")]
    #[test_case(vec![1, 2, 3, 4, 5], |_| false, vec![]; "none match")]
    #[test_case(vec![1, 2, 3, 4, 5], |e| e % 2 == 0, vec![2, 4]; "even only")]
    #[test_case(vec![1, 2, 3, 4, 5], |_| true, vec![1, 2, 3, 4, 5]; "all match")]
    fn test_filter(items: Vec<i32>, predicate: fn(&i32) -> bool, expected: Vec<i32>) {
        assert_eq!(filter(predicate, &items), expected);
    }

    #[test_case(1, false)]
    #[test_case(5, false)]
    #[test_case(10, false)]
    #[test_case(1, true)]
    #[test_case(5, true)]
    #[test_case(10, true)]
    fn test_filter_concurrent(concurrency: usize, slow: bool) {
        let items: Vec<i32> = (1..=10).collect();
        let mut actual = filter_concurrent(
            |e| {
                if slow {
                    jitter();
                }
                e % 2 == 0
            },
            &items,
            concurrency,
        )
        .unwrap();
        actual.sort_unstable();
        assert_eq!(actual, vec![2, 4, 6, 8, 10]);
    }

    #[test_case(0)]
    #[test_case(1)]
    #[test_case(8)]
    fn test_filter_concurrent_empty(concurrency: usize) {
        let items: Vec<i32> = Vec::new();
        assert!(filter_concurrent(|_| true, &items, concurrency)
            .unwrap()
            .is_empty());
    }

    #[test_case(vec![], 0; "empty list")]
    #[test_case(vec![1, 2, 3], 6; "simple sum")]
    fn test_fold(items: Vec<i32>, expected: i32) {
        assert_eq!(fold(|e, acc| acc + e, 0, &items), expected);
    }

    #[test]
    fn test_fold_order() {
        let items = ["a", "b", "c"];
        let joined = fold(
            |e, mut acc: String| {
                acc.push_str(e);
                acc
            },
            String::new(),
            &items,
        );
        assert_eq!(joined, "abc");
    }

    #[test_case(1, false)]
    #[test_case(3, false)]
    #[test_case(10, false)]
    #[test_case(3, true)]
    #[test_case(10, true)]
    fn test_fold_concurrent(concurrency: usize, slow: bool) {
        let items: Vec<i64> = (1..=10).collect();
        let total = AtomicI64::new(0);
        fold_concurrent(
            |e, acc: &AtomicI64| {
                if slow {
                    jitter();
                }
                acc.fetch_add(*e, Ordering::SeqCst);
                acc
            },
            &total,
            &items,
            concurrency,
        )
        .unwrap();
        assert_eq!(total.load(Ordering::SeqCst), 55);
    }

    #[test_traced]
    fn test_fold_concurrent_locked() {
        let items: Vec<String> = (1..=10).map(|i| format!("v{i}")).collect();
        for concurrency in [1, 3, 10] {
            let acc = Mutex::new(Vec::new());
            fold_concurrent(
                |e, acc: &Mutex<Vec<String>>| {
                    acc.lock().unwrap().push(e.clone());
                    acc
                },
                &acc,
                &items,
                concurrency,
            )
            .unwrap();

            let mut actual = acc.into_inner().unwrap();
            actual.sort();
            let mut expected = items.clone();
            expected.sort();
            assert_eq!(actual, expected);
        }
    }

    #[test]
    fn test_fold_concurrent_empty() {
        let items: Vec<i64> = Vec::new();
        let total = AtomicI64::new(7);
        let acc = fold_concurrent(
            |e, acc: &AtomicI64| {
                acc.fetch_add(*e, Ordering::SeqCst);
                acc
            },
            &total,
            &items,
            4,
        )
        .unwrap();
        assert_eq!(acc.load(Ordering::SeqCst), 7);
    }

    proptest! {
        #[test]
        fn filter_concurrent_matches_filter(
            items in prop::collection::vec(any::<i32>(), 0..200),
            concurrency in 1usize..12,
        ) {
            let positive = |e: &i32| *e > 0;

            let mut expected = filter(positive, &items);
            let mut actual = filter_concurrent(positive, &items, concurrency).unwrap();
            expected.sort_unstable();
            actual.sort_unstable();
            prop_assert_eq!(actual, expected);
        }
    }
}
