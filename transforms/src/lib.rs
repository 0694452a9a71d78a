//! Sequential and concurrent filter and fold over slices, maps, and cons lists.
//!
//! Every container shape gets the same four operations:
//!
//! - `filter(predicate, collection)`: keeps the elements satisfying `predicate`
//! - `filter_concurrent(predicate, collection, concurrency)`: like `filter`, spread over up to
//!   `concurrency` worker threads (result order is unspecified)
//! - `fold(combine, acc, collection)`: combines every element into `acc`, passed by value
//! - `fold_concurrent(combine, acc, collection, concurrency)`: like `fold`, spread over up to
//!   `concurrency` worker threads with `acc` passed as a shared handle
//!
//! The concurrent variants are thin adapters over [fanfold_parallel::Concurrent]. Read its
//! documentation before folding concurrently: the combining function runs on several threads at
//! once and must synchronize whatever the accumulator handle points to.
//!
//! # Example
//!
//! ```
//! use fanfold_transforms::slices;
//! use std::sync::atomic::{AtomicU64, Ordering};
//!
//! let numbers: Vec<u64> = (1..=10).collect();
//!
//! let mut evens = slices::filter_concurrent(|x| x % 2 == 0, &numbers, 4).unwrap();
//! evens.sort_unstable();
//! assert_eq!(evens, vec![2, 4, 6, 8, 10]);
//!
//! let total = AtomicU64::new(0);
//! slices::fold_concurrent(
//!     |x, acc: &AtomicU64| {
//!         acc.fetch_add(x * x, Ordering::Relaxed);
//!         acc
//!     },
//!     &total,
//!     &numbers,
//!     3,
//! )
//! .unwrap();
//! assert_eq!(total.load(Ordering::Relaxed), 385);
//! ```

pub use fanfold_cons::List;
pub use fanfold_parallel::Error;

pub mod lists;
pub mod maps;
pub mod slices;
