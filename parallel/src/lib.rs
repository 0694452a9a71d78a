//! Fan out filter and fold operations over a bounded pool of worker threads.
//!
//! This crate provides the [`Strategy`] trait, which abstracts over sequential and concurrent
//! execution of filter and fold operations. Algorithms can be written once and executed either
//! sequentially or concurrently depending on the chosen strategy.
//!
//! # Overview
//!
//! - [`filter`](Strategy::filter): Selects the elements satisfying a predicate
//! - [`fold`](Strategy::fold): Combines every element into an accumulator
//!
//! Two implementations are provided:
//!
//! - [`Sequential`]: Executes operations on the current thread, in iteration order
//! - [`Concurrent`]: Executes operations on a bounded set of worker threads spawned for the call
//!
//! # Execution Model
//!
//! A [`Concurrent`] call spawns `min(concurrency, len)` workers (see [`workers`]). The calling
//! thread enumerates the collection once and pushes each element onto a bounded channel (with a
//! capacity equal to the number of workers), then closes it. Workers drain the channel until it
//! is closed, applying the user function to each element. The call returns once every worker has
//! exited (a join barrier).
//!
//! When filtering, workers forward accepted elements over a second bounded channel to a single
//! collector thread, the only writer of the result container. The collector's input is closed
//! only after every worker has exited.
//!
//! When folding, there is no collector: every worker shares one accumulator.
//!
//! # Accumulators
//!
//! [`Concurrent::fold`] passes the accumulator as a cloneable handle (for example `&AtomicU64`,
//! `&Mutex<Vec<T>>` or `Arc<..>`). The handle returned by each call to the combining function
//! replaces the shared handle and is the one given to the next call on any worker. Nothing else is
//! serialized: calls to the combining function run concurrently, so it must synchronize any
//! mutation it performs on what the handle points to (an atomic add, or a lock it acquires).
//!
//! Folding a plain value (for example a `u64` accumulator combined with `acc + x`) with more than
//! one worker loses updates: two workers may read the same accumulator and both write back their
//! own result.
//!
//! # Ordering
//!
//! [`Concurrent`] makes no ordering guarantee: elements are processed, and accepted elements are
//! collected, in whatever order workers get to them.
//!
//! # Panics
//!
//! Panics inside user functions are not caught. A panic in a worker is re-raised on the calling
//! thread once every worker has exited.
//!
//! # Example
//!
//! ```
//! use fanfold_parallel::{Concurrent, Sequential, Strategy};
//! use std::sync::atomic::{AtomicU64, Ordering};
//!
//! fn sum_of_squares<S: Strategy>(strategy: &S, data: &[u64]) -> Result<u64, S::Error> {
//!     let total = AtomicU64::new(0);
//!     let total = strategy.fold(data, &total, |&x, acc| {
//!         acc.fetch_add(x * x, Ordering::Relaxed);
//!         acc
//!     })?;
//!     Ok(total.load(Ordering::Relaxed))
//! }
//!
//! let data = vec![1, 2, 3, 4, 5];
//! assert_eq!(sum_of_squares(&Sequential, &data).unwrap(), 55);
//! assert_eq!(sum_of_squares(&Concurrent::from(3), &data).unwrap(), 55);
//! ```

use crossbeam_channel::bounded;
use std::{
    convert::Infallible,
    fmt,
    sync::{Mutex, MutexGuard, PoisonError},
    thread,
};
use thiserror::Error;
use tracing::{debug, trace};

mod pool;
pub use pool::workers;
use pool::{feed, join, spawn, Pool};

/// Errors that can occur when running a [Concurrent] operation.
///
/// The thread name prefix is checked and every thread is spawned before the first element is
/// enqueued, so when an error is returned no element has been processed.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid thread name: {0:?}")]
    InvalidName(String),
    #[error("failed to spawn worker {index}: {source}")]
    Spawn {
        index: usize,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to spawn collector: {0}")]
    SpawnCollector(#[source] std::io::Error),
}

/// A strategy for executing filter and fold operations.
///
/// This trait abstracts over sequential and concurrent execution, allowing algorithms
/// to be written generically and then executed with different strategies depending
/// on the use case (e.g., sequential as a deterministic baseline, concurrent for slow
/// user functions).
pub trait Strategy: Clone + Send + Sync + fmt::Debug + 'static {
    /// Error returned when the strategy cannot run an operation.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns the elements of `iter` for which `predicate` holds.
    ///
    /// [`Sequential`] preserves iteration order. [`Concurrent`] does not.
    ///
    /// # Examples
    ///
    /// ```
    /// use fanfold_parallel::{Strategy, Sequential};
    ///
    /// let evens: Vec<u32> = Sequential
    ///     .filter(vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10], |x| x % 2 == 0)
    ///     .unwrap();
    /// assert_eq!(evens, vec![2, 4, 6, 8, 10]);
    /// ```
    fn filter<I, C, P>(&self, iter: I, predicate: P) -> Result<C, Self::Error>
    where
        I: IntoIterator<IntoIter: ExactSizeIterator, Item: Send>,
        C: Default + Extend<I::Item> + Send,
        P: Fn(&I::Item) -> bool + Sync;

    /// Combines every element of `iter` with `acc`: `combine(item, acc) -> acc`.
    ///
    /// Returns `acc` unchanged if `iter` is empty. See the [crate-level](crate) documentation
    /// for what [`Concurrent`] requires of `combine`.
    ///
    /// # Examples
    ///
    /// ```
    /// use fanfold_parallel::{Strategy, Sequential};
    ///
    /// let sum = Sequential.fold(vec![1, 2, 3], 0, |x, acc| acc + x).unwrap();
    /// assert_eq!(sum, 6);
    /// ```
    fn fold<I, A, F>(&self, iter: I, acc: A, combine: F) -> Result<A, Self::Error>
    where
        I: IntoIterator<IntoIter: ExactSizeIterator, Item: Send>,
        A: Clone + Send,
        F: Fn(I::Item, A) -> A + Sync;
}

/// A sequential execution strategy.
///
/// This strategy executes all operations on the current thread, in iteration order. It is
/// the baseline [`Concurrent`] results are compared against.
///
/// # Examples
///
/// ```
/// use fanfold_parallel::{Strategy, Sequential};
///
/// let product = Sequential.fold(vec![1u64, 2, 3, 4, 5], 1, |x, acc| acc * x).unwrap();
/// assert_eq!(product, 120);
/// ```
#[derive(Default, Debug, Clone)]
pub struct Sequential;

impl Strategy for Sequential {
    type Error = Infallible;

    fn filter<I, C, P>(&self, iter: I, predicate: P) -> Result<C, Self::Error>
    where
        I: IntoIterator<IntoIter: ExactSizeIterator, Item: Send>,
        C: Default + Extend<I::Item> + Send,
        P: Fn(&I::Item) -> bool + Sync,
    {
        let mut result = C::default();
        result.extend(iter.into_iter().filter(|item| predicate(item)));
        Ok(result)
    }

    fn fold<I, A, F>(&self, iter: I, acc: A, combine: F) -> Result<A, Self::Error>
    where
        I: IntoIterator<IntoIter: ExactSizeIterator, Item: Send>,
        A: Clone + Send,
        F: Fn(I::Item, A) -> A + Sync,
    {
        Ok(iter.into_iter().fold(acc, |acc, item| combine(item, acc)))
    }
}

/// Configuration for a [Concurrent] strategy.
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum number of workers spawned per operation.
    ///
    /// Clamped to the number of elements in the collection. Zero spawns no workers and
    /// leaves the input unprocessed.
    pub concurrency: usize,

    /// Prefix of the names given to spawned threads (`{name}-worker-{index}` and
    /// `{name}-collector`).
    ///
    /// Must not contain a NUL byte.
    pub name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            concurrency: 1,
            name: String::from("fanfold"),
        }
    }
}

/// A concurrent execution strategy backed by threads spawned for each operation.
///
/// No threads are kept between operations: each call spawns its workers (and, when filtering,
/// a collector) in a [thread scope](std::thread::scope), so user functions and accumulators may
/// borrow from the caller.
///
/// # Examples
///
/// ```
/// use fanfold_parallel::{Concurrent, Config, Strategy};
/// use std::collections::HashSet;
///
/// let strategy = Concurrent::new(Config {
///     concurrency: 4,
///     name: "evens".into(),
/// });
/// let numbers: Vec<u32> = (1..=10).collect();
/// let evens: HashSet<u32> = strategy.filter(numbers, |x| x % 2 == 0).unwrap();
/// assert_eq!(evens, HashSet::from([2, 4, 6, 8, 10]));
/// ```
#[derive(Clone, Debug)]
pub struct Concurrent {
    cfg: Config,
}

impl Concurrent {
    /// Creates a new [Concurrent] strategy with the given [Config].
    pub const fn new(cfg: Config) -> Self {
        Self { cfg }
    }

    /// Returns the maximum number of workers spawned per operation.
    pub const fn concurrency(&self) -> usize {
        self.cfg.concurrency
    }

    /// Returns the number of workers to spawn for `items` elements, or an error if threads
    /// cannot be named after [Config::name].
    fn plan(&self, items: usize) -> Result<usize, Error> {
        // Thread names are passed to the OS as C strings
        if self.cfg.name.contains('\0') {
            return Err(Error::InvalidName(self.cfg.name.clone()));
        }
        Ok(workers(self.cfg.concurrency, items))
    }
}

impl From<usize> for Concurrent {
    fn from(concurrency: usize) -> Self {
        Self::new(Config {
            concurrency,
            ..Default::default()
        })
    }
}

/// Locks the slot holding the shared accumulator handle.
///
/// Workers only hold the guard to read or replace the handle, never while running user code, so
/// the slot cannot be poisoned by a panicking combining function.
fn lock<A>(slot: &Mutex<A>) -> MutexGuard<'_, A> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Strategy for Concurrent {
    type Error = Error;

    fn filter<I, C, P>(&self, iter: I, predicate: P) -> Result<C, Self::Error>
    where
        I: IntoIterator<IntoIter: ExactSizeIterator, Item: Send>,
        C: Default + Extend<I::Item> + Send,
        P: Fn(&I::Item) -> bool + Sync,
    {
        let items = iter.into_iter();
        let len = items.len();
        let workers = self.plan(len)?;
        if workers == 0 {
            trace!(
                requested = self.cfg.concurrency,
                items = len,
                "skipping filter"
            );
            return Ok(C::default());
        }
        debug!(
            requested = self.cfg.concurrency,
            items = len,
            workers,
            "filtering"
        );

        let predicate = &predicate;
        thread::scope(|scope| -> Result<C, Error> {
            let (work_sender, work_receiver) = bounded(workers);
            let (result_sender, result_receiver) = bounded(workers);

            // Spawn workers, forwarding accepted items to the collector
            let pool = Pool::spawn(scope, &self.cfg.name, workers, work_receiver, |_| {
                let results = result_sender.clone();
                move |item| {
                    if predicate(&item) {
                        // Only fails if the collector panicked, which is re-raised on join
                        let _ = results.send(item);
                    }
                }
            })?;
            drop(result_sender);

            // Spawn the collector (the only writer of the result)
            let collector = spawn(scope, format!("{}-collector", self.cfg.name), move || {
                let mut accepted = 0usize;
                let mut result = C::default();
                result.extend(result_receiver.iter().inspect(|_| accepted += 1));
                trace!(accepted, "collector exited");
                result
            })
            .map_err(Error::SpawnCollector)?;

            // Enqueue all items and wait for the workers before the collector
            feed(work_sender, items);
            pool.join();
            Ok(join(collector))
        })
    }

    fn fold<I, A, F>(&self, iter: I, acc: A, combine: F) -> Result<A, Self::Error>
    where
        I: IntoIterator<IntoIter: ExactSizeIterator, Item: Send>,
        A: Clone + Send,
        F: Fn(I::Item, A) -> A + Sync,
    {
        let items = iter.into_iter();
        let len = items.len();
        let workers = self.plan(len)?;
        if workers == 0 {
            trace!(
                requested = self.cfg.concurrency,
                items = len,
                "skipping fold"
            );
            return Ok(acc);
        }
        debug!(
            requested = self.cfg.concurrency,
            items = len,
            workers,
            "folding"
        );

        // Only the handle is guarded, not what it points to
        let slot = Mutex::new(acc);
        let (slot_ref, combine) = (&slot, &combine);
        thread::scope(|scope| {
            let (sender, receiver) = bounded(workers);

            // Spawn workers, each reading the latest handle before every call
            let pool = Pool::spawn(scope, &self.cfg.name, workers, receiver, |_| {
                move |item| {
                    let acc = lock(slot_ref).clone();
                    let acc = combine(item, acc);
                    *lock(slot_ref) = acc;
                }
            })?;

            // Enqueue all items and wait for the workers
            feed(sender, items);
            pool.join();
            Ok::<_, Error>(())
        })?;
        Ok(slot.into_inner().unwrap_or_else(PoisonError::into_inner))
    }
}
