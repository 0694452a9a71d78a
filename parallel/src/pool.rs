//! A fixed set of scoped worker threads draining a bounded work channel.
//!
//! The calling thread is the only producer: it [feed]s every item into the channel and closes it
//! by dropping the [Sender]. Workers share the [Receiver] and take items first-come-first-served
//! until the channel is closed and drained. [Pool::join] is the join barrier.

use crate::Error;
use crossbeam_channel::{Receiver, Sender};
use std::{
    panic::resume_unwind,
    thread::{self, Scope, ScopedJoinHandle},
};
use tracing::{dispatcher, trace, Dispatch};

/// Returns the number of workers spawned when `requested` workers are asked to process `items`
/// elements.
///
/// A call never spawns more workers than there are elements, so an empty collection (or a
/// request for zero workers) spawns none.
pub fn workers(requested: usize, items: usize) -> usize {
    requested.min(items)
}

/// Enqueues every item and then closes the channel by dropping `sender`.
///
/// Blocks whenever the channel is full. Returns early only if every worker has exited, which
/// happens when all of them panicked.
pub(crate) fn feed<I: Iterator>(sender: Sender<I::Item>, items: I) {
    for item in items {
        if sender.send(item).is_err() {
            break;
        }
    }
}

/// Spawns a named scoped thread that inherits the caller's [Dispatch].
pub(crate) fn spawn<'scope, 'env, F, T>(
    scope: &'scope Scope<'scope, 'env>,
    name: String,
    f: F,
) -> std::io::Result<ScopedJoinHandle<'scope, T>>
where
    F: FnOnce() -> T + Send + 'scope,
    T: Send + 'scope,
{
    // Thread-local subscribers are not inherited by spawned threads
    let dispatch = dispatcher::get_default(Dispatch::clone);
    thread::Builder::new()
        .name(name)
        .spawn_scoped(scope, move || dispatcher::with_default(&dispatch, f))
}

/// Joins `handle`, re-raising its panic (if any) on the calling thread.
pub(crate) fn join<T>(handle: ScopedJoinHandle<'_, T>) -> T {
    match handle.join() {
        Ok(value) => value,
        Err(err) => resume_unwind(err),
    }
}

/// Workers draining a shared work channel.
pub(crate) struct Pool<'scope> {
    handles: Vec<ScopedJoinHandle<'scope, ()>>,
}

impl<'scope> Pool<'scope> {
    /// Spawns `workers` threads in `scope`, each applying the closure returned by `build` to every
    /// item it takes from `receiver`.
    ///
    /// `build` is called once per worker with the worker's index. `receiver` is dropped once every
    /// worker holds its own clone, so the channel disconnects when the last worker exits.
    ///
    /// If a thread cannot be spawned, the workers already running are left to exit once the
    /// caller drops its [Sender] (the enclosing scope joins them).
    pub(crate) fn spawn<'env, T, B, W>(
        scope: &'scope Scope<'scope, 'env>,
        name: &str,
        workers: usize,
        receiver: Receiver<T>,
        mut build: B,
    ) -> Result<Self, Error>
    where
        T: Send + 'scope,
        B: FnMut(usize) -> W,
        W: FnMut(T) + Send + 'scope,
    {
        let mut handles = Vec::with_capacity(workers);
        for index in 0..workers {
            let receiver = receiver.clone();
            let mut work = build(index);
            let handle = spawn(scope, format!("{name}-worker-{index}"), move || {
                let mut processed = 0usize;
                for item in receiver.iter() {
                    work(item);
                    processed += 1;
                }
                trace!(index, processed, "worker exited");
            })
            .map_err(|source| Error::Spawn { index, source })?;
            handles.push(handle);
        }
        Ok(Self { handles })
    }

    /// Blocks until every worker has exited.
    ///
    /// Every worker is joined before the first panic (if any) is re-raised, so no worker is
    /// still running when this returns or unwinds.
    pub(crate) fn join(self) {
        let mut panic = None;
        for handle in self.handles {
            if let Err(err) = handle.join() {
                panic.get_or_insert(err);
            }
        }
        if let Some(err) = panic {
            resume_unwind(err);
        }
    }
}
