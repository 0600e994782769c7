//! Fixed-size worker pool over contiguous index chunks.
//!
//! `[0, n)` is split into `t` contiguous chunks of `n / t` items with the
//! remainder in the last chunk. Each chunk owns the matching contiguous slice
//! of the output buffer, so workers write results without locking. Worker
//! state (FFT plans, scratch) is built inside each worker by an `init`
//! closure and never shared.
//!
//! With a single worker the same chunk routine runs on the calling thread, so
//! the sequential and parallel paths produce bit-identical output.

use crate::util::{PivError, PivResult};
use std::any::Any;
use std::ops::Range;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// Resolves a requested thread count: `0` means "all cores but one".
pub fn resolve_thread_count(requested: usize) -> usize {
    if requested >= 1 {
        return requested;
    }
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .saturating_sub(1)
        .max(1)
}

/// Splits `[0, n)` into `threads` contiguous ranges.
///
/// Every range but the last has `n / threads` items; the last absorbs the
/// remainder. `threads` is clamped to `[1, n]`, so no range is empty unless
/// `n` is zero.
pub fn chunk_ranges(n: usize, threads: usize) -> Vec<Range<usize>> {
    let threads = threads.min(n).max(1);
    let chunk = n / threads;
    let mut ranges = Vec::with_capacity(threads);
    let mut start = 0;
    for idx in 0..threads {
        let end = if idx + 1 == threads { n } else { start + chunk };
        ranges.push(start..end);
        start = end;
    }
    ranges
}

/// Worker pool sized once per run.
pub struct WorkerPool {
    threads: usize,
    pool: Option<rayon::ThreadPool>,
}

impl WorkerPool {
    /// Creates a pool; see [`resolve_thread_count`] for the meaning of `requested`.
    pub fn new(requested: usize) -> PivResult<Self> {
        let threads = resolve_thread_count(requested);
        let pool = if threads > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .thread_name(|idx| format!("pivcorr-worker-{idx}"))
                .build()
                .map_err(|err| PivError::ThreadPool {
                    reason: err.to_string(),
                })?;
            Some(pool)
        } else {
            None
        };
        Ok(Self { threads, pool })
    }

    /// Number of workers.
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Runs `task` once per item of `out`, where item `i` owns
    /// `out[i * item_len..(i + 1) * item_len]`.
    ///
    /// Returns only after every worker finished. The first fault (error or
    /// panic) stops the remaining workers at their next item and is returned
    /// as [`PivError::WorkerFailed`].
    pub fn run<O, S, I, F>(
        &self,
        out: &mut [O],
        item_len: usize,
        init: I,
        task: F,
    ) -> PivResult<()>
    where
        O: Send,
        I: Fn() -> PivResult<S> + Sync,
        F: Fn(&mut S, usize, &mut [O]) -> PivResult<()> + Sync,
    {
        if item_len == 0 || out.len() % item_len != 0 {
            return Err(PivError::ShapeMismatch {
                expected: item_len,
                got: out.len(),
                context: "scheduler output slots",
            });
        }
        let n = out.len() / item_len;
        if n == 0 {
            return Ok(());
        }

        let faults = FaultLog::default();
        let workers = self.threads.min(n);
        match (&self.pool, workers) {
            (Some(pool), workers) if workers > 1 => {
                let ranges = chunk_ranges(n, workers);
                pool.scope(|scope| {
                    let mut rest = &mut *out;
                    for (chunk, range) in ranges.into_iter().enumerate() {
                        let (slots, tail) =
                            std::mem::take(&mut rest).split_at_mut(range.len() * item_len);
                        rest = tail;
                        let (init, task, faults) = (&init, &task, &faults);
                        scope.spawn(move |_| {
                            let outcome =
                                run_chunk(range, slots, item_len, init, task, &faults.stop);
                            if let Err(err) = outcome {
                                faults.record(chunk, err);
                            }
                        });
                    }
                });
            }
            _ => {
                if let Err(err) = run_chunk(0..n, out, item_len, &init, &task, &faults.stop) {
                    faults.record(0, err);
                }
            }
        }
        faults.finish()
    }
}

fn run_chunk<O, S, I, F>(
    range: Range<usize>,
    slots: &mut [O],
    item_len: usize,
    init: &I,
    task: &F,
    stop: &AtomicBool,
) -> PivResult<()>
where
    I: Fn() -> PivResult<S>,
    F: Fn(&mut S, usize, &mut [O]) -> PivResult<()>,
{
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let mut state = init()?;
        for (index, slot) in range.zip(slots.chunks_exact_mut(item_len)) {
            if stop.load(Ordering::Relaxed) {
                break;
            }
            task(&mut state, index, slot)?;
        }
        Ok(())
    }));
    outcome.unwrap_or_else(|payload| {
        Err(PivError::WorkerPanicked {
            message: panic_message(payload.as_ref()),
        })
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_owned()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

/// First fault of a phase plus a count of all faults.
#[derive(Default)]
struct FaultLog {
    first: Mutex<Option<(usize, PivError)>>,
    count: AtomicUsize,
    stop: AtomicBool,
}

impl FaultLog {
    fn record(&self, chunk: usize, err: PivError) {
        self.stop.store(true, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
        let mut first = self.first.lock().unwrap_or_else(PoisonError::into_inner);
        if first.is_none() {
            *first = Some((chunk, err));
        }
    }

    fn finish(self) -> PivResult<()> {
        let faults = self.count.into_inner();
        match self.first.into_inner().unwrap_or_else(PoisonError::into_inner) {
            Some((chunk, cause)) => Err(PivError::WorkerFailed {
                chunk,
                faults,
                cause: Box::new(cause),
            }),
            None => Ok(()),
        }
    }
}
