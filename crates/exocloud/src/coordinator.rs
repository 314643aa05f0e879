//! Fan-out of the tracer population over worker copies
//!
//! PARTITION moves the master's tracers onto the workers, ADVANCING runs
//! every worker on its own named thread, and JOIN waits for all of them.
//! Workers share nothing: each owns its copy for the duration of the advance
//! and hands its tracers back by value in a [`WorkerReport`].

use std::any::Any;
use std::thread;

use log::{debug, error};
use units::Time;

use crate::engine::{PhysicsEngine, TracerState};
use crate::error::{EngineError, SessionError};
use crate::id::ParticleId;

/// Tracers returned by one worker after an advance
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerReport {
    pub worker: usize,
    pub tracers: Vec<TracerState>,
    /// Tracers absorbed by active bodies during the advance
    pub absorbed: Vec<ParticleId>,
}

/// Splits `items` into `parts` contiguous runs whose lengths differ by at most one
///
/// The first `len % parts` runs get the extra element.
///
/// # Examples
///
/// ```
/// use exocloud::coordinator::split_even;
///
/// let parts = split_even((0..7).collect::<Vec<_>>(), 3);
/// assert_eq!(parts, vec![vec![0, 1, 2], vec![3, 4], vec![5, 6]]);
/// ```
pub fn split_even<T>(items: Vec<T>, parts: usize) -> Vec<Vec<T>> {
    let parts = parts.max(1);
    let base = items.len() / parts;
    let extra = items.len() % parts;

    let mut iter = items.into_iter();
    (0..parts)
        .map(|i| iter.by_ref().take(base + usize::from(i < extra)).collect())
        .collect()
}

/// Moves every master tracer onto the workers and aligns their active bodies
///
/// # Returns
///
/// Partition sizes, one per worker
pub fn partition<E: PhysicsEngine>(master: &mut E, workers: &mut [E]) -> Result<Vec<usize>, EngineError> {
    let tracers = master.drain_tracers();
    let chunks = split_even(tracers, workers.len());

    let mut sizes = Vec::with_capacity(workers.len());
    for (worker, chunk) in workers.iter_mut().zip(chunks) {
        worker.drain_tracers();
        worker.sync_active(master);
        sizes.push(chunk.len());
        worker.insert_tracers(chunk)?;
    }
    Ok(sizes)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "worker panicked".to_string())
}

fn run_worker<E: PhysicsEngine>(index: usize, engine: &mut E, duration: Time) -> Result<WorkerReport, EngineError> {
    let absorbed = engine.advance(duration)?;
    Ok(WorkerReport {
        worker: index,
        tracers: engine.drain_tracers(),
        absorbed,
    })
}

/// Advances every worker by `duration` in parallel and waits for all of them
///
/// Any worker error or panic is fatal for the whole advance.
///
/// # Returns
///
/// One report per worker, in worker order
pub fn advance_workers<E: PhysicsEngine>(workers: &mut [E], duration: Time) -> Result<Vec<WorkerReport>, SessionError> {
    thread::scope(|scope| {
        let mut handles = Vec::with_capacity(workers.len());
        for (index, engine) in workers.iter_mut().enumerate() {
            let handle = thread::Builder::new()
                .name(format!("advance-worker-{index}"))
                .spawn_scoped(scope, move || run_worker(index, engine, duration))
                .map_err(SessionError::WorkerSpawn)?;
            handles.push(handle);
        }
        debug!("advancing {} workers by {:.1} s", handles.len(), duration.to_seconds());

        let mut reports = Vec::with_capacity(handles.len());
        let mut failure = None;
        for (index, handle) in handles.into_iter().enumerate() {
            match handle.join() {
                Ok(Ok(report)) => reports.push(report),
                Ok(Err(e)) => {
                    error!("worker {index} failed: {e}");
                    failure.get_or_insert_with(|| SessionError::worker(index, e.to_string()));
                }
                Err(payload) => {
                    let reason = panic_message(payload.as_ref());
                    error!("worker {index} panicked: {reason}");
                    failure.get_or_insert_with(|| SessionError::worker(index, reason));
                }
            }
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(reports),
        }
    })
}
