//! Background execution of compiled statements.
//!
//! The worker gets an immutable snapshot: the compiled programs in chain
//! order and the scope the first one runs on. It never touches the
//! worksheet; outcomes are queued under a lock and the interactive thread
//! drains them with [`AsyncExecutor::poll`] or [`AsyncExecutor::wait`].

use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::{Condvar, Mutex};
use reckon_eval::{CancelToken, Engine, ExecuteFailure, ExecutionError, Scope};
use reckon_parse::Program;
use tracing::{debug, warn};

use crate::chunk::ChunkId;
use crate::statement::{ExecuteOutcome, Executed};

/// One statement to run.
#[derive(Clone, Debug)]
pub(crate) struct Job {
    pub id: ChunkId,
    pub program: Arc<Program>,
}

#[derive(Debug, Default)]
struct Progress {
    /// Finished statements not yet drained.
    outcomes: Vec<(ChunkId, ExecuteOutcome)>,
    executing: Option<ChunkId>,
    completed: usize,
    complete: bool,
    interrupted: bool,
}

#[derive(Debug, Default)]
struct Shared {
    progress: Mutex<Progress>,
    changed: Condvar,
}

/// What happened since the last drain.
#[derive(Debug, Default)]
pub(crate) struct Drained {
    pub outcomes: Vec<(ChunkId, ExecuteOutcome)>,
    pub executing: Option<ChunkId>,
    pub completed: usize,
    pub complete: bool,
}

#[derive(Debug)]
pub(crate) struct AsyncExecutor {
    shared: Arc<Shared>,
    cancel: CancelToken,
    total: usize,
    handle: Option<JoinHandle<()>>,
}

impl AsyncExecutor {
    /// Start running `jobs` in order on a worker thread, the first on
    /// top of `parent`. The chain stops at the first failure.
    pub fn spawn(
        engine: Arc<dyn Engine>,
        jobs: Vec<Job>,
        parent: Arc<Scope>,
        cancel: CancelToken,
        stack_size: usize,
    ) -> io::Result<Self> {
        let shared = Arc::new(Shared::default());
        let total = jobs.len();
        let handle = {
            let shared = Arc::clone(&shared);
            let cancel = cancel.clone();
            thread::Builder::new()
                .name("reckon-executor".to_owned())
                .stack_size(stack_size)
                .spawn(move || run_jobs(engine.as_ref(), jobs, parent, &cancel, &shared))?
        };
        Ok(AsyncExecutor {
            shared,
            cancel,
            total,
            handle: Some(handle),
        })
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Ask the worker to stop. Returns `false` if it was already asked or
    /// has finished.
    pub fn interrupt(&self) -> bool {
        let mut progress = self.shared.progress.lock();
        if progress.interrupted || progress.complete {
            return false;
        }
        progress.interrupted = true;
        self.cancel.cancel();
        debug!("background calculation interrupted");
        true
    }

    /// Take what finished so far without blocking.
    pub fn poll(&mut self) -> Drained {
        let drained = {
            let mut progress = self.shared.progress.lock();
            drain(&mut progress)
        };
        if drained.complete {
            self.join();
        }
        drained
    }

    /// Block until the worker finishes, then take everything.
    pub fn wait(&mut self) -> Drained {
        let drained = {
            let mut progress = self.shared.progress.lock();
            while !progress.complete {
                self.shared.changed.wait(&mut progress);
            }
            drain(&mut progress)
        };
        self.join();
        drained
    }

    fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("executor thread panicked");
            }
        }
    }
}

impl Drop for AsyncExecutor {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.cancel.cancel();
            self.join();
        }
    }
}

fn drain(progress: &mut Progress) -> Drained {
    Drained {
        outcomes: std::mem::take(&mut progress.outcomes),
        executing: progress.executing,
        completed: progress.completed,
        complete: progress.complete,
    }
}

/// Run one program, turning a panicking engine into an execution error.
pub(crate) fn execute_guarded(
    engine: &dyn Engine,
    program: &Program,
    parent: &Scope,
    cancel: &CancelToken,
) -> ExecuteOutcome {
    panic::catch_unwind(AssertUnwindSafe(|| engine.execute(program, parent, cancel)))
        .unwrap_or_else(|payload| Err(engine_panicked(payload.as_ref())))
        .map(Executed::from)
}

#[cold]
fn engine_panicked(payload: &(dyn Any + Send)) -> ExecuteFailure {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown cause".to_owned());
    warn!(%message, "engine panicked");
    ExecuteFailure::Error(ExecutionError {
        type_name: "RuntimeError".to_owned(),
        value: format!("engine panicked: {message}"),
        traceback: Vec::new(),
        line: 0,
    })
}

/// Marks the run complete when the worker leaves `run_jobs`, however it
/// leaves.
struct FinishOnDrop<'a>(&'a Shared);

impl Drop for FinishOnDrop<'_> {
    fn drop(&mut self) {
        let mut progress = self.0.progress.lock();
        progress.complete = true;
        progress.executing = None;
        self.0.changed.notify_all();
    }
}

fn run_jobs(
    engine: &dyn Engine,
    jobs: Vec<Job>,
    mut parent: Arc<Scope>,
    cancel: &CancelToken,
    shared: &Shared,
) {
    let _finish = FinishOnDrop(shared);
    for job in jobs {
        {
            let mut progress = shared.progress.lock();
            progress.executing = Some(job.id);
            shared.changed.notify_all();
        }

        let outcome = execute_guarded(engine, &job.program, &parent, cancel);
        let next = outcome.as_ref().ok().map(|executed| Arc::clone(&executed.scope));
        debug!(chunk = %job.id, ok = next.is_some(), "statement executed");

        let mut progress = shared.progress.lock();
        progress.executing = None;
        progress.completed += 1;
        progress.outcomes.push((job.id, outcome));
        shared.changed.notify_all();
        match next {
            Some(scope) => parent = scope,
            None => break,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Tests can panic")]

    use super::*;
    use pretty_assertions::assert_eq;
    use reckon_eval::{Execution, ReckonEngine};
    use reckon_parse::CompileError;

    fn jobs(engine: &ReckonEngine, texts: &[&str]) -> Vec<Job> {
        texts
            .iter()
            .enumerate()
            .map(|(i, text)| Job {
                id: ChunkId::new(u32::try_from(i).unwrap()),
                program: Arc::new(engine.compile(text).unwrap()),
            })
            .collect()
    }

    fn spawn(texts: &[&str]) -> AsyncExecutor {
        let engine = ReckonEngine::default();
        let jobs = jobs(&engine, texts);
        AsyncExecutor::spawn(
            Arc::new(engine),
            jobs,
            Arc::new(Scope::new()),
            CancelToken::new(),
            1024 * 1024,
        )
        .unwrap()
    }

    #[test]
    fn runs_chain_in_order() {
        let mut executor = spawn(&["x = 2", "y = x * 3", "y"]);
        let drained = executor.wait();
        assert!(drained.complete);
        assert_eq!(drained.completed, 3);
        let ids: Vec<u32> = drained.outcomes.iter().map(|(id, _)| id.raw()).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        let last = drained.outcomes[2].1.as_ref().unwrap();
        assert_eq!(last.results.len(), 1);
    }

    #[test]
    fn stops_at_first_error() {
        let mut executor = spawn(&["1 / 0", "2"]);
        let drained = executor.wait();
        assert_eq!(drained.outcomes.len(), 1);
        assert!(matches!(
            drained.outcomes[0].1,
            Err(ExecuteFailure::Error(_))
        ));
    }

    /// Compiles normally but panics instead of running anything.
    #[derive(Debug, Default)]
    struct PanickingEngine(ReckonEngine);

    impl Engine for PanickingEngine {
        fn compile(&self, text: &str) -> Result<Program, CompileError> {
            self.0.compile(text)
        }

        fn execute(
            &self,
            _program: &Program,
            _parent: &Scope,
            _cancel: &CancelToken,
        ) -> Result<Execution, ExecuteFailure> {
            panic!("no interpreter here")
        }

        fn builtin_names(&self) -> Vec<&'static str> {
            self.0.builtin_names()
        }
    }

    #[test]
    fn engine_panic_completes_the_run() {
        let engine = PanickingEngine::default();
        let jobs = jobs(&engine.0, &["1", "2"]);
        let mut executor = AsyncExecutor::spawn(
            Arc::new(engine),
            jobs,
            Arc::new(Scope::new()),
            CancelToken::new(),
            1024 * 1024,
        )
        .unwrap();
        let drained = executor.wait();
        assert!(drained.complete);
        assert_eq!(drained.outcomes.len(), 1);
        let Err(ExecuteFailure::Error(err)) = &drained.outcomes[0].1 else {
            panic!("expected an execution error");
        };
        assert_eq!(err.type_name, "RuntimeError");
        assert_eq!(err.value, "engine panicked: no interpreter here");
        assert!(!executor.interrupt());
    }

    #[test]
    fn interrupt_stops_a_loop() {
        let mut executor = spawn(&["while True:\n    pass", "1"]);
        assert!(executor.interrupt());
        assert!(!executor.interrupt());
        let drained = executor.wait();
        assert_eq!(drained.outcomes.len(), 1);
        assert!(matches!(
            drained.outcomes[0].1,
            Err(ExecuteFailure::Interrupted)
        ));
        assert!(!executor.interrupt());
    }
}
