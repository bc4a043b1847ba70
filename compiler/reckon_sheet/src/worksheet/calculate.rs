//! Running the statement chain.

use std::sync::Arc;

use reckon_eval::Scope;
use tracing::{debug, warn};

use super::Worksheet;
use crate::errors::EditError;
use crate::events::{SheetEvent, SheetState};
use crate::executor::{execute_guarded, AsyncExecutor, Drained, Job};
use crate::statement::StatementChunk;

impl Worksheet {
    /// Compile and run the first dirty statement and every statement after
    /// it, in source order. Failures are recorded on the statement that
    /// failed, and the chain stops there; the statements after it stay
    /// dirty.
    ///
    /// In background mode this only starts the run. Drive it with
    /// [`poll`](Self::poll) or [`wait`](Self::wait).
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn calculate(&mut self) -> Result<(), EditError> {
        self.check_idle()?;
        self.freeze();
        self.start_calculation();
        self.thaw();
        Ok(())
    }

    fn start_calculation(&mut self) {
        let ids = self.statement_ids();
        let Some(first) = ids.iter().position(|id| {
            self.chunks[id]
                .statement()
                .is_some_and(StatementChunk::is_dirty)
        }) else {
            debug!("nothing to calculate");
            return;
        };
        let parent = first
            .checked_sub(1)
            .and_then(|prev| self.chunks[&ids[prev]].statement()?.result_scope().cloned())
            .unwrap_or_else(|| Arc::clone(&self.root_scope));
        let pending = &ids[first..];

        // Every pending statement is compiled, so each one shows its own
        // syntax error even when the chain stops earlier.
        for &id in pending {
            let text = match self.chunks[&id].statement() {
                Some(s) if s.needs_compile() || s.program().is_none() => s.text(),
                _ => continue,
            };
            let result = self.engine.compile(&text);
            debug!(chunk = %id, ok = result.is_ok(), "statement compiled");
            if let Some(statement) = self.statement_mut(id) {
                statement.compiled(result);
            }
            self.chunk_changed(id);
        }

        let jobs: Vec<Job> = pending
            .iter()
            .map_while(|&id| {
                let program = self.chunks[&id].statement()?.program()?;
                Some(Job {
                    id,
                    program: Arc::clone(program),
                })
            })
            .collect();
        debug!(pending = pending.len(), runnable = jobs.len(), "calculating");
        if jobs.is_empty() {
            return;
        }

        self.cancel.reset();
        if self.config.background() {
            match AsyncExecutor::spawn(
                Arc::clone(&self.engine),
                jobs.clone(),
                Arc::clone(&parent),
                self.cancel.clone(),
                self.config.worker_stack(),
            ) {
                Ok(executor) => {
                    self.executor = Some(executor);
                    self.set_state(SheetState::Executing);
                    return;
                }
                Err(err) => warn!(%err, "executor thread failed to start, running in place"),
            }
        }
        self.run_in_place(jobs, parent);
    }

    fn run_in_place(&mut self, jobs: Vec<Job>, mut parent: Arc<Scope>) {
        for job in jobs {
            if let Some(statement) = self.statement_mut(job.id) {
                statement.begin_execute();
            }
            let outcome =
                execute_guarded(self.engine.as_ref(), &job.program, &parent, &self.cancel);
            let next = outcome.as_ref().ok().map(|e| Arc::clone(&e.scope));
            debug!(chunk = %job.id, ok = next.is_some(), "statement executed");
            if let Some(statement) = self.statement_mut(job.id) {
                statement.executed(outcome);
            }
            self.chunk_changed(job.id);
            match next {
                Some(scope) => parent = scope,
                None => break,
            }
        }
    }

    /// Apply what a background calculation has finished so far. Returns
    /// whether it is still running.
    pub fn poll(&mut self) -> bool {
        let Some(executor) = self.executor.as_mut() else {
            return false;
        };
        let drained = executor.poll();
        self.apply_drained(drained);
        self.executor.is_some()
    }

    /// Block until a background calculation finishes and apply it.
    pub fn wait(&mut self) {
        let Some(executor) = self.executor.as_mut() else {
            return;
        };
        let drained = executor.wait();
        self.apply_drained(drained);
    }

    /// Interrupt the running calculation. Returns `false` if there is none
    /// or it was already interrupted. Use an
    /// [`InterruptHandle`](super::InterruptHandle) to stop an in-place run
    /// from another thread.
    pub fn interrupt(&self) -> bool {
        self.executor.as_ref().is_some_and(AsyncExecutor::interrupt)
    }

    fn apply_drained(&mut self, drained: Drained) {
        let total = self.executor.as_ref().map_or(0, AsyncExecutor::total);
        let advanced = !drained.outcomes.is_empty();
        self.freeze();
        for (id, outcome) in drained.outcomes {
            if let Some(statement) = self.statement_mut(id) {
                statement.begin_execute();
                statement.executed(outcome);
            }
            self.chunk_changed(id);
        }
        if let Some(id) = drained.executing {
            if let Some(statement) = self.statement_mut(id) {
                statement.begin_execute();
            }
            self.chunk_changed(id);
        }
        if advanced {
            self.events.push(SheetEvent::ExecutionProgress {
                completed: drained.completed,
                total,
            });
        }
        self.thaw();
        if drained.complete {
            debug!(completed = drained.completed, total, "background calculation finished");
            self.executor = None;
            self.set_state(SheetState::Idle);
        }
    }
}
