use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, info};

use crate::catalog::RunResults;
use crate::config::RunConfig;
use crate::dupes;
use crate::error::Error;
use crate::progress::{estimate_total_units, CancelToken, ProgressReporter, RunContext};
use crate::scanner;

/// Drives one catalog run at a time on a dedicated worker thread, so the
/// caller never blocks on file I/O. Within the worker execution is strictly
/// sequential. The engine itself holds only configuration; all run state
/// lives in the run, so a new run always starts clean.
pub struct CatalogEngine {
    config: RunConfig,
}

/// Terminal state of a run: either every input was consumed, or the
/// cancellation token was set and partial results were discarded.
#[derive(Debug)]
pub enum RunOutcome {
    Completed(RunResults),
    Cancelled,
}

/// Handle to a running catalog worker. The worker must be joined (via
/// [`RunHandle::wait`]) before the engine is reused, so that temporary
/// extraction directories finish cleanup.
pub struct RunHandle {
    cancel: CancelToken,
    worker: JoinHandle<RunOutcome>,
}

impl RunHandle {
    /// Request a graceful stop. The worker exits at its next checkpoint;
    /// the completion event is suppressed.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Block until the worker exits and return the terminal outcome.
    pub fn wait(self) -> RunOutcome {
        self.worker.join().expect("catalog worker panicked")
    }
}

impl CatalogEngine {
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Begin one run on a background worker and return immediately.
    ///
    /// Fails with [`Error::InvalidInput`] when no input paths are selected;
    /// nothing is spawned in that case.
    pub fn start(&self, reporter: Arc<dyn ProgressReporter>) -> Result<RunHandle, Error> {
        if self.config.input_paths.is_empty() {
            return Err(Error::InvalidInput("no input paths selected".to_string()));
        }

        let cancel = CancelToken::new();
        let config = self.config.clone();
        let token = cancel.clone();
        let worker = thread::Builder::new()
            .name("fileledger-catalog".to_string())
            .spawn(move || run(config, token, reporter))?;

        Ok(RunHandle { cancel, worker })
    }
}

/// Synchronous run body: estimate, walk, aggregate. This is the seam the
/// worker thread executes and the integration tests drive directly.
pub fn run(
    config: RunConfig,
    cancel: CancelToken,
    reporter: Arc<dyn ProgressReporter>,
) -> RunOutcome {
    debug!(
        "starting catalog run over {} input path(s) with {:?}",
        config.input_paths.len(),
        config.algorithm
    );

    let total_units = estimate_total_units(&config.input_paths, config.threshold);
    let ctx = RunContext::new(total_units, cancel, reporter);

    let mut results = scanner::walk(&config, &ctx);

    if ctx.is_cancelled() {
        info!("catalog run cancelled; partial results discarded");
        return RunOutcome::Cancelled;
    }

    dupes::finalize(&mut results);
    info!(
        "catalog run complete: {} entries, {} errors, {} empty files, {} empty folders",
        results.catalog.len(),
        results.errors.len(),
        results.empty_files.len(),
        results.empty_dirs.len()
    );

    ctx.finish(&results);
    RunOutcome::Completed(results)
}
