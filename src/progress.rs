use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::debug;
use walkdir::WalkDir;
use zip::ZipArchive;

use crate::catalog::RunResults;
use crate::config::RecursionThreshold;
use crate::scanner::{is_zip_name, is_zip_path};

/// Work units budgeted for the unknown contents of a nested archive. The true
/// count is unknown without fully opening every nested archive up front, so
/// the estimate pads and the percentage is capped below 100 until completion.
const NESTED_ARCHIVE_PADDING: u64 = 16;

/// Observer for one catalog run.
///
/// The CLI implements this with an indicatif bar; tests implement it with
/// counters. All methods have default no-op implementations. `on_progress`
/// percent is monotonically non-decreasing within a run and reaches 100 only
/// at completion. `on_complete` fires exactly once per run unless the run is
/// cancelled, in which case it is suppressed.
pub trait ProgressReporter: Send + Sync {
    fn on_progress(&self, _percent: u8, _current_item: &str) {}
    fn on_complete(&self, _results: &RunResults) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}

/// Shared cancellation flag, checked at every iteration boundary: the
/// input-path loop, the per-directory file loop, the per-archive member loop,
/// and between hashing blocks.
#[derive(Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

struct ProgressState {
    total_units: u64,
    processed: u64,
    percent: u8,
}

/// Monotonic processed-unit counter mapped onto 0–100. Lock-guarded because
/// the owning thread may poll it while the worker advances it.
pub struct ProgressTracker {
    state: Mutex<ProgressState>,
}

impl ProgressTracker {
    pub fn new(total_units: u64) -> Self {
        Self {
            state: Mutex::new(ProgressState {
                total_units: total_units.max(1),
                processed: 0,
                percent: 0,
            }),
        }
    }

    /// Record completed units. Returns the new percentage when it increased.
    /// Capped at 99 before completion so estimate error never shows a
    /// finished bar early.
    pub fn advance(&self, units: u64) -> Option<u8> {
        let mut state = self.state.lock().unwrap();
        state.processed += units;
        let percent = ((state.processed * 100) / state.total_units).min(99) as u8;
        if percent > state.percent {
            state.percent = percent;
            Some(percent)
        } else {
            None
        }
    }

    pub fn percent(&self) -> u8 {
        self.state.lock().unwrap().percent
    }

    /// Emitted unconditionally once all input is consumed.
    pub fn complete(&self) -> u8 {
        let mut state = self.state.lock().unwrap();
        state.percent = 100;
        state.percent
    }
}

/// Per-run state threaded by reference through every traversal call:
/// cancellation flag, progress counter, and the external observer.
pub struct RunContext {
    cancel: CancelToken,
    tracker: ProgressTracker,
    reporter: Arc<dyn ProgressReporter>,
}

impl RunContext {
    pub fn new(total_units: u64, cancel: CancelToken, reporter: Arc<dyn ProgressReporter>) -> Self {
        Self {
            cancel,
            tracker: ProgressTracker::new(total_units),
            reporter,
        }
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// One unit of work done; forwards the new percentage when it moved.
    pub fn advance(&self, item: &str) {
        if let Some(percent) = self.tracker.advance(1) {
            self.reporter.on_progress(percent, item);
        }
    }

    /// Surface the item currently being processed without consuming a unit
    /// (one notification per hashed block).
    pub fn note_item(&self, item: &str) {
        self.reporter.on_progress(self.tracker.percent(), item);
    }

    pub fn finish(&self, results: &RunResults) {
        self.reporter.on_progress(self.tracker.complete(), "");
        self.reporter.on_complete(results);
    }
}

/// A-priori total-work estimate: one unit per plain file, one per archive,
/// plus the archive's member count and a padding allowance per nested archive
/// when contents will be expanded under the threshold. Approximate by design;
/// unreadable paths count what can be seen and the walk caps at 99% anyway.
pub fn estimate_total_units(input_paths: &[PathBuf], threshold: RecursionThreshold) -> u64 {
    let mut units: u64 = 0;

    for path in input_paths {
        if path.is_file() {
            units += estimate_file_units(path, threshold);
        } else if path.is_dir() {
            for entry in WalkDir::new(path).into_iter().filter_map(Result::ok) {
                if entry.file_type().is_file() {
                    units += estimate_file_units(entry.path(), threshold);
                }
            }
        }
    }

    debug!("estimated {} work units", units.max(1));
    units.max(1)
}

fn estimate_file_units(path: &Path, threshold: RecursionThreshold) -> u64 {
    if !is_zip_path(path) || !threshold.expands() {
        return 1;
    }

    let Ok(file) = File::open(path) else {
        return 1;
    };
    let Ok(archive) = ZipArchive::new(file) else {
        return 1;
    };

    let member_count = archive.len();
    if !threshold.allows(member_count) {
        return 1;
    }

    let nested_archives = archive
        .file_names()
        .filter(|name| is_zip_name(name))
        .count() as u64;

    1 + member_count as u64 + nested_archives * NESTED_ARCHIVE_PADDING
}
