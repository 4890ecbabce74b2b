pub mod catalog;
pub mod config;
pub mod dupes;
pub mod engine;
pub mod error;
pub mod hasher;
pub mod progress;
pub mod report;
pub mod scanner;

pub use catalog::{CatalogEntry, EntryKind, ErrorEntry, RunResults};
pub use config::{AppConfig, RecursionThreshold, RunConfig};
pub use engine::{CatalogEngine, RunHandle, RunOutcome};
pub use error::Error;
pub use hasher::HashAlgorithm;
pub use progress::{CancelToken, ProgressReporter, SilentReporter};
