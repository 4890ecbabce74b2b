use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::catalog::{display_path, short_name, CatalogEntry, ErrorEntry, RunResults};
use crate::config::RunConfig;
use crate::error::Error;
use crate::hasher;
use crate::progress::RunContext;

use super::{archive, is_zip_path};

/// Depth-first catalog walk over the configured input paths.
///
/// Each top-level input is either hashed directly (plain file), expanded
/// (ZIP archive), or recursed into (directory). Failures at single-file
/// granularity become error entries and never abort the run. On cancellation
/// the walk stops at the next checkpoint and returns whatever was collected;
/// the caller decides whether partial results are worth anything.
pub fn walk(config: &RunConfig, ctx: &RunContext) -> RunResults {
    let mut out = RunResults::default();

    for input in &config.input_paths {
        if ctx.is_cancelled() {
            break;
        }

        if input.is_file() {
            process_file(input, config, ctx, &mut out);
            ctx.advance(&short_name(input));
        } else if input.is_dir() {
            visit_dir(input, config, ctx, &mut out);
        } else {
            warn!("input path not found: {}", input.display());
            out.errors.push(ErrorEntry::new(
                display_path(input),
                "path does not exist or is not accessible",
            ));
        }
    }

    out
}

/// Dispatch rule shared by top-level files and files found inside
/// directories: ZIP archives are expanded, everything else is hashed.
fn process_file(path: &Path, config: &RunConfig, ctx: &RunContext, out: &mut RunResults) {
    if is_zip_path(path) {
        archive::expand(path, &display_path(path), config, ctx, out);
    } else {
        hash_plain_file(path, config, ctx, out);
    }
}

fn hash_plain_file(path: &Path, config: &RunConfig, ctx: &RunContext, out: &mut RunResults) {
    let name = short_name(path);
    match hasher::hash_file(path, config.algorithm, ctx.cancel_token(), &mut || {
        ctx.note_item(&name)
    }) {
        Ok((digest, size)) => {
            let entry = CatalogEntry::file(display_path(path), digest, size);
            if size == 0 {
                out.empty_files.push(entry.clone());
            }
            out.catalog.push(entry);
        }
        // Cancellation is observed by the caller's checkpoints, not logged.
        Err(Error::Cancelled) => {}
        Err(err) => {
            out.errors.push(ErrorEntry::new(
                display_path(path),
                format!("error processing file: {err}"),
            ));
        }
    }
}

fn visit_dir(dir: &Path, config: &RunConfig, ctx: &RunContext, out: &mut RunResults) {
    let dir_display = display_path(dir);
    debug!("visiting directory {}", dir_display);

    // One folder entry per visited directory, empty or not.
    out.catalog.push(CatalogEntry::folder(dir_display.clone()));

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            // Abandon this branch only; siblings are unaffected.
            out.errors.push(ErrorEntry::new(
                dir_display,
                format!("error reading directory: {err}"),
            ));
            return;
        }
    };

    let mut files = Vec::new();
    let mut subdirs = Vec::new();
    for entry in entries {
        match entry {
            Ok(entry) => {
                let path = entry.path();
                if path.is_dir() {
                    subdirs.push(path);
                } else {
                    files.push(path);
                }
            }
            Err(err) => {
                out.errors.push(ErrorEntry::new(
                    dir_display.clone(),
                    format!("error reading directory entry: {err}"),
                ));
            }
        }
    }

    files.sort();
    subdirs.sort();

    if files.is_empty() && subdirs.is_empty() {
        out.empty_dirs.push(CatalogEntry::folder(dir_display));
    }

    for file in &files {
        if ctx.is_cancelled() {
            return;
        }
        process_file(file, config, ctx, out);
        ctx.advance(&short_name(file));
    }

    for subdir in &subdirs {
        if ctx.is_cancelled() {
            return;
        }
        visit_dir(subdir, config, ctx, out);
    }
}
