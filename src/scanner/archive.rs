use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::debug;
use zip::ZipArchive;

use crate::catalog::{short_name, virtual_join, CatalogEntry, ErrorEntry, RunResults};
use crate::config::{RecursionThreshold, RunConfig};
use crate::error::Error;
use crate::hasher;
use crate::progress::RunContext;

use super::is_zip_name;

/// Expand one ZIP archive into catalog entries.
///
/// The container file itself is always cataloged (hash of its raw bytes),
/// whether or not the contents are expanded — even when the archive fails to
/// parse, the raw-bytes entry is kept so an explicitly selected file is never
/// silently missing from the catalog. `virtual_base` is the path the
/// container is cataloged under: the on-disk path for a top-level archive, or
/// a virtual path like `outer.zip/inner.zip` for a nested one. The recursion
/// threshold is evaluated independently at every nesting level, so one
/// oversized inner archive never blocks cataloging its siblings.
pub fn expand(
    archive_path: &Path,
    virtual_base: &str,
    config: &RunConfig,
    ctx: &RunContext,
    out: &mut RunResults,
) {
    let name = short_name(archive_path);
    match hasher::hash_file(archive_path, config.algorithm, ctx.cancel_token(), &mut || {
        ctx.note_item(&name)
    }) {
        Ok((digest, size)) => {
            let entry = CatalogEntry::file(virtual_base.to_string(), digest, size);
            if size == 0 {
                out.empty_files.push(entry.clone());
            }
            out.catalog.push(entry);
        }
        Err(Error::Cancelled) => return,
        Err(err) => {
            out.errors.push(ErrorEntry::new(
                virtual_base.to_string(),
                format!("error hashing archive: {err}"),
            ));
        }
    }

    if !config.threshold.expands() {
        return;
    }

    match expand_members(archive_path, virtual_base, config, ctx, out) {
        Ok(()) | Err(Error::Cancelled) => {}
        Err(Error::ThresholdExceeded { limit }) => {
            debug!(
                "skipping contents of {}: member count over {}",
                virtual_base, limit
            );
            out.errors.push(ErrorEntry::new(
                virtual_base.to_string(),
                format!("contents not processed: exceeds threshold of {limit} files"),
            ));
        }
        Err(err) => {
            out.errors.push(ErrorEntry::new(
                virtual_base.to_string(),
                format!("error processing archive: {err}"),
            ));
        }
    }
}

fn expand_members(
    archive_path: &Path,
    virtual_base: &str,
    config: &RunConfig,
    ctx: &RunContext,
    out: &mut RunResults,
) -> Result<(), Error> {
    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(BufReader::new(file))?;

    let member_count = archive.len();
    if let RecursionThreshold::Max(limit) = config.threshold {
        if member_count > limit {
            return Err(Error::ThresholdExceeded { limit });
        }
    }

    // Full name list up front for the directory-marker emptiness checks.
    let names: Vec<String> = archive.file_names().map(String::from).collect();

    for index in 0..member_count {
        if ctx.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let mut member = match archive.by_index(index) {
            Ok(member) => member,
            Err(err) => {
                out.errors.push(ErrorEntry::new(
                    virtual_base.to_string(),
                    format!("error reading archive member: {err}"),
                ));
                ctx.advance(virtual_base);
                continue;
            }
        };
        let member_name = member.name().to_string();
        let virtual_path = virtual_join(virtual_base, &member_name);
        let label = short_name(Path::new(member_name.trim_end_matches('/')));

        if member.is_dir() {
            // A marker is empty iff no other member name extends it.
            let is_empty = !names
                .iter()
                .any(|name| name != &member_name && name.starts_with(&member_name));
            let entry = CatalogEntry::folder(virtual_path);
            if is_empty {
                out.empty_dirs.push(entry.clone());
            }
            out.catalog.push(entry);
        } else if is_zip_name(&member_name) {
            // Nested archive: stage to a scoped temp dir and recurse. The
            // TempDir is removed when it drops, on every exit path.
            match stage_member(&mut member, &member_name) {
                Ok((staging, staged_path)) => {
                    drop(member);
                    expand(&staged_path, &virtual_path, config, ctx, out);
                    drop(staging);
                }
                Err(err) => {
                    out.errors.push(ErrorEntry::new(
                        virtual_path.clone(),
                        format!("error extracting nested archive: {err}"),
                    ));
                }
            }
        } else {
            // Regular member: hash straight off the archive reader, no
            // intermediate temp file.
            match hasher::compute_digest(&mut member, config.algorithm, ctx.cancel_token(), &mut || {
                ctx.note_item(&label)
            }) {
                Ok((digest, size)) => {
                    let entry = CatalogEntry::file(virtual_path, digest, size);
                    if size == 0 {
                        out.empty_files.push(entry.clone());
                    }
                    out.catalog.push(entry);
                }
                Err(Error::Cancelled) => return Err(Error::Cancelled),
                Err(err) => {
                    out.errors.push(ErrorEntry::new(
                        virtual_path,
                        format!("error processing archive member: {err}"),
                    ));
                }
            }
        }

        ctx.advance(&label);
    }

    Ok(())
}

/// Write one archive member out to its own temporary directory so it can be
/// opened as an archive in turn.
fn stage_member<R: Read>(member: &mut R, member_name: &str) -> Result<(TempDir, PathBuf), Error> {
    let staging = TempDir::new()?;
    let file_name = Path::new(member_name)
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "member.zip".into());
    let staged_path = staging.path().join(file_name);
    let mut dest = File::create(&staged_path)?;
    io::copy(member, &mut dest)?;
    Ok((staging, staged_path))
}
