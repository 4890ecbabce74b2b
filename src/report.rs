use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::Local;
use csv::WriterBuilder;
use tracing::info;

use crate::catalog::{CatalogEntry, RunResults};
use crate::error::Error;
use crate::hasher::HashAlgorithm;

/// Write the run manifest as a CSV file in `output_dir` and return its path.
///
/// Sections, in order: the path-sorted catalog, deduplicated errors, empty
/// files, empty folders, duplicate-hash groups (blank row between groups),
/// and a generation timestamp footer.
pub fn write_manifest(
    output_dir: &Path,
    algorithm: HashAlgorithm,
    results: &RunResults,
) -> Result<PathBuf, Error> {
    let file_name = format!(
        "fileledger-{}.csv",
        Local::now().format("%Y-%m-%d_%H-%M-%S")
    );
    let manifest_path = output_dir.join(file_name);

    // Rows vary in width across sections.
    let mut writer = WriterBuilder::new()
        .flexible(true)
        .from_path(&manifest_path)?;

    let hash_header = format!("File Hash [{}]:", algorithm.label());
    writer.write_record([
        "Catalog of Selected Files [Path]:",
        hash_header.as_str(),
        "File Size [bytes]:",
    ])?;
    for entry in &results.catalog {
        write_entry_row(&mut writer, entry)?;
    }
    writer.write_record([""])?;

    writer.write_record(["Errors:"])?;
    let mut seen = HashSet::new();
    let unique_errors: Vec<_> = results
        .errors
        .iter()
        .filter(|error| seen.insert((error.path.as_str(), error.message.as_str())))
        .collect();
    if unique_errors.is_empty() {
        writer.write_record(["No errors were recorded."])?;
    } else {
        for error in unique_errors {
            writer.write_record([error.path.as_str(), error.message.as_str()])?;
        }
    }
    writer.write_record([""])?;

    writer.write_record(["Empty files:"])?;
    if results.empty_files.is_empty() {
        writer.write_record(["No empty files were found."])?;
    } else {
        for entry in &results.empty_files {
            write_entry_row(&mut writer, entry)?;
        }
    }
    writer.write_record([""])?;

    writer.write_record(["Empty folders:"])?;
    if results.empty_dirs.is_empty() {
        writer.write_record(["No empty folders were found."])?;
    } else {
        for entry in &results.empty_dirs {
            write_entry_row(&mut writer, entry)?;
        }
    }
    writer.write_record([""])?;

    writer.write_record(["Files with matching hashes:"])?;
    if results.duplicate_groups.is_empty() {
        writer.write_record(["No duplicates were found."])?;
    } else {
        for group in &results.duplicate_groups {
            for entry in group {
                write_entry_row(&mut writer, entry)?;
            }
            writer.write_record([""])?;
        }
    }
    writer.write_record([""])?;

    writer.write_record(["Date/Time Generated:"])?;
    let stamp = Local::now().format("%Y-%m-%d %H:%M:%S %z").to_string();
    writer.write_record([stamp.as_str()])?;

    writer.flush()?;
    info!("manifest written to {}", manifest_path.display());
    Ok(manifest_path)
}

fn write_entry_row<W: std::io::Write>(
    writer: &mut csv::Writer<W>,
    entry: &CatalogEntry,
) -> Result<(), Error> {
    let size = entry.size_display();
    writer.write_record([entry.path.as_str(), entry.digest(), size.as_str()])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogEntry, ErrorEntry};
    use std::fs;

    fn sample_results() -> RunResults {
        let dup_a = CatalogEntry::file("a.txt", "aaaa".to_string(), 4);
        let dup_b = CatalogEntry::file("b.txt", "aaaa".to_string(), 4);
        RunResults {
            catalog: vec![
                dup_a.clone(),
                dup_b.clone(),
                CatalogEntry::folder("empty_dir"),
            ],
            errors: vec![
                ErrorEntry::new("bad.txt", "error processing file: denied"),
                ErrorEntry::new("bad.txt", "error processing file: denied"),
            ],
            empty_files: vec![],
            empty_dirs: vec![CatalogEntry::folder("empty_dir")],
            duplicate_groups: vec![vec![dup_a, dup_b]],
        }
    }

    #[test]
    fn test_manifest_has_all_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_manifest(dir.path(), HashAlgorithm::Sha256, &sample_results()).unwrap();
        let contents = fs::read_to_string(&path).unwrap();

        assert!(contents.contains("Catalog of Selected Files [Path]:"));
        assert!(contents.contains("File Hash [sha256]:"));
        assert!(contents.contains("Errors:"));
        assert!(contents.contains("Empty files:"));
        assert!(contents.contains("No empty files were found."));
        assert!(contents.contains("Empty folders:"));
        assert!(contents.contains("Files with matching hashes:"));
        assert!(contents.contains("Date/Time Generated:"));
        assert!(contents.contains("--FOLDER--"));
    }

    #[test]
    fn test_manifest_deduplicates_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_manifest(dir.path(), HashAlgorithm::Sha256, &sample_results()).unwrap();
        let contents = fs::read_to_string(&path).unwrap();

        assert_eq!(contents.matches("error processing file: denied").count(), 1);
    }
}
