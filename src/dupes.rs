use std::collections::hash_map::Entry;
use std::collections::HashMap;

use tracing::debug;

use crate::catalog::{CatalogEntry, EntryKind, RunResults};

/// Group file entries sharing a digest, in first-seen digest order.
///
/// Folders and zero-byte files are excluded by construction: every
/// zero-length file hashes identically, which would otherwise form one
/// meaningless universal group.
pub fn duplicate_groups(catalog: &[CatalogEntry]) -> Vec<Vec<CatalogEntry>> {
    let mut buckets: HashMap<&str, Vec<&CatalogEntry>> = HashMap::new();
    let mut seen_order: Vec<&str> = Vec::new();

    for entry in catalog {
        let EntryKind::File { digest, size } = &entry.kind else {
            continue;
        };
        if *size == 0 {
            continue;
        }
        let bucket = match buckets.entry(digest.as_str()) {
            Entry::Occupied(occupied) => occupied.into_mut(),
            Entry::Vacant(vacant) => {
                seen_order.push(digest.as_str());
                vacant.insert(Vec::new())
            }
        };
        bucket.push(entry);
    }

    let groups: Vec<Vec<CatalogEntry>> = seen_order
        .into_iter()
        .filter_map(|digest| {
            let bucket = &buckets[digest];
            (bucket.len() > 1).then(|| bucket.iter().map(|entry| (*entry).clone()).collect())
        })
        .collect();

    debug!("{} duplicate groups found", groups.len());
    groups
}

/// Post-pass over a completed walk: sort the catalog lexicographically by
/// path and derive the duplicate groups (which keep discovery order).
pub fn finalize(results: &mut RunResults) {
    results.catalog.sort_by(|a, b| a.path.cmp(&b.path));
    results.duplicate_groups = duplicate_groups(&results.catalog);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str, digest: &str, size: u64) -> CatalogEntry {
        CatalogEntry::file(path, digest.to_string(), size)
    }

    #[test]
    fn test_three_identical_files_form_one_group() {
        let catalog = vec![
            file("a.txt", "aaaa", 5),
            file("b.txt", "aaaa", 5),
            file("unique.txt", "bbbb", 9),
            file("c.txt", "aaaa", 5),
        ];
        let groups = duplicate_groups(&catalog);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 3);
        let paths: Vec<&str> = groups[0].iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, ["a.txt", "b.txt", "c.txt"]);
    }

    #[test]
    fn test_zero_byte_files_never_group() {
        let catalog = vec![
            file("empty1.txt", "e3b0", 0),
            file("empty2.txt", "e3b0", 0),
            file("empty3.txt", "e3b0", 0),
        ];
        assert!(duplicate_groups(&catalog).is_empty());
    }

    #[test]
    fn test_folders_never_group() {
        let catalog = vec![
            CatalogEntry::folder("dir_a"),
            CatalogEntry::folder("dir_b"),
            file("a.txt", "cccc", 3),
        ];
        assert!(duplicate_groups(&catalog).is_empty());
    }

    #[test]
    fn test_groups_keep_first_seen_order() {
        let catalog = vec![
            file("late1.txt", "zzzz", 2),
            file("early1.txt", "aaaa", 2),
            file("late2.txt", "zzzz", 2),
            file("early2.txt", "aaaa", 2),
        ];
        let groups = duplicate_groups(&catalog);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0][0].path, "late1.txt");
        assert_eq!(groups[1][0].path, "early1.txt");
    }

    #[test]
    fn test_finalize_sorts_catalog_by_path() {
        let mut results = RunResults {
            catalog: vec![
                file("b.txt", "1111", 1),
                CatalogEntry::folder("a_dir"),
                file("a.txt", "2222", 1),
            ],
            ..Default::default()
        };
        finalize(&mut results);
        let paths: Vec<&str> = results.catalog.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, ["a.txt", "a_dir", "b.txt"]);
    }
}
