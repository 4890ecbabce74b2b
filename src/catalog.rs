use std::path::Path;

/// Digest column placeholder marking an entry as a directory rather than a file.
pub const FOLDER_DIGEST: &str = "--FOLDER--";

/// Size column placeholder for directory entries.
pub const FOLDER_SIZE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    File { digest: String, size: u64 },
    Folder,
}

/// One row of the catalog: a hashed file (on disk or inside an archive) or a
/// visited directory. Archive members carry a virtual path joining the
/// container path and the internal member path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub path: String,
    pub kind: EntryKind,
}

impl CatalogEntry {
    pub fn file(path: impl Into<String>, digest: String, size: u64) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::File { digest, size },
        }
    }

    pub fn folder(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Folder,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self.kind, EntryKind::Folder)
    }

    pub fn file_size(&self) -> Option<u64> {
        match &self.kind {
            EntryKind::File { size, .. } => Some(*size),
            EntryKind::Folder => None,
        }
    }

    /// Digest column as written to the manifest.
    pub fn digest(&self) -> &str {
        match &self.kind {
            EntryKind::File { digest, .. } => digest,
            EntryKind::Folder => FOLDER_DIGEST,
        }
    }

    /// Size column as written to the manifest.
    pub fn size_display(&self) -> String {
        match &self.kind {
            EntryKind::File { size, .. } => size.to_string(),
            EntryKind::Folder => FOLDER_SIZE.to_string(),
        }
    }
}

/// A path that failed to open, read, or hash, or whose archive contents were
/// skipped by the recursion threshold. Never aborts the run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ErrorEntry {
    pub path: String,
    pub message: String,
}

impl ErrorEntry {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// The accumulated output of one catalog run. Empty files and empty
/// directories also appear in the main catalog; the empty lists are views,
/// not partitions. Duplicate groups are derived as a post-pass.
#[derive(Debug, Clone, Default)]
pub struct RunResults {
    pub catalog: Vec<CatalogEntry>,
    pub errors: Vec<ErrorEntry>,
    pub empty_files: Vec<CatalogEntry>,
    pub empty_dirs: Vec<CatalogEntry>,
    pub duplicate_groups: Vec<Vec<CatalogEntry>>,
}

pub fn display_path(path: &Path) -> String {
    path.display().to_string()
}

/// Basename used for "processing <name>" progress notifications.
pub fn short_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| display_path(path))
}

/// Join a container path and an archive member path into a virtual path,
/// e.g. `outer.zip/mid.zip/leaf.txt`. Directory markers lose their trailing
/// separator.
pub fn virtual_join(base: &str, member: &str) -> String {
    let member = member.trim_end_matches('/');
    format!("{}/{}", base.trim_end_matches('/'), member)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_virtual_join_nested() {
        assert_eq!(
            virtual_join("outer.zip", "mid.zip"),
            "outer.zip/mid.zip"
        );
        assert_eq!(
            virtual_join("outer.zip/mid.zip", "docs/leaf.txt"),
            "outer.zip/mid.zip/docs/leaf.txt"
        );
    }

    #[test]
    fn test_virtual_join_strips_directory_marker() {
        assert_eq!(virtual_join("outer.zip", "docs/"), "outer.zip/docs");
    }

    #[test]
    fn test_folder_entry_rendering() {
        let entry = CatalogEntry::folder("some/dir");
        assert_eq!(entry.digest(), FOLDER_DIGEST);
        assert_eq!(entry.size_display(), "N/A");
        assert_eq!(entry.file_size(), None);
    }

    #[test]
    fn test_short_name() {
        assert_eq!(short_name(&PathBuf::from("/a/b/c.txt")), "c.txt");
    }
}
