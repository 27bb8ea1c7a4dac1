//! Archive access: discovering archives in a folder, listing their entries,
//! and reading entry bytes.

pub mod external;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::data::loader::TabularFormat;
use crate::error::{AnalyzerError, Result};

pub use external::{ExtractorTool, ToolKind};

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// An opened archive.
pub trait ArchiveSource {
    /// Display name, usually the archive file name.
    fn name(&self) -> &str;

    /// Entry names in archive order.
    fn entry_names(&mut self) -> Result<Vec<String>>;

    /// Full contents of one entry.
    fn read_entry(&mut self, entry: &str) -> Result<Vec<u8>>;
}

/// Opens archives found on disk.
pub trait ArchiveOpener {
    type Source: ArchiveSource;

    /// Fails when the opener itself is unusable (for example a missing tool).
    fn verify(&self) -> Result<()> {
        Ok(())
    }

    fn open(&self, path: &Path) -> Result<Self::Source>;
}

// ---------------------------------------------------------------------------
// Entry classification
// ---------------------------------------------------------------------------

/// Role of an entry in the lock/temperature join.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryRole {
    pub lock: bool,
    pub temperature: bool,
}

/// Classify an entry by case-sensitive substring match on its name.
///
/// Only entries with a supported tabular extension qualify. A name containing
/// both `lock` and `temperature` plays both roles.
pub fn classify_entry(name: &str) -> EntryRole {
    if TabularFormat::from_entry_name(name).is_none() {
        return EntryRole::default();
    }
    EntryRole {
        lock: name.contains("lock"),
        temperature: name.contains("temperature"),
    }
}

/// File name of an entry without directories or extension, used to name plots.
pub fn entry_stem(entry: &str) -> &str {
    let base = entry.rsplit(['/', '\\']).next().unwrap_or(entry);
    match base.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => base,
    }
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

/// Archives in `dir` whose file name ends with `.{extension}` (case-sensitive),
/// sorted by name.
pub fn discover_archives(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let suffix = format!(".{extension}");
    let mut archives = Vec::new();

    for entry in fs::read_dir(dir).map_err(|e| AnalyzerError::io(dir, e))? {
        let entry = entry.map_err(|e| AnalyzerError::io(dir, e))?;
        let path = entry.path();
        let is_match = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(&suffix));
        if is_match && path.is_file() {
            archives.push(path);
        }
    }

    archives.sort();
    log::info!("Found {} archives in {}", archives.len(), dir.display());
    Ok(archives)
}

// ---------------------------------------------------------------------------
// In-memory archive
// ---------------------------------------------------------------------------

/// An archive held in memory; entries keep insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryArchive {
    name: String,
    entries: Vec<(String, Vec<u8>)>,
}

impl MemoryArchive {
    pub fn new(name: impl Into<String>) -> Self {
        MemoryArchive {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    pub fn with_entry(mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.entries.push((name.into(), bytes.into()));
        self
    }
}

impl ArchiveSource for MemoryArchive {
    fn name(&self) -> &str {
        &self.name
    }

    fn entry_names(&mut self) -> Result<Vec<String>> {
        Ok(self.entries.iter().map(|(n, _)| n.clone()).collect())
    }

    fn read_entry(&mut self, entry: &str) -> Result<Vec<u8>> {
        self.entries
            .iter()
            .find(|(n, _)| n == entry)
            .map(|(_, bytes)| bytes.clone())
            .ok_or_else(|| {
                AnalyzerError::io(
                    PathBuf::from(&self.name).join(entry),
                    std::io::Error::new(std::io::ErrorKind::NotFound, "no such entry"),
                )
            })
    }
}

/// Serves [`MemoryArchive`]s keyed by path.
#[derive(Debug, Clone, Default)]
pub struct MemoryOpener {
    archives: BTreeMap<PathBuf, MemoryArchive>,
}

impl MemoryOpener {
    pub fn insert(&mut self, path: impl Into<PathBuf>, archive: MemoryArchive) {
        self.archives.insert(path.into(), archive);
    }
}

impl ArchiveOpener for MemoryOpener {
    type Source = MemoryArchive;

    fn open(&self, path: &Path) -> Result<MemoryArchive> {
        self.archives.get(path).cloned().ok_or_else(|| {
            AnalyzerError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::InvalidData, "corrupt archive"),
            )
        })
    }
}
