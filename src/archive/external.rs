//! Archive access through an installed command-line extractor (`unrar` or `7z`).

use std::ffi::OsStr;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use super::{ArchiveOpener, ArchiveSource};
use crate::error::{AnalyzerError, Result};

#[cfg(windows)]
const DEFAULT_UNRAR: &str = r"C:\Program Files\WinRAR\UnRAR.exe";
#[cfg(not(windows))]
const DEFAULT_UNRAR: &str = "unrar";

/// Which command-line interface the configured program speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    UnRar,
    SevenZip,
}

/// An external extraction utility at a fixed location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorTool {
    pub kind: ToolKind,
    pub program: PathBuf,
}

impl Default for ExtractorTool {
    fn default() -> Self {
        ExtractorTool {
            kind: ToolKind::UnRar,
            program: PathBuf::from(DEFAULT_UNRAR),
        }
    }
}

impl ExtractorTool {
    pub fn new(kind: ToolKind, program: impl Into<PathBuf>) -> Self {
        ExtractorTool {
            kind,
            program: program.into(),
        }
    }

    fn tool_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program.display().to_string())
    }

    /// Run the tool and collect its output. A program that cannot be spawned
    /// at all is reported as [`AnalyzerError::ToolNotFound`].
    fn run(&self, args: &[&OsStr], archive: &Path) -> Result<Output> {
        log::debug!("Running {} {:?}", self.program.display(), args);
        let output = Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound | ErrorKind::PermissionDenied => {
                    AnalyzerError::ToolNotFound(self.program.clone())
                }
                _ => AnalyzerError::io(archive, e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(AnalyzerError::ToolFailed {
                tool: self.tool_name(),
                archive: archive.to_path_buf(),
                stderr: if stderr.is_empty() {
                    format!("exit code {:?}", output.status.code())
                } else {
                    stderr
                },
            });
        }
        Ok(output)
    }

    /// Arguments listing an archive. `--` ends switch parsing so archive
    /// names starting with `-` or `@` are taken literally.
    fn list_args<'a>(&self, archive: &'a Path) -> Vec<&'a OsStr> {
        let switches: &[&str] = match self.kind {
            ToolKind::UnRar => &["lb", "-p-", "--"],
            ToolKind::SevenZip => &["l", "-slt", "-ba", "--"],
        };
        let mut args: Vec<&OsStr> = switches.iter().map(|s| OsStr::new(*s)).collect();
        args.push(archive.as_os_str());
        args
    }

    /// Arguments writing one entry to stdout.
    fn extract_args<'a>(&self, archive: &'a Path, entry: &'a str) -> Vec<&'a OsStr> {
        let switches: &[&str] = match self.kind {
            ToolKind::UnRar => &["p", "-inul", "-p-", "--"],
            ToolKind::SevenZip => &["e", "-so", "--"],
        };
        let mut args: Vec<&OsStr> = switches.iter().map(|s| OsStr::new(*s)).collect();
        args.push(archive.as_os_str());
        args.push(OsStr::new(entry));
        args
    }

    fn list(&self, archive: &Path) -> Result<Vec<String>> {
        let listing = self.run(&self.list_args(archive), archive)?;
        let text = String::from_utf8_lossy(&listing.stdout);
        Ok(match self.kind {
            ToolKind::UnRar => parse_bare_listing(&text),
            ToolKind::SevenZip => parse_technical_listing(&text),
        })
    }

    fn extract(&self, archive: &Path, entry: &str) -> Result<Vec<u8>> {
        let output = self.run(&self.extract_args(archive, entry), archive)?;
        Ok(output.stdout)
    }
}

/// One name per line, as printed by `unrar lb`.
fn parse_bare_listing(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim_end)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// `Path = ...` records from `7z l -slt -ba`, skipping folders.
fn parse_technical_listing(text: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut current: Option<String> = None;
    let mut is_folder = false;

    let mut flush = |current: &mut Option<String>, is_folder: &mut bool| {
        if let Some(name) = current.take() {
            if !*is_folder {
                names.push(name);
            }
        }
        *is_folder = false;
    };

    for line in text.lines() {
        if let Some(path) = line.strip_prefix("Path = ") {
            flush(&mut current, &mut is_folder);
            current = Some(path.to_string());
        } else if line.trim() == "Folder = +" {
            is_folder = true;
        } else if line.starts_with("Attributes = D") {
            is_folder = true;
        }
    }
    flush(&mut current, &mut is_folder);
    names
}

impl ArchiveOpener for ExtractorTool {
    type Source = ToolArchive;

    fn verify(&self) -> Result<()> {
        // Paths with a directory part must exist; bare names are resolved via PATH on spawn.
        let has_dir = self
            .program
            .parent()
            .is_some_and(|p| !p.as_os_str().is_empty());
        if has_dir && !self.program.is_file() {
            return Err(AnalyzerError::ToolNotFound(self.program.clone()));
        }
        if !has_dir {
            Command::new(&self.program)
                .output()
                .map_err(|_| AnalyzerError::ToolNotFound(self.program.clone()))?;
        }
        Ok(())
    }

    fn open(&self, path: &Path) -> Result<ToolArchive> {
        if !path.is_file() {
            return Err(AnalyzerError::io(
                path,
                std::io::Error::new(ErrorKind::NotFound, "archive not found"),
            ));
        }
        Ok(ToolArchive {
            tool: self.clone(),
            path: path.to_path_buf(),
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        })
    }
}

/// An archive on disk read through an [`ExtractorTool`].
#[derive(Debug, Clone)]
pub struct ToolArchive {
    tool: ExtractorTool,
    path: PathBuf,
    name: String,
}

impl ArchiveSource for ToolArchive {
    fn name(&self) -> &str {
        &self.name
    }

    fn entry_names(&mut self) -> Result<Vec<String>> {
        self.tool.list(&self.path)
    }

    fn read_entry(&mut self, entry: &str) -> Result<Vec<u8>> {
        self.tool.extract(&self.path, entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_switch_parsing_ends_before_names() {
        let archive = Path::new("-run.rar");
        for kind in [ToolKind::UnRar, ToolKind::SevenZip] {
            let tool = ExtractorTool::new(kind, "tool");

            let list = tool.list_args(archive);
            assert_eq!(list[list.len() - 2..], [OsStr::new("--"), OsStr::new("-run.rar")]);

            let extract = tool.extract_args(archive, "@lock.csv");
            assert_eq!(
                extract[extract.len() - 3..],
                [OsStr::new("--"), OsStr::new("-run.rar"), OsStr::new("@lock.csv")]
            );
        }
    }

    #[test]
    fn test_parse_bare_listing() {
        let names = parse_bare_listing("run1\nrun1/lock.xlsx\r\nrun1/temperature.xlsx\n\n");
        assert_eq!(names, vec!["run1", "run1/lock.xlsx", "run1/temperature.xlsx"]);
    }

    #[test]
    fn test_parse_technical_listing_skips_folders() {
        let text = "\
Path = run1
Folder = +
Size = 0

Path = run1/lock.xlsx
Folder = -
Size = 1024

Path = run1/temperature.xlsx
Attributes = A
Size = 2048
";
        assert_eq!(
            parse_technical_listing(text),
            vec!["run1/lock.xlsx", "run1/temperature.xlsx"]
        );
    }

    #[test]
    fn test_missing_tool_path_fails_verification() {
        let dir = tempfile::TempDir::new().unwrap();
        let tool = ExtractorTool::new(ToolKind::UnRar, dir.path().join("UnRAR.exe"));
        assert!(matches!(tool.verify(), Err(AnalyzerError::ToolNotFound(_))));
    }

    #[test]
    fn test_missing_tool_on_path_fails_verification() {
        let tool = ExtractorTool::new(ToolKind::SevenZip, "definitely-not-an-extractor-7f3a");
        assert!(matches!(tool.verify(), Err(AnalyzerError::ToolNotFound(_))));
    }

    #[test]
    fn test_opening_missing_archive_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let tool = ExtractorTool::default();
        assert!(tool.open(&dir.path().join("missing.rar")).is_err());
    }

    #[cfg(feature = "tool-tests")]
    #[test]
    fn test_seven_zip_round_trip() {
        let dir = tempfile::TempDir::new().unwrap();
        let source = dir.path().join("lock.csv");
        std::fs::write(&source, "time,lock\n1,4999.99\n").unwrap();
        let archive_path = dir.path().join("data.7z");

        let status = Command::new("7z")
            .current_dir(dir.path())
            .arg("a")
            .arg("-y")
            .arg(&archive_path)
            .arg("lock.csv")
            .output()
            .expect("7z must be installed for tool-tests")
            .status;
        assert!(status.success());

        let tool = ExtractorTool::new(ToolKind::SevenZip, "7z");
        tool.verify().unwrap();
        let mut archive = tool.open(&archive_path).unwrap();
        assert_eq!(archive.entry_names().unwrap(), vec!["lock.csv"]);
        assert_eq!(archive.read_entry("lock.csv").unwrap(), b"time,lock\n1,4999.99\n");
    }
}
