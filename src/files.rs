//! Worklist file discovery

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Directory scanned when no other is configured
pub const DEFAULT_WORKLIST_DIR: &str = "worklists";

/// Extension (without dot) identifying worklist files
pub const DEFAULT_EXTENSION: &str = "dcm";

/// Number of files the inspector decodes per run
pub const FILES_TO_INSPECT: usize = 1;

/// Number of files listed by the presence check
pub const SAMPLE_SIZE: usize = 5;

/// A worklist file found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorklistFile {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
}

/// Regular files in `dir` whose name ends in `.{extension}`, ordered by name
pub fn find_worklist_files(dir: &Path, extension: &str) -> io::Result<Vec<WorklistFile>> {
    let suffix = format!(".{}", extension);
    let mut files = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.ends_with(&suffix) {
            continue;
        }
        let metadata = match std::fs::metadata(entry.path()) {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!("Skipping {}: {}", entry.path().display(), e);
                continue;
            }
        };
        if !metadata.is_file() {
            continue;
        }
        files.push(WorklistFile {
            path: entry.path(),
            name,
            size: metadata.len(),
        });
    }

    files.sort_by(|a, b| a.name.cmp(&b.name));
    debug!("Found {} worklist files in {}", files.len(), dir.display());
    Ok(files)
}

/// Print how many worklist files exist and a sample of their names and sizes.
/// Returns the number of files found.
pub fn list_worklist_files(
    dir: &Path,
    extension: &str,
    sample_size: usize,
    out: &mut impl Write,
) -> io::Result<usize> {
    writeln!(out, "\n📁 Checking Worklist Files")?;
    writeln!(out, "{}", "=".repeat(30))?;

    if !dir.exists() {
        writeln!(out, "❌ Worklist directory '{}' not found", dir.display())?;
        return Ok(0);
    }

    let files = match find_worklist_files(dir, extension) {
        Ok(files) => files,
        Err(e) => {
            writeln!(out, "❌ Error reading '{}': {}", dir.display(), e)?;
            return Ok(0);
        }
    };

    writeln!(out, "📊 Found {} DICOM worklist files:", files.len())?;
    for (i, file) in files.iter().take(sample_size).enumerate() {
        writeln!(out, "   {}. {} ({} bytes)", i + 1, file.name, file.size)?;
    }
    if files.len() > sample_size {
        writeln!(out, "   ... and {} more files", files.len() - sample_size)?;
    }

    Ok(files.len())
}
