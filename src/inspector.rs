//! Worklist file inspector

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::files::{find_worklist_files, FILES_TO_INSPECT};
use crate::record::{or_na, WorklistRecord};

/// Length of the Part 10 preamble preceding the `DICM` prefix
const PREAMBLE_LEN: usize = 128;
const DICM_MAGIC: &[u8; 4] = b"DICM";

#[derive(Debug, Error)]
pub enum InspectError {
    #[error("Error: {} is not a valid DICOM file", .0.display())]
    NotDicom(PathBuf),

    #[error("Error reading file: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Error reading file: {0}")]
    Decode(String),
}

/// A decoded worklist file
#[derive(Debug, Clone)]
pub struct InspectedFile {
    pub record: WorklistRecord,
    pub size: u64,
}

/// Decode a worklist file without printing anything
pub fn load_worklist_file(path: &Path) -> Result<InspectedFile, InspectError> {
    let io_err = |source: io::Error| InspectError::Io {
        path: path.to_path_buf(),
        source,
    };

    let size = std::fs::metadata(path).map_err(io_err)?.len();

    let mut header = [0u8; PREAMBLE_LEN + 4];
    let mut file = File::open(path).map_err(io_err)?;
    match file.read_exact(&mut header) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
            return Err(InspectError::NotDicom(path.to_path_buf()))
        }
        Err(e) => return Err(io_err(e)),
    }
    if &header[PREAMBLE_LEN..] != DICM_MAGIC {
        return Err(InspectError::NotDicom(path.to_path_buf()));
    }
    drop(file);

    let obj = dicom_object::open_file(path).map_err(|e| InspectError::Decode(e.to_string()))?;
    debug!("Decoded {} ({} bytes)", path.display(), size);

    Ok(InspectedFile {
        record: WorklistRecord::from_object(&obj),
        size,
    })
}

/// Inspect one worklist file and print its report.
///
/// Returns `Ok(false)` when the file could not be decoded; the failure is
/// part of the report. `Err` only signals that writing to `out` failed.
pub fn inspect(path: &Path, out: &mut impl Write) -> io::Result<bool> {
    writeln!(out, "🔍 Inspecting: {}", path.display())?;
    writeln!(out, "{}", "=".repeat(50))?;

    let inspected = match load_worklist_file(path) {
        Ok(inspected) => inspected,
        Err(e) => {
            warn!("Inspection of {} failed: {}", path.display(), e);
            writeln!(out, "❌ {}", e)?;
            return Ok(false);
        }
    };

    write_report(&inspected, out)?;
    info!("Inspected {}", path.display());
    Ok(true)
}

fn write_report(inspected: &InspectedFile, out: &mut impl Write) -> io::Result<()> {
    let record = &inspected.record;

    writeln!(out, "📋 Basic Information:")?;
    writeln!(out, "   SOPClassUID: {}", or_na(&record.sop_class_uid))?;
    writeln!(out, "   Patient Name: {}", or_na(&record.patient_name))?;
    writeln!(out, "   Patient ID: {}", or_na(&record.patient_id))?;
    writeln!(out, "   Patient Birth Date: {}", or_na(&record.patient_birth_date))?;
    writeln!(out, "   Patient Sex: {}", or_na(&record.patient_sex))?;
    writeln!(out, "   Accession Number: {}", or_na(&record.accession_number))?;

    if let Some(step) = &record.scheduled_step {
        writeln!(out, "\n🗓️ Scheduled Procedure Step:")?;
        writeln!(out, "   Modality: {}", or_na(&step.modality))?;
        writeln!(out, "   Start Date: {}", or_na(&step.start_date))?;
        writeln!(out, "   Start Time: {}", or_na(&step.start_time))?;
        writeln!(out, "   AE Title: {}", or_na(&step.station_ae_title))?;
        writeln!(out, "   Description: {}", or_na(&step.description))?;
    }

    writeln!(
        out,
        "\n📝 Requested Procedure: {}",
        or_na(&record.requested_procedure_description)
    )?;
    writeln!(out, "   Study Description: {}", or_na(&record.study_description))?;
    writeln!(out, "   Referring Physician: {}", or_na(&record.referring_physician_name))?;

    writeln!(out, "\n📊 File Size: {} bytes", inspected.size)?;
    writeln!(out, "✅ File inspection completed")?;
    Ok(())
}

/// Scan `dir` for worklist files and inspect the first one.
///
/// Returns `Ok(true)` only when a file was found and decoded.
pub fn inspect_directory(dir: &Path, extension: &str, out: &mut impl Write) -> io::Result<bool> {
    if !dir.exists() {
        writeln!(out, "❌ Worklist directory '{}' not found", dir.display())?;
        return Ok(false);
    }

    let files = match find_worklist_files(dir, extension) {
        Ok(files) => files,
        Err(e) => {
            writeln!(out, "❌ Error reading '{}': {}", dir.display(), e)?;
            return Ok(false);
        }
    };

    if files.is_empty() {
        writeln!(out, "❌ No DICOM files found in worklist directory")?;
        return Ok(false);
    }

    writeln!(out, "🏥 DICOM Worklist File Inspector")?;
    writeln!(out, "{}", "=".repeat(50))?;
    writeln!(out, "📁 Directory: {}", dir.display())?;
    writeln!(out, "📊 Found {} DICOM files", files.len())?;
    writeln!(out)?;

    let mut all_ok = true;
    for file in files.iter().take(FILES_TO_INSPECT) {
        all_ok &= inspect(&file.path, out)?;
    }
    Ok(all_ok)
}
