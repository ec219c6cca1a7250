//! Common types for DIMSE operations

use dicom_object::InMemDicomObject;

/// DIMSE operation status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimseStatus {
    /// Operation completed successfully
    Success,
    /// Operation is pending (more responses to follow)
    Pending,
    /// Operation cancelled by user
    Cancel,
    /// Operation failed with error
    Failure(u16), // DICOM status code
    /// Warning occurred during operation
    Warning(u16), // DICOM status code
}

/// One C-FIND response as seen by the caller
///
/// `status` is `None` when no valid response could be obtained from the peer
/// (aborted association, broken transport, undecodable reply).
#[derive(Debug, Clone)]
pub struct FindResponse {
    pub status: Option<DimseStatus>,
    pub identifier: Option<InMemDicomObject>,
}

impl DimseStatus {
    /// Classify a raw status code (PS3.7 Annex C)
    pub fn from_code(code: u16) -> Self {
        match code {
            0x0000 => DimseStatus::Success,
            // 0xFF01: pending, optional keys not supported
            0xFF00 | 0xFF01 => DimseStatus::Pending,
            0xFE00 => DimseStatus::Cancel,
            0x0001 | 0xB000..=0xBFFF => DimseStatus::Warning(code),
            _ => DimseStatus::Failure(code),
        }
    }

    /// Raw status code
    pub fn code(&self) -> u16 {
        match self {
            DimseStatus::Success => 0x0000,
            DimseStatus::Pending => 0xFF00,
            DimseStatus::Cancel => 0xFE00,
            DimseStatus::Failure(code) | DimseStatus::Warning(code) => *code,
        }
    }

    /// Whether no further responses follow this one
    pub fn is_terminal(&self) -> bool {
        !matches!(self, DimseStatus::Pending)
    }
}

impl FindResponse {
    /// Response carrying a status and an optional identifier
    pub fn new(status: DimseStatus, identifier: Option<InMemDicomObject>) -> Self {
        Self {
            status: Some(status),
            identifier,
        }
    }

    /// Pending response with a matching identifier
    pub fn pending(identifier: InMemDicomObject) -> Self {
        Self::new(DimseStatus::Pending, Some(identifier))
    }

    /// Final success response
    pub fn success() -> Self {
        Self::new(DimseStatus::Success, None)
    }

    /// Response standing in for a transport or protocol failure
    pub fn failure() -> Self {
        Self {
            status: None,
            identifier: None,
        }
    }
}
