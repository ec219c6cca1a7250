//! Single-shot Modality Worklist C-FIND against a remote SCP

use std::io::{self, Write};

use dicom_object::InMemDicomObject;
use dimse::{Association, AssociationGuard, Connector, DimseStatus, RemoteNode, WorklistQuery};
use tracing::{debug, error, info};

use crate::record::WorklistRecord;

/// Run one worklist query and print every match.
///
/// Returns `Ok(true)` when at least one pending match was received. Both pending
/// codes (0xFF00 and 0xFF01) count as a match. Connection
/// and protocol problems are reported to `out` and yield `Ok(false)`; `Err`
/// only signals that writing to `out` failed.
pub fn run_query<C: Connector>(
    connector: &C,
    node: &RemoteNode,
    query: &WorklistQuery,
    out: &mut impl Write,
) -> io::Result<bool> {
    writeln!(out, "🔍 Testing DICOM Worklist Query")?;
    writeln!(out, "{}", "=".repeat(40))?;
    writeln!(out, "🔗 Connecting to {} at {}:{}...", node.ae_title, node.host, node.port)?;

    let association = match connector.associate(node) {
        Ok(association) => association,
        Err(e) => {
            error!("Association with {} failed: {}", node, e);
            writeln!(out, "❌ Failed to establish association: {}", e)?;
            writeln!(out, "   Check if the worklist SCP is running on port {}", node.port)?;
            return Ok(false);
        }
    };
    writeln!(out, "✅ Association established")?;

    // Released on every exit path below
    let mut association = AssociationGuard::new(association);

    writeln!(out, "📋 Sending worklist query...")?;
    let identifier = query.to_identifier();
    let responses = match association.find(&identifier) {
        Ok(responses) => responses,
        Err(e) => {
            error!("C-FIND to {} failed: {}", node, e);
            writeln!(out, "❌ Error during worklist query: {}", e)?;
            return Ok(false);
        }
    };

    let mut matches = 0usize;
    for response in responses {
        match response.status {
            Some(DimseStatus::Pending) => {
                matches += 1;
                write_match(matches, response.identifier.as_ref(), out)?;
            }
            Some(DimseStatus::Success) => {
                writeln!(out, "\n✅ Query completed successfully!")?;
                writeln!(out, "📊 Total worklists found: {}", matches)?;
                break;
            }
            None => {
                writeln!(out, "❌ Connection failure")?;
                break;
            }
            Some(other) => debug!("Ignoring C-FIND status {:#06x}", other.code()),
        }
    }

    info!("Worklist query finished with {} matches", matches);
    Ok(matches > 0)
}

/// Print the fields present on one matching identifier; absent ones are skipped
fn write_match(
    index: usize,
    identifier: Option<&InMemDicomObject>,
    out: &mut impl Write,
) -> io::Result<()> {
    writeln!(out, "\n📄 Worklist {}:", index)?;

    let record = match identifier {
        Some(obj) => WorklistRecord::from_object(obj),
        None => return Ok(()),
    };

    if let Some(name) = &record.patient_name {
        writeln!(out, "   Patient: {}", name)?;
    }
    if let Some(id) = &record.patient_id {
        writeln!(out, "   Patient ID: {}", id)?;
    }
    if let Some(accession) = &record.accession_number {
        writeln!(out, "   Accession: {}", accession)?;
    }

    if let Some(step) = &record.scheduled_step {
        if let Some(modality) = &step.modality {
            writeln!(out, "   Modality: {}", modality)?;
        }
        if let Some(date) = &step.start_date {
            writeln!(out, "   Date: {}", date)?;
        }
        if let Some(time) = &step.start_time {
            writeln!(out, "   Time: {}", time)?;
        }
    }

    Ok(())
}
