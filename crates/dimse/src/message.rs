//! DIMSE message encoding and decoding
//!
//! Command sets are always encoded in Implicit VR Little Endian (PS3.7 §6.3.1).
//! Identifiers use whatever transfer syntax was negotiated for the presentation context.

use dicom_core::{DataElement, PrimitiveValue, VR};
use dicom_dictionary_std::{tags, uids};
use dicom_encoding::transfer_syntax::{TransferSyntax, TransferSyntaxIndex};
use dicom_object::InMemDicomObject;
use dicom_transfer_syntax_registry::TransferSyntaxRegistry;

use crate::{DimseError, Result};

/// C-FIND-RQ command field
pub const C_FIND_RQ: u16 = 0x0020;
/// C-FIND-RSP command field
pub const C_FIND_RSP: u16 = 0x8020;

/// Command Data Set Type value meaning "no data set follows"
pub const NO_DATA_SET: u16 = 0x0101;
/// Command Data Set Type value used when a data set follows
pub const DATA_SET_PRESENT: u16 = 0x0001;

/// Priority MEDIUM
const PRIORITY_MEDIUM: u16 = 0x0000;

static REGISTRY: TransferSyntaxRegistry = TransferSyntaxRegistry;

/// Decoded view of a DIMSE command set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSet {
    pub command_field: u16,
    pub message_id_responded_to: Option<u16>,
    pub status: Option<u16>,
    pub has_data_set: bool,
    pub error_comment: Option<String>,
}

/// Build a C-FIND-RQ command set
pub fn find_request(sop_class_uid: &str, message_id: u16) -> InMemDicomObject {
    InMemDicomObject::command_from_element_iter([
        DataElement::new(
            tags::AFFECTED_SOP_CLASS_UID,
            VR::UI,
            PrimitiveValue::from(sop_class_uid),
        ),
        DataElement::new(tags::COMMAND_FIELD, VR::US, PrimitiveValue::from(C_FIND_RQ)),
        DataElement::new(tags::MESSAGE_ID, VR::US, PrimitiveValue::from(message_id)),
        DataElement::new(tags::PRIORITY, VR::US, PrimitiveValue::from(PRIORITY_MEDIUM)),
        DataElement::new(
            tags::COMMAND_DATA_SET_TYPE,
            VR::US,
            PrimitiveValue::from(DATA_SET_PRESENT),
        ),
    ])
}

/// Encode a command set for a P-DATA command fragment
pub fn encode_command(command: &InMemDicomObject) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(128);
    command
        .write_dataset_with_ts(&mut buf, implicit_vr_le()?)
        .map_err(|e| DimseError::DicomObject(e.to_string()))?;
    Ok(buf)
}

/// Decode a received command set
pub fn decode_command(bytes: &[u8]) -> Result<CommandSet> {
    let obj = InMemDicomObject::read_dataset_with_ts(bytes, implicit_vr_le()?)
        .map_err(|e| DimseError::DicomParsing(e.to_string()))?;

    let command_field = obj
        .element(tags::COMMAND_FIELD)
        .map_err(|e| DimseError::DicomParsing(e.to_string()))?
        .to_int::<u16>()
        .map_err(|e| DimseError::DicomParsing(e.to_string()))?;

    let read_u16 = |tag| {
        obj.element(tag)
            .ok()
            .and_then(|e| e.to_int::<u16>().ok())
    };

    let has_data_set = read_u16(tags::COMMAND_DATA_SET_TYPE)
        .map(|t| t != NO_DATA_SET)
        .unwrap_or(false);

    let error_comment = obj
        .element(tags::ERROR_COMMENT)
        .ok()
        .and_then(|e| e.to_str().ok())
        .map(|s| s.trim_end_matches([' ', '\0']).to_string());

    Ok(CommandSet {
        command_field,
        message_id_responded_to: read_u16(tags::MESSAGE_ID_BEING_RESPONDED_TO),
        status: read_u16(tags::STATUS),
        has_data_set,
        error_comment,
    })
}

/// Check that a decoded command answers the C-FIND-RQ sent with `message_id`
/// and return its status code
pub fn find_response_status(command: &CommandSet, message_id: u16) -> Result<u16> {
    if command.command_field != C_FIND_RSP {
        return Err(DimseError::DicomParsing(format!(
            "expected C-FIND-RSP, got command field {:#06x}",
            command.command_field
        )));
    }
    if command.message_id_responded_to != Some(message_id) {
        return Err(DimseError::DicomParsing(format!(
            "C-FIND-RSP answers message id {:?}, expected {}",
            command.message_id_responded_to, message_id
        )));
    }
    command
        .status
        .ok_or_else(|| DimseError::DicomParsing("C-FIND-RSP without status".into()))
}

/// Encode an identifier in the given transfer syntax
pub fn encode_data_set(identifier: &InMemDicomObject, ts_uid: &str) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    identifier
        .write_dataset_with_ts(&mut buf, transfer_syntax(ts_uid)?)
        .map_err(|e| DimseError::DicomObject(e.to_string()))?;
    Ok(buf)
}

/// Decode an identifier received in the given transfer syntax
pub fn decode_data_set(bytes: &[u8], ts_uid: &str) -> Result<InMemDicomObject> {
    InMemDicomObject::read_dataset_with_ts(bytes, transfer_syntax(ts_uid)?)
        .map_err(|e| DimseError::DicomParsing(e.to_string()))
}

/// Look up a transfer syntax, tolerating the trailing padding UIDs often carry
pub fn transfer_syntax(uid: &str) -> Result<&'static TransferSyntax> {
    let uid = uid.trim_end_matches(['\0', ' ']);
    REGISTRY
        .get(uid)
        .ok_or_else(|| DimseError::NotSupported(format!("transfer syntax {}", uid)))
}

fn implicit_vr_le() -> Result<&'static TransferSyntax> {
    transfer_syntax(uids::IMPLICIT_VR_LITTLE_ENDIAN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find_response(status: u16, data_set_type: u16) -> InMemDicomObject {
        InMemDicomObject::command_from_element_iter([
            DataElement::new(
                tags::AFFECTED_SOP_CLASS_UID,
                VR::UI,
                PrimitiveValue::from(uids::MODALITY_WORKLIST_INFORMATION_MODEL_FIND),
            ),
            DataElement::new(tags::COMMAND_FIELD, VR::US, PrimitiveValue::from(C_FIND_RSP)),
            DataElement::new(
                tags::MESSAGE_ID_BEING_RESPONDED_TO,
                VR::US,
                PrimitiveValue::from(7_u16),
            ),
            DataElement::new(
                tags::COMMAND_DATA_SET_TYPE,
                VR::US,
                PrimitiveValue::from(data_set_type),
            ),
            DataElement::new(tags::STATUS, VR::US, PrimitiveValue::from(status)),
        ])
    }

    #[test]
    fn find_request_carries_required_fields() {
        let cmd = find_request(uids::MODALITY_WORKLIST_INFORMATION_MODEL_FIND, 1);
        assert!(cmd.element(tags::COMMAND_GROUP_LENGTH).is_ok());

        let decoded = decode_command(&encode_command(&cmd).unwrap()).unwrap();
        assert_eq!(decoded.command_field, C_FIND_RQ);
        assert!(decoded.has_data_set);
        assert_eq!(decoded.status, None);
    }

    #[test]
    fn pending_response_is_decoded() {
        let bytes = encode_command(&find_response(0xFF00, DATA_SET_PRESENT)).unwrap();
        let decoded = decode_command(&bytes).unwrap();
        assert_eq!(decoded.command_field, C_FIND_RSP);
        assert_eq!(decoded.status, Some(0xFF00));
        assert_eq!(decoded.message_id_responded_to, Some(7));
        assert!(decoded.has_data_set);
    }

    #[test]
    fn final_response_has_no_data_set() {
        let bytes = encode_command(&find_response(0x0000, NO_DATA_SET)).unwrap();
        let decoded = decode_command(&bytes).unwrap();
        assert_eq!(decoded.status, Some(0x0000));
        assert!(!decoded.has_data_set);
    }

    #[test]
    fn response_must_answer_our_message_id() {
        let bytes = encode_command(&find_response(0xFF00, DATA_SET_PRESENT)).unwrap();
        let decoded = decode_command(&bytes).unwrap();

        assert_eq!(find_response_status(&decoded, 7).unwrap(), 0xFF00);
        assert!(matches!(
            find_response_status(&decoded, 8),
            Err(DimseError::DicomParsing(_))
        ));
    }

    #[test]
    fn request_is_not_a_find_response() {
        let cmd = find_request(uids::MODALITY_WORKLIST_INFORMATION_MODEL_FIND, 7);
        let decoded = decode_command(&encode_command(&cmd).unwrap()).unwrap();
        assert!(find_response_status(&decoded, 7).is_err());
    }

    #[test]
    fn garbage_command_is_rejected() {
        assert!(decode_command(&[0x01, 0x02, 0x03]).is_err());
    }

    #[test]
    fn identifier_survives_explicit_vr() {
        let mut obj = InMemDicomObject::new_empty();
        obj.put(DataElement::new(
            tags::PATIENT_ID,
            VR::LO,
            PrimitiveValue::from("PID-001"),
        ));
        let bytes = encode_data_set(&obj, uids::EXPLICIT_VR_LITTLE_ENDIAN).unwrap();
        let back = decode_data_set(&bytes, "1.2.840.10008.1.2.1\0").unwrap();
        assert_eq!(back.element(tags::PATIENT_ID).unwrap().to_str().unwrap(), "PID-001");
    }

    #[test]
    fn unknown_transfer_syntax_is_not_supported() {
        assert!(matches!(
            transfer_syntax("1.2.3.4.5"),
            Err(DimseError::NotSupported(_))
        ));
    }
}
