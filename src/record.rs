//! Worklist records extracted from DICOM datasets
//!
//! Every field is optional: `None` means the attribute is absent from the
//! dataset, `Some("")` means it is present with an empty value.

use dicom_core::Tag;
use dicom_dictionary_std::tags;
use dicom_object::InMemDicomObject;

/// Placeholder printed for attributes the dataset does not carry
pub const NOT_AVAILABLE: &str = "N/A";

/// Scheduled Procedure Step, taken from the first sequence item
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduledStepRecord {
    pub modality: Option<String>,
    pub start_date: Option<String>,
    pub start_time: Option<String>,
    pub station_ae_title: Option<String>,
    pub description: Option<String>,
}

/// Fields of a Modality Worklist entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorklistRecord {
    pub sop_class_uid: Option<String>,
    pub patient_name: Option<String>,
    pub patient_id: Option<String>,
    pub patient_birth_date: Option<String>,
    pub patient_sex: Option<String>,
    pub accession_number: Option<String>,
    pub requested_procedure_description: Option<String>,
    pub study_description: Option<String>,
    pub referring_physician_name: Option<String>,
    pub scheduled_step: Option<ScheduledStepRecord>,
}

impl ScheduledStepRecord {
    pub fn from_object(obj: &InMemDicomObject) -> Self {
        Self {
            modality: text(obj, tags::MODALITY),
            start_date: text(obj, tags::SCHEDULED_PROCEDURE_STEP_START_DATE),
            start_time: text(obj, tags::SCHEDULED_PROCEDURE_STEP_START_TIME),
            station_ae_title: text(obj, tags::SCHEDULED_STATION_AE_TITLE),
            description: text(obj, tags::SCHEDULED_PROCEDURE_STEP_DESCRIPTION),
        }
    }
}

impl WorklistRecord {
    pub fn from_object(obj: &InMemDicomObject) -> Self {
        // Only the first scheduled step is ever consulted
        let scheduled_step = obj
            .element(tags::SCHEDULED_PROCEDURE_STEP_SEQUENCE)
            .ok()
            .and_then(|e| e.items())
            .and_then(|items| items.first())
            .map(ScheduledStepRecord::from_object);

        Self {
            sop_class_uid: text(obj, tags::SOP_CLASS_UID),
            patient_name: text(obj, tags::PATIENT_NAME),
            patient_id: text(obj, tags::PATIENT_ID),
            patient_birth_date: text(obj, tags::PATIENT_BIRTH_DATE),
            patient_sex: text(obj, tags::PATIENT_SEX),
            accession_number: text(obj, tags::ACCESSION_NUMBER),
            requested_procedure_description: text(obj, tags::REQUESTED_PROCEDURE_DESCRIPTION),
            study_description: text(obj, tags::STUDY_DESCRIPTION),
            referring_physician_name: text(obj, tags::REFERRING_PHYSICIAN_NAME),
            scheduled_step,
        }
    }
}

/// Field value, or [`NOT_AVAILABLE`] when absent
pub fn or_na(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or(NOT_AVAILABLE)
}

fn text(obj: &InMemDicomObject, tag: Tag) -> Option<String> {
    let element = obj.element(tag).ok()?;
    let value = element
        .to_str()
        .map(|s| s.trim_end_matches([' ', '\0']).to_string())
        .unwrap_or_default();
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dicom_core::value::DataSetSequence;
    use dicom_core::{DataElement, PrimitiveValue, VR};

    fn put(obj: &mut InMemDicomObject, tag: Tag, vr: VR, value: &str) {
        obj.put(DataElement::new(tag, vr, PrimitiveValue::from(value)));
    }

    #[test]
    fn absent_and_empty_fields_differ() {
        let mut obj = InMemDicomObject::new_empty();
        put(&mut obj, tags::PATIENT_ID, VR::LO, "PID-7 ");
        obj.put(DataElement::new(tags::ACCESSION_NUMBER, VR::SH, PrimitiveValue::Empty));

        let record = WorklistRecord::from_object(&obj);
        assert_eq!(record.patient_id.as_deref(), Some("PID-7"));
        assert_eq!(record.accession_number.as_deref(), Some(""));
        assert_eq!(record.patient_name, None);
        assert_eq!(or_na(&record.patient_name), NOT_AVAILABLE);
        assert_eq!(record.scheduled_step, None);
    }

    #[test]
    fn only_first_scheduled_step_is_used() {
        let mut first = InMemDicomObject::new_empty();
        put(&mut first, tags::MODALITY, VR::CS, "MR");
        let mut second = InMemDicomObject::new_empty();
        put(&mut second, tags::MODALITY, VR::CS, "CT");

        let mut obj = InMemDicomObject::new_empty();
        obj.put(DataElement::new(
            tags::SCHEDULED_PROCEDURE_STEP_SEQUENCE,
            VR::SQ,
            DataSetSequence::from(vec![first, second]),
        ));

        let step = WorklistRecord::from_object(&obj).scheduled_step.unwrap();
        assert_eq!(step.modality.as_deref(), Some("MR"));
        assert_eq!(step.start_date, None);
    }

    #[test]
    fn empty_sequence_has_no_step() {
        let mut obj = InMemDicomObject::new_empty();
        obj.put(DataElement::new(
            tags::SCHEDULED_PROCEDURE_STEP_SEQUENCE,
            VR::SQ,
            DataSetSequence::from(Vec::<InMemDicomObject>::new()),
        ));
        assert_eq!(WorklistRecord::from_object(&obj).scheduled_step, None);
    }
}
