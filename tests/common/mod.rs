#![allow(dead_code)]

use std::path::Path;

use dicom_core::value::DataSetSequence;
use dicom_core::{DataElement, PrimitiveValue, Tag, VR};
use dicom_dictionary_std::{tags, uids};
use dicom_object::meta::FileMetaTableBuilder;
use dicom_object::InMemDicomObject;

pub fn put(obj: &mut InMemDicomObject, tag: Tag, vr: VR, value: &str) {
    obj.put(DataElement::new(tag, vr, PrimitiveValue::from(value)));
}

pub fn scheduled_step() -> InMemDicomObject {
    let mut step = InMemDicomObject::new_empty();
    put(&mut step, tags::MODALITY, VR::CS, "MR");
    put(&mut step, tags::SCHEDULED_PROCEDURE_STEP_START_DATE, VR::DA, "20261019");
    put(&mut step, tags::SCHEDULED_PROCEDURE_STEP_START_TIME, VR::TM, "093000");
    put(&mut step, tags::SCHEDULED_STATION_AE_TITLE, VR::AE, "MR_SCANNER1");
    put(&mut step, tags::SCHEDULED_PROCEDURE_STEP_DESCRIPTION, VR::LO, "Brain MRI");
    step
}

/// A complete worklist entry, optionally with its scheduled procedure step
pub fn worklist_entry(with_step: bool) -> InMemDicomObject {
    let mut obj = InMemDicomObject::new_empty();
    put(&mut obj, tags::SOP_CLASS_UID, VR::UI, uids::MODALITY_WORKLIST_INFORMATION_MODEL_FIND);
    put(&mut obj, tags::SOP_INSTANCE_UID, VR::UI, "1.2.826.0.1.3680043.10.5432.1");
    put(&mut obj, tags::ACCESSION_NUMBER, VR::SH, "ACC0001");
    put(&mut obj, tags::REFERRING_PHYSICIAN_NAME, VR::PN, "HOUSE^GREGORY");
    put(&mut obj, tags::STUDY_DESCRIPTION, VR::LO, "MRI Head");
    put(&mut obj, tags::PATIENT_NAME, VR::PN, "DOE^JANE");
    put(&mut obj, tags::PATIENT_ID, VR::LO, "PID0001");
    put(&mut obj, tags::PATIENT_BIRTH_DATE, VR::DA, "19800101");
    put(&mut obj, tags::PATIENT_SEX, VR::CS, "F");
    put(&mut obj, tags::REQUESTED_PROCEDURE_DESCRIPTION, VR::LO, "Head without contrast");
    if with_step {
        obj.put(DataElement::new(
            tags::SCHEDULED_PROCEDURE_STEP_SEQUENCE,
            VR::SQ,
            DataSetSequence::from(vec![scheduled_step()]),
        ));
    }
    obj
}

pub fn write_part10(path: &Path, obj: &InMemDicomObject) {
    let file_obj = obj
        .clone()
        .with_meta(
            FileMetaTableBuilder::new()
                .transfer_syntax(uids::EXPLICIT_VR_LITTLE_ENDIAN)
                .media_storage_sop_class_uid(uids::MODALITY_WORKLIST_INFORMATION_MODEL_FIND)
                .media_storage_sop_instance_uid("1.2.826.0.1.3680043.10.5432.1"),
        )
        .expect("build file meta");
    file_obj.write_to_file(path).expect("write worklist file");
}
