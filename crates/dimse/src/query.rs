//! Modality Worklist query templates

use dicom_core::value::DataSetSequence;
use dicom_core::{DataElement, PrimitiveValue, Tag, VR};
use dicom_dictionary_std::tags;
use dicom_object::mem::InMemElement;
use dicom_object::InMemDicomObject;

/// Key requested in a worklist query
///
/// An empty `value` is a universal match: the SCP returns the attribute
/// populated for every matching entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryKey {
    pub tag: Tag,
    pub vr: VR,
    pub value: String,
}

/// Identifier template for a Modality Worklist C-FIND
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorklistQuery {
    /// Top level keys
    pub keys: Vec<QueryKey>,
    /// Keys inside the single Scheduled Procedure Step Sequence item
    pub step_keys: Vec<QueryKey>,
}

impl QueryKey {
    /// Return key matching any value
    pub fn universal(tag: Tag, vr: VR) -> Self {
        Self {
            tag,
            vr,
            value: String::new(),
        }
    }

    fn to_element(&self) -> InMemElement {
        let value = if self.value.is_empty() {
            PrimitiveValue::Empty
        } else {
            PrimitiveValue::from(self.value.as_str())
        };
        DataElement::new(self.tag, self.vr, value)
    }
}

impl Default for WorklistQuery {
    /// Every worklist entry, returning patient, accession and scheduling fields
    fn default() -> Self {
        Self {
            keys: vec![
                QueryKey {
                    tag: tags::QUERY_RETRIEVE_LEVEL,
                    vr: VR::CS,
                    value: "WORKLIST".to_string(),
                },
                QueryKey::universal(tags::ACCESSION_NUMBER, VR::SH),
                QueryKey::universal(tags::PATIENT_NAME, VR::PN),
                QueryKey::universal(tags::PATIENT_ID, VR::LO),
            ],
            step_keys: vec![
                QueryKey::universal(tags::MODALITY, VR::CS),
                QueryKey::universal(tags::SCHEDULED_STATION_AE_TITLE, VR::AE),
                QueryKey::universal(tags::SCHEDULED_PROCEDURE_STEP_START_DATE, VR::DA),
                QueryKey::universal(tags::SCHEDULED_PROCEDURE_STEP_START_TIME, VR::TM),
            ],
        }
    }
}

impl WorklistQuery {
    /// Add or replace a top level key
    pub fn with_key(mut self, tag: Tag, vr: VR, value: impl Into<String>) -> Self {
        upsert(&mut self.keys, QueryKey { tag, vr, value: value.into() });
        self
    }

    /// Add or replace a key inside the scheduled procedure step item
    pub fn with_step_key(mut self, tag: Tag, vr: VR, value: impl Into<String>) -> Self {
        upsert(&mut self.step_keys, QueryKey { tag, vr, value: value.into() });
        self
    }

    /// Build the C-FIND identifier
    pub fn to_identifier(&self) -> InMemDicomObject {
        let mut obj = InMemDicomObject::from_element_iter(self.keys.iter().map(QueryKey::to_element));

        if !self.step_keys.is_empty() {
            let item =
                InMemDicomObject::from_element_iter(self.step_keys.iter().map(QueryKey::to_element));
            obj.put(DataElement::new(
                tags::SCHEDULED_PROCEDURE_STEP_SEQUENCE,
                VR::SQ,
                DataSetSequence::from(vec![item]),
            ));
        }

        obj
    }
}

fn upsert(keys: &mut Vec<QueryKey>, key: QueryKey) {
    match keys.iter_mut().find(|k| k.tag == key.tag) {
        Some(existing) => *existing = key,
        None => keys.push(key),
    }
}
