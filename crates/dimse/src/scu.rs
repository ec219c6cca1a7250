//! Service Class User (SCU) implementation for outbound C-FIND operations

use std::collections::VecDeque;
use std::net::TcpStream;
use std::ops::{Deref, DerefMut};

use dicom_dictionary_std::uids;
use dicom_object::InMemDicomObject;
use dicom_ul::association::client::{ClientAssociation, ClientAssociationOptions};
use dicom_ul::pdu::{PDataValue, PDataValueType, Pdu};
use tracing::{debug, error, info, warn};

use crate::config::{DimseConfig, RemoteNode};
use crate::message;
use crate::types::{DimseStatus, FindResponse};
use crate::{DimseError, Result};

/// Lazy, finite sequence of C-FIND responses
pub type FindResponses<'a> = Box<dyn Iterator<Item = FindResponse> + 'a>;

/// An established Modality Worklist association able to run C-FIND queries
pub trait Association {
    /// Send a C-FIND request and return the responses as they arrive
    fn find(&mut self, identifier: &InMemDicomObject) -> Result<FindResponses<'_>>;

    /// Release the association. Calling it again is a no-op.
    fn release(&mut self) -> Result<()>;
}

/// Opens associations to remote nodes
pub trait Connector {
    type Association: Association;

    fn associate(&self, node: &RemoteNode) -> Result<Self::Association>;
}

/// Releases the wrapped association when dropped
pub struct AssociationGuard<A: Association> {
    inner: A,
}

impl<A: Association> AssociationGuard<A> {
    pub fn new(inner: A) -> Self {
        Self { inner }
    }
}

impl<A: Association> Deref for AssociationGuard<A> {
    type Target = A;

    fn deref(&self) -> &A {
        &self.inner
    }
}

impl<A: Association> DerefMut for AssociationGuard<A> {
    fn deref_mut(&mut self) -> &mut A {
        &mut self.inner
    }
}

impl<A: Association> Drop for AssociationGuard<A> {
    fn drop(&mut self) {
        match self.inner.release() {
            Ok(()) => debug!("Association released"),
            Err(e) => warn!("Failed to release association: {}", e),
        }
    }
}

/// Connector backed by the dicom-rs upper layer
#[derive(Debug, Clone)]
pub struct UlConnector {
    config: DimseConfig,
}

impl UlConnector {
    /// Create a new connector negotiating the Modality Worklist model
    pub fn new(config: DimseConfig) -> Self {
        Self { config }
    }

    fn transfer_syntaxes(&self) -> Vec<&'static str> {
        let mut ts = vec![uids::IMPLICIT_VR_LITTLE_ENDIAN];
        if self.config.offer_explicit_vr {
            ts.push(uids::EXPLICIT_VR_LITTLE_ENDIAN);
        }
        ts
    }
}

impl Connector for UlConnector {
    type Association = UlAssociation;

    fn associate(&self, node: &RemoteNode) -> Result<UlAssociation> {
        node.validate()?;

        info!(
            "Requesting worklist association {} -> {}",
            self.config.local_aet, node
        );

        let association = ClientAssociationOptions::new()
            .calling_ae_title(self.config.local_aet.as_str())
            .called_ae_title(node.ae_title.as_str())
            .max_pdu_length(self.config.max_pdu)
            .with_presentation_context(
                uids::MODALITY_WORKLIST_INFORMATION_MODEL_FIND,
                self.transfer_syntaxes(),
            )
            .establish((node.host.as_str(), node.port))
            .map_err(|e| {
                error!("Association with {} failed: {}", node, e);
                DimseError::ul(e)
            })?;

        info!("Association established with {}", node);

        Ok(UlAssociation {
            inner: Some(association),
            next_message_id: 1,
        })
    }
}

/// Association established through [`UlConnector`]
pub struct UlAssociation {
    inner: Option<ClientAssociation<TcpStream>>,
    next_message_id: u16,
}

impl Association for UlAssociation {
    fn find(&mut self, identifier: &InMemDicomObject) -> Result<FindResponses<'_>> {
        let association = self.inner.as_mut().ok_or(DimseError::Released)?;

        let pc = association
            .presentation_contexts()
            .first()
            .ok_or_else(|| DimseError::AssociationRejected("no presentation context accepted".into()))?;
        let pc_id = pc.id;
        let ts_uid = pc.transfer_syntax.to_string();

        let message_id = self.next_message_id;
        self.next_message_id = self.next_message_id.wrapping_add(1);

        debug!(
            "Sending C-FIND-RQ (message id {}, context {}, transfer syntax {})",
            message_id, pc_id, ts_uid
        );

        let command = message::encode_command(&message::find_request(
            uids::MODALITY_WORKLIST_INFORMATION_MODEL_FIND,
            message_id,
        ))?;
        let data = message::encode_data_set(identifier, &ts_uid)?;

        association
            .send(&Pdu::PData {
                data: vec![PDataValue {
                    presentation_context_id: pc_id,
                    value_type: PDataValueType::Command,
                    is_last: true,
                    data: command,
                }],
            })
            .map_err(DimseError::ul)?;
        association
            .send(&Pdu::PData {
                data: vec![PDataValue {
                    presentation_context_id: pc_id,
                    value_type: PDataValueType::Data,
                    is_last: true,
                    data,
                }],
            })
            .map_err(DimseError::ul)?;

        Ok(Box::new(UlFindResponses {
            association,
            ts_uid,
            message_id,
            pending: VecDeque::new(),
            done: false,
        }))
    }

    fn release(&mut self) -> Result<()> {
        if let Some(association) = self.inner.take() {
            association.release().map_err(DimseError::ul)?;
            info!("Association released");
        }
        Ok(())
    }
}

/// Reads C-FIND-RSP messages off an association until a terminal status
struct UlFindResponses<'a> {
    association: &'a mut ClientAssociation<TcpStream>,
    ts_uid: String,
    message_id: u16,
    pending: VecDeque<PDataValue>,
    done: bool,
}

impl UlFindResponses<'_> {
    fn next_value(&mut self) -> Result<PDataValue> {
        loop {
            if let Some(value) = self.pending.pop_front() {
                return Ok(value);
            }
            match self.association.receive().map_err(DimseError::ul)? {
                Pdu::PData { data } => self.pending.extend(data),
                Pdu::AbortRQ { .. } => {
                    return Err(DimseError::operation_failed("association aborted by peer"))
                }
                other => {
                    return Err(DimseError::operation_failed(format!(
                        "unexpected PDU while waiting for C-FIND-RSP: {:?}",
                        other
                    )))
                }
            }
        }
    }

    /// Collect the fragments of one command or data set
    fn read_fragments(&mut self, value_type: PDataValueType) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        loop {
            let value = self.next_value()?;
            if value.value_type != value_type {
                return Err(DimseError::DicomParsing(format!(
                    "expected {:?} fragment, got {:?}",
                    value_type, value.value_type
                )));
            }
            buf.extend_from_slice(&value.data);
            if value.is_last {
                return Ok(buf);
            }
        }
    }

    fn read_response(&mut self) -> Result<FindResponse> {
        let command = message::decode_command(&self.read_fragments(PDataValueType::Command)?)?;
        let code = message::find_response_status(&command, self.message_id)?;
        let status = DimseStatus::from_code(code);
        debug!("C-FIND-RSP status {:#06x} ({:?})", code, status);
        if let Some(comment) = &command.error_comment {
            warn!("C-FIND-RSP error comment: {}", comment);
        }

        let identifier = if command.has_data_set {
            let data = self.read_fragments(PDataValueType::Data)?;
            Some(message::decode_data_set(&data, &self.ts_uid)?)
        } else {
            None
        };

        Ok(FindResponse::new(status, identifier))
    }
}

impl Iterator for UlFindResponses<'_> {
    type Item = FindResponse;

    fn next(&mut self) -> Option<FindResponse> {
        if self.done {
            return None;
        }
        match self.read_response() {
            Ok(rsp) => {
                if rsp.status.map(|s| s.is_terminal()).unwrap_or(true) {
                    self.done = true;
                }
                Some(rsp)
            }
            Err(e) => {
                error!("C-FIND response stream failed: {}", e);
                self.done = true;
                Some(FindResponse::failure())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct CountingAssociation {
        released: Rc<Cell<u32>>,
    }

    impl Association for CountingAssociation {
        fn find(&mut self, _: &InMemDicomObject) -> Result<FindResponses<'_>> {
            Ok(Box::new(std::iter::once(FindResponse::success())))
        }

        fn release(&mut self) -> Result<()> {
            self.released.set(self.released.get() + 1);
            Ok(())
        }
    }

    #[test]
    fn test_transfer_syntax_offer() {
        let connector = UlConnector::new(DimseConfig {
            offer_explicit_vr: false,
            ..Default::default()
        });
        assert_eq!(connector.transfer_syntaxes(), vec![uids::IMPLICIT_VR_LITTLE_ENDIAN]);
    }

    #[test]
    fn guard_releases_once_on_drop() {
        let released = Rc::new(Cell::new(0));
        {
            let mut guard = AssociationGuard::new(CountingAssociation {
                released: released.clone(),
            });
            let responses: Vec<_> = guard
                .find(&InMemDicomObject::new_empty())
                .unwrap()
                .collect();
            assert_eq!(responses.len(), 1);
            assert_eq!(released.get(), 0);
        }
        assert_eq!(released.get(), 1);
    }

    #[test]
    fn refused_connection_is_an_upper_layer_error() {
        // Grab a free port, then close it so nothing listens there
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let connector = UlConnector::new(DimseConfig::default());
        let err = connector
            .associate(&RemoteNode::new("ORTHANC", "127.0.0.1", port))
            .err()
            .expect("nothing should be listening");
        assert!(matches!(err, DimseError::DicomUl(_)));
    }

    #[test]
    fn invalid_node_is_rejected_before_connecting() {
        let connector = UlConnector::new(DimseConfig::default());
        let err = connector
            .associate(&RemoteNode::new("ORTHANC", "", 4242))
            .err()
            .unwrap();
        assert!(matches!(err, DimseError::Config(_)));
    }
}
