//! DIMSE (DICOM Message Service Element) client for worklist queries
//!
//! This crate provides the Service Class User (SCU) side of a C-FIND exchange
//! against a Modality Worklist SCP, built on the dicom-rs upper layer.
//!
//! # Features
//! - Association establishment and release through a [`Connector`] / [`Association`] pair
//! - C-FIND request encoding and C-FIND response decoding
//! - Lazy response iteration, one [`FindResponse`] per DIMSE response
//! - Worklist query templates ([`WorklistQuery`]) with return keys and matching keys

pub mod config;
pub mod error;
pub mod message;
pub mod query;
pub mod scu;
pub mod types;

// Re-export commonly used types
pub use config::{DimseConfig, RemoteNode};
pub use error::{DimseError, Result};
pub use query::WorklistQuery;
pub use scu::{Association, AssociationGuard, Connector, FindResponses, UlAssociation, UlConnector};
pub use types::{DimseStatus, FindResponse};
