//! Diagnostics for DICOM Modality Worklist deployments
//!
//! - [`inspector`] decodes a worklist file and prints its scheduling fields
//! - [`query_runner`] runs a worklist C-FIND against an SCP and prints the matches
//! - [`files`] reports which worklist files are present on disk

pub mod config;
pub mod files;
pub mod inspector;
pub mod logging;
pub mod query_runner;
pub mod record;

pub use config::{ConfigError, ProbeConfig};
pub use inspector::{inspect, inspect_directory, InspectError};
pub use query_runner::run_query;
pub use record::{ScheduledStepRecord, WorklistRecord};
