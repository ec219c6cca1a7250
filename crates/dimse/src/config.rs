//! Configuration types for the DIMSE client

use serde::{Deserialize, Serialize};

/// Largest AE title permitted by PS3.5 (AE value representation)
const MAX_AE_TITLE_LEN: usize = 16;

/// Configuration for the local Service Class User
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimseConfig {
    /// Local (calling) Application Entity Title
    #[serde(default = "default_local_aet")]
    pub local_aet: String,

    /// Maximum PDU size in bytes
    #[serde(default = "default_max_pdu")]
    pub max_pdu: u32,

    /// Offer Explicit VR Little Endian in addition to Implicit VR Little Endian
    #[serde(default = "default_true")]
    pub offer_explicit_vr: bool,
}

/// Configuration for a remote DICOM node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteNode {
    /// Remote (called) Application Entity Title
    pub ae_title: String,

    /// Remote host address
    pub host: String,

    /// Remote port
    pub port: u16,
}

impl Default for DimseConfig {
    fn default() -> Self {
        Self {
            local_aet: default_local_aet(),
            max_pdu: default_max_pdu(),
            offer_explicit_vr: true,
        }
    }
}

impl DimseConfig {
    /// Validate the configuration
    pub fn validate(&self) -> crate::error::Result<()> {
        validate_ae_title(&self.local_aet, "Local")?;

        if self.max_pdu < 16384 || self.max_pdu > 131072 {
            return Err(crate::error::DimseError::config(
                "Max PDU size must be between 16384 and 131072 bytes",
            ));
        }

        Ok(())
    }
}

impl RemoteNode {
    /// Create a new remote node configuration
    pub fn new(ae_title: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            ae_title: ae_title.into(),
            host: host.into(),
            port,
        }
    }

    /// Validate the remote node configuration
    pub fn validate(&self) -> crate::error::Result<()> {
        validate_ae_title(&self.ae_title, "Remote")?;

        if self.host.is_empty() {
            return Err(crate::error::DimseError::config("Remote host cannot be empty"));
        }

        if self.port == 0 {
            return Err(crate::error::DimseError::config(
                "Remote port must be greater than 0",
            ));
        }

        Ok(())
    }
}

impl std::fmt::Display for RemoteNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}:{}", self.ae_title, self.host, self.port)
    }
}

fn validate_ae_title(aet: &str, which: &str) -> crate::error::Result<()> {
    let trimmed = aet.trim();
    if trimmed.is_empty() || trimmed.len() > MAX_AE_TITLE_LEN {
        return Err(crate::error::DimseError::config(format!(
            "{} AE title must be 1-{} characters",
            which, MAX_AE_TITLE_LEN
        )));
    }
    if trimmed.contains('\\') || trimmed.chars().any(|c| c.is_control()) {
        return Err(crate::error::DimseError::config(format!(
            "{} AE title contains invalid characters",
            which
        )));
    }
    Ok(())
}

// Default value functions
fn default_local_aet() -> String {
    "WORKLIST_PROBE".to_string()
}

fn default_max_pdu() -> u32 {
    16384
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DimseConfig::default();
        assert_eq!(config.local_aet, "WORKLIST_PROBE");
        assert_eq!(config.max_pdu, 16384);
        assert!(config.offer_explicit_vr);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = DimseConfig::default();

        config.local_aet = "".to_string();
        assert!(config.validate().is_err());

        config.local_aet = "A".repeat(17);
        assert!(config.validate().is_err());

        config.local_aet = "BAD\\AET".to_string();
        assert!(config.validate().is_err());

        config.local_aet = "SCU".to_string();
        config.max_pdu = 1024;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_remote_node_validation() {
        let node = RemoteNode::new("ORTHANC", "localhost", 4242);
        assert!(node.validate().is_ok());
        assert_eq!(node.to_string(), "ORTHANC@localhost:4242");

        assert!(RemoteNode::new("ORTHANC", "", 4242).validate().is_err());
        assert!(RemoteNode::new("ORTHANC", "localhost", 0).validate().is_err());
        assert!(RemoteNode::new("", "localhost", 4242).validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: DimseConfig = toml::from_str(r#"local_aet = "MODALITY1""#).unwrap();
        assert_eq!(config.local_aet, "MODALITY1");
        assert_eq!(config.max_pdu, 16384);
        assert!(config.offer_explicit_vr);
    }
}
