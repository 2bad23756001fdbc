//! Settings file types
//!
//! One generic engine handles every settings file. What differs between
//! files is captured here: the file name under the configuration
//! directory, the sections purge must never remove, and whether purge is
//! on when no resource declares it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Known settings files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// `outputs.conf` - forwarding destinations
    Outputs,
    /// `transforms.conf` - event transformation rules
    Transforms,
    /// `web.conf` - web UI settings
    Web,
    /// `inputs.conf` - data inputs
    Inputs,
    /// `indexes.conf` - index definitions
    Indexes,
    /// `authentication.conf`
    Authentication,
    /// `authorize.conf` - roles and capabilities
    Authorize,
    /// `server.conf`
    Server,
    /// `props.conf` - source type properties
    Props,
    /// `limits.conf`
    Limits,
    /// `deploymentclient.conf`
    DeploymentClient,
    /// Any other file, addressed by explicit path
    Custom,
}

impl FileType {
    /// All file types, in display order
    pub fn all() -> &'static [FileType] {
        &[
            Self::Outputs,
            Self::Transforms,
            Self::Web,
            Self::Inputs,
            Self::Indexes,
            Self::Authentication,
            Self::Authorize,
            Self::Server,
            Self::Props,
            Self::Limits,
            Self::DeploymentClient,
            Self::Custom,
        ]
    }

    /// Lowercase identifier used in manifests
    pub fn name(&self) -> &'static str {
        match self {
            Self::Outputs => "outputs",
            Self::Transforms => "transforms",
            Self::Web => "web",
            Self::Inputs => "inputs",
            Self::Indexes => "indexes",
            Self::Authentication => "authentication",
            Self::Authorize => "authorize",
            Self::Server => "server",
            Self::Props => "props",
            Self::Limits => "limits",
            Self::DeploymentClient => "deploymentclient",
            Self::Custom => "custom",
        }
    }

    /// File name under the configuration directory
    ///
    /// `None` for [`FileType::Custom`], which is always addressed by path.
    pub fn file_name(&self) -> Option<&'static str> {
        match self {
            Self::Custom => None,
            Self::Outputs => Some("outputs.conf"),
            Self::Transforms => Some("transforms.conf"),
            Self::Web => Some("web.conf"),
            Self::Inputs => Some("inputs.conf"),
            Self::Indexes => Some("indexes.conf"),
            Self::Authentication => Some("authentication.conf"),
            Self::Authorize => Some("authorize.conf"),
            Self::Server => Some("server.conf"),
            Self::Props => Some("props.conf"),
            Self::Limits => Some("limits.conf"),
            Self::DeploymentClient => Some("deploymentclient.conf"),
        }
    }

    /// Sections purge never removes
    pub fn reserved_sections(&self) -> &'static [&'static str] {
        match self {
            Self::Custom => &[],
            Self::Web => &["default", "settings"],
            Self::Server => &["default", "general", "sslConfig"],
            Self::Authentication => &["default", "authentication"],
            Self::Outputs => &["default", "tcpout"],
            _ => &["default"],
        }
    }

    /// Check if a section is exempt from purge
    pub fn is_reserved(&self, section: &str) -> bool {
        self.reserved_sections().contains(&section)
    }

    /// Purge setting when no resource declares one
    pub fn default_purge(&self) -> bool {
        false
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FileType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|t| t.name() == s)
            .ok_or_else(|| {
                let known: Vec<_> = Self::all().iter().map(FileType::name).collect();
                format!("unknown file type '{s}' (expected one of: {})", known.join(", "))
            })
    }
}
