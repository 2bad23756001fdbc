//! Core types for platform profiles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Host facts a profile is derived from.
///
/// Values are taken as reported by the host (e.g. `RedHat`, `x86_64`,
/// `Linux`) and normalized during derivation, so facts gathered by other
/// tools can be passed in unchanged.
///
/// # Example
///
/// ```
/// use platform::PlatformFacts;
///
/// let facts = PlatformFacts::new("RedHat", "x86_64", "Linux", "9.1.2-b6b9c8185839");
/// assert_eq!(facts.kernel, "Linux");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlatformFacts {
    /// OS family (e.g. "RedHat", "Debian", "Solaris", "windows").
    pub os_family: String,
    /// CPU architecture (e.g. "x86_64", "amd64", "sun4v", "x64").
    pub architecture: String,
    /// Kernel name (e.g. "Linux", "SunOS", "windows").
    pub kernel: String,
    /// Product release to install, `<version>-<build>`; may be empty.
    pub version: String,
}

impl PlatformFacts {
    /// Create facts from explicit values.
    #[must_use]
    pub fn new(
        os_family: impl Into<String>,
        architecture: impl Into<String>,
        kernel: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            os_family: os_family.into(),
            architecture: architecture.into(),
            kernel: kernel.into(),
            version: version.into(),
        }
    }
}

/// Product flavour being managed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Product {
    /// Full indexer / search head installation.
    Enterprise,
    /// Universal forwarder.
    #[default]
    Forwarder,
}

impl Product {
    /// Lowercase identifier.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Enterprise => "enterprise",
            Self::Forwarder => "forwarder",
        }
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Product {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "enterprise" | "splunk" => Ok(Self::Enterprise),
            "forwarder" | "universalforwarder" | "splunkforwarder" => Ok(Self::Forwarder),
            _ => Err(format!(
                "unknown product '{s}' (expected 'enterprise' or 'forwarder')"
            )),
        }
    }
}

/// Normalized kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kernel {
    Linux,
    Solaris,
    Windows,
}

/// Normalized CPU architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    X86_64,
    X86,
    Aarch64,
    Sparc,
}

/// Package format published for a platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageFormat {
    Rpm,
    Deb,
    Tgz,
    /// Compressed Solaris tarball
    TarZ,
    Msi,
}

/// Service manager that runs the product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceProvider {
    Systemd,
    /// Solaris Service Management Facility
    Smf,
    Windows,
}

impl fmt::Display for ServiceProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Systemd => "systemd",
            Self::Smf => "smf",
            Self::Windows => "windows",
        };
        f.write_str(name)
    }
}

/// How the product's service is known to the OS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDefinition {
    /// Service (unit) name.
    pub name: String,
    /// Service manager.
    pub provider: ServiceProvider,
}

/// Everything platform-specific about one product on one host.
///
/// Derived once per run by [`profile`](crate::profile) and passed
/// explicitly to whatever needs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformProfile {
    /// Product this profile is for.
    pub product: Product,
    /// Normalized kernel.
    pub kernel: Kernel,
    /// Normalized architecture.
    pub arch: Arch,
    /// Name of the installed package.
    pub package_name: String,
    /// Package file name suffix following the release.
    pub package_suffix: String,
    /// Package format.
    pub package_format: PackageFormat,
    /// Full package file name, when a release was given.
    pub package_file: Option<String>,
    /// Installation directory.
    pub home_dir: PathBuf,
    /// Directory holding locally managed settings files.
    pub conf_dir: PathBuf,
    /// Service definition.
    pub service: ServiceDefinition,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_from_str() {
        assert_eq!("Enterprise".parse::<Product>().unwrap(), Product::Enterprise);
        assert_eq!("forwarder".parse::<Product>().unwrap(), Product::Forwarder);
        assert!("indexer".parse::<Product>().is_err());
    }

    #[test]
    fn test_product_serde() {
        let json = serde_json::to_string(&Product::Enterprise).unwrap();
        assert_eq!(json, "\"enterprise\"");
    }
}
