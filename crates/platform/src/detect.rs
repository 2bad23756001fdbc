//! Host fact detection.
//!
//! The only part of this crate that looks at the running system.

use crate::types::PlatformFacts;
use std::fs;

/// Read the running host's facts.
///
/// `version` is the product release to install (`<version>-<build>`),
/// which the host cannot know; pass an empty string if there is none.
///
/// # Example
///
/// ```
/// let facts = platform::detect("");
/// assert!(!facts.kernel.is_empty());
/// ```
#[must_use]
pub fn detect(version: &str) -> PlatformFacts {
    let kernel = match std::env::consts::OS {
        "linux" => "Linux",
        "solaris" | "illumos" => "SunOS",
        "windows" => "windows",
        other => other,
    };
    let os_family = match kernel {
        "Linux" => fs::read_to_string("/etc/os-release")
            .map(|content| linux_family(&content))
            .unwrap_or_else(|_| "Linux".to_string()),
        "SunOS" => "Solaris".to_string(),
        other => other.to_string(),
    };

    PlatformFacts::new(os_family, std::env::consts::ARCH, kernel, version)
}

/// Map `/etc/os-release` to an OS family name
fn linux_family(os_release: &str) -> String {
    let mut ids = Vec::new();
    for line in os_release.lines() {
        if let Some(value) = line
            .strip_prefix("ID=")
            .or_else(|| line.strip_prefix("ID_LIKE="))
        {
            ids.extend(
                value
                    .trim_matches('"')
                    .split_whitespace()
                    .map(str::to_ascii_lowercase),
            );
        }
    }

    let family = ids.iter().find_map(|id| match id.as_str() {
        "rhel" | "fedora" | "centos" | "rocky" | "almalinux" | "amzn" | "ol" => Some("RedHat"),
        "debian" | "ubuntu" => Some("Debian"),
        "suse" | "sles" | "opensuse" | "opensuse-leap" => Some("Suse"),
        _ => None,
    });
    family.unwrap_or("Linux").to_string()
}
