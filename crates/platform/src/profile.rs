//! Profile derivation.
//!
//! A pure function of the host facts and the product. Nothing here reads
//! the host; see [`detect`](crate::detect) for that.
//!
//! # Supported Platforms
//!
//! | Kernel  | Arch            | Format            | Service  |
//! |---------|-----------------|-------------------|----------|
//! | Linux   | x86_64, aarch64 | rpm / deb / tgz   | systemd  |
//! | Solaris | x86_64, sparc   | tar.Z             | smf      |
//! | Windows | x86_64          | msi               | windows  |
//! | Windows | x86 (forwarder) | msi               | windows  |

use crate::error::{Error, Result};
use crate::types::{
    Arch, Kernel, PackageFormat, PlatformFacts, PlatformProfile, Product, ServiceDefinition,
    ServiceProvider,
};
use std::path::PathBuf;

/// Derive the platform profile for `product` on the host `facts` describe.
///
/// # Example
///
/// ```
/// use platform::{PlatformFacts, Product, profile};
///
/// let facts = PlatformFacts::new("Debian", "amd64", "Linux", "9.1.2-b6b9c8185839");
/// let p = profile(&facts, Product::Forwarder).unwrap();
///
/// assert_eq!(p.package_name, "splunkforwarder");
/// assert_eq!(
///     p.package_file.as_deref(),
///     Some("splunkforwarder-9.1.2-b6b9c8185839-linux-2.6-amd64.deb")
/// );
/// assert_eq!(p.conf_dir.to_str(), Some("/opt/splunkforwarder/etc/system/local"));
/// ```
///
/// # Errors
///
/// Returns `Error::UnsupportedPlatform` when no package exists for the
/// kernel/architecture pair, and `Error::UnsupportedProduct` when only the
/// other product is published for it.
pub fn profile(facts: &PlatformFacts, product: Product) -> Result<PlatformProfile> {
    let unsupported = || Error::unsupported(&facts.kernel, &facts.architecture);
    let kernel = normalize_kernel(&facts.kernel, &facts.os_family).ok_or_else(unsupported)?;
    let arch = normalize_arch(&facts.architecture).ok_or_else(unsupported)?;

    let (package_format, package_suffix) = package(kernel, arch, &facts.os_family)
        .ok_or_else(unsupported)?;

    if kernel == Kernel::Windows && arch == Arch::X86 && product == Product::Enterprise {
        return Err(Error::UnsupportedProduct {
            product: product.to_string(),
            os: facts.kernel.clone(),
            arch: facts.architecture.clone(),
        });
    }

    let file_stem = match product {
        Product::Enterprise => "splunk",
        Product::Forwarder => "splunkforwarder",
    };
    let package_name = match (kernel, product) {
        (Kernel::Windows, Product::Enterprise) => "Splunk Enterprise",
        (Kernel::Windows, Product::Forwarder) => "UniversalForwarder",
        (_, _) => file_stem,
    };

    let package_file = (!facts.version.is_empty())
        .then(|| format!("{file_stem}-{}{package_suffix}", facts.version));

    let (home_dir, conf_dir) = match (kernel, product) {
        (Kernel::Windows, Product::Enterprise) => windows_dirs(r"C:\Program Files\Splunk"),
        (Kernel::Windows, Product::Forwarder) => {
            windows_dirs(r"C:\Program Files\SplunkUniversalForwarder")
        }
        (_, Product::Enterprise) => unix_dirs("/opt/splunk"),
        (_, Product::Forwarder) => unix_dirs("/opt/splunkforwarder"),
    };

    Ok(PlatformProfile {
        product,
        kernel,
        arch,
        package_name: package_name.to_string(),
        package_suffix: package_suffix.to_string(),
        package_format,
        package_file,
        home_dir,
        conf_dir,
        service: service(kernel, product),
    })
}

fn normalize_kernel(kernel: &str, os_family: &str) -> Option<Kernel> {
    match kernel.to_ascii_lowercase().as_str() {
        "linux" => Some(Kernel::Linux),
        "sunos" | "solaris" | "illumos" => Some(Kernel::Solaris),
        "windows" => Some(Kernel::Windows),
        // Some fact sources leave the kernel blank; fall back to the family
        "" if os_family.eq_ignore_ascii_case("solaris") => Some(Kernel::Solaris),
        "" if os_family.eq_ignore_ascii_case("windows") => Some(Kernel::Windows),
        _ => None,
    }
}

fn normalize_arch(arch: &str) -> Option<Arch> {
    match arch.to_ascii_lowercase().as_str() {
        "x86_64" | "amd64" | "x64" | "i86pc" => Some(Arch::X86_64),
        "x86" | "i386" | "i686" => Some(Arch::X86),
        "aarch64" | "arm64" => Some(Arch::Aarch64),
        "sparc" | "sparc64" | "sun4u" | "sun4v" => Some(Arch::Sparc),
        _ => None,
    }
}

/// Package format and file suffix, `None` when nothing is published
fn package(kernel: Kernel, arch: Arch, os_family: &str) -> Option<(PackageFormat, &'static str)> {
    let family = os_family.to_ascii_lowercase();
    let package = match (kernel, arch) {
        (Kernel::Linux, Arch::X86_64) => match family.as_str() {
            "redhat" | "suse" => (PackageFormat::Rpm, ".x86_64.rpm"),
            "debian" => (PackageFormat::Deb, "-linux-2.6-amd64.deb"),
            _ => (PackageFormat::Tgz, "-Linux-x86_64.tgz"),
        },
        (Kernel::Linux, Arch::Aarch64) => match family.as_str() {
            "redhat" | "suse" => (PackageFormat::Rpm, ".aarch64.rpm"),
            "debian" => (PackageFormat::Deb, "-Linux-armv8.deb"),
            _ => (PackageFormat::Tgz, "-Linux-armv8.tgz"),
        },
        (Kernel::Solaris, Arch::X86_64) => (PackageFormat::TarZ, "-SunOS-x86_64.tar.Z"),
        (Kernel::Solaris, Arch::Sparc) => (PackageFormat::TarZ, "-SunOS-sparc.tar.Z"),
        (Kernel::Windows, Arch::X86_64) => (PackageFormat::Msi, "-x64-release.msi"),
        (Kernel::Windows, Arch::X86) => (PackageFormat::Msi, "-x86-release.msi"),
        _ => return None,
    };
    Some(package)
}

fn unix_dirs(home: &str) -> (PathBuf, PathBuf) {
    (
        PathBuf::from(home),
        PathBuf::from(format!("{home}/etc/system/local")),
    )
}

/// Windows paths are built as strings so they keep `\` on any host
fn windows_dirs(home: &str) -> (PathBuf, PathBuf) {
    (
        PathBuf::from(home),
        PathBuf::from(format!(r"{home}\etc\system\local")),
    )
}

fn service(kernel: Kernel, product: Product) -> ServiceDefinition {
    let (name, provider) = match (kernel, product) {
        (Kernel::Linux, Product::Enterprise) => ("Splunkd", ServiceProvider::Systemd),
        (Kernel::Linux, Product::Forwarder) => ("SplunkForwarder", ServiceProvider::Systemd),
        (Kernel::Solaris, Product::Enterprise) => ("splunk", ServiceProvider::Smf),
        (Kernel::Solaris, Product::Forwarder) => ("splunkforwarder", ServiceProvider::Smf),
        (Kernel::Windows, Product::Enterprise) => ("splunkd", ServiceProvider::Windows),
        (Kernel::Windows, Product::Forwarder) => ("SplunkForwarder", ServiceProvider::Windows),
    };
    ServiceDefinition {
        name: name.to_string(),
        provider,
    }
}
