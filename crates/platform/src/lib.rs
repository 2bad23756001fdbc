//! # platform
//!
//! Per-OS facts for Splunk Enterprise and the Universal Forwarder.
//!
//! This crate provides functionality for:
//! - Reading host facts once ([`detect`])
//! - Deriving package names, install and settings paths, and the service
//!   definition from those facts ([`profile`])
//!
//! Derivation is a pure function: callers evaluate it once and pass the
//! resulting [`PlatformProfile`] to whatever needs it.
//!
//! ## Example
//!
//! ```
//! use platform::{PlatformFacts, Product, profile};
//!
//! let facts = PlatformFacts::new("RedHat", "x86_64", "Linux", "9.1.2-b6b9c8185839");
//! let p = profile(&facts, Product::Enterprise).unwrap();
//!
//! assert_eq!(p.package_file.as_deref(), Some("splunk-9.1.2-b6b9c8185839.x86_64.rpm"));
//! assert_eq!(p.service.name, "Splunkd");
//! ```

#![warn(clippy::all)]

pub mod detect;
pub mod error;
pub mod profile;
pub mod types;

pub use detect::detect;
pub use error::{Error, Result};
pub use profile::profile;
pub use types::{
    Arch, Kernel, PackageFormat, PlatformFacts, PlatformProfile, Product, ServiceDefinition,
    ServiceProvider,
};
