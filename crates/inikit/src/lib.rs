//! # inikit
//!
//! Format-preserving reader and writer for INI-style `.conf` files.
//!
//! This crate provides functionality for:
//! - Parsing `[section]` / `key = value` files into a [`Document`]
//! - A semantic [`Section`] view for comparing against desired state
//! - Minimal in-place edits (add/remove sections, set/remove properties)
//! - Writing documents back with comments, blank lines, line endings and
//!   untouched lines preserved byte for byte
//!
//! ## Example
//!
//! ```
//! use inikit::Document;
//!
//! let mut doc = Document::parse("[default]\nhost = old\n").unwrap();
//! doc.set_property("default", "host", "new").unwrap();
//! doc.set_property("default", "port", "9997").unwrap();
//!
//! assert_eq!(doc.to_string(), "[default]\nhost = new\nport = 9997\n");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod error;
pub mod types;

pub use document::{Document, parse_bytes, parse_string, write_bytes, write_string};
pub use error::{Error, Result};
pub use types::{LineEnding, ParseOptions, Section};
