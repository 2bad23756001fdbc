//! Error types for platform profile derivation.

/// Result type alias for platform operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while deriving a platform profile.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// No package is published for this OS and architecture.
    #[error("unsupported platform: {os}/{arch}")]
    UnsupportedPlatform {
        /// Kernel or OS family as given.
        os: String,
        /// CPU architecture as given.
        arch: String,
    },

    /// The product is not available on an otherwise supported platform.
    #[error("{product} is not available on {os}/{arch}")]
    UnsupportedProduct {
        /// Product name.
        product: String,
        /// Kernel or OS family as given.
        os: String,
        /// CPU architecture as given.
        arch: String,
    },
}

impl Error {
    pub(crate) fn unsupported(os: &str, arch: &str) -> Self {
        Self::UnsupportedPlatform {
            os: os.to_string(),
            arch: arch.to_string(),
        }
    }
}
