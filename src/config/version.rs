//! Admin API version handling.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::ConfigError;

static API_VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}$").expect("version regex is valid"));

/// The Shopify Admin API version a client addresses.
///
/// `Stable` is the default: requests go through the bare `admin` path prefix,
/// letting Shopify serve its oldest stable version, and the client latches the
/// version it was actually served from the `X-Shopify-API-Version` response
/// header. Pinning a [`ApiVersion::Release`] routes requests through
/// `admin/api/<version>` instead.
///
/// # Example
///
/// ```rust
/// use shopify_admin::ApiVersion;
///
/// let version: ApiVersion = "2024-10".parse().unwrap();
/// assert_eq!(version.path_prefix(), "admin/api/2024-10");
/// assert_eq!(ApiVersion::Stable.path_prefix(), "admin");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum ApiVersion {
    /// The oldest stable version of the API, addressed via the `admin` prefix.
    #[default]
    Stable,
    /// The unstable version, for accessing pre-release API features.
    Unstable,
    /// A pinned `YYYY-MM` release.
    Release(String),
}

impl ApiVersion {
    /// Creates a pinned release version from a `YYYY-MM` string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidApiVersion`] if the string does not
    /// match the `YYYY-MM` format.
    pub fn release(version: impl Into<String>) -> Result<Self, ConfigError> {
        let version = version.into();
        if API_VERSION_RE.is_match(&version) {
            Ok(Self::Release(version))
        } else {
            Err(ConfigError::InvalidApiVersion { version })
        }
    }

    /// Returns the URL path prefix joined in front of every resource path.
    #[must_use]
    pub fn path_prefix(&self) -> String {
        match self {
            Self::Stable => "admin".to_string(),
            Self::Unstable | Self::Release(_) => format!("admin/api/{self}"),
        }
    }

    /// Returns `true` if this client has not pinned a release version.
    #[must_use]
    pub const fn is_stable(&self) -> bool {
        matches!(self, Self::Stable)
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stable => f.write_str("stable"),
            Self::Unstable => f.write_str("unstable"),
            Self::Release(version) => f.write_str(version),
        }
    }
}

impl FromStr for ApiVersion {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stable" => Ok(Self::Stable),
            "unstable" => Ok(Self::Unstable),
            other => Self::release(other),
        }
    }
}
