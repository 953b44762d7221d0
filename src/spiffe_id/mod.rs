//! SPIFFE ID and trust domain values.
//!
//! Trust domain names are lowercased before validation, so `spiffe://Example.ORG/svc` and
//! `spiffe://example.org/svc` are the same identity. Paths are case-sensitive.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

pub(crate) const SPIFFE_SCHEME_PREFIX: &str = "spiffe://";

/// Represents a [SPIFFE ID](https://github.com/spiffe/spiffe/blob/main/standards/SPIFFE-ID.md).
///
/// Two SPIFFE IDs are equal iff both their trust domain and their path are equal.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SpiffeId {
    trust_domain: TrustDomain,
    path: String,
}

/// The normalized name of a SPIFFE trust domain, e.g. `example.org`.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct TrustDomain {
    name: String,
}

/// An error that can arise parsing a SPIFFE ID or a trust domain.
#[derive(Debug, Error, PartialEq, Clone)]
#[non_exhaustive]
pub enum SpiffeIdError {
    /// The input is empty.
    #[error("cannot be empty")]
    Empty,

    /// The trust domain name is empty.
    #[error("trust domain is missing")]
    MissingTrustDomain,

    /// The input does not start with `spiffe://`.
    #[error("scheme is missing or invalid")]
    WrongScheme,

    /// The trust domain contains a char outside `[a-z0-9._-]`.
    #[error("trust domain characters are limited to letters, numbers, dots, dashes, and underscores")]
    BadTrustDomainChar,

    /// A path segment contains a char outside `[A-Za-z0-9._-]`.
    #[error("path segment characters are limited to letters, numbers, dots, dashes, and underscores")]
    BadPathSegmentChar,

    /// The path holds an empty segment, e.g. `//`.
    #[error("path cannot contain empty segments")]
    EmptySegment,

    /// The path holds a `.` or `..` segment.
    #[error("path cannot contain dot segments")]
    DotSegment,

    /// The path ends with `/`.
    #[error("path cannot have a trailing slash")]
    TrailingSlash,
}

impl SpiffeId {
    /// Parses a SPIFFE ID such as `spiffe://example.org/ns/prod/sa/api`.
    ///
    /// # Errors
    ///
    /// Returns the [`SpiffeIdError`] describing the first violation found.
    ///
    /// ```
    /// use spiffe_svid_validator::SpiffeId;
    ///
    /// let id = SpiffeId::new("spiffe://Example.org/api").unwrap();
    /// assert_eq!(id.trust_domain().to_string(), "example.org");
    /// assert_eq!(id.path(), "/api");
    /// ```
    pub fn new(id: &str) -> Result<Self, SpiffeIdError> {
        if id.is_empty() {
            return Err(SpiffeIdError::Empty);
        }

        let rest = id
            .strip_prefix(SPIFFE_SCHEME_PREFIX)
            .ok_or(SpiffeIdError::WrongScheme)?;
        let (name, path) = rest.split_at(rest.find('/').unwrap_or(rest.len()));

        let trust_domain = TrustDomain::from_name(name)?;
        check_path(path)?;

        Ok(SpiffeId {
            trust_domain,
            path: path.to_owned(),
        })
    }

    /// Returns the trust domain of the SPIFFE ID.
    pub fn trust_domain(&self) -> &TrustDomain {
        &self.trust_domain
    }

    /// Returns the path, empty for the ID of a trust domain.
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for SpiffeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", SPIFFE_SCHEME_PREFIX, self.trust_domain, self.path)
    }
}

impl FromStr for SpiffeId {
    type Err = SpiffeIdError;

    fn from_str(id: &str) -> Result<Self, Self::Err> {
        Self::new(id)
    }
}

impl TrustDomain {
    /// Parses a trust domain from its name or from a SPIFFE ID string.
    ///
    /// # Errors
    ///
    /// Returns a [`SpiffeIdError`] if the name, or the SPIFFE ID it is taken from, is invalid.
    pub fn new(id_or_name: &str) -> Result<Self, SpiffeIdError> {
        if id_or_name.contains(":/") {
            SpiffeId::new(id_or_name).map(|id| id.trust_domain)
        } else {
            Self::from_name(id_or_name)
        }
    }

    fn from_name(name: &str) -> Result<Self, SpiffeIdError> {
        if name.is_empty() {
            return Err(SpiffeIdError::MissingTrustDomain);
        }

        let name = name.to_ascii_lowercase();
        if !name
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b"-._".contains(&b))
        {
            return Err(SpiffeIdError::BadTrustDomainChar);
        }

        Ok(TrustDomain { name })
    }
}

impl fmt::Display for TrustDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl AsRef<str> for TrustDomain {
    fn as_ref(&self) -> &str {
        &self.name
    }
}

impl FromStr for TrustDomain {
    type Err = SpiffeIdError;

    fn from_str(id_or_name: &str) -> Result<Self, Self::Err> {
        Self::new(id_or_name)
    }
}

// An empty path is valid, anything else is `/segment(/segment)*`.
fn check_path(path: &str) -> Result<(), SpiffeIdError> {
    let Some(rest) = path.strip_prefix('/') else {
        return Ok(());
    };
    if rest.is_empty() || rest.ends_with('/') {
        return Err(SpiffeIdError::TrailingSlash);
    }

    for segment in rest.split('/') {
        match segment {
            "" => return Err(SpiffeIdError::EmptySegment),
            "." | ".." => return Err(SpiffeIdError::DotSegment),
            s if !s.bytes().all(is_path_byte) => return Err(SpiffeIdError::BadPathSegmentChar),
            _ => {}
        }
    }
    Ok(())
}

fn is_path_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"-._".contains(&b)
}
