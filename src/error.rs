//! Error types for Sandbox operations
//!
//! This module defines the errors raised while building geodetic values,
//! talking to the Sandbox, and decoding its JSON replies. Error codes sent
//! back by the Sandbox are mapped through [`SandboxError`].

use std::borrow::Cow;

/// Main error type for sprintkit operations
#[derive(Debug, thiserror::Error)]
pub enum SprintkitError {
    /// A scalar was constructed outside its bound
    ///
    /// Raised by the `Degree`, `Minute`, `Second`, `Latitude` and `Longitude`
    /// constructors. Carries the offending value and the inclusive bound.
    #[error("InvalidRange: {value} is outside [{min}, {max}]")]
    InvalidRange { value: f64, min: f64, max: f64 },

    /// The operation is not defined for the type
    ///
    /// Negating a `Minute` or a `Second` is the typical case.
    #[error("InvalidOperation: {0}")]
    InvalidOperation(&'static str),

    /// A constructor was given a value of the wrong kind
    #[error("InvalidType: expected {expected}, got {value:?}")]
    InvalidType { value: String, expected: &'static str },

    /// The transport could not reach the Sandbox
    #[error("ConnectionError: {0}")]
    ConnectionError(String),

    /// The Sandbox reply could not be decoded
    ///
    /// The Sandbox API may have changed. `data` holds the raw reply.
    #[error("ParsingError: {reason}\n{data}")]
    ParsingError { reason: String, data: String },

    /// The Sandbox answered with an error code
    #[error("{0}")]
    Sandbox(#[from] SandboxError),
}

impl SprintkitError {
    pub(crate) fn parsing(reason: impl Into<String>, data: impl Into<String>) -> Self {
        SprintkitError::ParsingError {
            reason: reason.into(),
            data: data.into(),
        }
    }
}

/// Lookup table an error code is resolved against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorDomain {
    /// Codes shared by every Sandbox service
    Sandbox,
    /// Geofence codes, falling back to the shared codes
    GeoFence,
}

/// Known Sandbox error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SandboxErrorKind {
    InvalidKey,
    ExpiredKey,
    MdnNotValid,
    MdnNotOptedIn,
    InvalidMdn,
    InvalidSignature,
    Failure,
    Error,
    ExhaustedDips,
    ServiceTemporarilyUnavailable,
    RadiusLessThanMinRadius,
    UnexpectedError,
    DeviceNotFound,
    UnknownRecipient,
    FenceNotAdded,
    FenceDeviceNotFound,
    FenceNotFound,
    InvalidFenceId,
    FenceNotActivated,
    DeviceNotDeleted,
}

struct Entry {
    kind: SandboxErrorKind,
    code: &'static str,
    message: &'static str,
}

const fn entry(kind: SandboxErrorKind, code: &'static str, message: &'static str) -> Entry {
    Entry {
        kind,
        code,
        message,
    }
}

const BASE_ERRORS: &[Entry] = &[
    entry(SandboxErrorKind::InvalidKey, "INVALID_KEY", "Invalid Sandbox key."),
    entry(SandboxErrorKind::ExpiredKey, "EXPIRED_KEY", "Expired Sandbox Key."),
    entry(
        SandboxErrorKind::MdnNotValid,
        "MDN_NOTVALID",
        "You are not authorized to use this MDN.",
    ),
    entry(
        SandboxErrorKind::MdnNotOptedIn,
        "MDN_NOTOPTEDIN",
        "You are not authorized to use this MDN.",
    ),
    entry(
        SandboxErrorKind::InvalidMdn,
        "INVALID_MDN",
        "This is not a valid 10 digit MDN.",
    ),
    entry(
        SandboxErrorKind::InvalidSignature,
        "INVALID_SIGNATURE",
        "Invalid signature, perhaps your secret is wrong?",
    ),
    entry(SandboxErrorKind::Failure, "FAILURE", "Generic Sandbox failure."),
    entry(SandboxErrorKind::Error, "ERROR", "Generic Sandbox error."),
    entry(
        SandboxErrorKind::ExhaustedDips,
        "EXHAUSTED_DIPS",
        "You have exhausted your Sandbox usage limits.",
    ),
    entry(
        SandboxErrorKind::ServiceTemporarilyUnavailable,
        "SERVICE_TEMPORARILY_UNAVAILABLE",
        "Oops, that Sandbox service is down at the moment.",
    ),
    entry(
        SandboxErrorKind::RadiusLessThanMinRadius,
        "RADIUS_LESS_THAN_MIN_RADIUS",
        "The requested radius is less than the minimum radius allowed, 2000m",
    ),
    entry(
        SandboxErrorKind::UnexpectedError,
        "UNEXPECTED_ERROR",
        "The Sandbox encountered an unexpected error.",
    ),
    entry(
        SandboxErrorKind::DeviceNotFound,
        "DEVICE_NOT_FOUND",
        "Could not find the MDN.",
    ),
];

const GEOFENCE_ERRORS: &[Entry] = &[
    entry(
        SandboxErrorKind::UnknownRecipient,
        "UNKNOWN_RECIPIENT",
        "This recipient is not in the list of recipients associated with this fence.",
    ),
    entry(
        SandboxErrorKind::FenceNotAdded,
        "FENCE_NOTADDED",
        "Fence was not added by the Sandbox.",
    ),
    entry(
        SandboxErrorKind::FenceDeviceNotFound,
        "DEVICE_NOTFOUND",
        "This GeoFence device does not exist.",
    ),
    entry(
        SandboxErrorKind::FenceNotFound,
        "FENCE_NOTFOUND",
        "Could not find a fence with this Fence ID.",
    ),
    entry(
        SandboxErrorKind::InvalidFenceId,
        "INVALID_FENCE_ID",
        "This is not a valid Fence ID.",
    ),
    entry(
        SandboxErrorKind::FenceNotActivated,
        "FENCE_NOTACTIVATED",
        "Could not activate this fence.",
    ),
    entry(
        SandboxErrorKind::DeviceNotDeleted,
        "DEVICE_NOTDELETED",
        "Error deleting this GeoFence device.",
    ),
];

// Overlays are consulted first.
const SANDBOX_LOOKUP: &[&[Entry]] = &[BASE_ERRORS];
const GEOFENCE_LOOKUP: &[&[Entry]] = &[GEOFENCE_ERRORS, BASE_ERRORS];

impl ErrorDomain {
    fn tables(self) -> &'static [&'static [Entry]] {
        match self {
            ErrorDomain::Sandbox => SANDBOX_LOOKUP,
            ErrorDomain::GeoFence => GEOFENCE_LOOKUP,
        }
    }

    fn find(self, code: &str) -> Option<&'static Entry> {
        self.tables()
            .iter()
            .flat_map(|table| table.iter())
            .find(|entry| entry.code == code)
    }
}

impl SandboxErrorKind {
    fn entry(self) -> &'static Entry {
        // Every kind has exactly one row across the two tables.
        GEOFENCE_LOOKUP
            .iter()
            .flat_map(|table| table.iter())
            .find(|entry| entry.kind == self)
            .unwrap_or(&BASE_ERRORS[0])
    }

    /// Wire code of this error kind, e.g. `INVALID_KEY`
    pub fn code(self) -> &'static str {
        self.entry().code
    }

    /// Human readable description of this error kind
    pub fn message(self) -> &'static str {
        self.entry().message
    }
}

/// An error code returned by the Sandbox
///
/// Codes are upper-cased and resolved against the table of the given
/// [`ErrorDomain`]. Codes missing from the table are kept verbatim and
/// reported as unknown.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SandboxError {
    code: String,
    domain: ErrorDomain,
    kind: Option<SandboxErrorKind>,
}

impl SandboxError {
    /// Resolves a code against the table of `domain`
    pub fn with_domain(code: &str, domain: ErrorDomain) -> Self {
        let code = code.trim().to_uppercase();
        let kind = domain.find(&code).map(|entry| entry.kind);
        SandboxError { code, domain, kind }
    }

    /// Resolves a code shared by all Sandbox services
    pub fn new(code: &str) -> Self {
        Self::with_domain(code, ErrorDomain::Sandbox)
    }

    /// Resolves a geofence code
    pub fn geofence(code: &str) -> Self {
        Self::with_domain(code, ErrorDomain::GeoFence)
    }

    /// The upper-cased code as returned by the Sandbox
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn domain(&self) -> ErrorDomain {
        self.domain
    }

    /// The known kind, `None` for codes outside the table
    pub fn kind(&self) -> Option<SandboxErrorKind> {
        self.kind
    }

    pub fn message(&self) -> Cow<'static, str> {
        match self.kind {
            Some(kind) => Cow::Borrowed(kind.message()),
            None => Cow::Owned(format!("Unknown Sandbox Error: {}", self.code)),
        }
    }
}

impl core::fmt::Display for SandboxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

impl core::error::Error for SandboxError {}
