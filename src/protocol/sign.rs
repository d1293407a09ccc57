//! Request signing
//!
//! Every Sandbox request carries a `timestamp` and a `sig` parameter. The
//! signature is the lowercase hex MD5 digest of all other parameters,
//! concatenated as `key + value` in key order, followed by the shared
//! secret. The Sandbox recomputes it and rejects the request with
//! `INVALID_SIGNATURE` on mismatch.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use md5::{Digest, Md5};
use serde::Serialize;

/// Parameter replaced by the current UTC time when signing
pub const TIMESTAMP_KEY: &str = "timestamp";
/// Parameter replaced by the computed signature when signing
pub const SIGNATURE_KEY: &str = "sig";

/// Unsigned request parameters, kept in key order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(BTreeMap<String, String>);

impl Params {
    pub fn new() -> Self {
        Params(BTreeMap::new())
    }

    /// Inserts a parameter, replacing any previous value under the same key
    pub fn insert<K: Into<String>, V: ToString>(&mut self, key: K, value: V) {
        self.0.insert(key.into(), value.to_string());
    }

    /// Builder form of [`Params::insert`]
    pub fn with<K: Into<String>, V: ToString>(mut self, key: K, value: V) -> Self {
        self.insert(key, value);
        self
    }

    /// Adds the timestamp placeholder
    pub fn with_timestamp(self) -> Self {
        self.with(TIMESTAMP_KEY, "")
    }

    /// Adds the signature placeholder
    pub fn with_signature(self) -> Self {
        self.with(SIGNATURE_KEY, "")
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: ToString, const N: usize> From<[(K, V); N]> for Params {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

/// Parameters ready to be sent as a query string
///
/// Only [`sign_params`] and [`sign_params_at`] build this type, so a value
/// always carries its signature when the input asked for one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SignedParams(BTreeMap<String, String>);

impl SignedParams {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn signature(&self) -> Option<&str> {
        self.get(SIGNATURE_KEY)
    }

    pub fn timestamp(&self) -> Option<&str> {
        self.get(TIMESTAMP_KEY)
    }
}

/// Formats a UTC instant the way the Sandbox expects, e.g. `2024-01-02T03:04:05UTC`
pub fn make_timestamp(now: DateTime<Utc>) -> String {
    format!("{}UTC", now.format("%Y-%m-%dT%H:%M:%S"))
}

/// Concatenates every parameter but `sig` as `key + value` in key order,
/// then appends the secret
pub fn canonical_string(params: &Params, secret: &str) -> String {
    let mut canonical: String = params
        .iter()
        .filter(|(key, _)| *key != SIGNATURE_KEY)
        .flat_map(|(key, value)| [key, value])
        .collect();
    canonical.push_str(secret);
    canonical
}

/// Lowercase hex MD5 digest of the canonical string
pub fn signature(params: &Params, secret: &str) -> String {
    hex::encode(Md5::digest(canonical_string(params, secret).as_bytes()))
}

/// Signs `params` with the current time
///
/// See [`sign_params_at`].
pub fn sign_params(params: Params, secret: &str) -> SignedParams {
    sign_params_at(params, secret, Utc::now())
}

/// Fills in the placeholders of `params`
///
/// A `timestamp` entry is set to `now`. A `sig` entry is dropped, then
/// recomputed over the remaining parameters, so a caller-supplied
/// signature never survives. Parameters without placeholders pass through
/// unchanged.
pub fn sign_params_at(mut params: Params, secret: &str, now: DateTime<Utc>) -> SignedParams {
    if params.contains_key(TIMESTAMP_KEY) {
        params.insert(TIMESTAMP_KEY, make_timestamp(now));
    }

    if params.0.remove(SIGNATURE_KEY).is_some() {
        let sig = signature(&params, secret);
        tracing::trace!(params = params.len(), "signed request parameters");
        params.insert(SIGNATURE_KEY, sig);
    }

    SignedParams(params.0)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
    }

    #[test]
    fn test_canonical_string_sorted() {
        let params = Params::from([("mdn", "5551234567"), ("key", "ABC123")]);
        assert_eq!(
            canonical_string(&params, "topsecret"),
            "keyABC123mdn5551234567topsecret"
        );
    }

    #[test]
    fn test_canonical_string_skips_signature() {
        let params = Params::from([("mdn", "5551234567"), ("key", "ABC123")]).with_signature();
        assert_eq!(
            canonical_string(&params, "topsecret"),
            "keyABC123mdn5551234567topsecret"
        );
    }

    #[test]
    fn test_signature_of_secret_only() {
        let signed = sign_params_at(Params::new().with_signature(), "abc", fixed_now());
        assert_eq!(signed.signature(), Some("900150983cd24fb0d6963f7d28e17f72"));
    }

    #[test]
    fn test_timestamp_format() {
        assert_eq!(make_timestamp(fixed_now()), "2024-01-02T03:04:05UTC");

        let signed = sign_params_at(
            Params::from([("key", "k")]).with_timestamp().with_signature(),
            "s",
            fixed_now(),
        );
        assert_eq!(signed.timestamp(), Some("2024-01-02T03:04:05UTC"));
        assert_eq!(signed.get("key"), Some("k"));
    }

    #[test]
    fn test_signature_covers_timestamp() {
        let params = Params::from([("key", "k")]).with_timestamp().with_signature();
        let signed = sign_params_at(params, "s", fixed_now());

        let expected = hex::encode(Md5::digest(b"keyktimestamp2024-01-02T03:04:05UTCs"));
        assert_eq!(signed.signature(), Some(expected.as_str()));
    }

    #[test]
    fn test_signature_sensitivity() {
        let params = Params::from([("key", "ABC123"), ("mdn", "5551234567")]);
        let base = signature(&params, "topsecret");

        assert_ne!(base, signature(&params, "topsecreT"));
        assert_ne!(
            base,
            signature(&params.clone().with("mdn", "5551234568"), "topsecret")
        );
        assert_ne!(base, signature(&params.clone().with("extra", ""), "topsecret"));
        assert_eq!(base, signature(&params, "topsecret"));
    }

    #[test]
    fn test_supplied_signature_is_recomputed() {
        let params = Params::from([("key", "ABC123"), ("sig", "forged")]);
        let signed = sign_params_at(params, "topsecret", fixed_now());
        assert_ne!(signed.signature(), Some("forged"));
        assert_eq!(
            signed.signature().map(str::len),
            Some(32),
            "md5 hex digest is 32 characters"
        );
    }

    #[test]
    fn test_no_placeholders_pass_through() {
        let signed = sign_params_at(Params::from([("mdn", 5551234567u64)]), "s", fixed_now());
        assert_eq!(signed.iter().collect::<Vec<_>>(), vec![("mdn", "5551234567")]);
        assert_eq!(signed.signature(), None);
    }
}
