use serde_json::{Map, Value};

use crate::{
    Result,
    error::{SandboxError, SprintkitError},
    protocol::sign::Params,
};

pub mod sign;
pub mod v1;

/// A message the Sandbox sends back as a JSON object
pub trait SandboxJsonResponse: serde::de::DeserializeOwned {}

impl SandboxJsonResponse for Map<String, Value> {}

/// A message sent to a Sandbox endpoint as query parameters
pub trait SandboxJsonRequest {
    /// Endpoint path relative to the API root, e.g. `presence.json`
    fn endpoint(&self) -> &'static str;

    /// Unsigned parameters, including the developer key and the
    /// timestamp/signature placeholders
    fn to_params(&self, key: &str) -> Params;
}

pub trait SandboxJsonDecode: AsRef<[u8]> {
    /// Decodes a Sandbox reply body
    ///
    /// The body must be a JSON object. An object carrying an `error`
    /// member is turned into a [`SandboxError`]; anything that is not an
    /// object, or that does not match `Res`, is a parsing error holding
    /// the raw body.
    fn decode_response<Res>(&self) -> Result<Res>
    where
        Res: SandboxJsonResponse,
    {
        let bytes = self.as_ref();
        let body = || String::from_utf8_lossy(bytes).into_owned();

        let object = match serde_json::from_slice::<Value>(bytes) {
            Ok(Value::Object(object)) => object,
            Ok(_) | Err(_) => return Err(SprintkitError::parsing("Malformed JSON data", body())),
        };

        if let Some(error) = object.get("error") {
            let code = match error {
                Value::String(code) => code.clone(),
                other => other.to_string(),
            };
            return Err(SandboxError::new(&code).into());
        }

        tracing::trace!(members = object.len(), "decoding sandbox reply");
        serde_json::from_value(Value::Object(object))
            .map_err(|e| SprintkitError::parsing(e.to_string(), body()))
    }
}

impl<T: AsRef<[u8]> + ?Sized> SandboxJsonDecode for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SandboxErrorKind;

    type RawReply = Map<String, Value>;

    #[test]
    fn test_decode_object() {
        let reply: RawReply = br#"{"status": "Reachable"}"#.decode_response().unwrap();
        assert_eq!(reply["status"], "Reachable");
    }

    #[test]
    fn test_decode_sandbox_error() {
        let err = r#"{"error": "INVALID_KEY"}"#
            .decode_response::<RawReply>()
            .unwrap_err();
        match err {
            SprintkitError::Sandbox(e) => assert_eq!(e.kind(), Some(SandboxErrorKind::InvalidKey)),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_decode_malformed() {
        for body in ["<html>oops</html>", "[1, 2]", "\"text\"", ""] {
            match body.decode_response::<RawReply>() {
                Err(SprintkitError::ParsingError { data, .. }) => assert_eq!(data, body),
                other => panic!("unexpected result for {body:?}: {other:?}"),
            }
        }
    }
}
