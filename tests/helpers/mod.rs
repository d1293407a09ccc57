//! In-memory transport shared by the client tests

#![allow(dead_code)]

use std::{
    collections::{BTreeMap, VecDeque},
    sync::Mutex,
};

use sprintkit::{
    Result,
    client::{SandboxTransport, blocking::BlockingTransport},
    config::Config,
    protocol::sign::SignedParams,
};

pub const KEY: &str = "ABC123";
pub const SECRET: &str = "topsecret";

pub fn config() -> Config {
    Config::new(KEY, SECRET).with_host("sandbox.test")
}

/// A recorded outgoing call
#[derive(Debug, Clone)]
pub struct Call {
    pub url: String,
    pub params: BTreeMap<String, String>,
}

impl Call {
    /// Endpoint path relative to the API root
    pub fn endpoint(&self) -> &str {
        self.url
            .strip_prefix("http://sandbox.test/developerSandbox/resources/v1/")
            .unwrap_or(&self.url)
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

/// Replays canned reply bodies in order and records every call
#[derive(Debug, Default)]
pub struct MockTransport {
    replies: Mutex<VecDeque<Result<Vec<u8>>>>,
    calls: Mutex<Vec<Call>>,
}

impl MockTransport {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        MockTransport {
            replies: Mutex::new(
                replies
                    .into_iter()
                    .map(|body| Ok(body.as_ref().as_bytes().to_vec()))
                    .collect(),
            ),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A transport whose single call fails to connect
    pub fn unreachable() -> Self {
        MockTransport {
            replies: Mutex::new(VecDeque::from([Err(
                sprintkit::error::SprintkitError::ConnectionError("connection refused".into()),
            )])),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn reply(&self, url: &str, params: &SignedParams) -> Result<Vec<u8>> {
        self.calls.lock().unwrap().push(Call {
            url: url.into(),
            params: params
                .iter()
                .map(|(k, v)| (k.to_owned(), v.to_owned()))
                .collect(),
        });
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("no canned reply left")
    }
}

impl SandboxTransport for MockTransport {
    async fn get(&self, url: &str, params: &SignedParams) -> Result<Vec<u8>> {
        self.reply(url, params)
    }
}

impl BlockingTransport for MockTransport {
    fn get(&self, url: &str, params: &SignedParams) -> Result<Vec<u8>> {
        self.reply(url, params)
    }
}

pub const FENCE_LIST: &str = r#"{"Fence": [
    {"Status": "Inactive", "FenceID": "139", "Name": "test", "Days": "W",
     "Longitude": "-94.1234", "StartTime": "1100", "Latitude": "38.1234",
     "LastMonitorTime": "NEVER", "EndTime": "2200", "Dimensions": "2000"},
    {"Status": "Active", "FenceID": "140", "Name": "office", "Days": "MTWHF",
     "Longitude": "-94.657734", "StartTime": "0800", "Latitude": "38.914812",
     "LastMonitorTime": "NEVER", "EndTime": "1800", "Dimensions": "2500"}]}"#;
