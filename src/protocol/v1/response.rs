//! Sandbox v1 reply types
//!
//! The Sandbox is loose about number encoding: the same field may arrive
//! as a JSON number or as a numeric string, so every numeric field accepts
//! both. Replies are first checked for an `error` member by
//! [`crate::protocol::SandboxJsonDecode`]; the types here only describe
//! successful payloads and convert them into the geodetic model.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_with::{DisplayFromStr, PickFirst, serde_as};

use super::{RawReply, types::*};
use crate::{
    Result,
    error::{SandboxError, SprintkitError},
    geo::{Coordinates, Fix},
    protocol::SandboxJsonResponse,
};

/// Network reachability of a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reachability {
    Reachable,
    Unreachable,
}

/// Reply of `presence.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Presence {
    pub status: Reachability,
}

impl Presence {
    pub fn is_reachable(&self) -> bool {
        self.status == Reachability::Reachable
    }
}

/// Reply of `location.json`
///
/// ```json
/// {"lat": "38.914812", "lon": "-94.657734", "accuracy": "1234"}
/// ```
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Latitude in decimal degrees
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub lat: f64,
    /// Longitude in decimal degrees
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub lon: f64,
    /// Horizontal accuracy in meters
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub accuracy: f64,
}

impl Location {
    /// Builds a 2D fix with the accuracy as its HEPE
    pub fn to_fix(&self, timestamp: DateTime<Utc>) -> Result<Fix> {
        let coordinates = Coordinates::new(self.lat, self.lon)?;
        Ok(Fix::new(timestamp, coordinates).with_hepe(self.accuracy))
    }
}

/// Position of a device relative to a perimeter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PerimeterStatus {
    Inside,
    Outside,
}

/// Reply of `geofence/checkPerimeter.json`
///
/// Only `CurrentLocation` is guaranteed; the location fields are needed to
/// build a fix.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerimeterCheck {
    #[serde(rename = "CurrentLocation")]
    pub current_location: PerimeterStatus,
    #[serde(rename = "Latitude")]
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub latitude: Option<f64>,
    #[serde(rename = "Longitude")]
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub longitude: Option<f64>,
    /// Horizontal accuracy in meters
    #[serde(rename = "Accuracy")]
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub accuracy: Option<f64>,
}

impl PerimeterCheck {
    pub fn inside(&self) -> bool {
        self.current_location == PerimeterStatus::Inside
    }

    /// Builds a 2D fix of the checked device
    pub fn to_fix(&self, timestamp: DateTime<Utc>) -> Result<Fix> {
        let missing = |field: &str| SprintkitError::parsing(format!("Missing {field}"), format!("{self:?}"));

        let latitude = self.latitude.ok_or_else(|| missing("Latitude"))?;
        let longitude = self.longitude.ok_or_else(|| missing("Longitude"))?;
        let accuracy = self.accuracy.ok_or_else(|| missing("Accuracy"))?;

        let coordinates = Coordinates::new(latitude, longitude)?;
        Ok(Fix::new(timestamp, coordinates).with_hepe(accuracy))
    }
}

/// Delivery report for one recipient of a text message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsResult {
    #[serde(default)]
    pub status: String,
    /// Transaction number
    #[serde(default)]
    pub tranno: String,
    #[serde(default)]
    pub mdn: String,
    #[serde(default)]
    pub gcode: String,
}

/// Reply of `sms.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sms {
    #[serde(rename = "MessagingResponse")]
    pub responses: Vec<SmsResult>,
}

impl Sms {
    /// Interprets an SMS reply
    ///
    /// Any member besides `MessagingResponse` is an error code; the first
    /// one in key order is reported.
    pub fn from_reply(reply: RawReply) -> Result<Self> {
        if let Some(code) = reply.keys().find(|key| *key != "MessagingResponse") {
            return Err(SandboxError::new(code).into());
        }

        let data = serde_json::Value::Object(reply);
        if data.get("MessagingResponse").is_none() {
            return Err(SprintkitError::parsing(
                "Missing a MessagingResponse",
                data.to_string(),
            ));
        }
        serde_json::from_value(data.clone())
            .map_err(|e| SprintkitError::parsing(e.to_string(), data.to_string()))
    }

    pub fn into_results(self) -> Vec<SmsResult> {
        self.responses
    }
}

/// An entry of a Sandbox listing
///
/// Listings end with, or consist only of, a `{"Message": ...}` notice such
/// as "no fences found". Any object with a `Message` member is a notice;
/// everything else must decode as an item, and its decoding error is kept.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ListEntry<T> {
    Notice {
        #[serde(rename = "Message")]
        message: String,
    },
    Item(T),
}

impl<'de, T> Deserialize<'de> for ListEntry<T>
where
    T: DeserializeOwned,
{
    fn deserialize<D>(deserializer: D) -> core::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        if let Some(message) = value.get("Message") {
            let message = message
                .as_str()
                .map_or_else(|| message.to_string(), str::to_owned);
            return Ok(ListEntry::Notice { message });
        }
        T::deserialize(value)
            .map(ListEntry::Item)
            .map_err(serde::de::Error::custom)
    }
}

fn collect_items<T, U>(entries: Vec<ListEntry<T>>, mut f: impl FnMut(T) -> Result<U>) -> Result<Vec<U>> {
    let mut items = Vec::with_capacity(entries.len());
    for entry in entries {
        match entry {
            ListEntry::Notice { .. } => break,
            ListEntry::Item(item) => items.push(f(item)?),
        }
    }
    Ok(items)
}

/// A fence as listed by `geofence/list.json`
///
/// ```json
/// {"Status": "Inactive", "FenceID": "139", "Name": "test", "Days": "W",
///  "Longitude": "-94.1234", "StartTime": "1100", "Latitude": "38.1234",
///  "LastMonitorTime": "NEVER", "EndTime": "2200", "Dimensions": "2000"}
/// ```
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FenceRecord {
    #[serde(rename = "FenceID")]
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub fence_id: u64,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Latitude")]
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub latitude: f64,
    #[serde(rename = "Longitude")]
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub longitude: f64,
    /// Radius in meters
    #[serde(rename = "Dimensions")]
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub dimensions: u32,
    #[serde(rename = "Days")]
    pub days: Days,
    #[serde(rename = "StartTime", with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(rename = "EndTime", with = "hhmm")]
    pub end_time: NaiveTime,
    #[serde(rename = "Status")]
    pub status: FenceStatus,
    #[serde(rename = "LastMonitorTime")]
    pub last_monitor_time: Option<String>,
    #[cfg(feature = "extra-fields")]
    /// Additional fields not explicitly defined
    #[serde(flatten)]
    pub extra: std::collections::HashMap<String, serde_json::Value>,
}

impl FenceRecord {
    pub fn to_fence(&self) -> Result<Fence> {
        let center = Coordinates::new(self.latitude, self.longitude)?;
        Ok(Fence {
            id: self.fence_id,
            name: self.name.clone(),
            perimeter: Perimeter::new(center, self.dimensions),
            days: self.days,
            start_time: self.start_time,
            end_time: self.end_time,
            status: self.status.clone(),
        })
    }
}

/// Reply of `geofence/list.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FenceList {
    #[serde(rename = "Fence")]
    pub entries: Vec<ListEntry<FenceRecord>>,
}

impl FenceList {
    /// Validated fences, in listing order
    pub fn into_fences(self) -> Result<Vec<Fence>> {
        collect_items(self.entries, |record| record.to_fence())
    }
}

/// Reply of `geofence/add.json`
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FenceAdded {
    pub message: String,
    #[serde(rename = "ID")]
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub id: Option<u64>,
}

impl FenceAdded {
    /// Id of the new fence
    ///
    /// Fails with the geofence error carried in `message` unless it is
    /// `FENCE_ADDED`.
    pub fn fence_id(&self) -> Result<u64> {
        if self.message != "FENCE_ADDED" {
            return Err(SandboxError::geofence(&self.message).into());
        }
        self.id
            .ok_or_else(|| SprintkitError::parsing("Missing an `ID` field.", format!("{self:?}")))
    }
}

/// Status reply of the geofence state-changing endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageReply {
    #[serde(rename = "Message")]
    pub message: String,
}

impl MessageReply {
    /// Checks the reply carries `expected`, e.g. `FENCE_ACTIVATED`
    ///
    /// Any other message is raised as a geofence error.
    pub fn expect_message(&self, expected: &str) -> Result<()> {
        if self.message == expected {
            Ok(())
        } else {
            Err(SandboxError::geofence(&self.message).into())
        }
    }
}

/// A device monitored by a fence
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FenceDevice {
    #[serde(rename = "MDN")]
    pub mdn: String,
    #[serde(rename = "DeviceID")]
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub device_id: u64,
}

/// Reply of `geofence/listDevices.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FenceDevices {
    #[serde(rename = "Device", default)]
    pub entries: Vec<ListEntry<FenceDevice>>,
}

impl FenceDevices {
    /// MDN to device id
    pub fn into_map(self) -> BTreeMap<String, u64> {
        self.entries
            .into_iter()
            .map_while(|entry| match entry {
                ListEntry::Item(device) => Some((device.mdn, device.device_id)),
                ListEntry::Notice { .. } => None,
            })
            .collect()
    }
}

/// A party notified of fence events
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    /// An MDN or a callback URL
    #[serde(rename = "MDNURL")]
    pub mdn_url: String,
    #[serde(rename = "RecipientID")]
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub recipient_id: u64,
}

/// Reply of `geofence/listRecipients.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipients {
    #[serde(rename = "Recipient", default)]
    pub entries: Vec<ListEntry<Recipient>>,
}

impl Recipients {
    /// MDN or URL to recipient id
    pub fn into_map(self) -> BTreeMap<String, u64> {
        self.entries
            .into_iter()
            .map_while(|entry| match entry {
                ListEntry::Item(recipient) => Some((recipient.mdn_url, recipient.recipient_id)),
                ListEntry::Notice { .. } => None,
            })
            .collect()
    }
}

/// Account devices grouped by authorization state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceLists {
    #[serde(default)]
    pub approved: Vec<String>,
    #[serde(default)]
    pub declined: Vec<String>,
    #[serde(default)]
    pub pending: Vec<String>,
    #[serde(default)]
    pub deleted: Vec<String>,
}

/// Reply of `devices.json`
///
/// ```json
/// {"username": "your_username",
///  "devices": {"approved": ["1115551212"], "declined": [], "pending": [],
///              "deleted": ["1115551234"]},
///  "authStatus": "Declined"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountDevices {
    pub username: String,
    #[serde(default)]
    pub devices: DeviceLists,
    /// Present when the listing was filtered by MDN
    #[serde(rename = "authStatus")]
    pub auth_status: Option<String>,
}

/// Outcome of an account device change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccountStatus {
    Success,
    Failed,
}

/// Reply of `device.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountReply {
    pub response: AccountStatus,
}

impl AccountReply {
    pub fn is_success(&self) -> bool {
        self.response == AccountStatus::Success
    }
}

impl SandboxJsonResponse for Presence {}
impl SandboxJsonResponse for Location {}
impl SandboxJsonResponse for PerimeterCheck {}
impl SandboxJsonResponse for FenceList {}
impl SandboxJsonResponse for FenceAdded {}
impl SandboxJsonResponse for MessageReply {}
impl SandboxJsonResponse for FenceDevices {}
impl SandboxJsonResponse for Recipients {}
impl SandboxJsonResponse for AccountDevices {}
impl SandboxJsonResponse for AccountReply {}
