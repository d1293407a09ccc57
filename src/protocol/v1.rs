//! Sandbox REST API version 1
//!
//! Every call is an HTTP GET on `<api root>/<endpoint>` with the parameters
//! in the query string, and every reply is a single JSON object. Calls are
//! authenticated by the developer key plus a signature over all parameters
//! (see [`crate::protocol::sign`]).
//!
//! # Endpoints
//!
//! - `presence.json`, `location.json`: device reachability and location
//! - `sms.json`: text messaging
//! - `geofence/*.json`: perimeter checks, fences, monitored devices and
//!   notification recipients
//! - `devices.json`, `device.json`: devices of the developer account

use serde_json::{Map, Value};

use crate::protocol::{
    SandboxJsonRequest,
    sign::{Params, TIMESTAMP_KEY},
};

/// Request message types
pub mod request;
/// Response message types and their conversions
pub mod response;
/// Common data types used in protocol messages
pub mod types;

/// Resource path of the v1 API on the Sandbox host
pub const API_PATH: &str = "/developerSandbox/resources/v1";

/// Type alias for v1 request messages
pub type RequestMessage = request::Message;

/// An undecoded reply object, for endpoints whose payload carries no
/// further structure
pub type RawReply = Map<String, Value>;

impl SandboxJsonRequest for RequestMessage {
    fn endpoint(&self) -> &'static str {
        match self {
            RequestMessage::Presence { .. } => "presence.json",
            RequestMessage::Location { .. } => "location.json",
            RequestMessage::Sms { .. } => "sms.json",
            RequestMessage::CheckPerimeter { .. } => "geofence/checkPerimeter.json",
            RequestMessage::ListFences => "geofence/list.json",
            RequestMessage::AddFence(_) => "geofence/add.json",
            RequestMessage::DeleteFence { .. } => "geofence/delete.json",
            RequestMessage::ActivateFence { .. } => "geofence/activate.json",
            RequestMessage::DeactivateFence { .. } => "geofence/deactivate.json",
            RequestMessage::ListFenceDevices { .. } => "geofence/listDevices.json",
            RequestMessage::AddFenceDevice { .. } => "geofence/addDevice.json",
            RequestMessage::DeleteFenceDevice { .. } => "geofence/deleteDevice.json",
            RequestMessage::ListRecipients { .. } => "geofence/listRecipients.json",
            RequestMessage::AddRecipient { .. } => "geofence/addRecipient.json",
            RequestMessage::DeleteRecipient { .. } => "geofence/deleteRecipient.json",
            RequestMessage::ListDevices { .. } => "devices.json",
            RequestMessage::AddDevice { .. } | RequestMessage::DeleteDevice { .. } => "device.json",
        }
    }

    /// Builds the query parameters of the call
    ///
    /// Coordinates are sent as six-decimal degrees and fence times as
    /// `HHMM`. The result still holds the timestamp and signature
    /// placeholders; sign it before sending.
    fn to_params(&self, key: &str) -> Params {
        let params = Params::new().with("key", key).with_timestamp().with_signature();

        match self {
            RequestMessage::Presence { mdn } | RequestMessage::Location { mdn } => {
                params.with("mdn", mdn)
            }
            RequestMessage::Sms { mdns, msg } => params.with("mdns", mdns.join(",")).with("msg", msg),
            RequestMessage::CheckPerimeter { mdn, perimeter } => params
                .with("mdn", mdn)
                .with("lat", perimeter.center.latitude().format_decimal())
                .with("long", perimeter.center.longitude().format_decimal())
                .with("rad", perimeter.radius),
            RequestMessage::ListFences => params,
            RequestMessage::AddFence(fence) => params
                .with("name", &fence.name)
                .with("strtTime", fence.start_time.format(types::hhmm::FORMAT))
                .with("endTime", fence.end_time.format(types::hhmm::FORMAT))
                .with("lat", fence.perimeter.center.latitude().format_decimal())
                .with("long", fence.perimeter.center.longitude().format_decimal())
                .with("dim", fence.perimeter.radius)
                .with("interval", fence.interval)
                .with("days", fence.days)
                .with("notifyEvent", fence.notify_event),
            RequestMessage::DeleteFence { fence_id }
            | RequestMessage::ActivateFence { fence_id }
            | RequestMessage::DeactivateFence { fence_id }
            | RequestMessage::ListFenceDevices { fence_id }
            | RequestMessage::ListRecipients { fence_id } => params.with("fenceId", fence_id),
            RequestMessage::AddFenceDevice { fence_id, mdn } => {
                params.with("fenceId", fence_id).with("mdn", mdn)
            }
            RequestMessage::DeleteFenceDevice { device_id } => params.with("deviceId", device_id),
            RequestMessage::AddRecipient {
                fence_id,
                recipient,
            } => params.with("fenceId", fence_id).with("mdnURL", recipient),
            RequestMessage::DeleteRecipient { recipient_id } => {
                params.with("recipientId", recipient_id)
            }
            RequestMessage::ListDevices { status, mdn } => {
                let mut params = params;
                if let Some(status) = status {
                    params.insert("status", status);
                }
                if let Some(mdn) = mdn {
                    params.insert("mdn", mdn);
                }
                params
            }
            RequestMessage::AddDevice { mdn } => params.with("method", "add").with("mdn", mdn),
            RequestMessage::DeleteDevice { mdn } => params.with("method", "delete").with("mdn", mdn),
        }
    }
}
