use super::types::*;

/// A call to one of the Sandbox v1 endpoints
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Network reachability of a device
    Presence { mdn: String },
    /// Network-based location of a device
    Location { mdn: String },
    /// Text message to one or more devices
    Sms { mdns: Vec<String>, msg: String },
    /// Whether a device is inside a perimeter
    CheckPerimeter { mdn: String, perimeter: Perimeter },
    ListFences,
    AddFence(NewFence),
    DeleteFence { fence_id: u64 },
    ActivateFence { fence_id: u64 },
    DeactivateFence { fence_id: u64 },
    ListFenceDevices { fence_id: u64 },
    AddFenceDevice { fence_id: u64, mdn: String },
    DeleteFenceDevice { device_id: u64 },
    ListRecipients { fence_id: u64 },
    /// `recipient` is either an MDN or a callback URL
    AddRecipient { fence_id: u64, recipient: String },
    DeleteRecipient { recipient_id: u64 },
    /// Devices of the developer account, optionally filtered
    ListDevices {
        status: Option<DeviceStatusFilter>,
        mdn: Option<String>,
    },
    AddDevice { mdn: String },
    DeleteDevice { mdn: String },
}
