//! Blocking (synchronous) Sandbox client implementation
//!
//! This module provides a synchronous version of the Sandbox client for
//! applications that don't run an async runtime. It offers the same
//! operations as the async client with blocking calls.
//!
//! # Example
//!
//! ```no_run
//! use sprintkit::{client::blocking::SandboxClient, config::Config};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = SandboxClient::connect(Config::new("my-key", "my-secret"))?;
//! let fix = client.locate("5551234567")?;
//! println!("{fix}");
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;

use chrono::Utc;

use super::{added_fence, lookup_id, prepare};
use crate::{
    Result,
    config::Config,
    geo::Fix,
    protocol::{
        SandboxJsonDecode, SandboxJsonResponse,
        sign::SignedParams,
        v1::{
            RawReply, RequestMessage,
            response::{
                AccountDevices, AccountReply, FenceAdded, FenceDevices, FenceList, Location,
                MessageReply, PerimeterCheck, Presence, Recipients, Sms,
            },
            types::{DeviceStatusFilter, Fence, FenceMatch, NewFence, Perimeter},
        },
    },
};

/// Blocking carrier of Sandbox calls
///
/// Same contract as [`super::SandboxTransport`], without the future.
pub trait BlockingTransport {
    fn get(&self, url: &str, params: &SignedParams) -> Result<Vec<u8>>;
}

/// Blocking Sandbox client
///
/// # Type Parameters
/// * `T` - The transport carrying the calls (e.g. [`HttpTransport`])
#[derive(Debug, Clone)]
pub struct SandboxClient<T> {
    transport: T,
    config: Config,
}

impl<T> SandboxClient<T>
where
    T: BlockingTransport,
{
    /// Creates a client over an existing transport
    ///
    /// # Arguments
    /// * `transport` - Carrier of the HTTP calls
    /// * `config` - Credentials and Sandbox location
    pub fn new(transport: T, config: Config) -> Self {
        SandboxClient { transport, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Signs, sends and decodes one call
    fn request<Res>(&self, message: RequestMessage) -> Result<Res>
    where
        Res: SandboxJsonResponse,
    {
        let (url, params) = prepare(&self.config, &message);
        self.transport.get(&url, &params)?.decode_response()
    }

    /// Gets the presence status of a device
    pub fn presence(&self, mdn: &str) -> Result<Presence> {
        self.request(RequestMessage::Presence { mdn: mdn.into() })
    }

    /// Checks whether a device is reachable on the network
    pub fn reachable(&self, mdn: &str) -> Result<bool> {
        Ok(self.presence(mdn)?.is_reachable())
    }

    /// Gets the raw location reply for a device
    pub fn location(&self, mdn: &str) -> Result<Location> {
        self.request(RequestMessage::Location { mdn: mdn.into() })
    }

    /// Locates a device
    ///
    /// The fix is stamped with the time the reply was received.
    pub fn locate(&self, mdn: &str) -> Result<Fix> {
        self.location(mdn)?.to_fix(Utc::now())
    }

    /// Gets the raw perimeter check reply for a device
    pub fn perimeter(&self, mdn: &str, perimeter: &Perimeter) -> Result<PerimeterCheck> {
        self.request(RequestMessage::CheckPerimeter {
            mdn: mdn.into(),
            perimeter: *perimeter,
        })
    }

    /// Checks whether a device is inside a perimeter
    pub fn inside(&self, mdn: &str, perimeter: &Perimeter) -> Result<bool> {
        Ok(self.perimeter(mdn, perimeter)?.inside())
    }

    /// Checks a perimeter and locates the device in one call
    pub fn check_perimeter(&self, mdn: &str, perimeter: &Perimeter) -> Result<(bool, Fix)> {
        let check = self.perimeter(mdn, perimeter)?;
        Ok((check.inside(), check.to_fix(Utc::now())?))
    }

    /// Distance in meters from the perimeter center to a device
    pub fn distance_to(&self, perimeter: &Perimeter, mdn: &str) -> Result<u64> {
        let fix = self.locate(mdn)?;
        Ok(perimeter.distance_to(fix.coordinates()))
    }

    /// Sends a text message to one or more devices
    pub fn send_sms<S: AsRef<str>>(&self, mdns: &[S], msg: &str) -> Result<Sms> {
        let reply: RawReply = self.request(RequestMessage::Sms {
            mdns: mdns.iter().map(|mdn| mdn.as_ref().to_owned()).collect(),
            msg: msg.into(),
        })?;
        Sms::from_reply(reply)
    }

    /// Gets the raw fence listing of the account
    pub fn list_fences(&self) -> Result<FenceList> {
        self.request(RequestMessage::ListFences)
    }

    /// Lists the fences of the account, optionally only those matching
    /// an id or a name
    pub fn fences(&self, filter: Option<FenceMatch>) -> Result<Vec<Fence>> {
        let fences = self.list_fences()?.into_fences()?;
        Ok(match filter {
            Some(filter) => fences.into_iter().filter(|fence| filter.matches(fence)).collect(),
            None => fences,
        })
    }

    /// Creates a fence and returns it as listed by the Sandbox
    pub fn add_fence(&self, fence: &NewFence) -> Result<Fence> {
        let added: FenceAdded = self.request(RequestMessage::AddFence(fence.clone()))?;
        let id = added.fence_id()?;
        added_fence(self.fences(Some(FenceMatch::Id(id)))?)
    }

    pub fn delete_fence(&self, fence_id: u64) -> Result<RawReply> {
        self.request(RequestMessage::DeleteFence { fence_id })
    }

    pub fn activate_fence(&self, fence_id: u64) -> Result<()> {
        let reply: MessageReply = self.request(RequestMessage::ActivateFence { fence_id })?;
        reply.expect_message("FENCE_ACTIVATED")
    }

    pub fn deactivate_fence(&self, fence_id: u64) -> Result<RawReply> {
        self.request(RequestMessage::DeactivateFence { fence_id })
    }

    pub fn list_fence_devices(&self, fence_id: u64) -> Result<FenceDevices> {
        self.request(RequestMessage::ListFenceDevices { fence_id })
    }

    /// Devices monitored by a fence, as MDN to device id
    pub fn fence_devices(&self, fence_id: u64) -> Result<BTreeMap<String, u64>> {
        Ok(self.list_fence_devices(fence_id)?.into_map())
    }

    pub fn add_fence_device(&self, fence_id: u64, mdn: &str) -> Result<()> {
        let reply: MessageReply = self.request(RequestMessage::AddFenceDevice {
            fence_id,
            mdn: mdn.into(),
        })?;
        reply.expect_message("DEVICE_ADDED")
    }

    /// Stops monitoring a device, resolved by MDN
    pub fn delete_fence_device(&self, fence_id: u64, mdn: &str) -> Result<()> {
        let devices = self.fence_devices(fence_id)?;
        let device_id = lookup_id(&devices, mdn, "DEVICE_NOTFOUND")?;
        let reply: MessageReply = self.request(RequestMessage::DeleteFenceDevice { device_id })?;
        reply.expect_message("DEVICE_DELETED")
    }

    pub fn list_fence_recipients(&self, fence_id: u64) -> Result<Recipients> {
        self.request(RequestMessage::ListRecipients { fence_id })
    }

    /// Notification recipients of a fence, as MDN or URL to recipient id
    pub fn fence_recipients(&self, fence_id: u64) -> Result<BTreeMap<String, u64>> {
        Ok(self.list_fence_recipients(fence_id)?.into_map())
    }

    pub fn add_fence_recipient(&self, fence_id: u64, recipient: &str) -> Result<RawReply> {
        self.request(RequestMessage::AddRecipient {
            fence_id,
            recipient: recipient.into(),
        })
    }

    /// Removes a notification recipient, resolved by MDN or URL
    pub fn delete_fence_recipient(&self, fence_id: u64, recipient: &str) -> Result<RawReply> {
        let recipients = self.fence_recipients(fence_id)?;
        let recipient_id = lookup_id(&recipients, recipient, "UNKNOWN_RECIPIENT")?;
        self.request(RequestMessage::DeleteRecipient { recipient_id })
    }

    /// Devices of the developer account
    pub fn account_devices(
        &self,
        status: Option<DeviceStatusFilter>,
        mdn: Option<&str>,
    ) -> Result<AccountDevices> {
        self.request(RequestMessage::ListDevices {
            status,
            mdn: mdn.map(Into::into),
        })
    }

    pub fn add_account_device(&self, mdn: &str) -> Result<AccountReply> {
        self.request(RequestMessage::AddDevice { mdn: mdn.into() })
    }

    pub fn delete_account_device(&self, mdn: &str) -> Result<AccountReply> {
        self.request(RequestMessage::DeleteDevice { mdn: mdn.into() })
    }
}

#[cfg(feature = "reqwest")]
impl SandboxClient<HttpTransport> {
    /// Creates a client talking HTTP to the Sandbox named in `config`
    ///
    /// Must not be called from within an async runtime.
    pub fn connect(config: Config) -> Result<Self> {
        Ok(SandboxClient::new(HttpTransport::new()?, config))
    }
}

/// Blocking HTTP transport backed by `reqwest`
///
/// Redirects are followed up to [`super::MAX_REDIRECTS`] hops.
#[cfg(feature = "reqwest")]
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

#[cfg(feature = "reqwest")]
impl HttpTransport {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(super::MAX_REDIRECTS))
            .user_agent(super::USER_AGENT)
            .build()
            .map_err(|e| crate::error::SprintkitError::ConnectionError(e.to_string()))?;
        Ok(HttpTransport { client })
    }

    pub fn with_client(client: reqwest::blocking::Client) -> Self {
        HttpTransport { client }
    }

    fn build_request(&self, url: &str, params: &SignedParams) -> Result<reqwest::blocking::Request> {
        self.client
            .get(url)
            .query(params)
            .build()
            .map_err(|e| crate::error::SprintkitError::ConnectionError(e.to_string()))
    }
}

#[cfg(feature = "reqwest")]
impl BlockingTransport for HttpTransport {
    fn get(&self, url: &str, params: &SignedParams) -> Result<Vec<u8>> {
        use crate::error::SprintkitError;

        let request = self.build_request(url, params)?;
        let resp = self
            .client
            .execute(request)
            .map_err(|e| SprintkitError::ConnectionError(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(%status, url, "unexpected sandbox status");
        }

        let body = resp
            .bytes()
            .map_err(|e| SprintkitError::ConnectionError(e.to_string()))?;
        Ok(body.to_vec())
    }
}
