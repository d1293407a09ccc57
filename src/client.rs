//! Asynchronous Sandbox client
//!
//! [`SandboxClient`] turns each Sandbox service into a method: it builds the
//! request message, signs a fresh parameter set, hands it to a
//! [`SandboxTransport`] and decodes the reply into the geodetic model.
//! Nothing is cached between calls.
//!
//! For synchronous/blocking operations, see the `blocking` submodule.
//!
//! # Example
//!
//! ```no_run
//! use sprintkit::{client::SandboxClient, config::Config};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = SandboxClient::connect(Config::new("my-key", "my-secret"))?;
//!
//! if client.reachable("5551234567").await? {
//!     let fix = client.locate("5551234567").await?;
//!     println!("{fix}");
//! }
//! # Ok(())
//! # }
//! ```

use std::{collections::BTreeMap, future::Future};

use chrono::Utc;
use tracing::debug;

use crate::{
    Result,
    config::Config,
    error::SandboxError,
    geo::Fix,
    protocol::{
        SandboxJsonDecode, SandboxJsonRequest, SandboxJsonResponse,
        sign::{SignedParams, sign_params},
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

/// Blocking (synchronous) client implementation
pub mod blocking;

/// Redirect hops followed by the HTTP transports
pub const MAX_REDIRECTS: usize = 10;

#[cfg(feature = "reqwest")]
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Asynchronous carrier of Sandbox calls
///
/// A transport performs one HTTP GET of `url` with `params` as the query
/// string and returns the raw reply body. Failing to obtain a body is a
/// [`crate::error::SprintkitError::ConnectionError`]; the body itself is
/// never interpreted here.
pub trait SandboxTransport: Send + Sync {
    fn get(&self, url: &str, params: &SignedParams) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// Builds the URL and signed parameters of a call
pub(crate) fn prepare(config: &Config, message: &RequestMessage) -> (String, SignedParams) {
    let endpoint = message.endpoint();
    debug!(endpoint, "sandbox request");

    let params = sign_params(message.to_params(config.key()), config.secret());
    (config.endpoint_url(endpoint), params)
}

/// Looks up the id of `name` in a listing, or fails with a geofence error
pub(crate) fn lookup_id(map: &BTreeMap<String, u64>, name: &str, missing: &str) -> Result<u64> {
    map.get(name)
        .copied()
        .ok_or_else(|| SandboxError::geofence(missing).into())
}

/// The single fence of a listing filtered by id
pub(crate) fn added_fence(fences: Vec<Fence>) -> Result<Fence> {
    let mut fences = fences.into_iter();
    match (fences.next(), fences.next()) {
        (Some(fence), None) => Ok(fence),
        _ => Err(SandboxError::geofence("FENCE_NOTADDED").into()),
    }
}

/// Asynchronous Sandbox client
///
/// Methods take `&self`; a client can be shared between tasks when its
/// transport can.
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
    T: SandboxTransport,
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
    async fn request<Res>(&self, message: RequestMessage) -> Result<Res>
    where
        Res: SandboxJsonResponse,
    {
        let (url, params) = prepare(&self.config, &message);
        let body = self.transport.get(&url, &params).await?;
        body.decode_response()
    }

    /// Gets the presence status of a device
    pub async fn presence(&self, mdn: &str) -> Result<Presence> {
        self.request(RequestMessage::Presence { mdn: mdn.into() })
            .await
    }

    /// Checks whether a device is reachable on the network
    pub async fn reachable(&self, mdn: &str) -> Result<bool> {
        Ok(self.presence(mdn).await?.is_reachable())
    }

    /// Gets the raw location reply for a device
    pub async fn location(&self, mdn: &str) -> Result<Location> {
        self.request(RequestMessage::Location { mdn: mdn.into() })
            .await
    }

    /// Locates a device
    ///
    /// The fix is stamped with the time the reply was received and carries
    /// the reported accuracy as its HEPE.
    pub async fn locate(&self, mdn: &str) -> Result<Fix> {
        self.location(mdn).await?.to_fix(Utc::now())
    }

    /// Gets the raw perimeter check reply for a device
    pub async fn perimeter(&self, mdn: &str, perimeter: &Perimeter) -> Result<PerimeterCheck> {
        self.request(RequestMessage::CheckPerimeter {
            mdn: mdn.into(),
            perimeter: *perimeter,
        })
        .await
    }

    /// Checks whether a device is inside a perimeter
    pub async fn inside(&self, mdn: &str, perimeter: &Perimeter) -> Result<bool> {
        Ok(self.perimeter(mdn, perimeter).await?.inside())
    }

    /// Checks a perimeter and locates the device in one call
    pub async fn check_perimeter(&self, mdn: &str, perimeter: &Perimeter) -> Result<(bool, Fix)> {
        let check = self.perimeter(mdn, perimeter).await?;
        Ok((check.inside(), check.to_fix(Utc::now())?))
    }

    /// Distance in meters from the perimeter center to a device
    ///
    /// The device is located first; the distance is computed locally.
    pub async fn distance_to(&self, perimeter: &Perimeter, mdn: &str) -> Result<u64> {
        let fix = self.locate(mdn).await?;
        Ok(perimeter.distance_to(fix.coordinates()))
    }

    /// Sends a text message to one or more devices
    ///
    /// # Arguments
    /// * `mdns` - 10 digit MDNs of the recipients
    /// * `msg` - Message text (160 characters)
    pub async fn send_sms<S: AsRef<str>>(&self, mdns: &[S], msg: &str) -> Result<Sms> {
        let reply: RawReply = self
            .request(RequestMessage::Sms {
                mdns: mdns.iter().map(|mdn| mdn.as_ref().to_owned()).collect(),
                msg: msg.into(),
            })
            .await?;
        Sms::from_reply(reply)
    }

    /// Gets the raw fence listing of the account
    pub async fn list_fences(&self) -> Result<FenceList> {
        self.request(RequestMessage::ListFences).await
    }

    /// Lists the fences of the account, optionally only those matching
    /// an id or a name
    pub async fn fences(&self, filter: Option<FenceMatch>) -> Result<Vec<Fence>> {
        let fences = self.list_fences().await?.into_fences()?;
        Ok(match filter {
            Some(filter) => fences.into_iter().filter(|fence| filter.matches(fence)).collect(),
            None => fences,
        })
    }

    /// Creates a fence and returns it as listed by the Sandbox
    pub async fn add_fence(&self, fence: &NewFence) -> Result<Fence> {
        let added: FenceAdded = self.request(RequestMessage::AddFence(fence.clone())).await?;
        let id = added.fence_id()?;
        added_fence(self.fences(Some(FenceMatch::Id(id))).await?)
    }

    pub async fn delete_fence(&self, fence_id: u64) -> Result<RawReply> {
        self.request(RequestMessage::DeleteFence { fence_id }).await
    }

    pub async fn activate_fence(&self, fence_id: u64) -> Result<()> {
        let reply: MessageReply = self
            .request(RequestMessage::ActivateFence { fence_id })
            .await?;
        reply.expect_message("FENCE_ACTIVATED")
    }

    pub async fn deactivate_fence(&self, fence_id: u64) -> Result<RawReply> {
        self.request(RequestMessage::DeactivateFence { fence_id })
            .await
    }

    /// Gets the raw listing of the devices monitored by a fence
    pub async fn list_fence_devices(&self, fence_id: u64) -> Result<FenceDevices> {
        self.request(RequestMessage::ListFenceDevices { fence_id })
            .await
    }

    /// Devices monitored by a fence, as MDN to device id
    pub async fn fence_devices(&self, fence_id: u64) -> Result<BTreeMap<String, u64>> {
        Ok(self.list_fence_devices(fence_id).await?.into_map())
    }

    pub async fn add_fence_device(&self, fence_id: u64, mdn: &str) -> Result<()> {
        let reply: MessageReply = self
            .request(RequestMessage::AddFenceDevice {
                fence_id,
                mdn: mdn.into(),
            })
            .await?;
        reply.expect_message("DEVICE_ADDED")
    }

    /// Stops monitoring a device
    ///
    /// The Sandbox deletes by device id, so the fence devices are listed
    /// first to resolve the MDN.
    pub async fn delete_fence_device(&self, fence_id: u64, mdn: &str) -> Result<()> {
        let devices = self.fence_devices(fence_id).await?;
        let device_id = lookup_id(&devices, mdn, "DEVICE_NOTFOUND")?;
        let reply: MessageReply = self
            .request(RequestMessage::DeleteFenceDevice { device_id })
            .await?;
        reply.expect_message("DEVICE_DELETED")
    }

    /// Gets the raw listing of the notification recipients of a fence
    pub async fn list_fence_recipients(&self, fence_id: u64) -> Result<Recipients> {
        self.request(RequestMessage::ListRecipients { fence_id })
            .await
    }

    /// Notification recipients of a fence, as MDN or URL to recipient id
    pub async fn fence_recipients(&self, fence_id: u64) -> Result<BTreeMap<String, u64>> {
        Ok(self.list_fence_recipients(fence_id).await?.into_map())
    }

    pub async fn add_fence_recipient(&self, fence_id: u64, recipient: &str) -> Result<RawReply> {
        self.request(RequestMessage::AddRecipient {
            fence_id,
            recipient: recipient.into(),
        })
        .await
    }

    /// Removes a notification recipient, resolved by MDN or URL
    pub async fn delete_fence_recipient(&self, fence_id: u64, recipient: &str) -> Result<RawReply> {
        let recipients = self.fence_recipients(fence_id).await?;
        let recipient_id = lookup_id(&recipients, recipient, "UNKNOWN_RECIPIENT")?;
        self.request(RequestMessage::DeleteRecipient { recipient_id })
            .await
    }

    /// Devices of the developer account
    ///
    /// # Arguments
    /// * `status` - Only devices in this authorization state
    /// * `mdn` - Only this device
    pub async fn account_devices(
        &self,
        status: Option<DeviceStatusFilter>,
        mdn: Option<&str>,
    ) -> Result<AccountDevices> {
        self.request(RequestMessage::ListDevices {
            status,
            mdn: mdn.map(Into::into),
        })
        .await
    }

    pub async fn add_account_device(&self, mdn: &str) -> Result<AccountReply> {
        self.request(RequestMessage::AddDevice { mdn: mdn.into() })
            .await
    }

    pub async fn delete_account_device(&self, mdn: &str) -> Result<AccountReply> {
        self.request(RequestMessage::DeleteDevice { mdn: mdn.into() })
            .await
    }
}

#[cfg(feature = "reqwest")]
impl SandboxClient<HttpTransport> {
    /// Creates a client talking HTTP to the Sandbox named in `config`
    ///
    /// # Example
    /// ```no_run
    /// # use sprintkit::{client::SandboxClient, config::Config};
    /// let client = SandboxClient::connect(Config::new("my-key", "my-secret"))?;
    /// # Ok::<(), sprintkit::error::SprintkitError>(())
    /// ```
    pub fn connect(config: Config) -> Result<Self> {
        Ok(SandboxClient::new(HttpTransport::new()?, config))
    }
}

/// HTTP transport backed by `reqwest`
///
/// Redirects are followed up to [`MAX_REDIRECTS`] hops. Replies with a
/// non-success status are still returned: the Sandbox reports its errors
/// in the body.
#[cfg(feature = "reqwest")]
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

#[cfg(feature = "reqwest")]
impl HttpTransport {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| crate::error::SprintkitError::ConnectionError(e.to_string()))?;
        Ok(HttpTransport { client })
    }

    /// Wraps a preconfigured client, e.g. one with timeouts or a proxy
    pub fn with_client(client: reqwest::Client) -> Self {
        HttpTransport { client }
    }

    /// Builds the GET request carrying `params` as its query string
    fn build_request(&self, url: &str, params: &SignedParams) -> Result<reqwest::Request> {
        self.client
            .get(url)
            .query(params)
            .build()
            .map_err(|e| crate::error::SprintkitError::ConnectionError(e.to_string()))
    }
}

#[cfg(feature = "reqwest")]
impl SandboxTransport for HttpTransport {
    async fn get(&self, url: &str, params: &SignedParams) -> Result<Vec<u8>> {
        use crate::error::SprintkitError;

        let request = self.build_request(url, params)?;
        let resp = self
            .client
            .execute(request)
            .await
            .map_err(|e| SprintkitError::ConnectionError(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(%status, url, "unexpected sandbox status");
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| SprintkitError::ConnectionError(e.to_string()))?;
        Ok(body.to_vec())
    }
}
