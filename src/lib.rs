//! # sprintkit
//!
//! A Rust client for the Sprint Developer Sandbox location based services.
//!
//! ## Overview
//!
//! The Sandbox is a REST gateway offering device presence, network
//! location, perimeter checks, geofences, SMS and developer account
//! management. Every call is signed with the developer key and shared
//! secret, and location replies are decoded into validated geodetic
//! values.
//!
//! The crate is layered:
//!
//! - [`geo`]: latitude/longitude scalars, degree/minute/second
//!   decomposition, coordinates with great-circle distance, location fixes
//! - [`protocol`]: request signing and the typed v1 request/reply messages
//! - [`client`]: async and blocking clients over a pluggable transport
//!
//! ## Example
//!
//! ```no_run
//! use sprintkit::{client::SandboxClient, config::Config, geo::Coordinates};
//! use sprintkit::protocol::v1::types::Perimeter;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = SandboxClient::connect(Config::new("my-key", "my-secret"))?;
//!
//!     let office = Perimeter::new(Coordinates::new(38.914812, -94.657734)?, 2000);
//!     let (inside, fix) = client.check_perimeter("5551234567", &office).await?;
//!     println!("inside: {inside}\n{fix}");
//!     Ok(())
//! }
//! ```

use crate::error::SprintkitError;

/// Async and blocking clients for the Sandbox services
pub mod client;

/// Sandbox connection settings and credentials
pub mod config;

/// Error types used throughout the library
pub mod error;

/// Validated geodetic values: scalars, coordinates and fixes
pub mod geo;

/// Request signing and Sandbox message definitions
pub mod protocol;

/// Convenience type alias for Results with SprintkitError
pub type Result<T> = core::result::Result<T, SprintkitError>;
