//! Geodetic value model
//!
//! Validated scalar types ([`Degree`], [`Minute`], [`Second`], [`Latitude`],
//! [`Longitude`]), coordinate pairs with degree/minute/second decomposition
//! and great-circle distance, and the [`Fix`] location sample returned by the
//! location services.
//!
//! Every value is checked when it is built and never changes afterwards, so
//! a value that exists is a valid one.
//!
//! ```
//! use sprintkit::geo::Coordinates;
//!
//! let hq = Coordinates::new(38.914812, -94.657734)?;
//! let cl_brown = Coordinates::new(38.922658, -97.213898)?;
//! assert!((220_000..222_000).contains(&hq.distance_to(&cl_brown)));
//! # Ok::<(), sprintkit::error::SprintkitError>(())
//! ```

/// Coordinate pairs and distance
pub mod coordinates;
/// Location samples
pub mod fix;
/// Validated scalar types
pub mod scalar;

pub use coordinates::{Coordinates, EARTH_RADIUS_METERS};
pub use fix::{Fix, FixMode, HEPE_KEY, Satellite};
pub use scalar::{Degree, Dms, EastWest, Latitude, Longitude, Minute, Negate, NorthSouth, Second};
