use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};
use serde_with::skip_serializing_none;

use super::coordinates::Coordinates;
use crate::error::SprintkitError;

/// Key of the horizontal estimated position error in [`Fix::errors`]
pub const HEPE_KEY: &str = "hepe";

/// Dimension of a position fix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum FixMode {
    /// Latitude/longitude only
    Fix2D = 2,
    /// Latitude/longitude and altitude
    Fix3D = 3,
}

/// A location sample
///
/// Bundles [`Coordinates`] with the time they were observed and the optional
/// motion and accuracy data the location service reported. A fix carrying an
/// altitude is a 3D fix; the mode is derived from the altitude and a
/// serialized fix whose `mode` disagrees with it is rejected.
///
/// # Example
/// ```
/// use chrono::Utc;
/// use sprintkit::geo::{Coordinates, Fix, FixMode};
///
/// let fix = Fix::new(Utc::now(), Coordinates::new(38.9, -94.6)?).with_hepe(120.0);
/// assert_eq!(fix.mode(), FixMode::Fix2D);
/// assert_eq!(fix.hepe(), Some(120.0));
/// # Ok::<(), sprintkit::error::SprintkitError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "FixRepr", try_from = "FixRepr")]
pub struct Fix {
    timestamp: DateTime<Utc>,
    coordinates: Coordinates,
    /// Heading in degrees from true north
    heading: Option<f64>,
    /// Speed in meters per second
    speed: Option<f64>,
    /// Altitude in meters
    altitude: Option<f64>,
    /// Climb/sink rate in meters per second
    climb: Option<f64>,
    /// Error estimates, keyed by kind (see [`HEPE_KEY`])
    errors: Option<BTreeMap<String, f64>>,
}

impl Fix {
    pub fn new(timestamp: DateTime<Utc>, coordinates: Coordinates) -> Self {
        Fix {
            timestamp,
            coordinates,
            heading: None,
            speed: None,
            altitude: None,
            climb: None,
            errors: None,
        }
    }

    pub fn with_heading(mut self, heading: f64) -> Self {
        self.heading = Some(heading);
        self
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }

    /// Adds an altitude, making this a 3D fix
    pub fn with_altitude(mut self, altitude: f64) -> Self {
        self.altitude = Some(altitude);
        self
    }

    pub fn with_climb(mut self, climb: f64) -> Self {
        self.climb = Some(climb);
        self
    }

    pub fn with_error<K: Into<String>>(mut self, key: K, value: f64) -> Self {
        self.errors
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value);
        self
    }

    /// Adds a horizontal estimated position error in meters
    pub fn with_hepe(self, meters: f64) -> Self {
        self.with_error(HEPE_KEY, meters)
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn coordinates(&self) -> &Coordinates {
        &self.coordinates
    }

    pub fn mode(&self) -> FixMode {
        match self.altitude {
            Some(_) => FixMode::Fix3D,
            None => FixMode::Fix2D,
        }
    }

    pub fn heading(&self) -> Option<f64> {
        self.heading
    }

    pub fn speed(&self) -> Option<f64> {
        self.speed
    }

    pub fn altitude(&self) -> Option<f64> {
        self.altitude
    }

    pub fn climb(&self) -> Option<f64> {
        self.climb
    }

    pub fn errors(&self) -> Option<&BTreeMap<String, f64>> {
        self.errors.as_ref()
    }

    /// Horizontal estimated position error in meters
    pub fn hepe(&self) -> Option<f64> {
        self.errors.as_ref()?.get(HEPE_KEY).copied()
    }
}

/// Wire form of [`Fix`], carrying the mode next to the data it derives from
#[skip_serializing_none]
#[derive(Serialize, Deserialize)]
struct FixRepr {
    timestamp: DateTime<Utc>,
    coordinates: Coordinates,
    mode: Option<FixMode>,
    heading: Option<f64>,
    speed: Option<f64>,
    altitude: Option<f64>,
    climb: Option<f64>,
    errors: Option<BTreeMap<String, f64>>,
}

impl From<Fix> for FixRepr {
    fn from(fix: Fix) -> Self {
        FixRepr {
            mode: Some(fix.mode()),
            timestamp: fix.timestamp,
            coordinates: fix.coordinates,
            heading: fix.heading,
            speed: fix.speed,
            altitude: fix.altitude,
            climb: fix.climb,
            errors: fix.errors,
        }
    }
}

impl TryFrom<FixRepr> for Fix {
    type Error = SprintkitError;

    fn try_from(repr: FixRepr) -> Result<Self, Self::Error> {
        let fix = Fix {
            timestamp: repr.timestamp,
            coordinates: repr.coordinates,
            heading: repr.heading,
            speed: repr.speed,
            altitude: repr.altitude,
            climb: repr.climb,
            errors: repr.errors,
        };
        match repr.mode {
            Some(mode) if mode != fix.mode() => Err(SprintkitError::InvalidOperation(
                "fix mode must be 3D exactly when an altitude is present",
            )),
            _ => Ok(fix),
        }
    }
}

impl fmt::Display for Fix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Time: {}", self.timestamp)?;
        writeln!(f, "{}", self.coordinates)?;
        match (self.heading, self.speed, self.hepe()) {
            (Some(heading), Some(speed), _) => {
                writeln!(f, "Heading: {heading}")?;
                writeln!(f, "Speed: {speed}")
            }
            (_, _, Some(hepe)) => writeln!(
                f,
                "Horizontal Estimated Position Error (HEPE): {} meters",
                hepe.trunc() as i64
            ),
            _ => Ok(()),
        }
    }
}

/// A GPS satellite used for a fix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Satellite {
    /// PRN number, same as the satellite vehicle id (1-32)
    pub prn: u8,
    /// Elevation in degrees (0-90)
    pub elevation: u8,
    /// Azimuth in degrees (0-360)
    pub azimuth: u16,
    /// Signal to noise ratio in dB (0-99)
    pub snr: u8,
    /// Whether the satellite is used in the latest fix
    pub used: bool,
}

impl fmt::Display for Satellite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Satellite PRN: {:3}  Elv: {:3}  Azi: {:3}  SNR: {:3}  Used: {}",
            self.prn, self.elevation, self.azimuth, self.snr, self.used
        )
    }
}
