use std::fmt;

use serde::{Deserialize, Serialize};

use super::scalar::{Latitude, Longitude};
use crate::{Result, error::SprintkitError};

/// Earth mean radius in meters, as defined by the IUGG
pub const EARTH_RADIUS_METERS: f64 = 6_371_009.0;

/// A geographic position stored as a latitude/longitude pair
///
/// Both components are validated when the pair is built; a pair with an
/// out-of-range component is never created. Serializes as `[lat, lon]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "(f64, f64)", into = "(f64, f64)")]
pub struct Coordinates {
    latitude: Latitude,
    longitude: Longitude,
}

impl Coordinates {
    /// Validates and pairs raw decimal degrees
    ///
    /// # Example
    /// ```
    /// use sprintkit::geo::Coordinates;
    ///
    /// assert!(Coordinates::new(38.9, -94.6).is_ok());
    /// assert!(Coordinates::new(38.9, -194.6).is_err());
    /// ```
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        Ok(Coordinates {
            latitude: Latitude::new(latitude)?,
            longitude: Longitude::new(longitude)?,
        })
    }

    /// Pairs already validated components
    pub const fn from_parts(latitude: Latitude, longitude: Longitude) -> Self {
        Coordinates {
            latitude,
            longitude,
        }
    }

    /// Parses decimal text such as `"38.1234"`, `"-94.1234"`
    pub fn parse(latitude: &str, longitude: &str) -> Result<Self> {
        Ok(Coordinates {
            latitude: latitude.parse()?,
            longitude: longitude.parse()?,
        })
    }

    pub const fn latitude(&self) -> Latitude {
        self.latitude
    }

    pub const fn longitude(&self) -> Longitude {
        self.longitude
    }

    /// Great-circle distance to `other` in whole meters
    ///
    /// Haversine formula on a sphere of [`EARTH_RADIUS_METERS`]; the result
    /// is truncated, not rounded.
    pub fn distance_to(&self, other: &Coordinates) -> u64 {
        let lat1 = self.latitude.value();
        let lon1 = self.longitude.value();
        let lat2 = other.latitude.value();
        let lon2 = other.longitude.value();

        let dist_lat = (lat2 - lat1).to_radians();
        let dist_lon = (lon2 - lon1).to_radians();

        let a = (dist_lat / 2.0).sin().powi(2)
            + lat1.to_radians().cos() * lat2.to_radians().cos() * (dist_lon / 2.0).sin().powi(2);
        // Rounding can push `a` just past 1 for antipodal points.
        let a = a.clamp(0.0, 1.0);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        (EARTH_RADIUS_METERS * c) as u64
    }
}

impl TryFrom<(f64, f64)> for Coordinates {
    type Error = SprintkitError;

    fn try_from((latitude, longitude): (f64, f64)) -> Result<Self> {
        Coordinates::new(latitude, longitude)
    }
}

impl From<(Latitude, Longitude)> for Coordinates {
    fn from((latitude, longitude): (Latitude, Longitude)) -> Self {
        Coordinates::from_parts(latitude, longitude)
    }
}

impl From<Coordinates> for (f64, f64) {
    fn from(coordinates: Coordinates) -> Self {
        (coordinates.latitude.value(), coordinates.longitude.value())
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Latitude: {}\nLongitude: {}",
            self.latitude, self.longitude
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sprint_hq() -> Coordinates {
        Coordinates::new(38.914812, -94.657734).unwrap()
    }

    fn cl_brown() -> Coordinates {
        Coordinates::new(38.922658, -97.213898).unwrap()
    }

    #[test]
    fn test_construction_is_atomic() {
        assert!(matches!(
            Coordinates::new(91.0, 0.0),
            Err(SprintkitError::InvalidRange { .. })
        ));
        assert!(matches!(
            Coordinates::new(0.0, 181.0),
            Err(SprintkitError::InvalidRange { .. })
        ));
        assert!(matches!(
            Coordinates::parse("38.1", "east"),
            Err(SprintkitError::InvalidType { .. })
        ));
    }

    #[test]
    fn test_equality_needs_both_components() {
        let a = Coordinates::new(10.0, 20.0).unwrap();
        assert_eq!(a, Coordinates::try_from((10.0, 20.0)).unwrap());
        assert_ne!(a, Coordinates::new(10.0, 20.5).unwrap());
        assert_ne!(a, Coordinates::new(10.5, 20.0).unwrap());
    }

    #[test]
    fn test_distance_between_known_points() {
        let distance = sprint_hq().distance_to(&cl_brown());
        assert!(
            (220_000..=222_000).contains(&distance),
            "unexpected distance {distance}"
        );
    }

    #[test]
    fn test_distance_symmetric_and_zero() {
        let a = sprint_hq();
        let b = cl_brown();
        assert_eq!(a.distance_to(&b), b.distance_to(&a));
        assert_eq!(a.distance_to(&a), 0);
    }

    #[test]
    fn test_distance_antipodal() {
        let a = Coordinates::new(0.0, 0.0).unwrap();
        let b = Coordinates::new(0.0, 180.0).unwrap();
        let half_circumference = (EARTH_RADIUS_METERS * std::f64::consts::PI) as u64;
        assert!(a.distance_to(&b).abs_diff(half_circumference) <= 1);
    }

    #[test]
    fn test_display() {
        let coordinates = Coordinates::new(38.5, -94.75).unwrap();
        assert_eq!(
            coordinates.to_string(),
            "Latitude: 38° 30' 0.00\" N\nLongitude: 94° 45' 0.00\" W"
        );
    }

    #[test]
    fn test_serde_pair() {
        let coordinates: Coordinates = serde_json::from_str("[38.5, -94.75]").unwrap();
        assert_eq!(coordinates.latitude().value(), 38.5);
        assert_eq!(serde_json::to_string(&coordinates).unwrap(), "[38.5,-94.75]");
        assert!(serde_json::from_str::<Coordinates>("[100.0, 0.0]").is_err());
    }
}
