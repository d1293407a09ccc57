use std::fmt;
use std::ops::Neg;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Result, error::SprintkitError};

fn check_range(value: f64, min: f64, max: f64) -> Result<f64> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(SprintkitError::InvalidRange { value, min, max })
    }
}

fn parse_decimal(text: &str, expected: &'static str) -> Result<f64> {
    text.trim()
        .parse::<f64>()
        .map_err(|_| SprintkitError::InvalidType {
            value: text.to_owned(),
            expected,
        })
}

/// Sign inversion that may not be defined for the type
///
/// Degrees, latitudes and longitudes flip their sign. Minutes and seconds
/// are never negative and always fail with `InvalidOperation`.
pub trait Negate: Sized {
    fn negate(self) -> Result<Self>;
}

/// Degree component of a geographic coordinate
///
/// The magnitude is at most 180; the sign carries the hemisphere.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Degree(i32);

impl Degree {
    pub const MAX: i32 = 180;

    pub fn new(value: i32) -> Result<Self> {
        check_range(value as f64, -(Self::MAX as f64), Self::MAX as f64)?;
        Ok(Degree(value))
    }

    pub const fn value(self) -> i32 {
        self.0
    }
}

impl TryFrom<i32> for Degree {
    type Error = SprintkitError;

    fn try_from(value: i32) -> Result<Self> {
        Degree::new(value)
    }
}

impl From<Degree> for i32 {
    fn from(degree: Degree) -> Self {
        degree.0
    }
}

impl Neg for Degree {
    type Output = Degree;

    fn neg(self) -> Degree {
        Degree(-self.0)
    }
}

impl Negate for Degree {
    fn negate(self) -> Result<Self> {
        Ok(-self)
    }
}

impl fmt::Display for Degree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.0)
    }
}

/// Minute component of a geographic coordinate, `0..=60`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Minute(u8);

impl Minute {
    pub const MAX: u8 = 60;

    pub fn new(value: i32) -> Result<Self> {
        check_range(value as f64, 0.0, Self::MAX as f64)?;
        Ok(Minute(value as u8))
    }

    pub const fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i32> for Minute {
    type Error = SprintkitError;

    fn try_from(value: i32) -> Result<Self> {
        Minute::new(value)
    }
}

impl From<Minute> for i32 {
    fn from(minute: Minute) -> Self {
        minute.0 as i32
    }
}

impl Negate for Minute {
    fn negate(self) -> Result<Self> {
        Err(SprintkitError::InvalidOperation("a minute cannot be negative"))
    }
}

impl fmt::Display for Minute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}'", self.0)
    }
}

/// Second component of a geographic coordinate, `0.0..=60.0`
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Second(f64);

impl Second {
    pub const MAX: f64 = 60.0;

    pub fn new(value: f64) -> Result<Self> {
        check_range(value, 0.0, Self::MAX).map(Second)
    }

    pub const fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Second {
    type Error = SprintkitError;

    fn try_from(value: f64) -> Result<Self> {
        Second::new(value)
    }
}

impl From<Second> for f64 {
    fn from(second: Second) -> Self {
        second.0
    }
}

impl Negate for Second {
    fn negate(self) -> Result<Self> {
        Err(SprintkitError::InvalidOperation("a second cannot be negative"))
    }
}

impl fmt::Display for Second {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}\"", self.0)
    }
}

/// Hemisphere of a latitude
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NorthSouth {
    North,
    South,
}

impl NorthSouth {
    pub const fn letter(self) -> char {
        match self {
            NorthSouth::North => 'N',
            NorthSouth::South => 'S',
        }
    }
}

impl TryFrom<char> for NorthSouth {
    type Error = SprintkitError;

    fn try_from(letter: char) -> Result<Self> {
        match letter {
            'N' => Ok(NorthSouth::North),
            'S' => Ok(NorthSouth::South),
            _ => Err(SprintkitError::InvalidType {
                value: letter.to_string(),
                expected: "a direction of 'N' or 'S'",
            }),
        }
    }
}

impl FromStr for NorthSouth {
    type Err = SprintkitError;

    fn from_str(s: &str) -> Result<Self> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(letter), None) => NorthSouth::try_from(letter),
            _ => Err(SprintkitError::InvalidType {
                value: s.to_owned(),
                expected: "a direction of 'N' or 'S'",
            }),
        }
    }
}

/// Hemisphere of a longitude
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EastWest {
    East,
    West,
}

impl EastWest {
    pub const fn letter(self) -> char {
        match self {
            EastWest::East => 'E',
            EastWest::West => 'W',
        }
    }
}

impl TryFrom<char> for EastWest {
    type Error = SprintkitError;

    fn try_from(letter: char) -> Result<Self> {
        match letter {
            'E' => Ok(EastWest::East),
            'W' => Ok(EastWest::West),
            _ => Err(SprintkitError::InvalidType {
                value: letter.to_string(),
                expected: "a direction of 'E' or 'W'",
            }),
        }
    }
}

impl FromStr for EastWest {
    type Err = SprintkitError;

    fn from_str(s: &str) -> Result<Self> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(letter), None) => EastWest::try_from(letter),
            _ => Err(SprintkitError::InvalidType {
                value: s.to_owned(),
                expected: "a direction of 'E' or 'W'",
            }),
        }
    }
}

/// Degree/minute/second decomposition of a decimal angle
///
/// Only the degree component carries the sign. The `negative` flag keeps
/// the sign of angles whose whole degree is zero, e.g. `-0.5`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Dms {
    degrees: Degree,
    minutes: Minute,
    seconds: Second,
    negative: bool,
}

impl Dms {
    pub fn new(degrees: Degree, minutes: Minute, seconds: Second) -> Self {
        Dms {
            degrees,
            minutes,
            seconds,
            negative: degrees.value() < 0,
        }
    }

    /// Decomposes a signed decimal angle
    ///
    /// `degrees = floor(|v|)`, `minutes = floor(frac · 60)`,
    /// `seconds = (frac · 60 − minutes) · 60`, degrees negated for `v < 0`.
    pub fn from_decimal(value: f64) -> Result<Self> {
        let max = Degree::MAX as f64;
        check_range(value, -max, max).map(Dms::decompose)
    }

    /// Splits an angle already known to be within `±Degree::MAX`
    ///
    /// The floors keep minutes in `0..60` and seconds in `0.0..60.0`.
    fn decompose(value: f64) -> Self {
        let negative = value < 0.0;
        let magnitude = value.abs();
        let whole = magnitude.floor();
        let remainder = (magnitude - whole) * 60.0;
        let minutes = remainder.floor();
        let seconds = (remainder - minutes) * 60.0;

        let degrees = Degree(whole as i32);
        Dms {
            degrees: if negative { -degrees } else { degrees },
            minutes: Minute(minutes as u8),
            seconds: Second(seconds),
            negative,
        }
    }

    pub fn degrees(&self) -> Degree {
        self.degrees
    }

    pub fn minutes(&self) -> Minute {
        self.minutes
    }

    pub fn seconds(&self) -> Second {
        self.seconds
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// Recombines the components into a signed decimal angle
    pub fn to_decimal(&self) -> f64 {
        let magnitude = self.degrees.value().unsigned_abs() as f64
            + (self.minutes.value() as f64 * 60.0 + self.seconds.value()) / 3600.0;
        if self.negative { -magnitude } else { magnitude }
    }
}

impl fmt::Display for Dms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.negative { "-" } else { "" };
        write!(
            f,
            "{sign}{}° {} {}",
            self.degrees.value().unsigned_abs(),
            self.minutes,
            self.seconds
        )
    }
}

fn decimal_from_dms(degree: i32, minute: i32, second: f64, negative: bool) -> Result<f64> {
    let dms = Dms::new(Degree::new(degree)?, Minute::new(minute)?, Second::new(second)?);
    let magnitude = dms.to_decimal().abs();
    Ok(if negative { -magnitude } else { magnitude })
}

/// Latitude in decimal degrees, `-90.0..=90.0`
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Latitude(f64);

impl Latitude {
    pub const MAX: f64 = 90.0;

    pub fn new(value: f64) -> Result<Self> {
        check_range(value, -Self::MAX, Self::MAX).map(Latitude)
    }

    /// Builds a latitude from its degree, minute and second parts
    ///
    /// A negative `degree` implies the southern hemisphere and cannot be
    /// combined with an explicit [`NorthSouth::South`].
    pub fn from_dms(
        degree: i32,
        minute: i32,
        second: f64,
        direction: Option<NorthSouth>,
    ) -> Result<Self> {
        if degree < 0 && direction == Some(NorthSouth::South) {
            return Err(SprintkitError::InvalidOperation(
                "degree can't be negative if direction is S",
            ));
        }
        let south = degree < 0 || direction == Some(NorthSouth::South);
        Latitude::new(decimal_from_dms(degree, minute, second, south)?)
    }

    pub const fn value(self) -> f64 {
        self.0
    }

    pub fn hemisphere(self) -> NorthSouth {
        if self.0 < 0.0 {
            NorthSouth::South
        } else {
            NorthSouth::North
        }
    }

    pub fn dms(self) -> Dms {
        Dms::decompose(self.0)
    }

    pub fn degrees(self) -> Degree {
        self.dms().degrees()
    }

    pub fn minutes(self) -> Minute {
        self.dms().minutes()
    }

    pub fn seconds(self) -> Second {
        self.dms().seconds()
    }

    /// Six-decimal rendering used for request parameters
    pub fn format_decimal(self) -> String {
        format!("{:.6}", self.0)
    }
}

impl TryFrom<f64> for Latitude {
    type Error = SprintkitError;

    fn try_from(value: f64) -> Result<Self> {
        Latitude::new(value)
    }
}

impl TryFrom<Dms> for Latitude {
    type Error = SprintkitError;

    fn try_from(dms: Dms) -> Result<Self> {
        Latitude::new(dms.to_decimal())
    }
}

impl From<Latitude> for f64 {
    fn from(latitude: Latitude) -> Self {
        latitude.0
    }
}

impl FromStr for Latitude {
    type Err = SprintkitError;

    fn from_str(s: &str) -> Result<Self> {
        Latitude::new(parse_decimal(s, "a decimal latitude")?)
    }
}

impl Neg for Latitude {
    type Output = Latitude;

    fn neg(self) -> Latitude {
        Latitude(-self.0)
    }
}

impl Negate for Latitude {
    fn negate(self) -> Result<Self> {
        Ok(-self)
    }
}

impl fmt::Display for Latitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dms = self.dms();
        write!(
            f,
            "{}° {} {} {}",
            dms.degrees().value().unsigned_abs(),
            dms.minutes(),
            dms.seconds(),
            self.hemisphere().letter()
        )
    }
}

/// Longitude in decimal degrees, `-180.0..=180.0`
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Longitude(f64);

impl Longitude {
    pub const MAX: f64 = 180.0;

    pub fn new(value: f64) -> Result<Self> {
        check_range(value, -Self::MAX, Self::MAX).map(Longitude)
    }

    /// Builds a longitude from its degree, minute and second parts
    ///
    /// A negative `degree` implies the western hemisphere and cannot be
    /// combined with an explicit [`EastWest::West`].
    pub fn from_dms(
        degree: i32,
        minute: i32,
        second: f64,
        direction: Option<EastWest>,
    ) -> Result<Self> {
        if degree < 0 && direction == Some(EastWest::West) {
            return Err(SprintkitError::InvalidOperation(
                "degree can't be negative if direction is W",
            ));
        }
        let west = degree < 0 || direction == Some(EastWest::West);
        Longitude::new(decimal_from_dms(degree, minute, second, west)?)
    }

    pub const fn value(self) -> f64 {
        self.0
    }

    pub fn hemisphere(self) -> EastWest {
        if self.0 < 0.0 {
            EastWest::West
        } else {
            EastWest::East
        }
    }

    pub fn dms(self) -> Dms {
        Dms::decompose(self.0)
    }

    pub fn degrees(self) -> Degree {
        self.dms().degrees()
    }

    pub fn minutes(self) -> Minute {
        self.dms().minutes()
    }

    pub fn seconds(self) -> Second {
        self.dms().seconds()
    }

    /// Six-decimal rendering used for request parameters
    pub fn format_decimal(self) -> String {
        format!("{:.6}", self.0)
    }
}

impl TryFrom<f64> for Longitude {
    type Error = SprintkitError;

    fn try_from(value: f64) -> Result<Self> {
        Longitude::new(value)
    }
}

impl TryFrom<Dms> for Longitude {
    type Error = SprintkitError;

    fn try_from(dms: Dms) -> Result<Self> {
        Longitude::new(dms.to_decimal())
    }
}

impl From<Longitude> for f64 {
    fn from(longitude: Longitude) -> Self {
        longitude.0
    }
}

impl FromStr for Longitude {
    type Err = SprintkitError;

    fn from_str(s: &str) -> Result<Self> {
        Longitude::new(parse_decimal(s, "a decimal longitude")?)
    }
}

impl Neg for Longitude {
    type Output = Longitude;

    fn neg(self) -> Longitude {
        Longitude(-self.0)
    }
}

impl Negate for Longitude {
    fn negate(self) -> Result<Self> {
        Ok(-self)
    }
}

impl fmt::Display for Longitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dms = self.dms();
        write!(
            f,
            "{}° {} {} {}",
            dms.degrees().value().unsigned_abs(),
            dms.minutes(),
            dms.seconds(),
            self.hemisphere().letter()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degree_range() {
        assert_eq!(Degree::new(180).unwrap().value(), 180);
        assert_eq!(Degree::new(-180).unwrap().value(), -180);
        assert!(matches!(
            Degree::new(181),
            Err(SprintkitError::InvalidRange { value, .. }) if value == 181.0
        ));
        assert_eq!(Degree::default().value(), 0);
    }

    #[test]
    fn test_minute_and_second_range() {
        assert!(Minute::new(60).is_ok());
        assert!(Minute::new(61).is_err());
        assert!(Minute::new(-1).is_err());
        assert!(Second::new(60.0).is_ok());
        assert!(Second::new(60.01).is_err());
        assert!(Second::new(-0.01).is_err());
        assert!(Second::new(f64::NAN).is_err());
    }

    #[test]
    fn test_latitude_longitude_range() {
        assert!(Latitude::new(90.0).is_ok());
        assert!(Latitude::new(-90.0).is_ok());
        assert!(Latitude::new(90.000001).is_err());
        assert!(Longitude::new(180.0).is_ok());
        assert!(Longitude::new(-180.5).is_err());
        assert!(Latitude::new(f64::NAN).is_err());
    }

    #[test]
    fn test_negation() {
        assert_eq!((-Degree::new(45).unwrap()).value(), -45);
        assert_eq!((-Latitude::new(38.5).unwrap()).value(), -38.5);
        assert_eq!(Longitude::new(-94.25).unwrap().negate().unwrap().value(), 94.25);

        assert!(matches!(
            Minute::new(30).unwrap().negate(),
            Err(SprintkitError::InvalidOperation(_))
        ));
        assert!(matches!(
            Second::new(1.5).unwrap().negate(),
            Err(SprintkitError::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_scalar_display() {
        assert_eq!(Degree::new(-12).unwrap().to_string(), "-12°");
        assert_eq!(Minute::new(30).unwrap().to_string(), "30'");
        assert_eq!(Second::new(15.254).unwrap().to_string(), "15.25\"");
    }

    #[test]
    fn test_latitude_display_uses_hemisphere() {
        let north = Latitude::new(38.5).unwrap();
        assert_eq!(north.to_string(), "38° 30' 0.00\" N");

        let south = Latitude::new(-38.5).unwrap();
        assert_eq!(south.to_string(), "38° 30' 0.00\" S");

        let west = Longitude::new(-94.75).unwrap();
        assert_eq!(west.to_string(), "94° 45' 0.00\" W");
    }

    #[test]
    fn test_dms_decomposition() {
        let dms = Latitude::new(-38.914812).unwrap().dms();
        assert_eq!(dms.degrees().value(), -38);
        assert_eq!(dms.minutes().value(), 54);
        assert!((dms.seconds().value() - 53.3232).abs() < 1e-3);
        assert!(dms.is_negative());
    }

    #[test]
    fn test_dms_matches_checked_decomposition() {
        for value in [-180.0, -94.657734, -0.999999, 0.0, 45.25, 179.999999, 180.0] {
            let lon = Longitude::new(value).unwrap();
            assert_eq!(lon.dms(), Dms::from_decimal(value).unwrap());
        }
        let pole = Latitude::new(90.0).unwrap().dms();
        assert_eq!(pole.degrees().value(), 90);
        assert_eq!(pole.minutes().value(), 0);

        assert!(Dms::from_decimal(180.5).is_err());
    }

    #[test]
    fn test_dms_keeps_sign_below_one_degree() {
        let lat = Latitude::new(-0.5).unwrap();
        let dms = lat.dms();
        assert_eq!(dms.degrees().value(), 0);
        assert!(dms.is_negative());
        assert_eq!(Latitude::try_from(dms).unwrap(), lat);
    }

    #[test]
    fn test_from_dms() {
        let lat = Latitude::from_dms(38, 30, 0.0, Some(NorthSouth::South)).unwrap();
        assert_eq!(lat.value(), -38.5);

        let lat = Latitude::from_dms(-38, 30, 0.0, None).unwrap();
        assert_eq!(lat.value(), -38.5);

        let lon = Longitude::from_dms(94, 45, 0.0, Some(EastWest::East)).unwrap();
        assert_eq!(lon.value(), 94.75);

        assert!(matches!(
            Latitude::from_dms(-38, 30, 0.0, Some(NorthSouth::South)),
            Err(SprintkitError::InvalidOperation(_))
        ));
        assert!(matches!(
            Latitude::from_dms(91, 0, 0.0, None),
            Err(SprintkitError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_parse_latitude() {
        let lat: Latitude = "38.914812".parse().unwrap();
        assert_eq!(lat.format_decimal(), "38.914812");

        assert!(matches!(
            "north".parse::<Latitude>(),
            Err(SprintkitError::InvalidType { .. })
        ));
        assert!(matches!(
            "-200".parse::<Longitude>(),
            Err(SprintkitError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_parse_hemisphere() {
        assert_eq!("S".parse::<NorthSouth>().unwrap(), NorthSouth::South);
        assert_eq!(EastWest::try_from('W').unwrap(), EastWest::West);
        assert!("E".parse::<NorthSouth>().is_err());
        assert!("WW".parse::<EastWest>().is_err());
    }

    #[test]
    fn test_serde_validates_on_input() {
        let lat: Latitude = serde_json::from_str("45.5").unwrap();
        assert_eq!(lat.value(), 45.5);
        assert!(serde_json::from_str::<Latitude>("95.0").is_err());
        assert!(serde_json::from_str::<Minute>("61").is_err());
        assert_eq!(serde_json::to_string(&Degree::new(-3).unwrap()).unwrap(), "-3");
    }
}
