use std::{fmt, str::FromStr};

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::{
    Result,
    error::SprintkitError,
    geo::{Coordinates, Fix},
};

bitflags::bitflags! {
    /// Days of the week a geofence is monitored
    ///
    /// Travels as a string of day letters, `S M T W H F A` for Sunday
    /// through Saturday, e.g. `"SWF"`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Days: u8 {
        const SUNDAY = 0x01;
        const MONDAY = 0x02;
        const TUESDAY = 0x04;
        const WEDNESDAY = 0x08;
        const THURSDAY = 0x10;
        const FRIDAY = 0x20;
        const SATURDAY = 0x40;

        const WEEKDAYS = Self::MONDAY.bits()
            | Self::TUESDAY.bits()
            | Self::WEDNESDAY.bits()
            | Self::THURSDAY.bits()
            | Self::FRIDAY.bits();
        const WEEKEND = Self::SUNDAY.bits() | Self::SATURDAY.bits();
    }
}

const DAY_LETTERS: [(char, Days); 7] = [
    ('S', Days::SUNDAY),
    ('M', Days::MONDAY),
    ('T', Days::TUESDAY),
    ('W', Days::WEDNESDAY),
    ('H', Days::THURSDAY),
    ('F', Days::FRIDAY),
    ('A', Days::SATURDAY),
];

impl fmt::Display for Days {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (letter, day) in DAY_LETTERS {
            if self.contains(day) {
                write!(f, "{letter}")?;
            }
        }
        Ok(())
    }
}

impl FromStr for Days {
    type Err = SprintkitError;

    fn from_str(s: &str) -> Result<Self> {
        s.trim().chars().try_fold(Days::empty(), |days, ch| {
            let upper = ch.to_ascii_uppercase();
            DAY_LETTERS
                .iter()
                .find(|(letter, _)| *letter == upper)
                .map(|(_, day)| days | *day)
                .ok_or_else(|| SprintkitError::InvalidType {
                    value: s.into(),
                    expected: "day letters from SMTWHFA",
                })
        })
    }
}

impl Serialize for Days {
    fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Days {
    fn deserialize<D>(deserializer: D) -> core::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let v = String::deserialize(deserializer)?;
        v.parse().map_err(serde::de::Error::custom)
    }
}

/// Which fence crossings trigger a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyEvent {
    In,
    Out,
    Both,
}

impl NotifyEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            NotifyEvent::In => "in",
            NotifyEvent::Out => "out",
            NotifyEvent::Both => "both",
        }
    }
}

impl fmt::Display for NotifyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Monitoring state of a geofence
///
/// The Sandbox sends the state in varying case; it is kept lower-cased.
/// States other than active/inactive are carried as [`FenceStatus::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FenceStatus {
    Active,
    Inactive,
    Other(String),
}

impl FenceStatus {
    pub fn as_str(&self) -> &str {
        match self {
            FenceStatus::Active => "active",
            FenceStatus::Inactive => "inactive",
            FenceStatus::Other(status) => status,
        }
    }
}

impl From<&str> for FenceStatus {
    fn from(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "active" => FenceStatus::Active,
            "inactive" => FenceStatus::Inactive,
            other => FenceStatus::Other(other.to_owned()),
        }
    }
}

impl Serialize for FenceStatus {
    fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FenceStatus {
    fn deserialize<D>(deserializer: D) -> core::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let v = String::deserialize(deserializer)?;
        Ok(FenceStatus::from(v.as_str()))
    }
}

impl fmt::Display for FenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authorization state used to filter the account device listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceStatusFilter {
    Pending,
    Approved,
    Declined,
    Deleted,
}

impl DeviceStatusFilter {
    /// Wire letter: `p`, `a`, `x` or `d`
    pub fn as_str(self) -> &'static str {
        match self {
            DeviceStatusFilter::Pending => "p",
            DeviceStatusFilter::Approved => "a",
            DeviceStatusFilter::Declined => "x",
            DeviceStatusFilter::Deleted => "d",
        }
    }
}

impl fmt::Display for DeviceStatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A circular area around a center point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Perimeter {
    pub center: Coordinates,
    /// Radius in meters
    pub radius: u32,
}

impl Perimeter {
    pub fn new(center: Coordinates, radius: u32) -> Self {
        Perimeter { center, radius }
    }

    /// Great-circle distance from the center to `point`, in whole meters
    pub fn distance_to(&self, point: &Coordinates) -> u64 {
        self.center.distance_to(point)
    }

    /// Whether `fix` lies within the radius
    pub fn contains(&self, fix: &Fix) -> bool {
        self.distance_to(fix.coordinates()) <= u64::from(self.radius)
    }
}

/// `HHMM` wall-clock times as used by the fence schedule
pub(crate) mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%H%M";

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&time.format(FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let v = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(v.trim(), FORMAT).map_err(|e| {
            serde::de::Error::custom(format!("invalid HHMM time {v:?}: {e}"))
        })
    }
}

/// Parameters of a geofence to create
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFence {
    pub name: String,
    /// Time the fence becomes active each monitored day
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    /// Time the fence becomes inactive each monitored day
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub perimeter: Perimeter,
    /// Polling interval, in 5 minute increments
    pub interval: u32,
    pub days: Days,
    pub notify_event: NotifyEvent,
}

/// A geofence registered with the developer account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fence {
    pub id: u64,
    pub name: String,
    pub perimeter: Perimeter,
    pub days: Days,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub status: FenceStatus,
}

/// Selects fences from a listing by id or by name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FenceMatch {
    Id(u64),
    Name(String),
}

impl FenceMatch {
    pub fn matches(&self, fence: &Fence) -> bool {
        match self {
            FenceMatch::Id(id) => fence.id == *id,
            FenceMatch::Name(name) => fence.name == *name,
        }
    }
}

impl From<u64> for FenceMatch {
    fn from(id: u64) -> Self {
        FenceMatch::Id(id)
    }
}

impl From<&str> for FenceMatch {
    fn from(name: &str) -> Self {
        FenceMatch::Name(name.into())
    }
}

impl From<String> for FenceMatch {
    fn from(name: String) -> Self {
        FenceMatch::Name(name)
    }
}
