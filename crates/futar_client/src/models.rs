//! FUTÁR wire models
//!
//! The response envelope shared by every endpoint and the enumerations
//! accepted by trip planning. Payloads themselves stay untyped JSON.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Envelope wrapping every FUTÁR response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResponseEnvelope {
    /// Status code, 200 on success
    pub code: i64,
    /// Status text, the error message on failure
    #[serde(default)]
    pub text: String,
    /// Endpoint-specific payload
    #[serde(default)]
    pub data: Value,
}

impl ResponseEnvelope {
    /// Envelope code signalling success
    pub const OK: i64 = 200;

    /// Whether the service reported success
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.code == Self::OK
    }
}

/// Itinerary optimization criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Optimize {
    /// Fastest trip
    #[default]
    Quick,
    /// Fewest transfers
    Transfers,
    /// Least walking
    Walk,
    /// Weighted mix of safety, time and slope
    Triangle,
}

impl Optimize {
    /// Wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Quick => "QUICK",
            Self::Transfers => "TRANSFERS",
            Self::Walk => "WALK",
            Self::Triangle => "TRIANGLE",
        }
    }
}

impl fmt::Display for Optimize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Optimize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "QUICK" => Ok(Self::Quick),
            "TRANSFERS" => Ok(Self::Transfers),
            "WALK" => Ok(Self::Walk),
            "TRIANGLE" => Ok(Self::Triangle),
            other => Err(format!("unknown optimize criterion: {other}")),
        }
    }
}

/// Means of travel accepted by the trip planner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TraverseMode {
    /// On foot
    Walk,
    /// Bicycle
    Bicycle,
    /// Metro
    Subway,
    /// Suburban railway (HÉV) and trains
    Rail,
    /// Boat
    Ferry,
    /// Tram
    Tram,
    /// Trolleybus
    Trolleybus,
    /// Bus
    Bus,
}

impl TraverseMode {
    /// Modes used when a trip plan request does not name any
    pub const DEFAULT_SET: &[Self] = &[
        Self::Walk,
        Self::Subway,
        Self::Rail,
        Self::Ferry,
        Self::Tram,
        Self::Trolleybus,
        Self::Bus,
    ];

    /// Wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Walk => "WALK",
            Self::Bicycle => "BICYCLE",
            Self::Subway => "SUBWAY",
            Self::Rail => "RAIL",
            Self::Ferry => "FERRY",
            Self::Tram => "TRAM",
            Self::Trolleybus => "TROLLEYBUS",
            Self::Bus => "BUS",
        }
    }

    /// Comma-joined wire form of a mode list
    #[must_use]
    pub fn join(modes: &[Self]) -> String {
        modes
            .iter()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for TraverseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
