//! Per-endpoint request options
//!
//! Each endpoint takes one options struct. Stop-, route- and trip-scoped
//! options convert from a bare identifier (`"F01234".into()`), and every
//! struct deserializes from a camelCase mapping such as
//! `{ "stopId": "F01234", "minutesAfter": 15 }`.
//!
//! Options turn into a [`ApiRequest`] through [`BuildRequest`], which applies
//! the client defaults and validates required fields before any I/O.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::FutarError;
use crate::models::{Optimize, TraverseMode};
use crate::params::{DefaultingMode, RequestParams, require_id, require_route_id, require_stop_id};

/// Client-side values that options fall back to
#[derive(Debug, Clone, Copy)]
pub struct CallContext {
    /// Fallback rule for per-call values
    pub defaulting: DefaultingMode,
    /// Configured `includeReferences`
    pub include_references: bool,
    /// Configured `version`
    pub api_version: u32,
    /// Service time zone for `date`/`time` fields
    pub tz: Tz,
    /// Current instant, used for date defaults
    pub now: DateTime<Utc>,
}

impl CallContext {
    /// Parameters every endpoint starts from: `includeReferences` and `version`
    fn base_params(&self, include_references: Option<bool>, version: Option<u32>) -> RequestParams {
        let mut params = RequestParams::new();
        params
            .set(
                "includeReferences",
                self.defaulting
                    .resolve(include_references, self.include_references),
            )
            .set("version", self.defaulting.resolve(version, self.api_version));
        params
    }

    /// Today's date in the service time zone
    fn today(&self) -> NaiveDate {
        self.now.with_timezone(&self.tz).date_naive()
    }

    /// Names of the coordinates that are not supplied
    fn missing_coordinates<'a>(&self, fields: &[(&'a str, Option<f64>)]) -> Vec<&'a str> {
        fields
            .iter()
            .filter(|(_, value)| self.defaulting.supplied(*value).is_none())
            .map(|(name, _)| *name)
            .collect()
    }
}

/// A fully assembled request: endpoint path segments and query parameters
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// Path segments below the base URL; the last one gets a `.json` suffix
    pub segments: Vec<String>,
    /// Query parameters
    pub params: RequestParams,
}

impl ApiRequest {
    fn new(endpoint: &str, params: RequestParams) -> Self {
        Self {
            segments: vec![endpoint.to_string()],
            params,
        }
    }

    /// Endpoint path relative to the base URL, e.g. `stop/F01234.json`
    #[must_use]
    pub fn path(&self) -> String {
        format!("{}.json", self.segments.join("/"))
    }
}

/// Validation and parameter assembly for one endpoint
pub trait BuildRequest {
    /// Validate the options and assemble the request
    fn build(&self, ctx: &CallContext) -> Result<ApiRequest, FutarError>;
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

macro_rules! id_shorthand {
    ($ty:ident, $field:ident) => {
        impl From<&str> for $ty {
            fn from(id: &str) -> Self {
                Self {
                    $field: Some(id.to_string()),
                    ..Self::default()
                }
            }
        }

        impl From<String> for $ty {
            fn from(id: String) -> Self {
                Self {
                    $field: Some(id),
                    ..Self::default()
                }
            }
        }
    };
}

/// Options for `arrivals-and-departures-for-stop`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ArrivalsAndDeparturesOptions {
    /// Stop identifier
    pub stop_id: Option<String>,
    /// Minutes before now to include (default 0)
    pub minutes_before: Option<i64>,
    /// Minutes after now to include (default 30)
    pub minutes_after: Option<i64>,
    /// Only list departures (default true)
    pub only_departures: Option<bool>,
    /// Embed referenced entities
    pub include_references: Option<bool>,
    /// API version override
    pub version: Option<u32>,
}

id_shorthand!(ArrivalsAndDeparturesOptions, stop_id);

impl BuildRequest for ArrivalsAndDeparturesOptions {
    fn build(&self, ctx: &CallContext) -> Result<ApiRequest, FutarError> {
        let stop_id = require_stop_id(ctx.defaulting, self.stop_id.as_deref())?;
        let mut params = ctx.base_params(self.include_references, self.version);
        params
            .set("stopId", stop_id)
            .set(
                "minutesBefore",
                ctx.defaulting.resolve(self.minutes_before, 0),
            )
            .set("minutesAfter", ctx.defaulting.resolve(self.minutes_after, 30))
            .set(
                "onlyDepartures",
                ctx.defaulting.resolve(self.only_departures, true),
            );
        Ok(ApiRequest::new("arrivals-and-departures-for-stop", params))
    }
}

/// Options for `stops-for-location`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StopsForLocationOptions {
    /// Latitude of the center
    pub lat: Option<f64>,
    /// Longitude of the center
    pub lon: Option<f64>,
    /// Search radius in meters
    pub radius: Option<f64>,
    /// Embed referenced entities
    pub include_references: Option<bool>,
    /// API version override
    pub version: Option<u32>,
}

impl StopsForLocationOptions {
    /// Stops within `radius` meters of a point
    #[must_use]
    pub fn around(lat: f64, lon: f64, radius: f64) -> Self {
        Self {
            lat: Some(lat),
            lon: Some(lon),
            radius: Some(radius),
            ..Self::default()
        }
    }
}

impl BuildRequest for StopsForLocationOptions {
    fn build(&self, ctx: &CallContext) -> Result<ApiRequest, FutarError> {
        let missing = ctx.missing_coordinates(&[
            ("lat", self.lat),
            ("lon", self.lon),
            ("radius", self.radius),
        ]);
        if !missing.is_empty() {
            return Err(FutarError::missing(&missing));
        }

        let mut params = ctx.base_params(self.include_references, self.version);
        params
            .set_opt("lat", self.lat)
            .set_opt("lon", self.lon)
            .set_opt("radius", self.radius);
        Ok(ApiRequest::new("stops-for-location", params))
    }
}

/// Options for `schedule-for-stop`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScheduleForStopOptions {
    /// Stop identifier
    pub stop_id: Option<String>,
    /// Service day (default today in the service time zone)
    pub date: Option<NaiveDate>,
    /// Embed referenced entities
    pub include_references: Option<bool>,
    /// API version override
    pub version: Option<u32>,
}

id_shorthand!(ScheduleForStopOptions, stop_id);

impl BuildRequest for ScheduleForStopOptions {
    fn build(&self, ctx: &CallContext) -> Result<ApiRequest, FutarError> {
        let stop_id = require_stop_id(ctx.defaulting, self.stop_id.as_deref())?;
        let mut params = ctx.base_params(self.include_references, self.version);
        params
            .set("stopId", stop_id)
            .set("date", format_date(self.date.unwrap_or_else(|| ctx.today())));
        Ok(ApiRequest::new("schedule-for-stop", params))
    }
}

/// Options for `route-details-for-stop`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RouteDetailsForStopOptions {
    /// Stop identifier
    pub stop_id: Option<String>,
    /// Embed referenced entities
    pub include_references: Option<bool>,
    /// API version override
    pub version: Option<u32>,
}

id_shorthand!(RouteDetailsForStopOptions, stop_id);

impl BuildRequest for RouteDetailsForStopOptions {
    fn build(&self, ctx: &CallContext) -> Result<ApiRequest, FutarError> {
        let stop_id = require_stop_id(ctx.defaulting, self.stop_id.as_deref())?;
        let mut params = ctx.base_params(self.include_references, self.version);
        params.set("stopId", stop_id);
        Ok(ApiRequest::new("route-details-for-stop", params))
    }
}

/// Options for `vehicles-for-stop`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VehiclesForStopOptions {
    /// Stop identifier
    pub stop_id: Option<String>,
    /// Only return changes after this epoch millisecond (default 0)
    pub if_modified_since: Option<i64>,
    /// Embed referenced entities
    pub include_references: Option<bool>,
    /// API version override
    pub version: Option<u32>,
}

id_shorthand!(VehiclesForStopOptions, stop_id);

impl BuildRequest for VehiclesForStopOptions {
    fn build(&self, ctx: &CallContext) -> Result<ApiRequest, FutarError> {
        let stop_id = require_stop_id(ctx.defaulting, self.stop_id.as_deref())?;
        let mut params = ctx.base_params(self.include_references, self.version);
        params.set("stopId", stop_id).set(
            "ifModifiedSince",
            ctx.defaulting.resolve(self.if_modified_since, 0),
        );
        Ok(ApiRequest::new("vehicles-for-stop", params))
    }
}

/// Options for `stop/{stopId}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StopOptions {
    /// Stop identifier, sent in the path
    pub stop_id: Option<String>,
    /// Embed referenced entities
    pub include_references: Option<bool>,
    /// API version override
    pub version: Option<u32>,
}

id_shorthand!(StopOptions, stop_id);

impl BuildRequest for StopOptions {
    fn build(&self, ctx: &CallContext) -> Result<ApiRequest, FutarError> {
        let stop_id = require_stop_id(ctx.defaulting, self.stop_id.as_deref())?;
        Ok(ApiRequest {
            segments: vec!["stop".to_string(), stop_id.to_string()],
            params: ctx.base_params(self.include_references, self.version),
        })
    }
}

/// Options for `route/{routeId}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RouteOptions {
    /// Route identifier, sent in the path
    pub route_id: Option<String>,
    /// Embed referenced entities
    pub include_references: Option<bool>,
    /// API version override
    pub version: Option<u32>,
}

id_shorthand!(RouteOptions, route_id);

impl BuildRequest for RouteOptions {
    fn build(&self, ctx: &CallContext) -> Result<ApiRequest, FutarError> {
        let route_id = require_route_id(ctx.defaulting, self.route_id.as_deref())?;
        Ok(ApiRequest {
            segments: vec!["route".to_string(), route_id.to_string()],
            params: ctx.base_params(self.include_references, self.version),
        })
    }
}

/// Options for `route-details`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RouteDetailsOptions {
    /// Route identifier
    pub route_id: Option<String>,
    /// Include related routes (default false)
    pub related: Option<bool>,
    /// Embed referenced entities
    pub include_references: Option<bool>,
    /// API version override
    pub version: Option<u32>,
}

id_shorthand!(RouteDetailsOptions, route_id);

impl BuildRequest for RouteDetailsOptions {
    fn build(&self, ctx: &CallContext) -> Result<ApiRequest, FutarError> {
        let route_id = require_route_id(ctx.defaulting, self.route_id.as_deref())?;
        let mut params = ctx.base_params(self.include_references, self.version);
        params
            .set("routeId", route_id)
            .set("related", ctx.defaulting.resolve(self.related, false));
        Ok(ApiRequest::new("route-details", params))
    }
}

/// Options for `vehicles-for-route`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VehiclesForRouteOptions {
    /// Route identifier
    pub route_id: Option<String>,
    /// Only return changes after this epoch millisecond (default 0)
    pub if_modified_since: Option<i64>,
    /// Embed referenced entities
    pub include_references: Option<bool>,
    /// API version override
    pub version: Option<u32>,
}

id_shorthand!(VehiclesForRouteOptions, route_id);

impl BuildRequest for VehiclesForRouteOptions {
    fn build(&self, ctx: &CallContext) -> Result<ApiRequest, FutarError> {
        let route_id = require_route_id(ctx.defaulting, self.route_id.as_deref())?;
        let mut params = ctx.base_params(self.include_references, self.version);
        params.set("routeId", route_id).set(
            "ifModifiedSince",
            ctx.defaulting.resolve(self.if_modified_since, 0),
        );
        Ok(ApiRequest::new("vehicles-for-route", params))
    }
}

/// Options for `trip-details`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TripDetailsOptions {
    /// Trip identifier
    pub trip_id: Option<String>,
    /// Service day of the trip
    pub date: Option<NaiveDate>,
    /// Embed referenced entities
    pub include_references: Option<bool>,
    /// API version override
    pub version: Option<u32>,
}

id_shorthand!(TripDetailsOptions, trip_id);

impl BuildRequest for TripDetailsOptions {
    fn build(&self, ctx: &CallContext) -> Result<ApiRequest, FutarError> {
        let trip_id = require_id(ctx.defaulting, "tripId", self.trip_id.as_deref())?;
        let mut params = ctx.base_params(self.include_references, self.version);
        params
            .set("tripId", trip_id)
            .set_opt("date", self.date.map(format_date));
        Ok(ApiRequest::new("trip-details", params))
    }
}

/// Options for `search`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchOptions {
    /// Free-text query
    pub query: Option<String>,
    /// Embed referenced entities
    pub include_references: Option<bool>,
    /// API version override
    pub version: Option<u32>,
}

id_shorthand!(SearchOptions, query);

impl BuildRequest for SearchOptions {
    fn build(&self, ctx: &CallContext) -> Result<ApiRequest, FutarError> {
        let query = require_id(ctx.defaulting, "query", self.query.as_deref())?;
        let mut params = ctx.base_params(self.include_references, self.version);
        params.set("query", query);
        Ok(ApiRequest::new("search", params))
    }
}

/// Options for `alert-search`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlertSearchOptions {
    /// Free-text filter (default empty, matching every alert)
    pub query: Option<String>,
    /// Embed referenced entities
    pub include_references: Option<bool>,
    /// API version override
    pub version: Option<u32>,
}

id_shorthand!(AlertSearchOptions, query);

impl BuildRequest for AlertSearchOptions {
    fn build(&self, ctx: &CallContext) -> Result<ApiRequest, FutarError> {
        let mut params = ctx.base_params(self.include_references, self.version);
        params.set("query", ctx.defaulting.resolve(self.query.as_deref(), ""));
        Ok(ApiRequest::new("alert-search", params))
    }
}

/// `metadata`, always without references
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct MetadataRequest;

impl BuildRequest for MetadataRequest {
    fn build(&self, ctx: &CallContext) -> Result<ApiRequest, FutarError> {
        let mut params = ctx.base_params(None, None);
        params.set("includeReferences", false);
        Ok(ApiRequest::new("metadata", params))
    }
}

/// `bicycle-rental`, always without references
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct BicycleRentalRequest;

impl BuildRequest for BicycleRentalRequest {
    fn build(&self, ctx: &CallContext) -> Result<ApiRequest, FutarError> {
        let mut params = ctx.base_params(None, None);
        params.set("includeReferences", false);
        Ok(ApiRequest::new("bicycle-rental", params))
    }
}

/// Options for `plan-trip`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlanTripOptions {
    /// Origin latitude
    pub from_lat: Option<f64>,
    /// Origin longitude
    pub from_lon: Option<f64>,
    /// Destination latitude
    pub to_lat: Option<f64>,
    /// Destination longitude
    pub to_lon: Option<f64>,
    /// Origin label, sent as `name::lat,lon`
    pub from_name: Option<String>,
    /// Destination label
    pub to_name: Option<String>,
    /// Departure (or arrival with `arrive_by`) instant; omitted means now
    pub date_time: Option<DateTime<Utc>>,
    /// Default 5
    pub max_transfers: Option<i64>,
    /// Default 10
    pub num_itineraries: Option<i64>,
    /// Default true
    pub show_intermediate_stops: Option<bool>,
    /// Treat `date_time` as arrival time (default false)
    pub arrive_by: Option<bool>,
    /// Meters, default 3000
    pub max_walk_distance: Option<f64>,
    /// Default false
    pub wheelchair: Option<bool>,
    /// Default false
    pub ignore_realtime_updates: Option<bool>,
    /// Default [`Optimize::Quick`]
    pub optimize: Option<Optimize>,
    /// Default [`TraverseMode::DEFAULT_SET`]
    pub mode: Option<Vec<TraverseMode>>,
    /// Only with [`Optimize::Triangle`], default 1
    pub triangle_safety_factor: Option<f64>,
    /// Only with [`Optimize::Triangle`], default 0
    pub triangle_time_factor: Option<f64>,
    /// Only with [`Optimize::Triangle`], default 0
    pub triangle_slope_factor: Option<f64>,
    /// Embed referenced entities
    pub include_references: Option<bool>,
    /// API version override
    pub version: Option<u32>,
}

impl PlanTripOptions {
    /// Trip between two coordinates with every other option defaulted
    #[must_use]
    pub fn between(from_lat: f64, from_lon: f64, to_lat: f64, to_lon: f64) -> Self {
        Self {
            from_lat: Some(from_lat),
            from_lon: Some(from_lon),
            to_lat: Some(to_lat),
            to_lon: Some(to_lon),
            ..Self::default()
        }
    }

    /// Set origin and destination labels
    #[must_use]
    pub fn with_names(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.from_name = Some(from.into());
        self.to_name = Some(to.into());
        self
    }

    /// Set the departure instant
    #[must_use]
    pub const fn with_date_time(mut self, date_time: DateTime<Utc>) -> Self {
        self.date_time = Some(date_time);
        self
    }

    /// Set the optimization criterion
    #[must_use]
    pub const fn with_optimize(mut self, optimize: Optimize) -> Self {
        self.optimize = Some(optimize);
        self
    }

    /// Restrict the means of travel
    #[must_use]
    pub fn with_modes(mut self, modes: Vec<TraverseMode>) -> Self {
        self.mode = Some(modes);
        self
    }
}

/// `lat,lon`, or `name::lat,lon` when a label is given
fn place(name: Option<&str>, lat: f64, lon: f64) -> String {
    match name {
        Some(name) => format!("{name}::{lat},{lon}"),
        None => format!("{lat},{lon}"),
    }
}

impl BuildRequest for PlanTripOptions {
    fn build(&self, ctx: &CallContext) -> Result<ApiRequest, FutarError> {
        let d = ctx.defaulting;
        let (Some(from_lat), Some(from_lon), Some(to_lat), Some(to_lon)) = (
            d.supplied(self.from_lat),
            d.supplied(self.from_lon),
            d.supplied(self.to_lat),
            d.supplied(self.to_lon),
        ) else {
            let missing = ctx.missing_coordinates(&[
                ("fromLat", self.from_lat),
                ("fromLon", self.from_lon),
                ("toLat", self.to_lat),
                ("toLon", self.to_lon),
            ]);
            return Err(FutarError::missing(&missing));
        };

        let from_name = d.supplied(self.from_name.as_deref());
        let to_name = d.supplied(self.to_name.as_deref());
        let optimize = self.optimize.unwrap_or_default();
        let modes = self
            .mode
            .as_deref()
            .unwrap_or(TraverseMode::DEFAULT_SET);

        let mut params = ctx.base_params(self.include_references, self.version);
        params
            .set("fromPlace", place(from_name, from_lat, from_lon))
            .set("toPlace", place(to_name, to_lat, to_lon))
            .set("maxTransfers", d.resolve(self.max_transfers, 5))
            .set("numItineraries", d.resolve(self.num_itineraries, 10))
            .set(
                "showIntermediateStops",
                d.resolve(self.show_intermediate_stops, true),
            )
            .set("arriveBy", d.resolve(self.arrive_by, false))
            .set("maxWalkDistance", d.resolve(self.max_walk_distance, 3000.0))
            .set("wheelchair", d.resolve(self.wheelchair, false))
            .set(
                "ignoreRealtimeUpdates",
                d.resolve(self.ignore_realtime_updates, false),
            )
            .set("optimize", optimize.as_str())
            .set("mode", TraverseMode::join(modes));

        if let Some(date_time) = self.date_time {
            let local = date_time.with_timezone(&ctx.tz);
            params
                .set("date", local.format("%Y-%m-%d").to_string())
                .set("time", local.format("%H:%M").to_string());
        }

        if optimize == Optimize::Triangle {
            params
                .set(
                    "triangleSafetyFactor",
                    d.resolve(self.triangle_safety_factor, 1.0),
                )
                .set(
                    "triangleTimeFactor",
                    d.resolve(self.triangle_time_factor, 0.0),
                )
                .set(
                    "triangleSlopeFactor",
                    d.resolve(self.triangle_slope_factor, 0.0),
                );
        }

        Ok(ApiRequest::new("plan-trip", params))
    }
}
