//! Client for the BKK FUTÁR transit information API
//!
//! Wraps the public [FUTÁR](https://futar.bkk.hu) "where" API of the
//! Budapest transport authority: stop arrivals and departures, schedules,
//! route details, vehicles, alerts, bicycle rental, search and trip planning.
//!
//! # Architecture
//!
//! [`FutarApi`] defines one async method per endpoint, implemented by
//! [`FutarClient`]. Each method takes a typed options struct, validates it,
//! fills in defaults from [`FutarConfig`], issues a single GET and returns
//! the `data` member of the `{code, text, data}` envelope as untyped JSON.
//! A non-200 envelope code becomes [`FutarError::Upstream`].
//!
//! # Example
//!
//! ```rust,ignore
//! use futar_client::{FutarApi, FutarClient, FutarConfig, PlanTripOptions};
//!
//! let client = FutarClient::new(&FutarConfig::default())?;
//!
//! let departures = client
//!     .arrivals_and_departures_for_stop("BKK_F01234".into())
//!     .await?;
//!
//! let plan = client
//!     .plan_trip(PlanTripOptions::between(47.4979, 19.0402, 47.5, 19.08))
//!     .await?;
//! ```

pub mod callback;
mod client;
mod config;
mod error;
mod models;
mod options;
mod params;

pub use client::{FutarApi, FutarClient};
pub use config::{DEFAULT_API_VERSION, DEFAULT_BASE_URL, FutarConfig};
pub use error::FutarError;
pub use models::{Optimize, ResponseEnvelope, TraverseMode};
pub use options::{
    AlertSearchOptions, ApiRequest, ArrivalsAndDeparturesOptions, BuildRequest, CallContext,
    PlanTripOptions, RouteDetailsForStopOptions, RouteDetailsOptions, RouteOptions,
    ScheduleForStopOptions, SearchOptions, StopOptions, StopsForLocationOptions,
    TripDetailsOptions, VehiclesForRouteOptions, VehiclesForStopOptions,
};
pub use params::{DefaultingMode, Falsy, ParamValue, RequestParams};
